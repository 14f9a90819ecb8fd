use std::cell::Cell;
use std::rc::Rc;

use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::buffer::RenderBuffer;
use crate::iteration_buffer::IterationBuffer;

/// Maps an escape count to a color by per-channel modular multiplication.
///
/// Each channel is `(count × coefficient) mod 256`, so the palette cycles
/// with a period of `256 / gcd(256, coefficient)` iterations. Interior
/// pixels are black.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuloColoration {
    pub r: u32,
    pub g: u32,
    pub b: u32,
}

impl ModuloColoration {
    pub const INTERIOR: [u8; 3] = [0, 0, 0];

    pub fn new(r: u32, g: u32, b: u32) -> Self {
        Self { r, g, b }
    }

    /// Random coefficients, each the sum of three small dice rolls
    /// (`0..=6`, `0..=6`, `0..=4`) so mid values are favoured.
    pub fn random() -> Self {
        let mut rng = rand::thread_rng();
        let mut roll = || rng.gen_range(0..=6) + rng.gen_range(0..=6) + rng.gen_range(0..=4);
        Self::new(roll(), roll(), roll())
    }

    #[inline]
    pub fn rgb(&self) -> (u32, u32, u32) {
        (self.r, self.g, self.b)
    }

    /// Color of a single count.
    #[inline]
    pub fn color(&self, count: u32, max_iterations: u32) -> [u8; 3] {
        if count >= max_iterations {
            return Self::INTERIOR;
        }
        let n = count as u64;
        [
            (n * self.r as u64 % 256) as u8,
            (n * self.g as u64 % 256) as u8,
            (n * self.b as u64 % 256) as u8,
        ]
    }

    /// Colorize an entire iteration buffer into an RGB pixel buffer.
    pub fn colorize(&self, iter_buf: &IterationBuffer) -> RenderBuffer {
        let max = iter_buf.max_iterations;
        let mut pixels = vec![0u8; iter_buf.data.len() * 3];
        pixels
            .par_chunks_mut(3)
            .zip(iter_buf.data.par_iter())
            .for_each(|(pixel, &count)| {
                pixel.copy_from_slice(&self.color(count, max));
            });
        RenderBuffer {
            width: iter_buf.width,
            height: iter_buf.height,
            pixels,
        }
    }
}

impl Default for ModuloColoration {
    fn default() -> Self {
        Self::new(3, 1, 10)
    }
}

/// One coloration shared by several surfaces.
///
/// Cloning the handle shares the same cell; a [`set`](Self::set) through
/// any clone is seen by every surface on its next render.
#[derive(Debug, Clone, Default)]
pub struct SharedColoration(Rc<Cell<ModuloColoration>>);

impl SharedColoration {
    pub fn new(coloration: ModuloColoration) -> Self {
        Self(Rc::new(Cell::new(coloration)))
    }

    pub fn get(&self) -> ModuloColoration {
        self.0.get()
    }

    pub fn set(&self, coloration: ModuloColoration) {
        self.0.set(coloration);
    }
}
