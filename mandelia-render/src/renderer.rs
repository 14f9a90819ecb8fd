use std::time::{Duration, Instant};

use rayon::prelude::*;
use tracing::debug;

use mandelia_core::{Complex, Fractal, Viewport};

use crate::iteration_buffer::IterationBuffer;
use crate::tile::{build_tile_grid, Tile};

/// The result of a full-frame compute.
///
/// Contains raw escape counts (no coloring); apply a coloration to get
/// displayable pixels.
#[derive(Debug, Clone)]
pub struct RenderResult {
    pub iterations: IterationBuffer,
    pub elapsed: Duration,
    pub tiles_rendered: usize,
}

/// Iterate every pixel of one tile.
fn render_tile<F: Fractal>(fractal: &F, viewport: &Viewport, tile: &Tile) -> Vec<u32> {
    let mut data = Vec::with_capacity(tile.pixel_count());
    for py in tile.rows() {
        let im = viewport.imaginary_at_y(py as f64);
        data.extend(
            tile.columns()
                .map(|px| fractal.iterate(Complex::new(viewport.real_at_x(px as f64), im))),
        );
    }
    data
}

/// Compute a full frame of escape counts.
///
/// The frame is cut into tiles processed in parallel by Rayon; each tile
/// owns a disjoint pixel range and the results are blitted back in order.
/// Generic over the fractal type so the iteration loop is statically
/// dispatched.
pub fn compute<F: Fractal + Sync>(fractal: &F, viewport: &Viewport) -> RenderResult {
    let start = Instant::now();
    let max_iter = fractal.params().max_iterations();

    let tiles = build_tile_grid(viewport.width, viewport.height);
    debug!(
        kind = %fractal.kind(),
        tile_count = tiles.len(),
        width = viewport.width,
        height = viewport.height,
        max_iter,
        "Starting tiled compute"
    );

    let tile_data: Vec<Vec<u32>> = tiles
        .par_iter()
        .map(|tile| render_tile(fractal, viewport, tile))
        .collect();

    let mut iterations = IterationBuffer::new(viewport.width, viewport.height, max_iter);
    for (tile, data) in tiles.iter().zip(tile_data.iter()) {
        iterations.blit_tile(tile, data);
    }

    let elapsed = start.elapsed();
    debug!(
        kind = %fractal.kind(),
        elapsed_ms = elapsed.as_millis(),
        tiles_rendered = tiles.len(),
        "Compute complete"
    );

    RenderResult {
        iterations,
        elapsed,
        tiles_rendered: tiles.len(),
    }
}
