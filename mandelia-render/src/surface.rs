use std::time::Duration;

use tracing::debug;

use mandelia_core::{codec, Complex, Fractal, FractalKind, FractalParams, Julia, Mandelbrot, Viewport};

use crate::buffer::RenderBuffer;
use crate::coloration::SharedColoration;
use crate::error::RenderError;
use crate::iteration_buffer::IterationBuffer;
use crate::renderer::{compute, RenderResult};

/// Operations shared by every fractal surface.
///
/// Object safe, so the manager can hand out its "first" and "second"
/// surfaces as `&mut dyn Surface` whatever their concrete fractal.
pub trait Surface {
    fn kind(&self) -> FractalKind;

    fn viewport(&self) -> &Viewport;

    fn width(&self) -> u32 {
        self.viewport().width
    }

    fn height(&self) -> u32 {
        self.viewport().height
    }

    /// Current iteration budget.
    fn iterations(&self) -> u32;

    /// Set the iteration budget (`1..=100_000`).
    fn set_iterations(&mut self, iterations: u32) -> crate::Result<()>;

    /// Change the pixel grid, keeping the centre and the pixel size.
    fn resize(&mut self, width: u32, height: u32) -> crate::Result<()>;

    /// Anchor-preserving zoom at pixel `(x, y)`; `factor > 1` zooms in.
    fn zoom(&mut self, x: f64, y: f64, factor: f64) -> crate::Result<()>;

    fn zoom_center(&mut self, factor: f64) -> crate::Result<()>;

    fn pan(&mut self, dx: f64, dy: f64) -> crate::Result<()>;

    fn select(&mut self, x0: f64, y0: f64, x1: f64, y1: f64) -> crate::Result<()>;

    /// Complex-plane width of one pixel; shrinks as the zoom deepens.
    fn pixel_size(&self) -> f64 {
        self.viewport().pixel_size()
    }

    /// Escape counts for the current state, recomputed only when stale.
    fn iterations_buffer(&mut self) -> &IterationBuffer;

    /// Render the current state with the shared coloration.
    fn image(&mut self) -> RenderBuffer;

    /// Render at another size without touching the live state.
    fn image_at_size(&self, width: u32, height: u32) -> crate::Result<RenderBuffer>;

    fn iterations_sum(&mut self) -> u64 {
        self.iterations_buffer().sum()
    }

    fn iterations_per_pixel(&mut self) -> f64 {
        self.iterations_buffer().per_pixel()
    }

    /// Time spent by the last compute, if any.
    fn last_elapsed(&self) -> Option<Duration>;

    /// Default view and default iteration budget. Coloration is untouched.
    fn reset(&mut self);

    /// Jump to the fully zoomed-out view, keeping every other setting.
    fn top(&mut self);

    /// Length of the record produced by [`to_bytes`](Self::to_bytes).
    fn bytes_size(&self) -> usize;

    fn to_bytes(&self) -> Vec<u8>;

    /// Load a record. Either every field is applied or none is.
    fn from_bytes(&mut self, bytes: &[u8]) -> crate::Result<()>;
}

/// A fractal bound to a viewport, a coloration, and a cached frame.
///
/// Every mutation that changes what would be drawn drops the cached
/// frame; the next read recomputes it once.
#[derive(Debug)]
pub struct FractalSurface<F: Fractal> {
    fractal: F,
    viewport: Viewport,
    coloration: SharedColoration,
    cache: Option<RenderResult>,
    last_elapsed: Option<Duration>,
}

impl<F: Fractal + Sync> FractalSurface<F> {
    /// Create a surface showing the fractal's default view.
    pub fn new(
        fractal: F,
        coloration: SharedColoration,
        width: u32,
        height: u32,
    ) -> crate::Result<Self> {
        check_dimensions(width, height)?;
        Ok(Self {
            fractal,
            viewport: F::default_viewport(width, height),
            coloration,
            cache: None,
            last_elapsed: None,
        })
    }

    pub fn fractal(&self) -> &F {
        &self.fractal
    }

    pub fn coloration(&self) -> &SharedColoration {
        &self.coloration
    }

    /// Whether the next read will recompute the frame.
    pub fn is_dirty(&self) -> bool {
        self.cache.is_none()
    }

    fn invalidate(&mut self) {
        if self.cache.take().is_some() {
            debug!(kind = %self.fractal.kind(), "Frame invalidated");
        }
    }

    fn ensure_computed(&mut self) -> &RenderResult {
        let (fractal, viewport) = (&self.fractal, &self.viewport);
        let last_elapsed = &mut self.last_elapsed;
        self.cache.get_or_insert_with(|| {
            let result = compute(fractal, viewport);
            *last_elapsed = Some(result.elapsed);
            result
        })
    }
}

impl FractalSurface<Mandelbrot> {
    /// Real coordinate under pixel column `x`.
    pub fn real_at_x(&self, x: f64) -> f64 {
        self.viewport.real_at_x(x)
    }

    /// Imaginary coordinate under pixel row `y`.
    pub fn imaginary_at_y(&self, y: f64) -> f64 {
        self.viewport.imaginary_at_y(y)
    }

    /// Real part of the view centre.
    pub fn real(&self) -> f64 {
        self.viewport.center().re
    }

    /// Imaginary part of the view centre.
    pub fn imaginary(&self) -> f64 {
        self.viewport.center().im
    }
}

impl FractalSurface<Julia> {
    pub fn c(&self) -> Complex {
        self.fractal.c()
    }

    pub fn set_c_r(&mut self, re: f64) {
        if self.fractal.c().re != re {
            self.fractal.set_c_re(re);
            self.invalidate();
        }
    }

    pub fn set_c_i(&mut self, im: f64) {
        if self.fractal.c().im != im {
            self.fractal.set_c_im(im);
            self.invalidate();
        }
    }
}

impl<F: Fractal + Sync> Surface for FractalSurface<F> {
    fn kind(&self) -> FractalKind {
        self.fractal.kind()
    }

    fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    fn iterations(&self) -> u32 {
        self.fractal.params().max_iterations()
    }

    fn set_iterations(&mut self, iterations: u32) -> crate::Result<()> {
        let params = FractalParams::new(iterations)?;
        if params != *self.fractal.params() {
            self.fractal.set_params(params);
            self.invalidate();
        }
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) -> crate::Result<()> {
        check_dimensions(width, height)?;
        if (width, height) != (self.viewport.width, self.viewport.height) {
            self.viewport.resize(width, height)?;
            self.invalidate();
        }
        Ok(())
    }

    fn zoom(&mut self, x: f64, y: f64, factor: f64) -> crate::Result<()> {
        self.viewport.zoom(x, y, factor)?;
        self.invalidate();
        Ok(())
    }

    fn zoom_center(&mut self, factor: f64) -> crate::Result<()> {
        self.viewport.zoom_center(factor)?;
        self.invalidate();
        Ok(())
    }

    fn pan(&mut self, dx: f64, dy: f64) -> crate::Result<()> {
        if dx != 0.0 || dy != 0.0 {
            self.viewport.pan(dx, dy)?;
            self.invalidate();
        }
        Ok(())
    }

    fn select(&mut self, x0: f64, y0: f64, x1: f64, y1: f64) -> crate::Result<()> {
        self.viewport.select(x0, y0, x1, y1)?;
        self.invalidate();
        Ok(())
    }

    fn iterations_buffer(&mut self) -> &IterationBuffer {
        &self.ensure_computed().iterations
    }

    fn image(&mut self) -> RenderBuffer {
        let coloration = self.coloration.get();
        coloration.colorize(&self.ensure_computed().iterations)
    }

    fn image_at_size(&self, width: u32, height: u32) -> crate::Result<RenderBuffer> {
        check_dimensions(width, height)?;
        let mut viewport = self.viewport;
        viewport.resize(width, height)?;
        let result = compute(&self.fractal, &viewport);
        Ok(self.coloration.get().colorize(&result.iterations))
    }

    fn last_elapsed(&self) -> Option<Duration> {
        self.last_elapsed
    }

    fn reset(&mut self) {
        self.viewport = F::default_viewport(self.viewport.width, self.viewport.height);
        self.fractal.set_params(FractalParams::default());
        self.invalidate();
    }

    fn top(&mut self) {
        self.viewport = F::default_viewport(self.viewport.width, self.viewport.height);
        self.invalidate();
    }

    fn bytes_size(&self) -> usize {
        codec::record_len::<F>()
    }

    fn to_bytes(&self) -> Vec<u8> {
        codec::encode(
            &self.fractal,
            self.viewport.top_left,
            self.viewport.bottom_right,
        )
    }

    fn from_bytes(&mut self, bytes: &[u8]) -> crate::Result<()> {
        let record = codec::decode::<F>(bytes)?;
        let viewport = self
            .viewport
            .with_corners(record.top_left, record.bottom_right)?;
        // Everything parsed and validated; commit.
        self.viewport = viewport;
        self.fractal.set_params(record.params);
        self.fractal.apply_seed(record.seed);
        self.invalidate();
        debug!(kind = %self.fractal.kind(), "Loaded state record");
        Ok(())
    }
}

fn check_dimensions(width: u32, height: u32) -> crate::Result<()> {
    if width == 0 || height == 0 {
        return Err(RenderError::InvalidDimensions { width, height });
    }
    Ok(())
}
