use crate::complex::Complex;
use crate::fractal::{Fractal, FractalKind, FractalParams, ESCAPE_RADIUS_SQ};
use crate::viewport::Viewport;

/// The Mandelbrot set: `z_{n+1} = z_n² + c`, starting from `z₀ = 0`.
///
/// The point `c` is the coordinate on the complex plane.
#[derive(Debug, Clone, Default)]
pub struct Mandelbrot {
    params: FractalParams,
}

impl Mandelbrot {
    pub fn new(params: FractalParams) -> Self {
        Self { params }
    }
}

/// Returns `true` if `c` lies inside the main cardioid.
#[inline]
fn in_cardioid(re: f64, im: f64) -> bool {
    let im2 = im * im;
    let q = (re - 0.25) * (re - 0.25) + im2;
    q * (q + (re - 0.25)) <= 0.25 * im2
}

/// Returns `true` if `c` lies inside the period-2 bulb.
#[inline]
fn in_period2_bulb(re: f64, im: f64) -> bool {
    (re + 1.0) * (re + 1.0) + im * im <= 0.0625
}

impl Fractal for Mandelbrot {
    type Seed = ();

    const SEED_LEN: usize = 0;

    fn iterate(&self, c: Complex) -> u32 {
        let max_iter = self.params.max_iterations();

        // Both regions are provably inside the set.
        if in_cardioid(c.re, c.im) || in_period2_bulb(c.re, c.im) {
            return max_iter;
        }

        let mut z = Complex::ZERO;

        // Brent's cycle detection state.
        let mut old_z = z;
        let mut period: u32 = 0;
        let mut check: u32 = 3;

        let mut n = 0;
        while n < max_iter {
            if z.norm_sq() > ESCAPE_RADIUS_SQ {
                return n;
            }
            z = z.square_add(c);
            n += 1;

            // Skip the first 32 iterations and only check every 4th one.
            if n >= 32 && n & 3 == 0 {
                if (z.re - old_z.re).abs() < 1e-13 && (z.im - old_z.im).abs() < 1e-13 {
                    return max_iter;
                }
                period += 1;
                if period > check {
                    old_z = z;
                    period = 0;
                    check = check.saturating_mul(2);
                }
            }
        }

        max_iter
    }

    fn params(&self) -> &FractalParams {
        &self.params
    }

    fn set_params(&mut self, params: FractalParams) {
        self.params = params;
    }

    fn kind(&self) -> FractalKind {
        FractalKind::Mandelbrot
    }

    fn default_viewport(width: u32, height: u32) -> Viewport {
        Viewport::default_mandelbrot(width, height)
    }

    fn write_seed(&self, _out: &mut Vec<u8>) {}

    fn read_seed(_bytes: &[u8]) -> crate::Result<()> {
        Ok(())
    }

    fn apply_seed(&mut self, _seed: ()) {}
}
