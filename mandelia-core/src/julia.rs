use crate::complex::Complex;
use crate::error::CoreError;
use crate::fractal::{Fractal, FractalKind, FractalParams, ESCAPE_RADIUS_SQ};
use crate::viewport::Viewport;

/// A Julia set: `z_{n+1} = z_n² + c`, where `c` is a fixed constant
/// and `z₀` is the point on the complex plane.
#[derive(Debug, Clone)]
pub struct Julia {
    params: FractalParams,

    /// The fixed constant `c` that defines this Julia set.
    c: Complex,
}

impl Julia {
    pub fn new(c: Complex, params: FractalParams) -> Self {
        Self { params, c }
    }

    /// A visually interesting default: `c = -0.7 + 0.27015i`.
    pub fn default_c() -> Complex {
        Complex::new(-0.7, 0.27015)
    }

    /// The constant `c` defining this Julia set.
    pub fn c(&self) -> Complex {
        self.c
    }

    pub fn set_c(&mut self, c: Complex) {
        self.c = c;
    }

    /// Replace the real part of `c`, keeping the imaginary part.
    pub fn set_c_re(&mut self, re: f64) {
        self.c.re = re;
    }

    /// Replace the imaginary part of `c`, keeping the real part.
    pub fn set_c_im(&mut self, im: f64) {
        self.c.im = im;
    }
}

impl Default for Julia {
    fn default() -> Self {
        Self::new(Self::default_c(), FractalParams::default())
    }
}

impl Fractal for Julia {
    type Seed = Complex;

    const SEED_LEN: usize = 16;

    fn iterate(&self, point: Complex) -> u32 {
        let max_iter = self.params.max_iterations();
        let c = self.c;
        let mut z = point;

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

        max_iter
    }

    fn params(&self) -> &FractalParams {
        &self.params
    }

    fn set_params(&mut self, params: FractalParams) {
        self.params = params;
    }

    fn kind(&self) -> FractalKind {
        FractalKind::Julia
    }

    fn default_viewport(width: u32, height: u32) -> Viewport {
        Viewport::default_julia(width, height)
    }

    fn write_seed(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.c.re.to_le_bytes());
        out.extend_from_slice(&self.c.im.to_le_bytes());
    }

    fn read_seed(bytes: &[u8]) -> crate::Result<Complex> {
        if bytes.len() != Self::SEED_LEN {
            return Err(CoreError::Format {
                expected: Self::SEED_LEN,
                actual: bytes.len(),
            });
        }
        let c = Complex::new(
            crate::codec::read_f64(bytes, 0)?,
            crate::codec::read_f64(bytes, 8)?,
        );
        if !c.is_finite() {
            return Err(CoreError::InvalidRecord {
                reason: format!("julia constant is not finite: {c}"),
            });
        }
        Ok(c)
    }

    fn apply_seed(&mut self, seed: Complex) {
        self.c = seed;
    }
}
