use serde::{Deserialize, Serialize};

use crate::complex::Complex;
use crate::error::CoreError;
use crate::viewport::Viewport;

/// Squared bailout radius: an orbit has escaped once `|z| > 2`.
pub const ESCAPE_RADIUS_SQ: f64 = 4.0;

/// Parameters controlling fractal iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawParams")]
pub struct FractalParams {
    /// Iteration budget; a count equal to it marks an interior point.
    max_iterations: u32,
}

#[derive(Deserialize)]
struct RawParams {
    max_iterations: u32,
}

impl TryFrom<RawParams> for FractalParams {
    type Error = CoreError;

    fn try_from(raw: RawParams) -> Result<Self, Self::Error> {
        Self::new(raw.max_iterations)
    }
}

impl FractalParams {
    pub const DEFAULT_MAX_ITERATIONS: u32 = 256;
    pub const MAX_ITERATIONS_LIMIT: u32 = 100_000;

    pub fn new(max_iterations: u32) -> crate::Result<Self> {
        Self::validate(max_iterations)?;
        Ok(Self { max_iterations })
    }

    /// Check an iteration budget without building params.
    pub fn validate(max_iterations: u32) -> crate::Result<()> {
        if !(1..=Self::MAX_ITERATIONS_LIMIT).contains(&max_iterations) {
            return Err(CoreError::InvalidMaxIterations(max_iterations));
        }
        Ok(())
    }

    #[inline]
    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }
}

impl Default for FractalParams {
    fn default() -> Self {
        Self {
            max_iterations: Self::DEFAULT_MAX_ITERATIONS,
        }
    }
}

/// The two concrete fractals a surface can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FractalKind {
    Mandelbrot,
    Julia,
}

impl FractalKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Mandelbrot => "Mandelbrot",
            Self::Julia => "Julia",
        }
    }

    /// The complementary kind, shown in the small panel.
    pub fn other(self) -> Self {
        match self {
            Self::Mandelbrot => Self::Julia,
            Self::Julia => Self::Mandelbrot,
        }
    }
}

impl std::fmt::Display for FractalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Strategy plugged into the generic surface and renderer.
///
/// Implementors differ only in how the starting value and the additive
/// constant are derived from the mapped pixel point, and in the seed they
/// carry. Renderers are generic over `F: Fractal` so the iteration loop is
/// statically dispatched and inlined.
pub trait Fractal {
    /// Decoded seed value (`()` when the fractal has none).
    type Seed: Copy + std::fmt::Debug;

    /// Number of seed bytes appended to the viewport record.
    const SEED_LEN: usize;

    /// Iterate `point` and return the escape count.
    ///
    /// The result lies in `0..=max_iterations`; `max_iterations` means the
    /// orbit did not escape (interior point).
    fn iterate(&self, point: Complex) -> u32;

    fn params(&self) -> &FractalParams;

    fn set_params(&mut self, params: FractalParams);

    fn kind(&self) -> FractalKind;

    /// The fully zoomed-out view for this fractal.
    fn default_viewport(width: u32, height: u32) -> Viewport;

    /// Append the seed part of the binary record (exactly `SEED_LEN` bytes).
    fn write_seed(&self, out: &mut Vec<u8>);

    /// Parse a seed from exactly `SEED_LEN` bytes without applying it.
    fn read_seed(bytes: &[u8]) -> crate::Result<Self::Seed>;

    /// Apply a seed previously returned by [`read_seed`](Self::read_seed).
    fn apply_seed(&mut self, seed: Self::Seed);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_params() {
        assert_eq!(FractalParams::default().max_iterations(), 256);
    }

    #[test]
    fn params_range() {
        assert!(FractalParams::new(1).is_ok());
        assert!(FractalParams::new(100_000).is_ok());
        assert!(matches!(
            FractalParams::new(0),
            Err(CoreError::InvalidMaxIterations(0))
        ));
        assert!(FractalParams::new(100_001).is_err());
    }

    #[test]
    fn params_deserialize_validates() {
        let ok: FractalParams = serde_json::from_str(r#"{"max_iterations":500}"#).unwrap();
        assert_eq!(ok.max_iterations(), 500);
        assert!(serde_json::from_str::<FractalParams>(r#"{"max_iterations":0}"#).is_err());
    }

    #[test]
    fn kind_other_is_involution() {
        for kind in [FractalKind::Mandelbrot, FractalKind::Julia] {
            assert_ne!(kind.other(), kind);
            assert_eq!(kind.other().other(), kind);
        }
        assert_eq!(FractalKind::Julia.to_string(), "Julia");
    }
}
