//! Fixed-length binary records for saved fractal state.
//!
//! Layout (little-endian):
//!
//! | offset | size | field                   |
//! |--------|------|-------------------------|
//! | 0      | 8    | `top_left.re` (f64)     |
//! | 8      | 8    | `top_left.im` (f64)     |
//! | 16     | 8    | `bottom_right.re` (f64) |
//! | 24     | 8    | `bottom_right.im` (f64) |
//! | 32     | 4    | `max_iterations` (u32)  |
//! | 36     | n    | seed (`Fractal::SEED_LEN`) |
//!
//! Pixel dimensions are not part of the record: a loaded view is applied
//! to whatever grid the surface currently has.

use tracing::debug;

use crate::complex::Complex;
use crate::error::CoreError;
use crate::fractal::{Fractal, FractalParams};

/// Bytes taken by the corners and the iteration budget.
pub const VIEW_RECORD_LEN: usize = 4 * 8 + 4;

/// Total record length for fractal type `F`.
pub const fn record_len<F: Fractal>() -> usize {
    VIEW_RECORD_LEN + F::SEED_LEN
}

/// A fully parsed and validated record, not yet applied to anything.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Record<S> {
    pub top_left: Complex,
    pub bottom_right: Complex,
    pub params: FractalParams,
    pub seed: S,
}

/// Serialize the state of `fractal` framed by the given corners.
pub fn encode<F: Fractal>(fractal: &F, top_left: Complex, bottom_right: Complex) -> Vec<u8> {
    let mut out = Vec::with_capacity(record_len::<F>());
    for v in [top_left.re, top_left.im, bottom_right.re, bottom_right.im] {
        out.extend_from_slice(&v.to_le_bytes());
    }
    out.extend_from_slice(&fractal.params().max_iterations().to_le_bytes());
    fractal.write_seed(&mut out);
    debug_assert_eq!(out.len(), record_len::<F>());
    out
}

/// Parse and validate a record for fractal type `F`.
///
/// Nothing is applied here; the caller commits the returned record only
/// once every field has been accepted.
pub fn decode<F: Fractal>(bytes: &[u8]) -> crate::Result<Record<F::Seed>> {
    let expected = record_len::<F>();
    if bytes.len() != expected {
        return Err(CoreError::Format {
            expected,
            actual: bytes.len(),
        });
    }
    let top_left = Complex::new(read_f64(bytes, 0)?, read_f64(bytes, 8)?);
    let bottom_right = Complex::new(read_f64(bytes, 16)?, read_f64(bytes, 24)?);
    if !top_left.is_finite() || !bottom_right.is_finite() {
        return Err(CoreError::InvalidRecord {
            reason: format!("non-finite corners {top_left} / {bottom_right}"),
        });
    }
    let span = bottom_right - top_left;
    if span.re == 0.0 || span.im == 0.0 {
        return Err(CoreError::InvalidRecord {
            reason: format!("degenerate rectangle {top_left} / {bottom_right}"),
        });
    }
    let params = FractalParams::new(read_u32(bytes, 32)?)?;
    let seed = F::read_seed(&bytes[VIEW_RECORD_LEN..])?;
    debug!(
        top_left = %top_left,
        bottom_right = %bottom_right,
        max_iterations = params.max_iterations(),
        ?seed,
        "Decoded record"
    );
    Ok(Record {
        top_left,
        bottom_right,
        params,
        seed,
    })
}

/// Read a little-endian `f64` at `offset`.
pub fn read_f64(bytes: &[u8], offset: usize) -> crate::Result<f64> {
    let raw = bytes
        .get(offset..offset + 8)
        .and_then(|s| <[u8; 8]>::try_from(s).ok())
        .ok_or(CoreError::Format {
            expected: offset + 8,
            actual: bytes.len(),
        })?;
    Ok(f64::from_le_bytes(raw))
}

/// Read a little-endian `u32` at `offset`.
pub fn read_u32(bytes: &[u8], offset: usize) -> crate::Result<u32> {
    let raw = bytes
        .get(offset..offset + 4)
        .and_then(|s| <[u8; 4]>::try_from(s).ok())
        .ok_or(CoreError::Format {
            expected: offset + 4,
            actual: bytes.len(),
        })?;
    Ok(u32::from_le_bytes(raw))
}
