use thiserror::Error;

/// Errors originating from the core fractal engine.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid max iterations: {0} (must be within 1..=100000)")]
    InvalidMaxIterations(u32),

    #[error("invalid viewport: {reason}")]
    InvalidViewport { reason: String },

    #[error("bad record length: expected {expected} bytes, got {actual}")]
    Format { expected: usize, actual: usize },

    #[error("corrupt record: {reason}")]
    InvalidRecord { reason: String },
}
