//! Error types for tile mosaic operations.

use thiserror::Error;

/// Result type alias using MosaicError.
pub type MosaicResult<T> = Result<T, MosaicError>;

/// Primary error type for mosaic operations.
///
/// The variants fall in three groups. Per-tile lookup failures
/// (`MalformedInput`, `Io`) are recoverable: traversal absorbs them and treats
/// the cell as empty. Contract breaches (`InvariantViolation`, `NegativeSize`,
/// `TransformConflict`, `ValueOutOfBounds`) are fatal and must reach the caller
/// untouched. `ExhaustedTraversal` and `Unsupported` signal API misuse.
#[derive(Debug, Error)]
pub enum MosaicError {
    // === Per-tile lookup errors ===
    #[error("Malformed tile input: {0}")]
    MalformedInput(String),

    #[error("I/O error: {0}")]
    Io(String),

    // === Contract breaches ===
    #[error("Tile invariant violated: {0}")]
    InvariantViolation(String),

    #[error("Negative tile size requested: {width}x{height}")]
    NegativeSize { width: i64, height: i64 },

    #[error("Value out of bounds: {name}={value} (allowed range 0..={max})")]
    ValueOutOfBounds {
        name: &'static str,
        value: i64,
        max: i64,
    },

    #[error("A different grid-to-world transform is already assigned to this tile")]
    TransformConflict,

    #[error("Incompatible image type: {0}")]
    IncompatibleImageType(String),

    // === API misuse ===
    #[error("Traversal is exhausted")]
    ExhaustedTraversal,

    #[error("Unsupported operation: {0}")]
    Unsupported(&'static str),

    // === Configuration ===
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid pyramid: {0}")]
    InvalidPyramid(String),
}

impl MosaicError {
    /// Create a MalformedInput error.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedInput(msg.into())
    }

    /// Create an InvariantViolation error.
    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    /// Create an InvalidConfig error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create an InvalidPyramid error.
    pub fn invalid_pyramid(msg: impl Into<String>) -> Self {
        Self::InvalidPyramid(msg.into())
    }

    /// Whether traversal may absorb this error and keep scanning.
    ///
    /// Only failures describing a single bad tile descriptor qualify.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, MosaicError::MalformedInput(_) | MosaicError::Io(_))
    }

    /// Whether this error reports a broken construction-time contract.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            MosaicError::InvariantViolation(_)
                | MosaicError::NegativeSize { .. }
                | MosaicError::ValueOutOfBounds { .. }
                | MosaicError::TransformConflict
        )
    }
}

impl From<std::io::Error> for MosaicError {
    fn from(err: std::io::Error) -> Self {
        MosaicError::Io(err.to_string())
    }
}
