//! Error types shared by the fractal engines.

/// Errors that can occur while building or running a fractal render.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FractalError {
    /// Two matrices could not be combined because of their shapes.
    #[error("dimension mismatch: expected {expected:?}, got {got:?}")]
    DimensionMismatch {
        expected: (usize, usize),
        got: (usize, usize),
    },

    /// A `]` was interpreted while the turtle stack was empty.
    #[error("turtle stack underflow at symbol {position}")]
    StackUnderflow { position: usize },

    /// An affine map carried a probability outside [0, 1] (or NaN).
    #[error("probability {value} of map {index} is outside [0, 1]")]
    InvalidProbability { index: usize, value: f64 },

    /// A colour string could not be parsed as `#rrggbb`.
    #[error("invalid colour {0:?}, expected #rrggbb")]
    InvalidColor(String),

    /// A coefficient table row could not be parsed.
    #[error("invalid matrix table row {row}: {reason}")]
    InvalidMatrixTable { row: usize, reason: String },
}

pub type Result<T> = std::result::Result<T, FractalError>;
