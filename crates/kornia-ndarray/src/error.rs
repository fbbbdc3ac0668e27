use thiserror::Error;

/// Error type for array construction, access and view derivation.
///
/// Every variant describes a violated precondition. Errors are raised at the
/// call that violates the contract and leave every previously constructed
/// array untouched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NdArrayError {
    /// Index outside `[0, size)` for one axis.
    ///
    /// # Common Causes
    /// - Off-by-one errors in indexing loops
    /// - Negative indices (only slice boundaries accept the `-1` sentinel)
    /// - Using indices computed for a different array
    ///
    /// # Recommended Actions
    /// - Check `array.shape()` before indexing
    /// - Use `iter()` when every element has to be visited
    #[error("Index {index} out of bounds for axis {axis} with size {size}")]
    IndexOutOfBounds {
        /// The axis being indexed.
        axis: usize,
        /// The invalid index that was attempted.
        index: isize,
        /// The size of the axis.
        size: usize,
    },

    /// Shape is empty or incompatible with the requested operation.
    ///
    /// # Examples
    /// - Creating an array with an empty shape
    /// - Reshaping to a different number of elements
    /// - Concatenating arrays whose non-concatenated dimensions differ
    #[error("Shape mismatch: {message}. Expected: {expected}, got: {actual}")]
    ShapeMismatch {
        /// Human-readable description of the mismatch.
        message: String,
        /// Expected shape description.
        expected: String,
        /// Actual shape description.
        actual: String,
    },

    /// The declared rank does not match the number of axes.
    #[error("Rank mismatch: expected rank {expected}, got {actual}")]
    RankMismatch {
        /// Rank required by the caller.
        expected: usize,
        /// Rank of the array or index.
        actual: usize,
    },

    /// Malformed argument (permutation, squeeze axis, slice step, ...).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Arithmetic failure such as integer division by zero.
    #[error("Arithmetic error: {0}")]
    Arithmetic(String),

    /// Operation not supported for this element kind or array state.
    #[error("Unsupported operation: {operation} - {reason}")]
    UnsupportedOperation {
        /// Name of the operation that failed.
        operation: String,
        /// Reason why the operation is not supported.
        reason: String,
    },
}

impl NdArrayError {
    /// Creates an IndexOutOfBounds error.
    pub fn index_out_of_bounds(axis: usize, index: isize, size: usize) -> Self {
        Self::IndexOutOfBounds { axis, index, size }
    }

    /// Creates a ShapeMismatch error with formatted shapes.
    pub fn shape_mismatch(message: impl Into<String>, expected: &[usize], actual: &[usize]) -> Self {
        Self::ShapeMismatch {
            message: message.into(),
            expected: format!("{expected:?}"),
            actual: format!("{actual:?}"),
        }
    }

    /// Creates a RankMismatch error.
    pub fn rank_mismatch(expected: usize, actual: usize) -> Self {
        Self::RankMismatch { expected, actual }
    }

    /// Creates an InvalidArgument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Creates an Arithmetic error.
    pub fn arithmetic(message: impl Into<String>) -> Self {
        Self::Arithmetic(message.into())
    }

    /// Creates an UnsupportedOperation error with context.
    pub fn unsupported_operation(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnsupportedOperation {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    /// Returns a user-friendly suggestion for resolving the error.
    pub fn suggestion(&self) -> &str {
        match self {
            Self::IndexOutOfBounds { .. } => {
                "Verify indices are within bounds (0 <= index < axis size)"
            }
            Self::ShapeMismatch { .. } => {
                "Check that shapes are non-empty and element counts agree"
            }
            Self::RankMismatch { .. } => "Supply exactly one index per axis",
            Self::InvalidArgument(_) => "Check the operation arguments against the array shape",
            Self::Arithmetic(_) => "Check divisors for zeros before dividing",
            Self::UnsupportedOperation { .. } => {
                "Check the element kind and writeability of the array"
            }
        }
    }
}
