use kornia_ndarray::NdArrayError;
use thiserror::Error;

/// An error type for array operations.
#[derive(Error, Debug, PartialEq)]
pub enum NdArrayOpsError {
    /// The operands of an element-wise operation have different shapes.
    #[error("Shape mismatch: {0:?} != {1:?}")]
    ShapeMismatch(Vec<usize>, Vec<usize>),

    /// Malformed operation argument, e.g. a clamp range with `min > max`.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Array error
    #[error("Error with the array: {0}")]
    NdArrayError(#[from] NdArrayError),
}
