#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Operations on type-erased arrays.
///
/// Dispatches the typed operations of [`ops`] over [`kornia_ndarray::DynArray`]
/// by element kind.
pub mod dyn_ops;

/// Error types for array operations.
///
/// Defines [`NdArrayOpsError`] for handling failures during element-wise computations.
pub mod error;

/// Batched in-place operation chains.
pub mod inplace;

/// Per-element kernels for arithmetic and unary operations.
///
/// Fixes the overflow, widening and division rules of each element kind.
pub mod kernels;

/// High-level array operations and traits.
///
/// Provides the [`NdArrayOps`] trait with element-wise arithmetic in copying
/// and in-place forms.
pub mod ops;

pub use error::NdArrayOpsError;
pub use inplace::InplaceMath;
pub use kernels::{ArithmeticKernel, BinaryOp, UnaryKernel, UnaryOp};
pub use ops::NdArrayOps;
