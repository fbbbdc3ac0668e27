use kornia_ndarray::{dispatch_dyn, DynArray};

use crate::{
    error::NdArrayOpsError,
    kernels::UnaryOp,
    ops::{add, div, mul, sub, unary_inplace},
};

macro_rules! dyn_binary {
    ($name:ident, $op:ident, $doc:literal) => {
        #[doc = $doc]
        ///
        /// # Errors
        ///
        /// Returns [`NdArrayOpsError::InvalidArgument`] if the element kinds differ,
        /// and otherwise the errors of the typed operation.
        pub fn $name(a: &DynArray, b: &DynArray) -> Result<DynArray, NdArrayOpsError> {
            match (a, b) {
                (DynArray::Int8(a), DynArray::Int8(b)) => Ok($op(a, b)?.into()),
                (DynArray::Int16(a), DynArray::Int16(b)) => Ok($op(a, b)?.into()),
                (DynArray::Int32(a), DynArray::Int32(b)) => Ok($op(a, b)?.into()),
                (DynArray::Int64(a), DynArray::Int64(b)) => Ok($op(a, b)?.into()),
                (DynArray::Float32(a), DynArray::Float32(b)) => Ok($op(a, b)?.into()),
                (DynArray::Float64(a), DynArray::Float64(b)) => Ok($op(a, b)?.into()),
                (DynArray::Complex32(a), DynArray::Complex32(b)) => Ok($op(a, b)?.into()),
                (DynArray::Complex64(a), DynArray::Complex64(b)) => Ok($op(a, b)?.into()),
                _ => Err(NdArrayOpsError::InvalidArgument(format!(
                    "element kinds differ: {} and {}",
                    a.dtype(),
                    b.dtype()
                ))),
            }
        }
    };
}

dyn_binary!(dyn_add, add, "Element-wise sum of two arrays of the same kind.");
dyn_binary!(dyn_sub, sub, "Element-wise difference of two arrays of the same kind.");
dyn_binary!(dyn_mul, mul, "Element-wise product of two arrays of the same kind.");
dyn_binary!(dyn_div, div, "Element-wise quotient of two arrays of the same kind.");

/// Applies a unary operation in place, choosing the kernel by element kind.
///
/// # Errors
///
/// Returns [`kornia_ndarray::NdArrayError::UnsupportedOperation`] (wrapped) if
/// the element kind does not support `op` or the array is read-only.
///
/// # Example
///
/// ```
/// use kornia_ndarray::{DynArray, NdArray};
/// use kornia_ndarray_ops::{dyn_ops::dyn_apply_unary, kernels::UnaryOp};
///
/// let mut d: DynArray = NdArray::<i32>::from_shape_vec(&[2], vec![-1, 2]).unwrap().into();
/// dyn_apply_unary(&mut d, UnaryOp::Abs).unwrap();
/// assert_eq!(d.as_typed::<i32>().unwrap().to_vec(), vec![1, 2]);
/// assert!(dyn_apply_unary(&mut d, UnaryOp::Sin).is_err());
/// ```
pub fn dyn_apply_unary(a: &mut DynArray, op: UnaryOp) -> Result<(), NdArrayOpsError> {
    dispatch_dyn!(a, array => unary_inplace(array, op))
}
