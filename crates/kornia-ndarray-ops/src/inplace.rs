//! Batched in-place operation chains.
//!
//! An [`InplaceMath`] builder queues unary and binary steps and applies all
//! of them in a single row-major pass: every element goes through the whole
//! queue, in order, before the next element is visited.

use kornia_ndarray::{iter::Iter, NdArray, NdArrayError};

use crate::{
    error::NdArrayOpsError,
    kernels::{AbsKernel, ArithmeticKernel, BinaryOp, FloatKernel, UnaryKernel, UnaryOp},
    ops::ensure_same_shape,
};

enum Operand<'a, T: ArithmeticKernel> {
    Scalar(T),
    Array(&'a NdArray<T>),
}

enum Step<'a, T: ArithmeticKernel> {
    Unary(UnaryOp),
    Binary(BinaryOp, Operand<'a, T>),
}

/// Operand values streamed alongside the target during [`InplaceMath::apply`].
enum Values<'a, T: ArithmeticKernel> {
    Owned(std::vec::IntoIter<T>),
    Borrowed(Iter<'a, T>),
}

impl<T: ArithmeticKernel> Iterator for Values<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        match self {
            Self::Owned(it) => it.next(),
            Self::Borrowed(it) => it.next(),
        }
    }
}

/// Builder for a chain of in-place element-wise operations.
///
/// Unary steps are only available for element kinds that support them: the
/// trigonometric, logarithmic and rounding steps for floating kinds and
/// [`InplaceMath::abs`] for signed integer and floating kinds.
///
/// # Example
///
/// ```
/// use kornia_ndarray::NdArray;
/// use kornia_ndarray_ops::NdArrayOps;
///
/// let mut a = NdArray::<f64>::from_shape_vec(&[3], vec![-1.2, 0.4, 2.5]).unwrap();
/// let b = NdArray::<f64>::from_shape_vec(&[3], vec![1.0, 1.0, 1.0]).unwrap();
/// a.inplace().abs().ceil().add(&b).mul_scalar(2.0).apply().unwrap();
/// assert_eq!(a.to_vec(), vec![6.0, 4.0, 8.0]);
/// ```
pub struct InplaceMath<'a, T: ArithmeticKernel + UnaryKernel> {
    target: &'a mut NdArray<T>,
    steps: Vec<Step<'a, T>>,
}

impl<'a, T: ArithmeticKernel + UnaryKernel> InplaceMath<'a, T> {
    /// Starts an empty chain on `target`.
    pub fn new(target: &'a mut NdArray<T>) -> Self {
        Self {
            target,
            steps: Vec::new(),
        }
    }

    /// Returns the number of queued steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns true if no step is queued.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    fn binary(mut self, op: BinaryOp, operand: Operand<'a, T>) -> Self {
        self.steps.push(Step::Binary(op, operand));
        self
    }

    /// Queues `x + other[i]`.
    pub fn add(self, other: &'a NdArray<T>) -> Self {
        self.binary(BinaryOp::Add, Operand::Array(other))
    }

    /// Queues `x - other[i]`.
    pub fn sub(self, other: &'a NdArray<T>) -> Self {
        self.binary(BinaryOp::Sub, Operand::Array(other))
    }

    /// Queues `x * other[i]`.
    pub fn mul(self, other: &'a NdArray<T>) -> Self {
        self.binary(BinaryOp::Mul, Operand::Array(other))
    }

    /// Queues `x / other[i]`.
    pub fn div(self, other: &'a NdArray<T>) -> Self {
        self.binary(BinaryOp::Div, Operand::Array(other))
    }

    /// Queues `x + s`.
    pub fn add_scalar(self, s: T) -> Self {
        self.binary(BinaryOp::Add, Operand::Scalar(s))
    }

    /// Queues `x - s`.
    pub fn sub_scalar(self, s: T) -> Self {
        self.binary(BinaryOp::Sub, Operand::Scalar(s))
    }

    /// Queues `x * s`.
    pub fn mul_scalar(self, s: T) -> Self {
        self.binary(BinaryOp::Mul, Operand::Scalar(s))
    }

    /// Queues `x / s`.
    pub fn div_scalar(self, s: T) -> Self {
        self.binary(BinaryOp::Div, Operand::Scalar(s))
    }

    /// Applies every queued step to every element of the target.
    ///
    /// Operand shapes are validated before the first write.
    ///
    /// # Errors
    ///
    /// * [`NdArrayError::UnsupportedOperation`] if the target is read-only.
    /// * [`NdArrayOpsError::ShapeMismatch`] if an array operand has another shape.
    /// * [`NdArrayError::Arithmetic`] from a failing division; earlier elements
    ///   stay written.
    pub fn apply(self) -> Result<(), NdArrayOpsError> {
        let target: &NdArray<T> = &*self.target;
        if !target.is_writeable() {
            return Err(NdArrayError::unsupported_operation(
                "inplace",
                "the array is a read-only view",
            )
            .into());
        }
        for step in &self.steps {
            if let Step::Binary(_, Operand::Array(other)) = step {
                ensure_same_shape(target, other)?;
            }
        }
        if self.steps.is_empty() {
            return Ok(());
        }
        log::trace!(
            "applying {} queued steps to {:?}",
            self.steps.len(),
            target.shape()
        );

        // operands sharing the target buffer are read before the first write
        let mut values: Vec<Option<Values<'_, T>>> = self
            .steps
            .iter()
            .map(|step| match step {
                Step::Binary(_, Operand::Array(other)) => {
                    Some(if other.storage().ptr_eq(target.storage()) {
                        Values::Owned(other.to_vec().into_iter())
                    } else {
                        Values::Borrowed(other.iter())
                    })
                }
                _ => None,
            })
            .collect();

        let mut raw = target.storage().raw_mut();
        for flat in target.flat_indices() {
            let mut v = T::read(&raw, flat);
            for (step, operand) in self.steps.iter().zip(values.iter_mut()) {
                v = match (step, operand) {
                    (Step::Unary(op), _) => T::unary(*op, v)?,
                    (Step::Binary(op, Operand::Scalar(s)), _) => op.apply(v, *s)?,
                    (Step::Binary(op, Operand::Array(_)), Some(values)) => {
                        let rhs = values.next().ok_or_else(|| {
                            NdArrayError::invalid_argument("operand exhausted before target")
                        })?;
                        op.apply(v, rhs)?
                    }
                    (Step::Binary(_, Operand::Array(_)), None) => {
                        return Err(NdArrayOpsError::InvalidArgument(
                            "array operand without values".to_string(),
                        ))
                    }
                };
            }
            T::write(&mut raw, flat, v);
        }
        Ok(())
    }
}

impl<T: FloatKernel> InplaceMath<'_, T> {
    fn push_unary(mut self, op: UnaryOp) -> Self {
        self.steps.push(Step::Unary(op));
        self
    }

    /// Queues the sine.
    pub fn sin(self) -> Self {
        self.push_unary(UnaryOp::Sin)
    }

    /// Queues the cosine.
    pub fn cos(self) -> Self {
        self.push_unary(UnaryOp::Cos)
    }

    /// Queues the tangent.
    pub fn tan(self) -> Self {
        self.push_unary(UnaryOp::Tan)
    }

    /// Queues the natural logarithm.
    pub fn log(self) -> Self {
        self.push_unary(UnaryOp::Log)
    }

    /// Queues the exponential.
    pub fn exp(self) -> Self {
        self.push_unary(UnaryOp::Exp)
    }

    /// Queues the square root.
    pub fn sqrt(self) -> Self {
        self.push_unary(UnaryOp::Sqrt)
    }

    /// Queues rounding towards positive infinity.
    pub fn ceil(self) -> Self {
        self.push_unary(UnaryOp::Ceil)
    }

    /// Queues rounding towards negative infinity.
    pub fn floor(self) -> Self {
        self.push_unary(UnaryOp::Floor)
    }
}

impl<T: AbsKernel> InplaceMath<'_, T> {
    /// Queues the absolute value.
    pub fn abs(mut self) -> Self {
        self.steps.push(Step::Unary(UnaryOp::Abs));
        self
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use kornia_ndarray::Slice;

    use super::*;
    use crate::NdArrayOps;

    #[test]
    fn chain_applies_in_order_per_element() -> Result<(), NdArrayOpsError> {
        let mut a = NdArray::<f64>::from_shape_vec(&[2, 2], vec![0.0, 1.0, 4.0, 9.0])?;
        let b = NdArray::<f64>::from_shape_vec(&[2, 2], vec![1.0, 2.0, 3.0, 4.0])?;
        a.inplace().sqrt().add(&b).mul_scalar(10.0).sub_scalar(1.0).apply()?;
        assert_eq!(a.to_vec(), vec![9.0, 29.0, 49.0, 69.0]);
        Ok(())
    }

    #[test]
    fn chain_transcendental() -> Result<(), NdArrayOpsError> {
        let mut a = NdArray::<f32>::from_shape_vec(&[3], vec![0.0, 1.0, 2.0])?;
        a.inplace().exp().log().sin().cos().apply()?;
        for (x, v) in a.iter().zip([0.0f32, 1.0, 2.0]) {
            assert_relative_eq!(x, v.sin().cos(), epsilon = 1e-5);
        }
        let mut c = NdArray::<f32>::from_shape_vec(&[2], vec![1.5, -1.5])?;
        c.inplace().floor().tan().apply()?;
        assert_relative_eq!(c.get1(0)?, 1.0f32.tan(), epsilon = 1e-6);
        Ok(())
    }

    #[test]
    fn chain_abs_on_integers() -> Result<(), NdArrayOpsError> {
        let mut a = NdArray::<i16>::from_shape_vec(&[3], vec![-4, 0, 7])?;
        let chain = a.inplace().abs().mul_scalar(2);
        assert_eq!(chain.len(), 2);
        chain.apply()?;
        assert_eq!(a.to_vec(), vec![8, 0, 14]);
        Ok(())
    }

    #[test]
    fn chain_validates_shapes_before_writing() -> Result<(), NdArrayOpsError> {
        let mut a = NdArray::<i32>::from_shape_vec(&[3], vec![1, 2, 3])?;
        let ok = NdArray::<i32>::ones(&[3])?;
        let bad = NdArray::<i32>::ones(&[2])?;
        let result = a.inplace().add(&ok).mul(&bad).apply();
        assert_eq!(result, Err(NdArrayOpsError::ShapeMismatch(vec![3], vec![2])));
        assert_eq!(a.to_vec(), vec![1, 2, 3]);
        Ok(())
    }

    #[test]
    fn chain_on_strided_target_with_aliased_operand() -> Result<(), NdArrayOpsError> {
        let a = NdArray::<i64>::from_shape_vec(&[2, 2], vec![1, 2, 3, 4])?;
        let mut t = a.transpose(&[])?;
        let rows = a.slice(Slice::all(), 0)?;
        t.inplace().add(&rows).apply()?;
        // t[i][j] = a[j][i] + a[i][j], all read before writing
        assert_eq!(a.to_vec(), vec![2, 5, 5, 8]);
        Ok(())
    }

    #[test]
    fn chain_rejects_read_only_target() -> Result<(), NdArrayOpsError> {
        let a = NdArray::<f64>::zeros(&[2, 2])?;
        let mut row = a.view(1, 0)?;
        assert!(matches!(
            row.inplace().add_scalar(1.0).apply(),
            Err(NdArrayOpsError::NdArrayError(
                NdArrayError::UnsupportedOperation { .. }
            ))
        ));
        Ok(())
    }

    #[test]
    fn chain_division_by_zero() -> Result<(), NdArrayOpsError> {
        let mut a = NdArray::<i8>::from_shape_vec(&[2], vec![8, 9])?;
        let b = NdArray::<i8>::from_shape_vec(&[2], vec![2, 0])?;
        assert!(a.inplace().div(&b).apply().is_err());
        assert!(a.inplace().is_empty());
        Ok(())
    }
}
