use kornia_ndarray::{NdArray, NdArrayError};

use crate::{
    error::NdArrayOpsError,
    inplace::InplaceMath,
    kernels::{ArithmeticKernel, BinaryOp, UnaryKernel, UnaryOp},
};

fn ensure_writeable<T: ArithmeticKernel>(
    array: &NdArray<T>,
    operation: &str,
) -> Result<(), NdArrayOpsError> {
    if !array.is_writeable() {
        return Err(NdArrayError::unsupported_operation(
            operation,
            "the array is a read-only view",
        )
        .into());
    }
    Ok(())
}

pub(crate) fn ensure_same_shape<T: ArithmeticKernel>(
    a: &NdArray<T>,
    b: &NdArray<T>,
) -> Result<(), NdArrayOpsError> {
    if a.shape() != b.shape() {
        return Err(NdArrayOpsError::ShapeMismatch(
            a.shape().to_vec(),
            b.shape().to_vec(),
        ));
    }
    Ok(())
}

/// Clones the left operand of a copying operation into a writeable array.
fn clone_lhs<T: ArithmeticKernel>(a: &NdArray<T>) -> NdArray<T> {
    if a.is_consistent() {
        a.copy()
    } else {
        a.deep_copy()
    }
}

/// Replaces every element of `a` with `f(element)`.
fn map_inplace<T, F>(a: &mut NdArray<T>, operation: &str, mut f: F) -> Result<(), NdArrayOpsError>
where
    T: ArithmeticKernel,
    F: FnMut(T) -> Result<T, NdArrayError>,
{
    ensure_writeable(a, operation)?;
    if a.is_consistent() {
        a.storage().apply(f)?;
        return Ok(());
    }
    let mut raw = a.storage().raw_mut();
    for flat in a.flat_indices() {
        let v = f(T::read(&raw, flat))?;
        T::write(&mut raw, flat, v);
    }
    Ok(())
}

fn zip_strided<T, I, F>(a: &NdArray<T>, rhs: I, f: &mut F) -> Result<(), NdArrayOpsError>
where
    T: ArithmeticKernel,
    I: Iterator<Item = T>,
    F: FnMut(T, T) -> Result<T, NdArrayError>,
{
    let mut raw = a.storage().raw_mut();
    for (flat, b) in a.flat_indices().zip(rhs) {
        let v = f(T::read(&raw, flat), b)?;
        T::write(&mut raw, flat, v);
    }
    Ok(())
}

/// Replaces every element of `a` with `f(element, b[same index])`.
fn zip_inplace<T, F>(
    a: &mut NdArray<T>,
    b: &NdArray<T>,
    operation: &str,
    mut f: F,
) -> Result<(), NdArrayOpsError>
where
    T: ArithmeticKernel,
    F: FnMut(T, T) -> Result<T, NdArrayError>,
{
    ensure_writeable(a, operation)?;
    ensure_same_shape(a, b)?;

    if a.is_consistent() && b.is_consistent() {
        a.storage().zip_apply(b.storage(), f)?;
        return Ok(());
    }
    if a.storage().ptr_eq(b.storage()) {
        // read the whole operand before the first write
        zip_strided(a, b.to_vec().into_iter(), &mut f)
    } else {
        zip_strided(a, b.iter(), &mut f)
    }
}

fn binary_inplace<T: ArithmeticKernel>(
    a: &mut NdArray<T>,
    b: &NdArray<T>,
    op: BinaryOp,
    operation: &str,
) -> Result<(), NdArrayOpsError> {
    zip_inplace(a, b, operation, |x, y| op.apply(x, y))
}

fn binary<T: ArithmeticKernel>(
    a: &NdArray<T>,
    b: &NdArray<T>,
    op: BinaryOp,
    operation: &str,
) -> Result<NdArray<T>, NdArrayOpsError> {
    ensure_same_shape(a, b)?;
    let mut out = clone_lhs(a);
    binary_inplace(&mut out, b, op, operation)?;
    Ok(out)
}

fn scalar<T: ArithmeticKernel>(
    a: &NdArray<T>,
    operation: &str,
    f: impl FnMut(T) -> Result<T, NdArrayError>,
) -> Result<NdArray<T>, NdArrayOpsError> {
    let mut out = clone_lhs(a);
    map_inplace(&mut out, operation, f)?;
    Ok(out)
}

/// Element-wise sum of two arrays of the same shape.
///
/// # Errors
///
/// Returns [`NdArrayOpsError::ShapeMismatch`] if the shapes differ.
///
/// # Example
///
/// ```
/// use kornia_ndarray::NdArray;
/// use kornia_ndarray_ops::ops::add;
///
/// let a = NdArray::<i32>::from_shape_vec(&[3], vec![1, 2, 3]).unwrap();
/// let b = NdArray::<i32>::from_shape_vec(&[3], vec![10, 20, 30]).unwrap();
/// assert_eq!(add(&a, &b).unwrap().to_vec(), vec![11, 22, 33]);
/// ```
pub fn add<T: ArithmeticKernel>(
    a: &NdArray<T>,
    b: &NdArray<T>,
) -> Result<NdArray<T>, NdArrayOpsError> {
    binary(a, b, BinaryOp::Add, "add")
}

/// Element-wise difference `a - b`.
pub fn sub<T: ArithmeticKernel>(
    a: &NdArray<T>,
    b: &NdArray<T>,
) -> Result<NdArray<T>, NdArrayOpsError> {
    binary(a, b, BinaryOp::Sub, "sub")
}

/// Element-wise product.
pub fn mul<T: ArithmeticKernel>(
    a: &NdArray<T>,
    b: &NdArray<T>,
) -> Result<NdArray<T>, NdArrayOpsError> {
    binary(a, b, BinaryOp::Mul, "mul")
}

/// Element-wise quotient `a / b`.
///
/// # Errors
///
/// * [`NdArrayOpsError::ShapeMismatch`] if the shapes differ.
/// * [`NdArrayError::Arithmetic`] for an integer division by zero or a
///   degenerate complex divisor.
pub fn div<T: ArithmeticKernel>(
    a: &NdArray<T>,
    b: &NdArray<T>,
) -> Result<NdArray<T>, NdArrayOpsError> {
    binary(a, b, BinaryOp::Div, "div")
}

/// Adds `b` to `a` in place.
///
/// # Errors
///
/// * [`NdArrayError::UnsupportedOperation`] if `a` is read-only.
/// * [`NdArrayOpsError::ShapeMismatch`] if the shapes differ.
pub fn add_inplace<T: ArithmeticKernel>(
    a: &mut NdArray<T>,
    b: &NdArray<T>,
) -> Result<(), NdArrayOpsError> {
    binary_inplace(a, b, BinaryOp::Add, "add_inplace")
}

/// Subtracts `b` from `a` in place.
pub fn sub_inplace<T: ArithmeticKernel>(
    a: &mut NdArray<T>,
    b: &NdArray<T>,
) -> Result<(), NdArrayOpsError> {
    binary_inplace(a, b, BinaryOp::Sub, "sub_inplace")
}

/// Multiplies `a` by `b` in place.
pub fn mul_inplace<T: ArithmeticKernel>(
    a: &mut NdArray<T>,
    b: &NdArray<T>,
) -> Result<(), NdArrayOpsError> {
    binary_inplace(a, b, BinaryOp::Mul, "mul_inplace")
}

/// Divides `a` by `b` in place.
///
/// Elements before a failing division have already been written.
pub fn div_inplace<T: ArithmeticKernel>(
    a: &mut NdArray<T>,
    b: &NdArray<T>,
) -> Result<(), NdArrayOpsError> {
    binary_inplace(a, b, BinaryOp::Div, "div_inplace")
}

/// Adds `s` to every element.
pub fn add_scalar<T: ArithmeticKernel>(a: &NdArray<T>, s: T) -> Result<NdArray<T>, NdArrayOpsError> {
    scalar(a, "add_scalar", |x| Ok(T::plus(x, s)))
}

/// Subtracts `s` from every element.
pub fn sub_scalar<T: ArithmeticKernel>(a: &NdArray<T>, s: T) -> Result<NdArray<T>, NdArrayOpsError> {
    scalar(a, "sub_scalar", |x| Ok(T::minus(x, s)))
}

/// Computes `s - element` for every element.
///
/// # Example
///
/// ```
/// use kornia_ndarray::NdArray;
/// use kornia_ndarray_ops::ops::rsub_scalar;
///
/// let a = NdArray::<i64>::from_shape_vec(&[3], vec![1, 2, 3]).unwrap();
/// assert_eq!(rsub_scalar(&a, 10).unwrap().to_vec(), vec![9, 8, 7]);
/// ```
pub fn rsub_scalar<T: ArithmeticKernel>(
    a: &NdArray<T>,
    s: T,
) -> Result<NdArray<T>, NdArrayOpsError> {
    scalar(a, "rsub_scalar", |x| Ok(T::minus(s, x)))
}

/// Multiplies every element by `s`.
pub fn mul_scalar<T: ArithmeticKernel>(a: &NdArray<T>, s: T) -> Result<NdArray<T>, NdArrayOpsError> {
    scalar(a, "mul_scalar", |x| Ok(T::times(x, s)))
}

/// Divides every element by `s`.
pub fn div_scalar<T: ArithmeticKernel>(a: &NdArray<T>, s: T) -> Result<NdArray<T>, NdArrayOpsError> {
    scalar(a, "div_scalar", |x| T::divide(x, s))
}

/// Computes `s / element` for every element.
pub fn rdiv_scalar<T: ArithmeticKernel>(
    a: &NdArray<T>,
    s: T,
) -> Result<NdArray<T>, NdArrayOpsError> {
    scalar(a, "rdiv_scalar", |x| T::divide(s, x))
}

/// Applies `op` with the scalar `s` as right operand to every element in place.
pub fn scalar_inplace<T: ArithmeticKernel>(
    a: &mut NdArray<T>,
    op: BinaryOp,
    s: T,
) -> Result<(), NdArrayOpsError> {
    map_inplace(a, "scalar_inplace", |x| op.apply(x, s))
}

/// Applies a unary operation to every element in place.
///
/// # Errors
///
/// * [`NdArrayError::UnsupportedOperation`] if `a` is read-only or the
///   element kind does not support `op`.
pub fn unary_inplace<T>(a: &mut NdArray<T>, op: UnaryOp) -> Result<(), NdArrayOpsError>
where
    T: ArithmeticKernel + UnaryKernel,
{
    if !T::supports(op) {
        return Err(NdArrayError::unsupported_operation(
            format!("{op:?}"),
            format!("not defined for {} elements", a.dtype()),
        )
        .into());
    }
    map_inplace(a, "unary_inplace", |x| T::unary(op, x))
}

fn check_range<T: PartialOrd + std::fmt::Display>(min: T, max: T) -> Result<(), NdArrayOpsError> {
    if !(min <= max) {
        return Err(NdArrayOpsError::InvalidArgument(format!(
            "clamp range is empty: min {min} > max {max}"
        )));
    }
    Ok(())
}

/// Limits every element to `[min, max]`.
///
/// # Errors
///
/// Returns [`NdArrayOpsError::InvalidArgument`] if `min > max`.
pub fn clamp<T>(a: &NdArray<T>, min: T, max: T) -> Result<NdArray<T>, NdArrayOpsError>
where
    T: ArithmeticKernel + PartialOrd,
{
    check_range(min, max)?;
    let mut out = clone_lhs(a);
    clamp_inplace(&mut out, min, max)?;
    Ok(out)
}

/// Limits every element of `a` to `[min, max]` in place.
pub fn clamp_inplace<T>(a: &mut NdArray<T>, min: T, max: T) -> Result<(), NdArrayOpsError>
where
    T: ArithmeticKernel + PartialOrd,
{
    check_range(min, max)?;
    map_inplace(a, "clamp_inplace", |x| {
        Ok(if x < min {
            min
        } else if x > max {
            max
        } else {
            x
        })
    })
}

/// Element-wise arithmetic as methods of [`NdArray`].
pub trait NdArrayOps<T: ArithmeticKernel + UnaryKernel> {
    /// See [`add`].
    fn add(&self, other: &NdArray<T>) -> Result<NdArray<T>, NdArrayOpsError>;

    /// See [`sub`].
    fn sub(&self, other: &NdArray<T>) -> Result<NdArray<T>, NdArrayOpsError>;

    /// See [`mul`].
    fn mul(&self, other: &NdArray<T>) -> Result<NdArray<T>, NdArrayOpsError>;

    /// See [`div`].
    fn div(&self, other: &NdArray<T>) -> Result<NdArray<T>, NdArrayOpsError>;

    /// See [`add_inplace`].
    fn add_inplace(&mut self, other: &NdArray<T>) -> Result<(), NdArrayOpsError>;

    /// See [`sub_inplace`].
    fn sub_inplace(&mut self, other: &NdArray<T>) -> Result<(), NdArrayOpsError>;

    /// See [`mul_inplace`].
    fn mul_inplace(&mut self, other: &NdArray<T>) -> Result<(), NdArrayOpsError>;

    /// See [`div_inplace`].
    fn div_inplace(&mut self, other: &NdArray<T>) -> Result<(), NdArrayOpsError>;

    /// See [`add_scalar`].
    fn add_scalar(&self, s: T) -> Result<NdArray<T>, NdArrayOpsError>;

    /// See [`sub_scalar`].
    fn sub_scalar(&self, s: T) -> Result<NdArray<T>, NdArrayOpsError>;

    /// See [`rsub_scalar`].
    fn rsub_scalar(&self, s: T) -> Result<NdArray<T>, NdArrayOpsError>;

    /// See [`mul_scalar`].
    fn mul_scalar(&self, s: T) -> Result<NdArray<T>, NdArrayOpsError>;

    /// See [`div_scalar`].
    fn div_scalar(&self, s: T) -> Result<NdArray<T>, NdArrayOpsError>;

    /// See [`rdiv_scalar`].
    fn rdiv_scalar(&self, s: T) -> Result<NdArray<T>, NdArrayOpsError>;

    /// Starts a batched in-place operation chain on `self`.
    fn inplace(&mut self) -> InplaceMath<'_, T>;
}

impl<T: ArithmeticKernel + UnaryKernel> NdArrayOps<T> for NdArray<T> {
    fn add(&self, other: &NdArray<T>) -> Result<NdArray<T>, NdArrayOpsError> {
        add(self, other)
    }

    fn sub(&self, other: &NdArray<T>) -> Result<NdArray<T>, NdArrayOpsError> {
        sub(self, other)
    }

    fn mul(&self, other: &NdArray<T>) -> Result<NdArray<T>, NdArrayOpsError> {
        mul(self, other)
    }

    fn div(&self, other: &NdArray<T>) -> Result<NdArray<T>, NdArrayOpsError> {
        div(self, other)
    }

    fn add_inplace(&mut self, other: &NdArray<T>) -> Result<(), NdArrayOpsError> {
        add_inplace(self, other)
    }

    fn sub_inplace(&mut self, other: &NdArray<T>) -> Result<(), NdArrayOpsError> {
        sub_inplace(self, other)
    }

    fn mul_inplace(&mut self, other: &NdArray<T>) -> Result<(), NdArrayOpsError> {
        mul_inplace(self, other)
    }

    fn div_inplace(&mut self, other: &NdArray<T>) -> Result<(), NdArrayOpsError> {
        div_inplace(self, other)
    }

    fn add_scalar(&self, s: T) -> Result<NdArray<T>, NdArrayOpsError> {
        add_scalar(self, s)
    }

    fn sub_scalar(&self, s: T) -> Result<NdArray<T>, NdArrayOpsError> {
        sub_scalar(self, s)
    }

    fn rsub_scalar(&self, s: T) -> Result<NdArray<T>, NdArrayOpsError> {
        rsub_scalar(self, s)
    }

    fn mul_scalar(&self, s: T) -> Result<NdArray<T>, NdArrayOpsError> {
        mul_scalar(self, s)
    }

    fn div_scalar(&self, s: T) -> Result<NdArray<T>, NdArrayOpsError> {
        div_scalar(self, s)
    }

    fn rdiv_scalar(&self, s: T) -> Result<NdArray<T>, NdArrayOpsError> {
        rdiv_scalar(self, s)
    }

    fn inplace(&mut self) -> InplaceMath<'_, T> {
        InplaceMath::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use kornia_ndarray::{Complex64, Slice};

    #[test]
    fn add_example() -> Result<(), NdArrayOpsError> {
        let a = NdArray::<i32>::from_shape_vec(&[3], vec![1, 2, 3])?;
        let b = NdArray::<i32>::from_shape_vec(&[3], vec![10, 20, 30])?;
        let c = add(&a, &b)?;
        assert_eq!(c.to_vec(), vec![11, 22, 33]);
        assert_eq!(a.to_vec(), vec![1, 2, 3]);
        assert!(!c.storage().ptr_eq(a.storage()));
        Ok(())
    }

    #[test]
    fn rsub_example() -> Result<(), NdArrayOpsError> {
        let a = NdArray::<i8>::from_shape_vec(&[3], vec![1, 2, 3])?;
        assert_eq!(rsub_scalar(&a, 10)?.to_vec(), vec![9, 8, 7]);
        assert_eq!(sub_scalar(&a, 10)?.to_vec(), vec![-9, -8, -7]);
        Ok(())
    }

    #[test]
    fn div_example() -> Result<(), NdArrayOpsError> {
        let a = NdArray::<f64>::from_shape_vec(&[3], vec![10.0, 20.0, 30.0])?;
        let b = NdArray::<f64>::from_shape_vec(&[3], vec![2.0, 4.0, 5.0])?;
        let c = div(&a, &b)?;
        assert_eq!(c.to_vec(), vec![5.0, 5.0, 6.0]);
        Ok(())
    }

    #[test]
    fn shape_mismatch_before_write() -> Result<(), NdArrayOpsError> {
        let mut a = NdArray::<f32>::zeros(&[2, 2])?;
        let b = NdArray::<f32>::ones(&[4])?;
        assert_eq!(
            add(&a, &b).map(|_| ()),
            Err(NdArrayOpsError::ShapeMismatch(vec![2, 2], vec![4]))
        );
        assert!(add_inplace(&mut a, &b).is_err());
        assert_eq!(a.to_vec(), vec![0.0; 4]);
        Ok(())
    }

    #[test]
    fn integer_division_by_zero() -> Result<(), NdArrayOpsError> {
        let a = NdArray::<i32>::from_shape_vec(&[2], vec![4, 6])?;
        let b = NdArray::<i32>::from_shape_vec(&[2], vec![2, 0])?;
        assert!(matches!(
            div(&a, &b),
            Err(NdArrayOpsError::NdArrayError(NdArrayError::Arithmetic(_)))
        ));
        assert_eq!(a.to_vec(), vec![4, 6]);
        assert!(div_scalar(&a, 0).is_err());
        assert_eq!(rdiv_scalar(&a, 12)?.to_vec(), vec![3, 2]);
        Ok(())
    }

    #[test]
    fn strided_operands() -> Result<(), NdArrayOpsError> {
        let a = NdArray::<i64>::from_shape_vec(&[2, 3], vec![1, 2, 3, 4, 5, 6])?;
        let t = a.transpose(&[])?;
        let b = NdArray::<i64>::from_shape_vec(&[3, 2], vec![10, 40, 20, 50, 30, 60])?;
        let c = mul(&t, &b)?;
        assert!(c.is_consistent());
        assert_eq!(c.to_vec(), vec![10, 160, 40, 250, 90, 360]);
        Ok(())
    }

    #[test]
    fn inplace_through_view() -> Result<(), NdArrayOpsError> {
        let a = NdArray::<f32>::from_shape_vec(&[2, 3], vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0])?;
        let mut col = a.slice(Slice::new(1, 1, 1)?, 1)?;
        let ones = NdArray::<f32>::ones(&[2, 1])?;
        add_inplace(&mut col, &ones)?;
        assert_eq!(a.to_vec(), vec![1.0, 3.0, 3.0, 4.0, 6.0, 6.0]);
        Ok(())
    }

    #[test]
    fn inplace_rejects_read_only() -> Result<(), NdArrayOpsError> {
        let a = NdArray::<i32>::zeros(&[2, 2])?;
        let mut row = a.view(0, 0)?;
        let b = NdArray::<i32>::ones(&[2])?;
        assert!(matches!(
            add_inplace(&mut row, &b),
            Err(NdArrayOpsError::NdArrayError(
                NdArrayError::UnsupportedOperation { .. }
            ))
        ));
        let c = add(&row, &b)?;
        assert_eq!(c.to_vec(), vec![1, 1]);
        Ok(())
    }

    #[test]
    fn aliased_operands() -> Result<(), NdArrayOpsError> {
        let mut a = NdArray::<i32>::from_shape_vec(&[2, 2], vec![1, 2, 3, 4])?;
        let t = a.transpose(&[])?;
        add_inplace(&mut a, &t)?;
        assert_eq!(a.to_vec(), vec![2, 5, 5, 8]);

        let same = a.clone();
        mul_inplace(&mut a, &same)?;
        assert_eq!(a.to_vec(), vec![4, 25, 25, 64]);
        Ok(())
    }

    #[test]
    fn complex_arithmetic() -> Result<(), NdArrayOpsError> {
        let a = NdArray::<Complex64>::from_shape_vec(
            &[2],
            vec![Complex64::new(1.0, 2.0), Complex64::new(3.0, 4.0)],
        )?;
        let b = NdArray::<Complex64>::full(&[2], Complex64::new(0.0, 1.0))?;
        let p = mul(&a, &b)?;
        assert_eq!(
            p.to_vec(),
            vec![Complex64::new(-2.0, 1.0), Complex64::new(-4.0, 3.0)]
        );
        let q = div(&p, &b)?;
        for (x, y) in q.iter().zip(a.iter()) {
            assert_relative_eq!(x.re, y.re, epsilon = 1e-12);
            assert_relative_eq!(x.im, y.im, epsilon = 1e-12);
        }
        let zero = NdArray::<Complex64>::zeros(&[2])?;
        assert!(div(&a, &zero).is_err());
        Ok(())
    }

    #[test]
    fn clamp_range() -> Result<(), NdArrayOpsError> {
        let a = NdArray::<f64>::from_shape_vec(&[4], vec![-2.0, 0.5, 1.5, 3.0])?;
        assert_eq!(clamp(&a, 0.0, 1.0)?.to_vec(), vec![0.0, 0.5, 1.0, 1.0]);
        assert!(matches!(
            clamp(&a, 1.0, 0.0),
            Err(NdArrayOpsError::InvalidArgument(_))
        ));
        let mut b = NdArray::<i16>::from_shape_vec(&[3], vec![-5, 5, 50])?;
        clamp_inplace(&mut b, 0, 10)?;
        assert_eq!(b.to_vec(), vec![0, 5, 10]);
        Ok(())
    }

    #[test]
    fn unary_runtime_check() -> Result<(), NdArrayOpsError> {
        let mut a = NdArray::<i32>::from_shape_vec(&[2], vec![-3, 4])?;
        unary_inplace(&mut a, UnaryOp::Abs)?;
        assert_eq!(a.to_vec(), vec![3, 4]);
        assert!(unary_inplace(&mut a, UnaryOp::Sin).is_err());
        Ok(())
    }

    #[test]
    fn trait_methods() -> Result<(), NdArrayOpsError> {
        let a = NdArray::<f32>::from_shape_vec(&[2], vec![1.0, 2.0])?;
        let b = NdArrayOps::add_scalar(&a, 1.0)?;
        assert_eq!(b.to_vec(), vec![2.0, 3.0]);
        assert_eq!(NdArrayOps::mul(&a, &b)?.to_vec(), vec![2.0, 6.0]);
        assert_eq!(a.rdiv_scalar(4.0)?.to_vec(), vec![4.0, 2.0]);
        Ok(())
    }
}
