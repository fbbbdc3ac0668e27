use kornia_ndarray::{Complex32, Complex64, Element, NdArrayError};
use num_complex::Complex;
use num_traits::Float;

/// Per-kind scalar arithmetic.
///
/// Integer kinds wrap on overflow; `i8` and `i16` are widened to `i32`,
/// computed and narrowed back. Floating kinds follow IEEE 754. Complex
/// division uses Smith's algorithm.
pub trait ArithmeticKernel: Element {
    /// `a + b`
    fn plus(a: Self, b: Self) -> Self;

    /// `a - b`
    fn minus(a: Self, b: Self) -> Self;

    /// `a * b`
    fn times(a: Self, b: Self) -> Self;

    /// `a / b`
    ///
    /// # Errors
    ///
    /// Returns [`NdArrayError::Arithmetic`] for an integer division by zero,
    /// or a complex division by zero or with a non-finite denominator.
    fn divide(a: Self, b: Self) -> Result<Self, NdArrayError>;
}

macro_rules! impl_narrow_int_kernel {
    ($ty:ty) => {
        impl ArithmeticKernel for $ty {
            #[inline]
            fn plus(a: Self, b: Self) -> Self {
                (a as i32).wrapping_add(b as i32) as $ty
            }

            #[inline]
            fn minus(a: Self, b: Self) -> Self {
                (a as i32).wrapping_sub(b as i32) as $ty
            }

            #[inline]
            fn times(a: Self, b: Self) -> Self {
                (a as i32).wrapping_mul(b as i32) as $ty
            }

            #[inline]
            fn divide(a: Self, b: Self) -> Result<Self, NdArrayError> {
                if b == 0 {
                    return Err(NdArrayError::arithmetic("integer division by zero"));
                }
                Ok((a as i32).wrapping_div(b as i32) as $ty)
            }
        }
    };
}

macro_rules! impl_wide_int_kernel {
    ($ty:ty) => {
        impl ArithmeticKernel for $ty {
            #[inline]
            fn plus(a: Self, b: Self) -> Self {
                a.wrapping_add(b)
            }

            #[inline]
            fn minus(a: Self, b: Self) -> Self {
                a.wrapping_sub(b)
            }

            #[inline]
            fn times(a: Self, b: Self) -> Self {
                a.wrapping_mul(b)
            }

            #[inline]
            fn divide(a: Self, b: Self) -> Result<Self, NdArrayError> {
                if b == 0 {
                    return Err(NdArrayError::arithmetic("integer division by zero"));
                }
                Ok(a.wrapping_div(b))
            }
        }
    };
}

macro_rules! impl_float_kernel {
    ($ty:ty) => {
        impl ArithmeticKernel for $ty {
            #[inline]
            fn plus(a: Self, b: Self) -> Self {
                a + b
            }

            #[inline]
            fn minus(a: Self, b: Self) -> Self {
                a - b
            }

            #[inline]
            fn times(a: Self, b: Self) -> Self {
                a * b
            }

            #[inline]
            fn divide(a: Self, b: Self) -> Result<Self, NdArrayError> {
                Ok(a / b)
            }
        }
    };
}

macro_rules! impl_complex_kernel {
    ($ty:ty) => {
        impl ArithmeticKernel for $ty {
            #[inline]
            fn plus(a: Self, b: Self) -> Self {
                a + b
            }

            #[inline]
            fn minus(a: Self, b: Self) -> Self {
                a - b
            }

            #[inline]
            fn times(a: Self, b: Self) -> Self {
                a * b
            }

            #[inline]
            fn divide(a: Self, b: Self) -> Result<Self, NdArrayError> {
                complex_divide(a, b)
            }
        }
    };
}

impl_narrow_int_kernel!(i8);
impl_narrow_int_kernel!(i16);
impl_wide_int_kernel!(i32);
impl_wide_int_kernel!(i64);
impl_float_kernel!(f32);
impl_float_kernel!(f64);
impl_complex_kernel!(Complex32);
impl_complex_kernel!(Complex64);

/// Divides two complex numbers with Smith's algorithm.
///
/// The ratio is taken against the larger component of the divisor so the
/// denominator never squares a large magnitude.
///
/// # Errors
///
/// Returns [`NdArrayError::Arithmetic`] if the divisor is zero or the
/// denominator is not finite.
pub fn complex_divide<F: Float>(a: Complex<F>, b: Complex<F>) -> Result<Complex<F>, NdArrayError> {
    if b.re.is_zero() && b.im.is_zero() {
        return Err(NdArrayError::arithmetic("complex division by zero"));
    }
    let (re, im, den) = if b.re.abs() >= b.im.abs() {
        let r = b.im / b.re;
        let den = b.re + b.im * r;
        (a.re + a.im * r, a.im - a.re * r, den)
    } else {
        let r = b.re / b.im;
        let den = b.im + b.re * r;
        (a.re * r + a.im, a.im * r - a.re, den)
    };
    if !den.is_finite() || den.is_zero() {
        return Err(NdArrayError::arithmetic(
            "complex division with a non-finite denominator",
        ));
    }
    Ok(Complex::new(re / den, im / den))
}

/// Binary element-wise operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    /// Addition.
    Add,
    /// Subtraction.
    Sub,
    /// Multiplication.
    Mul,
    /// Division.
    Div,
}

impl BinaryOp {
    /// Applies the operation to `a` and `b` with the kernel of `T`.
    #[inline]
    pub fn apply<T: ArithmeticKernel>(self, a: T, b: T) -> Result<T, NdArrayError> {
        match self {
            Self::Add => Ok(T::plus(a, b)),
            Self::Sub => Ok(T::minus(a, b)),
            Self::Mul => Ok(T::times(a, b)),
            Self::Div => T::divide(a, b),
        }
    }
}

/// Unary element-wise operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    /// Sine.
    Sin,
    /// Cosine.
    Cos,
    /// Tangent.
    Tan,
    /// Natural logarithm.
    Log,
    /// Exponential.
    Exp,
    /// Square root.
    Sqrt,
    /// Round towards positive infinity.
    Ceil,
    /// Round towards negative infinity.
    Floor,
    /// Absolute value.
    Abs,
}

/// Unary math for an element kind.
///
/// Floating kinds support every [`UnaryOp`], integer kinds only
/// [`UnaryOp::Abs`] and complex kinds none.
pub trait UnaryKernel: Element {
    /// Returns true if the kind supports `op`.
    fn supports(op: UnaryOp) -> bool;

    /// Applies `op` to `x`.
    ///
    /// # Errors
    ///
    /// Returns [`NdArrayError::UnsupportedOperation`] if the kind does not support `op`.
    fn unary(op: UnaryOp, x: Self) -> Result<Self, NdArrayError>;
}

/// Kinds supporting every [`UnaryOp`].
pub trait FloatKernel: UnaryKernel + ArithmeticKernel + Float {}

/// Kinds supporting [`UnaryOp::Abs`].
pub trait AbsKernel: UnaryKernel + ArithmeticKernel {}

fn unsupported<T: Element>(op: UnaryOp) -> NdArrayError {
    NdArrayError::unsupported_operation(
        format!("{op:?}"),
        format!("not defined for {} elements", T::DTYPE),
    )
}

macro_rules! impl_float_unary {
    ($ty:ty) => {
        impl UnaryKernel for $ty {
            fn supports(_op: UnaryOp) -> bool {
                true
            }

            #[inline]
            fn unary(op: UnaryOp, x: Self) -> Result<Self, NdArrayError> {
                Ok(match op {
                    UnaryOp::Sin => x.sin(),
                    UnaryOp::Cos => x.cos(),
                    UnaryOp::Tan => x.tan(),
                    UnaryOp::Log => x.ln(),
                    UnaryOp::Exp => x.exp(),
                    UnaryOp::Sqrt => x.sqrt(),
                    UnaryOp::Ceil => x.ceil(),
                    UnaryOp::Floor => x.floor(),
                    UnaryOp::Abs => x.abs(),
                })
            }
        }

        impl FloatKernel for $ty {}
        impl AbsKernel for $ty {}
    };
}

macro_rules! impl_int_unary {
    ($ty:ty) => {
        impl UnaryKernel for $ty {
            fn supports(op: UnaryOp) -> bool {
                op == UnaryOp::Abs
            }

            #[inline]
            fn unary(op: UnaryOp, x: Self) -> Result<Self, NdArrayError> {
                match op {
                    UnaryOp::Abs => Ok(x.wrapping_abs()),
                    _ => Err(unsupported::<Self>(op)),
                }
            }
        }

        impl AbsKernel for $ty {}
    };
}

macro_rules! impl_complex_unary {
    ($ty:ty) => {
        impl UnaryKernel for $ty {
            fn supports(_op: UnaryOp) -> bool {
                false
            }

            fn unary(op: UnaryOp, _x: Self) -> Result<Self, NdArrayError> {
                Err(unsupported::<Self>(op))
            }
        }
    };
}

impl_int_unary!(i8);
impl_int_unary!(i16);
impl_int_unary!(i32);
impl_int_unary!(i64);
impl_float_unary!(f32);
impl_float_unary!(f64);
impl_complex_unary!(Complex32);
impl_complex_unary!(Complex64);
