use num_complex::{Complex32, Complex64};

use crate::{dtype::DType, element::Element, NdArray};

/// An array whose element kind is only known at runtime.
///
/// Each variant wraps the typed array of one [`DType`]. Use
/// [`DynArray::as_typed`] to get the typed array back.
#[derive(Clone, Debug)]
pub enum DynArray {
    /// `i8` elements.
    Int8(NdArray<i8>),
    /// `i16` elements.
    Int16(NdArray<i16>),
    /// `i32` elements.
    Int32(NdArray<i32>),
    /// `i64` elements.
    Int64(NdArray<i64>),
    /// `f32` elements.
    Float32(NdArray<f32>),
    /// `f64` elements.
    Float64(NdArray<f64>),
    /// Complex elements with `f32` lanes.
    Complex32(NdArray<Complex32>),
    /// Complex elements with `f64` lanes.
    Complex64(NdArray<Complex64>),
}

/// Runs `$body` with `$a` bound to the typed array of any variant.
#[macro_export]
macro_rules! dispatch_dyn {
    ($value:expr, $a:ident => $body:expr) => {
        match $value {
            $crate::DynArray::Int8($a) => $body,
            $crate::DynArray::Int16($a) => $body,
            $crate::DynArray::Int32($a) => $body,
            $crate::DynArray::Int64($a) => $body,
            $crate::DynArray::Float32($a) => $body,
            $crate::DynArray::Float64($a) => $body,
            $crate::DynArray::Complex32($a) => $body,
            $crate::DynArray::Complex64($a) => $body,
        }
    };
}

impl DynArray {
    /// Returns the element kind.
    pub fn dtype(&self) -> DType {
        dispatch_dyn!(self, a => a.dtype())
    }

    /// Returns the shape.
    pub fn shape(&self) -> &[usize] {
        dispatch_dyn!(self, a => a.shape())
    }

    /// Returns the strides.
    pub fn strides(&self) -> &[isize] {
        dispatch_dyn!(self, a => a.strides())
    }

    /// Returns the number of elements.
    pub fn size(&self) -> usize {
        dispatch_dyn!(self, a => a.size())
    }

    /// Returns true for dense row-major arrays starting at offset 0.
    pub fn is_consistent(&self) -> bool {
        dispatch_dyn!(self, a => a.is_consistent())
    }

    /// Borrows the typed array if the element kind is `T`.
    ///
    /// # Example
    ///
    /// ```
    /// use kornia_ndarray::{DynArray, NdArray};
    ///
    /// let d: DynArray = NdArray::<i16>::zeros(&[2]).unwrap().into();
    /// assert!(d.as_typed::<i16>().is_some());
    /// assert!(d.as_typed::<f32>().is_none());
    /// ```
    pub fn as_typed<T: Element>(&self) -> Option<&NdArray<T>> {
        T::from_dyn(self)
    }

    /// Mutably borrows the typed array if the element kind is `T`.
    pub fn as_typed_mut<T: Element>(&mut self) -> Option<&mut NdArray<T>> {
        T::from_dyn_mut(self)
    }
}

impl<T: Element> From<NdArray<T>> for DynArray {
    fn from(array: NdArray<T>) -> Self {
        T::into_dyn(array)
    }
}

impl PartialEq for DynArray {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Int8(a), Self::Int8(b)) => a == b,
            (Self::Int16(a), Self::Int16(b)) => a == b,
            (Self::Int32(a), Self::Int32(b)) => a == b,
            (Self::Int64(a), Self::Int64(b)) => a == b,
            (Self::Float32(a), Self::Float32(b)) => a == b,
            (Self::Float64(a), Self::Float64(b)) => a == b,
            (Self::Complex32(a), Self::Complex32(b)) => a == b,
            (Self::Complex64(a), Self::Complex64(b)) => a == b,
            _ => false,
        }
    }
}

impl std::fmt::Display for DynArray {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        dispatch_dyn!(self, a => write!(f, "{a}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NdArrayError;

    #[test]
    fn dyn_roundtrip_typed() -> Result<(), NdArrayError> {
        let a = NdArray::<f64>::from_shape_vec(&[2], vec![1.0, 2.0])?;
        let mut d = a.clone().into_dyn();
        assert_eq!(d.dtype(), DType::Float64);
        assert_eq!(d.shape(), &[2]);
        assert_eq!(d.as_typed::<f64>(), Some(&a));

        if let Some(t) = d.as_typed_mut::<f64>() {
            t.set1(0, 5.0)?;
        }
        assert_eq!(a.get1(0)?, 5.0);
        Ok(())
    }

    #[test]
    fn dyn_equality_compares_dtype() -> Result<(), NdArrayError> {
        let a: DynArray = NdArray::<i32>::from_shape_vec(&[2], vec![1, 2])?.into();
        let b: DynArray = NdArray::<i64>::from_shape_vec(&[2], vec![1, 2])?.into();
        let c: DynArray = NdArray::<i32>::from_shape_vec(&[2], vec![1, 2])?.into();
        assert_ne!(a, b);
        assert_eq!(a, c);
        assert_eq!(a.to_string(), "[1, 2]");
        Ok(())
    }
}
