//! Primitive element kinds and their lane representation.

use num_complex::{Complex32, Complex64};

use crate::{dtype::DType, dyn_array::DynArray, NdArray};

mod private {
    pub trait Sealed {}
}

/// A primitive element kind that can be stored in an [`NdArray`].
///
/// The trait is sealed: the set of element kinds is closed and every kind maps
/// to exactly one [`DType`]. Real kinds occupy one lane of their own type,
/// complex kinds occupy two interleaved lanes of their component type.
pub trait Element:
    private::Sealed
    + Copy
    + PartialEq
    + std::fmt::Debug
    + std::fmt::Display
    + num_traits::Zero
    + num_traits::One
    + 'static
{
    /// The lane type of the backing buffer.
    type Raw: Copy + Default + PartialEq + std::fmt::Debug + 'static;

    /// The element kind tag.
    const DTYPE: DType;

    /// Number of raw lanes per logical element.
    const LANES: usize;

    /// Reads the logical element at `index` from a lane buffer.
    fn read(raw: &[Self::Raw], index: usize) -> Self;

    /// Writes the logical element at `index` into a lane buffer.
    fn write(raw: &mut [Self::Raw], index: usize, value: Self);

    /// Wraps a typed array into the dtype-erased [`DynArray`].
    fn into_dyn(array: NdArray<Self>) -> DynArray;

    /// Borrows the typed array out of a [`DynArray`] of the same kind.
    fn from_dyn(array: &DynArray) -> Option<&NdArray<Self>>;

    /// Mutably borrows the typed array out of a [`DynArray`] of the same kind.
    fn from_dyn_mut(array: &mut DynArray) -> Option<&mut NdArray<Self>>;
}

macro_rules! impl_real_element {
    ($ty:ty, $dtype:ident) => {
        impl private::Sealed for $ty {}

        impl Element for $ty {
            type Raw = $ty;
            const DTYPE: DType = DType::$dtype;
            const LANES: usize = 1;

            #[inline]
            fn read(raw: &[Self::Raw], index: usize) -> Self {
                raw[index]
            }

            #[inline]
            fn write(raw: &mut [Self::Raw], index: usize, value: Self) {
                raw[index] = value;
            }

            fn into_dyn(array: NdArray<Self>) -> DynArray {
                DynArray::$dtype(array)
            }

            fn from_dyn(array: &DynArray) -> Option<&NdArray<Self>> {
                match array {
                    DynArray::$dtype(a) => Some(a),
                    _ => None,
                }
            }

            fn from_dyn_mut(array: &mut DynArray) -> Option<&mut NdArray<Self>> {
                match array {
                    DynArray::$dtype(a) => Some(a),
                    _ => None,
                }
            }
        }
    };
}

macro_rules! impl_complex_element {
    ($ty:ty, $lane:ty, $dtype:ident) => {
        impl private::Sealed for $ty {}

        impl Element for $ty {
            type Raw = $lane;
            const DTYPE: DType = DType::$dtype;
            const LANES: usize = 2;

            #[inline]
            fn read(raw: &[Self::Raw], index: usize) -> Self {
                <$ty>::new(raw[2 * index], raw[2 * index + 1])
            }

            #[inline]
            fn write(raw: &mut [Self::Raw], index: usize, value: Self) {
                raw[2 * index] = value.re;
                raw[2 * index + 1] = value.im;
            }

            fn into_dyn(array: NdArray<Self>) -> DynArray {
                DynArray::$dtype(array)
            }

            fn from_dyn(array: &DynArray) -> Option<&NdArray<Self>> {
                match array {
                    DynArray::$dtype(a) => Some(a),
                    _ => None,
                }
            }

            fn from_dyn_mut(array: &mut DynArray) -> Option<&mut NdArray<Self>> {
                match array {
                    DynArray::$dtype(a) => Some(a),
                    _ => None,
                }
            }
        }
    };
}

impl_real_element!(i8, Int8);
impl_real_element!(i16, Int16);
impl_real_element!(i32, Int32);
impl_real_element!(i64, Int64);
impl_real_element!(f32, Float32);
impl_real_element!(f64, Float64);
impl_complex_element!(Complex32, f32, Complex32);
impl_complex_element!(Complex64, f64, Complex64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complex_lanes_interleave() {
        let mut raw = vec![0.0f64; 4];
        Complex64::write(&mut raw, 1, Complex64::new(3.0, -4.0));
        assert_eq!(raw, vec![0.0, 0.0, 3.0, -4.0]);
        assert_eq!(Complex64::read(&raw, 1), Complex64::new(3.0, -4.0));
    }

    #[test]
    fn test_dtype_mapping() {
        assert_eq!(<i8 as Element>::DTYPE, DType::Int8);
        assert_eq!(<f64 as Element>::DTYPE, DType::Float64);
        assert_eq!(<Complex32 as Element>::DTYPE, DType::Complex32);
        assert_eq!(<Complex32 as Element>::LANES, 2);
        assert_eq!(<i64 as Element>::LANES, 1);
    }
}
