//! Row-major traversal of strided arrays.

use std::ops::Range;

use crate::{
    element::Element,
    storage::{Storage, StorageIter},
    NdArray,
};

/// Odometer over the storage positions of a strided layout.
#[derive(Clone, Debug)]
pub struct Odometer<'a> {
    shape: &'a [usize],
    strides: &'a [isize],
    counter: Vec<usize>,
    current: isize,
    remaining: usize,
}

impl<'a> Odometer<'a> {
    fn new(offset: usize, shape: &'a [usize], strides: &'a [isize]) -> Self {
        Self {
            shape,
            strides,
            counter: vec![0; shape.len()],
            current: offset as isize,
            remaining: shape.iter().product(),
        }
    }
}

impl Iterator for Odometer<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.remaining == 0 {
            return None;
        }
        let flat = self.current as usize;
        self.remaining -= 1;
        if self.remaining > 0 {
            for k in (0..self.shape.len()).rev() {
                self.counter[k] += 1;
                self.current += self.strides[k];
                if self.counter[k] < self.shape[k] {
                    break;
                }
                self.current -= self.strides[k] * self.shape[k] as isize;
                self.counter[k] = 0;
            }
        }
        Some(flat)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Odometer<'_> {}

/// Storage positions of an array's elements in row-major order.
///
/// Consistent arrays yield a plain range, other layouts walk the strides.
#[derive(Clone, Debug)]
pub enum FlatIndices<'a> {
    /// Dense row-major layout.
    Contiguous(Range<usize>),
    /// Arbitrary strided layout.
    Strided(Odometer<'a>),
}

impl Iterator for FlatIndices<'_> {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        match self {
            Self::Contiguous(range) => range.next(),
            Self::Strided(odometer) => odometer.next(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            Self::Contiguous(range) => range.size_hint(),
            Self::Strided(odometer) => odometer.size_hint(),
        }
    }
}

impl ExactSizeIterator for FlatIndices<'_> {}

/// Iterator over an array's elements in row-major order.
pub enum Iter<'a, T: Element> {
    /// Sequential walk over a consistent array's buffer.
    Contiguous(StorageIter<'a, T>),
    /// Strided walk.
    Strided {
        /// The shared buffer.
        storage: &'a Storage<T>,
        /// Positions still to visit.
        indices: Odometer<'a>,
    },
}

impl<T: Element> Iterator for Iter<'_, T> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<T> {
        match self {
            Self::Contiguous(it) => it.next(),
            Self::Strided { storage, indices } => {
                indices.next().map(|flat| storage.get_unchecked(flat))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            Self::Contiguous(it) => it.size_hint(),
            Self::Strided { indices, .. } => indices.size_hint(),
        }
    }
}

impl<T: Element> ExactSizeIterator for Iter<'_, T> {}

impl<T: Element> NdArray<T> {
    /// Returns the storage positions of every element in row-major order.
    ///
    /// # Example
    ///
    /// ```
    /// use kornia_ndarray::NdArray;
    ///
    /// let a = NdArray::<i32>::zeros(&[2, 3]).unwrap();
    /// let t = a.transpose(&[]).unwrap();
    /// assert_eq!(t.flat_indices().collect::<Vec<_>>(), vec![0, 3, 1, 4, 2, 5]);
    /// ```
    pub fn flat_indices(&self) -> FlatIndices<'_> {
        if self.is_consistent() {
            FlatIndices::Contiguous(0..self.size())
        } else {
            FlatIndices::Strided(Odometer::new(self.offset, &self.shape, &self.strides))
        }
    }

    /// Returns an iterator over the elements in row-major order.
    pub fn iter(&self) -> Iter<'_, T> {
        if self.is_consistent() {
            Iter::Contiguous(self.storage.iter())
        } else {
            Iter::Strided {
                storage: &self.storage,
                indices: Odometer::new(self.offset, &self.shape, &self.strides),
            }
        }
    }
}

impl<'a, T: Element> IntoIterator for &'a NdArray<T> {
    type Item = T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use crate::{NdArray, NdArrayError, Slice};

    #[test]
    fn iter_contiguous_matches_storage() -> Result<(), NdArrayError> {
        let a = NdArray::<i16>::from_shape_vec(&[2, 2], vec![1, 2, 3, 4])?;
        let it = a.iter();
        assert_eq!(it.len(), 4);
        assert_eq!(it.collect::<Vec<_>>(), vec![1, 2, 3, 4]);
        Ok(())
    }

    #[test]
    fn iter_strided_view() -> Result<(), NdArrayError> {
        let a = NdArray::<i32>::from_shape_fn(&[3, 4], |i| (i[0] * 4 + i[1]) as i32)?;
        let v = a.slice(Slice::new(1, 3, 2)?, 1)?;
        assert_eq!(v.shape(), &[3, 2]);
        let flats: Vec<usize> = v.flat_indices().collect();
        assert_eq!(flats, vec![1, 3, 5, 7, 9, 11]);
        assert_eq!(v.iter().len(), 6);
        assert_eq!((&v).into_iter().collect::<Vec<_>>(), vec![1, 3, 5, 7, 9, 11]);
        Ok(())
    }

    #[test]
    fn iter_empty() -> Result<(), NdArrayError> {
        let a = NdArray::<f32>::zeros(&[3, 0])?;
        assert_eq!(a.flat_indices().count(), 0);
        let t = a.transpose(&[])?;
        assert_eq!(t.iter().count(), 0);
        Ok(())
    }
}
