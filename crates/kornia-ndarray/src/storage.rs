//! Rc-based storage buffers shared between an array and its views.
//!
//! A [`Storage`] is a flat, fixed-length buffer holding exactly one element
//! kind. Cloning the handle shares the buffer, which is how views alias their
//! root array; [`Storage::copy_of`] detaches an independent buffer.

use std::{
    cell::{Ref, RefCell, RefMut},
    rc::Rc,
};

use crate::{element::Element, NdArrayError};

/// Flat typed buffer with shared ownership.
///
/// Complex element kinds are backed by a lane buffer of twice the logical
/// length, interleaving real and imaginary parts.
///
/// # Thread Safety
///
/// `Storage` is intentionally `!Send`: arrays and views are single-threaded
/// values. Materialize the data (`to_vec`) before handing it to another thread.
pub struct Storage<T: Element> {
    /// Reference-counted lane buffer.
    inner: Rc<RefCell<Vec<T::Raw>>>,
    /// Number of logical elements.
    len: usize,
}

impl<T: Element> Storage<T> {
    /// Creates a zero-filled buffer of `len` elements.
    pub fn zeros(len: usize) -> Self {
        Self::from_raw_unchecked(vec![T::Raw::default(); len * T::LANES])
    }

    /// Creates a buffer filled with `value`.
    pub fn full(len: usize, value: T) -> Self {
        let mut raw = vec![T::Raw::default(); len * T::LANES];
        for i in 0..len {
            T::write(&mut raw, i, value);
        }
        Self::from_raw_unchecked(raw)
    }

    /// Creates a buffer from logical elements.
    pub fn from_vec(values: Vec<T>) -> Self {
        let len = values.len();
        let mut raw = vec![T::Raw::default(); len * T::LANES];
        for (i, v) in values.into_iter().enumerate() {
            T::write(&mut raw, i, v);
        }
        Self::from_raw_unchecked(raw)
    }

    /// Creates a buffer taking ownership of a lane vector.
    ///
    /// # Errors
    ///
    /// Returns [`NdArrayError::ShapeMismatch`] if the lane count is not a multiple of
    /// the lanes per element.
    pub fn from_raw(raw: Vec<T::Raw>) -> Result<Self, NdArrayError> {
        if raw.len() % T::LANES != 0 {
            return Err(NdArrayError::shape_mismatch(
                "lane count must be a multiple of the lanes per element",
                &[raw.len().div_ceil(T::LANES) * T::LANES],
                &[raw.len()],
            ));
        }
        Ok(Self::from_raw_unchecked(raw))
    }

    fn from_raw_unchecked(raw: Vec<T::Raw>) -> Self {
        let len = raw.len() / T::LANES;
        Self {
            inner: Rc::new(RefCell::new(raw)),
            len,
        }
    }

    /// Returns the number of logical elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the buffer holds no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns true if another handle shares this buffer.
    #[inline]
    pub fn is_shared(&self) -> bool {
        Rc::strong_count(&self.inner) > 1
    }

    /// Returns true if both handles refer to the same buffer.
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    #[inline]
    fn check(&self, index: usize) -> Result<(), NdArrayError> {
        if index >= self.len {
            return Err(NdArrayError::index_out_of_bounds(
                0,
                index as isize,
                self.len,
            ));
        }
        Ok(())
    }

    /// Returns the element at a flat index.
    ///
    /// # Errors
    ///
    /// Returns [`NdArrayError::IndexOutOfBounds`] if `index >= len`.
    #[inline]
    pub fn get(&self, index: usize) -> Result<T, NdArrayError> {
        self.check(index)?;
        Ok(T::read(&self.inner.borrow(), index))
    }

    /// Writes the element at a flat index.
    ///
    /// # Errors
    ///
    /// Returns [`NdArrayError::IndexOutOfBounds`] if `index >= len`.
    #[inline]
    pub fn set(&self, index: usize, value: T) -> Result<(), NdArrayError> {
        self.check(index)?;
        T::write(&mut self.inner.borrow_mut(), index, value);
        Ok(())
    }

    /// Reads an element whose index the caller already validated.
    #[inline]
    pub(crate) fn get_unchecked(&self, index: usize) -> T {
        T::read(&self.inner.borrow(), index)
    }

    /// Writes an element whose index the caller already validated.
    #[inline]
    pub(crate) fn set_unchecked(&self, index: usize, value: T) {
        T::write(&mut self.inner.borrow_mut(), index, value);
    }

    /// Returns an independent copy of the buffer.
    pub fn copy_of(&self) -> Self {
        Self {
            inner: Rc::new(RefCell::new(self.inner.borrow().clone())),
            len: self.len,
        }
    }

    /// Copies the elements `[src_start, src_end)` into `dest` starting at `dest_offset`.
    ///
    /// Overlapping ranges of the same buffer are handled like `copy_within`.
    ///
    /// # Errors
    ///
    /// Returns [`NdArrayError::IndexOutOfBounds`] if either range exceeds its buffer,
    /// or [`NdArrayError::InvalidArgument`] if `src_start > src_end`.
    pub fn copy_into(
        &self,
        dest: &Storage<T>,
        dest_offset: usize,
        src_start: usize,
        src_end: usize,
    ) -> Result<(), NdArrayError> {
        if src_start > src_end {
            return Err(NdArrayError::invalid_argument(format!(
                "copy range start {src_start} is past its end {src_end}"
            )));
        }
        if src_end > self.len {
            return Err(NdArrayError::index_out_of_bounds(
                0,
                src_end as isize,
                self.len,
            ));
        }
        let count = src_end - src_start;
        let dest_end = dest_offset
            .checked_add(count)
            .filter(|&end| end <= dest.len)
            .ok_or_else(|| {
                NdArrayError::index_out_of_bounds(
                    0,
                    isize::try_from(dest_offset).unwrap_or(isize::MAX),
                    dest.len,
                )
            })?;

        let lanes = (src_start * T::LANES)..(src_end * T::LANES);
        let dst_lane = dest_offset * T::LANES;
        if self.ptr_eq(dest) {
            self.inner.borrow_mut().copy_within(lanes, dst_lane);
        } else {
            let src = self.inner.borrow();
            let mut dst = dest.inner.borrow_mut();
            dst[dst_lane..dest_end * T::LANES].copy_from_slice(&src[lanes]);
        }
        Ok(())
    }

    /// Returns a sequential iterator over the logical elements.
    pub fn iter(&self) -> StorageIter<'_, T> {
        StorageIter {
            storage: self,
            pos: 0,
        }
    }

    /// Copies the logical elements into a vector.
    pub fn to_vec(&self) -> Vec<T> {
        let raw = self.inner.borrow();
        (0..self.len).map(|i| T::read(&raw, i)).collect()
    }

    /// Borrows the lane buffer.
    ///
    /// # Panics
    ///
    /// Panics if the buffer is currently borrowed mutably.
    pub fn raw(&self) -> Ref<'_, [T::Raw]> {
        Ref::map(self.inner.borrow(), |v| v.as_slice())
    }

    /// Mutably borrows the lane buffer.
    ///
    /// # Panics
    ///
    /// Panics if the buffer is currently borrowed.
    pub fn raw_mut(&self) -> RefMut<'_, [T::Raw]> {
        RefMut::map(self.inner.borrow_mut(), |v| v.as_mut_slice())
    }

    /// Returns the pointer to the first lane of the buffer.
    #[inline]
    pub fn as_ptr(&self) -> *const T::Raw {
        self.inner.borrow().as_ptr()
    }

    /// Replaces every element with `f(element)` in one borrow of the buffer.
    pub fn apply<F>(&self, mut f: F) -> Result<(), NdArrayError>
    where
        F: FnMut(T) -> Result<T, NdArrayError>,
    {
        let mut raw = self.inner.borrow_mut();
        for i in 0..self.len {
            let v = f(T::read(&raw, i))?;
            T::write(&mut raw, i, v);
        }
        Ok(())
    }

    /// Replaces every element with `f(element, other[i])` in one pass.
    ///
    /// `other` may be the same buffer as `self`.
    ///
    /// # Errors
    ///
    /// Returns [`NdArrayError::ShapeMismatch`] if both buffers differ in length, or
    /// the first error returned by `f`.
    pub fn zip_apply<F>(&self, other: &Storage<T>, mut f: F) -> Result<(), NdArrayError>
    where
        F: FnMut(T, T) -> Result<T, NdArrayError>,
    {
        if self.len != other.len {
            return Err(NdArrayError::shape_mismatch(
                "element-wise storage operation requires equal lengths",
                &[self.len],
                &[other.len],
            ));
        }
        if self.ptr_eq(other) {
            return self.apply(|v| f(v, v));
        }
        let mut dst = self.inner.borrow_mut();
        let src = other.inner.borrow();
        for i in 0..self.len {
            let v = f(T::read(&dst, i), T::read(&src, i))?;
            T::write(&mut dst, i, v);
        }
        Ok(())
    }
}

impl<T: Element> Clone for Storage<T> {
    /// Creates a cheap clone by incrementing the reference count.
    ///
    /// This is a O(1) operation that doesn't copy the underlying data.
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
            len: self.len,
        }
    }
}

impl<T: Element> std::fmt::Debug for Storage<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage")
            .field("dtype", &T::DTYPE)
            .field("len", &self.len)
            .field("is_shared", &self.is_shared())
            .finish()
    }
}

/// Sequential iterator over a [`Storage`] buffer.
pub struct StorageIter<'a, T: Element> {
    storage: &'a Storage<T>,
    pos: usize,
}

impl<T: Element> Iterator for StorageIter<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.pos >= self.storage.len {
            return None;
        }
        let v = self.storage.get_unchecked(self.pos);
        self.pos += 1;
        Some(v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let rem = self.storage.len - self.pos;
        (rem, Some(rem))
    }
}

impl<T: Element> ExactSizeIterator for StorageIter<'_, T> {}
