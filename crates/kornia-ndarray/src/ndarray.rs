use std::{cell::Ref, rc::Rc};

use crate::{
    dtype::DType, dyn_array::DynArray, element::Element, rank::Rank, storage::Storage,
    NdArrayError,
};

/// Computes the strides for a row-major (C-contiguous) layout.
///
/// The rightmost axis has stride 1 and each axis' stride is the product of
/// all axis sizes to its right.
///
/// # Examples
///
/// ```rust
/// use kornia_ndarray::canonical_strides;
///
/// assert_eq!(canonical_strides(&[2, 3]), vec![3, 1]);
/// assert_eq!(canonical_strides(&[2, 3, 4]), vec![12, 4, 1]);
/// ```
pub fn canonical_strides(shape: &[usize]) -> Vec<isize> {
    let mut strides = vec![0isize; shape.len()];
    let mut stride = 1isize;
    for i in (0..shape.len()).rev() {
        strides[i] = stride;
        stride *= shape[i] as isize;
    }
    strides
}

pub(crate) fn validate_shape(shape: &[usize]) -> Result<(), NdArrayError> {
    if shape.is_empty() {
        return Err(NdArrayError::shape_mismatch(
            "an array needs at least one axis",
            &[1],
            shape,
        ));
    }
    Ok(())
}

/// A strided multi-dimensional array.
///
/// `NdArray` is a shape/stride/offset record over a shared [`Storage`] buffer.
/// Several records can alias one buffer: views derived by indexing, slicing,
/// transposing or reshaping never copy elements, and a write through any of
/// them is visible through all others.
///
/// # Layout
///
/// The storage position of the multi-index `(i0, i1, ...)` is
/// `offset + Σ strides[k] * i_k`. An array is *consistent* when it is dense,
/// starts at offset 0, covers its whole buffer and has row-major strides.
///
/// # Ownership
///
/// Views keep a reference to the root array that allocated the buffer in
/// [`NdArray::base`]. The buffer lives as long as its longest holder.
///
/// # Examples
///
/// ```rust
/// use kornia_ndarray::NdArray;
///
/// let a = NdArray::<i32>::from_shape_vec(&[2, 3], vec![1, 2, 3, 4, 5, 6]).unwrap();
/// let t = a.transpose(&[]).unwrap();
/// assert_eq!(t.shape(), &[3, 2]);
/// assert_eq!(t.get2(2, 1).unwrap(), 6);
/// assert!(!t.is_consistent());
/// ```
pub struct NdArray<T: Element> {
    pub(crate) storage: Storage<T>,
    pub(crate) offset: usize,
    pub(crate) shape: Vec<usize>,
    pub(crate) strides: Vec<isize>,
    pub(crate) dim: Rank,
    pub(crate) base: Option<Rc<NdArray<T>>>,
    pub(crate) writeable: bool,
}

impl<T: Element> NdArray<T> {
    /// Creates an array from its raw parts.
    ///
    /// # Arguments
    ///
    /// * `storage` - The buffer holding the elements.
    /// * `offset` - Position of the first element within `storage`.
    /// * `shape` - Size of every axis.
    /// * `strides` - Storage step for every axis.
    /// * `dim` - The declared rank, which must equal `shape.len()`.
    ///
    /// # Errors
    ///
    /// * [`NdArrayError::ShapeMismatch`] if `shape` is empty or `strides` has another length.
    /// * [`NdArrayError::RankMismatch`] if `dim` disagrees with `shape`.
    /// * [`NdArrayError::IndexOutOfBounds`] if an element falls outside `storage`.
    pub fn from_parts(
        storage: Storage<T>,
        offset: usize,
        shape: Vec<usize>,
        strides: Vec<isize>,
        dim: Rank,
    ) -> Result<Self, NdArrayError> {
        validate_shape(&shape)?;
        if strides.len() != shape.len() {
            return Err(NdArrayError::shape_mismatch(
                "one stride per axis is required",
                &[shape.len()],
                &[strides.len()],
            ));
        }
        dim.require_matches(shape.len())?;

        let size = shape.iter().product::<usize>();
        if size > 0 {
            let mut lo = offset as isize;
            let mut hi = offset as isize;
            for (&n, &s) in shape.iter().zip(strides.iter()) {
                let extent = s * (n as isize - 1);
                if extent >= 0 {
                    hi += extent;
                } else {
                    lo += extent;
                }
            }
            if lo < 0 {
                return Err(NdArrayError::index_out_of_bounds(0, lo, storage.len()));
            }
            if hi as usize >= storage.len() {
                return Err(NdArrayError::index_out_of_bounds(0, hi, storage.len()));
            }
        } else if offset > storage.len() {
            return Err(NdArrayError::index_out_of_bounds(
                0,
                offset as isize,
                storage.len(),
            ));
        }

        Ok(Self {
            storage,
            offset,
            shape,
            strides,
            dim,
            base: None,
            writeable: true,
        })
    }

    /// Creates a root array over a whole buffer with row-major strides.
    ///
    /// # Errors
    ///
    /// Returns [`NdArrayError::ShapeMismatch`] if the shape is empty or its element
    /// count differs from the buffer length.
    pub fn from_storage(storage: Storage<T>, shape: &[usize]) -> Result<Self, NdArrayError> {
        validate_shape(shape)?;
        let numel = shape.iter().product::<usize>();
        if numel != storage.len() {
            return Err(NdArrayError::shape_mismatch(
                "buffer length must equal the number of elements",
                shape,
                &[storage.len()],
            ));
        }
        Ok(Self {
            storage,
            offset: 0,
            shape: shape.to_vec(),
            strides: canonical_strides(shape),
            dim: Rank::for_rank(shape.len()),
            base: None,
            writeable: true,
        })
    }

    /// Creates a new array with the given shape and data.
    ///
    /// # Errors
    ///
    /// If the number of elements in the data does not match the shape, an error is returned.
    ///
    /// # Example
    ///
    /// ```
    /// use kornia_ndarray::NdArray;
    ///
    /// let t = NdArray::<i8>::from_shape_vec(&[2, 2], vec![1, 2, 3, 4]).unwrap();
    /// assert_eq!(t.shape(), &[2, 2]);
    /// assert_eq!(t.strides(), &[2, 1]);
    /// ```
    pub fn from_shape_vec(shape: &[usize], data: Vec<T>) -> Result<Self, NdArrayError> {
        Self::from_storage(Storage::from_vec(data), shape)
    }

    /// Creates a new array filled with `value`.
    pub fn full(shape: &[usize], value: T) -> Result<Self, NdArrayError> {
        validate_shape(shape)?;
        let numel = shape.iter().product::<usize>();
        Self::from_storage(Storage::full(numel, value), shape)
    }

    /// Creates a new array with all elements set to zero.
    pub fn zeros(shape: &[usize]) -> Result<Self, NdArrayError> {
        validate_shape(shape)?;
        let numel = shape.iter().product::<usize>();
        Self::from_storage(Storage::zeros(numel), shape)
    }

    /// Creates a new array with all elements set to one.
    pub fn ones(shape: &[usize]) -> Result<Self, NdArrayError> {
        Self::full(shape, T::one())
    }

    /// Creates a new array with a function generating every element.
    ///
    /// The function is called with the multi-index of each element in row-major
    /// order.
    ///
    /// # Example
    ///
    /// ```
    /// use kornia_ndarray::NdArray;
    ///
    /// let t = NdArray::<i32>::from_shape_fn(&[2, 2], |idx| (idx[0] * 2 + idx[1]) as i32).unwrap();
    /// assert_eq!(t.to_vec(), vec![0, 1, 2, 3]);
    /// ```
    pub fn from_shape_fn<F>(shape: &[usize], mut f: F) -> Result<Self, NdArrayError>
    where
        F: FnMut(&[usize]) -> T,
    {
        validate_shape(shape)?;
        let numel = shape.iter().product::<usize>();
        let mut index = vec![0usize; shape.len()];
        let mut data = Vec::with_capacity(numel);
        for _ in 0..numel {
            data.push(f(&index));
            for k in (0..shape.len()).rev() {
                index[k] += 1;
                if index[k] < shape[k] {
                    break;
                }
                index[k] = 0;
            }
        }
        Self::from_storage(Storage::from_vec(data), shape)
    }

    /// Returns the underlying buffer handle.
    #[inline]
    pub fn storage(&self) -> &Storage<T> {
        &self.storage
    }

    /// Returns the position of the first element within the buffer.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Returns the size of every axis.
    #[inline]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Returns the storage step of every axis.
    #[inline]
    pub fn strides(&self) -> &[isize] {
        &self.strides
    }

    /// Returns the rank token.
    #[inline]
    pub fn dim(&self) -> Rank {
        self.dim
    }

    /// Returns the number of axes.
    #[inline]
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Returns the number of elements.
    #[inline]
    pub fn size(&self) -> usize {
        self.shape.iter().product()
    }

    /// Returns the element kind.
    #[inline]
    pub fn dtype(&self) -> DType {
        T::DTYPE
    }

    /// Returns the root array whose buffer this view shares.
    pub fn base(&self) -> Option<&NdArray<T>> {
        self.base.as_deref()
    }

    /// Returns true if this array was derived from another one.
    #[inline]
    pub fn is_view(&self) -> bool {
        self.base.is_some()
    }

    /// Returns true if elements can be written through this array.
    #[inline]
    pub fn is_writeable(&self) -> bool {
        self.writeable
    }

    /// Checks the declared rank against the number of axes.
    pub fn require_rank(&self, rank: Rank) -> Result<(), NdArrayError> {
        rank.require_matches(self.shape.len())
    }

    /// Returns true for dense, gap-free, row-major arrays starting at offset 0.
    ///
    /// # Examples
    ///
    /// ```
    /// use kornia_ndarray::NdArray;
    ///
    /// let a = NdArray::<f32>::zeros(&[2, 3]).unwrap();
    /// assert!(a.is_consistent());
    /// assert!(!a.transpose(&[]).unwrap().is_consistent());
    /// ```
    pub fn is_consistent(&self) -> bool {
        self.offset == 0
            && self.size() == self.storage.len()
            && self.strides == canonical_strides(&self.shape)
    }

    /// Returns a pointer to the first element's first lane.
    pub fn as_ptr(&self) -> *const T::Raw {
        self.storage.as_ptr().wrapping_add(self.offset * T::LANES)
    }

    /// Borrows the lane buffer when the array is consistent.
    ///
    /// Collaborators needing contiguous memory call [`NdArray::deep_copy`] first
    /// when this returns `None`.
    ///
    /// # Panics
    ///
    /// The returned guard borrows the buffer shared with every view. Writing
    /// through any of them while the guard is alive panics.
    pub fn contiguous_raw(&self) -> Option<Ref<'_, [T::Raw]>> {
        self.is_consistent().then(|| self.storage.raw())
    }

    pub(crate) fn ensure_writeable(&self, operation: &str) -> Result<(), NdArrayError> {
        if !self.writeable {
            return Err(NdArrayError::unsupported_operation(
                operation,
                "the array is a read-only view",
            ));
        }
        Ok(())
    }

    /// Checks `index` against axis `axis` and returns it unsigned.
    #[inline]
    pub(crate) fn check_axis(&self, axis: usize, index: isize) -> Result<usize, NdArrayError> {
        let size = self.shape[axis];
        if index < 0 || index as usize >= size {
            return Err(NdArrayError::index_out_of_bounds(axis, index, size));
        }
        Ok(index as usize)
    }

    /// Computes the storage position of a bounds-checked fixed-rank index.
    #[inline]
    pub(crate) fn flat_of<const R: usize>(&self, index: [isize; R]) -> Result<usize, NdArrayError> {
        let mut flat = self.offset as isize;
        for (axis, &i) in index.iter().enumerate() {
            let i = self.check_axis(axis, i)?;
            flat += self.strides[axis] * i as isize;
        }
        Ok(flat as usize)
    }

    /// Computes the storage position of a multi-index.
    ///
    /// # Errors
    ///
    /// * [`NdArrayError::RankMismatch`] if `index.len()` differs from the rank.
    /// * [`NdArrayError::IndexOutOfBounds`] naming the first offending axis.
    ///
    /// # Examples
    ///
    /// ```
    /// use kornia_ndarray::NdArray;
    ///
    /// let a = NdArray::<i64>::zeros(&[2, 3, 4]).unwrap();
    /// assert_eq!(a.flat_index(&[1, 2, 3]).unwrap(), 12 + 8 + 3);
    /// ```
    pub fn flat_index(&self, index: &[isize]) -> Result<usize, NdArrayError> {
        if index.len() != self.shape.len() {
            return Err(NdArrayError::rank_mismatch(self.shape.len(), index.len()));
        }
        let mut flat = self.offset as isize;
        for (axis, &i) in index.iter().enumerate() {
            let i = self.check_axis(axis, i)?;
            flat += self.strides[axis] * i as isize;
        }
        Ok(flat as usize)
    }

    /// Builds a view sharing this array's buffer.
    pub(crate) fn derive(
        &self,
        offset: usize,
        shape: Vec<usize>,
        strides: Vec<isize>,
        writeable: bool,
    ) -> Self {
        let base = match &self.base {
            Some(root) => Rc::clone(root),
            None => Rc::new(self.clone()),
        };
        Self {
            storage: self.storage.clone(),
            offset,
            dim: Rank::for_rank(shape.len()),
            shape,
            strides,
            base: Some(base),
            writeable,
        }
    }

    /// Returns a copy that owns a clone of the whole buffer.
    ///
    /// Offset, shape and strides are kept, so views keep their layout over the
    /// cloned buffer.
    pub fn copy(&self) -> Self {
        Self {
            storage: self.storage.copy_of(),
            offset: self.offset,
            shape: self.shape.clone(),
            strides: self.strides.clone(),
            dim: self.dim,
            base: None,
            writeable: true,
        }
    }

    /// Returns a dense, consistent copy holding exactly `size` elements.
    ///
    /// # Example
    ///
    /// ```
    /// use kornia_ndarray::NdArray;
    ///
    /// let a = NdArray::<i32>::from_shape_vec(&[2, 3], vec![1, 2, 3, 4, 5, 6]).unwrap();
    /// let t = a.transpose(&[]).unwrap().deep_copy();
    /// assert!(t.is_consistent());
    /// assert_eq!(t.to_vec(), vec![1, 4, 2, 5, 3, 6]);
    /// ```
    pub fn deep_copy(&self) -> Self {
        let data: Vec<T> = self.iter().collect();
        log::debug!("deep copy of {} {} elements", data.len(), T::DTYPE);
        Self {
            storage: Storage::from_vec(data),
            offset: 0,
            shape: self.shape.clone(),
            strides: canonical_strides(&self.shape),
            dim: self.dim,
            base: None,
            writeable: true,
        }
    }

    /// Reshapes the array.
    ///
    /// Identical shapes return the same record. Consistent arrays are reshaped
    /// without copying; other arrays are compacted first.
    ///
    /// # Errors
    ///
    /// Returns [`NdArrayError::ShapeMismatch`] if the shape is empty or holds a
    /// different number of elements.
    ///
    /// # Example
    ///
    /// ```
    /// use kornia_ndarray::NdArray;
    ///
    /// let t = NdArray::<i32>::from_shape_vec(&[4], vec![1, 2, 3, 4]).unwrap();
    /// let t2 = t.reshape(&[2, 2]).unwrap();
    /// assert_eq!(t2.strides(), &[2, 1]);
    /// assert_eq!(t2.get2(1, 0).unwrap(), 3);
    /// assert!(t.reshape(&[3]).is_err());
    /// ```
    pub fn reshape(&self, shape: &[usize]) -> Result<Self, NdArrayError> {
        if shape == self.shape.as_slice() {
            return Ok(self.clone());
        }
        validate_shape(shape)?;
        let numel = shape.iter().product::<usize>();
        if numel != self.size() {
            return Err(NdArrayError::ShapeMismatch {
                message: "reshape requires the same number of elements".to_string(),
                expected: format!("{:?} ({} elements)", self.shape, self.size()),
                actual: format!("{:?} ({} elements)", shape, numel),
            });
        }

        let strides = canonical_strides(shape);
        if self.is_consistent() {
            Ok(self.derive(self.offset, shape.to_vec(), strides, self.writeable))
        } else {
            log::debug!(
                "reshape {:?} -> {:?} compacts a non-consistent array",
                self.shape,
                shape
            );
            let dense = self.deep_copy();
            Ok(dense.derive(0, shape.to_vec(), strides, self.writeable))
        }
    }

    /// Reshapes to a single axis of `size` elements.
    pub fn flatten(&self) -> Result<Self, NdArrayError> {
        self.reshape(&[self.size()])
    }

    /// Permutes the axes.
    ///
    /// An empty `axes` reverses every axis. Only shape and strides change.
    ///
    /// # Errors
    ///
    /// Returns [`NdArrayError::InvalidArgument`] unless `axes` is a permutation of
    /// `0..ndim`.
    pub fn transpose(&self, axes: &[usize]) -> Result<Self, NdArrayError> {
        let rank = self.shape.len();
        let perm: Vec<usize> = if axes.is_empty() {
            (0..rank).rev().collect()
        } else {
            if axes.len() != rank {
                return Err(NdArrayError::invalid_argument(format!(
                    "transpose needs {rank} axes, got {axes:?}"
                )));
            }
            let mut seen = vec![false; rank];
            for &axis in axes {
                if axis >= rank || seen[axis] {
                    return Err(NdArrayError::invalid_argument(format!(
                        "{axes:?} is not a permutation of 0..{rank}"
                    )));
                }
                seen[axis] = true;
            }
            axes.to_vec()
        };

        let shape = perm.iter().map(|&a| self.shape[a]).collect();
        let strides = perm.iter().map(|&a| self.strides[a]).collect();
        log::trace!("transpose {:?} by {:?}", self.shape, perm);
        Ok(self.derive(self.offset, shape, strides, self.writeable))
    }

    /// Removes unit axes.
    ///
    /// An empty `axes` removes every axis of size 1, keeping one axis when all
    /// of them are unit. Explicit axes must each have size 1.
    ///
    /// # Errors
    ///
    /// Returns [`NdArrayError::InvalidArgument`] for out-of-range, duplicated or
    /// non-unit axes, or when every axis would be removed.
    pub fn squeeze(&self, axes: &[usize]) -> Result<Self, NdArrayError> {
        let rank = self.shape.len();
        let mut remove = vec![false; rank];
        if axes.is_empty() {
            for (axis, &n) in self.shape.iter().enumerate() {
                remove[axis] = n == 1;
            }
            if remove.iter().all(|&r| r) {
                remove[rank - 1] = false;
            }
        } else {
            for &axis in axes {
                if axis >= rank {
                    return Err(NdArrayError::invalid_argument(format!(
                        "squeeze axis {axis} out of range for rank {rank}"
                    )));
                }
                if remove[axis] {
                    return Err(NdArrayError::invalid_argument(format!(
                        "squeeze axis {axis} repeated"
                    )));
                }
                if self.shape[axis] != 1 {
                    return Err(NdArrayError::invalid_argument(format!(
                        "cannot squeeze axis {axis} of size {}",
                        self.shape[axis]
                    )));
                }
                remove[axis] = true;
            }
            if remove.iter().all(|&r| r) {
                return Err(NdArrayError::invalid_argument(
                    "squeeze would remove every axis",
                ));
            }
        }

        let mut shape = Vec::with_capacity(rank);
        let mut strides = Vec::with_capacity(rank);
        for axis in (0..rank).filter(|&axis| !remove[axis]) {
            shape.push(self.shape[axis]);
            strides.push(self.strides[axis]);
        }
        Ok(self.derive(self.offset, shape, strides, self.writeable))
    }

    /// Inserts unit axes at the given positions of the result shape.
    ///
    /// # Errors
    ///
    /// Returns [`NdArrayError::InvalidArgument`] for out-of-range or duplicated
    /// positions.
    pub fn unsqueeze(&self, axes: &[usize]) -> Result<Self, NdArrayError> {
        if axes.is_empty() {
            return Ok(self.clone());
        }
        let new_rank = self.shape.len() + axes.len();
        let mut insert = vec![false; new_rank];
        for &axis in axes {
            if axis >= new_rank || insert[axis] {
                return Err(NdArrayError::invalid_argument(format!(
                    "unsqueeze axes {axes:?} invalid for result rank {new_rank}"
                )));
            }
            insert[axis] = true;
        }

        let mut old = self.shape.iter();
        let shape: Vec<usize> = insert
            .iter()
            .map(|&unit| if unit { 1 } else { old.next().copied().unwrap_or(1) })
            .collect();
        let strides = canonical_strides(&shape);

        if self.is_consistent() {
            Ok(self.derive(0, shape, strides, self.writeable))
        } else {
            log::debug!("unsqueeze compacts a non-consistent array {:?}", self.shape);
            let dense = self.deep_copy();
            Ok(dense.derive(0, shape, strides, self.writeable))
        }
    }

    /// Writes `value` into every element.
    pub fn fill(&mut self, value: T) -> Result<(), NdArrayError> {
        self.ensure_writeable("fill")?;
        for flat in self.flat_indices() {
            self.storage.set_unchecked(flat, value);
        }
        Ok(())
    }

    /// Apply a function to each element, producing a new consistent array.
    ///
    /// # Example
    ///
    /// ```
    /// use kornia_ndarray::NdArray;
    ///
    /// let t = NdArray::<i32>::from_shape_vec(&[4], vec![1, 2, 3, 4]).unwrap();
    /// let t2 = t.map(|x| x as f64 / 2.0);
    /// assert_eq!(t2.to_vec(), vec![0.5, 1.0, 1.5, 2.0]);
    /// ```
    pub fn map<U, F>(&self, f: F) -> NdArray<U>
    where
        U: Element,
        F: FnMut(T) -> U,
    {
        let data: Vec<U> = self.iter().map(f).collect();
        NdArray {
            storage: Storage::from_vec(data),
            offset: 0,
            shape: self.shape.clone(),
            strides: canonical_strides(&self.shape),
            dim: self.dim,
            base: None,
            writeable: true,
        }
    }

    /// Copies the elements in row-major order.
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().collect()
    }

    /// Copies the raw lanes of the elements in row-major order.
    ///
    /// Complex elements contribute their two interleaved lanes.
    pub fn to_raw_vec(&self) -> Vec<T::Raw> {
        match self.contiguous_raw() {
            Some(raw) => raw.to_vec(),
            None => {
                let mut raw = vec![T::Raw::default(); self.size() * T::LANES];
                for (i, v) in self.iter().enumerate() {
                    T::write(&mut raw, i, v);
                }
                raw
            }
        }
    }

    /// Converts into the dtype-erased representation.
    pub fn into_dyn(self) -> DynArray {
        T::into_dyn(self)
    }
}

impl<T: Element> Clone for NdArray<T> {
    /// Clones the record; the buffer stays shared.
    fn clone(&self) -> Self {
        Self {
            storage: self.storage.clone(),
            offset: self.offset,
            shape: self.shape.clone(),
            strides: self.strides.clone(),
            dim: self.dim,
            base: self.base.clone(),
            writeable: self.writeable,
        }
    }
}

impl<T: Element> PartialEq for NdArray<T> {
    fn eq(&self, other: &Self) -> bool {
        self.shape == other.shape && self.dim == other.dim && self.iter().eq(other.iter())
    }
}

impl<T: Element> std::fmt::Debug for NdArray<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NdArray")
            .field("dtype", &T::DTYPE)
            .field("shape", &self.shape)
            .field("strides", &self.strides)
            .field("offset", &self.offset)
            .field("is_view", &self.is_view())
            .field("writeable", &self.writeable)
            .finish()
    }
}

fn fmt_axis<T: std::fmt::Display>(
    f: &mut std::fmt::Formatter<'_>,
    values: &[T],
    shape: &[usize],
) -> std::fmt::Result {
    f.write_str("[")?;
    if shape.len() == 1 {
        for (i, v) in values.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{v}")?;
        }
    } else {
        let chunk = shape[1..].iter().product::<usize>();
        for i in 0..shape[0] {
            if i > 0 {
                f.write_str(", ")?;
            }
            fmt_axis(f, &values[i * chunk..(i + 1) * chunk], &shape[1..])?;
        }
    }
    f.write_str("]")
}

impl<T: Element> std::fmt::Display for NdArray<T> {
    /// Formats the elements as nested brackets in row-major order.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fmt_axis(f, &self.to_vec(), &self.shape)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use num_complex::Complex64;

    use super::*;
    use crate::Slice;

    #[test]
    fn constructor_1d() -> Result<(), NdArrayError> {
        let t = NdArray::<i8>::from_shape_vec(&[1], vec![1])?;
        assert_eq!(t.shape(), &[1]);
        assert_eq!(t.strides(), &[1]);
        assert_eq!(t.size(), 1);
        assert_eq!(t.dim(), Rank::R1);
        assert!(t.is_consistent());
        assert!(!t.is_view());
        Ok(())
    }

    #[test]
    fn constructor_empty_shape() {
        assert!(matches!(
            NdArray::<f32>::zeros(&[]),
            Err(NdArrayError::ShapeMismatch { .. })
        ));
        assert!(NdArray::<i32>::from_shape_vec(&[2, 2], vec![1, 2, 3]).is_err());
    }

    #[test]
    fn constructor_zero_size() -> Result<(), NdArrayError> {
        let t = NdArray::<f64>::zeros(&[2, 0, 3])?;
        assert_eq!(t.size(), 0);
        assert!(t.is_consistent());
        assert_eq!(t.iter().count(), 0);
        Ok(())
    }

    #[test]
    fn from_parts_validates() -> Result<(), NdArrayError> {
        let storage = Storage::<i32>::from_vec((0..6).collect());
        let a = NdArray::from_parts(storage.clone(), 1, vec![2, 2], vec![3, 1], Rank::R2)?;
        assert_eq!(a.to_vec(), vec![1, 2, 4, 5]);
        assert!(!a.is_consistent());

        assert_eq!(
            NdArray::from_parts(storage.clone(), 0, vec![2, 3], vec![3, 1], Rank::R3)
                .map(|_| ()),
            Err(NdArrayError::rank_mismatch(3, 2))
        );
        assert!(matches!(
            NdArray::from_parts(storage.clone(), 2, vec![2, 3], vec![3, 1], Rank::R2),
            Err(NdArrayError::IndexOutOfBounds { .. })
        ));
        assert!(NdArray::from_parts(storage, 0, vec![2], vec![3, 1], Rank::R1).is_err());
        Ok(())
    }

    #[test]
    fn from_parts_negative_stride() -> Result<(), NdArrayError> {
        let storage = Storage::<i32>::from_vec(vec![1, 2, 3]);
        let rev = NdArray::from_parts(storage.clone(), 2, vec![3], vec![-1], Rank::R1)?;
        assert_eq!(rev.to_vec(), vec![3, 2, 1]);
        assert!(NdArray::from_parts(storage, 1, vec![3], vec![-1], Rank::R1).is_err());
        Ok(())
    }

    #[test]
    fn flat_index_row_major() -> Result<(), NdArrayError> {
        let shape = [3, 4, 5];
        let a = NdArray::<f32>::zeros(&shape)?;
        for i in 0..3 {
            for j in 0..4 {
                for k in 0..5 {
                    let expected = i * 20 + j * 5 + k;
                    assert_eq!(
                        a.flat_index(&[i as isize, j as isize, k as isize])?,
                        expected
                    );
                }
            }
        }
        assert_eq!(
            a.flat_index(&[0, 4, 0]),
            Err(NdArrayError::index_out_of_bounds(1, 4, 4))
        );
        assert_eq!(a.flat_index(&[0, 0]), Err(NdArrayError::rank_mismatch(3, 2)));
        Ok(())
    }

    #[test]
    fn zeros_ones_full() -> Result<(), NdArrayError> {
        assert_eq!(NdArray::<i16>::zeros(&[2, 2])?.to_vec(), vec![0; 4]);
        assert_eq!(NdArray::<i64>::ones(&[3])?.to_vec(), vec![1; 3]);
        let c = NdArray::<Complex64>::full(&[2], Complex64::new(1.0, 2.0))?;
        assert_eq!(c.to_vec(), vec![Complex64::new(1.0, 2.0); 2]);
        Ok(())
    }

    #[test]
    fn copy_detaches_keeps_layout() -> Result<(), NdArrayError> {
        let a = NdArray::<i32>::from_shape_vec(&[2, 3], vec![1, 2, 3, 4, 5, 6])?;
        let t = a.transpose(&[])?;
        let mut c = t.copy();
        assert_eq!(c.strides(), t.strides());
        assert!(!c.is_view());
        c.set2(0, 0, 100)?;
        assert_eq!(a.get2(0, 0)?, 1);
        assert_eq!(c, NdArray::from_shape_vec(&[3, 2], vec![100, 4, 2, 5, 3, 6])?);
        Ok(())
    }

    #[test]
    fn deep_copy_detaches() -> Result<(), NdArrayError> {
        let a = NdArray::<f64>::from_shape_vec(&[2, 2], vec![1.0, 2.0, 3.0, 4.0])?;
        let view = a.slice(Slice::new(1, 1, 1)?, 0)?;
        assert!(!view.is_consistent());

        let mut b = view.deep_copy();
        assert!(b.is_consistent());
        assert_eq!(b.storage().len(), 2);
        b.set2(0, 0, -1.0)?;
        assert_eq!(a.to_vec(), vec![1.0, 2.0, 3.0, 4.0]);
        Ok(())
    }

    #[test]
    fn reshape_size_law() -> Result<(), NdArrayError> {
        let a = NdArray::<i32>::from_shape_fn(&[2, 3, 4], |i| (i[0] * 12 + i[1] * 4 + i[2]) as i32)?;
        for shape in [vec![24], vec![4, 6], vec![2, 2, 2, 3], vec![1, 24]] {
            let r = a.reshape(&shape)?;
            assert_eq!(r.shape(), shape.as_slice());
            assert_eq!(r.to_vec(), a.to_vec());
            assert!(r.storage().ptr_eq(a.storage()));
        }
        for shape in [vec![23], vec![5, 5], vec![2, 3, 5]] {
            assert!(matches!(
                a.reshape(&shape),
                Err(NdArrayError::ShapeMismatch { .. })
            ));
        }
        Ok(())
    }

    #[test]
    fn reshape_identity_and_non_consistent() -> Result<(), NdArrayError> {
        let a = NdArray::<i32>::from_shape_vec(&[2, 3], vec![1, 2, 3, 4, 5, 6])?;
        let same = a.reshape(&[2, 3])?;
        assert!(!same.is_view());
        assert!(same.storage().ptr_eq(a.storage()));

        let t = a.transpose(&[])?;
        let r = t.reshape(&[6])?;
        assert!(!r.storage().ptr_eq(a.storage()));
        assert_eq!(r.to_vec(), vec![1, 4, 2, 5, 3, 6]);
        Ok(())
    }

    #[test]
    fn transpose_inverse() -> Result<(), NdArrayError> {
        let a = NdArray::<i64>::from_shape_fn(&[2, 3, 4], |i| (i[0] * 100 + i[1] * 10 + i[2]) as i64)?;
        let p = [2, 0, 1];
        let inv = [1, 2, 0];
        let t = a.transpose(&p)?;
        assert_eq!(t.shape(), &[4, 2, 3]);
        assert_eq!(t.get3(3, 1, 2)?, 123);
        assert_eq!(t.transpose(&inv)?, a);
        assert_eq!(a.transpose(&[])?.transpose(&[])?, a);
        Ok(())
    }

    #[test]
    fn transpose_invalid_permutation() -> Result<(), NdArrayError> {
        let a = NdArray::<f32>::zeros(&[2, 3, 4])?;
        for axes in [vec![0, 1], vec![0, 0, 1], vec![0, 1, 3]] {
            assert!(matches!(
                a.transpose(&axes),
                Err(NdArrayError::InvalidArgument(_))
            ));
        }
        Ok(())
    }

    #[test]
    fn squeeze_unsqueeze_inverse() -> Result<(), NdArrayError> {
        let a = NdArray::<i32>::from_shape_vec(&[2, 3], vec![1, 2, 3, 4, 5, 6])?;
        for k in 0..=2 {
            let u = a.unsqueeze(&[k])?;
            assert_eq!(u.ndim(), 3);
            assert_eq!(u.shape()[k], 1);
            assert_eq!(u.squeeze(&[k])?, a);
        }
        let t = a.transpose(&[])?;
        assert_eq!(t.unsqueeze(&[1])?.squeeze(&[1])?, t);
        Ok(())
    }

    #[test]
    fn squeeze_rules() -> Result<(), NdArrayError> {
        let a = NdArray::<i8>::zeros(&[1, 3, 1])?;
        assert_eq!(a.squeeze(&[])?.shape(), &[3]);
        assert_eq!(a.squeeze(&[2])?.shape(), &[1, 3]);
        assert!(matches!(a.squeeze(&[1]), Err(NdArrayError::InvalidArgument(_))));
        assert!(a.squeeze(&[3]).is_err());

        let ones = NdArray::<i8>::zeros(&[1, 1])?;
        assert_eq!(ones.squeeze(&[])?.shape(), &[1]);
        assert!(ones.squeeze(&[0, 1]).is_err());
        Ok(())
    }

    #[test]
    fn unsqueeze_rules() -> Result<(), NdArrayError> {
        let a = NdArray::<f32>::zeros(&[2, 3])?;
        assert_eq!(a.unsqueeze(&[0, 3])?.shape(), &[1, 2, 3, 1]);
        assert!(a.unsqueeze(&[4]).is_err());
        assert!(a.unsqueeze(&[1, 1]).is_err());
        Ok(())
    }

    #[test]
    fn fill_and_map() -> Result<(), NdArrayError> {
        let mut a = NdArray::<i32>::zeros(&[2, 2])?;
        let mut col = a.slice(Slice::new(-1, -1, 1)?, 0)?.transpose(&[])?;
        col.fill(7)?;
        assert_eq!(a.to_vec(), vec![7; 4]);
        a.fill(1)?;
        assert_eq!(a.map(|x| x as f32 * 0.5).to_vec(), vec![0.5; 4]);
        Ok(())
    }

    #[test]
    fn map_floats_through_view() -> Result<(), NdArrayError> {
        let a = NdArray::<f64>::from_shape_fn(&[2, 3], |i| (i[0] * 3 + i[1]) as f64 * 0.1)?;
        let m = a.transpose(&[])?.map(|x| (x * std::f64::consts::PI).sin());
        assert!(m.is_consistent());
        for (x, i) in m.iter().zip([0, 3, 1, 4, 2, 5]) {
            let expected = (i as f64 * 0.1 * std::f64::consts::PI).sin();
            assert_relative_eq!(x, expected, epsilon = 1e-12);
        }

        let mut f = NdArray::<f32>::zeros(&[3])?;
        f.fill(1.0 / 3.0)?;
        let sum: f32 = f.iter().sum();
        assert_relative_eq!(sum, 1.0, epsilon = 1e-6);
        Ok(())
    }

    #[test]
    #[should_panic]
    fn contiguous_raw_guard_blocks_writes() {
        let a = NdArray::<i32>::zeros(&[2]).unwrap();
        let mut alias = a.clone();
        let _guard = a.contiguous_raw();
        let _ = alias.set1(0, 1);
    }

    #[test]
    fn display_nested() -> Result<(), NdArrayError> {
        let a = NdArray::<i32>::from_shape_vec(&[2, 3], vec![1, 2, 3, 4, 5, 6])?;
        assert_eq!(a.to_string(), "[[1, 2, 3], [4, 5, 6]]");
        assert_eq!(a.transpose(&[])?.to_string(), "[[1, 4], [2, 5], [3, 6]]");
        let c = NdArray::<Complex64>::from_shape_vec(&[1], vec![Complex64::new(1.0, 2.0)])?;
        assert_eq!(c.to_string(), "[1+2i]");
        Ok(())
    }

    #[test]
    fn equality_checks_shape() -> Result<(), NdArrayError> {
        let a = NdArray::<i32>::from_shape_vec(&[2, 2], vec![1, 2, 3, 4])?;
        let b = NdArray::<i32>::from_shape_vec(&[4], vec![1, 2, 3, 4])?;
        assert_ne!(a, b);
        assert_eq!(a, a.copy());
        Ok(())
    }

    #[test]
    fn contiguous_raw_only_when_consistent() -> Result<(), NdArrayError> {
        let a = NdArray::<i32>::from_shape_vec(&[2, 2], vec![1, 2, 3, 4])?;
        assert_eq!(a.contiguous_raw().as_deref(), Some(&[1, 2, 3, 4][..]));
        assert!(a.transpose(&[])?.contiguous_raw().is_none());
        Ok(())
    }
}
