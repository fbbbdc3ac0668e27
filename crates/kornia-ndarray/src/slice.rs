//! Strided slices along one or several axes.

use std::ops::{Range, RangeFull, RangeInclusive};

use crate::{element::Element, NdArray, NdArrayError};

/// A strided, inclusive range along one axis.
///
/// Both bounds are inclusive. `-1` passed to [`Slice::new`] is a sentinel:
/// as `start` it means the first element of the axis, as `stop` the last one.
///
/// # Examples
///
/// ```
/// use kornia_ndarray::{NdArray, Slice};
///
/// let a = NdArray::<i32>::from_shape_vec(&[5], vec![0, 1, 2, 3, 4]).unwrap();
/// let s = a.slice(Slice::new(1, -1, 2).unwrap(), 0).unwrap();
/// assert_eq!(s.to_vec(), vec![1, 3]);
/// let r = a.slice(1..3, 0).unwrap();
/// assert_eq!(r.to_vec(), vec![1, 2]);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Slice {
    start: Option<isize>,
    stop: Option<isize>,
    step: isize,
}

impl Slice {
    /// Creates a slice from inclusive bounds and a positive step.
    ///
    /// # Errors
    ///
    /// Returns [`NdArrayError::InvalidArgument`] if `step <= 0`.
    pub fn new(start: isize, stop: isize, step: isize) -> Result<Self, NdArrayError> {
        if step <= 0 {
            return Err(NdArrayError::invalid_argument(format!(
                "slice step must be positive, got {step}"
            )));
        }
        Ok(Self {
            start: (start != -1).then_some(start),
            stop: (stop != -1).then_some(stop),
            step,
        })
    }

    /// The whole axis with step 1.
    pub const fn all() -> Self {
        Self {
            start: None,
            stop: None,
            step: 1,
        }
    }

    /// Returns the explicit start, `None` for the beginning of the axis.
    pub fn start(&self) -> Option<isize> {
        self.start
    }

    /// Returns the explicit inclusive stop, `None` for the end of the axis.
    pub fn stop(&self) -> Option<isize> {
        self.stop
    }

    /// Returns the step.
    pub fn step(&self) -> isize {
        self.step
    }

    /// Resolves the slice against an axis of `size` elements.
    ///
    /// Returns the first index and the number of selected elements.
    pub(crate) fn resolve(&self, axis: usize, size: usize) -> Result<(usize, usize), NdArrayError> {
        let stop = match self.stop {
            None => size as isize - 1,
            Some(stop) if stop < -1 || stop >= size as isize => {
                return Err(NdArrayError::index_out_of_bounds(axis, stop, size));
            }
            Some(stop) => stop,
        };
        let start = match self.start {
            None => 0,
            Some(start) => {
                if start < 0 {
                    return Err(NdArrayError::index_out_of_bounds(axis, start, size));
                }
                // `n..n` converts to (n, n - 1) and may start one past the end
                let empty_range = self.stop == Some(start - 1) && start <= size as isize;
                if start >= size as isize && !empty_range {
                    return Err(NdArrayError::index_out_of_bounds(axis, start, size));
                }
                start
            }
        };
        let len = if start <= stop {
            ((stop - start) / self.step + 1) as usize
        } else {
            0
        };
        Ok((start as usize, len))
    }

    /// Returns the stride of an axis of `len` elements taken every `step`.
    ///
    /// Axes of at most one element never advance, so they keep `stride`.
    pub(crate) fn stepped_stride(
        &self,
        axis: usize,
        stride: isize,
        len: usize,
    ) -> Result<isize, NdArrayError> {
        if len <= 1 {
            return Ok(stride);
        }
        stride.checked_mul(self.step).ok_or_else(|| {
            NdArrayError::invalid_argument(format!(
                "slice step {} overflows the stride {stride} of axis {axis}",
                self.step
            ))
        })
    }
}

impl Default for Slice {
    fn default() -> Self {
        Self::all()
    }
}

impl From<Range<usize>> for Slice {
    /// Half-open range converted to inclusive bounds.
    fn from(range: Range<usize>) -> Self {
        Self {
            start: Some(range.start as isize),
            stop: Some(range.end as isize - 1),
            step: 1,
        }
    }
}

impl From<RangeInclusive<usize>> for Slice {
    fn from(range: RangeInclusive<usize>) -> Self {
        Self {
            start: Some(*range.start() as isize),
            stop: Some(*range.end() as isize),
            step: 1,
        }
    }
}

impl From<RangeFull> for Slice {
    fn from(_: RangeFull) -> Self {
        Self::all()
    }
}

/// Selection applied to one axis by [`NdArray::slice_axes`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Indexing {
    /// Keep the axis, restricted to a slice.
    Slice(Slice),
    /// Fix the axis at one index and drop it.
    Index(isize),
}

impl From<Slice> for Indexing {
    fn from(slice: Slice) -> Self {
        Self::Slice(slice)
    }
}

impl From<isize> for Indexing {
    fn from(index: isize) -> Self {
        Self::Index(index)
    }
}

impl From<Range<usize>> for Indexing {
    fn from(range: Range<usize>) -> Self {
        Self::Slice(range.into())
    }
}

impl From<RangeInclusive<usize>> for Indexing {
    fn from(range: RangeInclusive<usize>) -> Self {
        Self::Slice(range.into())
    }
}

impl From<RangeFull> for Indexing {
    fn from(range: RangeFull) -> Self {
        Self::Slice(range.into())
    }
}

impl<T: Element> NdArray<T> {
    fn check_axis_index(&self, axis: usize) -> Result<(), NdArrayError> {
        if axis >= self.shape.len() {
            return Err(NdArrayError::invalid_argument(format!(
                "axis {axis} out of range for rank {}",
                self.shape.len()
            )));
        }
        Ok(())
    }

    /// Restricts one axis to a strided range, keeping the rank.
    ///
    /// The result shares storage and keeps the writeability of `self`.
    ///
    /// # Errors
    ///
    /// * [`NdArrayError::InvalidArgument`] if `axis` is out of range or the step
    ///   overflows its stride.
    /// * [`NdArrayError::IndexOutOfBounds`] if an explicit bound lies outside the axis.
    pub fn slice(&self, slice: impl Into<Slice>, axis: usize) -> Result<Self, NdArrayError> {
        self.check_axis_index(axis)?;
        let slice = slice.into();
        let (start, len) = slice.resolve(axis, self.shape[axis])?;

        let mut shape = self.shape.clone();
        let mut strides = self.strides.clone();
        let mut offset = self.offset;
        if len > 0 {
            offset = (offset as isize + self.strides[axis] * start as isize) as usize;
        }
        strides[axis] = slice.stepped_stride(axis, strides[axis], len)?;
        shape[axis] = len;
        log::trace!("slice axis {axis} of {:?} by {slice:?}", self.shape);
        Ok(self.derive(offset, shape, strides, self.writeable))
    }

    /// Applies a selection to several axes in one pass.
    ///
    /// Offsets are accumulated against the original axes; axes fixed by
    /// [`Indexing::Index`] are dropped after every selection is applied.
    ///
    /// # Errors
    ///
    /// * [`NdArrayError::InvalidArgument`] for out-of-range or repeated axes.
    /// * [`NdArrayError::IndexOutOfBounds`] for out-of-range indices or bounds.
    /// * [`NdArrayError::ShapeMismatch`] if every axis would be dropped.
    ///
    /// # Example
    ///
    /// ```
    /// use kornia_ndarray::{Indexing, NdArray};
    ///
    /// let a = NdArray::<i32>::from_shape_fn(&[3, 4], |i| (i[0] * 4 + i[1]) as i32).unwrap();
    /// let row = a.slice_axes([(0, Indexing::Index(1)), (1, Indexing::from(1..3))]).unwrap();
    /// assert_eq!(row.to_vec(), vec![5, 6]);
    /// ```
    pub fn slice_axes<I>(&self, selections: I) -> Result<Self, NdArrayError>
    where
        I: IntoIterator<Item = (usize, Indexing)>,
    {
        let rank = self.shape.len();
        let mut seen = vec![false; rank];
        let mut drop = vec![false; rank];
        let mut shape = self.shape.clone();
        let mut strides = self.strides.clone();
        let mut offset = self.offset as isize;
        let mut empty = false;

        for (axis, selection) in selections {
            self.check_axis_index(axis)?;
            if seen[axis] {
                return Err(NdArrayError::invalid_argument(format!(
                    "axis {axis} selected twice"
                )));
            }
            seen[axis] = true;
            match selection {
                Indexing::Index(index) => {
                    let index = self.check_axis(axis, index)?;
                    offset += self.strides[axis] * index as isize;
                    drop[axis] = true;
                }
                Indexing::Slice(slice) => {
                    let (start, len) = slice.resolve(axis, self.shape[axis])?;
                    if len > 0 {
                        offset += self.strides[axis] * start as isize;
                    } else {
                        empty = true;
                    }
                    strides[axis] = slice.stepped_stride(axis, strides[axis], len)?;
                    shape[axis] = len;
                }
            }
        }

        if drop.iter().all(|&d| d) {
            return Err(NdArrayError::shape_mismatch(
                "selection would drop every axis",
                &[1],
                &[0],
            ));
        }
        if empty {
            offset = self.offset as isize;
        }

        let mut kept_shape = Vec::with_capacity(rank);
        let mut kept_strides = Vec::with_capacity(rank);
        for axis in (0..rank).filter(|&axis| !drop[axis]) {
            kept_shape.push(shape[axis]);
            kept_strides.push(strides[axis]);
        }
        Ok(self.derive(offset as usize, kept_shape, kept_strides, self.writeable))
    }
}
