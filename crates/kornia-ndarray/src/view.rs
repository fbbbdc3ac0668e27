use crate::{element::Element, NdArray, NdArrayError};

impl<T: Element> NdArray<T> {
    fn view_impl(
        &self,
        indices: &[isize],
        axes: &[usize],
        writeable: bool,
    ) -> Result<Self, NdArrayError> {
        let rank = self.shape.len();
        if indices.len() != axes.len() {
            return Err(NdArrayError::invalid_argument(format!(
                "{} indices given for {} axes",
                indices.len(),
                axes.len()
            )));
        }
        let mut drop = vec![false; rank];
        for &axis in axes {
            if axis >= rank || drop[axis] {
                return Err(NdArrayError::invalid_argument(format!(
                    "view axes {axes:?} invalid for rank {rank}"
                )));
            }
            drop[axis] = true;
        }
        if !axes.is_empty() && axes.len() >= rank {
            return Err(NdArrayError::shape_mismatch(
                "a view must keep at least one axis",
                &[axes.len() + 1],
                &self.shape,
            ));
        }

        let mut offset = self.offset as isize;
        for (&index, &axis) in indices.iter().zip(axes.iter()) {
            let index = self.check_axis(axis, index)?;
            offset += self.strides[axis] * index as isize;
        }

        let mut shape = Vec::with_capacity(rank - axes.len());
        let mut strides = Vec::with_capacity(rank - axes.len());
        for axis in (0..rank).filter(|&axis| !drop[axis]) {
            shape.push(self.shape[axis]);
            strides.push(self.strides[axis]);
        }
        log::trace!("view of {:?} at {indices:?} on axes {axes:?}", self.shape);
        Ok(self.derive(offset as usize, shape, strides, writeable))
    }

    /// Fixes one axis at `index` and drops it.
    ///
    /// The result is a read-only view of rank `ndim - 1`.
    ///
    /// # Errors
    ///
    /// * [`NdArrayError::InvalidArgument`] if `axis` is out of range.
    /// * [`NdArrayError::ShapeMismatch`] if `self` has a single axis.
    /// * [`NdArrayError::IndexOutOfBounds`] if `index` is outside the axis.
    ///
    /// # Example
    ///
    /// ```
    /// use kornia_ndarray::NdArray;
    ///
    /// let a = NdArray::<i32>::from_shape_vec(&[2, 3], vec![1, 2, 3, 4, 5, 6]).unwrap();
    /// let col = a.view(1, 1).unwrap();
    /// assert_eq!(col.to_vec(), vec![2, 5]);
    /// assert!(!col.is_writeable());
    /// ```
    pub fn view(&self, index: isize, axis: usize) -> Result<Self, NdArrayError> {
        self.view_impl(&[index], &[axis], false)
    }

    /// Fixes several axes at once and drops them, producing a read-only view.
    ///
    /// `indices[k]` applies to `axes[k]`; offsets are taken against the
    /// original axes, so the order of the pairs does not matter.
    pub fn view_axes(&self, indices: &[isize], axes: &[usize]) -> Result<Self, NdArrayError> {
        self.view_impl(indices, axes, false)
    }

    /// Writeable counterpart of [`NdArray::view`].
    ///
    /// # Errors
    ///
    /// Returns [`NdArrayError::UnsupportedOperation`] if `self` is read-only, and
    /// otherwise the errors of [`NdArray::view`].
    pub fn view_mut(&self, index: isize, axis: usize) -> Result<Self, NdArrayError> {
        self.ensure_writeable("view_mut")?;
        self.view_impl(&[index], &[axis], true)
    }

    /// Writeable counterpart of [`NdArray::view_axes`].
    pub fn view_axes_mut(&self, indices: &[isize], axes: &[usize]) -> Result<Self, NdArrayError> {
        self.ensure_writeable("view_axes_mut")?;
        self.view_impl(indices, axes, true)
    }

    /// Applies `view(index, 0)` for every index from left to right.
    ///
    /// # Example
    ///
    /// ```
    /// use kornia_ndarray::NdArray;
    ///
    /// let a = NdArray::<i32>::from_shape_fn(&[2, 3, 4], |i| (i[0] * 12 + i[1] * 4 + i[2]) as i32).unwrap();
    /// let row = a.select(&[1, 2]).unwrap();
    /// assert_eq!(row.to_vec(), vec![20, 21, 22, 23]);
    /// ```
    pub fn select(&self, indices: &[isize]) -> Result<Self, NdArrayError> {
        indices.iter().try_fold(
            self.derive(self.offset, self.shape.clone(), self.strides.clone(), false),
            |acc, &i| acc.view(i, 0),
        )
    }

    /// Writeable counterpart of [`NdArray::select`].
    pub fn select_mut(&self, indices: &[isize]) -> Result<Self, NdArrayError> {
        self.ensure_writeable("select_mut")?;
        indices.iter().try_fold(
            self.derive(self.offset, self.shape.clone(), self.strides.clone(), true),
            |acc, &i| acc.view_mut(i, 0),
        )
    }
}
