use crate::{element::Element, rank::Rank, NdArray, NdArrayError};

macro_rules! fixed_rank_access {
    ($get:ident, $set:ident, $rank:ident, $($idx:ident),+) => {
        #[doc = concat!("Returns the element of a [`Rank::", stringify!($rank), "`] array.")]
        ///
        /// # Errors
        ///
        /// * [`NdArrayError::RankMismatch`] for arrays of another rank.
        /// * [`NdArrayError::IndexOutOfBounds`] naming the first offending axis.
        #[inline]
        pub fn $get(&self, $($idx: isize),+) -> Result<T, NdArrayError> {
            self.require_rank(Rank::$rank)?;
            let flat = self.flat_of([$($idx),+])?;
            Ok(self.storage.get_unchecked(flat))
        }

        #[doc = concat!("Writes the element of a [`Rank::", stringify!($rank), "`] array.")]
        ///
        /// # Errors
        ///
        /// * [`NdArrayError::UnsupportedOperation`] for read-only arrays.
        /// * [`NdArrayError::RankMismatch`] for arrays of another rank.
        /// * [`NdArrayError::IndexOutOfBounds`] naming the first offending axis.
        #[inline]
        pub fn $set(&mut self, $($idx: isize,)+ value: T) -> Result<(), NdArrayError> {
            self.ensure_writeable(stringify!($set))?;
            self.require_rank(Rank::$rank)?;
            let flat = self.flat_of([$($idx),+])?;
            self.storage.set_unchecked(flat, value);
            Ok(())
        }
    };
}

impl<T: Element> NdArray<T> {
    fixed_rank_access!(get1, set1, R1, i);
    fixed_rank_access!(get2, set2, R2, i, j);
    fixed_rank_access!(get3, set3, R3, i, j, k);
    fixed_rank_access!(get4, set4, R4, i, j, k, l);

    /// Returns the element at a multi-index of any rank.
    ///
    /// # Errors
    ///
    /// * [`NdArrayError::RankMismatch`] if `index.len()` differs from the rank.
    /// * [`NdArrayError::IndexOutOfBounds`] naming the first offending axis.
    ///
    /// # Example
    ///
    /// ```
    /// use kornia_ndarray::{NdArray, NdArrayError};
    ///
    /// let a = NdArray::<f32>::from_shape_vec(&[3], vec![1.0, 2.0, 3.0]).unwrap();
    /// assert_eq!(a.get(&[2]).unwrap(), 3.0);
    /// assert_eq!(a.get(&[-1]), Err(NdArrayError::index_out_of_bounds(0, -1, 3)));
    /// ```
    pub fn get(&self, index: &[isize]) -> Result<T, NdArrayError> {
        let flat = self.flat_index(index)?;
        Ok(self.storage.get_unchecked(flat))
    }

    /// Writes the element at a multi-index of any rank.
    ///
    /// # Errors
    ///
    /// * [`NdArrayError::UnsupportedOperation`] for read-only arrays.
    /// * [`NdArrayError::RankMismatch`] if `index.len()` differs from the rank.
    /// * [`NdArrayError::IndexOutOfBounds`] naming the first offending axis.
    pub fn set(&mut self, index: &[isize], value: T) -> Result<(), NdArrayError> {
        self.ensure_writeable("set")?;
        let flat = self.flat_index(index)?;
        self.storage.set_unchecked(flat, value);
        Ok(())
    }
}
