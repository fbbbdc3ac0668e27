use std::borrow::Cow;

use crate::{element::Element, storage::Storage, NdArray, NdArrayError};

impl<T: Element> NdArray<T> {
    /// Concatenates `self` and `others` along `axis`.
    ///
    /// Every array must have the same rank and identical sizes on every other
    /// axis. The result is always a new consistent root.
    ///
    /// # Errors
    ///
    /// * [`NdArrayError::InvalidArgument`] if `axis` is out of range.
    /// * [`NdArrayError::ShapeMismatch`] if the ranks or a non-concatenated axis differ.
    ///
    /// # Example
    ///
    /// ```
    /// use kornia_ndarray::NdArray;
    ///
    /// let a = NdArray::<i32>::from_shape_vec(&[2, 1], vec![1, 2]).unwrap();
    /// let b = NdArray::<i32>::from_shape_vec(&[2, 2], vec![3, 4, 5, 6]).unwrap();
    /// let c = a.cat(&[&b], 1).unwrap();
    /// assert_eq!(c.shape(), &[2, 3]);
    /// assert_eq!(c.to_vec(), vec![1, 3, 4, 2, 5, 6]);
    /// ```
    pub fn cat(&self, others: &[&NdArray<T>], axis: usize) -> Result<Self, NdArrayError> {
        let rank = self.shape.len();
        if axis >= rank {
            return Err(NdArrayError::invalid_argument(format!(
                "concatenation axis {axis} out of range for rank {rank}"
            )));
        }

        let mut out_shape = self.shape.clone();
        for other in others {
            if other.shape.len() != rank {
                return Err(NdArrayError::shape_mismatch(
                    "concatenated arrays must have the same rank",
                    &self.shape,
                    &other.shape,
                ));
            }
            for (k, (&a, &b)) in self.shape.iter().zip(other.shape.iter()).enumerate() {
                if k != axis && a != b {
                    return Err(NdArrayError::ShapeMismatch {
                        message: format!(
                            "concatenation along axis {axis} requires axis {k} to match"
                        ),
                        expected: format!("{:?}", self.shape),
                        actual: format!("{:?}", other.shape),
                    });
                }
            }
            out_shape[axis] += other.shape[axis];
        }

        let sources: Vec<Cow<'_, NdArray<T>>> = std::iter::once(self)
            .chain(others.iter().copied())
            .map(|a| {
                if a.is_consistent() {
                    Cow::Borrowed(a)
                } else {
                    Cow::Owned(a.deep_copy())
                }
            })
            .collect();

        // rows of the result: one block per source per outer index
        let outer = self.shape[..axis].iter().product::<usize>();
        let inner = self.shape[axis + 1..].iter().product::<usize>();
        let out_chunk = out_shape[axis] * inner;
        let numel = outer * out_chunk;
        log::debug!(
            "cat {} arrays along axis {axis} into {out_shape:?}",
            sources.len()
        );

        let storage = Storage::<T>::zeros(numel);
        let mut column = 0;
        for source in &sources {
            let chunk = source.shape[axis] * inner;
            if chunk > 0 {
                for o in 0..outer {
                    source.storage.copy_into(
                        &storage,
                        o * out_chunk + column,
                        o * chunk,
                        (o + 1) * chunk,
                    )?;
                }
            }
            column += chunk;
        }

        NdArray::from_storage(storage, &out_shape)
    }
}

/// Concatenates a non-empty list of arrays along `axis`.
///
/// # Errors
///
/// Returns [`NdArrayError::InvalidArgument`] for an empty list, and otherwise
/// the errors of [`NdArray::cat`].
pub fn concatenate<T: Element>(
    arrays: &[&NdArray<T>],
    axis: usize,
) -> Result<NdArray<T>, NdArrayError> {
    let (first, rest) = arrays
        .split_first()
        .ok_or_else(|| NdArrayError::invalid_argument("nothing to concatenate"))?;
    first.cat(rest, axis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cat_axis0() -> Result<(), NdArrayError> {
        let a = NdArray::<i32>::from_shape_vec(&[1, 2], vec![1, 2])?;
        let b = NdArray::<i32>::from_shape_vec(&[2, 2], vec![3, 4, 5, 6])?;
        let c = a.cat(&[&b], 0)?;
        assert_eq!(c.shape(), &[3, 2]);
        assert_eq!(c.to_vec(), vec![1, 2, 3, 4, 5, 6]);
        assert!(c.is_consistent());
        assert!(!c.is_view());
        Ok(())
    }

    #[test]
    fn cat_shape_law_any_rank() -> Result<(), NdArrayError> {
        let a = NdArray::<i64>::from_shape_fn(&[2, 3, 1, 2, 2], |i| i.iter().sum::<usize>() as i64)?;
        let b = NdArray::<i64>::ones(&[2, 3, 4, 2, 2])?;
        let c = a.cat(&[&b, &a], 2)?;
        assert_eq!(c.shape(), &[2, 3, 6, 2, 2]);
        assert_eq!(c.size(), a.size() * 2 + b.size());
        for i in 0..2 {
            for j in 0..3 {
                assert_eq!(c.get(&[i, j, 0, 1, 1])?, a.get(&[i, j, 0, 1, 1])?);
                assert_eq!(c.get(&[i, j, 3, 0, 1])?, 1);
                assert_eq!(c.get(&[i, j, 5, 1, 0])?, a.get(&[i, j, 0, 1, 0])?);
            }
        }
        Ok(())
    }

    #[test]
    fn cat_non_consistent_sources() -> Result<(), NdArrayError> {
        let a = NdArray::<f32>::from_shape_vec(&[2, 2], vec![1.0, 2.0, 3.0, 4.0])?;
        let t = a.transpose(&[])?;
        let c = concatenate(&[&a, &t], 1)?;
        assert_eq!(c.to_vec(), vec![1.0, 2.0, 1.0, 3.0, 3.0, 4.0, 2.0, 4.0]);
        Ok(())
    }

    #[test]
    fn cat_errors() -> Result<(), NdArrayError> {
        let a = NdArray::<i8>::zeros(&[2, 3])?;
        let b = NdArray::<i8>::zeros(&[3, 3])?;
        let c = NdArray::<i8>::zeros(&[2, 3, 1])?;
        assert!(matches!(a.cat(&[&b], 1), Err(NdArrayError::ShapeMismatch { .. })));
        assert!(a.cat(&[&b], 0).is_ok());
        assert!(matches!(a.cat(&[&b], 2), Err(NdArrayError::InvalidArgument(_))));
        assert!(matches!(a.cat(&[&c], 0), Err(NdArrayError::ShapeMismatch { .. })));
        assert!(concatenate::<i8>(&[], 0).is_err());
        Ok(())
    }
}
