#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
//!
//! # Overview
//!
//! `kornia-ndarray` provides [`NdArray`], a dense multi-dimensional array of any
//! rank over one of eight primitive element kinds: `i8`, `i16`, `i32`, `i64`,
//! `f32`, `f64` and the complex kinds [`num_complex::Complex32`] and
//! [`num_complex::Complex64`].
//!
//! An array is a shape/stride/offset record over a shared [`Storage`] buffer.
//! Indexing, slicing, transposing and reshaping derive new records over the
//! same buffer without copying, so writes through one view are visible through
//! every other.
//!
//! # Architecture
//!
//! - **Storage**: flat, fixed-length, reference-counted buffers of one element kind
//! - **Rank**: value-compared rank tokens with dedicated variants for ranks 1 to 4
//! - **NdArray**: the shape/stride/offset engine with row-major iteration
//! - **Views**: axis selection, strided slices, transposition and reshaping
//! - **Access**: bounds-checked typed element reads and writes
//! - **DynArray**: dtype-erased arrays for runtime dispatch
//!
//! # Quick Start
//!
//! ```rust
//! use kornia_ndarray::{NdArray, Slice};
//!
//! let a = NdArray::<i32>::from_shape_vec(&[2, 3], vec![1, 2, 3, 4, 5, 6]).unwrap();
//!
//! // transpose and slice without copying
//! let t = a.transpose(&[]).unwrap();
//! let mut corner = t.slice(Slice::new(0, 1, 1).unwrap(), 0).unwrap()
//!     .slice(Slice::new(0, 1, 1).unwrap(), 1).unwrap();
//! assert_eq!(corner.shape(), &[2, 2]);
//!
//! // writes are visible through the root
//! corner.set2(1, 1, 50).unwrap();
//! assert_eq!(a.get2(1, 1).unwrap(), 50);
//! ```

/// Typed element access by multi-index.
pub mod access;

/// Bincode module for binary serialization and deserialization.
///
/// This module provides binary serialization support for arrays when the
/// `bincode` feature is enabled.
#[cfg(feature = "bincode")]
pub mod bincode;

/// Concatenation of arrays along an axis.
pub mod concat;

/// Element kind tags.
pub mod dtype;

/// Arrays whose element kind is chosen at runtime.
pub mod dyn_array;

/// The sealed element trait and its implementations.
pub mod element;

/// Error types for the array core.
pub mod error;

/// Row-major iterators over strided arrays.
pub mod iter;

/// The array engine.
///
/// This module provides [`ndarray::NdArray`], its constructors and the
/// shape-level operations: reshape, transpose, squeeze and unsqueeze.
pub mod ndarray;

/// Rank tokens.
pub mod rank;

/// Serde module for JSON/other format serialization and deserialization.
///
/// This module provides serialization support for arrays when the `serde`
/// feature is enabled.
#[cfg(feature = "serde")]
pub mod serde;

/// Strided slices and multi-axis selections.
pub mod slice;

/// Storage module containing the shared element buffers.
///
/// This module provides [`storage::Storage`] which owns the elements shared by
/// an array and all of its views.
pub mod storage;

/// Views fixing one or several axes.
pub mod view;

pub use crate::concat::concatenate;
pub use crate::dtype::DType;
pub use crate::dyn_array::DynArray;
pub use crate::element::Element;
pub use crate::error::NdArrayError;
pub use crate::iter::{FlatIndices, Iter};
pub use crate::ndarray::{canonical_strides, NdArray};
pub use crate::rank::Rank;
pub use crate::slice::{Indexing, Slice};
pub use crate::storage::Storage;

pub use num_complex::{Complex32, Complex64};
