//! Compressed sparse matrices and sparse vectors.
//!
//! A sparse matrix stores, for each lane along the compressed axis of its storage order, the
//! sorted inner indices of its stored entries and their values. Assigning a sparse matrix to a
//! dense view only touches the stored entries. A sparse vector is a single such lane.

use crate::{order::StorageOrder, simd::Scalar};

mod matown;
mod vector;

pub use matown::SparseMat;
pub use vector::SparseVector;

/// Readable sparse matrix operand.
pub trait SparseMatrix {
    /// Element type.
    type Elem: Scalar;
    /// Storage order: the compressed axis is the outer axis of this order.
    type Order: StorageOrder;

    /// Number of rows.
    fn nrows(&self) -> usize;
    /// Number of columns.
    fn ncols(&self) -> usize;

    /// Returns the inner indices and values of the stored entries of lane `k`, with the indices
    /// sorted in increasing order.
    ///
    /// # Panics
    /// The function panics if `k` is not smaller than the number of lanes.
    fn lane(&self, k: usize) -> (&[usize], &[Self::Elem]);

    /// Returns `true` if the operand may refer to the matrix at address `addr`.
    fn can_alias(&self, addr: *const ()) -> bool;
}

impl<S: SparseMatrix + ?Sized> SparseMatrix for &S {
    type Elem = S::Elem;
    type Order = S::Order;

    #[inline]
    fn nrows(&self) -> usize {
        (**self).nrows()
    }
    #[inline]
    fn ncols(&self) -> usize {
        (**self).ncols()
    }
    #[inline]
    fn lane(&self, k: usize) -> (&[usize], &[Self::Elem]) {
        (**self).lane(k)
    }
    #[inline]
    fn can_alias(&self, addr: *const ()) -> bool {
        (**self).can_alias(addr)
    }
}

/// Errors that can occur when building a sparse matrix.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
#[non_exhaustive]
pub enum CreationError {
    /// Matrix index out-of-bounds error.
    OutOfBounds {
        /// Row of the out-of-bounds index.
        row: usize,
        /// Column of the out-of-bounds index.
        col: usize,
    },
    /// Vector index out-of-bounds error.
    IndexOutOfBounds {
        /// The out-of-bounds index.
        index: usize,
        /// Length of the vector.
        len: usize,
    },
}

impl core::fmt::Display for CreationError {
    #[inline]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::OutOfBounds { row, col } => {
                write!(f, "entry ({row}, {col}) lies outside of the matrix")
            }
            Self::IndexOutOfBounds { index, len } => {
                write!(f, "entry {index} lies outside of a vector of length {len}")
            }
        }
    }
}

impl std::error::Error for CreationError {}
