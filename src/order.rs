//! Compile-time storage orders.
//!
//! Every owned matrix stores its elements lane by lane. A lane is a row for [`RowMajor`] storage
//! and a column for [`ColMajor`] storage; elements inside a lane are contiguous in memory. The
//! terms "outer" and "inner" used throughout the crate refer to the lane index and the position
//! inside the lane respectively.

use core::fmt::Debug;

/// Row-major storage: each row is contiguous.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RowMajor;

/// Column-major storage: each column is contiguous.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ColMajor;

/// Storage order, determined at compile time.
pub trait StorageOrder: crate::seal::Seal + Copy + Debug + Default + Send + Sync + 'static {
    /// `true` for [`RowMajor`].
    const ROW_MAJOR: bool;
    /// The opposite storage order.
    type Flip: StorageOrder<Flip = Self>;

    /// Number of lanes of a `nrows × ncols` matrix.
    #[inline(always)]
    fn outer_dim(nrows: usize, ncols: usize) -> usize {
        if Self::ROW_MAJOR {
            nrows
        } else {
            ncols
        }
    }

    /// Length of each lane of a `nrows × ncols` matrix.
    #[inline(always)]
    fn inner_dim(nrows: usize, ncols: usize) -> usize {
        if Self::ROW_MAJOR {
            ncols
        } else {
            nrows
        }
    }

    /// Maps `(row, col)` to `(outer, inner)`.
    #[inline(always)]
    fn split(row: usize, col: usize) -> (usize, usize) {
        if Self::ROW_MAJOR {
            (row, col)
        } else {
            (col, row)
        }
    }

    /// Maps `(outer, inner)` back to `(row, col)`.
    #[inline(always)]
    fn join(outer: usize, inner: usize) -> (usize, usize) {
        if Self::ROW_MAJOR {
            (outer, inner)
        } else {
            (inner, outer)
        }
    }
}

impl StorageOrder for RowMajor {
    const ROW_MAJOR: bool = true;
    type Flip = ColMajor;
}

impl StorageOrder for ColMajor {
    const ROW_MAJOR: bool = false;
    type Flip = RowMajor;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_join_roundtrip() {
        assert_eq!(RowMajor::split(2, 5), (2, 5));
        assert_eq!(ColMajor::split(2, 5), (5, 2));
        assert_eq!(ColMajor::join(5, 2), (2, 5));
        assert_eq!(RowMajor::outer_dim(3, 7), 3);
        assert_eq!(ColMajor::outer_dim(3, 7), 7);
        assert_eq!(ColMajor::inner_dim(3, 7), 3);
    }
}
