//! `densa` provides dense storage building blocks for numerical code: a register-aligned growable
//! buffer, row- and column-major matrices with per-lane padding, and rectangular views into them
//! that can be assigned from dense or sparse expressions of either storage order.
//!
//! Bulk assignments are routed through a single dispatcher (see [`kernel`]) that picks a
//! vectorized, scalar, blocked or sparse kernel from the static properties of the operands. When
//! the source of an assignment refers to the matrix being written, it is evaluated into a
//! temporary first, so that overlapping assignments behave as copies.
//!
//! # Example
//! ```
//! use densa::{mat, scale, submatrix, DenseMatrix, Mat};
//!
//! let a = Mat::<f64>::from_fn(10, 10, |i, j| (10 * i + j) as f64);
//! let view = submatrix(&a, 2, 3, 4, 4);
//! assert_eq!(view.read(0, 0), 23.0);
//! assert_eq!(view.read(3, 3), 56.0);
//!
//! let mut b = Mat::<f64>::zeros(6, 6);
//! b.submatrix_mut(1, 1, 4, 4).try_assign(&(view * scale(2.0f64))).unwrap();
//! assert_eq!(b.read(1, 1), 46.0);
//!
//! let c = mat![[1.0, 2.0], [3.0, 4.0f64]];
//! assert_eq!((&c * &c).eval(), mat![[7.0, 10.0], [15.0, 22.0f64]]);
//! ```
//!
//! # Logging
//! The crate emits records through the [`log`] facade and installs no logger. The dispatcher
//! traces the kernel it selects, and the `densa_perf` target reports slow paths: assignments
//! between opposite storage orders and sources evaluated into a temporary because of aliasing.

#![allow(clippy::type_complexity)]
#![allow(clippy::too_many_arguments)]
#![cfg_attr(docsrs, feature(doc_cfg))]

use equator::{assert, debug_assert};

pub mod kernel;
pub mod mat;
pub mod order;
pub mod simd;
pub mod sparse;
pub mod vector;

mod seal;

pub use mat::{submatrix, try_submatrix, DenseMatrix, Mat, Submatrix, SubmatrixMut};
pub use num_complex::Complex;
pub use order::{ColMajor, RowMajor, StorageOrder};
pub use reborrow;
pub use simd::Scalar;
pub use sparse::{SparseMat, SparseMatrix, SparseVector};
pub use vector::{DenseVector, Vector, VectorAssignable};

/// Creates a [`Mat`] containing the arguments, given row by row.
///
/// ```
/// use densa::mat;
///
/// let matrix = mat![
///     [1.0, 5.0, 9.0],
///     [2.0, 6.0, 10.0],
///     [3.0, 7.0, 11.0],
///     [4.0, 8.0, 12.0f64],
/// ];
///
/// assert_eq!(matrix.read(0, 0), 1.0);
/// assert_eq!(matrix.read(1, 0), 2.0);
/// assert_eq!(matrix.read(3, 0), 4.0);
///
/// assert_eq!(matrix.read(0, 1), 5.0);
/// assert_eq!(matrix.read(2, 2), 11.0);
/// assert_eq!(matrix.read(3, 2), 12.0);
/// ```
#[macro_export]
macro_rules! mat {
    () => {
        {
            compile_error!("number of columns in the matrix is ambiguous");
        }
    };

    ($([$($v:expr),* $(,)?] ),* $(,)?) => {
        {
            let data = [$([$($v),*]),*];
            let nrows = data.len();
            let ncols = data.first().map_or(0, |row| row.len());
            $crate::mat::Mat::<_>::from_fn(nrows, ncols, |i, j| data[i][j])
        }
    };
}

/// Scaling factor for multiplying matrices and vectors by a scalar.
#[derive(Copy, Clone, Debug)]
pub struct Scale<E>(pub E);

impl<E> Scale<E> {
    #[inline]
    pub fn value(self) -> E {
        self.0
    }
}

#[inline]
pub fn scale<E>(val: E) -> Scale<E> {
    Scale(val)
}

/// Errors that can occur when creating views or assigning to them.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum DenseError {
    /// The requested region does not fit inside the matrix.
    InvalidSubmatrix {
        /// First row of the region.
        row: usize,
        /// First column of the region.
        col: usize,
        /// Number of rows of the region.
        nrows: usize,
        /// Number of columns of the region.
        ncols: usize,
        /// Number of rows of the matrix.
        matrix_nrows: usize,
        /// Number of columns of the matrix.
        matrix_ncols: usize,
    },
    /// The operands of an assignment have incompatible shapes.
    ShapeMismatch {
        /// Shape `(nrows, ncols)` required by the destination.
        expected: (usize, usize),
        /// Shape `(nrows, ncols)` of the source.
        found: (usize, usize),
    },
}

impl core::fmt::Display for DenseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match *self {
            Self::InvalidSubmatrix {
                row,
                col,
                nrows,
                ncols,
                matrix_nrows,
                matrix_ncols,
            } => write!(
                f,
                "invalid submatrix specification: {nrows}x{ncols} region at ({row}, {col}) does not fit in a {matrix_nrows}x{matrix_ncols} matrix",
            ),
            Self::ShapeMismatch {
                expected: (er, ec),
                found: (fr, fc),
            } => write!(f, "matrix sizes do not match: expected {er}x{ec}, found {fr}x{fc}"),
        }
    }
}

impl std::error::Error for DenseError {}
