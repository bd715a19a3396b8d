use super::{CreationError, SparseMatrix};
use crate::{
    assert,
    kernel,
    mat::{Assignable, Mat, SubmatrixMut},
    order::{RowMajor, StorageOrder},
    simd::Scalar,
};
use core::marker::PhantomData;

/// Owned compressed sparse matrix.
///
/// Lane `k` holds the entries `outer_ptr[k]..outer_ptr[k + 1]` of `inner_idx` and `values`, with
/// strictly increasing inner indices.
#[derive(Clone)]
pub struct SparseMat<T: Scalar, O: StorageOrder = RowMajor> {
    nrows: usize,
    ncols: usize,
    outer_ptr: Vec<usize>,
    inner_idx: Vec<usize>,
    values: Vec<T>,
    __marker: PhantomData<O>,
}

impl<T: Scalar, O: StorageOrder> SparseMat<T, O> {
    /// Returns an empty sparse matrix of dimension `nrows × ncols`.
    pub fn new(nrows: usize, ncols: usize) -> Self {
        Self {
            nrows,
            ncols,
            outer_ptr: vec![0; O::outer_dim(nrows, ncols) + 1],
            inner_idx: Vec::new(),
            values: Vec::new(),
            __marker: PhantomData,
        }
    }

    /// Create a new matrix from triplets `(row, col, value)`. Values of duplicate entries are
    /// summed.
    #[track_caller]
    pub fn try_new_from_triplets(
        nrows: usize,
        ncols: usize,
        triplets: &[(usize, usize, T)],
    ) -> Result<Self, CreationError> {
        if let Some(&(row, col, _)) = triplets
            .iter()
            .find(|&&(row, col, _)| row >= nrows || col >= ncols)
        {
            return Err(CreationError::OutOfBounds { row, col });
        }

        let mut argsort = (0..triplets.len()).collect::<Vec<_>>();
        argsort.sort_unstable_by_key(|&i| {
            let (row, col, _) = triplets[i];
            O::split(row, col)
        });

        let outer = O::outer_dim(nrows, ncols);
        let mut outer_ptr = vec![0usize; outer + 1];
        let mut inner_idx = Vec::with_capacity(triplets.len());
        let mut values = Vec::<T>::with_capacity(triplets.len());
        let mut prev = None;

        for &i in &argsort {
            let (row, col, value) = triplets[i];
            let key = O::split(row, col);
            if prev == Some(key) {
                let last = values.len() - 1;
                values[last] += value;
            } else {
                outer_ptr[key.0 + 1] += 1;
                inner_idx.push(key.1);
                values.push(value);
            }
            prev = Some(key);
        }
        for k in 0..outer {
            outer_ptr[k + 1] += outer_ptr[k];
        }

        Ok(Self {
            nrows,
            ncols,
            outer_ptr,
            inner_idx,
            values,
            __marker: PhantomData,
        })
    }

    /// Returns the number of rows of the matrix.
    #[inline]
    pub fn nrows(&self) -> usize {
        self.nrows
    }

    /// Returns the number of columns of the matrix.
    #[inline]
    pub fn ncols(&self) -> usize {
        self.ncols
    }

    /// Returns the number of stored entries.
    #[inline]
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Returns the inner indices and values of the stored entries of lane `k`.
    ///
    /// # Panics
    /// The function panics if `k` is not smaller than the number of lanes.
    #[inline]
    #[track_caller]
    pub fn lane(&self, k: usize) -> (&[usize], &[T]) {
        assert!(k < O::outer_dim(self.nrows, self.ncols));
        let range = self.outer_ptr[k]..self.outer_ptr[k + 1];
        (&self.inner_idx[range.clone()], &self.values[range])
    }

    /// Reads the element at `(row, col)`. Entries that are not stored read as zero.
    ///
    /// # Panics
    /// The function panics if any of the following conditions are violated:
    /// * `row < self.nrows()`.
    /// * `col < self.ncols()`.
    #[track_caller]
    pub fn read(&self, row: usize, col: usize) -> T {
        assert!(all(row < self.nrows, col < self.ncols));
        let (k, idx) = O::split(row, col);
        let (indices, values) = self.lane(k);
        match indices.binary_search(&idx) {
            Ok(pos) => values[pos],
            Err(_) => T::zero(),
        }
    }

    /// Copies the matrix into a dense matrix with the same storage order.
    pub fn to_dense(&self) -> Mat<T, O> {
        let mut out = Mat::zeros(self.nrows, self.ncols);
        kernel::assign_sparse::<T, O, Self, kernel::Assign>(&out.as_submatrix_mut().inner, self);
        out
    }
}

impl<T: Scalar, O: StorageOrder> SparseMatrix for SparseMat<T, O> {
    type Elem = T;
    type Order = O;

    #[inline]
    fn nrows(&self) -> usize {
        self.nrows
    }
    #[inline]
    fn ncols(&self) -> usize {
        self.ncols
    }
    #[inline]
    fn lane(&self, k: usize) -> (&[usize], &[T]) {
        SparseMat::lane(self, k)
    }
    #[inline]
    fn can_alias(&self, addr: *const ()) -> bool {
        self as *const Self as *const () == addr
    }
}

impl<T, O, U, SO> Assignable<T, O> for SparseMat<U, SO>
where
    T: Scalar + From<U>,
    O: StorageOrder,
    U: Scalar,
    SO: StorageOrder,
{
    #[inline]
    fn shape(&self) -> (usize, usize) {
        (self.nrows, self.ncols)
    }

    #[inline]
    fn aliases(&self, addr: *const ()) -> bool {
        self.can_alias(addr)
    }

    #[inline]
    unsafe fn assign_to<P: kernel::AssignOp>(&self, dst: &mut SubmatrixMut<'_, T, O>) {
        kernel::assign_sparse::<T, O, Self, P>(&dst.inner, self)
    }

    #[inline]
    unsafe fn assign_through_temporary<P: kernel::AssignOp>(
        &self,
        dst: &mut SubmatrixMut<'_, T, O>,
    ) {
        let tmp = self.clone();
        kernel::assign_sparse::<T, O, Self, P>(&dst.inner, &tmp)
    }
}

impl<T: Scalar, O: StorageOrder> core::fmt::Debug for SparseMat<T, O> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        struct Entries<'a, T: Scalar, O: StorageOrder>(&'a SparseMat<T, O>);
        impl<T: Scalar, O: StorageOrder> core::fmt::Debug for Entries<'_, T, O> {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                let this = self.0;
                let outer = O::outer_dim(this.nrows, this.ncols);
                f.debug_list()
                    .entries((0..outer).flat_map(|k| {
                        let (indices, values) = this.lane(k);
                        indices.iter().zip(values).map(move |(&idx, value)| {
                            let (row, col) = O::join(k, idx);
                            (row, col, value)
                        })
                    }))
                    .finish()
            }
        }
        f.debug_struct("SparseMat")
            .field("nrows", &self.nrows)
            .field("ncols", &self.ncols)
            .field("entries", &Entries(self))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use equator::assert;
    use crate::{ColMajor, DenseMatrix};

    #[test]
    fn test_from_triplets() {
        let a = SparseMat::<f64, ColMajor>::try_new_from_triplets(
            4,
            3,
            &[(2, 1, 1.0), (0, 1, 2.0), (2, 1, 0.5), (3, 0, -1.0)],
        )
        .unwrap();
        assert!(a.nnz() == 3);
        assert!(a.lane(1) == (&[0usize, 2][..], &[2.0, 1.5][..]));
        assert!(a.lane(2).0.is_empty());
        assert!(all(a.read(2, 1) == 1.5, a.read(3, 0) == -1.0, a.read(1, 1) == 0.0));

        let row_major =
            SparseMat::<f64, RowMajor>::try_new_from_triplets(4, 3, &[(2, 1, 1.0), (2, 0, 3.0)])
                .unwrap();
        assert!(row_major.lane(2) == (&[0usize, 1][..], &[3.0, 1.0][..]));
    }

    #[test]
    fn test_from_triplets_oob() {
        let err = SparseMat::<i32>::try_new_from_triplets(5, 4, &[(0, 0, 1), (5, 3, 1)]);
        assert!(err.err() == Some(CreationError::OutOfBounds { row: 5, col: 3 }));

        let err = SparseMat::<i32>::try_new_from_triplets(5, 4, &[(1, 4, 1)]);
        assert!(err.err() == Some(CreationError::OutOfBounds { row: 1, col: 4 }));
    }

    #[test]
    fn test_to_dense() {
        let s = SparseMat::<f32, RowMajor>::try_new_from_triplets(
            4,
            4,
            &[(0, 3, 1.0), (1, 1, 2.0), (3, 2, 3.0)],
        )
        .unwrap();
        let dense = s.to_dense();
        assert!(dense.nonzeros() == 3);
        for i in 0..4 {
            for j in 0..4 {
                assert!(dense.read(i, j) == s.read(i, j));
            }
        }

        let mut col_major = Mat::<f64, ColMajor>::full(4, 4, 9.0);
        col_major.try_assign(&s).unwrap();
        assert!(all(col_major.nonzeros() == 3, col_major.read(3, 2) == 3.0));

        let empty = SparseMat::<f32>::new(2, 5);
        assert!(all(empty.nnz() == 0, empty.to_dense().nonzeros() == 0));
    }

    #[test]
    fn test_compound_assign() {
        let s = SparseMat::<i64, ColMajor>::try_new_from_triplets(2, 2, &[(0, 0, 2), (1, 0, -1)])
            .unwrap();
        let mut a = Mat::<i64>::full(2, 2, 10);
        a.try_add_assign(&s).unwrap();
        a.try_sub_assign(&s).unwrap();
        a.try_sub_assign(&s).unwrap();
        assert!(a == crate::mat![[8, 10], [11, 10]]);
        assert!(a.eval() == a);
    }
}
