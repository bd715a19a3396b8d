use super::CreationError;
use crate::{
    assert,
    kernel::{self, AssignOp},
    simd::Scalar,
    vector::{Vector, VectorAssignable},
};

/// Owned sparse vector, storing the strictly increasing indices of its nonzero entries and their
/// values.
#[derive(Clone)]
pub struct SparseVector<T: Scalar> {
    len: usize,
    indices: Vec<usize>,
    values: Vec<T>,
}

impl<T: Scalar> SparseVector<T> {
    /// Returns a sparse vector of length `len` with no stored entries.
    #[inline]
    pub fn new(len: usize) -> Self {
        Self {
            len,
            indices: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Create a new vector from pairs `(index, value)`. Values of duplicate entries are summed.
    #[track_caller]
    pub fn try_new_from_pairs(len: usize, pairs: &[(usize, T)]) -> Result<Self, CreationError> {
        if let Some(&(index, _)) = pairs.iter().find(|&&(index, _)| index >= len) {
            return Err(CreationError::IndexOutOfBounds { index, len });
        }

        let mut argsort = (0..pairs.len()).collect::<Vec<_>>();
        argsort.sort_unstable_by_key(|&i| pairs[i].0);

        let mut indices = Vec::<usize>::with_capacity(pairs.len());
        let mut values = Vec::<T>::with_capacity(pairs.len());
        for &i in &argsort {
            let (index, value) = pairs[i];
            if indices.last() == Some(&index) {
                let last = values.len() - 1;
                values[last] += value;
            } else {
                indices.push(index);
                values.push(value);
            }
        }

        Ok(Self {
            len,
            indices,
            values,
        })
    }

    /// Returns the length of the vector.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the vector has length zero.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of stored entries.
    #[inline]
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Returns the indices of the stored entries, in increasing order.
    #[inline]
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Returns the values of the stored entries.
    #[inline]
    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// Reads the element at index `i`. Entries that are not stored read as zero.
    ///
    /// # Panics
    /// The function panics if `i >= self.len()`.
    #[track_caller]
    pub fn read(&self, i: usize) -> T {
        assert!(i < self.len);
        match self.indices.binary_search(&i) {
            Ok(pos) => self.values[pos],
            Err(_) => T::zero(),
        }
    }

    /// Copies the vector into a dense vector.
    pub fn to_dense(&self) -> Vector<T> {
        let mut out = Vector::zeros(self.len);
        kernel::assign_sparse_vector::<T, T, kernel::Assign>(&mut out, &self.indices, &self.values);
        out
    }
}

impl<T, U> VectorAssignable<T> for SparseVector<U>
where
    T: Scalar + From<U>,
    U: Scalar,
{
    #[inline]
    fn size(&self) -> usize {
        self.len
    }

    #[inline]
    fn aliases(&self, addr: *const ()) -> bool {
        self as *const Self as *const () == addr
    }

    #[inline]
    unsafe fn assign_to<P: AssignOp>(&self, dst: &mut Vector<T>) {
        kernel::assign_sparse_vector::<T, U, P>(dst, &self.indices, &self.values)
    }

    #[inline]
    unsafe fn assign_through_temporary<P: AssignOp>(&self, dst: &mut Vector<T>) {
        let tmp = self.clone();
        kernel::assign_sparse_vector::<T, U, P>(dst, &tmp.indices, &tmp.values)
    }
}

impl<T: Scalar> core::fmt::Debug for SparseVector<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SparseVector")
            .field("len", &self.len)
            .field(
                "entries",
                &self.indices.iter().zip(&self.values).collect::<Vec<_>>(),
            )
            .finish()
    }
}
