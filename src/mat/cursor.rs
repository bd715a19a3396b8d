use crate::assert;
use core::{cmp::Ordering, marker::PhantomData};

/// Position inside one lane of a matrix view, obtained from `begin(k)` or `end(k)`.
///
/// Cursors over the same lane can be compared, and the distance between them measured. Reading
/// through a cursor is checked against the bounds of its lane.
pub struct Cursor<'a, T> {
    ptr: *const T,
    begin: *const T,
    end: *const T,
    __marker: PhantomData<&'a T>,
}

impl<T> Copy for Cursor<'_, T> {}
impl<T> Clone for Cursor<'_, T> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

unsafe impl<T: Sync> Send for Cursor<'_, T> {}
unsafe impl<T: Sync> Sync for Cursor<'_, T> {}

impl<'a, T: Copy> Cursor<'a, T> {
    #[inline]
    pub(crate) fn new(lane: &'a [T], pos: usize) -> Self {
        let range = lane.as_ptr_range();
        Self {
            ptr: range.start.wrapping_add(pos),
            begin: range.start,
            end: range.end,
            __marker: PhantomData,
        }
    }

    /// Moves the cursor `n` elements forward.
    #[inline]
    pub fn advance(&mut self, n: usize) -> &mut Self {
        self.ptr = self.ptr.wrapping_add(n);
        self
    }

    /// Moves the cursor `n` elements backward.
    #[inline]
    pub fn retreat(&mut self, n: usize) -> &mut Self {
        self.ptr = self.ptr.wrapping_sub(n);
        self
    }

    /// Returns the number of elements from `self` to `other`.
    #[inline]
    pub fn distance_to(&self, other: &Self) -> isize {
        let bytes = (other.ptr as usize).wrapping_sub(self.ptr as usize) as isize;
        bytes / core::mem::size_of::<T>() as isize
    }

    /// Reads the element under the cursor.
    ///
    /// # Panics
    /// The function panics if the cursor is outside of its lane.
    #[inline]
    #[track_caller]
    pub fn get(&self) -> T {
        assert!(all(self.ptr >= self.begin, self.ptr < self.end));
        unsafe { self.ptr.read() }
    }
}

impl<T> PartialEq for Cursor<'_, T> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.ptr == other.ptr
    }
}
impl<T> Eq for Cursor<'_, T> {}

impl<T> PartialOrd for Cursor<'_, T> {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl<T> Ord for Cursor<'_, T> {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.ptr.cmp(&other.ptr)
    }
}

impl<T> core::fmt::Debug for Cursor<'_, T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let size = core::mem::size_of::<T>();
        f.debug_struct("Cursor")
            .field("pos", &((self.ptr as usize).wrapping_sub(self.begin as usize) / size))
            .field("len", &((self.end as usize - self.begin as usize) / size))
            .finish()
    }
}
