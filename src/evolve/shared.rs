//! Raw row views over a `DoubleBuffer` shared by worker threads.
//!
//! Workers write disjoint rows of one slot while reading the other slot.
//! The borrow checker cannot see that split across long-lived workers, so
//! the slots are handed out as raw pointers; the partition and the
//! barrier or row gates are what make each access sound.

use crate::grid::DoubleBuffer;
use crate::kernel::advance_row;

struct SendPtr<T> {
    inner: *mut T,
}
unsafe impl<T> Send for SendPtr<T> {}
unsafe impl<T> Sync for SendPtr<T> {}
impl<T> Copy for SendPtr<T> {}
impl<T> Clone for SendPtr<T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T> SendPtr<T> {
    #[inline(always)]
    fn new(ptr: *mut T) -> Self {
        Self { inner: ptr }
    }
    #[inline(always)]
    fn get(&self) -> *mut T {
        self.inner
    }
}

/// Both slots of a `DoubleBuffer`, addressable by slot index and row.
///
/// Borrows the buffer mutably for its whole lifetime, so nothing outside
/// the workers can observe a slot mid-write.
pub(crate) struct SharedRows<'a> {
    slots: [SendPtr<u8>; 2],
    rows: usize,
    cols: usize,
    _buffers: std::marker::PhantomData<&'a mut DoubleBuffer>,
}

impl<'a> SharedRows<'a> {
    pub(crate) fn new(buffers: &'a mut DoubleBuffer) -> Self {
        let [a, b] = buffers.slots_mut();
        let rows = a.rows();
        let cols = a.cols();
        Self {
            slots: [
                SendPtr::new(a.as_mut_slice().as_mut_ptr()),
                SendPtr::new(b.as_mut_slice().as_mut_ptr()),
            ],
            rows,
            cols,
            _buffers: std::marker::PhantomData,
        }
    }

    #[inline]
    pub(crate) fn rows(&self) -> usize {
        self.rows
    }

    /// # Safety
    /// No thread may be writing row `r` of `slot` for as long as the
    /// returned slice lives.
    #[inline(always)]
    unsafe fn row(&self, slot: usize, r: usize) -> &[u8] {
        debug_assert!(slot < 2 && r < self.rows);
        unsafe { std::slice::from_raw_parts(self.slots[slot].get().add(r * self.cols), self.cols) }
    }

    /// # Safety
    /// The caller must be the only thread touching row `r` of `slot` for
    /// as long as the returned slice lives.
    #[inline(always)]
    #[allow(clippy::mut_from_ref)]
    unsafe fn row_mut(&self, slot: usize, r: usize) -> &mut [u8] {
        debug_assert!(slot < 2 && r < self.rows);
        unsafe {
            std::slice::from_raw_parts_mut(self.slots[slot].get().add(r * self.cols), self.cols)
        }
    }

    /// Compute row `r` of the generation after the one held in slot `src`,
    /// writing it into the other slot.
    ///
    /// # Safety
    /// Rows `r-1`, `r` and `r+1` (wrapped) of `src` must be fully written
    /// and not being written by anyone; row `r` of the other slot must not
    /// be read or written by any other thread during the call.
    #[inline]
    pub(crate) unsafe fn advance(&self, src: usize, r: usize) -> bool {
        let rows = self.rows;
        let above = if r == 0 { rows - 1 } else { r - 1 };
        let below = if r + 1 == rows { 0 } else { r + 1 };
        unsafe {
            advance_row(
                self.row(src, above),
                self.row(src, r),
                self.row(src, below),
                self.row_mut(1 - src, r),
            )
        }
    }
}
