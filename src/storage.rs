//! raw circular slot storage.
//!
//! the slot array is the data plane shared by reads and writes on a
//! [`RingBuffer`](crate::RingBuffer). capacity is always a power of 2 so a
//! monotonically increasing sequence number wraps into a slot index with a
//! bitwise AND instead of a modulo.
//!
//! the storage itself tracks no occupancy. the owning container decides
//! which sequence range holds live values and is responsible for reading or
//! dropping every written slot exactly once; `read` and `drop_range` are
//! unsafe for that reason.

use core::fmt;
use core::mem::MaybeUninit;

/// round a capacity hint up to the next power of 2.
///
/// a hint of 0 stays 0: the resulting buffer can satisfy no transfer until
/// it is resized.
#[inline]
pub(crate) fn round_up_capacity(hint: usize) -> usize {
    if hint == 0 {
        0
    } else {
        hint.next_power_of_two()
    }
}

/// fixed-length slot array with power-of-2 capacity.
///
/// slots are `MaybeUninit` so elements can be moved in and out without
/// default values and without scrubbing on clear.
pub(crate) struct Storage<T> {
    slots: Box<[MaybeUninit<T>]>,

    /// bitmask wrapping a sequence into `[0, capacity)`.
    mask: usize,

    /// number of slots, always a power of 2 (or 0).
    capacity: usize,
}

impl<T> Storage<T> {
    /// allocate storage for `round_up_capacity(hint)` slots.
    pub(crate) fn with_capacity_hint(hint: usize) -> Self {
        let capacity = round_up_capacity(hint);

        let mut slots = Vec::with_capacity(capacity);
        for _ in 0..capacity {
            slots.push(MaybeUninit::uninit());
        }

        Self {
            slots: slots.into_boxed_slice(),
            mask: capacity.saturating_sub(1),
            capacity,
        }
    }

    /// number of slots.
    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    /// wrap a sequence number into a slot index.
    #[inline]
    pub(crate) fn index(&self, seq: usize) -> usize {
        seq & self.mask
    }

    /// move `value` into the slot at `seq`.
    ///
    /// any previous value in the slot is overwritten without being dropped;
    /// the owner must not write a slot it still counts as unread.
    #[inline]
    pub(crate) fn write(&mut self, seq: usize, value: T) {
        let idx = self.index(seq);
        self.slots[idx].write(value);
    }

    /// move the value out of the slot at `seq`.
    ///
    /// # safety
    ///
    /// the slot must have been written and not yet read or dropped since.
    #[inline]
    pub(crate) unsafe fn read(&mut self, seq: usize) -> T {
        let idx = self.index(seq);
        // SAFETY: per the caller's contract the slot holds a live value
        unsafe { self.slots[idx].assume_init_read() }
    }

    /// drop `len` consecutive values starting at `start_seq`.
    ///
    /// # safety
    ///
    /// every slot in `[start_seq, start_seq + len)` must hold a live value,
    /// and `len` must not exceed the capacity.
    pub(crate) unsafe fn drop_range(&mut self, start_seq: usize, len: usize) {
        for i in 0..len {
            let idx = self.index(start_seq.wrapping_add(i));
            // SAFETY: per the caller's contract the slot holds a live value
            unsafe { self.slots[idx].assume_init_drop() };
        }
    }
}

impl<T> fmt::Debug for Storage<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Storage")
            .field("capacity", &self.capacity)
            .field("mask", &self.mask)
            .finish_non_exhaustive()
    }
}
