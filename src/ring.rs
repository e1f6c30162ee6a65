//! bounded ring buffer with batched, all-or-nothing transfers.
//!
//! the buffer is a monitor: one mutex guards the slot storage, both sequence
//! counters, and both occupancy counters, so paired state always changes as
//! one unit. two condition variables share that mutex, one per direction:
//! writers park on "space freed" and readers park on "data available", so a
//! completed read never wakes other readers and vice versa.
//!
//! waits are predicate-checked: every wakeup re-evaluates the occupancy
//! condition before proceeding, which makes spurious wakeups harmless.
//! wakeups broadcast with `notify_all` because batch sizes vary; waking a
//! single waiter could pick one whose batch still does not fit while a
//! satisfiable waiter stays parked.
//!
//! # capacity
//!
//! capacity is always a power of 2 (a hint is rounded up, 0 stays 0) and a
//! monotonically increasing sequence wraps into a slot index with a bitwise
//! AND. the occupancy invariant `read_count + write_count == capacity` holds
//! at every quiescent point.
//!
//! # example
//!
//! ```
//! use handoff::RingBuffer;
//!
//! let ring = RingBuffer::new(4);
//!
//! ring.write(&[10u32, 20, 30]).unwrap();
//!
//! let mut batch = [0u32; 3];
//! ring.read(&mut batch).unwrap();
//! assert_eq!(batch, [10, 20, 30]);
//! ```

use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

use log::{debug, trace};

use crate::common::{lock, wait, wait_timeout};
use crate::error::{
    ReadError, ReadTimeoutError, TryReadError, TryWriteError, WriteError, WriteTimeoutError,
};
use crate::storage::Storage;

/// fixed-capacity circular FIFO with batched blocking transfers.
///
/// any number of producer and consumer threads may share one instance
/// (through `Arc` or a plain reference); every operation takes `&self`.
/// a batch transfer is all-or-nothing: either every element moves under a
/// single lock hold or none does, and batches from different threads never
/// interleave.
///
/// # example
///
/// ```
/// use handoff::RingBuffer;
/// use std::sync::Arc;
/// use std::thread;
///
/// let ring = Arc::new(RingBuffer::new(8));
///
/// let producer = {
///     let ring = Arc::clone(&ring);
///     thread::spawn(move || {
///         for chunk in 0..4u64 {
///             ring.write(&[chunk * 2, chunk * 2 + 1]).unwrap();
///         }
///     })
/// };
///
/// let mut received = Vec::new();
/// let mut batch = [0u64; 2];
/// for _ in 0..4 {
///     ring.read(&mut batch).unwrap();
///     received.extend_from_slice(&batch);
/// }
///
/// producer.join().unwrap();
/// assert_eq!(received, vec![0, 1, 2, 3, 4, 5, 6, 7]);
/// ```
pub struct RingBuffer<T> {
    inner: Mutex<Inner<T>>,

    /// signaled after a read frees space; writers wait here.
    not_full: Condvar,

    /// signaled after a write buffers data; readers wait here.
    not_empty: Condvar,
}

struct Inner<T> {
    storage: Storage<T>,

    /// next sequence to read from. wraps via the storage mask when indexing.
    read_seq: usize,

    /// next sequence to write to.
    write_seq: usize,

    /// elements buffered and not yet read.
    available_read: usize,

    /// free slots. `available_read + available_write == capacity` whenever
    /// the lock is not held mid-transfer.
    available_write: usize,

    closed: bool,
}

impl<T> RingBuffer<T> {
    /// create a buffer with at least `capacity_hint` slots.
    ///
    /// the hint is rounded up to the next power of 2. a hint of 0 yields a
    /// buffer of capacity 0, which can satisfy no transfer until it is
    /// resized.
    ///
    /// # example
    ///
    /// ```
    /// use handoff::RingBuffer;
    ///
    /// let ring: RingBuffer<u8> = RingBuffer::new(100);
    /// assert_eq!(ring.capacity(), 128);
    /// ```
    pub fn new(capacity_hint: usize) -> Self {
        let storage = Storage::with_capacity_hint(capacity_hint);
        let available_write = storage.capacity();

        Self {
            inner: Mutex::new(Inner {
                storage,
                read_seq: 0,
                write_seq: 0,
                available_read: 0,
                available_write,
                closed: false,
            }),
            not_full: Condvar::new(),
            not_empty: Condvar::new(),
        }
    }

    /// write a batch, blocking until the buffer has room for all of it.
    ///
    /// elements are cloned into the buffer in order as one indivisible
    /// transfer. an empty batch succeeds immediately without touching the
    /// buffer.
    ///
    /// # errors
    ///
    /// - [`WriteError::Oversized`] if the batch can never fit; returns
    ///   without blocking
    /// - [`WriteError::Closed`] if the buffer is or becomes closed
    ///
    /// # example
    ///
    /// ```
    /// use handoff::RingBuffer;
    ///
    /// let ring = RingBuffer::new(4);
    /// ring.write(&[1, 2, 3]).unwrap();
    /// assert_eq!(ring.read_count(), 3);
    /// ```
    pub fn write(&self, items: &[T]) -> Result<(), WriteError>
    where
        T: Clone,
    {
        if items.is_empty() {
            return Ok(());
        }

        let mut inner = lock(&self.inner);
        loop {
            if inner.closed {
                return Err(WriteError::Closed);
            }
            if items.len() > inner.storage.capacity() {
                return Err(WriteError::Oversized {
                    requested: items.len(),
                    capacity: inner.storage.capacity(),
                });
            }
            if inner.available_write >= items.len() {
                break;
            }
            inner = wait(&self.not_full, inner);
        }

        inner.commit_write(items);
        drop(inner);
        self.not_empty.notify_all();
        Ok(())
    }

    /// read a batch of exactly `dst.len()` elements, blocking until the
    /// buffer holds that many.
    ///
    /// elements are moved out of the buffer in FIFO order, overwriting the
    /// contents of `dst`. an empty `dst` succeeds immediately.
    ///
    /// # errors
    ///
    /// - [`ReadError::Oversized`] if `dst.len()` exceeds the capacity;
    ///   returns without blocking
    /// - [`ReadError::Closed`] if the buffer is closed and holds fewer than
    ///   `dst.len()` elements (buffered data is still drained by requests
    ///   it can satisfy)
    pub fn read(&self, dst: &mut [T]) -> Result<(), ReadError> {
        if dst.is_empty() {
            return Ok(());
        }

        let mut inner = lock(&self.inner);
        loop {
            if dst.len() > inner.storage.capacity() {
                return Err(ReadError::Oversized {
                    requested: dst.len(),
                    capacity: inner.storage.capacity(),
                });
            }
            if inner.available_read >= dst.len() {
                break;
            }
            if inner.closed {
                return Err(ReadError::Closed);
            }
            inner = wait(&self.not_empty, inner);
        }

        inner.commit_read(dst);
        drop(inner);
        self.not_full.notify_all();
        Ok(())
    }

    /// write a batch, waiting at most `timeout` for room.
    ///
    /// the deadline is absolute: it is computed once on entry, and every
    /// wakeup re-checks the predicate against it. on failure nothing has
    /// been transferred.
    ///
    /// # errors
    ///
    /// - [`WriteTimeoutError::Timeout`] if the deadline elapses first
    /// - [`WriteTimeoutError::Oversized`] if the batch can never fit
    /// - [`WriteTimeoutError::Closed`] if the buffer is or becomes closed
    ///
    /// # example
    ///
    /// ```
    /// use handoff::RingBuffer;
    /// use std::time::Duration;
    ///
    /// let ring = RingBuffer::new(2);
    /// ring.write(&[1, 2]).unwrap();
    ///
    /// // full, and nobody is reading
    /// let err = ring
    ///     .write_timeout(&[3], Duration::from_millis(10))
    ///     .unwrap_err();
    /// assert!(err.is_timeout());
    /// ```
    pub fn write_timeout(&self, items: &[T], timeout: Duration) -> Result<(), WriteTimeoutError>
    where
        T: Clone,
    {
        if items.is_empty() {
            return Ok(());
        }

        let deadline = Instant::now() + timeout;
        let mut inner = lock(&self.inner);
        loop {
            if inner.closed {
                return Err(WriteTimeoutError::Closed);
            }
            if items.len() > inner.storage.capacity() {
                return Err(WriteTimeoutError::Oversized {
                    requested: items.len(),
                    capacity: inner.storage.capacity(),
                });
            }
            if inner.available_write >= items.len() {
                break;
            }
            let now = Instant::now();
            if now >= deadline {
                return Err(WriteTimeoutError::Timeout);
            }
            inner = wait_timeout(&self.not_full, inner, deadline - now);
        }

        inner.commit_write(items);
        drop(inner);
        self.not_empty.notify_all();
        Ok(())
    }

    /// read a batch of exactly `dst.len()` elements, waiting at most
    /// `timeout` for them.
    ///
    /// # errors
    ///
    /// - [`ReadTimeoutError::Timeout`] if the deadline elapses first
    /// - [`ReadTimeoutError::Oversized`] if `dst.len()` exceeds the capacity
    /// - [`ReadTimeoutError::Closed`] if the buffer is closed with fewer
    ///   than `dst.len()` elements buffered
    pub fn read_timeout(&self, dst: &mut [T], timeout: Duration) -> Result<(), ReadTimeoutError> {
        if dst.is_empty() {
            return Ok(());
        }

        let deadline = Instant::now() + timeout;
        let mut inner = lock(&self.inner);
        loop {
            if dst.len() > inner.storage.capacity() {
                return Err(ReadTimeoutError::Oversized {
                    requested: dst.len(),
                    capacity: inner.storage.capacity(),
                });
            }
            if inner.available_read >= dst.len() {
                break;
            }
            if inner.closed {
                return Err(ReadTimeoutError::Closed);
            }
            let now = Instant::now();
            if now >= deadline {
                return Err(ReadTimeoutError::Timeout);
            }
            inner = wait_timeout(&self.not_empty, inner, deadline - now);
        }

        inner.commit_read(dst);
        drop(inner);
        self.not_full.notify_all();
        Ok(())
    }

    /// write a batch without waiting.
    ///
    /// # errors
    ///
    /// - [`TryWriteError::Full`] if there is too little room right now
    /// - [`TryWriteError::Oversized`] if the batch can never fit
    /// - [`TryWriteError::Closed`] if the buffer is closed
    pub fn try_write(&self, items: &[T]) -> Result<(), TryWriteError>
    where
        T: Clone,
    {
        if items.is_empty() {
            return Ok(());
        }

        let mut inner = lock(&self.inner);
        if inner.closed {
            return Err(TryWriteError::Closed);
        }
        if items.len() > inner.storage.capacity() {
            return Err(TryWriteError::Oversized {
                requested: items.len(),
                capacity: inner.storage.capacity(),
            });
        }
        if inner.available_write < items.len() {
            return Err(TryWriteError::Full);
        }

        inner.commit_write(items);
        drop(inner);
        self.not_empty.notify_all();
        Ok(())
    }

    /// read a batch of exactly `dst.len()` elements without waiting.
    ///
    /// # errors
    ///
    /// - [`TryReadError::Empty`] if too few elements are buffered right now
    /// - [`TryReadError::Oversized`] if `dst.len()` exceeds the capacity
    /// - [`TryReadError::Closed`] if the buffer is closed with too few
    ///   elements buffered
    pub fn try_read(&self, dst: &mut [T]) -> Result<(), TryReadError> {
        if dst.is_empty() {
            return Ok(());
        }

        let mut inner = lock(&self.inner);
        if dst.len() > inner.storage.capacity() {
            return Err(TryReadError::Oversized {
                requested: dst.len(),
                capacity: inner.storage.capacity(),
            });
        }
        if inner.available_read < dst.len() {
            return if inner.closed {
                Err(TryReadError::Closed)
            } else {
                Err(TryReadError::Empty)
            };
        }

        inner.commit_read(dst);
        drop(inner);
        self.not_full.notify_all();
        Ok(())
    }

    /// discard all buffered elements and reset the buffer to empty.
    ///
    /// capacity is unchanged. buffered elements are dropped; no slot is
    /// otherwise scrubbed. waiting writers are woken since a full buffer
    /// just became writable; waiting readers are not (nothing they wait for
    /// became true).
    pub fn clear(&self) {
        let mut inner = lock(&self.inner);
        inner.purge();
        drop(inner);
        self.not_full.notify_all();
        trace!("ring buffer cleared");
    }

    /// replace the buffer with a fresh one of at least `capacity_hint`
    /// slots.
    ///
    /// destructive, always: buffered elements are dropped and both sequence
    /// counters reset, even when the rounded capacity is unchanged. both
    /// conditions are notified so parked waiters re-evaluate their batch
    /// against the new capacity; a request that no longer fits fails with
    /// an oversized error instead of sleeping forever.
    pub fn resize(&self, capacity_hint: usize) {
        let mut inner = lock(&self.inner);
        inner.purge();
        inner.storage = Storage::with_capacity_hint(capacity_hint);
        inner.available_write = inner.storage.capacity();
        let capacity = inner.storage.capacity();
        drop(inner);
        self.not_full.notify_all();
        self.not_empty.notify_all();
        trace!("ring buffer resized to {} slots", capacity);
    }

    /// close the buffer, waking every parked waiter.
    ///
    /// after closing, writes fail immediately; reads still drain buffered
    /// elements and fail once too few remain. closing an already-closed
    /// buffer is a no-op.
    pub fn close(&self) {
        let mut inner = lock(&self.inner);
        if inner.closed {
            return;
        }
        inner.closed = true;
        drop(inner);
        self.not_full.notify_all();
        self.not_empty.notify_all();
        debug!("ring buffer closed");
    }

    /// returns `true` once [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        lock(&self.inner).closed
    }

    /// current capacity (always a power of 2, or 0).
    pub fn capacity(&self) -> usize {
        lock(&self.inner).storage.capacity()
    }

    /// number of buffered elements available to read.
    ///
    /// advisory only: another thread may change it before the caller acts
    /// on the value. never a substitute for the blocking primitives.
    pub fn read_count(&self) -> usize {
        lock(&self.inner).available_read
    }

    /// number of free slots available to write.
    ///
    /// advisory only, like [`read_count`](Self::read_count).
    pub fn write_count(&self) -> usize {
        lock(&self.inner).available_write
    }
}

impl<T> Inner<T> {
    /// clone `items` into the buffer, then publish the batch.
    ///
    /// the sequence and the counters are committed only after every clone
    /// succeeded, so a panicking `clone` leaves the state unchanged.
    fn commit_write(&mut self, items: &[T])
    where
        T: Clone,
    {
        debug_assert!(items.len() <= self.available_write);

        let mut seq = self.write_seq;
        for item in items {
            self.storage.write(seq, item.clone());
            seq = seq.wrapping_add(1);
        }
        self.write_seq = seq;
        self.available_write -= items.len();
        self.available_read += items.len();
        self.assert_conserved();
    }

    /// move `dst.len()` elements out of the buffer into `dst`.
    ///
    /// the range is marked consumed before the moves, so a panicking drop
    /// of a displaced `dst` value can leak not-yet-moved elements but never
    /// double-drop one.
    fn commit_read(&mut self, dst: &mut [T]) {
        debug_assert!(dst.len() <= self.available_read);

        let mut seq = self.read_seq;
        self.read_seq = seq.wrapping_add(dst.len());
        self.available_read -= dst.len();
        self.available_write += dst.len();
        self.assert_conserved();

        for slot in dst.iter_mut() {
            // SAFETY: [seq, seq + dst.len()) was written and is consumed
            // exactly once, here
            *slot = unsafe { self.storage.read(seq) };
            seq = seq.wrapping_add(1);
        }
    }

    /// drop buffered elements and reset to the empty state.
    fn purge(&mut self) {
        let unread = self.available_read;
        let start = self.read_seq;

        // counters first: a panicking destructor then leaks instead of
        // leaving values counted as live
        self.available_read = 0;
        self.available_write = self.storage.capacity();
        self.read_seq = 0;
        self.write_seq = 0;

        // SAFETY: [start, start + unread) was written and not yet consumed
        unsafe { self.storage.drop_range(start, unread) };
    }

    #[inline]
    fn assert_conserved(&self) {
        debug_assert_eq!(
            self.available_read + self.available_write,
            self.storage.capacity()
        );
    }
}

impl<T> Drop for Inner<T> {
    fn drop(&mut self) {
        let unread = self.available_read;
        self.available_read = 0;
        // SAFETY: the unread range was written and never consumed
        unsafe { self.storage.drop_range(self.read_seq, unread) };
    }
}

impl<T> core::fmt::Debug for RingBuffer<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let inner = lock(&self.inner);
        f.debug_struct("RingBuffer")
            .field("capacity", &inner.storage.capacity())
            .field("read_count", &inner.available_read)
            .field("write_count", &inner.available_write)
            .field("closed", &inner.closed)
            .finish_non_exhaustive()
    }
}
