//! unbounded blocking FIFO queue.
//!
//! the queue is a single-condition monitor: one mutex guards the item
//! sequence and the closed flag, and one condition variable parks consumers
//! until an item arrives. producers never block; each push wakes exactly one
//! parked consumer, which is a one-to-one mapping because every pop takes
//! exactly one item.
//!
//! # example
//!
//! ```
//! use handoff::BlockingQueue;
//! use std::sync::Arc;
//! use std::thread;
//!
//! let queue = Arc::new(BlockingQueue::new());
//!
//! let consumer = {
//!     let queue = Arc::clone(&queue);
//!     thread::spawn(move || queue.pop().unwrap())
//! };
//!
//! queue.push("job").unwrap();
//! assert_eq!(consumer.join().unwrap(), "job");
//! ```

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

use log::{debug, trace};

use crate::common::{lock, wait, wait_timeout};
use crate::error::{PopError, PopTimeoutError, PushError, TryPopError};

/// unbounded FIFO queue with blocking and timed pops.
///
/// any number of producer and consumer threads may share one instance;
/// every operation takes `&self`. insertion order is preserved end-to-end:
/// the first item pushed is the first item popped, regardless of how many
/// threads contend.
///
/// there is no backpressure; a push always succeeds while the queue is
/// open. use [`RingBuffer`](crate::RingBuffer) when bounded capacity is
/// wanted.
pub struct BlockingQueue<T> {
    inner: Mutex<Inner<T>>,

    /// signaled once per push; consumers wait here.
    not_empty: Condvar,
}

struct Inner<T> {
    items: VecDeque<T>,
    closed: bool,
}

impl<T> BlockingQueue<T> {
    /// create an empty queue.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                items: VecDeque::new(),
                closed: false,
            }),
            not_empty: Condvar::new(),
        }
    }

    /// append an item to the tail and wake one parked consumer.
    ///
    /// never blocks.
    ///
    /// # errors
    ///
    /// returns [`PushError`] carrying the item back if the queue has been
    /// closed.
    ///
    /// # example
    ///
    /// ```
    /// use handoff::BlockingQueue;
    ///
    /// let queue = BlockingQueue::new();
    /// queue.push(1).unwrap();
    ///
    /// queue.close();
    /// let rejected = queue.push(2).unwrap_err();
    /// assert_eq!(rejected.into_inner(), 2);
    /// ```
    pub fn push(&self, item: T) -> Result<(), PushError<T>> {
        let mut inner = lock(&self.inner);
        if inner.closed {
            return Err(PushError(item));
        }
        inner.items.push_back(item);
        drop(inner);
        self.not_empty.notify_one();
        Ok(())
    }

    /// remove and return the head item, blocking until one is available.
    ///
    /// the wait re-checks emptiness on every wakeup, so spurious wakeups
    /// and stolen items (another consumer winning the race) put the caller
    /// back to sleep instead of returning garbage.
    ///
    /// # errors
    ///
    /// returns [`PopError`] once the queue is closed and fully drained.
    pub fn pop(&self) -> Result<T, PopError> {
        let mut inner = lock(&self.inner);
        loop {
            if let Some(item) = inner.items.pop_front() {
                return Ok(item);
            }
            if inner.closed {
                return Err(PopError);
            }
            inner = wait(&self.not_empty, inner);
        }
    }

    /// remove and return the head item without waiting.
    ///
    /// # errors
    ///
    /// - [`TryPopError::Empty`] if nothing is buffered right now
    /// - [`TryPopError::Closed`] if the queue is closed and drained
    pub fn try_pop(&self) -> Result<T, TryPopError> {
        let mut inner = lock(&self.inner);
        match inner.items.pop_front() {
            Some(item) => Ok(item),
            None if inner.closed => Err(TryPopError::Closed),
            None => Err(TryPopError::Empty),
        }
    }

    /// remove and return the head item, waiting at most `timeout` for one.
    ///
    /// the deadline is absolute, computed once on entry.
    ///
    /// # errors
    ///
    /// - [`PopTimeoutError::Timeout`] if the queue is still empty at the
    ///   deadline
    /// - [`PopTimeoutError::Closed`] if the queue is closed and drained
    ///
    /// # example
    ///
    /// ```
    /// use handoff::BlockingQueue;
    /// use handoff::error::PopTimeoutError;
    /// use std::time::Duration;
    ///
    /// let queue: BlockingQueue<u32> = BlockingQueue::new();
    /// let err = queue.pop_timeout(Duration::from_millis(10)).unwrap_err();
    /// assert_eq!(err, PopTimeoutError::Timeout);
    /// ```
    pub fn pop_timeout(&self, timeout: Duration) -> Result<T, PopTimeoutError> {
        let deadline = Instant::now() + timeout;
        let mut inner = lock(&self.inner);
        loop {
            if let Some(item) = inner.items.pop_front() {
                return Ok(item);
            }
            if inner.closed {
                return Err(PopTimeoutError::Closed);
            }
            let now = Instant::now();
            if now >= deadline {
                return Err(PopTimeoutError::Timeout);
            }
            inner = wait_timeout(&self.not_empty, inner, deadline - now);
        }
    }

    /// wait at most `timeout` for the queue to become non-empty.
    ///
    /// returns `true` if at least one item was buffered when the call
    /// returned, `false` on deadline or when the queue is closed and
    /// drained. purely an availability signal: by the time the caller acts
    /// another consumer may have taken the item, so pair it with
    /// [`try_pop`](Self::try_pop) rather than an unchecked pop.
    pub fn wait(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut inner = lock(&self.inner);
        loop {
            if !inner.items.is_empty() {
                return true;
            }
            if inner.closed {
                return false;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            inner = wait_timeout(&self.not_empty, inner, deadline - now);
        }
    }

    /// discard every buffered item.
    ///
    /// parked consumers are not woken; nothing they wait for became true.
    pub fn clear(&self) {
        let mut inner = lock(&self.inner);
        inner.items.clear();
        drop(inner);
        trace!("queue cleared");
    }

    /// close the queue, waking every parked consumer.
    ///
    /// after closing, pushes fail and return the item; pops still drain
    /// buffered items and fail once the queue is empty. closing an
    /// already-closed queue is a no-op.
    pub fn close(&self) {
        let mut inner = lock(&self.inner);
        if inner.closed {
            return;
        }
        inner.closed = true;
        drop(inner);
        self.not_empty.notify_all();
        debug!("queue closed");
    }

    /// returns `true` once [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        lock(&self.inner).closed
    }

    /// number of buffered items.
    ///
    /// advisory only under concurrency; another thread may push or pop
    /// between this call and whatever the caller does with the value.
    pub fn len(&self) -> usize {
        lock(&self.inner).items.len()
    }

    /// returns `true` if no items are buffered.
    ///
    /// advisory only, like [`len`](Self::len); never a substitute for the
    /// blocking or timed pops.
    pub fn is_empty(&self) -> bool {
        lock(&self.inner).items.is_empty()
    }
}

impl<T> Default for BlockingQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> core::fmt::Debug for BlockingQueue<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let inner = lock(&self.inner);
        f.debug_struct("BlockingQueue")
            .field("len", &inner.items.len())
            .field("closed", &inner.closed)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_push_pop_fifo() {
        let queue = BlockingQueue::new();
        queue.push(1).unwrap();
        queue.push(2).unwrap();
        queue.push(3).unwrap();

        assert_eq!(queue.pop().unwrap(), 1);
        assert_eq!(queue.pop().unwrap(), 2);
        assert_eq!(queue.pop().unwrap(), 3);
    }

    #[test]
    fn test_len_and_is_empty() {
        let queue = BlockingQueue::new();
        assert!(queue.is_empty());
        assert_eq!(queue.len(), 0);

        queue.push("a").unwrap();
        queue.push("b").unwrap();
        assert!(!queue.is_empty());
        assert_eq!(queue.len(), 2);

        queue.pop().unwrap();
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_try_pop() {
        let queue = BlockingQueue::new();
        assert_eq!(queue.try_pop().unwrap_err(), TryPopError::Empty);

        queue.push(7).unwrap();
        assert_eq!(queue.try_pop().unwrap(), 7);
        assert_eq!(queue.try_pop().unwrap_err(), TryPopError::Empty);
    }

    #[test]
    fn test_pop_blocks_until_push() {
        let queue: Arc<BlockingQueue<u32>> = Arc::new(BlockingQueue::new());

        let consumer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || queue.pop().unwrap())
        };

        thread::sleep(Duration::from_millis(50));
        queue.push(42).unwrap();
        assert_eq!(consumer.join().unwrap(), 42);
    }

    #[test]
    fn test_pop_timeout_lower_bound() {
        let queue: BlockingQueue<u32> = BlockingQueue::new();

        let start = Instant::now();
        let err = queue.pop_timeout(Duration::from_millis(50)).unwrap_err();
        let elapsed = start.elapsed();

        assert_eq!(err, PopTimeoutError::Timeout);
        assert!(
            elapsed >= Duration::from_millis(50),
            "returned after {:?}",
            elapsed
        );
    }

    #[test]
    fn test_pop_timeout_returns_item_pushed_before_deadline() {
        let queue: Arc<BlockingQueue<u32>> = Arc::new(BlockingQueue::new());

        let producer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(20));
                queue.push(5).unwrap();
            })
        };

        assert_eq!(queue.pop_timeout(Duration::from_secs(5)).unwrap(), 5);
        producer.join().unwrap();
    }

    #[test]
    fn test_wait_signals_availability() {
        let queue: Arc<BlockingQueue<u32>> = Arc::new(BlockingQueue::new());

        // empty queue: false after the deadline
        let start = Instant::now();
        assert!(!queue.wait(Duration::from_millis(50)));
        assert!(start.elapsed() >= Duration::from_millis(50));

        // non-empty queue: true immediately
        queue.push(1).unwrap();
        assert!(queue.wait(Duration::from_secs(5)));

        // a push from another thread satisfies a parked wait
        queue.pop().unwrap();
        let producer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(20));
                queue.push(2).unwrap();
            })
        };
        assert!(queue.wait(Duration::from_secs(5)));
        producer.join().unwrap();
    }

    #[test]
    fn test_concurrent_fan_in() {
        const PRODUCERS: u64 = 4;
        const ITEMS: u64 = 250;

        let queue: Arc<BlockingQueue<(u64, u64)>> = Arc::new(BlockingQueue::new());

        let producers: Vec<_> = (0..PRODUCERS)
            .map(|tag| {
                let queue = Arc::clone(&queue);
                thread::spawn(move || {
                    for i in 0..ITEMS {
                        queue.push((tag, i)).unwrap();
                    }
                })
            })
            .collect();

        let mut seen = HashSet::new();
        let mut last_per_tag = vec![None; PRODUCERS as usize];
        for _ in 0..PRODUCERS * ITEMS {
            let (tag, i) = queue.pop().unwrap();
            assert!(seen.insert((tag, i)), "duplicate item ({}, {})", tag, i);

            // per-producer order survives the merge
            if let Some(last) = last_per_tag[tag as usize] {
                assert!(i > last, "tag {} went backwards: {} after {}", tag, i, last);
            }
            last_per_tag[tag as usize] = Some(i);
        }

        assert_eq!(seen.len(), (PRODUCERS * ITEMS) as usize);
        assert!(queue.is_empty());
        for producer in producers {
            producer.join().unwrap();
        }
    }

    #[test]
    fn test_clear() {
        let queue = BlockingQueue::new();
        queue.push(1).unwrap();
        queue.push(2).unwrap();

        queue.clear();
        assert!(queue.is_empty());
        assert_eq!(queue.try_pop().unwrap_err(), TryPopError::Empty);

        // still usable after clearing
        queue.push(3).unwrap();
        assert_eq!(queue.pop().unwrap(), 3);
    }

    #[test]
    fn test_close_wakes_blocked_pop() {
        let queue: Arc<BlockingQueue<u32>> = Arc::new(BlockingQueue::new());

        let consumer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || queue.pop())
        };

        thread::sleep(Duration::from_millis(50));
        queue.close();

        assert_eq!(consumer.join().unwrap(), Err(PopError));
    }

    #[test]
    fn test_closed_queue_drains_then_fails() {
        let queue = BlockingQueue::new();
        queue.push(1).unwrap();
        queue.push(2).unwrap();
        queue.close();

        assert!(queue.is_closed());
        assert_eq!(queue.pop().unwrap(), 1);
        assert_eq!(queue.try_pop().unwrap(), 2);
        assert_eq!(queue.pop().unwrap_err(), PopError);
        assert_eq!(queue.try_pop().unwrap_err(), TryPopError::Closed);
        assert_eq!(
            queue.pop_timeout(Duration::from_millis(1)).unwrap_err(),
            PopTimeoutError::Closed
        );
    }

    #[test]
    fn test_push_after_close_returns_item() {
        let queue = BlockingQueue::new();
        queue.close();

        let err = queue.push(String::from("rejected")).unwrap_err();
        assert_eq!(err.into_inner(), "rejected");
    }

    #[test]
    fn test_debug() {
        let queue = BlockingQueue::new();
        queue.push(1).unwrap();
        let debug = format!("{:?}", queue);
        assert!(debug.contains("BlockingQueue"));
        assert!(debug.contains("len: 1"));
    }
}
