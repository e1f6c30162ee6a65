//! blocking handoff containers for producer/consumer threads.
//!
//! this crate provides thread-safe containers for moving data between
//! producer and consumer threads without busy-polling. each container is a
//! classic monitor: one mutex guarding all mutable state, plus condition
//! variables that suspend a thread until its predicate holds.
//!
//! # containers
//!
//! - [`RingBuffer`]: fixed-capacity circular FIFO with batched,
//!   all-or-nothing transfers. blocking, timed, and non-blocking variants.
//! - [`BlockingQueue`]: unbounded FIFO with non-blocking push and blocking,
//!   timed, and non-blocking pop.
//!
//! # design
//!
//! - one mutex per container instance, never nested with another instance
//! - predicate-checked condition waits (safe against spurious wakeups)
//! - power-of-2 capacity so indices wrap with a bitwise AND
//! - explicit [`close`](RingBuffer::close) signal that wakes every parked
//!   waiter instead of leaving threads blocked forever
//!
//! # example
//!
//! ```
//! use handoff::RingBuffer;
//! use std::sync::Arc;
//! use std::thread;
//!
//! let ring = Arc::new(RingBuffer::new(8));
//!
//! let producer = {
//!     let ring = Arc::clone(&ring);
//!     thread::spawn(move || {
//!         ring.write(&[1u64, 2, 3]).unwrap();
//!     })
//! };
//!
//! let mut batch = [0u64; 3];
//! ring.read(&mut batch).unwrap();
//! assert_eq!(batch, [1, 2, 3]);
//!
//! producer.join().unwrap();
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod error;
pub mod queue;
pub mod ring;

pub(crate) mod common;
pub(crate) mod storage;

pub use error::{
    PopError, PopTimeoutError, PushError, ReadError, ReadTimeoutError, TryPopError, TryReadError,
    TryWriteError, WriteError, WriteTimeoutError,
};
pub use queue::BlockingQueue;
pub use ring::RingBuffer;
