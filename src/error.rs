//! error types for container operations.
//!
//! every fallible operation has its own small error type so a caller can
//! tell "could not complete within budget" (`Timeout`), "can never complete
//! at this capacity" (`Oversized`), and "container shut down" (`Closed`)
//! apart without inspecting strings. failed operations never mutate the
//! container, and a rejected push returns ownership of the item to the
//! caller.
//!
//! # error types
//!
//! ring buffer:
//!
//! - [`WriteError`] / [`ReadError`]: blocking transfers
//! - [`TryWriteError`] / [`TryReadError`]: non-blocking transfers
//! - [`WriteTimeoutError`] / [`ReadTimeoutError`]: timed transfers
//!
//! queue:
//!
//! - [`PushError`]: push on a closed queue (carries the item)
//! - [`PopError`] / [`TryPopError`] / [`PopTimeoutError`]: pop variants

use core::fmt;

/// error returned when a blocking ring buffer write fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteError {
    /// the batch is larger than the buffer capacity and can never fit.
    Oversized {
        /// number of elements in the rejected batch.
        requested: usize,
        /// buffer capacity at the time of rejection.
        capacity: usize,
    },

    /// the buffer has been closed.
    Closed,
}

impl WriteError {
    /// returns `true` if this error is the `Oversized` variant.
    #[inline]
    pub fn is_oversized(&self) -> bool {
        matches!(self, WriteError::Oversized { .. })
    }

    /// returns `true` if this error is the `Closed` variant.
    #[inline]
    pub fn is_closed(&self) -> bool {
        matches!(self, WriteError::Closed)
    }
}

impl fmt::Display for WriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteError::Oversized {
                requested,
                capacity,
            } => write!(
                f,
                "writing a batch of {} to a ring buffer of capacity {}",
                requested, capacity
            ),
            WriteError::Closed => write!(f, "writing to a closed ring buffer"),
        }
    }
}

impl std::error::Error for WriteError {}

/// error returned when a blocking ring buffer read fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadError {
    /// the batch is larger than the buffer capacity and can never fit.
    Oversized {
        /// number of elements in the rejected batch.
        requested: usize,
        /// buffer capacity at the time of rejection.
        capacity: usize,
    },

    /// the buffer has been closed and holds too few elements.
    Closed,
}

impl ReadError {
    /// returns `true` if this error is the `Oversized` variant.
    #[inline]
    pub fn is_oversized(&self) -> bool {
        matches!(self, ReadError::Oversized { .. })
    }

    /// returns `true` if this error is the `Closed` variant.
    #[inline]
    pub fn is_closed(&self) -> bool {
        matches!(self, ReadError::Closed)
    }
}

impl fmt::Display for ReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadError::Oversized {
                requested,
                capacity,
            } => write!(
                f,
                "reading a batch of {} from a ring buffer of capacity {}",
                requested, capacity
            ),
            ReadError::Closed => write!(f, "reading from a closed ring buffer"),
        }
    }
}

impl std::error::Error for ReadError {}

/// error returned when a non-blocking ring buffer write fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TryWriteError {
    /// the buffer has too little free space for the batch right now.
    Full,

    /// the batch is larger than the buffer capacity and can never fit.
    Oversized {
        /// number of elements in the rejected batch.
        requested: usize,
        /// buffer capacity at the time of rejection.
        capacity: usize,
    },

    /// the buffer has been closed.
    Closed,
}

impl TryWriteError {
    /// returns `true` if this error is the `Full` variant.
    #[inline]
    pub fn is_full(&self) -> bool {
        matches!(self, TryWriteError::Full)
    }

    /// returns `true` if this error is the `Oversized` variant.
    #[inline]
    pub fn is_oversized(&self) -> bool {
        matches!(self, TryWriteError::Oversized { .. })
    }

    /// returns `true` if this error is the `Closed` variant.
    #[inline]
    pub fn is_closed(&self) -> bool {
        matches!(self, TryWriteError::Closed)
    }
}

impl fmt::Display for TryWriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TryWriteError::Full => write!(f, "writing to a full ring buffer"),
            TryWriteError::Oversized {
                requested,
                capacity,
            } => write!(
                f,
                "writing a batch of {} to a ring buffer of capacity {}",
                requested, capacity
            ),
            TryWriteError::Closed => write!(f, "writing to a closed ring buffer"),
        }
    }
}

impl std::error::Error for TryWriteError {}

impl From<WriteError> for TryWriteError {
    fn from(err: WriteError) -> Self {
        match err {
            WriteError::Oversized {
                requested,
                capacity,
            } => TryWriteError::Oversized {
                requested,
                capacity,
            },
            WriteError::Closed => TryWriteError::Closed,
        }
    }
}

/// error returned when a non-blocking ring buffer read fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TryReadError {
    /// the buffer holds too few elements for the batch right now.
    Empty,

    /// the batch is larger than the buffer capacity and can never fit.
    Oversized {
        /// number of elements in the rejected batch.
        requested: usize,
        /// buffer capacity at the time of rejection.
        capacity: usize,
    },

    /// the buffer has been closed and holds too few elements.
    Closed,
}

impl TryReadError {
    /// returns `true` if this error is the `Empty` variant.
    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, TryReadError::Empty)
    }

    /// returns `true` if this error is the `Oversized` variant.
    #[inline]
    pub fn is_oversized(&self) -> bool {
        matches!(self, TryReadError::Oversized { .. })
    }

    /// returns `true` if this error is the `Closed` variant.
    #[inline]
    pub fn is_closed(&self) -> bool {
        matches!(self, TryReadError::Closed)
    }
}

impl fmt::Display for TryReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TryReadError::Empty => write!(f, "reading from an empty ring buffer"),
            TryReadError::Oversized {
                requested,
                capacity,
            } => write!(
                f,
                "reading a batch of {} from a ring buffer of capacity {}",
                requested, capacity
            ),
            TryReadError::Closed => write!(f, "reading from a closed ring buffer"),
        }
    }
}

impl std::error::Error for TryReadError {}

impl From<ReadError> for TryReadError {
    fn from(err: ReadError) -> Self {
        match err {
            ReadError::Oversized {
                requested,
                capacity,
            } => TryReadError::Oversized {
                requested,
                capacity,
            },
            ReadError::Closed => TryReadError::Closed,
        }
    }
}

/// error returned when a timed ring buffer write fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteTimeoutError {
    /// the deadline elapsed before enough space was freed.
    Timeout,

    /// the batch is larger than the buffer capacity and can never fit.
    Oversized {
        /// number of elements in the rejected batch.
        requested: usize,
        /// buffer capacity at the time of rejection.
        capacity: usize,
    },

    /// the buffer has been closed.
    Closed,
}

impl WriteTimeoutError {
    /// returns `true` if this error is the `Timeout` variant.
    #[inline]
    pub fn is_timeout(&self) -> bool {
        matches!(self, WriteTimeoutError::Timeout)
    }

    /// returns `true` if this error is the `Oversized` variant.
    #[inline]
    pub fn is_oversized(&self) -> bool {
        matches!(self, WriteTimeoutError::Oversized { .. })
    }

    /// returns `true` if this error is the `Closed` variant.
    #[inline]
    pub fn is_closed(&self) -> bool {
        matches!(self, WriteTimeoutError::Closed)
    }
}

impl fmt::Display for WriteTimeoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteTimeoutError::Timeout => write!(f, "timed out waiting for ring buffer space"),
            WriteTimeoutError::Oversized {
                requested,
                capacity,
            } => write!(
                f,
                "writing a batch of {} to a ring buffer of capacity {}",
                requested, capacity
            ),
            WriteTimeoutError::Closed => write!(f, "writing to a closed ring buffer"),
        }
    }
}

impl std::error::Error for WriteTimeoutError {}

impl From<WriteError> for WriteTimeoutError {
    fn from(err: WriteError) -> Self {
        match err {
            WriteError::Oversized {
                requested,
                capacity,
            } => WriteTimeoutError::Oversized {
                requested,
                capacity,
            },
            WriteError::Closed => WriteTimeoutError::Closed,
        }
    }
}

/// error returned when a timed ring buffer read fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadTimeoutError {
    /// the deadline elapsed before enough elements arrived.
    Timeout,

    /// the batch is larger than the buffer capacity and can never fit.
    Oversized {
        /// number of elements in the rejected batch.
        requested: usize,
        /// buffer capacity at the time of rejection.
        capacity: usize,
    },

    /// the buffer has been closed and holds too few elements.
    Closed,
}

impl ReadTimeoutError {
    /// returns `true` if this error is the `Timeout` variant.
    #[inline]
    pub fn is_timeout(&self) -> bool {
        matches!(self, ReadTimeoutError::Timeout)
    }

    /// returns `true` if this error is the `Oversized` variant.
    #[inline]
    pub fn is_oversized(&self) -> bool {
        matches!(self, ReadTimeoutError::Oversized { .. })
    }

    /// returns `true` if this error is the `Closed` variant.
    #[inline]
    pub fn is_closed(&self) -> bool {
        matches!(self, ReadTimeoutError::Closed)
    }
}

impl fmt::Display for ReadTimeoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadTimeoutError::Timeout => write!(f, "timed out waiting for ring buffer data"),
            ReadTimeoutError::Oversized {
                requested,
                capacity,
            } => write!(
                f,
                "reading a batch of {} from a ring buffer of capacity {}",
                requested, capacity
            ),
            ReadTimeoutError::Closed => write!(f, "reading from a closed ring buffer"),
        }
    }
}

impl std::error::Error for ReadTimeoutError {}

impl From<ReadError> for ReadTimeoutError {
    fn from(err: ReadError) -> Self {
        match err {
            ReadError::Oversized {
                requested,
                capacity,
            } => ReadTimeoutError::Oversized {
                requested,
                capacity,
            },
            ReadError::Closed => ReadTimeoutError::Closed,
        }
    }
}

/// error returned when pushing onto a closed queue.
///
/// the error contains the item that failed to push, allowing the caller to
/// recover it.
///
/// # example
///
/// ```
/// use handoff::error::PushError;
///
/// let err: PushError<String> = PushError(String::from("hello"));
/// let recovered: String = err.into_inner();
/// assert_eq!(recovered, "hello");
/// ```
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PushError<T>(pub T);

impl<T> PushError<T> {
    /// consume the error and return the item that failed to push.
    #[inline]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T: fmt::Debug> fmt::Debug for PushError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PushError").field("item", &self.0).finish()
    }
}

impl<T> fmt::Display for PushError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pushing to a closed queue")
    }
}

impl<T: fmt::Debug> std::error::Error for PushError<T> {}

/// error returned when a blocking pop fails.
///
/// this occurs only when the queue has been closed and every buffered item
/// has already been drained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopError;

impl fmt::Display for PopError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "popping from a closed queue")
    }
}

impl std::error::Error for PopError {}

/// error returned when a non-blocking pop fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TryPopError {
    /// no items are currently buffered.
    Empty,

    /// the queue has been closed and drained.
    Closed,
}

impl TryPopError {
    /// returns `true` if this error is the `Empty` variant.
    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, TryPopError::Empty)
    }

    /// returns `true` if this error is the `Closed` variant.
    #[inline]
    pub fn is_closed(&self) -> bool {
        matches!(self, TryPopError::Closed)
    }
}

impl fmt::Display for TryPopError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TryPopError::Empty => write!(f, "popping from an empty queue"),
            TryPopError::Closed => write!(f, "popping from a closed queue"),
        }
    }
}

impl std::error::Error for TryPopError {}

impl From<PopError> for TryPopError {
    fn from(_: PopError) -> Self {
        TryPopError::Closed
    }
}

/// error returned when a timed pop fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopTimeoutError {
    /// the deadline elapsed with the queue still empty.
    Timeout,

    /// the queue has been closed and drained.
    Closed,
}

impl PopTimeoutError {
    /// returns `true` if this error is the `Timeout` variant.
    #[inline]
    pub fn is_timeout(&self) -> bool {
        matches!(self, PopTimeoutError::Timeout)
    }

    /// returns `true` if this error is the `Closed` variant.
    #[inline]
    pub fn is_closed(&self) -> bool {
        matches!(self, PopTimeoutError::Closed)
    }
}

impl fmt::Display for PopTimeoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PopTimeoutError::Timeout => write!(f, "timed out waiting for a queue item"),
            PopTimeoutError::Closed => write!(f, "popping from a closed queue"),
        }
    }
}

impl std::error::Error for PopTimeoutError {}

impl From<PopError> for PopTimeoutError {
    fn from(_: PopError) -> Self {
        PopTimeoutError::Closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_error_predicates() {
        let oversized = WriteError::Oversized {
            requested: 5,
            capacity: 4,
        };
        assert!(oversized.is_oversized());
        assert!(!oversized.is_closed());

        assert!(WriteError::Closed.is_closed());
        assert!(!WriteError::Closed.is_oversized());
    }

    #[test]
    fn test_write_error_display() {
        let oversized = WriteError::Oversized {
            requested: 5,
            capacity: 4,
        };
        assert_eq!(
            format!("{}", oversized),
            "writing a batch of 5 to a ring buffer of capacity 4"
        );
        assert_eq!(
            format!("{}", WriteError::Closed),
            "writing to a closed ring buffer"
        );
    }

    #[test]
    fn test_read_error_display() {
        let oversized = ReadError::Oversized {
            requested: 9,
            capacity: 8,
        };
        assert_eq!(
            format!("{}", oversized),
            "reading a batch of 9 from a ring buffer of capacity 8"
        );
        assert_eq!(
            format!("{}", ReadError::Closed),
            "reading from a closed ring buffer"
        );
    }

    #[test]
    fn test_try_write_error_predicates() {
        assert!(TryWriteError::Full.is_full());
        assert!(!TryWriteError::Full.is_closed());
        assert!(TryWriteError::Closed.is_closed());
        assert!(TryWriteError::Oversized {
            requested: 2,
            capacity: 1
        }
        .is_oversized());
    }

    #[test]
    fn test_try_read_error_predicates() {
        assert!(TryReadError::Empty.is_empty());
        assert!(!TryReadError::Empty.is_closed());
        assert!(TryReadError::Closed.is_closed());
    }

    #[test]
    fn test_timeout_error_predicates() {
        assert!(WriteTimeoutError::Timeout.is_timeout());
        assert!(!WriteTimeoutError::Timeout.is_closed());
        assert!(ReadTimeoutError::Timeout.is_timeout());
        assert!(ReadTimeoutError::Closed.is_closed());
    }

    #[test]
    fn test_blocking_errors_convert_to_bounded_forms() {
        let err = WriteError::Oversized {
            requested: 3,
            capacity: 2,
        };
        let try_err: TryWriteError = err.into();
        assert!(try_err.is_oversized());

        let timeout_err: WriteTimeoutError = WriteError::Closed.into();
        assert!(timeout_err.is_closed());

        let try_read: TryReadError = ReadError::Closed.into();
        assert!(try_read.is_closed());

        let read_timeout: ReadTimeoutError = ReadError::Oversized {
            requested: 3,
            capacity: 2,
        }
        .into();
        assert!(read_timeout.is_oversized());
    }

    #[test]
    fn test_push_error_returns_item() {
        let err = PushError(42);
        assert_eq!(err.into_inner(), 42);
    }

    #[test]
    fn test_push_error_display() {
        let err: PushError<i32> = PushError(0);
        assert_eq!(format!("{}", err), "pushing to a closed queue");
    }

    #[test]
    fn test_pop_error_display() {
        assert_eq!(format!("{}", PopError), "popping from a closed queue");
        assert_eq!(
            format!("{}", TryPopError::Empty),
            "popping from an empty queue"
        );
        assert_eq!(
            format!("{}", PopTimeoutError::Timeout),
            "timed out waiting for a queue item"
        );
    }

    #[test]
    fn test_pop_error_conversions() {
        let try_err: TryPopError = PopError.into();
        assert!(try_err.is_closed());

        let timeout_err: PopTimeoutError = PopError.into();
        assert!(timeout_err.is_closed());
    }
}
