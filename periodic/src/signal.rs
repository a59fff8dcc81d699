//! Thread-safe notification channel used for cancellation requests and results.
//!
//! A [`Signal`] is a cloneable handle to a single bounded channel. All clones
//! share the same channel, so the handle given to a sleep or a periodic task
//! is the same handle the caller later sends on, and [`Signal::same_signal`]
//! can tell whether two handles are the same channel.
//!
//! # Capacity
//!
//! | Constructor | Capacity | `send` waits when |
//! |-------------|----------|-------------------|
//! | [`Signal::rendezvous()`] | 0 | no receiver is currently waiting |
//! | [`Signal::new()`] | 1 | the slot is already occupied |
//! | [`Signal::bounded(n)`](Signal::bounded) | n | all `n` slots are occupied |
//!
//! Callers that want to cancel without waiting should use a signal with at
//! least one slot, or [`Signal::try_send`].
//!
//! # Closing
//!
//! [`Signal::close`] closes the channel for every handle. Values already
//! buffered can still be received, after which every receive fails with
//! [`Error::Closed`]. A sleep observing a closed signal treats it as cancelled.
//!
//! # Example
//!
//! ```no_run
//! use periodic::Signal;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let cancel = Signal::new();
//! let waiter = cancel.clone();
//!
//! tokio::spawn(async move {
//!     if waiter.recv().await.is_ok() {
//!         println!("Cancelled!");
//!     }
//! });
//!
//! // Never waits: the signal has a free slot
//! cancel.try_send(true).unwrap();
//! # });
//! ```

use alloc::sync::Arc;

use crate::error::{Error, Result};

struct Inner<T> {
    tx: spin::Mutex<Option<flume::Sender<T>>>,
    rx: flume::Receiver<T>,
    capacity: usize,
}

/// A cloneable handle to a bounded, multi-producer multi-consumer channel.
///
/// Every value sent is received by exactly one receiver, so a single
/// cancellation request stops a single sleep or periodic loop.
pub struct Signal<T = bool> {
    inner: Arc<Inner<T>>,
}

impl<T> Signal<T> {
    /// Creates a signal with a single buffered slot.
    pub fn new() -> Self {
        Self::bounded(1)
    }

    /// Creates a signal that buffers up to `capacity` values.
    ///
    /// A capacity of zero creates a [rendezvous](Signal::rendezvous) signal.
    pub fn bounded(capacity: usize) -> Self {
        let (tx, rx) = flume::bounded(capacity);
        Self {
            inner: Arc::new(Inner {
                tx: spin::Mutex::new(Some(tx)),
                rx,
                capacity,
            }),
        }
    }

    /// Creates an unbuffered signal: a send completes only when handed to a receiver.
    pub fn rendezvous() -> Self {
        Self::bounded(0)
    }

    fn sender(&self) -> Result<flume::Sender<T>> {
        self.inner.tx.lock().clone().ok_or(Error::Closed)
    }

    /// Sends a value, waiting for buffer capacity or a receiver.
    ///
    /// Fails with [`Error::Closed`] if the signal was closed before the send started.
    pub async fn send(&self, value: T) -> Result<()> {
        self.sender()?
            .send_async(value)
            .await
            .map_err(|_| Error::Closed)
    }

    /// Sends a value from a synchronous thread, blocking until it is accepted.
    ///
    /// Do not call this from an async task: it blocks the executor thread.
    pub fn send_blocking(&self, value: T) -> Result<()> {
        self.sender()?.send(value).map_err(|_| Error::Closed)
    }

    /// Sends a value only if that can be done without waiting.
    pub fn try_send(&self, value: T) -> Result<()> {
        self.sender()?.try_send(value).map_err(|e| match e {
            flume::TrySendError::Full(_) => Error::Full,
            flume::TrySendError::Disconnected(_) => Error::Closed,
        })
    }

    /// Waits for a value.
    ///
    /// Returns [`Error::Closed`] once the signal is closed and drained.
    pub async fn recv(&self) -> Result<T> {
        self.inner.rx.recv_async().await.map_err(|_| Error::Closed)
    }

    /// Takes a value if one is immediately available.
    ///
    /// Returns `Ok(None)` when the signal is open but empty.
    pub fn try_recv(&self) -> Result<Option<T>> {
        match self.inner.rx.try_recv() {
            Ok(value) => Ok(Some(value)),
            Err(flume::TryRecvError::Empty) => Ok(None),
            Err(flume::TryRecvError::Disconnected) => Err(Error::Closed),
        }
    }

    /// Blocks the current thread until a value arrives or `timeout` elapses.
    pub fn recv_timeout(&self, timeout: core::time::Duration) -> Result<T> {
        self.inner.rx.recv_timeout(timeout).map_err(|e| match e {
            flume::RecvTimeoutError::Timeout => Error::Timeout,
            flume::RecvTimeoutError::Disconnected => Error::Closed,
        })
    }

    /// Closes the signal for every handle.
    ///
    /// Sends started afterwards fail; a send already waiting for capacity may still complete.
    ///
    /// Returns `false` if the signal was already closed.
    pub fn close(&self) -> bool {
        self.inner.tx.lock().take().is_some()
    }

    pub fn is_closed(&self) -> bool {
        self.inner.tx.lock().is_none()
    }

    /// Number of values currently buffered.
    pub fn len(&self) -> usize {
        self.inner.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.rx.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    /// Returns `true` if both handles refer to the same channel.
    pub fn same_signal(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> Default for Signal<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> core::fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Signal")
            .field("capacity", &self.capacity())
            .field("len", &self.len())
            .field("closed", &self.is_closed())
            .finish()
    }
}
