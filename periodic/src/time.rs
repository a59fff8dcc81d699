//! Cancellable sleeps.
//!
//! Three flavours of the same wait are provided:
//!
//! - [`sleep`] suspends the calling async task.
//! - [`sleep_blocking`] blocks the calling thread.
//! - [`sleep_detached`] performs the wait on a spawned task and delivers the
//!   outcome on a result [`Signal`].
//!
//! All of them return `true` when the full duration elapsed and `false` when
//! a cancellation request (a value on the signal, or the signal being closed)
//! arrived first.
//!
//! # Example
//!
//! ```no_run
//! use periodic::{Signal, time::sleep};
//! use time::Duration;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let cancel = Signal::new();
//!
//! let canceller = cancel.clone();
//! tokio::spawn(async move {
//!     tokio::time::sleep(std::time::Duration::from_millis(1)).await;
//!     canceller.try_send(true).unwrap();
//! });
//!
//! // Returns false long before a minute has passed
//! assert!(!sleep(Duration::minutes(1), Some(&cancel)).await);
//! # });
//! ```

use tracing::trace;

use crate::error::{Error, Result};
use crate::signal::Signal;

/// Converts to a std duration, clamping negatives to zero and saturating at `MAX`.
pub(crate) fn to_std(duration: time::Duration) -> std::time::Duration {
    if !duration.is_positive() {
        return std::time::Duration::ZERO;
    }
    duration.try_into().unwrap_or(std::time::Duration::MAX)
}

/// Returns `true` if a cancellation request is already waiting on `cancel`.
///
/// A buffered request is consumed.
fn cancel_pending(cancel: &Signal<bool>) -> bool {
    !matches!(cancel.try_recv(), Ok(None))
}

/// Sleeps for `duration`, or until a value arrives on `cancel`.
///
/// Returns `true` if the sleep completed, `false` if it was cancelled.
///
/// # Behavior
///
/// - No signal: the sleep cannot be cancelled and always returns `true`
/// - A request already buffered on the signal, or a closed signal: returns
///   `false` without starting the timer
/// - Zero or negative durations: return `true` immediately
/// - Durations exceeding `std::time::Duration::MAX`: sleep for `MAX`
///
/// If the timer and the signal become ready together either result may be returned.
pub async fn sleep(duration: time::Duration, cancel: Option<&Signal<bool>>) -> bool {
    let Some(cancel) = cancel else {
        if duration.is_positive() {
            tokio::time::sleep(to_std(duration)).await;
        }
        return true;
    };

    if cancel_pending(cancel) {
        trace!("Sleep cancelled before starting");
        return false;
    }

    if !duration.is_positive() {
        return true;
    }

    let timer = tokio::time::sleep(to_std(duration));
    tokio::pin!(timer);

    tokio::select! {
        () = &mut timer => true,
        _ = cancel.recv() => {
            trace!("Sleep cancelled");
            false
        }
    }
}

/// Blocking version of [`sleep`] for synchronous threads.
///
/// Do not call this from an async task: it blocks the executor thread.
pub fn sleep_blocking(duration: time::Duration, cancel: Option<&Signal<bool>>) -> bool {
    let duration = to_std(duration);
    let Some(cancel) = cancel else {
        std::thread::sleep(duration);
        return true;
    };

    match cancel.recv_timeout(duration) {
        Err(Error::Timeout) => true,
        _ => false,
    }
}

/// A sleep running on its own task.
///
/// Created by [`sleep_detached`]. Dropping a `Sleeper` detaches the task,
/// which still delivers its result on [`done()`](Sleeper::done).
#[derive(Debug)]
pub struct Sleeper {
    done: Signal<bool>,
    cancel: Signal<bool>,
    handle: tokio::task::JoinHandle<()>,
}

impl Sleeper {
    /// The signal the outcome is delivered on.
    pub fn done(&self) -> &Signal<bool> {
        &self.done
    }

    /// The signal that cancels the sleep.
    pub fn cancel(&self) -> &Signal<bool> {
        &self.cancel
    }

    /// Waits for the outcome on the result signal.
    pub async fn result(&self) -> Result<bool> {
        self.done.recv().await
    }

    /// Waits for the sleeping task to finish, including delivery of its result.
    pub async fn join(self) -> Result<()> {
        Ok(self.handle.await?)
    }

    /// Aborts the sleeping task without delivering a result.
    pub fn abort(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Releases the task handle, returning the result and cancellation signals.
    pub fn detach(self) -> (Signal<bool>, Signal<bool>) {
        (self.done, self.cancel)
    }
}

/// Starts a cancellable sleep on a new task and returns immediately.
///
/// The outcome (`true` completed, `false` cancelled) is sent on `done` when
/// the sleep ends. Missing signals are created with a single slot; supplied
/// signals are the exact handles returned by [`Sleeper::done`] and
/// [`Sleeper::cancel`], so a receiver can be armed before the result exists.
///
/// If `done` has no spare capacity the task waits until the result is received.
///
/// # Panics
///
/// Panics if called outside of a Tokio runtime.
pub fn sleep_detached(
    duration: time::Duration,
    done: Option<Signal<bool>>,
    cancel: Option<Signal<bool>>,
) -> Sleeper {
    let done = done.unwrap_or_default();
    let cancel = cancel.unwrap_or_default();

    let handle = {
        let done = done.clone();
        let cancel = cancel.clone();
        crate::spawn::spawn!("sleep_detached", async move {
            let completed = sleep(duration, Some(&cancel)).await;
            if done.send(completed).await.is_err() {
                trace!("Result signal closed, sleep outcome discarded");
            }
        })
    };

    Sleeper {
        done,
        cancel,
        handle,
    }
}
