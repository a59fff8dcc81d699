//! Periodic task runner.
//!
//! [`serve`] spawns a loop that sleeps for one period, invokes the task, and
//! repeats until a cancellation request arrives on its [`Signal`]:
//!
//! 1. **Sleep**: wait for `period` using [`crate::time::sleep`]
//! 2. **Check**: stop if the sleep was cancelled
//! 3. **Invoke**: await the task, then go back to 1
//!
//! Invocations never overlap. Cancellation is cooperative: a request that
//! arrives while the task is running is observed at the next sleep, so the
//! in-flight invocation always runs to completion.
//!
//! # Task panics
//!
//! A panicking invocation stops the loop. The panic is caught and logged, and
//! [`Server::join`] returns [`Error::TaskPanicked`].
//!
//! # Example
//!
//! ```no_run
//! use periodic::serve;
//! use time::Duration;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! // Print "hello" every second for a minute, then stop
//! let server = serve(Duration::seconds(1), || async { println!("hello") }, None);
//! tokio::time::sleep(std::time::Duration::from_secs(60)).await;
//! server.cancel().send(true).await.unwrap();
//! # });
//! ```

use core::future::Future;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use tracing::{debug, error, trace};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::signal::Signal;
use crate::time::sleep;

/// Handle to a running periodic loop.
///
/// Dropping a `Server` detaches the loop; it keeps running until a
/// cancellation request arrives on its signal.
#[must_use = "dropping a Server detaches the loop, keep its cancel signal to stop it"]
#[derive(Debug)]
pub struct Server {
    cancel: Signal<bool>,
    handle: tokio::task::JoinHandle<Result<u64>>,
}

impl Server {
    /// The signal that stops the loop.
    ///
    /// This is the signal passed to [`serve`], or the one it created.
    pub fn cancel(&self) -> &Signal<bool> {
        &self.cancel
    }

    /// Waits for the loop to end.
    ///
    /// Returns the number of completed task invocations.
    pub async fn join(self) -> Result<u64> {
        self.handle.await?
    }

    /// Requests cancellation and waits for the loop to end.
    ///
    /// If the task is running it is allowed to finish first. On a rendezvous
    /// signal this waits for the loop to reach its next sleep.
    pub async fn stop(mut self) -> Result<u64> {
        tokio::select! {
            r = self.cancel.send(true) => {
                if r.is_err() {
                    trace!("Cancel signal already closed");
                }
            }
            r = &mut self.handle => return r?,
        }
        self.join().await
    }

    /// Aborts the loop at its next suspension point.
    pub fn abort(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Releases the task handle, leaving the loop running, and returns its signal.
    pub fn detach(self) -> Signal<bool> {
        self.cancel
    }
}

fn panic_message(panic: &(dyn core::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

async fn run<F, Fut>(period: time::Duration, mut task: F, cancel: Signal<bool>) -> Result<u64>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    debug!(?period, "Periodic task started");

    let mut invocations = 0u64;
    while sleep(period, Some(&cancel)).await {
        if let Err(panic) = AssertUnwindSafe(async { task().await })
            .catch_unwind()
            .await
        {
            let message = panic_message(&*panic);
            error!(invocations, "Periodic task panicked: {message}");
            return Err(Error::TaskPanicked(message));
        }
        invocations += 1;
        trace!(invocations, "Periodic task invoked");

        // Back-to-back invocations must not starve the scheduler
        if !period.is_positive() {
            tokio::task::yield_now().await;
        }
    }

    debug!(invocations, "Periodic task cancelled");
    Ok(invocations)
}

/// Runs `task` every `period` on a new task until cancelled.
///
/// Returns immediately. If `cancel` is `None` a signal with a single slot is
/// created, so one cancellation request never waits. Otherwise the supplied
/// signal is used and returned unchanged by [`Server::cancel`].
///
/// A non-positive `period` invokes the task back to back, yielding to the
/// scheduler between invocations.
///
/// # Panics
///
/// Panics if called outside of a Tokio runtime.
pub fn serve<F, Fut>(period: time::Duration, task: F, cancel: Option<Signal<bool>>) -> Server
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let cancel = cancel.unwrap_or_default();
    let handle = crate::spawn::spawn!("serve", run(period, task, cancel.clone()));
    Server { cancel, handle }
}

/// Runs `task` with the period and cancel signal capacity from `config`.
pub fn serve_with<F, Fut>(config: &Config, task: F) -> Result<Server>
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    config.validate()?;
    Ok(serve(
        config.period(),
        task,
        Some(Signal::bounded(config.cancel_capacity)),
    ))
}
