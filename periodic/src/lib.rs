//! Cancellable sleeps and a periodic task runner.
//!
//! # Features
//!
//! - **Signal**: cloneable bounded channel used to request cancellation
//! - **sleep**: a sleep that ends early when a cancellation request arrives
//! - **serve**: runs a task at a fixed period until cancelled
//!
//! All waiting happens on the Tokio runtime; [`time::sleep_blocking`] is the
//! only operation intended for plain threads.
//!
//! # Example
//!
//! ```no_run
//! use periodic::{Signal, serve};
//! use time::Duration;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let cancel = Signal::new();
//! let server = serve(Duration::seconds(5), || async { do_work().await }, Some(cancel.clone()));
//!
//! // Later...
//! cancel.try_send(true).unwrap();
//! let invocations = server.join().await.unwrap();
//! # });
//!
//! # async fn do_work() {}
//! ```

extern crate alloc;

mod spawn;

pub mod config;
pub mod error;
pub mod serve;
pub mod signal;
pub mod time;

// Re-export commonly used types at crate root
pub use config::Config;
pub use error::{Error, Result};
pub use serve::{Server, serve, serve_with};
pub use signal::Signal;
pub use self::time::{Sleeper, sleep, sleep_blocking, sleep_detached};
