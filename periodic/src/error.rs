use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("The signal is closed")]
    Closed,

    #[error("The signal has no spare capacity and no waiting receiver")]
    Full,

    #[error("Timed out waiting for the signal")]
    Timeout,

    #[error("The period must be positive")]
    InvalidPeriod,

    #[error("The periodic task panicked: {0}")]
    TaskPanicked(String),

    #[error(transparent)]
    Join(#[from] tokio::task::JoinError),
}
