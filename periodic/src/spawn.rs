/// Spawns a task on the Tokio runtime with optional tracing instrumentation.
///
/// When the `instrument` feature is enabled the task runs inside a root span
/// named `$name` that follows from the caller's current span.
///
/// # Syntax
///
/// ```text
/// spawn!("task_name", async { ... })
/// ```
macro_rules! spawn {
    ($name:literal, $task:expr) => {{
        let task = $task;
        #[cfg(feature = "instrument")]
        let task = {
            let span = tracing::trace_span!(parent: None, $name);
            span.follows_from(tracing::Span::current());
            tracing::Instrument::instrument(task, span)
        };
        tokio::spawn(task)
    }};
}

pub(crate) use spawn;
