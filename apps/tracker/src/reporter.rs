use std::error::Error;

use tracing::error;

/// Sink for failures that are handled locally but must not go unnoticed.
pub trait ErrorReporter: Send + Sync {
    /// `context` names the failed operation, e.g. `job_tracker.move_card`.
    fn report(&self, context: &str, error: &(dyn Error + 'static));
}

/// Default reporter: structured `tracing` error events, source chain included.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn report(&self, context: &str, err: &(dyn Error + 'static)) {
        error!(context, error = %err, chain = %error_chain(err), "operation failed");
    }
}

/// Renders an error and its sources as `outer: inner: root`.
pub fn error_chain(err: &(dyn Error + 'static)) -> String {
    let mut parts = vec![err.to_string()];
    let mut source = err.source();
    while let Some(cause) = source {
        parts.push(cause.to_string());
        source = cause.source();
    }
    parts.join(": ")
}
