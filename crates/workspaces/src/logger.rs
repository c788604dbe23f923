//! Log sink handed to providers and the catalogue builder.
//!
//! Discovery code never reaches for a global output channel. Callers pass a
//! [`Logger`] explicitly; [`TracingLogger`] forwards to `tracing`, and
//! [`NoopLogger`] discards everything.

/// Capability used to report progress and recoverable problems.
pub trait Logger: Send + Sync {
    /// Progress information.
    fn info(&self, msg: &str);
    /// A recoverable problem; discovery continues.
    fn warn(&self, msg: &str);
    /// A problem that aborted part of the resolution.
    fn error(&self, msg: &str);
}

/// Forwards every message to the `tracing` macros.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn info(&self, msg: &str) {
        tracing::info!(target: "monodex", "{msg}");
    }

    fn warn(&self, msg: &str) {
        tracing::warn!(target: "monodex", "{msg}");
    }

    fn error(&self, msg: &str) {
        tracing::error!(target: "monodex", "{msg}");
    }
}

/// Discards all messages.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogger;

impl Logger for NoopLogger {
    fn info(&self, _msg: &str) {}
    fn warn(&self, _msg: &str) {}
    fn error(&self, _msg: &str) {}
}
