//! Diagnostic logging for settings and pattern loading.
//!
//! This channel is separate from the [`OperationLog`](crate::OperationLog):
//! it reports configuration problems to the developer console, while the
//! operation log is the record handed back to the user.

use tracing_subscriber::EnvFilter;

/// Diagnostic sink used by the loaders.
pub trait Logger {
    fn log_error(&self, message: &str);
    fn log_error_with_cause(&self, message: &str, cause: &dyn std::error::Error);
    fn log_debug(&self, message: &str);
}

/// [`Logger`] that forwards to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log_error(&self, message: &str) {
        tracing::error!("{}", message);
    }

    fn log_error_with_cause(&self, message: &str, cause: &dyn std::error::Error) {
        tracing::error!(cause = %cause, "{}", message);
    }

    fn log_debug(&self, message: &str) {
        tracing::debug!("{}", message);
    }
}

/// Installs the global tracing subscriber, writing to stderr.
///
/// `RUST_LOG` wins over `default_level` when it is set and valid.
/// Calling this twice is harmless; the second call is ignored.
pub fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// [`Logger`] that keeps every message, for assertions in tests.
#[cfg(test)]
#[derive(Default)]
pub(crate) struct RecordingLogger {
    pub(crate) errors: std::cell::RefCell<Vec<String>>,
    pub(crate) debug: std::cell::RefCell<Vec<String>>,
}

#[cfg(test)]
impl Logger for RecordingLogger {
    fn log_error(&self, message: &str) {
        self.errors.borrow_mut().push(message.to_string());
    }

    fn log_error_with_cause(&self, message: &str, cause: &dyn std::error::Error) {
        self.errors
            .borrow_mut()
            .push(format!("{}: {}", message, cause));
    }

    fn log_debug(&self, message: &str) {
        self.debug.borrow_mut().push(message.to_string());
    }
}
