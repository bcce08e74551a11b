//! User-facing notification collaborator

/// Sink for user-visible notifications raised by session operations.
///
/// The session manager reports login/logout outcomes here instead of
/// rendering anything itself; the embedding surface decides what a
/// notification looks like (a toast, a status line, nothing at all).
pub trait Notifier: Send + Sync {
    /// Report a successful operation
    fn success(&self, message: &str);

    /// Report a failed operation, with the backend-provided message when
    /// available
    fn error(&self, message: &str);

    /// Report a neutral status change
    fn info(&self, message: &str);
}

/// Notifier that forwards everything to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn success(&self, message: &str) {
        tracing::info!(kind = "success", "{message}");
    }

    fn error(&self, message: &str) {
        tracing::warn!(kind = "error", "{message}");
    }

    fn info(&self, message: &str) {
        tracing::info!(kind = "info", "{message}");
    }
}
