//! User-visible error notifications.

use tracing::warn;

/// Channel the store reports failed actions to, e.g. a toast in the UI.
pub trait Notifier: Send + Sync {
    fn error(&self, message: &str);
}

/// Notifier that only logs.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn error(&self, message: &str) {
        warn!(message, "notification");
    }
}
