use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
    Info,
    Warning,
}

/// Toast surface. Fire-and-forget; the core never waits on delivery.
pub trait Notify {
    fn notify(&self, message: &str, severity: Severity);
}

/// Routes toasts to the log. Used by the demo binary, where there is no
/// snackbar to pop.
pub struct TracingNotifier;

impl Notify for TracingNotifier {
    fn notify(&self, message: &str, severity: Severity) {
        match severity {
            Severity::Error => error!("{message}"),
            Severity::Warning => warn!("{message}"),
            Severity::Success | Severity::Info => info!("{message}"),
        }
    }
}

/// Irreversible-action guard. Delete asks here before touching the network.
pub trait ConfirmAction {
    fn confirm(&self, prompt: &str) -> bool;
}

pub struct AutoConfirm;

impl ConfirmAction for AutoConfirm {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}
