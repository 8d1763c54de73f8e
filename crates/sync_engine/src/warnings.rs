//! Recoverable anomaly accumulator

use contracts::{Severity, SyncWarning, WarningKind};
use tracing::{info, warn};

/// Warnings collected during one run, logged as they are recorded
#[derive(Debug, Default)]
pub(crate) struct Warnings {
    items: Vec<SyncWarning>,
}

impl Warnings {
    pub fn warn(&mut self, kind: WarningKind, message: impl Into<String>) {
        let message = message.into();
        warn!(kind = %kind, "{message}");
        self.push(Severity::Warning, kind, message);
    }

    pub fn info(&mut self, kind: WarningKind, message: impl Into<String>) {
        let message = message.into();
        info!(kind = %kind, "{message}");
        self.push(Severity::Info, kind, message);
    }

    fn push(&mut self, severity: Severity, kind: WarningKind, message: String) {
        metrics::counter!("sync_warnings_total", "kind" => kind.as_str()).increment(1);
        self.items.push(SyncWarning {
            severity,
            kind,
            message,
        });
    }

    pub fn into_vec(self) -> Vec<SyncWarning> {
        self.items
    }
}
