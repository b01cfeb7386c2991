//! Notifier port for stream events.
//!
//! The stream client reports alerts, forwarded server messages and
//! connection changes here. Delivery is fire-and-forget.

use std::time::Duration;

use rust_decimal::Decimal;

use crate::domain::connection::ConnectionStatus;
use crate::domain::id::OpportunityId;

/// High-profit opportunity alert. Transient: shown for `duration`, then gone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub opportunity_id: OpportunityId,
    pub profit_pct: Decimal,
    pub duration: Duration,
}

/// Events that can trigger notifications.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// An opportunity crossed the alert threshold.
    Alert(Alert),
    /// `market_update` payload, forwarded as-is.
    MarketUpdate(serde_json::Value),
    /// `risk_alert` payload, forwarded as-is.
    RiskAlert(serde_json::Value),
    /// `execution_result` payload, forwarded as-is.
    ExecutionResult(serde_json::Value),
    /// The server sent an `error` frame.
    ServerError(String),
    /// Connection status changed.
    ConnectionChanged {
        status: ConnectionStatus,
        error: Option<String>,
    },
}

/// Trait for notification handlers.
///
/// `notify` should return quickly; slow sinks should spawn their own task.
pub trait Notifier: Send + Sync {
    fn notify(&self, event: Event);
}

/// Broadcasts events to every registered notifier.
pub struct NotifierRegistry {
    notifiers: Vec<Box<dyn Notifier>>,
}

impl NotifierRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self { notifiers: vec![] }
    }

    pub fn register(&mut self, notifier: Box<dyn Notifier>) {
        self.notifiers.push(notifier);
    }

    pub fn notify_all(&self, event: Event) {
        for notifier in &self.notifiers {
            notifier.notify(event.clone());
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.notifiers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notifiers.is_empty()
    }
}

impl Default for NotifierRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// A no-op notifier.
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _event: Event) {}
}
