//! Notifier that writes every event to the tracing log.

use tracing::{info, warn};

use crate::port::{Event, Notifier};

/// A logging notifier that logs events via tracing.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, event: Event) {
        match event {
            Event::Alert(alert) => {
                info!(
                    opportunity_id = %alert.opportunity_id,
                    profit_pct = %alert.profit_pct,
                    duration_ms = alert.duration.as_millis() as u64,
                    "Opportunity alert"
                );
            }
            Event::MarketUpdate(payload) => {
                info!(payload = %payload, "Market update");
            }
            Event::RiskAlert(payload) => {
                warn!(payload = %payload, "Risk alert");
            }
            Event::ExecutionResult(payload) => {
                info!(payload = %payload, "Execution result");
            }
            Event::ServerError(message) => {
                warn!(error = %message, "Server error");
            }
            Event::ConnectionChanged { status, error } => match error {
                Some(error) => info!(%status, error = %error, "Connection status changed"),
                None => info!(%status, "Connection status changed"),
            },
        }
    }
}
