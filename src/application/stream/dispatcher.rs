//! Frame decoding and routing.

use serde::Deserialize;
use tracing::{debug, warn};

use crate::domain::opportunity::Opportunity;
use crate::port::{Event, MessageKind, StreamMessage};

/// Where a decoded frame should go.
#[derive(Debug, Clone, PartialEq)]
pub enum Routed {
    /// Upsert into the registry.
    Opportunity(Box<Opportunity>),
    /// Liveness, optionally confirming the session.
    Heartbeat(Heartbeat),
    /// Server-reported error; recorded without closing.
    ServerError(String),
    /// Forward to the notifiers untouched.
    Notify(Event),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Heartbeat {
    #[serde(default)]
    pub authenticated: Option<bool>,
    #[serde(default)]
    pub tier: Option<String>,
}

#[derive(Deserialize)]
struct ErrorPayload {
    message: String,
}

/// Decodes inbound frames and tracks the per-connection sequence.
#[derive(Debug, Default)]
pub struct Dispatcher {
    last_sequence: Option<u64>,
    dropped: u64,
}

impl Dispatcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the sequence of the previous connection.
    pub fn reset(&mut self) {
        self.last_sequence = None;
    }

    #[must_use]
    pub const fn last_sequence(&self) -> Option<u64> {
        self.last_sequence
    }

    /// Frames that could not be decoded since construction.
    #[must_use]
    pub const fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Decode and route one text frame. Malformed frames are logged and
    /// dropped.
    pub fn dispatch(&mut self, text: &str) -> Option<Routed> {
        let message = match StreamMessage::parse(text) {
            Ok(message) => message,
            Err(e) => {
                self.dropped += 1;
                warn!(error = %e, "Dropping undecodable stream frame");
                return None;
            }
        };

        if let Some(sequence) = message.sequence {
            self.track(sequence);
        }

        match message.kind {
            MessageKind::Opportunity => {
                match serde_json::from_value::<Opportunity>(message.payload) {
                    Ok(opportunity) => Some(Routed::Opportunity(Box::new(opportunity))),
                    Err(e) => {
                        self.dropped += 1;
                        warn!(error = %e, "Dropping malformed opportunity payload");
                        None
                    }
                }
            }
            MessageKind::Heartbeat => {
                // A bare heartbeat is liveness only.
                let heartbeat = serde_json::from_value(message.payload).unwrap_or_default();
                Some(Routed::Heartbeat(heartbeat))
            }
            MessageKind::Error => Some(Routed::ServerError(error_message(message.payload))),
            MessageKind::MarketUpdate => Some(Routed::Notify(Event::MarketUpdate(message.payload))),
            MessageKind::RiskAlert => Some(Routed::Notify(Event::RiskAlert(message.payload))),
            MessageKind::ExecutionResult => {
                Some(Routed::Notify(Event::ExecutionResult(message.payload)))
            }
        }
    }

    fn track(&mut self, sequence: u64) {
        if let Some(last) = self.last_sequence {
            if sequence <= last {
                debug!(last, sequence, "Stream sequence regressed");
            }
        }
        self.last_sequence = Some(sequence);
    }
}

fn error_message(payload: serde_json::Value) -> String {
    match payload {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => "unknown server error".to_string(),
        other => serde_json::from_value::<ErrorPayload>(other.clone())
            .map(|p| p.message)
            .unwrap_or_else(|_| other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn frame(kind: &str, payload: serde_json::Value, sequence: u64) -> String {
        json!({
            "type": kind,
            "payload": payload,
            "timestamp": "2026-01-01T00:00:00Z",
            "sequence": sequence,
        })
        .to_string()
    }

    #[test]
    fn routes_opportunity() {
        let mut dispatcher = Dispatcher::new();
        let text = frame(
            "opportunity",
            json!({"opportunity_id": "a", "detected_at": "2026-01-01T00:00:00Z"}),
            1,
        );
        match dispatcher.dispatch(&text) {
            Some(Routed::Opportunity(opp)) => assert_eq!(opp.opportunity_id.as_str(), "a"),
            other => panic!("unexpected routing: {other:?}"),
        }
        assert_eq!(dispatcher.last_sequence(), Some(1));
    }

    #[test]
    fn malformed_frames_are_dropped() {
        let mut dispatcher = Dispatcher::new();
        assert!(dispatcher.dispatch("{not json").is_none());
        assert!(dispatcher
            .dispatch(&frame("opportunity", json!({"nope": true}), 1))
            .is_none());
        assert_eq!(dispatcher.dropped(), 2);
    }

    #[test]
    fn heartbeat_carries_auth_confirmation() {
        let mut dispatcher = Dispatcher::new();
        let routed = dispatcher.dispatch(&frame(
            "heartbeat",
            json!({"authenticated": true, "tier": "pro"}),
            2,
        ));
        assert_eq!(
            routed,
            Some(Routed::Heartbeat(Heartbeat {
                authenticated: Some(true),
                tier: Some("pro".into()),
            }))
        );
    }

    #[test]
    fn error_frame_extracts_message() {
        let mut dispatcher = Dispatcher::new();
        let routed = dispatcher.dispatch(&frame("error", json!({"message": "rate limited"}), 3));
        assert_eq!(routed, Some(Routed::ServerError("rate limited".into())));

        let routed = dispatcher.dispatch(&frame("error", json!("bare string"), 4));
        assert_eq!(routed, Some(Routed::ServerError("bare string".into())));
    }

    #[test]
    fn informational_kinds_are_forwarded() {
        let mut dispatcher = Dispatcher::new();
        let payload = json!({"market_id": "m"});
        assert_eq!(
            dispatcher.dispatch(&frame("risk_alert", payload.clone(), 1)),
            Some(Routed::Notify(Event::RiskAlert(payload)))
        );
    }

    #[test]
    fn regression_is_tolerated_and_reset_clears_tracking() {
        let mut dispatcher = Dispatcher::new();
        dispatcher.dispatch(&frame("heartbeat", json!({}), 10));
        dispatcher.dispatch(&frame("heartbeat", json!({}), 4));
        assert_eq!(dispatcher.last_sequence(), Some(4));

        dispatcher.reset();
        assert_eq!(dispatcher.last_sequence(), None);
    }
}
