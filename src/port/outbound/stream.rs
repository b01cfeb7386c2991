//! Stream port: the raw transport and the frames that travel over it.
//!
//! Inbound frames are JSON objects `{type, payload, timestamp, sequence}`.
//! Outbound control frames are `auth`, `subscribe` and `unsubscribe`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::domain::id::MarketId;
use crate::error::Result;

/// Lifecycle and data events produced by an open transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// A text frame.
    Frame(String),
    /// The connection closed with a WebSocket close code.
    Closed { code: u16, reason: String },
    /// The connection failed without a close handshake.
    Failed(String),
}

/// One bidirectional connection to the stream endpoint.
///
/// Implementations hold at most one connection. `next_event` must stay
/// pending while no connection is open so the caller can `select!` on it
/// alongside timers.
#[async_trait]
pub trait StreamTransport: Send {
    /// Open a connection; resolves once the handshake completes.
    async fn open(&mut self, url: &Url) -> Result<()>;

    /// Send a text frame on the open connection.
    async fn send(&mut self, text: String) -> Result<()>;

    /// Wait for the next event on the open connection.
    async fn next_event(&mut self) -> TransportEvent;

    /// Close the connection with the given code. A no-op when nothing is open.
    async fn close(&mut self, code: u16, reason: &str) -> Result<()>;
}

/// Kind tag of an inbound stream message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Opportunity,
    MarketUpdate,
    RiskAlert,
    ExecutionResult,
    Error,
    Heartbeat,
}

/// A decoded inbound frame. The payload stays opaque until routed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamMessage {
    #[serde(rename = "type")]
    pub kind: MessageKind,
    #[serde(default)]
    pub payload: serde_json::Value,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    /// Monotonic within one connection; reset by the server on reconnect.
    #[serde(default)]
    pub sequence: Option<u64>,
}

impl StreamMessage {
    /// Parse a raw text frame.
    ///
    /// # Errors
    ///
    /// Returns the JSON error for malformed frames or unknown kinds.
    pub fn parse(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}

/// Client-to-server control frames.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControlFrame {
    Auth {
        token: String,
    },
    Subscribe {
        #[serde(skip_serializing_if = "Option::is_none")]
        markets: Option<Vec<MarketId>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        topics: Option<Vec<String>>,
        #[serde(rename = "minProfit", skip_serializing_if = "Option::is_none")]
        min_profit: Option<f64>,
    },
    Unsubscribe {
        #[serde(skip_serializing_if = "Option::is_none")]
        markets: Option<Vec<MarketId>>,
    },
}

impl ControlFrame {
    /// Serialize to the wire form.
    ///
    /// # Errors
    ///
    /// Returns an error only if serialization fails, e.g. for a non-finite
    /// `min_profit`.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// The filter the client asks the server to apply.
///
/// Empty lists mean "everything" and are omitted from the frame.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Subscription {
    #[serde(default)]
    pub markets: Vec<MarketId>,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub min_profit: Option<f64>,
}

impl Subscription {
    #[must_use]
    pub fn to_frame(&self) -> ControlFrame {
        ControlFrame::Subscribe {
            markets: (!self.markets.is_empty()).then(|| self.markets.clone()),
            topics: (!self.topics.is_empty()).then(|| self.topics.clone()),
            min_profit: self.min_profit,
        }
    }

    /// Remove markets from the filter. Returns true if anything changed.
    pub fn remove_markets(&mut self, markets: &[MarketId]) -> bool {
        let before = self.markets.len();
        self.markets.retain(|m| !markets.contains(m));
        before != self.markets.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_opportunity_frame() {
        let text = r#"{"type":"opportunity","payload":{"opportunity_id":"a"},"timestamp":"2026-01-01T00:00:00Z","sequence":7}"#;
        let msg = StreamMessage::parse(text).unwrap();
        assert_eq!(msg.kind, MessageKind::Opportunity);
        assert_eq!(msg.sequence, Some(7));
        assert_eq!(msg.payload["opportunity_id"], "a");
    }

    #[test]
    fn heartbeat_without_payload_parses() {
        let msg = StreamMessage::parse(r#"{"type":"heartbeat"}"#).unwrap();
        assert_eq!(msg.kind, MessageKind::Heartbeat);
        assert!(msg.payload.is_null());
        assert!(msg.sequence.is_none());
    }

    #[test]
    fn unknown_kind_is_rejected() {
        assert!(StreamMessage::parse(r#"{"type":"gossip","payload":{}}"#).is_err());
        assert!(StreamMessage::parse("not json").is_err());
    }

    #[test]
    fn auth_frame_serializes() {
        let json = ControlFrame::Auth {
            token: "secret".into(),
        }
        .to_json()
        .unwrap();
        assert_eq!(json, r#"{"type":"auth","token":"secret"}"#);
    }

    #[test]
    fn subscribe_frame_omits_empty_filters() {
        let sub = Subscription {
            markets: vec![],
            topics: vec!["opportunities".into()],
            min_profit: Some(2.5),
        };
        let json = sub.to_frame().to_json().unwrap();
        assert_eq!(
            json,
            r#"{"type":"subscribe","topics":["opportunities"],"minProfit":2.5}"#
        );
    }

    #[test]
    fn unsubscribe_frame_serializes_markets() {
        let json = ControlFrame::Unsubscribe {
            markets: Some(vec![MarketId::from("m1")]),
        }
        .to_json()
        .unwrap();
        assert_eq!(json, r#"{"type":"unsubscribe","markets":["m1"]}"#);
    }

    #[test]
    fn remove_markets_reports_change() {
        let mut sub = Subscription {
            markets: vec![MarketId::from("a"), MarketId::from("b")],
            ..Default::default()
        };
        assert!(sub.remove_markets(&[MarketId::from("a")]));
        assert!(!sub.remove_markets(&[MarketId::from("zzz")]));
        assert_eq!(sub.markets, vec![MarketId::from("b")]);
    }
}
