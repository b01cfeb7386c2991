//! WebSocket transport for the opportunity stream.
//!
//! Thin [`StreamTransport`] over `tokio-tungstenite`. Reconnection, routing
//! and decoding live above this layer; the transport only moves text frames
//! and reports how the connection ended.

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, trace};
use url::Url;

use crate::error::{Error, Result};
use crate::port::{StreamTransport, TransportEvent};

/// Close code reported when the peer vanished without a close frame.
pub const ABNORMAL_CLOSURE: u16 = 1006;

/// Close code reported for a close frame without a status.
pub const NO_STATUS_RECEIVED: u16 = 1005;

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// A single WebSocket connection, opened on demand.
#[derive(Default)]
pub struct WebSocketTransport {
    ws: Option<Socket>,
}

impl WebSocketTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// The URL without its query string, safe to log.
fn redacted(url: &Url) -> String {
    let mut shown = url.clone();
    shown.set_query(None);
    shown.to_string()
}

#[async_trait]
impl StreamTransport for WebSocketTransport {
    async fn open(&mut self, url: &Url) -> Result<()> {
        if let Some(mut old) = self.ws.take() {
            debug!("Dropping previous WebSocket before reopening");
            let _ = old.close(None).await;
        }
        info!(url = %redacted(url), "Connecting to WebSocket");
        let (ws, response) = connect_async(url.as_str()).await?;
        info!(status = %response.status(), "WebSocket connected");
        self.ws = Some(ws);
        Ok(())
    }

    async fn send(&mut self, text: String) -> Result<()> {
        let ws = self
            .ws
            .as_mut()
            .ok_or_else(|| Error::Connection("Not connected".into()))?;
        trace!(bytes = text.len(), "Sending WebSocket text frame");
        ws.send(Message::Text(text)).await?;
        Ok(())
    }

    async fn next_event(&mut self) -> TransportEvent {
        let Some(ws) = self.ws.as_mut() else {
            return std::future::pending().await;
        };

        let event = loop {
            match ws.next().await {
                Some(Ok(Message::Text(text))) => {
                    trace!(bytes = text.len(), "Received WebSocket text frame");
                    return TransportEvent::Frame(text);
                }
                Some(Ok(Message::Ping(data))) => {
                    trace!("Received WebSocket ping");
                    if let Err(e) = ws.send(Message::Pong(data)).await {
                        break TransportEvent::Failed(format!("failed to send pong: {e}"));
                    }
                }
                Some(Ok(Message::Close(frame))) => {
                    info!(frame = ?frame, "WebSocket closed by server");
                    break match frame {
                        Some(frame) => TransportEvent::Closed {
                            code: u16::from(frame.code),
                            reason: frame.reason.to_string(),
                        },
                        None => TransportEvent::Closed {
                            code: NO_STATUS_RECEIVED,
                            reason: String::new(),
                        },
                    };
                }
                // Binary, Pong and raw frames carry nothing for us.
                Some(Ok(_)) => {}
                Some(Err(e)) => break TransportEvent::Failed(e.to_string()),
                None => {
                    break TransportEvent::Closed {
                        code: ABNORMAL_CLOSURE,
                        reason: "stream ended".into(),
                    }
                }
            }
        };

        self.ws = None;
        event
    }

    async fn close(&mut self, code: u16, reason: &str) -> Result<()> {
        let Some(mut ws) = self.ws.take() else {
            return Ok(());
        };
        let frame = CloseFrame {
            code: CloseCode::from(code),
            reason: reason.to_string().into(),
        };
        ws.close(Some(frame)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacted_url_drops_token() {
        let url = Url::parse("wss://engine.test/ws?token=secret").unwrap();
        assert_eq!(redacted(&url), "wss://engine.test/ws");
    }

    #[tokio::test]
    async fn send_without_connection_fails() {
        let mut transport = WebSocketTransport::new();
        assert!(transport.send("{}".into()).await.is_err());
    }

    #[tokio::test]
    async fn close_without_connection_is_noop() {
        let mut transport = WebSocketTransport::new();
        assert!(transport.close(1000, "bye").await.is_ok());
    }
}
