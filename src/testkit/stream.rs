//! Scripted [`StreamTransport`] for supervisor and client tests.
//!
//! Each successful `open()` starts the next scripted connection. A connection
//! yields its events in order and then stays quiet until closed. A recorder
//! shared with the test records every URL opened, frame sent and close
//! requested.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::time::{self, Instant};
use url::Url;

use crate::error::{Error, Result};
use crate::port::{StreamTransport, TransportEvent};

/// What the transport was asked to do.
#[derive(Debug, Default)]
pub struct TransportLog {
    pub opened: Vec<Url>,
    pub open_times: Vec<Instant>,
    pub sent: Vec<String>,
    pub closes: Vec<u16>,
}

/// Shared view of a [`ScriptedTransport`]'s log.
#[derive(Debug, Clone, Default)]
pub struct TransportRecorder(Arc<Mutex<TransportLog>>);

impl TransportRecorder {
    pub fn open_count(&self) -> usize {
        self.0.lock().opened.len()
    }

    pub fn opened(&self) -> Vec<Url> {
        self.0.lock().opened.clone()
    }

    pub fn open_times(&self) -> Vec<Instant> {
        self.0.lock().open_times.clone()
    }

    pub fn sent(&self) -> Vec<String> {
        self.0.lock().sent.clone()
    }

    pub fn closes(&self) -> Vec<u16> {
        self.0.lock().closes.clone()
    }
}

pub struct ScriptedTransport {
    open_results: VecDeque<Result<()>>,
    open_delays: VecDeque<Duration>,
    connections: VecDeque<Vec<TransportEvent>>,
    current: Option<VecDeque<TransportEvent>>,
    recorder: TransportRecorder,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self {
            open_results: VecDeque::new(),
            open_delays: VecDeque::new(),
            connections: VecDeque::new(),
            current: None,
            recorder: TransportRecorder::default(),
        }
    }

    /// Results for successive `open()` calls; `Ok(())` once exhausted.
    pub fn with_open_results(mut self, results: Vec<Result<()>>) -> Self {
        self.open_results = results.into();
        self
    }

    /// Handshake durations for successive `open()` calls; instant once
    /// exhausted. The open is logged before the delay starts.
    pub fn with_open_delays(mut self, delays: Vec<Duration>) -> Self {
        self.open_delays = delays.into();
        self
    }

    /// Events for the next successful connection.
    pub fn with_connection(mut self, events: Vec<TransportEvent>) -> Self {
        self.connections.push_back(events);
        self
    }

    pub fn recorder(&self) -> TransportRecorder {
        self.recorder.clone()
    }

    pub fn is_open(&self) -> bool {
        self.current.is_some()
    }
}

impl Default for ScriptedTransport {
    fn default() -> Self {
        Self::new()
    }
}

/// A failed open, as the WebSocket adapter would report it.
pub fn refused() -> Result<()> {
    Err(Error::Connection("connection refused".into()))
}

/// A text frame event.
pub fn frame(value: serde_json::Value) -> TransportEvent {
    TransportEvent::Frame(value.to_string())
}

/// A close event with the given code.
pub fn closed(code: u16) -> TransportEvent {
    TransportEvent::Closed {
        code,
        reason: String::new(),
    }
}

#[async_trait]
impl StreamTransport for ScriptedTransport {
    async fn open(&mut self, url: &Url) -> Result<()> {
        {
            let mut log = self.recorder.0.lock();
            log.opened.push(url.clone());
            log.open_times.push(Instant::now());
        }
        if let Some(delay) = self.open_delays.pop_front() {
            time::sleep(delay).await;
        }
        self.open_results.pop_front().unwrap_or(Ok(()))?;
        let events = self.connections.pop_front().unwrap_or_default();
        self.current = Some(events.into());
        Ok(())
    }

    async fn send(&mut self, text: String) -> Result<()> {
        if self.current.is_none() {
            return Err(Error::Connection("not connected".into()));
        }
        self.recorder.0.lock().sent.push(text);
        Ok(())
    }

    async fn next_event(&mut self) -> TransportEvent {
        let next = self.current.as_mut().and_then(VecDeque::pop_front);
        match next {
            Some(event) => {
                if matches!(
                    event,
                    TransportEvent::Closed { .. } | TransportEvent::Failed(_)
                ) {
                    self.current = None;
                }
                event
            }
            None => std::future::pending().await,
        }
    }

    async fn close(&mut self, code: u16, _reason: &str) -> Result<()> {
        if self.current.take().is_some() {
            self.recorder.0.lock().closes.push(code);
        }
        Ok(())
    }
}
