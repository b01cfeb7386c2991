//! Reconnection supervisor for the opportunity stream.
//!
//! Wraps a [`StreamTransport`] and drives the pure [`Link`] state machine:
//! every lifecycle event is fed to [`Link::apply`] and the returned actions
//! (open, close, schedule or cancel the retry timer) are executed here. The
//! retry policy is a fixed interval, repeated indefinitely while
//! auto-reconnect is enabled. At most one retry is ever pending.
//!
//! Outside of an executing transition the link is never `Connecting`: if it
//! is, the future driving an open was dropped mid-handshake and the next call
//! to [`StreamSupervisor::next`] or [`StreamSupervisor::connect`] reissues it.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, warn};
use url::Url;

use crate::domain::connection::{
    ConnectionStatus, Link, LinkAction, LinkEvent, Retry, NORMAL_CLOSURE,
};
use crate::domain::id::MarketId;
use crate::error::{Error, Result};
use crate::infrastructure::config::stream::StreamConfig;
use crate::port::{ControlFrame, StreamTransport, Subscription, TransportEvent};

/// What the supervisor observed, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SupervisorEvent {
    /// A fresh connection is open. Sequence tracking restarts here.
    Opened,
    /// A text frame arrived on the open connection.
    Frame(String),
    /// The connection closed.
    Closed { code: u16, reason: String },
    /// The connection or an open attempt failed.
    Failed(String),
    /// A reconnection attempt will run after `delay`.
    RetryScheduled { delay: Duration },
}

enum Wake {
    Retry,
    Transport(TransportEvent),
}

/// Owns the transport and the connection state.
pub struct StreamSupervisor<T: StreamTransport> {
    transport: T,
    url: Url,
    reconnect_interval: Duration,
    link: Link,
    credential: Option<String>,
    subscription: Option<Subscription>,
    retry_at: Option<Instant>,
    pending: VecDeque<SupervisorEvent>,
}

impl<T: StreamTransport> StreamSupervisor<T> {
    /// Create a supervisor in the disconnected state.
    pub fn new(transport: T, url: Url, config: &StreamConfig) -> Self {
        Self {
            transport,
            url,
            reconnect_interval: config.reconnect_interval(),
            link: Link::new(config.auto_reconnect),
            credential: None,
            subscription: config.subscribe.clone(),
            retry_at: None,
            pending: VecDeque::new(),
        }
    }

    #[must_use]
    pub const fn status(&self) -> ConnectionStatus {
        self.link.status()
    }

    /// Most recent failure or server-reported error.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.link.error()
    }

    #[must_use]
    pub const fn is_retry_pending(&self) -> bool {
        matches!(self.link.retry(), Retry::Pending)
    }

    #[must_use]
    pub fn subscription(&self) -> Option<&Subscription> {
        self.subscription.as_ref()
    }

    /// Open the stream. A no-op while a connection is open; an open that was
    /// abandoned mid-handshake is started again with the stored credential.
    ///
    /// The credential is appended to the URL as the `token` query parameter
    /// and reused for every automatic reconnect.
    pub async fn connect(&mut self, credential: Option<String>) {
        self.resume_interrupted_open().await;
        if self.link.status().is_active() {
            debug!(status = %self.link.status(), "Connect ignored, already active");
            return;
        }
        self.credential = credential;
        let credentialed = self.credential.is_some();
        self.handle(LinkEvent::ConnectRequested { credentialed }).await;
    }

    /// Close the stream and cancel any pending retry. Idempotent.
    pub async fn disconnect(&mut self) {
        self.handle(LinkEvent::DisconnectRequested).await;
    }

    /// Send an `auth` frame on the open connection and remember the token
    /// for future reconnects.
    ///
    /// # Errors
    ///
    /// Returns an error if no connection is open or the send fails.
    pub async fn authenticate(&mut self, token: String) -> Result<()> {
        let frame = ControlFrame::Auth {
            token: token.clone(),
        };
        self.send_control(&frame).await?;
        self.credential = Some(token);
        self.observe(LinkEvent::CredentialSet);
        Ok(())
    }

    /// Replace the active subscription. Sent now when open, and replayed
    /// after every reconnect.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection is open and the send fails.
    pub async fn subscribe(&mut self, subscription: Subscription) -> Result<()> {
        let frame = subscription.to_frame();
        self.subscription = Some(subscription);
        if self.link.status().is_open() {
            self.send_control(&frame).await?;
        }
        Ok(())
    }

    /// Stop receiving updates for the given markets.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection is open and the send fails.
    pub async fn unsubscribe(&mut self, markets: Vec<MarketId>) -> Result<()> {
        if let Some(sub) = self.subscription.as_mut() {
            sub.remove_markets(&markets);
        }
        if self.link.status().is_open() {
            let frame = ControlFrame::Unsubscribe {
                markets: (!markets.is_empty()).then_some(markets),
            };
            self.send_control(&frame).await?;
        }
        Ok(())
    }

    /// Record an `error` frame from the server without closing.
    pub fn record_server_error(&mut self, message: String) {
        self.observe(LinkEvent::ServerError { message });
    }

    /// A heartbeat confirmed the session is authenticated.
    pub fn confirm_authenticated(&mut self) {
        self.observe(LinkEvent::AuthConfirmed);
    }

    /// Wait for the next observable event.
    ///
    /// Returns `None` once nothing can happen anymore: no connection is open
    /// and no retry is pending.
    ///
    /// Cancel-safe: dropping the future mid-open leaves the link `Connecting`,
    /// and the next call resumes the open instead of stalling.
    pub async fn next(&mut self) -> Option<SupervisorEvent> {
        self.resume_interrupted_open().await;
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Some(event);
            }

            let open = self.link.status().is_open();
            let retry_at = self.retry_at;
            if !open && retry_at.is_none() {
                return None;
            }

            let deadline = retry_at.unwrap_or_else(Instant::now);
            let wake = tokio::select! {
                () = sleep_until(deadline), if retry_at.is_some() => Wake::Retry,
                event = self.transport.next_event(), if open => Wake::Transport(event),
            };

            match wake {
                Wake::Retry => {
                    self.retry_at = None;
                    info!("Reconnecting to opportunity stream");
                    self.handle(LinkEvent::RetryElapsed).await;
                }
                Wake::Transport(TransportEvent::Frame(text)) => {
                    return Some(SupervisorEvent::Frame(text));
                }
                Wake::Transport(TransportEvent::Closed { code, reason }) => {
                    if code == NORMAL_CLOSURE {
                        info!(code, "Stream closed");
                    } else {
                        warn!(code, reason = %reason, "Stream closed unexpectedly");
                    }
                    self.pending.push_back(SupervisorEvent::Closed {
                        code,
                        reason: reason.clone(),
                    });
                    self.handle(LinkEvent::Closed { code, reason }).await;
                }
                Wake::Transport(TransportEvent::Failed(reason)) => {
                    warn!(error = %reason, "Stream transport failed");
                    self.pending.push_back(SupervisorEvent::Failed(reason.clone()));
                    self.handle(LinkEvent::Failed { reason }).await;
                }
            }
        }
    }

    /// Apply an event whose transition carries no side effects.
    fn observe(&mut self, event: LinkEvent) {
        let (next, _) = self.link.apply(event);
        self.link = next;
    }

    async fn resume_interrupted_open(&mut self) {
        if self.link.status() == ConnectionStatus::Connecting {
            info!("Resuming interrupted stream open");
            self.handle(LinkEvent::OpenInterrupted).await;
        }
    }

    /// Feed an event through the state machine and run its actions until no
    /// follow-up events remain.
    async fn handle(&mut self, event: LinkEvent) {
        let mut queue = VecDeque::from([event]);
        while let Some(event) = queue.pop_front() {
            let (next, actions) = self.link.apply(event);
            self.link = next;
            for action in actions {
                if let Some(follow_up) = self.run(action).await {
                    queue.push_back(follow_up);
                }
            }
        }
    }

    async fn run(&mut self, action: LinkAction) -> Option<LinkEvent> {
        match action {
            LinkAction::Open => {
                let url = self.connect_url();
                info!(
                    url = %self.url,
                    credentialed = self.link.credentialed(),
                    "Opening stream"
                );
                match self.transport.open(&url).await {
                    Ok(()) => {
                        info!("Stream connected");
                        self.pending.push_back(SupervisorEvent::Opened);
                        // Settle the link before the replay send can suspend.
                        self.observe(LinkEvent::Opened);
                        self.replay_subscription().await;
                        None
                    }
                    Err(e) => {
                        let reason = e.to_string();
                        warn!(error = %reason, "Failed to open stream");
                        self.pending.push_back(SupervisorEvent::Failed(reason.clone()));
                        Some(LinkEvent::Failed { reason })
                    }
                }
            }
            LinkAction::Close => {
                if let Err(e) = self
                    .transport
                    .close(NORMAL_CLOSURE, "client disconnect")
                    .await
                {
                    debug!(error = %e, "Error while closing stream");
                }
                info!("Stream disconnected");
                None
            }
            LinkAction::ScheduleRetry => {
                self.retry_at = Some(Instant::now() + self.reconnect_interval);
                info!(
                    delay_ms = self.reconnect_interval.as_millis() as u64,
                    "Reconnect scheduled"
                );
                self.pending.push_back(SupervisorEvent::RetryScheduled {
                    delay: self.reconnect_interval,
                });
                None
            }
            LinkAction::CancelRetry => {
                if self.retry_at.take().is_some() {
                    debug!("Pending reconnect cancelled");
                }
                None
            }
        }
    }

    fn connect_url(&self) -> Url {
        let mut url = self.url.clone();
        if let Some(token) = &self.credential {
            url.query_pairs_mut().append_pair("token", token);
        }
        url
    }

    async fn replay_subscription(&mut self) {
        let Some(frame) = self.subscription.as_ref().map(Subscription::to_frame) else {
            return;
        };
        let result = match frame.to_json() {
            Ok(text) => self.transport.send(text).await,
            Err(e) => Err(e.into()),
        };
        match result {
            Ok(()) => debug!("Subscription replayed"),
            Err(e) => warn!(error = %e, "Failed to replay subscription"),
        }
    }

    async fn send_control(&mut self, frame: &ControlFrame) -> Result<()> {
        if !self.link.status().is_open() {
            return Err(Error::Connection("stream is not connected".into()));
        }
        let text = frame.to_json()?;
        self.transport.send(text).await
    }

    /// Borrow the transport, e.g. to inspect a test double.
    pub fn transport(&self) -> &T {
        &self.transport
    }
}
