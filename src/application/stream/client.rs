//! Streaming client: supervisor, dispatcher, registry and notifiers in one
//! event loop.

use std::future::Future;

use tracing::{debug, info};

use super::dispatcher::{Dispatcher, Routed};
use super::supervisor::{StreamSupervisor, SupervisorEvent};
use crate::application::registry::OpportunityRegistry;
use crate::domain::connection::ConnectionStatus;
use crate::domain::id::{MarketId, OpportunityId};
use crate::error::Result;
use crate::port::{Alert, Event, NotifierRegistry, StreamTransport, Subscription};

/// One processed step of the event loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamUpdate {
    /// Connection status changed.
    Connection(ConnectionStatus),
    /// An opportunity was stored.
    Opportunity {
        opportunity_id: OpportunityId,
        inserted: bool,
        alert: Option<Alert>,
    },
    /// A heartbeat arrived.
    Heartbeat { tier: Option<String> },
    /// The server reported an error.
    ServerError(String),
    /// A payload was handed to the notifiers.
    Forwarded,
    /// A frame was dropped, or a lifecycle event changed nothing visible.
    Idle,
}

pub struct StreamClient<T: StreamTransport> {
    supervisor: StreamSupervisor<T>,
    dispatcher: Dispatcher,
    registry: OpportunityRegistry,
    notifiers: NotifierRegistry,
    reported: (ConnectionStatus, Option<String>),
    tier: Option<String>,
}

impl<T: StreamTransport> StreamClient<T> {
    pub fn new(
        supervisor: StreamSupervisor<T>,
        registry: OpportunityRegistry,
        notifiers: NotifierRegistry,
    ) -> Self {
        let reported = (supervisor.status(), supervisor.error().map(str::to_owned));
        Self {
            supervisor,
            dispatcher: Dispatcher::new(),
            registry,
            notifiers,
            reported,
            tier: None,
        }
    }

    #[must_use]
    pub const fn status(&self) -> ConnectionStatus {
        self.supervisor.status()
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.supervisor.error()
    }

    #[must_use]
    pub const fn registry(&self) -> &OpportunityRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut OpportunityRegistry {
        &mut self.registry
    }

    #[must_use]
    pub const fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    #[must_use]
    pub const fn supervisor(&self) -> &StreamSupervisor<T> {
        &self.supervisor
    }

    /// Entitlement tier reported by the last heartbeat.
    #[must_use]
    pub fn tier(&self) -> Option<&str> {
        self.tier.as_deref()
    }

    pub async fn connect(&mut self, credential: Option<String>) {
        self.supervisor.connect(credential).await;
        self.report_connection();
    }

    pub async fn disconnect(&mut self) {
        self.supervisor.disconnect().await;
        self.report_connection();
    }

    /// # Errors
    ///
    /// Returns an error if the stream is not connected or the send fails.
    pub async fn authenticate(&mut self, token: String) -> Result<()> {
        self.supervisor.authenticate(token).await
    }

    /// # Errors
    ///
    /// Returns an error if the stream is connected and the send fails.
    pub async fn subscribe(&mut self, subscription: Subscription) -> Result<()> {
        self.supervisor.subscribe(subscription).await
    }

    /// # Errors
    ///
    /// Returns an error if the stream is connected and the send fails.
    pub async fn unsubscribe(&mut self, markets: Vec<MarketId>) -> Result<()> {
        self.supervisor.unsubscribe(markets).await
    }

    /// Process the next event. Returns `None` when the stream is down for
    /// good: disconnected with no retry pending.
    pub async fn step(&mut self) -> Option<StreamUpdate> {
        let event = self.supervisor.next().await?;
        let update = match event {
            SupervisorEvent::Opened => {
                self.dispatcher.reset();
                StreamUpdate::Idle
            }
            SupervisorEvent::Frame(text) => self.route(&text),
            SupervisorEvent::Closed { .. }
            | SupervisorEvent::Failed(_)
            | SupervisorEvent::RetryScheduled { .. } => StreamUpdate::Idle,
        };
        Some(self.report_connection().map_or(update, StreamUpdate::Connection))
    }

    /// Run until the stream is down for good or `shutdown` resolves, then
    /// disconnect.
    pub async fn run_until<F>(&mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                () = &mut shutdown => {
                    info!("Shutdown requested");
                    break;
                }
                update = self.step() => {
                    if update.is_none() {
                        break;
                    }
                }
            }
        }
        self.disconnect().await;
    }

    fn route(&mut self, text: &str) -> StreamUpdate {
        let Some(routed) = self.dispatcher.dispatch(text) else {
            return StreamUpdate::Idle;
        };
        match routed {
            Routed::Opportunity(opportunity) => {
                let opportunity_id = opportunity.opportunity_id.clone();
                let upserted = self.registry.upsert(*opportunity);
                debug!(
                    opportunity_id = %opportunity_id,
                    inserted = upserted.inserted,
                    total = self.registry.len(),
                    "Opportunity stored"
                );
                if let Some(alert) = &upserted.alert {
                    info!(
                        opportunity_id = %alert.opportunity_id,
                        profit_pct = %alert.profit_pct,
                        "High-profit opportunity"
                    );
                    self.notifiers.notify_all(Event::Alert(alert.clone()));
                }
                StreamUpdate::Opportunity {
                    opportunity_id,
                    inserted: upserted.inserted,
                    alert: upserted.alert,
                }
            }
            Routed::Heartbeat(heartbeat) => {
                if heartbeat.authenticated == Some(true) {
                    self.supervisor.confirm_authenticated();
                }
                if heartbeat.tier.is_some() {
                    self.tier.clone_from(&heartbeat.tier);
                }
                StreamUpdate::Heartbeat {
                    tier: heartbeat.tier,
                }
            }
            Routed::ServerError(message) => {
                info!(error = %message, "Server reported an error");
                self.supervisor.record_server_error(message.clone());
                self.notifiers.notify_all(Event::ServerError(message.clone()));
                StreamUpdate::ServerError(message)
            }
            Routed::Notify(event) => {
                self.notifiers.notify_all(event);
                StreamUpdate::Forwarded
            }
        }
    }

    /// Notify when status or error changed since the last report.
    fn report_connection(&mut self) -> Option<ConnectionStatus> {
        let current = (
            self.supervisor.status(),
            self.supervisor.error().map(str::to_owned),
        );
        if current == self.reported {
            return None;
        }
        let status_changed = current.0 != self.reported.0;
        self.reported = current.clone();
        self.notifiers.notify_all(Event::ConnectionChanged {
            status: current.0,
            error: current.1,
        });
        status_changed.then_some(self.reported.0)
    }
}
