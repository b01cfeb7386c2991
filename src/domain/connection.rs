//! Stream connection state machine.
//!
//! [`Link`] is a pure value: [`Link::apply`] takes an event and returns the
//! next link together with the side effects the supervisor must perform. No
//! I/O or timers live here, which keeps every transition unit-testable.

use std::fmt;

/// WebSocket close code for a normal, intentional closure.
pub const NORMAL_CLOSURE: u16 = 1000;

/// Externally visible connection status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ConnectionStatus {
    Connecting,
    Connected,
    Authenticated,
    #[default]
    Disconnected,
    Error,
}

impl ConnectionStatus {
    /// True while a transport is open or being opened.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Connecting | Self::Connected | Self::Authenticated)
    }

    /// True when frames can flow.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(self, Self::Connected | Self::Authenticated)
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Authenticated => "authenticated",
            Self::Disconnected => "disconnected",
            Self::Error => "error",
        };
        f.write_str(s)
    }
}

/// Whether a reconnection attempt is waiting on the retry timer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Retry {
    #[default]
    Idle,
    Pending,
}

/// Inputs to the connection state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    /// Caller asked to connect, with or without a credential.
    ConnectRequested { credentialed: bool },
    /// The retry timer fired.
    RetryElapsed,
    /// An open was abandoned before the handshake resolved.
    OpenInterrupted,
    /// Transport handshake completed.
    Opened,
    /// Transport closed with the given close code.
    Closed { code: u16, reason: String },
    /// Transport failed (including a failed open).
    Failed { reason: String },
    /// A credential was supplied on the open connection; later opens carry it.
    CredentialSet,
    /// Server heartbeat confirmed authentication.
    AuthConfirmed,
    /// Server reported an error frame; the connection stays up.
    ServerError { message: String },
    /// Caller asked to disconnect.
    DisconnectRequested,
}

/// Side effects requested by a transition, executed in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkAction {
    Open,
    Close,
    ScheduleRetry,
    CancelRetry,
}

/// Connection state: status plus the data that drives transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    status: ConnectionStatus,
    retry: Retry,
    credentialed: bool,
    auto_reconnect: bool,
    error: Option<String>,
}

impl Link {
    #[must_use]
    pub fn new(auto_reconnect: bool) -> Self {
        Self {
            status: ConnectionStatus::Disconnected,
            retry: Retry::Idle,
            credentialed: false,
            auto_reconnect,
            error: None,
        }
    }

    #[must_use]
    pub const fn status(&self) -> ConnectionStatus {
        self.status
    }

    #[must_use]
    pub const fn retry(&self) -> Retry {
        self.retry
    }

    /// Most recent failure reason, cleared by the next successful open.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether the next open will carry a credential.
    #[must_use]
    pub const fn credentialed(&self) -> bool {
        self.credentialed
    }

    /// Compute the next link and the actions to perform.
    #[must_use]
    pub fn apply(&self, event: LinkEvent) -> (Self, Vec<LinkAction>) {
        let mut next = self.clone();
        let mut actions = Vec::new();

        match event {
            LinkEvent::ConnectRequested { credentialed } => {
                if self.status.is_active() {
                    return (next, actions);
                }
                if self.retry == Retry::Pending {
                    actions.push(LinkAction::CancelRetry);
                }
                next.credentialed = credentialed;
                next.begin_connect(&mut actions);
            }
            LinkEvent::RetryElapsed => {
                if self.retry != Retry::Pending || self.status.is_active() {
                    return (next, actions);
                }
                next.begin_connect(&mut actions);
            }
            LinkEvent::OpenInterrupted => {
                if self.status == ConnectionStatus::Connecting {
                    actions.push(LinkAction::Open);
                }
            }
            LinkEvent::Opened => {
                if self.status != ConnectionStatus::Connecting {
                    return (next, actions);
                }
                next.status = if self.credentialed {
                    ConnectionStatus::Authenticated
                } else {
                    ConnectionStatus::Connected
                };
                next.error = None;
            }
            LinkEvent::Closed { code, reason } => {
                if !self.status.is_active() {
                    // Already torn down, e.g. by an explicit disconnect.
                    return (next, actions);
                }
                next.status = ConnectionStatus::Disconnected;
                if code != NORMAL_CLOSURE {
                    next.error = Some(if reason.is_empty() {
                        format!("connection closed unexpectedly (code {code})")
                    } else {
                        format!("connection closed unexpectedly (code {code}): {reason}")
                    });
                    next.schedule_retry(&mut actions);
                }
            }
            LinkEvent::Failed { reason } => {
                if !self.status.is_active() && self.status != ConnectionStatus::Error {
                    return (next, actions);
                }
                next.status = ConnectionStatus::Error;
                next.error = Some(reason);
                next.schedule_retry(&mut actions);
            }
            LinkEvent::CredentialSet => {
                next.credentialed = true;
            }
            LinkEvent::AuthConfirmed => {
                if self.status == ConnectionStatus::Connected {
                    next.status = ConnectionStatus::Authenticated;
                }
            }
            LinkEvent::ServerError { message } => {
                next.error = Some(message);
            }
            LinkEvent::DisconnectRequested => {
                if self.retry == Retry::Pending {
                    actions.push(LinkAction::CancelRetry);
                }
                if self.status.is_active() {
                    actions.push(LinkAction::Close);
                }
                next.retry = Retry::Idle;
                next.status = ConnectionStatus::Disconnected;
            }
        }

        (next, actions)
    }

    fn begin_connect(&mut self, actions: &mut Vec<LinkAction>) {
        self.retry = Retry::Idle;
        self.status = ConnectionStatus::Connecting;
        actions.push(LinkAction::Open);
    }

    fn schedule_retry(&mut self, actions: &mut Vec<LinkAction>) {
        if self.auto_reconnect && self.retry == Retry::Idle {
            self.retry = Retry::Pending;
            actions.push(LinkAction::ScheduleRetry);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_link(credentialed: bool) -> Link {
        let (link, _) = Link::new(true).apply(LinkEvent::ConnectRequested { credentialed });
        let (link, _) = link.apply(LinkEvent::Opened);
        link
    }

    fn closed(code: u16) -> LinkEvent {
        LinkEvent::Closed {
            code,
            reason: String::new(),
        }
    }

    #[test]
    fn starts_disconnected() {
        let link = Link::new(true);
        assert_eq!(link.status(), ConnectionStatus::Disconnected);
        assert_eq!(link.retry(), Retry::Idle);
        assert!(link.error().is_none());
    }

    #[test]
    fn connect_opens_transport() {
        let (link, actions) = Link::new(true).apply(LinkEvent::ConnectRequested {
            credentialed: false,
        });
        assert_eq!(link.status(), ConnectionStatus::Connecting);
        assert_eq!(actions, vec![LinkAction::Open]);
    }

    #[test]
    fn connect_while_active_is_noop() {
        let link = open_link(false);
        let (next, actions) = link.apply(LinkEvent::ConnectRequested { credentialed: true });
        assert_eq!(next, link);
        assert!(actions.is_empty());
    }

    #[test]
    fn open_without_credential_is_connected() {
        assert_eq!(open_link(false).status(), ConnectionStatus::Connected);
    }

    #[test]
    fn open_with_credential_is_authenticated() {
        assert_eq!(open_link(true).status(), ConnectionStatus::Authenticated);
    }

    #[test]
    fn heartbeat_confirmation_promotes_connected() {
        let (link, _) = open_link(false).apply(LinkEvent::AuthConfirmed);
        assert_eq!(link.status(), ConnectionStatus::Authenticated);
    }

    #[test]
    fn abnormal_close_schedules_retry() {
        let (link, actions) = open_link(false).apply(closed(1006));
        assert_eq!(link.status(), ConnectionStatus::Disconnected);
        assert_eq!(link.retry(), Retry::Pending);
        assert_eq!(actions, vec![LinkAction::ScheduleRetry]);
        assert!(link.error().unwrap().contains("1006"));
    }

    #[test]
    fn normal_close_does_not_schedule_retry() {
        let (link, actions) = open_link(false).apply(closed(NORMAL_CLOSURE));
        assert_eq!(link.status(), ConnectionStatus::Disconnected);
        assert_eq!(link.retry(), Retry::Idle);
        assert!(actions.is_empty());
    }

    #[test]
    fn abnormal_close_without_auto_reconnect_stays_down() {
        let (link, _) = Link::new(false).apply(LinkEvent::ConnectRequested {
            credentialed: false,
        });
        let (link, _) = link.apply(LinkEvent::Opened);
        let (link, actions) = link.apply(closed(1006));
        assert_eq!(link.retry(), Retry::Idle);
        assert!(actions.is_empty());
    }

    #[test]
    fn failed_open_records_error_and_retries_once() {
        let (link, _) = Link::new(true).apply(LinkEvent::ConnectRequested {
            credentialed: false,
        });
        let (link, actions) = link.apply(LinkEvent::Failed {
            reason: "dns failure".into(),
        });
        assert_eq!(link.status(), ConnectionStatus::Error);
        assert_eq!(link.error(), Some("dns failure"));
        assert_eq!(actions, vec![LinkAction::ScheduleRetry]);

        // A second failure report must not schedule another retry.
        let (link, actions) = link.apply(LinkEvent::Failed {
            reason: "again".into(),
        });
        assert_eq!(link.retry(), Retry::Pending);
        assert!(actions.is_empty());
    }

    #[test]
    fn retry_reconnects_with_same_credential_and_clears_error_on_open() {
        let (link, _) = open_link(true).apply(closed(1006));
        let (link, actions) = link.apply(LinkEvent::RetryElapsed);
        assert_eq!(actions, vec![LinkAction::Open]);
        assert_eq!(link.retry(), Retry::Idle);
        let (link, _) = link.apply(LinkEvent::Opened);
        assert_eq!(link.status(), ConnectionStatus::Authenticated);
        assert!(link.error().is_none());
    }

    #[test]
    fn disconnect_cancels_retry_and_is_idempotent() {
        let (link, _) = open_link(false).apply(closed(1006));
        let (link, actions) = link.apply(LinkEvent::DisconnectRequested);
        assert_eq!(actions, vec![LinkAction::CancelRetry]);
        assert_eq!(link.retry(), Retry::Idle);

        let (again, actions) = link.apply(LinkEvent::DisconnectRequested);
        assert!(actions.is_empty());
        assert_eq!(again, link);

        // A stale timer firing after disconnect does nothing.
        let (after, actions) = link.apply(LinkEvent::RetryElapsed);
        assert!(actions.is_empty());
        assert_eq!(after.status(), ConnectionStatus::Disconnected);
    }

    #[test]
    fn disconnect_closes_open_transport() {
        let (link, actions) = open_link(true).apply(LinkEvent::DisconnectRequested);
        assert_eq!(actions, vec![LinkAction::Close]);
        assert_eq!(link.status(), ConnectionStatus::Disconnected);

        // The close echo from the transport is ignored.
        let (link, actions) = link.apply(closed(NORMAL_CLOSURE));
        assert!(actions.is_empty());
        assert_eq!(link.retry(), Retry::Idle);
    }

    #[test]
    fn credential_set_later_authenticates_the_reconnect() {
        let (link, actions) = open_link(false).apply(LinkEvent::CredentialSet);
        assert!(actions.is_empty());
        assert!(link.credentialed());
        assert_eq!(link.status(), ConnectionStatus::Connected);

        let (link, _) = link.apply(closed(1006));
        let (link, _) = link.apply(LinkEvent::RetryElapsed);
        let (link, _) = link.apply(LinkEvent::Opened);
        assert_eq!(link.status(), ConnectionStatus::Authenticated);
    }

    #[test]
    fn interrupted_open_is_reissued() {
        let (link, _) = Link::new(true).apply(LinkEvent::ConnectRequested {
            credentialed: false,
        });
        let (next, actions) = link.apply(LinkEvent::OpenInterrupted);
        assert_eq!(actions, vec![LinkAction::Open]);
        assert_eq!(next, link);

        // Nothing to resume once the handshake has resolved.
        let (_, actions) = open_link(false).apply(LinkEvent::OpenInterrupted);
        assert!(actions.is_empty());
    }

    #[test]
    fn server_error_keeps_connection() {
        let (link, actions) = open_link(false).apply(LinkEvent::ServerError {
            message: "rate limited".into(),
        });
        assert_eq!(link.status(), ConnectionStatus::Connected);
        assert_eq!(link.error(), Some("rate limited"));
        assert!(actions.is_empty());
    }
}
