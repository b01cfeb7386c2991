//! Notifier that keeps every event for later assertions.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::domain::connection::ConnectionStatus;
use crate::port::{Alert, Event, Notifier};

#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    events: Arc<Mutex<Vec<Event>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    pub fn alerts(&self) -> Vec<Alert> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                Event::Alert(alert) => Some(alert.clone()),
                _ => None,
            })
            .collect()
    }

    /// Connection statuses in the order they were reported.
    pub fn statuses(&self) -> Vec<ConnectionStatus> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                Event::ConnectionChanged { status, .. } => Some(*status),
                _ => None,
            })
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, event: Event) {
        self.events.lock().push(event);
    }
}
