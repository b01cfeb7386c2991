//! Opportunity stream: reconnection supervisor, frame dispatcher and the
//! client that ties them to the registry.

pub mod client;
pub mod dispatcher;
pub mod supervisor;

pub use client::{StreamClient, StreamUpdate};
pub use dispatcher::{Dispatcher, Heartbeat, Routed};
pub use supervisor::{StreamSupervisor, SupervisorEvent};
