//! Adapters: the CLI on the driving side, concrete port implementations on
//! the driven side.

pub mod inbound;
pub mod outbound;
