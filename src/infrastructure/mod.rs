//! Infrastructure layer.
//!
//! Configuration loading and the wiring of adapters into services. No
//! business logic lives here.

pub mod bootstrap;
pub mod config;
