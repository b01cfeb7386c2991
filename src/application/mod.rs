//! Application services (use cases).
//!
//! These services orchestrate domain logic and coordinate adapters
//! to implement the application's use cases.

pub mod execution;
pub mod registry;
pub mod stream;
pub mod trade;
