//! Infrastructure configuration modules.

pub mod execution;
pub mod ledger;
pub mod logging;
pub mod registry;
pub mod settings;
pub mod stream;
