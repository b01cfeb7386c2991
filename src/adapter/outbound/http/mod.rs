//! HTTP adapters.

pub mod execution;

pub use execution::HttpExecutionApi;
