//! Execution port: hand a vetted opportunity to the remote engine.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::id::OpportunityId;
use crate::error::Result;

/// Body of `POST /arbitrage/execute`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionRequest {
    pub opportunity_id: OpportunityId,
    #[serde(with = "rust_decimal::serde::float")]
    pub trade_size_usd: Decimal,
    /// Fraction in `[0, 1]`.
    #[serde(with = "rust_decimal::serde::float")]
    pub max_slippage: Decimal,
    pub dry_run: bool,
}

/// Successful response body. Fields beyond the known ones are kept verbatim.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExecutionReport {
    #[serde(default)]
    pub opportunity_id: Option<OpportunityId>,
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub dry_run: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Remote execution endpoint.
#[async_trait]
pub trait ExecutionApi: Send + Sync {
    /// Submit one execution request.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionError::Rejected`](crate::error::ExecutionError::Rejected)
    /// for non-2xx responses, carrying the server's `detail`, and transport
    /// errors otherwise.
    async fn execute(&self, request: &ExecutionRequest) -> Result<ExecutionReport>;
}
