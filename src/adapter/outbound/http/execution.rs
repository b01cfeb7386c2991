//! REST client for the engine's execution endpoint.
//!
//! Requests are never retried: a timed-out POST may still have executed.

use async_trait::async_trait;
use reqwest::{Client as HttpClient, StatusCode};
use tracing::{debug, warn};

use crate::error::{ExecutionError, Result};
use crate::infrastructure::config::execution::ExecutionConfig;
use crate::port::{ExecutionApi, ExecutionReport, ExecutionRequest};

const EXECUTE_PATH: &str = "/arbitrage/execute";

pub struct HttpExecutionApi {
    http: HttpClient,
    endpoint: String,
    token: Option<String>,
}

impl HttpExecutionApi {
    /// Client for `{base_url}/arbitrage/execute` with default HTTP settings.
    #[must_use]
    pub fn new(base_url: &str, token: Option<String>) -> Self {
        Self {
            http: HttpClient::new(),
            endpoint: endpoint(base_url),
            token,
        }
    }

    #[must_use]
    pub fn from_config(config: &ExecutionConfig) -> Self {
        let http = HttpClient::builder()
            .timeout(config.timeout())
            .build()
            .unwrap_or_else(|err| {
                warn!(error = %err, "Failed to build HTTP client, using defaults");
                HttpClient::new()
            });

        Self {
            http,
            endpoint: endpoint(&config.api_url),
            token: config.api_token.clone(),
        }
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn endpoint(base_url: &str) -> String {
    format!("{}{EXECUTE_PATH}", base_url.trim_end_matches('/'))
}

/// Pull a readable message out of an error body.
///
/// Error bodies carry `detail`, either a string or a structured list of
/// validation errors. Anything else falls back to the raw body or the status
/// reason.
fn error_detail(status: StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        match value.get("detail") {
            Some(serde_json::Value::String(detail)) => return detail.clone(),
            Some(detail) => return detail.to_string(),
            None => {}
        }
    }
    let body = body.trim();
    if body.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    } else {
        body.to_string()
    }
}

#[async_trait]
impl ExecutionApi for HttpExecutionApi {
    async fn execute(&self, request: &ExecutionRequest) -> Result<ExecutionReport> {
        debug!(endpoint = %self.endpoint, "POST execution request");
        let mut builder = self.http.post(&self.endpoint).json(request);
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        let response = builder.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = error_detail(status, &body);
            warn!(status = status.as_u16(), detail = %detail, "Execution rejected");
            return Err(ExecutionError::Rejected {
                status: status.as_u16(),
                detail,
            }
            .into());
        }

        Ok(response.json::<ExecutionReport>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_without_double_slash() {
        assert_eq!(
            endpoint("https://engine.test/api/"),
            "https://engine.test/api/arbitrage/execute"
        );
        assert_eq!(
            HttpExecutionApi::new("https://engine.test", None).endpoint(),
            "https://engine.test/arbitrage/execute"
        );
    }

    #[test]
    fn detail_string_is_extracted() {
        let detail = error_detail(StatusCode::FORBIDDEN, r#"{"detail":"Pro tier required"}"#);
        assert_eq!(detail, "Pro tier required");
    }

    #[test]
    fn structured_detail_is_stringified() {
        let detail = error_detail(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"detail":[{"loc":["body","trade_size_usd"],"msg":"field required"}]}"#,
        );
        assert!(detail.contains("field required"));
    }

    #[test]
    fn empty_body_falls_back_to_reason() {
        assert_eq!(error_detail(StatusCode::BAD_GATEWAY, ""), "Bad Gateway");
        assert_eq!(error_detail(StatusCode::BAD_GATEWAY, "upstream down"), "upstream down");
    }
}
