//! Execution of a human-authorized opportunity through the remote engine.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::info;

use crate::domain::opportunity::Opportunity;
use crate::error::{ExecutionError, Result};
use crate::infrastructure::config::execution::ExecutionConfig;
use crate::port::{ExecutionApi, ExecutionReport, ExecutionRequest};

/// Defaults applied to every request built by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionOptions {
    pub max_slippage: Decimal,
    pub dry_run: bool,
}

impl From<&ExecutionConfig> for ExecutionOptions {
    fn from(config: &ExecutionConfig) -> Self {
        Self {
            max_slippage: config.max_slippage,
            dry_run: config.dry_run,
        }
    }
}

pub struct ExecutionService<A: ExecutionApi> {
    api: A,
    options: ExecutionOptions,
}

impl<A: ExecutionApi> ExecutionService<A> {
    pub fn new(api: A, options: ExecutionOptions) -> Self {
        Self { api, options }
    }

    #[must_use]
    pub const fn options(&self) -> ExecutionOptions {
        self.options
    }

    #[must_use]
    pub const fn api(&self) -> &A {
        &self.api
    }

    /// Execute a stored opportunity with the service defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionError::Unavailable`] for redacted or expired
    /// opportunities and [`ExecutionError::InvalidRequest`] for a bad size;
    /// neither reaches the network.
    pub async fn execute_opportunity(
        &self,
        opportunity: &Opportunity,
        trade_size_usd: Decimal,
        now: DateTime<Utc>,
    ) -> Result<ExecutionReport> {
        let unavailable = |reason: &str| ExecutionError::Unavailable {
            opportunity_id: opportunity.opportunity_id.to_string(),
            reason: reason.to_string(),
        };
        if opportunity.redacted {
            return Err(unavailable("details are redacted for this account").into());
        }
        if opportunity.is_expired(now) {
            return Err(unavailable("opportunity has expired").into());
        }

        self.execute(ExecutionRequest {
            opportunity_id: opportunity.opportunity_id.clone(),
            trade_size_usd,
            max_slippage: self.options.max_slippage,
            dry_run: self.options.dry_run,
        })
        .await
    }

    /// Validate and submit a request.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionError::InvalidRequest`] when the size is not
    /// positive or slippage is outside `[0, 1]`, otherwise whatever the
    /// endpoint reports.
    pub async fn execute(&self, request: ExecutionRequest) -> Result<ExecutionReport> {
        validate(&request)?;
        info!(
            opportunity_id = %request.opportunity_id,
            size = %request.trade_size_usd,
            max_slippage = %request.max_slippage,
            dry_run = request.dry_run,
            "Submitting execution"
        );
        let report = self.api.execute(&request).await?;
        info!(
            opportunity_id = %request.opportunity_id,
            success = report.success,
            "Execution finished"
        );
        Ok(report)
    }
}

fn validate(request: &ExecutionRequest) -> std::result::Result<(), ExecutionError> {
    if request.trade_size_usd <= Decimal::ZERO {
        return Err(ExecutionError::InvalidRequest(
            "trade size must be greater than 0".into(),
        ));
    }
    if request.max_slippage < Decimal::ZERO || request.max_slippage > Decimal::ONE {
        return Err(ExecutionError::InvalidRequest(
            "max slippage must be between 0 and 1".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::id::OpportunityId;
    use crate::error::Error;
    use crate::testkit::domain::opportunity;
    use crate::testkit::execution::RecordingExecutionApi;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    fn service(api: RecordingExecutionApi) -> ExecutionService<RecordingExecutionApi> {
        ExecutionService::new(
            api,
            ExecutionOptions {
                max_slippage: dec!(0.02),
                dry_run: true,
            },
        )
    }

    #[tokio::test]
    async fn builds_request_from_defaults() {
        let api = RecordingExecutionApi::succeeding();
        let service = service(api.clone());
        let report = service
            .execute_opportunity(&opportunity("opp-1"), dec!(100), Utc::now())
            .await
            .unwrap();

        assert!(report.success);
        let sent = api.requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].opportunity_id, OpportunityId::from("opp-1"));
        assert_eq!(sent[0].trade_size_usd, dec!(100));
        assert_eq!(sent[0].max_slippage, dec!(0.02));
        assert!(sent[0].dry_run);
    }

    #[tokio::test]
    async fn redacted_opportunity_never_reaches_the_network() {
        let api = RecordingExecutionApi::succeeding();
        let service = service(api.clone());
        let mut opp = opportunity("hidden");
        opp.redacted = true;

        let err = service
            .execute_opportunity(&opp, dec!(100), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Execution(ExecutionError::Unavailable { .. })
        ));
        assert!(api.requests().is_empty());
    }

    #[tokio::test]
    async fn expired_opportunity_is_refused() {
        let api = RecordingExecutionApi::succeeding();
        let service = service(api.clone());
        let now = Utc::now();
        let mut opp = opportunity("old");
        opp.expires_at = Some(now - Duration::seconds(5));

        assert!(service.execute_opportunity(&opp, dec!(100), now).await.is_err());
        assert!(api.requests().is_empty());
    }

    #[tokio::test]
    async fn invalid_size_and_slippage_are_refused() {
        let api = RecordingExecutionApi::succeeding();
        let service = service(api.clone());

        let cases = [
            (dec!(0), dec!(0.01)),
            (dec!(10), dec!(1.5)),
            (dec!(10), dec!(-0.1)),
        ];
        for (size, slippage) in cases {
            let err = service
                .execute(ExecutionRequest {
                    opportunity_id: "x".into(),
                    trade_size_usd: size,
                    max_slippage: slippage,
                    dry_run: true,
                })
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                Error::Execution(ExecutionError::InvalidRequest(_))
            ));
        }
        assert!(api.requests().is_empty());
    }

    #[tokio::test]
    async fn rejection_detail_is_surfaced() {
        let api = RecordingExecutionApi::rejecting(403, "Pro tier required");
        let service = service(api);
        let err = service
            .execute_opportunity(&opportunity("opp-1"), dec!(100), Utc::now())
            .await
            .unwrap_err();
        match err {
            Error::Execution(ExecutionError::Rejected { status, detail }) => {
                assert_eq!(status, 403);
                assert_eq!(detail, "Pro tier required");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
