//! Recording [`ExecutionApi`] double.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::{ExecutionError, Result};
use crate::port::{ExecutionApi, ExecutionReport, ExecutionRequest};

#[derive(Debug, Clone)]
enum Reply {
    Success,
    Reject { status: u16, detail: String },
}

/// Records every request; clones share the record.
#[derive(Debug, Clone)]
pub struct RecordingExecutionApi {
    reply: Reply,
    requests: Arc<Mutex<Vec<ExecutionRequest>>>,
}

impl RecordingExecutionApi {
    pub fn succeeding() -> Self {
        Self {
            reply: Reply::Success,
            requests: Arc::default(),
        }
    }

    pub fn rejecting(status: u16, detail: &str) -> Self {
        Self {
            reply: Reply::Reject {
                status,
                detail: detail.to_string(),
            },
            requests: Arc::default(),
        }
    }

    pub fn requests(&self) -> Vec<ExecutionRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl ExecutionApi for RecordingExecutionApi {
    async fn execute(&self, request: &ExecutionRequest) -> Result<ExecutionReport> {
        self.requests.lock().push(request.clone());
        match &self.reply {
            Reply::Success => Ok(ExecutionReport {
                opportunity_id: Some(request.opportunity_id.clone()),
                success: true,
                dry_run: request.dry_run,
                message: Some("accepted".into()),
                extra: serde_json::Map::new(),
            }),
            Reply::Reject { status, detail } => Err(ExecutionError::Rejected {
                status: *status,
                detail: detail.clone(),
            }
            .into()),
        }
    }
}
