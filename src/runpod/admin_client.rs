use serde::Serialize;
use serde_json::Value;

use crate::{
    error::{ArtError, Result},
    runpod::{
        dispatch::{Dispatcher, JobState},
        payload,
    },
};

/// Outcome of a wake request: the job the endpoint accepted, and whether it
/// is sitting in the queue waiting for workers to start.
#[derive(Debug, Clone, Serialize)]
pub struct WakeReport {
    pub job_id: Option<String>,
    pub queued: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkerLimits {
    pub min: u32,
    pub max: u32,
}

/// Endpoint operations that are not generation: waking cold workers and
/// adjusting worker limits through the management API.
#[derive(Clone)]
pub struct AdminClient {
    dispatcher: Dispatcher,
    endpoint_id: String,
}

impl AdminClient {
    pub(crate) fn new(dispatcher: Dispatcher, endpoint_id: String) -> Self {
        Self {
            dispatcher,
            endpoint_id,
        }
    }

    /// Submit a minimal job so a scaled-to-zero endpoint starts its workers.
    /// Cold workers take 30-60 seconds to come up.
    pub async fn wake(&self) -> Result<WakeReport> {
        let body = self
            .dispatcher
            .submit(&self.endpoint_id, &payload::wake_payload())
            .await?;

        let job_id = body
            .get("id")
            .and_then(Value::as_str)
            .map(String::from);
        let queued = JobState::from_body(&body) == JobState::Queued;

        if let Some(id) = &job_id {
            log::info!("wake job {} accepted, workers are starting", id);
        } else if queued {
            log::info!("wake job is in queue, workers are starting");
        }

        Ok(WakeReport { job_id, queued })
    }

    /// Raise or lower the endpoint's worker limits via the GraphQL
    /// management API. Some accounts disallow this; the GraphQL error then
    /// comes back as an upstream error.
    pub async fn set_worker_limits(&self, min: u32, max: u32) -> Result<WorkerLimits> {
        let mutation = format!(
            r#"
mutation {{
  updateEndpoint(input: {{
    endpointId: "{}"
    workersMin: {}
    workersMax: {}
  }}) {{
    id
    workersMin
    workersMax
  }}
}}
"#,
            self.endpoint_id, min, max
        );

        let body = self.dispatcher.graphql(&mutation).await?;

        let endpoint = body
            .get("data")
            .and_then(|data| data.get("updateEndpoint"))
            .ok_or_else(|| {
                ArtError::MalformedResponse(format!("unexpected GraphQL response: {}", body))
            })?;

        Ok(WorkerLimits {
            min: endpoint
                .get("workersMin")
                .and_then(Value::as_u64)
                .unwrap_or(min as u64) as u32,
            max: endpoint
                .get("workersMax")
                .and_then(Value::as_u64)
                .unwrap_or(max as u64) as u32,
        })
    }
}
