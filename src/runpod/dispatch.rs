use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use crate::error::{ArtError, Result};

/// Retry budget for one generation call. Exhausting it terminates with a
/// timeout error rather than waiting on the endpoint indefinitely.
pub const MAX_ATTEMPTS: u32 = 3;

/// Per-attempt wall clock for a synchronous run.
pub const SYNC_TIMEOUT: Duration = Duration::from_secs(300);

/// Backoff after a network-level timeout.
pub const TIMEOUT_BACKOFF: Duration = Duration::from_secs(5);

/// Backoff after a 200 response that reports the job as still queued.
pub const QUEUED_BACKOFF: Duration = Duration::from_secs(10);

const POLL_TIMEOUT: Duration = Duration::from_secs(30);

/// Where the upstream reports a job in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Completed,
    Queued,
    Failed,
    Unknown,
}

impl JobState {
    pub fn from_body(body: &Value) -> Self {
        match body.get("status").and_then(Value::as_str) {
            Some("COMPLETED") => JobState::Completed,
            Some("IN_QUEUE") | Some("IN_PROGRESS") => JobState::Queued,
            Some("FAILED") => JobState::Failed,
            _ => JobState::Unknown,
        }
    }
}

/// Outcome of a single dispatch attempt, before the retry policy is applied.
#[derive(Debug)]
enum AttemptOutcome {
    /// A parsed 200 body ready for normalization.
    Body(Value),
    /// 200, but the job has not completed yet.
    Queued,
    /// The request itself timed out on the wire.
    TimedOut(String),
    /// Anything that must not be retried.
    Terminal(ArtError),
}

#[derive(Debug)]
enum RetryDecision {
    Done(Value),
    RetryAfter(Duration),
    Fail(ArtError),
}

/// The bounded retry policy, kept pure so it is testable without a network:
/// timeouts and queued responses retry with their respective backoffs until
/// the attempt budget runs out; everything else is terminal.
fn apply_policy(outcome: AttemptOutcome, attempt: u32, max_attempts: u32) -> RetryDecision {
    match outcome {
        AttemptOutcome::Body(body) => RetryDecision::Done(body),
        AttemptOutcome::Queued if attempt < max_attempts => {
            RetryDecision::RetryAfter(QUEUED_BACKOFF)
        }
        AttemptOutcome::Queued => RetryDecision::Fail(ArtError::TimeoutError(format!(
            "job still queued after {} attempts; workers may be cold",
            max_attempts
        ))),
        AttemptOutcome::TimedOut(_) if attempt < max_attempts => {
            RetryDecision::RetryAfter(TIMEOUT_BACKOFF)
        }
        AttemptOutcome::TimedOut(msg) => RetryDecision::Fail(ArtError::TimeoutError(format!(
            "request timed out on all {} attempts: {}",
            max_attempts, msg
        ))),
        AttemptOutcome::Terminal(err) => RetryDecision::Fail(err),
    }
}

/// Error bodies are often JSON; pretty-print them when they are so the
/// surfaced message stays readable.
fn readable_error_body(text: String) -> String {
    match serde_json::from_str::<Value>(&text) {
        Ok(json) => serde_json::to_string_pretty(&json).unwrap_or(text),
        Err(_) => text,
    }
}

/// Shared transport for all sub-clients: one `reqwest::Client`, the bearer
/// credential, and the endpoint routes.
#[derive(Clone)]
pub struct Dispatcher {
    client: Client,
    api_key: String,
    api_base: String,
    graphql_url: String,
}

impl Dispatcher {
    pub fn new(client: Client, api_key: String, api_base: String, graphql_url: String) -> Self {
        Self {
            client,
            api_key,
            api_base,
            graphql_url,
        }
    }

    fn build_headers(&self) -> reqwest::header::HeaderMap {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::AUTHORIZATION,
            format!("Bearer {}", self.api_key).parse().unwrap(),
        );
        headers.insert(
            reqwest::header::CONTENT_TYPE,
            "application/json".parse().unwrap(),
        );
        headers
    }

    async fn attempt_sync(&self, url: &str, payload: &Value) -> AttemptOutcome {
        let sent = self
            .client
            .post(url)
            .headers(self.build_headers())
            .json(payload)
            .timeout(SYNC_TIMEOUT)
            .send()
            .await;

        let response = match sent {
            Ok(response) => response,
            Err(e) if e.is_timeout() => return AttemptOutcome::TimedOut(e.to_string()),
            Err(e) => {
                return AttemptOutcome::Terminal(ArtError::RequestError(format!(
                    "RunPod request failed: {}",
                    e
                )))
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = readable_error_body(response.text().await.unwrap_or_default());
            return AttemptOutcome::Terminal(ArtError::UpstreamError {
                status: status.as_u16(),
                body,
            });
        }

        match response.json::<Value>().await {
            Ok(body) => match JobState::from_body(&body) {
                JobState::Queued => AttemptOutcome::Queued,
                JobState::Failed => {
                    log::warn!("RunPod reported the job as FAILED: {}", body);
                    AttemptOutcome::Body(body)
                }
                _ => AttemptOutcome::Body(body),
            },
            Err(e) => AttemptOutcome::Terminal(ArtError::MalformedResponse(format!(
                "response body is not JSON: {}",
                e
            ))),
        }
    }

    /// Synchronous run: POST the job to `/runsync` and retry within the
    /// bounded policy until a body is available or the budget is spent.
    pub async fn run_sync(&self, endpoint_id: &str, payload: &Value) -> Result<Value> {
        let url = format!("{}/v2/{}/runsync", self.api_base, endpoint_id);

        for attempt in 1..=MAX_ATTEMPTS {
            log::debug!("runsync attempt {}/{} -> {}", attempt, MAX_ATTEMPTS, url);

            let outcome = self.attempt_sync(&url, payload).await;
            match apply_policy(outcome, attempt, MAX_ATTEMPTS) {
                RetryDecision::Done(body) => return Ok(body),
                RetryDecision::RetryAfter(delay) => {
                    log::warn!(
                        "attempt {}/{} did not complete, retrying in {}s",
                        attempt,
                        MAX_ATTEMPTS,
                        delay.as_secs()
                    );
                    tokio::time::sleep(delay).await;
                }
                RetryDecision::Fail(err) => return Err(err),
            }
        }

        // The policy fails on the last attempt, so this is not reached.
        Err(ArtError::TimeoutError(format!(
            "retry budget of {} attempts exhausted",
            MAX_ATTEMPTS
        )))
    }

    /// Asynchronous submit: POST the job to `/run` and return the raw body
    /// (carrying the job id) without waiting for completion.
    pub async fn submit(&self, endpoint_id: &str, payload: &Value) -> Result<Value> {
        let url = format!("{}/v2/{}/run", self.api_base, endpoint_id);

        let response = self
            .client
            .post(&url)
            .headers(self.build_headers())
            .json(payload)
            .timeout(POLL_TIMEOUT)
            .send()
            .await
            .map_err(|e| ArtError::RequestError(format!("RunPod submit failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = readable_error_body(response.text().await.unwrap_or_default());
            return Err(ArtError::UpstreamError {
                status: status.as_u16(),
                body,
            });
        }

        response.json::<Value>().await.map_err(|e| {
            ArtError::MalformedResponse(format!("submit response is not JSON: {}", e))
        })
    }

    /// Fetch the current status body for a previously submitted job.
    pub async fn status(&self, endpoint_id: &str, job_id: &str) -> Result<Value> {
        let url = format!("{}/v2/{}/status/{}", self.api_base, endpoint_id, job_id);

        let response = self
            .client
            .get(&url)
            .headers(self.build_headers())
            .timeout(POLL_TIMEOUT)
            .send()
            .await
            .map_err(|e| ArtError::RequestError(format!("RunPod status failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = readable_error_body(response.text().await.unwrap_or_default());
            return Err(ArtError::UpstreamError {
                status: status.as_u16(),
                body,
            });
        }

        response.json::<Value>().await.map_err(|e| {
            ArtError::MalformedResponse(format!("status response is not JSON: {}", e))
        })
    }

    /// Polling mode: submit to `/run`, then poll `/status/{id}` under the
    /// same attempt budget and queued backoff as the synchronous path.
    pub async fn run_polling(&self, endpoint_id: &str, payload: &Value) -> Result<Value> {
        let submitted = self.submit(endpoint_id, payload).await?;
        let job_id = submitted
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                ArtError::MalformedResponse(format!("submit response has no job id: {}", submitted))
            })?
            .to_string();

        log::info!("job {} submitted, polling for completion", job_id);

        for attempt in 1..=MAX_ATTEMPTS {
            let body = self.status(endpoint_id, &job_id).await?;
            match JobState::from_body(&body) {
                JobState::Queued if attempt < MAX_ATTEMPTS => {
                    log::debug!("job {} still queued ({}/{})", job_id, attempt, MAX_ATTEMPTS);
                    tokio::time::sleep(QUEUED_BACKOFF).await;
                }
                JobState::Queued => {
                    return Err(ArtError::TimeoutError(format!(
                        "job {} still queued after {} polls",
                        job_id, MAX_ATTEMPTS
                    )))
                }
                _ => return Ok(body),
            }
        }

        Err(ArtError::TimeoutError(format!(
            "retry budget of {} attempts exhausted",
            MAX_ATTEMPTS
        )))
    }

    /// RunPod's management API speaks GraphQL on a separate host.
    pub async fn graphql(&self, query: &str) -> Result<Value> {
        let response = self
            .client
            .post(&self.graphql_url)
            .headers(self.build_headers())
            .json(&serde_json::json!({ "query": query }))
            .timeout(POLL_TIMEOUT)
            .send()
            .await
            .map_err(|e| ArtError::RequestError(format!("GraphQL request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = readable_error_body(response.text().await.unwrap_or_default());
            return Err(ArtError::UpstreamError {
                status: status.as_u16(),
                body,
            });
        }

        let body: Value = response.json().await.map_err(|e| {
            ArtError::MalformedResponse(format!("GraphQL response is not JSON: {}", e))
        })?;

        if let Some(errors) = body.get("errors") {
            return Err(ArtError::UpstreamError {
                status: status.as_u16(),
                body: serde_json::to_string_pretty(errors).unwrap_or_else(|_| errors.to_string()),
            });
        }

        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_job_state_classification() {
        assert_eq!(
            JobState::from_body(&json!({"status": "IN_QUEUE"})),
            JobState::Queued
        );
        assert_eq!(
            JobState::from_body(&json!({"status": "IN_PROGRESS"})),
            JobState::Queued
        );
        assert_eq!(
            JobState::from_body(&json!({"status": "COMPLETED"})),
            JobState::Completed
        );
        assert_eq!(
            JobState::from_body(&json!({"status": "FAILED"})),
            JobState::Failed
        );
        assert_eq!(
            JobState::from_body(&json!({"output": "abc"})),
            JobState::Unknown
        );
    }

    #[test]
    fn test_queued_retries_with_queued_backoff() {
        for attempt in 1..MAX_ATTEMPTS {
            match apply_policy(AttemptOutcome::Queued, attempt, MAX_ATTEMPTS) {
                RetryDecision::RetryAfter(delay) => assert_eq!(delay, QUEUED_BACKOFF),
                other => panic!("expected retry, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_three_queued_responses_exhaust_the_budget() {
        match apply_policy(AttemptOutcome::Queued, MAX_ATTEMPTS, MAX_ATTEMPTS) {
            RetryDecision::Fail(ArtError::TimeoutError(_)) => {}
            other => panic!("expected timeout, got {:?}", other),
        }
    }

    #[test]
    fn test_timeout_retries_with_timeout_backoff() {
        match apply_policy(
            AttemptOutcome::TimedOut("deadline".into()),
            1,
            MAX_ATTEMPTS,
        ) {
            RetryDecision::RetryAfter(delay) => assert_eq!(delay, TIMEOUT_BACKOFF),
            other => panic!("expected retry, got {:?}", other),
        }
        match apply_policy(
            AttemptOutcome::TimedOut("deadline".into()),
            MAX_ATTEMPTS,
            MAX_ATTEMPTS,
        ) {
            RetryDecision::Fail(ArtError::TimeoutError(_)) => {}
            other => panic!("expected timeout, got {:?}", other),
        }
    }

    #[test]
    fn test_upstream_error_is_terminal_on_first_attempt() {
        let outcome = AttemptOutcome::Terminal(ArtError::UpstreamError {
            status: 500,
            body: "worker crashed".into(),
        });
        match apply_policy(outcome, 1, MAX_ATTEMPTS) {
            RetryDecision::Fail(ArtError::UpstreamError { status, .. }) => {
                assert_eq!(status, 500)
            }
            other => panic!("expected immediate failure, got {:?}", other),
        }
    }

    #[test]
    fn test_completed_body_passes_through() {
        let body = json!({"status": "COMPLETED", "output": "abc"});
        match apply_policy(AttemptOutcome::Body(body.clone()), 1, MAX_ATTEMPTS) {
            RetryDecision::Done(out) => assert_eq!(out, body),
            other => panic!("expected done, got {:?}", other),
        }
    }

    #[test]
    fn test_readable_error_body_pretty_prints_json() {
        let pretty = readable_error_body(r#"{"error":"no workers"}"#.to_string());
        assert!(pretty.contains("\"error\": \"no workers\""));
        assert_eq!(readable_error_body("plain text".into()), "plain text");
    }
}
