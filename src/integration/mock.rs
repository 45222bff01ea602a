use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use super::payload::{parse_job_value, parse_value, AnalysisPayload, JobStatus};
use super::Analyzer;
use crate::error::IntegrationError;

/// Scripted analyzer. Queued JSON bodies go through the real response parser.
#[derive(Debug, Default)]
pub struct MockAnalyzer {
    responses: Mutex<VecDeque<Result<Value, IntegrationError>>>,
    calls: Mutex<Vec<String>>,
}

impl MockAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_json(&self, body: Value) {
        self.responses.lock().unwrap().push_back(Ok(body));
    }

    pub fn push_error(&self, err: IntegrationError) {
        self.responses.lock().unwrap().push_back(Err(err));
    }

    fn next(&self) -> Result<Value, IntegrationError> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(IntegrationError::MockQueueEmpty))
    }

    /// Media URLs passed to `process` and job ids passed to `job`, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Analyzer for MockAnalyzer {
    async fn process(&self, media_url: &str) -> Result<AnalysisPayload, IntegrationError> {
        self.calls.lock().unwrap().push(media_url.to_string());
        parse_value(self.next()?)
    }

    async fn job(&self, job_id: &str) -> Result<JobStatus, IntegrationError> {
        self.calls.lock().unwrap().push(format!("job:{job_id}"));
        let next = self.next()?;
        Ok(parse_job_value(&next))
    }

    async fn health(&self) -> Result<bool, IntegrationError> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn mock_returns_enqueued_responses_in_order() {
        let mock = MockAnalyzer::new();
        mock.push_json(json!({"success": true, "insights": {"summary": "one"}}));
        mock.push_json(json!({"success": false}));

        let first = mock.process("https://x.com/1").await.unwrap();
        assert_eq!(first.insights.summary, "one");
        assert!(matches!(
            mock.process("https://x.com/2").await,
            Err(IntegrationError::ProcessingFailed)
        ));
        assert!(matches!(
            mock.process("https://x.com/3").await,
            Err(IntegrationError::MockQueueEmpty)
        ));
        assert_eq!(mock.calls(), vec!["https://x.com/1", "https://x.com/2", "https://x.com/3"]);
    }

    #[tokio::test]
    async fn pushed_errors_come_back_from_either_call() {
        let mock = MockAnalyzer::new();
        mock.push_error(IntegrationError::ProcessingFailed);
        mock.push_json(json!({"id": "9", "state": "active"}));

        assert!(matches!(
            mock.process("https://x.com/1").await,
            Err(IntegrationError::ProcessingFailed)
        ));
        let job = mock.job("9").await.unwrap();
        assert_eq!(job.state, "active");
        assert_eq!(mock.calls(), vec!["https://x.com/1", "job:9"]);
    }
}
