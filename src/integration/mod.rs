//! Client for the external analysis service (`POST {base}/upload-audio`).

use async_trait::async_trait;

use crate::error::IntegrationError;

pub mod http;
#[cfg(test)]
pub mod mock;
pub mod payload;

pub use http::{AnalyzerConfig, HttpAnalyzer};
#[cfg(test)]
pub use mock::MockAnalyzer;
pub use payload::{AnalysisPayload, JobStatus};

#[async_trait]
pub trait Analyzer: Send + Sync {
    /// One blocking round-trip for `media_url`; nothing is retried.
    async fn process(&self, media_url: &str) -> Result<AnalysisPayload, IntegrationError>;

    /// Looks up a job the server queued instead of processing inline.
    async fn job(&self, job_id: &str) -> Result<JobStatus, IntegrationError>;

    /// Liveness of the service, `Ok(true)` when it reports `status: ok`.
    async fn health(&self) -> Result<bool, IntegrationError>;
}
