use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};

use super::payload::{parse_job_response, parse_response, AnalysisPayload, JobStatus};
use super::Analyzer;
use crate::error::{ConfigError, IntegrationError};

/// Upper bound on one processing call.
pub const PROCESS_TIMEOUT_SECS: u64 = 120;
const UPLOAD_PATH: &str = "upload-audio";
const HEALTH_PATH: &str = "health";
const JOBS_PATH: &str = "jobs";

#[derive(Clone, Debug)]
pub struct AnalyzerConfig {
    pub base_url: Option<String>,
    pub bearer_token: Option<String>,
    pub timeout: Duration,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            bearer_token: None,
            timeout: Duration::from_secs(PROCESS_TIMEOUT_SECS),
        }
    }
}

#[derive(Clone)]
pub struct HttpAnalyzer {
    http: HttpClient,
    cfg: AnalyzerConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UploadRequest<'a> {
    audio_url: &'a str,
}

#[derive(Debug, Deserialize)]
struct HealthResponse {
    #[serde(default)]
    status: String,
}

impl HttpAnalyzer {
    pub fn new(cfg: AnalyzerConfig) -> Result<Self, IntegrationError> {
        let http = HttpClient::builder()
            .timeout(cfg.timeout)
            .build()
            .map_err(|e| IntegrationError::from_reqwest(e, cfg.timeout))?;
        Ok(Self { http, cfg })
    }

    fn endpoint(&self, path: &str) -> Result<String, IntegrationError> {
        let base = self
            .cfg
            .base_url
            .as_deref()
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .ok_or(ConfigError::Missing("API_BASE_URL"))?;
        Ok(format!("{}/{}", base.trim_end_matches('/'), path))
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.cfg.bearer_token.as_deref().filter(|t| !t.is_empty()) {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }
}

#[async_trait]
impl Analyzer for HttpAnalyzer {
    async fn process(&self, media_url: &str) -> Result<AnalysisPayload, IntegrationError> {
        let endpoint = self.endpoint(UPLOAD_PATH)?;
        let timeout = self.cfg.timeout;

        let response = self
            .authorize(self.http.post(endpoint))
            .json(&UploadRequest { audio_url: media_url })
            .send()
            .await
            .map_err(|e| IntegrationError::from_reqwest(e, timeout))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| IntegrationError::from_reqwest(e, timeout))?;

        if !status.is_success() {
            return Err(IntegrationError::Http {
                status,
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        parse_response(&bytes)
    }

    async fn job(&self, job_id: &str) -> Result<JobStatus, IntegrationError> {
        let endpoint = self.endpoint(&format!("{JOBS_PATH}/{job_id}"))?;
        let timeout = self.cfg.timeout;
        let response = self
            .authorize(self.http.get(endpoint))
            .send()
            .await
            .map_err(|e| IntegrationError::from_reqwest(e, timeout))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| IntegrationError::from_reqwest(e, timeout))?;
        if !status.is_success() {
            return Err(IntegrationError::Http {
                status,
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }
        parse_job_response(&bytes)
    }

    async fn health(&self) -> Result<bool, IntegrationError> {
        let endpoint = self.endpoint(HEALTH_PATH)?;
        let timeout = self.cfg.timeout;
        let response = self
            .http
            .get(endpoint)
            .send()
            .await
            .map_err(|e| IntegrationError::from_reqwest(e, timeout))?;
        if !response.status().is_success() {
            return Ok(false);
        }
        let body: HealthResponse = response
            .json()
            .await
            .map_err(|e| IntegrationError::from_reqwest(e, timeout))?;
        Ok(body.status == "ok")
    }
}
