use serde::Serialize;
use serde_json::Value;

use crate::error::IntegrationError;
use crate::model::{AnalysisResult, Insights, MediaId, Sentiment};

/// Parsed body of a successful processing call.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct AnalysisPayload {
    pub insights: Insights,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
    /// Set when the server queued the work instead of running it inline.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
}

impl AnalysisPayload {
    pub fn is_queued(&self) -> bool {
        self.job_id.is_some()
    }

    pub fn to_result(&self, media_id: MediaId) -> AnalysisResult {
        AnalysisResult::new(media_id, self.insights.clone())
    }
}

/// Server-side state of a queued processing job (`GET /jobs/{id}`).
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct JobStatus {
    pub id: String,
    pub state: String,
    /// Present once the worker has finished.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<AnalysisPayload>,
}

impl JobStatus {
    pub fn is_completed(&self) -> bool {
        self.state == "completed" && self.result.is_some()
    }
}

/// Interprets a 2xx response body.
///
/// `success` must be literally `true`. Each insight field is read on its
/// own: a missing, null or mistyped field falls back to its empty value
/// without discarding the others.
pub fn parse_response(body: &[u8]) -> Result<AnalysisPayload, IntegrationError> {
    let value: Value = serde_json::from_slice(body)?;
    parse_value(value)
}

pub fn parse_value(value: Value) -> Result<AnalysisPayload, IntegrationError> {
    let success = value.get("success").and_then(Value::as_bool).unwrap_or(false);
    if !success {
        return Err(IntegrationError::ProcessingFailed);
    }

    let (insights, transcript) = read_outcome(&value);
    let queued = value.get("queued").and_then(Value::as_bool).unwrap_or(false);
    let job_id = if queued {
        Some(match value.get("jobId") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => String::new(),
        })
    } else {
        None
    };

    Ok(AnalysisPayload { insights, transcript, job_id })
}

pub fn parse_job_response(body: &[u8]) -> Result<JobStatus, IntegrationError> {
    let value: Value = serde_json::from_slice(body)?;
    Ok(parse_job_value(&value))
}

/// The worker's return value has the same `{transcript, insights}` shape as
/// an inline processing response, minus `success`.
pub fn parse_job_value(value: &Value) -> JobStatus {
    let id = match value.get("id") {
        Some(Value::Number(n)) => n.to_string(),
        other => text(other),
    };
    let result = value
        .get("result")
        .filter(|r| r.is_object())
        .map(|r| {
            let (insights, transcript) = read_outcome(r);
            AnalysisPayload { insights, transcript, job_id: None }
        });
    JobStatus { id, state: text(value.get("state")), result }
}

fn read_outcome(value: &Value) -> (Insights, Option<String>) {
    let insights = value
        .get("insights")
        .map(read_insights)
        .unwrap_or_default();
    let transcript = value
        .get("transcript")
        .and_then(Value::as_str)
        .map(str::to_string);
    (insights, transcript)
}

fn read_insights(value: &Value) -> Insights {
    let sentiment = value.get("sentiment");
    Insights {
        summary: text(value.get("summary")),
        topics: text_list(value.get("topics")),
        action_items: text_list(value.get("action_items")),
        sentiment: Sentiment {
            label: text(sentiment.and_then(|s| s.get("label"))),
            score: sentiment.and_then(|s| s.get("score")).and_then(score).unwrap_or_default(),
        },
    }
}

fn text(value: Option<&Value>) -> String {
    value.and_then(Value::as_str).map(str::to_string).unwrap_or_default()
}

/// Keeps the string items of an array and skips anything else.
fn text_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_str).map(str::to_string).collect())
        .unwrap_or_default()
}

/// Numbers, or numeric strings such as `"0.8"`.
fn score(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
