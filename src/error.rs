use std::time::Duration;

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

use crate::model::MediaId;

/// A required setting is absent or unusable. Fatal only for the operation that needs it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),
    #[error("missing SUPABASE_URL or SUPABASE_ANON_KEY in environment")]
    MissingStoreCredentials,
    #[error("invalid {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Any failure talking to the remote store. Callers downgrade it to a warning.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("store returned {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[cfg(test)]
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Failure of the analysis call. Blocks only the processing action that raised it.
#[derive(Debug, Error)]
pub enum IntegrationError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("http error {status}: {body}")]
    Http { status: StatusCode, body: String },
    #[error("request timed out after {}s", .0.as_secs())]
    Timeout(Duration),
    #[error("API did not return success=true")]
    ProcessingFailed,
    #[error("transport error: {0}")]
    Transport(reqwest::Error),
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),
    #[cfg(test)]
    #[error("mock analyzer response queue is empty")]
    MockQueueEmpty,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: String,
}

impl IntegrationError {
    pub(crate) fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            IntegrationError::Timeout(timeout)
        } else {
            IntegrationError::Transport(err)
        }
    }

    /// Server-side error code from a `{"error": "..."}` body, if the failure carried one.
    pub fn error_code(&self) -> Option<String> {
        match self {
            IntegrationError::Http { body, .. } => serde_json::from_str::<ErrorEnvelope>(body)
                .ok()
                .map(|env| env.error),
            _ => None,
        }
    }
}

/// Bad user input. Checked before any mutation; never reaches the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("media name must not be blank")]
    BlankName,
    #[error("invalid URL: {0:?} (expected scheme and host, e.g. https://example.com/media.mp3)")]
    InvalidUrl(String),
}

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("media {0} not found")]
    UnknownMedia(MediaId),
    #[error(transparent)]
    Integration(#[from] IntegrationError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_exposes_server_code() {
        let err = IntegrationError::Http {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: r#"{"error":"process_failed"}"#.into(),
        };
        assert_eq!(err.error_code().as_deref(), Some("process_failed"));
        assert_eq!(
            format!("{err}"),
            r#"http error 500 Internal Server Error: {"error":"process_failed"}"#
        );
    }

    #[test]
    fn plain_body_has_no_code() {
        let err = IntegrationError::Http {
            status: StatusCode::BAD_GATEWAY,
            body: "upstream down".into(),
        };
        assert!(err.error_code().is_none());
        assert!(IntegrationError::ProcessingFailed.error_code().is_none());
    }

    #[test]
    fn timeout_message_names_bound() {
        let err = IntegrationError::Timeout(Duration::from_secs(120));
        assert_eq!(format!("{err}"), "request timed out after 120s");
    }
}
