use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::integration::AnalysisPayload;
use crate::model::{AnalysisResult, MediaEntry};

pub const SCHEMA_VERSION: &str = "echostream.v1";

/// What one render of a view shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum Screen {
    Dashboard {
        entries: Vec<MediaEntry>,
    },
    Detail {
        entry: MediaEntry,
        #[serde(skip_serializing_if = "Option::is_none")]
        analysis: Option<AnalysisPayload>,
    },
    Results {
        entry: MediaEntry,
        /// `None` when nothing has been stored for the entry yet.
        result: Option<AnalysisResult>,
    },
}

impl Screen {
    pub fn view_name(&self) -> &'static str {
        match self {
            Screen::Dashboard { .. } => "dashboard",
            Screen::Detail { .. } => "detail",
            Screen::Results { .. } => "results",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "level", content = "text", rename_all = "snake_case")]
pub enum Message {
    Info(String),
    Success(String),
    Warning(String),
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub screen: Screen,
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Envelope<'a> {
    pub schema_version: &'static str,
    pub time: DateTime<Utc>,
    pub request_id: Uuid,
    pub view: &'static str,
    pub screen: &'a Screen,
    #[serde(skip_serializing_if = "no_messages")]
    pub messages: &'a [Message],
}

fn no_messages(messages: &&[Message]) -> bool {
    messages.is_empty()
}

impl<'a> Envelope<'a> {
    pub fn frame(frame: &'a Frame) -> Self {
        Envelope {
            schema_version: SCHEMA_VERSION,
            time: Utc::now(),
            request_id: Uuid::new_v4(),
            view: frame.screen.view_name(),
            screen: &frame.screen,
            messages: &frame.messages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_tags_view_and_skips_empty_messages() {
        let frame = Frame { screen: Screen::Dashboard { entries: vec![] }, messages: vec![] };
        let value = serde_json::to_value(Envelope::frame(&frame)).unwrap();
        assert_eq!(value["schema_version"], SCHEMA_VERSION);
        assert_eq!(value["view"], "dashboard");
        assert_eq!(value["screen"]["view"], "dashboard");
        assert!(value["screen"]["entries"].as_array().unwrap().is_empty());
        assert!(value.get("messages").is_none());
    }

    #[test]
    fn results_without_row_serialize_null() {
        let entry = MediaEntry { id: "m1".into(), name: "Talk".into(), url: "https://x.com".into() };
        let frame = Frame {
            screen: Screen::Results { entry, result: None },
            messages: vec![Message::Warning("careful".into())],
        };
        let value = serde_json::to_value(Envelope::frame(&frame)).unwrap();
        assert!(value["screen"]["result"].is_null());
        assert_eq!(value["messages"][0]["level"], "warning");
        assert_eq!(value["messages"][0]["text"], "careful");
    }
}
