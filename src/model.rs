use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Opaque media identifier, generated client-side.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaId(String);

impl MediaId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for MediaId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for MediaId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for MediaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaEntry {
    pub id: MediaId,
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sentiment {
    #[serde(default, deserialize_with = "null_default")]
    pub label: String,
    #[serde(default, deserialize_with = "null_default")]
    pub score: f64,
}

impl Sentiment {
    pub fn is_empty(&self) -> bool {
        self.label.is_empty() && self.score == 0.0
    }

    pub fn emoji(&self) -> &'static str {
        match self.label.to_lowercase().as_str() {
            "positive" => "😊",
            "negative" => "😞",
            _ => "😐",
        }
    }
}

/// Summary, topics, action items and sentiment. Every field tolerates absence or null.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Insights {
    #[serde(default, deserialize_with = "null_default")]
    pub summary: String,
    #[serde(default, deserialize_with = "null_default")]
    pub topics: Vec<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub action_items: Vec<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub sentiment: Sentiment,
}

impl Insights {
    pub fn is_empty(&self) -> bool {
        self.summary.is_empty()
            && self.topics.is_empty()
            && self.action_items.is_empty()
            && self.sentiment.is_empty()
    }
}

/// Stored analysis row, one per media entry at most.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub media_id: MediaId,
    #[serde(flatten)]
    pub insights: Insights,
}

impl AnalysisResult {
    pub fn new(media_id: MediaId, insights: Insights) -> Self {
        Self { media_id, insights }
    }

    pub fn empty(media_id: MediaId) -> Self {
        Self::new(media_id, Insights::default())
    }

    pub fn is_empty(&self) -> bool {
        self.insights.is_empty()
    }
}

pub(crate) fn null_default<'de, D, T>(de: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(de)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn generated_ids_are_distinct() {
        assert_ne!(MediaId::generate(), MediaId::generate());
    }

    #[test]
    fn insights_tolerate_missing_and_null_fields() {
        let ins: Insights = serde_json::from_value(json!({
            "summary": null,
            "topics": ["a", "b"],
            "sentiment": {"label": "negative"}
        }))
        .unwrap();
        assert_eq!(ins.summary, "");
        assert_eq!(ins.topics, vec!["a", "b"]);
        assert!(ins.action_items.is_empty());
        assert_eq!(ins.sentiment.label, "negative");
        assert_eq!(ins.sentiment.score, 0.0);
        assert_eq!(ins.sentiment.emoji(), "😞");
    }

    #[test]
    fn analysis_result_serializes_flat_row() {
        let row = AnalysisResult::new(
            "m1".into(),
            Insights {
                summary: "S".into(),
                topics: vec!["a".into()],
                action_items: vec![],
                sentiment: Sentiment { label: "positive".into(), score: 0.9 },
            },
        );
        let value = serde_json::to_value(&row).unwrap();
        assert_eq!(value["media_id"], "m1");
        assert_eq!(value["summary"], "S");
        assert_eq!(value["topics"][0], "a");
        assert_eq!(value["sentiment"]["score"], 0.9);
    }

    #[test]
    fn empty_sentiment_object_counts_as_empty() {
        let s: Sentiment = serde_json::from_value(json!({})).unwrap();
        assert!(s.is_empty());
        assert_eq!(s.emoji(), "😐");
    }
}
