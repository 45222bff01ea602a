//! In-process store used as a test double. Rows keep insertion order, which
//! stands in for `created_at` ordering.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::MediaStore;
use crate::error::StoreError;
use crate::model::{AnalysisResult, MediaEntry, MediaId};

#[derive(Debug, Default)]
pub struct MemoryStore {
    media: Mutex<Vec<MediaEntry>>,
    analysis: Mutex<Vec<AnalysisResult>>,
    failing: AtomicBool,
    calls: Mutex<Vec<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// While set, every operation fails with `StoreError::Unavailable`.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn media_rows(&self) -> Vec<MediaEntry> {
        self.media.lock().unwrap().clone()
    }

    pub fn analysis_rows(&self) -> Vec<AnalysisResult> {
        self.analysis.lock().unwrap().clone()
    }

    /// Operation names in call order, failed attempts included.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn enter(&self, op: &str) -> Result<(), StoreError> {
        self.calls.lock().unwrap().push(op.to_string());
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(format!("{op} rejected")));
        }
        Ok(())
    }
}

#[async_trait]
impl MediaStore for MemoryStore {
    async fn insert_media(&self, entry: &MediaEntry) -> Result<(), StoreError> {
        self.enter("insert_media")?;
        let mut media = self.media.lock().unwrap();
        if media.iter().any(|m| m.id == entry.id) {
            return Err(StoreError::Unavailable(format!("duplicate id {}", entry.id)));
        }
        media.push(entry.clone());
        Ok(())
    }

    async fn update_media(&self, entry: &MediaEntry) -> Result<(), StoreError> {
        self.enter("update_media")?;
        if let Some(row) = self.media.lock().unwrap().iter_mut().find(|m| m.id == entry.id) {
            row.name = entry.name.clone();
            row.url = entry.url.clone();
        }
        Ok(())
    }

    async fn delete_media(&self, id: &MediaId) -> Result<(), StoreError> {
        self.enter("delete_media")?;
        self.media.lock().unwrap().retain(|m| &m.id != id);
        Ok(())
    }

    async fn delete_analysis(&self, media_id: &MediaId) -> Result<(), StoreError> {
        self.enter("delete_analysis")?;
        self.analysis.lock().unwrap().retain(|a| &a.media_id != media_id);
        Ok(())
    }

    async fn list_media(&self) -> Result<Vec<MediaEntry>, StoreError> {
        self.enter("list_media")?;
        Ok(self.media_rows())
    }

    async fn fetch_analysis(&self, media_id: &MediaId) -> Result<Option<AnalysisResult>, StoreError> {
        self.enter("fetch_analysis")?;
        Ok(self
            .analysis
            .lock()
            .unwrap()
            .iter()
            .find(|a| &a.media_id == media_id)
            .cloned())
    }

    async fn upsert_analysis(&self, result: &AnalysisResult) -> Result<(), StoreError> {
        self.enter("upsert_analysis")?;
        let mut rows = self.analysis.lock().unwrap();
        match rows.iter_mut().find(|a| a.media_id == result.media_id) {
            Some(row) => *row = result.clone(),
            None => rows.push(result.clone()),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, name: &str) -> MediaEntry {
        MediaEntry { id: id.into(), name: name.into(), url: format!("https://x.com/{id}") }
    }

    #[tokio::test]
    async fn upsert_overwrites_by_media_id() {
        let store = MemoryStore::new();
        let mut first = AnalysisResult::empty("m1".into());
        first.insights.summary = "old".into();
        store.upsert_analysis(&first).await.unwrap();
        let mut second = AnalysisResult::empty("m1".into());
        second.insights.summary = "new".into();
        store.upsert_analysis(&second).await.unwrap();

        let rows = store.analysis_rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].insights.summary, "new");
    }

    #[tokio::test]
    async fn failing_store_records_attempts() {
        let store = MemoryStore::new();
        store.set_failing(true);
        assert!(store.insert_media(&entry("a", "A")).await.is_err());
        assert!(store.media_rows().is_empty());
        assert_eq!(store.calls(), vec!["insert_media"]);

        store.set_failing(false);
        store.insert_media(&entry("a", "A")).await.unwrap();
        assert_eq!(store.list_media().await.unwrap().len(), 1);
    }
}
