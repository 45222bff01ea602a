//! Remote store: table-scoped persistence for media rows and their analysis.
//!
//! `StoreConnector` opens a handle at the time of each operation so that a
//! missing credential surfaces as a configuration error on first use rather
//! than at startup. There are no cross-table transactions: the cascade
//! delete is two independent calls.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::model::{AnalysisResult, MediaEntry, MediaId};

#[cfg(test)]
pub mod memory;
pub mod pg;
pub mod rest;

pub const MEDIA_TABLE: &str = "media";
pub const ANALYSIS_TABLE: &str = "analysis";

#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn insert_media(&self, entry: &MediaEntry) -> Result<(), StoreError>;

    async fn update_media(&self, entry: &MediaEntry) -> Result<(), StoreError>;

    async fn delete_media(&self, id: &MediaId) -> Result<(), StoreError>;

    /// Dependent-table half of the cascade.
    async fn delete_analysis(&self, media_id: &MediaId) -> Result<(), StoreError>;

    /// All media rows, oldest first.
    async fn list_media(&self) -> Result<Vec<MediaEntry>, StoreError>;

    async fn fetch_analysis(&self, media_id: &MediaId) -> Result<Option<AnalysisResult>, StoreError>;

    /// Insert or overwrite, keyed by `media_id`.
    async fn upsert_analysis(&self, result: &AnalysisResult) -> Result<(), StoreError>;
}

pub trait StoreConnector: Send + Sync {
    fn connect(&self) -> Result<Arc<dyn MediaStore>, StoreError>;
}

/// An already-open store connects to itself.
impl<S: MediaStore + 'static> StoreConnector for Arc<S> {
    fn connect(&self) -> Result<Arc<dyn MediaStore>, StoreError> {
        Ok(self.clone())
    }
}
