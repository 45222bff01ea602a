//! PostgREST adapter for the hosted database (`{SUPABASE_URL}/rest/v1`).

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client as HttpClient, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::{MediaStore, StoreConnector, ANALYSIS_TABLE, MEDIA_TABLE};
use crate::error::{ConfigError, StoreError};
use crate::model::{AnalysisResult, Insights, MediaEntry, MediaId};

const REST_PREFIX: &str = "rest/v1";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Clone, Debug)]
pub struct RestHandle {
    http: HttpClient,
    base_url: String,
    key: String,
}

impl RestHandle {
    /// Fails fast when either credential is empty or absent.
    pub fn connect(url: Option<&str>, key: Option<&str>) -> Result<Self, StoreError> {
        let url = url.map(str::trim).filter(|u| !u.is_empty());
        let key = key.map(str::trim).filter(|k| !k.is_empty());
        let (Some(url), Some(key)) = (url, key) else {
            return Err(ConfigError::MissingStoreCredentials.into());
        };
        url::Url::parse(url).map_err(|e| ConfigError::Invalid {
            name: "SUPABASE_URL",
            reason: e.to_string(),
        })?;
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            http,
            base_url: url.trim_end_matches('/').to_string(),
            key: key.to_string(),
        })
    }

    pub fn table(&self, name: &'static str) -> Table<'_> {
        Table { handle: self, name }
    }

    fn endpoint(&self, table: &str) -> String {
        format!("{}/{}/{}", self.base_url, REST_PREFIX, table)
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        req.header("apikey", &self.key).bearer_auth(&self.key)
    }
}

/// Table-scoped operations on one PostgREST resource.
pub struct Table<'a> {
    handle: &'a RestHandle,
    name: &'static str,
}

impl Table<'_> {
    fn request(&self, method: reqwest::Method) -> RequestBuilder {
        let url = self.handle.endpoint(self.name);
        self.handle.authorize(self.handle.http.request(method, url))
    }

    pub async fn insert<T: Serialize + ?Sized>(&self, row: &T) -> Result<(), StoreError> {
        let req = self
            .request(reqwest::Method::POST)
            .header("Prefer", "return=minimal")
            .json(row);
        send(req).await.map(drop)
    }

    pub async fn update_eq<T: Serialize + ?Sized>(
        &self,
        column: &str,
        value: &str,
        patch: &T,
    ) -> Result<(), StoreError> {
        let req = self
            .request(reqwest::Method::PATCH)
            .query(&[(column, format!("eq.{value}"))])
            .header("Prefer", "return=minimal")
            .json(patch);
        send(req).await.map(drop)
    }

    pub async fn delete_eq(&self, column: &str, value: &str) -> Result<(), StoreError> {
        let req = self
            .request(reqwest::Method::DELETE)
            .query(&[(column, format!("eq.{value}"))]);
        send(req).await.map(drop)
    }

    pub async fn select_ordered<T: DeserializeOwned>(
        &self,
        columns: &str,
        order_by: &str,
    ) -> Result<Vec<T>, StoreError> {
        let req = self
            .request(reqwest::Method::GET)
            .query(&[("select", columns.to_string()), ("order", format!("{order_by}.asc"))]);
        let resp = send(req).await?;
        decode(resp).await
    }

    /// Zero matching rows is `Ok(None)`.
    pub async fn select_single_eq<T: DeserializeOwned>(
        &self,
        columns: &str,
        column: &str,
        value: &str,
    ) -> Result<Option<T>, StoreError> {
        let req = self.request(reqwest::Method::GET).query(&[
            ("select", columns.to_string()),
            (column, format!("eq.{value}")),
            ("limit", "1".to_string()),
        ]);
        let resp = send(req).await?;
        let rows: Vec<T> = decode(resp).await?;
        Ok(rows.into_iter().next())
    }

    pub async fn upsert<T: Serialize + ?Sized>(
        &self,
        row: &T,
        on_conflict: &str,
    ) -> Result<(), StoreError> {
        let req = self
            .request(reqwest::Method::POST)
            .query(&[("on_conflict", on_conflict)])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(row);
        send(req).await.map(drop)
    }
}

async fn send(req: RequestBuilder) -> Result<Response, StoreError> {
    let resp = req.send().await?;
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(StoreError::Status { status, body });
    }
    Ok(resp)
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, StoreError> {
    let bytes = resp.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[derive(Serialize)]
struct MediaPatch<'a> {
    name: &'a str,
    url: &'a str,
}

#[derive(Deserialize)]
struct AnalysisRow {
    #[serde(flatten)]
    insights: Insights,
}

#[async_trait]
impl MediaStore for RestHandle {
    async fn insert_media(&self, entry: &MediaEntry) -> Result<(), StoreError> {
        self.table(MEDIA_TABLE).insert(entry).await
    }

    async fn update_media(&self, entry: &MediaEntry) -> Result<(), StoreError> {
        let patch = MediaPatch { name: &entry.name, url: &entry.url };
        self.table(MEDIA_TABLE)
            .update_eq("id", entry.id.as_str(), &patch)
            .await
    }

    async fn delete_media(&self, id: &MediaId) -> Result<(), StoreError> {
        self.table(MEDIA_TABLE).delete_eq("id", id.as_str()).await
    }

    async fn delete_analysis(&self, media_id: &MediaId) -> Result<(), StoreError> {
        self.table(ANALYSIS_TABLE)
            .delete_eq("media_id", media_id.as_str())
            .await
    }

    async fn list_media(&self) -> Result<Vec<MediaEntry>, StoreError> {
        self.table(MEDIA_TABLE)
            .select_ordered("id,name,url", "created_at")
            .await
    }

    async fn fetch_analysis(&self, media_id: &MediaId) -> Result<Option<AnalysisResult>, StoreError> {
        let row: Option<AnalysisRow> = self
            .table(ANALYSIS_TABLE)
            .select_single_eq("summary,topics,action_items,sentiment", "media_id", media_id.as_str())
            .await?;
        Ok(row.map(|r| AnalysisResult::new(media_id.clone(), r.insights)))
    }

    async fn upsert_analysis(&self, result: &AnalysisResult) -> Result<(), StoreError> {
        self.table(ANALYSIS_TABLE).upsert(result, "media_id").await
    }
}

/// Reads credentials at connect time and keeps the first good handle.
#[derive(Debug, Default)]
pub struct RestConnector {
    url: Option<String>,
    key: Option<String>,
    handle: OnceLock<Arc<RestHandle>>,
}

impl RestConnector {
    pub fn new(url: Option<String>, key: Option<String>) -> Self {
        Self { url, key, handle: OnceLock::new() }
    }
}

impl StoreConnector for RestConnector {
    fn connect(&self) -> Result<Arc<dyn MediaStore>, StoreError> {
        if let Some(handle) = self.handle.get() {
            return Ok(handle.clone());
        }
        let handle = Arc::new(RestHandle::connect(self.url.as_deref(), self.key.as_deref())?);
        Ok(self.handle.get_or_init(|| handle).clone())
    }
}
