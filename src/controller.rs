//! Media registry and view-state controller.
//!
//! Owns the [`Session`], feeds user actions through the pure reducer and
//! executes the resulting effects against the store and the analysis
//! service. Store failures never undo the in-memory change; they come back
//! as [`SyncStatus::Failed`] next to the operation's value.

use std::sync::Arc;

use serde::Serialize;

use crate::error::{IntegrationError, ProcessError, StoreError, ValidationError};
use crate::integration::{AnalysisPayload, Analyzer, JobStatus};
use crate::model::{AnalysisResult, MediaEntry, MediaId};
use crate::session::{merge_loaded, reduce, Action, Effect, Notice, Session};
use crate::store::{MediaStore, StoreConnector};
use crate::telemetry;
use crate::telemetry::ops::media::Phase as MediaPhase;
use crate::telemetry::ops::process::Phase as ProcessPhase;
use crate::telemetry::ops::results::Phase as ResultsPhase;

/// Whether the remote side of an operation went through.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum SyncStatus {
    Synced,
    /// Nothing needed to be sent.
    Skipped,
    Failed(String),
}

impl SyncStatus {
    fn from_store(res: Result<(), StoreError>) -> Self {
        match res {
            Ok(()) => SyncStatus::Synced,
            Err(e) => SyncStatus::Failed(e.to_string()),
        }
    }

    /// The store error text, when the remote side failed.
    pub fn failure(&self) -> Option<&str> {
        match self {
            SyncStatus::Failed(msg) => Some(msg),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Outcome<T> {
    pub value: T,
    pub sync: SyncStatus,
    pub notices: Vec<Notice>,
}

impl<T> Outcome<T> {
    fn new(value: T, sync: SyncStatus) -> Self {
        Self { value, sync, notices: Vec::new() }
    }

    fn with_notices(mut self, notices: Vec<Notice>) -> Self {
        self.notices = notices;
        self
    }
}

pub struct Controller {
    session: Session,
    store: Box<dyn StoreConnector>,
    analyzer: Arc<dyn Analyzer>,
    last_analysis: Option<(MediaId, AnalysisPayload)>,
}

impl Controller {
    pub fn new(store: Box<dyn StoreConnector>, analyzer: Arc<dyn Analyzer>) -> Self {
        Self {
            session: Session::default(),
            store,
            analyzer,
            last_analysis: None,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Starts a fresh session over the same store and analyzer.
    pub fn reset(&mut self) {
        self.session = Session::default();
        self.last_analysis = None;
    }

    /// Payload from the most recent successful processing of `id` in this session.
    pub fn last_analysis(&self, id: &MediaId) -> Option<&AnalysisPayload> {
        self.last_analysis
            .as_ref()
            .filter(|(last, _)| last == id)
            .map(|(_, payload)| payload)
    }

    fn transition(&mut self, action: Action) -> Result<(Vec<Effect>, Vec<Notice>), ValidationError> {
        let t = reduce(&self.session, action)?;
        self.session = t.session;
        Ok((t.effects, t.notices))
    }

    /// Runs store writes in order, stopping at the first failure.
    async fn run_writes(&self, effects: Vec<Effect>) -> SyncStatus {
        let writes: Vec<&Effect> = effects.iter().filter(|e| e.is_store_write()).collect();
        if writes.is_empty() {
            return SyncStatus::Skipped;
        }
        let store = match self.store.connect() {
            Ok(store) => store,
            Err(e) => return SyncStatus::Failed(e.to_string()),
        };
        for effect in writes {
            let res = match effect {
                Effect::InsertMedia(entry) => store.insert_media(entry).await,
                Effect::UpdateMedia(entry) => store.update_media(entry).await,
                Effect::DeleteMedia(id) => store.delete_media(id).await,
                Effect::DeleteAnalysis(id) => store.delete_analysis(id).await,
                Effect::UpsertAnalysis(result) => store.upsert_analysis(result).await,
                Effect::LoadMedia | Effect::Analyze { .. } => continue,
            };
            if res.is_err() {
                return SyncStatus::from_store(res);
            }
        }
        SyncStatus::Synced
    }

    async fn list_media(&self) -> Result<Vec<MediaEntry>, StoreError> {
        self.store.connect()?.list_media().await
    }

    async fn fetch_analysis(&self, id: &MediaId) -> Result<Option<AnalysisResult>, StoreError> {
        let store: Arc<dyn MediaStore> = self.store.connect()?;
        store.fetch_analysis(id).await
    }

    /// Loads the registry from the store the first time it is called.
    /// The value is the number of rows loaded.
    pub async fn load_once(&mut self) -> Outcome<usize> {
        let (effects, _) = self.transition(Action::Load).unwrap_or_default();
        if !effects.contains(&Effect::LoadMedia) {
            return Outcome::new(0, SyncStatus::Skipped);
        }

        let log = telemetry::media();
        let _g = log.root_span().entered();
        let _s = log.span(&MediaPhase::Load).entered();
        match self.list_media().await {
            Ok(rows) => {
                let count = rows.len();
                self.session = merge_loaded(std::mem::take(&mut self.session), rows);
                log.loaded(count);
                Outcome::new(count, SyncStatus::Synced)
            }
            Err(e) => {
                log.warn_kv("⚠️ Failed to load media from database", [("error", e.to_string())]);
                Outcome::new(0, SyncStatus::Failed(e.to_string()))
            }
        }
    }

    pub async fn add(&mut self, name: &str, url: &str) -> Result<Outcome<MediaId>, ValidationError> {
        let id = MediaId::generate();
        let (effects, notices) = self.transition(Action::Add {
            id: id.clone(),
            name: name.to_string(),
            url: url.to_string(),
        })?;

        let log = telemetry::media();
        let _g = log.root_span_kv([("id", id.to_string())]).entered();
        let _s = log.span(&MediaPhase::Insert).entered();
        let sync = self.run_writes(effects).await;
        if let SyncStatus::Failed(msg) = &sync {
            log.warn_kv("⚠️ Failed to save to database", [("id", id.to_string()), ("error", msg.clone())]);
        }
        Ok(Outcome::new(id, sync).with_notices(notices))
    }

    /// The value is `false` when no entry has that id.
    pub async fn update(
        &mut self,
        id: &MediaId,
        name: &str,
        url: &str,
    ) -> Result<Outcome<bool>, ValidationError> {
        let (effects, notices) = self.transition(Action::Update {
            id: id.clone(),
            name: name.to_string(),
            url: url.to_string(),
        })?;
        let found = !effects.is_empty();

        let log = telemetry::media();
        let _g = log.root_span_kv([("id", id.to_string())]).entered();
        let _s = log.span(&MediaPhase::Update).entered();
        let sync = self.run_writes(effects).await;
        if let SyncStatus::Failed(msg) = &sync {
            log.warn_kv("⚠️ Failed to update database", [("id", id.to_string()), ("error", msg.clone())]);
        }
        Ok(Outcome::new(found, sync).with_notices(notices))
    }

    /// Removes the entry and its analysis. Unknown ids are a no-op; the value
    /// says whether anything was removed.
    pub async fn delete(&mut self, id: &MediaId) -> Outcome<bool> {
        let (effects, notices) = self.transition(Action::Delete(id.clone())).unwrap_or_default();
        let removed = !effects.is_empty();

        let log = telemetry::media();
        let _g = log.root_span_kv([("id", id.to_string())]).entered();
        let _s = log.span(&MediaPhase::Delete).entered();
        let sync = self.run_writes(effects).await;
        if let SyncStatus::Failed(msg) = &sync {
            log.warn_kv("⚠️ Failed to delete from database", [("id", id.to_string()), ("error", msg.clone())]);
        }
        Outcome::new(removed, sync).with_notices(notices)
    }

    /// Sends the entry's URL for analysis and stores the insights. On an
    /// integration error nothing is written.
    pub async fn process_and_store(
        &mut self,
        id: &MediaId,
    ) -> Result<Outcome<AnalysisPayload>, ProcessError> {
        let log = telemetry::process();
        let _g = log.root_span_kv([("media_id", id.to_string())]).entered();

        let (effects, notices) = self.transition(Action::Process(id.clone())).unwrap_or_default();
        let Some(Effect::Analyze { url, .. }) = effects.into_iter().next() else {
            return Err(ProcessError::UnknownMedia(id.clone()));
        };

        let payload = {
            let _s = log.span(&ProcessPhase::Analyze).entered();
            match self.analyzer.process(&url).await {
                Ok(payload) => payload,
                Err(e) => {
                    log.error_kv("❌ Processing failed", [("media_id", id.to_string()), ("error", e.to_string())]);
                    return Err(e.into());
                }
            }
        };
        let ins = &payload.insights;
        log.insights_summary(ins.topics.len(), ins.action_items.len(), &ins.sentiment.label);
        self.last_analysis = Some((id.clone(), payload.clone()));

        if payload.is_queued() {
            let job_id = payload.job_id.clone().unwrap_or_default();
            log.info_kv("⏳ Processing queued on server", [("job_id", job_id)]);
            return Ok(Outcome::new(payload, SyncStatus::Skipped).with_notices(notices));
        }

        let (effects, more) = self
            .transition(Action::Processed(payload.to_result(id.clone())))
            .unwrap_or_default();
        let _s = log.span(&ProcessPhase::Persist).entered();
        let sync = self.run_writes(effects).await;
        if let SyncStatus::Failed(msg) = &sync {
            log.warn_kv("⚠️ Failed to save analysis", [("media_id", id.to_string()), ("error", msg.clone())]);
        }
        let mut notices = notices;
        notices.extend(more);
        Ok(Outcome::new(payload, sync).with_notices(notices))
    }

    /// Job id of the queued processing of `id` in this session, if any.
    pub fn pending_job(&self, id: &MediaId) -> Option<&str> {
        self.last_analysis(id).and_then(|p| p.job_id.as_deref())
    }

    /// Asks the analysis service about a queued job. A completed job's
    /// insights are stored like an inline result; any other state writes
    /// nothing.
    pub async fn check_job(
        &mut self,
        id: &MediaId,
        job_id: &str,
    ) -> Result<Outcome<JobStatus>, ProcessError> {
        let log = telemetry::process();
        let _g = log
            .root_span_kv([("media_id", id.to_string()), ("job_id", job_id.to_string())])
            .entered();
        if !self.session.contains(id) {
            return Err(ProcessError::UnknownMedia(id.clone()));
        }

        let status = {
            let _s = log.span(&ProcessPhase::Poll).entered();
            match self.analyzer.job(job_id).await {
                Ok(status) => status,
                Err(e) => {
                    log.error_kv("❌ Job lookup failed", [("job_id", job_id.to_string()), ("error", e.to_string())]);
                    return Err(e.into());
                }
            }
        };
        let payload = status.result.clone().filter(|_| status.is_completed());
        let Some(payload) = payload else {
            log.info_kv("⏳ Job not finished", [("job_id", job_id.to_string()), ("state", status.state.clone())]);
            return Ok(Outcome::new(status, SyncStatus::Skipped));
        };

        let ins = &payload.insights;
        log.insights_summary(ins.topics.len(), ins.action_items.len(), &ins.sentiment.label);
        let (effects, notices) = self
            .transition(Action::Processed(payload.to_result(id.clone())))
            .unwrap_or_default();
        self.last_analysis = Some((id.clone(), payload));

        let _s = log.span(&ProcessPhase::Persist).entered();
        let sync = self.run_writes(effects).await;
        if let SyncStatus::Failed(msg) = &sync {
            log.warn_kv("⚠️ Failed to save analysis", [("media_id", id.to_string()), ("error", msg.clone())]);
        }
        Ok(Outcome::new(status, sync).with_notices(notices))
    }

    /// Stored analysis for `id`, or an all-empty result when there is none or
    /// the store could not be read.
    pub async fn fetch_results(&self, id: &MediaId) -> Outcome<AnalysisResult> {
        let log = telemetry::results();
        let _g = log.root_span_kv([("media_id", id.to_string())]).entered();
        let _s = log.span(&ResultsPhase::Fetch).entered();
        match self.fetch_analysis(id).await {
            Ok(Some(result)) => Outcome::new(result, SyncStatus::Synced),
            Ok(None) => Outcome::new(AnalysisResult::empty(id.clone()), SyncStatus::Synced),
            Err(e) => {
                log.warn_kv("⚠️ Failed to load results", [("media_id", id.to_string()), ("error", e.to_string())]);
                Outcome::new(AnalysisResult::empty(id.clone()), SyncStatus::Failed(e.to_string()))
            }
        }
    }

    pub async fn health(&self) -> Result<bool, IntegrationError> {
        self.analyzer.health().await
    }

    fn navigate(&mut self, action: Action) -> Vec<Notice> {
        let (_, notices) = self.transition(action).unwrap_or_default();
        notices
    }

    pub fn open(&mut self, id: &MediaId) -> Vec<Notice> {
        self.navigate(Action::Open(id.clone()))
    }

    pub fn show_results(&mut self, id: &MediaId) -> Vec<Notice> {
        self.navigate(Action::ShowResults(id.clone()))
    }

    pub fn open_details(&mut self) -> Vec<Notice> {
        self.navigate(Action::OpenDetails)
    }

    pub fn view_results(&mut self) -> Vec<Notice> {
        self.navigate(Action::ViewResults)
    }

    pub fn back(&mut self) -> Vec<Notice> {
        self.navigate(Action::Back)
    }

    /// Run before every render.
    pub fn reconcile(&mut self) -> Vec<Notice> {
        self.navigate(Action::Reconcile)
    }
}
