use crate::model::{AnalysisResult, MediaEntry, MediaId};

use super::Session;

#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    /// Request the one-per-session remote load.
    Load,
    Add { id: MediaId, name: String, url: String },
    Update { id: MediaId, name: String, url: String },
    Delete(MediaId),
    /// Dashboard -> Detail.
    Open(MediaId),
    /// Dashboard -> Results.
    ShowResults(MediaId),
    /// Results -> Detail for the active entry.
    OpenDetails,
    /// Detail -> Results for the active entry.
    ViewResults,
    Back,
    Process(MediaId),
    /// Successful analysis to persist.
    Processed(AnalysisResult),
    /// Re-check the active-entry invariant, run before each render.
    Reconcile,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    LoadMedia,
    InsertMedia(MediaEntry),
    UpdateMedia(MediaEntry),
    DeleteMedia(MediaId),
    DeleteAnalysis(MediaId),
    Analyze { id: MediaId, url: String },
    UpsertAnalysis(AnalysisResult),
}

impl Effect {
    pub fn is_store_write(&self) -> bool {
        !matches!(self, Effect::LoadMedia | Effect::Analyze { .. })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notice {
    /// The referenced entry is gone; the view fell back to the dashboard.
    MediaNotFound(MediaId),
    /// Navigation needed an active entry and there was none.
    NoActiveMedia,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
    pub session: Session,
    pub effects: Vec<Effect>,
    pub notices: Vec<Notice>,
}

impl Transition {
    pub(crate) fn new(session: Session) -> Self {
        Self { session, effects: Vec::new(), notices: Vec::new() }
    }

    pub(crate) fn effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub(crate) fn notice(mut self, notice: Notice) -> Self {
        self.notices.push(notice);
        self
    }
}
