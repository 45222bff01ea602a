//! Per-process session: the media list plus which view is showing.
//!
//! State changes go through [`reduce`], which never performs I/O. It hands
//! back the next session and the effects the controller must run.

use serde::Serialize;

use crate::model::{MediaEntry, MediaId};

mod action;
mod reduce;

pub use action::{Action, Effect, Notice, Transition};
pub use reduce::{merge_loaded, reduce};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    #[default]
    Dashboard,
    Detail,
    Results,
}

impl View {
    pub fn name(&self) -> &'static str {
        match self {
            View::Dashboard => "dashboard",
            View::Detail => "detail",
            View::Results => "results",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ViewState {
    pub current_view: View,
    pub active_media_id: Option<MediaId>,
    /// Set once the remote load has been attempted this session.
    pub registry_loaded: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Session {
    pub media: Vec<MediaEntry>,
    pub view: ViewState,
}

impl Session {
    pub fn get(&self, id: &MediaId) -> Option<&MediaEntry> {
        self.media.iter().find(|m| &m.id == id)
    }

    pub fn contains(&self, id: &MediaId) -> bool {
        self.get(id).is_some()
    }

    /// The active entry, if it still exists.
    pub fn active(&self) -> Option<&MediaEntry> {
        self.view.active_media_id.as_ref().and_then(|id| self.get(id))
    }
}
