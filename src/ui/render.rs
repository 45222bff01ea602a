use crate::controller::{Controller, SyncStatus};
use crate::output::types::{Frame, Message, Screen};
use crate::session::{Notice, View};

pub fn notice_message(notice: &Notice) -> Message {
    match notice {
        Notice::MediaNotFound(_) => {
            Message::Warning("⚠️ Selected media not found. Returning to dashboard.".to_string())
        }
        Notice::NoActiveMedia => Message::Warning("⚠️ No media selected.".to_string()),
    }
}

pub fn sync_warning(sync: &SyncStatus, what: &str) -> Option<Message> {
    sync.failure()
        .map(|msg| Message::Warning(format!("⚠️ Failed to {what}: {msg}")))
}

/// Builds the screen for the current view. Reconciles first, so a dangling
/// active id lands on the dashboard with a warning.
pub async fn frame(ctrl: &mut Controller, mut messages: Vec<Message>) -> Frame {
    messages.extend(ctrl.reconcile().iter().map(notice_message));

    let view = ctrl.session().view.current_view;
    let active = ctrl.session().active().cloned();
    let screen = match (view, active) {
        (View::Detail, Some(entry)) => {
            let analysis = ctrl.last_analysis(&entry.id).cloned();
            Screen::Detail { entry, analysis }
        }
        (View::Results, Some(entry)) => {
            let outcome = ctrl.fetch_results(&entry.id).await;
            messages.extend(sync_warning(&outcome.sync, "load results"));
            let result = Some(outcome.value).filter(|r| !r.is_empty());
            Screen::Results { entry, result }
        }
        _ => {
            let outcome = ctrl.load_once().await;
            messages.extend(sync_warning(&outcome.sync, "load media from database"));
            Screen::Dashboard { entries: ctrl.session().media.clone() }
        }
    };
    Frame { screen, messages }
}
