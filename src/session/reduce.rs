use crate::error::ValidationError;
use crate::model::{MediaEntry, MediaId};
use crate::validate::validate_entry;

use super::{Action, Effect, Notice, Session, Transition, View};

/// Computes the next session for `action`. Validation failures leave the
/// caller's session untouched because nothing is returned to replace it.
pub fn reduce(session: &Session, action: Action) -> Result<Transition, ValidationError> {
    let mut next = session.clone();
    let t = match action {
        Action::Load => {
            if next.view.registry_loaded {
                Transition::new(next)
            } else {
                next.view.registry_loaded = true;
                Transition::new(next).effect(Effect::LoadMedia)
            }
        }
        Action::Add { id, name, url } => {
            let (name, url) = validate_entry(&name, &url)?;
            let entry = MediaEntry { id, name, url };
            next.media.push(entry.clone());
            Transition::new(next).effect(Effect::InsertMedia(entry))
        }
        Action::Update { id, name, url } => {
            let (name, url) = validate_entry(&name, &url)?;
            match next.media.iter_mut().find(|m| m.id == id) {
                Some(entry) => {
                    entry.name = name;
                    entry.url = url;
                    let updated = entry.clone();
                    Transition::new(next).effect(Effect::UpdateMedia(updated))
                }
                None => to_dashboard(next, Notice::MediaNotFound(id)),
            }
        }
        Action::Delete(id) => {
            if !next.contains(&id) {
                return Ok(Transition::new(next));
            }
            next.media.retain(|m| m.id != id);
            if next.view.active_media_id.as_ref() == Some(&id) {
                next.view.active_media_id = None;
                next.view.current_view = View::Dashboard;
            }
            Transition::new(next)
                .effect(Effect::DeleteMedia(id.clone()))
                .effect(Effect::DeleteAnalysis(id))
        }
        Action::Open(id) => activate(next, id, View::Detail),
        Action::ShowResults(id) => activate(next, id, View::Results),
        Action::OpenDetails => switch_active(next, View::Detail),
        Action::ViewResults => switch_active(next, View::Results),
        Action::Back => {
            next.view.current_view = View::Dashboard;
            Transition::new(next)
        }
        Action::Process(id) => match next.get(&id).map(|m| m.url.clone()) {
            Some(url) => Transition::new(next).effect(Effect::Analyze { id, url }),
            None => to_dashboard(next, Notice::MediaNotFound(id)),
        },
        Action::Processed(result) => {
            if next.contains(&result.media_id) {
                Transition::new(next).effect(Effect::UpsertAnalysis(result))
            } else {
                let id = result.media_id;
                to_dashboard(next, Notice::MediaNotFound(id))
            }
        }
        Action::Reconcile => reconcile(next),
    };
    Ok(t)
}

/// Installs the rows of the remote load. Entries the user added before the
/// load finished stay at the end.
pub fn merge_loaded(mut session: Session, rows: Vec<MediaEntry>) -> Session {
    let pending: Vec<MediaEntry> = session
        .media
        .drain(..)
        .filter(|m| !rows.iter().any(|r| r.id == m.id))
        .collect();
    session.media = rows;
    session.media.extend(pending);
    session
}

/// Forces the dashboard when a non-dashboard view has no live active entry.
pub fn reconcile(mut session: Session) -> Transition {
    if session.view.current_view == View::Dashboard {
        return Transition::new(session);
    }
    match session.view.active_media_id.clone() {
        Some(id) if session.contains(&id) => Transition::new(session),
        Some(id) => to_dashboard(session, Notice::MediaNotFound(id)),
        None => {
            session.view.current_view = View::Dashboard;
            Transition::new(session).notice(Notice::NoActiveMedia)
        }
    }
}

fn activate(mut session: Session, id: MediaId, view: View) -> Transition {
    if !session.contains(&id) {
        return to_dashboard(session, Notice::MediaNotFound(id));
    }
    session.view.active_media_id = Some(id);
    session.view.current_view = view;
    Transition::new(session)
}

fn switch_active(session: Session, view: View) -> Transition {
    match session.view.active_media_id.clone() {
        Some(id) => activate(session, id, view),
        None => {
            let mut session = session;
            session.view.current_view = View::Dashboard;
            Transition::new(session).notice(Notice::NoActiveMedia)
        }
    }
}

fn to_dashboard(mut session: Session, notice: Notice) -> Transition {
    session.view.current_view = View::Dashboard;
    session.view.active_media_id = None;
    Transition::new(session).notice(notice)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AnalysisResult;

    fn add(session: &Session, id: &str, name: &str) -> Session {
        reduce(
            session,
            Action::Add { id: id.into(), name: name.into(), url: format!("https://x.com/{id}") },
        )
        .unwrap()
        .session
    }

    fn with_two() -> Session {
        let s = add(&Session::default(), "a", "First");
        add(&s, "b", "Second")
    }

    #[test]
    fn initial_state_is_unloaded_dashboard() {
        let s = Session::default();
        assert_eq!(s.view.current_view, View::Dashboard);
        assert!(s.view.active_media_id.is_none());
        assert!(!s.view.registry_loaded);
        assert!(s.media.is_empty());
    }

    #[test]
    fn load_is_requested_once() {
        let t = reduce(&Session::default(), Action::Load).unwrap();
        assert_eq!(t.effects, vec![Effect::LoadMedia]);
        assert!(t.session.view.registry_loaded);

        let again = reduce(&t.session, Action::Load).unwrap();
        assert!(again.effects.is_empty());
        assert_eq!(again.session, t.session);
    }

    #[test]
    fn loaded_rows_come_first_and_keep_pending_entries() {
        let s = add(&Session::default(), "local", "Local");
        let rows = vec![MediaEntry {
            id: "remote".into(),
            name: "Remote".into(),
            url: "https://x.com/r".into(),
        }];
        let merged = merge_loaded(s, rows);
        let ids: Vec<&str> = merged.media.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["remote", "local"]);
    }

    #[test]
    fn add_appends_trimmed_entry_and_requests_insert() {
        let t = reduce(
            &Session::default(),
            Action::Add { id: "a".into(), name: "  Talk ".into(), url: " https://x.com/a ".into() },
        )
        .unwrap();
        let entry = MediaEntry { id: "a".into(), name: "Talk".into(), url: "https://x.com/a".into() };
        assert_eq!(t.session.media, vec![entry.clone()]);
        assert_eq!(t.effects, vec![Effect::InsertMedia(entry)]);
    }

    #[test]
    fn invalid_add_is_rejected() {
        let s = Session::default();
        let blank = reduce(&s, Action::Add { id: "a".into(), name: "".into(), url: "https://x.com".into() });
        assert_eq!(blank.unwrap_err(), ValidationError::BlankName);
        let bad_url = reduce(&s, Action::Add { id: "a".into(), name: "Name".into(), url: "not-a-url".into() });
        assert!(matches!(bad_url.unwrap_err(), ValidationError::InvalidUrl(_)));
    }

    #[test]
    fn update_mutates_in_place() {
        let s = with_two();
        let t = reduce(
            &s,
            Action::Update { id: "b".into(), name: "Renamed".into(), url: "https://y.com/b".into() },
        )
        .unwrap();
        assert_eq!(t.session.media[1].name, "Renamed");
        assert_eq!(t.session.media[1].url, "https://y.com/b");
        assert_eq!(t.session.media[0], s.media[0]);
        assert_eq!(t.effects.len(), 1);
        assert!(t.effects[0].is_store_write());
    }

    #[test]
    fn update_of_missing_entry_returns_to_dashboard() {
        let s = reduce(&with_two(), Action::Open("a".into())).unwrap().session;
        let t = reduce(
            &s,
            Action::Update { id: "zzz".into(), name: "X".into(), url: "https://x.com".into() },
        )
        .unwrap();
        assert!(t.effects.is_empty());
        assert_eq!(t.session.view.current_view, View::Dashboard);
        assert_eq!(t.notices, vec![Notice::MediaNotFound("zzz".into())]);
    }

    #[test]
    fn delete_cascades_and_clears_active_entry() {
        let s = reduce(&with_two(), Action::Open("a".into())).unwrap().session;
        let t = reduce(&s, Action::Delete("a".into())).unwrap();
        assert_eq!(t.session.media.len(), 1);
        assert_eq!(t.session.view.current_view, View::Dashboard);
        assert!(t.session.view.active_media_id.is_none());
        assert_eq!(
            t.effects,
            vec![Effect::DeleteMedia("a".into()), Effect::DeleteAnalysis("a".into())]
        );
    }

    #[test]
    fn delete_of_unknown_id_is_noop() {
        let s = with_two();
        let t = reduce(&s, Action::Delete("nope".into())).unwrap();
        assert_eq!(t.session, s);
        assert!(t.effects.is_empty());
    }

    #[test]
    fn navigation_follows_state_machine() {
        let s = with_two();
        let detail = reduce(&s, Action::Open("b".into())).unwrap().session;
        assert_eq!(detail.view.current_view, View::Detail);
        assert_eq!(detail.view.active_media_id, Some("b".into()));

        let results = reduce(&detail, Action::ViewResults).unwrap().session;
        assert_eq!(results.view.current_view, View::Results);
        assert_eq!(results.view.active_media_id, Some("b".into()));

        let back_to_detail = reduce(&results, Action::OpenDetails).unwrap().session;
        assert_eq!(back_to_detail.view.current_view, View::Detail);

        let dash = reduce(&back_to_detail, Action::Back).unwrap().session;
        assert_eq!(dash.view.current_view, View::Dashboard);

        let direct = reduce(&dash, Action::ShowResults("a".into())).unwrap().session;
        assert_eq!(direct.view.current_view, View::Results);
        assert_eq!(direct.view.active_media_id, Some("a".into()));
    }

    #[test]
    fn opening_missing_entry_stays_on_dashboard() {
        let t = reduce(&with_two(), Action::Open("ghost".into())).unwrap();
        assert_eq!(t.session.view.current_view, View::Dashboard);
        assert!(t.session.view.active_media_id.is_none());
        assert_eq!(t.notices, vec![Notice::MediaNotFound("ghost".into())]);
    }

    #[test]
    fn switching_without_active_entry_falls_back() {
        let t = reduce(&with_two(), Action::ViewResults).unwrap();
        assert_eq!(t.session.view.current_view, View::Dashboard);
        assert_eq!(t.notices, vec![Notice::NoActiveMedia]);
    }

    #[test]
    fn reconcile_drops_dangling_active_entry() {
        let mut s = reduce(&with_two(), Action::Open("a".into())).unwrap().session;
        // entry vanished without going through Delete
        s.media.retain(|m| m.id.as_str() != "a");
        let t = reduce(&s, Action::Reconcile).unwrap();
        assert_eq!(t.session.view.current_view, View::Dashboard);
        assert!(t.session.view.active_media_id.is_none());
        assert_eq!(t.notices, vec![Notice::MediaNotFound("a".into())]);

        let steady = reduce(&t.session, Action::Reconcile).unwrap();
        assert!(steady.notices.is_empty());
    }

    #[test]
    fn process_requests_analysis_of_entry_url() {
        let t = reduce(&with_two(), Action::Process("a".into())).unwrap();
        assert_eq!(
            t.effects,
            vec![Effect::Analyze { id: "a".into(), url: "https://x.com/a".into() }]
        );
        assert!(!t.effects[0].is_store_write());
    }

    #[test]
    fn processed_result_is_upserted_only_for_live_entries() {
        let s = with_two();
        let t = reduce(&s, Action::Processed(AnalysisResult::empty("a".into()))).unwrap();
        assert_eq!(t.effects, vec![Effect::UpsertAnalysis(AnalysisResult::empty("a".into()))]);

        let gone = reduce(&s, Action::Processed(AnalysisResult::empty("x".into()))).unwrap();
        assert!(gone.effects.is_empty());
    }
}
