use thiserror::Error;

use crate::model::{MediaEntry, MediaId};
use crate::session::View;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("unknown command {0:?} on the {1} view, type `help`")]
    Unknown(String, &'static str),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("no media matches {0:?}")]
    NoMatch(String),
    #[error("{0:?} matches more than one media id")]
    Ambiguous(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add { url: String, name: String },
    Open(String),
    Delete(String),
    Results(String),
    Health,
    Reload,
    Rename(String),
    SetUrl(String),
    Process,
    /// Explicit job id, or the one queued for the active entry.
    Job(Option<String>),
    ShowResults,
    Details,
    Back,
    Help,
    Quit,
}

/// Parses one prompt line for the given view. Blank lines yield `None`.
pub fn parse(view: View, line: &str) -> Result<Option<Command>, InputError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((w, r)) => (w, r.trim()),
        None => (line, ""),
    };
    let word = word.to_ascii_lowercase();

    let cmd = match (view, word.as_str()) {
        (_, "help" | "?") => Command::Help,
        (_, "quit" | "exit" | "q") => Command::Quit,
        (View::Detail | View::Results, "back") => Command::Back,

        (View::Dashboard, "add") => {
            let (url, name) = rest
                .split_once(char::is_whitespace)
                .ok_or(InputError::Usage("add <url> <name...>"))?;
            Command::Add { url: url.to_string(), name: name.trim().to_string() }
        }
        (View::Dashboard, "open") => Command::Open(required(rest, "open <n|id>")?),
        (View::Dashboard, "delete" | "rm") => Command::Delete(required(rest, "delete <n|id>")?),
        (View::Dashboard, "results") => Command::Results(required(rest, "results <n|id>")?),
        (View::Dashboard, "health") => Command::Health,
        (View::Dashboard, "reload") => Command::Reload,

        (View::Detail, "name") => Command::Rename(required(rest, "name <new name>")?),
        (View::Detail, "url") => Command::SetUrl(required(rest, "url <new url>")?),
        (View::Detail, "process") => Command::Process,
        (View::Detail, "job") => Command::Job(Some(rest.to_string()).filter(|r| !r.is_empty())),
        (View::Detail, "results") => Command::ShowResults,

        (View::Results, "details") => Command::Details,

        _ => return Err(InputError::Unknown(word, view.name())),
    };
    Ok(Some(cmd))
}

fn required(rest: &str, usage: &'static str) -> Result<String, InputError> {
    if rest.is_empty() {
        Err(InputError::Usage(usage))
    } else {
        Ok(rest.to_string())
    }
}

/// Resolves a dashboard selector: a 1-based row number, an exact id, or a
/// unique id prefix.
pub fn resolve(entries: &[MediaEntry], selector: &str) -> Result<MediaId, InputError> {
    if let Ok(n) = selector.parse::<usize>() {
        if let Some(entry) = n.checked_sub(1).and_then(|i| entries.get(i)) {
            return Ok(entry.id.clone());
        }
    }
    if let Some(entry) = entries.iter().find(|e| e.id.as_str() == selector) {
        return Ok(entry.id.clone());
    }
    let mut hits = entries.iter().filter(|e| e.id.as_str().starts_with(selector));
    match (hits.next(), hits.next()) {
        (Some(entry), None) => Ok(entry.id.clone()),
        (Some(_), Some(_)) => Err(InputError::Ambiguous(selector.to_string())),
        _ => Err(InputError::NoMatch(selector.to_string())),
    }
}

pub fn help(view: View) -> &'static str {
    match view {
        View::Dashboard => {
            "commands:\n  add <url> <name...>   add a media entry\n  open <n|id>           show details\n  delete <n|id>         delete an entry and its results\n  results <n|id>        show saved results\n  health                check the analysis service\n  reload                start a fresh session from the store\n  quit"
        }
        View::Detail => {
            "commands:\n  name <new name>       rename this entry\n  url <new url>         change the media URL\n  process               run the analysis\n  job [id]              check a queued processing job\n  results               show saved results\n  back                  return to the dashboard\n  quit"
        }
        View::Results => {
            "commands:\n  details               open the details view\n  back                  return to the dashboard\n  quit"
        }
    }
}
