//! Interactive terminal front end: one prompt line per action, the current
//! view re-rendered after every command.

use std::io::Write;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::controller::Controller;
use crate::error::ProcessError;
use crate::output::types::Message;
use crate::output::Emitter;

pub mod input;
pub mod render;

use input::{Command, InputError};
use render::{notice_message, sync_warning};

pub async fn run(mut ctrl: Controller, emitter: Emitter) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut messages = Vec::new();
    let mut redraw = true;

    loop {
        if redraw {
            let frame = render::frame(&mut ctrl, std::mem::take(&mut messages)).await;
            emitter.emit(&frame)?;
        }
        let view = ctrl.session().view.current_view;
        if emitter.is_text() {
            print!("[{}]> ", view.name());
            std::io::stdout().flush()?;
        }

        let Some(line) = lines.next_line().await? else {
            break;
        };
        match input::parse(view, &line) {
            Ok(None) => redraw = false,
            Ok(Some(Command::Quit)) => break,
            Ok(Some(cmd)) => {
                messages = dispatch(&mut ctrl, cmd, emitter.is_text()).await;
                redraw = true;
            }
            Err(e) => {
                messages = vec![Message::Error(format!("❌ {e}"))];
                redraw = true;
            }
        }
    }
    tracing::debug!("session closed");
    Ok(())
}

/// Applies one command and returns the messages to show above the next screen.
async fn dispatch(ctrl: &mut Controller, cmd: Command, interactive: bool) -> Vec<Message> {
    let mut out = Vec::new();
    match cmd {
        Command::Add { url, name } => match ctrl.add(&name, &url).await {
            Ok(outcome) => {
                out.push(Message::Success(format!("✅ Media '{}' added successfully!", name.trim())));
                out.extend(sync_warning(&outcome.sync, "save to database"));
                out.extend(outcome.notices.iter().map(notice_message));
            }
            Err(e) => out.push(Message::Error(format!("❌ {e}"))),
        },
        Command::Open(sel) => match resolve(ctrl, &sel) {
            Ok(id) => out.extend(ctrl.open(&id).iter().map(notice_message)),
            Err(e) => out.push(Message::Error(format!("❌ {e}"))),
        },
        Command::Results(sel) => match resolve(ctrl, &sel) {
            Ok(id) => out.extend(ctrl.show_results(&id).iter().map(notice_message)),
            Err(e) => out.push(Message::Error(format!("❌ {e}"))),
        },
        Command::Delete(sel) => match resolve(ctrl, &sel) {
            Ok(id) => {
                let name = ctrl.session().get(&id).map(|m| m.name.clone()).unwrap_or_default();
                let outcome = ctrl.delete(&id).await;
                if outcome.value {
                    out.push(Message::Success(format!("🗑️ Media '{name}' deleted!")));
                }
                out.extend(sync_warning(&outcome.sync, "delete from database"));
                out.extend(outcome.notices.iter().map(notice_message));
            }
            Err(e) => out.push(Message::Error(format!("❌ {e}"))),
        },
        Command::Health => match ctrl.health().await {
            Ok(true) => out.push(Message::Success("✅ Analysis service is healthy".to_string())),
            Ok(false) => out.push(Message::Warning(
                "⚠️ Analysis service responded but did not report ok".to_string(),
            )),
            Err(e) => out.push(Message::Error(format!("❌ Health check failed: {e}"))),
        },
        Command::Reload => {
            ctrl.reset();
            out.push(Message::Info("🔄 Session reset, reloading media".to_string()));
        }
        Command::Rename(name) => edit_active(ctrl, &mut out, Some(name), None).await,
        Command::SetUrl(url) => edit_active(ctrl, &mut out, None, Some(url)).await,
        Command::Process => {
            let Some(entry) = ctrl.session().active().cloned() else {
                out.push(notice_message(&crate::session::Notice::NoActiveMedia));
                return out;
            };
            if interactive {
                println!("⏳ Processing {} ...", entry.url);
            }
            match ctrl.process_and_store(&entry.id).await {
                Ok(outcome) => {
                    if let Some(job) = &outcome.value.job_id {
                        out.push(Message::Info(format!("⏳ Processing queued as job {job}")));
                    } else {
                        out.push(Message::Success("✅ Processing complete!".to_string()));
                    }
                    out.extend(sync_warning(&outcome.sync, "save analysis"));
                    out.extend(outcome.notices.iter().map(notice_message));
                }
                Err(ProcessError::Integration(e)) => {
                    let detail = e.error_code().unwrap_or_else(|| e.to_string());
                    out.push(Message::Error(format!("❌ Processing failed: {detail}")));
                }
                Err(e) => out.push(Message::Error(format!("❌ Processing failed: {e}"))),
            }
        }
        Command::Job(job_id) => {
            let Some(entry) = ctrl.session().active().cloned() else {
                out.push(notice_message(&crate::session::Notice::NoActiveMedia));
                return out;
            };
            let Some(job_id) = job_id.or_else(|| ctrl.pending_job(&entry.id).map(str::to_string)) else {
                out.push(Message::Error(
                    "❌ No queued job for this media. Usage: job <id>".to_string(),
                ));
                return out;
            };
            match ctrl.check_job(&entry.id, &job_id).await {
                Ok(outcome) if outcome.value.is_completed() => {
                    out.push(Message::Success(format!("✅ Job {job_id} completed!")));
                    out.extend(sync_warning(&outcome.sync, "save analysis"));
                    out.extend(outcome.notices.iter().map(notice_message));
                }
                Ok(outcome) => out.push(Message::Info(format!(
                    "⏳ Job {job_id} is {}",
                    outcome.value.state
                ))),
                Err(ProcessError::Integration(e)) => {
                    let detail = e.error_code().unwrap_or_else(|| e.to_string());
                    out.push(Message::Error(format!("❌ Job lookup failed: {detail}")));
                }
                Err(e) => out.push(Message::Error(format!("❌ Job lookup failed: {e}"))),
            }
        }
        Command::ShowResults => out.extend(ctrl.view_results().iter().map(notice_message)),
        Command::Details => out.extend(ctrl.open_details().iter().map(notice_message)),
        Command::Back => out.extend(ctrl.back().iter().map(notice_message)),
        Command::Help => {
            out.push(Message::Info(input::help(ctrl.session().view.current_view).to_string()))
        }
        Command::Quit => {}
    }
    out
}

fn resolve(ctrl: &Controller, selector: &str) -> Result<crate::model::MediaId, InputError> {
    input::resolve(&ctrl.session().media, selector)
}

/// Inline edit of the active entry; the untouched field keeps its value.
async fn edit_active(
    ctrl: &mut Controller,
    out: &mut Vec<Message>,
    name: Option<String>,
    url: Option<String>,
) {
    let Some(entry) = ctrl.session().active().cloned() else {
        out.push(notice_message(&crate::session::Notice::NoActiveMedia));
        return;
    };
    let name = name.unwrap_or(entry.name);
    let url = url.unwrap_or(entry.url);
    match ctrl.update(&entry.id, &name, &url).await {
        Ok(outcome) => {
            out.push(Message::Success("✅ Media updated".to_string()));
            out.extend(sync_warning(&outcome.sync, "update database"));
            out.extend(outcome.notices.iter().map(notice_message));
        }
        Err(e) => out.push(Message::Error(format!("❌ {e}"))),
    }
}
