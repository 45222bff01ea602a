use std::io::{self, Write};

use super::config::{OutputConfig, OutputFormat};
use super::types::{Envelope, Frame, Message, Screen};
use crate::model::{Insights, MediaEntry};

const URL_PREVIEW_CHARS: usize = 50;
const RULE: &str = "────────────────────────────────────────";

pub trait Presenter: Send + Sync {
    fn emit(&self, env: &Envelope, w: &mut dyn Write) -> io::Result<()>;
}

pub struct JsonPresenter {
    pub pretty: bool,
}

impl Presenter for JsonPresenter {
    fn emit(&self, env: &Envelope, w: &mut dyn Write) -> io::Result<()> {
        if self.pretty {
            serde_json::to_writer_pretty(&mut *w, env).map_err(to_io)?;
        } else {
            serde_json::to_writer(&mut *w, env).map_err(to_io)?;
        }
        writeln!(w)
    }
}

pub struct TextPresenter;

impl Presenter for TextPresenter {
    fn emit(&self, env: &Envelope, w: &mut dyn Write) -> io::Result<()> {
        for message in env.messages {
            write_message(w, message)?;
        }
        if !env.messages.is_empty() {
            writeln!(w)?;
        }
        match env.screen {
            Screen::Dashboard { entries } => write_dashboard(w, entries),
            Screen::Detail { entry, analysis } => {
                write_entry_header(w, "🎬", &entry.name, entry)?;
                writeln!(w, "⚙️  Process Media: `process` runs the analysis for this URL")?;
                if let Some(payload) = analysis {
                    writeln!(w, "{RULE}")?;
                    if let Some(job) = &payload.job_id {
                        writeln!(w, "⏳ Queued for processing (job {job}). Use `job` to check on it.")?;
                    } else {
                        write_insights(w, &payload.insights)?;
                    }
                }
                writeln!(w, "{RULE}")
            }
            Screen::Results { entry, result } => {
                write_entry_header(w, "📊", &format!("Results: {}", entry.name), entry)?;
                match result {
                    Some(row) => write_insights(w, &row.insights)?,
                    None => writeln!(
                        w,
                        "ℹ️ No saved results yet for this media. Process it first from the Details page."
                    )?,
                }
                writeln!(w, "{RULE}")
            }
        }
    }
}

fn write_message(w: &mut dyn Write, message: &Message) -> io::Result<()> {
    let (Message::Info(text) | Message::Success(text) | Message::Warning(text) | Message::Error(text)) =
        message;
    writeln!(w, "{text}")
}

fn write_dashboard(w: &mut dyn Write, entries: &[MediaEntry]) -> io::Result<()> {
    writeln!(w, "🎬 EchoStream AI")?;
    writeln!(w, "Manage and process your media files with AI-powered insights")?;
    writeln!(w, "{RULE}")?;
    writeln!(w, "📻 Your Media Files")?;
    if entries.is_empty() {
        writeln!(
            w,
            "🎯 No media files yet! Use `add <url> <name>` to add your first media file."
        )?;
        return Ok(());
    }
    for (i, entry) in entries.iter().enumerate() {
        writeln!(w, "{:>3}. 🌐 {}", i + 1, entry.name)?;
        writeln!(w, "     🔗 URL: {}", preview_url(&entry.url))?;
        writeln!(w, "     id: {}", entry.id)?;
    }
    Ok(())
}

fn write_entry_header(
    w: &mut dyn Write,
    icon: &str,
    title: &str,
    entry: &MediaEntry,
) -> io::Result<()> {
    writeln!(w, "{icon} {title}")?;
    writeln!(w, "🔗 {}", entry.url)?;
    writeln!(w, "{RULE}")
}

fn write_insights(w: &mut dyn Write, insights: &Insights) -> io::Result<()> {
    writeln!(w, "📝 Summary")?;
    if insights.summary.is_empty() {
        writeln!(w, "No summary available")?;
    } else {
        writeln!(w, "> {}", insights.summary)?;
    }

    writeln!(w)?;
    writeln!(w, "🏷️ Topics")?;
    if insights.topics.is_empty() {
        writeln!(w, "No topics identified")?;
    }
    for (i, topic) in insights.topics.iter().enumerate() {
        writeln!(w, "{}. {topic}", i + 1)?;
    }

    writeln!(w)?;
    writeln!(w, "📋 Action Items")?;
    if insights.action_items.is_empty() {
        writeln!(w, "No action items identified")?;
    }
    for (i, item) in insights.action_items.iter().enumerate() {
        writeln!(w, "- [ ] {}. {item}", i + 1)?;
    }

    writeln!(w)?;
    writeln!(w, "🎭 Sentiment")?;
    let sentiment = &insights.sentiment;
    if sentiment.is_empty() {
        writeln!(w, "No sentiment available")
    } else {
        let label = if sentiment.label.is_empty() { "neutral" } else { &sentiment.label };
        writeln!(
            w,
            "{} Overall Sentiment: {} (Score: {:.2})",
            sentiment.emoji(),
            title_case(label),
            sentiment.score
        )
    }
}

pub(crate) fn preview_url(url: &str) -> String {
    if url.chars().count() > URL_PREVIEW_CHARS {
        let head: String = url.chars().take(URL_PREVIEW_CHARS).collect();
        format!("{head}...")
    } else {
        url.to_string()
    }
}

fn title_case(s: &str) -> String {
    s.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

pub struct Emitter {
    format: OutputFormat,
    presenter: Box<dyn Presenter>,
}

impl Emitter {
    pub fn from_config(cfg: OutputConfig) -> Self {
        let presenter: Box<dyn Presenter> = match cfg.format {
            OutputFormat::Json => Box::new(JsonPresenter { pretty: cfg.pretty }),
            OutputFormat::Text => Box::new(TextPresenter),
        };
        Emitter { format: cfg.format, presenter }
    }

    /// Progress lines and prompts only make sense for a human reader.
    pub fn is_text(&self) -> bool {
        self.format == OutputFormat::Text
    }

    pub fn emit(&self, frame: &Frame) -> io::Result<()> {
        let mut out = io::stdout();
        self.presenter.emit(&Envelope::frame(frame), &mut out)?;
        out.flush()
    }
}

fn to_io(e: serde_json::Error) -> io::Error {
    io::Error::new(io::ErrorKind::Other, e)
}
