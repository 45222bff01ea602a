use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Media;

#[derive(Copy, Clone, Debug)]
pub enum Phase { Load, Insert, Update, Delete }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str {
        match self { Phase::Load => "load", Phase::Insert => "insert", Phase::Update => "update", Phase::Delete => "delete" }
    }
    fn span(&self) -> Span {
        match self { Phase::Load => info_span!("load"), Phase::Insert => info_span!("insert"), Phase::Update => info_span!("update"), Phase::Delete => info_span!("delete") }
    }
}

impl OpMarker for Media {
    const NAME: &'static str = "media";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("media") }
}
