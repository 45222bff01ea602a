use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Process;

#[derive(Copy, Clone, Debug)]
pub enum Phase { Analyze, Poll, Persist }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str { match self { Phase::Analyze => "analyze", Phase::Poll => "poll", Phase::Persist => "persist" } }
    fn span(&self) -> Span { match self { Phase::Analyze => info_span!("analyze"), Phase::Poll => info_span!("poll"), Phase::Persist => info_span!("persist") } }
}

impl OpMarker for Process {
    const NAME: &'static str = "process";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("process") }
}
