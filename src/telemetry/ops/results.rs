use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Results;

#[derive(Copy, Clone, Debug)]
pub enum Phase { Fetch }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str { match self { Phase::Fetch => "fetch" } }
    fn span(&self) -> Span { match self { Phase::Fetch => info_span!("fetch") } }
}

impl OpMarker for Results {
    const NAME: &'static str = "results";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("results") }
}
