use std::marker::PhantomData;
use tracing::{debug, error, info, warn, Span};

use super::ops::media::Media;
use super::ops::process::Process;

pub trait PhaseSpan {
    fn name(&self) -> &'static str;
    fn span(&self) -> Span;
}

pub trait OpMarker {
    const NAME: &'static str;
    type Phase: PhaseSpan;
    fn root_span() -> Span;
}

pub struct LogCtx<O: OpMarker> {
    json: bool,
    _marker: PhantomData<O>,
}

impl<O: OpMarker> LogCtx<O> {
    pub(crate) fn new(json: bool) -> Self { Self { json, _marker: PhantomData } }

    fn op_name(&self) -> &'static str { O::NAME }

    pub fn root_span(&self) -> Span { O::root_span() }

    pub fn root_span_kv<'a, T>(&self, fields: T) -> Span
    where
        T: IntoIterator<Item = (&'a str, String)>,
    {
        let span = self.root_span();
        let details = kv_to_string(fields);
        if details.is_empty() {
            debug!(op = %self.op_name(), "start");
        } else {
            debug!(op = %self.op_name(), details = %details, "start");
        }
        span
    }

    pub fn span(&self, ph: &O::Phase) -> Span {
        let span = ph.span();
        debug!(op = %self.op_name(), phase = ph.name(), "span_start");
        span
    }

    pub fn info_kv<'a, D>(&self, msg: &str, kv: D)
    where
        D: IntoIterator<Item = (&'a str, String)>,
    {
        if self.json { let details = kv_to_string(kv); info!(op = %self.op_name(), details = %details, "{}", msg); }
        else { info!("{}", msg); }
    }

    pub fn warn_kv<'a, D>(&self, msg: &str, kv: D)
    where
        D: IntoIterator<Item = (&'a str, String)>,
    {
        let details = kv_to_string(kv);
        if self.json { warn!(op = %self.op_name(), details = %details, "{}", msg); }
        else { warn!("{} ({})", msg, details); }
    }

    pub fn error_kv<'a, D>(&self, msg: &str, kv: D)
    where
        D: IntoIterator<Item = (&'a str, String)>,
    {
        let details = kv_to_string(kv);
        if self.json { error!(op = %self.op_name(), details = %details, "{}", msg); }
        else { error!("{} ({})", msg, details); }
    }
}

impl LogCtx<Media> {
    pub fn loaded(&self, count: usize) {
        if self.json { info!(op = %self.op_name(), count, "media_loaded"); }
        else { info!("📻 Loaded {} media entries", count); }
    }
}

impl LogCtx<Process> {
    pub fn insights_summary(&self, topics: usize, action_items: usize, sentiment: &str) {
        if self.json { info!(op = %self.op_name(), topics, action_items, sentiment, "insights"); }
        else { info!("✅ Processing complete: topics={} action_items={} sentiment={}", topics, action_items, sentiment); }
    }
}

fn kv_to_string<'a, T>(kv: T) -> String
where
    T: IntoIterator<Item = (&'a str, String)>,
{
    let mut parts: Vec<String> = Vec::new();
    for (k, v) in kv { parts.push(format!("{}={}", k, v)); }
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kv_pairs_join_with_spaces() {
        let s = kv_to_string([("id", "m1".to_string()), ("status", "ok".to_string())]);
        assert_eq!(s, "id=m1 status=ok");
        assert_eq!(kv_to_string(std::iter::empty::<(&str, String)>()), "");
    }

    #[test]
    fn op_names_are_stable() {
        assert_eq!(<Media as OpMarker>::NAME, "media");
        assert_eq!(<Process as OpMarker>::NAME, "process");
    }
}
