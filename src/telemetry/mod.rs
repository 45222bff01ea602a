pub mod config;
pub mod ctx;
pub mod ops;

use ctx::LogCtx;

// One typed context per operation family
pub fn media() -> LogCtx<ops::media::Media> { LogCtx::new(config::logs_are_json()) }
pub fn process() -> LogCtx<ops::process::Process> { LogCtx::new(config::logs_are_json()) }
pub fn results() -> LogCtx<ops::results::Results> { LogCtx::new(config::logs_are_json()) }
