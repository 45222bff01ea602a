use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use dotenvy::dotenv;

mod config;
mod controller;
mod error;
mod integration;
mod model;
mod output;
mod session;
mod store;
mod telemetry;
mod ui;
mod validate;

use config::AppConfig;
use controller::Controller;
use integration::HttpAnalyzer;
use output::config::OutputConfig;
use output::Emitter;

#[derive(Parser)]
#[command(name = "echostream", about = "EchoStream media insights dashboard")]
struct Cli {
    /// Postgres DSN; stores media directly instead of through the Supabase REST API
    #[arg(short, long)]
    dsn: Option<String>,
    /// Emit one JSON envelope per rendered view to stdout; logs go to stderr
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let cli = Cli::parse();

    // stderr only. Respect RUST_LOG and ECHO_LOG_FORMAT
    telemetry::config::init_tracing();

    let cfg = AppConfig::from_env().with_dsn(cli.dsn);
    let store = cfg.store_connector()?;
    let analyzer = Arc::new(HttpAnalyzer::new(cfg.analyzer_config())?);
    let emitter = Emitter::from_config(OutputConfig::from_env().with_json_flag(cli.json));

    ui::run(Controller::new(store, analyzer), emitter).await
}
