use anyhow::Result;
use bedscraper::{config::PipelineConfig, report};
use std::env;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();
    info!("startup");

    // ─── 2) resolve configuration ────────────────────────────────────
    let args: Vec<String> = env::args().collect();
    let cfg = match args.len() {
        1 => PipelineConfig::default(),
        2 => PipelineConfig::load(&args[1])?,
        _ => {
            eprintln!("Usage: {} [CONFIG_JSON]", args[0]);
            std::process::exit(1);
        }
    };
    info!(source_url = %cfg.source_url, "configured");

    // ─── 3) run the pipeline ─────────────────────────────────────────
    let report_path = bedscraper::run(&cfg)?;

    // ─── 4) place the delivery copy ──────────────────────────────────
    let delivered = report::deliver(&report_path, &cfg.delivery_dir)?;
    info!(report = %delivered.display(), "report ready for download");
    Ok(())
}
