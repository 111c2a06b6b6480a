use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use prayer_planner::{
    AnchorLoader, AppConfig, Schedule, SchedulePlanner, SheetDocument, SheetPublisher, export,
};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(name = "prayer-planner")]
#[command(about = "Plan daily sleep, nap and prayer blocks from a prayer-time table")]
struct Args {
    /// Anchor table to read (overrides `input.path`)
    #[arg(long)]
    input: Option<PathBuf>,

    /// Plan file to write (overrides `output.path`)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Publish the plan to the configured sheet endpoint
    #[arg(long)]
    publish: bool,

    /// Keep each day's own Fajr block instead of aligning to the consensus
    #[arg(long)]
    no_consensus: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(log_filter())
        .init();

    let mut config = AppConfig::load().context("Failed to load configuration")?;
    apply_overrides(&mut config, &args);
    config.validate().context("Invalid configuration")?;

    let report = AnchorLoader::new(&config.input).load_path(&config.input.path)?;
    if !report.rejected.is_empty() {
        tracing::warn!("{} input rows were skipped", report.rejected.len());
    }

    let planner = SchedulePlanner::new(&config);
    let schedule = planner.plan(&report.table);
    let summary = schedule.summary(&planner);
    tracing::info!(
        planned = summary.days_planned,
        rejected = summary.days_rejected,
        consensus = ?summary.consensus_minute.map(|m| m.to_string()),
        on_consensus = summary.days_on_consensus,
        on_fallback = summary.days_on_fallback,
        excluded_from_vote = summary.days_excluded_from_vote,
        sleep_truncated = summary.sleep_truncated,
        naps_truncated = summary.naps_truncated,
        jummah = summary.jummah_overrides,
        "Planning complete"
    );

    export::write_csv(&schedule, &config.output.path)?;

    if config.publish.enabled {
        let rt = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;
        rt.block_on(publish(&config, &schedule))?;
    }

    Ok(())
}

/// `RUST_LOG` when set, otherwise info with debug for this crate.
fn log_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter())
}

fn default_filter() -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(tracing::level_filters::LevelFilter::INFO.into())
        .parse_lossy("prayer_planner=debug")
}

fn apply_overrides(config: &mut AppConfig, args: &Args) {
    if let Some(input) = &args.input {
        config.input.path = input.clone();
    }
    if let Some(output) = &args.output {
        config.output.path = output.clone();
    }
    if args.publish {
        config.publish.enabled = true;
    }
    if args.no_consensus {
        config.fajr.consensus_enabled = false;
    }
}

async fn publish(config: &AppConfig, schedule: &Schedule) -> Result<()> {
    let url = config
        .publish
        .url
        .clone()
        .context("Publishing is enabled but publish.url is not set")?;
    let publisher = SheetPublisher::new(url, &config.network)?;
    let document = SheetDocument::from_schedule(&config.publish.title, schedule);

    let receipt = publisher
        .publish(&document)
        .await
        .context("Failed to publish plan")?;
    match receipt.url {
        Some(url) => tracing::info!("Published {} rows to {}", document.rows.len(), url),
        None => tracing::info!("Published {} rows", document.rows.len()),
    }
    Ok(())
}
