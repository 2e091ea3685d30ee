//! convostat - compare message activity between conversation participants
//!
//! Reads chat export JSON files and prints per-participant activity by
//! hour-of-day, week, month or day as counts, shares or a pairwise
//! difference.

mod render;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use convostat_core::config::parse_timezone;
use convostat_core::ingest::load_files;
use convostat_core::{
    Analyzer, BucketKind, ChartRequest, Config, Metric, ViewKind, ZeroDenominatorPolicy,
};

#[derive(Parser, Debug)]
#[command(name = "convostat")]
#[command(about = "Compare message activity between conversation participants")]
#[command(version)]
struct Args {
    /// Chat export JSON file (repeat for conversations split across files)
    #[arg(short = 'f', long = "jsonfile", required = true)]
    jsonfiles: Vec<PathBuf>,

    /// Name of the other person, used in chart titles
    #[arg(short, long)]
    name: Option<String>,

    /// Write output to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Bucket kinds to chart: hour, week, month, day (repeatable)
    #[arg(short, long, default_value = "week")]
    bucket: Vec<String>,

    /// Metric to sum: messages, words, chars
    #[arg(short, long, default_value = "messages")]
    metric: String,

    /// Views to compute: counts, share, difference (repeatable)
    #[arg(short, long, default_value = "counts")]
    view: Vec<String>,

    /// Sender name pinned first in every output (overrides config)
    #[arg(long)]
    self_name: Option<String>,

    /// IANA time zone for bucketing (overrides config)
    #[arg(long)]
    timezone: Option<String>,

    /// Value for buckets with a zero denominator: zero or missing
    #[arg(long)]
    zero_denominator: Option<String>,

    /// Output format: text (default) or json
    #[arg(long, default_value = "text")]
    format: String,

    /// Hide crowded axis labels in text output
    #[arg(long)]
    thin_labels: bool,

    /// Config file path (default: ~/.config/convostat/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("failed to load configuration")?;

    let _log_guard = convostat_core::logging::init(&config.logging).ok();

    let analyzer = build_analyzer(&args, &config)?;
    let requests = build_requests(&args)?;

    let raw = load_files(&args.jsonfiles).context("failed to load chat exports")?;
    let report = analyzer
        .analyze(&raw, &requests)
        .context("failed to analyze conversation")?;

    for issue in &report.issues {
        tracing::warn!(index = issue.index, reason = %issue.reason, "Record skipped");
    }
    if !report.issues.is_empty() {
        eprintln!(
            "warning: skipped {} malformed record(s)",
            report.issues.len()
        );
    }

    let rendered = match args.format.as_str() {
        "json" => serde_json::to_string_pretty(&report)?,
        "text" => render::render_report(&report, args.name.as_deref(), args.thin_labels),
        other => anyhow::bail!("Unknown output format: {}. Use 'text' or 'json'", other),
    };

    match &args.output {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Saving in: {}", path.display());
        }
        None => print!("{}", rendered),
    }

    Ok(())
}

fn build_analyzer(args: &Args, config: &Config) -> Result<Analyzer> {
    let mut analyzer = Analyzer::from_config(config).context("invalid configuration")?;

    if let Some(tz) = &args.timezone {
        analyzer.timezone = parse_timezone(tz)?;
    }
    if let Some(name) = &args.self_name {
        analyzer = analyzer.with_self_name(name.clone());
    }
    if let Some(policy) = &args.zero_denominator {
        analyzer = analyzer.with_policy(policy.parse::<ZeroDenominatorPolicy>()?);
    }

    tracing::info!(
        timezone = %analyzer.timezone,
        self_name = ?analyzer.self_name,
        policy = analyzer.policy.as_str(),
        "Analyzer configured"
    );

    Ok(analyzer)
}

fn build_requests(args: &Args) -> Result<Vec<ChartRequest>> {
    let metric: Metric = args.metric.parse()?;

    let buckets = args
        .bucket
        .iter()
        .map(|b| b.parse::<BucketKind>())
        .collect::<convostat_core::Result<Vec<_>>>()?;
    let views = args
        .view
        .iter()
        .map(|v| v.parse::<ViewKind>())
        .collect::<convostat_core::Result<Vec<_>>>()?;

    Ok(buckets
        .iter()
        .flat_map(|&bucket| {
            views
                .iter()
                .map(move |&view| ChartRequest::new(bucket, metric, view))
        })
        .collect())
}
