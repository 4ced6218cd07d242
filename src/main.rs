use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, Local, TimeZone, Utc};
use clap::{Parser, Subcommand};
use std::fmt::Display;
use std::path::PathBuf;

use wikistats::contrib::{filter_by_namespace, NamespaceFilter};
use wikistats::dataset::Dataset;
use wikistats::window::{resolve_reference, WindowScope};
use wikistats::{compute_snapshot, logging, namespace};

#[derive(Parser)]
#[command(name = "wikistats")]
#[command(about = "Wikipedia contribution statistics", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute a statistics snapshot from a stored dataset
    Snapshot(SnapshotArgs),
    /// List the standard namespace labels
    Namespaces,
}

#[derive(clap::Args)]
struct SnapshotArgs {
    /// Dataset JSON file (user profile and contributions)
    #[arg(long)]
    dataset: PathBuf,

    /// Analysis date (YYYY-MM-DD or "today"). Past dates are evaluated at 23:59:59.
    #[arg(long)]
    reference: Option<String>,

    /// Restrict contributions to a window: 2025, 2025-03, 2025-W12, 2025-03-15 or life
    #[arg(long)]
    window: Option<String>,

    /// Namespace id to keep, or "all"
    #[arg(long, default_value = "all")]
    namespace: NamespaceFilter,

    /// Fixed presentation offset such as +02:00 (defaults to the system time zone)
    #[arg(long, value_parser = parse_utc_offset)]
    utc_offset: Option<FixedOffset>,

    /// Keep only the first N entries of every ranking
    #[arg(long)]
    top: Option<usize>,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write logs to <dir>/wikistats.log instead of stderr
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Snapshot(args) => {
            logging::init_logging(args.log_dir.as_deref())?;
            match args.utc_offset {
                Some(offset) => run_snapshot(&args, Utc::now().with_timezone(&offset)),
                None => run_snapshot(&args, Local::now()),
            }
        }
        Commands::Namespaces => {
            for (id, label) in namespace::NAMESPACE_LABELS.iter().enumerate() {
                println!("{:>3}  {}", id, label);
            }
            Ok(())
        }
    }
}

fn run_snapshot<Tz>(args: &SnapshotArgs, now: DateTime<Tz>) -> Result<()>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let dataset = Dataset::load_from_file(&args.dataset)?;

    let mut contributions = dataset.contributions;
    if let Some(window) = &args.window {
        let scope = WindowScope::parse(window)?;
        contributions = scope.filter_records(&contributions);
        tracing::info!(
            "Window {} keeps {} contributions",
            scope.key,
            contributions.len()
        );
    }
    if args.namespace != NamespaceFilter::All {
        contributions = filter_by_namespace(&contributions, args.namespace);
    }
    if contributions.is_empty() {
        tracing::warn!("No contributions left after filtering, snapshot will be empty");
    }

    let reference = resolve_reference(args.reference.as_deref(), now)?;
    let mut snapshot = compute_snapshot(&dataset.user, &contributions, &reference)
        .with_context(|| format!("Failed to compute snapshot for {}", dataset.user.name))?;

    if let Some(limit) = args.top {
        snapshot.truncate_rankings(limit);
    }

    let json = serde_json::to_string_pretty(&snapshot).context("Failed to serialize snapshot")?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write snapshot: {}", path.display()))?;
            eprintln!("Snapshot written to: {}", path.display());
        }
        None => println!("{}", json),
    }

    Ok(())
}

/// Parses "+HH:MM", "-HHMM", "Z" or "UTC".
fn parse_utc_offset(s: &str) -> Result<FixedOffset> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("z") || s.eq_ignore_ascii_case("utc") {
        return FixedOffset::east_opt(0).ok_or_else(|| anyhow::anyhow!("Invalid UTC offset"));
    }

    s.parse::<FixedOffset>()
        .map_err(|e| anyhow::anyhow!("Invalid UTC offset: '{}' ({}). Expected e.g. +02:00", s, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_utc_offset() {
        assert_eq!(parse_utc_offset("+02:00").unwrap().local_minus_utc(), 7200);
        assert_eq!(parse_utc_offset("-05:30").unwrap().local_minus_utc(), -19800);
        assert_eq!(parse_utc_offset("+0530").unwrap().local_minus_utc(), 19800);
        assert_eq!(parse_utc_offset("Z").unwrap().local_minus_utc(), 0);
        assert_eq!(parse_utc_offset(" utc ").unwrap().local_minus_utc(), 0);
        assert!(parse_utc_offset("02:00").is_err());
        assert!(parse_utc_offset("+25:00").is_err());
        assert!(parse_utc_offset("+02:75").is_err());
        assert!(parse_utc_offset("+3").is_err());
    }

    #[test]
    fn test_parse_utc_offset_rejects_huge_hours() {
        let result = std::panic::catch_unwind(|| parse_utc_offset("+9999999"));
        assert!(result.is_ok(), "offset parsing panicked");
        assert!(result.unwrap().is_err());
        assert!(parse_utc_offset("-99999999999:00").is_err());
    }
}
