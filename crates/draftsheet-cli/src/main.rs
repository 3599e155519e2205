// Draft sheet entry point.
//
// Usage: draftsheet [--watch SECS] [PROFILE] [STRATEGY]
//
// Startup sequence:
// 1. Initialize tracing (log to file, not terminal)
// 2. Copy default config files, load the chosen profile and strategy
// 3. Run the ranking pipeline
// 4. Write CSV/JSON output and print the top of the board
// 5. With --watch, re-run whenever an input changes or the cache expires

use std::path::Path;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use tracing::{error, info};

use draftsheet_core::cache::RankingCache;
use draftsheet_core::config::{self, Config};
use draftsheet_core::export;
use draftsheet_core::pipeline::{self, RankingReport};

const PREVIEW_ROWS: usize = 25;

#[derive(Debug, Parser)]
#[command(name = "draftsheet")]
#[command(about = "Ranked fantasy football draft sheet from consensus projections")]
#[command(version)]
struct Args {
    /// League profile in config/profiles.toml (defaults to `default_profile`)
    profile: Option<String>,

    /// Draft strategy in config/strategy.toml
    strategy: Option<String>,

    /// Re-run every SECS seconds and re-export when the inputs change
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    watch: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 1. Initialize tracing (log to file, not terminal)
    init_tracing()?;
    info!("draftsheet starting up");

    // 2. Load config
    let config = config::load_config(args.profile.as_deref(), args.strategy.as_deref())
        .context("failed to load configuration")?;
    info!(
        "config loaded: profile={}, {} teams, superflex={}, idp={}, {} sources",
        config.profile_name,
        config.league.num_teams,
        config.league.superflex,
        config.league.use_idp,
        config.paths.sources.len()
    );

    let out_dir = config.resolve(&config.paths.output_dir);

    match args.watch {
        None => {
            // 3-4. Run once and export
            let report = pipeline::run(&config).context("ranking pipeline failed")?;
            publish(&report, &out_dir)?;
        }
        Some(secs) => watch(&config, &out_dir, secs)?,
    }

    info!("draftsheet finished");
    Ok(())
}

fn publish(report: &RankingReport, out_dir: &Path) -> anyhow::Result<()> {
    let files = export::write_all(report, out_dir)?;
    print_preview(report);
    println!();
    for f in files {
        println!("wrote {}", f.display());
    }
    Ok(())
}

/// Re-run on an interval, exporting only when the cache produced a new report.
fn watch(config: &Config, out_dir: &Path, secs: u64) -> anyhow::Result<()> {
    let cache = RankingCache::with_default_ttl(config.watched_files());
    let mut last: Option<Arc<RankingReport>> = None;

    loop {
        match cache.get_or_compute(Utc::now(), || pipeline::run(config)) {
            Ok(report) => {
                let fresh = last.as_ref().map_or(true, |prev| !Arc::ptr_eq(prev, &report));
                if fresh {
                    publish(&report, out_dir)?;
                    last = Some(report);
                }
            }
            Err(e) => {
                // Keep watching; the next change may fix the inputs.
                error!("ranking pipeline failed: {e}");
                eprintln!("ranking failed: {e}");
            }
        }
        std::thread::sleep(StdDuration::from_secs(secs));
    }
}

fn print_preview(report: &RankingReport) {
    println!(
        "{} ({}) generated {}",
        report.profile,
        report.strategy.as_deref().unwrap_or("default strategy"),
        report.generated_at.format("%Y-%m-%d %H:%M UTC")
    );
    println!(
        "{:>4}  {:<26} {:<4} {:<4} {:>7} {:>7} {:>6} {:>7}  {}",
        "Rank", "Player", "Pos", "Team", "Points", "VORP", "ADP", "Prio", "Value"
    );
    for p in report.players.iter().take(PREVIEW_ROWS) {
        let adp = if p.has_adp() {
            format!("{:.1}", p.adp)
        } else {
            "-".to_string()
        };
        println!(
            "{:>4}  {:<26} {:<4} {:<4} {:>7.1} {:>7.1} {:>6} {:>7.1}  {}",
            p.draft_rank,
            p.name,
            p.position.display_str(),
            p.team.as_deref().unwrap_or("-"),
            p.points,
            p.vorp,
            adp,
            p.draft_priority,
            p.draft_value.label()
        );
    }
    if !report.summary.value_picks.is_empty() {
        println!();
        println!("Value picks:");
        for v in &report.summary.value_picks {
            println!(
                "  #{:<4} {:<26} {:<3} ADP {:.1} (+{:.1})",
                v.draft_rank,
                v.name,
                v.position.display_str(),
                v.adp,
                v.adp_diff
            );
        }
    }
}

fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("draftsheet.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("draftsheet=info,draftsheet_core=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
