// Ranking pipeline: sources -> consensus -> points -> ADP -> VORP -> tiers
// -> draft priority -> boards.
//
// `rank_players` is the pure in-memory run; `load_inputs` and `run` add the
// file plumbing around it.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::{self, Config, ConfigError, ConsensusConfig};
use crate::position::Position;
use crate::valuation::adp::{join_adp, matcher_for, DraftValue};
use crate::valuation::boards::{build_boards, build_summary, DraftSummary, PositionBoard};
use crate::valuation::consensus::merge_sources;
use crate::valuation::priority::apply_draft_priority;
use crate::valuation::projections::{load_table, SourceTable};
use crate::valuation::schema::{normalize_adp, normalize_projections, AdpEntry, SchemaKind};
use crate::valuation::scoring::{score_table, PlayerValuation};
use crate::valuation::tiers::assign_tiers;
use crate::valuation::vorp::apply_vorp;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("no projection source could be loaded ({})", failures.join("; "))]
    NoSources { failures: Vec<String> },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

// ---------------------------------------------------------------------------
// Inputs and outputs
// ---------------------------------------------------------------------------

/// Normalized tables for one run.
#[derive(Debug, Clone, Default)]
pub struct PipelineInput {
    pub sources: Vec<SourceTable>,
    pub idp: Option<SourceTable>,
    pub adp: Vec<AdpEntry>,
}

/// Everything one ranking run produces.
#[derive(Debug, Clone)]
pub struct RankingReport {
    pub generated_at: DateTime<Utc>,
    pub profile: String,
    pub strategy: Option<String>,
    /// Sorted by draft rank.
    pub players: Vec<PlayerValuation>,
    /// Replacement-level points per position.
    pub baselines: BTreeMap<Position, f64>,
    pub boards: Vec<PositionBoard>,
    pub summary: DraftSummary,
    pub sources_used: Vec<String>,
}

// ---------------------------------------------------------------------------
// In-memory run
// ---------------------------------------------------------------------------

/// Rank a pool from already-normalized inputs.
pub fn rank_players(
    input: &PipelineInput,
    config: &Config,
    now: DateTime<Utc>,
) -> Result<RankingReport, PipelineError> {
    if input.sources.is_empty() {
        return Err(PipelineError::NoSources {
            failures: vec!["no sources supplied".into()],
        });
    }

    let matcher = matcher_for(config.consensus.name_matching);
    let consensus = merge_sources(&input.sources, &config.consensus, matcher.as_ref());
    let mut pool = score_table(&consensus, &config.scoring.offense, SchemaKind::Offense);

    if config.league.use_idp {
        if let Some(idp) = &input.idp {
            let single = ConsensusConfig {
                min_sources: 1,
                outlier_threshold: None,
                ..config.consensus.clone()
            };
            let merged = merge_sources(std::slice::from_ref(idp), &single, matcher.as_ref());
            let scored = score_table(&merged, &config.scoring.idp, SchemaKind::Idp);
            info!("appending {} IDP players", scored.len());
            pool.extend(scored);
        }
    }

    join_adp(&mut pool, &input.adp, config.consensus.name_matching);
    let baselines = apply_vorp(&mut pool, &config.league);

    rank_by_points(&mut pool, config.tiers.flex_gap());
    apply_draft_priority(&mut pool, &config.strategy, config.league.superflex);

    let boards = build_boards(&pool, &config.tiers);
    let summary = build_summary(&boards, &pool, config.league.superflex);

    info!(
        "ranked {} players ({} boards, {} value picks)",
        pool.len(),
        boards.len(),
        summary.value_picks.len()
    );

    Ok(RankingReport {
        generated_at: now,
        profile: config.profile_name.clone(),
        strategy: config.strategy_name.clone(),
        players: pool,
        baselines,
        boards,
        summary,
        sources_used: input.sources.iter().map(|s| s.source.clone()).collect(),
    })
}

/// Sort by points, then set rank, overall tier, ADP_Diff and Draft_Value.
fn rank_by_points(pool: &mut [PlayerValuation], flex_gap: f64) {
    pool.sort_by(|a, b| b.points.total_cmp(&a.points));
    let points: Vec<f64> = pool.iter().map(|p| p.points).collect();
    let tiers = assign_tiers(&points, flex_gap);
    for (i, (p, tier)) in pool.iter_mut().zip(tiers).enumerate() {
        p.rank = i + 1;
        p.tier = tier;
        p.adp_diff = p.rank as f64 - p.adp;
        p.draft_value = DraftValue::from_adp_diff(p.adp_diff);
    }
}

// ---------------------------------------------------------------------------
// File-backed run
// ---------------------------------------------------------------------------

/// Load and normalize every configured input.
///
/// A source that cannot be read or has no player column is logged and
/// skipped; the run fails only when none survive. Missing ADP or IDP files
/// degrade to no ADP / no IDP.
pub fn load_inputs(config: &Config) -> Result<PipelineInput, PipelineError> {
    let mut sources = Vec::new();
    let mut failures = Vec::new();

    for src in &config.paths.sources {
        let path = config.resolve(&src.path);
        let table = match load_table(&path) {
            Ok(t) => t,
            Err(e) => {
                warn!("skipping source {}: {}", src.name, e);
                failures.push(format!("{}: {}", src.name, e));
                continue;
            }
        };
        match normalize_projections(&table, SchemaKind::Offense, &src.name, src.weight) {
            Ok(t) => {
                info!(
                    "source {} loaded: {} players (weight {})",
                    src.name,
                    t.records.len(),
                    src.weight
                );
                sources.push(t);
            }
            Err(e) => {
                warn!("skipping source {}: {}", src.name, e);
                failures.push(e.to_string());
            }
        }
    }

    if sources.is_empty() {
        return Err(PipelineError::NoSources { failures });
    }

    let adp = match &config.paths.adp {
        Some(p) => load_adp(&config.resolve(p)),
        None => Vec::new(),
    };

    let idp = match (&config.paths.idp, config.league.use_idp) {
        (Some(p), true) => load_idp(&config.resolve(p)),
        _ => None,
    };

    Ok(PipelineInput { sources, idp, adp })
}

fn load_adp(path: &Path) -> Vec<AdpEntry> {
    let result = load_table(path)
        .map_err(|e| e.to_string())
        .and_then(|t| normalize_adp(&t, "adp").map_err(|e| e.to_string()));
    match result {
        Ok(entries) => {
            info!("loaded {} ADP rows from {}", entries.len(), path.display());
            entries
        }
        Err(e) => {
            warn!("ADP unavailable, every player gets 999: {}", e);
            Vec::new()
        }
    }
}

fn load_idp(path: &Path) -> Option<SourceTable> {
    let result = load_table(path)
        .map_err(|e| e.to_string())
        .and_then(|t| normalize_projections(&t, SchemaKind::Idp, "idp", 1.0).map_err(|e| e.to_string()));
    match result {
        Ok(t) => Some(t),
        Err(e) => {
            warn!("IDP projections unavailable: {}", e);
            None
        }
    }
}

/// Load inputs for `config` and rank them now.
pub fn run(config: &Config) -> Result<RankingReport, PipelineError> {
    let input = load_inputs(config)?;
    rank_players(&input, config, Utc::now())
}

/// Load config from `base_dir` (copying defaults first) and run it.
pub fn run_from_dir(
    base_dir: &Path,
    profile: Option<&str>,
    strategy: Option<&str>,
) -> Result<RankingReport, PipelineError> {
    config::ensure_config_files(base_dir)?;
    let config = config::load_config_from(base_dir, profile, strategy)?;
    run(&config)
}
