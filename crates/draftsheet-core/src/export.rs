// CSV and JSON output for a ranking report.
//
// Writers take any `io::Write` so tests can render to memory; `write_all`
// lays the full set of files out under an output directory.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Serialize;
use tracing::info;

use crate::pipeline::RankingReport;
use crate::valuation::boards::{DraftSummary, PositionBoard};
use crate::valuation::scoring::PlayerValuation;

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

// ---------------------------------------------------------------------------
// Row shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct OverallRow<'a> {
    #[serde(rename = "Draft_Priority")]
    pub draft_priority: f64,
    #[serde(rename = "Draft_Rank")]
    pub draft_rank: usize,
    #[serde(rename = "Player")]
    pub player: &'a str,
    #[serde(rename = "Pos")]
    pub pos: &'static str,
    #[serde(rename = "Team")]
    pub team: &'a str,
    #[serde(rename = "Points")]
    pub points: f64,
    #[serde(rename = "VORP")]
    pub vorp: f64,
    #[serde(rename = "Tier")]
    pub tier: u32,
    #[serde(rename = "ADP")]
    pub adp: f64,
    #[serde(rename = "ADP_Diff")]
    pub adp_diff: f64,
    #[serde(rename = "Draft_Value")]
    pub draft_value: &'static str,
    #[serde(rename = "Rank")]
    pub rank: usize,
}

impl<'a> From<&'a PlayerValuation> for OverallRow<'a> {
    fn from(p: &'a PlayerValuation) -> Self {
        Self {
            draft_priority: round1(p.draft_priority),
            draft_rank: p.draft_rank,
            player: &p.name,
            pos: p.position.display_str(),
            team: p.team.as_deref().unwrap_or(""),
            points: round1(p.points),
            vorp: round1(p.vorp),
            tier: p.tier,
            adp: round1(p.adp),
            adp_diff: round1(p.adp_diff),
            draft_value: p.draft_value.label(),
            rank: p.rank,
        }
    }
}

/// Draft priority split into the terms that sum to it.
#[derive(Debug, Serialize)]
struct BreakdownRow<'a> {
    #[serde(rename = "Draft_Rank")]
    draft_rank: usize,
    #[serde(rename = "Player")]
    player: &'a str,
    #[serde(rename = "Pos")]
    pos: &'static str,
    #[serde(rename = "Talent")]
    talent: f64,
    #[serde(rename = "Round_Bonus")]
    round_bonus: f64,
    #[serde(rename = "Round_Tier")]
    round_tier: &'a str,
    #[serde(rename = "ADP_Adjustment")]
    adp_adjustment: f64,
    #[serde(rename = "Elite_Bonus")]
    elite_bonus: f64,
    #[serde(rename = "Value_Bonus")]
    value_bonus: f64,
    #[serde(rename = "Reach_Penalty")]
    reach_penalty: f64,
    #[serde(rename = "Draft_Priority")]
    draft_priority: f64,
}

#[derive(Debug, Serialize)]
struct BoardRow<'a> {
    #[serde(rename = "Pos_Rank")]
    pos_rank: usize,
    #[serde(rename = "Player")]
    player: &'a str,
    #[serde(rename = "Team")]
    team: &'a str,
    #[serde(rename = "Points")]
    points: f64,
    #[serde(rename = "VORP")]
    vorp: f64,
    #[serde(rename = "ADP")]
    adp: f64,
    #[serde(rename = "Next_Drop")]
    next_drop: f64,
    #[serde(rename = "Tier")]
    tier: u32,
    #[serde(rename = "Scarcity")]
    scarcity: &'static str,
    #[serde(rename = "Draft_Rank")]
    draft_rank: usize,
}

#[derive(Debug, Serialize)]
struct SummaryRow<'a> {
    #[serde(rename = "Pos")]
    pos: &'static str,
    #[serde(rename = "Tier1_Size")]
    tier1_size: usize,
    #[serde(rename = "Top12_Mean_VORP")]
    top_mean_vorp: f64,
    #[serde(rename = "Note")]
    note: &'a str,
}

#[derive(Debug, Serialize)]
struct ValuePickRow<'a> {
    #[serde(rename = "Player")]
    player: &'a str,
    #[serde(rename = "Pos")]
    pos: &'static str,
    #[serde(rename = "Draft_Rank")]
    draft_rank: usize,
    #[serde(rename = "ADP")]
    adp: f64,
    #[serde(rename = "ADP_Diff")]
    adp_diff: f64,
}

// ---------------------------------------------------------------------------
// CSV writers
// ---------------------------------------------------------------------------

/// Overall draft board, one row per player in the given order.
pub fn write_overall_csv<W: Write>(out: W, players: &[PlayerValuation]) -> Result<(), csv::Error> {
    let mut w = csv::Writer::from_writer(out);
    for p in players {
        w.serialize(OverallRow::from(p))?;
    }
    w.flush()?;
    Ok(())
}

/// Per-player priority components, in the given order.
pub fn write_breakdown_csv<W: Write>(out: W, players: &[PlayerValuation]) -> Result<(), csv::Error> {
    let mut w = csv::Writer::from_writer(out);
    for p in players {
        let b = &p.priority;
        w.serialize(BreakdownRow {
            draft_rank: p.draft_rank,
            player: &p.name,
            pos: p.position.display_str(),
            talent: round1(b.talent),
            round_bonus: round1(b.round_bonus),
            round_tier: b.round_tier.as_deref().unwrap_or(""),
            adp_adjustment: round1(b.adp_adjustment),
            elite_bonus: round1(b.elite_bonus),
            value_bonus: round1(b.value_bonus),
            reach_penalty: round1(b.reach_penalty),
            draft_priority: round1(p.draft_priority),
        })?;
    }
    w.flush()?;
    Ok(())
}

pub fn write_board_csv<W: Write>(out: W, board: &PositionBoard) -> Result<(), csv::Error> {
    let mut w = csv::Writer::from_writer(out);
    for e in &board.entries {
        w.serialize(BoardRow {
            pos_rank: e.pos_rank,
            player: &e.name,
            team: e.team.as_deref().unwrap_or(""),
            points: round1(e.points),
            vorp: round1(e.vorp),
            adp: round1(e.adp),
            next_drop: round1(e.next_drop),
            tier: e.tier,
            scarcity: e.scarcity.label(),
            draft_rank: e.draft_rank,
        })?;
    }
    w.flush()?;
    Ok(())
}

/// Per-position scarcity summary.
pub fn write_summary_csv<W: Write>(out: W, summary: &DraftSummary) -> Result<(), csv::Error> {
    let mut w = csv::Writer::from_writer(out);
    for s in &summary.positions {
        w.serialize(SummaryRow {
            pos: s.position.display_str(),
            tier1_size: s.tier1_size,
            top_mean_vorp: round1(s.top_mean_vorp),
            note: &s.note,
        })?;
    }
    w.flush()?;
    Ok(())
}

pub fn write_value_picks_csv<W: Write>(out: W, summary: &DraftSummary) -> Result<(), csv::Error> {
    let mut w = csv::Writer::from_writer(out);
    for v in &summary.value_picks {
        w.serialize(ValuePickRow {
            player: &v.name,
            pos: v.position.display_str(),
            draft_rank: v.draft_rank,
            adp: round1(v.adp),
            adp_diff: round1(v.adp_diff),
        })?;
    }
    w.flush()?;
    Ok(())
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    generated_at: String,
    profile: &'a str,
    strategy: Option<&'a str>,
    sources: &'a [String],
    players: Vec<OverallRow<'a>>,
    boards: &'a [PositionBoard],
    summary: &'a DraftSummary,
}

/// Pretty JSON for dashboards. Player rows use the CSV rounding.
pub fn to_json(report: &RankingReport) -> Result<String, serde_json::Error> {
    let json = JsonReport {
        generated_at: report.generated_at.to_rfc3339(),
        profile: &report.profile,
        strategy: report.strategy.as_deref(),
        sources: &report.sources_used,
        players: report.players.iter().map(OverallRow::from).collect(),
        boards: &report.boards,
        summary: &report.summary,
    };
    serde_json::to_string_pretty(&json)
}

// ---------------------------------------------------------------------------
// Output directory
// ---------------------------------------------------------------------------

fn create(path: &Path) -> anyhow::Result<File> {
    File::create(path).with_context(|| format!("failed to create {}", path.display()))
}

/// Write every output file under `dir` and return their paths.
///
/// Files: `rankings.csv`, `priority_breakdown.csv`, one `<pos>_board.csv`
/// per position, `summary.csv`, `value_picks.csv`, `rankings.json`.
pub fn write_all(report: &RankingReport, dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory {}", dir.display()))?;
    let mut written = Vec::new();

    let path = dir.join("rankings.csv");
    write_overall_csv(create(&path)?, &report.players)
        .with_context(|| format!("failed to write {}", path.display()))?;
    written.push(path);

    let path = dir.join("priority_breakdown.csv");
    write_breakdown_csv(create(&path)?, &report.players)
        .with_context(|| format!("failed to write {}", path.display()))?;
    written.push(path);

    for board in &report.boards {
        let name = format!("{}_board.csv", board.position.display_str().to_lowercase());
        let path = dir.join(name);
        write_board_csv(create(&path)?, board)
            .with_context(|| format!("failed to write {}", path.display()))?;
        written.push(path);
    }

    let path = dir.join("summary.csv");
    write_summary_csv(create(&path)?, &report.summary)
        .with_context(|| format!("failed to write {}", path.display()))?;
    written.push(path);

    let path = dir.join("value_picks.csv");
    write_value_picks_csv(create(&path)?, &report.summary)
        .with_context(|| format!("failed to write {}", path.display()))?;
    written.push(path);

    let path = dir.join("rankings.json");
    let json = to_json(report).context("failed to serialize report")?;
    std::fs::write(&path, json).with_context(|| format!("failed to write {}", path.display()))?;
    written.push(path);

    info!("wrote {} files to {}", written.len(), dir.display());
    Ok(written)
}
