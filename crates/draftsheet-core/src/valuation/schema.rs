// Column-schema resolution: maps free-form source headers onto canonical
// statistical fields.
//
// Many exports reuse generic headers whose meaning depends on the row's
// position (FantasyPros-style `YDS`, `TDS`, `YDS.1`, `TDS.1`, `REC`, `INTS`).
// Those are routed per row; named columns (`pass_yards`, `rush_td`, ...) are
// taken as-is and win over a routed generic column.

use tracing::{debug, warn};

use crate::position::Position;
use crate::valuation::projections::{
    parse_numeric, ProjectionRecord, RawTable, SourceTable, StatField, StatLine, IDP_FIELDS,
    OFFENSE_FIELDS,
};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("source `{source_name}` has no player-name column (looked for: {})", candidates.join(", "))]
    MissingPlayerColumn {
        source_name: String,
        candidates: Vec<String>,
    },
}

// ---------------------------------------------------------------------------
// Identity column candidates
// ---------------------------------------------------------------------------

pub const PLAYER_COLUMNS: &[&str] = &[
    "player",
    "player_name",
    "name",
    "display_name",
    "PLAYER NAME",
    "Player",
    "Name",
];
pub const POSITION_COLUMNS: &[&str] = &["position", "pos", "POS", "Pos", "Position"];
pub const TEAM_COLUMNS: &[&str] = &["team", "team_abbr", "team_code", "nfl_team", "TEAM", "Team"];
pub const ADP_COLUMNS: &[&str] = &["adp", "ADP", "average_draft_position", "avg_pick", "Overall Rank"];

/// Which canonical map a table is normalized against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaKind {
    Offense,
    Idp,
}

impl SchemaKind {
    fn fields(&self) -> &'static [StatField] {
        match self {
            SchemaKind::Offense => OFFENSE_FIELDS,
            SchemaKind::Idp => IDP_FIELDS,
        }
    }

    /// Fields whose presence marks a table as carrying real projections.
    fn projection_markers(&self) -> &'static [StatField] {
        match self {
            SchemaKind::Offense => &[
                StatField::PassYards,
                StatField::RushYards,
                StatField::Receptions,
            ],
            SchemaKind::Idp => &[
                StatField::TackleSolo,
                StatField::TacklesTotal,
                StatField::Sack,
                StatField::Interception,
            ],
        }
    }
}

// ---------------------------------------------------------------------------
// Position-overloaded generic columns
// ---------------------------------------------------------------------------

const GENERIC_COLUMNS: &[&str] = &["YDS", "TDS", "YDS.1", "TDS.1", "REC", "INTS"];

/// Canonical field a generic column means for a row at `pos`.
fn route_generic(column: &str, pos: Position) -> Option<StatField> {
    match pos {
        Position::Quarterback => match column {
            "YDS" => Some(StatField::PassYards),
            "TDS" => Some(StatField::PassTd),
            "INTS" => Some(StatField::PassInt),
            "YDS.1" => Some(StatField::RushYards),
            "TDS.1" => Some(StatField::RushTd),
            _ => None,
        },
        Position::RunningBack | Position::WideReceiver | Position::TightEnd => match column {
            "REC" => Some(StatField::Receptions),
            "YDS" => Some(StatField::RecYards),
            "TDS" => Some(StatField::RecTd),
            "YDS.1" => Some(StatField::RushYards),
            "TDS.1" => Some(StatField::RushTd),
            _ => None,
        },
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Normalize a raw projection table against the offense or IDP map.
///
/// Rows without a player name or with an unrecognized position are dropped
/// (logged). Missing or unparseable cells leave the field absent.
pub fn normalize_projections(
    raw: &RawTable,
    kind: SchemaKind,
    source_name: &str,
    weight: f64,
) -> Result<SourceTable, SchemaError> {
    let player_col = raw
        .first_column(PLAYER_COLUMNS)
        .ok_or_else(|| SchemaError::MissingPlayerColumn {
            source_name: source_name.to_string(),
            candidates: PLAYER_COLUMNS.iter().map(|s| s.to_string()).collect(),
        })?;
    let pos_col = raw.first_column(POSITION_COLUMNS);
    let team_col = raw.first_column(TEAM_COLUMNS);

    // Named columns resolved once per table.
    let named: Vec<(StatField, usize)> = kind
        .fields()
        .iter()
        .filter_map(|f| raw.first_column(f.aliases()).map(|idx| (*f, idx)))
        .collect();
    let rank_col = raw.first_column(StatField::SourceRank.aliases());
    let generic: Vec<(&str, usize)> = if kind == SchemaKind::Offense {
        GENERIC_COLUMNS
            .iter()
            .filter_map(|c| raw.column(c).map(|idx| (*c, idx)))
            .collect()
    } else {
        Vec::new()
    };

    let markers = kind.projection_markers();
    let has_projection_stats = named.iter().any(|(f, _)| markers.contains(f))
        || (kind == SchemaKind::Offense
            && generic
                .iter()
                .any(|(c, _)| matches!(*c, "YDS" | "YDS.1" | "REC")));

    debug!(
        "source {}: {} named fields, {} generic columns, projections={}",
        source_name,
        named.len(),
        generic.len(),
        has_projection_stats
    );

    let mut records = Vec::with_capacity(raw.len());
    for row in 0..raw.len() {
        let name = raw.cell(row, player_col).trim_matches('"').trim();
        if name.is_empty() {
            continue;
        }
        let raw_pos = pos_col.map(|c| raw.cell(row, c)).unwrap_or("");
        let Some(position) = Position::parse(raw_pos) else {
            warn!(
                "source {}: dropping {} with unrecognized position {:?}",
                source_name, name, raw_pos
            );
            continue;
        };
        let team = team_col
            .map(|c| raw.cell(row, c).to_string())
            .filter(|t| !t.is_empty());

        let mut stats = StatLine::new();
        for (field, col) in &named {
            if let Some(v) = parse_numeric(raw.cell(row, *col)) {
                stats.set(*field, v);
            }
        }
        for (column, col) in &generic {
            let Some(field) = route_generic(column, position) else {
                continue;
            };
            if stats.has(field) {
                continue;
            }
            if let Some(v) = parse_numeric(raw.cell(row, *col)) {
                stats.set(field, v);
            }
        }
        if let Some(col) = rank_col {
            if let Some(v) = parse_numeric(raw.cell(row, col)) {
                stats.set(StatField::SourceRank, v);
            }
        }

        records.push(ProjectionRecord {
            name: name.to_string(),
            position,
            team,
            stats,
        });
    }

    Ok(SourceTable {
        source: source_name.to_string(),
        weight,
        records,
        has_projection_stats,
    })
}

/// One market ADP row.
#[derive(Debug, Clone, PartialEq)]
pub struct AdpEntry {
    pub name: String,
    pub position: Option<Position>,
    pub adp: f64,
}

/// Normalize an ADP table. Rows whose ADP does not parse are skipped.
pub fn normalize_adp(raw: &RawTable, source_name: &str) -> Result<Vec<AdpEntry>, SchemaError> {
    let player_col = raw
        .first_column(PLAYER_COLUMNS)
        .ok_or_else(|| SchemaError::MissingPlayerColumn {
            source_name: source_name.to_string(),
            candidates: PLAYER_COLUMNS.iter().map(|s| s.to_string()).collect(),
        })?;
    let pos_col = raw.first_column(POSITION_COLUMNS);
    let Some(adp_col) = raw.first_column(ADP_COLUMNS) else {
        warn!("ADP source {} has no ADP column; ignoring it", source_name);
        return Ok(Vec::new());
    };

    let mut entries = Vec::new();
    for row in 0..raw.len() {
        let name = raw.cell(row, player_col).trim_matches('"').trim();
        if name.is_empty() {
            continue;
        }
        let Some(adp) = parse_numeric(raw.cell(row, adp_col)) else {
            debug!("ADP source {}: no usable ADP for {}", source_name, name);
            continue;
        };
        entries.push(AdpEntry {
            name: name.to_string(),
            position: pos_col.and_then(|c| Position::parse(raw.cell(row, c))),
            adp,
        });
    }
    Ok(entries)
}
