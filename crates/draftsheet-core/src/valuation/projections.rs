// Projection source loading and the canonical statistical record.
//
// Sources arrive as free-form CSV exports. They are read into a `RawTable`
// (headers + string cells) and later resolved onto `StatField`s by the
// schema normalizer.

use std::collections::{BTreeMap, HashMap};
use std::io::Read;
use std::path::Path;

use serde::Serialize;
use tracing::{debug, warn};

use crate::position::Position;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("source {path} contains no data rows")]
    Empty { path: String },
}

// ---------------------------------------------------------------------------
// Raw tables
// ---------------------------------------------------------------------------

/// An untyped CSV table. Duplicate headers are suffixed `.1`, `.2`, ... in
/// order of appearance, so a second `YDS` column is addressable as `YDS.1`.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Build a table from header and row literals; applies the same duplicate
    /// header disambiguation as the CSV loader.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        RawTable {
            headers: dedupe_headers(headers),
            rows,
        }
    }

    /// Index of the column with exactly this header.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// First column present from a list of candidate headers.
    pub fn first_column(&self, candidates: &[&str]) -> Option<usize> {
        candidates.iter().find_map(|c| self.column(c))
    }

    /// Cell text, or "" for short rows.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(|s| s.as_str())
            .unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn dedupe_headers(headers: Vec<String>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    headers
        .into_iter()
        .map(|h| {
            let h = h.trim().to_string();
            let count = seen.entry(h.clone()).or_insert(0);
            let out = if *count == 0 {
                h.clone()
            } else {
                format!("{h}.{count}")
            };
            *count += 1;
            out
        })
        .collect()
}

/// Parse a numeric cell. Thousands separators are tolerated; blank,
/// non-numeric and non-finite cells are treated as missing.
pub fn parse_numeric(cell: &str) -> Option<f64> {
    let cleaned = cell.trim().replace(',', "");
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

// ---------------------------------------------------------------------------
// Reader-based and path-based loaders
// ---------------------------------------------------------------------------

/// Read any CSV into a `RawTable`. Ragged rows are accepted.
pub fn load_table_from_reader<R: Read>(rdr: R) -> Result<RawTable, csv::Error> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(rdr);
    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
    let mut rows = Vec::new();
    for result in reader.records() {
        match result {
            Ok(record) => rows.push(record.iter().map(|c| c.trim().to_string()).collect()),
            Err(e) => warn!("skipping malformed CSV row: {}", e),
        }
    }
    Ok(RawTable::new(headers, rows))
}

/// Load a CSV file into a `RawTable`. An existing file with no data rows is
/// reported as `SourceError::Empty`.
pub fn load_table(path: &Path) -> Result<RawTable, SourceError> {
    let file = std::fs::File::open(path).map_err(|e| SourceError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    let table = load_table_from_reader(file).map_err(|e| SourceError::Csv {
        path: path.display().to_string(),
        source: e,
    })?;
    if table.is_empty() {
        return Err(SourceError::Empty {
            path: path.display().to_string(),
        });
    }
    debug!(
        "loaded {} rows x {} columns from {}",
        table.len(),
        table.headers.len(),
        path.display()
    );
    Ok(table)
}

// ---------------------------------------------------------------------------
// Canonical statistical fields
// ---------------------------------------------------------------------------

/// Every canonical numeric field a projection record can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum StatField {
    // passing
    PassYards,
    PassTd,
    PassInt,
    Pass2pt,
    PassComp25pEvents,
    // rushing
    RushYards,
    RushTd,
    Rush2pt,
    RushAtt20pEvents,
    RushFirstDown,
    // receiving
    Receptions,
    RecYards,
    RecTd,
    Rec2pt,
    RecFirstDown,
    Rec10To19,
    Rec20To29,
    Rec30To39,
    Rec40Plus,
    Rec40PlusTd,
    Rec50PlusTd,
    // per-game bonus events
    Pg100To199Rush,
    Pg200PlusRush,
    Pg100To199Rec,
    Pg200PlusRec,
    Pg100To199Combo,
    Pg200PlusCombo,
    Pg300To399Pass,
    Pg400PlusPass,
    // individual defense
    TackleSolo,
    TackleAst,
    TacklesTotal,
    Sack,
    Interception,
    ForcedFumble,
    FumbleRecovery,
    DefTd,
    PassDefended,
    Safety,
    BlockedKick,
    // source ordering, used when no projections are present
    SourceRank,
}

pub const OFFENSE_FIELDS: &[StatField] = &[
    StatField::PassYards,
    StatField::PassTd,
    StatField::PassInt,
    StatField::Pass2pt,
    StatField::PassComp25pEvents,
    StatField::RushYards,
    StatField::RushTd,
    StatField::Rush2pt,
    StatField::RushAtt20pEvents,
    StatField::RushFirstDown,
    StatField::Receptions,
    StatField::RecYards,
    StatField::RecTd,
    StatField::Rec2pt,
    StatField::RecFirstDown,
    StatField::Rec10To19,
    StatField::Rec20To29,
    StatField::Rec30To39,
    StatField::Rec40Plus,
    StatField::Rec40PlusTd,
    StatField::Rec50PlusTd,
    StatField::Pg100To199Rush,
    StatField::Pg200PlusRush,
    StatField::Pg100To199Rec,
    StatField::Pg200PlusRec,
    StatField::Pg100To199Combo,
    StatField::Pg200PlusCombo,
    StatField::Pg300To399Pass,
    StatField::Pg400PlusPass,
];

pub const IDP_FIELDS: &[StatField] = &[
    StatField::TackleSolo,
    StatField::TackleAst,
    StatField::TacklesTotal,
    StatField::Sack,
    StatField::Interception,
    StatField::ForcedFumble,
    StatField::FumbleRecovery,
    StatField::DefTd,
    StatField::PassDefended,
    StatField::Safety,
    StatField::BlockedKick,
];

impl StatField {
    /// Canonical column name.
    pub fn key(&self) -> &'static str {
        match self {
            StatField::PassYards => "pass_yards",
            StatField::PassTd => "pass_td",
            StatField::PassInt => "pass_int",
            StatField::Pass2pt => "pass_2pt",
            StatField::PassComp25pEvents => "pass_comp_25p_events",
            StatField::RushYards => "rush_yards",
            StatField::RushTd => "rush_td",
            StatField::Rush2pt => "rush_2pt",
            StatField::RushAtt20pEvents => "rush_att_20p_events",
            StatField::RushFirstDown => "rush_first_down",
            StatField::Receptions => "receptions",
            StatField::RecYards => "rec_yards",
            StatField::RecTd => "rec_td",
            StatField::Rec2pt => "rec_2pt",
            StatField::RecFirstDown => "rec_first_down",
            StatField::Rec10To19 => "rec_10_19",
            StatField::Rec20To29 => "rec_20_29",
            StatField::Rec30To39 => "rec_30_39",
            StatField::Rec40Plus => "rec_40_plus",
            StatField::Rec40PlusTd => "rec_40_plus_td",
            StatField::Rec50PlusTd => "rec_50_plus_td",
            StatField::Pg100To199Rush => "pg_100_199_rush",
            StatField::Pg200PlusRush => "pg_200_plus_rush",
            StatField::Pg100To199Rec => "pg_100_199_rec",
            StatField::Pg200PlusRec => "pg_200_plus_rec",
            StatField::Pg100To199Combo => "pg_100_199_combo",
            StatField::Pg200PlusCombo => "pg_200_plus_combo",
            StatField::Pg300To399Pass => "pg_300_399_pass",
            StatField::Pg400PlusPass => "pg_400_plus_pass",
            StatField::TackleSolo => "tackle_solo",
            StatField::TackleAst => "tackle_ast",
            StatField::TacklesTotal => "tackles_total",
            StatField::Sack => "sack",
            StatField::Interception => "int",
            StatField::ForcedFumble => "ff",
            StatField::FumbleRecovery => "fr",
            StatField::DefTd => "def_td",
            StatField::PassDefended => "pd",
            StatField::Safety => "safety",
            StatField::BlockedKick => "blk",
            StatField::SourceRank => "rank",
        }
    }

    /// Source column names accepted for this field regardless of position.
    /// Position-overloaded headers (`YDS`, `TDS`, `REC`, ...) are routed
    /// separately by the schema normalizer.
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            StatField::PassYards => &["pass_yards", "pass_yd", "pass_yds", "py"],
            StatField::PassTd => &["pass_td", "pass_tds"],
            StatField::PassInt => &["pass_int", "ints"],
            StatField::Pass2pt => &["pass_2pt", "pass_two_pt"],
            StatField::PassComp25pEvents => &["pass_comp_25p_events"],
            StatField::RushYards => &["rush_yards", "rush_yd", "rush_yds", "ry"],
            StatField::RushTd => &["rush_td", "rush_tds"],
            StatField::Rush2pt => &["rush_2pt", "rush_two_pt"],
            StatField::RushAtt20pEvents => &["rush_att_20p_events"],
            StatField::RushFirstDown => &["rush_first_down"],
            StatField::Receptions => &["receptions", "rec", "recpt"],
            StatField::RecYards => &["rec_yards", "rec_yd", "rec_yds", "ryds"],
            StatField::RecTd => &["rec_td", "rec_tds"],
            StatField::Rec2pt => &["rec_2pt", "rec_two_pt"],
            StatField::RecFirstDown => &["rec_first_down"],
            StatField::Rec10To19 => &["rec_10_19"],
            StatField::Rec20To29 => &["rec_20_29"],
            StatField::Rec30To39 => &["rec_30_39"],
            StatField::Rec40Plus => &["rec_40_plus"],
            StatField::Rec40PlusTd => &["rec_40_plus_td"],
            StatField::Rec50PlusTd => &["rec_50_plus_td"],
            StatField::Pg100To199Rush => &["pg_100_199_rush"],
            StatField::Pg200PlusRush => &["pg_200_plus_rush"],
            StatField::Pg100To199Rec => &["pg_100_199_rec"],
            StatField::Pg200PlusRec => &["pg_200_plus_rec"],
            StatField::Pg100To199Combo => &["pg_100_199_combo"],
            StatField::Pg200PlusCombo => &["pg_200_plus_combo"],
            StatField::Pg300To399Pass => &["pg_300_399_pass"],
            StatField::Pg400PlusPass => &["pg_400_plus_pass"],
            StatField::TackleSolo => &["tackle_solo", "solo", "Tackles Solo"],
            StatField::TackleAst => &["tackle_ast", "ast", "Tackles Ast"],
            StatField::TacklesTotal => &["tackles_total", "tackles", "Tackles"],
            StatField::Sack => &["sack", "sacks", "Sacks"],
            StatField::Interception => &["int", "ints", "Ints"],
            StatField::ForcedFumble => &["ff", "forced_fumbles", "Fum Forc"],
            StatField::FumbleRecovery => &["fr", "fumble_rec", "Fum Rec"],
            StatField::DefTd => &["def_td", "def_tds", "TD Ret"],
            StatField::PassDefended => &["pd", "passes_defended", "pass_def", "Pass Def"],
            StatField::Safety => &["safety", "safeties", "Saf"],
            StatField::BlockedKick => &["blk", "blocked_kick"],
            StatField::SourceRank => &["RK", "rank", "overall_rank", "#"],
        }
    }
}

/// Sparse numeric record: a field is present only when some source supplied
/// it. Absent fields read as 0.0.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatLine(BTreeMap<StatField, f64>);

impl StatLine {
    pub fn new() -> Self {
        StatLine(BTreeMap::new())
    }

    /// Value for scoring: absent fields contribute 0.0.
    pub fn get(&self, field: StatField) -> f64 {
        self.0.get(&field).copied().unwrap_or(0.0)
    }

    /// Value only if a source actually supplied it.
    pub fn value(&self, field: StatField) -> Option<f64> {
        self.0.get(&field).copied()
    }

    pub fn has(&self, field: StatField) -> bool {
        self.0.contains_key(&field)
    }

    /// Set a field; non-finite values are discarded.
    pub fn set(&mut self, field: StatField, value: f64) {
        if value.is_finite() {
            self.0.insert(field, value);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (StatField, f64)> + '_ {
        self.0.iter().map(|(k, v)| (*k, *v))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(StatField, f64)> for StatLine {
    fn from_iter<I: IntoIterator<Item = (StatField, f64)>>(iter: I) -> Self {
        let mut line = StatLine::new();
        for (field, value) in iter {
            line.set(field, value);
        }
        line
    }
}

// ---------------------------------------------------------------------------
// Normalized per-source records
// ---------------------------------------------------------------------------

/// One player row from one source after schema normalization.
#[derive(Debug, Clone)]
pub struct ProjectionRecord {
    pub name: String,
    pub position: Position,
    pub team: Option<String>,
    pub stats: StatLine,
}

/// A normalized source: its records plus provenance.
#[derive(Debug, Clone)]
pub struct SourceTable {
    pub source: String,
    pub weight: f64,
    pub records: Vec<ProjectionRecord>,
    /// Whether any real projection column was resolved. When false the
    /// records carry at most a source rank.
    pub has_projection_stats: bool,
}
