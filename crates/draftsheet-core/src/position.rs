// Football positions and the per-position lookup tables hung off them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Draftable football positions. IDP positions (DL/LB/DB) only appear when
/// the league profile enables individual defensive players.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Position {
    #[serde(rename = "QB")]
    Quarterback,
    #[serde(rename = "RB")]
    RunningBack,
    #[serde(rename = "WR")]
    WideReceiver,
    #[serde(rename = "TE")]
    TightEnd,
    #[serde(rename = "DL")]
    DefensiveLine,
    #[serde(rename = "LB")]
    Linebacker,
    #[serde(rename = "DB")]
    DefensiveBack,
    #[serde(rename = "K")]
    Kicker,
    #[serde(rename = "DST")]
    TeamDefense,
}

/// Board order for position sheets and summaries.
pub const ALL_POSITIONS: &[Position] = &[
    Position::Quarterback,
    Position::RunningBack,
    Position::WideReceiver,
    Position::TightEnd,
    Position::DefensiveLine,
    Position::Linebacker,
    Position::DefensiveBack,
    Position::Kicker,
    Position::TeamDefense,
];

impl Position {
    /// Parse a raw position string from a projection or ADP export.
    ///
    /// Depth-chart digits are dropped (`WR1` -> WR, `DE2` -> DL) and the
    /// common defensive sub-positions collapse onto DL/LB/DB:
    /// - "DE"/"DT"/"EDGE" -> DefensiveLine
    /// - "ILB"/"OLB"/"MLB" -> Linebacker
    /// - "CB"/"S"/"FS"/"SS" -> DefensiveBack
    /// - "DEF"/"D/ST" -> TeamDefense, "FB" -> RunningBack
    pub fn parse(s: &str) -> Option<Self> {
        let cleaned: String = s
            .trim()
            .chars()
            .filter(|c| !c.is_ascii_digit())
            .collect::<String>()
            .to_uppercase();
        match cleaned.as_str() {
            "QB" => Some(Position::Quarterback),
            "RB" | "FB" => Some(Position::RunningBack),
            "WR" => Some(Position::WideReceiver),
            "TE" => Some(Position::TightEnd),
            "DL" | "DE" | "DT" | "EDGE" => Some(Position::DefensiveLine),
            "LB" | "ILB" | "OLB" | "MLB" => Some(Position::Linebacker),
            "DB" | "CB" | "S" | "FS" | "SS" => Some(Position::DefensiveBack),
            "K" | "PK" => Some(Position::Kicker),
            "DST" | "DEF" | "D/ST" => Some(Position::TeamDefense),
            _ => None,
        }
    }

    /// Short label used in config keys and exported sheets.
    pub fn display_str(&self) -> &'static str {
        match self {
            Position::Quarterback => "QB",
            Position::RunningBack => "RB",
            Position::WideReceiver => "WR",
            Position::TightEnd => "TE",
            Position::DefensiveLine => "DL",
            Position::Linebacker => "LB",
            Position::DefensiveBack => "DB",
            Position::Kicker => "K",
            Position::TeamDefense => "DST",
        }
    }

    /// Whether this is an individual defensive player position.
    pub fn is_idp(&self) -> bool {
        matches!(
            self,
            Position::DefensiveLine | Position::Linebacker | Position::DefensiveBack
        )
    }

    /// Base points and decay constant for rank-derived fallback scoring.
    pub fn rank_decay(&self) -> (f64, f64) {
        match self {
            Position::Quarterback => (280.0, 0.05),
            Position::RunningBack | Position::WideReceiver => (250.0, 0.04),
            Position::TightEnd => (200.0, 0.06),
            _ => (180.0, 0.03),
        }
    }

    /// Overall-pick cutoffs separating early / mid / late market buckets.
    pub fn adp_thresholds(&self) -> AdpThresholds {
        let (early, mid, late) = match self {
            Position::Quarterback => (8.0, 24.0, 60.0),
            Position::RunningBack => (12.0, 24.0, 48.0),
            Position::WideReceiver => (18.0, 36.0, 72.0),
            Position::TightEnd => (30.0, 60.0, 120.0),
            Position::DefensiveLine | Position::Linebacker => (60.0, 120.0, 180.0),
            Position::DefensiveBack => (80.0, 150.0, 200.0),
            Position::Kicker | Position::TeamDefense => (24.0, 48.0, 96.0),
        };
        AdpThresholds { early, mid, late }
    }

    /// Multiplier applied to the talent component of draft priority.
    pub fn talent_multiplier(&self, superflex: bool) -> f64 {
        match self {
            Position::Quarterback if superflex => 1.05,
            Position::TightEnd => 1.1,
            Position::DefensiveLine | Position::Linebacker | Position::DefensiveBack => 0.8,
            _ => 1.0,
        }
    }

    /// Deterministic ordering index for board display.
    pub fn sort_order(&self) -> u8 {
        ALL_POSITIONS
            .iter()
            .position(|p| p == self)
            .map(|i| i as u8)
            .unwrap_or(u8::MAX)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_str())
    }
}

/// ADP pick numbers bounding the early, mid and late buckets for a position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdpThresholds {
    pub early: f64,
    pub mid: f64,
    pub late: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_strips_depth_digits() {
        assert_eq!(Position::parse("WR1"), Some(Position::WideReceiver));
        assert_eq!(Position::parse("rb12"), Some(Position::RunningBack));
        assert_eq!(Position::parse(" QB "), Some(Position::Quarterback));
    }

    #[test]
    fn parse_collapses_defensive_positions() {
        assert_eq!(Position::parse("DE"), Some(Position::DefensiveLine));
        assert_eq!(Position::parse("EDGE1"), Some(Position::DefensiveLine));
        assert_eq!(Position::parse("OLB"), Some(Position::Linebacker));
        assert_eq!(Position::parse("CB2"), Some(Position::DefensiveBack));
        assert_eq!(Position::parse("SS"), Some(Position::DefensiveBack));
        assert_eq!(Position::parse("D/ST"), Some(Position::TeamDefense));
        assert_eq!(Position::parse("FB"), Some(Position::RunningBack));
    }

    #[test]
    fn parse_unknown_is_none() {
        assert_eq!(Position::parse(""), None);
        assert_eq!(Position::parse("OL"), None);
    }

    #[test]
    fn display_matches_config_keys() {
        for pos in ALL_POSITIONS {
            assert_eq!(Position::parse(pos.display_str()), Some(*pos));
        }
    }

    #[test]
    fn talent_multiplier_table() {
        assert_eq!(Position::Quarterback.talent_multiplier(false), 1.0);
        assert_eq!(Position::Quarterback.talent_multiplier(true), 1.05);
        assert_eq!(Position::TightEnd.talent_multiplier(false), 1.1);
        assert_eq!(Position::Linebacker.talent_multiplier(true), 0.8);
        assert_eq!(Position::WideReceiver.talent_multiplier(true), 1.0);
    }

    #[test]
    fn adp_thresholds_default_for_kickers() {
        let t = Position::Kicker.adp_thresholds();
        assert_eq!((t.early, t.mid, t.late), (24.0, 48.0, 96.0));
        let qb = Position::Quarterback.adp_thresholds();
        assert_eq!((qb.early, qb.mid, qb.late), (8.0, 24.0, 60.0));
    }
}
