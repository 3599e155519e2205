// Fantasy point scoring and the per-player valuation record that the later
// stages (VORP, tiers, ADP, priority) fill in.

use std::collections::HashMap;

use serde::Serialize;
use tracing::info;

use crate::names::NameKey;
use crate::position::Position;
use crate::valuation::adp::DraftValue;
use crate::valuation::consensus::{ConsensusRecord, ConsensusTable};
use crate::valuation::projections::{StatField, StatLine};
use crate::valuation::schema::SchemaKind;

/// ADP assigned to players the market does not draft.
pub const UNKNOWN_ADP: f64 = 999.0;

/// Points given to every player when a table has neither projections nor a
/// rank column.
pub const FLAT_POINTS: f64 = 100.0;

/// Rank assumed for a player missing from a rankings-only table.
const UNRANKED: f64 = 999.0;

/// Solo/assist split applied to an aggregate tackle count.
const SOLO_SHARE: f64 = 0.6;
const ASSIST_SHARE: f64 = 0.4;

// ---------------------------------------------------------------------------
// Weight tables
// ---------------------------------------------------------------------------

/// Offense stat field -> scoring weight key.
const OFFENSE_WEIGHTS: &[(StatField, &str)] = &[
    (StatField::PassYards, "pass_yd"),
    (StatField::PassTd, "pass_td"),
    (StatField::PassInt, "pass_int"),
    (StatField::Pass2pt, "pass_2pt"),
    (StatField::RushYards, "rush_yd"),
    (StatField::RushTd, "rush_td"),
    (StatField::Rush2pt, "rush_2pt"),
    (StatField::Receptions, "rec"),
    (StatField::RecYards, "rec_yd"),
    (StatField::RecTd, "rec_td"),
    (StatField::Rec2pt, "rec_2pt"),
    (StatField::RushFirstDown, "first_down_rb"),
    (StatField::RecFirstDown, "first_down_wr"),
    (StatField::PassComp25pEvents, "bonus_25_plus_completions"),
    (StatField::RushAtt20pEvents, "bonus_20_plus_carries"),
    (StatField::Rec10To19, "rec_10_19_bonus"),
    (StatField::Rec20To29, "rec_20_29_bonus"),
    (StatField::Rec30To39, "rec_30_39_bonus"),
    (StatField::Rec40Plus, "rec_40_plus_bonus"),
    (StatField::Rec40PlusTd, "rec_40_plus_td_bonus"),
    (StatField::Rec50PlusTd, "rec_50_plus_td_bonus"),
    (StatField::Pg100To199Rush, "bonus_100_199_rush_game"),
    (StatField::Pg200PlusRush, "bonus_200_plus_rush_game"),
    (StatField::Pg100To199Rec, "bonus_100_199_rec_game"),
    (StatField::Pg200PlusRec, "bonus_200_plus_rec_game"),
    (StatField::Pg100To199Combo, "bonus_100_199_combo_game"),
    (StatField::Pg200PlusCombo, "bonus_200_plus_combo_game"),
    (StatField::Pg300To399Pass, "bonus_300_399_pass_game"),
    (StatField::Pg400PlusPass, "bonus_400_plus_pass_game"),
];

/// IDP stat field -> scoring weight key, excluding tackles.
const IDP_WEIGHTS: &[(StatField, &str)] = &[
    (StatField::Sack, "sack"),
    (StatField::Interception, "int"),
    (StatField::ForcedFumble, "ff"),
    (StatField::FumbleRecovery, "fr"),
    (StatField::DefTd, "def_td"),
    (StatField::PassDefended, "pd"),
    (StatField::Safety, "safety"),
    (StatField::BlockedKick, "blk"),
];

fn weight(weights: &HashMap<String, f64>, key: &str) -> f64 {
    weights.get(key).copied().unwrap_or(0.0)
}

fn linear(stats: &StatLine, weights: &HashMap<String, f64>, table: &[(StatField, &str)]) -> f64 {
    table
        .iter()
        .map(|(field, key)| stats.get(*field) * weight(weights, key))
        .sum()
}

// ---------------------------------------------------------------------------
// Scoring functions
// ---------------------------------------------------------------------------

/// Linear offense score. Missing stats and missing weights contribute 0.
pub fn score_offense(stats: &StatLine, weights: &HashMap<String, f64>) -> f64 {
    linear(stats, weights, OFFENSE_WEIGHTS)
}

/// Linear IDP score. When only an aggregate tackle count exists it is split
/// 60/40 into solo and assisted tackles.
pub fn score_idp(stats: &StatLine, weights: &HashMap<String, f64>) -> f64 {
    let solo_w = weight(weights, "tackle_solo");
    let ast_w = weight(weights, "tackle_ast");

    let tackles = if stats.has(StatField::TackleSolo) || stats.has(StatField::TackleAst) {
        stats.get(StatField::TackleSolo) * solo_w + stats.get(StatField::TackleAst) * ast_w
    } else {
        stats.get(StatField::TacklesTotal) * (SOLO_SHARE * solo_w + ASSIST_SHARE * ast_w)
    };

    tackles + linear(stats, weights, IDP_WEIGHTS)
}

/// Synthetic points from a source rank: `base * e^(-decay * (rank - 1))`.
pub fn points_from_rank(position: Position, rank: f64) -> f64 {
    let (base, decay) = position.rank_decay();
    base * (-decay * (rank - 1.0)).exp()
}

// ---------------------------------------------------------------------------
// Player valuation record
// ---------------------------------------------------------------------------

/// Components of a player's draft priority, kept for display and auditing.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PriorityBreakdown {
    /// Talent score after the position multiplier and dampening.
    pub talent: f64,
    pub round_bonus: f64,
    /// Name of the round tier that awarded `round_bonus`.
    pub round_tier: Option<String>,
    pub adp_adjustment: f64,
    pub elite_bonus: f64,
    pub value_bonus: f64,
    pub reach_penalty: f64,
}

/// One ranked player. Stages fill fields in order: scoring sets `points`,
/// the ADP join sets `adp`, VORP sets `vorp`, ranking sets `rank`/`tier`/
/// `adp_diff`/`draft_value`/`pos_rank`, priority sets the rest.
#[derive(Debug, Clone)]
pub struct PlayerValuation {
    pub key: NameKey,
    pub name: String,
    pub position: Position,
    pub team: Option<String>,
    pub stats: StatLine,
    pub source_count: usize,
    pub points: f64,
    pub vorp: f64,
    /// Overall tier (FLEX gap on the points-sorted list).
    pub tier: u32,
    /// 1-based position in the points-sorted list.
    pub rank: usize,
    /// 1-based position within the player's position by (Points, VORP).
    pub pos_rank: usize,
    pub adp: f64,
    pub adp_diff: f64,
    pub draft_value: DraftValue,
    pub priority: PriorityBreakdown,
    pub draft_priority: f64,
    pub draft_rank: usize,
}

impl PlayerValuation {
    pub fn new(record: &ConsensusRecord, points: f64) -> Self {
        PlayerValuation {
            key: record.key.clone(),
            name: record.name.clone(),
            position: record.position,
            team: record.team.clone(),
            stats: record.stats.clone(),
            source_count: record.source_count,
            points,
            vorp: 0.0,
            tier: 0,
            rank: 0,
            pos_rank: 0,
            adp: UNKNOWN_ADP,
            adp_diff: 0.0,
            draft_value: DraftValue::None,
            priority: PriorityBreakdown::default(),
            draft_priority: 0.0,
            draft_rank: 0,
        }
    }

    pub fn has_adp(&self) -> bool {
        self.adp < UNKNOWN_ADP
    }
}

/// Score every record of a consensus table.
///
/// With real projections the linear tables apply. Otherwise points come from
/// the source rank (999 for unranked players), or a flat 100 when no rank
/// column exists anywhere.
pub fn score_table(
    table: &ConsensusTable,
    weights: &HashMap<String, f64>,
    kind: SchemaKind,
) -> Vec<PlayerValuation> {
    if table.has_projection_stats {
        return table
            .records
            .iter()
            .map(|r| {
                let points = match kind {
                    SchemaKind::Offense => score_offense(&r.stats, weights),
                    SchemaKind::Idp => score_idp(&r.stats, weights),
                };
                PlayerValuation::new(r, points)
            })
            .collect();
    }

    let any_rank = table
        .records
        .iter()
        .any(|r| r.stats.has(StatField::SourceRank));
    if any_rank {
        info!("{:?} table has no projection columns; using rank-decay scoring", kind);
    } else {
        info!("{:?} table has neither projections nor ranks; flat points", kind);
    }

    table
        .records
        .iter()
        .map(|r| {
            let points = if any_rank {
                let rank = r.stats.value(StatField::SourceRank).unwrap_or(UNRANKED);
                points_from_rank(r.position, rank)
            } else {
                FLAT_POINTS
            };
            PlayerValuation::new(r, points)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::names::{NameMatcher, NormalizedMatcher};

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    fn weights(pairs: &[(&str, f64)]) -> HashMap<String, f64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    fn stats(pairs: &[(StatField, f64)]) -> StatLine {
        pairs.iter().copied().collect()
    }

    fn record(name: &str, pos: Position, s: StatLine) -> ConsensusRecord {
        ConsensusRecord {
            key: NormalizedMatcher.key(name),
            name: name.into(),
            position: pos,
            team: None,
            stats: s,
            source_count: 1,
        }
    }

    #[test]
    fn offense_linear_combination() {
        let w = weights(&[
            ("pass_yd", 0.04),
            ("pass_td", 4.0),
            ("pass_int", -2.0),
            ("rush_yd", 0.1),
            ("rush_td", 6.0),
        ]);
        let s = stats(&[
            (StatField::PassYards, 4000.0),
            (StatField::PassTd, 30.0),
            (StatField::PassInt, 10.0),
            (StatField::RushYards, 500.0),
            (StatField::RushTd, 5.0),
        ]);
        // 160 + 120 - 20 + 50 + 30
        assert!(approx_eq(score_offense(&s, &w), 340.0, 1e-9));
    }

    #[test]
    fn bonus_events_scored() {
        let w = weights(&[
            ("rec", 1.0),
            ("bonus_100_199_rec_game", 3.0),
            ("first_down_wr", 0.5),
            ("rec_40_plus_bonus", 2.0),
        ]);
        let s = stats(&[
            (StatField::Receptions, 100.0),
            (StatField::Pg100To199Rec, 6.0),
            (StatField::RecFirstDown, 60.0),
            (StatField::Rec40Plus, 3.0),
        ]);
        assert!(approx_eq(score_offense(&s, &w), 100.0 + 18.0 + 30.0 + 6.0, 1e-9));
    }

    #[test]
    fn missing_weight_or_stat_contributes_nothing() {
        let w = weights(&[("rec", 1.0)]);
        let s = stats(&[(StatField::RecYards, 1500.0)]);
        assert_eq!(score_offense(&s, &w), 0.0);
        assert_eq!(score_offense(&StatLine::new(), &w), 0.0);
    }

    #[test]
    fn idp_split_tackles() {
        let w = weights(&[("tackle_solo", 1.0), ("tackle_ast", 0.5), ("sack", 4.0), ("int", 6.0)]);
        let s = stats(&[
            (StatField::TackleSolo, 80.0),
            (StatField::TackleAst, 40.0),
            (StatField::Sack, 2.0),
            (StatField::Interception, 1.0),
        ]);
        assert!(approx_eq(score_idp(&s, &w), 80.0 + 20.0 + 8.0 + 6.0, 1e-9));
    }

    #[test]
    fn idp_total_tackles_apportioned() {
        let w = weights(&[("tackle_solo", 1.0), ("tackle_ast", 0.5)]);
        let s = stats(&[(StatField::TacklesTotal, 100.0)]);
        // 100 * (0.6 * 1.0 + 0.4 * 0.5)
        assert!(approx_eq(score_idp(&s, &w), 80.0, 1e-9));
    }

    #[test]
    fn idp_split_wins_over_total() {
        let w = weights(&[("tackle_solo", 1.0), ("tackle_ast", 0.5)]);
        let s = stats(&[(StatField::TackleSolo, 50.0), (StatField::TacklesTotal, 500.0)]);
        assert!(approx_eq(score_idp(&s, &w), 50.0, 1e-9));
    }

    #[test]
    fn rank_decay_constants() {
        assert!(approx_eq(points_from_rank(Position::Quarterback, 1.0), 280.0, 1e-9));
        assert!(approx_eq(
            points_from_rank(Position::WideReceiver, 11.0),
            250.0 * (-0.4f64).exp(),
            1e-9
        ));
        assert!(approx_eq(
            points_from_rank(Position::TightEnd, 2.0),
            200.0 * (-0.06f64).exp(),
            1e-9
        ));
        assert!(approx_eq(
            points_from_rank(Position::Linebacker, 1.0),
            180.0,
            1e-9
        ));
        assert!(points_from_rank(Position::RunningBack, 5.0) < points_from_rank(Position::RunningBack, 4.0));
    }

    #[test]
    fn rankings_only_table_uses_decay() {
        let table = ConsensusTable {
            records: vec![
                record("First", Position::Quarterback, stats(&[(StatField::SourceRank, 1.0)])),
                record("Unranked", Position::Quarterback, StatLine::new()),
            ],
            has_projection_stats: false,
        };
        let scored = score_table(&table, &HashMap::new(), SchemaKind::Offense);
        assert!(approx_eq(scored[0].points, 280.0, 1e-9));
        assert!(approx_eq(
            scored[1].points,
            280.0 * (-0.05f64 * 998.0).exp(),
            1e-12
        ));
        assert_eq!(scored[1].adp, UNKNOWN_ADP);
    }

    #[test]
    fn no_ranks_gives_flat_points() {
        let table = ConsensusTable {
            records: vec![record("Anyone", Position::TightEnd, StatLine::new())],
            has_projection_stats: false,
        };
        let scored = score_table(&table, &HashMap::new(), SchemaKind::Offense);
        assert_eq!(scored[0].points, FLAT_POINTS);
    }

    #[test]
    fn projection_table_scores_idp_kind() {
        let table = ConsensusTable {
            records: vec![record(
                "Edge Rusher",
                Position::DefensiveLine,
                stats(&[(StatField::Sack, 10.0)]),
            )],
            has_projection_stats: true,
        };
        let w = weights(&[("sack", 4.0)]);
        let scored = score_table(&table, &w, SchemaKind::Idp);
        assert!(approx_eq(scored[0].points, 40.0, 1e-9));
    }
}
