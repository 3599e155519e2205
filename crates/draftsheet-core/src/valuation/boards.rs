// Per-position draft boards and the positional scarcity summary.
//
// Each board lists one position by projected points with its own tier gap.
// Big point drops among the top twelve are flagged so a drafter can see where
// a position falls off.

use serde::Serialize;

use crate::config::TierConfig;
use crate::position::{Position, ALL_POSITIONS};
use crate::valuation::scoring::PlayerValuation;
use crate::valuation::tiers::assign_tiers;
use crate::valuation::vorp::position_order;

/// Board rows past this position rank are never flagged.
const SCARCITY_DEPTH: usize = 12;

/// Players averaged for the summary's mean VORP.
const SUMMARY_DEPTH: usize = 12;

/// ADP_Diff a player needs to be listed as a value pick.
pub const VALUE_PICK_DIFF: f64 = 15.0;
const MAX_VALUE_PICKS: usize = 10;

/// Positions the draft summary reports on.
const SUMMARY_POSITIONS: &[Position] = &[
    Position::Quarterback,
    Position::RunningBack,
    Position::WideReceiver,
    Position::TightEnd,
];

// ---------------------------------------------------------------------------
// Scarcity flags
// ---------------------------------------------------------------------------

/// Size of the drop to the next player at the same position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum Scarcity {
    /// Drop of at least 1.5x the position's tier gap.
    #[serde(rename = "CLIFF")]
    Cliff,
    /// Drop of at least the tier gap.
    #[serde(rename = "DROP")]
    Drop,
    #[default]
    #[serde(rename = "")]
    None,
}

impl Scarcity {
    pub fn classify(pos_rank: usize, next_drop: f64, gap: f64) -> Self {
        if pos_rank > SCARCITY_DEPTH {
            Scarcity::None
        } else if next_drop >= 1.5 * gap {
            Scarcity::Cliff
        } else if next_drop >= gap {
            Scarcity::Drop
        } else {
            Scarcity::None
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Scarcity::Cliff => "CLIFF",
            Scarcity::Drop => "DROP",
            Scarcity::None => "",
        }
    }
}

// ---------------------------------------------------------------------------
// Boards
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct BoardEntry {
    pub name: String,
    pub team: Option<String>,
    pub points: f64,
    pub vorp: f64,
    pub adp: f64,
    pub pos_rank: usize,
    /// Points minus the next player's points; 0 for the last player.
    pub next_drop: f64,
    pub tier: u32,
    pub scarcity: Scarcity,
    pub draft_rank: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct PositionBoard {
    pub position: Position,
    pub gap: f64,
    pub entries: Vec<BoardEntry>,
}

/// One board per position present, in board order.
pub fn build_boards(players: &[PlayerValuation], tiers: &TierConfig) -> Vec<PositionBoard> {
    let mut boards = Vec::new();

    for &pos in ALL_POSITIONS {
        let order = position_order(players, pos);
        if order.is_empty() {
            continue;
        }
        let gap = tiers.gap_for(pos);
        let points: Vec<f64> = order.iter().map(|&i| players[i].points).collect();
        let tier_ids = assign_tiers(&points, gap);

        let entries = order
            .iter()
            .enumerate()
            .map(|(n, &i)| {
                let p = &players[i];
                let next_drop = points.get(n + 1).map_or(0.0, |next| p.points - next);
                BoardEntry {
                    name: p.name.clone(),
                    team: p.team.clone(),
                    points: p.points,
                    vorp: p.vorp,
                    adp: p.adp,
                    pos_rank: n + 1,
                    next_drop,
                    tier: tier_ids[n],
                    scarcity: Scarcity::classify(n + 1, next_drop, gap),
                    draft_rank: p.draft_rank,
                }
            })
            .collect();

        boards.push(PositionBoard {
            position: pos,
            gap,
            entries,
        });
    }

    boards
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct PositionSummary {
    pub position: Position,
    pub tier1_size: usize,
    /// Mean VORP of the top twelve (or of all, when fewer).
    pub top_mean_vorp: f64,
    pub note: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValuePick {
    pub name: String,
    pub position: Position,
    pub draft_rank: usize,
    pub adp: f64,
    pub adp_diff: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DraftSummary {
    pub positions: Vec<PositionSummary>,
    pub value_picks: Vec<ValuePick>,
}

fn strategy_note(position: Position, tier1_size: usize, superflex: bool) -> &'static str {
    if position == Position::Quarterback && superflex {
        "Superflex: target early"
    } else if tier1_size <= 3 {
        "Scarce top tier"
    } else if tier1_size >= 8 {
        "Deep position"
    } else {
        "Moderate scarcity"
    }
}

/// Summarize the skill-position boards and collect value picks.
///
/// `draft_order` must already be sorted by draft rank.
pub fn build_summary(
    boards: &[PositionBoard],
    draft_order: &[PlayerValuation],
    superflex: bool,
) -> DraftSummary {
    let positions = SUMMARY_POSITIONS
        .iter()
        .filter_map(|&pos| board_for_position(boards, pos))
        .map(|board| {
            let tier1_size = board.entries.iter().filter(|e| e.tier == 1).count();
            let top: Vec<f64> = board
                .entries
                .iter()
                .take(SUMMARY_DEPTH)
                .map(|e| e.vorp)
                .collect();
            let top_mean_vorp = if top.is_empty() {
                0.0
            } else {
                top.iter().sum::<f64>() / top.len() as f64
            };
            PositionSummary {
                position: board.position,
                tier1_size,
                top_mean_vorp,
                note: strategy_note(board.position, tier1_size, superflex).to_string(),
            }
        })
        .collect();

    let value_picks = draft_order
        .iter()
        .filter(|p| p.has_adp() && p.adp_diff >= VALUE_PICK_DIFF)
        .take(MAX_VALUE_PICKS)
        .map(|p| ValuePick {
            name: p.name.clone(),
            position: p.position,
            draft_rank: p.draft_rank,
            adp: p.adp,
            adp_diff: p.adp_diff,
        })
        .collect();

    DraftSummary {
        positions,
        value_picks,
    }
}

/// Look up the board for a position.
pub fn board_for_position(boards: &[PositionBoard], position: Position) -> Option<&PositionBoard> {
    boards.iter().find(|b| b.position == position)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::names::{NameMatcher, NormalizedMatcher};
    use crate::valuation::consensus::ConsensusRecord;
    use crate::valuation::projections::StatLine;
    use crate::valuation::scoring::UNKNOWN_ADP;
    use std::collections::HashMap;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    fn player(name: &str, pos: Position, points: f64, vorp: f64) -> PlayerValuation {
        let record = ConsensusRecord {
            key: NormalizedMatcher.key(name),
            name: name.into(),
            position: pos,
            team: Some("TST".into()),
            stats: StatLine::new(),
            source_count: 1,
        };
        let mut p = PlayerValuation::new(&record, points);
        p.vorp = vorp;
        p
    }

    fn tier_config(pairs: &[(&str, f64)]) -> TierConfig {
        TierConfig {
            tier_gap_points: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect::<HashMap<_, _>>(),
        }
    }

    #[test]
    fn scarcity_classification() {
        assert_eq!(Scarcity::classify(1, 15.0, 10.0), Scarcity::Cliff);
        assert_eq!(Scarcity::classify(1, 14.9, 10.0), Scarcity::Drop);
        assert_eq!(Scarcity::classify(12, 10.0, 10.0), Scarcity::Drop);
        assert_eq!(Scarcity::classify(13, 50.0, 10.0), Scarcity::None);
        assert_eq!(Scarcity::classify(3, 9.9, 10.0), Scarcity::None);
    }

    #[test]
    fn board_ranks_drops_and_tiers() {
        let players = vec![
            player("Wr C", Position::WideReceiver, 230.0, 10.0),
            player("Wr A", Position::WideReceiver, 300.0, 80.0),
            player("Qb A", Position::Quarterback, 350.0, 60.0),
            player("Wr B", Position::WideReceiver, 285.0, 65.0),
        ];
        let boards = build_boards(&players, &tier_config(&[("WR", 12.0)]));
        assert_eq!(boards.len(), 2);
        assert_eq!(boards[0].position, Position::Quarterback);
        // QB gap falls back to 10.
        assert_eq!(boards[0].gap, 10.0);

        let wr = board_for_position(&boards, Position::WideReceiver).unwrap();
        let names: Vec<&str> = wr.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Wr A", "Wr B", "Wr C"]);
        assert_eq!(wr.entries[1].pos_rank, 2);
        assert!(approx_eq(wr.entries[0].next_drop, 15.0, 1e-9));
        assert!(approx_eq(wr.entries[1].next_drop, 55.0, 1e-9));
        assert_eq!(wr.entries[2].next_drop, 0.0);
        assert_eq!(wr.entries[0].scarcity, Scarcity::Drop);
        assert_eq!(wr.entries[1].scarcity, Scarcity::Cliff);
        let tiers: Vec<u32> = wr.entries.iter().map(|e| e.tier).collect();
        assert_eq!(tiers, vec![1, 2, 3]);
    }

    #[test]
    fn summary_notes_and_mean_vorp() {
        let mut players = Vec::new();
        for i in 0..10 {
            players.push(player(&format!("Rb {i}"), Position::RunningBack, 200.0 - i as f64, 10.0));
        }
        players.push(player("Qb 1", Position::Quarterback, 300.0, 40.0));
        players.push(player("Qb 2", Position::Quarterback, 200.0, 0.0));
        let boards = build_boards(&players, &TierConfig::default());

        let summary = build_summary(&boards, &players, false);
        assert_eq!(summary.positions.len(), 2);
        let qb = &summary.positions[0];
        assert_eq!(qb.position, Position::Quarterback);
        assert_eq!(qb.tier1_size, 1);
        assert!(approx_eq(qb.top_mean_vorp, 20.0, 1e-9));
        assert_eq!(qb.note, "Scarce top tier");
        let rb = &summary.positions[1];
        assert_eq!(rb.tier1_size, 10);
        assert_eq!(rb.note, "Deep position");

        let sf = build_summary(&boards, &players, true);
        assert_eq!(sf.positions[0].note, "Superflex: target early");
    }

    #[test]
    fn value_picks_in_draft_order_capped() {
        let mut players: Vec<PlayerValuation> = (0..14)
            .map(|i| {
                let mut p = player(&format!("P {i}"), Position::WideReceiver, 100.0, 0.0);
                p.draft_rank = i + 1;
                p.adp = 50.0;
                p.adp_diff = if i % 2 == 0 { 20.0 } else { 5.0 };
                p
            })
            .collect();
        players[1].adp_diff = 15.0;
        let summary = build_summary(&[], &players, false);
        assert!(summary.positions.is_empty());
        assert_eq!(summary.value_picks.len(), 8);
        assert_eq!(summary.value_picks[0].draft_rank, 1);
        assert_eq!(summary.value_picks[1].draft_rank, 2);

        // Unknown ADP is never a value pick.
        players[0].adp = UNKNOWN_ADP;
        let summary = build_summary(&[], &players, false);
        assert_eq!(summary.value_picks.len(), 7);
        assert_eq!(summary.value_picks[0].draft_rank, 2);
    }
}
