// Value Over Replacement Player.
//
// Each position's replacement level is the points total of the player at the
// replacement rank, where the rank is the number of rostered players at that
// position league-wide (starters plus a bench allowance).

use std::collections::BTreeMap;

use tracing::debug;

use crate::config::LeagueConfig;
use crate::position::{Position, ALL_POSITIONS};
use crate::valuation::scoring::PlayerValuation;

/// Rostered players at `position` league-wide:
/// `round(num_teams * (starters + bench_factor))`, at least 1.
///
/// Superflex leagues use `superflex_qb_per_team` as the QB starter count.
/// Halves round to even.
pub fn replacement_rank(position: Position, league: &LeagueConfig) -> usize {
    let starters = if position == Position::Quarterback && league.superflex {
        league.superflex_qb_per_team as f64
    } else {
        league.starters_for(position) as f64
    };
    let depth = league.num_teams as f64 * (starters + league.bench_for(position));
    (depth.round_ties_even() as usize).max(1)
}

/// Indices of players at `position`, best points first. Ties keep input order.
pub fn position_order(players: &[PlayerValuation], position: Position) -> Vec<usize> {
    let mut idx: Vec<usize> = (0..players.len())
        .filter(|&i| players[i].position == position)
        .collect();
    idx.sort_by(|&a, &b| players[b].points.total_cmp(&players[a].points));
    idx
}

/// Set `vorp` on every player and return the baseline used per position.
/// Positions with no players are skipped.
pub fn apply_vorp(
    players: &mut [PlayerValuation],
    league: &LeagueConfig,
) -> BTreeMap<Position, f64> {
    let mut baselines = BTreeMap::new();

    for &pos in ALL_POSITIONS {
        let order = position_order(players, pos);
        if order.is_empty() {
            continue;
        }
        let rank = replacement_rank(pos, league);
        let at = (rank - 1).min(order.len() - 1);
        let baseline = players[order[at]].points;

        for &i in &order {
            players[i].vorp = players[i].points - baseline;
        }
        debug!(
            "{}: replacement rank {} of {}, baseline {:.1}",
            pos,
            rank,
            order.len(),
            baseline
        );
        baselines.insert(pos, baseline);
    }

    baselines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::names::{NameMatcher, NormalizedMatcher};
    use crate::valuation::consensus::ConsensusRecord;
    use crate::valuation::projections::StatLine;
    use std::collections::HashMap;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    fn test_league_config() -> LeagueConfig {
        let starters: HashMap<String, usize> = [("QB", 1), ("RB", 2), ("WR", 2), ("TE", 1)]
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect();
        let bench_factor: HashMap<String, f64> = [("QB", 0.5), ("RB", 0.5), ("WR", 0.5), ("TE", 0.5)]
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect();
        LeagueConfig {
            num_teams: 12,
            superflex: false,
            superflex_qb_per_team: 2,
            use_idp: false,
            starters,
            bench_factor,
        }
    }

    fn player(name: &str, pos: Position, points: f64) -> PlayerValuation {
        let record = ConsensusRecord {
            key: NormalizedMatcher.key(name),
            name: name.into(),
            position: pos,
            team: None,
            stats: StatLine::new(),
            source_count: 1,
        };
        PlayerValuation::new(&record, points)
    }

    #[test]
    fn replacement_rank_twelve_team() {
        let league = test_league_config();
        assert_eq!(replacement_rank(Position::Quarterback, &league), 18);
        assert_eq!(replacement_rank(Position::RunningBack, &league), 30);
        assert_eq!(replacement_rank(Position::WideReceiver, &league), 30);
        assert_eq!(replacement_rank(Position::TightEnd, &league), 18);
        // Unlisted: 1 starter + 0.5 bench.
        assert_eq!(replacement_rank(Position::Kicker, &league), 18);
    }

    #[test]
    fn replacement_rank_superflex_qb() {
        let mut league = test_league_config();
        league.superflex = true;
        assert_eq!(replacement_rank(Position::Quarterback, &league), 30);
        assert_eq!(replacement_rank(Position::RunningBack, &league), 30);
    }

    #[test]
    fn replacement_rank_rounds_half_to_even_and_floors_at_one() {
        let mut league = test_league_config();
        league.num_teams = 1;
        // 1 * 1.5 = 1.5 -> 2
        assert_eq!(replacement_rank(Position::Quarterback, &league), 2);
        league.bench_factor.insert("QB".into(), 1.5);
        // 1 * 2.5 = 2.5 -> 2
        assert_eq!(replacement_rank(Position::Quarterback, &league), 2);
        league.starters.insert("TE".into(), 0);
        league.bench_factor.insert("TE".into(), 0.0);
        assert_eq!(replacement_rank(Position::TightEnd, &league), 1);
    }

    #[test]
    fn replacement_player_has_zero_vorp() {
        let league = test_league_config();
        let mut players: Vec<PlayerValuation> = (0..25)
            .map(|i| player(&format!("QB {i}"), Position::Quarterback, 400.0 - i as f64 * 10.0))
            .collect();
        let baselines = apply_vorp(&mut players, &league);

        // 18th best QB is index 17: 400 - 170 = 230.
        assert!(approx_eq(baselines[&Position::Quarterback], 230.0, 1e-9));
        assert!(approx_eq(players[17].vorp, 0.0, 1e-12));
        assert!(approx_eq(players[0].vorp, 170.0, 1e-9));
        assert!(players[24].vorp < 0.0);
    }

    #[test]
    fn short_position_clamps_to_last_player() {
        let league = test_league_config();
        let mut players = vec![
            player("Te A", Position::TightEnd, 200.0),
            player("Te B", Position::TightEnd, 150.0),
            player("Te C", Position::TightEnd, 120.0),
        ];
        apply_vorp(&mut players, &league);
        assert!(approx_eq(players[0].vorp, 80.0, 1e-9));
        assert!(approx_eq(players[2].vorp, 0.0, 1e-12));
    }

    #[test]
    fn unsorted_input_and_missing_positions() {
        let league = test_league_config();
        let mut players = vec![
            player("Low", Position::WideReceiver, 50.0),
            player("High", Position::WideReceiver, 250.0),
        ];
        let baselines = apply_vorp(&mut players, &league);
        assert_eq!(baselines.len(), 1);
        assert!(!baselines.contains_key(&Position::Quarterback));
        assert!(approx_eq(players[1].vorp, 200.0, 1e-9));
        assert!(approx_eq(players[0].vorp, 0.0, 1e-12));
    }
}
