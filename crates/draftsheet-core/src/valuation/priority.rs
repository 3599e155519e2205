// Draft priority: the composite score that orders the final cheat sheet.
//
// priority = talent * position multiplier
//          + statistical round bonus
//          + ADP reality check
//          + elite bonus + value bonus + reach penalty
//
// Talent is VORP rescaled to 0-60 over the pool plus points rescaled to 0-40.
// Replacement-or-worse players without a round bonus keep 30% of talent.

use std::cmp::Ordering;

use tracing::debug;

use crate::config::{DraftStrategy, RoundCriteria, RoundTier};
use crate::position::{Position, ALL_POSITIONS};
use crate::valuation::scoring::{PlayerValuation, PriorityBreakdown, UNKNOWN_ADP};
use crate::valuation::vorp::position_order;

const VORP_SCALE: f64 = 60.0;
const POINTS_SCALE: f64 = 40.0;
const NEGATIVE_VORP_DAMPING: f64 = 0.3;

// ---------------------------------------------------------------------------
// Pool aggregates
// ---------------------------------------------------------------------------

/// Pool-wide extremes needed before any single priority can be computed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoolAggregates {
    pub min_vorp: f64,
    pub max_vorp: f64,
    pub max_points: f64,
}

impl PoolAggregates {
    pub fn from_players(players: &[PlayerValuation]) -> Self {
        if players.is_empty() {
            return PoolAggregates {
                min_vorp: 0.0,
                max_vorp: 0.0,
                max_points: 0.0,
            };
        }
        PoolAggregates {
            min_vorp: players.iter().map(|p| p.vorp).fold(f64::INFINITY, f64::min),
            max_vorp: players.iter().map(|p| p.vorp).fold(f64::NEG_INFINITY, f64::max),
            max_points: players.iter().map(|p| p.points).fold(f64::NEG_INFINITY, f64::max),
        }
    }
}

// ---------------------------------------------------------------------------
// Components
// ---------------------------------------------------------------------------

/// Talent on a 0-100 scale before the position multiplier.
pub fn talent_score(vorp: f64, points: f64, agg: &PoolAggregates) -> f64 {
    let vorp_part = if agg.max_vorp != agg.min_vorp {
        (vorp - agg.min_vorp) / (agg.max_vorp - agg.min_vorp) * VORP_SCALE
    } else {
        VORP_SCALE / 2.0
    };
    let points_part = if agg.max_points > 0.0 {
        points / agg.max_points * POINTS_SCALE
    } else {
        0.0
    };
    vorp_part + points_part
}

/// Whether a player satisfies every gate set on `criteria`.
pub fn criteria_met(criteria: &RoundCriteria, vorp: f64, rank: usize, pos_rank: usize) -> bool {
    let within = |limit: Option<usize>, value: usize| limit.map_or(true, |l| value <= l);
    criteria.min_vorp.map_or(true, |m| vorp >= m)
        && criteria.max_vorp.map_or(true, |m| vorp <= m)
        && within(criteria.min_rank, rank)
        && within(criteria.max_rank, rank)
        && within(criteria.min_pos_rank, pos_rank)
        && within(criteria.max_pos_rank, pos_rank)
}

/// Market adjustment to a round bonus from the player's ADP bucket.
///
/// Unknown ADP (the 999 sentinel) is neutral.
pub fn adp_reality_check(position: Position, adp: f64, round_bonus: f64) -> f64 {
    if adp >= UNKNOWN_ADP {
        return 0.0;
    }
    let t = position.adp_thresholds();
    let high = round_bonus >= 35.0;
    let mid = round_bonus >= 20.0;

    if adp <= t.early {
        if high {
            0.0
        } else if mid {
            8.0
        } else {
            15.0
        }
    } else if adp <= t.mid {
        if high {
            -25.0
        } else if mid {
            -10.0
        } else {
            5.0
        }
    } else if adp <= t.late {
        if high {
            -40.0
        } else if mid {
            -25.0
        } else {
            0.0
        }
    } else if high {
        -50.0
    } else if mid {
        -35.0
    } else if round_bonus >= 10.0 {
        -15.0
    } else {
        0.0
    }
}

pub fn elite_bonus(rank: usize, vorp: f64) -> f64 {
    if rank <= 5 && vorp > 50.0 {
        20.0
    } else if rank <= 12 && vorp > 30.0 {
        15.0
    } else if rank <= 24 && vorp > 15.0 {
        10.0
    } else {
        0.0
    }
}

pub fn value_bonus(adp_diff: f64, vorp: f64) -> f64 {
    if adp_diff > 20.0 && vorp > 5.0 {
        8.0
    } else if adp_diff > 10.0 && vorp > 0.0 {
        4.0
    } else {
        0.0
    }
}

pub fn reach_penalty(adp: f64, adp_diff: f64) -> f64 {
    if adp < 50.0 && adp_diff < -15.0 {
        -15.0
    } else if adp_diff < -10.0 {
        -8.0
    } else {
        0.0
    }
}

// ---------------------------------------------------------------------------
// Calculator
// ---------------------------------------------------------------------------

/// Priority calculator over a draft strategy. Round tiers are evaluated from
/// the largest bonus down; equal bonuses keep configured order.
pub struct PriorityCalculator<'a> {
    tiers: Vec<&'a RoundTier>,
    superflex: bool,
}

impl<'a> PriorityCalculator<'a> {
    pub fn new(strategy: &'a DraftStrategy, superflex: bool) -> Self {
        let mut tiers: Vec<&RoundTier> = strategy.round_bonuses.iter().collect();
        tiers.sort_by(|a, b| b.bonus.total_cmp(&a.bonus));
        PriorityCalculator { tiers, superflex }
    }

    /// First (highest-bonus) tier whose criteria for this position all hold.
    pub fn round_tier(
        &self,
        position: Position,
        vorp: f64,
        rank: usize,
        pos_rank: usize,
    ) -> Option<&'a RoundTier> {
        self.tiers.iter().copied().find(|tier| {
            tier.criteria
                .get(position.display_str())
                .is_some_and(|c| criteria_met(c, vorp, rank, pos_rank))
        })
    }

    /// Every component of one player's priority.
    pub fn breakdown(&self, player: &PlayerValuation, agg: &PoolAggregates) -> PriorityBreakdown {
        let tier = self.round_tier(player.position, player.vorp, player.rank, player.pos_rank);
        let round_bonus = tier.map_or(0.0, |t| t.bonus);

        let mut talent = talent_score(player.vorp, player.points, agg);
        if player.vorp < 0.0 && round_bonus == 0.0 {
            talent = (talent * NEGATIVE_VORP_DAMPING).max(0.0);
        }

        PriorityBreakdown {
            talent: talent * player.position.talent_multiplier(self.superflex),
            round_bonus,
            round_tier: tier.map(|t| t.name.clone()),
            adp_adjustment: adp_reality_check(player.position, player.adp, round_bonus),
            elite_bonus: elite_bonus(player.rank, player.vorp),
            value_bonus: value_bonus(player.adp_diff, player.vorp),
            reach_penalty: reach_penalty(player.adp, player.adp_diff),
        }
    }
}

impl PriorityBreakdown {
    pub fn total(&self) -> f64 {
        self.talent
            + self.round_bonus
            + self.adp_adjustment
            + self.elite_bonus
            + self.value_bonus
            + self.reach_penalty
    }
}

/// Set `pos_rank`: 1-based order within each position by (Points, VORP)
/// descending; exact ties keep input order.
pub fn assign_position_ranks(players: &mut [PlayerValuation]) {
    for &pos in ALL_POSITIONS {
        let mut order = position_order(players, pos);
        order.sort_by(|&a, &b| {
            players[b]
                .points
                .total_cmp(&players[a].points)
                .then_with(|| players[b].vorp.total_cmp(&players[a].vorp))
        });
        for (i, idx) in order.into_iter().enumerate() {
            players[idx].pos_rank = i + 1;
        }
    }
}

/// Final ordering: priority descending, then VORP descending, then name,
/// then points rank.
fn draft_order(a: &PlayerValuation, b: &PlayerValuation) -> Ordering {
    b.draft_priority
        .total_cmp(&a.draft_priority)
        .then_with(|| b.vorp.total_cmp(&a.vorp))
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.rank.cmp(&b.rank))
}

/// Compute priority for every player, sort by it and assign `draft_rank`.
///
/// Expects `vorp`, `rank`, `adp` and `adp_diff` to be set.
pub fn apply_draft_priority(
    players: &mut [PlayerValuation],
    strategy: &DraftStrategy,
    superflex: bool,
) {
    assign_position_ranks(players);
    let agg = PoolAggregates::from_players(players);
    let calc = PriorityCalculator::new(strategy, superflex);

    for p in players.iter_mut() {
        let breakdown = calc.breakdown(p, &agg);
        p.draft_priority = breakdown.total();
        p.priority = breakdown;
    }

    players.sort_by(draft_order);
    for (i, p) in players.iter_mut().enumerate() {
        p.draft_rank = i + 1;
    }
    debug!(
        "draft priority assigned to {} players (VORP {:.1}..{:.1}, max points {:.1})",
        players.len(),
        agg.min_vorp,
        agg.max_vorp,
        agg.max_points
    );
}
