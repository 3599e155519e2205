// Market ADP join and the value labels derived from it.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::{debug, info};

use crate::config::NameMatching;
use crate::names::{NameKey, NameMatcher, NormalizedMatcher, SurnameMatcher};
use crate::valuation::schema::AdpEntry;
use crate::valuation::scoring::{PlayerValuation, UNKNOWN_ADP};

/// Market-vs-projection label from `ADP_Diff = Rank - ADP`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum DraftValue {
    #[serde(rename = "STEAL")]
    Steal,
    #[serde(rename = "VALUE")]
    Value,
    #[serde(rename = "REACH")]
    Reach,
    #[serde(rename = "EARLY")]
    Early,
    #[default]
    #[serde(rename = "")]
    None,
}

impl DraftValue {
    pub fn from_adp_diff(diff: f64) -> Self {
        if diff >= 20.0 {
            DraftValue::Steal
        } else if diff >= 10.0 {
            DraftValue::Value
        } else if diff <= -20.0 {
            DraftValue::Reach
        } else if diff <= -10.0 {
            DraftValue::Early
        } else {
            DraftValue::None
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DraftValue::Steal => "STEAL",
            DraftValue::Value => "VALUE",
            DraftValue::Reach => "REACH",
            DraftValue::Early => "EARLY",
            DraftValue::None => "",
        }
    }
}

/// Matcher implementing a configured name-matching mode.
pub fn matcher_for(mode: NameMatching) -> Box<dyn NameMatcher> {
    match mode {
        NameMatching::Normalized => Box::new(NormalizedMatcher),
        NameMatching::SurnameFallback => Box::new(SurnameMatcher),
    }
}

/// Attach ADP to pool players. Returns the number of players matched.
///
/// Exact key matches come first, one ADP row per player. A row that names a
/// position goes to the player with that key at that position. Remaining
/// rows go to the highest-points player with the key still without ADP,
/// earliest on ties. With `SurnameFallback`, players whose key has no ADP row
/// at all are looked up among the rows exact matching left unclaimed.
/// Everyone else stays at 999.
pub fn join_adp(
    players: &mut [PlayerValuation],
    entries: &[AdpEntry],
    mode: NameMatching,
) -> usize {
    let matcher = matcher_for(mode);
    let keys: Vec<NameKey> = entries.iter().map(|e| matcher.key(&e.name)).collect();

    // Pool players per key, best points first.
    let mut holders: HashMap<&NameKey, Vec<usize>> = HashMap::new();
    for (i, p) in players.iter().enumerate() {
        holders.entry(&p.key).or_default().push(i);
    }
    for idx in holders.values_mut() {
        idx.sort_by(|&a, &b| players[b].points.total_cmp(&players[a].points));
    }

    let mut assigned: Vec<Option<usize>> = vec![None; players.len()];
    let mut claimed = vec![false; entries.len()];
    // Rows naming a position go first so they reach the player at it.
    for positional in [true, false] {
        for (e, key) in keys.iter().enumerate() {
            if claimed[e] {
                continue;
            }
            let Some(candidates) = holders.get(key) else {
                continue;
            };
            let mut open = candidates.iter().copied().filter(|&i| assigned[i].is_none());
            let pick = if positional {
                entries[e]
                    .position
                    .and_then(|pos| open.find(|&i| players[i].position == pos))
            } else {
                open.next()
            };
            match pick {
                Some(i) => {
                    assigned[i] = Some(e);
                    claimed[e] = true;
                }
                None if !positional => {
                    debug!("duplicate ADP row for {}; no player left to take it", entries[e].name)
                }
                None => {}
            }
        }
    }

    if mode == NameMatching::SurnameFallback {
        let listed: HashSet<&NameKey> = keys.iter().collect();
        let mut open: Vec<usize> = (0..entries.len()).filter(|&e| !claimed[e]).collect();
        let mut names: Vec<&str> = open.iter().map(|&e| entries[e].name.as_str()).collect();
        for (i, p) in players.iter().enumerate() {
            let best_holder = holders.get(&p.key).and_then(|h| h.first()) == Some(&i);
            if assigned[i].is_some() || !best_holder || listed.contains(&p.key) {
                continue;
            }
            if let Some(pos) = matcher.find(&p.name, &names) {
                let e = open[pos];
                debug!("surname fallback matched {} to ADP row {}", p.name, entries[e].name);
                assigned[i] = Some(e);
                open.remove(pos);
                names.remove(pos);
            }
        }
    }

    let mut matched = 0;
    for (p, a) in players.iter_mut().zip(assigned) {
        p.adp = match a {
            Some(e) => {
                matched += 1;
                entries[e].adp
            }
            None => UNKNOWN_ADP,
        };
    }
    info!("ADP matched for {} of {} players", matched, players.len());
    matched
}
