// Player identity resolution across sources keyed only by display name.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Generational suffixes dropped before comparison. Checked case-insensitively
/// with and without a trailing period; only the first match is removed.
const NAME_SUFFIXES: &[&str] = &[" jr", " sr", " iii", " ii", " iv", " v"];

/// Canonical join key for a player name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NameKey(String);

impl NameKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NameKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalize a display name for cross-source joins.
///
/// Steps: trim, strip one generational suffix, remove apostrophes, periods and
/// hyphens, collapse whitespace, then title-case each word.
///
/// `"Amon-Ra St. Brown"` -> `"Amonra St Brown"`,
/// `"Marvin Harrison Jr."` -> `"Marvin Harrison"`.
pub fn normalize_player_name(name: &str) -> String {
    let mut base = name.trim().trim_matches('"').trim().to_string();

    let lower = base.to_lowercase();
    for suffix in NAME_SUFFIXES {
        let dotted = format!("{suffix}.");
        let cut = if lower.ends_with(&dotted) {
            Some(dotted.len())
        } else if lower.ends_with(suffix) {
            Some(suffix.len())
        } else {
            None
        };
        if let Some(len) = cut {
            if base.len() > len {
                base.truncate(base.len() - len);
            }
            break;
        }
    }

    let stripped: String = base
        .chars()
        .filter(|c| !matches!(c, '\'' | '\u{2019}' | '.' | '-'))
        .collect();

    stripped
        .split_whitespace()
        .map(title_case_word)
        .collect::<Vec<_>>()
        .join(" ")
}

fn title_case_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(|c| c.to_lowercase()))
            .collect(),
        None => String::new(),
    }
}

/// Seam for correlating the same player across independently formatted
/// tables. Swap implementations to tighten or loosen matching.
pub trait NameMatcher {
    /// Canonical key used for exact joins.
    fn key(&self, name: &str) -> NameKey;

    /// Index of the candidate that refers to `name`, if any.
    fn find(&self, name: &str, candidates: &[&str]) -> Option<usize>;
}

/// Exact match on the normalized name.
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizedMatcher;

impl NameMatcher for NormalizedMatcher {
    fn key(&self, name: &str) -> NameKey {
        NameKey(normalize_player_name(name))
    }

    fn find(&self, name: &str, candidates: &[&str]) -> Option<usize> {
        let key = self.key(name);
        candidates.iter().position(|c| self.key(c) == key)
    }
}

/// Normalized match first, then surname heuristics: same last name and first
/// initial, then a candidate whose last name starts with the player's.
///
/// Players sharing a surname can be mis-merged by the heuristic tiers; only
/// enable this where a missed join is worse than a wrong one.
#[derive(Debug, Clone, Copy, Default)]
pub struct SurnameMatcher;

impl NameMatcher for SurnameMatcher {
    fn key(&self, name: &str) -> NameKey {
        NormalizedMatcher.key(name)
    }

    fn find(&self, name: &str, candidates: &[&str]) -> Option<usize> {
        if let Some(idx) = NormalizedMatcher.find(name, candidates) {
            return Some(idx);
        }

        let target = normalize_player_name(name).to_lowercase();
        let parts: Vec<&str> = target.split_whitespace().collect();
        if parts.len() < 2 {
            return None;
        }
        let first = parts[0];
        let last = parts[parts.len() - 1];
        let initial = first.chars().next();

        let split: Vec<(Option<char>, String)> = candidates
            .iter()
            .map(|c| {
                let norm = normalize_player_name(c).to_lowercase();
                let mut words = norm.split_whitespace();
                let cand_initial = words.next().and_then(|w| w.chars().next());
                let cand_last = norm.split_whitespace().last().unwrap_or("").to_string();
                (cand_initial, cand_last)
            })
            .collect();

        split
            .iter()
            .position(|(ci, cl)| cl == last && *ci == initial)
            .or_else(|| split.iter().position(|(_, cl)| cl.starts_with(last)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hyphen_and_period_removed() {
        assert_eq!(normalize_player_name("Amon-Ra St. Brown"), "Amonra St Brown");
    }

    #[test]
    fn suffix_stripped() {
        assert_eq!(normalize_player_name("Marvin Harrison Jr."), "Marvin Harrison");
        assert_eq!(normalize_player_name("Michael Pittman Jr"), "Michael Pittman");
        assert_eq!(normalize_player_name("Kenneth Walker III"), "Kenneth Walker");
        assert_eq!(normalize_player_name("Brian Robinson II"), "Brian Robinson");
    }

    #[test]
    fn apostrophes_and_initials() {
        assert_eq!(normalize_player_name("Ja'Marr Chase"), "Jamarr Chase");
        assert_eq!(normalize_player_name("A.J. Brown"), "Aj Brown");
        assert_eq!(normalize_player_name("D\u{2019}Andre Swift"), "Dandre Swift");
    }

    #[test]
    fn whitespace_quotes_and_case() {
        assert_eq!(normalize_player_name("  \"CHRISTIAN   mccaffrey\" "), "Christian Mccaffrey");
    }

    #[test]
    fn inner_suffix_letters_untouched() {
        assert_eq!(normalize_player_name("Davante Adams"), "Davante Adams");
        assert_eq!(normalize_player_name("Travis Kelce"), "Travis Kelce");
    }

    #[test]
    fn normalized_keys_join_variants() {
        let m = NormalizedMatcher;
        assert_eq!(m.key("A.J. Brown"), m.key("AJ Brown"));
        assert_eq!(m.key("Marvin Harrison Jr."), m.key("marvin harrison"));
        assert_ne!(m.key("Josh Allen"), m.key("Josh Allen Jr. Smith"));
    }

    #[test]
    fn normalized_find_is_exact() {
        let candidates = ["Amon-Ra St. Brown", "Equanimeous St. Brown"];
        assert_eq!(NormalizedMatcher.find("Amon-Ra St Brown", &candidates), Some(0));
        assert_eq!(NormalizedMatcher.find("St. Brown", &candidates), None);
    }

    #[test]
    fn surname_matcher_prefers_exact_then_initial() {
        let candidates = ["Mike Williams", "Jameson Williams", "Javonte Williams"];
        assert_eq!(SurnameMatcher.find("Javonte Williams", &candidates), Some(2));
        // No exact hit: falls back to last name + first initial, first hit wins.
        assert_eq!(SurnameMatcher.find("Jay Williams", &candidates), Some(1));
    }

    #[test]
    fn surname_matcher_last_name_prefix() {
        let candidates = ["Kenneth Walker III", "Tyreek Hill"];
        assert_eq!(SurnameMatcher.find("Ken Walkerton", &candidates), None);
        assert_eq!(SurnameMatcher.find("Bob Walk", &candidates), Some(0));
    }

    #[test]
    fn surname_matcher_single_token_requires_exact() {
        let candidates = ["Hill"];
        assert_eq!(SurnameMatcher.find("Hill", &candidates), Some(0));
        assert_eq!(SurnameMatcher.find("Taysom", &candidates), None);
    }
}
