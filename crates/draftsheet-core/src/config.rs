// Configuration loading and parsing (profiles.toml, strategy.toml).

use serde::Deserialize;
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::position::Position;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },

    #[error("unknown league profile `{name}`; available: {}", available.join(", "))]
    UnknownProfile { name: String, available: Vec<String> },

    #[error("unknown draft strategy `{name}`; available: {}", available.join(", "))]
    UnknownStrategy { name: String, available: Vec<String> },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub profile_name: String,
    pub league: LeagueConfig,
    pub scoring: ScoringConfig,
    pub tiers: TierConfig,
    pub consensus: ConsensusConfig,
    pub paths: DataPaths,
    /// `None` when the built-in statistical strategy is in use.
    pub strategy_name: Option<String>,
    pub strategy: DraftStrategy,
    /// Directory relative paths in `paths` are resolved against.
    pub base_dir: PathBuf,
}

impl Config {
    /// Resolve a configured path against the base directory.
    pub fn resolve(&self, path: &str) -> PathBuf {
        let p = Path::new(path);
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            self.base_dir.join(p)
        }
    }

    /// Every input file a ranking run reads, for change detection.
    pub fn watched_files(&self) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = self
            .paths
            .sources
            .iter()
            .map(|s| self.resolve(&s.path))
            .collect();
        if let Some(adp) = &self.paths.adp {
            files.push(self.resolve(adp));
        }
        if let Some(idp) = &self.paths.idp {
            files.push(self.resolve(idp));
        }
        let config_dir = self.base_dir.join("config");
        files.push(config_dir.join("profiles.toml"));
        files.push(config_dir.join("strategy.toml"));
        files
    }
}

// ---------------------------------------------------------------------------
// profiles.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire profiles.toml file.
#[derive(Debug, Clone, Deserialize)]
struct ProfilesFile {
    default_profile: String,
    profiles: BTreeMap<String, Profile>,
}

#[derive(Debug, Clone, Deserialize)]
struct Profile {
    league: LeagueConfig,
    #[serde(default)]
    scoring: ScoringConfig,
    #[serde(default)]
    tiers: TierConfig,
    #[serde(default)]
    consensus: ConsensusConfig,
    paths: DataPaths,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeagueConfig {
    pub num_teams: usize,
    #[serde(default)]
    pub superflex: bool,
    #[serde(default = "default_superflex_qb_per_team")]
    pub superflex_qb_per_team: usize,
    #[serde(default)]
    pub use_idp: bool,
    /// Starters per team, keyed by position label (QB, RB, ...).
    pub starters: HashMap<String, usize>,
    /// Bench depth per team, keyed by position label.
    #[serde(default)]
    pub bench_factor: HashMap<String, f64>,
}

fn default_superflex_qb_per_team() -> usize {
    2
}

impl LeagueConfig {
    /// Starting slots per team; positions not listed count as one.
    pub fn starters_for(&self, pos: Position) -> usize {
        self.starters.get(pos.display_str()).copied().unwrap_or(1)
    }

    /// Bench depth per team; positions not listed count as half a slot.
    pub fn bench_for(&self, pos: Position) -> f64 {
        self.bench_factor
            .get(pos.display_str())
            .copied()
            .unwrap_or(0.5)
    }
}

/// Per-statistic weights. Keys are scoring stat names such as `pass_yd`,
/// `rec`, `bonus_100_199_rush_game`, `tackle_solo`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoringConfig {
    #[serde(default)]
    pub offense: HashMap<String, f64>,
    #[serde(default)]
    pub idp: HashMap<String, f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TierConfig {
    /// Point drop that starts a new tier, per position label plus `FLEX`.
    #[serde(default)]
    pub tier_gap_points: HashMap<String, f64>,
}

const DEFAULT_TIER_GAP: f64 = 10.0;

impl TierConfig {
    pub fn gap_for(&self, pos: Position) -> f64 {
        self.tier_gap_points
            .get(pos.display_str())
            .copied()
            .unwrap_or(DEFAULT_TIER_GAP)
    }

    /// Gap used for the overall (all positions) ranking.
    pub fn flex_gap(&self) -> f64 {
        self.tier_gap_points
            .get("FLEX")
            .copied()
            .unwrap_or(DEFAULT_TIER_GAP)
    }
}

/// Which source supplies position/team when sources disagree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityPolicy {
    /// The first source (in configured order) that lists the player.
    #[default]
    FirstSource,
    /// The highest-weight source listing the player; earlier source on ties.
    HighestWeight,
}

/// How ADP rows are matched onto pool players.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameMatching {
    #[default]
    Normalized,
    /// Normalized match, then last-name heuristics for unmatched players.
    SurnameFallback,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConsensusConfig {
    #[serde(default = "default_min_sources")]
    pub min_sources: usize,
    /// Standard deviations beyond which a source's value is discarded.
    #[serde(default)]
    pub outlier_threshold: Option<f64>,
    #[serde(default)]
    pub identity_policy: IdentityPolicy,
    #[serde(default)]
    pub name_matching: NameMatching,
}

fn default_min_sources() -> usize {
    1
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        ConsensusConfig {
            min_sources: default_min_sources(),
            outlier_threshold: None,
            identity_policy: IdentityPolicy::default(),
            name_matching: NameMatching::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectionSource {
    pub name: String,
    pub path: String,
    #[serde(default = "default_weight")]
    pub weight: f64,
}

fn default_weight() -> f64 {
    1.0
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataPaths {
    #[serde(default)]
    pub sources: Vec<ProjectionSource>,
    #[serde(default)]
    pub adp: Option<String>,
    #[serde(default)]
    pub idp: Option<String>,
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

fn default_output_dir() -> String {
    "output".into()
}

// ---------------------------------------------------------------------------
// strategy.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire strategy.toml file.
#[derive(Debug, Clone, Default, Deserialize)]
struct StrategyFile {
    #[serde(default)]
    default_strategy: Option<String>,
    #[serde(default)]
    strategies: BTreeMap<String, DraftStrategy>,
}

/// Statistical round tiers that award a flat priority bonus.
#[derive(Debug, Clone, Deserialize)]
pub struct DraftStrategy {
    pub round_bonuses: Vec<RoundTier>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RoundTier {
    pub name: String,
    pub bonus: f64,
    /// Criteria keyed by position label. A position without criteria never
    /// qualifies for this tier.
    #[serde(default)]
    pub criteria: HashMap<String, RoundCriteria>,
}

/// Numeric gates for one position within a round tier. Unset gates pass.
///
/// `min_rank`/`max_rank` (and their positional variants) both mean "ranked
/// no worse than": the player's rank number must be at most the value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct RoundCriteria {
    #[serde(default)]
    pub min_vorp: Option<f64>,
    #[serde(default)]
    pub max_vorp: Option<f64>,
    #[serde(default)]
    pub min_rank: Option<usize>,
    #[serde(default)]
    pub max_rank: Option<usize>,
    #[serde(default)]
    pub min_pos_rank: Option<usize>,
    #[serde(default)]
    pub max_pos_rank: Option<usize>,
}

impl RoundCriteria {
    fn vorp_floor(v: f64) -> Self {
        RoundCriteria {
            min_vorp: Some(v),
            ..Default::default()
        }
    }

    fn vorp_and_top(v: f64, rank: usize) -> Self {
        RoundCriteria {
            min_vorp: Some(v),
            min_rank: Some(rank),
            ..Default::default()
        }
    }

    fn vorp_and_within(v: f64, rank: usize) -> Self {
        RoundCriteria {
            min_vorp: Some(v),
            max_rank: Some(rank),
            ..Default::default()
        }
    }
}

impl RoundTier {
    fn new(name: &str, bonus: f64, criteria: &[(&str, RoundCriteria)]) -> Self {
        RoundTier {
            name: name.into(),
            bonus,
            criteria: criteria
                .iter()
                .map(|(pos, c)| (pos.to_string(), *c))
                .collect(),
        }
    }
}

impl Default for DraftStrategy {
    /// Built-in statistical round tiers, used when no strategy is configured.
    fn default() -> Self {
        DraftStrategy {
            round_bonuses: vec![
                RoundTier::new(
                    "rounds_1_2",
                    50.0,
                    &[
                        ("WR", RoundCriteria::vorp_and_top(50.0, 5)),
                        ("QB", RoundCriteria::vorp_and_top(80.0, 3)),
                    ],
                ),
                RoundTier::new(
                    "round_3",
                    40.0,
                    &[
                        ("RB", RoundCriteria::vorp_and_top(70.0, 8)),
                        ("DL", RoundCriteria::vorp_and_top(50.0, 5)),
                    ],
                ),
                RoundTier::new(
                    "rounds_4_5",
                    35.0,
                    &[
                        ("DL", RoundCriteria::vorp_and_within(20.0, 15)),
                        ("LB", RoundCriteria::vorp_and_within(15.0, 12)),
                        ("QB", RoundCriteria::vorp_and_within(60.0, 8)),
                        ("RB", RoundCriteria::vorp_and_within(20.0, 20)),
                        ("WR", RoundCriteria::vorp_and_within(20.0, 20)),
                    ],
                ),
                RoundTier::new(
                    "rounds_6_7",
                    20.0,
                    &[
                        ("QB", RoundCriteria::vorp_and_within(40.0, 15)),
                        ("RB", RoundCriteria::vorp_and_within(10.0, 30)),
                        ("WR", RoundCriteria::vorp_and_within(10.0, 30)),
                    ],
                ),
                RoundTier::new(
                    "rounds_8_plus",
                    12.0,
                    &[
                        ("DL", RoundCriteria::vorp_floor(-10.0)),
                        ("LB", RoundCriteria::vorp_floor(-10.0)),
                        ("DB", RoundCriteria::vorp_floor(-10.0)),
                        ("QB", RoundCriteria::vorp_and_within(20.0, 25)),
                        ("RB", RoundCriteria::vorp_and_within(-10.0, 50)),
                        ("WR", RoundCriteria::vorp_and_within(-10.0, 50)),
                        ("TE", RoundCriteria::vorp_and_within(-10.0, 30)),
                    ],
                ),
            ],
        }
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/profiles.toml` and
/// (optionally) `config/strategy.toml`, relative to `base_dir`.
///
/// `profile` and `strategy` select named entries; `None` falls back to the
/// file's `default_profile` / `default_strategy`. With no strategy selected
/// anywhere, the built-in statistical tiers apply.
///
/// This does not copy defaults; prefer `load_config()`.
pub fn load_config_from(
    base_dir: &Path,
    profile: Option<&str>,
    strategy: Option<&str>,
) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    // --- profiles.toml (required) ---
    let profiles_path = config_dir.join("profiles.toml");
    let profiles_text = read_file(&profiles_path)?;
    let mut profiles_file: ProfilesFile =
        toml::from_str(&profiles_text).map_err(|e| ConfigError::ParseError {
            path: profiles_path.clone(),
            source: e,
        })?;

    let profile_name = profile
        .map(str::to_string)
        .unwrap_or_else(|| profiles_file.default_profile.clone());
    let selected = profiles_file
        .profiles
        .remove(&profile_name)
        .ok_or_else(|| ConfigError::UnknownProfile {
            name: profile_name.clone(),
            available: profiles_file.profiles.keys().cloned().collect(),
        })?;

    // --- strategy.toml (optional) ---
    let strategy_path = config_dir.join("strategy.toml");
    let mut strategy_file = if strategy_path.exists() {
        let text = read_file(&strategy_path)?;
        toml::from_str(&text).map_err(|e| ConfigError::ParseError {
            path: strategy_path.clone(),
            source: e,
        })?
    } else {
        StrategyFile::default()
    };

    let strategy_name = strategy
        .map(str::to_string)
        .or_else(|| strategy_file.default_strategy.clone());
    let draft_strategy = match &strategy_name {
        Some(name) => strategy_file.strategies.remove(name).ok_or_else(|| {
            ConfigError::UnknownStrategy {
                name: name.clone(),
                available: strategy_file.strategies.keys().cloned().collect(),
            }
        })?,
        None => DraftStrategy::default(),
    };

    let config = Config {
        profile_name,
        league: selected.league,
        scoring: selected.scoring,
        tiers: selected.tiers,
        consensus: selected.consensus,
        paths: selected.paths,
        strategy_name,
        strategy: draft_strategy,
        base_dir: base_dir.to_path_buf(),
    };

    validate(&config)?;

    Ok(config)
}

/// Config files under `config/`, with the shipped text compiled in for base
/// directories that have no `defaults/`.
const DEFAULT_FILES: &[(&str, &str)] = &[
    ("profiles.toml", include_str!("../../../defaults/profiles.toml")),
    ("strategy.toml", include_str!("../../../defaults/strategy.toml")),
];

/// Create each missing file in `config/`, taking its text from `defaults/`
/// when present and from the built-in copy otherwise. Existing files are
/// left alone. Returns the files that were created.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let config_dir = base_dir.join("config");
    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create {}: {e}", config_dir.display()),
    })?;

    let mut created = Vec::new();
    for &(name, builtin) in DEFAULT_FILES {
        let target = config_dir.join(name);
        if target.exists() {
            continue;
        }
        let local = base_dir.join("defaults").join(name);
        let text = if local.is_file() {
            Cow::Owned(std::fs::read_to_string(&local).map_err(|e| {
                ConfigError::DefaultsCopyError {
                    message: format!("failed to read {}: {e}", local.display()),
                }
            })?)
        } else {
            Cow::Borrowed(builtin)
        };
        std::fs::write(&target, text.as_bytes()).map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to write {}: {e}", target.display()),
        })?;
        created.push(target);
    }

    Ok(created)
}

/// Convenience wrapper: loads config relative to the current working directory.
/// Ensures default config files are copied before loading.
pub fn load_config(profile: Option<&str>, strategy: Option<&str>) -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd, profile, strategy)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

fn invalid(field: impl Into<String>, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.into(),
        message: message.into(),
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    let league = &config.league;
    if league.num_teams == 0 {
        return Err(invalid("league.num_teams", "must be greater than 0"));
    }
    if league.superflex && league.superflex_qb_per_team == 0 {
        return Err(invalid(
            "league.superflex_qb_per_team",
            "must be greater than 0 in superflex leagues",
        ));
    }
    for key in league.starters.keys().chain(league.bench_factor.keys()) {
        if Position::parse(key).is_none() {
            return Err(invalid(
                format!("league.{key}"),
                "not a recognized position",
            ));
        }
    }
    for (pos, factor) in &league.bench_factor {
        if *factor < 0.0 || !factor.is_finite() {
            return Err(invalid(
                format!("league.bench_factor.{pos}"),
                format!("must be >= 0, got {factor}"),
            ));
        }
    }

    for (pos, gap) in &config.tiers.tier_gap_points {
        if *gap <= 0.0 || !gap.is_finite() {
            return Err(invalid(
                format!("tiers.tier_gap_points.{pos}"),
                format!("must be > 0, got {gap}"),
            ));
        }
    }

    let consensus = &config.consensus;
    if consensus.min_sources == 0 {
        return Err(invalid("consensus.min_sources", "must be at least 1"));
    }
    if let Some(t) = consensus.outlier_threshold {
        if t <= 0.0 || !t.is_finite() {
            return Err(invalid(
                "consensus.outlier_threshold",
                format!("must be > 0, got {t}"),
            ));
        }
    }

    if config.paths.sources.is_empty() {
        return Err(invalid("paths.sources", "at least one source is required"));
    }
    for source in &config.paths.sources {
        if source.weight <= 0.0 || !source.weight.is_finite() {
            return Err(invalid(
                format!("paths.sources.{}.weight", source.name),
                format!("must be > 0, got {}", source.weight),
            ));
        }
    }

    for tier in &config.strategy.round_bonuses {
        for pos in tier.criteria.keys() {
            if Position::parse(pos).is_none() {
                return Err(invalid(
                    format!("round_bonuses.{}.criteria.{pos}", tier.name),
                    "not a recognized position",
                ));
            }
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    /// Repository root holding `defaults/`.
    fn project_root() -> PathBuf {
        let manifest = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        let root = manifest.join("../..");
        if root.join("defaults").exists() {
            root
        } else {
            panic!("Cannot locate defaults/ directory from {:?}", manifest);
        }
    }

    /// Fresh temp base dir with the shipped defaults copied into config/.
    fn temp_base(name: &str) -> PathBuf {
        let tmp = std::env::temp_dir().join(name);
        let _ = fs::remove_dir_all(&tmp);
        let config_dir = tmp.join("config");
        fs::create_dir_all(&config_dir).unwrap();
        let root = project_root();
        fs::copy(
            root.join("defaults/profiles.toml"),
            config_dir.join("profiles.toml"),
        )
        .unwrap();
        fs::copy(
            root.join("defaults/strategy.toml"),
            config_dir.join("strategy.toml"),
        )
        .unwrap();
        tmp
    }

    #[test]
    fn load_default_profile_from_project_files() {
        let tmp = temp_base("draftsheet_config_default");
        let config = load_config_from(&tmp, None, None).expect("should load valid config");

        assert_eq!(config.profile_name, "redraft_12team");
        assert_eq!(config.league.num_teams, 12);
        assert!(!config.league.superflex);
        assert_eq!(config.league.starters_for(Position::RunningBack), 2);
        assert_eq!(config.league.bench_for(Position::Quarterback), 0.5);
        assert_eq!(config.scoring.offense.get("pass_td"), Some(&4.0));
        assert_eq!(config.scoring.offense.get("rec"), Some(&1.0));
        assert_eq!(config.tiers.gap_for(Position::Quarterback), 15.0);
        assert_eq!(config.tiers.flex_gap(), 12.0);
        assert_eq!(config.consensus.min_sources, 1);
        assert_eq!(config.consensus.outlier_threshold, Some(2.0));
        assert_eq!(config.consensus.identity_policy, IdentityPolicy::FirstSource);
        assert_eq!(config.paths.sources.len(), 3);
        assert_eq!(config.strategy_name, None);
        assert_eq!(config.strategy.round_bonuses.len(), 5);

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn select_named_profile_and_strategy() {
        let tmp = temp_base("draftsheet_config_named");
        let config = load_config_from(&tmp, Some("superflex_idp"), Some("market_heavy"))
            .expect("should load named profile");

        assert!(config.league.superflex);
        assert!(config.league.use_idp);
        assert_eq!(config.league.superflex_qb_per_team, 2);
        assert_eq!(config.consensus.identity_policy, IdentityPolicy::HighestWeight);
        assert_eq!(config.consensus.name_matching, NameMatching::SurnameFallback);
        assert_eq!(config.strategy_name.as_deref(), Some("market_heavy"));
        assert!(!config.strategy.round_bonuses.is_empty());
        assert!(config.scoring.idp.contains_key("tackle_solo"));

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn unknown_profile_lists_alternatives() {
        let tmp = temp_base("draftsheet_config_unknown_profile");
        let err = load_config_from(&tmp, Some("dynasty"), None).unwrap_err();
        match err {
            ConfigError::UnknownProfile { name, available } => {
                assert_eq!(name, "dynasty");
                assert!(available.contains(&"redraft_12team".to_string()));
            }
            other => panic!("expected UnknownProfile, got {other:?}"),
        }
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn unknown_strategy_is_error() {
        let tmp = temp_base("draftsheet_config_unknown_strategy");
        let err = load_config_from(&tmp, None, Some("zero_rb")).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownStrategy { .. }));
        assert!(err.to_string().contains("market_heavy"));
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn missing_strategy_file_uses_builtin_tiers() {
        let tmp = temp_base("draftsheet_config_no_strategy");
        fs::remove_file(tmp.join("config/strategy.toml")).unwrap();
        let config = load_config_from(&tmp, None, None).unwrap();
        assert_eq!(config.strategy.round_bonuses[0].name, "rounds_1_2");
        assert_eq!(config.strategy.round_bonuses[0].bonus, 50.0);
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn missing_profiles_file_is_not_found() {
        let tmp = std::env::temp_dir().join("draftsheet_config_missing");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("config")).unwrap();
        let err = load_config_from(&tmp, None, None).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
        let _ = fs::remove_dir_all(&tmp);
    }

    fn write_profiles(name: &str, body: &str) -> PathBuf {
        let tmp = std::env::temp_dir().join(name);
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("config")).unwrap();
        fs::write(tmp.join("config/profiles.toml"), body).unwrap();
        tmp
    }

    const MINIMAL_PROFILE: &str = r#"
default_profile = "p"

[profiles.p.league]
num_teams = 10
starters = { QB = 1, RB = 2 }

[[profiles.p.paths.sources]]
name = "only"
path = "only.csv"
"#;

    #[test]
    fn minimal_profile_gets_defaults() {
        let tmp = write_profiles("draftsheet_config_minimal", MINIMAL_PROFILE);
        let config = load_config_from(&tmp, None, None).unwrap();
        assert_eq!(config.paths.sources[0].weight, 1.0);
        assert_eq!(config.paths.output_dir, "output");
        assert_eq!(config.consensus.min_sources, 1);
        assert_eq!(config.consensus.outlier_threshold, None);
        assert_eq!(config.tiers.gap_for(Position::TightEnd), 10.0);
        assert_eq!(config.league.starters_for(Position::TightEnd), 1);
        assert_eq!(config.resolve("only.csv"), tmp.join("only.csv"));
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn zero_teams_rejected() {
        let body = MINIMAL_PROFILE.replace("num_teams = 10", "num_teams = 0");
        let tmp = write_profiles("draftsheet_config_zero_teams", &body);
        let err = load_config_from(&tmp, None, None).unwrap_err();
        match err {
            ConfigError::ValidationError { field, .. } => assert_eq!(field, "league.num_teams"),
            other => panic!("expected ValidationError, got {other:?}"),
        }
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn non_positive_weight_rejected() {
        let body = format!("{MINIMAL_PROFILE}weight = 0.0\n");
        let tmp = write_profiles("draftsheet_config_zero_weight", &body);
        let err = load_config_from(&tmp, None, None).unwrap_err();
        assert!(err.to_string().contains("weight"));
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn unknown_starter_position_rejected() {
        let body = MINIMAL_PROFILE.replace("RB = 2", "OL = 5");
        let tmp = write_profiles("draftsheet_config_bad_pos", &body);
        let err = load_config_from(&tmp, None, None).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { .. }));
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_files_copies_missing_only() {
        let tmp = std::env::temp_dir().join("draftsheet_config_ensure");
        let _ = fs::remove_dir_all(&tmp);
        let defaults = tmp.join("defaults");
        fs::create_dir_all(&defaults).unwrap();
        fs::write(defaults.join("profiles.toml"), "a").unwrap();
        fs::write(defaults.join("strategy.toml"), "b").unwrap();
        fs::write(defaults.join("profiles.toml.example"), "c").unwrap();
        fs::create_dir_all(tmp.join("config")).unwrap();
        fs::write(tmp.join("config/strategy.toml"), "user edit").unwrap();

        let copied = ensure_config_files(&tmp).unwrap();
        assert_eq!(copied, vec![tmp.join("config/profiles.toml")]);
        assert_eq!(
            fs::read_to_string(tmp.join("config/strategy.toml")).unwrap(),
            "user edit"
        );
        assert!(!tmp.join("config/profiles.toml.example").exists());
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_files_falls_back_to_builtin_text() {
        let tmp = std::env::temp_dir().join("draftsheet_config_builtin");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(&tmp).unwrap();

        let copied = ensure_config_files(&tmp).unwrap();
        assert_eq!(
            copied,
            vec![tmp.join("config/profiles.toml"), tmp.join("config/strategy.toml")]
        );
        let shipped = fs::read_to_string(project_root().join("defaults/profiles.toml")).unwrap();
        assert_eq!(fs::read_to_string(&copied[0]).unwrap(), shipped);

        let config = load_config_from(&tmp, None, None).unwrap();
        assert_eq!(config.profile_name, "redraft_12team");
        assert!(ensure_config_files(&tmp).unwrap().is_empty());
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn builtin_strategy_bonuses_descend() {
        let strategy = DraftStrategy::default();
        let bonuses: Vec<f64> = strategy.round_bonuses.iter().map(|t| t.bonus).collect();
        assert_eq!(bonuses, vec![50.0, 40.0, 35.0, 20.0, 12.0]);
        let te = strategy.round_bonuses[4].criteria.get("TE").copied().unwrap();
        assert_eq!(te.min_vorp, Some(-10.0));
        assert_eq!(te.max_rank, Some(30));
    }
}
