//! Configuration system: TOML file + env var overrides + defaults.

#![allow(missing_docs)]

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::errors::{Result, SwcError};
use crate::logger::jsonl::JsonlConfig;
use crate::puzzle::level::LevelCatalog;
use crate::session::model::{PracticeSettings, PracticeType, SessionSettings};

/// Full Switch Challenge configuration model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    /// Fixed RNG seed for reproducible puzzle sequences.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub assessment: AssessmentConfig,
    pub practice: PracticeConfig,
    pub logging: LoggingConfig,
    pub paths: PathsConfig,
    /// Replaces the built-in level catalog when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub levels: Option<LevelCatalog>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AssessmentConfig {
    pub rounds: u32,
    pub time_limit_secs: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PracticeConfig {
    pub advance_delay_ms: u64,
    /// Share of random-phase draws taken from the harder levels.
    pub random_harder_weight: f64,
    pub default_type: PracticeType,
    /// Zero-based level index preselected on the practice setup screen.
    pub default_start_level: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    pub enabled: bool,
    pub activity_log: PathBuf,
    pub max_size_bytes: u64,
    pub max_rotated_files: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PathsConfig {
    pub config_file: PathBuf,
}

impl Default for AssessmentConfig {
    fn default() -> Self {
        Self {
            rounds: 24,
            time_limit_secs: 300,
        }
    }
}

impl Default for PracticeConfig {
    fn default() -> Self {
        Self {
            advance_delay_ms: 500,
            random_harder_weight: 0.8,
            default_type: PracticeType::Progressive,
            default_start_level: 0,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            activity_log: default_activity_log_path(),
            max_size_bytes: 10 * 1024 * 1024,
            max_rotated_files: 3,
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            config_file: home_dir()
                .join(".config")
                .join("switch-challenge")
                .join("config.toml"),
        }
    }
}

fn home_dir() -> PathBuf {
    env::var_os("HOME").map_or_else(
        || {
            eprintln!("[SWC-CONFIG] WARNING: HOME not set, falling back to /tmp for data paths");
            PathBuf::from("/tmp")
        },
        PathBuf::from,
    )
}

/// Default location of the JSONL activity log.
#[must_use]
pub fn default_activity_log_path() -> PathBuf {
    home_dir()
        .join(".local")
        .join("share")
        .join("switch-challenge")
        .join("activity.jsonl")
}

impl Config {
    /// Default config file path.
    #[must_use]
    pub fn default_path() -> PathBuf {
        PathsConfig::default().config_file
    }

    /// Load config from a TOML file, apply `SWC_*` env overrides, validate.
    ///
    /// A missing file at the default path yields defaults; a missing file at
    /// an explicit path is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, env_var)
    }

    /// [`load`](Self::load) with an injectable environment lookup.
    pub fn load_with_env<F>(path: Option<&Path>, lookup: F) -> Result<Self>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let path_buf = path.map_or_else(Self::default_path, Path::to_path_buf);
        let is_explicit_path = path.is_some();

        let mut cfg = if path_buf.exists() {
            let raw =
                fs::read_to_string(&path_buf).map_err(|source| SwcError::io(&path_buf, source))?;
            toml::from_str::<Self>(&raw)?
        } else if is_explicit_path {
            return Err(SwcError::MissingConfig { path: path_buf });
        } else {
            Self::default()
        };

        cfg.paths.config_file = path_buf;
        cfg.apply_env_overrides_from(lookup)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Deterministic fingerprint of the effective configuration (FNV-1a over
    /// its JSON form).
    pub fn stable_hash(&self) -> Result<String> {
        let canonical = serde_json::to_string(self)?;
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in canonical.as_bytes() {
            hash ^= u64::from(*byte);
            hash = hash.wrapping_mul(0x0100_0000_01b3);
        }
        Ok(format!("{hash:016x}"))
    }

    /// Effective level catalog.
    #[must_use]
    pub fn catalog(&self) -> LevelCatalog {
        self.levels.clone().unwrap_or_default()
    }

    #[must_use]
    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            assessment_rounds: self.assessment.rounds,
            time_limit_secs: self.assessment.time_limit_secs,
            advance_delay_ms: self.practice.advance_delay_ms,
            random_harder_weight: self.practice.random_harder_weight,
        }
    }

    /// Preselection for the practice setup screen.
    #[must_use]
    pub fn practice_defaults(&self) -> PracticeSettings {
        PracticeSettings {
            practice_type: self.practice.default_type,
            start_level: self.practice.default_start_level,
        }
    }

    #[must_use]
    pub fn jsonl_config(&self) -> JsonlConfig {
        JsonlConfig {
            path: self.logging.activity_log.clone(),
            max_size_bytes: self.logging.max_size_bytes,
            max_rotated_files: self.logging.max_rotated_files,
            ..JsonlConfig::default()
        }
    }

    fn apply_env_overrides_from<F>(&mut self, mut lookup: F) -> Result<()>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let mut get = |name: &str| lookup(name).filter(|raw| !raw.trim().is_empty());

        if let Some(raw) = get("SWC_SEED") {
            self.seed = Some(parse_env("SWC_SEED", &raw)?);
        }

        // assessment
        set_env("SWC_ASSESSMENT_ROUNDS", &mut get, &mut self.assessment.rounds)?;
        set_env(
            "SWC_ASSESSMENT_TIME_LIMIT_SECS",
            &mut get,
            &mut self.assessment.time_limit_secs,
        )?;

        // practice
        set_env(
            "SWC_PRACTICE_ADVANCE_DELAY_MS",
            &mut get,
            &mut self.practice.advance_delay_ms,
        )?;
        set_env(
            "SWC_PRACTICE_RANDOM_HARDER_WEIGHT",
            &mut get,
            &mut self.practice.random_harder_weight,
        )?;
        set_env(
            "SWC_PRACTICE_DEFAULT_START_LEVEL",
            &mut get,
            &mut self.practice.default_start_level,
        )?;
        if let Some(raw) = get("SWC_PRACTICE_DEFAULT_TYPE") {
            self.practice.default_type =
                raw.parse::<PracticeType>().map_err(|details| SwcError::ConfigParse {
                    context: "env",
                    details: format!("SWC_PRACTICE_DEFAULT_TYPE={raw:?}: {details}"),
                })?;
        }

        // logging
        if let Some(raw) = get("SWC_LOGGING_ENABLED") {
            self.logging.enabled = parse_env_bool("SWC_LOGGING_ENABLED", &raw)?;
        }
        if let Some(raw) = get("SWC_LOGGING_ACTIVITY_LOG") {
            self.logging.activity_log = PathBuf::from(raw.trim());
        }
        set_env(
            "SWC_LOGGING_MAX_SIZE_BYTES",
            &mut get,
            &mut self.logging.max_size_bytes,
        )?;
        set_env(
            "SWC_LOGGING_MAX_ROTATED_FILES",
            &mut get,
            &mut self.logging.max_rotated_files,
        )?;

        Ok(())
    }

    /// Reject configurations the game cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.assessment.rounds == 0 {
            return Err(SwcError::InvalidConfig {
                details: "assessment.rounds must be >= 1".to_string(),
            });
        }
        if self.assessment.time_limit_secs == 0 {
            return Err(SwcError::InvalidConfig {
                details: "assessment.time_limit_secs must be >= 1".to_string(),
            });
        }
        let weight = self.practice.random_harder_weight;
        if !(0.0..=1.0).contains(&weight) {
            return Err(SwcError::InvalidConfig {
                details: format!("practice.random_harder_weight must be in [0, 1], got {weight}"),
            });
        }
        let catalog = self.catalog();
        if self.practice.default_start_level > catalog.max_index() {
            return Err(SwcError::InvalidConfig {
                details: format!(
                    "practice.default_start_level {} is outside the catalog (0..={})",
                    self.practice.default_start_level,
                    catalog.max_index()
                ),
            });
        }
        if self.logging.enabled && self.logging.max_size_bytes == 0 {
            return Err(SwcError::InvalidConfig {
                details: "logging.max_size_bytes must be > 0 when logging is enabled".to_string(),
            });
        }
        Ok(())
    }
}

// ──────────────────── env helpers ────────────────────

fn env_var(name: &str) -> Option<String> {
    env::var(name).ok()
}

fn set_env<T, G>(name: &str, get: &mut G, slot: &mut T) -> Result<()>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    G: FnMut(&str) -> Option<String>,
{
    if let Some(raw) = get(name) {
        *slot = parse_env(name, &raw)?;
    }
    Ok(())
}

fn parse_env<T>(name: &str, raw: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse::<T>().map_err(|error| SwcError::ConfigParse {
        context: "env",
        details: format!("{name}={raw:?}: {error}"),
    })
}

fn parse_env_bool(name: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(SwcError::ConfigParse {
            context: "env",
            details: format!("{name}={raw:?}: expected a boolean"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    fn load_from(path: &Path, env: &HashMap<String, String>) -> Result<Config> {
        Config::load_with_env(Some(path), |name| env.get(name).cloned())
    }

    fn write_config(body: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, body).unwrap();
        (dir, path)
    }

    #[test]
    fn default_config_is_valid() {
        let cfg = Config::default();
        cfg.validate().unwrap();
        assert_eq!(cfg.session_settings(), SessionSettings::default());
        assert_eq!(cfg.catalog().len(), 11);
    }

    #[test]
    fn load_returns_error_for_explicit_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load_with_env(Some(&dir.path().join("absent.toml")), |_| None)
            .unwrap_err();
        assert_eq!(err.code(), "SWC-1002");
    }

    #[test]
    fn partial_file_keeps_defaults_for_missing_keys() {
        let (_dir, path) = write_config(
            r"
            [assessment]
            rounds = 10
            ",
        );
        let cfg = load_from(&path, &vars(&[])).unwrap();
        assert_eq!(cfg.assessment.rounds, 10);
        assert_eq!(cfg.assessment.time_limit_secs, 300);
        assert_eq!(cfg.paths.config_file, path);
    }

    #[test]
    fn custom_levels_replace_catalog() {
        let (_dir, path) = write_config(
            r#"
            seed = 7

            [[levels]]
            id = 1
            structure = ["M"]
            points = 50
            label = "warmup"

            [[levels]]
            id = 2
            structure = ["F", "M", "M"]
            points = 400
            label = "stretch"
            "#,
        );
        let cfg = load_from(&path, &vars(&[])).unwrap();
        assert_eq!(cfg.seed, Some(7));
        let catalog = cfg.catalog();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get(1).structure_tag(), "FMM");
    }

    #[test]
    fn invalid_custom_levels_rejected() {
        let (_dir, path) = write_config(
            r#"
            [[levels]]
            id = 1
            structure = ["F", "F"]
            points = 50
            label = "no mystery"
            "#,
        );
        let err = load_from(&path, &vars(&[])).unwrap_err();
        assert_eq!(err.code(), "SWC-1003");
        assert!(err.to_string().contains("no mystery layer"), "{err}");
    }

    #[test]
    fn env_overrides_apply() {
        let (_dir, path) = write_config("");
        let cfg = load_from(
            &path,
            &vars(&[
                ("SWC_ASSESSMENT_ROUNDS", "12"),
                ("SWC_ASSESSMENT_TIME_LIMIT_SECS", "90"),
                ("SWC_PRACTICE_RANDOM_HARDER_WEIGHT", "0.5"),
                ("SWC_PRACTICE_DEFAULT_TYPE", "random"),
                ("SWC_LOGGING_ENABLED", "off"),
                ("SWC_SEED", "42"),
            ]),
        )
        .unwrap();
        assert_eq!(cfg.assessment.rounds, 12);
        assert_eq!(cfg.assessment.time_limit_secs, 90);
        assert!((cfg.practice.random_harder_weight - 0.5).abs() < f64::EPSILON);
        assert_eq!(cfg.practice.default_type, PracticeType::Random);
        assert!(!cfg.logging.enabled);
        assert_eq!(cfg.seed, Some(42));
    }

    #[test]
    fn empty_env_values_are_ignored() {
        let (_dir, path) = write_config("");
        let cfg = load_from(&path, &vars(&[("SWC_ASSESSMENT_ROUNDS", "  ")])).unwrap();
        assert_eq!(cfg.assessment.rounds, 24);
    }

    #[test]
    fn env_invalid_values_rejected() {
        let (_dir, path) = write_config("");
        let err = load_from(&path, &vars(&[("SWC_ASSESSMENT_ROUNDS", "many")])).unwrap_err();
        assert_eq!(err.code(), "SWC-1003");
        let err = load_from(&path, &vars(&[("SWC_LOGGING_ENABLED", "maybe")])).unwrap_err();
        assert!(err.to_string().contains("SWC_LOGGING_ENABLED"));
        let err = load_from(&path, &vars(&[("SWC_PRACTICE_DEFAULT_TYPE", "chaos")])).unwrap_err();
        assert!(err.to_string().contains("chaos"));
    }

    #[test]
    fn zero_rounds_rejected() {
        let mut cfg = Config::default();
        cfg.assessment.rounds = 0;
        assert_eq!(cfg.validate().unwrap_err().code(), "SWC-1001");
    }

    #[test]
    fn harder_weight_out_of_range_rejected() {
        let mut cfg = Config::default();
        cfg.practice.random_harder_weight = 1.5;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn start_level_outside_catalog_rejected() {
        let mut cfg = Config::default();
        cfg.practice.default_start_level = 11;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("default_start_level"));
    }

    #[test]
    fn stable_hash_deterministic_and_sensitive() {
        let a = Config::default();
        let mut b = Config::default();
        assert_eq!(a.stable_hash().unwrap(), b.stable_hash().unwrap());
        b.assessment.time_limit_secs = 120;
        assert_ne!(a.stable_hash().unwrap(), b.stable_hash().unwrap());
    }

    #[test]
    fn jsonl_config_follows_logging_section() {
        let mut cfg = Config::default();
        cfg.logging.activity_log = PathBuf::from("/tmp/swc-test.jsonl");
        cfg.logging.max_rotated_files = 1;
        let jsonl = cfg.jsonl_config();
        assert_eq!(jsonl.path, PathBuf::from("/tmp/swc-test.jsonl"));
        assert_eq!(jsonl.max_rotated_files, 1);
    }
}
