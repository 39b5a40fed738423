// Configuration loading and parsing (prophet.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const CONFIG_FILE: &str = "prophet.toml";

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

    #[error("no config found and no shipped defaults at {path}")]
    MissingDefaults { path: PathBuf },

    #[error("failed to write {path}: {source}")]
    SeedFailed {
        path: PathBuf,
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// prophet.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub wizard: WizardConfig,
    #[serde(default)]
    pub roster: RosterConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the prediction endpoint. Roster GETs append `?type=...`.
    pub endpoint: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            endpoint: "https://stat-prophet.vercel.app/api".into(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WizardConfig {
    pub sports: Vec<String>,
    pub default_sport: String,
    /// Show the sport step. When off, `default_sport` is preset.
    #[serde(default = "default_true")]
    pub sport_step: bool,
    #[serde(default = "default_true")]
    pub opponent_step: bool,
    /// Offer the Points+Rebounds+Assists composite line.
    #[serde(default)]
    pub combo_stat: bool,
}

impl Default for WizardConfig {
    fn default() -> Self {
        WizardConfig {
            sports: vec!["NBA".into()],
            default_sport: "NBA".into(),
            sport_step: true,
            opponent_step: true,
            combo_stat: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RosterConfig {
    #[serde(default = "default_max_search_results")]
    pub max_search_results: usize,
    /// Names shown when the search box is empty.
    #[serde(default)]
    pub featured: Vec<String>,
}

impl Default for RosterConfig {
    fn default() -> Self {
        RosterConfig {
            max_search_results: default_max_search_results(),
            featured: Vec::new(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_search_results() -> usize {
    12
}

fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate `config/prophet.toml` relative to `base_dir`.
///
/// Does not copy defaults; `load_config()` does that first.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join(CONFIG_FILE);
    let text = read_file(&path)?;
    let config: Config = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        source: e,
    })?;
    validate(&config)?;
    Ok(config)
}

/// Seeds `config/prophet.toml` from `defaults/prophet.toml` on first run.
/// Returns the path written, or `None` when a config is already in place.
pub fn seed_config(base_dir: &Path) -> Result<Option<PathBuf>, ConfigError> {
    let target = base_dir.join("config").join(CONFIG_FILE);
    if target.is_file() {
        return Ok(None);
    }
    let shipped = base_dir.join("defaults").join(CONFIG_FILE);
    if !shipped.is_file() {
        return Err(ConfigError::MissingDefaults { path: shipped });
    }

    let seed_err = |source: std::io::Error| ConfigError::SeedFailed {
        path: target.clone(),
        source,
    };
    if let Some(dir) = target.parent() {
        std::fs::create_dir_all(dir).map_err(seed_err)?;
    }
    std::fs::copy(&shipped, &target).map_err(seed_err)?;
    Ok(Some(target))
}

/// Loads config relative to the current working directory, copying
/// defaults first.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    if let Some(path) = seed_config(&cwd)? {
        tracing::info!("Seeded {} from defaults", path.display());
    }
    load_config_from(&cwd)
}

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.into(),
        message: message.into(),
    }
}

pub fn validate(config: &Config) -> Result<(), ConfigError> {
    let endpoint = config.api.endpoint.trim();
    if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
        return Err(invalid(
            "api.endpoint",
            format!("must be an http(s) URL, got {endpoint:?}"),
        ));
    }
    if config.api.timeout_secs == 0 {
        return Err(invalid("api.timeout_secs", "must be > 0"));
    }

    let wizard = &config.wizard;
    if wizard.sports.is_empty() || wizard.sports.iter().any(|s| s.trim().is_empty()) {
        return Err(invalid("wizard.sports", "must list at least one non-empty sport"));
    }
    if !wizard.sports.contains(&wizard.default_sport) {
        return Err(invalid(
            "wizard.default_sport",
            format!("{:?} is not one of wizard.sports", wizard.default_sport),
        ));
    }

    if config.roster.max_search_results == 0 {
        return Err(invalid("roster.max_search_results", "must be > 0"));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
