//! Application configuration management.
//!
//! Settings are layered with `figment`, lowest priority first:
//!
//! 1. built-in defaults ([`Config::default`])
//! 2. a TOML file (the platform config dir, or an explicit `--config` path)
//! 3. environment variables prefixed with `DUPFIND_`
//! 4. command-line flags (applied by the caller on the extracted value)
//!
//! ```toml
//! io_threads = 8
//! algorithm = "blake3"
//! trash_method = "xdg"
//! extra_exclusions = ["node_modules", "*.tmp"]
//! ```

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::actions::TrashMethod;
use crate::scanner::{HashAlgorithm, DEFAULT_BLOCK_SIZE};

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "DUPFIND_";

/// Name of the configuration file inside the platform config dir.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Errors raised while loading or validating configuration.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// An enumerated setting got a value outside its candidates.
    #[error("unknown {key} '{value}'{}", hint(.suggestion.as_deref(), .candidates))]
    UnknownValue {
        /// Setting name
        key: String,
        /// Value as supplied
        value: String,
        /// Closest candidate, if one is close enough
        suggestion: Option<String>,
        /// Accepted values
        candidates: Vec<String>,
    },

    /// A numeric setting is out of range.
    #[error("{key} must be {requirement}, got {value}")]
    OutOfRange {
        /// Setting name
        key: &'static str,
        /// Human-readable constraint
        requirement: &'static str,
        /// Value as supplied
        value: u64,
    },

    /// An explicitly requested config file does not exist.
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    /// A provider failed or a value had the wrong shape.
    #[error("invalid configuration: {0}")]
    Invalid(#[from] Box<figment::Error>),

    /// The effective configuration could not be rendered.
    #[error("failed to render configuration: {0}")]
    Render(#[from] toml::ser::Error),
}

/// Minimum similarity for a "did you mean" suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.8;

fn hint(suggestion: Option<&str>, candidates: &[String]) -> String {
    match suggestion {
        Some(s) => format!(", did you mean '{}'?", s),
        None => format!(" (expected one of: {})", candidates.join(", ")),
    }
}

impl ConfigError {
    /// Build an [`ConfigError::UnknownValue`], picking the closest candidate
    /// by Jaro-Winkler similarity.
    pub fn unknown_value<'a, I>(key: &str, value: &str, candidates: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let candidates: Vec<String> = candidates.into_iter().map(str::to_string).collect();
        let wanted = value.trim().to_ascii_lowercase();

        let suggestion = candidates
            .iter()
            .map(|c| (c, strsim::jaro_winkler(&wanted, c)))
            .filter(|(_, score)| *score >= SUGGESTION_THRESHOLD)
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(c, _)| c.clone());

        Self::UnknownValue {
            key: key.to_string(),
            value: value.to_string(),
            suggestion,
            candidates,
        }
    }
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        Self::Invalid(Box::new(e))
    }
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Worker threads for the hash phase.
    pub io_threads: usize,
    /// Read block size for hashing, in bytes.
    pub block_size: usize,
    /// Content digest algorithm.
    pub algorithm: HashAlgorithm,
    /// How removed duplicates are disposed of.
    pub trash_method: TrashMethod,
    /// Upper bound on a trash subprocess, in seconds.
    pub trash_timeout_secs: u64,
    /// Names and globs excluded on top of the built-in denylist.
    pub extra_exclusions: Vec<String>,
    /// Order duplicate groups by size, largest first.
    pub sort_by_size: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            io_threads: 4,
            block_size: DEFAULT_BLOCK_SIZE,
            algorithm: HashAlgorithm::default(),
            trash_method: TrashMethod::default(),
            trash_timeout_secs: 10,
            extra_exclusions: Vec::new(),
            sort_by_size: true,
        }
    }
}

impl Config {
    /// Load defaults, the config file and the environment.
    ///
    /// With `explicit_path`, that file must exist. Without it, the platform
    /// config file is used when present and silently skipped otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the explicit file is missing, a layer cannot be
    /// parsed, or a value fails validation.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match explicit_path {
            Some(path) if !path.is_file() => {
                return Err(ConfigError::FileNotFound(path.to_path_buf()))
            }
            Some(path) => Some(path.to_path_buf()),
            None => Self::default_path().filter(|p| p.is_file()),
        };

        if let Some(ref path) = file {
            log::debug!("Loading configuration from {}", path.display());
        }

        let config: Config = Self::figment(file.as_deref()).extract()?;
        config.validate()?;
        Ok(config)
    }

    /// The layered provider stack, without validation.
    #[must_use]
    pub fn figment(file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = file {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Platform-specific config file location.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "dupfind", "dupfind")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    /// Check numeric ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::OutOfRange`] for the first offending value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.io_threads == 0 {
            return Err(ConfigError::OutOfRange {
                key: "io_threads",
                requirement: "at least 1",
                value: 0,
            });
        }
        if self.block_size == 0 {
            return Err(ConfigError::OutOfRange {
                key: "block_size",
                requirement: "at least 1",
                value: 0,
            });
        }
        if self.trash_timeout_secs == 0 {
            return Err(ConfigError::OutOfRange {
                key: "trash_timeout_secs",
                requirement: "at least 1",
                value: 0,
            });
        }
        Ok(())
    }

    /// Render the effective configuration as TOML.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Render`] if serialization fails.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}
