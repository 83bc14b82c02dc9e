//! Configuration for the dialectic engine.
//!
//! Read from `~/.dialectic/config.toml`, or from the file named by
//! `DIALECTIC_CONFIG`. Every section is optional; absent values fall back to
//! the engine defaults.

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use dialectic_types::{CompositionMode, Phase, ScopingStrategy};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "DIALECTIC_CONFIG";

#[derive(Debug, Default, Deserialize)]
pub struct DialecticConfig {
    pub stepper: Option<StepperConfig>,
    pub compiler: Option<CompilerConfig>,
    pub solver: Option<SolverConfig>,
    pub logging: Option<LoggingConfig>,
}

/// ```toml
/// [stepper]
/// max_pairs = 256
/// phase = "neutral"
/// composition = "assoc"
/// cancel_check_interval = 32
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct StepperConfig {
    /// Fuel used when a step request does not name its own.
    pub max_pairs: Option<usize>,
    pub phase: Option<Phase>,
    pub composition: Option<CompositionMode>,
    pub cancel_check_interval: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CompilerConfig {
    pub scoping: Option<ScopingStrategy>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SolverConfig {
    /// Largest AF handed to the brute-force preferred enumerator.
    pub max_preferred_nodes: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoggingConfig {
    /// `tracing` filter directive, e.g. `"info,dialectic_engine=debug"`.
    pub filter: Option<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl ConfigError {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => path,
        }
    }
}

/// Replace `${VAR}` with the variable's value; unset variables expand to
/// nothing and an unterminated `${` is kept as written.
#[must_use]
pub fn expand_env_vars(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            out.push_str(&rest[start..]);
            return out;
        };
        let var = &after[..end];
        if !var.is_empty() {
            out.push_str(&env::var(var).unwrap_or_default());
        }
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    out
}

impl DialecticConfig {
    /// Load from the default location. `Ok(None)` when there is no file.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(None),
        }
    }

    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        match Self::parse(&content) {
            Ok(config) => Ok(Some(config)),
            Err(err) => {
                warn!("Failed to parse config at {:?}: {}", path, err);
                Err(ConfigError::Parse {
                    path: path.to_path_buf(),
                    source: err,
                })
            }
        }
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    #[must_use]
    pub fn path() -> Option<PathBuf> {
        config_path()
    }

    /// The logging filter with environment variables expanded.
    #[must_use]
    pub fn log_filter(&self) -> Option<String> {
        self.logging
            .as_ref()
            .and_then(|logging| logging.filter.as_deref())
            .map(expand_env_vars)
            .filter(|filter| !filter.trim().is_empty())
    }
}

fn config_path() -> Option<PathBuf> {
    if let Some(explicit) = env::var_os(CONFIG_ENV).filter(|value| !value.is_empty()) {
        return Some(PathBuf::from(explicit));
    }
    dirs::home_dir().map(|home| home.join(".dialectic").join("config.toml"))
}
