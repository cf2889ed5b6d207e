//! Server configuration from environment variables.
//!
//! Every key is optional. A key that is present but unparsable is an error
//! rather than a silent fallback, so a typo in `PORT` fails at startup.

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

use std::path::PathBuf;
use std::str::FromStr;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_SITE_DIR: &str = "site";
const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_DEMO_SEED: u64 = 7;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key}={value:?} is not a valid value")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    /// Static site root, served for every path no other route claims.
    pub site_dir: PathBuf,
    /// Boundary datasets, served under `/data`.
    pub data_dir: PathBuf,
    /// Atlas JSON document. When unset, a demo atlas is generated.
    pub atlas_file: Option<PathBuf>,
    pub demo_seed: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            site_dir: PathBuf::from(DEFAULT_SITE_DIR),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            atlas_file: None,
            demo_seed: DEFAULT_DEMO_SEED,
        }
    }
}

impl ServerConfig {
    /// Read configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `PORT` or `DEMO_SEED` does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if a numeric key does not parse.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let path = |key: &str, default: PathBuf| lookup(key).filter(|v| !v.trim().is_empty()).map_or(default, PathBuf::from);

        Ok(Self {
            port: env_parse(&lookup, "PORT", defaults.port)?,
            site_dir: path("SITE_DIR", defaults.site_dir),
            data_dir: path("DATA_DIR", defaults.data_dir),
            atlas_file: lookup("ATLAS_FILE")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            demo_seed: env_parse(&lookup, "DEMO_SEED", defaults.demo_seed)?,
        })
    }
}

fn env_parse<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Copy,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
    }
}
