//! Shared application state.
//!
//! DESIGN
//! ======
//! The atlas is loaded once at startup and never mutated, so handlers share
//! it through an `Arc` without locking.

#[cfg(test)]
#[path = "state_test.rs"]
mod tests;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use canvas::geo::{Anchor, Trail};
use serde::{Deserialize, Serialize};

use crate::config::ServerConfig;
use crate::demo;

/// A quick link shown on the start page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    pub title: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// Everything `/api/atlas` returns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Atlas {
    #[serde(default, alias = "activities")]
    pub trails: Vec<Trail>,
    #[serde(default)]
    pub anchors: Vec<Anchor>,
    #[serde(default)]
    pub bookmarks: Vec<Bookmark>,
}

#[derive(Debug, thiserror::Error)]
pub enum AtlasError {
    #[error("read {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },
    #[error("parse {path}: {source}")]
    Json { path: PathBuf, source: serde_json::Error },
}

impl Atlas {
    /// Read an atlas document from disk.
    ///
    /// # Errors
    ///
    /// Returns [`AtlasError`] if the file cannot be read or is not an atlas.
    pub fn from_file(path: &Path) -> Result<Self, AtlasError> {
        let text = std::fs::read_to_string(path).map_err(|source| AtlasError::Io { path: path.to_owned(), source })?;
        serde_json::from_str(&text).map_err(|source| AtlasError::Json { path: path.to_owned(), source })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub atlas: Arc<Atlas>,
    pub site_dir: PathBuf,
    pub data_dir: PathBuf,
}

impl AppState {
    #[must_use]
    pub fn new(atlas: Atlas, config: &ServerConfig) -> Self {
        Self { atlas: Arc::new(atlas), site_dir: config.site_dir.clone(), data_dir: config.data_dir.clone() }
    }

    /// Build state from configuration. An unreadable atlas file is logged and
    /// replaced by an empty atlas so the map still serves boundaries.
    #[must_use]
    pub fn load(config: &ServerConfig) -> Self {
        let atlas = match &config.atlas_file {
            Some(path) => match Atlas::from_file(path) {
                Ok(atlas) => atlas,
                Err(e) => {
                    tracing::error!(error = %e, "atlas load failed; serving an empty atlas");
                    Atlas::default()
                }
            },
            None => demo::generate(config.demo_seed),
        };
        tracing::info!(trails = atlas.trails.len(), anchors = atlas.anchors.len(), "atlas ready");
        Self::new(atlas, config)
    }
}
