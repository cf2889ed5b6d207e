//! Light/dark theme, its palette, and the persisted preference.
//!
//! The preference is a single boolean stored as `"true"` / `"false"`. Anything
//! else (missing key, corrupt value, storage disabled) reads as light. Writes are
//! best-effort: a failed write is logged and the in-memory theme still changes.

#[cfg(test)]
#[path = "theme_test.rs"]
mod theme_test;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::geo::TrailKind;

/// Storage key for the dark-mode preference.
pub const THEME_STORAGE_KEY: &str = "wandermap.theme.dark";

/// Color theme for the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    #[must_use]
    pub fn is_dark(self) -> bool {
        self == Self::Dark
    }

    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    #[must_use]
    pub fn palette(self) -> Palette {
        match self {
            Self::Light => Palette {
                background: "#f8fafc",
                land_fill: "#ffffff",
                land_stroke: "#e5e7eb",
                subdivision_stroke: "#d1d5db",
                anchor_fill: "#3b82f6",
                anchor_outline: "#ffffff",
                anchor_halo: "rgba(59, 130, 246, 0.2)",
            },
            Self::Dark => Palette {
                background: "#0b1120",
                land_fill: "#1f2937",
                land_stroke: "#374151",
                subdivision_stroke: "#4b5563",
                anchor_fill: "#60a5fa",
                anchor_outline: "#ffffff",
                anchor_halo: "rgba(96, 165, 250, 0.25)",
            },
        }
    }
}

/// CSS colors used by one theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: &'static str,
    pub land_fill: &'static str,
    pub land_stroke: &'static str,
    pub subdivision_stroke: &'static str,
    pub anchor_fill: &'static str,
    pub anchor_outline: &'static str,
    pub anchor_halo: &'static str,
}

/// Stroke color for a trail category. Identical in both themes.
#[must_use]
pub fn trail_color(kind: TrailKind) -> &'static str {
    match kind {
        TrailKind::Run => "#3b82f6",
        TrailKind::Ride => "#f97316",
        TrailKind::Hike => "#22c55e",
    }
}

// =============================================================
// Preference storage
// =============================================================

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage unavailable")]
    Unavailable,
    #[error("storage rejected write: {0}")]
    Rejected(String),
}

/// Key/value store holding UI preferences.
pub trait PreferenceStore {
    /// Stored value for `key`, or `None` when absent or unreadable.
    fn read(&self, key: &str) -> Option<String>;

    /// Persist `value` under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the backing store refuses the write.
    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Browser `localStorage`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalStorage;

impl LocalStorage {
    fn storage() -> Option<web_sys::Storage> {
        match web_sys::window()?.local_storage() {
            Ok(storage) => storage,
            Err(_) => None,
        }
    }
}

impl PreferenceStore for LocalStorage {
    fn read(&self, key: &str) -> Option<String> {
        match Self::storage()?.get_item(key) {
            Ok(value) => value,
            Err(_) => None,
        }
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let storage = Self::storage().ok_or(StorageError::Unavailable)?;
        storage
            .set_item(key, value)
            .map_err(|e| StorageError::Rejected(format!("{e:?}")))
    }
}

/// In-memory store for tests and non-browser hosts.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: HashMap<String, String>,
    /// When set, every write fails with [`StorageError::Unavailable`].
    pub read_only: bool,
}

impl PreferenceStore for MemoryStore {
    fn read(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.read_only {
            return Err(StorageError::Unavailable);
        }
        self.values.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// Read the persisted theme. Never fails; unknown values read as light.
#[must_use]
pub fn load_theme(store: &dyn PreferenceStore) -> Theme {
    match store.read(THEME_STORAGE_KEY).as_deref().map(str::trim) {
        Some("true") => Theme::Dark,
        Some("false") | None => Theme::Light,
        Some(other) => {
            log::warn!("ignoring corrupt theme preference {other:?}");
            Theme::Light
        }
    }
}

/// Persist the theme. Failures are logged, not returned.
pub fn save_theme(store: &mut dyn PreferenceStore, theme: Theme) {
    let value = if theme.is_dark() { "true" } else { "false" };
    if let Err(e) = store.write(THEME_STORAGE_KEY, value) {
        log::warn!("theme preference not saved: {e}");
    }
}
