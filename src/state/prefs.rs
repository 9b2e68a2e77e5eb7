//! Display preferences persisted between sessions.
//!
//! TRADE-OFFS
//! ==========
//! Preferences are best-effort: a missing or corrupt entry loads as the
//! defaults rather than failing startup.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::storage::{StorageAdapter, StorageError, load_json, save_json};

pub const PREFS_KEY: &str = "dronemap_prefs";

/// How the project list is displayed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectListMode {
    #[default]
    Map,
    List,
}

impl fmt::Display for ProjectListMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Map => "map",
            Self::List => "list",
        })
    }
}

impl FromStr for ProjectListMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "map" => Ok(Self::Map),
            "list" => Ok(Self::List),
            other => Err(format!("unknown project list mode '{other}' (expected 'map' or 'list')")),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub dark_mode: bool,
    pub project_list: ProjectListMode,
}

impl Preferences {
    #[must_use]
    pub fn load(storage: &dyn StorageAdapter) -> Self {
        load_json(storage, PREFS_KEY).unwrap_or_default()
    }

    /// # Errors
    ///
    /// Returns a [`StorageError`] if the preferences cannot be written.
    pub fn save(&self, storage: &dyn StorageAdapter) -> Result<(), StorageError> {
        save_json(storage, PREFS_KEY, self)
    }

    /// Flip dark mode and persist. Returns the new value.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the preferences cannot be written.
    pub fn toggle_dark_mode(&mut self, storage: &dyn StorageAdapter) -> Result<bool, StorageError> {
        self.dark_mode = !self.dark_mode;
        self.save(storage)?;
        Ok(self.dark_mode)
    }

    /// # Errors
    ///
    /// Returns a [`StorageError`] if the preferences cannot be written.
    pub fn set_project_list(&mut self, storage: &dyn StorageAdapter, mode: ProjectListMode) -> Result<(), StorageError> {
        self.project_list = mode;
        self.save(storage)
    }
}

#[cfg(test)]
#[path = "prefs_test.rs"]
mod prefs_test;
