//! Environment access with a settings-file fallback.
//!
//! Credentials are read through [`EnvSource`] so callers (and tests) can
//! decide where variables come from. The default source checks the process
//! environment first and then `$HOME/.changelog-kit/settings.json`.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Lookup of environment-style variables.
pub trait EnvSource: Send + Sync {
    /// Returns the value of `key`, or `None` when it is unset or empty.
    fn var(&self, key: &str) -> Option<String>;
}

/// Settings loaded from $HOME/.changelog-kit/settings.json.
#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    /// Environment variable overrides.
    #[serde(default)]
    pub env: HashMap<String, String>,
}

impl Settings {
    /// Loads settings from the default location.
    pub fn load() -> Result<Self> {
        let settings_path = Self::get_settings_path()?;
        Self::load_from_path(&settings_path)
    }

    /// Loads settings from a specific path.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(Settings::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;

        serde_json::from_str::<Settings>(&content)
            .with_context(|| format!("Failed to parse settings file: {}", path.display()))
    }

    /// Returns the default settings path.
    pub fn get_settings_path() -> Result<PathBuf> {
        let home_dir = dirs::home_dir().context("Failed to determine home directory")?;

        Ok(home_dir.join(".changelog-kit").join("settings.json"))
    }
}

impl EnvSource for Settings {
    fn var(&self, key: &str) -> Option<String> {
        // Process environment wins over the settings file
        match env::var(key) {
            Ok(value) if !value.is_empty() => Some(value),
            _ => self.env.get(key).filter(|v| !v.is_empty()).cloned(),
        }
    }
}

/// Fixed set of variables, for callers that must not touch the process environment.
#[derive(Debug, Default, Clone)]
pub struct MapEnv(HashMap<String, String>);

impl MapEnv {
    /// Creates a source from `(key, value)` pairs.
    pub fn new<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self(
            vars.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl EnvSource for MapEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.0.get(key).filter(|v| !v.is_empty()).cloned()
    }
}
