//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`FrogsSettings::default()`]
//! 2. If `~/.frogs/settings.json` exists, deep-merge user values over defaults
//! 3. Apply `FROGS_*` environment variable overrides (highest priority)

use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::types::{frogs_dir, parse_time, FrogsSettings};

/// A settings file that exists but cannot be used.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid settings in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl SettingsError {
    /// The file that failed to load.
    pub fn path(&self) -> &Path {
        match self {
            Self::Read { path, .. } | Self::Parse { path, .. } => path,
        }
    }
}

pub type Result<T> = std::result::Result<T, SettingsError>;

/// Resolve the path to the settings file (`~/.frogs/settings.json`).
pub fn settings_path() -> PathBuf {
    frogs_dir().join("settings.json")
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<FrogsSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// A missing file yields defaults; invalid JSON is an error.
pub fn load_settings_from_path(path: &Path) -> Result<FrogsSettings> {
    let mut settings = load_file(path)?;
    apply_overrides(&mut settings, |name| std::env::var(name).ok());
    Ok(settings)
}

fn load_file(path: &Path) -> Result<FrogsSettings> {
    let parse_err = |source| SettingsError::Parse {
        path: path.to_owned(),
        source,
    };
    let defaults = serde_json::to_value(FrogsSettings::default()).map_err(parse_err)?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_owned(),
            source,
        })?;
        let user: Value = serde_json::from_str(&content).map_err(parse_err)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    serde_json::from_value(merged).map_err(parse_err)
}

/// Recursive deep merge of two JSON values.
///
/// - Objects are merged recursively (source overrides target per-key)
/// - Arrays and primitives are replaced entirely by source
/// - Null values in source are skipped (preserving target)
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = match target_map.remove(&key) {
                    Some(target_val) => deep_merge(target_val, source_val),
                    None => source_val,
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply `FROGS_*` overrides read through `lookup`.
///
/// Empty values are ignored. Invalid values are ignored with a warning.
pub fn apply_overrides<F>(settings: &mut FrogsSettings, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let read = |name: &str| lookup(name).filter(|v| !v.is_empty());

    if let Some(v) = read("FROGS_DB_PATH") {
        settings.storage.db_path = v;
    }
    if let Some(v) = read("FROGS_REMINDER_TIME") {
        if parse_time(&v).is_some() {
            settings.reminder.time = v;
        } else {
            tracing::warn!(key = "FROGS_REMINDER_TIME", value = %v, "invalid time env var, ignoring");
        }
    }
    if let Some(v) = read("FROGS_REMINDER_ENABLED") {
        match parse_bool(&v) {
            Some(enabled) => settings.reminder.enabled = enabled,
            None => {
                tracing::warn!(key = "FROGS_REMINDER_ENABLED", value = %v, "invalid boolean env var, ignoring");
            }
        }
    }
    if let Some(v) = read("FROGS_LOG_LEVEL") {
        settings.logging.level = v;
    }
    if let Some(v) = read("FROGS_LOG_DB_PATH") {
        settings.logging.log_db_path = v;
    }
}

/// Parse a string as a boolean.
///
/// Accepts (case-insensitive): `true`/`1`/`yes`/`on` or `false`/`0`/`no`/`off`.
pub fn parse_bool(val: &str) -> Option<bool> {
    match val.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
