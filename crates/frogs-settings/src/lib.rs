//! # frogs-settings
//!
//! Layered configuration for the frogs task client.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults**: [`FrogsSettings::default()`]
//! 2. **User file**: `~/.frogs/settings.json` (deep-merged over defaults)
//! 3. **Environment variables**: `FROGS_*` overrides (highest priority)

#![deny(unsafe_code)]

pub mod loader;
pub mod types;

pub use loader::{deep_merge, load_settings, load_settings_from_path, settings_path, Result, SettingsError};
pub use types::*;

use std::sync::OnceLock;

static SETTINGS: OnceLock<FrogsSettings> = OnceLock::new();

/// Load settings, falling back to defaults when the file is unusable.
///
/// The error is handed back instead of logged so the caller can report it
/// once logging is set up.
pub fn load_or_default() -> (FrogsSettings, Option<SettingsError>) {
    fallback(load_settings())
}

fn fallback(loaded: Result<FrogsSettings>) -> (FrogsSettings, Option<SettingsError>) {
    match loaded {
        Ok(settings) => (settings, None),
        Err(e) => (FrogsSettings::default(), Some(e)),
    }
}

/// Get the global settings instance.
///
/// Loaded on first call; a file that fails to load falls back to defaults.
pub fn get_settings() -> &'static FrogsSettings {
    SETTINGS.get_or_init(|| {
        let (settings, err) = load_or_default();
        if let Some(e) = err {
            tracing::warn!(error = %e, "failed to load settings, using defaults");
        }
        settings
    })
}

/// Initialize the global settings with a specific value.
///
/// Returns the settings back if the global was already initialized.
#[allow(clippy::result_large_err)]
pub fn init_settings(settings: FrogsSettings) -> std::result::Result<(), FrogsSettings> {
    SETTINGS.set(settings)
}
