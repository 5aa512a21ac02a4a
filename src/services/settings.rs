use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::model::settings::Settings;

pub const SETTINGS_ENV: &str = "AUTOLOC_SETTINGS";
pub const API_KEY_ENV: &str = "AUTOLOC_API_KEY";
pub const DEFAULT_SETTINGS_FILE: &str = "autoloc.json";

/// Reads the settings file, applies the api key override and validates.
pub fn load(path: &Path, api_key_override: Option<String>) -> Result<Settings> {
    let data = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;

    let mut settings: Settings = serde_json::from_str(&data)
        .map_err(|e| Error::Settings(format!("{}: {e}", path.display())))?;

    if let Some(key) = api_key_override.filter(|k| !k.trim().is_empty()) {
        settings.api_key = key;
    }

    validate(&settings)?;
    Ok(settings)
}

pub fn validate(settings: &Settings) -> Result<()> {
    if settings.to_langs.iter().all(|l| l.trim().is_empty()) {
        return Err(Error::Settings("to_langs must name at least one language".into()));
    }

    if settings.api_key.trim().is_empty() {
        return Err(Error::Settings(format!(
            "api_key is required (or set {API_KEY_ENV})"
        )));
    }

    if settings.suffix.trim().is_empty() {
        return Err(Error::Settings("suffix is required".into()));
    }

    if settings.pattern_source().is_none() {
        return Err(Error::Settings(format!(
            "no capture pattern for suffix `{}`; add one under `patterns`",
            settings.suffix
        )));
    }

    Ok(())
}
