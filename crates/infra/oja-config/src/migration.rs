//! Migration from a legacy `./.env` file to the global `oja.json`.
//!
//! Older installs kept `OJS_BASE_URL=...` style lines in a `.env` next to the
//! submissions. On first load, if no global config exists yet, those values
//! are copied into it. The `.env` file is left untouched.

use anyhow::{Context, Result};
use serde_json::{Map, Value, json};
use std::path::{Path, PathBuf};

/// Name of the legacy file.
pub const LEGACY_FILE: &str = ".env";

/// Path to the legacy file in `local_dir`.
pub fn legacy_env_path(local_dir: &Path) -> PathBuf {
    local_dir.join(LEGACY_FILE)
}

/// Returns the legacy path when migration should be attempted.
pub fn should_migrate(local_dir: &Path, global_path: &Path) -> Option<PathBuf> {
    if global_path.exists() {
        return None;
    }
    let legacy = legacy_env_path(local_dir);
    legacy.is_file().then_some(legacy)
}

/// Read the `OJS_*` keys of a legacy `.env` file into an `oja.json` value.
///
/// Returns `None` when the file holds none of the keys.
pub fn read_legacy_env(path: &Path) -> Result<Option<Value>> {
    let iter = dotenvy::from_path_iter(path)
        .with_context(|| format!("Failed to open legacy config: {}", path.display()))?;

    let mut ojs = Map::new();
    for item in iter {
        let (key, value) =
            item.with_context(|| format!("Invalid line in legacy config: {}", path.display()))?;
        let field = match key.as_str() {
            "OJS_BASE_URL" => "base_url",
            "OJS_API_TOKEN" => "api_token",
            "OJS_USERNAME" => "username",
            "OJS_PASSWORD" => "password",
            _ => continue,
        };
        let value = value.trim();
        if !value.is_empty() {
            ojs.insert(field.to_string(), Value::String(value.to_string()));
        }
    }

    if ojs.is_empty() {
        Ok(None)
    } else {
        Ok(Some(json!({ "ojs": ojs })))
    }
}
