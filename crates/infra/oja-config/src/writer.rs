//! Atomic writes of config files.

use anyhow::{Context, Result};
use atomicwrites::{AllowOverwrite, AtomicFile};
use serde_json::Value;
use std::io::Write;
use std::path::Path;

use crate::types::OjaConfig;

/// Write a JSON value to `path` atomically with pretty formatting.
///
/// Parent directories are created. On Unix the file is made readable by the
/// owner only, since it holds the API token and password.
pub fn write_pretty_json_atomic(path: &Path, value: &Value) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let mut json = serde_json::to_string_pretty(value).context("Failed to serialize config")?;
    json.push('\n');

    AtomicFile::new(path, AllowOverwrite)
        .write(|f| f.write_all(json.as_bytes()))
        .with_context(|| format!("Failed to write config file: {}", path.display()))?;

    restrict_permissions(path)?;
    Ok(())
}

/// Serialize and write a whole config.
pub fn save_config(path: &Path, cfg: &OjaConfig) -> Result<()> {
    let value = serde_json::to_value(cfg).context("Failed to serialize config")?;
    write_pretty_json_atomic(path, &value)
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .with_context(|| format!("Failed to set permissions on {}", path.display()))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}
