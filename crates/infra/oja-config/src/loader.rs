//! Configuration loader with two-layer merge and env overrides.
//!
//! The loading process:
//! 1. Migrate a legacy `./.env` into the global file if the global file is missing
//! 2. Read global config from `~/.config/oja/oja.json`
//! 3. Read local config from `./oja.json`
//! 4. Merge at JSON value level (RFC 7396) and deserialize once
//! 5. Apply env var overrides (highest precedence)
//! 6. Run advisory validation

use crate::{merge::merge_layers, types::OjaConfig, validation::AdvisoryWarning};
use anyhow::{Context, Result};
use secrecy::SecretString;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Filename for local config.
pub const LOCAL_FILE: &str = "oja.json";

/// Directory name under `config_dir` for global config.
pub const GLOBAL_DIR: &str = "oja";

/// Filename for global config.
pub const GLOBAL_FILE: &str = "oja.json";

/// Environment variables read by the loader.
pub const ENV_KEYS: [&str; 5] = [
    "OJS_BASE_URL",
    "OJS_API_TOKEN",
    "OJS_USERNAME",
    "OJS_PASSWORD",
    "OJA_LOG_LEVEL",
];

/// Resolved paths for config files.
#[derive(Debug, Clone)]
pub struct OjaConfigPaths {
    /// Path to local config (`./oja.json`).
    pub local: PathBuf,

    /// Path to global config (`~/.config/oja/oja.json`).
    pub global: PathBuf,
}

/// Events that occurred during config loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadEvent {
    /// A legacy `.env` file was copied into the global config.
    MigratedDotEnv { from: PathBuf, to: PathBuf },
}

/// Result of loading configuration.
#[derive(Debug)]
pub struct LoadedOjaConfig {
    /// The loaded and merged configuration.
    pub config: OjaConfig,

    /// Advisory warnings from validation.
    pub warnings: Vec<AdvisoryWarning>,

    /// Events that occurred during loading.
    pub events: Vec<LoadEvent>,

    /// Resolved config file paths.
    pub paths: OjaConfigPaths,
}

/// Get the global config file path.
pub fn global_config_path() -> Result<PathBuf> {
    let base = dirs::config_dir().context("Could not determine config dir")?;
    Ok(base.join(GLOBAL_DIR).join(GLOBAL_FILE))
}

/// Get the local config file path for a given directory.
pub fn local_config_path(local_dir: &Path) -> PathBuf {
    local_dir.join(LOCAL_FILE)
}

/// Load configuration using the user's global config path.
pub fn load_merged(local_dir: &Path) -> Result<LoadedOjaConfig> {
    load_merged_with(local_dir, &global_config_path()?)
}

/// Load configuration with an explicit global config path.
pub fn load_merged_with(local_dir: &Path, global_path: &Path) -> Result<LoadedOjaConfig> {
    let local_path = local_config_path(local_dir);
    let mut events = vec![];

    if let Some(legacy) = crate::migration::should_migrate(local_dir, global_path) {
        match attempt_migration(&legacy, global_path) {
            Ok(Some(event)) => events.push(event),
            Ok(None) => {}
            Err(e) => tracing::warn!("Migration from legacy .env failed: {e:#}"),
        }
    }

    let merged = merge_layers([
        read_json_object_or_empty(global_path)?,
        read_json_object_or_empty(&local_path)?,
    ]);

    let mut cfg: OjaConfig =
        serde_json::from_value(merged).context("Failed to deserialize merged oja config")?;

    apply_env_overrides(&mut cfg);

    let warnings = crate::validation::validate(&cfg);

    Ok(LoadedOjaConfig {
        config: cfg,
        warnings,
        events,
        paths: OjaConfigPaths {
            local: local_path,
            global: global_path.to_path_buf(),
        },
    })
}

fn apply_env_overrides(cfg: &mut OjaConfig) {
    if let Some(v) = env_trimmed("OJS_BASE_URL") {
        cfg.ojs.base_url = v;
    }
    if let Some(v) = env_trimmed("OJS_API_TOKEN") {
        cfg.ojs.api_token = Some(SecretString::from(v));
    }
    if let Some(v) = env_trimmed("OJS_USERNAME") {
        cfg.ojs.username = v;
    }
    if let Some(v) = env_trimmed("OJS_PASSWORD") {
        cfg.ojs.password = Some(SecretString::from(v));
    }
    if let Some(v) = env_trimmed("OJA_LOG_LEVEL") {
        cfg.logging.level = v;
    }
}

/// Helper to read and normalize an env var (trim + filter empty).
fn env_trimmed(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn attempt_migration(legacy: &Path, global_path: &Path) -> Result<Option<LoadEvent>> {
    let Some(value) = crate::migration::read_legacy_env(legacy)? else {
        return Ok(None);
    };
    crate::writer::write_pretty_json_atomic(global_path, &value)?;
    tracing::info!(from = %legacy.display(), to = %global_path.display(), "migrated legacy settings");
    Ok(Some(LoadEvent::MigratedDotEnv {
        from: legacy.to_path_buf(),
        to: global_path.to_path_buf(),
    }))
}

/// Read a JSON file as a Value, returning an empty object if the file doesn't exist.
fn read_json_object_or_empty(path: &Path) -> Result<Value> {
    if !path.exists() {
        return Ok(Value::Object(serde_json::Map::new()));
    }

    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;

    let v: Value = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid JSON in {}", path.display()))?;

    match v {
        Value::Object(_) => Ok(v),
        _ => anyhow::bail!("Config root must be a JSON object: {}", path.display()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::EnvGuard;
    use secrecy::ExposeSecret;
    use serial_test::serial;
    use tempfile::TempDir;

    struct Dirs {
        _temp: TempDir,
        local: PathBuf,
        global: PathBuf,
    }

    fn dirs() -> Dirs {
        let temp = TempDir::new().unwrap();
        let local = temp.path().join("work");
        std::fs::create_dir_all(&local).unwrap();
        let global = temp.path().join("config").join(GLOBAL_DIR).join(GLOBAL_FILE);
        Dirs {
            _temp: temp,
            local,
            global,
        }
    }

    #[test]
    #[serial(env)]
    fn no_files_gives_defaults() {
        let _env = EnvGuard::clear_all();
        let d = dirs();
        let loaded = load_merged_with(&d.local, &d.global).unwrap();

        assert_eq!(loaded.config.ojs.locale, "en_US");
        assert_eq!(loaded.config.execution.verify_attempts, 3);
        assert!(loaded.warnings.is_empty());
        assert!(loaded.events.is_empty());
        assert!(!loaded.config.is_complete());
    }

    #[test]
    #[serial(env)]
    fn local_overrides_global() {
        let _env = EnvGuard::clear_all();
        let d = dirs();
        std::fs::create_dir_all(d.global.parent().unwrap()).unwrap();
        std::fs::write(
            &d.global,
            r#"{"ojs": {"base_url": "https://global.example", "username": "ed"}}"#,
        )
        .unwrap();
        std::fs::write(
            d.local.join(LOCAL_FILE),
            r#"{"ojs": {"base_url": "https://local.example"}}"#,
        )
        .unwrap();

        let loaded = load_merged_with(&d.local, &d.global).unwrap();
        assert_eq!(loaded.config.ojs.base_url, "https://local.example");
        assert_eq!(loaded.config.ojs.username, "ed");
    }

    #[test]
    #[serial(env)]
    fn env_overrides_files() {
        let _env = EnvGuard::clear_all();
        let d = dirs();
        std::fs::write(
            d.local.join(LOCAL_FILE),
            r#"{"ojs": {"username": "file-user"}, "logging": {"level": "warn"}}"#,
        )
        .unwrap();
        let _u = EnvGuard::set("OJS_USERNAME", "  env-user ");
        let _t = EnvGuard::set("OJS_API_TOKEN", "env-token");
        let _l = EnvGuard::set("OJA_LOG_LEVEL", "debug");

        let loaded = load_merged_with(&d.local, &d.global).unwrap();
        assert_eq!(loaded.config.ojs.username, "env-user");
        assert_eq!(
            loaded.config.ojs.api_token.as_ref().unwrap().expose_secret(),
            "env-token"
        );
        assert_eq!(loaded.config.logging.level, "debug");
    }

    #[test]
    #[serial(env)]
    fn blank_env_is_ignored() {
        let _env = EnvGuard::clear_all();
        let d = dirs();
        std::fs::write(d.local.join(LOCAL_FILE), r#"{"ojs": {"username": "kept"}}"#).unwrap();
        let _u = EnvGuard::set("OJS_USERNAME", "   ");

        let loaded = load_merged_with(&d.local, &d.global).unwrap();
        assert_eq!(loaded.config.ojs.username, "kept");
    }

    #[test]
    #[serial(env)]
    fn legacy_env_is_migrated_once() {
        let _env = EnvGuard::clear_all();
        let d = dirs();
        std::fs::write(
            d.local.join(".env"),
            "OJS_BASE_URL=https://j.example\nOJS_API_TOKEN=t\nOJS_USERNAME=u\nOJS_PASSWORD=p\n",
        )
        .unwrap();

        let loaded = load_merged_with(&d.local, &d.global).unwrap();
        assert!(loaded.config.is_complete());
        assert_eq!(
            loaded.events,
            vec![LoadEvent::MigratedDotEnv {
                from: d.local.join(".env"),
                to: d.global.clone(),
            }]
        );
        assert!(d.global.exists());
        assert!(d.local.join(".env").exists());

        let again = load_merged_with(&d.local, &d.global).unwrap();
        assert!(again.events.is_empty());
        assert!(again.config.is_complete());
    }

    #[test]
    #[serial(env)]
    fn invalid_json_errors() {
        let _env = EnvGuard::clear_all();
        let d = dirs();
        std::fs::write(d.local.join(LOCAL_FILE), "not valid json").unwrap();

        let err = load_merged_with(&d.local, &d.global).unwrap_err();
        assert!(err.to_string().contains("Invalid JSON"));
    }

    #[test]
    #[serial(env)]
    fn non_object_root_errors() {
        let _env = EnvGuard::clear_all();
        let d = dirs();
        std::fs::write(d.local.join(LOCAL_FILE), "[1, 2, 3]").unwrap();

        let err = load_merged_with(&d.local, &d.global).unwrap_err();
        assert!(err.to_string().contains("must be a JSON object"));
    }

    #[test]
    #[serial(env)]
    fn paths_are_set() {
        let _env = EnvGuard::clear_all();
        let d = dirs();
        let loaded = load_merged_with(&d.local, &d.global).unwrap();
        assert_eq!(loaded.paths.local, d.local.join(LOCAL_FILE));
        assert!(loaded.paths.global.ends_with("oja/oja.json"));
    }
}
