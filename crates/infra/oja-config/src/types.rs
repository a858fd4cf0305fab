//! Configuration types for oja.
//!
//! The root type is [`OjaConfig`]. Every struct uses `#[serde(default)]` so a
//! partial file (or no file at all) still loads.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// Root configuration, loaded from `oja.json` files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OjaConfig {
    /// Connection to the OJS instance.
    pub ojs: OjsSettings,

    /// Timing of the upload run.
    pub execution: ExecutionConfig,

    /// Logging defaults.
    pub logging: LoggingConfig,
}

/// Connection settings for the OJS instance.
///
/// Secrets are stored in the global config file so a run needs no prompt;
/// they stay wrapped in [`SecretString`] in memory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OjsSettings {
    /// Journal base URL, e.g. `https://journal.example.org/index.php/srm`.
    pub base_url: String,

    /// Web login username.
    pub username: String,

    /// REST API token from the user profile.
    #[serde(with = "secret_opt", skip_serializing_if = "Option::is_none")]
    pub api_token: Option<SecretString>,

    /// Web login password.
    #[serde(with = "secret_opt", skip_serializing_if = "Option::is_none")]
    pub password: Option<SecretString>,

    /// Locale used for new galleys and for reading file names.
    pub locale: String,
}

impl Default for OjsSettings {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            username: String::new(),
            api_token: None,
            password: None,
            locale: "en_US".into(),
        }
    }
}

/// Fixed delays and attempt counts used while executing a plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Pause after deletions and galley creation before reading state again.
    pub settle_delay_ms: u64,

    /// How many times to check that an uploaded main file is visible.
    pub verify_attempts: u32,

    /// Pause between visibility checks.
    pub verify_delay_ms: u64,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: 2000,
            verify_attempts: 3,
            verify_delay_ms: 2000,
        }
    }
}

impl ExecutionConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn verify_delay(&self) -> Duration {
        Duration::from_millis(self.verify_delay_ms)
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset and `--debug` is not given.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
        }
    }
}

/// Environment variable names of the required settings, in prompt order.
pub const REQUIRED_KEYS: [&str; 4] = ["OJS_BASE_URL", "OJS_API_TOKEN", "OJS_USERNAME", "OJS_PASSWORD"];

impl OjaConfig {
    /// Names of required settings that are missing or blank.
    pub fn missing_required(&self) -> Vec<&'static str> {
        let blank_secret =
            |s: &Option<SecretString>| s.as_ref().is_none_or(|v| v.expose_secret().trim().is_empty());

        let mut missing = Vec::new();
        if self.ojs.base_url.trim().is_empty() {
            missing.push(REQUIRED_KEYS[0]);
        }
        if blank_secret(&self.ojs.api_token) {
            missing.push(REQUIRED_KEYS[1]);
        }
        if self.ojs.username.trim().is_empty() {
            missing.push(REQUIRED_KEYS[2]);
        }
        if blank_secret(&self.ojs.password) {
            missing.push(REQUIRED_KEYS[3]);
        }
        missing
    }

    /// True when every required setting is present.
    pub fn is_complete(&self) -> bool {
        self.missing_required().is_empty()
    }
}

/// Serde adapter for optional secrets stored as plain JSON strings.
mod secret_opt {
    use secrecy::{ExposeSecret, SecretString};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(v: &Option<SecretString>, s: S) -> Result<S::Ok, S::Error> {
        match v {
            Some(secret) => s.serialize_str(secret.expose_secret()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<SecretString>, D::Error> {
        let raw = Option::<String>::deserialize(d)?;
        Ok(raw
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(SecretString::from))
    }
}
