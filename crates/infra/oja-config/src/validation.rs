//! Advisory validation for [`OjaConfig`].
//!
//! Warnings never stop a run; missing credentials are checked separately by
//! [`require_credentials`].

use crate::types::OjaConfig;

/// An advisory warning about a configuration issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvisoryWarning {
    /// Machine-readable warning code.
    pub code: &'static str,

    /// Human-readable warning message.
    pub message: String,

    /// JSON path to the problematic config field.
    pub path: &'static str,
}

impl std::fmt::Display for AdvisoryWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.code, self.path, self.message)
    }
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validate a configuration and return advisory warnings.
pub fn validate(cfg: &OjaConfig) -> Vec<AdvisoryWarning> {
    let mut warnings = vec![];

    let url = cfg.ojs.base_url.trim();
    if !url.is_empty() {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            warnings.push(AdvisoryWarning {
                code: "ojs.base_url.invalid",
                path: "ojs.base_url",
                message: format!("URL should start with http:// or https://, got '{url}'"),
            });
        } else if url.starts_with("http://") {
            warnings.push(AdvisoryWarning {
                code: "ojs.base_url.insecure",
                path: "ojs.base_url",
                message: "credentials will be sent over plain HTTP".into(),
            });
        }
    }

    if cfg.ojs.locale.trim().is_empty() {
        warnings.push(AdvisoryWarning {
            code: "ojs.locale.empty",
            path: "ojs.locale",
            message: "galley locale is empty; OJS will reject new galleys".into(),
        });
    }

    if cfg.execution.verify_attempts == 0 {
        warnings.push(AdvisoryWarning {
            code: "execution.verify_attempts.zero",
            path: "execution.verify_attempts",
            message: "uploaded HTML files will never be verified before attaching figures".into(),
        });
    }

    if !LOG_LEVELS.contains(&cfg.logging.level.to_lowercase().as_str()) {
        warnings.push(AdvisoryWarning {
            code: "logging.level.invalid",
            path: "logging.level",
            message: format!(
                "Unknown log level '{}'. Expected one of: {}",
                cfg.logging.level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    warnings
}

/// Fail when any required connection setting is missing.
pub fn require_credentials(cfg: &OjaConfig) -> anyhow::Result<()> {
    let missing = cfg.missing_required();
    if missing.is_empty() {
        return Ok(());
    }
    anyhow::bail!(
        "Missing OJS settings: {}. Run with --settings or set the environment variables.",
        missing.join(", ")
    )
}
