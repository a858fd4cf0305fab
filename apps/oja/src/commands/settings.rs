//! Interactive editing of the OJS connection settings.

use anyhow::Result;
use colored::Colorize;
use oja_config::{
    OjaConfig,
    loader::global_config_path,
    validation::validate,
    writer::save_config,
};
use secrecy::SecretString;

use crate::prompt;

fn secret_prompt(label: &str, present: bool) -> String {
    if present {
        format!("{label} (leave empty to keep the current one)")
    } else {
        label.to_string()
    }
}

/// Prompts for every connection setting and writes the global config file.
pub async fn execute(mut config: OjaConfig) -> Result<OjaConfig> {
    let path = global_config_path()?;
    println!("\n{}", "OJS Settings".cyan().underline());
    println!("{}", format!("Saved to {}", path.display()).dimmed());

    config.ojs.base_url = prompt::input("OJS base URL", config.ojs.base_url.clone()).await?;

    let token = prompt::secret(&secret_prompt("API token", config.ojs.api_token.is_some())).await?;
    if !token.is_empty() {
        config.ojs.api_token = Some(SecretString::from(token));
    }

    config.ojs.username = prompt::input("Username", config.ojs.username.clone()).await?;

    let password = prompt::secret(&secret_prompt("Password", config.ojs.password.is_some())).await?;
    if !password.is_empty() {
        config.ojs.password = Some(SecretString::from(password));
    }

    for warning in validate(&config) {
        println!("{} {warning}", "WARN".yellow());
    }

    save_config(&path, &config)?;
    println!(
        "{} Saved settings to {}",
        "OK".green(),
        path.display().to_string().cyan()
    );

    let missing = config.missing_required();
    if !missing.is_empty() {
        println!("{} Still missing: {}", "WARN".yellow(), missing.join(", "));
    }
    Ok(config)
}
