//! Interactive prompts.
//!
//! dialoguer blocks the calling thread, so every prompt runs on the blocking
//! pool and Ctrl-C stays observable in `main`.

use anyhow::{Context, Result};

async fn blocking<T, F>(what: &'static str, f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> dialoguer::Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .context("Prompt task failed")?
        .with_context(|| format!("Failed to read {what}"))
}

/// Prompt for confirmation
pub async fn confirm(prompt: &str, default: bool) -> Result<bool> {
    let prompt = prompt.to_string();
    blocking("confirmation", move || {
        dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(default)
            .interact()
    })
    .await
}

/// Prompt for selection from a list
pub async fn select(prompt: &str, items: Vec<String>) -> Result<usize> {
    let prompt = prompt.to_string();
    blocking("selection", move || {
        dialoguer::Select::new()
            .with_prompt(prompt)
            .items(&items)
            .default(0)
            .interact()
    })
    .await
}

/// Prompt for text input, pre-filled with `initial`
pub async fn input(prompt: &str, initial: String) -> Result<String> {
    let prompt = prompt.to_string();
    blocking("input", move || {
        dialoguer::Input::<String>::new()
            .with_prompt(prompt)
            .with_initial_text(initial)
            .allow_empty(true)
            .interact_text()
    })
    .await
    .map(|s| s.trim().to_string())
}

/// Prompt for a secret; an empty answer means "keep the current value"
pub async fn secret(prompt: &str) -> Result<String> {
    let prompt = prompt.to_string();
    blocking("secret", move || {
        dialoguer::Password::new()
            .with_prompt(prompt)
            .allow_empty_password(true)
            .interact()
    })
    .await
    .map(|s| s.trim().to_string())
}
