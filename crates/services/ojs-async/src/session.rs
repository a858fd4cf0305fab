use std::time::Duration;

use secrecy::ExposeSecret;
use serde::Deserialize;

use crate::{
    client::Client,
    config::{OjsConfig, WEB_USER_AGENT},
    error::OjsError,
    form,
};

const GALLEY_GRID: &str = "$$$call$$$/grid/article-galleys/article-galley-grid";

/// Grid handlers answer with `{"status": bool, "content": "<html>"}`
#[derive(Debug, Deserialize)]
struct GridResponse {
    #[serde(default)]
    status: Option<bool>,
    #[serde(default)]
    content: Option<String>,
}

/// A logged-in browser session.
///
/// Holds its own cookie jar; obtain one with [`Client::login`].
#[derive(Debug, Clone)]
pub struct WebSession {
    http: reqwest::Client,
    config: OjsConfig,
}

impl Client {
    /// Logs in through the web form and returns the session.
    ///
    /// # Errors
    ///
    /// Returns an error if credentials are missing, the login form cannot be found,
    /// or the platform keeps the browser on the login page.
    pub async fn login(&self) -> Result<WebSession, OjsError> {
        let config = self.config().clone();
        config.validate_login()?;

        let http = reqwest::Client::builder()
            .cookie_store(true)
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(60))
            .user_agent(WEB_USER_AGENT)
            .build()?;

        let resp = http.get(config.url("login")).send().await?;
        if !resp.status().is_success() {
            return Err(OjsError::Login(format!(
                "login page returned HTTP {}",
                resp.status().as_u16()
            )));
        }
        let html = resp.text().await?;
        let login_form = form::find_form(&html, "login")
            .ok_or_else(|| OjsError::Login("login form not found".into()))?;

        let mut fields = login_form.hidden;
        fields.push((
            "username".into(),
            config.username().unwrap_or_default().to_string(),
        ));
        fields.push((
            "password".into(),
            config
                .password()
                .map(|p| p.expose_secret().to_string())
                .unwrap_or_default(),
        ));
        fields.push(("remember".into(), "0".into()));

        let action = resolve_action(&config, login_form.action.as_deref());
        tracing::debug!(%action, "submitting login form");
        let resp = http.post(&action).form(&fields).send().await?;

        let landed = resp.url().as_str().to_ascii_lowercase();
        let ok = landed.contains("dashboard")
            || landed.contains("submissions")
            || !landed.contains("login");
        if !ok {
            return Err(OjsError::Login(
                "credentials rejected (still on the login page)".into(),
            ));
        }

        tracing::debug!(%landed, "web login succeeded");
        Ok(WebSession { http, config })
    }
}

fn resolve_action(config: &OjsConfig, action: Option<&str>) -> String {
    match action.map(str::trim).filter(|a| !a.is_empty()) {
        Some(a) if a.starts_with("http://") || a.starts_with("https://") => a.to_string(),
        Some(a) if a.starts_with('/') => format!("{}{a}", config.base_url()),
        Some(a) => config.url(a),
        None => config.url("login"),
    }
}

impl WebSession {
    /// Creates a galley on a publication through the article galley grid.
    ///
    /// # Errors
    ///
    /// Returns an error if the add-galley form has no CSRF token or the update is rejected.
    pub async fn create_galley(
        &self,
        submission_id: u64,
        publication_id: u64,
        label: &str,
        locale: &str,
    ) -> Result<(), OjsError> {
        let ids = [
            ("submissionId", submission_id.to_string()),
            ("publicationId", publication_id.to_string()),
        ];

        let resp = self
            .http
            .get(self.config.url(&format!("{GALLEY_GRID}/add-galley")))
            .query(&ids)
            .send()
            .await?;
        if resp.status() != reqwest::StatusCode::OK {
            return Err(OjsError::Form(format!(
                "add-galley returned HTTP {}",
                resp.status().as_u16()
            )));
        }
        let text = resp.text().await?;
        let html = serde_json::from_str::<GridResponse>(&text)
            .ok()
            .and_then(|g| g.content)
            .unwrap_or(text);
        let csrf = form::input_value(&html, "csrfToken")
            .ok_or_else(|| OjsError::Form("csrfToken not found in add-galley form".into()))?;

        let resp = self
            .http
            .post(self.config.url(&format!("{GALLEY_GRID}/update-galley")))
            .query(&ids)
            .query(&[("representationId", "")])
            .form(&[
                ("csrfToken", csrf.as_str()),
                ("label", label),
                ("galleyLocale", locale),
            ])
            .send()
            .await?;
        if resp.status() != reqwest::StatusCode::OK {
            return Err(OjsError::Form(format!(
                "update-galley returned HTTP {}",
                resp.status().as_u16()
            )));
        }

        let text = resp.text().await?;
        let accepted = match serde_json::from_str::<GridResponse>(&text) {
            Ok(grid) => grid.status == Some(true),
            Err(_) => !text.to_ascii_lowercase().contains("error"),
        };
        if accepted {
            tracing::debug!(submission_id, publication_id, label, "galley created");
            Ok(())
        } else {
            Err(OjsError::Form(format!("galley '{label}' was rejected")))
        }
    }
}
