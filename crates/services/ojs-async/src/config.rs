use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};

/// User agent sent on REST calls
pub const REST_USER_AGENT: &str = concat!("oja/", env!("CARGO_PKG_VERSION"));
/// User agent sent by the web session; the grid handlers reject unknown agents on some installs
pub const WEB_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko)";

/// Connection settings for one OJS instance.
///
/// Debug output redacts the API token and password via [`SecretString`].
#[derive(Clone, Debug)]
pub struct OjsConfig {
    base_url: String,
    api_token: Option<SecretString>,
    username: Option<String>,
    password: Option<SecretString>,
}

impl OjsConfig {
    /// Creates a configuration for the instance rooted at `base_url`
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_token: None,
            username: None,
            password: None,
        }
    }

    /// Sets the REST API token
    #[must_use]
    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(SecretString::from(token.into()));
        self
    }

    /// Sets the REST API token from an existing secret
    #[must_use]
    pub fn with_api_token_secret(mut self, token: SecretString) -> Self {
        self.api_token = Some(token);
        self
    }

    /// Sets the web login credentials
    #[must_use]
    pub fn with_credentials(mut self, username: impl Into<String>, password: SecretString) -> Self {
        self.username = Some(username.into());
        self.password = Some(password);
        self
    }

    /// Returns the configured base URL without a trailing slash
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Returns the web login username, if set
    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub(crate) fn password(&self) -> Option<&SecretString> {
        self.password.as_ref()
    }

    /// Constructs the full URL for a path below the base URL
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        format!("{}/{path}", self.base_url())
    }

    /// Constructs the full URL for a REST API path (`/api/v1/...`)
    #[must_use]
    pub fn api_url(&self, path: &str) -> String {
        self.url(&format!("api/v1/{}", path.trim_start_matches('/')))
    }

    /// Returns the headers sent on every REST request.
    ///
    /// # Errors
    ///
    /// Returns an error if the token contains characters that cannot appear in a header.
    pub fn headers(&self) -> Result<HeaderMap, crate::error::OjsError> {
        use crate::error::OjsError;

        let mut h = HeaderMap::new();
        h.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(secret) = &self.api_token {
            let token = secret.expose_secret().trim();
            if !token.is_empty() {
                h.insert(
                    AUTHORIZATION,
                    HeaderValue::from_str(&format!("Bearer {token}"))
                        .map_err(|_| OjsError::Config("Invalid API token value".into()))?,
                );
            }
        }

        Ok(h)
    }

    /// Validates that a REST API token is present.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is missing or blank.
    pub fn validate_auth(&self) -> Result<(), crate::error::OjsError> {
        match &self.api_token {
            Some(secret) if !secret.expose_secret().trim().is_empty() => Ok(()),
            _ => Err(crate::error::OjsError::Config(
                "Missing OJS API token: set OJS_API_TOKEN or run with --settings".into(),
            )),
        }
    }

    /// Validates that web login credentials are present.
    ///
    /// # Errors
    ///
    /// Returns an error if the username or password is missing or blank.
    pub fn validate_login(&self) -> Result<(), crate::error::OjsError> {
        let user_ok = self.username.as_deref().is_some_and(|u| !u.trim().is_empty());
        let pass_ok = self
            .password
            .as_ref()
            .is_some_and(|p| !p.expose_secret().is_empty());
        if user_ok && pass_ok {
            Ok(())
        } else {
            Err(crate::error::OjsError::Config(
                "Missing OJS web credentials: set OJS_USERNAME and OJS_PASSWORD".into(),
            ))
        }
    }
}
