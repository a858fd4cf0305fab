use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when talking to an OJS instance
#[derive(Debug, Error)]
pub enum OjsError {
    /// HTTP request error
    #[error("HTTP error: {0}")]
    Reqwest(#[from] reqwest::Error),

    /// API error returned by OJS
    #[error("API error: {0}")]
    Api(ApiErrorObject),

    /// Configuration error (e.g., missing credentials)
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(String),

    /// Local file could not be read for upload
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Web login was rejected or the login form was not recognised
    #[error("Login failed: {0}")]
    Login(String),

    /// A web grid form could not be scraped or was rejected
    #[error("Form error: {0}")]
    Form(String),
}

/// API error object returned by the OJS REST API
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorObject {
    /// HTTP status code
    #[serde(default)]
    pub status_code: Option<u16>,
    /// Error key such as `api.404.resourceNotFound`
    #[serde(default)]
    pub error: Option<String>,
    /// Human-readable error message
    #[serde(default, rename = "errorMessage", alias = "message")]
    pub message: String,
}

impl std::fmt::Display for ApiErrorObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(code) = self.status_code {
            write!(f, "HTTP {code}")?;
        }
        if let Some(key) = &self.error {
            write!(f, " [{key}]")?;
        }
        if !self.message.is_empty() {
            write!(f, " {}", self.message)?;
        }
        Ok(())
    }
}

impl OjsError {
    /// Returns the HTTP status of an API error, if this is one
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api(obj) => obj.status_code,
            _ => None,
        }
    }

    /// True for a 404 response
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// True for a 403 response
    #[must_use]
    pub fn is_forbidden(&self) -> bool {
        self.status() == Some(403)
    }

    /// Builds an API error from a status and message
    #[must_use]
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api(ApiErrorObject {
            status_code: Some(status),
            error: None,
            message: message.into(),
        })
    }
}

/// Maps a serde deserialization error to an `OjsError` with context
#[must_use]
pub fn map_deser(e: &serde_json::Error, body: &[u8]) -> OjsError {
    let snippet = String::from_utf8_lossy(&body[..body.len().min(400)]).to_string();
    OjsError::Serde(format!("{e}: {snippet}"))
}

/// Deserializes an API error from the response body
///
/// OJS answers with JSON on handled errors and with an HTML page on PHP fatals.
#[must_use]
pub fn deserialize_api_error(status: StatusCode, body: &[u8]) -> OjsError {
    let status_code = Some(status.as_u16());

    if let Ok(mut obj) = serde_json::from_slice::<ApiErrorObject>(body) {
        obj.status_code = status_code;
        return OjsError::Api(obj);
    }

    let text = String::from_utf8_lossy(&body[..body.len().min(400)]).into_owned();
    let message = fatal_error_line(&text).unwrap_or(text);
    OjsError::Api(ApiErrorObject {
        status_code,
        error: Some(format!("http_{}", status.as_u16())),
        message,
    })
}

fn fatal_error_line(text: &str) -> Option<String> {
    let start = text.find("Fatal error:")?;
    let rest = &text[start..];
    let end = rest.find(" in ").unwrap_or(rest.len());
    Some(rest[..end].trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ojs_error_shape() {
        let body = br#"{"error":"api.404.resourceNotFound","errorMessage":"The requested resource was not found."}"#;
        let err = deserialize_api_error(StatusCode::NOT_FOUND, body);
        assert!(err.is_not_found());
        match err {
            OjsError::Api(obj) => {
                assert_eq!(obj.error.as_deref(), Some("api.404.resourceNotFound"));
                assert_eq!(obj.message, "The requested resource was not found.");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn plain_text_body_keeps_php_fatal_message() {
        let body = b"<br /><b>Fatal error</b>: x <br/>Fatal error: Uncaught Exception in /var/www/x.php";
        let err = deserialize_api_error(StatusCode::INTERNAL_SERVER_ERROR, body);
        assert_eq!(err.status(), Some(500));
        let OjsError::Api(obj) = err else {
            panic!("expected api error")
        };
        assert_eq!(obj.message, "Fatal error: Uncaught Exception");
        assert_eq!(obj.error.as_deref(), Some("http_500"));
    }

    #[test]
    fn display_includes_status_and_key() {
        let err = OjsError::Api(ApiErrorObject {
            status_code: Some(403),
            error: Some("api.403.unauthorized".into()),
            message: "Nope".into(),
        });
        assert_eq!(err.to_string(), "API error: HTTP 403 [api.403.unauthorized] Nope");
        assert!(err.is_forbidden());
    }
}
