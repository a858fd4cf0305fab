use std::time::Duration;

use reqwest::RequestBuilder;
use serde::{Serialize, de::DeserializeOwned};

use crate::{
    config::{OjsConfig, REST_USER_AGENT},
    error::OjsError,
};

/// OJS REST API client
///
/// Requests are sent once; the caller decides what is worth retrying.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    config: OjsConfig,
}

impl Client {
    /// Creates a new client for the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn with_config(config: OjsConfig) -> Result<Self, OjsError> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(120))
            .user_agent(REST_USER_AGENT)
            .build()?;
        Ok(Self { http, config })
    }

    /// Replaces the HTTP client with a custom one
    #[must_use]
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    /// Returns a reference to the client's configuration
    #[must_use]
    pub const fn config(&self) -> &OjsConfig {
        &self.config
    }

    pub(crate) async fn get<O>(&self, path: &str, query: &[(&str, String)]) -> Result<O, OjsError>
    where
        O: DeserializeOwned,
    {
        let req = self
            .http
            .get(self.config.api_url(path))
            .headers(self.config.headers()?)
            .query(query);
        self.execute(req).await
    }

    pub(crate) async fn put<I>(&self, path: &str, body: &I) -> Result<(), OjsError>
    where
        I: Serialize + Sync,
    {
        let req = self
            .http
            .put(self.config.api_url(path))
            .headers(self.config.headers()?)
            .json(body);
        self.execute_raw(req).await.map(|_| ())
    }

    pub(crate) async fn post_multipart<O>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<O, OjsError>
    where
        O: DeserializeOwned,
    {
        let req = self
            .http
            .post(self.config.api_url(path))
            .headers(self.config.headers()?)
            .multipart(form);
        self.execute(req).await
    }

    pub(crate) async fn delete(&self, path: &str, query: &[(&str, String)]) -> Result<(), OjsError> {
        let req = self
            .http
            .delete(self.config.api_url(path))
            .headers(self.config.headers()?)
            .query(query);
        self.execute_raw(req).await.map(|_| ())
    }

    /// Sends an unauthenticated-tolerant GET and returns only the status code
    pub(crate) async fn status_of(&self, path: &str) -> Result<reqwest::StatusCode, OjsError> {
        let resp = self
            .http
            .get(self.config.api_url(path))
            .headers(self.config.headers()?)
            .send()
            .await?;
        Ok(resp.status())
    }

    async fn execute<O>(&self, req: RequestBuilder) -> Result<O, OjsError>
    where
        O: DeserializeOwned,
    {
        let bytes = self.execute_raw(req).await?;
        let resp: O =
            serde_json::from_slice(&bytes).map_err(|e| crate::error::map_deser(&e, &bytes))?;
        Ok(resp)
    }

    async fn execute_raw(&self, req: RequestBuilder) -> Result<bytes::Bytes, OjsError> {
        // Validate auth before any request
        self.config.validate_auth()?;

        let response = req.send().await.map_err(OjsError::Reqwest)?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(OjsError::Reqwest)?;

        if status.is_success() {
            return Ok(bytes);
        }

        tracing::debug!(status = status.as_u16(), "OJS request failed");
        Err(crate::error::deserialize_api_error(status, &bytes))
    }
}
