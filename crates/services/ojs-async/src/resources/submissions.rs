use crate::{client::Client, error::OjsError, types::Submission};

/// API resource for `/submissions`
pub struct Submissions<'c> {
    client: &'c Client,
}

impl<'c> Submissions<'c> {
    /// Creates a new Submissions resource
    #[must_use]
    pub const fn new(client: &'c Client) -> Self {
        Self { client }
    }

    /// Fetches one submission with its publications and galleys.
    ///
    /// A 404 is reported as `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API returns any other error.
    pub async fn get(&self, submission_id: u64) -> Result<Option<Submission>, OjsError> {
        match self
            .client
            .get(&format!("submissions/{submission_id}"), &[])
            .await
        {
            Ok(sub) => Ok(Some(sub)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Checks that the API is reachable.
    ///
    /// 200 and 401 both count as reachable; the token is validated later by real calls.
    ///
    /// # Errors
    ///
    /// Returns an error if the server cannot be reached or answers with another status.
    pub async fn ping(&self) -> Result<(), OjsError> {
        let status = self.client.status_of("submissions").await?;
        match status.as_u16() {
            200 | 401 => Ok(()),
            code => Err(OjsError::api(code, "connection check failed")),
        }
    }
}

impl crate::Client {
    /// Returns the Submissions API resource
    #[must_use]
    pub const fn submissions(&self) -> Submissions<'_> {
        Submissions::new(self)
    }
}
