use serde::Serialize;

use crate::{client::Client, error::OjsError};

#[derive(Serialize)]
struct PagesPatch<'a> {
    pages: &'a str,
}

/// API resource for `/submissions/{id}/publications`
pub struct Publications<'c> {
    client: &'c Client,
}

impl<'c> Publications<'c> {
    /// Creates a new Publications resource
    #[must_use]
    pub const fn new(client: &'c Client) -> Self {
        Self { client }
    }

    /// Sets the `pages` field of a publication and nothing else.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API returns an error.
    pub async fn update_pages(
        &self,
        submission_id: u64,
        publication_id: u64,
        pages: &str,
    ) -> Result<(), OjsError> {
        self.client
            .put(
                &format!("submissions/{submission_id}/publications/{publication_id}"),
                &PagesPatch { pages },
            )
            .await
    }
}

impl crate::Client {
    /// Returns the Publications API resource
    #[must_use]
    pub const fn publications(&self) -> Publications<'_> {
        Publications::new(self)
    }
}
