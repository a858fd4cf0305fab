use reqwest::multipart::{Form, Part};

use crate::{
    client::Client,
    error::OjsError,
    types::{SubmissionFile, UploadRequest, mime_for},
};

/// API resource for `/submissions/{id}/files`
pub struct Files<'c> {
    client: &'c Client,
}

impl<'c> Files<'c> {
    /// Creates a new Files resource
    #[must_use]
    pub const fn new(client: &'c Client) -> Self {
        Self { client }
    }

    /// Uploads a local file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the request fails or the API rejects it.
    pub async fn upload(
        &self,
        submission_id: u64,
        req: &UploadRequest,
    ) -> Result<SubmissionFile, OjsError> {
        let data = tokio::fs::read(&req.path).await?;
        let file_name = req
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let part = Part::bytes(data)
            .file_name(file_name)
            .mime_str(mime_for(&req.path))?;

        let mut form = Form::new().part("file", part);
        for (key, value) in req.fields() {
            form = form.text(key, value);
        }

        tracing::debug!(submission_id, fields = ?req.fields(), path = %req.path.display(), "uploading file");
        self.client
            .post_multipart(&format!("submissions/{submission_id}/files"), form)
            .await
    }

    /// Fetches one file in the given workflow stage.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API returns an error (404, 403, ...).
    pub async fn get(
        &self,
        submission_id: u64,
        file_id: u64,
        stage_id: u32,
    ) -> Result<SubmissionFile, OjsError> {
        self.client
            .get(
                &format!("submissions/{submission_id}/files/{file_id}"),
                &[("stageId", stage_id.to_string())],
            )
            .await
    }

    /// Deletes one file in the given workflow stage.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API returns an error.
    pub async fn delete(
        &self,
        submission_id: u64,
        file_id: u64,
        stage_id: u32,
    ) -> Result<(), OjsError> {
        self.client
            .delete(
                &format!("submissions/{submission_id}/files/{file_id}"),
                &[("stageId", stage_id.to_string())],
            )
            .await
    }
}

impl crate::Client {
    /// Returns the Files API resource
    #[must_use]
    pub const fn files(&self) -> Files<'_> {
        Files::new(self)
    }
}
