//! The seam between planning and the remote OJS instance.

use async_trait::async_trait;
use ojs_async::types::{UploadRequest, WORKFLOW_STAGE_PRODUCTION};
use ojs_async::{Client, OjsError, WebSession};

use crate::remote::RemoteState;
use crate::taxonomy::GalleyLabel;

/// Everything the executor needs from the platform, one call per request.
#[async_trait]
pub trait Platform: Send + Sync {
    /// Current publication snapshot, `None` when the submission is unavailable.
    async fn remote_state(&self, submission_id: u64) -> Result<Option<RemoteState>, OjsError>;

    async fn create_galley(
        &self,
        submission_id: u64,
        publication_id: u64,
        label: GalleyLabel,
    ) -> Result<(), OjsError>;

    /// Uploads a file and returns its new id.
    async fn upload(&self, submission_id: u64, request: &UploadRequest) -> Result<u64, OjsError>;

    /// Succeeds once the file can be read back in `stage_id`.
    async fn fetch_file(
        &self,
        submission_id: u64,
        file_id: u64,
        stage_id: u32,
    ) -> Result<(), OjsError>;

    async fn delete_file(&self, submission_id: u64, file_id: u64) -> Result<(), OjsError>;

    async fn update_pages(
        &self,
        submission_id: u64,
        publication_id: u64,
        pages: &str,
    ) -> Result<(), OjsError>;
}

/// [`Platform`] backed by the REST client and a logged-in web session.
pub struct OjsPlatform {
    client: Client,
    session: WebSession,
    locale: String,
}

impl OjsPlatform {
    pub fn new(client: Client, session: WebSession, locale: impl Into<String>) -> Self {
        Self {
            client,
            session,
            locale: locale.into(),
        }
    }
}

#[async_trait]
impl Platform for OjsPlatform {
    async fn remote_state(&self, submission_id: u64) -> Result<Option<RemoteState>, OjsError> {
        let submission = self.client.submissions().get(submission_id).await?;
        Ok(submission.and_then(|s| RemoteState::from_submission(&s, &self.locale)))
    }

    async fn create_galley(
        &self,
        submission_id: u64,
        publication_id: u64,
        label: GalleyLabel,
    ) -> Result<(), OjsError> {
        self.session
            .create_galley(submission_id, publication_id, label.as_str(), &self.locale)
            .await
    }

    async fn upload(&self, submission_id: u64, request: &UploadRequest) -> Result<u64, OjsError> {
        let file = self.client.files().upload(submission_id, request).await?;
        Ok(file.id)
    }

    async fn fetch_file(
        &self,
        submission_id: u64,
        file_id: u64,
        stage_id: u32,
    ) -> Result<(), OjsError> {
        self.client
            .files()
            .get(submission_id, file_id, stage_id)
            .await
            .map(|_| ())
    }

    async fn delete_file(&self, submission_id: u64, file_id: u64) -> Result<(), OjsError> {
        self.client
            .files()
            .delete(submission_id, file_id, WORKFLOW_STAGE_PRODUCTION)
            .await
    }

    async fn update_pages(
        &self,
        submission_id: u64,
        publication_id: u64,
        pages: &str,
    ) -> Result<(), OjsError> {
        self.client
            .publications()
            .update_pages(submission_id, publication_id, pages)
            .await
    }
}
