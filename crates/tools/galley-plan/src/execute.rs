//! Sequential execution of an [`UploadPlan`]: delete, create, upload,
//! post-process.

use std::collections::BTreeSet;
use std::fmt;
use std::time::Duration;

use backon::TokioSleeper;
use ojs_async::OjsError;
use ojs_async::types::{UploadRequest, WORKFLOW_STAGE_PRODUCTION, WORKFLOW_STAGE_SUBMISSION};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::natural::natural_key;
use crate::pages::{PdfText, extract_page_range};
use crate::plan::{Deletion, PlannedUpload, UploadPlan};
use crate::platform::Platform;
use crate::poll::{PollPolicy, poll_until};
use crate::remote::RemoteState;
use crate::taxonomy::{GalleyLabel, Role};

/// Delays between mutations and reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub settle_delay: Duration,
    pub verify: PollPolicy,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_secs(2),
            verify: PollPolicy::default(),
        }
    }
}

/// Failures that stop execution part way.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("Submission {0} is no longer available")]
    Unavailable(u64),

    #[error("Failed to re-read submission state: {0}")]
    Refetch(#[source] OjsError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeletionStatus {
    Planned,
    Deleted { file_id: u64 },
    /// A dependent removed together with its main file.
    AutoResolved,
    /// No remote file by that name; probably gone already.
    Missing,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GalleyStatus {
    Planned,
    Created,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadStatus {
    Planned,
    Uploaded { file_id: u64, parent_id: Option<u64> },
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PagesOutcome {
    /// No online PDF was (or would be) uploaded.
    NotApplicable,
    Preview(String),
    Updated(String),
    NotFound,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecWarning {
    Unverified { name: String, file_id: u64 },
    NoParent { galley: GalleyLabel },
}

impl fmt::Display for ExecWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unverified { name, file_id } => write!(
                f,
                "Main file {name} (ID: {file_id}) could not be verified, dependent files may not link correctly"
            ),
            Self::NoParent { galley } => write!(
                f,
                "No main file ID found for {galley}, dependent files cannot be linked"
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionReport {
    pub dry_run: bool,
    pub deletions: Vec<(Deletion, DeletionStatus)>,
    pub galleys: Vec<(GalleyLabel, GalleyStatus)>,
    pub uploads: Vec<(PlannedUpload, UploadStatus)>,
    pub pages: PagesOutcome,
    pub warnings: Vec<ExecWarning>,
}

impl ExecutionReport {
    fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            deletions: Vec::new(),
            galleys: Vec::new(),
            uploads: Vec::new(),
            pages: PagesOutcome::NotApplicable,
            warnings: Vec::new(),
        }
    }

    pub fn uploaded_count(&self) -> usize {
        self.uploads
            .iter()
            .filter(|(_, s)| matches!(s, UploadStatus::Uploaded { .. }))
            .count()
    }

    pub fn deleted_count(&self) -> usize {
        self.deletions
            .iter()
            .filter(|(_, s)| matches!(s, DeletionStatus::Deleted { .. }))
            .count()
    }

    pub fn auto_resolved_count(&self) -> usize {
        self.deletions
            .iter()
            .filter(|(_, s)| *s == DeletionStatus::AutoResolved)
            .count()
    }

    pub fn failed_count(&self) -> usize {
        let deletions = self
            .deletions
            .iter()
            .filter(|(_, s)| matches!(s, DeletionStatus::Failed(_)))
            .count();
        let galleys = self
            .galleys
            .iter()
            .filter(|(_, s)| matches!(s, GalleyStatus::Failed(_)))
            .count();
        let uploads = self
            .uploads
            .iter()
            .filter(|(_, s)| matches!(s, UploadStatus::Failed(_)))
            .count();
        deletions + galleys + uploads
    }

    /// A dry run succeeds once reported; a real run needs one upload.
    pub fn succeeded(&self) -> bool {
        self.dry_run || self.uploaded_count() > 0
    }
}

/// Walks a plan against a [`Platform`], one request at a time.
pub struct Executor<'a, P: Platform + ?Sized> {
    platform: &'a P,
    pdf: &'a dyn PdfText,
    timing: Timing,
    dry_run: bool,
}

impl<'a, P: Platform + ?Sized> Executor<'a, P> {
    pub fn new(platform: &'a P, pdf: &'a dyn PdfText) -> Self {
        Self {
            platform,
            pdf,
            timing: Timing::default(),
            dry_run: false,
        }
    }

    #[must_use]
    pub fn with_timing(mut self, timing: Timing) -> Self {
        self.timing = timing;
        self
    }

    /// Report what would happen without touching the platform.
    #[must_use]
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Executes `plan` against the submission captured in `snapshot`.
    pub async fn run(
        &self,
        plan: &UploadPlan,
        snapshot: &RemoteState,
    ) -> Result<ExecutionReport, ExecError> {
        let mut report = ExecutionReport::new(self.dry_run);

        self.delete(plan, snapshot, &mut report).await;
        let deleted = report.deleted_count();
        if deleted > 0 {
            self.settle().await;
        }

        self.create_galleys(plan, snapshot, &mut report).await;

        let state = if !self.dry_run && (deleted > 0 || !plan.galleys_to_create.is_empty()) {
            if !plan.galleys_to_create.is_empty() {
                self.settle().await;
            }
            self.refetch(snapshot.submission_id).await?
        } else {
            snapshot.clone()
        };

        self.upload(plan, &state, &mut report).await;
        self.update_pages(plan, &state, &mut report).await;

        info!(
            uploaded = report.uploaded_count(),
            planned = plan.uploads.len(),
            failed = report.failed_count(),
            "Execution finished"
        );
        Ok(report)
    }

    async fn settle(&self) {
        debug!(delay = ?self.timing.settle_delay, "Waiting for changes to settle");
        tokio::time::sleep(self.timing.settle_delay).await;
    }

    async fn refetch(&self, submission_id: u64) -> Result<RemoteState, ExecError> {
        self.platform
            .remote_state(submission_id)
            .await
            .map_err(ExecError::Refetch)?
            .ok_or(ExecError::Unavailable(submission_id))
    }

    async fn delete(&self, plan: &UploadPlan, snapshot: &RemoteState, report: &mut ExecutionReport) {
        let mut ordered: Vec<&Deletion> = plan.deletions.iter().collect();
        ordered.sort_by_cached_key(|d| (d.galley, !d.is_main, natural_key(&d.filename)));

        let mut main_deleted: BTreeSet<GalleyLabel> = BTreeSet::new();
        for deletion in ordered {
            let status = if !deletion.is_main && main_deleted.contains(&deletion.galley) {
                DeletionStatus::AutoResolved
            } else if let Some(file_id) = snapshot.find_file_id(deletion.galley, &deletion.filename) {
                if self.dry_run {
                    DeletionStatus::Planned
                } else {
                    match self.platform.delete_file(snapshot.submission_id, file_id).await {
                        Ok(()) => {
                            info!(file = %deletion.filename, file_id, galley = %deletion.galley, "Deleted");
                            DeletionStatus::Deleted { file_id }
                        }
                        Err(e) => {
                            warn!(file = %deletion.filename, error = %e, "Failed to delete");
                            DeletionStatus::Failed(e.to_string())
                        }
                    }
                }
            } else {
                warn!(file = %deletion.filename, galley = %deletion.galley, "File not found for deletion");
                DeletionStatus::Missing
            };

            if deletion.is_main
                && matches!(status, DeletionStatus::Planned | DeletionStatus::Deleted { .. })
            {
                main_deleted.insert(deletion.galley);
            }
            report.deletions.push((deletion.clone(), status));
        }
    }

    async fn create_galleys(
        &self,
        plan: &UploadPlan,
        snapshot: &RemoteState,
        report: &mut ExecutionReport,
    ) {
        for &label in &plan.galleys_to_create {
            let status = if self.dry_run {
                GalleyStatus::Planned
            } else {
                match self
                    .platform
                    .create_galley(snapshot.submission_id, snapshot.publication_id, label)
                    .await
                {
                    Ok(()) => {
                        info!(galley = %label, "Created galley");
                        GalleyStatus::Created
                    }
                    Err(e) => {
                        warn!(galley = %label, error = %e, "Failed to create galley");
                        GalleyStatus::Failed(e.to_string())
                    }
                }
            };
            report.galleys.push((label, status));
        }
    }

    async fn upload(&self, plan: &UploadPlan, state: &RemoteState, report: &mut ExecutionReport) {
        let mut order: Vec<GalleyLabel> = Vec::new();
        for u in &plan.uploads {
            if !order.contains(&u.galley) {
                order.push(u.galley);
            }
        }

        for galley in order {
            let (deps, mains): (Vec<&PlannedUpload>, Vec<&PlannedUpload>) =
                plan.uploads_for(galley).partition(|u| u.is_dependent);
            let galley_id = state.galley_id(galley);
            debug!(%galley, ?galley_id, mains = mains.len(), dependents = deps.len(), "Processing galley");

            let mut parent_id = if mains.is_empty() {
                state.main_file_id(galley)
            } else {
                None
            };

            for upload in mains {
                let status = self.upload_main(upload, galley_id, state, report).await;
                if let UploadStatus::Uploaded { file_id, .. } = status {
                    parent_id = Some(file_id);
                }
                report.uploads.push((upload.clone(), status));
            }

            if !deps.is_empty() && parent_id.is_none() && !self.dry_run {
                report.warnings.push(ExecWarning::NoParent { galley });
            }
            for upload in deps {
                let status = self.upload_dependent(upload, parent_id, state).await;
                report.uploads.push((upload.clone(), status));
            }
        }
    }

    async fn upload_main(
        &self,
        upload: &PlannedUpload,
        galley_id: Option<u64>,
        state: &RemoteState,
        report: &mut ExecutionReport,
    ) -> UploadStatus {
        if self.dry_run {
            return UploadStatus::Planned;
        }
        let Some(galley_id) = galley_id else {
            warn!(file = %upload.file.name, galley = %upload.galley, "Galley missing, not uploading");
            return UploadStatus::Failed(format!("{} galley does not exist", upload.galley));
        };

        let request = UploadRequest::main(upload.file.path.clone(), upload.genre.id(), galley_id);
        match self.platform.upload(state.submission_id, &request).await {
            Ok(file_id) => {
                info!(file = %upload.file.name, file_id, galley = %upload.galley, "Uploaded");
                if upload.file.role == Role::Html
                    && !self.verify(state.submission_id, file_id).await
                {
                    report.warnings.push(ExecWarning::Unverified {
                        name: upload.file.name.clone(),
                        file_id,
                    });
                }
                UploadStatus::Uploaded {
                    file_id,
                    parent_id: None,
                }
            }
            Err(e) => {
                warn!(file = %upload.file.name, error = %e, "Upload failed");
                UploadStatus::Failed(e.to_string())
            }
        }
    }

    async fn upload_dependent(
        &self,
        upload: &PlannedUpload,
        parent_id: Option<u64>,
        state: &RemoteState,
    ) -> UploadStatus {
        if self.dry_run {
            return UploadStatus::Planned;
        }
        let Some(parent_id) = parent_id else {
            return UploadStatus::Failed("no main file to link to".into());
        };

        let request = UploadRequest::dependent(upload.file.path.clone(), upload.genre.id(), parent_id);
        match self.platform.upload(state.submission_id, &request).await {
            Ok(file_id) => {
                info!(file = %upload.file.name, file_id, parent_id, "Uploaded dependent");
                UploadStatus::Uploaded {
                    file_id,
                    parent_id: Some(parent_id),
                }
            }
            Err(e) => {
                warn!(file = %upload.file.name, error = %e, "Dependent upload failed");
                UploadStatus::Failed(e.to_string())
            }
        }
    }

    /// Polls until the freshly uploaded file can be read back.
    async fn verify(&self, submission_id: u64, file_id: u64) -> bool {
        let platform = self.platform;
        let result = poll_until(
            self.timing.verify,
            TokioSleeper,
            move || async move {
                match platform
                    .fetch_file(submission_id, file_id, WORKFLOW_STAGE_PRODUCTION)
                    .await
                {
                    Err(e) if e.is_forbidden() => {
                        platform
                            .fetch_file(submission_id, file_id, WORKFLOW_STAGE_SUBMISSION)
                            .await
                    }
                    other => other,
                }
            },
            |e: &OjsError| e.is_not_found() || e.is_forbidden(),
        )
        .await;

        match result {
            Ok(()) => {
                debug!(file_id, "Upload verified");
                true
            }
            Err(e) => {
                warn!(file_id, error = %e, "Upload verification failed");
                false
            }
        }
    }

    async fn update_pages(&self, plan: &UploadPlan, state: &RemoteState, report: &mut ExecutionReport) {
        let Some(pdf) = plan.online_pdf_upload() else {
            return;
        };
        let uploaded = report
            .uploads
            .iter()
            .any(|(u, s)| u.file == pdf.file && matches!(s, UploadStatus::Uploaded { .. }));
        if !self.dry_run && !uploaded {
            return;
        }

        let pages = match extract_page_range(self.pdf, &pdf.file.path) {
            Ok(Some(pages)) => pages,
            Ok(None) => {
                warn!(file = %pdf.file.name, "No page range found in PDF");
                report.pages = PagesOutcome::NotFound;
                return;
            }
            Err(e) => {
                warn!(file = %pdf.file.name, error = %e, "Could not read PDF");
                report.pages = PagesOutcome::Failed(e.to_string());
                return;
            }
        };

        if self.dry_run {
            report.pages = PagesOutcome::Preview(pages);
            return;
        }
        report.pages = match self
            .platform
            .update_pages(state.submission_id, state.publication_id, &pages)
            .await
        {
            Ok(()) => {
                info!(%pages, "Updated publication pages");
                PagesOutcome::Updated(pages)
            }
            Err(e) => {
                warn!(error = %e, "Failed to update publication pages");
                PagesOutcome::Failed(e.to_string())
            }
        };
    }
}
