//! Upload plans: which galleys to create, which remote files to delete and
//! which local files to upload, in execution order.

use std::collections::BTreeSet;

use crate::analyze::ConflictReport;
use crate::classify::{LocalFile, LocalFiles};
use crate::natural::natural_key;
use crate::remote::RemoteState;
use crate::taxonomy::{GalleyLabel, Genre, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanMode {
    /// Nothing is published yet; everything uploads.
    Fresh,
    /// Only files that do not collide with anything published.
    Selective,
    /// Colliding remote files are deleted and replaced.
    Overwrite,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deletion {
    pub galley: GalleyLabel,
    pub filename: String,
    pub is_main: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedUpload {
    pub file: LocalFile,
    pub galley: GalleyLabel,
    pub genre: Genre,
    pub is_dependent: bool,
}

impl PlannedUpload {
    fn new(file: &LocalFile) -> Self {
        Self {
            file: file.clone(),
            galley: file.role.galley(),
            genre: file.role.genre(),
            is_dependent: file.role.is_dependent(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No HTML file locally and no HTML galley remotely.
    NoHtml,
    /// No main upload precedes it and no main file exists remotely.
    NoMainFile,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedUpload {
    pub file: LocalFile,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPlan {
    pub mode: PlanMode,
    pub galleys_to_create: Vec<GalleyLabel>,
    pub deletions: Vec<Deletion>,
    pub uploads: Vec<PlannedUpload>,
    pub skipped: Vec<SkippedUpload>,
}

impl UploadPlan {
    fn empty(mode: PlanMode) -> Self {
        Self {
            mode,
            galleys_to_create: Vec::new(),
            deletions: Vec::new(),
            uploads: Vec::new(),
            skipped: Vec::new(),
        }
    }

    /// Nothing would change remotely.
    pub fn is_empty(&self) -> bool {
        self.galleys_to_create.is_empty() && self.deletions.is_empty() && self.uploads.is_empty()
    }

    pub fn uploads_for(&self, galley: GalleyLabel) -> impl Iterator<Item = &PlannedUpload> {
        self.uploads.iter().filter(move |u| u.galley == galley)
    }

    pub fn online_pdf_upload(&self) -> Option<&PlannedUpload> {
        self.uploads.iter().find(|u| u.file.role == Role::OnlinePdf)
    }

    fn create_missing(&mut self, remote: &RemoteState) {
        let needed: BTreeSet<GalleyLabel> = self
            .uploads
            .iter()
            .map(|u| u.galley)
            .filter(|g| remote.galley(*g).is_none())
            .collect();
        self.galleys_to_create = needed.into_iter().collect();
    }

    /// Groups uploads by galley (first appearance), mains before dependents,
    /// and moves dependents that would have no parent to `skipped`.
    fn finalize(mut self, remote: &RemoteState) -> Self {
        let mut galley_order: Vec<GalleyLabel> = Vec::new();
        for u in &self.uploads {
            if !galley_order.contains(&u.galley) {
                galley_order.push(u.galley);
            }
        }
        self.uploads.sort_by_key(|u| {
            let group = galley_order.iter().position(|g| *g == u.galley);
            (group, u.is_dependent)
        });

        let mut with_main: BTreeSet<GalleyLabel> = BTreeSet::new();
        let mut kept = Vec::with_capacity(self.uploads.len());
        for upload in std::mem::take(&mut self.uploads) {
            if !upload.is_dependent {
                with_main.insert(upload.galley);
                kept.push(upload);
            } else if with_main.contains(&upload.galley)
                || remote.main_file_id(upload.galley).is_some()
            {
                kept.push(upload);
            } else {
                self.skipped.push(SkippedUpload {
                    file: upload.file,
                    reason: SkipReason::NoMainFile,
                });
            }
        }
        self.uploads = kept;
        self.create_missing(remote);
        self
    }
}

/// Every local file, in role order. Dependents need an HTML main file,
/// local or already published.
fn fresh_uploads(local: &LocalFiles, remote: &RemoteState, plan: &mut UploadPlan) {
    let has_html = local.html.is_some() || remote.main_file_id(GalleyLabel::Html).is_some();
    for file in local.iter() {
        if file.role.is_dependent() && !has_html {
            plan.skipped.push(SkippedUpload {
                file: file.clone(),
                reason: SkipReason::NoHtml,
            });
        } else {
            plan.uploads.push(PlannedUpload::new(file));
        }
    }
}

/// Plan for a submission with nothing published yet.
pub fn fresh_plan(local: &LocalFiles, remote: &RemoteState) -> UploadPlan {
    let mut plan = UploadPlan::empty(PlanMode::Fresh);
    fresh_uploads(local, remote, &mut plan);
    plan.finalize(remote)
}

/// Uploads only what the analysis found new or addable.
pub fn selective_plan(report: &ConflictReport, remote: &RemoteState) -> UploadPlan {
    let mut plan = UploadPlan::empty(PlanMode::Selective);
    for new in &report.new_files {
        if new.is_uploadable() {
            plan.uploads.push(PlannedUpload::new(&new.file));
        } else {
            plan.skipped.push(SkippedUpload {
                file: new.file.clone(),
                reason: SkipReason::NoHtml,
            });
        }
    }
    for (galley, files) in &report.can_add_to_existing {
        plan.uploads.extend(files.iter().map(|file| PlannedUpload {
            galley: *galley,
            is_dependent: true,
            ..PlannedUpload::new(file)
        }));
    }
    plan.finalize(remote)
}

/// Deletes what collides in galleys receiving local content, then uploads
/// the fresh set.
pub fn overwrite_plan(
    local: &LocalFiles,
    report: &ConflictReport,
    remote: &RemoteState,
) -> UploadPlan {
    let mut plan = UploadPlan::empty(PlanMode::Overwrite);
    fresh_uploads(local, remote, &mut plan);

    let receiving: BTreeSet<GalleyLabel> = plan.uploads.iter().map(|u| u.galley).collect();
    let mut seen = BTreeSet::new();
    for (galley, entry) in &report.conflicts {
        if !receiving.contains(galley) {
            continue;
        }
        let mains = entry
            .main
            .as_ref()
            .map(|_| entry.existing_files.iter())
            .into_iter()
            .flatten();
        let matched = entry
            .conflicting_files
            .iter()
            .chain(&entry.conflicting_css)
            .chain(&entry.conflicting_figures)
            .flat_map(|c| c.remote.iter());
        for file in mains.chain(matched) {
            if seen.insert((*galley, file.id)) {
                plan.deletions.push(Deletion {
                    galley: *galley,
                    filename: file.name.clone(),
                    is_main: file.is_main,
                });
            }
        }
    }
    plan.deletions
        .sort_by_cached_key(|d| (d.galley, !d.is_main, natural_key(&d.filename)));
    plan.finalize(remote)
}

/// What the operator may choose after a conflict analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanChoice {
    Selective,
    Overwrite,
    Cancel,
}

impl PlanChoice {
    pub fn key(self) -> char {
        match self {
            Self::Selective => 'n',
            Self::Overwrite => 'o',
            Self::Cancel => 'c',
        }
    }
}

/// Choices offered for `report`; empty when nothing can be uploaded.
pub fn plan_options(report: &ConflictReport) -> Vec<PlanChoice> {
    let uploadable = report.has_uploadable();
    let mut options = Vec::new();
    if uploadable {
        options.push(PlanChoice::Selective);
    }
    if report.has_conflicts() {
        options.extend([PlanChoice::Overwrite, PlanChoice::Cancel]);
    } else if uploadable {
        options.push(PlanChoice::Cancel);
    }
    options
}

/// Non-interactive choice: the non-destructive plan when possible.
pub fn auto_choose(options: &[PlanChoice]) -> Option<PlanChoice> {
    [PlanChoice::Selective, PlanChoice::Overwrite]
        .into_iter()
        .find(|c| options.contains(c))
}
