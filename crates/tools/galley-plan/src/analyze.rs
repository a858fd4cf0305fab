//! Cross-references local files with the remote snapshot.
//!
//! Every local file ends up in exactly one bucket of the [`ConflictReport`]:
//! a collision under some [`ConflictEntry`], a [`NewFile`], or an addable
//! dependent in `can_add_to_existing`.

use std::collections::BTreeMap;

use crate::classify::{LocalFile, LocalFiles};
use crate::remote::{RemoteFile, RemoteGalley, RemoteState};
use crate::taxonomy::GalleyLabel;

/// Loose name match: equal, or either contains the other, ignoring case.
///
/// Empty names never match.
pub fn names_collide(local: &str, remote: &str) -> bool {
    if local.is_empty() || remote.is_empty() {
        return false;
    }
    let local = local.to_lowercase();
    let remote = remote.to_lowercase();
    local == remote || local.contains(&remote) || remote.contains(&local)
}

/// A local file and the remote files it collides with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collision {
    pub local: LocalFile,
    pub remote: Vec<RemoteFile>,
}

impl Collision {
    fn against<'a>(local: &LocalFile, candidates: impl IntoIterator<Item = &'a RemoteFile>) -> Option<Self> {
        let remote: Vec<RemoteFile> = candidates
            .into_iter()
            .filter(|r| names_collide(&local.name, &r.name))
            .cloned()
            .collect();
        (!remote.is_empty()).then(|| Self {
            local: local.clone(),
            remote,
        })
    }
}

/// Collisions within one galley.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConflictEntry {
    /// Remote files the operator is shown for this galley.
    pub existing_files: Vec<RemoteFile>,
    /// Collision of the galley's main candidate (PDF or HTML).
    pub main: Option<Collision>,
    /// Replication / appendix collisions.
    pub conflicting_files: Vec<Collision>,
    pub conflicting_css: Vec<Collision>,
    pub conflicting_figures: Vec<Collision>,
}

impl ConflictEntry {
    pub fn collisions(&self) -> impl Iterator<Item = &Collision> {
        self.main
            .iter()
            .chain(&self.conflicting_files)
            .chain(&self.conflicting_css)
            .chain(&self.conflicting_figures)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewFileStatus {
    /// The galley does not exist remotely yet.
    NewGalley,
    /// The galley exists and nothing in it collides.
    Additional,
    /// A figure or stylesheet with no HTML to attach to, locally or remotely.
    Orphaned,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFile {
    pub file: LocalFile,
    pub galley: GalleyLabel,
    pub status: NewFileStatus,
}

impl NewFile {
    pub fn is_uploadable(&self) -> bool {
        self.status != NewFileStatus::Orphaned
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConflictReport {
    pub conflicts: BTreeMap<GalleyLabel, ConflictEntry>,
    pub new_files: Vec<NewFile>,
    /// Dependents that can join an existing remote galley without collision.
    pub can_add_to_existing: BTreeMap<GalleyLabel, Vec<LocalFile>>,
}

impl ConflictReport {
    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }

    /// New (non-orphaned) or addable files exist.
    pub fn has_uploadable(&self) -> bool {
        self.new_files.iter().any(NewFile::is_uploadable)
            || self.can_add_to_existing.values().any(|v| !v.is_empty())
    }

    pub fn uploadable_count(&self) -> usize {
        self.new_files.iter().filter(|f| f.is_uploadable()).count()
            + self.can_add_to_existing.values().map(Vec::len).sum::<usize>()
    }

    pub fn conflicting_count(&self) -> usize {
        self.conflicts.values().map(|e| e.collisions().count()).sum()
    }

    /// Number of local files accounted for across all buckets.
    pub fn classified_count(&self) -> usize {
        self.conflicting_count()
            + self.new_files.len()
            + self.can_add_to_existing.values().map(Vec::len).sum::<usize>()
    }

    fn add_new(&mut self, file: &LocalFile, galley: GalleyLabel, status: NewFileStatus) {
        self.new_files.push(NewFile {
            file: file.clone(),
            galley,
            status,
        });
    }

    fn entry(&mut self, galley: GalleyLabel) -> &mut ConflictEntry {
        self.conflicts.entry(galley).or_default()
    }
}

/// Classifies every local file against the remote galleys.
pub fn analyze(local: &LocalFiles, remote: &RemoteState) -> ConflictReport {
    let mut report = ConflictReport::default();

    if let Some(pdf) = &local.online_pdf {
        match remote.galley(GalleyLabel::Pdf) {
            None => report.add_new(pdf, GalleyLabel::Pdf, NewFileStatus::NewGalley),
            Some(galley) => match Collision::against(pdf, &galley.files) {
                Some(hit) => {
                    let entry = report.entry(GalleyLabel::Pdf);
                    entry.existing_files = galley.files.clone();
                    entry.main = Some(hit);
                }
                None => report.add_new(pdf, GalleyLabel::Pdf, NewFileStatus::Additional),
            },
        }
    }

    analyze_html(local, remote.galley(GalleyLabel::Html), &mut report);

    for (files, label) in [
        (&local.replication, GalleyLabel::ReplicationFiles),
        (&local.appendix, GalleyLabel::OnlineAppendix),
    ] {
        let galley = remote.galley(label);
        for file in files {
            let Some(galley) = galley else {
                report.add_new(file, label, NewFileStatus::NewGalley);
                continue;
            };
            match Collision::against(file, &galley.files) {
                Some(hit) => {
                    let entry = report.entry(label);
                    entry.existing_files = galley.files.clone();
                    entry.conflicting_files.push(hit);
                }
                None => report.add_new(file, label, NewFileStatus::Additional),
            }
        }
    }

    report
}

fn analyze_html(local: &LocalFiles, galley: Option<&RemoteGalley>, report: &mut ConflictReport) {
    let label = GalleyLabel::Html;
    let Some(galley) = galley else {
        let status = if local.html.is_some() {
            NewFileStatus::NewGalley
        } else {
            NewFileStatus::Orphaned
        };
        for file in local.html.iter().chain(&local.css).chain(&local.figures) {
            report.add_new(file, label, status);
        }
        return;
    };

    if let Some(html) = &local.html {
        let mains: Vec<&RemoteFile> = galley.files.iter().filter(|f| f.is_main).collect();
        match Collision::against(html, mains.iter().copied()) {
            Some(hit) => {
                let entry = report.entry(label);
                entry.existing_files = mains.into_iter().cloned().collect();
                entry.main = Some(hit);
            }
            None => report.add_new(html, label, NewFileStatus::Additional),
        }
    }

    let mut addable = Vec::new();
    for (files, is_css) in [(&local.css, true), (&local.figures, false)] {
        for file in files {
            match Collision::against(file, &galley.files) {
                Some(hit) => {
                    let entry = report.entry(label);
                    if entry.main.is_none() {
                        entry.existing_files = galley.files.clone();
                    }
                    if is_css {
                        entry.conflicting_css.push(hit);
                    } else {
                        entry.conflicting_figures.push(hit);
                    }
                }
                None => addable.push(file.clone()),
            }
        }
    }
    if !addable.is_empty() {
        report.can_add_to_existing.insert(label, addable);
    }
}
