//! Normalized snapshot of a submission's published galleys.

use ojs_async::types::{Galley, Submission};

use crate::natural::sort_natural_by;
use crate::taxonomy::GalleyLabel;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    pub name: String,
    pub id: u64,
    pub mime_type: String,
    pub is_main: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteGalley {
    /// Label as stored remotely.
    pub label: String,
    /// `None` for labels outside the known taxonomy.
    pub kind: Option<GalleyLabel>,
    pub id: u64,
    /// Main file and its dependents, natural-sorted by name.
    pub files: Vec<RemoteFile>,
}

impl RemoteGalley {
    fn from_galley(galley: &Galley, locale: &str) -> Self {
        let mut files = Vec::new();
        if let Some(main) = &galley.file {
            files.push(RemoteFile {
                name: main.display_name(locale),
                id: main.id,
                mime_type: mime_or_unknown(main.mimetype.as_deref()),
                is_main: true,
            });
            files.extend(main.dependent_files.iter().map(|dep| RemoteFile {
                name: dep.display_name(locale),
                id: dep.id,
                mime_type: mime_or_unknown(dep.mimetype.as_deref()),
                is_main: false,
            }));
        }
        sort_natural_by(&mut files, |f| f.name.as_str());
        Self {
            label: galley.label.clone(),
            kind: GalleyLabel::from_label(&galley.label),
            id: galley.id,
            files,
        }
    }

    pub fn main_file(&self) -> Option<&RemoteFile> {
        self.files.iter().find(|f| f.is_main)
    }
}

fn mime_or_unknown(mime: Option<&str>) -> String {
    mime.unwrap_or("unknown").to_string()
}

/// Galleys of the submission's current publication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteState {
    pub submission_id: u64,
    pub publication_id: u64,
    pub galleys: Vec<RemoteGalley>,
}

impl RemoteState {
    /// `None` when the submission has no publication.
    pub fn from_submission(submission: &Submission, locale: &str) -> Option<Self> {
        let publication = submission.current_publication()?;
        Some(Self {
            submission_id: submission.id,
            publication_id: publication.id,
            galleys: publication
                .galleys
                .iter()
                .map(|g| RemoteGalley::from_galley(g, locale))
                .collect(),
        })
    }

    /// First galley carrying `label`.
    pub fn galley(&self, label: GalleyLabel) -> Option<&RemoteGalley> {
        self.galleys.iter().find(|g| g.kind == Some(label))
    }

    pub fn galley_id(&self, label: GalleyLabel) -> Option<u64> {
        self.galley(label).map(|g| g.id)
    }

    /// Whether any galley has at least one file.
    pub fn has_content(&self) -> bool {
        self.galleys.iter().any(|g| !g.files.is_empty())
    }

    pub fn main_file_id(&self, label: GalleyLabel) -> Option<u64> {
        self.galley(label)?.main_file().map(|f| f.id)
    }

    /// Id of the file named exactly `name` in `label`'s galley.
    pub fn find_file_id(&self, label: GalleyLabel, name: &str) -> Option<u64> {
        self.galley(label)?
            .files
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.id)
    }
}
