use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// `fileStage` for galley (proof) files
pub const FILE_STAGE_PROOF: u32 = 10;
/// `fileStage` for files attached to another submission file
pub const FILE_STAGE_DEPENDENT: u32 = 17;
/// `assocType` linking a file to a galley
pub const ASSOC_TYPE_REPRESENTATION: u32 = 521;
/// `assocType` linking a file to another submission file
pub const ASSOC_TYPE_SUBMISSION_FILE: u32 = 515;
/// Workflow stage id of the submission stage
pub const WORKFLOW_STAGE_SUBMISSION: u32 = 1;
/// Workflow stage id of the production stage
pub const WORKFLOW_STAGE_PRODUCTION: u32 = 5;

/// A localized string as OJS returns it: usually `{"en_US": "..."}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocalizedText {
    /// Plain string (older installs)
    Plain(String),
    /// Locale to value map
    Map(BTreeMap<String, Option<String>>),
}

impl LocalizedText {
    /// Value for `locale`, else the first non-empty value
    #[must_use]
    pub fn get(&self, locale: &str) -> Option<&str> {
        match self {
            Self::Plain(s) => Some(s.as_str()).filter(|s| !s.is_empty()),
            Self::Map(map) => map
                .get(locale)
                .and_then(|v| v.as_deref())
                .filter(|s| !s.is_empty())
                .or_else(|| {
                    map.values()
                        .filter_map(|v| v.as_deref())
                        .find(|s| !s.is_empty())
                }),
        }
    }
}

/// A submission file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionFile {
    /// Submission file id
    pub id: u64,
    /// Localized file name
    #[serde(default)]
    pub name: Option<LocalizedText>,
    /// MIME type
    #[serde(default)]
    pub mimetype: Option<String>,
    /// File stage
    #[serde(default)]
    pub file_stage: Option<u32>,
    /// Parent file for dependents
    #[serde(default)]
    pub source_submission_file_id: Option<u64>,
    /// Files attached to this one
    #[serde(default)]
    pub dependent_files: Vec<SubmissionFile>,
}

impl SubmissionFile {
    /// Display name in `locale`, `Unknown` when absent
    #[must_use]
    pub fn display_name(&self, locale: &str) -> String {
        self.name
            .as_ref()
            .and_then(|n| n.get(locale))
            .unwrap_or("Unknown")
            .to_string()
    }
}

/// A file upload to `POST /api/v1/submissions/{id}/files`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    /// Local path of the file
    pub path: PathBuf,
    /// `fileStage`
    pub file_stage: u32,
    /// `genreId`
    pub genre_id: u32,
    /// `assocType` and `assocId`
    pub assoc: Option<(u32, u64)>,
    /// `sourceSubmissionFileId`
    pub source_submission_file_id: Option<u64>,
}

impl UploadRequest {
    /// Main file of a galley
    #[must_use]
    pub fn main(path: impl Into<PathBuf>, genre_id: u32, galley_id: u64) -> Self {
        Self {
            path: path.into(),
            file_stage: FILE_STAGE_PROOF,
            genre_id,
            assoc: Some((ASSOC_TYPE_REPRESENTATION, galley_id)),
            source_submission_file_id: None,
        }
    }

    /// File attached to the main file `parent_id`
    #[must_use]
    pub fn dependent(path: impl Into<PathBuf>, genre_id: u32, parent_id: u64) -> Self {
        Self {
            path: path.into(),
            file_stage: FILE_STAGE_DEPENDENT,
            genre_id,
            assoc: Some((ASSOC_TYPE_SUBMISSION_FILE, parent_id)),
            source_submission_file_id: Some(parent_id),
        }
    }

    /// Text form fields in the order they are sent
    #[must_use]
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("fileStage", self.file_stage.to_string()),
            ("genreId", self.genre_id.to_string()),
        ];
        if let Some((assoc_type, assoc_id)) = self.assoc {
            fields.push(("assocType", assoc_type.to_string()));
            fields.push(("assocId", assoc_id.to_string()));
        }
        if let Some(source) = self.source_submission_file_id {
            fields.push(("sourceSubmissionFileId", source.to_string()));
        }
        fields
    }
}

/// MIME type sent for an upload, by extension
#[must_use]
pub fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "pdf" => "application/pdf",
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "gif" => "image/gif",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "zip" => "application/zip",
        "r" | "do" => "text/plain",
        _ => "application/octet-stream",
    }
}
