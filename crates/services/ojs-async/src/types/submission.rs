use serde::{Deserialize, Serialize};

use super::file::SubmissionFile;

/// A submission as returned by `GET /api/v1/submissions/{id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    /// Submission id
    pub id: u64,
    /// Id of the publication currently in the workflow
    #[serde(default)]
    pub current_publication_id: Option<u64>,
    /// All publications (versions) of the submission
    #[serde(default)]
    pub publications: Vec<Publication>,
}

impl Submission {
    /// Returns the current publication, or the first one when the current id is unknown
    #[must_use]
    pub fn current_publication(&self) -> Option<&Publication> {
        self.current_publication_id
            .and_then(|id| self.publications.iter().find(|p| p.id == id))
            .or_else(|| self.publications.first())
    }
}

/// One version of a submission
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Publication {
    /// Publication id
    pub id: u64,
    /// Page range, e.g. `100-110`
    #[serde(default)]
    pub pages: Option<String>,
    /// Galleys attached to this publication
    #[serde(default)]
    pub galleys: Vec<Galley>,
}

/// A rendition of the article (PDF, HTML, ...)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Galley {
    /// Galley (representation) id
    pub id: u64,
    /// Display label such as `PDF` or `Replication Files`
    #[serde(default)]
    pub label: String,
    /// Galley locale
    #[serde(default)]
    pub locale: Option<String>,
    /// Main file; dependents hang off it
    #[serde(default)]
    pub file: Option<SubmissionFile>,
}

impl Galley {
    /// Dependent files of the main file
    #[must_use]
    pub fn dependent_files(&self) -> &[SubmissionFile] {
        self.file.as_ref().map_or(&[], |f| f.dependent_files.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_publication_prefers_matching_id() {
        let sub: Submission = serde_json::from_value(serde_json::json!({
            "id": 8661,
            "currentPublicationId": 12,
            "publications": [{"id": 11}, {"id": 12, "pages": "1-2"}]
        }))
        .unwrap();
        assert_eq!(sub.current_publication().unwrap().id, 12);
    }

    #[test]
    fn current_publication_falls_back_to_first() {
        let sub: Submission = serde_json::from_value(serde_json::json!({
            "id": 8661,
            "currentPublicationId": 99,
            "publications": [{"id": 11}, {"id": 12}]
        }))
        .unwrap();
        assert_eq!(sub.current_publication().unwrap().id, 11);

        let empty: Submission =
            serde_json::from_value(serde_json::json!({"id": 1, "publications": []})).unwrap();
        assert!(empty.current_publication().is_none());
    }

    #[test]
    fn galley_with_null_file_has_no_dependents() {
        let g: Galley =
            serde_json::from_value(serde_json::json!({"id": 3, "label": "PDF", "file": null}))
                .unwrap();
        assert!(g.file.is_none());
        assert!(g.dependent_files().is_empty());
    }
}
