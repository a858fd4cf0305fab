#![allow(dead_code)]

use std::collections::{BTreeSet, VecDeque};
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use galley_plan::execute::Timing;
use galley_plan::pages::{PagesError, PdfText};
use galley_plan::poll::PollPolicy;
use galley_plan::remote::{RemoteFile, RemoteGalley, RemoteState};
use galley_plan::{GalleyLabel, Platform};
use ojs_async::OjsError;
use ojs_async::types::{ASSOC_TYPE_REPRESENTATION, UploadRequest};

pub const SUBMISSION: u64 = 8661;
pub const PUBLICATION: u64 = 12;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    RemoteState,
    CreateGalley(GalleyLabel),
    Upload {
        name: String,
        fields: Vec<(&'static str, String)>,
    },
    Fetch { file_id: u64, stage: u32 },
    Delete(u64),
    UpdatePages(String),
}

struct Inner {
    remote: Option<RemoteState>,
    next_id: u64,
    fetch_results: VecDeque<Result<(), u16>>,
    failing_uploads: BTreeSet<String>,
    failing_galleys: BTreeSet<GalleyLabel>,
    calls: Vec<Call>,
}

/// In-memory OJS that applies mutations to its snapshot.
pub struct FakePlatform {
    inner: Mutex<Inner>,
}

impl FakePlatform {
    pub fn new(remote: RemoteState) -> Self {
        Self {
            inner: Mutex::new(Inner {
                remote: Some(remote),
                next_id: 1000,
                fetch_results: VecDeque::new(),
                failing_uploads: BTreeSet::new(),
                failing_galleys: BTreeSet::new(),
                calls: Vec::new(),
            }),
        }
    }

    /// Statuses returned by successive `fetch_file` calls; `Ok` once exhausted.
    pub fn with_fetch_results(self, results: impl IntoIterator<Item = Result<(), u16>>) -> Self {
        self.inner.lock().unwrap().fetch_results = results.into_iter().collect();
        self
    }

    pub fn failing_upload(self, name: &str) -> Self {
        self.inner.lock().unwrap().failing_uploads.insert(name.to_string());
        self
    }

    pub fn failing_galley(self, label: GalleyLabel) -> Self {
        self.inner.lock().unwrap().failing_galleys.insert(label);
        self
    }

    pub fn vanish(&self) {
        self.inner.lock().unwrap().remote = None;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.inner.lock().unwrap().calls.clone()
    }

    pub fn uploads(&self) -> Vec<(String, Vec<(&'static str, String)>)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Upload { name, fields } => Some((name, fields)),
                _ => None,
            })
            .collect()
    }

    pub fn snapshot(&self) -> Option<RemoteState> {
        self.inner.lock().unwrap().remote.clone()
    }
}

fn field<'a>(fields: &'a [(&'static str, String)], key: &str) -> Option<&'a str> {
    fields.iter().find(|(k, _)| *k == key).map(|(_, v)| v.as_str())
}

pub fn upload_field(fields: &[(&'static str, String)], key: &str) -> Option<String> {
    field(fields, key).map(str::to_string)
}

#[async_trait]
impl Platform for FakePlatform {
    async fn remote_state(&self, _submission_id: u64) -> Result<Option<RemoteState>, OjsError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(Call::RemoteState);
        Ok(inner.remote.clone())
    }

    async fn create_galley(
        &self,
        _submission_id: u64,
        _publication_id: u64,
        label: GalleyLabel,
    ) -> Result<(), OjsError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(Call::CreateGalley(label));
        if inner.failing_galleys.contains(&label) {
            return Err(OjsError::Form("galley form rejected".into()));
        }
        inner.next_id += 1;
        let id = inner.next_id;
        if let Some(remote) = inner.remote.as_mut() {
            remote.galleys.push(RemoteGalley {
                label: label.as_str().into(),
                kind: Some(label),
                id,
                files: Vec::new(),
            });
        }
        Ok(())
    }

    async fn upload(&self, _submission_id: u64, request: &UploadRequest) -> Result<u64, OjsError> {
        let mut inner = self.inner.lock().unwrap();
        let name = request
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        inner.calls.push(Call::Upload {
            name: name.clone(),
            fields: request.fields(),
        });
        if inner.failing_uploads.contains(&name) {
            return Err(OjsError::api(500, "upload rejected"));
        }
        inner.next_id += 1;
        let id = inner.next_id;
        let Some(remote) = inner.remote.as_mut() else {
            return Err(OjsError::api(404, "gone"));
        };
        let is_main = matches!(request.assoc, Some((ASSOC_TYPE_REPRESENTATION, _)));
        let galley = remote.galleys.iter_mut().find(|g| match request.assoc {
            Some((ASSOC_TYPE_REPRESENTATION, galley_id)) => g.id == galley_id,
            _ => g
                .files
                .iter()
                .any(|f| Some(f.id) == request.source_submission_file_id),
        });
        if let Some(galley) = galley {
            galley.files.push(RemoteFile {
                name,
                id,
                mime_type: "unknown".into(),
                is_main,
            });
        }
        Ok(id)
    }

    async fn fetch_file(
        &self,
        _submission_id: u64,
        file_id: u64,
        stage_id: u32,
    ) -> Result<(), OjsError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(Call::Fetch {
            file_id,
            stage: stage_id,
        });
        match inner.fetch_results.pop_front() {
            Some(Err(status)) => Err(OjsError::api(status, "not yet")),
            _ => Ok(()),
        }
    }

    async fn delete_file(&self, _submission_id: u64, file_id: u64) -> Result<(), OjsError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(Call::Delete(file_id));
        if let Some(remote) = inner.remote.as_mut() {
            for galley in &mut remote.galleys {
                let was_main = galley.files.iter().any(|f| f.id == file_id && f.is_main);
                if was_main {
                    galley.files.clear();
                } else {
                    galley.files.retain(|f| f.id != file_id);
                }
            }
        }
        Ok(())
    }

    async fn update_pages(
        &self,
        _submission_id: u64,
        _publication_id: u64,
        pages: &str,
    ) -> Result<(), OjsError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(Call::UpdatePages(pages.to_string()));
        Ok(())
    }
}

/// First-page text stub.
pub struct FixedText(pub &'static str);

impl PdfText for FixedText {
    fn first_page_text(&self, _path: &Path) -> Result<String, PagesError> {
        Ok(self.0.to_string())
    }
}

pub fn instant() -> Timing {
    Timing {
        settle_delay: Duration::ZERO,
        verify: PollPolicy::new(3, Duration::ZERO),
    }
}

pub fn remote_file(name: &str, id: u64, is_main: bool) -> RemoteFile {
    RemoteFile {
        name: name.into(),
        id,
        mime_type: "unknown".into(),
        is_main,
    }
}

pub fn state(galleys: Vec<(GalleyLabel, u64, Vec<RemoteFile>)>) -> RemoteState {
    RemoteState {
        submission_id: SUBMISSION,
        publication_id: PUBLICATION,
        galleys: galleys
            .into_iter()
            .map(|(label, id, files)| RemoteGalley {
                label: label.as_str().into(),
                kind: Some(label),
                id,
                files,
            })
            .collect(),
    }
}

pub fn touch(dir: &Path, name: &str) {
    std::fs::write(dir.join(name), b"x").unwrap();
}
