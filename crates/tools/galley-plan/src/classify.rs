//! Discovery of production files in a submission folder.
//!
//! Files are bucketed into [`Role`]s by a fixed, ordered rule table; the first
//! rule that matches wins so every file lands in exactly one bucket. A bundled
//! zip archive (name contains the submission id) is opened first and its
//! matching members are extracted into a scratch directory owned by the
//! returned [`Discovery`].

use std::fmt;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::natural::sort_natural_by;
use crate::taxonomy::Role;

/// A discovered file and the role it was classified into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFile {
    pub path: PathBuf,
    /// Base name, as uploaded.
    pub name: String,
    pub role: Role,
}

impl LocalFile {
    pub fn new(path: impl Into<PathBuf>, role: Role) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { path, name, role }
    }
}

/// Classified local files, one bucket per role.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalFiles {
    pub online_pdf: Option<LocalFile>,
    pub html: Option<LocalFile>,
    pub figures: Vec<LocalFile>,
    pub css: Vec<LocalFile>,
    pub replication: Vec<LocalFile>,
    pub appendix: Vec<LocalFile>,
}

impl LocalFiles {
    pub fn of_role(&self, role: Role) -> &[LocalFile] {
        match role {
            Role::OnlinePdf => self.online_pdf.as_slice(),
            Role::Html => self.html.as_slice(),
            Role::Figure => &self.figures,
            Role::Css => &self.css,
            Role::Replication => &self.replication,
            Role::Appendix => &self.appendix,
        }
    }

    /// Whether `file` would be kept: singleton roles keep their first file,
    /// set roles drop names already present (case-insensitive).
    pub fn accepts(&self, file: &LocalFile) -> bool {
        if file.role.is_singleton() {
            return self.of_role(file.role).is_empty();
        }
        !self
            .of_role(file.role)
            .iter()
            .any(|f| f.name.eq_ignore_ascii_case(&file.name))
    }

    /// Adds `file` to its bucket. Returns `false` when it was rejected.
    pub fn insert(&mut self, file: LocalFile) -> bool {
        if !self.accepts(&file) {
            return false;
        }
        match file.role {
            Role::OnlinePdf => self.online_pdf = Some(file),
            Role::Html => self.html = Some(file),
            Role::Figure => self.figures.push(file),
            Role::Css => self.css.push(file),
            Role::Replication => self.replication.push(file),
            Role::Appendix => self.appendix.push(file),
        }
        true
    }

    /// All files in role order.
    pub fn iter(&self) -> impl Iterator<Item = &LocalFile> {
        Role::ALL
            .into_iter()
            .flat_map(move |role| self.of_role(role).iter())
    }

    pub fn count(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Figures plus stylesheets.
    pub fn dependent_count(&self) -> usize {
        self.figures.len() + self.css.len()
    }

    fn sort(&mut self) {
        for set in [
            &mut self.figures,
            &mut self.css,
            &mut self.replication,
            &mut self.appendix,
        ] {
            sort_natural_by(set, |f| f.name.as_str());
        }
    }
}

/// Where a candidate name comes from; some rules only apply to one of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Archive,
    Folder,
}

struct Rule {
    role: Role,
    in_archive: bool,
    test: fn(&str, &str, Scope) -> bool,
}

const RULES: &[Rule] = &[
    Rule {
        role: Role::OnlinePdf,
        in_archive: true,
        test: |name, id, _| name.contains(&format!("srm_{id}_onlinepdf.pdf")),
    },
    Rule {
        role: Role::Html,
        in_archive: true,
        test: |name, id, _| name.contains(&format!("srm_{id}.html")),
    },
    Rule {
        role: Role::Figure,
        in_archive: true,
        test: |name, id, scope| {
            name.contains(&format!("srm_{id}_fig"))
                && match scope {
                    Scope::Archive => name.ends_with("_html.gif"),
                    Scope::Folder => name.ends_with(".gif"),
                }
        },
    },
    Rule {
        role: Role::Css,
        in_archive: false,
        test: |name, _, _| name.ends_with(".css"),
    },
    Rule {
        role: Role::Replication,
        in_archive: false,
        test: |name, _, _| {
            name.contains("replication")
                && [".zip", ".r", ".do", ".sps"]
                    .iter()
                    .any(|ext| name.ends_with(ext))
        },
    },
    Rule {
        role: Role::Appendix,
        in_archive: true,
        test: |name, id, _| name.contains("moesm") && name.contains("esm.pdf") && name.contains(id),
    },
];

/// Classifies a single file name. Archive members are matched on their full
/// member path, folder files on their base name.
pub fn classify_name(name: &str, submission_id: u64, scope: Scope) -> Option<Role> {
    let lower = name.to_lowercase();
    let id = submission_id.to_string();
    RULES
        .iter()
        .filter(|rule| scope == Scope::Folder || rule.in_archive)
        .find(|rule| (rule.test)(&lower, &id, scope))
        .map(|rule| rule.role)
}

/// Non-fatal findings reported alongside the discovered files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryWarning {
    MultipleArchives { used: String, ignored: Vec<String> },
    CorruptArchive { archive: String, reason: String },
    DependentsWithoutHtml { count: usize },
}

impl fmt::Display for DiscoveryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MultipleArchives { used, ignored } => write!(
                f,
                "Several submission archives found; using {used}, ignoring {}",
                ignored.join(", ")
            ),
            Self::CorruptArchive { archive, reason } => {
                write!(f, "Could not extract from {archive}: {reason}")
            }
            Self::DependentsWithoutHtml { count } => write!(
                f,
                "Found {count} dependent files (CSS/figures) but no HTML file"
            ),
        }
    }
}

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Not a folder: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to create scratch directory: {0}")]
    Scratch(#[source] io::Error),

    #[error("Failed to scan folder: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Result of scanning a submission folder.
///
/// Extracted archive members live in a scratch directory that is removed when
/// this value is dropped, so it must outlive any upload of those files.
#[derive(Debug)]
pub struct Discovery {
    pub files: LocalFiles,
    pub archive: Option<PathBuf>,
    pub extracted: usize,
    pub warnings: Vec<DiscoveryWarning>,
    scratch: Option<TempDir>,
}

impl Discovery {
    pub fn scratch_dir(&self) -> Option<&Path> {
        self.scratch.as_ref().map(TempDir::path)
    }
}

#[derive(Debug, Error)]
enum ArchiveError {
    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Scans `folder` (recursively) and its bundled archive for the files of
/// `submission_id`.
pub fn discover(folder: &Path, submission_id: u64) -> Result<Discovery, DiscoveryError> {
    if !folder.is_dir() {
        return Err(DiscoveryError::NotADirectory(folder.to_path_buf()));
    }

    let mut files = LocalFiles::default();
    let mut warnings = Vec::new();
    let mut scratch = None;
    let mut extracted = 0;

    let archives = archive_candidates(folder, submission_id)?;
    let archive = archives.first().cloned();
    if archives.len() > 1 {
        warnings.push(DiscoveryWarning::MultipleArchives {
            used: display_name(&archives[0]),
            ignored: archives[1..].iter().map(|p| display_name(p)).collect(),
        });
    }

    if let Some(archive) = &archive {
        info!(archive = %archive.display(), "Found submission archive");
        let dir = tempfile::Builder::new()
            .prefix("oja-")
            .tempdir()
            .map_err(DiscoveryError::Scratch)?;
        match extract_archive(archive, submission_id, dir.path()) {
            Ok(staged) => {
                extracted = staged.count();
                files = staged;
            }
            Err(e) => {
                warn!(archive = %archive.display(), error = %e, "Archive extraction failed");
                warnings.push(DiscoveryWarning::CorruptArchive {
                    archive: display_name(archive),
                    reason: e.to_string(),
                });
            }
        }
        scratch = Some(dir);
    }

    for entry in WalkDir::new(folder).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() || archive.as_deref() == Some(entry.path()) {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        let Some(role) = classify_name(&name, submission_id, Scope::Folder) else {
            continue;
        };
        let file = LocalFile::new(entry.path(), role);
        if !files.insert(file) {
            debug!(file = %entry.path().display(), ?role, "Skipping duplicate");
        }
    }

    files.sort();
    if files.html.is_none() && files.dependent_count() > 0 {
        warnings.push(DiscoveryWarning::DependentsWithoutHtml {
            count: files.dependent_count(),
        });
    }

    Ok(Discovery {
        files,
        archive,
        extracted,
        warnings,
        scratch,
    })
}

/// Zip files directly inside `folder` whose name contains the id, in natural
/// order. Replication bundles are never treated as the submission archive.
fn archive_candidates(folder: &Path, submission_id: u64) -> Result<Vec<PathBuf>, DiscoveryError> {
    let id = submission_id.to_string();
    let io_err = |source| DiscoveryError::Io {
        path: folder.to_path_buf(),
        source,
    };

    let mut found = Vec::new();
    for entry in fs::read_dir(folder).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().into_owned();
        let is_zip = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"));
        if path.is_file()
            && is_zip
            && name.contains(&id)
            && classify_name(&name, submission_id, Scope::Folder) != Some(Role::Replication)
        {
            found.push((name, path));
        }
    }
    sort_natural_by(&mut found, |(name, _)| name.as_str());
    Ok(found.into_iter().map(|(_, path)| path).collect())
}

/// Extracts matching members into `scratch`. Nothing is returned unless the
/// whole archive could be read.
fn extract_archive(
    archive: &Path,
    submission_id: u64,
    scratch: &Path,
) -> Result<LocalFiles, ArchiveError> {
    let mut zip = zip::ZipArchive::new(File::open(archive)?)?;
    let mut staged = LocalFiles::default();

    for i in 0..zip.len() {
        let mut member = zip.by_index(i)?;
        if member.is_dir() {
            continue;
        }
        let member_name = member.name().to_string();
        let Some(role) = classify_name(&member_name, submission_id, Scope::Archive) else {
            continue;
        };
        let Some(base) = Path::new(&member_name).file_name() else {
            continue;
        };
        let file = LocalFile::new(scratch.join(base), role);
        if !staged.accepts(&file) {
            continue;
        }
        let mut out = File::create(&file.path)?;
        io::copy(&mut member, &mut out)?;
        debug!(member = %member_name, ?role, "Extracted");
        staged.insert(file);
    }
    Ok(staged)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
