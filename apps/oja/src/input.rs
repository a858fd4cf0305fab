//! Resolving the command-line argument to a submission and its folder.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use galley_plan::natural::sort_natural_by;

/// What the positional argument named.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub submission_id: u64,
    /// Set when a folder path was given instead of a bare id.
    pub folder: Option<PathBuf>,
}

/// First standalone run of 4 or 5 digits in `name`.
pub fn submission_id_from_name(name: &str) -> Option<u64> {
    name.split(|c: char| !c.is_ascii_digit())
        .find(|run| (4..=5).contains(&run.len()))
        .and_then(|run| run.parse().ok())
}

/// Parses a submission id, or a folder path whose name carries one.
pub fn parse_input(value: &str) -> Result<Target> {
    let value = value.trim();
    if let Ok(submission_id) = value.parse::<u64>() {
        return Ok(Target {
            submission_id,
            folder: None,
        });
    }

    let path = Path::new(value);
    if !path.is_dir() {
        bail!("Path does not exist or is not a directory: {value}");
    }

    let resolved = std::fs::canonicalize(path)
        .with_context(|| format!("Failed to resolve {}", path.display()))?;
    let name = resolved
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    match submission_id_from_name(&name) {
        Some(submission_id) => Ok(Target {
            submission_id,
            folder: Some(path.to_path_buf()),
        }),
        None => bail!(
            "Could not extract submission ID from folder name: {name}\n\
             Expected a 4 or 5-digit number in the folder name"
        ),
    }
}

/// Folders directly under `dir` whose name contains the submission id.
pub fn matching_folders(dir: &Path, submission_id: u64) -> Result<Vec<PathBuf>> {
    let id = submission_id.to_string();
    let mut found = Vec::new();
    for entry in std::fs::read_dir(dir).with_context(|| format!("Failed to read {}", dir.display()))? {
        let entry = entry?;
        let matches = entry.file_name().to_string_lossy().contains(&id);
        if matches && entry.file_type()?.is_dir() {
            found.push(entry.path());
        }
    }
    sort_natural_by(&mut found, |p| {
        p.file_name().and_then(|n| n.to_str()).unwrap_or_default()
    });
    Ok(found)
}
