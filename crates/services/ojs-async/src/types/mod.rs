//! Request and response types for the OJS API

/// Submission files, upload requests and OJS constants
pub mod file;
/// Submissions, publications and galleys
pub mod submission;

pub use file::*;
pub use submission::*;
