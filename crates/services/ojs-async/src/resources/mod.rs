//! API resource implementations for the OJS client

/// Submission files API resource
pub mod files;
/// Publications API resource
pub mod publications;
/// Submissions API resource
pub mod submissions;

pub use files::Files;
pub use publications::Publications;
pub use submissions::Submissions;
