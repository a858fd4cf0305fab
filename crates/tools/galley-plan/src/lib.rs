//! Galley upload planning for OJS submissions.
//!
//! The pipeline, leaf to root:
//! - [`classify`]: finds production files in a submission folder (and its bundled zip)
//! - [`remote`]: normalizes the submission's current publication into galleys and files
//! - [`analyze`]: cross-references both into conflicts, new files and addable dependents
//! - [`plan`]: turns the analysis into an ordered [`plan::UploadPlan`]
//! - [`execute`]: walks the plan against a [`platform::Platform`]
//!
//! Everything talks to OJS through the [`platform::Platform`] trait so the
//! executor can be driven by a fake in tests.

pub mod analyze;
pub mod classify;
pub mod execute;
pub mod natural;
pub mod pages;
pub mod plan;
pub mod platform;
pub mod poll;
pub mod remote;
pub mod taxonomy;

pub use analyze::{ConflictReport, analyze};
pub use classify::{Discovery, DiscoveryError, LocalFile, LocalFiles, discover};
pub use execute::{ExecError, ExecutionReport, Executor, Timing};
pub use plan::{PlanChoice, PlanMode, UploadPlan};
pub use platform::{OjsPlatform, Platform};
pub use remote::RemoteState;
pub use taxonomy::{GalleyLabel, Genre, Role};
