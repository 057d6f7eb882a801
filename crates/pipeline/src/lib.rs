//! Orchestration of the documentation build.
//!
//! [`Pipeline`] wires the stage crates together: patches from
//! `refdoc-patch`, reference documents from `refdoc-reference`, and the
//! external tools from `refdoc-toolchain`. The run's [`BuildMode`] is
//! computed once by the caller and consulted by every stage; nothing below
//! reads the environment on its own.

mod advisor;
mod build;
pub mod error;
mod mode;
mod notes;
mod patches;
mod pipeline;
mod purge;
mod scan;
mod stamp;

pub use crate::advisor::{AdvisorState, FailureAdvisor};
pub use crate::build::{BuildOrchestrator, BuildOutcome};
pub use crate::mode::{BuildMode, Invocation};
pub use crate::notes::ReleaseNotesInjector;
pub use crate::patches::PatchSet;
pub use crate::pipeline::{Pipeline, Report};
pub use crate::purge::purge;
pub use crate::scan::ReferenceScanner;
pub use crate::stamp::{STAMP_FILE, Stamp};
