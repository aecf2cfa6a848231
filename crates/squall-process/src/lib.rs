//! Workflow processes for Squall models.
//!
//! A [`WorkflowProcess`] is a unit of column physics or forcing that runs
//! at its own fixed cadence after each dynamics update. This crate defines
//! the trait, the [`ProcessContext`] a process works through, the
//! [`Schedule`] that decides which processes are due, and the
//! [`HaloGuard`] used to enforce interior-only writes.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod context;
pub mod guard;
pub mod process;
pub mod schedule;

pub use context::ProcessContext;
pub use guard::HaloGuard;
pub use process::WorkflowProcess;
pub use schedule::{validate_schedule, DueList, Schedule, ScheduleError, ScheduledProcess};
