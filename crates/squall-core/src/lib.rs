//! Core types for the Squall atmospheric modelling framework.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the fundamental vocabulary shared by every other crate in the
//! workspace: exact simulation time, physical constants, state component
//! indices, and the error types that flow up through the model loop.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod constants;
pub mod error;
pub mod state;
pub mod time;

pub use constants::PhysicalConstants;
pub use error::{ProcessError, StepError, TestCaseError};
pub use state::{tracer, DataLocation, PointState, StateComponent};
pub use time::{SimTime, TimeSpan};
