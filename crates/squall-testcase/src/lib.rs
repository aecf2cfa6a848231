//! Analytic test cases for Squall models.
//!
//! A [`TestCase`] supplies everything the model cannot compute itself:
//! topography, the initial state, an optional balanced reference state
//! and an optional sponge-layer damping field. [`NonHydroMountain`] is the
//! reference implementation.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod mountain;
pub mod test_case;

pub use mountain::{NonHydroMountain, NonHydroMountainBuilder};
pub use test_case::TestCase;
