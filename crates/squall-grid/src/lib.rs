//! Grid storage for Squall models.
//!
//! A [`Grid`] is an ordered sequence of [`GridPatch`] tiles covering a
//! Cartesian horizontal domain. Each patch owns its field arrays,
//! including a halo of ghost columns that belongs to the dynamical core's
//! inter-patch exchange. Workflow processes iterate only the interior
//! described by the patch's [`PatchBox`].
//!
//! # Layout
//!
//! - State: `field[component][level][i][j]`, at [`DataLocation::Node`]
//!   (`nz` levels) or [`DataLocation::REdge`] (`nz + 1` levels).
//! - Tracers: `tracer[species][level][i][j]`, density weighted, node placed.
//! - Geometry: `z_levels[level][i][j]` and `z_interfaces[level][i][j]`,
//!   computed once at construction and never mutable from outside the crate.
//!
//! [`DataLocation::Node`]: squall_core::DataLocation::Node
//! [`DataLocation::REdge`]: squall_core::DataLocation::REdge

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod data;
pub mod error;
pub mod grid;
pub mod patch;
pub mod patch_box;
pub mod spec;

pub use data::{DataState, GridData2D, GridData3D, GridData4D};
pub use error::GridError;
pub use grid::Grid;
pub use patch::{GridPatch, PatchFieldsMut};
pub use patch_box::PatchBox;
pub use spec::{CartesianDomain, GridSpec};
