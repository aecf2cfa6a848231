//! Column physics and forcing processes for Squall models.
//!
//! - [`KesslerPhysics`]: couples grid state to a column microphysics
//!   kernel ([`ColumnKernel`]) and writes the result back.
//! - [`RayleighFriction`]: relaxes the state toward the reference state
//!   inside the test case's sponge layers.
//!
//! Kernels: [`IdentityKernel`] (no-op, for testing the coupling),
//! [`KesslerKernel`] (native warm-rain scheme) and [`ForeignKernel`]
//! (a C routine with the `tc_kessler_` signature). The foreign kernel is
//! the only `unsafe` code in the workspace.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod column;
pub mod foreign;
pub mod kernel;
pub mod kessler;
pub mod kessler_kernel;
pub mod rayleigh;

pub use column::KesslerColumn;
pub use foreign::{ForeignKernel, KesslerFn};
pub use kernel::{ColumnKernel, IdentityKernel, KernelError};
pub use kessler::{KesslerPhysics, PRECIPITATION};
pub use kessler_kernel::KesslerKernel;
pub use rayleigh::{RayleighFriction, DAMPED_COMPONENTS};
