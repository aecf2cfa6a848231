//! Squall: process scheduling and physics coupling for structured-grid
//! atmospheric models.
//!
//! This is the facade crate that re-exports the public API from all Squall
//! sub-crates.
//!
//! # Quick start
//!
//! ```rust
//! use squall::prelude::*;
//!
//! let mountain = NonHydroMountain::builder().hc(400.0).build().unwrap();
//! let config = ModelConfig::new(
//!     mountain.grid_spec(48, 1, 20),
//!     Box::new(mountain),
//!     Box::new(FrozenDynamics),
//!     TimeSpan::from_secs(5),
//!     SimTime::from_micros(30_000_000),
//! )
//! .with_process(RayleighFriction::new(TimeSpan::from_secs(10)));
//!
//! let mut model = Model::new(config).unwrap();
//! let metrics = model.step().unwrap();
//! assert!(metrics.process_us.is_empty());
//! let metrics = model.step().unwrap();
//! assert_eq!(metrics.processes_performed().next(), Some("rayleigh_friction"));
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `squall-core` | Time, constants, state layout, errors |
//! | [`grid`] | `squall-grid` | Patches, staggered fields, decomposition |
//! | [`testcase`] | `squall-testcase` | Test case contract and the mountain case |
//! | [`process`] | `squall-process` | Workflow process contract and scheduling |
//! | [`physics`] | `squall-physics` | Kessler coupling, kernels, Rayleigh friction |
//! | [`engine`] | `squall-engine` | Model, configuration, metrics, error norms |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Time, constants, state layout and error types (`squall-core`).
pub use squall_core as types;

/// Grid, patches and staggered field storage (`squall-grid`).
pub use squall_grid as grid;

/// The [`testcase::TestCase`] contract and concrete test cases (`squall-testcase`).
pub use squall_testcase as testcase;

/// The [`process::WorkflowProcess`] contract and its schedule (`squall-process`).
pub use squall_process as process;

/// Column physics and forcing processes (`squall-physics`).
///
/// Includes [`physics::KesslerPhysics`] with its kernels and
/// [`physics::RayleighFriction`].
pub use squall_physics as physics;

/// The model driver (`squall-engine`).
pub use squall_engine as engine;

/// Common imports for typical Squall usage.
///
/// ```rust
/// use squall::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use squall_core::{
        tracer, DataLocation, PhysicalConstants, PointState, SimTime, StateComponent, TimeSpan,
    };

    // Errors
    pub use squall_core::{ProcessError, StepError, TestCaseError};

    // Grid
    pub use squall_grid::{CartesianDomain, Grid, GridPatch, GridSpec, PatchBox};

    // Test cases
    pub use squall_testcase::{NonHydroMountain, TestCase};

    // Processes
    pub use squall_process::{ProcessContext, WorkflowProcess};

    // Physics
    pub use squall_physics::{
        ColumnKernel, IdentityKernel, KesslerKernel, KesslerPhysics, RayleighFriction,
    };

    // Engine
    pub use squall_engine::{
        ConfigError, Dynamics, ErrorNorms, FrozenDynamics, Model, ModelConfig, StepMetrics,
    };
}
