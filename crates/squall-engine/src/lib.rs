//! Model driver for Squall.
//!
//! [`Model`] owns the grid, the test case, the physical constants, the
//! dynamics collaborator and the process schedule. It populates the grid
//! from the test case at construction and then runs the operator-split
//! step loop: dynamics first, then every due process in registration
//! order.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod dynamics;
pub mod init;
pub mod metrics;
pub mod model;
pub mod norms;

pub use config::{ConfigError, ModelConfig};
pub use dynamics::{Dynamics, DynamicsError, FrozenDynamics};
pub use init::populate_grid;
pub use metrics::StepMetrics;
pub use model::Model;
pub use norms::{ComponentNorms, ErrorNorms};
