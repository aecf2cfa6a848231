//! The dynamical-core collaborator.
//!
//! The engine does not discretize anything itself. Each step it hands the
//! grid to a [`Dynamics`] implementation, then runs the due workflow
//! processes against whatever state the dynamics left behind.

use std::error::Error;
use std::fmt;

use squall_core::{PhysicalConstants, SimTime, StepError, TimeSpan};
use squall_grid::Grid;

/// Failure reported by a [`Dynamics`] implementation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DynamicsError {
    /// Human-readable description of the failure.
    pub reason: String,
}

impl DynamicsError {
    /// Error with the given reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for DynamicsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason)
    }
}

impl Error for DynamicsError {}

impl From<DynamicsError> for StepError {
    fn from(e: DynamicsError) -> Self {
        StepError::DynamicsFailed { reason: e.reason }
    }
}

/// Advances the grid state by one global step.
///
/// Called once per step, before any workflow process. Implementations
/// own whatever solver state they need; the grid is the only shared
/// state.
pub trait Dynamics: Send {
    /// Name used in metrics.
    fn name(&self) -> &str;

    /// Advance from `time` to `time + dt`.
    fn advance(
        &mut self,
        grid: &mut Grid,
        constants: &PhysicalConstants,
        time: SimTime,
        dt: TimeSpan,
    ) -> Result<(), DynamicsError>;
}

/// Leaves the state untouched. Useful for physics-only runs and tests.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrozenDynamics;

impl Dynamics for FrozenDynamics {
    fn name(&self) -> &str {
        "frozen"
    }

    fn advance(
        &mut self,
        _grid: &mut Grid,
        _constants: &PhysicalConstants,
        _time: SimTime,
        _dt: TimeSpan,
    ) -> Result<(), DynamicsError> {
        Ok(())
    }
}
