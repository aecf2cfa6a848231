//! Error types shared across the Squall workspace.
//!
//! Organized by origin: workflow processes ([`ProcessError`]), test-case
//! evaluators ([`TestCaseError`]) and the model step loop ([`StepError`]).
//! All of them are fatal to a run; the only recovery point is the
//! top-level driver.

use std::error::Error;
use std::fmt;

/// Errors raised by a workflow process during `initialize` or `perform`.
#[derive(Clone, Debug, PartialEq)]
pub enum ProcessError {
    /// A non-physical value was found in the grid state or produced by a kernel.
    NonPhysicalState {
        /// What was being checked (e.g. `"node density"`).
        quantity: &'static str,
        /// Patch index within the grid.
        patch: usize,
        /// First horizontal index.
        i: usize,
        /// Second horizontal index.
        j: usize,
        /// Vertical level.
        level: usize,
        /// The offending value.
        value: f64,
    },
    /// The external column kernel failed; no partial column result is usable.
    KernelFailed {
        /// Human-readable description of the failure.
        reason: String,
    },
    /// The process could not set itself up against the grid.
    Initialization {
        /// Human-readable description of the failure.
        reason: String,
    },
    /// `perform` was called before `initialize`.
    NotInitialized,
    /// A process wrote outside its patch interior.
    HaloModified {
        /// Patch index within the grid.
        patch: usize,
        /// Name of the modified field.
        field: String,
    },
    /// Any other execution failure.
    ExecutionFailed {
        /// Human-readable description of the failure.
        reason: String,
    },
}

impl fmt::Display for ProcessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPhysicalState {
                quantity,
                patch,
                i,
                j,
                level,
                value,
            } => write!(
                f,
                "non-physical {quantity} {value} at patch {patch}, column ({i}, {j}), level {level}"
            ),
            Self::KernelFailed { reason } => write!(f, "column kernel failed: {reason}"),
            Self::Initialization { reason } => write!(f, "initialization failed: {reason}"),
            Self::NotInitialized => write!(f, "process performed before initialization"),
            Self::HaloModified { patch, field } => {
                write!(f, "halo of field '{field}' in patch {patch} was modified")
            }
            Self::ExecutionFailed { reason } => write!(f, "execution failed: {reason}"),
        }
    }
}

impl Error for ProcessError {}

/// Errors raised by test-case evaluators.
#[derive(Clone, Debug, PartialEq)]
pub enum TestCaseError {
    /// The analytic state is not physical at the requested point.
    NonPhysical {
        /// What was being evaluated (e.g. `"Exner pressure"`).
        quantity: &'static str,
        /// Height of the point (m).
        z: f64,
        /// First horizontal coordinate (m).
        x: f64,
        /// Second horizontal coordinate (m).
        y: f64,
        /// The offending value.
        value: f64,
    },
    /// A reference state was requested from a test case that has none.
    NoReferenceState,
    /// A constructor parameter is out of range.
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },
}

impl fmt::Display for TestCaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPhysical {
                quantity,
                z,
                x,
                y,
                value,
            } => write!(
                f,
                "non-physical {quantity} {value} at (x={x}, y={y}, z={z})"
            ),
            Self::NoReferenceState => write!(f, "test case has no reference state"),
            Self::InvalidParameter { name, value } => {
                write!(f, "invalid test case parameter {name} = {value}")
            }
        }
    }
}

impl Error for TestCaseError {}

/// Errors from a model step.
#[derive(Clone, Debug, PartialEq)]
pub enum StepError {
    /// The dynamics collaborator failed to advance the state.
    DynamicsFailed {
        /// Human-readable description of the failure.
        reason: String,
    },
    /// A workflow process returned an error.
    ProcessFailed {
        /// Name of the failing process.
        name: String,
        /// The underlying process error.
        reason: ProcessError,
    },
    /// The model has already reached its end time.
    RunComplete,
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DynamicsFailed { reason } => write!(f, "dynamics failed: {reason}"),
            Self::ProcessFailed { name, reason } => {
                write!(f, "process '{name}' failed: {reason}")
            }
            Self::RunComplete => write!(f, "run already reached its end time"),
        }
    }
}

impl Error for StepError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::ProcessFailed { reason, .. } => Some(reason),
            _ => None,
        }
    }
}
