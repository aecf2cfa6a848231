//! The [`WorkflowProcess`] trait.

use squall_core::{ProcessError, SimTime, TimeSpan};
use squall_grid::Grid;

use crate::context::ProcessContext;

/// A schedulable unit of work that reads and mutates the grid in place.
///
/// # Contract
///
/// - `frequency()` is fixed for the life of the process and must align
///   with the model step: one of them divides the other exactly.
/// - `initialize()` is called exactly once, before the first `perform()`,
///   with the simulation start time. Scratch buffers are sized here.
/// - `perform()` writes only interior columns of each patch. Halo cells
///   belong to the dynamical core.
/// - Invalid physical state is reported as
///   [`ProcessError::NonPhysicalState`], never clamped silently.
///
/// Cadence bookkeeping is not the process's job: the
/// [`ScheduledProcess`](crate::ScheduledProcess) wrapper records every
/// successful `perform()` after it returns.
///
/// # Object safety
///
/// This trait is object-safe; the model stores processes as
/// `Vec<Box<dyn WorkflowProcess>>` in registration order.
pub trait WorkflowProcess: Send {
    /// Human-readable name, unique within a model.
    fn name(&self) -> &str;

    /// Time between invocations.
    fn frequency(&self) -> TimeSpan;

    /// Tracer species this process reads or writes.
    ///
    /// The grid's tracer count comes from the test case; a schedule whose
    /// process needs more is rejected with
    /// [`ScheduleError::MissingTracers`](crate::ScheduleError::MissingTracers)
    /// before the run starts.
    /// Default: 0.
    fn required_tracers(&self) -> usize {
        0
    }

    /// Prepare for the run.
    fn initialize(&mut self, grid: &Grid, time_start: SimTime) -> Result<(), ProcessError>;

    /// Do one invocation's work against the current grid state.
    fn perform(&mut self, ctx: &mut ProcessContext<'_>) -> Result<(), ProcessError>;
}
