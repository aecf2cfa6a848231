//! Execution context passed to workflow processes.

use squall_core::{PhysicalConstants, SimTime, TimeSpan};
use squall_grid::Grid;

/// Everything a process sees during one `perform()` call.
///
/// The grid is borrowed mutably for the duration of the call. Constants
/// are shared and can be held alongside a mutable grid borrow:
///
/// ```ignore
/// let constants = ctx.constants();
/// for patch in ctx.grid_mut().patches_mut() { /* ... */ }
/// ```
pub struct ProcessContext<'a> {
    grid: &'a mut Grid,
    constants: &'a PhysicalConstants,
    time: SimTime,
    elapsed: TimeSpan,
}

impl<'a> ProcessContext<'a> {
    /// Construct a context.
    ///
    /// Typically called by the scheduler, not by processes directly.
    pub fn new(
        grid: &'a mut Grid,
        constants: &'a PhysicalConstants,
        time: SimTime,
        elapsed: TimeSpan,
    ) -> Self {
        Self {
            grid,
            constants,
            time,
            elapsed,
        }
    }

    /// Read-only grid.
    pub fn grid(&self) -> &Grid {
        self.grid
    }

    /// Mutable grid.
    pub fn grid_mut(&mut self) -> &mut Grid {
        self.grid
    }

    /// Physical constants for the run.
    pub fn constants(&self) -> &'a PhysicalConstants {
        self.constants
    }

    /// Current simulation time.
    pub fn time(&self) -> SimTime {
        self.time
    }

    /// Time since this process last ran (since the start time on the first call).
    pub fn elapsed(&self) -> TimeSpan {
        self.elapsed
    }
}
