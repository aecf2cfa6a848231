//! Cadence bookkeeping and startup validation for workflow processes.
//!
//! [`validate_schedule`] runs once before the grid is allocated and rejects
//! any process list the step loop could not honor exactly. [`Schedule`]
//! then owns the processes in registration order and answers, for each
//! global step time, which of them are due.

use indexmap::IndexMap;
use smallvec::SmallVec;
use squall_core::{PhysicalConstants, ProcessError, SimTime, TimeSpan};
use squall_grid::Grid;

use crate::context::ProcessContext;
use crate::process::WorkflowProcess;

use std::error::Error;
use std::fmt;

// ── Errors ─────────────────────────────────────────────────────────

/// Errors from schedule validation (startup-time, not per-step).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    /// The global step is zero.
    InvalidStep,
    /// A process declared a zero frequency.
    InvalidFrequency {
        /// Which process.
        name: String,
    },
    /// Neither the process frequency nor the global step divides the other.
    MisalignedFrequency {
        /// Which process.
        name: String,
        /// Declared frequency.
        frequency: TimeSpan,
        /// Global step.
        dt: TimeSpan,
    },
    /// Two processes share a name.
    DuplicateName {
        /// The repeated name.
        name: String,
        /// Registration index of the first process with that name.
        first: usize,
        /// Registration index of the second.
        second: usize,
    },
    /// A process needs more tracer species than the grid carries.
    MissingTracers {
        /// Which process.
        name: String,
        /// Species the process needs.
        required: usize,
        /// Species the grid carries.
        available: usize,
    },
}

impl fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidStep => write!(f, "global time step must be non-zero"),
            Self::InvalidFrequency { name } => {
                write!(f, "process '{name}' has a zero frequency")
            }
            Self::MisalignedFrequency {
                name,
                frequency,
                dt,
            } => write!(
                f,
                "process '{name}' frequency {frequency} does not align with step {dt}"
            ),
            Self::DuplicateName {
                name,
                first,
                second,
            } => write!(
                f,
                "process name '{name}' registered twice (positions {first} and {second})"
            ),
            Self::MissingTracers {
                name,
                required,
                available,
            } => write!(
                f,
                "process '{name}' needs {required} tracers, grid has {available}"
            ),
        }
    }
}

impl Error for ScheduleError {}

// ── Validation ─────────────────────────────────────────────────────

/// Check a process list against the global step and tracer budget.
///
/// Every frequency must be non-zero and either a multiple or a divisor of
/// `dt`, names must be unique, and `tracer_count` must cover every
/// process's [`required_tracers`](WorkflowProcess::required_tracers).
pub fn validate_schedule(
    processes: &[Box<dyn WorkflowProcess>],
    dt: TimeSpan,
    tracer_count: usize,
) -> Result<(), ScheduleError> {
    if dt.is_zero() {
        return Err(ScheduleError::InvalidStep);
    }
    let mut seen: IndexMap<&str, usize> = IndexMap::new();
    for (i, p) in processes.iter().enumerate() {
        let name = p.name();
        if let Some(&first) = seen.get(name) {
            return Err(ScheduleError::DuplicateName {
                name: name.to_string(),
                first,
                second: i,
            });
        }
        seen.insert(name, i);

        let frequency = p.frequency();
        if frequency.is_zero() {
            return Err(ScheduleError::InvalidFrequency {
                name: name.to_string(),
            });
        }
        if !(frequency.is_multiple_of(dt) || dt.is_multiple_of(frequency)) {
            return Err(ScheduleError::MisalignedFrequency {
                name: name.to_string(),
                frequency,
                dt,
            });
        }
        if p.required_tracers() > tracer_count {
            return Err(ScheduleError::MissingTracers {
                name: name.to_string(),
                required: p.required_tracers(),
                available: tracer_count,
            });
        }
    }
    Ok(())
}

// ── Per-process bookkeeping ────────────────────────────────────────

/// A process plus the record of when it last ran.
///
/// `perform` runs the process and, only if it succeeds, records the
/// invocation. A process therefore cannot skip the bookkeeping step.
pub struct ScheduledProcess {
    process: Box<dyn WorkflowProcess>,
    anchor: SimTime,
    last_performed: Option<SimTime>,
    performed_count: u64,
    initialized: bool,
}

impl ScheduledProcess {
    /// Wrap a process. It must be initialized before it can run.
    pub fn new(process: Box<dyn WorkflowProcess>) -> Self {
        Self {
            process,
            anchor: SimTime::ZERO,
            last_performed: None,
            performed_count: 0,
            initialized: false,
        }
    }

    /// The process's name.
    pub fn name(&self) -> &str {
        self.process.name()
    }

    /// The process's frequency.
    pub fn frequency(&self) -> TimeSpan {
        self.process.frequency()
    }

    /// The wrapped process.
    pub fn process(&self) -> &dyn WorkflowProcess {
        self.process.as_ref()
    }

    /// Time of the last successful `perform`, if any.
    pub fn last_performed(&self) -> Option<SimTime> {
        self.last_performed
    }

    /// Number of successful `perform` calls.
    pub fn performed_count(&self) -> u64 {
        self.performed_count
    }

    /// Initialize the process and start its cadence at `time_start`.
    pub fn initialize(&mut self, grid: &Grid, time_start: SimTime) -> Result<(), ProcessError> {
        self.process.initialize(grid, time_start)?;
        self.anchor = time_start;
        self.initialized = true;
        Ok(())
    }

    /// Whether a full period has elapsed since the last run (or the start).
    pub fn is_due(&self, now: SimTime) -> bool {
        self.initialized
            && now
                .since(self.anchor)
                .is_some_and(|elapsed| elapsed >= self.frequency())
    }

    /// Run the process at `now` and record the invocation.
    pub fn perform(
        &mut self,
        grid: &mut Grid,
        constants: &PhysicalConstants,
        now: SimTime,
    ) -> Result<(), ProcessError> {
        if !self.initialized {
            return Err(ProcessError::NotInitialized);
        }
        let elapsed = now
            .since(self.anchor)
            .ok_or_else(|| ProcessError::ExecutionFailed {
                reason: format!("time {now} precedes last invocation at {}", self.anchor),
            })?;
        let mut ctx = ProcessContext::new(grid, constants, now, elapsed);
        self.process.perform(&mut ctx)?;
        self.record(now);
        Ok(())
    }

    fn record(&mut self, now: SimTime) {
        self.anchor = now;
        self.last_performed = Some(now);
        self.performed_count += 1;
    }
}

// ── Schedule ───────────────────────────────────────────────────────

/// Indices of processes due at one step. Inline for typical process counts.
pub type DueList = SmallVec<[usize; 8]>;

/// All processes of a model, in registration order.
pub struct Schedule {
    dt: TimeSpan,
    entries: Vec<ScheduledProcess>,
}

impl Schedule {
    /// Validate `processes` and take ownership of them.
    pub fn new(
        processes: Vec<Box<dyn WorkflowProcess>>,
        dt: TimeSpan,
        tracer_count: usize,
    ) -> Result<Self, ScheduleError> {
        validate_schedule(&processes, dt, tracer_count)?;
        Ok(Self {
            dt,
            entries: processes.into_iter().map(ScheduledProcess::new).collect(),
        })
    }

    /// Global step the schedule was validated against.
    pub fn dt(&self) -> TimeSpan {
        self.dt
    }

    /// Number of processes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no processes are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Processes in registration order.
    pub fn entries(&self) -> &[ScheduledProcess] {
        &self.entries
    }

    /// Mutable process by registration index.
    pub fn entry_mut(&mut self, index: usize) -> Option<&mut ScheduledProcess> {
        self.entries.get_mut(index)
    }

    /// Initialize every process in order. Stops at the first failure and
    /// returns the failing process's index with the error.
    pub fn initialize(
        &mut self,
        grid: &Grid,
        time_start: SimTime,
    ) -> Result<(), (usize, ProcessError)> {
        for (i, entry) in self.entries.iter_mut().enumerate() {
            entry.initialize(grid, time_start).map_err(|e| (i, e))?;
        }
        Ok(())
    }

    /// Registration indices of the processes due at `now`, in order.
    pub fn due(&self, now: SimTime) -> DueList {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.is_due(now))
            .map(|(i, _)| i)
            .collect()
    }
}
