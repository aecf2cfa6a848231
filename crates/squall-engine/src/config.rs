//! Model configuration, validation, and error types.
//!
//! [`ModelConfig`] is the builder input for constructing a [`Model`].
//! [`validate()`](ModelConfig::validate) checks every structural
//! invariant before any grid memory is allocated.
//!
//! [`Model`]: crate::Model

use std::error::Error;
use std::fmt;

use squall_core::{PhysicalConstants, ProcessError, SimTime, TestCaseError, TimeSpan};
use squall_grid::{GridError, GridSpec};
use squall_process::{validate_schedule, ScheduleError, WorkflowProcess};
use squall_testcase::TestCase;

use crate::dynamics::Dynamics;

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected while building a model.
#[derive(Debug, PartialEq)]
pub enum ConfigError {
    /// Process schedule validation failed.
    Schedule(ScheduleError),
    /// Grid construction failed.
    Grid(GridError),
    /// The test case could not be evaluated during grid population.
    TestCase(TestCaseError),
    /// Perturbation form was requested but the test case has no reference state.
    MissingReferenceState {
        /// Name of the test case.
        test_case: String,
    },
    /// The run interval is not a whole, non-negative number of steps.
    InvalidEndTime {
        /// Configured start.
        start: SimTime,
        /// Configured end.
        end: SimTime,
        /// Global step.
        dt: TimeSpan,
    },
    /// Fewer than one time level.
    InvalidTimeLevels {
        /// The configured count.
        configured: usize,
    },
    /// A process failed to initialize against the populated grid.
    ProcessInitialization {
        /// Name of the failing process.
        name: String,
        /// The underlying error.
        reason: ProcessError,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Schedule(e) => write!(f, "schedule: {e}"),
            Self::Grid(e) => write!(f, "grid: {e}"),
            Self::TestCase(e) => write!(f, "test case: {e}"),
            Self::MissingReferenceState { test_case } => write!(
                f,
                "perturbation form needs a reference state, test case '{test_case}' has none"
            ),
            Self::InvalidEndTime { start, end, dt } => write!(
                f,
                "run from {start} to {end} is not a whole number of {dt} steps"
            ),
            Self::InvalidTimeLevels { configured } => {
                write!(f, "time_levels must be at least 1, got {configured}")
            }
            Self::ProcessInitialization { name, reason } => {
                write!(f, "process '{name}' failed to initialize: {reason}")
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Schedule(e) => Some(e),
            Self::Grid(e) => Some(e),
            Self::TestCase(e) => Some(e),
            Self::ProcessInitialization { reason, .. } => Some(reason),
            _ => None,
        }
    }
}

impl From<ScheduleError> for ConfigError {
    fn from(e: ScheduleError) -> Self {
        Self::Schedule(e)
    }
}

impl From<GridError> for ConfigError {
    fn from(e: GridError) -> Self {
        Self::Grid(e)
    }
}

impl From<TestCaseError> for ConfigError {
    fn from(e: TestCaseError) -> Self {
        Self::TestCase(e)
    }
}

// ── ModelConfig ────────────────────────────────────────────────────

/// Complete configuration for constructing a model.
///
/// Consumed by [`Model::new`](crate::Model::new). Processes run in the
/// order they appear in `processes`.
pub struct ModelConfig {
    /// Horizontal decomposition and vertical resolution.
    pub grid: GridSpec,
    /// Analytic initial state, topography and forcing fields.
    pub test_case: Box<dyn TestCase>,
    /// Dynamical core advancing the state each step.
    pub dynamics: Box<dyn Dynamics>,
    /// Workflow processes in registration order.
    pub processes: Vec<Box<dyn WorkflowProcess>>,
    /// Global time step.
    pub dt: TimeSpan,
    /// Model time at initialization.
    pub start_time: SimTime,
    /// Model time at which the run is complete.
    pub end_time: SimTime,
    /// State snapshots kept per patch. Default: 1.
    pub time_levels: usize,
    /// Constants before the test case's override.
    pub constants: PhysicalConstants,
    /// The dynamics works on perturbations from the reference state.
    pub perturbation_form: bool,
    /// Fail a step if a process writes into a halo. Default: false.
    pub check_halos: bool,
}

impl ModelConfig {
    /// Configuration starting at time zero with one time level, default
    /// constants, full-state form, no halo checking and no processes.
    pub fn new(
        grid: GridSpec,
        test_case: Box<dyn TestCase>,
        dynamics: Box<dyn Dynamics>,
        dt: TimeSpan,
        end_time: SimTime,
    ) -> Self {
        Self {
            grid,
            test_case,
            dynamics,
            processes: Vec::new(),
            dt,
            start_time: SimTime::ZERO,
            end_time,
            time_levels: 1,
            constants: PhysicalConstants::default(),
            perturbation_form: false,
            check_halos: false,
        }
    }

    /// Append a process to the schedule.
    pub fn with_process(mut self, process: impl WorkflowProcess + 'static) -> Self {
        self.processes.push(Box::new(process));
        self
    }

    /// Number of global steps between start and end.
    ///
    /// Only meaningful after [`validate`](Self::validate) succeeded.
    pub fn step_count(&self) -> u64 {
        match self.end_time.since(self.start_time) {
            Some(span) if !self.dt.is_zero() => span.as_micros() / self.dt.as_micros(),
            _ => 0,
        }
    }

    /// Validate all structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // 1. Step and run interval.
        if self.dt.is_zero() {
            return Err(ScheduleError::InvalidStep.into());
        }
        let whole_steps = self
            .end_time
            .since(self.start_time)
            .is_some_and(|span| span.is_multiple_of(self.dt));
        if !whole_steps {
            return Err(ConfigError::InvalidEndTime {
                start: self.start_time,
                end: self.end_time,
                dt: self.dt,
            });
        }
        // 2. Time levels.
        if self.time_levels == 0 {
            return Err(ConfigError::InvalidTimeLevels {
                configured: self.time_levels,
            });
        }
        // 3. Grid spec.
        self.grid.validate()?;
        // 4. Schedule against the test case's tracer budget.
        validate_schedule(&self.processes, self.dt, self.test_case.tracer_count())?;
        // 5. Perturbation form needs a background.
        if self.perturbation_form && !self.test_case.has_reference_state() {
            return Err(ConfigError::MissingReferenceState {
                test_case: self.test_case.name().to_string(),
            });
        }
        Ok(())
    }
}

impl fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.processes.iter().map(|p| p.name()).collect();
        f.debug_struct("ModelConfig")
            .field("grid", &self.grid)
            .field("test_case", &self.test_case.name())
            .field("dynamics", &self.dynamics.name())
            .field("processes", &names)
            .field("dt", &self.dt)
            .field("start_time", &self.start_time)
            .field("end_time", &self.end_time)
            .field("time_levels", &self.time_levels)
            .field("constants", &self.constants)
            .field("perturbation_form", &self.perturbation_form)
            .field("check_halos", &self.check_halos)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamics::FrozenDynamics;
    use squall_core::{PointState, StateComponent};
    use squall_grid::CartesianDomain;

    struct Still;

    impl TestCase for Still {
        fn name(&self) -> &str {
            "still"
        }
        fn z_top(&self) -> f64 {
            1000.0
        }
        fn evaluate_topography(&self, _: &PhysicalConstants, _x: f64, _y: f64) -> f64 {
            0.0
        }
        fn evaluate_pointwise_state(
            &self,
            _: &PhysicalConstants,
            _time: SimTime,
            _z: f64,
            _x: f64,
            _y: f64,
            _tracers: &mut [f64],
        ) -> Result<PointState, TestCaseError> {
            let mut s = PointState::default();
            s.set(StateComponent::Rho, 1.0);
            s.set(StateComponent::Theta, 300.0);
            Ok(s)
        }
    }

    struct Named(&'static str, TimeSpan);

    impl WorkflowProcess for Named {
        fn name(&self) -> &str {
            self.0
        }
        fn frequency(&self) -> TimeSpan {
            self.1
        }
        fn initialize(
            &mut self,
            _: &squall_grid::Grid,
            _: SimTime,
        ) -> Result<(), ProcessError> {
            Ok(())
        }
        fn perform(
            &mut self,
            _: &mut squall_process::ProcessContext<'_>,
        ) -> Result<(), ProcessError> {
            Ok(())
        }
    }

    fn valid_config() -> ModelConfig {
        ModelConfig::new(
            GridSpec::new(CartesianDomain::new(0.0, 1.0, 0.0, 1.0), 2, 2, 3),
            Box::new(Still),
            Box::new(FrozenDynamics),
            TimeSpan::from_secs(1),
            SimTime::from_micros(10_000_000),
        )
    }

    #[test]
    fn validate_valid_config_succeeds() {
        let cfg = valid_config().with_process(Named("a", TimeSpan::from_secs(3)));
        assert_eq!(cfg.validate(), Ok(()));
        assert_eq!(cfg.step_count(), 10);
    }

    #[test]
    fn validate_zero_step_fails() {
        let mut cfg = valid_config();
        cfg.dt = TimeSpan::ZERO;
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::Schedule(ScheduleError::InvalidStep))
        );
    }

    #[test]
    fn validate_partial_final_step_fails() {
        let mut cfg = valid_config();
        cfg.end_time = SimTime::from_micros(10_500_000);
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidEndTime { .. })
        ));
    }

    #[test]
    fn validate_end_before_start_fails() {
        let mut cfg = valid_config();
        cfg.start_time = SimTime::from_micros(20_000_000);
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidEndTime { .. })
        ));
    }

    #[test]
    fn validate_zero_time_levels_fails() {
        let mut cfg = valid_config();
        cfg.time_levels = 0;
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::InvalidTimeLevels { configured: 0 })
        );
    }

    #[test]
    fn validate_bad_grid_fails() {
        let mut cfg = valid_config();
        cfg.grid.nz = 0;
        assert!(matches!(cfg.validate(), Err(ConfigError::Grid(_))));
    }

    #[test]
    fn validate_misaligned_process_fails() {
        let cfg = valid_config().with_process(Named("odd", TimeSpan::from_micros(1_500_000)));
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::Schedule(ScheduleError::MisalignedFrequency { .. }))
        ));
    }

    #[test]
    fn validate_perturbation_without_reference_fails() {
        let mut cfg = valid_config();
        cfg.perturbation_form = true;
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::MissingReferenceState {
                test_case: "still".into()
            })
        );
    }

    #[test]
    fn errors_chain_their_source() {
        let e = ConfigError::from(ScheduleError::InvalidStep);
        assert!(e.source().is_some());
        assert!(e.to_string().starts_with("schedule:"));
    }
}
