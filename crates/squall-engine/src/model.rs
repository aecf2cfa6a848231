//! The model: owner of the grid and driver of the step loop.
//!
//! Each [`step`](Model::step) is strictly sequential:
//!
//! 1. the dynamics advances the grid from `t` to `t + Δt`;
//! 2. every process due at `t + Δt` runs, in registration order, each one
//!    seeing the state the previous one left behind.
//!
//! The first failure aborts the step. Later processes are not run and
//! nothing is rolled back.

use std::time::Instant;

use squall_core::{PhysicalConstants, SimTime, StateComponent, StepError, TestCaseError, TimeSpan};
use squall_grid::Grid;
use squall_process::{HaloGuard, Schedule};
use squall_testcase::TestCase;

use crate::config::{ConfigError, ModelConfig};
use crate::dynamics::Dynamics;
use crate::init::populate_grid;
use crate::metrics::StepMetrics;
use crate::norms::{ErrorNorms, NormAccumulator};

// Compile-time assertion: a model can be moved to a worker thread.
const _: () = {
    #[allow(dead_code)]
    fn assert_send<T: Send>() {}
    #[allow(dead_code)]
    fn check() {
        assert_send::<Model>();
    }
};

/// A configured, initialized simulation.
///
/// # Example
///
/// ```
/// use squall_core::{SimTime, TimeSpan};
/// use squall_engine::{FrozenDynamics, Model, ModelConfig};
/// use squall_physics::RayleighFriction;
/// use squall_testcase::NonHydroMountain;
///
/// let mountain = NonHydroMountain::default();
/// let config = ModelConfig::new(
///     mountain.grid_spec(24, 1, 10),
///     Box::new(mountain),
///     Box::new(FrozenDynamics),
///     TimeSpan::from_secs(10),
///     SimTime::from_micros(60_000_000),
/// )
/// .with_process(RayleighFriction::new(TimeSpan::from_secs(20)));
///
/// let mut model = Model::new(config).unwrap();
/// let steps = model.run().unwrap();
/// assert_eq!(steps, 6);
/// assert_eq!(model.schedule().entries()[0].performed_count(), 3);
/// ```
pub struct Model {
    grid: Grid,
    test_case: Box<dyn TestCase>,
    dynamics: Box<dyn Dynamics>,
    schedule: Schedule,
    constants: PhysicalConstants,
    dt: TimeSpan,
    start_time: SimTime,
    end_time: SimTime,
    time: SimTime,
    steps_taken: u64,
    perturbation_form: bool,
    check_halos: bool,
    last_metrics: StepMetrics,
}

impl Model {
    /// Validate `config`, build and populate the grid, and initialize
    /// every process against it.
    pub fn new(config: ModelConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let ModelConfig {
            grid: spec,
            test_case,
            dynamics,
            processes,
            dt,
            start_time,
            end_time,
            time_levels,
            constants,
            perturbation_form,
            check_halos,
        } = config;

        let constants = test_case.evaluate_physical_constants(constants);
        let mut grid = Grid::new(
            spec,
            test_case.z_top(),
            test_case.tracer_count(),
            time_levels,
            |x, y| test_case.evaluate_topography(&constants, x, y),
        )?;
        populate_grid(&mut grid, test_case.as_ref(), &constants, start_time)?;

        let mut schedule = Schedule::new(processes, dt, grid.tracer_count())?;
        schedule
            .initialize(&grid, start_time)
            .map_err(|(index, reason)| ConfigError::ProcessInitialization {
                name: schedule_name(&schedule, index),
                reason,
            })?;

        Ok(Self {
            grid,
            test_case,
            dynamics,
            schedule,
            constants,
            dt,
            start_time,
            end_time,
            time: start_time,
            steps_taken: 0,
            perturbation_form,
            check_halos,
            last_metrics: StepMetrics {
                time: start_time,
                ..StepMetrics::default()
            },
        })
    }

    // ── Stepping ───────────────────────────────────────────────

    /// Advance one global step.
    ///
    /// # Errors
    ///
    /// [`StepError::RunComplete`] once the end time is reached,
    /// [`StepError::DynamicsFailed`] if the dynamics fails (the clock does
    /// not advance), and [`StepError::ProcessFailed`] for the first
    /// process that fails (the clock has advanced; later processes did
    /// not run).
    pub fn step(&mut self) -> Result<StepMetrics, StepError> {
        if self.is_complete() {
            return Err(StepError::RunComplete);
        }
        let next = self
            .time
            .checked_add(self.dt)
            .ok_or(StepError::RunComplete)?;
        let step_start = Instant::now();

        let dynamics_start = Instant::now();
        self.dynamics
            .advance(&mut self.grid, &self.constants, self.time, self.dt)?;
        let dynamics_us = dynamics_start.elapsed().as_micros() as u64;

        self.time = next;
        self.steps_taken += 1;

        let mut process_us = Vec::new();
        for index in self.schedule.due(next) {
            let Some(entry) = self.schedule.entry_mut(index) else {
                continue;
            };
            let guard = self.check_halos.then(|| HaloGuard::capture(&self.grid));
            let process_start = Instant::now();
            let outcome = entry
                .perform(&mut self.grid, &self.constants, next)
                .and_then(|()| guard.map_or(Ok(()), |g| g.verify(&self.grid)));
            if let Err(reason) = outcome {
                return Err(StepError::ProcessFailed {
                    name: entry.name().to_string(),
                    reason,
                });
            }
            process_us.push((
                entry.name().to_string(),
                process_start.elapsed().as_micros() as u64,
            ));
        }

        let metrics = StepMetrics {
            time: next,
            total_us: step_start.elapsed().as_micros() as u64,
            dynamics_us,
            process_us,
        };
        self.last_metrics = metrics.clone();
        Ok(metrics)
    }

    /// Step until the end time. Returns the number of steps taken by this
    /// call.
    pub fn run(&mut self) -> Result<u64, StepError> {
        let mut steps = 0;
        while !self.is_complete() {
            self.step()?;
            steps += 1;
        }
        Ok(steps)
    }

    /// Whether the end time has been reached.
    pub fn is_complete(&self) -> bool {
        self.time >= self.end_time
    }

    // ── Diagnostics ────────────────────────────────────────────

    /// Compare interior node state with the test case's analytic
    /// solution at the current time.
    pub fn error_norms(&self) -> Result<ErrorNorms, TestCaseError> {
        let mut acc = NormAccumulator::default();
        let mut tracers = vec![0.0; self.grid.tracer_count()];
        for patch in self.grid.patches() {
            let Some(state) = patch.state(0) else {
                continue;
            };
            let node = state.node();
            for (i, j) in patch.patch_box().interior_columns() {
                let (x, y) = (patch.x()[[i, j]], patch.y()[[i, j]]);
                for k in 0..patch.nz() {
                    let z = patch.z_levels()[[k, i, j]];
                    let exact = self.test_case.evaluate_pointwise_state(
                        &self.constants,
                        self.time,
                        z,
                        x,
                        y,
                        &mut tracers,
                    )?;
                    let model = StateComponent::ALL.map(|c| node[[c.index(), k, i, j]]);
                    acc.add(model, exact.to_array());
                }
            }
        }
        Ok(acc.finish())
    }

    /// Metrics of the most recent successful step.
    pub fn last_metrics(&self) -> &StepMetrics {
        &self.last_metrics
    }

    // ── Accessors ──────────────────────────────────────────────

    /// The grid.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Mutable grid, for drivers that perturb the state between steps.
    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    /// The active test case.
    pub fn test_case(&self) -> &dyn TestCase {
        self.test_case.as_ref()
    }

    /// Constants after the test case's override.
    pub fn constants(&self) -> &PhysicalConstants {
        &self.constants
    }

    /// Process bookkeeping in registration order.
    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    /// Current model time.
    pub fn time(&self) -> SimTime {
        self.time
    }

    /// Start of the run.
    pub fn start_time(&self) -> SimTime {
        self.start_time
    }

    /// End of the run.
    pub fn end_time(&self) -> SimTime {
        self.end_time
    }

    /// Global step.
    pub fn dt(&self) -> TimeSpan {
        self.dt
    }

    /// Steps completed since initialization.
    pub fn steps_taken(&self) -> u64 {
        self.steps_taken
    }

    /// Whether the dynamics works on perturbations from the reference state.
    pub fn perturbation_form(&self) -> bool {
        self.perturbation_form
    }
}

fn schedule_name(schedule: &Schedule, index: usize) -> String {
    schedule
        .entries()
        .get(index)
        .map_or_else(String::new, |e| e.name().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamics::{DynamicsError, FrozenDynamics};
    use squall_core::{PointState, ProcessError};
    use squall_grid::{CartesianDomain, GridSpec};
    use squall_process::{ProcessContext, WorkflowProcess};

    struct Calm;

    impl TestCase for Calm {
        fn name(&self) -> &str {
            "calm"
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
            Ok(PointState {
                theta: 300.0,
                rho: 1.2,
                ..PointState::default()
            })
        }
    }

    struct Broken;

    impl Dynamics for Broken {
        fn name(&self) -> &str {
            "broken"
        }
        fn advance(
            &mut self,
            _: &mut Grid,
            _: &PhysicalConstants,
            _: SimTime,
            _: TimeSpan,
        ) -> Result<(), DynamicsError> {
            Err(DynamicsError::new("CFL violated"))
        }
    }

    struct RefusesInit;

    impl WorkflowProcess for RefusesInit {
        fn name(&self) -> &str {
            "refuses"
        }
        fn frequency(&self) -> TimeSpan {
            TimeSpan::from_secs(1)
        }
        fn initialize(&mut self, _: &Grid, _: SimTime) -> Result<(), ProcessError> {
            Err(ProcessError::Initialization {
                reason: "no".into(),
            })
        }
        fn perform(&mut self, _: &mut ProcessContext<'_>) -> Result<(), ProcessError> {
            Ok(())
        }
    }

    fn config(dynamics: Box<dyn Dynamics>) -> ModelConfig {
        ModelConfig::new(
            GridSpec::new(CartesianDomain::new(0.0, 1.0, 0.0, 1.0), 2, 2, 3),
            Box::new(Calm),
            dynamics,
            TimeSpan::from_secs(1),
            SimTime::from_micros(3_000_000),
        )
    }

    #[test]
    fn runs_to_end_time_then_refuses() {
        let mut m = Model::new(config(Box::new(FrozenDynamics))).unwrap();
        assert_eq!(m.run(), Ok(3));
        assert!(m.is_complete());
        assert_eq!(m.time(), SimTime::from_micros(3_000_000));
        assert_eq!(m.step(), Err(StepError::RunComplete));
        assert_eq!(m.steps_taken(), 3);
    }

    #[test]
    fn dynamics_failure_does_not_advance_clock() {
        let mut m = Model::new(config(Box::new(Broken))).unwrap();
        assert_eq!(
            m.step(),
            Err(StepError::DynamicsFailed {
                reason: "CFL violated".into()
            })
        );
        assert_eq!(m.time(), SimTime::ZERO);
    }

    #[test]
    fn process_initialization_failure_names_process() {
        let cfg = config(Box::new(FrozenDynamics)).with_process(RefusesInit);
        match Model::new(cfg) {
            Err(ConfigError::ProcessInitialization { name, .. }) => assert_eq!(name, "refuses"),
            Err(other) => panic!("expected ProcessInitialization, got {other:?}"),
            Ok(_) => panic!("expected ProcessInitialization, got a model"),
        }
    }

    #[test]
    fn frozen_state_has_zero_error() {
        let mut m = Model::new(config(Box::new(FrozenDynamics))).unwrap();
        m.run().unwrap();
        let norms = m.error_norms().unwrap();
        for (_, n) in norms.iter() {
            assert_eq!(n.linf, 0.0);
        }
        assert!(norms.get(StateComponent::Theta).relative);
    }
}
