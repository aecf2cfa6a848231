//! Reusable workflow process fixtures.
//!
//! - [`RecordingProcess`]: logs every invocation into a shared
//!   [`InvocationLog`], optionally nudging Θ so later processes can see it.
//! - [`FailingProcess`]: fails deterministically on its Nth invocation.
//! - [`HaloWritingProcess`]: breaks the interior-only rule on purpose.

use std::sync::{Arc, Mutex};

use squall_core::{ProcessError, SimTime, StateComponent, TimeSpan};
use squall_grid::Grid;
use squall_process::{ProcessContext, WorkflowProcess};

/// One recorded `perform` call.
#[derive(Clone, Debug, PartialEq)]
pub struct Invocation {
    pub name: String,
    pub time: SimTime,
    pub elapsed: TimeSpan,
    /// Node Θ at level 0 of the first interior column of patch 0, before
    /// this process acted.
    pub theta_seen: f64,
}

/// Invocation log shared between fixtures and the test body.
#[derive(Clone, Debug, Default)]
pub struct InvocationLog(Arc<Mutex<Vec<Invocation>>>);

impl InvocationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, invocation: Invocation) {
        self.0.lock().expect("log mutex poisoned").push(invocation);
    }

    pub fn entries(&self) -> Vec<Invocation> {
        self.0.lock().expect("log mutex poisoned").clone()
    }

    /// Times at which `name` ran.
    pub fn times_of(&self, name: &str) -> Vec<SimTime> {
        self.entries()
            .into_iter()
            .filter(|i| i.name == name)
            .map(|i| i.time)
            .collect()
    }

    /// Process names in invocation order.
    pub fn names(&self) -> Vec<String> {
        self.entries().into_iter().map(|i| i.name).collect()
    }
}

fn first_theta(grid: &Grid) -> f64 {
    grid.patch(0)
        .and_then(|p| {
            let pb = p.patch_box();
            let (i, j) = (pb.a_interior_begin(), pb.b_interior_begin());
            p.state(0)
                .map(|s| s.node()[[StateComponent::Theta.index(), 0, i, j]])
        })
        .unwrap_or(f64::NAN)
}

/// Records each invocation; optionally adds `theta_increment` to every
/// interior node Θ at time level 0.
pub struct RecordingProcess {
    pub name: String,
    pub frequency: TimeSpan,
    pub required_tracers: usize,
    pub theta_increment: f64,
    pub log: InvocationLog,
    pub initialized_at: Option<SimTime>,
}

impl RecordingProcess {
    pub fn new(name: impl Into<String>, frequency: TimeSpan, log: InvocationLog) -> Self {
        Self {
            name: name.into(),
            frequency,
            required_tracers: 0,
            theta_increment: 0.0,
            log,
            initialized_at: None,
        }
    }

    pub fn with_theta_increment(mut self, increment: f64) -> Self {
        self.theta_increment = increment;
        self
    }

    pub fn with_required_tracers(mut self, count: usize) -> Self {
        self.required_tracers = count;
        self
    }
}

impl WorkflowProcess for RecordingProcess {
    fn name(&self) -> &str {
        &self.name
    }

    fn frequency(&self) -> TimeSpan {
        self.frequency
    }

    fn required_tracers(&self) -> usize {
        self.required_tracers
    }

    fn initialize(&mut self, _grid: &Grid, time_start: SimTime) -> Result<(), ProcessError> {
        self.initialized_at = Some(time_start);
        Ok(())
    }

    fn perform(&mut self, ctx: &mut ProcessContext<'_>) -> Result<(), ProcessError> {
        self.log.push(Invocation {
            name: self.name.clone(),
            time: ctx.time(),
            elapsed: ctx.elapsed(),
            theta_seen: first_theta(ctx.grid()),
        });
        if self.theta_increment != 0.0 {
            let theta = StateComponent::Theta.index();
            for patch in ctx.grid_mut().patches_mut() {
                let pb = *patch.patch_box();
                let f = patch
                    .fields_mut(0)
                    .ok_or(ProcessError::ExecutionFailed {
                        reason: "missing time level 0".into(),
                    })?;
                let nz = f.node.shape()[1];
                for (i, j) in pb.interior_columns() {
                    for k in 0..nz {
                        f.node[[theta, k, i, j]] += self.theta_increment;
                    }
                }
            }
        }
        Ok(())
    }
}

/// Fails on its `fail_on`-th invocation (1-based) and every one after.
pub struct FailingProcess {
    pub name: String,
    pub frequency: TimeSpan,
    pub fail_on: usize,
    pub calls: usize,
    pub log: InvocationLog,
}

impl FailingProcess {
    pub fn new(
        name: impl Into<String>,
        frequency: TimeSpan,
        fail_on: usize,
        log: InvocationLog,
    ) -> Self {
        Self {
            name: name.into(),
            frequency,
            fail_on,
            calls: 0,
            log,
        }
    }
}

impl WorkflowProcess for FailingProcess {
    fn name(&self) -> &str {
        &self.name
    }

    fn frequency(&self) -> TimeSpan {
        self.frequency
    }

    fn initialize(&mut self, _grid: &Grid, _time_start: SimTime) -> Result<(), ProcessError> {
        Ok(())
    }

    fn perform(&mut self, ctx: &mut ProcessContext<'_>) -> Result<(), ProcessError> {
        self.calls += 1;
        self.log.push(Invocation {
            name: self.name.clone(),
            time: ctx.time(),
            elapsed: ctx.elapsed(),
            theta_seen: first_theta(ctx.grid()),
        });
        if self.calls >= self.fail_on {
            return Err(ProcessError::ExecutionFailed {
                reason: format!("deliberate failure on call {}", self.calls),
            });
        }
        Ok(())
    }
}

/// Writes ρ = 0 into the first halo column of patch 0.
pub struct HaloWritingProcess {
    pub frequency: TimeSpan,
}

impl WorkflowProcess for HaloWritingProcess {
    fn name(&self) -> &str {
        "halo_writer"
    }

    fn frequency(&self) -> TimeSpan {
        self.frequency
    }

    fn initialize(&mut self, _grid: &Grid, _time_start: SimTime) -> Result<(), ProcessError> {
        Ok(())
    }

    fn perform(&mut self, ctx: &mut ProcessContext<'_>) -> Result<(), ProcessError> {
        if let Some(patch) = ctx.grid_mut().patch_mut(0) {
            if let Some(f) = patch.fields_mut(0) {
                f.node[[StateComponent::Rho.index(), 0, 0, 0]] = 0.0;
            }
        }
        Ok(())
    }
}
