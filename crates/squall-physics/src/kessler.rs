//! Column coupling between grid state and a Kessler-type microphysics kernel.
//!
//! For each interior column the grid's density-weighted water tracers and
//! (ρ, Θ) state are converted to the kernel's per-level arrays, the kernel
//! runs once, and the results are written back:
//!
//! ```text
//! P   = PressureFromRhoTheta(ρ_edge · Θ_edge)
//! T   = P / (ρ_edge · R)
//! q   = tracer / ρ_node              (vapor, cloud, rain)
//! pk  = Θ_node / T
//! --- kernel ---
//! Θ_node, ρ_node ← kernel
//! tracer ← q · ρ_node
//! ```
//!
//! Nothing is clamped here. A non-positive or non-finite density or
//! temperature, before or after the kernel, is a
//! [`ProcessError::NonPhysicalState`].

use rayon::prelude::*;
use squall_core::{tracer, PhysicalConstants, ProcessError, SimTime, StateComponent, TimeSpan};
use squall_grid::{Grid, GridPatch, PatchFieldsMut};
use squall_process::{ProcessContext, WorkflowProcess};

use crate::column::KesslerColumn;
use crate::kernel::ColumnKernel;

/// Surface diagnostic holding accumulated precipitation (m of liquid water).
pub const PRECIPITATION: &str = "precipitation";

const THETA: usize = StateComponent::Theta.index();
const RHO: usize = StateComponent::Rho.index();

/// Kessler microphysics as a workflow process.
///
/// Needs tracers 0, 1, 2 (vapor, cloud, rain). Scratch columns are
/// allocated once at `initialize`, one per patch, so patches can be
/// processed concurrently with [`parallel`](Self::parallel).
///
/// ```
/// use squall_core::TimeSpan;
/// use squall_physics::{KesslerKernel, KesslerPhysics};
/// use squall_process::WorkflowProcess;
///
/// let kessler = KesslerPhysics::new(TimeSpan::from_secs(10), KesslerKernel).parallel(true);
/// assert_eq!(kessler.required_tracers(), 3);
/// ```
pub struct KesslerPhysics {
    frequency: TimeSpan,
    kernel: Box<dyn ColumnKernel>,
    parallel: bool,
    columns: Vec<KesslerColumn>,
}

impl KesslerPhysics {
    /// Couple `kernel` to the grid every `frequency`.
    pub fn new(frequency: TimeSpan, kernel: impl ColumnKernel + 'static) -> Self {
        Self {
            frequency,
            kernel: Box::new(kernel),
            parallel: false,
            columns: Vec::new(),
        }
    }

    /// Process patches concurrently on the rayon thread pool.
    pub fn parallel(mut self, enabled: bool) -> Self {
        self.parallel = enabled;
        self
    }

    /// The wrapped kernel.
    pub fn kernel(&self) -> &dyn ColumnKernel {
        self.kernel.as_ref()
    }
}

impl WorkflowProcess for KesslerPhysics {
    fn name(&self) -> &str {
        "kessler"
    }

    fn frequency(&self) -> TimeSpan {
        self.frequency
    }

    fn required_tracers(&self) -> usize {
        tracer::WATER_SPECIES
    }

    fn initialize(&mut self, grid: &Grid, _time_start: SimTime) -> Result<(), ProcessError> {
        if grid.tracer_count() < tracer::WATER_SPECIES {
            return Err(ProcessError::Initialization {
                reason: format!(
                    "kessler needs {} tracers, grid has {}",
                    tracer::WATER_SPECIES,
                    grid.tracer_count()
                ),
            });
        }
        let min = self.kernel.min_levels();
        if grid.nz() < min {
            return Err(ProcessError::Initialization {
                reason: format!(
                    "kernel '{}' needs at least {min} levels, grid has {}",
                    self.kernel.name(),
                    grid.nz()
                ),
            });
        }
        self.columns = vec![KesslerColumn::new(grid.nz()); grid.patch_count()];
        Ok(())
    }

    fn perform(&mut self, ctx: &mut ProcessContext<'_>) -> Result<(), ProcessError> {
        let constants = ctx.constants();
        let dt = ctx.elapsed().as_seconds();
        let patches = ctx.grid_mut().patches_mut();
        if self.columns.len() != patches.len() {
            return Err(ProcessError::NotInitialized);
        }
        let kernel = self.kernel.as_ref();
        if self.parallel {
            patches
                .par_iter_mut()
                .zip(self.columns.par_iter_mut())
                .try_for_each(|(patch, column)| couple_patch(patch, column, kernel, constants, dt))
        } else {
            patches
                .iter_mut()
                .zip(self.columns.iter_mut())
                .try_for_each(|(patch, column)| couple_patch(patch, column, kernel, constants, dt))
        }
    }
}

fn couple_patch(
    patch: &mut GridPatch,
    column: &mut KesslerColumn,
    kernel: &dyn ColumnKernel,
    constants: &PhysicalConstants,
    dt: f64,
) -> Result<(), ProcessError> {
    let mut f = patch
        .fields_mut(0)
        .ok_or_else(|| ProcessError::ExecutionFailed {
            reason: "patch has no time level 0".into(),
        })?;
    let pb = f.patch_box;
    column.dt = dt;
    for (i, j) in pb.interior_columns() {
        load_column(&f, column, constants, i, j)?;
        let rate = kernel.apply(column)?;
        store_column(&mut f, column, i, j)?;
        f.diagnostic_mut(PRECIPITATION)[[i, j]] += rate * dt;
    }
    Ok(())
}

fn check_positive(
    quantity: &'static str,
    value: f64,
    patch: usize,
    (i, j, level): (usize, usize, usize),
) -> Result<f64, ProcessError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ProcessError::NonPhysicalState {
            quantity,
            patch,
            i,
            j,
            level,
            value,
        })
    }
}

fn load_column(
    f: &PatchFieldsMut<'_>,
    column: &mut KesslerColumn,
    constants: &PhysicalConstants,
    i: usize,
    j: usize,
) -> Result<(), ProcessError> {
    let patch = f.index;
    for k in 0..column.len() {
        let at = (i, j, k);
        let rho_edge = check_positive("edge density", f.redge[[RHO, k, i, j]], patch, at)?;
        let pressure = constants.pressure_from_rho_theta(rho_edge * f.redge[[THETA, k, i, j]]);
        let temperature = check_positive(
            "temperature",
            constants.temperature_from_pressure_rho(pressure, rho_edge),
            patch,
            at,
        )?;

        let rho = check_positive("node density", f.node[[RHO, k, i, j]], patch, at)?;
        let theta = check_positive(
            "node potential temperature",
            f.node[[THETA, k, i, j]],
            patch,
            at,
        )?;

        column.vapor[k] = f.tracers[[tracer::VAPOR, k, i, j]] / rho;
        column.cloud[k] = f.tracers[[tracer::CLOUD, k, i, j]] / rho;
        column.rain[k] = f.tracers[[tracer::RAIN, k, i, j]] / rho;
        column.temperature[k] = theta;
        column.density[k] = rho;
        column.height[k] = f.z_levels[[k, i, j]];
        column.pk[k] = theta / temperature;
    }
    Ok(())
}

fn store_column(
    f: &mut PatchFieldsMut<'_>,
    column: &KesslerColumn,
    i: usize,
    j: usize,
) -> Result<(), ProcessError> {
    // Reject the whole column before touching the grid.
    let patch = f.index;
    for k in 0..column.len() {
        let at = (i, j, k);
        check_positive("kernel density", column.density[k], patch, at)?;
        check_positive(
            "kernel potential temperature",
            column.temperature[k],
            patch,
            at,
        )?;
    }
    for k in 0..column.len() {
        let rho = column.density[k];
        f.node[[THETA, k, i, j]] = column.temperature[k];
        f.node[[RHO, k, i, j]] = rho;
        f.tracers[[tracer::VAPOR, k, i, j]] = column.vapor[k] * rho;
        f.tracers[[tracer::CLOUD, k, i, j]] = column.cloud[k] * rho;
        f.tracers[[tracer::RAIN, k, i, j]] = column.rain[k] * rho;
    }
    Ok(())
}
