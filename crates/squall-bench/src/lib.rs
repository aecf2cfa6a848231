//! Benchmark profiles for the Squall process-coupling layer.
//!
//! - [`moist_grid`]: a flat moist grid carrying the three water
//!   species, for timing the Kessler coupling in isolation
//! - [`mountain_profile`]: the non-hydrostatic mountain case with
//!   Rayleigh friction, for timing whole model steps

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use ndarray::Axis;
use squall_core::{tracer, SimTime, StateComponent, TimeSpan};
use squall_engine::{FrozenDynamics, ModelConfig};
use squall_grid::{CartesianDomain, Grid, GridError, GridSpec};
use squall_physics::RayleighFriction;
use squall_testcase::NonHydroMountain;

/// Node density of [`moist_grid`] (kg/m³).
pub const RHO: f64 = 1.1;
/// Node and edge potential temperature of [`moist_grid`] (K).
pub const THETA: f64 = 295.0;
/// Vapor, cloud and rain mixing ratios of [`moist_grid`].
pub const MIXING_RATIOS: [f64; tracer::WATER_SPECIES] = [0.014, 5e-4, 2e-4];

/// A 10 km square, `n × n` columns of `nz` levels over `patches × patches`
/// tiles, at a uniform moist state.
pub fn moist_grid(n: usize, nz: usize, patches: usize) -> Result<Grid, GridError> {
    let spec = GridSpec::new(CartesianDomain::new(0.0, 1e4, 0.0, 1e4), n, n, nz)
        .with_patches(patches, patches);
    let mut grid = Grid::new(spec, 1e4, tracer::WATER_SPECIES, 1, |_, _| 0.0)?;
    for patch in grid.patches_mut() {
        let Some(f) = patch.fields_mut(0) else {
            continue;
        };
        for field in [&mut *f.node, &mut *f.redge] {
            field
                .index_axis_mut(Axis(0), StateComponent::Rho.index())
                .fill(RHO);
            field
                .index_axis_mut(Axis(0), StateComponent::Theta.index())
                .fill(THETA);
        }
        for (species, q) in MIXING_RATIOS.into_iter().enumerate() {
            f.tracers.index_axis_mut(Axis(0), species).fill(q * RHO);
        }
    }
    Ok(grid)
}

/// Non-hydrostatic mountain at `nx × 1 × nz`, ten-second steps for one
/// simulated minute, Rayleigh friction every step.
pub fn mountain_profile(nx: usize, nz: usize, patches_x: usize) -> ModelConfig {
    let mountain = NonHydroMountain::default();
    let spec = mountain.grid_spec(nx, 1, nz).with_patches(patches_x, 1);
    let dt = TimeSpan::from_secs(10);
    ModelConfig::new(
        spec,
        Box::new(mountain),
        Box::new(FrozenDynamics),
        dt,
        SimTime::from_micros(60 * 1_000_000),
    )
    .with_process(RayleighFriction::new(dt))
}
