//! Grid population from a test case.
//!
//! Every cell of every patch, halos included, is evaluated: node state and
//! tracers at node heights, edge state at interface heights. The result
//! is copied into all time levels. Reference state and Rayleigh strength
//! are stored only when the test case provides them.

use ndarray::{Array3, Array4};
use squall_core::{PhysicalConstants, SimTime, StateComponent};
use squall_grid::{Grid, GridPatch};
use squall_testcase::TestCase;

use crate::config::ConfigError;

/// Fill `grid` from `test_case` at time `start`.
pub fn populate_grid(
    grid: &mut Grid,
    test_case: &dyn TestCase,
    constants: &PhysicalConstants,
    start: SimTime,
) -> Result<(), ConfigError> {
    let mut tracers = vec![0.0; grid.tracer_count()];
    for patch in grid.patches_mut() {
        populate_state(patch, test_case, constants, start, &mut tracers)?;
        if test_case.has_reference_state() {
            let reference = reference_field(patch, test_case, constants)?;
            patch.install_reference_state(reference)?;
        }
        if test_case.has_rayleigh_friction() {
            let strength = Array3::from_shape_fn(patch.z_levels().dim(), |(k, i, j)| {
                test_case.evaluate_rayleigh_strength(
                    patch.z_levels()[[k, i, j]],
                    patch.x()[[i, j]],
                    patch.y()[[i, j]],
                )
            });
            patch.install_rayleigh_strength(strength)?;
        }
    }
    Ok(())
}

fn populate_state(
    patch: &mut GridPatch,
    test_case: &dyn TestCase,
    constants: &PhysicalConstants,
    start: SimTime,
    tracers: &mut [f64],
) -> Result<(), ConfigError> {
    let x = patch.x().clone();
    let y = patch.y().clone();
    let z_nodes = patch.z_levels().clone();
    let z_edges = patch.z_interfaces().clone();

    let f = patch.fields_mut(0).ok_or(ConfigError::InvalidTimeLevels {
        configured: 0,
    })?;
    for ((k, i, j), &z) in z_nodes.indexed_iter() {
        tracers.fill(0.0);
        let state =
            test_case.evaluate_pointwise_state(constants, start, z, x[[i, j]], y[[i, j]], tracers)?;
        for (c, value) in state.to_array().into_iter().enumerate() {
            f.node[[c, k, i, j]] = value;
        }
        for (s, &value) in tracers.iter().enumerate() {
            f.tracers[[s, k, i, j]] = value;
        }
    }
    let mut discard = vec![0.0; tracers.len()];
    for ((k, i, j), &z) in z_edges.indexed_iter() {
        let state = test_case.evaluate_pointwise_state(
            constants,
            start,
            z,
            x[[i, j]],
            y[[i, j]],
            &mut discard,
        )?;
        for (c, value) in state.to_array().into_iter().enumerate() {
            f.redge[[c, k, i, j]] = value;
        }
    }

    let (Some(state), Some(tracer_field)) = (patch.state(0).cloned(), patch.tracers(0).cloned())
    else {
        return Ok(());
    };
    for level in 1..patch.time_levels() {
        if let Some(s) = patch.state_mut(level) {
            *s = state.clone();
        }
        if let Some(t) = patch.tracers_mut(level) {
            t.assign(&tracer_field);
        }
    }
    Ok(())
}

fn reference_field(
    patch: &GridPatch,
    test_case: &dyn TestCase,
    constants: &PhysicalConstants,
) -> Result<Array4<f64>, ConfigError> {
    let (nz, a, b) = patch.z_levels().dim();
    let mut field = Array4::zeros((StateComponent::COUNT, nz, a, b));
    for ((k, i, j), &z) in patch.z_levels().indexed_iter() {
        let state =
            test_case.evaluate_reference_state(constants, z, patch.x()[[i, j]], patch.y()[[i, j]])?;
        for (c, value) in state.to_array().into_iter().enumerate() {
            field[[c, k, i, j]] = value;
        }
    }
    Ok(field)
}
