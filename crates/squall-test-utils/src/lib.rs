//! Test utilities for Squall development.
//!
//! Provides a horizontally and vertically uniform [`UniformTestCase`],
//! grid builders that fill state directly (no model required), and the
//! process fixtures in [`fixtures`].

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use ndarray::Axis;
use squall_core::{PhysicalConstants, PointState, SimTime, StateComponent, TestCaseError};
use squall_grid::{CartesianDomain, Grid, GridSpec};
use squall_testcase::TestCase;

pub const UNIFORM_RHO: f64 = 1.2;
pub const UNIFORM_THETA: f64 = 300.0;

/// Flat, resting, uniform atmosphere: ρ = 1.2, Θ = 300, no wind.
///
/// Tracers are filled with `tracer_values` (density weighted); missing
/// entries are zero. The state doubles as the reference state.
#[derive(Clone, Debug)]
pub struct UniformTestCase {
    pub z_top: f64,
    pub tracer_values: Vec<f64>,
    pub rayleigh: Option<f64>,
}

impl UniformTestCase {
    pub fn new() -> Self {
        Self {
            z_top: 1000.0,
            tracer_values: Vec::new(),
            rayleigh: None,
        }
    }

    pub fn with_tracers(mut self, values: Vec<f64>) -> Self {
        self.tracer_values = values;
        self
    }

    /// Constant damping rate everywhere.
    pub fn with_rayleigh(mut self, rate: f64) -> Self {
        self.rayleigh = Some(rate);
        self
    }

    pub fn state() -> PointState {
        PointState {
            theta: UNIFORM_THETA,
            rho: UNIFORM_RHO,
            ..PointState::default()
        }
    }
}

impl Default for UniformTestCase {
    fn default() -> Self {
        Self::new()
    }
}

impl TestCase for UniformTestCase {
    fn name(&self) -> &str {
        "uniform"
    }

    fn tracer_count(&self) -> usize {
        self.tracer_values.len()
    }

    fn z_top(&self) -> f64 {
        self.z_top
    }

    fn evaluate_topography(&self, _: &PhysicalConstants, _x: f64, _y: f64) -> f64 {
        0.0
    }

    fn has_rayleigh_friction(&self) -> bool {
        self.rayleigh.is_some()
    }

    fn evaluate_rayleigh_strength(&self, _z: f64, _x: f64, _y: f64) -> f64 {
        self.rayleigh.unwrap_or(0.0)
    }

    fn has_reference_state(&self) -> bool {
        true
    }

    fn evaluate_reference_state(
        &self,
        _: &PhysicalConstants,
        _z: f64,
        _x: f64,
        _y: f64,
    ) -> Result<PointState, TestCaseError> {
        Ok(Self::state())
    }

    fn evaluate_pointwise_state(
        &self,
        _: &PhysicalConstants,
        _time: SimTime,
        _z: f64,
        _x: f64,
        _y: f64,
        tracers: &mut [f64],
    ) -> Result<PointState, TestCaseError> {
        for (slot, value) in tracers.iter_mut().zip(&self.tracer_values) {
            *slot = *value;
        }
        Ok(Self::state())
    }
}

/// Unit-square domain split into `patches_x × 1` patches with a one-node halo.
pub fn small_spec(nx: usize, ny: usize, nz: usize, patches_x: usize) -> GridSpec {
    GridSpec::new(CartesianDomain::new(0.0, 1.0, 0.0, 1.0), nx, ny, nz).with_patches(patches_x, 1)
}

/// One interior column with a one-node halo.
pub fn single_column_spec(nz: usize) -> GridSpec {
    small_spec(1, 1, nz, 1)
}

/// Flat grid (z_top = 1000) with every cell, halo included, at the uniform
/// state and every tracer at zero.
pub fn uniform_grid(spec: GridSpec, tracer_count: usize) -> Grid {
    let mut grid = Grid::new(spec, 1000.0, tracer_count, 1, |_, _| 0.0)
        .expect("fixture grid spec is valid");
    for patch in grid.patches_mut() {
        let state = patch.state_mut(0).expect("time level 0 exists");
        let (node, redge) = state.split_mut();
        for field in [node, redge] {
            field
                .index_axis_mut(Axis(0), StateComponent::Theta.index())
                .fill(UNIFORM_THETA);
            field
                .index_axis_mut(Axis(0), StateComponent::Rho.index())
                .fill(UNIFORM_RHO);
        }
    }
    grid
}

/// Set tracer `species` to `mixing_ratio × ρ_node` in every cell of level 0.
pub fn set_mixing_ratio(grid: &mut Grid, species: usize, mixing_ratio: f64) {
    for patch in grid.patches_mut() {
        let f = patch.fields_mut(0).expect("time level 0 exists");
        let rho = f.node.index_axis(Axis(0), StateComponent::Rho.index());
        let mut q = f.tracers.index_axis_mut(Axis(0), species);
        q.zip_mut_with(&rho, |t, &r| *t = mixing_ratio * r);
    }
}
