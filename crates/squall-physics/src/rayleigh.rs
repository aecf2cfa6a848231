//! Sponge-layer damping toward the reference state.

use squall_core::{ProcessError, SimTime, StateComponent, TimeSpan};
use squall_grid::Grid;
use squall_process::{ProcessContext, WorkflowProcess};

/// Components relaxed toward the reference state. Density is left alone.
pub const DAMPED_COMPONENTS: [StateComponent; 4] = [
    StateComponent::U,
    StateComponent::V,
    StateComponent::W,
    StateComponent::Theta,
];

/// Rayleigh friction using the grid's installed damping rate field.
///
/// Each invocation applies the implicit relaxation
///
/// ```text
/// q ← (q + Δt·ν·q_ref) / (1 + Δt·ν)
/// ```
///
/// at every interior node, where `Δt` is the time since the previous
/// invocation. The update is unconditionally stable and leaves `q = q_ref`
/// fixed.
#[derive(Clone, Debug)]
pub struct RayleighFriction {
    frequency: TimeSpan,
}

impl RayleighFriction {
    /// Damp every `frequency`.
    pub fn new(frequency: TimeSpan) -> Self {
        Self { frequency }
    }
}

impl WorkflowProcess for RayleighFriction {
    fn name(&self) -> &str {
        "rayleigh_friction"
    }

    fn frequency(&self) -> TimeSpan {
        self.frequency
    }

    fn initialize(&mut self, grid: &Grid, _time_start: SimTime) -> Result<(), ProcessError> {
        for patch in grid.patches() {
            let missing = if patch.reference_state().is_none() {
                Some("reference state")
            } else if patch.rayleigh_strength().is_none() {
                Some("Rayleigh strength")
            } else {
                None
            };
            if let Some(what) = missing {
                return Err(ProcessError::Initialization {
                    reason: format!("patch {} has no {what} field", patch.index()),
                });
            }
        }
        Ok(())
    }

    fn perform(&mut self, ctx: &mut ProcessContext<'_>) -> Result<(), ProcessError> {
        let dt = ctx.elapsed().as_seconds();
        for patch in ctx.grid_mut().patches_mut() {
            let nz = patch.nz();
            let f = patch.fields_mut(0).ok_or(ProcessError::NotInitialized)?;
            let (Some(reference), Some(nu)) = (f.reference_state, f.rayleigh_strength) else {
                return Err(ProcessError::NotInitialized);
            };
            for (i, j) in f.patch_box.interior_columns() {
                for k in 0..nz {
                    let coef = dt * nu[[k, i, j]];
                    if coef == 0.0 {
                        continue;
                    }
                    for c in DAMPED_COMPONENTS.map(StateComponent::index) {
                        let q = f.node[[c, k, i, j]];
                        f.node[[c, k, i, j]] = (q + coef * reference[[c, k, i, j]]) / (1.0 + coef);
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{Array3, Array4};
    use squall_core::PhysicalConstants;
    use squall_grid::{CartesianDomain, GridSpec};

    const U: usize = StateComponent::U.index();
    const RHO: usize = StateComponent::Rho.index();

    fn grid(with_fields: bool) -> Grid {
        let spec = GridSpec::new(CartesianDomain::new(0.0, 2.0, 0.0, 1.0), 2, 1, 3);
        let mut g = Grid::new(spec, 100.0, 0, 1, |_, _| 0.0).unwrap();
        if with_fields {
            for p in g.patches_mut() {
                let (a, b) = (p.patch_box().a_total(), p.patch_box().b_total());
                let mut reference = Array4::zeros((StateComponent::COUNT, 3, a, b));
                reference.index_axis_mut(ndarray::Axis(0), U).fill(10.0);
                p.install_reference_state(reference).unwrap();
                let mut nu = Array3::zeros((3, a, b));
                nu.index_axis_mut(ndarray::Axis(0), 2).fill(0.5);
                p.install_rayleigh_strength(nu).unwrap();
                let f = p.fields_mut(0).unwrap();
                f.node.index_axis_mut(ndarray::Axis(0), U).fill(20.0);
                f.node.index_axis_mut(ndarray::Axis(0), RHO).fill(1.0);
            }
        }
        g
    }

    fn perform(g: &mut Grid, dt_micros: u64) {
        let c = PhysicalConstants::default();
        let mut r = RayleighFriction::new(TimeSpan::from_micros(dt_micros));
        r.initialize(g, SimTime::ZERO).unwrap();
        let mut ctx = ProcessContext::new(
            g,
            &c,
            SimTime::from_micros(dt_micros),
            TimeSpan::from_micros(dt_micros),
        );
        r.perform(&mut ctx).unwrap();
    }

    #[test]
    fn requires_reference_and_strength() {
        let g = grid(false);
        let mut r = RayleighFriction::new(TimeSpan::from_secs(1));
        assert!(matches!(
            r.initialize(&g, SimTime::ZERO),
            Err(ProcessError::Initialization { .. })
        ));
    }

    #[test]
    fn relaxes_damped_levels_only() {
        let mut g = grid(true);
        perform(&mut g, 2_000_000);
        let node = g.patch(0).unwrap().state(0).unwrap().node().clone();
        // Level 2: coef = 2 s · 0.5 /s = 1, so (20 + 10) / 2.
        assert_relative_eq!(node[[U, 2, 1, 1]], 15.0);
        assert_eq!(node[[U, 1, 1, 1]], 20.0);
        assert_eq!(node[[RHO, 2, 1, 1]], 1.0);
        // Halo untouched.
        assert_eq!(node[[U, 2, 0, 1]], 20.0);
    }

    #[test]
    fn long_steps_approach_reference_without_overshoot() {
        let mut g = grid(true);
        perform(&mut g, 1_000_000_000);
        let u = g.patch(0).unwrap().state(0).unwrap().node()[[U, 2, 2, 1]];
        // coef = 1000 s · 0.5 /s = 500.
        assert_relative_eq!(u, (20.0 + 500.0 * 10.0) / 501.0, max_relative = 1e-14);
        assert!(u > 10.0);
    }
}
