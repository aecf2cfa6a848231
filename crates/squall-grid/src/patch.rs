//! A single tile of the horizontal decomposition and its field arrays.

use indexmap::IndexMap;
use ndarray::{Array2, Array3, Array4};

use crate::data::{DataState, GridData2D, GridData3D, GridData4D};
use crate::error::GridError;
use crate::patch_box::PatchBox;
use crate::spec::GridSpec;
use squall_core::StateComponent;

/// One patch of the grid.
///
/// Geometry (`x`, `y`, topography, level heights) is fixed at
/// construction. State and tracers exist once per time level; level 0 is
/// the one workflow processes operate on.
#[derive(Clone, Debug)]
pub struct GridPatch {
    index: usize,
    patch_box: PatchBox,
    nz: usize,
    x: GridData2D,
    y: GridData2D,
    topography: GridData2D,
    z_levels: GridData3D,
    z_interfaces: GridData3D,
    states: Vec<DataState>,
    tracers: Vec<GridData4D>,
    reference_state: Option<GridData4D>,
    rayleigh_strength: Option<GridData3D>,
    surface_diagnostics: IndexMap<&'static str, GridData2D>,
}

impl GridPatch {
    /// Build a patch and its terrain-following geometry.
    ///
    /// Heights follow `z = zs + η·(z_top − zs)` with `η = (k + ½)/nz` at
    /// nodes and `η = k/nz` at edges.
    pub(crate) fn build(
        index: usize,
        patch_box: PatchBox,
        spec: &GridSpec,
        z_top: f64,
        tracer_count: usize,
        time_levels: usize,
        topography: &dyn Fn(f64, f64) -> f64,
    ) -> Result<Self, GridError> {
        let nz = spec.nz;
        let (a, b) = (patch_box.a_total(), patch_box.b_total());

        let x = Array2::from_shape_fn((a, b), |(i, _)| spec.node_x(patch_box.global_a(i)));
        let y = Array2::from_shape_fn((a, b), |(_, j)| spec.node_y(patch_box.global_b(j)));

        let mut zs = Array2::zeros((a, b));
        for ((i, j), h) in zs.indexed_iter_mut() {
            let (px, py) = (x[[i, j]], y[[i, j]]);
            let height = topography(px, py);
            if !height.is_finite() || height >= z_top {
                return Err(GridError::TopographyAboveTop {
                    x: px,
                    y: py,
                    height,
                    z_top,
                });
            }
            *h = height;
        }

        let column = |eta: f64, i: usize, j: usize| {
            let s = zs[[i, j]];
            s + eta * (z_top - s)
        };
        let z_levels = Array3::from_shape_fn((nz, a, b), |(k, i, j)| {
            column((k as f64 + 0.5) / nz as f64, i, j)
        });
        let z_interfaces =
            Array3::from_shape_fn((nz + 1, a, b), |(k, i, j)| column(k as f64 / nz as f64, i, j));

        Ok(Self {
            index,
            patch_box,
            nz,
            x,
            y,
            topography: zs,
            z_levels,
            z_interfaces,
            states: (0..time_levels)
                .map(|_| DataState::zeros(nz, a, b))
                .collect(),
            tracers: (0..time_levels)
                .map(|_| Array4::zeros((tracer_count, nz, a, b)))
                .collect(),
            reference_state: None,
            rayleigh_strength: None,
            surface_diagnostics: IndexMap::new(),
        })
    }

    // ── Geometry ────────────────────────────────────────────────

    /// Position of this patch in the grid.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Interior and halo bounds.
    pub fn patch_box(&self) -> &PatchBox {
        &self.patch_box
    }

    /// Vertical cell count.
    pub fn nz(&self) -> usize {
        self.nz
    }

    /// x coordinate of every column, `[i][j]`.
    pub fn x(&self) -> &GridData2D {
        &self.x
    }

    /// y coordinate of every column, `[i][j]`.
    pub fn y(&self) -> &GridData2D {
        &self.y
    }

    /// Surface height of every column, `[i][j]`.
    pub fn topography(&self) -> &GridData2D {
        &self.topography
    }

    /// Node heights, `[level][i][j]` with `nz` levels.
    pub fn z_levels(&self) -> &GridData3D {
        &self.z_levels
    }

    /// Edge heights, `[level][i][j]` with `nz + 1` levels.
    pub fn z_interfaces(&self) -> &GridData3D {
        &self.z_interfaces
    }

    // ── State ───────────────────────────────────────────────────

    /// Number of stored time levels.
    pub fn time_levels(&self) -> usize {
        self.states.len()
    }

    /// Number of tracer species.
    pub fn tracer_count(&self) -> usize {
        self.tracers.first().map_or(0, |t| t.shape()[0])
    }

    /// Dynamical state at a time level.
    pub fn state(&self, time_level: usize) -> Option<&DataState> {
        self.states.get(time_level)
    }

    /// Mutable dynamical state at a time level.
    pub fn state_mut(&mut self, time_level: usize) -> Option<&mut DataState> {
        self.states.get_mut(time_level)
    }

    /// Density-weighted tracers at a time level, `[species][level][i][j]`.
    pub fn tracers(&self, time_level: usize) -> Option<&GridData4D> {
        self.tracers.get(time_level)
    }

    /// Mutable density-weighted tracers at a time level.
    pub fn tracers_mut(&mut self, time_level: usize) -> Option<&mut GridData4D> {
        self.tracers.get_mut(time_level)
    }

    /// Node-placed reference state, if one was installed.
    pub fn reference_state(&self) -> Option<&GridData4D> {
        self.reference_state.as_ref()
    }

    /// Rayleigh damping rate `[level][i][j]` (1/s), if one was installed.
    pub fn rayleigh_strength(&self) -> Option<&GridData3D> {
        self.rayleigh_strength.as_ref()
    }

    /// A named 2-D surface diagnostic, if any process produced it.
    pub fn surface_diagnostic(&self, name: &str) -> Option<&GridData2D> {
        self.surface_diagnostics.get(name)
    }

    /// All surface diagnostics in the order they were first written.
    pub fn surface_diagnostics(&self) -> impl Iterator<Item = (&'static str, &GridData2D)> {
        self.surface_diagnostics.iter().map(|(k, v)| (*k, v))
    }

    /// Install the node-placed reference state.
    pub fn install_reference_state(&mut self, field: GridData4D) -> Result<(), GridError> {
        let expected = self.node_shape();
        check_shape("reference_state", &expected, field.shape())?;
        self.reference_state = Some(field);
        Ok(())
    }

    /// Install the Rayleigh damping rate field.
    pub fn install_rayleigh_strength(&mut self, field: GridData3D) -> Result<(), GridError> {
        let expected = self.z_levels.shape().to_vec();
        check_shape("rayleigh_strength", &expected, field.shape())?;
        self.rayleigh_strength = Some(field);
        Ok(())
    }

    /// Split borrows of everything a column process needs at one time level.
    pub fn fields_mut(&mut self, time_level: usize) -> Option<PatchFieldsMut<'_>> {
        let state = self.states.get_mut(time_level)?;
        let tracers = self.tracers.get_mut(time_level)?;
        let (node, redge) = state.split_mut();
        Some(PatchFieldsMut {
            index: self.index,
            patch_box: self.patch_box,
            node,
            redge,
            tracers,
            z_levels: &self.z_levels,
            x: &self.x,
            y: &self.y,
            reference_state: self.reference_state.as_ref(),
            rayleigh_strength: self.rayleigh_strength.as_ref(),
            diagnostics: &mut self.surface_diagnostics,
        })
    }

    fn node_shape(&self) -> Vec<usize> {
        let (a, b) = (self.patch_box.a_total(), self.patch_box.b_total());
        vec![StateComponent::COUNT, self.nz, a, b]
    }
}

fn check_shape(field: &'static str, expected: &[usize], actual: &[usize]) -> Result<(), GridError> {
    if expected == actual {
        Ok(())
    } else {
        Err(GridError::ShapeMismatch {
            field,
            expected: expected.to_vec(),
            actual: actual.to_vec(),
        })
    }
}

/// Disjoint borrows of one patch at one time level.
///
/// State and tracers are writable; geometry and installed forcing fields
/// are read only.
pub struct PatchFieldsMut<'a> {
    /// Patch index within the grid.
    pub index: usize,
    /// Interior and halo bounds.
    pub patch_box: PatchBox,
    /// Node-placed state.
    pub node: &'a mut GridData4D,
    /// Edge-placed state.
    pub redge: &'a mut GridData4D,
    /// Density-weighted tracers.
    pub tracers: &'a mut GridData4D,
    /// Node heights.
    pub z_levels: &'a GridData3D,
    /// x coordinate of every column.
    pub x: &'a GridData2D,
    /// y coordinate of every column.
    pub y: &'a GridData2D,
    /// Node-placed reference state, if installed.
    pub reference_state: Option<&'a GridData4D>,
    /// Rayleigh damping rate, if installed.
    pub rayleigh_strength: Option<&'a GridData3D>,
    diagnostics: &'a mut IndexMap<&'static str, GridData2D>,
}

impl PatchFieldsMut<'_> {
    /// A named surface diagnostic, created zero-filled on first use.
    pub fn diagnostic_mut(&mut self, name: &'static str) -> &mut GridData2D {
        let shape = (self.patch_box.a_total(), self.patch_box.b_total());
        self.diagnostics
            .entry(name)
            .or_insert_with(|| Array2::zeros(shape))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::CartesianDomain;
    use approx::assert_relative_eq;

    fn spec() -> GridSpec {
        GridSpec::new(CartesianDomain::new(0.0, 4.0, 0.0, 2.0), 4, 2, 4)
    }

    fn patch(topo: &dyn Fn(f64, f64) -> f64) -> Result<GridPatch, GridError> {
        let s = spec();
        let boxes = s.patch_boxes();
        GridPatch::build(0, boxes[0], &s, 100.0, 3, 2, topo)
    }

    #[test]
    fn flat_levels_are_evenly_spaced() {
        let p = patch(&|_, _| 0.0).unwrap();
        assert_eq!(p.z_levels().shape(), &[4, 6, 4]);
        assert_eq!(p.z_interfaces().shape(), &[5, 6, 4]);
        assert_relative_eq!(p.z_levels()[[0, 1, 1]], 12.5);
        assert_relative_eq!(p.z_levels()[[3, 1, 1]], 87.5);
        assert_relative_eq!(p.z_interfaces()[[4, 0, 0]], 100.0);
        assert_relative_eq!(p.x()[[0, 0]], -0.5);
        assert_relative_eq!(p.x()[[1, 0]], 0.5);
    }

    #[test]
    fn levels_follow_terrain() {
        let p = patch(&|_, _| 20.0).unwrap();
        assert_relative_eq!(p.z_interfaces()[[0, 2, 2]], 20.0);
        assert_relative_eq!(p.z_levels()[[0, 2, 2]], 30.0);
        assert_relative_eq!(p.z_interfaces()[[4, 2, 2]], 100.0);
    }

    #[test]
    fn rejects_terrain_at_model_top() {
        let err = patch(&|_, _| 100.0).unwrap_err();
        assert!(matches!(err, GridError::TopographyAboveTop { .. }));
    }

    #[test]
    fn install_checks_shape() {
        let mut p = patch(&|_, _| 0.0).unwrap();
        let bad = Array4::zeros((5, 3, 6, 4));
        assert!(matches!(
            p.install_reference_state(bad),
            Err(GridError::ShapeMismatch {
                field: "reference_state",
                ..
            })
        ));
        p.install_reference_state(Array4::zeros((5, 4, 6, 4))).unwrap();
        p.install_rayleigh_strength(Array3::zeros((4, 6, 4))).unwrap();
        assert!(p.reference_state().is_some());
        assert!(p.rayleigh_strength().is_some());
    }

    #[test]
    fn fields_mut_writes_the_requested_time_level() {
        let mut p = patch(&|_, _| 0.0).unwrap();
        {
            let f = p.fields_mut(1).unwrap();
            f.node[[StateComponent::Rho.index(), 0, 1, 1]] = 1.2;
            f.tracers[[2, 3, 1, 1]] = 0.01;
        }
        assert_eq!(p.state(1).unwrap().node()[[4, 0, 1, 1]], 1.2);
        assert_eq!(p.state(0).unwrap().node()[[4, 0, 1, 1]], 0.0);
        assert_eq!(p.tracers(1).unwrap()[[2, 3, 1, 1]], 0.01);
        assert!(p.fields_mut(2).is_none());
    }

    #[test]
    fn diagnostics_are_created_on_first_use() {
        let mut p = patch(&|_, _| 0.0).unwrap();
        assert!(p.surface_diagnostic("precipitation").is_none());
        {
            let mut f = p.fields_mut(0).unwrap();
            f.diagnostic_mut("precipitation")[[1, 1]] += 2.0;
            f.diagnostic_mut("precipitation")[[1, 1]] += 1.0;
        }
        assert_eq!(p.surface_diagnostic("precipitation").unwrap()[[1, 1]], 3.0);
        assert_eq!(p.surface_diagnostics().count(), 1);
    }
}
