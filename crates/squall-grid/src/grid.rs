//! The tiled grid: an ordered sequence of patches.

use crate::error::GridError;
use crate::patch::GridPatch;
use crate::spec::GridSpec;

/// All patches of a model, in patch-index order.
///
/// Iteration order is fixed at construction and is the order every
/// workflow process visits patches in.
#[derive(Clone, Debug)]
pub struct Grid {
    spec: GridSpec,
    z_top: f64,
    patches: Vec<GridPatch>,
}

impl Grid {
    /// Build every patch of `spec` with terrain from `topography(x, y)`.
    ///
    /// State, tracer and diagnostic arrays start zero filled.
    pub fn new(
        spec: GridSpec,
        z_top: f64,
        tracer_count: usize,
        time_levels: usize,
        topography: impl Fn(f64, f64) -> f64,
    ) -> Result<Self, GridError> {
        spec.validate()?;
        if !(z_top.is_finite() && z_top > 0.0) {
            return Err(GridError::InvalidSpec {
                reason: format!("model top must be positive, got {z_top}"),
            });
        }
        if time_levels == 0 {
            return Err(GridError::InvalidSpec {
                reason: "at least one time level is required".into(),
            });
        }
        let patches = spec
            .patch_boxes()
            .into_iter()
            .enumerate()
            .map(|(index, patch_box)| {
                GridPatch::build(
                    index,
                    patch_box,
                    &spec,
                    z_top,
                    tracer_count,
                    time_levels,
                    &topography,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            spec,
            z_top,
            patches,
        })
    }

    /// The specification this grid was built from.
    pub fn spec(&self) -> &GridSpec {
        &self.spec
    }

    /// Vertical cell count.
    pub fn nz(&self) -> usize {
        self.spec.nz
    }

    /// Model top (m).
    pub fn z_top(&self) -> f64 {
        self.z_top
    }

    /// Tracer species per patch.
    pub fn tracer_count(&self) -> usize {
        self.patches.first().map_or(0, GridPatch::tracer_count)
    }

    /// Stored time levels per patch.
    pub fn time_levels(&self) -> usize {
        self.patches.first().map_or(0, GridPatch::time_levels)
    }

    /// Number of patches.
    pub fn patch_count(&self) -> usize {
        self.patches.len()
    }

    /// Patch by index.
    pub fn patch(&self, index: usize) -> Option<&GridPatch> {
        self.patches.get(index)
    }

    /// Mutable patch by index.
    pub fn patch_mut(&mut self, index: usize) -> Option<&mut GridPatch> {
        self.patches.get_mut(index)
    }

    /// All patches in order.
    pub fn patches(&self) -> &[GridPatch] {
        &self.patches
    }

    /// All patches in order, mutably. Slices split cleanly across threads.
    pub fn patches_mut(&mut self) -> &mut [GridPatch] {
        &mut self.patches
    }

    /// Interior columns summed over all patches.
    pub fn interior_column_count(&self) -> usize {
        self.patches
            .iter()
            .map(|p| p.patch_box().interior_column_count())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::CartesianDomain;

    fn spec() -> GridSpec {
        GridSpec::new(CartesianDomain::new(0.0, 10.0, 0.0, 10.0), 10, 10, 3).with_patches(3, 2)
    }

    #[test]
    fn patches_cover_the_domain() {
        let grid = Grid::new(spec(), 50.0, 2, 1, |_, _| 0.0).unwrap();
        assert_eq!(grid.patch_count(), 6);
        assert_eq!(grid.interior_column_count(), 100);
        assert_eq!(grid.tracer_count(), 2);
        for (i, p) in grid.patches().iter().enumerate() {
            assert_eq!(p.index(), i);
        }
    }

    #[test]
    fn rejects_bad_arguments() {
        assert!(Grid::new(spec(), 0.0, 0, 1, |_, _| 0.0).is_err());
        assert!(Grid::new(spec(), 50.0, 0, 0, |_, _| 0.0).is_err());
        assert!(matches!(
            Grid::new(spec(), 50.0, 0, 1, |x, _| if x > 5.0 { 60.0 } else { 0.0 }),
            Err(GridError::TopographyAboveTop { .. })
        ));
    }
}
