//! Interior-only write checking.
//!
//! [`HaloGuard`] snapshots every halo cell a process could touch (node and
//! edge state plus tracers, at the working time level) and, after the
//! process has run, reports the first patch whose halo changed.

use squall_core::ProcessError;
use squall_grid::{Grid, GridData4D, GridPatch, PatchBox};

/// Working time level processes operate on.
const TIME_LEVEL: usize = 0;

struct PatchHalo {
    node: Vec<u64>,
    redge: Vec<u64>,
    tracers: Vec<u64>,
}

/// Snapshot of all halo cells of a grid.
///
/// Values are compared bit for bit, so a NaN left untouched in a halo
/// does not count as a modification.
pub struct HaloGuard {
    patches: Vec<PatchHalo>,
}

impl HaloGuard {
    /// Record the current halo contents of every patch.
    pub fn capture(grid: &Grid) -> Self {
        Self {
            patches: grid.patches().iter().map(snapshot).collect(),
        }
    }

    /// Number of halo values recorded.
    pub fn len(&self) -> usize {
        self.patches
            .iter()
            .map(|p| p.node.len() + p.redge.len() + p.tracers.len())
            .sum()
    }

    /// Whether the grid has no halo cells.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Compare the grid's halos against the snapshot.
    pub fn verify(&self, grid: &Grid) -> Result<(), ProcessError> {
        for (patch, before) in grid.patches().iter().zip(&self.patches) {
            let after = snapshot(patch);
            let modified = if after.node != before.node {
                Some("node")
            } else if after.redge != before.redge {
                Some("redge")
            } else if after.tracers != before.tracers {
                Some("tracers")
            } else {
                None
            };
            if let Some(field) = modified {
                return Err(ProcessError::HaloModified {
                    patch: patch.index(),
                    field: field.to_string(),
                });
            }
        }
        Ok(())
    }
}

fn snapshot(patch: &GridPatch) -> PatchHalo {
    let pb = patch.patch_box();
    let empty = PatchHalo {
        node: Vec::new(),
        redge: Vec::new(),
        tracers: Vec::new(),
    };
    let (Some(state), Some(tracers)) = (patch.state(TIME_LEVEL), patch.tracers(TIME_LEVEL)) else {
        return empty;
    };
    PatchHalo {
        node: halo_bits(state.node(), pb),
        redge: halo_bits(state.redge(), pb),
        tracers: halo_bits(tracers, pb),
    }
}

/// Halo values of a `[component][level][i][j]` array, in a fixed order.
fn halo_bits(field: &GridData4D, pb: &PatchBox) -> Vec<u64> {
    let (components, levels) = (field.shape()[0], field.shape()[1]);
    let mut out = Vec::new();
    for (i, j) in pb.halo_columns() {
        for c in 0..components {
            for k in 0..levels {
                out.push(field[[c, k, i, j]].to_bits());
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use squall_grid::{CartesianDomain, GridSpec};

    fn grid(halo: usize) -> Grid {
        let spec = GridSpec::new(CartesianDomain::new(0.0, 3.0, 0.0, 2.0), 3, 2, 2)
            .with_patches(2, 1)
            .with_halo(halo);
        Grid::new(spec, 10.0, 1, 1, |_, _| 0.0).unwrap()
    }

    #[test]
    fn interior_writes_pass() {
        let mut g = grid(1);
        let guard = HaloGuard::capture(&g);
        assert!(!guard.is_empty());
        let p = g.patch_mut(1).unwrap();
        let f = p.fields_mut(0).unwrap();
        f.node[[0, 0, 1, 1]] = 5.0;
        f.tracers[[0, 1, 1, 2]] = 1.0;
        assert_eq!(guard.verify(&g), Ok(()));
    }

    #[test]
    fn halo_write_is_reported_with_field() {
        let mut g = grid(1);
        let guard = HaloGuard::capture(&g);
        let p = g.patch_mut(1).unwrap();
        let f = p.fields_mut(0).unwrap();
        f.redge[[4, 2, 0, 1]] = 1.0;
        assert_eq!(
            guard.verify(&g),
            Err(ProcessError::HaloModified {
                patch: 1,
                field: "redge".into()
            })
        );
    }

    #[test]
    fn zero_halo_has_nothing_to_guard() {
        let g = grid(0);
        assert!(HaloGuard::capture(&g).is_empty());
    }
}
