//! Field array types and the per-time-level [`DataState`].

use ndarray::{Array2, Array3, Array4};
use squall_core::{DataLocation, StateComponent};

/// `field[component][level][i][j]`.
pub type GridData4D = Array4<f64>;

/// `field[level][i][j]`.
pub type GridData3D = Array3<f64>;

/// `field[i][j]`.
pub type GridData2D = Array2<f64>;

/// Dynamical state of one patch at one time level.
///
/// Holds the node-placed prognostic array (`nz` levels) and the
/// edge-placed diagnostic array (`nz + 1` levels), both with all
/// [`StateComponent::COUNT`] components.
#[derive(Clone, Debug, PartialEq)]
pub struct DataState {
    node: GridData4D,
    redge: GridData4D,
}

impl DataState {
    /// Zero-filled state for a patch of `a_total × b_total` columns with `nz` cells.
    pub fn zeros(nz: usize, a_total: usize, b_total: usize) -> Self {
        let components = StateComponent::COUNT;
        Self {
            node: Array4::zeros((
                components,
                DataLocation::Node.level_count(nz),
                a_total,
                b_total,
            )),
            redge: Array4::zeros((
                components,
                DataLocation::REdge.level_count(nz),
                a_total,
                b_total,
            )),
        }
    }

    /// Array at the given placement.
    pub fn get(&self, location: DataLocation) -> &GridData4D {
        match location {
            DataLocation::Node => &self.node,
            DataLocation::REdge => &self.redge,
        }
    }

    /// Mutable array at the given placement.
    pub fn get_mut(&mut self, location: DataLocation) -> &mut GridData4D {
        match location {
            DataLocation::Node => &mut self.node,
            DataLocation::REdge => &mut self.redge,
        }
    }

    /// Node-placed array.
    pub fn node(&self) -> &GridData4D {
        &self.node
    }

    /// Edge-placed array.
    pub fn redge(&self) -> &GridData4D {
        &self.redge
    }

    /// Both arrays at once, node first.
    pub fn split_mut(&mut self) -> (&mut GridData4D, &mut GridData4D) {
        (&mut self.node, &mut self.redge)
    }
}
