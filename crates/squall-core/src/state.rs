//! Dynamical state layout: component indices, vertical placement, and
//! the pointwise state vector returned by test cases.

use std::fmt;

/// Index of a prognostic component in a 4-D state array.
///
/// The order is fixed: `U, V, Θ, W, ρ`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StateComponent {
    /// Velocity along the first horizontal axis.
    U,
    /// Velocity along the second horizontal axis.
    V,
    /// Potential temperature.
    Theta,
    /// Vertical velocity.
    W,
    /// Dry-air density.
    Rho,
}

impl StateComponent {
    /// Number of dynamical components.
    pub const COUNT: usize = 5;

    /// All components in storage order.
    pub const ALL: [StateComponent; Self::COUNT] = [
        StateComponent::U,
        StateComponent::V,
        StateComponent::Theta,
        StateComponent::W,
        StateComponent::Rho,
    ];

    /// Storage index of this component.
    pub const fn index(self) -> usize {
        match self {
            Self::U => 0,
            Self::V => 1,
            Self::Theta => 2,
            Self::W => 3,
            Self::Rho => 4,
        }
    }

    /// Component at a storage index, if any.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Short name used in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            Self::U => "U",
            Self::V => "V",
            Self::Theta => "Theta",
            Self::W => "W",
            Self::Rho => "Rho",
        }
    }
}

impl fmt::Display for StateComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Vertical placement of a field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DataLocation {
    /// Cell-centered levels (`nz` of them). Prognostic quantities.
    Node,
    /// Level edges (`nz + 1` of them). Diagnostic / flux-carrying quantities.
    REdge,
}

impl DataLocation {
    /// Number of vertical levels at this placement for a column of `nz` cells.
    pub const fn level_count(self, nz: usize) -> usize {
        match self {
            Self::Node => nz,
            Self::REdge => nz + 1,
        }
    }
}

impl fmt::Display for DataLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Node => f.write_str("node"),
            Self::REdge => f.write_str("redge"),
        }
    }
}

/// Reserved tracer indices used when microphysics is active.
///
/// Tracers are stored density weighted (mixing ratio × ρ).
pub mod tracer {
    /// Water vapor.
    pub const VAPOR: usize = 0;
    /// Cloud water.
    pub const CLOUD: usize = 1;
    /// Rain water.
    pub const RAIN: usize = 2;
    /// Number of water species the microphysics coupling needs.
    pub const WATER_SPECIES: usize = 3;
}

/// The dynamical state at a single point.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointState {
    /// Velocity along the first horizontal axis (m/s).
    pub u: f64,
    /// Velocity along the second horizontal axis (m/s).
    pub v: f64,
    /// Potential temperature (K).
    pub theta: f64,
    /// Vertical velocity (m/s).
    pub w: f64,
    /// Dry-air density (kg/m³).
    pub rho: f64,
}

impl PointState {
    /// Value of one component.
    pub fn get(&self, component: StateComponent) -> f64 {
        match component {
            StateComponent::U => self.u,
            StateComponent::V => self.v,
            StateComponent::Theta => self.theta,
            StateComponent::W => self.w,
            StateComponent::Rho => self.rho,
        }
    }

    /// Replace one component.
    pub fn set(&mut self, component: StateComponent, value: f64) {
        match component {
            StateComponent::U => self.u = value,
            StateComponent::V => self.v = value,
            StateComponent::Theta => self.theta = value,
            StateComponent::W => self.w = value,
            StateComponent::Rho => self.rho = value,
        }
    }

    /// Components in storage order.
    pub fn to_array(&self) -> [f64; StateComponent::COUNT] {
        [self.u, self.v, self.theta, self.w, self.rho]
    }

    /// Build from components in storage order.
    pub fn from_array(values: [f64; StateComponent::COUNT]) -> Self {
        let [u, v, theta, w, rho] = values;
        Self {
            u,
            v,
            theta,
            w,
            rho,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_indices_are_fixed() {
        for (i, c) in StateComponent::ALL.iter().enumerate() {
            assert_eq!(c.index(), i);
            assert_eq!(StateComponent::from_index(i), Some(*c));
        }
        assert_eq!(StateComponent::Theta.index(), 2);
        assert_eq!(StateComponent::Rho.index(), 4);
        assert_eq!(StateComponent::from_index(5), None);
    }

    #[test]
    fn redge_has_one_more_level() {
        assert_eq!(DataLocation::Node.level_count(40), 40);
        assert_eq!(DataLocation::REdge.level_count(40), 41);
    }

    #[test]
    fn point_state_array_order() {
        let s = PointState {
            u: 1.0,
            v: 2.0,
            theta: 3.0,
            w: 4.0,
            rho: 5.0,
        };
        assert_eq!(s.to_array(), [1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(PointState::from_array(s.to_array()), s);
        let mut t = s;
        t.set(StateComponent::W, -1.0);
        assert_eq!(t.get(StateComponent::W), -1.0);
    }
}
