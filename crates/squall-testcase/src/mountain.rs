//! Uniform flow over a witch-of-Agnesi ridge in a stably stratified
//! atmosphere (Schär mountain, Giraldo et al. case 6).
//!
//! The background has constant Brunt–Väisälä frequency `N`:
//!
//! - `θ̄(z) = θ0·exp(N²z/g)`
//! - `π(z) = 1 + g²/(cp·θ0·N²)·(exp(−N²z/g) − 1)`
//! - `ρ(z) = P0/(R·θ̄)·π^(cv/R)`
//!
//! with `U = u0` and `V = W = 0`. The analytic state is time independent,
//! so it doubles as the reference state.

use std::f64::consts::PI;

use squall_core::{PhysicalConstants, PointState, SimTime, TestCaseError};
use squall_grid::{CartesianDomain, GridSpec};

use crate::test_case::TestCase;

/// Peak damping rate of each sponge layer (1/s).
pub const RAYLEIGH_STRENGTH: f64 = 8.0e-3;
/// Thickness of the top sponge layer (m).
pub const RAYLEIGH_DEPTH: f64 = 10_000.0;
/// Width of each lateral sponge layer (m).
pub const RAYLEIGH_WIDTH: f64 = 10_000.0;

const X_MIN: f64 = 0.0;
const X_MAX: f64 = 144_000.0;
const Y_MIN: f64 = -1000.0;
const Y_MAX: f64 = 1000.0;

/// Non-hydrostatic mountain wave test case on a Cartesian x–z slice.
#[derive(Clone, Debug, PartialEq)]
pub struct NonHydroMountain {
    h0: f64,
    u0: f64,
    nbar: f64,
    theta0: f64,
    hc: f64,
    ac: f64,
    xc: f64,
    rayleigh: bool,
}

impl Default for NonHydroMountain {
    fn default() -> Self {
        Self {
            h0: 30_000.0,
            u0: 10.0,
            nbar: 0.01,
            theta0: 280.0,
            hc: 1.0,
            ac: 1000.0,
            xc: 72_000.0,
            rayleigh: true,
        }
    }
}

impl NonHydroMountain {
    /// Start from the default parameters.
    pub fn builder() -> NonHydroMountainBuilder {
        NonHydroMountainBuilder {
            params: Self::default(),
        }
    }

    /// Horizontal extent of the test.
    pub fn domain(&self) -> CartesianDomain {
        CartesianDomain::new(X_MIN, X_MAX, Y_MIN, Y_MAX)
    }

    /// Single-patch grid spec covering [`domain`](Self::domain).
    pub fn grid_spec(&self, nx: usize, ny: usize, nz: usize) -> GridSpec {
        GridSpec::new(self.domain(), nx, ny, nz)
    }

    /// Uniform background wind (m/s).
    pub fn u0(&self) -> f64 {
        self.u0
    }

    /// Brunt–Väisälä frequency (1/s).
    pub fn nbar(&self) -> f64 {
        self.nbar
    }

    /// Surface potential temperature (K).
    pub fn theta0(&self) -> f64 {
        self.theta0
    }

    /// Ridge height (m).
    pub fn hc(&self) -> f64 {
        self.hc
    }

    /// Ridge half width (m).
    pub fn ac(&self) -> f64 {
        self.ac
    }

    /// Ridge center (m).
    pub fn xc(&self) -> f64 {
        self.xc
    }

    fn background(
        &self,
        c: &PhysicalConstants,
        z: f64,
        x: f64,
        y: f64,
    ) -> Result<PointState, TestCaseError> {
        let n2 = self.nbar * self.nbar;
        let theta_bar = self.theta0 * (n2 / c.g() * z).exp();

        let scale = c.g() * c.g() / (c.cp() * self.theta0 * n2);
        let exner = 1.0 + scale * ((-n2 / c.g() * z).exp() - 1.0);
        if exner <= 0.0 {
            return Err(TestCaseError::NonPhysical {
                quantity: "Exner pressure",
                z,
                x,
                y,
                value: exner,
            });
        }
        let rho = c.p0() / (c.r() * theta_bar) * exner.powf(c.cv() / c.r());

        Ok(PointState {
            u: self.u0,
            v: 0.0,
            theta: theta_bar,
            w: 0.0,
            rho,
        })
    }
}

/// `½·s·(1 + cos(π·norm))`: `s` at `norm = 0`, zero at `norm = 1`.
fn half_cosine(norm: f64) -> f64 {
    0.5 * RAYLEIGH_STRENGTH * (1.0 + (PI * norm).cos())
}

impl TestCase for NonHydroMountain {
    fn name(&self) -> &str {
        "nonhydro_mountain"
    }

    fn z_top(&self) -> f64 {
        self.h0
    }

    fn evaluate_topography(&self, _constants: &PhysicalConstants, x: f64, _y: f64) -> f64 {
        let s = (x - self.xc) / self.ac;
        self.hc / (1.0 + s * s)
    }

    fn has_rayleigh_friction(&self) -> bool {
        self.rayleigh
    }

    /// Largest of the top, right and left sponge contributions.
    ///
    /// Overlapping sponges at a corner are not summed.
    fn evaluate_rayleigh_strength(&self, z: f64, x: f64, _y: f64) -> f64 {
        let mut nu_top = 0.0;
        let mut nu_right = 0.0;
        let mut nu_left = 0.0;
        if z > self.h0 - RAYLEIGH_DEPTH {
            nu_top = half_cosine((self.h0 - z) / RAYLEIGH_DEPTH);
        }
        if x > X_MAX - RAYLEIGH_WIDTH {
            nu_right = half_cosine((X_MAX - x) / RAYLEIGH_WIDTH);
        }
        if x < X_MIN + RAYLEIGH_WIDTH {
            nu_left = half_cosine((x - X_MIN) / RAYLEIGH_WIDTH);
        }
        f64::max(nu_top, f64::max(nu_right, nu_left))
    }

    fn has_reference_state(&self) -> bool {
        true
    }

    fn evaluate_reference_state(
        &self,
        constants: &PhysicalConstants,
        z: f64,
        x: f64,
        y: f64,
    ) -> Result<PointState, TestCaseError> {
        self.background(constants, z, x, y)
    }

    fn evaluate_pointwise_state(
        &self,
        constants: &PhysicalConstants,
        _time: SimTime,
        z: f64,
        x: f64,
        y: f64,
        _tracers: &mut [f64],
    ) -> Result<PointState, TestCaseError> {
        self.background(constants, z, x, y)
    }
}

/// Builder for [`NonHydroMountain`] with validated parameters.
#[derive(Clone, Debug)]
pub struct NonHydroMountainBuilder {
    params: NonHydroMountain,
}

impl NonHydroMountainBuilder {
    /// Model top (m).
    pub fn h0(mut self, value: f64) -> Self {
        self.params.h0 = value;
        self
    }

    /// Uniform background wind (m/s).
    pub fn u0(mut self, value: f64) -> Self {
        self.params.u0 = value;
        self
    }

    /// Brunt–Väisälä frequency (1/s).
    pub fn nbar(mut self, value: f64) -> Self {
        self.params.nbar = value;
        self
    }

    /// Surface potential temperature (K).
    pub fn theta0(mut self, value: f64) -> Self {
        self.params.theta0 = value;
        self
    }

    /// Ridge height (m).
    pub fn hc(mut self, value: f64) -> Self {
        self.params.hc = value;
        self
    }

    /// Ridge half width (m).
    pub fn ac(mut self, value: f64) -> Self {
        self.params.ac = value;
        self
    }

    /// Ridge center (m).
    pub fn xc(mut self, value: f64) -> Self {
        self.params.xc = value;
        self
    }

    /// Enable or disable the sponge layers.
    pub fn rayleigh(mut self, enabled: bool) -> Self {
        self.params.rayleigh = enabled;
        self
    }

    /// Validate and build.
    pub fn build(self) -> Result<NonHydroMountain, TestCaseError> {
        let p = self.params;
        let positive = [
            ("h0", p.h0),
            ("nbar", p.nbar),
            ("theta0", p.theta0),
            ("ac", p.ac),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(TestCaseError::InvalidParameter { name, value });
            }
        }
        for (name, value) in [("u0", p.u0), ("xc", p.xc)] {
            if !value.is_finite() {
                return Err(TestCaseError::InvalidParameter { name, value });
            }
        }
        if !(p.hc.is_finite() && p.hc >= 0.0 && p.hc < p.h0) {
            return Err(TestCaseError::InvalidParameter {
                name: "hc",
                value: p.hc,
            });
        }
        Ok(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn ridge_profile() {
        let tc = NonHydroMountain::default();
        let c = PhysicalConstants::default();
        assert_relative_eq!(tc.evaluate_topography(&c, 72_000.0, 0.0), 1.0);
        assert_relative_eq!(tc.evaluate_topography(&c, 73_000.0, 0.0), 0.5);
        assert_relative_eq!(tc.evaluate_topography(&c, 71_000.0, 500.0), 0.5);
    }

    #[test]
    fn surface_state_uses_reference_values() {
        let tc = NonHydroMountain::default();
        let c = PhysicalConstants::default();
        let s = tc.evaluate_reference_state(&c, 0.0, 0.0, 0.0).unwrap();
        assert_relative_eq!(s.theta, 280.0);
        assert_relative_eq!(s.rho, 100_000.0 / (287.0 * 280.0));
        assert_eq!((s.u, s.v, s.w), (10.0, 0.0, 0.0));
    }

    #[test]
    fn exner_vanishes_above_the_valid_column() {
        let tc = NonHydroMountain::default();
        let c = PhysicalConstants::default();
        let err = tc.evaluate_reference_state(&c, 40_000.0, 0.0, 0.0).unwrap_err();
        assert!(matches!(
            err,
            TestCaseError::NonPhysical {
                quantity: "Exner pressure",
                ..
            }
        ));
    }

    #[test]
    fn builder_rejects_bad_parameters() {
        let err = NonHydroMountain::builder().nbar(0.0).build().unwrap_err();
        assert_eq!(
            err,
            TestCaseError::InvalidParameter {
                name: "nbar",
                value: 0.0
            }
        );
        assert!(NonHydroMountain::builder().hc(40_000.0).build().is_err());
        assert!(NonHydroMountain::builder().u0(f64::NAN).build().is_err());
        let tc = NonHydroMountain::builder()
            .hc(400.0)
            .rayleigh(false)
            .build()
            .unwrap();
        assert_eq!(tc.hc(), 400.0);
        assert!(!tc.has_rayleigh_friction());
    }

    #[test]
    fn grid_spec_covers_domain() {
        let tc = NonHydroMountain::default();
        let spec = tc.grid_spec(40, 1, 40);
        assert!(spec.validate().is_ok());
        assert_relative_eq!(spec.dx(), 3600.0);
        assert_eq!(tc.z_top(), 30_000.0);
    }
}
