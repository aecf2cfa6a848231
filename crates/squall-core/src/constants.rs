//! Physical constants and the thermodynamic relations derived from them.
//!
//! A [`PhysicalConstants`] value is built once before the run (test cases
//! may override individual constants through
//! `TestCase::evaluate_physical_constants`) and then passed by shared
//! reference into every evaluator and process. Nothing reads constants
//! from global state.

/// Immutable bag of physical constants for a run.
///
/// Defaults are Earth values in SI units.
#[derive(Clone, Debug, PartialEq)]
pub struct PhysicalConstants {
    earth_radius: f64,
    g: f64,
    omega: f64,
    r: f64,
    cp: f64,
    cv: f64,
    p0: f64,
}

impl Default for PhysicalConstants {
    fn default() -> Self {
        Self {
            earth_radius: 6.37122e6,
            g: 9.80616,
            omega: 7.29212e-5,
            r: 287.0,
            cp: 1004.5,
            cv: 717.5,
            p0: 100_000.0,
        }
    }
}

impl PhysicalConstants {
    /// Planetary radius `a` (m).
    pub fn earth_radius(&self) -> f64 {
        self.earth_radius
    }

    /// Gravitational acceleration `g` (m/s²).
    pub fn g(&self) -> f64 {
        self.g
    }

    /// Planetary rotation rate `Ω` (1/s).
    pub fn omega(&self) -> f64 {
        self.omega
    }

    /// Dry-air gas constant `R` (J/kg/K).
    pub fn r(&self) -> f64 {
        self.r
    }

    /// Specific heat at constant pressure `cp` (J/kg/K).
    pub fn cp(&self) -> f64 {
        self.cp
    }

    /// Specific heat at constant volume `cv` (J/kg/K).
    pub fn cv(&self) -> f64 {
        self.cv
    }

    /// Reference surface pressure `P0` (Pa).
    pub fn p0(&self) -> f64 {
        self.p0
    }

    /// `R / cp`.
    pub fn kappa(&self) -> f64 {
        self.r / self.cp
    }

    /// Override the planetary radius.
    pub fn with_earth_radius(mut self, value: f64) -> Self {
        self.earth_radius = value;
        self
    }

    /// Override gravitational acceleration.
    pub fn with_g(mut self, value: f64) -> Self {
        self.g = value;
        self
    }

    /// Override the rotation rate.
    pub fn with_omega(mut self, value: f64) -> Self {
        self.omega = value;
        self
    }

    /// Override the dry-air gas constant.
    pub fn with_r(mut self, value: f64) -> Self {
        self.r = value;
        self
    }

    /// Override `cp`.
    pub fn with_cp(mut self, value: f64) -> Self {
        self.cp = value;
        self
    }

    /// Override `cv`.
    pub fn with_cv(mut self, value: f64) -> Self {
        self.cv = value;
        self
    }

    /// Override the reference pressure.
    pub fn with_p0(mut self, value: f64) -> Self {
        self.p0 = value;
        self
    }

    /// Pressure from density-weighted potential temperature:
    /// `P0 · (R·ρθ / P0)^(cp/cv)`.
    pub fn pressure_from_rho_theta(&self, rho_theta: f64) -> f64 {
        self.p0 * (self.r * rho_theta / self.p0).powf(self.cp / self.cv)
    }

    /// Inverse of [`pressure_from_rho_theta`](Self::pressure_from_rho_theta).
    pub fn rho_theta_from_pressure(&self, pressure: f64) -> f64 {
        self.p0 / self.r * (pressure / self.p0).powf(self.cv / self.cp)
    }

    /// Exner function `(P / P0)^(R/cp)`.
    pub fn exner_from_pressure(&self, pressure: f64) -> f64 {
        (pressure / self.p0).powf(self.kappa())
    }

    /// Ideal-gas temperature `P / (ρ·R)`.
    pub fn temperature_from_pressure_rho(&self, pressure: f64, rho: f64) -> f64 {
        pressure / (rho * self.r)
    }
}
