//! The [`TestCase`] contract.

use squall_core::{PhysicalConstants, PointState, SimTime, TestCaseError};

/// Analytic initial and boundary data for a model run.
///
/// A test case is a stateless evaluator: everything it needs is fixed at
/// construction, and every method is a pure function of its arguments.
/// The model calls it once while populating the grid and again, when
/// asked, to compute error norms against the analytic solution.
///
/// # Contract
///
/// - `evaluate_topography` depends on horizontal position only.
/// - `evaluate_rayleigh_strength` is non-negative everywhere.
/// - When a test case is built as a perturbation of a balanced
///   background, `evaluate_reference_state` and the non-velocity
///   components of `evaluate_pointwise_state` at `t = 0` agree.
///
/// # Examples
///
/// ```
/// use squall_core::{PhysicalConstants, PointState, SimTime, TestCaseError};
/// use squall_testcase::TestCase;
///
/// struct Resting;
///
/// impl TestCase for Resting {
///     fn name(&self) -> &str { "resting" }
///     fn z_top(&self) -> f64 { 10_000.0 }
///     fn evaluate_topography(&self, _: &PhysicalConstants, _x: f64, _y: f64) -> f64 {
///         0.0
///     }
///     fn evaluate_pointwise_state(
///         &self,
///         _: &PhysicalConstants,
///         _time: SimTime,
///         _z: f64,
///         _x: f64,
///         _y: f64,
///         _tracers: &mut [f64],
///     ) -> Result<PointState, TestCaseError> {
///         Ok(PointState { theta: 300.0, rho: 1.2, ..PointState::default() })
///     }
/// }
///
/// let tc = Resting;
/// assert_eq!(tc.tracer_count(), 0);
/// assert!(!tc.has_reference_state());
/// ```
pub trait TestCase: Send + Sync {
    /// Human-readable name for error reporting.
    fn name(&self) -> &str;

    /// Number of tracer species this test case fills.
    ///
    /// Default: 0.
    fn tracer_count(&self) -> usize {
        0
    }

    /// Top of the physical domain (m).
    fn z_top(&self) -> f64;

    /// Adjust the ambient physical constants for this test's regime.
    ///
    /// Default: identity.
    fn evaluate_physical_constants(&self, constants: PhysicalConstants) -> PhysicalConstants {
        constants
    }

    /// Surface height at a horizontal point (m).
    fn evaluate_topography(&self, constants: &PhysicalConstants, x: f64, y: f64) -> f64;

    /// Whether a sponge-layer damping field is supplied.
    ///
    /// Default: `false`.
    fn has_rayleigh_friction(&self) -> bool {
        false
    }

    /// Damping rate at a point (1/s). Only meaningful when
    /// [`has_rayleigh_friction`](Self::has_rayleigh_friction) is true.
    ///
    /// Default: 0.
    fn evaluate_rayleigh_strength(&self, _z: f64, _x: f64, _y: f64) -> f64 {
        0.0
    }

    /// Whether a balanced background state is supplied.
    ///
    /// Default: `false`.
    fn has_reference_state(&self) -> bool {
        false
    }

    /// Balanced background state at a point.
    ///
    /// Default: [`TestCaseError::NoReferenceState`].
    fn evaluate_reference_state(
        &self,
        _constants: &PhysicalConstants,
        _z: f64,
        _x: f64,
        _y: f64,
    ) -> Result<PointState, TestCaseError> {
        Err(TestCaseError::NoReferenceState)
    }

    /// Full analytic state at a point and time.
    ///
    /// `tracers` has [`tracer_count`](Self::tracer_count) entries and
    /// receives density-weighted tracer values.
    fn evaluate_pointwise_state(
        &self,
        constants: &PhysicalConstants,
        time: SimTime,
        z: f64,
        x: f64,
        y: f64,
        tracers: &mut [f64],
    ) -> Result<PointState, TestCaseError>;
}
