//! Analytic error norms.
//!
//! For each dynamical component the model state `q` is compared with the
//! test case's analytic solution `a` over all interior nodes:
//!
//! ```text
//! L1  = Σ|q − a| / Σ|a|
//! L2  = sqrt(Σ(q − a)² / Σa²)
//! L∞  = max|q − a| / max|a|
//! ```
//!
//! When the analytic field is identically zero the denominators are
//! dropped and the norms are absolute (L1 and L2 then average over the
//! node count).

use squall_core::StateComponent;

/// Error norms of one component.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ComponentNorms {
    /// L1 norm.
    pub l1: f64,
    /// L2 norm.
    pub l2: f64,
    /// L∞ norm.
    pub linf: f64,
    /// Whether the norms are relative to the analytic field.
    pub relative: bool,
}

/// Error norms of every dynamical component, in storage order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ErrorNorms {
    components: [ComponentNorms; StateComponent::COUNT],
}

impl ErrorNorms {
    /// Norms of one component.
    pub fn get(&self, component: StateComponent) -> &ComponentNorms {
        &self.components[component.index()]
    }

    /// `(component, norms)` pairs in storage order.
    pub fn iter(&self) -> impl Iterator<Item = (StateComponent, &ComponentNorms)> {
        StateComponent::ALL.into_iter().zip(self.components.iter())
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct Sums {
    diff_abs: f64,
    diff_sq: f64,
    diff_max: f64,
    exact_abs: f64,
    exact_sq: f64,
    exact_max: f64,
}

/// Running sums for [`ErrorNorms`].
#[derive(Clone, Debug, Default)]
pub(crate) struct NormAccumulator {
    sums: [Sums; StateComponent::COUNT],
    count: usize,
}

impl NormAccumulator {
    /// Add one node: model values and analytic values in storage order.
    pub(crate) fn add(
        &mut self,
        model: [f64; StateComponent::COUNT],
        exact: [f64; StateComponent::COUNT],
    ) {
        for ((s, q), a) in self.sums.iter_mut().zip(model).zip(exact) {
            let d = (q - a).abs();
            s.diff_abs += d;
            s.diff_sq += d * d;
            s.diff_max = s.diff_max.max(d);
            s.exact_abs += a.abs();
            s.exact_sq += a * a;
            s.exact_max = s.exact_max.max(a.abs());
        }
        self.count += 1;
    }

    pub(crate) fn finish(&self) -> ErrorNorms {
        let n = self.count.max(1) as f64;
        let mut components = [ComponentNorms::default(); StateComponent::COUNT];
        for (out, s) in components.iter_mut().zip(&self.sums) {
            *out = if s.exact_max > 0.0 {
                ComponentNorms {
                    l1: s.diff_abs / s.exact_abs,
                    l2: (s.diff_sq / s.exact_sq).sqrt(),
                    linf: s.diff_max / s.exact_max,
                    relative: true,
                }
            } else {
                ComponentNorms {
                    l1: s.diff_abs / n,
                    l2: (s.diff_sq / n).sqrt(),
                    linf: s.diff_max,
                    relative: false,
                }
            };
        }
        ErrorNorms { components }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const U: usize = StateComponent::U.index();
    const RHO: usize = StateComponent::Rho.index();

    #[test]
    fn exact_match_has_zero_norms() {
        let mut acc = NormAccumulator::default();
        acc.add([1.0, 0.0, 300.0, 0.0, 1.2], [1.0, 0.0, 300.0, 0.0, 1.2]);
        let norms = acc.finish();
        for (_, n) in norms.iter() {
            assert_eq!((n.l1, n.l2, n.linf), (0.0, 0.0, 0.0));
        }
        assert!(norms.get(StateComponent::Rho).relative);
        assert!(!norms.get(StateComponent::W).relative);
    }

    #[test]
    fn relative_and_absolute_norms() {
        let mut acc = NormAccumulator::default();
        let mut model = [0.0; StateComponent::COUNT];
        let mut exact = [0.0; StateComponent::COUNT];
        // ρ: exact 1, 2; model 1.1, 2.0.
        exact[RHO] = 1.0;
        model[RHO] = 1.1;
        model[U] = 3.0;
        acc.add(model, exact);
        exact[RHO] = 2.0;
        model[RHO] = 2.0;
        model[U] = -1.0;
        acc.add(model, exact);
        let norms = acc.finish();

        let rho = norms.get(StateComponent::Rho);
        assert_relative_eq!(rho.l1, 0.1 / 3.0, max_relative = 1e-12);
        assert_relative_eq!(rho.l2, (0.01f64 / 5.0).sqrt(), max_relative = 1e-12);
        assert_relative_eq!(rho.linf, 0.05, max_relative = 1e-12);

        let u = norms.get(StateComponent::U);
        assert!(!u.relative);
        assert_relative_eq!(u.l1, 2.0);
        assert_relative_eq!(u.l2, 5.0f64.sqrt());
        assert_relative_eq!(u.linf, 3.0);
    }

    proptest::proptest! {
        #[test]
        fn absolute_norms_are_ordered(
            values in proptest::collection::vec(-50.0f64..50.0, 1..40),
        ) {
            let mut acc = NormAccumulator::default();
            for &v in &values {
                let mut model = [0.0; StateComponent::COUNT];
                model[U] = v;
                acc.add(model, [0.0; StateComponent::COUNT]);
            }
            let u = *acc.finish().get(StateComponent::U);
            proptest::prop_assert!(!u.relative);
            proptest::prop_assert!(u.l1 <= u.l2 * (1.0 + 1e-12));
            proptest::prop_assert!(u.l2 <= u.linf * (1.0 + 1e-12));
        }
    }
}
