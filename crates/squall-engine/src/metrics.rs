//! Per-step performance metrics for the model.

use squall_core::SimTime;

/// Timing collected during a single model step.
///
/// All durations are wall-clock microseconds. [`Model::step`] returns
/// one of these and keeps a copy available through
/// [`Model::last_metrics`].
///
/// [`Model::step`]: crate::Model::step
/// [`Model::last_metrics`]: crate::Model::last_metrics
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StepMetrics {
    /// Model time at the end of the step.
    pub time: SimTime,
    /// Wall-clock time for the entire step.
    pub total_us: u64,
    /// Time spent in the dynamics collaborator.
    pub dynamics_us: u64,
    /// Per-process execution times `(name, microseconds)`, in the order
    /// the processes ran. Only processes that were due appear.
    pub process_us: Vec<(String, u64)>,
}

impl StepMetrics {
    /// Names of the processes that ran this step, in order.
    pub fn processes_performed(&self) -> impl Iterator<Item = &str> {
        self.process_us.iter().map(|(name, _)| name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_metrics_are_zero() {
        let m = StepMetrics::default();
        assert_eq!(m.time, SimTime::ZERO);
        assert_eq!(m.total_us, 0);
        assert_eq!(m.dynamics_us, 0);
        assert!(m.process_us.is_empty());
    }

    #[test]
    fn performed_names_follow_run_order() {
        let m = StepMetrics {
            process_us: vec![("kessler".into(), 40), ("rayleigh_friction".into(), 5)],
            ..StepMetrics::default()
        };
        assert_eq!(
            m.processes_performed().collect::<Vec<_>>(),
            ["kessler", "rayleigh_friction"]
        );
    }
}
