//! Exact simulation time.
//!
//! Time is counted in whole microseconds so that schedule comparisons are
//! exact integer equalities. Floating-point seconds are only produced at
//! the edges (kernel time steps, damping rates).

use std::fmt;
use std::ops::{Add, AddAssign};

/// Microseconds in one second.
pub const MICROS_PER_SECOND: u64 = 1_000_000;

fn micros_from_seconds(seconds: f64) -> Option<u64> {
    if !seconds.is_finite() || seconds < 0.0 {
        return None;
    }
    let micros = (seconds * MICROS_PER_SECOND as f64).round();
    if micros > u64::MAX as f64 {
        return None;
    }
    Some(micros as u64)
}

fn write_seconds(f: &mut fmt::Formatter<'_>, micros: u64) -> fmt::Result {
    let whole = micros / MICROS_PER_SECOND;
    let frac = micros % MICROS_PER_SECOND;
    if frac == 0 {
        write!(f, "{whole}s")
    } else {
        let digits = format!("{frac:06}");
        write!(f, "{whole}.{}s", digits.trim_end_matches('0'))
    }
}

/// An instant on the simulation clock, in microseconds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SimTime(pub u64);

impl SimTime {
    /// The start of the clock.
    pub const ZERO: SimTime = SimTime(0);

    /// Construct from whole microseconds.
    pub const fn from_micros(micros: u64) -> Self {
        Self(micros)
    }

    /// Construct from seconds, rounded to the nearest microsecond.
    ///
    /// Returns `None` for negative, non-finite or out-of-range input.
    pub fn from_seconds(seconds: f64) -> Option<Self> {
        micros_from_seconds(seconds).map(Self)
    }

    /// Whole microseconds since the clock origin.
    pub const fn as_micros(self) -> u64 {
        self.0
    }

    /// Seconds since the clock origin.
    pub fn as_seconds(self) -> f64 {
        self.0 as f64 / MICROS_PER_SECOND as f64
    }

    /// `self + span`, or `None` on overflow.
    pub fn checked_add(self, span: TimeSpan) -> Option<Self> {
        self.0.checked_add(span.0).map(Self)
    }

    /// Span elapsed since `earlier`, or `None` if `earlier` is later than `self`.
    pub fn since(self, earlier: SimTime) -> Option<TimeSpan> {
        self.0.checked_sub(earlier.0).map(TimeSpan)
    }
}

impl Add<TimeSpan> for SimTime {
    type Output = SimTime;

    fn add(self, rhs: TimeSpan) -> SimTime {
        SimTime(self.0 + rhs.0)
    }
}

impl AddAssign<TimeSpan> for SimTime {
    fn add_assign(&mut self, rhs: TimeSpan) {
        self.0 += rhs.0;
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_seconds(f, self.0)
    }
}

impl From<u64> for SimTime {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// A length of simulation time, in microseconds.
///
/// Used for the global step and for process invocation frequencies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimeSpan(pub u64);

impl TimeSpan {
    /// The empty span.
    pub const ZERO: TimeSpan = TimeSpan(0);

    /// Construct from whole microseconds.
    pub const fn from_micros(micros: u64) -> Self {
        Self(micros)
    }

    /// Construct from whole seconds.
    pub const fn from_secs(secs: u64) -> Self {
        Self(secs * MICROS_PER_SECOND)
    }

    /// Construct from seconds, rounded to the nearest microsecond.
    ///
    /// Returns `None` for negative, non-finite or out-of-range input.
    pub fn from_seconds(seconds: f64) -> Option<Self> {
        micros_from_seconds(seconds).map(Self)
    }

    /// Whole microseconds.
    pub const fn as_micros(self) -> u64 {
        self.0
    }

    /// Length in seconds.
    pub fn as_seconds(self) -> f64 {
        self.0 as f64 / MICROS_PER_SECOND as f64
    }

    /// Returns `true` for the empty span.
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Whether `self` is an exact whole multiple of `other`.
    ///
    /// Always `false` when `other` is zero.
    pub fn is_multiple_of(self, other: TimeSpan) -> bool {
        other.0 != 0 && self.0.is_multiple_of(other.0)
    }

    /// `self * n`, or `None` on overflow.
    pub fn checked_mul(self, n: u64) -> Option<Self> {
        self.0.checked_mul(n).map(Self)
    }
}

impl fmt::Display for TimeSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_seconds(f, self.0)
    }
}

impl From<u64> for TimeSpan {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seconds_round_to_micros() {
        assert_eq!(TimeSpan::from_seconds(0.1), Some(TimeSpan(100_000)));
        assert_eq!(SimTime::from_seconds(1.0000004), Some(SimTime(1_000_000)));
        assert_eq!(TimeSpan::from_seconds(-1.0), None);
        assert_eq!(TimeSpan::from_seconds(f64::NAN), None);
    }

    #[test]
    fn since_is_checked() {
        let a = SimTime::from_micros(10);
        let b = SimTime::from_micros(25);
        assert_eq!(b.since(a), Some(TimeSpan(15)));
        assert_eq!(a.since(b), None);
    }

    #[test]
    fn multiples() {
        let step = TimeSpan::from_micros(100);
        assert!(TimeSpan::from_micros(300).is_multiple_of(step));
        assert!(!TimeSpan::from_micros(250).is_multiple_of(step));
        assert!(!step.is_multiple_of(TimeSpan::ZERO));
    }

    #[test]
    fn display_trims_fraction() {
        assert_eq!(SimTime::from_micros(12_500_000).to_string(), "12.5s");
        assert_eq!(TimeSpan::from_secs(300).to_string(), "300s");
        assert_eq!(TimeSpan::from_micros(1).to_string(), "0.000001s");
    }

    #[test]
    fn add_span() {
        let mut t = SimTime::ZERO + TimeSpan::from_secs(2);
        t += TimeSpan::from_micros(5);
        assert_eq!(t, SimTime(2_000_005));
        assert_eq!(SimTime(u64::MAX).checked_add(TimeSpan(1)), None);
    }

    proptest::proptest! {
        #[test]
        fn since_undoes_add(start in 0u64..1 << 40, span in 0u64..1 << 40) {
            let t = SimTime::from_micros(start);
            let s = TimeSpan::from_micros(span);
            proptest::prop_assert_eq!((t + s).since(t), Some(s));
        }

        #[test]
        fn scaled_spans_are_multiples(base in 1u64..1_000_000, n in 0u64..10_000) {
            let step = TimeSpan::from_micros(base);
            let span = step.checked_mul(n).unwrap();
            proptest::prop_assert!(span.is_multiple_of(step));
            let off_by_one = TimeSpan::from_micros(span.as_micros() + 1);
            proptest::prop_assert_eq!(off_by_one.is_multiple_of(step), base == 1);
        }
    }
}
