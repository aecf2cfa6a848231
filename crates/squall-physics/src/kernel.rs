//! The column kernel boundary.

use std::error::Error;
use std::fmt;

use squall_core::ProcessError;

use crate::column::KesslerColumn;

/// A kernel failure. No part of the column is usable afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct KernelError {
    /// What went wrong.
    pub reason: String,
}

impl KernelError {
    /// Create an error from a description.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for KernelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason)
    }
}

impl Error for KernelError {}

impl From<KernelError> for ProcessError {
    fn from(e: KernelError) -> Self {
        ProcessError::KernelFailed { reason: e.reason }
    }
}

/// A column microphysics routine.
///
/// `apply` must be a deterministic function of the column: it reads every
/// array, may overwrite `temperature`, `vapor`, `cloud`, `rain` and
/// `density` in place, and returns the surface precipitation rate (m/s)
/// over the call. It touches nothing outside the column, so one kernel
/// can be shared across threads.
pub trait ColumnKernel: Send + Sync {
    /// Human-readable name for error reporting.
    fn name(&self) -> &str;

    /// Smallest column this kernel accepts.
    ///
    /// Default: 1.
    fn min_levels(&self) -> usize {
        1
    }

    /// Advance one column in place.
    fn apply(&self, column: &mut KesslerColumn) -> Result<f64, KernelError>;
}

/// Returns the column unchanged with zero precipitation.
#[derive(Clone, Copy, Debug, Default)]
pub struct IdentityKernel;

impl ColumnKernel for IdentityKernel {
    fn name(&self) -> &str {
        "identity"
    }

    fn apply(&self, _column: &mut KesslerColumn) -> Result<f64, KernelError> {
        Ok(0.0)
    }
}
