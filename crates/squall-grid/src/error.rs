//! Error types for grid construction and field installation.

use std::fmt;

/// Errors arising from grid construction or whole-field installation.
#[derive(Debug, Clone, PartialEq)]
pub enum GridError {
    /// The grid specification is structurally invalid.
    InvalidSpec {
        /// What went wrong.
        reason: String,
    },
    /// Surface height reaches or exceeds the model top.
    TopographyAboveTop {
        /// First horizontal coordinate (m).
        x: f64,
        /// Second horizontal coordinate (m).
        y: f64,
        /// Surface height at that point (m).
        height: f64,
        /// Model top (m).
        z_top: f64,
    },
    /// An installed field does not match the patch's array shape.
    ShapeMismatch {
        /// Name of the field being installed.
        field: &'static str,
        /// Expected shape.
        expected: Vec<usize>,
        /// Provided shape.
        actual: Vec<usize>,
    },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSpec { reason } => write!(f, "invalid grid spec: {reason}"),
            Self::TopographyAboveTop {
                x,
                y,
                height,
                z_top,
            } => write!(
                f,
                "topography {height} m at (x={x}, y={y}) is not below model top {z_top} m"
            ),
            Self::ShapeMismatch {
                field,
                expected,
                actual,
            } => write!(
                f,
                "field '{field}' has shape {actual:?}, expected {expected:?}"
            ),
        }
    }
}

impl std::error::Error for GridError {}
