//! Cartesian grid specification and its decomposition into patches.

use crate::error::GridError;
use crate::patch_box::PatchBox;

/// Horizontal extent of a Cartesian domain, in meters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CartesianDomain {
    /// Lower bound along x (A axis).
    pub x_min: f64,
    /// Upper bound along x.
    pub x_max: f64,
    /// Lower bound along y (B axis).
    pub y_min: f64,
    /// Upper bound along y.
    pub y_max: f64,
}

impl CartesianDomain {
    /// Create a domain from its bounds.
    pub fn new(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Self {
        Self {
            x_min,
            x_max,
            y_min,
            y_max,
        }
    }

    /// Width along x.
    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    /// Depth along y.
    pub fn depth(&self) -> f64 {
        self.y_max - self.y_min
    }
}

/// Resolution and decomposition of a Cartesian grid.
///
/// Nodes sit at cell centers: node `n` along x is at
/// `x_min + (n + ½)·dx`. Halo nodes continue that spacing past the
/// domain edge.
#[derive(Clone, Debug, PartialEq)]
pub struct GridSpec {
    /// Horizontal extent.
    pub domain: CartesianDomain,
    /// Global interior node count along x.
    pub nx: usize,
    /// Global interior node count along y.
    pub ny: usize,
    /// Vertical cell count per column.
    pub nz: usize,
    /// Patch count along x.
    pub patches_x: usize,
    /// Patch count along y.
    pub patches_y: usize,
    /// Halo width of every patch.
    pub halo: usize,
}

impl GridSpec {
    /// A single-patch grid with a one-node halo.
    pub fn new(domain: CartesianDomain, nx: usize, ny: usize, nz: usize) -> Self {
        Self {
            domain,
            nx,
            ny,
            nz,
            patches_x: 1,
            patches_y: 1,
            halo: 1,
        }
    }

    /// Set the patch decomposition.
    pub fn with_patches(mut self, patches_x: usize, patches_y: usize) -> Self {
        self.patches_x = patches_x;
        self.patches_y = patches_y;
        self
    }

    /// Set the halo width.
    pub fn with_halo(mut self, halo: usize) -> Self {
        self.halo = halo;
        self
    }

    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), GridError> {
        let invalid = |reason: String| Err(GridError::InvalidSpec { reason });
        if self.nx == 0 || self.ny == 0 || self.nz == 0 {
            return invalid(format!(
                "node counts must be positive, got nx={} ny={} nz={}",
                self.nx, self.ny, self.nz
            ));
        }
        if self.patches_x == 0 || self.patches_y == 0 {
            return invalid("patch counts must be positive".into());
        }
        if self.patches_x > self.nx || self.patches_y > self.ny {
            return invalid(format!(
                "{}x{} patches cannot tile {}x{} nodes",
                self.patches_x, self.patches_y, self.nx, self.ny
            ));
        }
        let d = &self.domain;
        let bounds = [d.x_min, d.x_max, d.y_min, d.y_max];
        if bounds.iter().any(|v| !v.is_finite()) || d.width() <= 0.0 || d.depth() <= 0.0 {
            return invalid(format!("degenerate domain {d:?}"));
        }
        Ok(())
    }

    /// Node spacing along x.
    pub fn dx(&self) -> f64 {
        self.domain.width() / self.nx as f64
    }

    /// Node spacing along y.
    pub fn dy(&self) -> f64 {
        self.domain.depth() / self.ny as f64
    }

    /// x coordinate of global node `n` (may be outside the domain for halo nodes).
    pub fn node_x(&self, n: isize) -> f64 {
        self.domain.x_min + (n as f64 + 0.5) * self.dx()
    }

    /// y coordinate of global node `n` (may be outside the domain for halo nodes).
    pub fn node_y(&self, n: isize) -> f64 {
        self.domain.y_min + (n as f64 + 0.5) * self.dy()
    }

    /// Patch boxes in patch-index order (x fastest, then y).
    ///
    /// Nodes are split as evenly as possible; the first `n % p` patches
    /// along an axis get one extra node.
    pub fn patch_boxes(&self) -> Vec<PatchBox> {
        let xs = split_axis(self.nx, self.patches_x);
        let ys = split_axis(self.ny, self.patches_y);
        let mut boxes = Vec::with_capacity(xs.len() * ys.len());
        for &(b_begin, b_count) in &ys {
            for &(a_begin, a_count) in &xs {
                boxes.push(PatchBox::new(a_begin, a_count, b_begin, b_count, self.halo));
            }
        }
        boxes
    }
}

/// `(begin, count)` for each of `parts` chunks of `n` nodes.
fn split_axis(n: usize, parts: usize) -> Vec<(usize, usize)> {
    let base = n / parts;
    let extra = n % parts;
    let mut begin = 0;
    (0..parts)
        .map(|p| {
            let count = base + usize::from(p < extra);
            let chunk = (begin, count);
            begin += count;
            chunk
        })
        .collect()
}
