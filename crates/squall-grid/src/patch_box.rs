//! Index bounds of a patch: interior plus halo.

/// Interior and halo index ranges of one patch along the two horizontal axes.
///
/// Local indices run over `[0, a_total) × [0, b_total)`. The interior is
/// `[a_interior_begin, a_interior_end) × [b_interior_begin, b_interior_end)`;
/// everything else is halo and must not be written by workflow processes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PatchBox {
    halo: usize,
    a_global_begin: usize,
    b_global_begin: usize,
    a_interior: usize,
    b_interior: usize,
}

impl PatchBox {
    /// Create a box with `a_interior × b_interior` interior nodes whose first
    /// interior node sits at global index `(a_global_begin, b_global_begin)`.
    pub fn new(
        a_global_begin: usize,
        a_interior: usize,
        b_global_begin: usize,
        b_interior: usize,
        halo: usize,
    ) -> Self {
        Self {
            halo,
            a_global_begin,
            b_global_begin,
            a_interior,
            b_interior,
        }
    }

    /// Halo width on every side.
    pub fn halo(&self) -> usize {
        self.halo
    }

    /// Total local extent along A, halo included.
    pub fn a_total(&self) -> usize {
        self.a_interior + 2 * self.halo
    }

    /// Total local extent along B, halo included.
    pub fn b_total(&self) -> usize {
        self.b_interior + 2 * self.halo
    }

    /// First interior index along A.
    pub fn a_interior_begin(&self) -> usize {
        self.halo
    }

    /// One past the last interior index along A.
    pub fn a_interior_end(&self) -> usize {
        self.halo + self.a_interior
    }

    /// First interior index along B.
    pub fn b_interior_begin(&self) -> usize {
        self.halo
    }

    /// One past the last interior index along B.
    pub fn b_interior_end(&self) -> usize {
        self.halo + self.b_interior
    }

    /// Number of interior nodes along A.
    pub fn a_interior_count(&self) -> usize {
        self.a_interior
    }

    /// Number of interior nodes along B.
    pub fn b_interior_count(&self) -> usize {
        self.b_interior
    }

    /// Number of interior columns.
    pub fn interior_column_count(&self) -> usize {
        self.a_interior * self.b_interior
    }

    /// Whether local `(i, j)` lies in the interior.
    pub fn is_interior(&self, i: usize, j: usize) -> bool {
        (self.a_interior_begin()..self.a_interior_end()).contains(&i)
            && (self.b_interior_begin()..self.b_interior_end()).contains(&j)
    }

    /// Global node index along A for local index `i` (negative in the low halo).
    pub fn global_a(&self, i: usize) -> isize {
        self.a_global_begin as isize + i as isize - self.halo as isize
    }

    /// Global node index along B for local index `j` (negative in the low halo).
    pub fn global_b(&self, j: usize) -> isize {
        self.b_global_begin as isize + j as isize - self.halo as isize
    }

    /// Interior columns in row-major order.
    pub fn interior_columns(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let (b0, b1) = (self.b_interior_begin(), self.b_interior_end());
        (self.a_interior_begin()..self.a_interior_end())
            .flat_map(move |i| (b0..b1).map(move |j| (i, j)))
    }

    /// Halo columns in row-major order.
    pub fn halo_columns(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let b_total = self.b_total();
        (0..self.a_total())
            .flat_map(move |i| (0..b_total).map(move |j| (i, j)))
            .filter(move |&(i, j)| !self.is_interior(i, j))
    }
}
