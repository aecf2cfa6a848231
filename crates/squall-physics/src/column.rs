//! Column scratch buffers exchanged with microphysics kernels.

/// One vertical column in kernel units.
///
/// All vectors have the same length `nz`, index 0 at the bottom. The
/// kernel may change `temperature`, the three mixing ratios and
/// `density`; `pk` and `height` are inputs only.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct KesslerColumn {
    /// Potential temperature Θ (K) as stored at grid nodes.
    pub temperature: Vec<f64>,
    /// Water vapor mixing ratio (kg/kg).
    pub vapor: Vec<f64>,
    /// Cloud water mixing ratio (kg/kg).
    pub cloud: Vec<f64>,
    /// Rain water mixing ratio (kg/kg).
    pub rain: Vec<f64>,
    /// Dry-air density (kg/m³).
    pub density: Vec<f64>,
    /// Ratio of potential to absolute temperature, `Θ / T`.
    pub pk: Vec<f64>,
    /// Geometric height of each level (m).
    pub height: Vec<f64>,
    /// Time step the kernel should integrate over (s).
    pub dt: f64,
}

impl KesslerColumn {
    /// Zero-filled column with `nz` levels.
    pub fn new(nz: usize) -> Self {
        Self {
            temperature: vec![0.0; nz],
            vapor: vec![0.0; nz],
            cloud: vec![0.0; nz],
            rain: vec![0.0; nz],
            density: vec![0.0; nz],
            pk: vec![0.0; nz],
            height: vec![0.0; nz],
            dt: 0.0,
        }
    }

    /// Number of levels.
    pub fn len(&self) -> usize {
        self.temperature.len()
    }

    /// Whether the column has no levels.
    pub fn is_empty(&self) -> bool {
        self.temperature.is_empty()
    }
}
