//! Native Kessler (1969) warm-rain microphysics.
//!
//! Follows the Klemp–Wilhelmson (1978) formulation used by the DCMIP
//! test suite: autoconversion and accretion, saturation adjustment, rain
//! evaporation, and upstream sedimentation subcycled under a CFL limit.
//!
//! The column's `pk` is `Θ / T`, so the Exner function is `1 / pk`.
//! The scheme's thermodynamic constants (cp = 1003, R/cp = 0.2875) are
//! part of its fit and stay fixed whatever the run's
//! [`PhysicalConstants`](squall_core::PhysicalConstants) say.

use crate::column::KesslerColumn;
use crate::kernel::{ColumnKernel, KernelError};

const F2X: f64 = 17.27;
const F5: f64 = 237.3 * F2X * 2_500_000.0 / 1003.0;
/// R / cp as the scheme defines it.
const XK: f64 = 0.2875;
/// Sea-level pressure (mb).
const PSL: f64 = 1000.0;
/// Density of liquid water (kg/m³).
const RHOQR: f64 = 1000.0;
const LATENT_OVER_CP: f64 = 2_500_000.0 / 1003.0;

/// Kessler warm-rain kernel. Needs at least two levels.
#[derive(Clone, Copy, Debug, Default)]
pub struct KesslerKernel;

/// Rain terminal velocity (m/s), KW eq. 2.15.
fn terminal_velocity(qr: f64, r: f64, rhalf: f64) -> f64 {
    36.34 * (qr * r).powf(0.1364) * rhalf
}

impl ColumnKernel for KesslerKernel {
    fn name(&self) -> &str {
        "kessler"
    }

    fn min_levels(&self) -> usize {
        2
    }

    fn apply(&self, col: &mut KesslerColumn) -> Result<f64, KernelError> {
        let nz = col.len();
        if nz < 2 {
            return Err(KernelError::new(format!(
                "kessler needs at least 2 levels, got {nz}"
            )));
        }
        let lengths = [
            col.vapor.len(),
            col.cloud.len(),
            col.rain.len(),
            col.density.len(),
            col.pk.len(),
            col.height.len(),
        ];
        if lengths.iter().any(|&n| n != nz) {
            return Err(KernelError::new("column arrays differ in length"));
        }
        let dt = col.dt;
        if !(dt.is_finite() && dt > 0.0) {
            return Err(KernelError::new(format!("non-positive time step {dt}")));
        }

        let z = &col.height;
        let rho = &col.density;
        let mut exner = vec![0.0; nz];
        let mut r = vec![0.0; nz];
        let mut rhalf = vec![0.0; nz];
        let mut pc = vec![0.0; nz];
        let mut velqr = vec![0.0; nz];
        for k in 0..nz {
            if !(col.pk[k].is_finite() && col.pk[k] > 0.0) {
                return Err(KernelError::new(format!(
                    "non-positive pk {} at level {k}",
                    col.pk[k]
                )));
            }
            if k + 1 < nz && z[k + 1] <= z[k] {
                return Err(KernelError::new(format!(
                    "heights not increasing at level {k}"
                )));
            }
            exner[k] = 1.0 / col.pk[k];
            r[k] = 0.001 * rho[k];
            rhalf[k] = (rho[0] / rho[k]).sqrt();
            pc[k] = 3.8 / (exner[k].powf(1.0 / XK) * PSL);
            velqr[k] = terminal_velocity(col.rain[k], r[k], rhalf[k]);
        }

        let mut dt_max = dt;
        for k in 0..nz - 1 {
            if velqr[k] != 0.0 {
                dt_max = dt_max.min(0.8 * (z[k + 1] - z[k]) / velqr[k]);
            }
        }
        let rainsplit = (dt / dt_max).ceil().max(1.0) as usize;
        let dt0 = dt / rainsplit as f64;

        let theta = &mut col.temperature;
        let qv = &mut col.vapor;
        let qc = &mut col.cloud;
        let qr = &mut col.rain;
        let mut sed = vec![0.0; nz];
        let mut precl = 0.0;

        for nt in 0..rainsplit {
            precl += rho[0] * qr[0] * velqr[0] / RHOQR;

            for k in 0..nz - 1 {
                sed[k] = dt0 * (r[k + 1] * qr[k + 1] * velqr[k + 1] - r[k] * qr[k] * velqr[k])
                    / (r[k] * (z[k + 1] - z[k]));
            }
            let top = nz - 1;
            sed[top] = -dt0 * qr[top] * velqr[top] / (0.5 * (z[top] - z[top - 1]));

            for k in 0..nz {
                // Autoconversion and accretion, KW eq. 2.13a,b
                let qrprod = qc[k]
                    - (qc[k] - dt0 * f64::max(0.001 * (qc[k] - 0.001), 0.0))
                        / (1.0 + dt0 * 2.2 * qr[k].powf(0.875));
                qc[k] = f64::max(qc[k] - qrprod, 0.0);
                qr[k] = f64::max(qr[k] + qrprod + sed[k], 0.0);

                // Saturation mixing ratio, KW eq. 2.11
                let t_abs = exner[k] * theta[k];
                let qvs = pc[k] * (F2X * (t_abs - 273.0) / (t_abs - 36.0)).exp();
                let prod = (qv[k] - qvs) / (1.0 + qvs * F5 / (t_abs - 36.0).powi(2));

                // Rain evaporation, KW eq. 2.14a,b
                let rqr = r[k] * qr[k];
                let ventilation = (1.6 + 124.9 * rqr.powf(0.2046)) * rqr.powf(0.525);
                let deficit = f64::max(qvs - qv[k], 0.0);
                let ern = (dt0 * ventilation / (2_550_000.0 * pc[k] / (3.8 * qvs) + 540_000.0)
                    * (deficit / (r[k] * qvs)))
                    .min(f64::max(-prod - qc[k], 0.0))
                    .min(qr[k]);

                // Saturation adjustment, KW eq. 3.10
                let condensed = f64::max(prod, -qc[k]);
                theta[k] += LATENT_OVER_CP / exner[k] * (condensed - ern);
                qv[k] = f64::max(qv[k] - condensed + ern, 0.0);
                qc[k] += condensed;
                qr[k] -= ern;
            }

            if nt + 1 != rainsplit {
                for k in 0..nz {
                    velqr[k] = terminal_velocity(qr[k], r[k], rhalf[k]);
                }
            }
        }

        Ok(precl / rainsplit as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// 10-level column, 500 m spacing, Θ = 300, ρ = 1.2, pressure falling
    /// roughly 55 mb per level.
    fn column(qv: f64, qc: f64, qr: f64) -> KesslerColumn {
        let nz = 10;
        let mut c = KesslerColumn::new(nz);
        for k in 0..nz {
            let p_mb = 1000.0 - 55.0 * k as f64;
            let exner = (p_mb / PSL).powf(XK);
            c.temperature[k] = 300.0;
            c.density[k] = 1.2 - 0.05 * k as f64;
            c.pk[k] = 1.0 / exner;
            c.height[k] = 250.0 + 500.0 * k as f64;
            c.vapor[k] = qv;
            c.cloud[k] = qc;
            c.rain[k] = qr;
        }
        c.dt = 10.0;
        c
    }

    #[test]
    fn dry_column_is_unchanged() {
        let mut c = column(0.0, 0.0, 0.0);
        let before = c.clone();
        let precl = KesslerKernel.apply(&mut c).unwrap();
        assert_eq!(precl, 0.0);
        assert_eq!(c, before);
    }

    #[test]
    fn supersaturation_condenses_and_warms() {
        let mut c = column(0.05, 0.0, 0.0);
        let before = c.clone();
        KesslerKernel.apply(&mut c).unwrap();
        for k in 0..c.len() {
            assert!(c.cloud[k] > 0.0);
            assert!(c.vapor[k] < before.vapor[k]);
            assert!(c.temperature[k] > before.temperature[k]);
            assert_relative_eq!(
                c.vapor[k] + c.cloud[k] + c.rain[k],
                before.vapor[k],
                max_relative = 1e-12
            );
        }
        assert_eq!(c.density, before.density);
    }

    #[test]
    fn rain_reaches_the_surface() {
        let mut c = column(0.0, 0.0, 1e-3);
        let precl = KesslerKernel.apply(&mut c).unwrap();
        assert!(precl > 0.0);
        // Subsaturated air evaporates some rain.
        assert!(c.vapor.iter().any(|&q| q > 0.0));
    }

    #[test]
    fn long_steps_are_subcycled() {
        let mut short = column(0.0, 0.0, 5e-3);
        let mut long = short.clone();
        long.dt = 600.0;
        short.dt = 1.0;
        KesslerKernel.apply(&mut short).unwrap();
        KesslerKernel.apply(&mut long).unwrap();
        assert!(long.rain.iter().all(|q| q.is_finite() && *q >= 0.0));
    }

    #[test]
    fn rejects_bad_columns() {
        let mut c = KesslerColumn::new(1);
        c.dt = 1.0;
        assert!(KesslerKernel.apply(&mut c).is_err());

        let mut c = column(0.0, 0.0, 0.0);
        c.dt = 0.0;
        assert!(KesslerKernel.apply(&mut c).is_err());

        let mut c = column(0.0, 0.0, 0.0);
        c.pk[3] = 0.0;
        assert!(KesslerKernel.apply(&mut c).is_err());

        let mut c = column(0.0, 0.0, 0.0);
        c.height[5] = c.height[4];
        assert!(KesslerKernel.apply(&mut c).is_err());
    }
}
