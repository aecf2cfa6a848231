//! C-linkage column kernels.
//!
//! The only module in the workspace with `unsafe` code. A
//! [`ForeignKernel`] wraps a function pointer with the `tc_kessler_`
//! signature and hands it the column's seven arrays as raw pointers.

use std::os::raw::c_int;

use crate::column::KesslerColumn;
use crate::kernel::{ColumnKernel, KernelError};

/// `tc_kessler_(t, qv, qc, qr, rho, pk, z, nz)`.
///
/// Every pointer addresses `*nz` contiguous `f64` values.
pub type KesslerFn = unsafe extern "C" fn(
    t: *mut f64,
    qv: *mut f64,
    qc: *mut f64,
    qr: *mut f64,
    rho: *mut f64,
    pk: *mut f64,
    z: *mut f64,
    nz: *mut c_int,
);

/// A column kernel implemented behind a C function pointer.
///
/// The routine integrates over its own internal time step, so the
/// column's `dt` is not passed on, and it reports no precipitation.
#[derive(Clone, Copy, Debug)]
pub struct ForeignKernel {
    name: &'static str,
    routine: KesslerFn,
}

impl ForeignKernel {
    /// Wrap a C routine.
    ///
    /// # Safety
    ///
    /// `routine` must read and write at most `*nz` values through each
    /// array pointer, must not retain any pointer after returning, must
    /// not unwind, and must be safe to call from several threads at once
    /// on distinct columns.
    #[allow(unsafe_code)]
    pub unsafe fn new(name: &'static str, routine: KesslerFn) -> Self {
        Self { name, routine }
    }
}

impl ColumnKernel for ForeignKernel {
    fn name(&self) -> &str {
        self.name
    }

    #[allow(unsafe_code)]
    fn apply(&self, col: &mut KesslerColumn) -> Result<f64, KernelError> {
        let len = col.len();
        let lengths = [
            col.vapor.len(),
            col.cloud.len(),
            col.rain.len(),
            col.density.len(),
            col.pk.len(),
            col.height.len(),
        ];
        if lengths.iter().any(|&n| n != len) {
            return Err(KernelError::new("column arrays differ in length"));
        }
        let mut nz = c_int::try_from(len)
            .map_err(|_| KernelError::new(format!("{len} levels exceed C int range")))?;

        // SAFETY: each pointer comes from a distinct Vec of exactly `nz`
        // elements that stays mutably borrowed for the whole call, so the
        // buffers neither alias nor move. `ForeignKernel::new` obliges the
        // routine to stay within those bounds.
        unsafe {
            (self.routine)(
                col.temperature.as_mut_ptr(),
                col.vapor.as_mut_ptr(),
                col.cloud.as_mut_ptr(),
                col.rain.as_mut_ptr(),
                col.density.as_mut_ptr(),
                col.pk.as_mut_ptr(),
                col.height.as_mut_ptr(),
                &mut nz,
            );
        }

        if usize::try_from(nz) != Ok(len) {
            return Err(KernelError::new(format!(
                "{} changed the level count from {len} to {nz}",
                self.name
            )));
        }
        Ok(0.0)
    }
}

#[cfg(test)]
#[allow(unsafe_code)]
mod tests {
    use super::*;
    use std::slice;

    /// Moves all cloud water into rain, level by level.
    unsafe extern "C" fn rain_out(
        _t: *mut f64,
        _qv: *mut f64,
        qc: *mut f64,
        qr: *mut f64,
        _rho: *mut f64,
        _pk: *mut f64,
        _z: *mut f64,
        nz: *mut c_int,
    ) {
        let n = *nz as usize;
        let qc = slice::from_raw_parts_mut(qc, n);
        let qr = slice::from_raw_parts_mut(qr, n);
        for k in 0..n {
            qr[k] += qc[k];
            qc[k] = 0.0;
        }
    }

    unsafe extern "C" fn clobber_nz(
        _t: *mut f64,
        _qv: *mut f64,
        _qc: *mut f64,
        _qr: *mut f64,
        _rho: *mut f64,
        _pk: *mut f64,
        _z: *mut f64,
        nz: *mut c_int,
    ) {
        *nz = 0;
    }

    #[test]
    fn routine_mutates_column_in_place() {
        let kernel = unsafe { ForeignKernel::new("rain_out", rain_out) };
        let mut c = KesslerColumn::new(4);
        c.cloud = vec![1e-3, 2e-3, 0.0, 4e-3];
        c.rain = vec![0.0, 1e-3, 1e-3, 0.0];
        assert_eq!(kernel.apply(&mut c), Ok(0.0));
        assert_eq!(c.cloud, vec![0.0; 4]);
        assert_eq!(c.rain, vec![1e-3, 3e-3, 1e-3, 4e-3]);
        assert_eq!(kernel.name(), "rain_out");
    }

    #[test]
    fn changed_level_count_is_a_failure() {
        let kernel = unsafe { ForeignKernel::new("clobber", clobber_nz) };
        let mut c = KesslerColumn::new(3);
        let err = kernel.apply(&mut c).unwrap_err();
        assert!(err.reason.contains("level count"));
    }
}
