//! Kessler coupling against real grids: round trip, halos, parallelism.

use approx::assert_relative_eq;
use proptest::prelude::*;
use squall_core::{tracer, PhysicalConstants, SimTime, StateComponent, TimeSpan};
use squall_grid::Grid;
use squall_physics::{IdentityKernel, KesslerKernel, KesslerPhysics, PRECIPITATION};
use squall_process::{HaloGuard, ProcessContext, WorkflowProcess};
use squall_test_utils::{set_mixing_ratio, single_column_spec, small_spec, uniform_grid};

const DT: TimeSpan = TimeSpan::from_secs(10);
const RHO: usize = StateComponent::Rho.index();
const THETA: usize = StateComponent::Theta.index();

fn perform_once(process: &mut KesslerPhysics, grid: &mut Grid) {
    let constants = PhysicalConstants::default();
    process.initialize(grid, SimTime::ZERO).unwrap();
    let now = SimTime::ZERO.checked_add(DT).unwrap();
    let mut ctx = ProcessContext::new(grid, &constants, now, DT);
    process.perform(&mut ctx).unwrap();
}

fn moist_grid() -> Grid {
    let mut grid = uniform_grid(small_spec(4, 3, 6, 2), tracer::WATER_SPECIES);
    set_mixing_ratio(&mut grid, tracer::VAPOR, 0.012);
    set_mixing_ratio(&mut grid, tracer::CLOUD, 3e-4);
    set_mixing_ratio(&mut grid, tracer::RAIN, 1e-4);
    grid
}

#[test]
fn single_column_identity_is_exact() {
    let mut grid = uniform_grid(single_column_spec(5), tracer::WATER_SPECIES);
    let before = grid.patch(0).unwrap().clone();
    let mut kessler = KesslerPhysics::new(DT, IdentityKernel);
    perform_once(&mut kessler, &mut grid);

    let after = grid.patch(0).unwrap();
    assert_eq!(after.state(0), before.state(0));
    assert_eq!(after.tracers(0), before.tracers(0));
}

#[test]
fn identity_round_trip_preserves_state() {
    let mut grid = moist_grid();
    let before = grid.clone();
    let mut kessler = KesslerPhysics::new(DT, IdentityKernel);
    perform_once(&mut kessler, &mut grid);

    for (a, b) in grid.patches().iter().zip(before.patches()) {
        assert_eq!(a.state(0), b.state(0));
        let (ta, tb) = (a.tracers(0).unwrap(), b.tracers(0).unwrap());
        for (x, y) in ta.iter().zip(tb.iter()) {
            assert_relative_eq!(*x, *y, max_relative = 1e-15);
        }
    }
}

#[test]
fn interior_only_mutation() {
    let mut grid = moist_grid();
    let guard = HaloGuard::capture(&grid);
    let mut kessler = KesslerPhysics::new(DT, KesslerKernel);
    perform_once(&mut kessler, &mut grid);
    guard.verify(&grid).unwrap();

    // The native kernel did change the interior.
    let node = grid.patch(0).unwrap().state(0).unwrap().node();
    assert_ne!(node[[THETA, 0, 1, 1]], 300.0);
}

#[test]
fn native_kernel_accumulates_precipitation() {
    let mut grid = uniform_grid(small_spec(2, 2, 8, 1), tracer::WATER_SPECIES);
    set_mixing_ratio(&mut grid, tracer::RAIN, 2e-3);
    let mut kessler = KesslerPhysics::new(DT, KesslerKernel);
    perform_once(&mut kessler, &mut grid);

    let patch = grid.patch(0).unwrap();
    let precip = patch.surface_diagnostic(PRECIPITATION).unwrap();
    for (i, j) in patch.patch_box().interior_columns() {
        assert!(precip[[i, j]] > 0.0);
    }
    for (i, j) in patch.patch_box().halo_columns() {
        assert_eq!(precip[[i, j]], 0.0);
    }
    // Density is a driving variable the kernel leaves alone.
    let node = patch.state(0).unwrap().node();
    assert_eq!(node[[RHO, 3, 1, 1]], 1.2);
}

#[test]
fn parallel_matches_serial() {
    let mut serial = moist_grid();
    let mut parallel = serial.clone();
    perform_once(&mut KesslerPhysics::new(DT, KesslerKernel), &mut serial);
    perform_once(
        &mut KesslerPhysics::new(DT, KesslerKernel).parallel(true),
        &mut parallel,
    );
    for (a, b) in serial.patches().iter().zip(parallel.patches()) {
        assert_eq!(a.state(0), b.state(0));
        assert_eq!(a.tracers(0), b.tracers(0));
        assert_eq!(
            a.surface_diagnostic(PRECIPITATION),
            b.surface_diagnostic(PRECIPITATION)
        );
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn identity_preserves_mixing_ratios(
        column in prop::collection::vec(
            (0.5f64..1.5, 250.0f64..350.0, 0.0f64..0.02, 0.0f64..1e-3, 0.0f64..1e-3),
            4,
        )
    ) {
        let mut grid = uniform_grid(single_column_spec(4), tracer::WATER_SPECIES);
        {
            let f = grid.patch_mut(0).unwrap().fields_mut(0).unwrap();
            for (k, &(rho, theta, qv, qc, qr)) in column.iter().enumerate() {
                f.node[[RHO, k, 1, 1]] = rho;
                f.node[[THETA, k, 1, 1]] = theta;
                f.tracers[[tracer::VAPOR, k, 1, 1]] = qv * rho;
                f.tracers[[tracer::CLOUD, k, 1, 1]] = qc * rho;
                f.tracers[[tracer::RAIN, k, 1, 1]] = qr * rho;
            }
        }
        let before = grid.clone();
        perform_once(&mut KesslerPhysics::new(DT, IdentityKernel), &mut grid);

        let (a, b) = (grid.patch(0).unwrap(), before.patch(0).unwrap());
        let (na, nb) = (a.state(0).unwrap().node(), b.state(0).unwrap().node());
        let (ta, tb) = (a.tracers(0).unwrap(), b.tracers(0).unwrap());
        for k in 0..4 {
            prop_assert_eq!(na[[RHO, k, 1, 1]], nb[[RHO, k, 1, 1]]);
            prop_assert_eq!(na[[THETA, k, 1, 1]], nb[[THETA, k, 1, 1]]);
            for s in 0..tracer::WATER_SPECIES {
                let q_before = tb[[s, k, 1, 1]] / nb[[RHO, k, 1, 1]];
                let q_after = ta[[s, k, 1, 1]] / na[[RHO, k, 1, 1]];
                prop_assert!((q_before - q_after).abs() <= 1e-15 * q_before.abs().max(1e-300));
            }
        }
    }
}
