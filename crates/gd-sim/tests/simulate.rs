use gd_dae::{AlgebraicDecl, Block, DaeSystem, ParamDecl, StateDecl, assemble};
use gd_sim::{
    Event, EventSchedule, Method, SimError, SimOptions, simulate, simulate_with, solve_algebraic,
};
use gd_solver::{NewtonConfig, SolverError};
use gd_symbolic::{Expr, Var};
use nalgebra::DVector;
use std::collections::HashMap;

/// x' = -a·x + u, y = 2x (linear in x, y).
fn linear_system() -> DaeSystem {
    let x = Var::named("x");
    let y = Var::named("y");
    let a = Var::named("a");
    let u = Var::named("u");
    let block = Block::new("lin")
        .param(ParamDecl::new(&a).with_value(1.0))
        .param(ParamDecl::new(&u).with_value(0.0))
        .state(StateDecl::new(&x, -1.0 * (&a * &x) + &u).with_init(1.0))
        .algebraic(AlgebraicDecl::new(&y, &y - 2.0 * &x).with_init(2.0));
    assemble(&[block]).unwrap()
}

fn initial(sys: &DaeSystem) -> (DVector<f64>, DVector<f64>) {
    let p = sys.build_init_params_vector(&HashMap::new()).unwrap();
    let z = sys
        .build_init_vars_vector_from_uid(&HashMap::new(), p.as_slice())
        .unwrap();
    (z, p)
}

#[test]
fn zero_length_run_returns_initial_point() {
    let sys = linear_system();
    let (z0, p0) = initial(&sys);
    let traj = simulate(&sys, 1.5, 1.5, 0.01, &z0, &p0, Method::ImplicitEuler).unwrap();
    assert_eq!(traj.len(), 1);
    let s = traj.sample(0).unwrap();
    assert_eq!(s.time, 1.5);
    assert_eq!(s.vars, &z0);
    assert!(traj.newton_iterations().is_empty());
}

#[test]
fn linear_system_converges_in_one_iteration_per_step() {
    let sys = linear_system();
    let (z0, p0) = initial(&sys);
    for method in [Method::ImplicitEuler, Method::Trapezoidal] {
        let traj = simulate(&sys, 0.0, 1.0, 0.05, &z0, &p0, method).unwrap();
        assert_eq!(traj.len(), 21);
        assert!(traj.newton_iterations().iter().all(|&n| n <= 1));
        assert_eq!(traj.max_newton_iterations(), 1);
    }
}

#[test]
fn decay_matches_closed_form_step_recurrences() {
    let sys = linear_system();
    let (z0, p0) = initial(&sys);
    let h: f64 = 0.01;

    let be = simulate(&sys, 0.0, 1.0, h, &z0, &p0, Method::ImplicitEuler).unwrap();
    let x_end = be.last().unwrap().vars[0];
    assert!((x_end - (1.0 / (1.0 + h)).powi(100)).abs() < 1e-9);

    let tr = simulate(&sys, 0.0, 1.0, h, &z0, &p0, Method::Trapezoidal).unwrap();
    let x_end = tr.last().unwrap().vars[0];
    let factor = (1.0 - h / 2.0) / (1.0 + h / 2.0);
    assert!((x_end - factor.powi(100)).abs() < 1e-9);
    assert!((x_end - (-1.0f64).exp()).abs() < 1e-5);

    // Algebraic variable tracks its constraint at every sample.
    for i in 0..tr.len() {
        let z = tr.vars_at(i).unwrap();
        assert!((z[1] - 2.0 * z[0]).abs() < 1e-9);
    }
}

#[test]
fn time_constant_scales_the_derivative() {
    let x = Var::named("x");
    let t = Var::named("t_const");
    let block = Block::new("lag")
        .param(ParamDecl::new(&t).with_value(2.0))
        .state(StateDecl::new(&x, -1.0 * Expr::from(&x)).with_time_constant(&t).with_init(1.0));
    let sys = assemble(&[block]).unwrap();
    let (z0, p0) = initial(&sys);
    let traj = simulate(&sys, 0.0, 0.1, 0.1, &z0, &p0, Method::ImplicitEuler).unwrap();
    assert!((traj.last().unwrap().vars[0] - 2.0 / 2.1).abs() < 1e-12);
}

#[test]
fn step_event_takes_effect_from_its_trigger_sample() {
    let sys = linear_system();
    let (z0, p0) = initial(&sys);
    let schedule = EventSchedule::new(&sys, &[Event::step("u", 2.5, 0.5)]).unwrap();
    let traj = simulate_with(
        &sys,
        0.0,
        5.0,
        0.01,
        &z0,
        &p0,
        &schedule,
        &SimOptions::default(),
    )
    .unwrap();

    assert_eq!(traj.len(), 501);
    assert_eq!(*traj.times().last().unwrap(), 5.0);
    let u = traj.param_series(&"u".into()).unwrap();
    for (t, value) in traj.times().iter().zip(&u) {
        let expected = if *t < 2.5 { 0.0 } else { 0.5 };
        assert_eq!(*value, expected, "u at t = {t}");
    }
    assert_eq!(traj.index_at(2.5), Some(250));

    // The state heads towards the new equilibrium x = u / a.
    let x = traj.series(&"x".into()).unwrap();
    assert!(x[250] < x[251]);
}

#[test]
fn invalid_steps_are_rejected_before_running() {
    let sys = linear_system();
    let (z0, p0) = initial(&sys);
    for (t_end, h) in [(1.0, 0.0), (1.0, -0.1), (-1.0, 0.1), (1.0, f64::NAN), (1.0, 1e-300)] {
        let err = simulate(&sys, 0.0, t_end, h, &z0, &p0, Method::ImplicitEuler).unwrap_err();
        assert!(matches!(err, SimError::InvalidStep { .. }), "{err}");
    }
}

#[test]
fn unsolvable_constraint_reports_the_failing_step() {
    let x = Var::named("x");
    let y = Var::named("y");
    let block = Block::new("bad")
        .state(StateDecl::new(&x, -1.0 * Expr::from(&x)))
        .algebraic(AlgebraicDecl::new(&y, &y * &y + 1.0));
    let sys = assemble(&[block]).unwrap();
    let z0 = DVector::from_column_slice(&[1.0, 0.5]);
    let p0 = DVector::zeros(0);
    let err = simulate(&sys, 0.0, 1.0, 0.1, &z0, &p0, Method::ImplicitEuler).unwrap_err();
    match err {
        SimError::DivergedNewton { step, time, .. } => {
            assert_eq!(step, 1);
            assert!((time - 0.1).abs() < 1e-12);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn singular_step_matrix_reports_the_residual() {
    let x = Var::named("x");
    let y = Var::named("y");
    let block = Block::new("bad")
        .state(StateDecl::new(&x, -1.0 * Expr::from(&x)))
        .algebraic(AlgebraicDecl::new(&y, &y * &y + 1.0));
    let sys = assemble(&[block]).unwrap();
    // gy = 2y vanishes at the start point.
    let z0 = DVector::from_column_slice(&[1.0, 0.0]);
    let p0 = DVector::zeros(0);
    let err = simulate(&sys, 0.0, 1.0, 0.1, &z0, &p0, Method::ImplicitEuler).unwrap_err();
    match err {
        SimError::DivergedNewton {
            step,
            residual_norm,
            source,
            ..
        } => {
            assert_eq!(step, 1);
            assert!(matches!(source, SolverError::SingularJacobian { .. }));
            assert_eq!(residual_norm, 1.0);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn algebraic_variables_are_completed_from_states() {
    let sys = linear_system();
    let (_, p0) = initial(&sys);
    let z = DVector::from_column_slice(&[0.75, 0.0]);
    let solved = solve_algebraic(&sys, &z, &p0, &NewtonConfig::default()).unwrap();
    assert_eq!(solved[0], 0.75);
    assert!((solved[1] - 1.5).abs() < 1e-12);
}

mod sampling {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn samples_cover_the_window_at_fixed_spacing(
            steps in 1usize..200,
            frac in 0.0f64..1.0,
            h in 0.001f64..0.1,
        ) {
            let sys = linear_system();
            let (z0, p0) = initial(&sys);
            let t_end = (steps as f64 - 1.0 + frac.max(1e-3)) * h;
            let traj = simulate(&sys, 0.0, t_end, h, &z0, &p0, Method::Trapezoidal).unwrap();

            let times = traj.times();
            prop_assert_eq!(times[0], 0.0);
            prop_assert_eq!(*times.last().unwrap(), t_end);
            for w in times.windows(2) {
                prop_assert!(w[1] > w[0]);
                prop_assert!(w[1] - w[0] <= h * (1.0 + 1e-9));
            }
            prop_assert_eq!(traj.len(), traj.newton_iterations().len() + 1);
        }
    }
}
