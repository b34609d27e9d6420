use gd_dae::{AlgebraicDecl, Block, ParamDecl, StateDecl, assemble};
use gd_linear::{
    LinearError, LinearizeOptions, linearize, linearize_at, linearize_state_space,
};
use gd_symbolic::{Expr, Var, sin};
use nalgebra::DMatrix;
use proptest::prelude::*;

proptest! {
    #[test]
    fn algebraic_free_system_gives_scaled_fx(
        a in -3.0f64..3.0, b in -3.0f64..3.0, c in -3.0f64..3.0,
        t1 in 0.1f64..10.0, t2 in 0.1f64..10.0,
        x1 in -1.0f64..1.0, x2 in -1.0f64..1.0,
    ) {
        let v1 = Var::named("x1");
        let v2 = Var::named("x2");
        let m1 = Var::named("m1");
        let m2 = Var::named("m2");
        let block = Block::new("ode")
            .param(ParamDecl::new(&m1))
            .param(ParamDecl::new(&m2))
            .state(StateDecl::new(&v1, a * sin(&v1) + b * &v2).with_time_constant(&m1))
            .state(StateDecl::new(&v2, c * &v1 * &v2).with_time_constant(&m2));
        let sys = assemble(&[block]).unwrap();
        let p = [t1, t2];
        let lin = linearize(&sys, &[x1, x2], &[], &p).unwrap();

        let fx = sys.fx(&[x1, x2], &p).unwrap();
        let mut expected = fx.clone();
        for j in 0..2 {
            expected[(0, j)] = fx[(0, j)] / t1;
            expected[(1, j)] = fx[(1, j)] / t2;
        }
        prop_assert_eq!(lin.a, expected);
    }
}

#[test]
fn schur_complement_eliminates_algebraics() {
    // x' = -x + y, 0 = 2x - y  =>  A = -1 + 2 = 1
    let x = Var::named("x");
    let y = Var::named("y");
    let block = Block::new("b")
        .state(StateDecl::new(&x, -1.0 * Expr::from(&x) + &y))
        .algebraic(AlgebraicDecl::new(&y, 2.0 * &x - &y));
    let sys = assemble(&[block]).unwrap();
    let lin = linearize(&sys, &[0.3], &[0.6], &[]).unwrap();
    assert!((lin.a[(0, 0)] - 1.0).abs() < 1e-14);
    assert_eq!(lin.gy[(0, 0)], -1.0);
}

#[test]
fn singular_gy_is_reported() {
    // y appears only through y - y^2 at y = 0.5, where d/dy = 0.
    let x = Var::named("x");
    let y = Var::named("y");
    let block = Block::new("b")
        .state(StateDecl::new(&x, -1.0 * Expr::from(&x) + &y))
        .algebraic(AlgebraicDecl::new(&y, &y - &y * &y + &x));
    let sys = assemble(&[block]).unwrap();
    let err = linearize(&sys, &[0.0], &[0.5], &[]).unwrap_err();
    assert!(matches!(err, LinearError::SingularAlgebraicJacobian { .. }));
}

#[test]
fn zero_time_constant_is_not_invertible() {
    let x = Var::named("x");
    let m = Var::named("m");
    let block = Block::new("b")
        .param(ParamDecl::new(&m).with_value(0.0))
        .state(StateDecl::new(&x, -1.0 * Expr::from(&x)).with_time_constant(&m));
    let sys = assemble(&[block]).unwrap();
    let err = linearize_at(&sys, &[1.0], &[0.0], &LinearizeOptions::default()).unwrap_err();
    assert_eq!(
        err,
        LinearError::NonInvertibleTimeConstant {
            state: "x".into(),
            value: 0.0
        }
    );
}

#[test]
fn state_space_inputs_and_outputs() {
    // x' = -x + y + u, 0 = 2x - y + 3u, output y
    let x = Var::named("x");
    let y = Var::named("y");
    let u = Var::named("u");
    let block = Block::new("b")
        .param(ParamDecl::new(&u).with_value(0.0))
        .state(StateDecl::new(&x, -1.0 * Expr::from(&x) + &y + &u))
        .algebraic(AlgebraicDecl::new(&y, 2.0 * &x - &y + 3.0 * &u));
    let sys = assemble(&[block]).unwrap();
    let ss = linearize_state_space(
        &sys,
        &[0.0, 0.0],
        &[0.0],
        &[u.id.clone()],
        &[y.id.clone(), x.id.clone()],
        &LinearizeOptions::default(),
    )
    .unwrap();

    // y = 2x + 3u  =>  x' = x + 4u
    let close = |m: &DMatrix<f64>, expected: &[f64]| {
        m.iter().zip(expected).all(|(a, b)| (a - b).abs() < 1e-14)
    };
    assert!(close(&ss.a, &[1.0]));
    assert!(close(&ss.b, &[4.0]));
    assert_eq!(ss.c.shape(), (2, 1));
    assert!((ss.c[(0, 0)] - 2.0).abs() < 1e-14);
    assert!((ss.d[(0, 0)] - 3.0).abs() < 1e-14);
    assert_eq!(ss.c[(1, 0)], 1.0);
    assert_eq!(ss.d[(1, 0)], 0.0);

    let err = linearize_state_space(
        &sys,
        &[0.0, 0.0],
        &[0.0],
        &[x.id.clone()],
        &[],
        &LinearizeOptions::default(),
    )
    .unwrap_err();
    assert_eq!(err, LinearError::UnknownInput(x.id.clone()));
}
