//! Two classical machines tied by one line, with a load step at the remote bus.

use gd_dae::{DaeSystem, assemble};
use gd_devices::{BusVoltage, GeneratorParams, LineParams, LoadParams, Network, OperatingPoint};
use gd_sim::{Event, EventSchedule, Method, SimOptions, simulate_with};
use gd_stability::{Verdict, run_small_signal_stability};
use std::collections::HashMap;

fn network() -> Network {
    let mut net = Network::new();
    net.add_bus("b1").unwrap();
    net.add_bus("b2").unwrap();
    net.add_generator("g1", "b1", GeneratorParams::default()).unwrap();
    net.add_generator("g2", "b2", GeneratorParams::default()).unwrap();
    net.add_line(
        "l12",
        "b1",
        "b2",
        LineParams {
            r: 0.01,
            x: 0.2,
            b: 0.02,
        },
    )
    .unwrap();
    net.add_load("ld2", "b2", LoadParams { p: 1.0, q: 0.2 }).unwrap();
    net
}

fn initialized(net: &Network) -> (DaeSystem, OperatingPoint) {
    let system = assemble(&net.blocks()).unwrap();
    let voltages = HashMap::from([
        ("b1".to_string(), BusVoltage::new(1.0, 0.0)),
        ("b2".to_string(), BusVoltage::new(0.98, -0.1)),
    ]);
    let point = net.initialize(&voltages).unwrap();
    (system, point)
}

#[test]
fn network_assembles_with_expected_dimensions() {
    let net = network();
    let (system, _) = initialized(&net);
    assert_eq!(system.n_x(), 4);
    assert_eq!(system.n_y(), 4);
    // g: xd, M, D, wb, E, pm (x2); line: r, x, b; load: P_L, Q_L
    assert_eq!(system.n_p(), 17);
}

#[test]
fn initialization_is_an_equilibrium() {
    let net = network();
    let (system, point) = initialized(&net);
    let p = system.build_init_params_vector(&point.params).unwrap();
    let z = system
        .build_init_vars_vector_from_uid(&point.vars, p.as_slice())
        .unwrap();
    let f = system.eval_f(z.as_slice(), p.as_slice()).unwrap();
    let g = system.eval_g(z.as_slice(), p.as_slice()).unwrap();
    assert!(f.amax() < 1e-10, "f = {f}");
    assert!(g.amax() < 1e-10, "g = {g}");
}

#[test]
fn load_step_simulation() {
    let net = network();
    let (system, point) = initialized(&net);
    let p0 = system.build_init_params_vector(&point.params).unwrap();
    let z0 = system
        .build_init_vars_vector_from_uid(&point.vars, p0.as_slice())
        .unwrap();

    let load = &net.loads[0].p;
    let events = EventSchedule::new(&system, &[Event::step(load.id.clone(), 2.5, 1.2)]).unwrap();
    let options = SimOptions::default().with_method(Method::ImplicitEuler);
    let traj = simulate_with(&system, 0.0, 5.0, 0.01, &z0, &p0, &events, &options).unwrap();

    assert_eq!(traj.len(), 501);
    let p_load = traj.param_series(&load.id).unwrap();
    for (t, value) in traj.times().iter().zip(&p_load) {
        let expected = if *t < 2.5 { 1.0 } else { 1.2 };
        assert_eq!(*value, expected, "load at t = {t}");
    }
    assert_eq!(traj.index_at(2.5), Some(250));
    assert_eq!(traj.times()[250], 2.5);
    assert_eq!(p_load[250], 1.2);

    let omega = traj.series(&net.generators[0].omega.id).unwrap();
    assert!((omega[249] - 1.0).abs() < 1e-8, "pre-event drift {}", omega[249]);
    assert!(omega[500] < 1.0, "frequency should sag after the load step");
    assert!(traj.max_residual() <= 1e-6);
}

#[test]
fn initial_point_is_marginally_stable() {
    let net = network();
    let (system, point) = initialized(&net);
    let p = system.build_init_params_vector(&point.params).unwrap();
    let z = system
        .build_init_vars_vector_from_uid(&point.vars, p.as_slice())
        .unwrap();

    let result = run_small_signal_stability(&system, z.as_slice(), p.as_slice(), false).unwrap();
    // The common rotor angle has no restoring torque.
    assert_eq!(result.verdict, Verdict::MarginallyStable);
    assert_eq!(result.eigenvalues.len(), 4);
    assert!(result.eigenvalues.iter().any(|l| l.im.abs() > 1.0 && l.re < 0.0));
    assert_eq!(result.state_names[0], "g1.delta");
}
