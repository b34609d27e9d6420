use gd_app::*;
use gd_core::VarId;
use gd_sim::Event;
use gd_stability::Verdict;
use std::path::{Path, PathBuf};

fn case_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../cases").join(name)
}

#[test]
fn rms_driver_runs_two_machine_case() {
    let case = load_case(&case_path("two_machine.yaml")).unwrap();
    let (built, compile_time_s) = prepare_case(&case).unwrap();
    assert!(compile_time_s >= 0.0);

    let driver = RmsSimulationDriver::new(&built.system, RmsOptions::from(&built.run));
    let response = driver.run(&built.vars, &built.params, &built.events).unwrap();

    assert_eq!(response.trajectory.len(), 501);
    assert!(response.var_names.contains(&"g1.delta".to_string()));
    assert!(response.var_names.contains(&"b2.v".to_string()));
    assert!(response.param_names.contains(&"ld2.P_L".to_string()));

    let csv = trajectory_csv(&response.trajectory, &response.var_names).unwrap();
    let mut lines = csv.lines();
    let header = lines.next().unwrap();
    assert!(header.starts_with("time,g1.delta"));
    assert_eq!(lines.count(), 501);
}

#[test]
fn small_signal_at_initial_point() {
    let case = load_case(&case_path("two_machine.yaml")).unwrap();
    let (built, _) = prepare_case(&case).unwrap();
    let driver = SmallSignalDriver::new(&built.system, SmallSignalOptions::default());
    let response = driver.run(&built.vars, &built.params, &built.events).unwrap();

    assert_eq!(response.sample_index, 0);
    assert_eq!(response.result.verdict, Verdict::MarginallyStable);
    assert_eq!(response.result.modes.len(), 4);

    let table = modes_table(&response.result.modes, &response.result.state_names);
    assert_eq!(table.lines().count(), 5);
    let pf = participation_table(&response.result.participation, &response.result.state_names);
    assert!(pf.contains("g2.omega"));
}

#[test]
fn small_signal_after_integrating_to_assessment_time() {
    let case = load_case(&case_path("two_machine.yaml")).unwrap();
    let (built, _) = prepare_case(&case).unwrap();
    let options = SmallSignalOptions::default().with_t_assess(1.0);
    let driver = SmallSignalDriver::new(&built.system, options);
    let response = driver.run(&built.vars, &built.params, &built.events).unwrap();

    assert_eq!(response.sample_index, 100);
    assert!((response.t_assess - 1.0).abs() < 1e-9);
    assert!(response.timing.solve_time_s >= 0.0);
    assert_eq!(response.result.verdict, Verdict::MarginallyStable);
}

#[test]
fn batch_results_keep_input_order() {
    let case = load_case(&case_path("two_machine.yaml")).unwrap();
    let (built, _) = prepare_case(&case).unwrap();
    let load = VarId::from("ld2.P_L");
    let scenarios: Vec<Scenario> = [1.1, 1.2, 1.3]
        .iter()
        .map(|v| Scenario {
            name: format!("step to {v}"),
            events: vec![Event::step(load.clone(), 0.5, *v)],
            ..Scenario::default()
        })
        .collect();
    let options = RmsOptions::from(&built.run).with_t_end(1.0);

    let results = run_batch(&built.system, &built.vars, &built.params, &scenarios, &options);
    assert_eq!(results.len(), 3);
    for (result, expected) in results.iter().zip([1.1, 1.2, 1.3]) {
        let response = result.as_ref().unwrap();
        let series = response.trajectory.param_series(&load).unwrap();
        assert_eq!(*series.last().unwrap(), expected);
    }
}

#[test]
fn equilibrate_repairs_algebraic_guess() {
    let mut case = load_case(&case_path("first_order_decay.yaml")).unwrap();
    case.initial_values.insert(VarId::from("y"), 5.0);
    let (built, _) = prepare_case(&case).unwrap();
    let options = RmsOptions::from(&built.run).with_t_end(0.0).with_equilibrate(true);
    let response = RmsSimulationDriver::new(&built.system, options)
        .run(&built.vars, &built.params, &[])
        .unwrap();
    let y0 = response.trajectory.vars_at(0).unwrap()[1];
    assert!((y0 - 2.0).abs() < 1e-9);
}

#[test]
fn missing_case_file_is_reported_with_path() {
    let err = load_case(&case_path("does_not_exist.yaml")).unwrap_err();
    assert!(matches!(err, AppError::CaseFileRead { .. }));
}

#[test]
fn summary_reports_dimensions() {
    let case = load_case(&case_path("two_machine.yaml")).unwrap();
    let summary = summarize_case(&case).unwrap();
    assert_eq!(summary.generators, 2);
    assert_eq!((summary.n_x, summary.n_y), (4, 4));
    assert_eq!(summary.events, 1);
}

#[test]
fn csv_quotes_names_with_delimiters() {
    let case = load_case(&case_path("first_order_decay.yaml")).unwrap();
    let (built, _) = prepare_case(&case).unwrap();
    let driver = RmsSimulationDriver::new(&built.system, RmsOptions::from(&built.run));
    let response = driver.run(&built.vars, &built.params, &built.events).unwrap();
    assert_eq!(response.var_names.len(), 2);

    let names = vec!["decay.x,fast".to_string(), "say \"y\"".to_string()];
    let csv = trajectory_csv(&response.trajectory, &names).unwrap();
    let header = csv.lines().next().unwrap();
    assert_eq!(header, r#"time,"decay.x,fast","say ""y""""#);
    let first = csv.lines().nth(1).unwrap();
    assert_eq!(first.split(',').count(), 3);
    assert_eq!(csv.lines().count(), response.trajectory.len() + 1);
}
