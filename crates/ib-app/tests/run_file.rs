//! End-to-end runs driven by YAML run files.

use ib_app::{AppError, ForceLog, RunConfig, check, run};
use ib_model::ModelKind;
use ib_sim::{Scheme, history_path};
use std::path::Path;

fn config(outdir: &Path, extra: &str) -> RunConfig {
    let yaml = format!(
        "
name: cyl
grid: {{nx: 16, ny: 16, length: 4.0, xoffset: -2.0, yoffset: -2.0}}
reynolds: 100
dt: 0.01
scheme: euler
steps: 4
geometry:
  bodies:
    - name: cylinder
      shape: {{type: circle, center: [0.0, 0.0], radius: 0.5, points: 12}}
output: {{dir: \"{}\", restart_every: 2, force_every: 1}}
{extra}
",
        outdir.display()
    );
    RunConfig::from_yaml_str(&yaml).unwrap()
}

#[test]
fn nonlinear_run_writes_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path(), "");
    let summary = run(&cfg).unwrap();

    assert_eq!(summary.final_timestep, 4);
    assert!((summary.final_time - 0.04).abs() < 1e-12);
    assert!(!summary.history_loaded);
    assert!(summary.net_force.0.abs() > 0.0);

    let forces = ForceLog::read(&dir.path().join("cyl.force.jsonl")).unwrap();
    assert_eq!(forces.len(), 5);
    assert_eq!(forces[0].step, 0);
    assert_eq!(forces[0].fx, 0.0);
    assert_eq!(forces[4].step, 4);
    assert!((forces[4].fx - summary.net_force.0).abs() <= 1e-12 * summary.net_force.0.abs());

    for step in [0, 2, 4] {
        assert!(dir.path().join(format!("cyl{step:05}.bin")).exists());
    }
    assert!(!dir.path().join("cyl00001.bin").exists());
    assert!(history_path(&dir.path().join("cyl"), Scheme::Euler).exists());

    let saved = std::fs::read_to_string(dir.path().join("cyl.yaml")).unwrap();
    assert_eq!(RunConfig::from_yaml_str(&saved).unwrap(), cfg);
}

#[test]
fn rerun_resumes_from_history_and_restart_file() {
    let dir = tempfile::tempdir().unwrap();
    let first = run(&config(dir.path(), "")).unwrap();
    assert!(!first.history_loaded);

    let restart = dir.path().join("cyl00004.bin");
    let extra = format!("initial_condition: \"{}\"", restart.display());
    let second = run(&config(dir.path(), &extra)).unwrap();
    assert!(second.history_loaded);
    assert_eq!(second.final_timestep, 8);
    assert!((second.final_time - 0.08).abs() < 1e-12);
}

#[test]
fn unreadable_initial_condition_falls_back_to_rest() {
    let dir = tempfile::tempdir().unwrap();
    let extra = format!(
        "initial_condition: \"{}\"",
        dir.path().join("missing.bin").display()
    );
    let summary = run(&config(dir.path(), &extra)).unwrap();
    assert_eq!(summary.final_timestep, 4);
}

#[test]
fn linear_run_about_its_own_base_flow_stays_at_rest() {
    let base_dir = tempfile::tempdir().unwrap();
    run(&config(base_dir.path(), "")).unwrap();
    let base = base_dir.path().join("cyl00004.bin");

    let dir = tempfile::tempdir().unwrap();
    let extra = format!(
        "model: linear\nbaseflow: \"{b}\"\ninitial_condition: \"{b}\"\nsubtract_baseflow: true",
        b = base.display()
    );
    let summary = run(&config(dir.path(), &extra)).unwrap();
    // the loaded state keeps its step counter
    assert_eq!(summary.final_timestep, 8);
    assert_eq!(summary.net_force, (0.0, 0.0));
}

#[test]
fn adjoint_run_needs_an_existing_base_flow() {
    let dir = tempfile::tempdir().unwrap();
    let extra = format!(
        "model: adjoint\nbaseflow: \"{}\"",
        dir.path().join("nope.bin").display()
    );
    let err = run(&config(dir.path(), &extra)).unwrap_err();
    assert!(matches!(err, AppError::StateLoad { .. }));
}

#[test]
fn periodic_run_loads_every_phase() {
    let base_dir = tempfile::tempdir().unwrap();
    let mut cfg = config(base_dir.path(), "");
    cfg.output.restart_every = 1;
    cfg.steps = 3;
    run(&cfg).unwrap();
    // a cycle starting at 1 reads the restart files of steps 1, 2 and 3
    std::fs::remove_file(base_dir.path().join("cyl00000.bin")).unwrap();
    let pattern = base_dir.path().join("cyl{}.bin");

    let dir = tempfile::tempdir().unwrap();
    let extra = format!(
        "model: linearperiodic\nperiodic: {{pattern: \"{}\", period: 3, start: 1}}",
        pattern.display()
    );
    let mut cfg = config(dir.path(), &extra);
    cfg.scheme = "rk3".to_string();
    let summary = check(&cfg).unwrap();
    assert_eq!(summary.model, ModelKind::LinearPeriodic);
    assert_eq!(summary.scheme, Scheme::RungeKutta3);

    let result = run(&cfg).unwrap();
    assert_eq!(result.final_timestep, 4);
    // no initial perturbation and no body motion: nothing happens
    assert_eq!(result.net_force, (0.0, 0.0));
}

#[test]
fn periodic_run_subtracts_the_phase_of_its_initial_condition() {
    let base_dir = tempfile::tempdir().unwrap();
    let mut cfg = config(base_dir.path(), "");
    cfg.output.restart_every = 1;
    cfg.steps = 5;
    run(&cfg).unwrap();
    for step in 0..3 {
        std::fs::remove_file(base_dir.path().join(format!("cyl{step:05}.bin"))).unwrap();
    }
    let pattern = base_dir.path().join("cyl{}.bin");
    // step 3 of a cycle starting at file 3 is file 3 itself
    let ic = base_dir.path().join("cyl00003.bin");

    let dir = tempfile::tempdir().unwrap();
    let extra = format!(
        "model: linearperiodic\nperiodic: {{pattern: \"{}\", period: 3, start: 3}}\n\
         initial_condition: \"{}\"\nsubtract_baseflow: true",
        pattern.display(),
        ic.display()
    );
    let result = run(&config(dir.path(), &extra)).unwrap();
    assert_eq!(result.final_timestep, 7);
    assert_eq!(result.net_force, (0.0, 0.0));

    let forces = ForceLog::read(&dir.path().join("cyl.force.jsonl")).unwrap();
    assert!(forces.iter().all(|r| r.fx == 0.0 && r.fy == 0.0));
}

#[test]
fn multistep_scheme_restarted_from_a_checkpoint_matches_a_continuous_run() {
    let continuous_dir = tempfile::tempdir().unwrap();
    let mut cfg = config(continuous_dir.path(), "");
    cfg.scheme = "ab2".to_string();
    cfg.steps = 8;
    let continuous = run(&cfg).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let mut cfg = config(dir.path(), "");
    cfg.scheme = "ab2".to_string();
    run(&cfg).unwrap();
    cfg.initial_condition = Some(dir.path().join("cyl00004.bin"));
    let resumed = run(&cfg).unwrap();

    assert!(resumed.history_loaded);
    assert_eq!(resumed.final_timestep, 8);
    assert_eq!(resumed.final_time, continuous.final_time);
    assert_eq!(resumed.net_force, continuous.net_force);
}

#[test]
fn check_reports_the_setup() {
    let dir = tempfile::tempdir().unwrap();
    let summary = check(&config(dir.path(), "")).unwrap();
    assert_eq!(summary.model, ModelKind::Nonlinear);
    assert_eq!(summary.scheme, Scheme::Euler);
    assert_eq!((summary.nx, summary.ny), (16, 16));
    assert_eq!(summary.num_points, 12);
    assert!(summary.stationary);
    // check does not write anything
    assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
}

#[test]
fn invalid_run_file_is_refused_before_stepping() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path(), "model: linear");
    assert!(matches!(run(&cfg).unwrap_err(), AppError::Validation(_)));
    assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
}
