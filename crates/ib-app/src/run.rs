//! The time loop.

use crate::build::{build_setup, schur_method};
use crate::config::RunConfig;
use crate::error::AppResult;
use crate::output::{ForceLog, Logger, RestartWriter};
use ib_core::Real;
use ib_model::{FlowModel, ModelKind};
use ib_sim::{Scheme, build_timestepper};
use std::fs;
use std::time::Instant;
use tracing::{debug, info, warn};

/// What a finished run reports.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub steps: u64,
    pub final_timestep: u64,
    pub final_time: Real,
    pub net_force: (Real, Real),
    /// Whether the timestepper resumed from a history file instead of `init`.
    pub history_loaded: bool,
    pub wall_time_s: f64,
}

/// What `check` found in a run file.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckSummary {
    pub model: ModelKind,
    pub scheme: Scheme,
    pub nx: usize,
    pub ny: usize,
    pub num_points: usize,
    pub stationary: bool,
}

/// Validate the run file and build the model without stepping.
pub fn check(config: &RunConfig) -> AppResult<CheckSummary> {
    let setup = build_setup(config)?;
    Ok(CheckSummary {
        model: setup.kind,
        scheme: setup.scheme,
        nx: setup.model.grid().nx(),
        ny: setup.model.grid().ny(),
        num_points: setup.model.num_points(),
        stationary: setup.model.is_stationary(),
    })
}

/// Execute the run described by `config`.
///
/// The timestepper resumes from `<dir>/<name>.<scheme>.hist` when present and
/// otherwise initializes and writes it; the history is rewritten at every
/// restart checkpoint. The initial condition falls back to rest (with a
/// warning) when it cannot be loaded.
pub fn run(config: &RunConfig) -> AppResult<RunSummary> {
    let started = Instant::now();
    let setup = build_setup(config)?;
    let outdir = &config.output.dir;
    fs::create_dir_all(outdir)?;
    fs::write(
        outdir.join(format!("{}.yaml", config.name)),
        config.to_yaml_string()?,
    )?;

    let mut stepper = build_timestepper(setup.scheme, setup.model, config.dt, schur_method(config))?;
    info!(scheme = %stepper.scheme(), dt = config.dt, "timestepper ready");
    let basename = outdir.join(&config.name);
    let history_loaded = stepper.load(&basename)?;
    if !history_loaded {
        stepper.init()?;
        stepper.save(&basename)?;
    }

    let mut x = stepper.model().new_state();
    if let Some(ic) = &config.initial_condition {
        info!(path = %ic.display(), "loading initial condition");
        if !x.load(ic) {
            warn!(path = %ic.display(), "could not load initial condition, starting from rest");
        }
        if config.subtract_baseflow {
            if let Some(base) = setup.base_flows.at(x.timestep) {
                x.gamma -= &base.gamma;
                x.q -= &base.q;
                x.f.fill(0.0);
                info!(timestep = x.timestep, "subtracted base flow from initial condition");
            }
        }
    } else {
        info!("zero initial condition");
    }

    let mut logger = Logger::new();
    logger.add_output(
        Box::new(RestartWriter::new(outdir.clone(), config.name.clone())),
        config.output.restart_every,
    );
    logger.add_output(
        Box::new(ForceLog::new(outdir.join(format!("{}.force.jsonl", config.name)))),
        config.output.force_every,
    );
    logger.init()?;
    logger.do_output(&x)?;

    info!(steps = config.steps, start = x.timestep, "integrating");
    for i in 1..=config.steps {
        stepper.advance(&mut x)?;
        let (fx, fy) = x.compute_net_force();
        debug!(step = i, timestep = x.timestep, time = x.time, fx, fy, "step done");
        logger.do_output(&x)?;
        let restart_every = config.output.restart_every;
        if restart_every > 0 && x.timestep % restart_every == 0 {
            stepper.save(&basename)?;
        }
    }
    logger.finish()?;

    let summary = RunSummary {
        steps: config.steps,
        final_timestep: x.timestep,
        final_time: x.time,
        net_force: x.compute_net_force(),
        history_loaded,
        wall_time_s: started.elapsed().as_secs_f64(),
    };
    info!(
        timestep = summary.final_timestep,
        time = summary.final_time,
        fx = summary.net_force.0,
        fy = summary.net_force.1,
        "run finished"
    );
    Ok(summary)
}
