//! Construct grid, geometry and flow model from a validated run file.

use crate::config::{RunConfig, ShapeConfig, SolverStrategy};
use crate::error::{AppError, AppResult};
use ib_core::Real;
use ib_grid::{Flux, Geometry, Grid, Point2, RigidBody, Vector2};
use ib_model::{
    AdjointNavierStokes, Discretization, FlowModel, LinearizedNavierStokes,
    LinearizedPeriodicNavierStokes, ModelKind, NonlinearNavierStokes, State, periodic_phase,
};
use ib_sim::Scheme;
use ib_solver::SchurMethod;
use std::path::Path;
use tracing::info;

/// Everything a run needs before the timestepper exists.
pub struct RunSetup {
    pub kind: ModelKind,
    pub scheme: Scheme,
    pub model: Box<dyn FlowModel>,
    pub base_flows: BaseFlows,
}

/// Base flows a perturbation model was built about.
#[derive(Debug, Clone, Default)]
pub enum BaseFlows {
    #[default]
    None,
    Steady(State),
    /// `phases[k]` is the base flow at phase `k` of a cycle beginning at `start`.
    Periodic { phases: Vec<State>, start: usize },
}

impl BaseFlows {
    /// The base flow in effect at step `timestep`.
    pub fn at(&self, timestep: u64) -> Option<&State> {
        match self {
            BaseFlows::None => None,
            BaseFlows::Steady(base) => Some(base),
            BaseFlows::Periodic { phases, start } => {
                phases.get(periodic_phase(*start, phases.len(), timestep))
            }
        }
    }
}

pub fn build_grid(config: &RunConfig) -> AppResult<Grid> {
    let g = &config.grid;
    Ok(Grid::new(g.nx, g.ny, g.length, g.xoffset, g.yoffset)?)
}

fn point(p: [Real; 2]) -> Point2<Real> {
    Point2::new(p[0], p[1])
}

pub fn build_geometry(config: &RunConfig) -> AppResult<Geometry> {
    let mut geometry = Geometry::new();
    for body in &config.geometry.bodies {
        let rigid = match &body.shape {
            ShapeConfig::Circle {
                center,
                radius,
                points,
            } => RigidBody::circle(body.name.as_str(), point(*center), *radius, *points)?,
            ShapeConfig::Line { from, to, points } => {
                RigidBody::line(body.name.as_str(), point(*from), point(*to), *points)?
            }
            ShapeConfig::Points { points, center } => {
                let pts: Vec<Point2<Real>> = points.iter().copied().map(point).collect();
                let center = match center {
                    Some(c) => point(*c),
                    None => centroid(&pts),
                };
                RigidBody::from_points(body.name.as_str(), pts, center)?
            }
        };
        info!(
            body = body.name.as_str(),
            points = rigid.num_points(),
            moving = !body.motion.is_stationary(),
            "body added"
        );
        geometry.add_body(rigid.with_motion(body.motion));
    }
    Ok(geometry)
}

fn centroid(points: &[Point2<Real>]) -> Point2<Real> {
    let n = points.len().max(1) as Real;
    let sum = points
        .iter()
        .fold(Vector2::zeros(), |acc, p| acc + p.coords);
    Point2::from(sum / n)
}

/// Conjugate-gradient settings or a direct factorization, per the run file.
pub fn schur_method(config: &RunConfig) -> SchurMethod {
    match config.solver.strategy {
        SolverStrategy::Cholesky => SchurMethod::Cholesky,
        SolverStrategy::ConjugateGradient => SchurMethod::ConjugateGradient {
            tolerance: config.solver.tolerance,
            max_iterations: config.solver.max_iterations,
        },
    }
}

fn load_base_flow(grid: &Grid, num_points: usize, path: &Path, what: &'static str) -> AppResult<State> {
    let mut state = State::new(grid, num_points);
    state
        .try_load(path)
        .map_err(|e| AppError::StateLoad {
            what,
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    info!(path = %path.display(), timestep = state.timestep, "loaded {what}");
    Ok(state)
}

/// Validate `config` and build the model it describes, loading base flows.
pub fn build_setup(config: &RunConfig) -> AppResult<RunSetup> {
    let (kind, scheme) = config.validate()?;
    let grid = build_grid(config)?;
    let geometry = build_geometry(config)?;
    let num_points = geometry.num_points();
    let q_potential = Flux::uniform_flow(&grid, config.freestream.magnitude, config.freestream.alpha);
    let disc = Discretization::new(&grid, geometry, config.reynolds, q_potential)?;

    let (model, base_flows): (Box<dyn FlowModel>, BaseFlows) = match kind {
        ModelKind::Nonlinear => (Box::new(NonlinearNavierStokes::new(disc)), BaseFlows::None),
        ModelKind::Linear | ModelKind::Adjoint => {
            let path = config.baseflow.as_deref().ok_or_else(|| {
                AppError::Model("base flow path missing after validation".to_string())
            })?;
            let base = load_base_flow(&grid, num_points, path, "base flow")?;
            let model: Box<dyn FlowModel> = if kind == ModelKind::Linear {
                Box::new(LinearizedNavierStokes::new(disc, &base)?)
            } else {
                Box::new(AdjointNavierStokes::new(disc, &base)?)
            };
            (model, BaseFlows::Steady(base))
        }
        ModelKind::LinearPeriodic => {
            let periodic = config.periodic.as_ref().ok_or_else(|| {
                AppError::Model("periodic settings missing after validation".to_string())
            })?;
            let bases = (0..periodic.period)
                .map(|phase| {
                    load_base_flow(&grid, num_points, &periodic.phase_path(phase), "periodic base flow")
                })
                .collect::<AppResult<Vec<_>>>()?;
            let model = LinearizedPeriodicNavierStokes::new(disc, &bases, periodic.start)?;
            let phases = BaseFlows::Periodic {
                phases: bases,
                start: periodic.start,
            };
            (Box::new(model), phases)
        }
    };
    info!(model = %kind, scheme = %scheme, points = num_points, "run set up");
    Ok(RunSetup {
        kind,
        scheme,
        model,
        base_flows,
    })
}
