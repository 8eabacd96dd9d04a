//! Shared sub-step kernel and per-scheme bookkeeping.
//!
//! Crank-Nicolson sub-steps solve
//!
//! ```text
//! (1 − α h/2 L) γ + α h B f = (1 + α h/2 L) γⁿ + explicit
//!                       C γ = b(t_body)
//! ```
//!
//! where `explicit` is the scheme's combination of nonlinear terms, already
//! multiplied by `h`. Schemes that assemble the whole right-hand side
//! themselves call [`StepperCore::solve`] directly.

use crate::error::{SimError, SimResult};
use crate::history::{
    HistorySnapshot, HistoryTag, StoredMatrix, history_path, read_history, write_history,
};
use crate::scheme::Scheme;
use ib_core::{Real, ensure_positive};
use ib_grid::{BoundaryVector, Scalar};
use ib_model::{FlowModel, State};
use ib_solver::{ProjectionSolver, SchurMethod};
use nalgebra::DMatrix;
use std::path::Path;
use tracing::{debug, info};

/// One implicit sub-step with weight `alpha`.
pub(crate) struct Stage {
    solver: ProjectionSolver,
    /// 1 + α h/2 λ per mode
    propagator: DMatrix<Real>,
}

impl Stage {
    fn new<M: FlowModel>(model: &M, h: Real, alpha: Real, method: SchurMethod) -> SimResult<Self> {
        let beta = alpha * h;
        let solver = ProjectionSolver::new(model, beta, method)?;
        let propagator = model.eigenvalues().map(|l| 1.0 + 0.5 * beta * l);
        Ok(Self { solver, propagator })
    }
}

/// Model, stage solvers and the initialized flag shared by every scheme.
pub(crate) struct StepperCore<M> {
    pub(crate) model: M,
    scheme: Scheme,
    h: Real,
    stages: Vec<Stage>,
    initialized: bool,
}

impl<M: FlowModel> StepperCore<M> {
    /// One stage solver per entry of `alphas`.
    pub(crate) fn new(
        scheme: Scheme,
        model: M,
        h: Real,
        alphas: &[Real],
        method: SchurMethod,
    ) -> SimResult<Self> {
        ensure_positive(h, "timestep")?;
        let stages = alphas
            .iter()
            .map(|&alpha| Stage::new(&model, h, alpha, method))
            .collect::<SimResult<Vec<_>>>()?;
        info!(
            scheme = scheme.as_str(),
            model = model.name(),
            h,
            stages = stages.len(),
            "timestepper created"
        );
        Ok(Self {
            model,
            scheme,
            h,
            stages,
            initialized: false,
        })
    }

    pub(crate) fn h(&self) -> Real {
        self.h
    }

    pub(crate) fn scheme(&self) -> Scheme {
        self.scheme
    }

    pub(crate) fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub(crate) fn init(&mut self) -> SimResult<()> {
        if self.initialized {
            return Ok(());
        }
        for stage in &mut self.stages {
            stage.solver.init(&self.model)?;
        }
        self.initialized = true;
        Ok(())
    }

    /// Fail unless `init` or `load` has run and `x` fits the model.
    pub(crate) fn check_ready(&self, x: &State) -> SimResult<()> {
        if !self.initialized {
            return Err(SimError::NotInitialized {
                what: "call init or load before advance",
            });
        }
        self.model.discretization().check_state(x, "state")?;
        Ok(())
    }

    pub(crate) fn nonlinear(&self, x: &State) -> Scalar {
        self.model.nonlinear(x)
    }

    /// Solve stage `k` from circulation `gamma` with the scaled explicit term,
    /// moving the bodies to `t_body` first.
    pub(crate) fn substep(
        &mut self,
        k: usize,
        gamma: &Scalar,
        explicit: &Scalar,
        t_body: Real,
    ) -> SimResult<(Scalar, BoundaryVector)> {
        let mut source = self
            .model
            .discretization()
            .apply_diagonal(gamma, &self.stages[k].propagator);
        source += explicit;
        self.solve(k, &source, t_body)
    }

    /// Solve `(1 − α_k h/2 L) γ + α_k h B f = source` with `C γ = b(t_body)`.
    pub(crate) fn solve(
        &mut self,
        k: usize,
        source: &Scalar,
        t_body: Real,
    ) -> SimResult<(Scalar, BoundaryVector)> {
        if !self.model.is_stationary() {
            self.model.move_bodies(t_body);
        }
        let target = self.model.boundary_target();
        let (gamma, f) = self.stages[k].solver.solve(&self.model, source, &target)?;
        debug!(stage = k, t_body, "sub-step solved");
        Ok((gamma, f))
    }

    /// Store a solved circulation and force into `x`, refreshing its flux.
    pub(crate) fn store(&self, x: &mut State, gamma: Scalar, f: BoundaryVector) {
        x.gamma = gamma;
        x.f = f;
        self.model.refresh_state(x);
    }

    pub(crate) fn finish_step(&self, x: &mut State) {
        x.time += self.h;
        x.timestep += 1;
        debug!(
            scheme = self.scheme.as_str(),
            timestep = x.timestep,
            time = x.time,
            "advanced"
        );
    }

    fn tag(&self) -> HistoryTag {
        HistoryTag {
            scheme: self.scheme.as_str().to_string(),
            model: self.model.name().to_string(),
            timestep: self.h,
            nx: self.model.grid().nx() as u64,
            ny: self.model.grid().ny() as u64,
            num_points: self.model.num_points() as u64,
        }
    }

    /// Write the stage solvers and `previous_nonlinear` under `basename`.
    pub(crate) fn save(&self, basename: &Path, previous_nonlinear: Option<&Scalar>) -> SimResult<()> {
        if !self.initialized {
            return Err(SimError::NotInitialized {
                what: "nothing to save before init",
            });
        }
        let path = history_path(basename, self.scheme);
        let mut snapshot = HistorySnapshot::new(self.tag());
        snapshot.schur = self
            .stages
            .iter()
            .map(|s| s.solver.schur_matrix().map(StoredMatrix::from_matrix))
            .collect();
        snapshot.previous_nonlinear = previous_nonlinear.map(|n| n.values().to_vec());
        write_history(&path, &snapshot)?;
        info!(path = %path.display(), "saved timestepper history");
        Ok(())
    }

    /// Restore the stage solvers from `basename`.
    ///
    /// Returns `Ok(None)` if no history exists; otherwise the core is
    /// initialized and the stored previous nonlinear term (if any) is returned.
    pub(crate) fn load(&mut self, basename: &Path) -> SimResult<Option<Option<Scalar>>> {
        let path = history_path(basename, self.scheme);
        let Some(snapshot) = read_history(&path, &self.tag())? else {
            debug!(path = %path.display(), "no timestepper history");
            return Ok(None);
        };
        let incompatible = |what: String| SimError::IncompatibleHistory {
            path: path.clone(),
            what,
        };
        if snapshot.schur.len() != self.stages.len() {
            return Err(incompatible(format!(
                "{} stage solvers (expected {})",
                snapshot.schur.len(),
                self.stages.len()
            )));
        }
        let previous = match snapshot.previous_nonlinear {
            None => None,
            Some(values) => {
                let mut n = self.model.new_state().gamma;
                if values.len() != n.len() {
                    return Err(incompatible("nonlinear term has wrong length".to_string()));
                }
                n.copy_from_slice(&values);
                Some(n)
            }
        };

        for (k, (stage, stored)) in self.stages.iter_mut().zip(&snapshot.schur).enumerate() {
            if !stage.solver.needs_init(&self.model) {
                continue;
            }
            let matrix = stored
                .as_ref()
                .and_then(StoredMatrix::to_matrix)
                .ok_or_else(|| incompatible(format!("stage {k} has no Schur matrix")))?;
            let expected = 2 * self.model.num_points();
            if matrix.nrows() != expected {
                return Err(incompatible(format!(
                    "stage {k} Schur matrix is {n}x{n} (expected {expected}x{expected})",
                    n = matrix.nrows()
                )));
            }
            stage.solver.set_schur_matrix(matrix)?;
        }
        self.initialized = true;
        info!(path = %path.display(), "loaded timestepper history");
        Ok(Some(previous))
    }
}
