//! Third-order implicit-explicit Runge-Kutta (Ascher, Ruuth and Spiteri (4,4,3)).

use crate::error::SimResult;
use crate::scheme::Scheme;
use crate::stage::StepperCore;
use crate::timestepper::Timestepper;
use ib_core::Real;
use ib_grid::{BoundaryVector, Scalar};
use ib_model::{FlowModel, State};
use ib_solver::SchurMethod;
use std::path::Path;

const STAGES: usize = 4;

/// Weights of earlier stages' implicit terms `L γ_j − B F_j`. Every stage has
/// the diagonal weight 1/2, so all stages share one Crank-Nicolson-shaped solver.
const IMPLICIT: [[Real; 3]; STAGES] = [
    [0.0, 0.0, 0.0],
    [1.0 / 6.0, 0.0, 0.0],
    [-0.5, 0.5, 0.0],
    [1.5, -1.5, 0.5],
];
/// Weights of the nonlinear terms; column 0 is `N(xⁿ)`, column `j` is `N` of stage `j − 1`.
const EXPLICIT: [[Real; 4]; STAGES] = [
    [0.5, 0.0, 0.0, 0.0],
    [11.0 / 18.0, 1.0 / 18.0, 0.0, 0.0],
    [5.0 / 6.0, -5.0 / 6.0, 0.5, 0.0],
    [0.25, 1.75, 0.75, -1.75],
];
/// Stage times as fractions of `h`.
const STAGE_TIME: [Real; STAGES] = [0.5, 2.0 / 3.0, 0.5, 1.0];
/// Quadrature weights of the implicit part; the last stage is the new state.
const WEIGHT: [Real; STAGES] = [1.5, -1.5, 0.5, 0.5];

/// Third-order scheme, stiffly accurate in both its implicit and explicit parts.
///
/// Stage `s` solves
///
/// ```text
/// (1 − h/2 L) γ_s + h/2 B F_s = γⁿ + h Σ_{j<s} a_sj (L γ_j − B F_j) + h Σ_j â_sj N_j
///                        C γ_s = b(tⁿ + c_s h)
/// ```
///
/// and the last stage is `γⁿ⁺¹`, so the step ends on the constraint. The
/// reported force is the step average `Σ b_s F_s`, the same impulse per step as
/// the Crank-Nicolson schemes report.
pub struct RungeKutta3<M> {
    core: StepperCore<M>,
}

impl<M: FlowModel> RungeKutta3<M> {
    pub fn new(model: M, h: Real, method: SchurMethod) -> SimResult<Self> {
        Ok(Self {
            core: StepperCore::new(Scheme::RungeKutta3, model, h, &[1.0], method)?,
        })
    }

    pub fn model(&self) -> &M {
        &self.core.model
    }
}

impl<M: FlowModel> Timestepper for RungeKutta3<M> {
    fn scheme(&self) -> Scheme {
        self.core.scheme()
    }

    fn timestep(&self) -> Real {
        self.core.h()
    }

    fn model(&self) -> &dyn FlowModel {
        &self.core.model
    }

    fn is_initialized(&self) -> bool {
        self.core.is_initialized()
    }

    fn init(&mut self) -> SimResult<()> {
        self.core.init()
    }

    fn load(&mut self, basename: &Path) -> SimResult<bool> {
        Ok(self.core.load(basename)?.is_some())
    }

    fn save(&self, basename: &Path) -> SimResult<()> {
        self.core.save(basename, None)
    }

    fn advance(&mut self, x: &mut State) -> SimResult<()> {
        self.core.check_ready(x)?;
        let h = self.core.h();
        let t0 = x.time;

        let mut nonlinear: Vec<Scalar> = Vec::with_capacity(STAGES);
        nonlinear.push(self.core.nonlinear(x));
        let mut implicit: Vec<Scalar> = Vec::with_capacity(STAGES);
        let mut force = BoundaryVector::zeros(x.f.num_points());
        let mut stage_state = x.clone();

        for s in 0..STAGES {
            let mut source = x.gamma.clone();
            for (w, k) in IMPLICIT[s].iter().zip(&implicit) {
                source += &(k * (w * h));
            }
            for (w, n) in EXPLICIT[s].iter().zip(&nonlinear) {
                source += &(n * (w * h));
            }
            let (gamma, f) = self.core.solve(0, &source, t0 + STAGE_TIME[s] * h)?;

            // the solver's force is F_s / 2, so h/2 (L γ_s − B F_s) = γ_s − source
            let mut k = &gamma - &source;
            k *= 2.0 / h;
            implicit.push(k);
            force += &(&f * (2.0 * WEIGHT[s]));

            self.core.store(&mut stage_state, gamma, f);
            if s + 1 < STAGES {
                nonlinear.push(self.core.nonlinear(&stage_state));
            }
        }

        x.gamma = stage_state.gamma;
        x.q = stage_state.q;
        x.f = force;
        self.core.finish_step(x);
        Ok(())
    }
}
