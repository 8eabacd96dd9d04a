//! Two-stage Runge-Kutta with Crank-Nicolson diffusion.

use crate::error::SimResult;
use crate::scheme::Scheme;
use crate::stage::StepperCore;
use crate::timestepper::Timestepper;
use ib_core::Real;
use ib_model::{FlowModel, State};
use ib_solver::SchurMethod;
use std::path::Path;

/// Second-order two-stage scheme; both stages share one solver:
///
/// ```text
/// (1 − h/2 L) γ₁   + h B f₁ = (1 + h/2 L) γⁿ + h N(xⁿ)
/// (1 − h/2 L) γⁿ⁺¹ + h B f  = (1 + h/2 L) γⁿ + h/2 (N(xⁿ) + N(x₁))
/// ```
pub struct RungeKutta2<M> {
    core: StepperCore<M>,
}

impl<M: FlowModel> RungeKutta2<M> {
    pub fn new(model: M, h: Real, method: SchurMethod) -> SimResult<Self> {
        Ok(Self {
            core: StepperCore::new(Scheme::RungeKutta2, model, h, &[1.0], method)?,
        })
    }

    pub fn model(&self) -> &M {
        &self.core.model
    }
}

impl<M: FlowModel> Timestepper for RungeKutta2<M> {
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
        let t_end = x.time + h;

        let n0 = self.core.nonlinear(x);
        let (gamma, f) = self.core.substep(0, &x.gamma, &(&n0 * h), t_end)?;
        let mut x1 = x.clone();
        self.core.store(&mut x1, gamma, f);

        let mut explicit = n0;
        explicit += &self.core.nonlinear(&x1);
        explicit *= 0.5 * h;
        let (gamma, f) = self.core.substep(0, &x.gamma, &explicit, t_end)?;
        self.core.store(x, gamma, f);
        self.core.finish_step(x);
        Ok(())
    }
}
