//! Crank-Nicolson diffusion with explicit Euler advection.

use crate::error::SimResult;
use crate::scheme::Scheme;
use crate::stage::StepperCore;
use crate::timestepper::Timestepper;
use ib_core::Real;
use ib_model::{FlowModel, State};
use ib_solver::SchurMethod;
use std::path::Path;

/// First-order scheme:
/// `(1 − h/2 L) γⁿ⁺¹ + h B f = (1 + h/2 L) γⁿ + h N(xⁿ)`.
///
/// Moving bodies are placed at `tⁿ`, the start of the step.
pub struct Euler<M> {
    core: StepperCore<M>,
}

impl<M: FlowModel> Euler<M> {
    pub fn new(model: M, h: Real, method: SchurMethod) -> SimResult<Self> {
        Ok(Self {
            core: StepperCore::new(Scheme::Euler, model, h, &[1.0], method)?,
        })
    }

    pub fn model(&self) -> &M {
        &self.core.model
    }
}

impl<M: FlowModel> Timestepper for Euler<M> {
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
        let explicit = &self.core.nonlinear(x) * h;
        let (gamma, f) = self.core.substep(0, &x.gamma, &explicit, x.time)?;
        self.core.store(x, gamma, f);
        self.core.finish_step(x);
        Ok(())
    }
}
