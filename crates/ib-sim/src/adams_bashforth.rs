//! Crank-Nicolson diffusion with second-order Adams-Bashforth advection.

use crate::error::SimResult;
use crate::scheme::Scheme;
use crate::stage::StepperCore;
use crate::timestepper::Timestepper;
use ib_core::Real;
use ib_grid::Scalar;
use ib_model::{FlowModel, State};
use ib_solver::SchurMethod;
use std::path::Path;
use tracing::debug;

/// `(1 − h/2 L) γⁿ⁺¹ + h B f = (1 + h/2 L) γⁿ + h (3/2 Nⁿ − 1/2 Nⁿ⁻¹)`.
///
/// Without history (a fresh start, or a restart whose history file held no
/// previous term) the first step takes `Nⁿ⁻¹ = Nⁿ` and is exactly an Euler
/// step, so that step is first order. Moving bodies are placed at `tⁿ`.
pub struct AdamsBashforth<M> {
    core: StepperCore<M>,
    previous: Option<Scalar>,
}

impl<M: FlowModel> AdamsBashforth<M> {
    pub fn new(model: M, h: Real, method: SchurMethod) -> SimResult<Self> {
        Ok(Self {
            core: StepperCore::new(Scheme::AdamsBashforth, model, h, &[1.0], method)?,
            previous: None,
        })
    }

    pub fn model(&self) -> &M {
        &self.core.model
    }

    /// Nonlinear term of the last completed step.
    pub fn previous_nonlinear(&self) -> Option<&Scalar> {
        self.previous.as_ref()
    }
}

impl<M: FlowModel> Timestepper for AdamsBashforth<M> {
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
        match self.core.load(basename)? {
            Some(previous) => {
                self.previous = previous;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn save(&self, basename: &Path) -> SimResult<()> {
        self.core.save(basename, self.previous.as_ref())
    }

    fn advance(&mut self, x: &mut State) -> SimResult<()> {
        self.core.check_ready(x)?;
        let h = self.core.h();
        let n = self.core.nonlinear(x);
        let explicit = match &self.previous {
            Some(prev) => {
                let mut e = &n * (1.5 * h);
                e -= &(prev * (0.5 * h));
                e
            }
            None => {
                debug!("no previous nonlinear term, taking an Euler step");
                &n * h
            }
        };
        let (gamma, f) = self.core.substep(0, &x.gamma, &explicit, x.time)?;
        self.core.store(x, gamma, f);
        self.previous = Some(n);
        self.core.finish_step(x);
        Ok(())
    }
}
