//! Timestepper contract and scheme construction.

use crate::adams_bashforth::AdamsBashforth;
use crate::error::SimResult;
use crate::euler::Euler;
use crate::runge_kutta2::RungeKutta2;
use crate::runge_kutta3::RungeKutta3;
use crate::scheme::Scheme;
use ib_core::Real;
use ib_model::{FlowModel, State};
use ib_solver::SchurMethod;
use std::path::Path;

/// Advances a [`State`] by one fixed timestep.
///
/// Lifecycle: construct, then either [`Timestepper::load`] a compatible
/// history or call [`Timestepper::init`] (and usually [`Timestepper::save`]),
/// then call [`Timestepper::advance`] repeatedly. Solver failures inside
/// `advance` leave the state unusable and must end the run.
pub trait Timestepper {
    fn scheme(&self) -> Scheme;

    /// Fixed timestep `h`.
    fn timestep(&self) -> Real;

    fn model(&self) -> &dyn FlowModel;

    fn is_initialized(&self) -> bool;

    /// Prepare the stage solvers. Calling it again is a no-op.
    fn init(&mut self) -> SimResult<()>;

    /// Restore history saved under `basename`; `Ok(false)` if there is none.
    fn load(&mut self, basename: &Path) -> SimResult<bool>;

    /// Save history under `basename`.
    fn save(&self, basename: &Path) -> SimResult<()>;

    /// Advance `x` by one timestep in place.
    fn advance(&mut self, x: &mut State) -> SimResult<()>;
}

/// Build the timestepper for `scheme`.
pub fn build_timestepper<M: FlowModel + 'static>(
    scheme: Scheme,
    model: M,
    h: Real,
    method: SchurMethod,
) -> SimResult<Box<dyn Timestepper>> {
    Ok(match scheme {
        Scheme::Euler => Box::new(Euler::new(model, h, method)?),
        Scheme::AdamsBashforth => Box::new(AdamsBashforth::new(model, h, method)?),
        Scheme::RungeKutta2 => Box::new(RungeKutta2::new(model, h, method)?),
        Scheme::RungeKutta3 => Box::new(RungeKutta3::new(model, h, method)?),
    })
}
