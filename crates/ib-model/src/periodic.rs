//! Navier-Stokes equations linearized about a time-periodic base flow.

use crate::discretization::Discretization;
use crate::error::{ModelError, ModelResult};
use crate::linear::{BaseFlow, linearized_advection};
use crate::model::FlowModel;
use crate::state::State;
use ib_grid::{BoundaryVector, Scalar};

/// Linearized model cycling through `period` base-flow snapshots.
///
/// The active snapshot is a pure function of the state's step counter:
/// `(period_start + timestep) mod period`. Nothing else is stored, so the phase
/// survives a restart through the saved step counter.
#[derive(Clone, Debug)]
pub struct LinearizedPeriodicNavierStokes {
    disc: Discretization,
    bases: Vec<BaseFlow>,
    period_start: usize,
}

impl LinearizedPeriodicNavierStokes {
    /// `bases[k]` is the base flow at phase `k`, for `k` in `0..period`.
    pub fn new(disc: Discretization, bases: &[State], period_start: usize) -> ModelResult<Self> {
        if bases.is_empty() {
            return Err(ModelError::InvalidSetup {
                what: "periodic model needs at least one base flow".to_string(),
            });
        }
        let bases = bases
            .iter()
            .map(|b| BaseFlow::new(&disc, b))
            .collect::<ModelResult<Vec<_>>>()?;
        Ok(Self {
            disc,
            bases,
            period_start,
        })
    }

    pub fn period(&self) -> usize {
        self.bases.len()
    }

    pub fn period_start(&self) -> usize {
        self.period_start
    }

    /// Phase of the base flow used at step `timestep`.
    pub fn active_index(&self, timestep: u64) -> usize {
        periodic_phase(self.period_start, self.period(), timestep)
    }
}

/// Phase `(start + timestep) mod period` of a base flow cycle; 0 when `period` is 0.
pub fn periodic_phase(start: usize, period: usize, timestep: u64) -> usize {
    if period == 0 {
        return 0;
    }
    let period = period as u64;
    ((start as u64 % period + timestep % period) % period) as usize
}

impl FlowModel for LinearizedPeriodicNavierStokes {
    fn name(&self) -> &'static str {
        "linearperiodic"
    }

    fn discretization(&self) -> &Discretization {
        &self.disc
    }

    fn discretization_mut(&mut self) -> &mut Discretization {
        &mut self.disc
    }

    fn nonlinear(&self, x: &State) -> Scalar {
        let base = &self.bases[self.active_index(x.timestep)];
        linearized_advection(&self.disc, base, x)
    }

    fn boundary_target(&self) -> BoundaryVector {
        self.disc.geometry().velocities()
    }
}
