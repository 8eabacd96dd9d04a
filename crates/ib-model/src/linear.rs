//! Navier-Stokes equations linearized about a steady base flow.

use crate::discretization::Discretization;
use crate::error::ModelResult;
use crate::model::FlowModel;
use crate::state::State;
use ib_grid::{BoundaryVector, NodeVector, Scalar, flux_to_nodes};

/// Base flow data used by the linearized operators.
#[derive(Clone, Debug)]
pub(crate) struct BaseFlow {
    pub(crate) gamma: Scalar,
    /// total node velocity `q0 + q∞`
    pub(crate) velocity: NodeVector,
}

impl BaseFlow {
    /// Flux is recomputed from the base circulation so the pair is consistent.
    pub(crate) fn new(disc: &Discretization, base: &State) -> ModelResult<Self> {
        disc.check_state(base, "base flow")?;
        let q0 = disc.flux_from_circulation(&base.gamma);
        Ok(Self {
            gamma: base.gamma.clone(),
            velocity: disc.total_node_velocity(&q0),
        })
    }
}

/// `∇×(u0×ω') + ∇×(u'×ω0)` for a perturbation `x`.
pub(crate) fn linearized_advection(disc: &Discretization, base: &BaseFlow, x: &State) -> Scalar {
    let mut n = disc.advection(&base.velocity, &x.gamma);
    n += &disc.advection(&flux_to_nodes(&x.q), &base.gamma);
    n
}

#[derive(Clone, Debug)]
pub struct LinearizedNavierStokes {
    disc: Discretization,
    base: BaseFlow,
}

impl LinearizedNavierStokes {
    pub fn new(disc: Discretization, base: &State) -> ModelResult<Self> {
        let base = BaseFlow::new(&disc, base)?;
        Ok(Self { disc, base })
    }
}

impl FlowModel for LinearizedNavierStokes {
    fn name(&self) -> &'static str {
        "linear"
    }

    fn discretization(&self) -> &Discretization {
        &self.disc
    }

    fn discretization_mut(&mut self) -> &mut Discretization {
        &mut self.disc
    }

    fn nonlinear(&self, x: &State) -> Scalar {
        linearized_advection(&self.disc, &self.base, x)
    }

    /// Perturbation velocity of the bodies; the base flow already satisfies no-slip.
    fn boundary_target(&self) -> BoundaryVector {
        self.disc.geometry().velocities()
    }
}
