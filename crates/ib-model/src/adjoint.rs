//! Adjoint of the linearized Navier-Stokes equations.
//!
//! The explicit term is the exact discrete transpose of the linearized
//! advection operator with respect to the Euclidean inner product on
//! circulation, so `⟨N_L a, b⟩ = ⟨a, N_L† b⟩` to round-off.

use crate::discretization::Discretization;
use crate::error::ModelResult;
use crate::linear::BaseFlow;
use crate::model::FlowModel;
use crate::state::State;
use ib_grid::{BoundaryVector, NodeVector, Scalar, curl, curl_transpose, flux_to_nodes, nodes_to_flux};

#[derive(Clone, Debug)]
pub struct AdjointNavierStokes {
    disc: Discretization,
    base: BaseFlow,
}

impl AdjointNavierStokes {
    pub fn new(disc: Discretization, base: &State) -> ModelResult<Self> {
        let base = BaseFlow::new(&disc, base)?;
        Ok(Self { disc, base })
    }
}

impl FlowModel for AdjointNavierStokes {
    fn name(&self) -> &'static str {
        "adjoint"
    }

    fn discretization(&self) -> &Discretization {
        &self.disc
    }

    fn discretization_mut(&mut self) -> &mut Discretization {
        &mut self.disc
    }

    fn nonlinear(&self, x: &State) -> Scalar {
        let dx = self.grid().dx();
        let z = flux_to_nodes(&curl_transpose(&x.gamma));
        let z = NodeVector {
            x: &z.x * (1.0 / (dx * dx)),
            y: &z.y * (1.0 / (dx * dx)),
        };
        let u0 = &self.base.velocity;
        let g0 = &self.base.gamma;

        // transpose of γ' ↦ u0 × γ'
        let mut n = u0.y.component_mul(&z.x);
        n -= &u0.x.component_mul(&z.y);

        // transpose of γ' ↦ u(γ') × γ0
        let v = NodeVector {
            x: -&g0.component_mul(&z.y),
            y: g0.component_mul(&z.x),
        };
        n += &self
            .disc
            .inverse_neg_laplacian(&curl(&nodes_to_flux(&v)));
        n
    }

    fn boundary_target(&self) -> BoundaryVector {
        self.disc.geometry().velocities()
    }
}
