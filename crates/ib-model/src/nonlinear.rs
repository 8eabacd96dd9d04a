//! Full nonlinear Navier-Stokes equations.

use crate::discretization::Discretization;
use crate::model::FlowModel;
use crate::state::State;
use ib_grid::{BoundaryVector, Scalar};

/// Nonlinear model: advection by the total flow `q + q∞`.
#[derive(Clone, Debug)]
pub struct NonlinearNavierStokes {
    disc: Discretization,
}

impl NonlinearNavierStokes {
    pub fn new(disc: Discretization) -> Self {
        Self { disc }
    }
}

impl FlowModel for NonlinearNavierStokes {
    fn name(&self) -> &'static str {
        "nonlinear"
    }

    fn discretization(&self) -> &Discretization {
        &self.disc
    }

    fn discretization_mut(&mut self) -> &mut Discretization {
        &mut self.disc
    }

    fn nonlinear(&self, x: &State) -> Scalar {
        let u = self.disc.total_node_velocity(&x.q);
        self.disc.advection(&u, &x.gamma)
    }

    /// Body velocity minus the free stream seen at the boundary points.
    fn boundary_target(&self) -> BoundaryVector {
        let mut b = self.disc.geometry().velocities();
        b -= &self.disc.regularizer().interpolate(self.disc.q_potential());
        b
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ib_grid::{Flux, Geometry, Grid, Point2, RigidBody};

    fn model() -> NonlinearNavierStokes {
        let grid = Grid::new(16, 16, 4.0, -2.0, -2.0).unwrap();
        let geom = Geometry::new()
            .with_body(RigidBody::circle("cyl", Point2::origin(), 0.5, 12).unwrap());
        let q0 = Flux::uniform_flow(&grid, 1.0, 0.0);
        NonlinearNavierStokes::new(Discretization::new(&grid, geom, 100.0, q0).unwrap())
    }

    #[test]
    fn zero_vorticity_has_zero_nonlinear_term() {
        let m = model();
        let x = m.new_state();
        assert_eq!(m.nonlinear(&x).norm_inf(), 0.0);
    }

    #[test]
    fn target_cancels_free_stream() {
        let m = model();
        let b = m.boundary_target();
        assert_eq!(b.num_points(), 12);
        for k in 0..12 {
            assert!((b.x(k) + 1.0).abs() < 1e-12);
            assert!(b.y(k).abs() < 1e-12);
        }
    }
}
