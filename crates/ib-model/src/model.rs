//! FlowModel trait: the operator set consumed by the timesteppers.

use crate::discretization::Discretization;
use crate::state::State;
use ib_core::Real;
use ib_grid::{BoundaryVector, Flux, Geometry, Grid, Scalar};
use nalgebra::DMatrix;

/// Governing-equation operators for one flow regime.
///
/// A FlowModel must implement:
/// - access to the shared [`Discretization`] (eigenvalues, transform, bodies)
/// - the explicit term `N(x)` evaluated at a state
/// - the boundary-velocity target of the no-slip constraint
///
/// Everything else is derived from the discretization.
pub trait FlowModel {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    fn discretization(&self) -> &Discretization;

    fn discretization_mut(&mut self) -> &mut Discretization;

    /// Explicit (advective) term at `x`, in circulation units per unit time.
    ///
    /// Must not depend on anything in `x` other than `gamma`, `q` and `timestep`.
    fn nonlinear(&self, x: &State) -> Scalar;

    /// Right-hand side `b` of the constraint `C γ = b` for the current body placement.
    fn boundary_target(&self) -> BoundaryVector;

    fn grid(&self) -> &Grid {
        self.discretization().grid()
    }

    fn geometry(&self) -> &Geometry {
        self.discretization().geometry()
    }

    fn num_points(&self) -> usize {
        self.geometry().num_points()
    }

    fn is_stationary(&self) -> bool {
        self.geometry().is_stationary()
    }

    /// Eigenvalues of the linear (viscous) operator.
    fn eigenvalues(&self) -> &DMatrix<Real> {
        self.discretization().eigenvalues()
    }

    /// Forward diagonalizing transform.
    fn s(&self, gamma: &Scalar) -> Scalar {
        self.discretization().s(gamma)
    }

    /// Inverse diagonalizing transform.
    fn s_inv(&self, gamma: &Scalar) -> Scalar {
        self.discretization().s_inv(gamma)
    }

    /// Flux consistent with `gamma`.
    fn compute_flux(&self, gamma: &Scalar) -> Flux {
        self.discretization().flux_from_circulation(gamma)
    }

    /// Recompute `x.q` from `x.gamma`.
    fn refresh_state(&self, x: &mut State) {
        x.q = self.compute_flux(&x.gamma);
    }

    /// Boundary velocity induced by `gamma`.
    fn constraint(&self, gamma: &Scalar) -> BoundaryVector {
        self.discretization().constraint(gamma)
    }

    /// Move the bodies to time `t`.
    fn move_bodies(&mut self, t: Real) {
        self.discretization_mut().move_bodies(t);
    }

    /// Zero state sized for this model.
    fn new_state(&self) -> State {
        State::new(self.grid(), self.num_points())
    }
}

impl<M: FlowModel + ?Sized> FlowModel for Box<M> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn discretization(&self) -> &Discretization {
        (**self).discretization()
    }

    fn discretization_mut(&mut self) -> &mut Discretization {
        (**self).discretization_mut()
    }

    fn nonlinear(&self, x: &State) -> Scalar {
        (**self).nonlinear(x)
    }

    fn boundary_target(&self) -> BoundaryVector {
        (**self).boundary_target()
    }
}
