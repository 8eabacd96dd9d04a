//! Operators shared by every flow model.
//!
//! Holds the grid, the immersed bodies with their regularized delta, and the
//! sine transform with the eigenvalues of the viscous term. The eigenvalues
//! are computed once here and never change.

use crate::error::{ModelError, ModelResult};
use crate::state::State;
use ib_core::{Real, ensure_positive};
use ib_grid::{
    BoundaryVector, Flux, Geometry, Grid, NodeVector, Regularizer, Scalar, SineTransform, cross,
    curl, curl_transpose, flux_to_nodes, nodes_to_flux,
};
use nalgebra::DMatrix;
use tracing::info;

#[derive(Clone, Debug)]
pub struct Discretization {
    grid: Grid,
    geometry: Geometry,
    regularizer: Regularizer,
    transform: SineTransform,
    /// 1 / (−λ) per mode, applies (−Δh)⁻¹
    inverse_neg_laplacian: DMatrix<Real>,
    /// λ / (Re·dx²) per mode
    eigenvalues: DMatrix<Real>,
    reynolds: Real,
    q_potential: Flux,
}

impl Discretization {
    /// Set up operators for `geometry` on `grid` at Reynolds number `reynolds`.
    ///
    /// `q_potential` is the free-stream flux added to the rotational flux when
    /// a total velocity is needed.
    pub fn new(
        grid: &Grid,
        mut geometry: Geometry,
        reynolds: Real,
        q_potential: Flux,
    ) -> ModelResult<Self> {
        ensure_positive(reynolds, "reynolds number")?;
        if q_potential.nx() != grid.nx() || q_potential.ny() != grid.ny() {
            return Err(ModelError::InvalidSetup {
                what: "potential flux does not match grid".to_string(),
            });
        }
        geometry.move_bodies(0.0);
        let regularizer = Regularizer::new(grid, &geometry.positions());
        let laplacian = SineTransform::laplacian_eigenvalues(grid);
        let dx = grid.dx();
        let eigenvalues = laplacian.map(|l| l / (reynolds * dx * dx));
        let inverse_neg_laplacian = laplacian.map(|l| -1.0 / l);
        info!(
            nx = grid.nx(),
            ny = grid.ny(),
            points = geometry.num_points(),
            reynolds,
            "discretization ready"
        );
        Ok(Self {
            grid: grid.clone(),
            regularizer,
            transform: SineTransform::new(grid),
            geometry,
            inverse_neg_laplacian,
            eigenvalues,
            reynolds,
            q_potential,
        })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn regularizer(&self) -> &Regularizer {
        &self.regularizer
    }

    pub fn reynolds(&self) -> Real {
        self.reynolds
    }

    pub fn q_potential(&self) -> &Flux {
        &self.q_potential
    }

    /// Eigenvalues of the viscous operator `L = Δh / (Re·dx²)`.
    pub fn eigenvalues(&self) -> &DMatrix<Real> {
        &self.eigenvalues
    }

    pub fn s(&self, g: &Scalar) -> Scalar {
        self.transform.forward(g)
    }

    pub fn s_inv(&self, g: &Scalar) -> Scalar {
        self.transform.inverse(g)
    }

    /// Operator diagonal in the sine basis with entries `diag`.
    pub fn apply_diagonal(&self, g: &Scalar, diag: &DMatrix<Real>) -> Scalar {
        self.transform.apply_diagonal(g, diag)
    }

    /// Entry-wise `1/(−λ)` of the unscaled Laplacian, for composing with other diagonal factors.
    pub fn inverse_neg_laplacian_diagonal(&self) -> &DMatrix<Real> {
        &self.inverse_neg_laplacian
    }

    pub fn inverse_neg_laplacian(&self, g: &Scalar) -> Scalar {
        self.transform.apply_diagonal(g, &self.inverse_neg_laplacian)
    }

    /// Rotational flux `CurlT (−Δh)⁻¹ γ` from circulation.
    pub fn flux_from_circulation(&self, gamma: &Scalar) -> Flux {
        curl_transpose(&self.inverse_neg_laplacian(gamma))
    }

    /// Constraint operator: boundary velocity induced by circulation.
    pub fn constraint(&self, gamma: &Scalar) -> BoundaryVector {
        self.regularizer.interpolate(&self.flux_from_circulation(gamma))
    }

    /// Circulation source produced by boundary force `f`: `Curl Eᵀ f`.
    pub fn force_coupling(&self, f: &BoundaryVector) -> Scalar {
        curl(&self.regularizer.spread(f))
    }

    /// `Curl(w averaged to faces) / dx²` for a node field `w`.
    pub fn curl_of_nodes(&self, w: &NodeVector) -> Scalar {
        let dx = self.grid.dx();
        &curl(&nodes_to_flux(w)) * (1.0 / (dx * dx))
    }

    /// Node velocities (in flux units) of the total flow `q + q∞`.
    pub fn total_node_velocity(&self, q: &Flux) -> NodeVector {
        flux_to_nodes(&(q + &self.q_potential))
    }

    /// Rotational form of advection, `∇×(u×ω)`, in circulation units.
    pub fn advection(&self, u: &NodeVector, gamma: &Scalar) -> Scalar {
        self.curl_of_nodes(&cross(u, gamma))
    }

    /// Place bodies at time `t` and refresh the delta weights.
    pub fn move_bodies(&mut self, t: Real) {
        self.geometry.move_bodies(t);
        self.regularizer.update(&self.grid, &self.geometry.positions());
    }

    /// Check that `x` was built for this grid and geometry.
    pub fn check_state(&self, x: &State, what: &str) -> ModelResult<()> {
        if x.grid().nx() != self.grid.nx() || x.grid().ny() != self.grid.ny() {
            return Err(ModelError::InvalidSetup {
                what: format!("{what}: grid does not match model grid"),
            });
        }
        if x.num_points() != self.geometry.num_points() {
            return Err(ModelError::InvalidSetup {
                what: format!(
                    "{what}: {} boundary points, geometry has {}",
                    x.num_points(),
                    self.geometry.num_points()
                ),
            });
        }
        Ok(())
    }
}
