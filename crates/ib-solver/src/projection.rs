//! Schur-complement projection solver.

use crate::cg::conjugate_gradient;
use crate::error::{SolverError, SolverResult};
use ib_core::{Real, ensure_positive};
use ib_grid::{BoundaryVector, Scalar, curl_transpose};
use ib_model::FlowModel;
use nalgebra::{Cholesky, DMatrix, DVector, Dyn};
use tracing::{debug, info};

/// How the reduced system on the boundary forces is solved.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SchurMethod {
    /// Assemble the Schur complement once and factorize it.
    Cholesky,
    /// Matrix-free conjugate gradients; required for moving bodies.
    ConjugateGradient {
        /// Relative residual tolerance
        tolerance: Real,
        /// Iteration cap
        max_iterations: usize,
    },
}

impl Default for SchurMethod {
    fn default() -> Self {
        SchurMethod::Cholesky
    }
}

impl SchurMethod {
    /// Conjugate gradients with the default budget.
    pub fn iterative() -> Self {
        SchurMethod::ConjugateGradient {
            tolerance: 1e-10,
            max_iterations: 5000,
        }
    }
}

struct SchurFactor {
    matrix: DMatrix<Real>,
    cholesky: Cholesky<Real, Dyn>,
}

/// Solver for `(1 − β/2·L) γ + β B f = a`, `C γ = b` at a fixed `β`.
pub struct ProjectionSolver {
    beta: Real,
    method: SchurMethod,
    /// 1 / (1 − β/2·λ) per mode, applies A⁻¹
    implicit_inverse: DMatrix<Real>,
    /// (−Δh)⁻¹ A⁻¹ per mode
    flux_inverse: DMatrix<Real>,
    schur: Option<SchurFactor>,
}

impl ProjectionSolver {
    /// Build a solver for `model` at implicit weight `beta`.
    ///
    /// A Cholesky request on moving geometry falls back to conjugate gradients,
    /// since the assembled matrix would go stale as the bodies move.
    pub fn new<M: FlowModel + ?Sized>(
        model: &M,
        beta: Real,
        method: SchurMethod,
    ) -> SolverResult<Self> {
        ensure_positive(beta, "solver beta")?;
        if let SchurMethod::ConjugateGradient {
            tolerance,
            max_iterations,
        } = method
        {
            ensure_positive(tolerance, "conjugate gradient tolerance")?;
            if max_iterations == 0 {
                return Err(SolverError::Setup {
                    what: "conjugate gradient needs at least one iteration".to_string(),
                });
            }
        }
        let method = match method {
            SchurMethod::Cholesky if !model.is_stationary() => {
                info!("moving geometry: using conjugate gradients instead of Cholesky");
                SchurMethod::iterative()
            }
            m => m,
        };

        let implicit_inverse = model.eigenvalues().map(|l| 1.0 / (1.0 - 0.5 * beta * l));
        let flux_inverse = implicit_inverse.component_mul(
            model.discretization().inverse_neg_laplacian_diagonal(),
        );
        Ok(Self {
            beta,
            method,
            implicit_inverse,
            flux_inverse,
            schur: None,
        })
    }

    pub fn beta(&self) -> Real {
        self.beta
    }

    pub fn method(&self) -> SchurMethod {
        self.method
    }

    /// Whether [`ProjectionSolver::init`] still has work to do for `model`.
    pub fn needs_init<M: FlowModel + ?Sized>(&self, model: &M) -> bool {
        matches!(self.method, SchurMethod::Cholesky)
            && self.schur.is_none()
            && model.num_points() > 0
    }

    /// Assemble and factorize the Schur complement (Cholesky only).
    pub fn init<M: FlowModel + ?Sized>(&mut self, model: &M) -> SolverResult<()> {
        if !self.needs_init(model) {
            return Ok(());
        }
        let n = 2 * model.num_points();
        info!(size = n, beta = self.beta, "assembling Schur complement");
        let mut matrix = DMatrix::zeros(n, n);
        let mut e = BoundaryVector::zeros(model.num_points());
        for col in 0..n {
            e.fill(0.0);
            e.as_vector_mut()[col] = 1.0;
            let column = self.apply_schur(model, &e);
            matrix.set_column(col, column.as_vector());
        }
        // symmetric in exact arithmetic; remove round-off asymmetry before factorizing
        let matrix = (&matrix + matrix.transpose()) * 0.5;
        self.set_schur_matrix(matrix)
    }

    /// The assembled Schur complement, if any.
    pub fn schur_matrix(&self) -> Option<&DMatrix<Real>> {
        self.schur.as_ref().map(|s| &s.matrix)
    }

    /// Install a previously assembled Schur complement and factorize it.
    pub fn set_schur_matrix(&mut self, matrix: DMatrix<Real>) -> SolverResult<()> {
        if !matrix.is_square() {
            return Err(SolverError::Setup {
                what: format!("Schur matrix is {}x{}", matrix.nrows(), matrix.ncols()),
            });
        }
        if matrix.iter().any(|v| !v.is_finite()) {
            return Err(SolverError::Numeric {
                what: "Schur matrix has non-finite entries".to_string(),
            });
        }
        let cholesky =
            Cholesky::new(matrix.clone()).ok_or_else(|| SolverError::SingularSchur {
                what: format!("Cholesky failed for {}x{} matrix", matrix.nrows(), matrix.ncols()),
            })?;
        self.schur = Some(SchurFactor { matrix, cholesky });
        Ok(())
    }

    /// `A⁻¹ a`.
    pub fn implicit_solve<M: FlowModel + ?Sized>(&self, model: &M, a: &Scalar) -> Scalar {
        model
            .discretization()
            .apply_diagonal(a, &self.implicit_inverse)
    }

    /// `β C A⁻¹ B f`.
    pub fn apply_schur<M: FlowModel + ?Sized>(&self, model: &M, f: &BoundaryVector) -> BoundaryVector {
        let disc = model.discretization();
        let s = disc.apply_diagonal(&disc.force_coupling(f), &self.flux_inverse);
        let mut out = disc.regularizer().interpolate(&curl_transpose(&s));
        out *= self.beta;
        out
    }

    /// Solve for the circulation and boundary force.
    pub fn solve<M: FlowModel + ?Sized>(
        &self,
        model: &M,
        a: &Scalar,
        b: &BoundaryVector,
    ) -> SolverResult<(Scalar, BoundaryVector)> {
        let gamma_star = self.implicit_solve(model, a);
        let num_points = model.num_points();
        if num_points == 0 {
            return Ok((gamma_star, BoundaryVector::zeros(0)));
        }
        if b.num_points() != num_points {
            return Err(SolverError::Setup {
                what: format!("target has {} points, geometry has {num_points}", b.num_points()),
            });
        }

        let mut rhs = model.constraint(&gamma_star);
        rhs -= b;

        let f = match self.method {
            SchurMethod::Cholesky => {
                let factor = self.schur.as_ref().ok_or_else(|| SolverError::NotInitialized {
                    what: "Cholesky factorization missing; call init first".to_string(),
                })?;
                let f = factor.cholesky.solve(rhs.as_vector());
                BoundaryVector::from_vector(f)
            }
            SchurMethod::ConjugateGradient {
                tolerance,
                max_iterations,
            } => {
                let result = conjugate_gradient(
                    |v: &DVector<Real>| {
                        self.apply_schur(model, &BoundaryVector::from_vector(v.clone()))
                            .into_vector()
                    },
                    rhs.as_vector(),
                    tolerance,
                    max_iterations,
                )?;
                debug!(
                    iterations = result.iterations,
                    residual = result.residual_norm,
                    "conjugate gradient converged"
                );
                BoundaryVector::from_vector(result.x)
            }
        };
        if f.as_vector().iter().any(|v| !v.is_finite()) {
            return Err(SolverError::Numeric {
                what: "boundary force is not finite".to_string(),
            });
        }

        let correction = self.implicit_solve(model, &model.discretization().force_coupling(&f));
        let mut gamma = gamma_star;
        gamma -= &(&correction * self.beta);
        Ok((gamma, f))
    }
}

/// Largest deviation of `C γ` from the target `b`.
pub fn constraint_residual<M: FlowModel + ?Sized>(
    model: &M,
    gamma: &Scalar,
    b: &BoundaryVector,
) -> Real {
    let mut r = model.constraint(gamma);
    r -= b;
    r.norm_inf()
}
