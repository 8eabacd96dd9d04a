//! Matrix-free conjugate gradients for symmetric positive definite systems.

use crate::error::{SolverError, SolverResult};
use nalgebra::DVector;

/// Conjugate gradient result.
#[derive(Debug)]
pub struct CgResult {
    /// Solution vector
    pub x: DVector<f64>,
    /// Final residual norm
    pub residual_norm: f64,
    /// Number of iterations
    pub iterations: usize,
}

/// Solve `A x = rhs` where `apply` computes `A v`.
///
/// Converges when `‖r‖ ≤ tolerance·‖rhs‖`. Running out of iterations is an error.
pub fn conjugate_gradient<F>(
    apply: F,
    rhs: &DVector<f64>,
    tolerance: f64,
    max_iterations: usize,
) -> SolverResult<CgResult>
where
    F: Fn(&DVector<f64>) -> DVector<f64>,
{
    let rhs_norm = rhs.norm();
    let mut x = DVector::zeros(rhs.len());
    if rhs_norm == 0.0 {
        return Ok(CgResult {
            x,
            residual_norm: 0.0,
            iterations: 0,
        });
    }
    let target = tolerance * rhs_norm;

    let mut r = rhs.clone();
    let mut p = r.clone();
    let mut rr = r.dot(&r);

    for iter in 0..max_iterations {
        let ap = apply(&p);
        let pap = p.dot(&ap);
        if !(pap > 0.0) {
            return Err(SolverError::SingularSchur {
                what: format!("p·Ap = {pap} at iteration {iter}"),
            });
        }
        let alpha = rr / pap;
        x.axpy(alpha, &p, 1.0);
        r.axpy(-alpha, &ap, 1.0);
        let rr_new = r.dot(&r);
        let r_norm = rr_new.sqrt();
        if r_norm <= target {
            return Ok(CgResult {
                x,
                residual_norm: r_norm,
                iterations: iter + 1,
            });
        }
        p = &r + &p * (rr_new / rr);
        rr = rr_new;
    }

    Err(SolverError::ConvergenceFailed {
        what: format!(
            "conjugate gradient reached {} iterations, residual = {:e} (target {:e})",
            max_iterations,
            rr.sqrt(),
            target
        ),
    })
}
