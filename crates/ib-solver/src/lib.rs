//! Constraint (projection) solver for the immersed-boundary saddle-point system.
//!
//! Each sub-step of a timestepper solves
//!
//! ```text
//! (1 − β/2·L) γ + β B f = a
//!             C γ       = b
//! ```
//!
//! for circulation `γ` and boundary force `f`. The solver reduces the system
//! onto the force unknowns through the Schur complement `β C A⁻¹ B`, which is
//! symmetric positive definite, and solves it either with a precomputed
//! Cholesky factorization or with matrix-free conjugate gradients.

pub mod cg;
pub mod error;
pub mod projection;

pub use cg::{CgResult, conjugate_gradient};
pub use error::{SolverError, SolverResult};
pub use projection::{ProjectionSolver, SchurMethod, constraint_residual};
