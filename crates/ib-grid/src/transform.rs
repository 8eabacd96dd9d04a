//! Discrete sine transform diagonalizing the 5-point Laplacian.
//!
//! With zero values on the domain boundary, the type-I sine basis
//! `sin(π k i / n)` diagonalizes the second difference in each direction.
//! The transform matrix `S` is symmetric with `S·S = (n/2)·I`, so the inverse
//! is a rescaled forward transform.

use crate::fields::Scalar;
use crate::grid::Grid;
use ib_core::Real;
use nalgebra::DMatrix;
use std::f64::consts::PI;

#[derive(Clone, Debug)]
pub struct SineTransform {
    sx: DMatrix<Real>,
    sy: DMatrix<Real>,
    inverse_scale: Real,
}

fn sine_matrix(n: usize) -> DMatrix<Real> {
    DMatrix::from_fn(n - 1, n - 1, |r, c| {
        let k = (r + 1) as Real;
        let i = (c + 1) as Real;
        (PI * k * i / n as Real).sin()
    })
}

impl SineTransform {
    pub fn new(grid: &Grid) -> Self {
        Self {
            sx: sine_matrix(grid.nx()),
            sy: sine_matrix(grid.ny()),
            inverse_scale: 4.0 / (grid.nx() * grid.ny()) as Real,
        }
    }

    /// Physical space to mode space.
    pub fn forward(&self, s: &Scalar) -> Scalar {
        Scalar::from_matrix(&self.sx * s.as_matrix() * &self.sy)
    }

    /// Mode space to physical space.
    pub fn inverse(&self, s: &Scalar) -> Scalar {
        let mut out = &self.sx * s.as_matrix() * &self.sy;
        out *= self.inverse_scale;
        Scalar::from_matrix(out)
    }

    /// Apply the operator that is diagonal in mode space with entries `diag`.
    pub fn apply_diagonal(&self, s: &Scalar, diag: &DMatrix<Real>) -> Scalar {
        let mut modes = self.forward(s).into_matrix();
        modes.component_mul_assign(diag);
        self.inverse(&Scalar::from_matrix(modes))
    }

    /// Eigenvalues of the unscaled 5-point Laplacian, indexed like a [`Scalar`].
    ///
    /// `λ(k, l) = 2cos(πk/nx) + 2cos(πl/ny) − 4`, all strictly negative.
    pub fn laplacian_eigenvalues(grid: &Grid) -> DMatrix<Real> {
        let nx = grid.nx() as Real;
        let ny = grid.ny() as Real;
        DMatrix::from_fn(grid.nx() - 1, grid.ny() - 1, |r, c| {
            let k = (r + 1) as Real;
            let l = (c + 1) as Real;
            2.0 * (PI * k / nx).cos() + 2.0 * (PI * l / ny).cos() - 4.0
        })
    }
}
