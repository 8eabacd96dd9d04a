//! Discrete fields living on the staggered grid.
//!
//! - [`Scalar`]: one value per interior node (circulation, streamfunction)
//! - [`Flux`]: one value per x-face and per y-face
//! - [`NodeVector`]: a two-component vector per interior node
//! - [`BoundaryVector`]: a two-component vector per boundary point, stored as
//!   all x components followed by all y components

use crate::grid::Grid;
use ib_core::Real;
use nalgebra::{DMatrix, DVector};
use std::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};

macro_rules! impl_field_ops {
    ($ty:ident { $($field:ident),+ }) => {
        impl AddAssign<&$ty> for $ty {
            fn add_assign(&mut self, rhs: &$ty) {
                $( self.$field += &rhs.$field; )+
            }
        }

        impl SubAssign<&$ty> for $ty {
            fn sub_assign(&mut self, rhs: &$ty) {
                $( self.$field -= &rhs.$field; )+
            }
        }

        impl MulAssign<Real> for $ty {
            fn mul_assign(&mut self, rhs: Real) {
                $( self.$field *= rhs; )+
            }
        }

        impl Add<&$ty> for &$ty {
            type Output = $ty;

            fn add(self, rhs: &$ty) -> $ty {
                let mut out = self.clone();
                out += rhs;
                out
            }
        }

        impl Sub<&$ty> for &$ty {
            type Output = $ty;

            fn sub(self, rhs: &$ty) -> $ty {
                let mut out = self.clone();
                out -= rhs;
                out
            }
        }

        impl Mul<Real> for &$ty {
            type Output = $ty;

            fn mul(self, rhs: Real) -> $ty {
                let mut out = self.clone();
                out *= rhs;
                out
            }
        }

        impl Mul<&$ty> for Real {
            type Output = $ty;

            fn mul(self, rhs: &$ty) -> $ty {
                rhs * self
            }
        }

        impl Neg for &$ty {
            type Output = $ty;

            fn neg(self) -> $ty {
                self * -1.0
            }
        }
    };
}

/// Values on the interior nodes, stored as an `(nx-1) × (ny-1)` matrix.
///
/// Row `i-1`, column `j-1` holds node `(i, j)`.
#[derive(Clone, Debug, PartialEq)]
pub struct Scalar {
    data: DMatrix<Real>,
}

impl Scalar {
    pub fn zeros(grid: &Grid) -> Self {
        Self {
            data: DMatrix::zeros(grid.nx() - 1, grid.ny() - 1),
        }
    }

    pub fn from_matrix(data: DMatrix<Real>) -> Self {
        Self { data }
    }

    /// Build from a function of node indices `(i, j)`.
    pub fn from_fn(grid: &Grid, mut f: impl FnMut(usize, usize) -> Real) -> Self {
        Self {
            data: DMatrix::from_fn(grid.nx() - 1, grid.ny() - 1, |r, c| f(r + 1, c + 1)),
        }
    }

    /// Number of cells in x that this field was built for.
    pub fn nx(&self) -> usize {
        self.data.nrows() + 1
    }

    pub fn ny(&self) -> usize {
        self.data.ncols() + 1
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Value at node `(i, j)`; nodes on the domain boundary are zero.
    pub fn node(&self, i: usize, j: usize) -> Real {
        if i == 0 || j == 0 || i >= self.nx() || j >= self.ny() {
            0.0
        } else {
            self.data[(i - 1, j - 1)]
        }
    }

    /// Set interior node `(i, j)`; panics on boundary indices.
    pub fn set_node(&mut self, i: usize, j: usize, value: Real) {
        self.data[(i - 1, j - 1)] = value;
    }

    pub fn as_matrix(&self) -> &DMatrix<Real> {
        &self.data
    }

    pub fn as_matrix_mut(&mut self) -> &mut DMatrix<Real> {
        &mut self.data
    }

    pub fn into_matrix(self) -> DMatrix<Real> {
        self.data
    }

    pub fn component_mul(&self, other: &Scalar) -> Scalar {
        Scalar::from_matrix(self.data.component_mul(&other.data))
    }

    pub fn dot(&self, other: &Scalar) -> Real {
        self.data.dot(&other.data)
    }

    pub fn norm_inf(&self) -> Real {
        self.data.amax()
    }

    pub fn fill(&mut self, value: Real) {
        self.data.fill(value);
    }

    pub fn values(&self) -> &[Real] {
        self.data.as_slice()
    }

    /// Copy from a flat column-major slice; the length must match.
    pub fn copy_from_slice(&mut self, values: &[Real]) {
        self.data.as_mut_slice().copy_from_slice(values);
    }
}

impl_field_ops!(Scalar { data });

/// Fluxes through cell faces.
///
/// `x` is `(nx+1) × ny`: entry `(i, j)` is the face at `(i, j+½)`.
/// `y` is `nx × (ny+1)`: entry `(i, j)` is the face at `(i+½, j)`.
#[derive(Clone, Debug, PartialEq)]
pub struct Flux {
    pub x: DMatrix<Real>,
    pub y: DMatrix<Real>,
}

impl Flux {
    pub fn zeros(grid: &Grid) -> Self {
        Self::zeros_sized(grid.nx(), grid.ny())
    }

    pub fn zeros_sized(nx: usize, ny: usize) -> Self {
        Self {
            x: DMatrix::zeros(nx + 1, ny),
            y: DMatrix::zeros(nx, ny + 1),
        }
    }

    /// Flux of a uniform stream of speed `magnitude` at angle `alpha` (radians).
    pub fn uniform_flow(grid: &Grid, magnitude: Real, alpha: Real) -> Self {
        let dx = grid.dx();
        let mut q = Self::zeros(grid);
        q.x.fill(magnitude * alpha.cos() * dx);
        q.y.fill(magnitude * alpha.sin() * dx);
        q
    }

    pub fn nx(&self) -> usize {
        self.y.nrows()
    }

    pub fn ny(&self) -> usize {
        self.x.ncols()
    }

    pub fn dot(&self, other: &Flux) -> Real {
        self.x.dot(&other.x) + self.y.dot(&other.y)
    }

    pub fn norm_inf(&self) -> Real {
        self.x.amax().max(self.y.amax())
    }

    pub fn fill(&mut self, value: Real) {
        self.x.fill(value);
        self.y.fill(value);
    }
}

impl_field_ops!(Flux { x, y });

/// A vector per interior node (velocity or cross product at nodes).
#[derive(Clone, Debug, PartialEq)]
pub struct NodeVector {
    pub x: Scalar,
    pub y: Scalar,
}

impl_field_ops!(NodeVector { x, y });

/// Two components per immersed-boundary point.
#[derive(Clone, Debug, PartialEq)]
pub struct BoundaryVector {
    data: DVector<Real>,
}

impl BoundaryVector {
    pub fn zeros(num_points: usize) -> Self {
        Self {
            data: DVector::zeros(2 * num_points),
        }
    }

    pub fn from_vector(data: DVector<Real>) -> Self {
        debug_assert!(data.len() % 2 == 0);
        Self { data }
    }

    pub fn num_points(&self) -> usize {
        self.data.len() / 2
    }

    pub fn x(&self, k: usize) -> Real {
        self.data[k]
    }

    pub fn y(&self, k: usize) -> Real {
        self.data[self.num_points() + k]
    }

    pub fn set(&mut self, k: usize, x: Real, y: Real) {
        let n = self.num_points();
        self.data[k] = x;
        self.data[n + k] = y;
    }

    pub fn as_vector(&self) -> &DVector<Real> {
        &self.data
    }

    pub fn as_vector_mut(&mut self) -> &mut DVector<Real> {
        &mut self.data
    }

    pub fn into_vector(self) -> DVector<Real> {
        self.data
    }

    pub fn sum_x(&self) -> Real {
        self.data.rows(0, self.num_points()).sum()
    }

    pub fn sum_y(&self) -> Real {
        let n = self.num_points();
        self.data.rows(n, n).sum()
    }

    pub fn dot(&self, other: &BoundaryVector) -> Real {
        self.data.dot(&other.data)
    }

    pub fn norm(&self) -> Real {
        self.data.norm()
    }

    pub fn norm_inf(&self) -> Real {
        if self.data.is_empty() {
            0.0
        } else {
            self.data.amax()
        }
    }

    pub fn fill(&mut self, value: Real) {
        self.data.fill(value);
    }
}

impl_field_ops!(BoundaryVector { data });
