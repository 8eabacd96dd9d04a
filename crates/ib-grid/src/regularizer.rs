//! Regularized delta function coupling boundary points to the grid.
//!
//! `interpolate` (E) maps face fluxes to boundary velocities and `spread`
//! (Eᵀ) maps boundary forces to face values; the two are exact transposes.

use crate::fields::{BoundaryVector, Flux};
use crate::grid::Grid;
use ib_core::Real;
use nalgebra::Point2;

/// Three-point kernel of Roma, Peskin & Berger, in units of `dx`.
pub fn delta_kernel(r: Real) -> Real {
    let r = r.abs();
    if r <= 0.5 {
        (1.0 + (1.0 - 3.0 * r * r).sqrt()) / 3.0
    } else if r <= 1.5 {
        (5.0 - 3.0 * r - (1.0 - 3.0 * (1.0 - r) * (1.0 - r)).sqrt()) / 6.0
    } else {
        0.0
    }
}

#[derive(Clone, Debug, Default)]
struct Stencil {
    x_faces: Vec<(usize, usize, Real)>,
    y_faces: Vec<(usize, usize, Real)>,
}

#[derive(Clone, Debug)]
pub struct Regularizer {
    nx: usize,
    ny: usize,
    stencils: Vec<Stencil>,
}

/// Indices `i` in `[0, max]` whose weight along one axis is nonzero.
fn support(center: Real, max: usize) -> impl Iterator<Item = usize> {
    let base = center.floor() as i64;
    (base - 2..=base + 2).filter_map(move |i| {
        if i >= 0 && i as usize <= max {
            Some(i as usize)
        } else {
            None
        }
    })
}

fn stencil_for(grid: &Grid, p: &Point2<Real>) -> Stencil {
    let dx = grid.dx();
    // point position in units of dx from the lower-left node
    let px = (p.x - grid.xoffset()) / dx;
    let py = (p.y - grid.yoffset()) / dx;
    let mut stencil = Stencil::default();

    // x-faces at (i, j + 1/2)
    for i in support(px, grid.nx()) {
        let wx = delta_kernel(i as Real - px);
        if wx == 0.0 {
            continue;
        }
        for j in support(py - 0.5, grid.ny() - 1) {
            let w = wx * delta_kernel(j as Real + 0.5 - py);
            if w != 0.0 {
                stencil.x_faces.push((i, j, w / dx));
            }
        }
    }

    // y-faces at (i + 1/2, j)
    for i in support(px - 0.5, grid.nx() - 1) {
        let wx = delta_kernel(i as Real + 0.5 - px);
        if wx == 0.0 {
            continue;
        }
        for j in support(py, grid.ny()) {
            let w = wx * delta_kernel(j as Real - py);
            if w != 0.0 {
                stencil.y_faces.push((i, j, w / dx));
            }
        }
    }
    stencil
}

impl Regularizer {
    pub fn new(grid: &Grid, points: &[Point2<Real>]) -> Self {
        Self {
            nx: grid.nx(),
            ny: grid.ny(),
            stencils: points.iter().map(|p| stencil_for(grid, p)).collect(),
        }
    }

    /// Recompute weights after the boundary points moved.
    pub fn update(&mut self, grid: &Grid, points: &[Point2<Real>]) {
        self.stencils = points.iter().map(|p| stencil_for(grid, p)).collect();
    }

    pub fn num_points(&self) -> usize {
        self.stencils.len()
    }

    /// Velocity at each boundary point from face fluxes.
    pub fn interpolate(&self, q: &Flux) -> BoundaryVector {
        let mut out = BoundaryVector::zeros(self.num_points());
        for (k, st) in self.stencils.iter().enumerate() {
            let u: Real = st.x_faces.iter().map(|&(i, j, w)| w * q.x[(i, j)]).sum();
            let v: Real = st.y_faces.iter().map(|&(i, j, w)| w * q.y[(i, j)]).sum();
            out.set(k, u, v);
        }
        out
    }

    /// Face values from boundary point forces.
    pub fn spread(&self, f: &BoundaryVector) -> Flux {
        let mut q = Flux::zeros_sized(self.nx, self.ny);
        for (k, st) in self.stencils.iter().enumerate() {
            let (fx, fy) = (f.x(k), f.y(k));
            for &(i, j, w) in &st.x_faces {
                q.x[(i, j)] += w * fx;
            }
            for &(i, j, w) in &st.y_faces {
                q.y[(i, j)] += w * fy;
            }
        }
        q
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kernel_partition_of_unity() {
        for &shift in &[0.0, 0.1, 0.37, 0.5, 0.81] {
            let sum: Real = (-3..=3).map(|i| delta_kernel(i as Real - shift)).sum();
            assert!((sum - 1.0).abs() < 1e-14, "shift {shift}: sum {sum}");
        }
        assert_eq!(delta_kernel(1.6), 0.0);
    }

    #[test]
    fn interpolates_uniform_flow_exactly() {
        let grid = Grid::new(16, 16, 4.0, -2.0, -2.0).unwrap();
        let pts = vec![Point2::new(0.13, -0.4), Point2::new(0.5, 0.77)];
        let e = Regularizer::new(&grid, &pts);
        let q = Flux::uniform_flow(&grid, 1.5, 0.0);
        let u = e.interpolate(&q);
        assert!((u.x(0) - 1.5).abs() < 1e-12);
        assert!((u.x(1) - 1.5).abs() < 1e-12);
        assert!(u.y(1).abs() < 1e-12);
    }

    #[test]
    fn spread_is_transpose_of_interpolate() {
        let grid = Grid::new(12, 10, 3.0, -1.5, -1.25).unwrap();
        let pts = vec![Point2::new(0.0, 0.0), Point2::new(0.21, -0.33), Point2::new(-1.4, 1.2)];
        let e = Regularizer::new(&grid, &pts);
        let mut f = BoundaryVector::zeros(3);
        f.set(0, 1.0, -2.0);
        f.set(1, 0.5, 0.25);
        f.set(2, -0.7, 3.0);
        let mut q = Flux::zeros(&grid);
        for (n, v) in q.x.iter_mut().enumerate() {
            *v = ((n * 13) % 7) as Real - 3.0;
        }
        for (n, v) in q.y.iter_mut().enumerate() {
            *v = ((n * 5) % 11) as Real * 0.1;
        }
        let lhs = e.interpolate(&q).dot(&f);
        let rhs = q.dot(&e.spread(&f));
        assert!((lhs - rhs).abs() < 1e-10);
    }
}
