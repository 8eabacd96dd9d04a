//! Discrete differential and averaging operators on the staggered grid.
//!
//! `curl` and `curl_transpose` are exact transposes, as are `flux_to_nodes`
//! and `nodes_to_flux`. With zero boundary nodes, `curl(curl_transpose(ψ))`
//! is the negative 5-point Laplacian of `ψ`.

use crate::fields::{Flux, NodeVector, Scalar};
use nalgebra::DMatrix;

/// Circulation around each interior dual cell.
pub fn curl(q: &Flux) -> Scalar {
    let (nx, ny) = (q.nx(), q.ny());
    Scalar::from_matrix(DMatrix::from_fn(nx - 1, ny - 1, |r, c| {
        let (i, j) = (r + 1, c + 1);
        q.x[(i, j - 1)] - q.x[(i, j)] + q.y[(i, j)] - q.y[(i - 1, j)]
    }))
}

/// Flux induced by a streamfunction on the nodes.
pub fn curl_transpose(s: &Scalar) -> Flux {
    let (nx, ny) = (s.nx(), s.ny());
    Flux {
        x: DMatrix::from_fn(nx + 1, ny, |i, j| s.node(i, j + 1) - s.node(i, j)),
        y: DMatrix::from_fn(nx, ny + 1, |i, j| s.node(i, j) - s.node(i + 1, j)),
    }
}

/// Average face fluxes onto the interior nodes.
pub fn flux_to_nodes(q: &Flux) -> NodeVector {
    let (nx, ny) = (q.nx(), q.ny());
    NodeVector {
        x: Scalar::from_matrix(DMatrix::from_fn(nx - 1, ny - 1, |r, c| {
            let (i, j) = (r + 1, c + 1);
            0.5 * (q.x[(i, j - 1)] + q.x[(i, j)])
        })),
        y: Scalar::from_matrix(DMatrix::from_fn(nx - 1, ny - 1, |r, c| {
            let (i, j) = (r + 1, c + 1);
            0.5 * (q.y[(i - 1, j)] + q.y[(i, j)])
        })),
    }
}

/// Average node vectors onto the faces.
pub fn nodes_to_flux(w: &NodeVector) -> Flux {
    let (nx, ny) = (w.x.nx(), w.x.ny());
    Flux {
        x: DMatrix::from_fn(nx + 1, ny, |i, j| 0.5 * (w.x.node(i, j) + w.x.node(i, j + 1))),
        y: DMatrix::from_fn(nx, ny + 1, |i, j| 0.5 * (w.y.node(i, j) + w.y.node(i + 1, j))),
    }
}

/// Pointwise `u × (γ ẑ)` at the nodes.
pub fn cross(u: &NodeVector, gamma: &Scalar) -> NodeVector {
    NodeVector {
        x: u.y.component_mul(gamma),
        y: -&u.x.component_mul(gamma),
    }
}
