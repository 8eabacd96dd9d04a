//! Discretization layer for the immersed-boundary projection method.
//!
//! Provides:
//! - Uniform staggered grid (circulation on nodes, flux on faces)
//! - Scalar / Flux / BoundaryVector fields with elementwise arithmetic
//! - Discrete sine transform diagonalizing the 5-point Laplacian
//! - Curl, averaging and cross-product operators
//! - Rigid bodies with prescribed motion
//! - Regularized delta interpolation and spreading

pub mod error;
pub mod fields;
pub mod geometry;
pub mod grid;
pub mod operators;
pub mod regularizer;
pub mod transform;

pub use error::{GridError, GridResult};
pub use fields::{BoundaryVector, Flux, NodeVector, Scalar};
pub use geometry::{Geometry, Motion, Pose, RigidBody};
pub use grid::Grid;
pub use operators::{cross, curl, curl_transpose, flux_to_nodes, nodes_to_flux};
pub use regularizer::{Regularizer, delta_kernel};
pub use transform::SineTransform;

pub use nalgebra::{Point2, Vector2};
