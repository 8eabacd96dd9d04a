//! Flow state and governing-equation operators.
//!
//! Provides:
//! - `State`: circulation, flux, boundary force, time and step counter, with
//!   binary snapshot persistence
//! - `FlowModel`: operator contract consumed by the timesteppers
//! - Nonlinear, linearized, adjoint and linearized-periodic Navier-Stokes models
//! - Model selection by name

pub mod adjoint;
pub mod discretization;
pub mod error;
pub mod kind;
pub mod linear;
pub mod model;
pub mod nonlinear;
pub mod periodic;
pub mod state;

pub use adjoint::AdjointNavierStokes;
pub use discretization::Discretization;
pub use error::{ModelError, ModelResult};
pub use kind::ModelKind;
pub use linear::LinearizedNavierStokes;
pub use model::FlowModel;
pub use nonlinear::NonlinearNavierStokes;
pub use periodic::{LinearizedPeriodicNavierStokes, periodic_phase};
pub use state::State;
