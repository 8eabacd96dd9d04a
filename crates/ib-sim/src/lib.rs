//! Time integration for immersed-boundary flows.
//!
//! Provides:
//! - `Timestepper` contract: init, history load/save, advance
//! - Euler (Crank-Nicolson / explicit Euler), Adams-Bashforth 2, RK2 and RK3 schemes
//! - Scheme selection by name
//! - Binary history snapshots for restarts

pub mod adams_bashforth;
pub mod error;
pub mod euler;
pub mod history;
pub mod runge_kutta2;
pub mod runge_kutta3;
pub mod scheme;
pub mod timestepper;

// Internal modules
mod stage;

// Re-exports for public API
pub use adams_bashforth::AdamsBashforth;
pub use error::{SimError, SimResult};
pub use euler::Euler;
pub use history::{HistoryTag, history_path};
pub use runge_kutta2::RungeKutta2;
pub use runge_kutta3::RungeKutta3;
pub use scheme::Scheme;
pub use timestepper::{Timestepper, build_timestepper};
