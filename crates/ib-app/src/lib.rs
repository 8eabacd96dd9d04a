//! Application layer for immersed-boundary flow runs.
//!
//! This crate turns a YAML run file into a configured grid, geometry, flow
//! model and timestepper, drives the time loop, and writes force logs and
//! restart files. Both subcommands of the CLI go through it.

pub mod build;
pub mod config;
pub mod error;
pub mod output;
pub mod run;

pub use build::{BaseFlows, RunSetup, build_geometry, build_grid, build_setup, schur_method};
pub use config::{
    BodyConfig, FreestreamConfig, GeometryConfig, GridConfig, OutputConfig, PeriodicConfig,
    RunConfig, ShapeConfig, SolverConfig, SolverStrategy, ValidationError, load_config,
};
pub use error::{AppError, AppResult};
pub use output::{ForceLog, ForceRecord, Logger, Output, RestartWriter};
pub use run::{CheckSummary, RunSummary, check, run};
