//! Run file schema and validation.

use crate::error::{AppError, AppResult};
use ib_core::Real;
use ib_grid::Motion;
use ib_model::ModelKind;
use ib_sim::Scheme;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunConfig {
    #[serde(default = "default_name")]
    pub name: String,
    pub grid: GridConfig,
    #[serde(default = "default_reynolds")]
    pub reynolds: Real,
    #[serde(default = "default_dt")]
    pub dt: Real,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_scheme")]
    pub scheme: String,
    #[serde(default = "default_steps")]
    pub steps: u64,
    #[serde(default)]
    pub geometry: GeometryConfig,
    #[serde(default)]
    pub freestream: FreestreamConfig,
    /// Base flow for the linear and adjoint models.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baseflow: Option<PathBuf>,
    /// Base flows for the linear-periodic model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub periodic: Option<PeriodicConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_condition: Option<PathBuf>,
    /// Subtract the base flow from the initial condition (perturbation models only).
    #[serde(default)]
    pub subtract_baseflow: bool,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub solver: SolverConfig,
}

fn default_name() -> String {
    "ibflow".to_string()
}

fn default_reynolds() -> Real {
    100.0
}

fn default_dt() -> Real {
    0.01
}

fn default_model() -> String {
    "nonlinear".to_string()
}

fn default_scheme() -> String {
    "rk2".to_string()
}

fn default_steps() -> u64 {
    250
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GridConfig {
    pub nx: usize,
    pub ny: usize,
    #[serde(default = "default_length")]
    pub length: Real,
    #[serde(default = "default_offset")]
    pub xoffset: Real,
    #[serde(default = "default_offset")]
    pub yoffset: Real,
    /// Number of nested grid levels; only a single level is supported.
    #[serde(default = "default_ngrid")]
    pub ngrid: usize,
}

fn default_length() -> Real {
    4.0
}

fn default_offset() -> Real {
    -2.0
}

fn default_ngrid() -> usize {
    1
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GeometryConfig {
    #[serde(default)]
    pub bodies: Vec<BodyConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BodyConfig {
    pub name: String,
    pub shape: ShapeConfig,
    #[serde(default)]
    pub motion: Motion,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ShapeConfig {
    Circle {
        center: [Real; 2],
        radius: Real,
        points: usize,
    },
    Line {
        from: [Real; 2],
        to: [Real; 2],
        points: usize,
    },
    /// Explicit boundary points; rotation is about `center` (default: centroid).
    Points {
        points: Vec<[Real; 2]>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        center: Option<[Real; 2]>,
    },
}

/// Uniform background flow.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FreestreamConfig {
    #[serde(default = "default_magnitude")]
    pub magnitude: Real,
    /// Angle to the x axis, radians
    #[serde(default)]
    pub alpha: Real,
}

fn default_magnitude() -> Real {
    1.0
}

impl Default for FreestreamConfig {
    fn default() -> Self {
        Self {
            magnitude: default_magnitude(),
            alpha: 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PeriodicConfig {
    /// File name pattern; `{}` is replaced by the file number, zero-padded to 5 digits.
    pub pattern: String,
    pub period: usize,
    /// Number of the first file of the cycle, used at step 0.
    #[serde(default)]
    pub start: usize,
}

impl PeriodicConfig {
    /// Number of the file holding the base flow at `phase`.
    ///
    /// Files `start..start + period` cover one cycle and step `n` uses file
    /// `start + n mod period`, so phase `start mod period` is file `start`.
    pub fn file_number(&self, phase: usize) -> usize {
        if self.period == 0 {
            return self.start;
        }
        let offset = (phase % self.period + self.period - self.start % self.period) % self.period;
        self.start + offset
    }

    /// File holding the base flow at `phase`.
    pub fn phase_path(&self, phase: usize) -> PathBuf {
        let number = self.file_number(phase);
        PathBuf::from(self.pattern.replace("{}", &format!("{number:05}")))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutputConfig {
    #[serde(default = "default_outdir")]
    pub dir: PathBuf,
    /// Write a restart file every n steps (0 disables).
    #[serde(default = "default_restart_every")]
    pub restart_every: u64,
    /// Append to the force log every n steps (0 disables).
    #[serde(default = "default_force_every")]
    pub force_every: u64,
}

fn default_outdir() -> PathBuf {
    PathBuf::from(".")
}

fn default_restart_every() -> u64 {
    100
}

fn default_force_every() -> u64 {
    1
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_outdir(),
            restart_every: default_restart_every(),
            force_every: default_force_every(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SolverStrategy {
    #[default]
    Cholesky,
    ConjugateGradient,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SolverConfig {
    #[serde(default)]
    pub strategy: SolverStrategy,
    #[serde(default = "default_tolerance")]
    pub tolerance: Real,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
}

fn default_tolerance() -> Real {
    1e-10
}

fn default_max_iterations() -> usize {
    5000
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            strategy: SolverStrategy::default(),
            tolerance: default_tolerance(),
            max_iterations: default_max_iterations(),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing setting: {field} ({reason})")]
    Missing { field: String, reason: String },

    #[error("Conflicting setting: {field} ({reason})")]
    Conflict { field: String, reason: String },

    #[error("Unsupported feature: {feature} - {reason}")]
    Unsupported { feature: String, reason: String },
}

fn invalid(field: &str, value: impl ToString, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

impl RunConfig {
    pub fn from_yaml_str(content: &str) -> AppResult<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn to_yaml_string(&self) -> AppResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Check the run file and resolve the model and scheme names.
    pub fn validate(&self) -> Result<(ModelKind, Scheme), ValidationError> {
        let model: ModelKind = self
            .model
            .parse()
            .map_err(|_| invalid("model", &self.model, "expected nonlinear, linear, adjoint or linearperiodic"))?;
        let scheme: Scheme = self
            .scheme
            .parse()
            .map_err(|_| invalid("scheme", &self.scheme, "expected euler, ab2, rk2 or rk3"))?;

        if self.name.is_empty() {
            return Err(invalid("name", "", "must not be empty"));
        }
        if self.grid.ngrid != 1 {
            return Err(ValidationError::Unsupported {
                feature: format!("ngrid = {}", self.grid.ngrid),
                reason: "only a single grid level is supported".to_string(),
            });
        }
        if self.grid.nx < 2 || self.grid.ny < 2 {
            return Err(invalid(
                "grid",
                format!("{}x{}", self.grid.nx, self.grid.ny),
                "need at least 2 cells per direction",
            ));
        }
        if !(self.grid.length > 0.0) {
            return Err(invalid("grid.length", self.grid.length, "must be positive"));
        }
        if !(self.reynolds > 0.0) {
            return Err(invalid("reynolds", self.reynolds, "must be positive"));
        }
        if !(self.dt > 0.0) {
            return Err(invalid("dt", self.dt, "must be positive"));
        }
        if !self.freestream.magnitude.is_finite() || !self.freestream.alpha.is_finite() {
            return Err(invalid("freestream", self.freestream.magnitude, "must be finite"));
        }

        match model {
            ModelKind::Nonlinear => {
                if self.baseflow.is_some() || self.periodic.is_some() {
                    return Err(ValidationError::Conflict {
                        field: "baseflow".to_string(),
                        reason: "the nonlinear model takes no base flow".to_string(),
                    });
                }
                if self.subtract_baseflow {
                    return Err(ValidationError::Conflict {
                        field: "subtract_baseflow".to_string(),
                        reason: "only meaningful for perturbation models".to_string(),
                    });
                }
            }
            ModelKind::Linear | ModelKind::Adjoint => {
                if self.baseflow.is_none() {
                    return Err(ValidationError::Missing {
                        field: "baseflow".to_string(),
                        reason: format!("required by the {model} model"),
                    });
                }
                if self.periodic.is_some() {
                    return Err(ValidationError::Conflict {
                        field: "periodic".to_string(),
                        reason: format!("the {model} model takes a single base flow"),
                    });
                }
            }
            ModelKind::LinearPeriodic => {
                let Some(periodic) = &self.periodic else {
                    return Err(ValidationError::Missing {
                        field: "periodic".to_string(),
                        reason: "required by the linearperiodic model".to_string(),
                    });
                };
                if self.baseflow.is_some() {
                    return Err(ValidationError::Conflict {
                        field: "baseflow".to_string(),
                        reason: "the linearperiodic model uses periodic base flows".to_string(),
                    });
                }
                if periodic.period == 0 {
                    return Err(invalid("periodic.period", 0, "must be positive"));
                }
                if !periodic.pattern.contains("{}") {
                    return Err(invalid(
                        "periodic.pattern",
                        &periodic.pattern,
                        "must contain {} for the phase number",
                    ));
                }
            }
        }
        if self.subtract_baseflow && self.initial_condition.is_none() {
            return Err(ValidationError::Missing {
                field: "initial_condition".to_string(),
                reason: "subtract_baseflow needs an initial condition".to_string(),
            });
        }

        for body in &self.geometry.bodies {
            validate_body(body)?;
        }

        if !(self.solver.tolerance > 0.0) {
            return Err(invalid("solver.tolerance", self.solver.tolerance, "must be positive"));
        }
        if self.solver.max_iterations == 0 {
            return Err(invalid("solver.max_iterations", 0, "must be positive"));
        }
        Ok((model, scheme))
    }
}

fn validate_body(body: &BodyConfig) -> Result<(), ValidationError> {
    let field = format!("geometry.bodies[{}]", body.name);
    match &body.shape {
        ShapeConfig::Circle { radius, points, .. } => {
            if !(*radius > 0.0) || *points == 0 {
                return Err(invalid(&field, radius, "circle needs a positive radius and points"));
            }
        }
        ShapeConfig::Line { points, .. } => {
            if *points < 2 {
                return Err(invalid(&field, points, "line needs at least 2 points"));
            }
        }
        ShapeConfig::Points { points, .. } => {
            if points.is_empty() {
                return Err(invalid(&field, 0, "no points given"));
            }
        }
    }
    Ok(())
}

/// Read and parse a run file. Validation is left to the caller.
pub fn load_config(path: &Path) -> AppResult<RunConfig> {
    let content = std::fs::read_to_string(path).map_err(|source| AppError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    RunConfig::from_yaml_str(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = "
name: cyl
grid:
  nx: 32
  ny: 32
geometry:
  bodies:
    - name: cylinder
      shape:
        type: circle
        center: [0.0, 0.0]
        radius: 0.5
        points: 40
";

    fn minimal() -> RunConfig {
        RunConfig::from_yaml_str(MINIMAL).unwrap()
    }

    #[test]
    fn defaults_fill_missing_fields() {
        let cfg = minimal();
        assert_eq!(cfg.grid.length, 4.0);
        assert_eq!(cfg.grid.xoffset, -2.0);
        assert_eq!(cfg.grid.ngrid, 1);
        assert_eq!(cfg.reynolds, 100.0);
        assert_eq!(cfg.scheme, "rk2");
        assert_eq!(cfg.output.force_every, 1);
        assert_eq!(cfg.solver.strategy, SolverStrategy::Cholesky);
        assert_eq!(cfg.geometry.bodies[0].motion, Motion::Fixed);
        assert_eq!(
            cfg.validate().unwrap(),
            (ModelKind::Nonlinear, Scheme::RungeKutta2)
        );
    }

    #[test]
    fn motion_and_solver_parse() {
        let cfg = RunConfig::from_yaml_str(
            "
grid: {nx: 16, ny: 16}
geometry:
  bodies:
    - name: plate
      shape: {type: line, from: [-0.5, 0.0], to: [0.5, 0.0], points: 20}
      motion: {type: pitch_plunge, pitch_amplitude: 0.1, pitch_frequency: 0.5, plunge_amplitude: 0.2, plunge_frequency: 0.25}
solver: {strategy: conjugate_gradient, tolerance: 1.0e-9}
",
        )
        .unwrap();
        assert!(matches!(
            cfg.geometry.bodies[0].motion,
            Motion::PitchPlunge { plunge_amplitude, .. } if plunge_amplitude == 0.2
        ));
        assert_eq!(cfg.solver.strategy, SolverStrategy::ConjugateGradient);
        assert_eq!(cfg.solver.max_iterations, 5000);
    }

    #[test]
    fn yaml_round_trip_preserves_config() {
        let cfg = minimal();
        let back = RunConfig::from_yaml_str(&cfg.to_yaml_string().unwrap()).unwrap();
        assert_eq!(back, cfg);
    }

    #[test]
    fn unknown_names_are_rejected() {
        let mut cfg = minimal();
        cfg.model = "turbulent".to_string();
        assert!(matches!(
            cfg.validate(),
            Err(ValidationError::InvalidValue { ref field, .. }) if field == "model"
        ));
        let mut cfg = minimal();
        cfg.scheme = "rk4".to_string();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn perturbation_models_need_base_flows() {
        let mut cfg = minimal();
        cfg.model = "linear".to_string();
        assert!(matches!(cfg.validate(), Err(ValidationError::Missing { .. })));
        cfg.baseflow = Some(PathBuf::from("base.bin"));
        assert_eq!(cfg.validate().unwrap().0, ModelKind::Linear);
        cfg.periodic = Some(PeriodicConfig {
            pattern: "flow/p{}.bin".to_string(),
            period: 4,
            start: 0,
        });
        assert!(matches!(cfg.validate(), Err(ValidationError::Conflict { .. })));

        cfg.model = "linear-periodic".to_string();
        assert!(matches!(cfg.validate(), Err(ValidationError::Conflict { .. })));
        cfg.baseflow = None;
        assert_eq!(cfg.validate().unwrap().0, ModelKind::LinearPeriodic);
    }

    #[test]
    fn subtracting_base_flow_needs_a_perturbation_model() {
        let mut cfg = minimal();
        cfg.subtract_baseflow = true;
        cfg.initial_condition = Some(PathBuf::from("ic.bin"));
        assert!(matches!(cfg.validate(), Err(ValidationError::Conflict { .. })));
    }

    #[test]
    fn nested_grids_are_unsupported() {
        let mut cfg = minimal();
        cfg.grid.ngrid = 3;
        assert!(matches!(cfg.validate(), Err(ValidationError::Unsupported { .. })));
    }

    #[test]
    fn non_positive_parameters_are_rejected() {
        let mut cfg = minimal();
        cfg.dt = 0.0;
        assert!(cfg.validate().is_err());
        let mut cfg = minimal();
        cfg.reynolds = -5.0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn phase_files_are_zero_padded() {
        let p = PeriodicConfig {
            pattern: "flow/periodic{}.bin".to_string(),
            period: 10,
            start: 0,
        };
        assert_eq!(p.phase_path(7), PathBuf::from("flow/periodic00007.bin"));
    }

    #[test]
    fn phase_files_are_numbered_from_the_cycle_start() {
        let p = PeriodicConfig {
            pattern: "p{}.bin".to_string(),
            period: 3,
            start: 2,
        };
        // step 0 is phase 2 and reads the first file of the cycle
        assert_eq!(p.phase_path(2), PathBuf::from("p00002.bin"));
        assert_eq!(p.phase_path(0), PathBuf::from("p00003.bin"));
        assert_eq!(p.phase_path(1), PathBuf::from("p00004.bin"));

        let files: Vec<usize> = (0..3).map(|phase| p.file_number(phase)).collect();
        let mut sorted = files.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![2, 3, 4]);
        for step in 0..9u64 {
            let phase = ib_model::periodic_phase(p.start, p.period, step);
            assert_eq!(p.file_number(phase), p.start + (step % 3) as usize);
        }
    }
}
