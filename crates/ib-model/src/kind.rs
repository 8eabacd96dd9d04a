//! Model selection by name.

use crate::error::ModelError;
use std::fmt;
use std::str::FromStr;

/// The closed set of flow models.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModelKind {
    Nonlinear,
    Linear,
    Adjoint,
    LinearPeriodic,
}

impl ModelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::Nonlinear => "nonlinear",
            ModelKind::Linear => "linear",
            ModelKind::Adjoint => "adjoint",
            ModelKind::LinearPeriodic => "linearperiodic",
        }
    }

    /// Linear, adjoint and periodic models evolve perturbations about a base flow.
    pub fn needs_base_flow(&self) -> bool {
        !matches!(self, ModelKind::Nonlinear)
    }
}

impl FromStr for ModelKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "nonlinear" => Ok(ModelKind::Nonlinear),
            "linear" => Ok(ModelKind::Linear),
            "adjoint" => Ok(ModelKind::Adjoint),
            "linearperiodic" => Ok(ModelKind::LinearPeriodic),
            _ => Err(ModelError::UnknownModel(s.to_string())),
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_names() {
        assert_eq!("nonlinear".parse::<ModelKind>().unwrap(), ModelKind::Nonlinear);
        assert_eq!("Linear".parse::<ModelKind>().unwrap(), ModelKind::Linear);
        assert_eq!("ADJOINT".parse::<ModelKind>().unwrap(), ModelKind::Adjoint);
        assert_eq!(
            "linear-periodic".parse::<ModelKind>().unwrap(),
            ModelKind::LinearPeriodic
        );
        assert_eq!(
            "linearperiodic".parse::<ModelKind>().unwrap(),
            ModelKind::LinearPeriodic
        );
    }

    #[test]
    fn rejects_unknown_names() {
        let err = "turbulent".parse::<ModelKind>().unwrap_err();
        assert!(matches!(err, ModelError::UnknownModel(ref s) if s == "turbulent"));
    }

    #[test]
    fn display_round_trips() {
        for kind in [
            ModelKind::Nonlinear,
            ModelKind::Linear,
            ModelKind::Adjoint,
            ModelKind::LinearPeriodic,
        ] {
            assert_eq!(kind.to_string().parse::<ModelKind>().unwrap(), kind);
        }
    }
}
