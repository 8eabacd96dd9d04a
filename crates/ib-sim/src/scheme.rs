//! Scheme selection by name.

use crate::error::SimError;
use std::fmt;
use std::str::FromStr;

/// The closed set of time-integration schemes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scheme {
    /// Crank-Nicolson diffusion with explicit Euler advection (1st order).
    Euler,
    /// Crank-Nicolson diffusion with Adams-Bashforth 2 advection.
    AdamsBashforth,
    /// Two-stage Runge-Kutta.
    RungeKutta2,
    /// Third-order implicit-explicit Runge-Kutta.
    RungeKutta3,
}

impl Scheme {
    pub const ALL: [Scheme; 4] = [
        Scheme::Euler,
        Scheme::AdamsBashforth,
        Scheme::RungeKutta2,
        Scheme::RungeKutta3,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Euler => "euler",
            Scheme::AdamsBashforth => "ab2",
            Scheme::RungeKutta2 => "rk2",
            Scheme::RungeKutta3 => "rk3",
        }
    }

    /// Formal order of accuracy in time.
    pub fn order(&self) -> u32 {
        match self {
            Scheme::Euler => 1,
            Scheme::AdamsBashforth | Scheme::RungeKutta2 => 2,
            Scheme::RungeKutta3 => 3,
        }
    }
}

impl FromStr for Scheme {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "euler" | "single-step" => Ok(Scheme::Euler),
            "ab2" | "adams-bashforth" | "multi-step" => Ok(Scheme::AdamsBashforth),
            "rk2" | "runge-kutta2" | "two-stage" => Ok(Scheme::RungeKutta2),
            "rk3" | "runge-kutta3" | "three-stage" => Ok(Scheme::RungeKutta3),
            _ => Err(SimError::UnknownScheme(s.to_string())),
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
