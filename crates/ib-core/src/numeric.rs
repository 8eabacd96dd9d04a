use crate::{IbError, IbResult};

/// Floating point type of every field and parameter.
pub type Real = f64;

/// Closeness test for real-valued metadata (grid extents, timesteps) read
/// back from snapshots.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tolerance {
    pub abs: Real,
    pub rel: Real,
}

impl Tolerance {
    /// Tight enough that a snapshot from a different grid or timestep never matches.
    pub const METADATA: Tolerance = Tolerance {
        abs: 1e-12,
        rel: 1e-9,
    };

    pub fn matches(&self, a: Real, b: Real) -> bool {
        let diff = (a - b).abs();
        diff <= self.abs || diff <= self.rel * a.abs().max(b.abs())
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::METADATA
    }
}

pub fn ensure_finite(v: Real, what: &'static str) -> IbResult<Real> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(IbError::NonFinite { what, value: v })
    }
}

/// Finite and strictly positive, as timesteps, lengths and Reynolds numbers must be.
pub fn ensure_positive(v: Real, what: &'static str) -> IbResult<Real> {
    if ensure_finite(v, what)? > 0.0 {
        Ok(v)
    } else {
        Err(IbError::NotPositive { what, value: v })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn metadata_tolerance_separates_grids() {
        let tol = Tolerance::METADATA;
        assert!(tol.matches(4.0, 4.0 + 1e-13));
        assert!(tol.matches(0.0, 1e-13));
        assert!(!tol.matches(4.0, 4.0 + 1e-6));
        // dt = 0.01 against dt = 0.005
        assert!(!tol.matches(0.01, 0.005));
    }

    #[test]
    fn nan_timestep_is_not_finite() {
        let err = ensure_finite(Real::NAN, "timestep").unwrap_err();
        assert!(err.to_string().contains("timestep must be finite"));
        assert!(matches!(
            ensure_positive(Real::INFINITY, "timestep"),
            Err(IbError::NonFinite { .. })
        ));
    }

    #[test]
    fn ensure_positive_rejects_zero() {
        assert_eq!(
            ensure_positive(0.0, "dt"),
            Err(IbError::NotPositive {
                what: "dt",
                value: 0.0
            })
        );
        assert!(ensure_positive(-1.0, "dt").is_err());
        assert_eq!(ensure_positive(0.01, "dt"), Ok(0.01));
    }

    proptest! {
        #[test]
        fn matches_is_symmetric(a in -1e6f64..1e6, b in -1e6f64..1e6) {
            let tol = Tolerance::METADATA;
            prop_assert_eq!(tol.matches(a, b), tol.matches(b, a));
        }
    }
}
