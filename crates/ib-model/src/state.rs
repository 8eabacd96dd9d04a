//! Flow state at one instant and its binary snapshot.

use crate::error::{ModelError, ModelResult};
use ib_core::{Real, Tolerance};
use ib_grid::{BoundaryVector, Flux, Grid, Scalar};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::ops::{AddAssign, MulAssign, SubAssign};
use std::path::Path;
use tracing::{debug, warn};

const SNAPSHOT_VERSION: u32 = 1;

/// Circulation, flux and boundary force at time `time`, after `timestep` steps.
///
/// `q` always holds the flux reconstructed from `gamma` by the model; the
/// timesteppers refresh it after every constraint solve.
#[derive(Clone, Debug, PartialEq)]
pub struct State {
    grid: Grid,
    pub gamma: Scalar,
    pub q: Flux,
    pub f: BoundaryVector,
    pub time: Real,
    pub timestep: u64,
}

#[derive(Serialize, Deserialize)]
struct StateSnapshot {
    version: u32,
    nx: u64,
    ny: u64,
    length: Real,
    xoffset: Real,
    yoffset: Real,
    num_points: u64,
    timestep: u64,
    time: Real,
    gamma: Vec<Real>,
    qx: Vec<Real>,
    qy: Vec<Real>,
    f: Vec<Real>,
}

impl State {
    /// Zero state over `grid` with `num_points` boundary points.
    pub fn new(grid: &Grid, num_points: usize) -> Self {
        Self {
            grid: grid.clone(),
            gamma: Scalar::zeros(grid),
            q: Flux::zeros(grid),
            f: BoundaryVector::zeros(num_points),
            time: 0.0,
            timestep: 0,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn num_points(&self) -> usize {
        self.f.num_points()
    }

    /// Net force on all bodies: sums of the x and y boundary force components.
    pub fn compute_net_force(&self) -> (Real, Real) {
        (self.f.sum_x(), self.f.sum_y())
    }

    /// Write a snapshot to `path`.
    pub fn save(&self, path: &Path) -> ModelResult<()> {
        let snapshot = StateSnapshot {
            version: SNAPSHOT_VERSION,
            nx: self.grid.nx() as u64,
            ny: self.grid.ny() as u64,
            length: self.grid.length(),
            xoffset: self.grid.xoffset(),
            yoffset: self.grid.yoffset(),
            num_points: self.num_points() as u64,
            timestep: self.timestep,
            time: self.time,
            gamma: self.gamma.values().to_vec(),
            qx: self.q.x.as_slice().to_vec(),
            qy: self.q.y.as_slice().to_vec(),
            f: self.f.as_vector().as_slice().to_vec(),
        };
        let mut writer = BufWriter::new(File::create(path)?);
        bincode::serialize_into(&mut writer, &snapshot)?;
        writer.flush()?;
        debug!(path = %path.display(), timestep = self.timestep, "saved state");
        Ok(())
    }

    /// Replace this state with the snapshot at `path`.
    ///
    /// The snapshot is fully decoded and validated against this state's grid and
    /// boundary size before anything is written; on error `self` is unchanged.
    pub fn try_load(&mut self, path: &Path) -> ModelResult<()> {
        let reader = BufReader::new(File::open(path)?);
        let snapshot: StateSnapshot = bincode::deserialize_from(reader)?;
        self.check_compatible(&snapshot)?;

        self.gamma.copy_from_slice(&snapshot.gamma);
        self.q.x.as_mut_slice().copy_from_slice(&snapshot.qx);
        self.q.y.as_mut_slice().copy_from_slice(&snapshot.qy);
        self.f.as_vector_mut().as_mut_slice().copy_from_slice(&snapshot.f);
        self.time = snapshot.time;
        self.timestep = snapshot.timestep;
        debug!(path = %path.display(), timestep = self.timestep, "loaded state");
        Ok(())
    }

    /// Like [`State::try_load`], reporting failure as `false` so the caller can
    /// fall back to a default state.
    pub fn load(&mut self, path: &Path) -> bool {
        match self.try_load(path) {
            Ok(()) => true,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not load state");
                false
            }
        }
    }

    fn check_compatible(&self, s: &StateSnapshot) -> ModelResult<()> {
        let incompatible = |what: String| Err(ModelError::Incompatible { what });
        if s.version != SNAPSHOT_VERSION {
            return incompatible(format!("snapshot version {} (expected {SNAPSHOT_VERSION})", s.version));
        }
        if s.nx != self.grid.nx() as u64 || s.ny != self.grid.ny() as u64 {
            return incompatible(format!(
                "grid {}x{} (expected {}x{})",
                s.nx,
                s.ny,
                self.grid.nx(),
                self.grid.ny()
            ));
        }
        let tol = Tolerance::METADATA;
        if !tol.matches(s.length, self.grid.length())
            || !tol.matches(s.xoffset, self.grid.xoffset())
            || !tol.matches(s.yoffset, self.grid.yoffset())
        {
            return incompatible("grid extent differs".to_string());
        }
        if s.num_points != self.num_points() as u64 {
            return incompatible(format!(
                "{} boundary points (expected {})",
                s.num_points,
                self.num_points()
            ));
        }
        if s.gamma.len() != self.gamma.len()
            || s.qx.len() != self.q.x.len()
            || s.qy.len() != self.q.y.len()
            || s.f.len() != self.f.as_vector().len()
        {
            return incompatible("field lengths do not match header".to_string());
        }
        Ok(())
    }
}

impl AddAssign<&State> for State {
    fn add_assign(&mut self, rhs: &State) {
        self.gamma += &rhs.gamma;
        self.q += &rhs.q;
        self.f += &rhs.f;
    }
}

impl SubAssign<&State> for State {
    fn sub_assign(&mut self, rhs: &State) {
        self.gamma -= &rhs.gamma;
        self.q -= &rhs.q;
        self.f -= &rhs.f;
    }
}

impl MulAssign<Real> for State {
    fn mul_assign(&mut self, rhs: Real) {
        self.gamma *= rhs;
        self.q *= rhs;
        self.f *= rhs;
    }
}
