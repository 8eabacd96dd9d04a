//! Timestepper history snapshots.
//!
//! A history file `<basename>.<scheme>.hist` carries everything a scheme needs
//! to continue a run without repeating `init`: the assembled Schur matrix of
//! each stage solver and, for Adams-Bashforth, the previous nonlinear term.
//! The file starts with a [`HistoryTag`] so that history written for a
//! different scheme, timestep, model or geometry is refused.

use crate::error::{SimError, SimResult};
use crate::scheme::Scheme;
use ib_core::{Real, Tolerance};
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

const HISTORY_VERSION: u32 = 1;

/// Identifies the run a history snapshot belongs to.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryTag {
    pub scheme: String,
    pub model: String,
    pub timestep: Real,
    pub nx: u64,
    pub ny: u64,
    pub num_points: u64,
}

impl HistoryTag {
    /// Describe the first field that differs from `expected`, if any.
    pub fn mismatch(&self, expected: &HistoryTag) -> Option<String> {
        if self.scheme != expected.scheme {
            return Some(format!("scheme {} (expected {})", self.scheme, expected.scheme));
        }
        if self.model != expected.model {
            return Some(format!("model {} (expected {})", self.model, expected.model));
        }
        if !Tolerance::METADATA.matches(self.timestep, expected.timestep) {
            return Some(format!(
                "timestep {} (expected {})",
                self.timestep, expected.timestep
            ));
        }
        if (self.nx, self.ny) != (expected.nx, expected.ny) {
            return Some(format!(
                "grid {}x{} (expected {}x{})",
                self.nx, self.ny, expected.nx, expected.ny
            ));
        }
        if self.num_points != expected.num_points {
            return Some(format!(
                "{} boundary points (expected {})",
                self.num_points, expected.num_points
            ));
        }
        None
    }
}

/// Column-major square matrix.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub(crate) struct StoredMatrix {
    size: u64,
    values: Vec<Real>,
}

impl StoredMatrix {
    pub(crate) fn from_matrix(m: &DMatrix<Real>) -> Self {
        Self {
            size: m.nrows() as u64,
            values: m.as_slice().to_vec(),
        }
    }

    pub(crate) fn to_matrix(&self) -> Option<DMatrix<Real>> {
        let n = self.size as usize;
        (self.values.len() == n * n).then(|| DMatrix::from_column_slice(n, n, &self.values))
    }
}

#[derive(Serialize, Deserialize)]
pub(crate) struct HistorySnapshot {
    pub(crate) version: u32,
    pub(crate) tag: HistoryTag,
    /// One entry per stage solver; `None` for solvers that assemble nothing.
    pub(crate) schur: Vec<Option<StoredMatrix>>,
    pub(crate) previous_nonlinear: Option<Vec<Real>>,
}

impl HistorySnapshot {
    pub(crate) fn new(tag: HistoryTag) -> Self {
        Self {
            version: HISTORY_VERSION,
            tag,
            schur: Vec::new(),
            previous_nonlinear: None,
        }
    }
}

/// File holding the history of `scheme` for the run `basename`.
pub fn history_path(basename: &Path, scheme: Scheme) -> PathBuf {
    let mut name = basename.as_os_str().to_owned();
    name.push(format!(".{}.hist", scheme.as_str()));
    PathBuf::from(name)
}

pub(crate) fn write_history(path: &Path, snapshot: &HistorySnapshot) -> SimResult<()> {
    let file = File::create(path).map_err(|source| SimError::HistoryIo {
        path: path.to_path_buf(),
        source,
    })?;
    let mut writer = BufWriter::new(file);
    bincode::serialize_into(&mut writer, snapshot).map_err(|source| SimError::HistoryCodec {
        path: path.to_path_buf(),
        source,
    })?;
    writer.flush().map_err(|source| SimError::HistoryIo {
        path: path.to_path_buf(),
        source,
    })
}

/// Read and validate the history at `path`; `Ok(None)` when there is none.
pub(crate) fn read_history(
    path: &Path,
    expected: &HistoryTag,
) -> SimResult<Option<HistorySnapshot>> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(SimError::HistoryIo {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    let snapshot: HistorySnapshot =
        bincode::deserialize_from(BufReader::new(file)).map_err(|source| {
            SimError::HistoryCodec {
                path: path.to_path_buf(),
                source,
            }
        })?;
    let incompatible = |what: String| SimError::IncompatibleHistory {
        path: path.to_path_buf(),
        what,
    };
    if snapshot.version != HISTORY_VERSION {
        return Err(incompatible(format!(
            "format version {} (expected {HISTORY_VERSION})",
            snapshot.version
        )));
    }
    if let Some(what) = snapshot.tag.mismatch(expected) {
        return Err(incompatible(what));
    }
    Ok(Some(snapshot))
}
