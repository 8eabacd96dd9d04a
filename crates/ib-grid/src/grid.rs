//! Uniform single-domain grid.

use crate::error::{GridError, GridResult};
use ib_core::{Real, ensure_finite, ensure_positive};

/// Uniform grid of `nx × ny` square cells.
///
/// Node `(i, j)` sits at `(xoffset + i·dx, yoffset + j·dx)` for `0 ≤ i ≤ nx`,
/// `0 ≤ j ≤ ny`. Only interior nodes carry circulation.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    nx: usize,
    ny: usize,
    length: Real,
    xoffset: Real,
    yoffset: Real,
}

impl Grid {
    /// `length` is the extent of the domain in x; the y extent is `ny·dx`.
    pub fn new(nx: usize, ny: usize, length: Real, xoffset: Real, yoffset: Real) -> GridResult<Self> {
        if nx < 2 || ny < 2 {
            return Err(GridError::InvalidGrid {
                what: format!("need at least 2 cells per direction, got {nx} x {ny}"),
            });
        }
        ensure_positive(length, "grid length")?;
        ensure_finite(xoffset, "grid xoffset")?;
        ensure_finite(yoffset, "grid yoffset")?;
        Ok(Self {
            nx,
            ny,
            length,
            xoffset,
            yoffset,
        })
    }

    pub fn nx(&self) -> usize {
        self.nx
    }

    pub fn ny(&self) -> usize {
        self.ny
    }

    pub fn length(&self) -> Real {
        self.length
    }

    pub fn xoffset(&self) -> Real {
        self.xoffset
    }

    pub fn yoffset(&self) -> Real {
        self.yoffset
    }

    /// Cell width (same in both directions).
    pub fn dx(&self) -> Real {
        self.length / self.nx as Real
    }

    pub fn x_node(&self, i: usize) -> Real {
        self.xoffset + i as Real * self.dx()
    }

    pub fn y_node(&self, j: usize) -> Real {
        self.yoffset + j as Real * self.dx()
    }

    pub fn xmax(&self) -> Real {
        self.x_node(self.nx)
    }

    pub fn ymax(&self) -> Real {
        self.y_node(self.ny)
    }

    /// Number of interior nodes, i.e. circulation unknowns.
    pub fn num_interior_nodes(&self) -> usize {
        (self.nx - 1) * (self.ny - 1)
    }

    pub fn contains(&self, x: Real, y: Real) -> bool {
        x >= self.xoffset && x <= self.xmax() && y >= self.yoffset && y <= self.ymax()
    }
}
