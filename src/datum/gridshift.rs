//! Grid-shift correction tables and their application.
//!
//! Tables follow the NTv2 conventions: longitudes (and longitude shifts)
//! are positive **west**, nodes run row by row from the south-east corner,
//! and each node holds a (Δlon, Δlat) correction. Everything is stored in
//! radians.

use std::collections::HashMap;
use std::f64::consts::PI;
use std::sync::Arc;

use tracing::warn;

use crate::datum::GridRef;
use crate::error::ProjError;
use crate::point::Point;
use crate::proj::common::adjust_lon;

/// Grids registered by name.
pub type GridCatalog = HashMap<String, Arc<GridShiftTable>>;

/// The inverse lookup gains about three digits per round; nine rounds
/// reach the 1e-12 rad tolerance for any realistic shift gradient.
pub const GRID_INVERSE_MAX_ITER: usize = 9;
const GRID_INVERSE_TOL: f64 = 1e-12;
/// Fraction of a cell by which a point may sit outside the node lattice and
/// still be snapped onto its edge.
const CELL_SLACK: f64 = 1e-3;

#[derive(Clone, Debug, PartialEq)]
pub struct Subgrid {
    name: String,
    parent: Option<String>,
    ll: [f64; 2],
    del: [f64; 2],
    lim: [usize; 2],
    cvs: Vec<[f64; 2]>,
}

impl Subgrid {
    /// `ll` is the lower-left (south-east) node, `del` the node spacing and
    /// `lim` the node counts (columns, rows). `cvs` must hold exactly
    /// `lim[0] * lim[1]` corrections.
    pub fn new(
        name: impl Into<String>,
        ll: [f64; 2],
        del: [f64; 2],
        lim: [usize; 2],
        cvs: Vec<[f64; 2]>,
    ) -> Result<Self, ProjError> {
        let name = name.into();
        if lim[0] < 2 || lim[1] < 2 {
            return Err(ProjError::InvalidGrid(format!(
                "subgrid {name} needs at least 2x2 nodes, got {}x{}",
                lim[0], lim[1]
            )));
        }
        let Some(nodes) = lim[0].checked_mul(lim[1]) else {
            return Err(ProjError::InvalidGrid(format!(
                "subgrid {name} spans {}x{} nodes, too many to index",
                lim[0], lim[1]
            )));
        };
        if cvs.len() != nodes {
            return Err(ProjError::InvalidGrid(format!(
                "subgrid {name} has {} nodes, expected {nodes}",
                cvs.len()
            )));
        }
        if !(del[0].is_finite() && del[1].is_finite() && del[0] > 0.0 && del[1] > 0.0) {
            return Err(ProjError::InvalidGrid(format!("subgrid {name} has a non-positive spacing")));
        }
        Ok(Self {
            name,
            parent: None,
            ll,
            del,
            lim,
            cvs,
        })
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ll(&self) -> [f64; 2] {
        self.ll
    }

    pub fn del(&self) -> [f64; 2] {
        self.del
    }

    pub fn lim(&self) -> [usize; 2] {
        self.lim
    }

    pub fn cvs(&self) -> &[[f64; 2]] {
        &self.cvs
    }

    /// Bounding-box test with a padding of `(|Δlon| + |Δlat|) / 10000`.
    pub fn covers(&self, x: f64, y: f64) -> bool {
        let epsilon = (self.del[0].abs() + self.del[1].abs()) / 10_000.0;
        let min_x = self.ll[0] - epsilon;
        let min_y = self.ll[1] - epsilon;
        let max_x = self.ll[0] + (self.lim[0] - 1) as f64 * self.del[0] + epsilon;
        let max_y = self.ll[1] + (self.lim[1] - 1) as f64 * self.del[1] + epsilon;
        (min_x..=max_x).contains(&x) && (min_y..=max_y).contains(&y)
    }

    /// Bilinear interpolation of the correction at an offset from `ll`.
    fn interpolate(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let (ix, fx) = cell(x / self.del[0], self.lim[0])?;
        let (iy, fy) = cell(y / self.del[1], self.lim[1])?;
        let cols = self.lim[0];
        let idx = iy * cols + ix;
        let f00 = self.cvs.get(idx)?;
        let f10 = self.cvs.get(idx + 1)?;
        let f01 = self.cvs.get(idx + cols)?;
        let f11 = self.cvs.get(idx + cols + 1)?;

        let m00 = (1.0 - fx) * (1.0 - fy);
        let m10 = fx * (1.0 - fy);
        let m01 = (1.0 - fx) * fy;
        let m11 = fx * fy;
        Some((
            m00 * f00[0] + m10 * f10[0] + m01 * f01[0] + m11 * f11[0],
            m00 * f00[1] + m10 * f10[1] + m01 * f01[1] + m11 * f11[1],
        ))
    }

    /// Shift a positive-west (x, y) by this subgrid. `inverse` undoes the
    /// shift by fixed-point iteration.
    fn shift(&self, x: f64, y: f64, inverse: bool) -> Option<(f64, f64)> {
        let tx = adjust_lon(x - self.ll[0] - PI) + PI;
        let ty = y - self.ll[1];
        let (dx, dy) = self.interpolate(tx, ty)?;
        if !inverse {
            return Some((x + dx, y + dy));
        }

        let (mut ex, mut ey) = (tx - dx, ty - dy);
        let mut converged = false;
        for _ in 0..GRID_INVERSE_MAX_ITER {
            let Some((dx, dy)) = self.interpolate(ex, ey) else {
                warn!(grid = self.name.as_str(), "inverse grid shift left the grid, using current estimate");
                converged = true;
                break;
            };
            let dif_x = tx - (dx + ex);
            let dif_y = ty - (dy + ey);
            ex += dif_x;
            ey += dif_y;
            if dif_x.abs() <= GRID_INVERSE_TOL && dif_y.abs() <= GRID_INVERSE_TOL {
                converged = true;
                break;
            }
        }
        if !converged {
            warn!(grid = self.name.as_str(), "inverse grid shift did not converge, using best estimate");
        }
        Some((adjust_lon(ex + self.ll[0]), ey + self.ll[1]))
    }
}

/// Split a lattice coordinate into a cell index and the fraction within it.
fn cell(t: f64, lim: usize) -> Option<(usize, f64)> {
    let max = (lim - 1) as f64;
    let t = if t < 0.0 && t > -CELL_SLACK {
        0.0
    } else if t > max && t < max + CELL_SLACK {
        max
    } else {
        t
    };
    if !(0.0..=max).contains(&t) {
        return None;
    }
    let i = t.floor();
    if i >= max {
        return Some((lim - 2, 1.0));
    }
    Some((i as usize, t - i))
}

/// A named grid made of one or more subgrids.
#[derive(Clone, Debug, PartialEq)]
pub struct GridShiftTable {
    subgrids: Vec<Subgrid>,
}

impl GridShiftTable {
    /// Subgrids are searched finest first: a subgrid nested under a parent
    /// is tried before the parent.
    pub fn new(subgrids: Vec<Subgrid>) -> Result<Self, ProjError> {
        if subgrids.is_empty() {
            return Err(ProjError::InvalidGrid("grid has no subgrids".into()));
        }
        let depth = |sub: &Subgrid| {
            let mut depth = 0usize;
            let mut parent = sub.parent.as_deref();
            while let Some(name) = parent {
                if depth > subgrids.len() {
                    break;
                }
                depth += 1;
                parent = subgrids
                    .iter()
                    .find(|s| s.name == name)
                    .and_then(|s| s.parent.as_deref());
            }
            depth
        };
        let mut ranked: Vec<(usize, Subgrid)> =
            subgrids.iter().map(|s| (depth(s), s.clone())).collect();
        ranked.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(Self {
            subgrids: ranked.into_iter().map(|(_, s)| s).collect(),
        })
    }

    pub fn subgrids(&self) -> &[Subgrid] {
        &self.subgrids
    }
}

/// Apply the first grid in `grids` that covers `p` (geodetic radians).
///
/// Returns `Ok(Some(shifted))` on success and `Ok(None)` when only optional
/// grids were missing or missed the point. A missing mandatory grid, or a
/// point outside every grid while a mandatory one was consulted, is an
/// error.
pub fn apply_gridshift(
    grids: &[GridRef],
    inverse: bool,
    p: Point,
) -> Result<Option<Point>, ProjError> {
    let (x, y) = (-p.x, p.y);
    let mut tried = Vec::new();
    let mut mandatory_tried = false;

    for grid in grids {
        tried.push(grid.name.as_str());
        if grid.is_null() {
            return Ok(Some(p));
        }
        let Some(table) = &grid.table else {
            if grid.mandatory {
                return Err(ProjError::MissingGrid(grid.name.clone()));
            }
            continue;
        };
        mandatory_tried |= grid.mandatory;
        for sub in table.subgrids.iter().filter(|s| s.covers(x, y)) {
            if let Some((sx, sy)) = sub.shift(x, y, inverse) {
                return Ok(Some(p.with_xy(-sx, sy)));
            }
        }
    }

    if mandatory_tried {
        return Err(ProjError::GridCoverage {
            lon: p.x.to_degrees(),
            lat: p.y.to_degrees(),
            tried: tried.join(","),
        });
    }
    Ok(None)
}
