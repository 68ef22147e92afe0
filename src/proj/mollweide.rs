//! Mollweide projection (`+proj=moll`), spherical equal-area.

use std::f64::consts::{PI, SQRT_2};

use tracing::warn;

use crate::defs::ProjDef;
use crate::error::ProjError;
use crate::proj::common::{adjust_lon, EPSLN, HALF_PI};
use crate::proj::ellipsoid::Ellipsoid;
use crate::proj::Projection;

/// Newton iteration cap on the auxiliary angle θ in 2θ + sin 2θ = π sin φ.
const MOLL_MAX_ITER: usize = 50;
/// 2√2/π
const MOLL_CX: f64 = 0.900_316_316_158;

#[derive(Clone, Debug)]
pub struct Mollweide {
    a: f64,
    lon0: f64,
    false_easting: f64,
    false_northing: f64,
}

impl Mollweide {
    pub fn from_def(def: &ProjDef, ellipsoid: &Ellipsoid) -> Result<Self, ProjError> {
        Ok(Self {
            a: ellipsoid.a,
            lon0: def.long0(),
            false_easting: def.x0(),
            false_northing: def.y0(),
        })
    }
}

impl Projection for Mollweide {
    fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64), ProjError> {
        let mut dlon = adjust_lon(lon - self.lon0);
        let con = PI * lat.sin();
        let mut theta = lat;
        let mut converged = false;
        for _ in 0..MOLL_MAX_ITER {
            let delta = -(theta + theta.sin() - con) / (1.0 + theta.cos());
            theta += delta;
            if delta.abs() < EPSLN {
                converged = true;
                break;
            }
        }
        if !converged {
            warn!(lat, "mollweide auxiliary angle did not converge");
        }
        theta /= 2.0;

        // At the poles the longitude collapses.
        if HALF_PI - lat.abs() < EPSLN {
            dlon = 0.0;
        }
        let x = MOLL_CX * self.a * dlon * theta.cos();
        let y = SQRT_2 * self.a * theta.sin();
        Ok((x + self.false_easting, y + self.false_northing))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjError> {
        let x = x - self.false_easting;
        let y = y - self.false_northing;
        let arg = (y / (SQRT_2 * self.a)).clamp(-0.999_999_999_999, 0.999_999_999_999);
        let theta = arg.asin();
        let lon = adjust_lon(self.lon0 + x / (MOLL_CX * self.a * theta.cos())).clamp(-PI, PI);
        let arg = ((2.0 * theta + (2.0 * theta).sin()) / PI).clamp(-1.0, 1.0);
        Ok((lon, arg.asin()))
    }
}
