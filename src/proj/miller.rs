//! Miller Cylindrical projection (`+proj=mill`), spherical.
//!
//! forward: x = a·(λ - λ₀), y = 1.25·a·ln(tan(π/4 + 0.4·φ))

use std::f64::consts::FRAC_PI_4;

use crate::defs::ProjDef;
use crate::error::ProjError;
use crate::proj::common::adjust_lon;
use crate::proj::ellipsoid::Ellipsoid;
use crate::proj::Projection;

#[derive(Clone, Debug)]
pub struct Miller {
    a: f64,
    lon0: f64,
    false_easting: f64,
    false_northing: f64,
}

impl Miller {
    pub fn from_def(def: &ProjDef, ellipsoid: &Ellipsoid) -> Result<Self, ProjError> {
        Ok(Self {
            a: ellipsoid.a,
            lon0: def.long0(),
            false_easting: def.x0(),
            false_northing: def.y0(),
        })
    }
}

impl Projection for Miller {
    fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64), ProjError> {
        let x = self.a * adjust_lon(lon - self.lon0);
        let y = self.a * (FRAC_PI_4 + lat / 2.5).tan().ln() * 1.25;
        Ok((x + self.false_easting, y + self.false_northing))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjError> {
        let x = x - self.false_easting;
        let y = y - self.false_northing;
        let lon = adjust_lon(self.lon0 + x / self.a);
        let lat = 2.5 * ((0.8 * y / self.a).exp().atan() - FRAC_PI_4);
        Ok((lon, lat))
    }
}
