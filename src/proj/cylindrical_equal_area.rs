//! Cylindrical Equal Area projection (`+proj=cea`).
//!
//! `+lat_ts` sets the parallel of true scale; without it `+k_0` is used.

use crate::defs::ProjDef;
use crate::error::ProjError;
use crate::proj::common::{adjust_lon, asinz, iqsfn, qsfn};
use crate::proj::ellipsoid::Ellipsoid;
use crate::proj::Projection;

#[derive(Clone, Debug)]
pub struct CylindricalEqualArea {
    ellipsoid: Ellipsoid,
    lon0: f64,
    k0: f64,
    false_easting: f64,
    false_northing: f64,
}

impl CylindricalEqualArea {
    pub fn new(
        ellipsoid: Ellipsoid,
        lon0: f64,
        lat_ts: Option<f64>,
        k0: f64,
        false_easting: f64,
        false_northing: f64,
    ) -> Self {
        let k0 = match lat_ts {
            Some(lat_ts) if ellipsoid.sphere => lat_ts.cos(),
            Some(lat_ts) => {
                lat_ts.cos() / (1.0 - ellipsoid.es * lat_ts.sin().powi(2)).sqrt()
            }
            None => k0,
        };
        Self {
            ellipsoid,
            lon0,
            k0,
            false_easting,
            false_northing,
        }
    }

    pub fn from_def(def: &ProjDef, ellipsoid: &Ellipsoid) -> Result<Self, ProjError> {
        Ok(Self::new(
            *ellipsoid,
            def.long0(),
            def.lat_ts,
            def.k0(),
            def.x0(),
            def.y0(),
        ))
    }
}

impl Projection for CylindricalEqualArea {
    fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64), ProjError> {
        let a = self.ellipsoid.a;
        let dlon = adjust_lon(lon - self.lon0);
        let x = a * self.k0 * dlon;
        let y = if self.ellipsoid.sphere {
            a * lat.sin() / self.k0
        } else {
            a * qsfn(self.ellipsoid.e, lat.sin()) * 0.5 / self.k0
        };
        Ok((x + self.false_easting, y + self.false_northing))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjError> {
        let a = self.ellipsoid.a;
        let x = x - self.false_easting;
        let y = y - self.false_northing;
        let lat = if self.ellipsoid.sphere {
            asinz(y / a * self.k0)
        } else {
            iqsfn(self.ellipsoid.e, 2.0 * y * self.k0 / a)
        };
        Ok((adjust_lon(self.lon0 + x / (a * self.k0)), lat))
    }
}
