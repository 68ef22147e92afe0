//! Mercator (`merc`), spherical and ellipsoidal.
//!
//! Web Mercator (EPSG:3857) is this projection on a sphere of radius
//! 6378137 with no datum shift.

use crate::defs::ProjDef;
use crate::error::ProjError;
use crate::proj::common::{adjust_lon, msfn, phi2z, tsfn, EPSLN, FORTPI, HALF_PI};
use crate::proj::ellipsoid::Ellipsoid;
use crate::proj::Projection;

#[derive(Clone, Debug)]
pub struct Mercator {
    /// Zero on a sphere, which selects the closed spherical forms.
    e: f64,
    /// a·k₀, the equatorial scale in metres per radian.
    a_k0: f64,
    lon0: f64,
    x0: f64,
    y0: f64,
}

impl Mercator {
    /// `+lat_ts` wins over `+k_0` when both are given.
    pub fn from_def(def: &ProjDef, ellipsoid: &Ellipsoid) -> Result<Self, ProjError> {
        let e = if ellipsoid.sphere { 0.0 } else { ellipsoid.e };
        let k0 = match def.lat_ts {
            Some(lat_ts) if lat_ts.abs() >= HALF_PI => {
                return Err(ProjError::InvalidParameter(
                    "merc +lat_ts must be inside (-90, 90)".into(),
                ))
            }
            Some(lat_ts) => msfn(e, lat_ts.sin(), lat_ts.cos()),
            None => def.k0(),
        };
        Ok(Self {
            e,
            a_k0: ellipsoid.a * k0,
            lon0: def.long0(),
            x0: def.x0(),
            y0: def.y0(),
        })
    }
}

impl Projection for Mercator {
    fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64), ProjError> {
        if lat.abs() > HALF_PI - EPSLN {
            return Err(ProjError::OutOfRange(format!(
                "mercator is undefined at latitude {lat}"
            )));
        }
        let isometric = if self.e == 0.0 {
            (FORTPI + 0.5 * lat).tan().ln()
        } else {
            -tsfn(self.e, lat, lat.sin()).ln()
        };
        Ok((
            self.x0 + self.a_k0 * adjust_lon(lon - self.lon0),
            self.y0 + self.a_k0 * isometric,
        ))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjError> {
        let ts = (-(y - self.y0) / self.a_k0).exp();
        let lat = if self.e == 0.0 {
            HALF_PI - 2.0 * ts.atan()
        } else {
            phi2z(self.e, ts).ok_or_else(|| {
                ProjError::Convergence(format!("mercator inverse latitude for y={y}"))
            })?
        };
        Ok((adjust_lon(self.lon0 + (x - self.x0) / self.a_k0), lat))
    }
}
