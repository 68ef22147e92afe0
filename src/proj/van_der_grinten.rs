//! Van der Grinten I (`+proj=vandg`), spherical only.
//!
//! The whole globe maps into a disc of radius π·R. The inverse solves the
//! cubic in closed form.

use std::f64::consts::PI;

use crate::defs::ProjDef;
use crate::error::ProjError;
use crate::proj::common::{adjust_lon, asinz, EPSLN, HALF_PI};
use crate::proj::ellipsoid::Ellipsoid;
use crate::proj::Projection;

#[derive(Clone, Debug)]
pub struct VanDerGrinten {
    r: f64,
    lon0: f64,
    false_easting: f64,
    false_northing: f64,
}

impl VanDerGrinten {
    pub fn from_def(def: &ProjDef, ellipsoid: &Ellipsoid) -> Result<Self, ProjError> {
        Ok(Self {
            r: ellipsoid.a,
            lon0: def.long0(),
            false_easting: def.x0(),
            false_northing: def.y0(),
        })
    }
}

impl Projection for VanDerGrinten {
    fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64), ProjError> {
        let dlon = adjust_lon(lon - self.lon0);

        if lat.abs() <= EPSLN {
            return Ok((self.false_easting + self.r * dlon, self.false_northing));
        }
        let theta = asinz(2.0 * (lat / PI).abs());
        if dlon.abs() <= EPSLN || (lat.abs() - HALF_PI).abs() <= EPSLN {
            let y = PI * self.r * (0.5 * theta).tan();
            return Ok((
                self.false_easting,
                self.false_northing + if lat >= 0.0 { y } else { -y },
            ));
        }

        let al = 0.5 * (PI / dlon - dlon / PI).abs();
        let asq = al * al;
        let (sinth, costh) = theta.sin_cos();
        let g = costh / (sinth + costh - 1.0);
        let gsq = g * g;
        let m = g * (2.0 / sinth - 1.0);
        let msq = m * m;

        let mut x = PI
            * self.r
            * (al * (g - msq)
                + (asq * (g - msq) * (g - msq) - (msq + asq) * (gsq - msq)).sqrt())
            / (msq + asq);
        if dlon < 0.0 {
            x = -x;
        }
        let q = asq + g;
        let y = PI * self.r * (m * q - al * ((msq + asq) * (asq + 1.0) - q * q).sqrt())
            / (msq + asq);
        Ok((
            self.false_easting + x,
            self.false_northing + if lat >= 0.0 { y } else { -y },
        ))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjError> {
        let x = x - self.false_easting;
        let y = y - self.false_northing;
        let con = PI * self.r;
        let xx = x / con;
        let yy = y / con;
        let xys = xx * xx + yy * yy;

        let lat = if yy.abs() < EPSLN {
            0.0
        } else {
            let c1 = -yy.abs() * (1.0 + xys);
            let c2 = c1 - 2.0 * yy * yy + xx * xx;
            let c3 = -2.0 * c1 + 1.0 + 2.0 * yy * yy + xys * xys;
            let d = yy * yy / c3
                + (2.0 * c2 * c2 * c2 / c3 / c3 / c3 - 9.0 * c1 * c2 / c3 / c3) / 27.0;
            let a1 = (c1 - c2 * c2 / 3.0 / c3) / c3;
            let m1 = 2.0 * (-a1 / 3.0).sqrt();
            let th1 = ((3.0 * d / a1) / m1).clamp(-1.0, 1.0).acos() / 3.0;
            let lat = (-m1 * (th1 + PI / 3.0).cos() - c2 / 3.0 / c3) * PI;
            if y >= 0.0 {
                lat
            } else {
                -lat
            }
        };

        let lon = if xx.abs() < EPSLN {
            self.lon0
        } else {
            adjust_lon(
                self.lon0
                    + PI * (xys - 1.0 + (1.0 + 2.0 * (xx * xx - yy * yy) + xys * xys).sqrt())
                        / 2.0
                        / xx,
            )
        };
        if !lat.is_finite() || !lon.is_finite() {
            return Err(ProjError::OutOfRange("vandg point outside the disc".into()));
        }
        Ok((lon, lat))
    }
}
