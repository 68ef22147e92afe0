//! Swiss Oblique Mercator (`+proj=somerc`), the projection of CH1903/LV03.
//!
//! The ellipsoid is mapped conformally onto a sphere, the sphere is rotated
//! so that the origin lies on its equator, and the result is projected with
//! the normal spherical Mercator.

use std::f64::consts::FRAC_PI_4;

use crate::defs::ProjDef;
use crate::error::ProjError;
use crate::proj::common::HALF_PI;
use crate::proj::ellipsoid::Ellipsoid;
use crate::proj::Projection;

const SOMERC_MAX_ITER: usize = 20;
const SOMERC_TOL: f64 = 1e-12;

#[derive(Clone, Debug)]
pub struct SwissObliqueMercator {
    e: f64,
    lambda0: f64,
    r: f64,
    alpha: f64,
    b0: f64,
    k: f64,
    false_easting: f64,
    false_northing: f64,
}

impl SwissObliqueMercator {
    pub fn from_def(def: &ProjDef, ellipsoid: &Ellipsoid) -> Result<Self, ProjError> {
        let phy0 = def.lat0();
        let sin_phy0 = phy0.sin();
        let e2 = ellipsoid.es;
        let e = ellipsoid.e;

        let r = def.k0() * ellipsoid.a * (1.0 - e2).sqrt() / (1.0 - e2 * sin_phy0.powi(2));
        let alpha = (1.0 + e2 / (1.0 - e2) * phy0.cos().powi(4)).sqrt();
        let b0 = (sin_phy0 / alpha).asin();
        let k1 = (FRAC_PI_4 + b0 / 2.0).tan().ln();
        let k2 = (FRAC_PI_4 + phy0 / 2.0).tan().ln();
        let k3 = ((1.0 + e * sin_phy0) / (1.0 - e * sin_phy0)).ln();

        Ok(Self {
            e,
            lambda0: def.long0(),
            r,
            alpha,
            b0,
            k: k1 - alpha * k2 + alpha * e / 2.0 * k3,
            false_easting: def.x0(),
            false_northing: def.y0(),
        })
    }
}

impl Projection for SwissObliqueMercator {
    fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64), ProjError> {
        let sa1 = (FRAC_PI_4 - lat / 2.0).tan().ln();
        let esin = self.e * lat.sin();
        let sa2 = self.e / 2.0 * ((1.0 + esin) / (1.0 - esin)).ln();
        let s = -self.alpha * (sa1 + sa2) + self.k;

        // Latitude and longitude on the conformal sphere.
        let b = 2.0 * (s.exp().atan() - FRAC_PI_4);
        let i = self.alpha * (lon - self.lambda0);

        // Rotated to the pseudo-equatorial system.
        let rot_i = (i.sin() / (self.b0.sin() * b.tan() + self.b0.cos() * i.cos())).atan();
        let rot_b = (self.b0.cos() * b.sin() - self.b0.sin() * b.cos() * i.cos()).asin();

        let y = self.r / 2.0 * ((1.0 + rot_b.sin()) / (1.0 - rot_b.sin())).ln();
        let x = self.r * rot_i;
        Ok((x + self.false_easting, y + self.false_northing))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjError> {
        let rot_i = (x - self.false_easting) / self.r;
        let rot_b = 2.0 * (((y - self.false_northing) / self.r).exp().atan() - FRAC_PI_4);

        let b = (self.b0.cos() * rot_b.sin() + self.b0.sin() * rot_b.cos() * rot_i.cos()).asin();
        let i = (rot_i.sin()
            / (self.b0.cos() * rot_i.cos() - self.b0.sin() * rot_b.tan()))
        .atan();
        let lambda = self.lambda0 + i / self.alpha;

        let iso_b = (FRAC_PI_4 + b / 2.0).tan().ln();
        let mut phy = b;
        for _ in 0..SOMERC_MAX_ITER {
            let s = (iso_b - self.k) / self.alpha
                + self.e * (FRAC_PI_4 + (self.e * phy.sin()).asin() / 2.0).tan().ln();
            let next = 2.0 * s.exp().atan() - HALF_PI;
            if (next - phy).abs() <= SOMERC_TOL {
                return Ok((lambda, next));
            }
            phy = next;
        }
        Err(ProjError::Convergence("somerc inverse latitude".into()))
    }
}
