//! Albers Equal Area Conic (`aea`).

use tracing::warn;

use crate::defs::ProjDef;
use crate::error::ProjError;
use crate::proj::common::{adjust_lon, asinz, msfn, qsfn, EPSLN, HALF_PI};
use crate::proj::ellipsoid::Ellipsoid;
use crate::proj::Projection;

const AUTHALIC_MAX_ITER: usize = 25;
const AUTHALIC_TOL: f64 = 1e-10;
const POLE_TOL: f64 = 1e-7;

#[derive(Clone, Debug)]
pub struct AlbersEqualArea {
    a: f64,
    e: f64,
    spherical: bool,
    lon0: f64,
    x0: f64,
    y0: f64,
    cone: f64,
    /// C = m₁² + n·q₁.
    big_c: f64,
    rho_origin: f64,
    /// q at ±90°; the Newton step divides by cos φ so poles are special-cased.
    q_pole: f64,
}

impl AlbersEqualArea {
    /// `lat2` defaults to `lat1` (single standard parallel).
    pub fn new(
        ellipsoid: &Ellipsoid,
        lon0: f64,
        lat0: f64,
        lat1: f64,
        lat2: Option<f64>,
    ) -> Result<Self, ProjError> {
        let lat2 = lat2.unwrap_or(lat1);
        if (lat1 + lat2).abs() < EPSLN {
            return Err(ProjError::InvalidParameter(
                "aea standard parallels are symmetric about the equator".into(),
            ));
        }
        let e = ellipsoid.e;
        let m1 = msfn(e, lat1.sin(), lat1.cos());
        let q1 = qsfn(e, lat1.sin());
        let cone = if (lat1 - lat2).abs() > EPSLN {
            let m2 = msfn(e, lat2.sin(), lat2.cos());
            (m1 * m1 - m2 * m2) / (qsfn(e, lat2.sin()) - q1)
        } else {
            lat1.sin()
        };

        let mut aea = Self {
            a: ellipsoid.a,
            e,
            spherical: ellipsoid.sphere,
            lon0,
            x0: 0.0,
            y0: 0.0,
            cone,
            big_c: m1 * m1 + cone * q1,
            rho_origin: 0.0,
            q_pole: qsfn(e, 1.0),
        };
        aea.rho_origin = aea.radius(lat0)?;
        Ok(aea)
    }

    pub fn from_def(def: &ProjDef, ellipsoid: &Ellipsoid) -> Result<Self, ProjError> {
        let lat1 = def.lat1();
        let mut aea = Self::new(ellipsoid, def.long0(), def.lat0(), lat1, def.lat2)?;
        aea.x0 = def.x0();
        aea.y0 = def.y0();
        Ok(aea)
    }

    fn radius(&self, lat: f64) -> Result<f64, ProjError> {
        let d = self.big_c - self.cone * qsfn(self.e, lat.sin());
        if d < 0.0 {
            return Err(ProjError::OutOfRange(format!(
                "aea latitude {lat} outside the cone"
            )));
        }
        Ok(self.a * d.sqrt() / self.cone)
    }
}

/// Latitude whose authalic `q` is given, by Newton iteration (Snyder 3-16).
fn latitude_from_q(e: f64, q: f64) -> f64 {
    let mut phi = asinz(0.5 * q);
    let es = e * e;
    for _ in 0..AUTHALIC_MAX_ITER {
        let (sin_phi, cos_phi) = phi.sin_cos();
        let esin = e * sin_phi;
        let w = 1.0 - esin * esin;
        let step = 0.5 * w * w / cos_phi
            * (q / (1.0 - es) - sin_phi / w + 0.5 / e * ((1.0 - esin) / (1.0 + esin)).ln());
        phi += step;
        if step.abs() <= AUTHALIC_TOL {
            return phi;
        }
    }
    warn!(q, "aea latitude did not converge, using last estimate");
    phi
}

impl Projection for AlbersEqualArea {
    fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64), ProjError> {
        let rho = self.radius(lat)?;
        let (sin_t, cos_t) = (self.cone * adjust_lon(lon - self.lon0)).sin_cos();
        Ok((
            self.x0 + rho * sin_t,
            self.y0 + self.rho_origin - rho * cos_t,
        ))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjError> {
        let dx = x - self.x0;
        let dy = self.rho_origin - (y - self.y0);
        let s = if self.cone >= 0.0 { 1.0 } else { -1.0 };
        let rho = s * dx.hypot(dy);
        if rho == 0.0 {
            return Ok((self.lon0, s * HALF_PI));
        }

        let r = rho * self.cone / self.a;
        let q = (self.big_c - r * r) / self.cone;
        let lat = if self.spherical || self.e < EPSLN {
            asinz(0.5 * q)
        } else if (self.q_pole - q.abs()).abs() <= POLE_TOL {
            q.signum() * HALF_PI
        } else {
            latitude_from_q(self.e, q)
        };
        let theta = (s * dx).atan2(s * dy);
        Ok((adjust_lon(self.lon0 + theta / self.cone), lat))
    }
}
