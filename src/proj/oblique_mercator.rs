//! Hotine Oblique Mercator (`+proj=omerc`).
//!
//! Two parameterizations are accepted: a centre point (`+lonc`) with an
//! azimuth (`+alpha`) and/or rectified grid angle (`+gamma`), or two points
//! on the central line (`+lon_1 +lat_1 +lon_2 +lat_2`). `+no_off` measures
//! the u axis from the natural origin instead of the centre; `+no_rot`
//! leaves the result in the unrotated (u, v) frame.

use std::f64::consts::PI;

use crate::defs::ProjDef;
use crate::error::ProjError;
use crate::proj::common::{adjust_lon, phi2z, tsfn, EPSLN, FORTPI, HALF_PI, TWO_PI};
use crate::proj::ellipsoid::Ellipsoid;
use crate::proj::Projection;

/// Closeness below which two-point definitions are rejected as degenerate.
const TOL: f64 = 1e-7;

#[derive(Clone, Debug)]
pub struct ObliqueMercator {
    a: f64,
    e: f64,
    false_easting: f64,
    false_northing: f64,
    lam0: f64,
    no_rot: bool,
    // Constants of the aposphere
    b: f64,
    big_a: f64,
    big_e: f64,
    singam: f64,
    cosgam: f64,
    sinrot: f64,
    cosrot: f64,
    r_b: f64,
    ar_b: f64,
    br_a: f64,
    u_0: f64,
    v_pole_n: f64,
    v_pole_s: f64,
}

impl ObliqueMercator {
    pub fn from_def(def: &ProjDef, ellipsoid: &Ellipsoid) -> Result<Self, ProjError> {
        let es = ellipsoid.es;
        let e = ellipsoid.e;
        let lat0 = def.lat0();
        let k0 = def.k0();

        let centre = def.alpha.is_some() || def.rectified_grid_angle.is_some();
        let (lam1, phi1, lam2, phi2) = (
            def.long1.unwrap_or(0.0),
            def.lat1.unwrap_or(0.0),
            def.long2.unwrap_or(0.0),
            def.lat2.unwrap_or(0.0),
        );
        if !centre
            && ((phi1 - phi2).abs() <= TOL
                || phi1.abs() <= TOL
                || (phi1.abs() - HALF_PI).abs() <= TOL
                || (lat0.abs() - HALF_PI).abs() <= TOL
                || (phi2.abs() - HALF_PI).abs() <= TOL)
        {
            return Err(ProjError::InvalidParameter(
                "omerc needs +alpha/+gamma or two distinct points on the central line".into(),
            ));
        }

        let one_es = 1.0 - es;
        let com = one_es.sqrt();
        let (b, big_a, big_e, d, f) = if lat0.abs() > EPSLN {
            let (sinph0, cosph0) = lat0.sin_cos();
            let con = 1.0 - es * sinph0 * sinph0;
            let b = (1.0 + es * cosph0.powi(4) / one_es).sqrt();
            let big_a = b * k0 * com / con;
            let d = b * com / (cosph0 * con.sqrt());
            let mut f = d * d - 1.0;
            if f <= 0.0 {
                f = 0.0;
            } else {
                f = f.sqrt();
                if lat0 < 0.0 {
                    f = -f;
                }
            }
            let f = f + d;
            let big_e = f * tsfn(e, lat0, sinph0).powf(b);
            (b, big_a, big_e, d, f)
        } else {
            (1.0 / com, k0, 1.0, 1.0, 1.0)
        };

        let (lam0, gamma0, gamma, alpha_c) = if centre {
            let lamc = def.longc.unwrap_or_else(|| def.long0());
            let (gamma0, gamma, alpha_c) = match (def.alpha, def.rectified_grid_angle) {
                (Some(alpha_c), gamma) => {
                    let gamma0 = (alpha_c.sin() / d).asin();
                    (gamma0, gamma.unwrap_or(alpha_c), alpha_c)
                }
                (None, Some(gamma)) => (gamma, gamma, (d * gamma.sin()).asin()),
                (None, None) => (0.0, 0.0, 0.0),
            };
            let lam0 = lamc - (0.5 * (f - 1.0 / f) * gamma0.tan()).asin() / b;
            (lam0, gamma0, gamma, alpha_c)
        } else {
            let h = tsfn(e, phi1, phi1.sin()).powf(b);
            let l = tsfn(e, phi2, phi2.sin()).powf(b);
            let f = big_e / h;
            let p = (l - h) / (l + h);
            let j = big_e * big_e;
            let j = (j - l * h) / (j + l * h);
            let mut lam2 = lam2;
            let con = lam1 - lam2;
            if con < -PI {
                lam2 -= TWO_PI;
            } else if con > PI {
                lam2 += TWO_PI;
            }
            let lam0 = adjust_lon(
                0.5 * (lam1 + lam2) - (j * (0.5 * b * (lam1 - lam2)).tan() / p).atan() / b,
            );
            let gamma0 = (2.0 * (b * adjust_lon(lam1 - lam0)).sin() / (f - 1.0 / f)).atan();
            let alpha_c = (d * gamma0.sin()).asin();
            (lam0, gamma0, alpha_c, alpha_c)
        };

        let r_b = 1.0 / b;
        let ar_b = big_a * r_b;
        let u_0 = if def.no_off {
            0.0
        } else {
            let u = (ar_b * ((d * d - 1.0).sqrt() / alpha_c.cos()).atan()).abs();
            if lat0 < 0.0 {
                -u
            } else {
                u
            }
        };
        let half = 0.5 * gamma0;

        Ok(Self {
            a: ellipsoid.a,
            e,
            false_easting: def.x0(),
            false_northing: def.y0(),
            lam0,
            no_rot: def.no_rot,
            b,
            big_a,
            big_e,
            singam: gamma0.sin(),
            cosgam: gamma0.cos(),
            sinrot: gamma.sin(),
            cosrot: gamma.cos(),
            r_b,
            ar_b,
            br_a: 1.0 / ar_b,
            u_0,
            v_pole_n: ar_b * (FORTPI - half).tan().ln(),
            v_pole_s: ar_b * (FORTPI + half).tan().ln(),
        })
    }
}

impl Projection for ObliqueMercator {
    fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64), ProjError> {
        let dlon = adjust_lon(lon - self.lam0);
        let (u, v) = if (lat.abs() - HALF_PI).abs() > EPSLN {
            let w = self.big_e / tsfn(self.e, lat, lat.sin()).powf(self.b);
            let s = 0.5 * (w - 1.0 / w);
            let t = 0.5 * (w + 1.0 / w);
            let vv = (self.b * dlon).sin();
            let uu = (s * self.singam - vv * self.cosgam) / t;
            if (uu.abs() - 1.0).abs() < EPSLN {
                return Err(ProjError::OutOfRange(
                    "omerc point maps to infinity".into(),
                ));
            }
            let v = 0.5 * self.ar_b * ((1.0 - uu) / (1.0 + uu)).ln();
            let c = (self.b * dlon).cos();
            let u = if c.abs() < TOL {
                self.big_a * dlon
            } else {
                self.ar_b * (s * self.cosgam + vv * self.singam).atan2(c)
            };
            (u, v)
        } else {
            let v = if lat > 0.0 { self.v_pole_n } else { self.v_pole_s };
            (self.ar_b * lat, v)
        };

        let (x, y) = if self.no_rot {
            (u, v)
        } else {
            let u = u - self.u_0;
            (
                v * self.cosrot + u * self.sinrot,
                u * self.cosrot - v * self.sinrot,
            )
        };
        Ok((
            self.a * x + self.false_easting,
            self.a * y + self.false_northing,
        ))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjError> {
        let x = (x - self.false_easting) / self.a;
        let y = (y - self.false_northing) / self.a;
        let (u, v) = if self.no_rot {
            (x, y)
        } else {
            (
                y * self.cosrot + x * self.sinrot + self.u_0,
                x * self.cosrot - y * self.sinrot,
            )
        };

        let qp = (-self.br_a * v).exp();
        let sp = 0.5 * (qp - 1.0 / qp);
        let tp = 0.5 * (qp + 1.0 / qp);
        let vp = (self.br_a * u).sin();
        let up = (vp * self.cosgam + sp * self.singam) / tp;

        if (up.abs() - 1.0).abs() < EPSLN {
            let lat = if up < 0.0 { -HALF_PI } else { HALF_PI };
            return Ok((adjust_lon(self.lam0), lat));
        }
        let ts = (self.big_e / ((1.0 + up) / (1.0 - up)).sqrt()).powf(1.0 / self.b);
        let lat = phi2z(self.e, ts)
            .ok_or_else(|| ProjError::Convergence("omerc inverse latitude".into()))?;
        let lon = -self.r_b * (sp * self.cosgam - vp * self.singam).atan2((self.br_a * u).cos());
        Ok((adjust_lon(lon + self.lam0), lat))
    }
}
