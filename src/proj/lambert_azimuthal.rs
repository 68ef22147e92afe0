//! Lambert Azimuthal Equal Area projection (`+proj=laea`).
//!
//! Polar, equatorial and oblique aspects, on the sphere or through the
//! authalic latitude on the ellipsoid (EPSG:3035 is the oblique ellipsoidal
//! case).

use crate::defs::ProjDef;
use crate::error::ProjError;
use crate::proj::common::{adjust_lon, authlat, authset, qsfn, EPSLN, FORTPI, HALF_PI};
use crate::proj::ellipsoid::Ellipsoid;
use crate::proj::Projection;

#[derive(Clone, Copy, Debug, PartialEq)]
enum Aspect {
    NorthPole,
    SouthPole,
    Equatorial,
    Oblique,
}

#[derive(Clone, Debug)]
pub struct LambertAzimuthalEqualArea {
    ellipsoid: Ellipsoid,
    aspect: Aspect,
    lon0: f64,
    lat0: f64,
    false_easting: f64,
    false_northing: f64,
    sin_ph0: f64,
    cos_ph0: f64,
    // Ellipsoidal constants
    qp: f64,
    rq: f64,
    dd: f64,
    xmf: f64,
    ymf: f64,
    sinb1: f64,
    cosb1: f64,
    apa: [f64; 3],
}

impl LambertAzimuthalEqualArea {
    pub fn new(
        ellipsoid: Ellipsoid,
        lon0: f64,
        lat0: f64,
        false_easting: f64,
        false_northing: f64,
    ) -> Self {
        let t = lat0.abs();
        let aspect = if (t - HALF_PI).abs() < EPSLN {
            if lat0 < 0.0 {
                Aspect::SouthPole
            } else {
                Aspect::NorthPole
            }
        } else if t < EPSLN {
            Aspect::Equatorial
        } else {
            Aspect::Oblique
        };

        let mut laea = Self {
            ellipsoid,
            aspect,
            lon0,
            lat0,
            false_easting,
            false_northing,
            sin_ph0: lat0.sin(),
            cos_ph0: lat0.cos(),
            qp: 0.0,
            rq: 0.0,
            dd: 1.0,
            xmf: 1.0,
            ymf: 1.0,
            sinb1: 0.0,
            cosb1: 1.0,
            apa: [0.0; 3],
        };

        if !ellipsoid.sphere {
            let e = ellipsoid.e;
            let es = ellipsoid.es;
            laea.qp = qsfn(e, 1.0);
            laea.apa = authset(es);
            laea.rq = (0.5 * laea.qp).sqrt();
            match aspect {
                Aspect::NorthPole | Aspect::SouthPole => laea.dd = 1.0,
                Aspect::Equatorial => {
                    laea.dd = 1.0 / laea.rq;
                    laea.xmf = 1.0;
                    laea.ymf = 0.5 * laea.qp;
                }
                Aspect::Oblique => {
                    let sinphi = lat0.sin();
                    laea.sinb1 = qsfn(e, sinphi) / laea.qp;
                    laea.cosb1 = (1.0 - laea.sinb1 * laea.sinb1).sqrt();
                    laea.dd = lat0.cos() / ((1.0 - es * sinphi * sinphi).sqrt() * laea.rq * laea.cosb1);
                    laea.ymf = laea.rq / laea.dd;
                    laea.xmf = laea.rq * laea.dd;
                }
            }
        }
        laea
    }

    pub fn from_def(def: &ProjDef, ellipsoid: &Ellipsoid) -> Result<Self, ProjError> {
        Ok(Self::new(
            *ellipsoid,
            def.long0(),
            def.lat0(),
            def.x0(),
            def.y0(),
        ))
    }

    fn forward_sphere(&self, lam: f64, phi: f64) -> Result<(f64, f64), ProjError> {
        let (sinphi, cosphi) = phi.sin_cos();
        let coslam = lam.cos();
        match self.aspect {
            Aspect::Equatorial | Aspect::Oblique => {
                let y = if self.aspect == Aspect::Equatorial {
                    1.0 + cosphi * coslam
                } else {
                    1.0 + self.sin_ph0 * sinphi + self.cos_ph0 * cosphi * coslam
                };
                if y <= EPSLN {
                    return Err(ProjError::OutOfRange("laea antipode of the centre".into()));
                }
                let k = (2.0 / y).sqrt();
                let x = k * cosphi * lam.sin();
                let y = k * if self.aspect == Aspect::Equatorial {
                    sinphi
                } else {
                    self.cos_ph0 * sinphi - self.sin_ph0 * cosphi * coslam
                };
                Ok((x, y))
            }
            Aspect::NorthPole | Aspect::SouthPole => {
                if (phi + self.lat0).abs() < EPSLN {
                    return Err(ProjError::OutOfRange("laea opposite pole".into()));
                }
                let coslam = if self.aspect == Aspect::NorthPole {
                    -coslam
                } else {
                    coslam
                };
                let t = FORTPI - phi * 0.5;
                let r = 2.0
                    * if self.aspect == Aspect::SouthPole {
                        t.cos()
                    } else {
                        t.sin()
                    };
                Ok((r * lam.sin(), r * coslam))
            }
        }
    }

    fn forward_ellipsoid(&self, lam: f64, phi: f64) -> Result<(f64, f64), ProjError> {
        let (sinlam, coslam) = lam.sin_cos();
        let q = qsfn(self.ellipsoid.e, phi.sin());
        let (sinb, cosb) = match self.aspect {
            Aspect::Oblique | Aspect::Equatorial => {
                let sinb = q / self.qp;
                (sinb, (1.0 - sinb * sinb).sqrt())
            }
            _ => (0.0, 0.0),
        };
        let (b, q) = match self.aspect {
            Aspect::Oblique => (1.0 + self.sinb1 * sinb + self.cosb1 * cosb * coslam, q),
            Aspect::Equatorial => (1.0 + cosb * coslam, q),
            Aspect::NorthPole => (HALF_PI + phi, self.qp - q),
            Aspect::SouthPole => (phi - HALF_PI, self.qp + q),
        };
        if b.abs() < EPSLN {
            return Err(ProjError::OutOfRange("laea point at the far pole".into()));
        }
        match self.aspect {
            Aspect::Oblique | Aspect::Equatorial => {
                let b = (2.0 / b).sqrt();
                let y = if self.aspect == Aspect::Oblique {
                    self.ymf * b * (self.cosb1 * sinb - self.sinb1 * cosb * coslam)
                } else {
                    b * sinb * self.ymf
                };
                Ok((self.xmf * b * cosb * sinlam, y))
            }
            Aspect::NorthPole | Aspect::SouthPole => {
                if q >= 0.0 {
                    let b = q.sqrt();
                    let y = coslam * if self.aspect == Aspect::SouthPole { b } else { -b };
                    Ok((b * sinlam, y))
                } else {
                    Ok((0.0, 0.0))
                }
            }
        }
    }

    fn inverse_sphere(&self, x: f64, y: f64) -> Result<(f64, f64), ProjError> {
        let rh = x.hypot(y);
        let half = rh * 0.5;
        if half > 1.0 {
            return Err(ProjError::OutOfRange(format!(
                "laea point outside the projected disc, rho={rh}"
            )));
        }
        let mut phi = 2.0 * half.asin();
        let (sinz, cosz) = phi.sin_cos();
        let (x, y) = match self.aspect {
            Aspect::Equatorial => {
                phi = if rh <= EPSLN { 0.0 } else { (y * sinz / rh).asin() };
                (x * sinz, cosz * rh)
            }
            Aspect::Oblique => {
                phi = if rh <= EPSLN {
                    self.lat0
                } else {
                    (cosz * self.sin_ph0 + y * sinz * self.cos_ph0 / rh).asin()
                };
                (
                    x * sinz * self.cos_ph0,
                    (cosz - phi.sin() * self.sin_ph0) * rh,
                )
            }
            Aspect::NorthPole => {
                phi = HALF_PI - phi;
                (x, -y)
            }
            Aspect::SouthPole => {
                phi -= HALF_PI;
                (x, y)
            }
        };
        let lam = if y == 0.0 && matches!(self.aspect, Aspect::Equatorial | Aspect::Oblique) {
            0.0
        } else {
            x.atan2(y)
        };
        Ok((lam, phi))
    }

    fn inverse_ellipsoid(&self, x: f64, y: f64) -> Result<(f64, f64), ProjError> {
        let (x, y, ab) = match self.aspect {
            Aspect::Oblique | Aspect::Equatorial => {
                let x = x / self.dd;
                let y = y * self.dd;
                let rho = x.hypot(y);
                if rho < EPSLN {
                    return Ok((0.0, self.lat0));
                }
                let s_ce = 2.0 * (0.5 * rho / self.rq).asin();
                let (s_ce, c_ce) = s_ce.sin_cos();
                let x = x * s_ce;
                if self.aspect == Aspect::Oblique {
                    let ab = c_ce * self.sinb1 + y * s_ce * self.cosb1 / rho;
                    (x, rho * self.cosb1 * c_ce - y * self.sinb1 * s_ce, ab)
                } else {
                    (x, rho * c_ce, y * s_ce / rho)
                }
            }
            Aspect::NorthPole | Aspect::SouthPole => {
                let y = if self.aspect == Aspect::NorthPole { -y } else { y };
                let q = x * x + y * y;
                if q == 0.0 {
                    return Ok((0.0, self.lat0));
                }
                let ab = 1.0 - q / self.qp;
                let ab = if self.aspect == Aspect::SouthPole { -ab } else { ab };
                (x, y, ab)
            }
        };
        Ok((x.atan2(y), authlat(ab.clamp(-1.0, 1.0).asin(), &self.apa)))
    }
}

impl Projection for LambertAzimuthalEqualArea {
    fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64), ProjError> {
        let lam = adjust_lon(lon - self.lon0);
        let (x, y) = if self.ellipsoid.sphere {
            self.forward_sphere(lam, lat)?
        } else {
            self.forward_ellipsoid(lam, lat)?
        };
        let a = self.ellipsoid.a;
        Ok((a * x + self.false_easting, a * y + self.false_northing))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjError> {
        let a = self.ellipsoid.a;
        let x = (x - self.false_easting) / a;
        let y = (y - self.false_northing) / a;
        let (lam, phi) = if self.ellipsoid.sphere {
            self.inverse_sphere(x, y)?
        } else {
            self.inverse_ellipsoid(x, y)?
        };
        Ok((adjust_lon(self.lon0 + lam), phi))
    }
}
