//! American Polyconic projection (`+proj=poly`).

use crate::defs::ProjDef;
use crate::error::ProjError;
use crate::proj::common::{adjust_lat, adjust_lon, g_n, MeridianSeries, EPSLN, HALF_PI};
use crate::proj::ellipsoid::Ellipsoid;
use crate::proj::Projection;

/// Newton iteration cap for the inverse latitude (Snyder 18-17 / 18-18).
const POLY_MAX_ITER: usize = 20;

#[derive(Clone, Debug)]
pub struct Polyconic {
    ellipsoid: Ellipsoid,
    lon0: f64,
    lat0: f64,
    false_easting: f64,
    false_northing: f64,
    series: MeridianSeries,
    ml0: f64,
}

impl Polyconic {
    pub fn new(
        ellipsoid: Ellipsoid,
        lon0: f64,
        lat0: f64,
        false_easting: f64,
        false_northing: f64,
    ) -> Self {
        let series = MeridianSeries::new(ellipsoid.es);
        Self {
            ellipsoid,
            lon0,
            lat0,
            false_easting,
            false_northing,
            series,
            ml0: ellipsoid.a * series.mlfn(lat0),
        }
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

    fn not_converged() -> ProjError {
        ProjError::Convergence("polyconic inverse latitude".into())
    }
}

impl Projection for Polyconic {
    fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64), ProjError> {
        let a = self.ellipsoid.a;
        let lam = adjust_lon(lon - self.lon0);
        let el = lam * lat.sin();

        let (x, y) = if lat.abs() <= EPSLN {
            let y = if self.ellipsoid.sphere {
                -a * self.lat0
            } else {
                -self.ml0
            };
            (a * lam, y)
        } else if self.ellipsoid.sphere {
            let cot = 1.0 / lat.tan();
            (
                a * el.sin() * cot,
                a * (adjust_lat(lat - self.lat0) + (1.0 - el.cos()) * cot),
            )
        } else {
            let nl = g_n(a, self.ellipsoid.e, lat.sin()) / lat.tan();
            (
                nl * el.sin(),
                a * self.series.mlfn(lat) - self.ml0 + nl * (1.0 - el.cos()),
            )
        };
        Ok((x + self.false_easting, y + self.false_northing))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjError> {
        let a = self.ellipsoid.a;
        let x = x - self.false_easting;
        let y = y - self.false_northing;

        if self.ellipsoid.sphere {
            if (y + a * self.lat0).abs() <= EPSLN {
                return Ok((adjust_lon(x / a + self.lon0), 0.0));
            }
            let al = self.lat0 + y / a;
            let bl = x * x / a / a + al * al;
            let mut phi = al;
            for _ in 0..POLY_MAX_ITER {
                let tanphi = phi.tan();
                let dphi = -(al * (phi * tanphi + 1.0) - phi - 0.5 * (phi * phi + bl) * tanphi)
                    / ((phi - al) / tanphi - 1.0);
                phi += dphi;
                if dphi.abs() <= EPSLN {
                    let lon = self.lon0 + (x * phi.tan() / a).asin() / phi.sin();
                    return Ok((adjust_lon(lon), phi));
                }
            }
            return Err(Self::not_converged());
        }

        if (y + self.ml0).abs() <= EPSLN {
            return Ok((adjust_lon(self.lon0 + x / a), 0.0));
        }
        let es = self.ellipsoid.es;
        let e = self.ellipsoid.e;
        let al = (self.ml0 + y) / a;
        let bl = x * x / a / a + al * al;
        let mut phi = al;
        for _ in 0..POLY_MAX_ITER {
            let con = e * phi.sin();
            let cl = (1.0 - con * con).sqrt() * phi.tan();
            let ma = self.series.mlfn(phi);
            let mlnp = self.series.mlfn_prime(phi);
            let dphi = (al * (cl * ma + 1.0) - ma - 0.5 * cl * (ma * ma + bl))
                / (es * (2.0 * phi).sin() * (ma * ma + bl - 2.0 * al * ma) / (4.0 * cl)
                    + (al - ma) * (cl * mlnp - 2.0 / (2.0 * phi).sin())
                    - mlnp);
            phi -= dphi;
            if phi.abs() > HALF_PI {
                return Err(ProjError::OutOfRange(
                    "polyconic inverse left the latitude domain".into(),
                ));
            }
            if dphi.abs() <= EPSLN {
                let cl = (1.0 - es * phi.sin().powi(2)).sqrt() * phi.tan();
                let lon = self.lon0 + (x * cl / a).asin() / phi.sin();
                return Ok((adjust_lon(lon), phi));
            }
        }
        Err(Self::not_converged())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proj::test_support::{assert_roundtrip, bind};
    use approx::assert_relative_eq;

    #[test]
    fn test_central_meridian_is_true_to_scale() {
        let proj = bind("+proj=poly +lat_0=0 +lon_0=-54 +ellps=GRS80");
        let ellipsoid = Ellipsoid::grs80();
        let lat = 0.3;
        let (x, y) = proj.forward((-54f64).to_radians(), lat).unwrap();
        assert_relative_eq!(x, 0.0, epsilon = 1e-9);
        assert_relative_eq!(
            y,
            ellipsoid.a * MeridianSeries::new(ellipsoid.es).mlfn(lat),
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_equator_and_sphere() {
        let proj = bind("+proj=poly +lat_0=0 +lon_0=0 +ellps=GRS80");
        let (x, y) = proj.forward(0.2, 0.0).unwrap();
        assert_relative_eq!(x, 6_378_137.0 * 0.2, epsilon = 1e-6);
        assert_relative_eq!(y, 0.0, epsilon = 1e-9);

        let proj = bind("+proj=poly +lat_0=10 +lon_0=20 +a=6371000 +b=6371000");
        assert_roundtrip(&proj, &[(25.0, 30.0), (15.0, -20.0)], 1e-9);
    }

    #[test]
    fn test_snyder_clarke_1866_example() {
        let proj = bind("+proj=poly +lat_0=30 +lon_0=-96 +ellps=clrk66");
        let (x, y) = proj.forward((-75f64).to_radians(), 40f64.to_radians()).unwrap();
        assert_relative_eq!(x, 1_776_774.540, epsilon = 0.05);
        assert_relative_eq!(y, 1_319_657.776, epsilon = 0.05);
        assert_roundtrip(&proj, &[(-75.0, 40.0)], 1e-9);
    }
}
