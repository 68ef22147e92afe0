//! Cassini-Soldner projection (`+proj=cass`).
//!
//! Ellipsoidal form is Snyder's series (16-1 .. 16-6), adequate within a few
//! degrees of the central meridian.

use crate::defs::ProjDef;
use crate::error::ProjError;
use crate::proj::common::{adjust_lat, adjust_lon, g_n, sign, MeridianSeries, EPSLN, HALF_PI};
use crate::proj::ellipsoid::Ellipsoid;
use crate::proj::Projection;

#[derive(Clone, Debug)]
pub struct Cassini {
    ellipsoid: Ellipsoid,
    lon0: f64,
    lat0: f64,
    false_easting: f64,
    false_northing: f64,
    series: MeridianSeries,
    /// Meridional distance to the latitude of origin.
    ml0: f64,
}

impl Cassini {
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
}

impl Projection for Cassini {
    fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64), ProjError> {
        let a = self.ellipsoid.a;
        let es = self.ellipsoid.es;
        let lam = adjust_lon(lon - self.lon0);

        let (x, y) = if self.ellipsoid.sphere {
            (
                a * (lat.cos() * lam.sin()).asin(),
                a * (lat.tan().atan2(lam.cos()) - self.lat0),
            )
        } else {
            let (sinphi, cosphi) = lat.sin_cos();
            let nl = g_n(a, self.ellipsoid.e, sinphi);
            let tl = lat.tan().powi(2);
            let al = lam * cosphi;
            let asq = al * al;
            let cl = es * cosphi * cosphi / (1.0 - es);
            let ml = a * self.series.mlfn(lat);

            let x = nl * al * (1.0 - asq * tl * (1.0 / 6.0 - (8.0 - tl + 8.0 * cl) * asq / 120.0));
            let y = ml - self.ml0
                + nl * sinphi / cosphi * asq * (0.5 + (5.0 - tl + 6.0 * cl) * asq / 24.0);
            (x, y)
        };
        Ok((x + self.false_easting, y + self.false_northing))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjError> {
        let a = self.ellipsoid.a;
        let es = self.ellipsoid.es;
        let x = x - self.false_easting;
        let y = y - self.false_northing;

        let (lam, phi) = if self.ellipsoid.sphere {
            let dd = y / a + self.lat0;
            (
                (x / a).tan().atan2(dd.cos()),
                (dd.sin() * (x / a).cos()).asin(),
            )
        } else {
            let phi1 = self.series.imlfn(self.ml0 / a + y / a);
            if (phi1.abs() - HALF_PI).abs() <= EPSLN {
                return Ok((self.lon0, HALF_PI * sign(y)));
            }
            let nl1 = g_n(a, self.ellipsoid.e, phi1.sin());
            let rl1 = nl1 * nl1 * nl1 / a / a * (1.0 - es);
            let tl1 = phi1.tan().powi(2);
            let dl = x / nl1;
            let dsq = dl * dl;
            let phi = phi1
                - nl1 * phi1.tan() / rl1 * dsq * (0.5 - (1.0 + 3.0 * tl1) * dsq / 24.0);
            let lam = dl * (1.0 - dsq * (tl1 / 3.0 + (1.0 + 3.0 * tl1) * tl1 * dsq / 15.0))
                / phi1.cos();
            (lam, phi)
        };
        Ok((adjust_lon(lam + self.lon0), adjust_lat(phi)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proj::test_support::{assert_roundtrip, bind};
    use approx::assert_relative_eq;

    #[test]
    fn test_origin_maps_to_false_origin() {
        let proj = bind(
            "+proj=cass +lat_0=10.44166666666667 +lon_0=-61.33333333333334 +x_0=86501.46392051999 +y_0=65379.0134283 +a=6378293.645208759 +b=6356617.987679838",
        );
        let (x, y) = proj
            .forward((-61.33333333333334_f64).to_radians(), 10.44166666666667_f64.to_radians())
            .unwrap();
        assert_relative_eq!(x, 86_501.463_920_52, epsilon = 1e-6);
        assert_relative_eq!(y, 65_379.013_428_3, epsilon = 1e-6);
    }

    #[test]
    fn test_spherical_roundtrip() {
        let proj = bind("+proj=cass +lat_0=30 +lon_0=10 +a=6371000 +b=6371000");
        assert_roundtrip(&proj, &[(12.0, 35.0), (5.0, 20.0), (10.0, -10.0)], 1e-10);
    }

    #[test]
    fn test_central_meridian_is_meridional_distance() {
        let ellipsoid = Ellipsoid::from_axes(6_378_206.4, 6_356_583.8);
        let proj = Cassini::new(ellipsoid, 0.0, 0.0, 0.0, 0.0);
        let lat = 0.5;
        let (x, y) = proj.forward(0.0, lat).unwrap();
        assert_relative_eq!(x, 0.0, epsilon = 1e-9);
        assert_relative_eq!(
            y,
            ellipsoid.a * MeridianSeries::new(ellipsoid.es).mlfn(lat),
            epsilon = 1e-6
        );
    }
}
