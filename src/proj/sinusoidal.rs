//! Sinusoidal (`sinu`), equal-area pseudocylindrical.
//!
//! On the ellipsoid y is the meridian distance and x the parallel arc,
//! a·Δλ·cos φ / √(1 - e²sin²φ).

use crate::defs::ProjDef;
use crate::error::ProjError;
use crate::proj::common::{adjust_lon, pj_enfn, pj_inv_mlfn, pj_mlfn, EPSLN, HALF_PI};
use crate::proj::ellipsoid::Ellipsoid;
use crate::proj::Projection;

#[derive(Clone, Debug)]
pub struct Sinusoidal {
    a: f64,
    es: f64,
    /// Meridian-distance coefficients; `None` on a sphere.
    en: Option<[f64; 5]>,
    lon0: f64,
    x0: f64,
    y0: f64,
}

impl Sinusoidal {
    pub fn from_def(def: &ProjDef, ellipsoid: &Ellipsoid) -> Result<Self, ProjError> {
        Ok(Self {
            a: ellipsoid.a,
            es: ellipsoid.es,
            en: (!ellipsoid.sphere).then(|| pj_enfn(ellipsoid.es)),
            lon0: def.long0(),
            x0: def.x0(),
            y0: def.y0(),
        })
    }

    /// Radius of the parallel at `lat`, in units of a.
    fn parallel_radius(&self, lat: f64) -> f64 {
        let (s, c) = lat.sin_cos();
        c / (1.0 - self.es * s * s).sqrt()
    }
}

impl Projection for Sinusoidal {
    fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64), ProjError> {
        let northing = match &self.en {
            Some(en) => pj_mlfn(lat, lat.sin(), lat.cos(), en),
            None => lat,
        };
        let easting = adjust_lon(lon - self.lon0) * self.parallel_radius(lat);
        Ok((self.x0 + self.a * easting, self.y0 + self.a * northing))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjError> {
        let y = (y - self.y0) / self.a;
        let lat = match &self.en {
            Some(en) => pj_inv_mlfn(y, self.es, en),
            None => y,
        };
        if lat.abs() > HALF_PI + EPSLN {
            return Err(ProjError::OutOfRange(format!(
                "sinusoidal northing {y} beyond the pole"
            )));
        }
        let r = self.parallel_radius(lat);
        if r.abs() < 1e-15 {
            return Ok((self.lon0, lat.clamp(-HALF_PI, HALF_PI)));
        }
        Ok((adjust_lon(self.lon0 + (x - self.x0) / self.a / r), lat))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proj::test_support::{assert_roundtrip, bind};
    use approx::assert_relative_eq;

    #[test]
    fn test_roundtrip_ellipsoid_and_sphere() {
        for definition in ["+proj=sinu +ellps=WGS84", "+proj=sinu +R=6371007.181 +lon_0=-60"] {
            assert_roundtrip(
                &bind(definition),
                &[(0.0, 0.0), (10.0, 45.0), (-73.9857, 40.7484), (139.6917, 35.6895), (20.0, -80.0)],
                1e-10,
            );
        }
    }

    #[test]
    fn test_modis_tile_corner() {
        // Upper-left corner of MODIS tile h17v04 on the MODIS sphere.
        let proj = bind("+proj=sinu +R=6371007.181");
        let (lon, lat) = proj.inverse(-1_111_950.519_667, 6_671_703.118).unwrap();
        assert_relative_eq!(lat.to_degrees(), 60.0, epsilon = 1e-6);
        assert_relative_eq!(lon.to_degrees(), -20.0, epsilon = 1e-6);
    }

    #[test]
    fn test_false_origin_both_ways() {
        let proj = bind("+proj=sinu +ellps=WGS84 +x_0=1000 +y_0=2000");
        let (x, y) = proj.forward(0.0, 0.0).unwrap();
        assert_relative_eq!(x, 1000.0);
        assert_relative_eq!(y, 2000.0);
        let (lon, lat) = proj.inverse(1000.0, 2000.0).unwrap();
        assert_relative_eq!(lon, 0.0);
        assert_relative_eq!(lat, 0.0, epsilon = 1e-15);
    }

    #[test]
    fn test_pole_collapses_to_point() {
        let proj = bind("+proj=sinu +ellps=WGS84");
        let (x, _) = proj.forward(45f64.to_radians(), HALF_PI).unwrap();
        assert_relative_eq!(x, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_northing_beyond_pole_rejected() {
        let proj = bind("+proj=sinu +R=6371007.181");
        assert!(matches!(proj.inverse(0.0, 2.0e7), Err(ProjError::OutOfRange(_))));
    }
}
