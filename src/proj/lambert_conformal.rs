//! Lambert Conformal Conic (`lcc`), one or two standard parallels.
//!
//! With a single parallel (`+lat_1` equal to `+lat_2`, or only `+lat_0`) the
//! cone is tangent and `+k_0` scales both axes.

use crate::defs::ProjDef;
use crate::error::ProjError;
use crate::proj::common::{adjust_lon, msfn, phi2z, tsfn, EPSLN, HALF_PI};
use crate::proj::ellipsoid::Ellipsoid;
use crate::proj::Projection;

#[derive(Clone, Debug)]
pub struct LambertConformalConic {
    e: f64,
    lon0: f64,
    x0: f64,
    y0: f64,
    k0: f64,
    /// Cone constant; negative when the apex is over the south pole.
    cone: f64,
    /// a·F, so that ρ = a·F·tⁿ.
    a_f: f64,
    rho_origin: f64,
}

impl LambertConformalConic {
    /// Build from the latitude of origin and the standard parallels. `lat2`
    /// defaults to `lat1`, giving the tangent (1SP) cone.
    pub fn new(
        ellipsoid: &Ellipsoid,
        lon0: f64,
        lat0: f64,
        lat1: f64,
        lat2: Option<f64>,
        k0: f64,
    ) -> Result<Self, ProjError> {
        let lat2 = lat2.unwrap_or(lat1);
        if (lat1 + lat2).abs() < EPSLN {
            return Err(ProjError::InvalidParameter(
                "lcc standard parallels are symmetric about the equator".into(),
            ));
        }
        let e = ellipsoid.e;
        let m1 = msfn(e, lat1.sin(), lat1.cos());
        let t1 = tsfn(e, lat1, lat1.sin());
        let cone = if (lat1 - lat2).abs() > EPSLN {
            let m2 = msfn(e, lat2.sin(), lat2.cos());
            let t2 = tsfn(e, lat2, lat2.sin());
            (m1 / m2).ln() / (t1 / t2).ln()
        } else {
            lat1.sin()
        };
        let a_f = ellipsoid.a * m1 / (cone * t1.powf(cone));

        let mut lcc = Self {
            e,
            lon0,
            x0: 0.0,
            y0: 0.0,
            k0,
            cone,
            a_f,
            rho_origin: 0.0,
        };
        lcc.rho_origin = lcc.radius(lat0)?;
        Ok(lcc)
    }

    pub fn from_def(def: &ProjDef, ellipsoid: &Ellipsoid) -> Result<Self, ProjError> {
        let lat1 = def.lat1();
        let mut lcc = Self::new(ellipsoid, def.long0(), def.lat0(), lat1, def.lat2, def.k0())?;
        lcc.x0 = def.x0();
        lcc.y0 = def.y0();
        Ok(lcc)
    }

    /// ρ at latitude `lat`; zero at the apex pole.
    fn radius(&self, lat: f64) -> Result<f64, ProjError> {
        if (lat.abs() - HALF_PI).abs() > EPSLN {
            return Ok(self.a_f * tsfn(self.e, lat, lat.sin()).powf(self.cone));
        }
        if lat * self.cone <= 0.0 {
            return Err(ProjError::OutOfRange("lcc pole opposite the cone apex".into()));
        }
        Ok(0.0)
    }
}

impl Projection for LambertConformalConic {
    fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64), ProjError> {
        let rho = self.radius(lat)?;
        let (sin_t, cos_t) = (self.cone * adjust_lon(lon - self.lon0)).sin_cos();
        Ok((
            self.x0 + self.k0 * rho * sin_t,
            self.y0 + self.k0 * (self.rho_origin - rho * cos_t),
        ))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjError> {
        let dx = (x - self.x0) / self.k0;
        let dy = self.rho_origin - (y - self.y0) / self.k0;
        let s = self.cone.signum();
        let rho = s * dx.hypot(dy);
        if rho == 0.0 {
            return Ok((self.lon0, s * HALF_PI));
        }

        let theta = (s * dx).atan2(s * dy);
        let ts = (rho / self.a_f).powf(1.0 / self.cone);
        let lat = phi2z(self.e, ts)
            .ok_or_else(|| ProjError::Convergence("lcc inverse latitude".into()))?;
        Ok((adjust_lon(self.lon0 + theta / self.cone), lat))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proj::test_support::{assert_roundtrip, bind};
    use approx::assert_relative_eq;

    const US_FOOT: f64 = 1200.0 / 3937.0;

    fn dms(d: f64, m: f64, s: f64) -> f64 {
        (d.signum() * (d.abs() + m / 60.0 + s / 3600.0)).to_radians()
    }

    #[test]
    fn test_two_parallels_texas_south_central() {
        // EPSG guidance note 7-2, LCC 2SP worked example (NAD27, US survey feet).
        let proj = bind(&format!(
            "+proj=lcc +lat_0=27.833333333333 +lon_0=-99 +lat_1=28.383333333333 +lat_2=30.283333333333 \
             +x_0={} +y_0=0 +ellps=clrk66",
            2_000_000.0 * US_FOOT
        ));
        let (x, y) = proj.forward(dms(-96.0, 0.0, 0.0), dms(28.0, 30.0, 0.0)).unwrap();
        assert_relative_eq!(x / US_FOOT, 2_963_503.91, epsilon = 0.05);
        assert_relative_eq!(y / US_FOOT, 254_759.80, epsilon = 0.05);
    }

    #[test]
    fn test_one_parallel_jamaica() {
        // EPSG guidance note 7-2, LCC 1SP worked example.
        let proj = bind("+proj=lcc +lat_1=18 +lat_0=18 +lon_0=-77 +k_0=1 +x_0=250000 +y_0=150000 +ellps=clrk66");
        let (x, y) = proj.forward(dms(-76.0, 56.0, 37.26), dms(17.0, 55.0, 55.80)).unwrap();
        assert_relative_eq!(x, 255_966.58, epsilon = 0.01);
        assert_relative_eq!(y, 142_493.51, epsilon = 0.01);
    }

    #[test]
    fn test_lambert93_origin_and_roundtrip() {
        let proj = bind("+proj=lcc +lat_1=49 +lat_2=44 +lat_0=46.5 +lon_0=3 +x_0=700000 +y_0=6600000 +ellps=GRS80");
        let (x, y) = proj.forward(3f64.to_radians(), 46.5f64.to_radians()).unwrap();
        assert_relative_eq!(x, 700_000.0, epsilon = 1e-6);
        assert_relative_eq!(y, 6_600_000.0, epsilon = 1e-6);
        assert_roundtrip(&proj, &[(2.35, 48.86), (-1.55, 47.22), (7.75, 48.58), (9.4, 42.1)], 1e-9);
    }

    #[test]
    fn test_k0_scales_about_false_origin() {
        let unit = LambertConformalConic::new(&Ellipsoid::wgs84(), 0.0, 0.8, 0.8, None, 1.0).unwrap();
        let scaled = LambertConformalConic::new(&Ellipsoid::wgs84(), 0.0, 0.8, 0.8, None, 0.9996).unwrap();
        let (x1, y1) = unit.forward(0.1, 0.85).unwrap();
        let (x2, y2) = scaled.forward(0.1, 0.85).unwrap();
        assert_relative_eq!(x2, x1 * 0.9996, epsilon = 1e-6);
        assert_relative_eq!(y2, y1 * 0.9996, epsilon = 1e-6);
        assert_roundtrip(&scaled, &[(5.0, 48.0)], 1e-9);
    }

    #[test]
    fn test_symmetric_parallels_rejected() {
        let lcc = LambertConformalConic::new(&Ellipsoid::wgs84(), 0.0, 0.0, 0.5, Some(-0.5), 1.0);
        assert!(matches!(lcc, Err(ProjError::InvalidParameter(_))));
    }

    #[test]
    fn test_southern_cone() {
        let proj = bind("+proj=lcc +lat_1=-20 +lat_2=-40 +lat_0=-30 +lon_0=135 +ellps=GRS80");
        let (x, y) = proj.forward(140f64.to_radians(), (-35f64).to_radians()).unwrap();
        assert!(x > 0.0 && y < 0.0);
        assert_roundtrip(&proj, &[(140.0, -35.0), (120.0, -22.0)], 1e-9);
    }

    #[test]
    fn test_pole_opposite_apex_fails() {
        let proj = bind("+proj=lcc +lat_1=33 +lat_2=45 +lon_0=-96 +ellps=GRS80");
        assert!(proj.forward(0.0, -HALF_PI).is_err());
        assert!(proj.forward(0.0, HALF_PI).is_ok());
    }
}
