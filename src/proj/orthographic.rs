//! Orthographic projection (`+proj=ortho`), spherical form.

use crate::defs::ProjDef;
use crate::error::ProjError;
use crate::proj::common::{adjust_lon, asinz, EPSLN, HALF_PI};
use crate::proj::ellipsoid::Ellipsoid;
use crate::proj::Projection;

#[derive(Clone, Debug)]
pub struct Orthographic {
    a: f64,
    lon0: f64,
    lat0: f64,
    false_easting: f64,
    false_northing: f64,
    sin_p14: f64,
    cos_p14: f64,
}

impl Orthographic {
    pub fn new(
        ellipsoid: &Ellipsoid,
        lon0: f64,
        lat0: f64,
        false_easting: f64,
        false_northing: f64,
    ) -> Self {
        Self {
            a: ellipsoid.a,
            lon0,
            lat0,
            false_easting,
            false_northing,
            sin_p14: lat0.sin(),
            cos_p14: lat0.cos(),
        }
    }

    pub fn from_def(def: &ProjDef, ellipsoid: &Ellipsoid) -> Result<Self, ProjError> {
        Ok(Self::new(
            ellipsoid,
            def.long0(),
            def.lat0(),
            def.x0(),
            def.y0(),
        ))
    }
}

impl Projection for Orthographic {
    fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64), ProjError> {
        let dlon = adjust_lon(lon - self.lon0);
        let (sinphi, cosphi) = lat.sin_cos();
        let coslon = dlon.cos();
        let g = self.sin_p14 * sinphi + self.cos_p14 * cosphi * coslon;
        if g < 0.0 && g.abs() > EPSLN {
            return Err(ProjError::OutOfRange(
                "orthographic point is on the far side of the globe".into(),
            ));
        }
        let x = self.a * cosphi * dlon.sin();
        let y = self.a * (self.cos_p14 * sinphi - self.sin_p14 * cosphi * coslon);
        Ok((x + self.false_easting, y + self.false_northing))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjError> {
        let x = x - self.false_easting;
        let y = y - self.false_northing;
        let rh = x.hypot(y);
        if rh > self.a * (1.0 + EPSLN) {
            return Err(ProjError::OutOfRange(format!(
                "orthographic radius {rh} exceeds the globe"
            )));
        }
        if rh <= EPSLN {
            return Ok((self.lon0, self.lat0));
        }
        let z = asinz(rh / self.a);
        let (sinz, cosz) = z.sin_cos();
        let lat = asinz(cosz * self.sin_p14 + y * sinz * self.cos_p14 / rh);
        let lon = if (self.lat0.abs() - HALF_PI).abs() <= EPSLN {
            if self.lat0 >= 0.0 {
                self.lon0 + x.atan2(-y)
            } else {
                self.lon0 - (-x).atan2(y)
            }
        } else {
            self.lon0 + (x * sinz).atan2(rh * self.cos_p14 * cosz - y * self.sin_p14 * sinz)
        };
        Ok((adjust_lon(lon), lat))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proj::test_support::{assert_roundtrip, bind};
    use approx::assert_relative_eq;

    #[test]
    fn test_limb_radius() {
        let proj = bind("+proj=ortho +lat_0=0 +lon_0=0 +a=6370997 +b=6370997");
        let (x, y) = proj.forward(HALF_PI, 0.0).unwrap();
        assert_relative_eq!(x, 6_370_997.0, epsilon = 1e-6);
        assert_relative_eq!(y, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_far_side_is_out_of_range() {
        let proj = bind("+proj=ortho +lat_0=40 +lon_0=-100 +a=6370997 +b=6370997");
        assert!(matches!(
            proj.forward(80f64.to_radians(), (-40f64).to_radians()),
            Err(ProjError::OutOfRange(_))
        ));
    }

    #[test]
    fn test_polar_aspect_roundtrip() {
        let proj = bind("+proj=ortho +lat_0=90 +lon_0=0 +a=6370997 +b=6370997 +x_0=100");
        assert_roundtrip(&proj, &[(30.0, 60.0), (-150.0, 20.0)], 1e-9);
        let proj = bind("+proj=ortho +lat_0=-90 +lon_0=0 +a=6370997 +b=6370997");
        assert_roundtrip(&proj, &[(30.0, -60.0), (-150.0, -20.0)], 1e-9);
    }

    #[test]
    fn test_oblique_sphere_reference() {
        // Snyder's spherical worked example on the unit sphere.
        let proj = bind("+proj=ortho +lat_0=40 +lon_0=-100 +R=1");
        let (x, y) = proj.forward((-110f64).to_radians(), 30f64.to_radians()).unwrap();
        assert_relative_eq!(x, -0.150_383_733_180, epsilon = 1e-9);
        assert_relative_eq!(y, -0.165_191_103_471, epsilon = 1e-9);
        let (lon, lat) = proj.inverse(x, y).unwrap();
        assert_relative_eq!(lon, (-110f64).to_radians(), epsilon = 1e-12);
        assert_relative_eq!(lat, 30f64.to_radians(), epsilon = 1e-12);
    }
}
