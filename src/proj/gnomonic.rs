//! Gnomonic projection (`+proj=gnom`), spherical form.
//!
//! Great circles map to straight lines. Only the hemisphere centred on the
//! origin is representable.

use crate::defs::ProjDef;
use crate::error::ProjError;
use crate::proj::common::{adjust_lon, asinz};
use crate::proj::ellipsoid::Ellipsoid;
use crate::proj::Projection;

#[derive(Clone, Debug)]
pub struct Gnomonic {
    a: f64,
    lon0: f64,
    lat0: f64,
    k0: f64,
    false_easting: f64,
    false_northing: f64,
    sin_p14: f64,
    cos_p14: f64,
}

impl Gnomonic {
    pub fn new(
        ellipsoid: &Ellipsoid,
        lon0: f64,
        lat0: f64,
        k0: f64,
        false_easting: f64,
        false_northing: f64,
    ) -> Self {
        Self {
            a: ellipsoid.a,
            lon0,
            lat0,
            k0,
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
            def.k0(),
            def.x0(),
            def.y0(),
        ))
    }
}

impl Projection for Gnomonic {
    fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64), ProjError> {
        let dlon = adjust_lon(lon - self.lon0);
        let (sinphi, cosphi) = lat.sin_cos();
        let coslon = dlon.cos();
        // Cosine of the angular distance from the centre.
        let g = self.sin_p14 * sinphi + self.cos_p14 * cosphi * coslon;
        if g <= 0.0 {
            return Err(ProjError::OutOfRange(
                "gnomonic point is 90 degrees or more from the centre".into(),
            ));
        }
        let ak = self.a * self.k0;
        let x = ak * cosphi * dlon.sin() / g;
        let y = ak * (self.cos_p14 * sinphi - self.sin_p14 * cosphi * coslon) / g;
        Ok((x + self.false_easting, y + self.false_northing))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjError> {
        let x = (x - self.false_easting) / (self.a * self.k0);
        let y = (y - self.false_northing) / (self.a * self.k0);
        let rh = x.hypot(y);
        if rh == 0.0 {
            return Ok((self.lon0, self.lat0));
        }
        let c = rh.atan();
        let (sinc, cosc) = c.sin_cos();
        let lat = asinz(cosc * self.sin_p14 + y * sinc * self.cos_p14 / rh);
        let lon = (x * sinc).atan2(rh * self.cos_p14 * cosc - y * self.sin_p14 * sinc);
        Ok((adjust_lon(self.lon0 + lon), lat))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proj::test_support::{assert_roundtrip, bind};
    use approx::assert_relative_eq;

    #[test]
    fn test_great_circle_through_centre_is_straight() {
        // The central meridian maps to the y axis.
        let proj = bind("+proj=gnom +lat_0=45 +lon_0=10 +a=6371000 +b=6371000");
        for lat in [20.0_f64, 45.0, 70.0] {
            let (x, _) = proj.forward(10f64.to_radians(), lat.to_radians()).unwrap();
            assert_relative_eq!(x, 0.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_far_hemisphere_is_out_of_range() {
        let proj = bind("+proj=gnom +lat_0=90 +lon_0=0 +a=6371000 +b=6371000");
        assert!(matches!(
            proj.forward(0.0, -0.1),
            Err(ProjError::OutOfRange(_))
        ));
    }

    #[test]
    fn test_oblique_roundtrip() {
        let proj = bind("+proj=gnom +lat_0=-30 +lon_0=140 +a=6371000 +b=6371000");
        assert_roundtrip(&proj, &[(150.0, -20.0), (120.0, -45.0)], 1e-10);
    }

    #[test]
    fn test_oblique_sphere_reference() {
        let proj = bind("+proj=gnom +lat_0=40 +lon_0=-100 +R=1");
        let (x, y) = proj.forward((-110f64).to_radians(), 20f64.to_radians()).unwrap();
        assert_relative_eq!(x, -0.175_692_880_230, epsilon = 1e-9);
        assert_relative_eq!(y, -0.358_375_598_557, epsilon = 1e-9);
        let (lon, lat) = proj.inverse(x, y).unwrap();
        assert_relative_eq!(lon, (-110f64).to_radians(), epsilon = 1e-12);
        assert_relative_eq!(lat, 20f64.to_radians(), epsilon = 1e-12);
    }
}
