//! Equidistant Cylindrical (`eqc`, Plate Carrée) and its `equi` variant.
//!
//! Always spherical on the semi-major axis: x = a·Δλ·cos φ_ts, y = a·(φ - φ₀).
//! `equi` takes its standard parallel from `+lat_0` and measures northings
//! from the equator.

use crate::defs::ProjDef;
use crate::error::ProjError;
use crate::proj::common::{adjust_lat, adjust_lon};
use crate::proj::ellipsoid::Ellipsoid;
use crate::proj::Projection;

#[derive(Clone, Debug)]
pub struct Equirectangular {
    a: f64,
    /// a·cos φ_ts, metres per radian of longitude.
    x_scale: f64,
    lon0: f64,
    lat0: f64,
    x0: f64,
    y0: f64,
}

impl Equirectangular {
    fn build(def: &ProjDef, ellipsoid: &Ellipsoid, lat0: f64, lat_ts: f64) -> Result<Self, ProjError> {
        let x_scale = ellipsoid.a * lat_ts.cos();
        if x_scale.abs() < 1e-10 * ellipsoid.a {
            return Err(ProjError::InvalidParameter(
                "eqc standard parallel at a pole".into(),
            ));
        }
        Ok(Self {
            a: ellipsoid.a,
            x_scale,
            lon0: def.long0(),
            lat0,
            x0: def.x0(),
            y0: def.y0(),
        })
    }

    pub fn from_def(def: &ProjDef, ellipsoid: &Ellipsoid) -> Result<Self, ProjError> {
        Self::build(def, ellipsoid, def.lat0(), def.lat_ts.unwrap_or(0.0))
    }

    pub fn equi_from_def(def: &ProjDef, ellipsoid: &Ellipsoid) -> Result<Self, ProjError> {
        Self::build(def, ellipsoid, 0.0, def.lat0())
    }
}

impl Projection for Equirectangular {
    fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64), ProjError> {
        Ok((
            self.x0 + self.x_scale * adjust_lon(lon - self.lon0),
            self.y0 + self.a * adjust_lat(lat - self.lat0),
        ))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjError> {
        Ok((
            adjust_lon(self.lon0 + (x - self.x0) / self.x_scale),
            adjust_lat(self.lat0 + (y - self.y0) / self.a),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proj::test_support::{assert_roundtrip, bind};
    use approx::assert_relative_eq;

    const A: f64 = 6_378_137.0;

    #[test]
    fn test_plate_carree_is_linear_in_degrees() {
        let proj = bind("+proj=eqc +ellps=WGS84");
        let (x, y) = proj.forward(10f64.to_radians(), 45f64.to_radians()).unwrap();
        assert_relative_eq!(x, A * 10f64.to_radians(), epsilon = 1e-6);
        assert_relative_eq!(y, A * 45f64.to_radians(), epsilon = 1e-6);
        assert_roundtrip(&proj, &[(10.0, 45.0), (-179.5, -89.0), (0.0, 0.0)], 1e-12);
    }

    #[test]
    fn test_lat_ts_shrinks_eastings() {
        let proj = bind("+proj=eqc +lat_ts=60 +lon_0=0 +a=6378137 +b=6378137 +x_0=10");
        let (x, _) = proj.forward(1.0, 0.0).unwrap();
        assert_relative_eq!(x, A * 0.5 + 10.0, epsilon = 1e-6);
    }

    #[test]
    fn test_lat0_offsets_northings() {
        let proj = bind("+proj=eqc +lat_0=30 +lon_0=-90 +ellps=WGS84");
        let (x, y) = proj.forward((-90f64).to_radians(), 30f64.to_radians()).unwrap();
        assert_relative_eq!(x, 0.0, epsilon = 1e-9);
        assert_relative_eq!(y, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_antimeridian_symmetry() {
        let proj = bind("+proj=eqc +ellps=WGS84");
        let (east, _) = proj.forward(std::f64::consts::PI, 0.0).unwrap();
        let (west, _) = proj.forward(-std::f64::consts::PI, 0.0).unwrap();
        assert_relative_eq!(east.abs(), west.abs(), epsilon = 1e-6);
    }

    #[test]
    fn test_equi_uses_lat0_as_standard_parallel() {
        let proj = bind("+proj=equi +lat_0=60 +lon_0=0 +a=6378137 +b=6378137");
        let (x, y) = proj.forward(1.0, 0.5).unwrap();
        assert_relative_eq!(x, A * 0.5, epsilon = 1e-6);
        assert_relative_eq!(y, A * 0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_polar_standard_parallel_rejected() {
        let def = ProjDef {
            lat_ts: Some(std::f64::consts::FRAC_PI_2),
            ..Default::default()
        };
        assert!(Equirectangular::from_def(&def, &Ellipsoid::wgs84()).is_err());
    }
}
