//! Stereographic projections.
//!
//! - [`Stereographic`] (`+proj=stere`): polar, equatorial and oblique aspects
//!   through the conformal latitude. Polar Stereographic: EPSG:3031
//!   (Antarctic), EPSG:3413 (Arctic).
//! - [`ObliqueStereographic`] (`+proj=sterea`): double projection through the
//!   Gauss conformal sphere, as used by RD New (EPSG:28992).
//! - [`Gauss`] (`+proj=gauss`): the conformal sphere mapping on its own.

use tracing::warn;

use crate::defs::ProjDef;
use crate::error::ProjError;
use crate::proj::common::{
    adjust_lon, asinz, msfn, phi2z, sign, srat, tsfn, EPSLN, FORTPI, HALF_PI,
};
use crate::proj::ellipsoid::Ellipsoid;
use crate::proj::Projection;
use std::f64::consts::PI;

const GAUSS_MAX_ITER: usize = 20;
const GAUSS_DEL_TOL: f64 = 1e-14;

/// Reciprocal of `tsfn`, the conformal-latitude helper.
fn ssfn(phit: f64, sinphi: f64, e: f64) -> f64 {
    let sinphi = sinphi * e;
    (0.5 * (HALF_PI + phit)).tan() * ((1.0 - sinphi) / (1.0 + sinphi)).powf(0.5 * e)
}

#[derive(Clone, Debug)]
pub struct Stereographic {
    ellipsoid: Ellipsoid,
    lon0: f64,
    lat0: f64,
    k0: f64,
    false_easting: f64,
    false_northing: f64,
    sin_lat0: f64,
    cos_lat0: f64,
    /// +1 for a north polar aspect, -1 for south.
    con: f64,
    /// √((1+e)^(1+e)·(1-e)^(1-e))
    cons: f64,
    ms1: f64,
    sin_x0: f64,
    cos_x0: f64,
}

impl Stereographic {
    pub fn new(
        ellipsoid: Ellipsoid,
        lon0: f64,
        lat0: f64,
        k0: f64,
        lat_ts: Option<f64>,
        false_easting: f64,
        false_northing: f64,
    ) -> Self {
        let e = ellipsoid.e;
        let (sin_lat0, cos_lat0) = lat0.sin_cos();
        let polar = cos_lat0.abs() <= EPSLN;
        let con = if lat0 > 0.0 { 1.0 } else { -1.0 };
        let cons = ((1.0 + e).powf(1.0 + e) * (1.0 - e).powf(1.0 - e)).sqrt();

        // Latitude of true scale only matters for the polar aspect.
        let k0 = match lat_ts {
            Some(lat_ts) if k0 == 1.0 && polar => {
                if ellipsoid.sphere {
                    0.5 * (1.0 + sign(lat0) * lat_ts.sin())
                } else if lat_ts.cos().abs() > EPSLN {
                    0.5 * cons * msfn(e, lat_ts.sin(), lat_ts.cos())
                        / tsfn(e, con * lat_ts, con * lat_ts.sin())
                } else {
                    k0
                }
            }
            _ => k0,
        };

        let x0 = 2.0 * ssfn(lat0, sin_lat0, e).atan() - HALF_PI;
        Self {
            ellipsoid,
            lon0,
            lat0,
            k0,
            false_easting,
            false_northing,
            sin_lat0,
            cos_lat0,
            con,
            cons,
            ms1: msfn(e, sin_lat0, cos_lat0),
            sin_x0: x0.sin(),
            cos_x0: x0.cos(),
        }
    }

    pub fn from_def(def: &ProjDef, ellipsoid: &Ellipsoid) -> Result<Self, ProjError> {
        Ok(Self::new(
            *ellipsoid,
            def.long0(),
            def.lat0(),
            def.k0(),
            def.lat_ts,
            def.x0(),
            def.y0(),
        ))
    }

    fn is_polar(&self) -> bool {
        self.cos_lat0.abs() <= EPSLN
    }
}

impl Projection for Stereographic {
    fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64), ProjError> {
        let (sin_lat, cos_lat) = lat.sin_cos();
        let dlon = adjust_lon(lon - self.lon0);
        if ((lon - self.lon0).abs() - PI).abs() <= EPSLN && (lat + self.lat0).abs() <= EPSLN {
            return Err(ProjError::OutOfRange(
                "stereographic antipode of the centre".into(),
            ));
        }
        let a = self.ellipsoid.a;

        if self.ellipsoid.sphere {
            let k = 2.0 * self.k0
                / (1.0 + self.sin_lat0 * sin_lat + self.cos_lat0 * cos_lat * dlon.cos());
            let x = a * k * cos_lat * dlon.sin();
            let y = a * k * (self.cos_lat0 * sin_lat - self.sin_lat0 * cos_lat * dlon.cos());
            return Ok((x + self.false_easting, y + self.false_northing));
        }

        let e = self.ellipsoid.e;
        if self.is_polar() {
            let ts = tsfn(e, lat * self.con, self.con * sin_lat);
            let rh = 2.0 * a * self.k0 * ts / self.cons;
            let x = rh * dlon.sin();
            let y = -self.con * rh * dlon.cos();
            return Ok((x + self.false_easting, y + self.false_northing));
        }

        let chi = 2.0 * ssfn(lat, sin_lat, e).atan() - HALF_PI;
        let (sin_chi, cos_chi) = chi.sin_cos();
        let (k, y) = if self.sin_lat0.abs() < EPSLN {
            let k = 2.0 * a * self.k0 / (1.0 + cos_chi * dlon.cos());
            (k, k * sin_chi)
        } else {
            let k = 2.0 * a * self.k0 * self.ms1
                / (self.cos_x0
                    * (1.0 + self.sin_x0 * sin_chi + self.cos_x0 * cos_chi * dlon.cos()));
            (
                k,
                k * (self.cos_x0 * sin_chi - self.sin_x0 * cos_chi * dlon.cos()),
            )
        };
        let x = k * cos_chi * dlon.sin();
        Ok((x + self.false_easting, y + self.false_northing))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjError> {
        let x = x - self.false_easting;
        let y = y - self.false_northing;
        let rh = (x * x + y * y).sqrt();
        let a = self.ellipsoid.a;

        if rh <= EPSLN {
            return Ok((self.lon0, self.lat0));
        }

        if self.ellipsoid.sphere {
            let c = 2.0 * (rh / (2.0 * a * self.k0)).atan();
            let (sin_c, cos_c) = c.sin_cos();
            let lat = asinz(cos_c * self.sin_lat0 + y * sin_c * self.cos_lat0 / rh);
            let lon = if self.cos_lat0.abs() < EPSLN {
                if self.lat0 > 0.0 {
                    self.lon0 + x.atan2(-y)
                } else {
                    self.lon0 + x.atan2(y)
                }
            } else {
                self.lon0
                    + (x * sin_c).atan2(rh * self.cos_lat0 * cos_c - y * self.sin_lat0 * sin_c)
            };
            return Ok((adjust_lon(lon), lat));
        }

        let e = self.ellipsoid.e;
        if self.is_polar() {
            let (x, y) = (x * self.con, y * self.con);
            let ts = rh * self.cons / (2.0 * a * self.k0);
            let lat = phi2z(e, ts)
                .ok_or_else(|| ProjError::Convergence("polar stereographic latitude".into()))?;
            let lon = self.con * adjust_lon(self.con * self.lon0 + x.atan2(-y));
            return Ok((lon, self.con * lat));
        }

        let ce = 2.0 * (rh * self.cos_x0 / (2.0 * a * self.k0 * self.ms1)).atan();
        let (sin_ce, cos_ce) = ce.sin_cos();
        let chi = asinz(cos_ce * self.sin_x0 + y * sin_ce * self.cos_x0 / rh);
        let lon = adjust_lon(
            self.lon0
                + (x * sin_ce).atan2(rh * self.cos_x0 * cos_ce - y * self.sin_x0 * sin_ce),
        );
        let lat = -phi2z(e, (0.5 * (HALF_PI + chi)).tan())
            .ok_or_else(|| ProjError::Convergence("stereographic latitude".into()))?;
        Ok((lon, lat))
    }
}

/// Conformal mapping of the ellipsoid onto the Gauss sphere.
///
/// Longitudes scale by `c`; latitudes go through the conformal latitude.
/// Coordinates stay in radians.
#[derive(Clone, Debug)]
pub struct Gauss {
    e: f64,
    lon0: f64,
    c: f64,
    k: f64,
    ratexp: f64,
    /// Conformal sphere radius divided by `a`.
    rc: f64,
    /// Latitude of origin on the sphere.
    phic0: f64,
}

impl Gauss {
    pub fn new(ellipsoid: &Ellipsoid, lon0: f64, lat0: f64) -> Self {
        let es = ellipsoid.es;
        let e = ellipsoid.e;
        let sphi = lat0.sin();
        let cphi = lat0.cos().powi(2);
        let rc = (1.0 - es).sqrt() / (1.0 - es * sphi * sphi);
        let c = (1.0 + es * cphi * cphi / (1.0 - es)).sqrt();
        let phic0 = (sphi / c).asin();
        let ratexp = 0.5 * c * e;
        let k = (0.5 * phic0 + FORTPI).tan()
            / ((0.5 * lat0 + FORTPI).tan().powf(c) * srat(e * sphi, ratexp));
        Self {
            e,
            lon0,
            c,
            k,
            ratexp,
            rc,
            phic0,
        }
    }

    pub fn from_def(def: &ProjDef, ellipsoid: &Ellipsoid) -> Result<Self, ProjError> {
        Ok(Self::new(ellipsoid, def.long0(), def.lat0()))
    }

    /// Geodetic (longitude offset from the origin, latitude) to the sphere.
    fn to_sphere(&self, dlon: f64, lat: f64) -> (f64, f64) {
        let lat = 2.0
            * (self.k * (0.5 * lat + FORTPI).tan().powf(self.c) * srat(self.e * lat.sin(), self.ratexp))
                .atan()
            - HALF_PI;
        (self.c * dlon, lat)
    }

    fn from_sphere(&self, x: f64, y: f64) -> Result<(f64, f64), ProjError> {
        let lon = x / self.c;
        let num = ((0.5 * y + FORTPI).tan() / self.k).powf(1.0 / self.c);
        let mut prev = y;
        for _ in 0..GAUSS_MAX_ITER {
            let lat = 2.0 * (num * srat(self.e * prev.sin(), -0.5 * self.e)).atan() - HALF_PI;
            if (lat - prev).abs() < GAUSS_DEL_TOL {
                return Ok((lon, lat));
            }
            prev = lat;
        }
        warn!(y, "gauss inverse latitude did not converge");
        Err(ProjError::Convergence(
            "gauss inverse latitude did not converge".into(),
        ))
    }
}

impl Projection for Gauss {
    fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64), ProjError> {
        Ok(self.to_sphere(adjust_lon(lon - self.lon0), lat))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjError> {
        let (dlon, lat) = self.from_sphere(x, y)?;
        Ok((adjust_lon(dlon + self.lon0), lat))
    }
}

/// Oblique Stereographic (double) projection.
#[derive(Clone, Debug)]
pub struct ObliqueStereographic {
    gauss: Gauss,
    a: f64,
    k0: f64,
    false_easting: f64,
    false_northing: f64,
    sin_c0: f64,
    cos_c0: f64,
    /// Twice the conformal sphere radius over `a`.
    r2: f64,
}

impl ObliqueStereographic {
    pub fn new(
        ellipsoid: Ellipsoid,
        lon0: f64,
        lat0: f64,
        k0: f64,
        false_easting: f64,
        false_northing: f64,
    ) -> Self {
        let gauss = Gauss::new(&ellipsoid, lon0, lat0);
        let (sin_c0, cos_c0) = gauss.phic0.sin_cos();
        let r2 = 2.0 * gauss.rc;
        Self {
            gauss,
            a: ellipsoid.a,
            k0,
            false_easting,
            false_northing,
            sin_c0,
            cos_c0,
            r2,
        }
    }

    pub fn from_def(def: &ProjDef, ellipsoid: &Ellipsoid) -> Result<Self, ProjError> {
        Ok(Self::new(
            *ellipsoid,
            def.long0(),
            def.lat0(),
            def.k0(),
            def.x0(),
            def.y0(),
        ))
    }
}

impl Projection for ObliqueStereographic {
    fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64), ProjError> {
        let (lon, lat) = self
            .gauss
            .to_sphere(adjust_lon(lon - self.gauss.lon0), lat);
        let (sin_c, cos_c) = lat.sin_cos();
        let cos_l = lon.cos();
        let k = self.k0 * self.r2 / (1.0 + self.sin_c0 * sin_c + self.cos_c0 * cos_c * cos_l);
        let x = k * cos_c * lon.sin();
        let y = k * (self.cos_c0 * sin_c - self.sin_c0 * cos_c * cos_l);
        Ok((
            self.a * x + self.false_easting,
            self.a * y + self.false_northing,
        ))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjError> {
        let x = (x - self.false_easting) / self.a / self.k0;
        let y = (y - self.false_northing) / self.a / self.k0;
        let rho = x.hypot(y);
        let (lon, lat) = if rho != 0.0 {
            let c = 2.0 * rho.atan2(self.r2);
            let (sin_c, cos_c) = c.sin_cos();
            let lat = asinz(cos_c * self.sin_c0 + y * sin_c * self.cos_c0 / rho);
            let lon = (x * sin_c).atan2(rho * self.cos_c0 * cos_c - y * self.sin_c0 * sin_c);
            (lon, lat)
        } else {
            (0.0, self.gauss.phic0)
        };
        let (dlon, lat) = self.gauss.from_sphere(lon, lat)?;
        Ok((adjust_lon(dlon + self.gauss.lon0), lat))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proj::test_support::{assert_roundtrip, bind};
    use crate::proj::ProjectionMethod;
    use approx::assert_relative_eq;

    /// EPSG:3031: Antarctic Polar Stereographic
    fn antarctic() -> ProjectionMethod {
        bind("+proj=stere +lat_0=-90 +lat_ts=-71 +lon_0=0 +k=1 +x_0=0 +y_0=0 +datum=WGS84")
    }

    /// EPSG:3413: Arctic NSIDC Polar Stereographic North
    fn arctic() -> ProjectionMethod {
        bind("+proj=stere +lat_0=90 +lat_ts=70 +lon_0=-45 +k=1 +x_0=0 +y_0=0 +datum=WGS84")
    }

    #[test]
    fn test_polar_antarctic_roundtrip() {
        let proj = antarctic();
        let cases: &[(f64, f64)] = &[(0.0, -75.0), (90.0, -80.0), (-120.0, -70.0), (45.0, -65.0)];
        assert_roundtrip(&proj, cases, 1e-9);
    }

    #[test]
    fn test_polar_arctic_roundtrip() {
        let proj = arctic();
        let cases: &[(f64, f64)] = &[(-45.0, 75.0), (0.0, 80.0), (90.0, 85.0), (-90.0, 70.0)];
        assert_roundtrip(&proj, cases, 1e-9);
    }

    #[test]
    fn test_polar_poles_map_to_origin() {
        let (x, y) = antarctic().forward(0.0, -HALF_PI).unwrap();
        assert_relative_eq!(x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(y, 0.0, epsilon = 1e-6);

        let (x, y) = arctic()
            .forward((-45.0_f64).to_radians(), HALF_PI)
            .unwrap();
        assert_relative_eq!(x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(y, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_polar_true_scale_at_lat_ts() {
        // At the latitude of true scale, a small step along the parallel has unit scale.
        let proj = antarctic();
        let ellipsoid = Ellipsoid::wgs84();
        let lat = (-71.0_f64).to_radians();
        let d = 1e-7;
        let (x0, y0) = proj.forward(0.0, lat).unwrap();
        let (x1, y1) = proj.forward(d, lat).unwrap();
        let ground = ellipsoid.a * msfn(ellipsoid.e, lat.sin(), lat.cos()) * d;
        assert_relative_eq!((x1 - x0).hypot(y1 - y0) / ground, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_oblique_and_equatorial_aspects() {
        for definition in [
            "+proj=stere +lat_0=52 +lon_0=10 +k=0.9999 +ellps=GRS80",
            "+proj=stere +lat_0=0 +lon_0=10 +ellps=GRS80 +y_0=1000",
            "+proj=stere +lat_0=45 +lon_0=-30 +a=6371000 +b=6371000",
        ] {
            let proj = bind(definition);
            assert_roundtrip(&proj, &[(12.0, 50.0), (5.0, 30.0), (-20.0, 40.0)], 1e-9);
        }
    }

    #[test]
    fn test_equatorial_adds_false_northing() {
        let proj = bind("+proj=stere +lat_0=0 +lon_0=10 +ellps=GRS80 +y_0=1000");
        let (_, y) = proj.forward(10f64.to_radians(), 0.0).unwrap();
        assert_relative_eq!(y, 1000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_antipode_is_out_of_range() {
        let proj = bind("+proj=stere +lat_0=0 +lon_0=0 +a=6371000 +b=6371000");
        assert!(matches!(
            proj.forward(PI, 0.0),
            Err(ProjError::OutOfRange(_))
        ));
    }

    #[test]
    fn test_rd_new_reference_point() {
        // Amersfoort origin maps to the false origin.
        let proj = ObliqueStereographic::new(
            Ellipsoid::from_inverse_flattening(6_377_397.155, 299.152_812_8),
            5.387_638_888_888_89_f64.to_radians(),
            52.156_160_555_555_55_f64.to_radians(),
            0.999_907_9,
            155_000.0,
            463_000.0,
        );
        let (x, y) = proj
            .forward(
                5.387_638_888_888_89_f64.to_radians(),
                52.156_160_555_555_55_f64.to_radians(),
            )
            .unwrap();
        assert_relative_eq!(x, 155_000.0, epsilon = 1e-6);
        assert_relative_eq!(y, 463_000.0, epsilon = 1e-6);

        let cases: &[(f64, f64)] = &[
            (4.9, 52.37), // Amsterdam area
            (5.5, 51.44), // Eindhoven area
            (6.9, 53.2),
        ];
        assert_roundtrip(&proj, cases, 1e-10);
    }

    #[test]
    fn test_gauss_sphere_roundtrip() {
        let proj = bind("+proj=gauss +lat_0=46 +lon_0=25 +ellps=krass");
        assert_roundtrip(&proj, &[(26.1, 44.4), (21.2, 45.7)], 1e-10);
        // The origin lands on the sphere's origin latitude.
        let gauss = Gauss::new(&Ellipsoid::wgs84(), 0.0, 0.8);
        let (x, y) = gauss.forward(0.0, 0.8).unwrap();
        assert_relative_eq!(x, 0.0);
        assert_relative_eq!(y, gauss.phic0, epsilon = 1e-12);
    }
}
