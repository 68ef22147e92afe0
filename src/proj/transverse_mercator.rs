//! Transverse Mercator (`tmerc`, `utm`), Krüger series to 6th order in n.
//!
//! Follows Karney (2011): geodetic latitude goes to conformal latitude, the
//! spherical TM is applied on the conformal sphere, and the α/β series map
//! to and from the rectifying plane. Accurate to a few nanometres within
//! 3900 km of the central meridian.

use std::f64::consts::PI;

use crate::defs::ProjDef;
use crate::error::ProjError;
use crate::proj::common::adjust_lon;
use crate::proj::ellipsoid::Ellipsoid;
use crate::proj::Projection;

/// Newton cap for recovering tan(φ) from the conformal tangent. Convergence
/// is quadratic: two or three rounds reach 1e-12 anywhere short of the pole.
const TAU_MAX_ITER: usize = 15;

const UTM_K0: f64 = 0.9996;
const UTM_FALSE_EASTING: f64 = 500_000.0;
const UTM_SOUTH_FALSE_NORTHING: f64 = 10_000_000.0;

/// Six coefficients of one Krüger trigonometric series.
#[derive(Clone, Copy, Debug)]
struct KruegerSeries([f64; 6]);

impl KruegerSeries {
    fn alpha(n: f64) -> Self {
        let [n2, n3, n4, n5, n6] = powers(n);
        Self([
            n / 2.0 - 2.0 / 3.0 * n2 + 5.0 / 16.0 * n3 + 41.0 / 180.0 * n4 - 127.0 / 288.0 * n5
                + 7891.0 / 37800.0 * n6,
            13.0 / 48.0 * n2 - 3.0 / 5.0 * n3 + 557.0 / 1440.0 * n4 + 281.0 / 630.0 * n5
                - 1983433.0 / 1935360.0 * n6,
            61.0 / 240.0 * n3 - 103.0 / 140.0 * n4 + 15061.0 / 26880.0 * n5
                + 167603.0 / 181440.0 * n6,
            49561.0 / 161280.0 * n4 - 179.0 / 168.0 * n5 + 6601661.0 / 7257600.0 * n6,
            34729.0 / 80640.0 * n5 - 3418889.0 / 1995840.0 * n6,
            212378941.0 / 319334400.0 * n6,
        ])
    }

    fn beta(n: f64) -> Self {
        let [n2, n3, n4, n5, n6] = powers(n);
        Self([
            n / 2.0 - 2.0 / 3.0 * n2 + 37.0 / 96.0 * n3 - 1.0 / 360.0 * n4 - 81.0 / 512.0 * n5
                + 96199.0 / 604800.0 * n6,
            1.0 / 48.0 * n2 + 1.0 / 15.0 * n3 - 437.0 / 1440.0 * n4 + 46.0 / 105.0 * n5
                - 1118711.0 / 3870720.0 * n6,
            17.0 / 480.0 * n3 - 37.0 / 840.0 * n4 - 209.0 / 4480.0 * n5 + 5569.0 / 90720.0 * n6,
            4397.0 / 161280.0 * n4 - 11.0 / 504.0 * n5 - 830251.0 / 7257600.0 * n6,
            4583.0 / 161280.0 * n5 - 108847.0 / 3991680.0 * n6,
            20648693.0 / 638668800.0 * n6,
        ])
    }

    /// (ξ, η) shifted by `sign` × Σ c_j (sin 2jξ cosh 2jη, cos 2jξ sinh 2jη).
    fn apply(&self, xi: f64, eta: f64, sign: f64) -> (f64, f64) {
        self.0
            .iter()
            .enumerate()
            .fold((xi, eta), |(x, y), (j, &c)| {
                let k = 2.0 * (j + 1) as f64;
                (
                    x + sign * c * (k * xi).sin() * (k * eta).cosh(),
                    y + sign * c * (k * xi).cos() * (k * eta).sinh(),
                )
            })
    }
}

fn powers(n: f64) -> [f64; 5] {
    let n2 = n * n;
    [n2, n2 * n, n2 * n2, n2 * n2 * n, n2 * n2 * n2]
}

/// Rectifying latitude in units of the rectifying radius, used for the
/// latitude of origin.
fn rectifying_latitude(phi: f64, n: f64) -> f64 {
    let [n2, n3, n4, ..] = powers(n);
    phi + (-1.5 * n + 9.0 / 16.0 * n3) * (2.0 * phi).sin()
        + (15.0 / 16.0 * n2 - 15.0 / 32.0 * n4) * (4.0 * phi).sin()
        - 35.0 / 48.0 * n3 * (6.0 * phi).sin()
        + 315.0 / 512.0 * n4 * (8.0 * phi).sin()
}

/// tan(χ) of the conformal latitude from τ = tan(φ).
fn conformal_tan(tau: f64, e: f64) -> f64 {
    let sec = tau.hypot(1.0);
    let sigma = (e * (e * tau / sec).atanh()).sinh();
    tau * sigma.hypot(1.0) - sigma * sec
}

/// Newton inversion of [`conformal_tan`].
fn geodetic_tan(tau_prime: f64, e: f64, es: f64) -> f64 {
    let mut tau = tau_prime;
    for _ in 0..TAU_MAX_ITER {
        let sec = tau.hypot(1.0);
        let estimate = conformal_tan(tau, e);
        let step = (tau_prime - estimate) * (1.0 + (1.0 - es) * tau * tau)
            / ((1.0 - es) * sec * estimate.hypot(1.0));
        tau += step;
        if step.abs() < 1e-12 * (1.0 + tau.abs()) {
            break;
        }
    }
    tau
}

#[derive(Clone, Debug)]
pub struct TransverseMercator {
    e: f64,
    es: f64,
    lon0: f64,
    k0: f64,
    x0: f64,
    y0: f64,
    /// -1 for the south-orientated variant (x west, y south).
    orientation: f64,
    /// Rectifying radius A = a / (1 + n) · (1 + n²/4 + n⁴/64).
    rectifying_radius: f64,
    alpha: KruegerSeries,
    beta: KruegerSeries,
    xi0: f64,
}

impl TransverseMercator {
    pub fn new(ellipsoid: Ellipsoid, lon0: f64, lat0: f64, k0: f64, x0: f64, y0: f64) -> Self {
        let n = ellipsoid.n;
        let [n2, _, n4, ..] = powers(n);
        Self {
            e: ellipsoid.e,
            es: ellipsoid.es,
            lon0,
            k0,
            x0,
            y0,
            orientation: 1.0,
            rectifying_radius: ellipsoid.a / (1.0 + n) * (1.0 + n2 / 4.0 + n4 / 64.0),
            alpha: KruegerSeries::alpha(n),
            beta: KruegerSeries::beta(n),
            xi0: rectifying_latitude(lat0, n),
        }
    }

    pub fn from_def(def: &ProjDef, ellipsoid: &Ellipsoid) -> Result<Self, ProjError> {
        let mut tm = Self::new(*ellipsoid, def.long0(), def.lat0(), def.k0(), def.x0(), def.y0());
        let south_orientated = def
            .proj_name
            .as_deref()
            .is_some_and(|name| name.to_ascii_lowercase().contains("south_orientated"));
        if south_orientated {
            tm.orientation = -1.0;
        }
        Ok(tm)
    }

    /// `+proj=utm`: the zone comes from `+zone`, or from `+lon_0` when absent.
    pub fn utm_from_def(def: &ProjDef, ellipsoid: &Ellipsoid) -> Result<Self, ProjError> {
        let zone = match def.zone {
            Some(zone) => u8::try_from(zone.unsigned_abs())
                .ok()
                .filter(|z| (1..=60).contains(z))
                .ok_or_else(|| ProjError::InvalidParameter(format!("unknown utm zone {zone}")))?,
            None => utm_zone_for_lon(def.long0()),
        };
        Ok(Self::utm_zone(*ellipsoid, zone, !def.utm_south))
    }

    pub fn utm_zone(ellipsoid: Ellipsoid, zone: u8, north: bool) -> Self {
        let lon0 = (zone as f64 * 6.0 - 183.0).to_radians();
        let y0 = if north { 0.0 } else { UTM_SOUTH_FALSE_NORTHING };
        Self::new(ellipsoid, lon0, 0.0, UTM_K0, UTM_FALSE_EASTING, y0)
    }

    fn scale(&self) -> f64 {
        self.orientation * self.k0 * self.rectifying_radius
    }
}

impl Projection for TransverseMercator {
    fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64), ProjError> {
        let dlam = adjust_lon(lon - self.lon0);
        let (sin_dlam, cos_dlam) = dlam.sin_cos();
        let tau_prime = conformal_tan(lat.tan(), self.e);

        let xi_prime = tau_prime.atan2(cos_dlam);
        let eta_prime = (sin_dlam / tau_prime.hypot(cos_dlam)).asinh();
        let (xi, eta) = self.alpha.apply(xi_prime, eta_prime, 1.0);

        Ok((
            self.x0 + self.scale() * eta,
            self.y0 + self.scale() * (xi - self.xi0),
        ))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjError> {
        let eta = (x - self.x0) / self.scale();
        let xi = (y - self.y0) / self.scale() + self.xi0;
        let (xi_prime, eta_prime) = self.beta.apply(xi, eta, -1.0);

        let sinh_eta = eta_prime.sinh();
        let (sin_xi, cos_xi) = xi_prime.sin_cos();
        let tau_prime = sin_xi / sinh_eta.hypot(cos_xi);
        let lat = geodetic_tan(tau_prime, self.e, self.es).atan();
        let lon = adjust_lon(self.lon0 + sinh_eta.atan2(cos_xi));
        Ok((lon, lat))
    }
}

/// Zone whose central meridian is nearest to `lon` (radians).
fn utm_zone_for_lon(lon: f64) -> u8 {
    let zone = ((adjust_lon(lon) + PI) * 30.0 / PI).floor() as i32 + 1;
    zone.clamp(1, 60) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proj::test_support::{assert_roundtrip, bind};
    use approx::assert_relative_eq;

    #[test]
    fn test_utm_central_meridians() {
        for (zone, cm) in [(1u8, -177.0), (31, 3.0), (33, 15.0), (60, 177.0)] {
            let tm = TransverseMercator::utm_zone(Ellipsoid::wgs84(), zone, true);
            assert_relative_eq!(tm.lon0, f64::to_radians(cm), epsilon = 1e-12);
            let (x, _) = tm.forward(tm.lon0, 0.7).unwrap();
            assert_relative_eq!(x, 500_000.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_utm_roundtrips_across_zone() {
        let proj = bind("+proj=utm +zone=33 +datum=WGS84");
        assert_roundtrip(
            &proj,
            &[(15.0, 52.0), (12.0, 50.0), (18.0, 50.0), (15.0, 0.0), (15.0, 80.0), (13.5, -33.0)],
            1e-9,
        );
    }

    #[test]
    fn test_south_zone_false_northing() {
        let proj = bind("+proj=utm +zone=56 +south +ellps=GRS80");
        let (_, y) = proj.forward(151.2f64.to_radians(), -33.87f64.to_radians()).unwrap();
        assert!(y > 6_200_000.0 && y < 6_300_000.0, "northing {y}");
    }

    #[test]
    fn test_utm_50n_northing() {
        // PROJ: 15E 50N in zone 33N is 5538630.70 m north.
        let proj = bind("+proj=utm +zone=33 +datum=WGS84");
        let (_, y) = proj.forward(15f64.to_radians(), 50f64.to_radians()).unwrap();
        assert_relative_eq!(y, 5_538_630.70, epsilon = 0.01);
    }

    #[test]
    fn test_ordnance_survey_worked_example() {
        // OSGB "A guide to coordinate systems in Great Britain", Annex C.
        let proj = bind(
            "+proj=tmerc +lat_0=49 +lon_0=-2 +k=0.9996012717 +x_0=400000 +y_0=-100000 +ellps=airy",
        );
        let lon = (1.0 + 43.0 / 60.0 + 4.5177 / 3600.0_f64).to_radians();
        let lat = (52.0 + 39.0 / 60.0 + 27.2531 / 3600.0_f64).to_radians();
        let (e, n) = proj.forward(lon, lat).unwrap();
        assert_relative_eq!(e, 651_409.903, epsilon = 0.01);
        assert_relative_eq!(n, 313_177.270, epsilon = 0.01);
    }

    #[test]
    fn test_south_orientated_mirrors_about_false_origin() {
        let north = bind("+proj=tmerc +lon_0=29 +ellps=WGS84 +x_0=100 +y_0=200");
        let south = bind("+proj=Transverse_Mercator_South_Orientated +lon_0=29 +ellps=WGS84 +x_0=100 +y_0=200");
        let (lon, lat) = (30.5f64.to_radians(), -26.2f64.to_radians());
        let (xn, yn) = north.forward(lon, lat).unwrap();
        let (xs, ys) = south.forward(lon, lat).unwrap();
        assert_relative_eq!(xs - 100.0, -(xn - 100.0), epsilon = 1e-6);
        assert_relative_eq!(ys - 200.0, -(yn - 200.0), epsilon = 1e-6);
        assert_roundtrip(&south, &[(30.5, -26.2), (27.0, -33.9)], 1e-9);
    }

    #[test]
    fn test_zone_from_central_meridian() {
        let def = ProjDef {
            long0: Some(14.0_f64.to_radians()),
            utm_south: true,
            ..Default::default()
        };
        let tm = TransverseMercator::utm_from_def(&def, &Ellipsoid::wgs84()).unwrap();
        assert_relative_eq!(tm.lon0, 15.0_f64.to_radians(), epsilon = 1e-12);
        assert_relative_eq!(tm.y0, UTM_SOUTH_FALSE_NORTHING);
    }

    #[test]
    fn test_invalid_zone_rejected() {
        for zone in [0, 61, -61, i32::MIN, i32::MAX] {
            let def = ProjDef {
                zone: Some(zone),
                ..Default::default()
            };
            assert!(
                matches!(
                    TransverseMercator::utm_from_def(&def, &Ellipsoid::wgs84()),
                    Err(ProjError::InvalidParameter(_))
                ),
                "zone {zone}"
            );
        }
        assert!(crate::Context::new().parse("+proj=utm +zone=-2147483648").is_err());
    }

    #[test]
    fn test_negative_zone_uses_magnitude() {
        let def = ProjDef {
            zone: Some(-33),
            ..Default::default()
        };
        let tm = TransverseMercator::utm_from_def(&def, &Ellipsoid::wgs84()).unwrap();
        assert_relative_eq!(tm.lon0, 15.0_f64.to_radians(), epsilon = 1e-12);
    }

    #[test]
    fn test_conformal_tangent_inverts() {
        let e = Ellipsoid::wgs84().e;
        for tau in [-3.0, -0.2, 0.0, 0.8, 12.0] {
            let back = geodetic_tan(conformal_tan(tau, e), e, e * e);
            assert_relative_eq!(back, tau, epsilon = 1e-12, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_spherical_roundtrip() {
        let tm = TransverseMercator::new(Ellipsoid::sphere(6_371_000.0), 0.0, 0.0, 1.0, 0.0, 0.0);
        assert_roundtrip(&tm, &[(5.7, 40.1), (-20.0, -60.0)], 1e-12);
    }
}
