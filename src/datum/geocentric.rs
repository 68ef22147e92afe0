//! Geodetic ↔ geocentric conversion.

use tracing::warn;

use crate::error::ProjError;
use crate::point::Point;
use crate::proj::common::{adjust_lon, HALF_PI};
use crate::proj::ellipsoid::Ellipsoid;

/// Tolerance on successive sin(lat) estimates (about 0.006 mm).
const GENAU: f64 = 1e-12;
const GENAU2: f64 = GENAU * GENAU;
/// Converges in 2-3 rounds for terrestrial heights; the cap only matters
/// for points far outside the Earth.
pub const GEOCENTRIC_MAX_ITER: usize = 30;

/// (lon, lat, h) in radians and metres to geocentric (X, Y, Z).
///
/// Latitudes that overshoot ±π/2 by at most 0.1% are taken as rounding
/// noise and clamped to the pole; larger ones are out of range.
pub fn geodetic_to_geocentric(p: Point, ellipsoid: &Ellipsoid) -> Result<Point, ProjError> {
    let lon = adjust_lon(p.x);
    let mut lat = p.y;
    if lat < -HALF_PI && lat > -1.001 * HALF_PI {
        lat = -HALF_PI;
    } else if lat > HALF_PI && lat < 1.001 * HALF_PI {
        lat = HALF_PI;
    } else if !(-HALF_PI..=HALF_PI).contains(&lat) {
        return Err(ProjError::OutOfRange(format!(
            "latitude {} outside ±90°",
            lat.to_degrees()
        )));
    }

    let (sin_lat, cos_lat) = lat.sin_cos();
    let rn = ellipsoid.a / (1.0 - ellipsoid.es * sin_lat * sin_lat).sqrt();
    Ok(Point::new_3d(
        (rn + p.z) * cos_lat * lon.cos(),
        (rn + p.z) * cos_lat * lon.sin(),
        (rn * (1.0 - ellipsoid.es) + p.z) * sin_lat,
    ))
}

/// Geocentric (X, Y, Z) to (lon, lat, h).
///
/// Iterates on sin/cos of the latitude from a Bowring-style first guess.
/// Hitting the iteration cap is not an error; the last estimate is used.
pub fn geocentric_to_geodetic(p: Point, ellipsoid: &Ellipsoid) -> Point {
    let Ellipsoid { a, b, es, .. } = *ellipsoid;
    let (x, y, z) = (p.x, p.y, p.z);

    let dist = x.hypot(y);
    let radius = (x * x + y * y + z * z).sqrt();

    let lon = if dist / a < GENAU {
        if radius / a < GENAU {
            // Centre of the earth.
            return Point::new_3d(0.0, HALF_PI, -b);
        }
        0.0
    } else {
        y.atan2(x)
    };

    let ct = z / radius;
    let st = dist / radius;
    let mut rx = 1.0 / (1.0 - es * (2.0 - es) * st * st).sqrt();
    let mut cphi0 = st * (1.0 - es) * rx;
    let mut sphi0 = ct * rx;
    let mut height = 0.0;
    let mut converged = false;

    for _ in 0..GEOCENTRIC_MAX_ITER {
        let rn = a / (1.0 - es * sphi0 * sphi0).sqrt();
        height = dist * cphi0 + z * sphi0 - rn * (1.0 - es * sphi0 * sphi0);
        let rk = es * rn / (rn + height);
        rx = 1.0 / (1.0 - rk * (2.0 - rk) * st * st).sqrt();
        let cphi = st * (1.0 - rk) * rx;
        let sphi = ct * rx;
        let sdphi = sphi * cphi0 - cphi * sphi0;
        cphi0 = cphi;
        sphi0 = sphi;
        if sdphi * sdphi <= GENAU2 {
            converged = true;
            break;
        }
    }
    if !converged {
        warn!(x, y, z, "geocentric to geodetic did not converge, using last estimate");
    }

    let lat = (sphi0 / cphi0.abs()).atan();
    Point::new_3d(lon, lat, height)
}
