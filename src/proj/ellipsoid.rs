use crate::proj::common::EPSLN;

const SIXTH: f64 = 1.0 / 6.0;
const RA4: f64 = 17.0 / 360.0;
const RA6: f64 = 67.0 / 3024.0;

/// Reference ellipsoid parameters.
///
/// Immutable once derived: `es = (a² - b²) / a²` always holds, and `b == a`
/// whenever the ellipsoid is treated as a sphere.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ellipsoid {
    /// Semi-major axis (metres)
    pub a: f64,
    /// Semi-minor axis (metres)
    pub b: f64,
    /// a²
    pub a2: f64,
    /// b²
    pub b2: f64,
    /// First eccentricity squared
    pub es: f64,
    /// First eccentricity
    pub e: f64,
    /// Second eccentricity squared: (a² - b²) / b²
    pub ep2: f64,
    /// Third flattening: (a - b) / (a + b)
    pub n: f64,
    /// True when |a - b| is below the sphere threshold.
    pub sphere: bool,
}

impl Ellipsoid {
    /// Build from both semi-axes, snapping to a sphere when they agree
    /// within `EPSLN`.
    pub fn from_axes(a: f64, b: f64) -> Self {
        let sphere = (a - b).abs() < EPSLN;
        let b = if sphere { a } else { b };
        let a2 = a * a;
        let b2 = b * b;
        let es = (a2 - b2) / a2;
        Self {
            a,
            b,
            a2,
            b2,
            es,
            e: es.sqrt(),
            ep2: (a2 - b2) / b2,
            n: (a - b) / (a + b),
            sphere,
        }
    }

    /// Build from the semi-major axis and inverse flattening. `rf == 0`
    /// denotes a sphere.
    pub fn from_inverse_flattening(a: f64, rf: f64) -> Self {
        if rf == 0.0 {
            return Self::sphere(a);
        }
        Self::from_axes(a, (1.0 - 1.0 / rf) * a)
    }

    pub fn sphere(radius: f64) -> Self {
        Self::from_axes(radius, radius)
    }

    pub fn wgs84() -> Self {
        Self::from_inverse_flattening(6_378_137.0, 298.257_223_563)
    }

    pub fn grs80() -> Self {
        Self::from_inverse_flattening(6_378_137.0, 298.257_222_101)
    }

    /// Sphere of equal surface area (`+R_A`).
    pub fn authalic_sphere(&self) -> Self {
        let es = self.es;
        Self::sphere(self.a * (1.0 - es * (SIXTH + es * (RA4 + es * RA6))))
    }

    pub fn flattening(&self) -> f64 {
        (self.a - self.b) / self.a
    }
}
