//! New Zealand Map Grid (`+proj=nzmg`).
//!
//! A complex-polynomial conformal projection on the International 1924
//! ellipsoid. Latitude offsets are handled in units of 10⁵ arc-seconds.

use tracing::warn;

use crate::defs::ProjDef;
use crate::error::ProjError;
use crate::proj::common::SEC_TO_RAD;
use crate::proj::ellipsoid::Ellipsoid;
use crate::proj::Projection;

/// Cap on the Newton refinement of the inverse complex series.
const NZMG_MAX_ITER: usize = 20;
const NZMG_TOL: f64 = 1e-12;

const A: [f64; 10] = [
    0.639_917_507_3,
    -0.135_879_761_3,
    0.063_294_409,
    -0.025_268_53,
    0.011_787_9,
    -0.005_516_1,
    0.002_690_6,
    -0.001_333,
    0.000_67,
    -0.000_34,
];

const B: [Complex; 6] = [
    Complex::new(0.755_785_322_8, 0.0),
    Complex::new(0.249_204_646, 0.003_371_507),
    Complex::new(-0.001_541_739, 0.041_058_560),
    Complex::new(-0.101_629_07, 0.017_276_09),
    Complex::new(-0.266_234_89, -0.362_492_18),
    Complex::new(-0.687_098_3, -1.165_196_7),
];

const C: [Complex; 6] = [
    Complex::new(1.323_127_043_9, 0.0),
    Complex::new(-0.577_245_789, -0.007_809_598),
    Complex::new(0.508_307_513, -0.112_208_952),
    Complex::new(-0.150_947_62, 0.182_006_02),
    Complex::new(1.014_181_79, 1.644_976_96),
    Complex::new(1.966_054_9, 5.332_118_2),
];

const D: [f64; 9] = [
    1.562_701_424_3,
    0.518_540_639_8,
    -0.033_330_98,
    -0.105_290_6,
    -0.036_859_4,
    0.007_317,
    0.012_20,
    0.003_94,
    -0.001_3,
];

#[derive(Clone, Copy, Debug, PartialEq)]
struct Complex {
    re: f64,
    im: f64,
}

impl Complex {
    const ZERO: Complex = Complex::new(0.0, 0.0);
    const ONE: Complex = Complex::new(1.0, 0.0);

    const fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }

    fn add(self, o: Self) -> Self {
        Self::new(self.re + o.re, self.im + o.im)
    }

    fn mul(self, o: Self) -> Self {
        Self::new(
            self.re * o.re - self.im * o.im,
            self.im * o.re + self.re * o.im,
        )
    }

    fn scale(self, k: f64) -> Self {
        Self::new(self.re * k, self.im * k)
    }

    fn div(self, o: Self) -> Self {
        let den = o.re * o.re + o.im * o.im;
        Self::new(
            (self.re * o.re + self.im * o.im) / den,
            (self.im * o.re - self.re * o.im) / den,
        )
    }
}

/// Σ coeffs[n-1]·zⁿ for n = 1..=len.
fn series(coeffs: &[Complex], z: Complex) -> Complex {
    let mut zn = Complex::ONE;
    let mut sum = Complex::ZERO;
    for &c in coeffs {
        zn = zn.mul(z);
        sum = sum.add(c.mul(zn));
    }
    sum
}

fn real_series(coeffs: &[f64], x: f64) -> f64 {
    let mut xn = 1.0;
    let mut sum = 0.0;
    for &c in coeffs {
        xn *= x;
        sum += c * xn;
    }
    sum
}

#[derive(Clone, Debug)]
pub struct NewZealandMapGrid {
    a: f64,
    lon0: f64,
    lat0: f64,
    false_easting: f64,
    false_northing: f64,
}

impl NewZealandMapGrid {
    pub fn from_def(def: &ProjDef, ellipsoid: &Ellipsoid) -> Result<Self, ProjError> {
        Ok(Self {
            a: ellipsoid.a,
            lon0: def.long0(),
            lat0: def.lat0(),
            false_easting: def.x0(),
            false_northing: def.y0(),
        })
    }
}

impl Projection for NewZealandMapGrid {
    fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64), ProjError> {
        let d_phi = (lat - self.lat0) / SEC_TO_RAD * 1e-5;
        let d_psi = real_series(&A, d_phi);
        let theta = Complex::new(d_psi, lon - self.lon0);
        let z = series(&B, theta);
        Ok((
            z.im * self.a + self.false_easting,
            z.re * self.a + self.false_northing,
        ))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjError> {
        let z = Complex::new(
            (y - self.false_northing) / self.a,
            (x - self.false_easting) / self.a,
        );

        let mut theta = series(&C, z);
        let mut converged = false;
        for _ in 0..NZMG_MAX_ITER {
            // Newton step on Σ Bₙθⁿ = z.
            let mut num = z;
            let mut den = B[0];
            let mut thn = theta;
            for (n, &b) in B.iter().enumerate().skip(1) {
                let prev = thn;
                thn = thn.mul(theta);
                num = num.add(b.mul(thn).scale(n as f64));
                den = den.add(b.mul(prev).scale((n + 1) as f64));
            }
            let next = num.div(den);
            let change = (next.re - theta.re).abs().max((next.im - theta.im).abs());
            theta = next;
            if change < NZMG_TOL {
                converged = true;
                break;
            }
        }
        if !converged {
            warn!(x, y, "nzmg inverse did not converge, using last estimate");
        }

        let d_phi = real_series(&D, theta.re);
        let lat = self.lat0 + d_phi * SEC_TO_RAD * 1e5;
        let lon = self.lon0 + theta.im;
        Ok((lon, lat))
    }
}
