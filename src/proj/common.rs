//! Common helpers for projection math (meridional arc, latitude conversions, etc.).
//!
//! Function names follow the conventional Snyder/PROJ names so the formulas
//! can be checked against the literature.

use std::f64::consts::{FRAC_PI_2, PI};

use tracing::warn;

/// Threshold for the special-case branches (poles, origin, zero denominators).
pub const EPSLN: f64 = 1.0e-10;
pub const HALF_PI: f64 = FRAC_PI_2;
pub const FORTPI: f64 = std::f64::consts::FRAC_PI_4;
pub const TWO_PI: f64 = 2.0 * PI;
/// Slightly above π so that ±180° survives `adjust_lon` unchanged.
pub const SPI: f64 = 3.141_592_653_59;
pub const D2R: f64 = PI / 180.0;
pub const R2D: f64 = 180.0 / PI;
pub const SEC_TO_RAD: f64 = 4.848_136_811_095_36e-6;

/// Iteration cap for the conformal-latitude inversion `phi2z`. The series
/// converges quadratically, so 15 rounds reach 1e-10 from any start.
pub const PHI2Z_MAX_ITER: usize = 15;
/// Iteration cap for the rectifying-latitude inversions (`imlfn`, `pj_inv_mlfn`).
pub const MLFN_MAX_ITER: usize = 20;
/// Iteration cap for the authalic-latitude inversion used by `cea`.
pub const IQSFN_MAX_ITER: usize = 30;

/// Sign with zero counted as positive.
pub fn sign(x: f64) -> f64 {
    if x < 0.0 {
        -1.0
    } else {
        1.0
    }
}

/// Wrap a longitude into [-π, π], however many turns it is away.
pub fn adjust_lon(x: f64) -> f64 {
    if x.abs() <= SPI {
        x
    } else {
        x - TWO_PI * (x / TWO_PI).round()
    }
}

/// Fold a latitude that overshot a pole back into [-π/2, π/2].
pub fn adjust_lat(x: f64) -> f64 {
    if x.abs() < HALF_PI {
        x
    } else {
        x - sign(x) * PI
    }
}

/// `asin` with its argument clamped into [-1, 1].
pub fn asinz(x: f64) -> f64 {
    x.clamp(-1.0, 1.0).asin()
}

/// Radius of the parallel divided by `a`.
pub fn msfn(e: f64, sinphi: f64, cosphi: f64) -> f64 {
    let con = e * sinphi;
    cosphi / (1.0 - con * con).sqrt()
}

/// Isometric-latitude helper t(φ) of Snyder (15-9).
pub fn tsfn(e: f64, phi: f64, sinphi: f64) -> f64 {
    let con = e * sinphi;
    let com = 0.5 * e;
    (0.5 * (HALF_PI - phi)).tan() / ((1.0 - con) / (1.0 + con)).powf(com)
}

/// Inverse of `tsfn`. Returns `None` when the iteration does not settle.
pub fn phi2z(e: f64, ts: f64) -> Option<f64> {
    let eccnth = 0.5 * e;
    let mut phi = HALF_PI - 2.0 * ts.atan();
    for _ in 0..=PHI2Z_MAX_ITER {
        let con = e * phi.sin();
        let dphi = HALF_PI - 2.0 * (ts * ((1.0 - con) / (1.0 + con)).powf(eccnth)).atan() - phi;
        phi += dphi;
        if dphi.abs() <= EPSLN {
            return Some(phi);
        }
    }
    None
}

/// Authalic q(φ) of Snyder (3-12).
pub fn qsfn(e: f64, sinphi: f64) -> f64 {
    if e > 1.0e-7 {
        let con = e * sinphi;
        (1.0 - e * e) * (sinphi / (1.0 - con * con) - (0.5 / e) * ((1.0 - con) / (1.0 + con)).ln())
    } else {
        2.0 * sinphi
    }
}

/// Inverse of `qsfn`, used by the cylindrical equal-area inverse.
pub fn iqsfn(e: f64, q: f64) -> f64 {
    let temp = 1.0 - (1.0 - e * e) / (2.0 * e) * ((1.0 - e) / (1.0 + e)).ln();
    if (q.abs() - temp).abs() < 1.0e-6 {
        return if q < 0.0 { -HALF_PI } else { HALF_PI };
    }
    let mut phi = (0.5 * q).asin();
    for _ in 0..IQSFN_MAX_ITER {
        let sinphi = phi.sin();
        let cosphi = phi.cos();
        let con = e * sinphi;
        let dphi = (1.0 - con * con).powi(2) / (2.0 * cosphi)
            * (q / (1.0 - e * e) - sinphi / (1.0 - con * con)
                + 0.5 / e * ((1.0 - con) / (1.0 + con)).ln());
        phi += dphi;
        if dphi.abs() <= EPSLN {
            return phi;
        }
    }
    warn!(q, "iqsfn did not converge, using last estimate");
    phi
}

pub fn e0fn(x: f64) -> f64 {
    1.0 - 0.25 * x * (1.0 + x / 16.0 * (3.0 + 1.25 * x))
}

pub fn e1fn(x: f64) -> f64 {
    0.375 * x * (1.0 + 0.25 * x * (1.0 + 0.468_75 * x))
}

pub fn e2fn(x: f64) -> f64 {
    0.058_593_75 * x * x * (1.0 + 0.75 * x)
}

pub fn e3fn(x: f64) -> f64 {
    x * x * x * (35.0 / 3072.0)
}

/// Coefficients of the meridional-distance series in `es`.
#[derive(Clone, Copy, Debug)]
pub struct MeridianSeries {
    pub e0: f64,
    pub e1: f64,
    pub e2: f64,
    pub e3: f64,
}

impl MeridianSeries {
    pub fn new(es: f64) -> Self {
        Self {
            e0: e0fn(es),
            e1: e1fn(es),
            e2: e2fn(es),
            e3: e3fn(es),
        }
    }

    /// Meridional distance divided by `a` (Snyder 3-21).
    pub fn mlfn(&self, phi: f64) -> f64 {
        self.e0 * phi - self.e1 * (2.0 * phi).sin() + self.e2 * (4.0 * phi).sin()
            - self.e3 * (6.0 * phi).sin()
    }

    /// d(mlfn)/dφ.
    pub fn mlfn_prime(&self, phi: f64) -> f64 {
        self.e0 - 2.0 * self.e1 * (2.0 * phi).cos() + 4.0 * self.e2 * (4.0 * phi).cos()
            - 6.0 * self.e3 * (6.0 * phi).cos()
    }

    /// Inverse of `mlfn` by Newton iteration.
    pub fn imlfn(&self, ml: f64) -> f64 {
        let mut phi = ml / self.e0;
        for _ in 0..MLFN_MAX_ITER {
            let dphi = (ml - self.mlfn(phi)) / self.mlfn_prime(phi);
            phi += dphi;
            if dphi.abs() <= EPSLN {
                return phi;
            }
        }
        warn!(ml, "imlfn did not converge, using last estimate");
        phi
    }
}

/// Higher-order meridional distance coefficients (PROJ's `pj_enfn`).
pub fn pj_enfn(es: f64) -> [f64; 5] {
    const C00: f64 = 1.0;
    const C02: f64 = 0.25;
    const C04: f64 = 0.046_875;
    const C06: f64 = 0.019_531_25;
    const C08: f64 = 0.010_681_152_343_75;
    const C22: f64 = 0.75;
    const C44: f64 = 0.468_75;
    const C46: f64 = 0.013_020_833_333_333_333;
    const C48: f64 = 0.007_120_768_229_166_667;
    const C66: f64 = 0.364_583_333_333_333_33;
    const C68: f64 = 0.005_696_614_583_333_333;
    const C88: f64 = 0.307_617_187_5;

    let mut t = es * es;
    let mut en = [0.0; 5];
    en[0] = C00 - es * (C02 + es * (C04 + es * (C06 + es * C08)));
    en[1] = es * (C22 - es * (C04 + es * (C06 + es * C08)));
    en[2] = t * (C44 - es * (C46 + es * C48));
    t *= es;
    en[3] = t * (C66 - es * C68);
    en[4] = t * es * C88;
    en
}

pub fn pj_mlfn(phi: f64, sphi: f64, cphi: f64, en: &[f64; 5]) -> f64 {
    let cphi = cphi * sphi;
    let sphi = sphi * sphi;
    en[0] * phi - cphi * (en[1] + sphi * (en[2] + sphi * (en[3] + sphi * en[4])))
}

pub fn pj_inv_mlfn(arg: f64, es: f64, en: &[f64; 5]) -> f64 {
    let k = 1.0 / (1.0 - es);
    let mut phi = arg;
    for _ in 0..MLFN_MAX_ITER {
        let s = phi.sin();
        let t = 1.0 - es * s * s;
        let t = (pj_mlfn(phi, s, phi.cos(), en) - arg) * (t * t.sqrt()) * k;
        phi -= t;
        if t.abs() < EPSLN {
            return phi;
        }
    }
    phi
}

/// Radius of curvature in the prime vertical.
pub fn g_n(a: f64, e: f64, sinphi: f64) -> f64 {
    let temp = e * sinphi;
    a / (1.0 - temp * temp).sqrt()
}

pub fn srat(esinp: f64, exp: f64) -> f64 {
    ((1.0 - esinp) / (1.0 + esinp)).powf(exp)
}

/// Coefficients for the authalic-to-geodetic latitude series.
pub fn authset(es: f64) -> [f64; 3] {
    const P00: f64 = 0.333_333_333_333_333_33;
    const P01: f64 = 0.172_222_222_222_222_22;
    const P02: f64 = 0.102_579_365_079_365_08;
    const P10: f64 = 0.063_888_888_888_888_89;
    const P11: f64 = 0.066_402_116_402_116_4;
    const P20: f64 = 0.016_415_012_942_191_544;

    let mut apa = [0.0; 3];
    let mut t = es * es;
    apa[0] = es * P00 + t * P01;
    apa[1] = t * P10;
    t *= es;
    apa[0] += t * P02;
    apa[1] += t * P11;
    apa[2] = t * P20;
    apa
}

pub fn authlat(beta: f64, apa: &[f64; 3]) -> f64 {
    let t = beta + beta;
    beta + apa[0] * t.sin() + apa[1] * (t + t).sin() + apa[2] * (t + t + t).sin()
}

/// Isometric latitude.
pub fn latiso(e: f64, phi: f64, sinphi: f64) -> f64 {
    if phi.abs() > HALF_PI {
        return f64::NAN;
    }
    if phi == HALF_PI {
        return f64::INFINITY;
    }
    if phi == -HALF_PI {
        return f64::NEG_INFINITY;
    }
    let con = e * sinphi;
    ((HALF_PI + phi) / 2.0).tan().ln() + e * ((1.0 - con) / (1.0 + con)).ln() / 2.0
}

fn f_l(x: f64, l: f64) -> f64 {
    2.0 * (x * l.exp()).atan() - HALF_PI
}

/// Iteration cap for `invlatiso`; the fixed point gains about three digits
/// per round for terrestrial eccentricities.
pub const INVLATISO_MAX_ITER: usize = 30;

/// Inverse of `latiso`.
pub fn invlatiso(e: f64, ts: f64) -> f64 {
    let mut phi = f_l(1.0, ts);
    for _ in 0..INVLATISO_MAX_ITER {
        let iphi = phi;
        let con = e * iphi.sin();
        phi = f_l((e * ((1.0 + con) / (1.0 - con)).ln() / 2.0).exp(), ts);
        if (phi - iphi).abs() <= 1.0e-12 {
            break;
        }
    }
    phi
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proj::ellipsoid::Ellipsoid;
    use approx::assert_relative_eq;

    #[test]
    fn test_adjust_lon_wraps() {
        assert_relative_eq!(adjust_lon(3.0 * PI / 2.0), -PI / 2.0, epsilon = 1e-15);
        assert_relative_eq!(adjust_lon(-3.0 * PI / 2.0), PI / 2.0, epsilon = 1e-15);
        assert_eq!(adjust_lon(PI), PI);
        assert_eq!(adjust_lon(-PI), -PI);
        assert_relative_eq!(adjust_lon(3.5 * PI), -PI / 2.0, epsilon = 1e-14);
        assert_relative_eq!(adjust_lon(-7.25 * PI), 0.75 * PI, epsilon = 1e-14);
        assert_relative_eq!(adjust_lon(20.0 * TWO_PI + 0.1), 0.1, epsilon = 1e-12);
    }

    #[test]
    fn test_tsfn_phi2z_inverse() {
        let e = Ellipsoid::wgs84().e;
        for deg in [-80.0_f64, -45.0, 0.0, 10.0, 60.0, 89.0] {
            let phi = deg.to_radians();
            let ts = tsfn(e, phi, phi.sin());
            assert_relative_eq!(phi2z(e, ts).unwrap(), phi, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_meridional_arc_positive() {
        let wgs84 = Ellipsoid::wgs84();
        let series = MeridianSeries::new(wgs84.es);
        let m = wgs84.a * series.mlfn(std::f64::consts::FRAC_PI_4);
        // Arc to 45 degrees is ~4984944 m
        assert_relative_eq!(m, 4_984_944.4, epsilon = 1.0);
        assert_relative_eq!(series.imlfn(series.mlfn(0.7)), 0.7, epsilon = 1e-10);
    }

    #[test]
    fn test_pj_inv_mlfn_inverts_pj_mlfn() {
        let es = Ellipsoid::wgs84().es;
        let en = pj_enfn(es);
        let phi = 0.9_f64;
        let m = pj_mlfn(phi, phi.sin(), phi.cos(), &en);
        assert_relative_eq!(pj_inv_mlfn(m, es, &en), phi, epsilon = 1e-10);
    }

    #[test]
    fn test_qsfn_iqsfn_inverse() {
        let e = Ellipsoid::wgs84().e;
        let phi = 0.6_f64;
        assert_relative_eq!(iqsfn(e, qsfn(e, phi.sin())), phi, epsilon = 1e-10);
    }

    #[test]
    fn test_latiso_invlatiso_inverse() {
        let e = Ellipsoid::wgs84().e;
        let phi = 0.8_f64;
        assert_relative_eq!(invlatiso(e, latiso(e, phi, phi.sin())), phi, epsilon = 1e-11);
    }

    #[test]
    fn test_sphere_qsfn() {
        assert_relative_eq!(qsfn(0.0, 0.5), 1.0);
    }
}
