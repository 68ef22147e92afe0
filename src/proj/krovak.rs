//! Krovak oblique conformal conic (`+proj=krovak`), as used by S-JTSK.
//!
//! The projection is tied to the Bessel 1841 ellipsoid regardless of the
//! definition's ellipsoid. Without `+czech` the output axes point east and
//! north (negative values over the Czech Republic, EPSG:5514); with it they
//! are the traditional westing/southing.

use crate::defs::ProjDef;
use crate::error::ProjError;
use crate::proj::common::{adjust_lon, FORTPI, HALF_PI};
use crate::proj::Projection;

const BESSEL_A: f64 = 6_377_397.155;
const BESSEL_ES: f64 = 0.006_674_372_230_614;
/// 49°30' N
const DEFAULT_LAT0: f64 = 0.863_937_979_737_193;
/// 42°30' E of Ferro, i.e. 24°50' E of Greenwich.
const DEFAULT_LON0: f64 = 0.741_764_932_097_590_1 - 0.308_341_501_185_665;
/// Azimuth of the cone axis through the origin, 30°17'17.3031".
const DEFAULT_ALPHA: f64 = 0.528_627_762_990_156_9;
/// Pseudo standard parallel, 78°30'.
const S0: f64 = 1.370_083_462_815_55;
const KROVAK_MAX_ITER: usize = 15;

#[derive(Clone, Debug)]
pub struct Krovak {
    e: f64,
    lon0: f64,
    false_easting: f64,
    false_northing: f64,
    czech: bool,
    alfa: f64,
    k: f64,
    n: f64,
    ro0: f64,
    ad: f64,
}

impl Krovak {
    pub fn from_def(def: &ProjDef) -> Result<Self, ProjError> {
        let es = BESSEL_ES;
        let e = es.sqrt();
        let fi0 = def.lat0.unwrap_or(DEFAULT_LAT0);
        let k0 = def.k0.unwrap_or(0.9999);

        let alfa = (1.0 + es * fi0.cos().powi(4) / (1.0 - es)).sqrt();
        let u0 = (fi0.sin() / alfa).asin();
        let g = ((1.0 + e * fi0.sin()) / (1.0 - e * fi0.sin())).powf(alfa * e / 2.0);
        let k = (u0 / 2.0 + FORTPI).tan() / (fi0 / 2.0 + FORTPI).tan().powf(alfa) * g;
        let n0 = BESSEL_A * (1.0 - es).sqrt() / (1.0 - es * fi0.sin().powi(2));
        let n = S0.sin();
        let ro0 = k0 * n0 / S0.tan();

        Ok(Self {
            e,
            lon0: def.long0.unwrap_or(DEFAULT_LON0),
            false_easting: def.x0(),
            false_northing: def.y0(),
            czech: def.czech,
            alfa,
            k,
            n,
            ro0,
            ad: def.alpha.unwrap_or(DEFAULT_ALPHA),
        })
    }
}

impl Projection for Krovak {
    fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64), ProjError> {
        let delta_lon = adjust_lon(lon - self.lon0);
        let esin = self.e * lat.sin();
        let gfi = ((1.0 + esin) / (1.0 - esin)).powf(self.alfa * self.e / 2.0);
        let u = 2.0 * ((self.k * (lat / 2.0 + FORTPI).tan().powf(self.alfa) / gfi).atan() - FORTPI);
        let deltav = -delta_lon * self.alfa;
        let s = (self.ad.cos() * u.sin() + self.ad.sin() * u.cos() * deltav.cos()).asin();
        let d = (u.cos() * deltav.sin() / s.cos()).asin();
        let eps = self.n * d;
        let ro = self.ro0 * (S0 / 2.0 + FORTPI).tan().powf(self.n)
            / (s / 2.0 + FORTPI).tan().powf(self.n);

        let (mut x, mut y) = (ro * eps.sin(), ro * eps.cos());
        if !self.czech {
            x = -x;
            y = -y;
        }
        Ok((x + self.false_easting, y + self.false_northing))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjError> {
        // Work in the (southing, westing) frame.
        let (mut xs, mut ys) = (y - self.false_northing, x - self.false_easting);
        if !self.czech {
            xs = -xs;
            ys = -ys;
        }
        let ro = xs.hypot(ys);
        let eps = ys.atan2(xs);
        let d = eps / S0.sin();
        let s = 2.0 * (((self.ro0 / ro).powf(1.0 / self.n) * (S0 / 2.0 + FORTPI).tan()).atan() - FORTPI);
        let u = (self.ad.cos() * s.sin() - self.ad.sin() * s.cos() * d.cos()).asin();
        let deltav = (s.cos() * d.sin() / u.cos()).asin();
        let lon = adjust_lon(self.lon0 - deltav / self.alfa);

        let mut fi1 = u;
        for _ in 0..KROVAK_MAX_ITER {
            let esin = self.e * fi1.sin();
            let lat = 2.0
                * ((self.k.powf(-1.0 / self.alfa)
                    * (u / 2.0 + FORTPI).tan().powf(1.0 / self.alfa)
                    * ((1.0 + esin) / (1.0 - esin)).powf(self.e / 2.0))
                    .atan()
                    - FORTPI);
            if (fi1 - lat).abs() < 1e-10 {
                return Ok((lon, lat.clamp(-HALF_PI, HALF_PI)));
            }
            fi1 = lat;
        }
        Err(ProjError::Convergence("krovak inverse latitude".into()))
    }
}
