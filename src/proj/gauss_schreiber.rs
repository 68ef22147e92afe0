//! Gauss-Schreiber Transverse Mercator (`+proj=gstmerc`).
//!
//! Conformal double projection: the ellipsoid is first mapped to a sphere
//! tangent along `lat_0`, which is then projected with the spherical
//! transverse Mercator.

use crate::defs::ProjDef;
use crate::error::ProjError;
use crate::proj::common::{invlatiso, latiso};
use crate::proj::ellipsoid::Ellipsoid;
use crate::proj::Projection;

#[derive(Clone, Debug)]
pub struct GaussSchreiber {
    e: f64,
    lc: f64,
    rs: f64,
    cp: f64,
    n2: f64,
    xs: f64,
    ys: f64,
}

impl GaussSchreiber {
    pub fn from_def(def: &ProjDef, ellipsoid: &Ellipsoid) -> Result<Self, ProjError> {
        let e = ellipsoid.e;
        let es = e * e;
        let lat0 = def.lat0();
        let rs = (1.0 + es * lat0.cos().powi(4) / (1.0 - es)).sqrt();
        let sinz = lat0.sin();
        let pc = (sinz / rs).asin();
        let cp = latiso(0.0, pc, pc.sin()) - rs * latiso(e, lat0, sinz);
        let n2 = def.k0() * ellipsoid.a * (1.0 - es).sqrt() / (1.0 - es * sinz * sinz);
        Ok(Self {
            e,
            lc: def.long0(),
            rs,
            cp,
            n2,
            xs: def.x0(),
            ys: def.y0() - n2 * pc,
        })
    }
}

impl Projection for GaussSchreiber {
    fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64), ProjError> {
        let l = self.rs * (lon - self.lc);
        let ls = self.cp + self.rs * latiso(self.e, lat, lat.sin());
        let lat1 = (l.sin() / ls.cosh()).asin();
        let ls1 = latiso(0.0, lat1, lat1.sin());
        let (x, y) = (
            self.xs + self.n2 * ls1,
            self.ys + self.n2 * (ls.sinh() / l.cos()).atan(),
        );
        if !x.is_finite() || !y.is_finite() {
            return Err(ProjError::OutOfRange("gstmerc point at the pole".into()));
        }
        Ok((x, y))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjError> {
        let dx = (x - self.xs) / self.n2;
        let dy = (y - self.ys) / self.n2;
        let l = (dx.sinh() / dy.cos()).atan();
        let lat1 = (dy.sin() / dx.cosh()).asin();
        let lc = latiso(0.0, lat1, lat1.sin());
        Ok((self.lc + l / self.rs, invlatiso(self.e, (lc - self.cp) / self.rs)))
    }
}
