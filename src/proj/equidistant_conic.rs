//! Equidistant Conic projection (`+proj=eqdc`).

use crate::defs::ProjDef;
use crate::error::ProjError;
use crate::proj::common::{adjust_lat, adjust_lon, msfn, MeridianSeries, EPSLN};
use crate::proj::ellipsoid::Ellipsoid;
use crate::proj::Projection;

#[derive(Clone, Debug)]
pub struct EquidistantConic {
    ellipsoid: Ellipsoid,
    lon0: f64,
    false_easting: f64,
    false_northing: f64,
    series: MeridianSeries,
    ns: f64,
    g: f64,
    rh: f64,
}

impl EquidistantConic {
    pub fn new(
        ellipsoid: Ellipsoid,
        lon0: f64,
        lat0: f64,
        lat1: f64,
        lat2: f64,
        false_easting: f64,
        false_northing: f64,
    ) -> Result<Self, ProjError> {
        if (lat1 + lat2).abs() < EPSLN {
            return Err(ProjError::InvalidParameter(
                "eqdc standard parallels are symmetric about the equator".into(),
            ));
        }
        let e = ellipsoid.e;
        let series = MeridianSeries::new(ellipsoid.es);

        let ms1 = msfn(e, lat1.sin(), lat1.cos());
        let ml1 = series.mlfn(lat1);
        let ns = if (lat1 - lat2).abs() < EPSLN {
            lat1.sin()
        } else {
            let ms2 = msfn(e, lat2.sin(), lat2.cos());
            let ml2 = series.mlfn(lat2);
            (ms1 - ms2) / (ml2 - ml1)
        };
        let g = ml1 + ms1 / ns;
        let rh = ellipsoid.a * (g - series.mlfn(lat0));

        Ok(Self {
            ellipsoid,
            lon0,
            false_easting,
            false_northing,
            series,
            ns,
            g,
            rh,
        })
    }

    pub fn from_def(def: &ProjDef, ellipsoid: &Ellipsoid) -> Result<Self, ProjError> {
        Self::new(
            *ellipsoid,
            def.long0(),
            def.lat0(),
            def.lat1(),
            def.lat2(),
            def.x0(),
            def.y0(),
        )
    }
}

impl Projection for EquidistantConic {
    fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64), ProjError> {
        let a = self.ellipsoid.a;
        let rh1 = if self.ellipsoid.sphere {
            a * (self.g - lat)
        } else {
            a * (self.g - self.series.mlfn(lat))
        };
        let theta = self.ns * adjust_lon(lon - self.lon0);
        let x = rh1 * theta.sin();
        let y = self.rh - rh1 * theta.cos();
        Ok((x + self.false_easting, y + self.false_northing))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjError> {
        let a = self.ellipsoid.a;
        let x = x - self.false_easting;
        let y = self.rh - (y - self.false_northing);
        let (rh1, con) = if self.ns >= 0.0 {
            (x.hypot(y), 1.0)
        } else {
            (-x.hypot(y), -1.0)
        };
        let theta = if rh1 != 0.0 {
            (con * x).atan2(con * y)
        } else {
            0.0
        };
        let lat = if self.ellipsoid.sphere {
            adjust_lat(self.g - rh1 / a)
        } else {
            self.series.imlfn(self.g - rh1 / a)
        };
        Ok((adjust_lon(self.lon0 + theta / self.ns), lat))
    }
}
