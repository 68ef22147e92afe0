//! The point pipeline: source axes → geodetic radians → datum shift →
//! destination projection → destination axes.

use tracing::debug;

use crate::context::Context;
use crate::crs::Crs;
use crate::datum::shift::datum_transform;
use crate::error::ProjError;
use crate::point::Point;
use crate::proj::Projection;

/// Transform one point from `source` to `dest`.
///
/// Coordinates are in each CRS's native units: degrees for geographic
/// systems, projected units otherwise, in the CRS's axis order. Either the
/// whole pipeline succeeds or an error is returned; a result is always
/// finite.
pub fn transform(source: &Crs, dest: &Crs, point: Point) -> Result<Point, ProjError> {
    if !point.is_finite() {
        return Err(non_finite(point));
    }

    // Helmert and grid datums are defined relative to WGS84; going between
    // two of them directly would mix their cross terms.
    let out = if pivot_through_wgs84(source, dest) {
        let wgs84 = Crs::wgs84();
        debug!("pivoting datum shift through WGS84");
        let mid = run(source, &wgs84, point)?;
        run(&wgs84, dest, mid)?
    } else {
        run(source, dest, point)?
    };

    if !out.is_finite() {
        return Err(non_finite(out));
    }
    Ok(out)
}

fn pivot_through_wgs84(source: &Crs, dest: &Crs) -> bool {
    (source.needs_pivot() && !dest.is_wgs84_datum()) || (dest.needs_pivot() && !source.is_wgs84_datum())
}

fn run(source: &Crs, dest: &Crs, point: Point) -> Result<Point, ProjError> {
    let mut p = point;
    if !source.axis().is_enu() {
        p = source.axis().normalize(p);
    }

    if source.is_longlat() {
        p = p.with_xy(p.x.to_radians(), p.y.to_radians());
    } else {
        if let Some(k) = source.def().to_meter {
            p = p.with_xy(p.x * k, p.y * k);
        }
        let (lon, lat) = source.projection().inverse(p.x, p.y)?;
        p = p.with_xy(lon, lat);
    }

    if let Some(pm) = source.def().from_greenwich {
        p.x += pm;
    }

    p = datum_transform(source.datum(), dest.datum(), p)?;

    if let Some(pm) = dest.def().from_greenwich {
        p.x -= pm;
    }

    if dest.is_longlat() {
        p = p.with_xy(p.x.to_degrees(), p.y.to_degrees());
    } else {
        let (x, y) = dest.projection().forward(p.x, p.y)?;
        p = p.with_xy(x, y);
        if let Some(k) = dest.def().to_meter {
            p = p.with_xy(p.x / k, p.y / k);
        }
    }

    if !dest.axis().is_enu() {
        p = dest.axis().denormalize(p);
    }
    Ok(p)
}

fn non_finite(p: Point) -> ProjError {
    ProjError::NonFinite {
        x: p.x,
        y: p.y,
        z: p.z,
    }
}

/// A source/destination pair bound once and applied in either direction.
pub struct Converter<'ctx> {
    context: &'ctx Context,
    source: Crs,
    dest: Crs,
}

impl<'ctx> Converter<'ctx> {
    pub(crate) fn new(context: &'ctx Context, source: Crs, dest: Crs) -> Self {
        Self {
            context,
            source,
            dest,
        }
    }

    /// Source coordinates to destination coordinates.
    pub fn forward(&self, point: impl Into<Point>) -> Result<Point, ProjError> {
        self.context.transform(&self.source, &self.dest, point.into())
    }

    /// Destination coordinates back to source coordinates.
    pub fn inverse(&self, point: impl Into<Point>) -> Result<Point, ProjError> {
        self.context.transform(&self.dest, &self.source, point.into())
    }

    pub fn source(&self) -> &Crs {
        &self.source
    }

    pub fn dest(&self) -> &Crs {
        &self.dest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datum::gridshift::GridCatalog;
    use crate::defs::projstring;
    use approx::assert_relative_eq;

    fn crs(definition: &str) -> Crs {
        Crs::from_def(projstring::parse(definition).unwrap(), &GridCatalog::new()).unwrap()
    }

    #[test]
    fn test_longlat_to_longlat_same_datum() {
        let wgs = crs("+proj=longlat +datum=WGS84");
        let p = Point::new_3d(12.5, 41.9, 20.0);
        let out = transform(&wgs, &wgs, p).unwrap();
        assert_relative_eq!(out.x, p.x, epsilon = 1e-12);
        assert_relative_eq!(out.y, p.y, epsilon = 1e-12);
        assert_eq!(out.z, p.z);
    }

    #[test]
    fn test_units_scale_projected_output() {
        let metres = crs("+proj=merc +a=6378137 +b=6378137 +nadgrids=@null");
        let feet = crs("+proj=merc +a=6378137 +b=6378137 +nadgrids=@null +units=ft");
        let wgs = crs("+proj=longlat +datum=WGS84");
        let p = Point::new(10.0, 20.0);
        let m = transform(&wgs, &metres, p).unwrap();
        let ft = transform(&wgs, &feet, p).unwrap();
        assert_relative_eq!(ft.x * 0.3048, m.x, epsilon = 1e-6);
        assert_relative_eq!(ft.y * 0.3048, m.y, epsilon = 1e-6);
        let back = transform(&feet, &wgs, ft).unwrap();
        assert_relative_eq!(back.x, 10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_prime_meridian_offset() {
        let paris_pm = crs("+proj=longlat +ellps=clrk80ign +pm=paris");
        let greenwich = crs("+proj=longlat +ellps=clrk80ign");
        let out = transform(&paris_pm, &greenwich, Point::new(0.0, 48.0)).unwrap();
        assert_relative_eq!(out.x, 2.337_229_166_667, epsilon = 1e-9);
        assert_relative_eq!(out.y, 48.0, epsilon = 1e-12);
    }

    #[test]
    fn test_axis_order_applied_on_both_sides() {
        let enu = crs("+proj=longlat +datum=WGS84");
        let neu = crs("+proj=longlat +datum=WGS84 +axis=neu");
        let out = transform(&enu, &neu, Point::new(5.0, 52.0)).unwrap();
        assert_relative_eq!(out.x, 52.0, epsilon = 1e-12);
        assert_relative_eq!(out.y, 5.0, epsilon = 1e-12);
        let back = transform(&neu, &enu, out).unwrap();
        assert_relative_eq!(back.x, 5.0, epsilon = 1e-12);
        assert_relative_eq!(back.y, 52.0, epsilon = 1e-12);
    }

    #[test]
    fn test_non_finite_rejected() {
        let wgs = crs("+proj=longlat +datum=WGS84");
        let err = transform(&wgs, &wgs, Point::new(f64::NAN, 0.0)).unwrap_err();
        assert!(matches!(err, ProjError::NonFinite { .. }));
    }

    #[test]
    fn test_pivot_between_helmert_datums() {
        let osgb = crs("+proj=longlat +datum=OSGB36");
        let ed50 = crs("+proj=longlat +ellps=intl +towgs84=-87,-98,-121");
        assert!(pivot_through_wgs84(&osgb, &ed50));
        let p = Point::new(-0.1, 51.5);
        let there = transform(&osgb, &ed50, p).unwrap();
        let back = transform(&ed50, &osgb, there).unwrap();
        assert_relative_eq!(back.x, p.x, epsilon = 1e-8);
        assert_relative_eq!(back.y, p.y, epsilon = 1e-8);
    }

    #[test]
    fn test_no_pivot_to_wgs84() {
        let osgb = crs("+proj=longlat +datum=OSGB36");
        let wgs = crs("+proj=longlat +datum=WGS84");
        assert!(!pivot_through_wgs84(&osgb, &wgs));
        assert!(!pivot_through_wgs84(&wgs, &osgb));
    }
}
