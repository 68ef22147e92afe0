//! Moving geodetic coordinates between datums.

use tracing::warn;

use crate::datum::geocentric::{geocentric_to_geodetic, geodetic_to_geocentric};
use crate::datum::gridshift::apply_gridshift;
use crate::datum::{compare_datums, Datum, DatumType, Helmert, ES_TOLERANCE};
use crate::error::ProjError;
use crate::point::Point;
use crate::proj::ellipsoid::Ellipsoid;

/// Move `p` (lon, lat in radians, height in metres) from `source` to `dest`.
///
/// Equal datums, or a side without a datum, pass the point through.
/// Grid-shift datums are first taken to WGS84 by their grids; everything
/// else goes through geocentric space with the Helmert parameters of each
/// side. Neither datum is modified.
pub fn datum_transform(source: &Datum, dest: &Datum, p: Point) -> Result<Point, ProjError> {
    if compare_datums(source, dest)
        || source.datum_type == DatumType::NoDatum
        || dest.datum_type == DatumType::NoDatum
    {
        return Ok(p);
    }

    let mut point = p;
    let mut src_ellipsoid = source.ellipsoid;
    let mut src_helmert = active_helmert(source);

    if source.datum_type == DatumType::GridShift {
        match apply_gridshift(&source.grids, false, point)? {
            Some(shifted) => {
                point = shifted;
                src_ellipsoid = Ellipsoid::wgs84();
                src_helmert = None;
            }
            None => match source.helmert {
                Some(h) => src_helmert = Some(h),
                None => warn!("no source grid covers the point, continuing unshifted"),
            },
        }
    }

    let dest_grid = dest.datum_type == DatumType::GridShift;
    let (dst_ellipsoid, dst_helmert) = if dest_grid {
        (Ellipsoid::wgs84(), None)
    } else {
        (dest.ellipsoid, active_helmert(dest))
    };

    let same_ellipsoid = src_ellipsoid.a == dst_ellipsoid.a
        && (src_ellipsoid.es - dst_ellipsoid.es).abs() <= ES_TOLERANCE;
    if !same_ellipsoid || src_helmert.is_some() || dst_helmert.is_some() {
        let mut g = geodetic_to_geocentric(point, &src_ellipsoid)?;
        if let Some(h) = src_helmert {
            g = h.to_wgs84(g);
        }
        if let Some(h) = dst_helmert {
            g = h.from_wgs84(g);
        }
        point = geocentric_to_geodetic(g, &dst_ellipsoid);
    }

    if dest_grid {
        match apply_gridshift(&dest.grids, true, point)? {
            Some(shifted) => point = shifted,
            None => match dest.helmert {
                Some(h) => {
                    let g = h.from_wgs84(geodetic_to_geocentric(point, &dst_ellipsoid)?);
                    point = geocentric_to_geodetic(g, &dest.ellipsoid);
                }
                None => warn!("no destination grid covers the point, continuing unshifted"),
            },
        }
    }

    Ok(point)
}

fn active_helmert(datum: &Datum) -> Option<Helmert> {
    if datum.is_parametric() {
        datum.helmert
    } else {
        None
    }
}
