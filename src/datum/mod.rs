//! Geodetic datums and the shifts between them.
//!
//! A [`Datum`] pairs an ellipsoid with the way coordinates on it relate to
//! WGS84: identity, a 3- or 7-parameter Helmert transform, or a list of
//! grid-shift tables. Datums are immutable once built.

pub mod geocentric;
pub mod gridshift;
pub mod ntv2;
pub mod shift;

use std::sync::Arc;

use tracing::warn;

use crate::point::Point;
use crate::proj::common::SEC_TO_RAD;
use crate::proj::ellipsoid::Ellipsoid;

use self::gridshift::{GridCatalog, GridShiftTable};

/// Largest eccentricity difference at which two ellipsoids are the same.
pub(crate) const ES_TOLERANCE: f64 = 5e-11;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DatumType {
    Wgs84,
    ThreeParam,
    SevenParam,
    GridShift,
    NoDatum,
}

/// Geocentric similarity transform to WGS84.
///
/// Rotations are in radians and the scale is a unit-relative factor
/// (`1 + ppm / 1e6`).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Helmert {
    Translation {
        dx: f64,
        dy: f64,
        dz: f64,
    },
    Similarity {
        dx: f64,
        dy: f64,
        dz: f64,
        rx: f64,
        ry: f64,
        rz: f64,
        scale: f64,
    },
}

impl Helmert {
    /// Build from `+towgs84` values: translations in metres, rotations in
    /// arc-seconds and scale in ppm. All-zero parameters give `None`.
    pub fn from_towgs84(params: &[f64]) -> Option<Self> {
        let (dx, dy, dz) = match params {
            [dx, dy, dz, ..] => (*dx, *dy, *dz),
            _ => return None,
        };
        if let [_, _, _, rx, ry, rz, ppm] = params {
            if [*rx, *ry, *rz, *ppm].iter().any(|&v| v != 0.0) {
                return Some(Self::Similarity {
                    dx,
                    dy,
                    dz,
                    rx: rx * SEC_TO_RAD,
                    ry: ry * SEC_TO_RAD,
                    rz: rz * SEC_TO_RAD,
                    scale: ppm / 1_000_000.0 + 1.0,
                });
            }
        }
        if dx == 0.0 && dy == 0.0 && dz == 0.0 {
            return None;
        }
        Some(Self::Translation { dx, dy, dz })
    }

    pub fn datum_type(&self) -> DatumType {
        match self {
            Self::Translation { .. } => DatumType::ThreeParam,
            Self::Similarity { .. } => DatumType::SevenParam,
        }
    }

    /// Geocentric coordinates on this datum to WGS84.
    pub fn to_wgs84(&self, p: Point) -> Point {
        match *self {
            Self::Translation { dx, dy, dz } => Point::new_3d(p.x + dx, p.y + dy, p.z + dz),
            Self::Similarity {
                dx,
                dy,
                dz,
                rx,
                ry,
                rz,
                scale,
            } => Point::new_3d(
                scale * (p.x - rz * p.y + ry * p.z) + dx,
                scale * (rz * p.x + p.y - rx * p.z) + dy,
                scale * (-ry * p.x + rx * p.y + p.z) + dz,
            ),
        }
    }

    /// Geocentric WGS84 coordinates to this datum.
    pub fn from_wgs84(&self, p: Point) -> Point {
        match *self {
            Self::Translation { dx, dy, dz } => Point::new_3d(p.x - dx, p.y - dy, p.z - dz),
            Self::Similarity {
                dx,
                dy,
                dz,
                rx,
                ry,
                rz,
                scale,
            } => {
                let x = (p.x - dx) / scale;
                let y = (p.y - dy) / scale;
                let z = (p.z - dz) / scale;
                Point::new_3d(
                    x + rz * y - ry * z,
                    -rz * x + y + rx * z,
                    ry * x - rx * y + z,
                )
            }
        }
    }
}

/// One entry of a datum's `+nadgrids` list.
#[derive(Clone, Debug)]
pub struct GridRef {
    pub name: String,
    pub mandatory: bool,
    /// `None` when no table of that name was registered.
    pub table: Option<Arc<GridShiftTable>>,
}

impl GridRef {
    /// The reserved `null` grid applies a zero correction everywhere.
    pub fn is_null(&self) -> bool {
        self.name == "null"
    }
}

/// Parse a comma-separated grid list. A leading `@` marks a grid optional.
pub fn parse_grid_list(nadgrids: &str, catalog: &GridCatalog) -> Vec<GridRef> {
    nadgrids
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|entry| {
            let (name, optional) = match entry.strip_prefix('@') {
                Some(name) => (name, true),
                None => (entry, false),
            };
            let table = if name == "null" {
                None
            } else {
                catalog.get(name).cloned()
            };
            if table.is_none() && name != "null" && optional {
                warn!(grid = name, "optional grid not registered");
            }
            GridRef {
                name: name.to_string(),
                mandatory: !optional && name != "null",
                table,
            }
        })
        .collect()
}

#[derive(Clone, Debug)]
pub struct Datum {
    pub datum_type: DatumType,
    pub ellipsoid: Ellipsoid,
    /// Present for 3/7-parameter datums, and kept as the fallback of a
    /// grid-shift datum whose definition also carried `+towgs84`.
    pub helmert: Option<Helmert>,
    pub grids: Vec<GridRef>,
}

impl Datum {
    /// Build a datum from its resolved definition parts.
    ///
    /// No datum code (or `none`) starts as [`DatumType::NoDatum`], any other
    /// code as [`DatumType::Wgs84`]. Non-zero Helmert parameters and then a
    /// grid list override that.
    pub fn new(
        code: Option<&str>,
        params: Option<&[f64]>,
        nadgrids: Option<&str>,
        ellipsoid: Ellipsoid,
        catalog: &GridCatalog,
    ) -> Self {
        let mut datum_type = match code {
            None | Some("none") => DatumType::NoDatum,
            Some(_) => DatumType::Wgs84,
        };
        let helmert = params.and_then(Helmert::from_towgs84);
        if let Some(h) = &helmert {
            datum_type = h.datum_type();
        }
        let grids = nadgrids
            .map(|g| parse_grid_list(g, catalog))
            .unwrap_or_default();
        if !grids.is_empty() {
            datum_type = DatumType::GridShift;
        }
        Self {
            datum_type,
            ellipsoid,
            helmert,
            grids,
        }
    }

    pub fn wgs84() -> Self {
        Self {
            datum_type: DatumType::Wgs84,
            ellipsoid: Ellipsoid::wgs84(),
            helmert: None,
            grids: Vec::new(),
        }
    }

    /// Whether the datum carries Helmert parameters that must be applied.
    pub fn is_parametric(&self) -> bool {
        matches!(self.datum_type, DatumType::ThreeParam | DatumType::SevenParam)
    }
}

/// Two datums are equal when they share a type, the same semi-major axis,
/// eccentricities within 5e-11, and identical parameters or grid lists.
pub fn compare_datums(source: &Datum, dest: &Datum) -> bool {
    if source.datum_type != dest.datum_type
        || source.ellipsoid.a != dest.ellipsoid.a
        || (source.ellipsoid.es - dest.ellipsoid.es).abs() > ES_TOLERANCE
    {
        return false;
    }
    match source.datum_type {
        DatumType::ThreeParam | DatumType::SevenParam => source.helmert == dest.helmert,
        DatumType::GridShift => {
            source.grids.len() == dest.grids.len()
                && source
                    .grids
                    .iter()
                    .zip(&dest.grids)
                    .all(|(a, b)| a.name == b.name && a.mandatory == b.mandatory)
        }
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_zero_params_are_no_shift() {
        assert_eq!(Helmert::from_towgs84(&[0.0, 0.0, 0.0]), None);
        assert_eq!(Helmert::from_towgs84(&[0.0; 7]), None);
        assert_eq!(
            Helmert::from_towgs84(&[1.0, 2.0, 3.0, 0.0, 0.0, 0.0, 0.0]),
            Some(Helmert::Translation { dx: 1.0, dy: 2.0, dz: 3.0 })
        );
    }

    #[test]
    fn test_seven_param_units() {
        let h = Helmert::from_towgs84(&[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 10.0]).unwrap();
        let Helmert::Similarity { rx, scale, .. } = h else {
            panic!("expected similarity, got {h:?}");
        };
        assert_relative_eq!(rx, SEC_TO_RAD);
        assert_relative_eq!(scale, 1.000_01);
    }

    #[test]
    fn test_helmert_inverse() {
        let h = Helmert::from_towgs84(&[446.448, -125.157, 542.06, 0.15, 0.247, 0.842, -20.489]).unwrap();
        let p = Point::new_3d(3_980_000.0, -100_000.0, 4_966_000.0);
        let back = h.from_wgs84(h.to_wgs84(p));
        // Small-angle rotation is only inverted to first order.
        assert_relative_eq!(back.x, p.x, epsilon = 1e-3);
        assert_relative_eq!(back.y, p.y, epsilon = 1e-3);
        assert_relative_eq!(back.z, p.z, epsilon = 1e-3);
    }

    #[test]
    fn test_datum_type_resolution() {
        let catalog = GridCatalog::new();
        let wgs = Ellipsoid::wgs84();
        assert_eq!(Datum::new(None, None, None, wgs, &catalog).datum_type, DatumType::NoDatum);
        assert_eq!(Datum::new(Some("none"), None, None, wgs, &catalog).datum_type, DatumType::NoDatum);
        assert_eq!(Datum::new(Some("wgs84"), Some(&[0.0, 0.0, 0.0]), None, wgs, &catalog).datum_type, DatumType::Wgs84);
        assert_eq!(Datum::new(Some("x"), Some(&[1.0, 0.0, 0.0]), None, wgs, &catalog).datum_type, DatumType::ThreeParam);
        let d = Datum::new(Some("nad27"), Some(&[-8.0, 160.0, 176.0]), Some("@conus"), wgs, &catalog);
        assert_eq!(d.datum_type, DatumType::GridShift);
        assert!(d.helmert.is_some());
        assert!(!d.grids[0].mandatory);
    }

    #[test]
    fn test_grid_list_flags() {
        let grids = parse_grid_list("@conus, ntv2_0.gsb,@null", &GridCatalog::new());
        let flags: Vec<_> = grids.iter().map(|g| (g.name.as_str(), g.mandatory, g.is_null())).collect();
        assert_eq!(
            flags,
            vec![("conus", false, false), ("ntv2_0.gsb", true, false), ("null", false, true)]
        );
    }

    #[test]
    fn test_compare_datums() {
        let catalog = GridCatalog::new();
        let a = Datum::new(Some("x"), Some(&[1.0, 2.0, 3.0]), None, Ellipsoid::wgs84(), &catalog);
        let b = Datum::new(Some("y"), Some(&[1.0, 2.0, 3.0]), None, Ellipsoid::wgs84(), &catalog);
        let c = Datum::new(Some("y"), Some(&[1.0, 2.0, 4.0]), None, Ellipsoid::wgs84(), &catalog);
        let d = Datum::new(Some("y"), Some(&[1.0, 2.0, 3.0]), None, Ellipsoid::grs80(), &catalog);
        assert!(compare_datums(&a, &b));
        assert!(!compare_datums(&a, &c));
        // WGS84 and GRS80 differ only in the 9th digit of es.
        assert!(compare_datums(&a, &d));
        assert!(!compare_datums(&Datum::wgs84(), &a));
    }
}
