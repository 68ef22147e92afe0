//! A coordinate reference system ready for use in the pipeline.
//!
//! [`Crs::from_def`] derives the constants a [`ProjDef`] only names: the
//! numeric ellipsoid, the datum with its shift parameters or grids, the bound
//! projection and the axis order.

use tracing::{debug, warn};

use crate::axis::AxisOrder;
use crate::datum::gridshift::GridCatalog;
use crate::datum::{Datum, DatumType};
use crate::defs::{constants, ProjDef};
use crate::error::ProjError;
use crate::proj::ellipsoid::Ellipsoid;
use crate::proj::ProjectionMethod;

/// The datum's ellipsoid and the one the projection runs on. They differ
/// only under `+R_A`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct ResolvedEllipsoid {
    pub datum: Ellipsoid,
    pub projection: Ellipsoid,
}

/// Explicit axes win over a named ellipsoid, which wins over the one implied
/// by the datum. With nothing given the ellipsoid is WGS84.
pub(crate) fn resolve_ellipsoid(def: &ProjDef) -> Result<ResolvedEllipsoid, ProjError> {
    let datum_ellps = def
        .datum_code
        .as_deref()
        .and_then(constants::datum)
        .map(|d| d.ellps);

    let datum = if let Some(a) = def.a {
        if !(a.is_finite() && a > 0.0) {
            return Err(ProjError::InvalidParameter(format!("semi-major axis {a}")));
        }
        match (def.b, def.rf) {
            (Some(b), _) if b > 0.0 && b <= a => Ellipsoid::from_axes(a, b),
            (Some(b), _) => {
                return Err(ProjError::InvalidParameter(format!("semi-minor axis {b} for a={a}")))
            }
            (None, Some(rf)) => Ellipsoid::from_inverse_flattening(a, rf),
            (None, None) => Ellipsoid::sphere(a),
        }
    } else {
        match def.ellps.as_deref().or(datum_ellps) {
            Some(name) => match constants::ellipsoid(name) {
                Some(e) => Ellipsoid::from_axes(e.a, e.b()),
                None => {
                    warn!(ellps = name, "unknown ellipsoid, using WGS84");
                    Ellipsoid::wgs84()
                }
            },
            None => Ellipsoid::wgs84(),
        }
    };

    let projection = if def.r_a {
        datum.authalic_sphere()
    } else {
        datum
    };
    Ok(ResolvedEllipsoid { datum, projection })
}

#[derive(Clone, Debug)]
pub struct Crs {
    def: ProjDef,
    datum: Datum,
    projection: ProjectionMethod,
    axis: AxisOrder,
}

impl Crs {
    pub fn from_def(def: ProjDef, grids: &GridCatalog) -> Result<Self, ProjError> {
        let ellipsoid = resolve_ellipsoid(&def)?;

        let table = def.datum_code.as_deref().and_then(constants::datum);
        let params = def
            .datum_params
            .as_deref()
            .or_else(|| table.and_then(|d| d.towgs84));
        let nadgrids = def
            .nadgrids
            .as_deref()
            .or_else(|| table.and_then(|d| d.nadgrids));
        let datum = Datum::new(
            def.datum_code.as_deref(),
            params,
            nadgrids,
            ellipsoid.datum,
            grids,
        );

        let projection = ProjectionMethod::new(&def, &ellipsoid.projection)?;
        let axis = match def.axis.as_deref() {
            Some(code) => AxisOrder::parse(code)?,
            None => AxisOrder::default(),
        };

        debug!(
            proj = def.proj_name.as_deref(),
            title = def.title.as_deref(),
            datum = ?datum.datum_type,
            axis = %axis,
            "bound CRS"
        );
        Ok(Self {
            def,
            datum,
            projection,
            axis,
        })
    }

    /// Geographic WGS84 in degrees, the pivot of datum transforms.
    pub fn wgs84() -> Self {
        Self {
            def: ProjDef {
                proj_name: Some("longlat".into()),
                title: Some("WGS84".into()),
                datum_code: Some("wgs84".into()),
                ellps: Some("WGS84".into()),
                ..Default::default()
            },
            datum: Datum::wgs84(),
            projection: ProjectionMethod::LongLat,
            axis: AxisOrder::ENU,
        }
    }

    pub fn def(&self) -> &ProjDef {
        &self.def
    }

    pub fn datum(&self) -> &Datum {
        &self.datum
    }

    pub fn ellipsoid(&self) -> &Ellipsoid {
        &self.datum.ellipsoid
    }

    pub fn projection(&self) -> &ProjectionMethod {
        &self.projection
    }

    pub fn axis(&self) -> AxisOrder {
        self.axis
    }

    pub fn is_longlat(&self) -> bool {
        self.projection.is_longlat()
    }

    /// Whether this CRS is already on the WGS84 datum by name.
    pub fn is_wgs84_datum(&self) -> bool {
        self.def
            .datum_code
            .as_deref()
            .is_some_and(|code| code.eq_ignore_ascii_case("wgs84"))
    }

    /// Whether datum shifts from this CRS need the WGS84 pivot.
    pub(crate) fn needs_pivot(&self) -> bool {
        self.datum.is_parametric() || self.datum.datum_type == DatumType::GridShift
    }
}
