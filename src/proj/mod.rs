//! Map projections.
//!
//! Each family lives in its own module and implements [`Projection`].
//! [`ProjectionMethod`] is the closed set of families a definition can bind
//! to; it is selected once by name when a [`crate::crs::Crs`] is built.

pub mod albers_equal_area;
pub mod cassini;
pub mod common;
pub mod cylindrical_equal_area;
pub mod ellipsoid;
pub mod equidistant_conic;
pub mod equirectangular;
pub mod gauss_schreiber;
pub mod gnomonic;
pub mod krovak;
pub mod lambert_azimuthal;
pub mod lambert_conformal;
pub mod mercator;
pub mod miller;
pub mod mollweide;
pub mod nzmg;
pub mod oblique_mercator;
pub mod orthographic;
pub mod polyconic;
pub mod sinusoidal;
pub mod stereographic;
pub mod swiss_oblique_mercator;
pub mod transverse_mercator;
pub mod van_der_grinten;

use crate::defs::ProjDef;
use crate::error::ProjError;

use self::albers_equal_area::AlbersEqualArea;
use self::cassini::Cassini;
use self::cylindrical_equal_area::CylindricalEqualArea;
use self::ellipsoid::Ellipsoid;
use self::equidistant_conic::EquidistantConic;
use self::equirectangular::Equirectangular;
use self::gauss_schreiber::GaussSchreiber;
use self::gnomonic::Gnomonic;
use self::krovak::Krovak;
use self::lambert_azimuthal::LambertAzimuthalEqualArea;
use self::lambert_conformal::LambertConformalConic;
use self::mercator::Mercator;
use self::miller::Miller;
use self::mollweide::Mollweide;
use self::nzmg::NewZealandMapGrid;
use self::oblique_mercator::ObliqueMercator;
use self::orthographic::Orthographic;
use self::polyconic::Polyconic;
use self::sinusoidal::Sinusoidal;
use self::stereographic::{Gauss, ObliqueStereographic, Stereographic};
use self::swiss_oblique_mercator::SwissObliqueMercator;
use self::transverse_mercator::TransverseMercator;
use self::van_der_grinten::VanDerGrinten;

/// Trait for map projections supporting forward and inverse transforms.
pub trait Projection: Send + Sync {
    /// Forward: (lon_rad, lat_rad) -> (easting, northing)
    fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64), ProjError>;

    /// Inverse: (easting, northing) -> (lon_rad, lat_rad)
    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjError>;
}

/// Every projection family a definition can bind to.
#[derive(Clone, Debug)]
pub enum ProjectionMethod {
    LongLat,
    TransverseMercator(TransverseMercator),
    LambertConformalConic(LambertConformalConic),
    Mercator(Mercator),
    AlbersEqualArea(AlbersEqualArea),
    LambertAzimuthalEqualArea(LambertAzimuthalEqualArea),
    Stereographic(Stereographic),
    ObliqueStereographic(ObliqueStereographic),
    Gauss(Gauss),
    ObliqueMercator(ObliqueMercator),
    Krovak(Krovak),
    Cassini(Cassini),
    Polyconic(Polyconic),
    Sinusoidal(Sinusoidal),
    Gnomonic(Gnomonic),
    Orthographic(Orthographic),
    Equirectangular(Equirectangular),
    EquidistantConic(EquidistantConic),
    Miller(Miller),
    Mollweide(Mollweide),
    CylindricalEqualArea(CylindricalEqualArea),
    NewZealandMapGrid(NewZealandMapGrid),
    GaussSchreiber(GaussSchreiber),
    SwissObliqueMercator(SwissObliqueMercator),
    VanDerGrinten(VanDerGrinten),
}

/// Lower-case a projection name and treat spaces as underscores.
fn normalize_name(name: &str) -> String {
    name.trim().to_ascii_lowercase().replace(' ', "_")
}

impl ProjectionMethod {
    /// Bind a projection by name and derive its constants.
    pub fn new(def: &ProjDef, ellipsoid: &Ellipsoid) -> Result<Self, ProjError> {
        let name = def
            .proj_name
            .as_deref()
            .ok_or_else(|| ProjError::UnknownProjection("<missing +proj>".into()))?;

        let method = match normalize_name(name).as_str() {
            "longlat" | "latlong" | "lonlat" | "latlon" | "identity" => Self::LongLat,
            "tmerc" | "etmerc" | "transverse_mercator" | "transverse_mercator_south_orientated"
            | "gauss_kruger" => Self::TransverseMercator(TransverseMercator::from_def(def, ellipsoid)?),
            "utm" => Self::TransverseMercator(TransverseMercator::utm_from_def(def, ellipsoid)?),
            "lcc" | "lambert_conformal_conic" | "lambert_conformal_conic_1sp"
            | "lambert_conformal_conic_2sp" | "lambert_tangential_conformal_conic_projection" => {
                Self::LambertConformalConic(LambertConformalConic::from_def(def, ellipsoid)?)
            }
            "merc" | "mercator" | "mercator_1sp" | "mercator_2sp" | "mercator_auxiliary_sphere"
            | "popular_visualisation_pseudo_mercator" => {
                Self::Mercator(Mercator::from_def(def, ellipsoid)?)
            }
            "aea" | "albers" | "albers_conic_equal_area" => {
                Self::AlbersEqualArea(AlbersEqualArea::from_def(def, ellipsoid)?)
            }
            "laea" | "lambert_azimuthal_equal_area" => {
                Self::LambertAzimuthalEqualArea(LambertAzimuthalEqualArea::from_def(def, ellipsoid)?)
            }
            "stere" | "stereographic" | "polar_stereographic" | "stereographic_south_pole"
            | "stereographic_north_pole" | "polar_stereographic_(variant_a)"
            | "polar_stereographic_(variant_b)" => {
                Self::Stereographic(Stereographic::from_def(def, ellipsoid)?)
            }
            "sterea" | "oblique_stereographic" | "double_stereographic" => {
                Self::ObliqueStereographic(ObliqueStereographic::from_def(def, ellipsoid)?)
            }
            "gauss" => Self::Gauss(Gauss::from_def(def, ellipsoid)?),
            "omerc" | "oblique_mercator" | "hotine_oblique_mercator"
            | "hotine_oblique_mercator_azimuth_natural_origin"
            | "hotine_oblique_mercator_azimuth_center"
            | "hotine_oblique_mercator_two_point_natural_origin" => {
                Self::ObliqueMercator(ObliqueMercator::from_def(def, ellipsoid)?)
            }
            "krovak" => Self::Krovak(Krovak::from_def(def)?),
            "cass" | "cassini" | "cassini_soldner" => Self::Cassini(Cassini::from_def(def, ellipsoid)?),
            "poly" | "polyconic" | "american_polyconic" => {
                Self::Polyconic(Polyconic::from_def(def, ellipsoid)?)
            }
            "sinu" | "sinusoidal" => Self::Sinusoidal(Sinusoidal::from_def(def, ellipsoid)?),
            "gnom" | "gnomonic" => Self::Gnomonic(Gnomonic::from_def(def, ellipsoid)?),
            "ortho" | "orthographic" => Self::Orthographic(Orthographic::from_def(def, ellipsoid)?),
            "eqc" | "equirectangular" | "equidistant_cylindrical" | "plate_carree" => {
                Self::Equirectangular(Equirectangular::from_def(def, ellipsoid)?)
            }
            "equi" => Self::Equirectangular(Equirectangular::equi_from_def(def, ellipsoid)?),
            "eqdc" | "equidistant_conic" => {
                Self::EquidistantConic(EquidistantConic::from_def(def, ellipsoid)?)
            }
            "mill" | "miller_cylindrical" => Self::Miller(Miller::from_def(def, ellipsoid)?),
            "moll" | "mollweide" => Self::Mollweide(Mollweide::from_def(def, ellipsoid)?),
            "cea" | "cylindrical_equal_area" => {
                Self::CylindricalEqualArea(CylindricalEqualArea::from_def(def, ellipsoid)?)
            }
            "nzmg" | "new_zealand_map_grid" => {
                Self::NewZealandMapGrid(NewZealandMapGrid::from_def(def, ellipsoid)?)
            }
            "gstmerc" | "gauss_schreiber_transverse_mercator" => {
                Self::GaussSchreiber(GaussSchreiber::from_def(def, ellipsoid)?)
            }
            "somerc" | "swiss_oblique_mercator" | "swiss_oblique_cylindrical" => {
                Self::SwissObliqueMercator(SwissObliqueMercator::from_def(def, ellipsoid)?)
            }
            "vandg" | "van_der_grinten" | "van_der_grinten_i" | "vandergrinten" => {
                Self::VanDerGrinten(VanDerGrinten::from_def(def, ellipsoid)?)
            }
            _ => return Err(ProjError::UnknownProjection(name.to_string())),
        };
        Ok(method)
    }

    pub fn is_longlat(&self) -> bool {
        matches!(self, Self::LongLat)
    }

    fn as_projection(&self) -> Option<&dyn Projection> {
        let p: &dyn Projection = match self {
            Self::LongLat => return None,
            Self::TransverseMercator(p) => p,
            Self::LambertConformalConic(p) => p,
            Self::Mercator(p) => p,
            Self::AlbersEqualArea(p) => p,
            Self::LambertAzimuthalEqualArea(p) => p,
            Self::Stereographic(p) => p,
            Self::ObliqueStereographic(p) => p,
            Self::Gauss(p) => p,
            Self::ObliqueMercator(p) => p,
            Self::Krovak(p) => p,
            Self::Cassini(p) => p,
            Self::Polyconic(p) => p,
            Self::Sinusoidal(p) => p,
            Self::Gnomonic(p) => p,
            Self::Orthographic(p) => p,
            Self::Equirectangular(p) => p,
            Self::EquidistantConic(p) => p,
            Self::Miller(p) => p,
            Self::Mollweide(p) => p,
            Self::CylindricalEqualArea(p) => p,
            Self::NewZealandMapGrid(p) => p,
            Self::GaussSchreiber(p) => p,
            Self::SwissObliqueMercator(p) => p,
            Self::VanDerGrinten(p) => p,
        };
        Some(p)
    }
}

impl Projection for ProjectionMethod {
    fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64), ProjError> {
        match self.as_projection() {
            Some(p) => p.forward(lon, lat),
            None => Ok((lon, lat)),
        }
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjError> {
        match self.as_projection() {
            Some(p) => p.inverse(x, y),
            None => Ok((x, y)),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::defs::projstring;

    #[test]
    fn test_unknown_projection_is_error() {
        let def = projstring::parse("+proj=bogus +ellps=WGS84").unwrap();
        let err = ProjectionMethod::new(&def, &Ellipsoid::wgs84()).unwrap_err();
        assert_eq!(err, ProjError::UnknownProjection("bogus".into()));
    }

    #[test]
    fn test_missing_name_is_error() {
        let err = ProjectionMethod::new(&ProjDef::default(), &Ellipsoid::wgs84()).unwrap_err();
        assert!(matches!(err, ProjError::UnknownProjection(_)));
    }

    #[test]
    fn test_wkt_names_resolve() {
        let proj = bind("+proj=Transverse_Mercator +lon_0=9 +ellps=WGS84");
        assert!(matches!(proj, ProjectionMethod::TransverseMercator(_)));
        let proj = bind("+proj=Lambert_Azimuthal_Equal_Area +lat_0=52 +lon_0=10 +ellps=GRS80");
        assert!(matches!(proj, ProjectionMethod::LambertAzimuthalEqualArea(_)));
    }

    #[test]
    fn test_longlat_is_identity() {
        let proj = bind("+proj=longlat +datum=WGS84");
        assert!(proj.is_longlat());
        assert_eq!(proj.forward(0.3, 0.4).unwrap(), (0.3, 0.4));
        assert_eq!(proj.inverse(0.3, 0.4).unwrap(), (0.3, 0.4));
    }

    #[test]
    fn test_every_family_roundtrips() {
        let defs: &[(&str, &[(f64, f64)])] = &[
            ("+proj=tmerc +lat_0=49 +lon_0=-2 +k=0.9996012717 +x_0=400000 +y_0=-100000 +ellps=airy", &[(-1.0, 52.0), (1.5, 55.0)]),
            ("+proj=utm +zone=33 +datum=WGS84", &[(15.0, 50.0), (12.5, 47.0)]),
            ("+proj=lcc +lat_1=33 +lat_2=45 +lat_0=39 +lon_0=-96 +datum=NAD83", &[(-74.0, 40.7), (-118.2, 34.0)]),
            ("+proj=merc +lat_ts=30 +lon_0=10 +ellps=WGS84", &[(15.0, 50.0), (-30.0, -20.0)]),
            ("+proj=aea +lat_1=29.5 +lat_2=45.5 +lat_0=23 +lon_0=-96 +ellps=GRS80", &[(-122.4, 37.8), (-80.0, 25.0)]),
            ("+proj=laea +lat_0=52 +lon_0=10 +x_0=4321000 +y_0=3210000 +ellps=GRS80", &[(2.35, 48.86), (21.0, 60.0)]),
            ("+proj=stere +lat_0=90 +lat_ts=70 +lon_0=-45 +ellps=WGS84", &[(-45.0, 75.0), (100.0, 80.0)]),
            ("+proj=sterea +lat_0=52.15616055555555 +lon_0=5.38763888888889 +k=0.9999079 +x_0=155000 +y_0=463000 +ellps=bessel", &[(4.9, 52.37), (5.5, 51.44)]),
            ("+proj=omerc +lat_0=4 +lonc=102.25 +alpha=323.0257905 +k=0.99984 +x_0=804670.24 +y_0=0 +no_uoff +gamma=323.1301023611111 +ellps=GRS80", &[(101.5, 3.2), (103.0, 5.0)]),
            ("+proj=krovak +lat_0=49.5 +lon_0=24.83333333333333 +alpha=30.28813972222222 +k=0.9999 +x_0=0 +y_0=0 +ellps=bessel", &[(14.42, 50.08), (17.0, 49.2)]),
            ("+proj=cass +lat_0=10.44166666666667 +lon_0=-61.33333333333334 +x_0=86501.46392051999 +y_0=65379.0134283 +a=6378293.645208759 +b=6356617.987679838", &[(-61.2, 10.6), (-61.5, 10.2)]),
            ("+proj=poly +lat_0=0 +lon_0=-54 +x_0=5000000 +y_0=10000000 +ellps=aust_SA", &[(-50.0, -15.0), (-57.0, 5.0)]),
            ("+proj=sinu +lon_0=0 +x_0=0 +y_0=0 +ellps=WGS84", &[(10.0, 45.0), (-73.9857, 40.7484)]),
            ("+proj=gnom +lat_0=90 +lon_0=0 +a=6371000 +b=6371000", &[(20.0, 60.0), (-120.0, 75.0)]),
            ("+proj=ortho +lat_0=40 +lon_0=-100 +a=6370997 +b=6370997", &[(-90.0, 45.0), (-110.0, 30.0)]),
            ("+proj=eqc +lat_ts=30 +lon_0=0 +ellps=WGS84", &[(10.0, 45.0), (-150.0, -60.0)]),
            ("+proj=equi +lat_0=20 +lon_0=5 +a=6378137 +b=6378137", &[(10.0, 45.0)]),
            ("+proj=eqdc +lat_0=40 +lon_0=-96 +lat_1=20 +lat_2=60 +ellps=clrk66", &[(-75.0, 35.0), (-120.0, 50.0)]),
            ("+proj=mill +lon_0=0 +a=6378137 +b=6378137", &[(10.0, 45.0), (-100.0, -70.0)]),
            ("+proj=moll +lon_0=0 +a=6378137 +b=6378137", &[(10.0, 45.0), (-100.0, -70.0)]),
            ("+proj=cea +lon_0=0 +lat_ts=30 +ellps=WGS84", &[(10.0, 45.0), (-100.0, -70.0)]),
            ("+proj=nzmg +lat_0=-41 +lon_0=173 +x_0=2510000 +y_0=6023150 +ellps=intl", &[(174.76, -36.85), (172.6, -43.5)]),
            ("+proj=gstmerc +lat_0=-21.11666666666667 +lon_0=55.53333333333333 +k_0=1 +x_0=160000 +y_0=50000 +ellps=intl", &[(55.45, -21.0), (55.7, -21.3)]),
            ("+proj=somerc +lat_0=46.95240555555556 +lon_0=7.439583333333333 +k_0=1 +x_0=600000 +y_0=200000 +ellps=bessel", &[(8.54, 47.37), (6.14, 46.2)]),
            ("+proj=vandg +lon_0=0 +R=6371000", &[(10.0, 45.0), (-100.0, -30.0)]),
        ];
        for (definition, cases) in defs {
            let proj = bind(definition);
            assert_roundtrip(&proj, cases, 1e-7);
        }
    }
}
