//! CRS definitions: the normalized parameter record and its parsers.
//!
//! A [`ProjDef`] is what every input format (PROJ string, WKT, key/value
//! object, registered authority code) is reduced to before constants are
//! derived by [`crate::crs::Crs`]. Angles are stored in radians.

pub mod code;
pub mod constants;
pub mod projstring;
pub mod wkt;

use std::collections::BTreeMap;

/// Normalized parameter record produced by parsing.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProjDef {
    pub proj_name: Option<String>,
    pub title: Option<String>,
    /// Authority code the definition was registered or declared under.
    pub srs_code: Option<String>,
    pub units: Option<String>,
    pub to_meter: Option<f64>,

    pub datum_code: Option<String>,
    pub datum_params: Option<Vec<f64>>,
    pub nadgrids: Option<String>,

    pub ellps: Option<String>,
    pub a: Option<f64>,
    pub b: Option<f64>,
    pub rf: Option<f64>,
    pub r_a: bool,

    pub k0: Option<f64>,
    pub x0: Option<f64>,
    pub y0: Option<f64>,
    pub lat0: Option<f64>,
    pub lat1: Option<f64>,
    pub lat2: Option<f64>,
    pub lat_ts: Option<f64>,
    pub long0: Option<f64>,
    pub long1: Option<f64>,
    pub long2: Option<f64>,
    pub longc: Option<f64>,
    pub alpha: Option<f64>,
    pub rectified_grid_angle: Option<f64>,
    pub from_greenwich: Option<f64>,

    pub zone: Option<i32>,
    pub utm_south: bool,
    pub axis: Option<String>,
    pub no_off: bool,
    pub no_rot: bool,
    pub czech: bool,

    /// Keys no handler recognized, kept verbatim.
    pub extra: BTreeMap<String, String>,
}

impl ProjDef {
    pub fn lat0(&self) -> f64 {
        self.lat0.unwrap_or(0.0)
    }

    /// First standard parallel, defaulting to the latitude of origin.
    pub fn lat1(&self) -> f64 {
        self.lat1.unwrap_or_else(|| self.lat0())
    }

    /// Second standard parallel, defaulting to the first.
    pub fn lat2(&self) -> f64 {
        self.lat2.unwrap_or_else(|| self.lat1())
    }

    pub fn long0(&self) -> f64 {
        self.long0.unwrap_or(0.0)
    }

    pub fn x0(&self) -> f64 {
        self.x0.unwrap_or(0.0)
    }

    pub fn y0(&self) -> f64 {
        self.y0.unwrap_or(0.0)
    }

    pub fn k0(&self) -> f64 {
        self.k0.unwrap_or(1.0)
    }

    pub fn is_longlat(&self) -> bool {
        matches!(
            self.proj_name.as_deref().map(str::to_ascii_lowercase).as_deref(),
            Some("longlat" | "latlong" | "lonlat" | "latlon" | "identity")
        )
    }
}
