//! The registry every parse and transform goes through.
//!
//! A [`Context`] owns the known definitions (by authority code or alias),
//! the registered grid-shift tables and the error-reporting hook. There is
//! no process-wide state: two contexts never see each other's registrations.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, error};

use crate::crs::Crs;
use crate::datum::gridshift::{GridCatalog, GridShiftTable};
use crate::datum::ntv2;
use crate::defs::{code, projstring, wkt, ProjDef};
use crate::error::ProjError;
use crate::point::Point;
use crate::transform::{self, Converter};

type ErrorReporter = Arc<dyn Fn(&str) + Send + Sync>;

pub struct Context {
    defs: HashMap<String, ProjDef>,
    grids: GridCatalog,
    reporter: ErrorReporter,
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("defs", &self.defs.len())
            .field("grids", &self.grids.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Registry key: a normalized authority code, or the upper-cased alias.
fn key(name: &str) -> String {
    code::normalize(name).unwrap_or_else(|| name.trim().to_ascii_uppercase())
}

fn geographic(title: &str, datum: &str, ellps: &str) -> ProjDef {
    ProjDef {
        proj_name: Some("longlat".into()),
        title: Some(title.into()),
        datum_code: Some(datum.into()),
        ellps: Some(ellps.into()),
        units: Some("degrees".into()),
        ..Default::default()
    }
}

fn web_mercator() -> ProjDef {
    ProjDef {
        proj_name: Some("merc".into()),
        title: Some("WGS 84 / Pseudo-Mercator".into()),
        datum_code: Some("none".into()),
        a: Some(6_378_137.0),
        b: Some(6_378_137.0),
        lat_ts: Some(0.0),
        long0: Some(0.0),
        x0: Some(0.0),
        y0: Some(0.0),
        k0: Some(1.0),
        units: Some("m".into()),
        ..Default::default()
    }
}

fn wgs84_utm(zone: i32, south: bool) -> ProjDef {
    let hemisphere = if south { 'S' } else { 'N' };
    ProjDef {
        proj_name: Some("utm".into()),
        title: Some(format!("WGS 84 / UTM zone {zone}{hemisphere}")),
        datum_code: Some("wgs84".into()),
        ellps: Some("WGS84".into()),
        zone: Some(zone),
        utm_south: south,
        units: Some("m".into()),
        ..Default::default()
    }
}

impl Context {
    /// A context with the built-in definitions: WGS84 geographic
    /// (`WGS84`, `EPSG:4326`, `OGC:CRS84`), NAD83 geographic (`EPSG:4269`),
    /// Web Mercator (`EPSG:3857` and its historical aliases) and the WGS84
    /// UTM zones (`EPSG:32601`..`32660`, `EPSG:32701`..`32760`).
    pub fn new() -> Self {
        let mut ctx = Self::empty();
        let wgs84 = geographic("WGS 84 (long/lat)", "wgs84", "WGS84");
        for name in ["WGS84", "EPSG:4326", "OGC:CRS84"] {
            ctx.define_params(name, wgs84.clone());
        }
        ctx.define_params("EPSG:4269", geographic("NAD83 (long/lat)", "nad83", "GRS80"));
        for name in ["EPSG:3857", "EPSG:3785", "EPSG:900913", "EPSG:102113", "GOOGLE"] {
            ctx.define_params(name, web_mercator());
        }
        for zone in 1..=60 {
            ctx.define_params(&format!("EPSG:{}", 32600 + zone), wgs84_utm(zone, false));
            ctx.define_params(&format!("EPSG:{}", 32700 + zone), wgs84_utm(zone, true));
        }
        ctx
    }

    /// A context with no definitions and no grids.
    pub fn empty() -> Self {
        Self {
            defs: HashMap::new(),
            grids: GridCatalog::new(),
            reporter: Arc::new(|message: &str| error!("{message}")),
        }
    }

    /// Register a PROJ string or WKT definition under `name`.
    pub fn define(&mut self, name: &str, definition: &str) -> Result<(), ProjError> {
        let def = self.report(self.parse_def(definition))?;
        self.define_params(name, def);
        Ok(())
    }

    /// Register an already parsed definition under `name`.
    pub fn define_params(&mut self, name: &str, mut def: ProjDef) {
        let key = key(name);
        def.srs_code.get_or_insert_with(|| key.clone());
        debug!(code = key.as_str(), proj = def.proj_name.as_deref(), "registered definition");
        self.defs.insert(key, def);
    }

    /// The registered definition for a code or alias.
    pub fn lookup(&self, name: &str) -> Option<&ProjDef> {
        self.defs.get(&key(name))
    }

    /// Register a grid table for `+nadgrids` references. Only CRSs parsed
    /// after registration see the grid.
    pub fn add_grid(&mut self, name: &str, table: GridShiftTable) {
        debug!(grid = name, subgrids = table.subgrids().len(), "registered grid");
        self.grids.insert(name.to_string(), Arc::new(table));
    }

    /// Decode an NTv2 file and register it under `name`.
    pub fn load_ntv2(&mut self, name: &str, bytes: &[u8]) -> Result<(), ProjError> {
        let table = self.report(ntv2::decode(bytes))?;
        self.add_grid(name, table);
        Ok(())
    }

    pub fn grid(&self, name: &str) -> Option<&Arc<GridShiftTable>> {
        self.grids.get(name)
    }

    /// Replace the hook every failure is reported to before it is returned.
    pub fn set_error_reporter<F>(&mut self, reporter: F)
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.reporter = Arc::new(reporter);
    }

    /// Parse a WKT string, a PROJ string or a registered code into a CRS.
    pub fn parse(&self, definition: &str) -> Result<Crs, ProjError> {
        self.report(
            self.parse_def(definition)
                .and_then(|def| Crs::from_def(def, &self.grids)),
        )
    }

    /// Build a CRS from key/value pairs, keyed like PROJ string parameters.
    pub fn parse_object<'a, I>(&self, pairs: I) -> Result<Crs, ProjError>
    where
        I: IntoIterator<Item = (&'a str, Option<&'a str>)>,
    {
        self.report(projstring::from_pairs(pairs).and_then(|def| Crs::from_def(def, &self.grids)))
    }

    /// Transform one point between two parsed CRSs.
    pub fn transform(&self, source: &Crs, dest: &Crs, point: Point) -> Result<Point, ProjError> {
        self.report(transform::transform(source, dest, point))
    }

    /// Bind a source/destination pair for repeated use.
    pub fn converter(&self, source: &str, dest: &str) -> Result<Converter<'_>, ProjError> {
        let source = self.parse(source)?;
        let dest = self.parse(dest)?;
        Ok(Converter::new(self, source, dest))
    }

    fn parse_def(&self, definition: &str) -> Result<ProjDef, ProjError> {
        let s = definition.trim();
        if wkt::is_wkt(s) {
            return wkt::parse(s);
        }
        if s.starts_with('+') || s.contains('=') {
            return projstring::parse(s);
        }
        self.lookup(s)
            .cloned()
            .ok_or_else(|| ProjError::UnknownCrs(s.to_string()))
    }

    fn report<T>(&self, result: Result<T, ProjError>) -> Result<T, ProjError> {
        if let Err(e) = &result {
            (self.reporter)(&e.to_string());
        }
        result
    }
}
