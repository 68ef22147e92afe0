//! WKT1 parsing (`GEOGCS[...]`, `PROJCS[...]`, `GEOCCS[...]`, `LOCAL_CS[...]`).
//!
//! The text is first read into a tree of bracketed nodes, then the nodes the
//! pipeline cares about are mapped onto a [`ProjDef`]. Keywords that have no
//! meaning here are ignored.

use tracing::debug;

use crate::axis::AxisOrder;
use crate::defs::{projstring, ProjDef};
use crate::error::ProjError;

const ROOT_KEYWORDS: [&str; 4] = ["PROJCS", "GEOGCS", "GEOCCS", "LOCAL_CS"];

/// Cheap check used to route a definition string to this parser.
pub fn is_wkt(input: &str) -> bool {
    ROOT_KEYWORDS.iter().any(|k| input.contains(k))
}

#[derive(Clone, Debug, PartialEq)]
enum Value {
    Text(String),
    Number(f64),
    Word(String),
    Node(Node),
}

#[derive(Clone, Debug, PartialEq)]
struct Node {
    keyword: String,
    values: Vec<Value>,
}

impl Node {
    fn name(&self) -> Option<&str> {
        match self.values.first() {
            Some(Value::Text(s)) => Some(s),
            _ => None,
        }
    }

    fn children<'a>(&'a self, keyword: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
        self.values.iter().filter_map(move |v| match v {
            Value::Node(n) if n.keyword == keyword => Some(n),
            _ => None,
        })
    }

    fn child(&self, keyword: &str) -> Option<&Node> {
        self.values.iter().find_map(|v| match v {
            Value::Node(n) if n.keyword == keyword => Some(n),
            _ => None,
        })
    }

    fn numbers(&self) -> Vec<f64> {
        self.values
            .iter()
            .filter_map(|v| match v {
                Value::Number(n) => Some(*n),
                _ => None,
            })
            .collect()
    }

    fn number(&self, idx: usize) -> Option<f64> {
        self.numbers().get(idx).copied()
    }
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn skip_ws(&mut self) {
        let trimmed = self.rest().trim_start();
        self.pos = self.src.len() - trimmed.len();
    }

    fn peek(&mut self) -> Option<char> {
        self.skip_ws();
        self.rest().chars().next()
    }

    fn error(&self, what: &str) -> ProjError {
        ProjError::MalformedWkt(format!("{what} at byte {}", self.pos))
    }

    fn word(&mut self) -> Result<String, ProjError> {
        self.skip_ws();
        let len = self
            .rest()
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(self.rest().len());
        if len == 0 {
            return Err(self.error("expected keyword"));
        }
        let word = self.rest()[..len].to_string();
        self.pos += len;
        Ok(word)
    }

    fn node(&mut self) -> Result<Node, ProjError> {
        let keyword = self.word()?.to_ascii_uppercase();
        let close = match self.peek() {
            Some('[') => ']',
            Some('(') => ')',
            _ => return Err(self.error("expected '[' or '('")),
        };
        self.pos += 1;

        let mut values = Vec::new();
        if self.peek() == Some(close) {
            self.pos += 1;
            return Ok(Node { keyword, values });
        }
        loop {
            values.push(self.value()?);
            match self.peek() {
                Some(',') => self.pos += 1,
                Some(c) if c == close => {
                    self.pos += 1;
                    return Ok(Node { keyword, values });
                }
                Some(_) => return Err(self.error("expected ',' or closing bracket")),
                None => return Err(self.error("unexpected end of input")),
            }
        }
    }

    fn value(&mut self) -> Result<Value, ProjError> {
        match self.peek() {
            Some('"') => self.text().map(Value::Text),
            Some(c) if c.is_ascii_digit() || matches!(c, '-' | '+' | '.') => {
                self.number().map(Value::Number)
            }
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {
                let start = self.pos;
                let word = self.word()?;
                if matches!(self.peek(), Some('[' | '(')) {
                    self.pos = start;
                    self.node().map(Value::Node)
                } else {
                    Ok(Value::Word(word))
                }
            }
            Some(_) => Err(self.error("unexpected character")),
            None => Err(self.error("unexpected end of input")),
        }
    }

    /// A double-quoted string; `""` inside it is a literal quote.
    fn text(&mut self) -> Result<String, ProjError> {
        self.pos += 1;
        let mut out = String::new();
        loop {
            let Some(idx) = self.rest().find('"') else {
                return Err(self.error("unterminated string"));
            };
            out.push_str(&self.rest()[..idx]);
            self.pos += idx + 1;
            if self.rest().starts_with('"') {
                out.push('"');
                self.pos += 1;
            } else {
                return Ok(out);
            }
        }
    }

    fn number(&mut self) -> Result<f64, ProjError> {
        let len = self
            .rest()
            .find(|c: char| !(c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E')))
            .unwrap_or(self.rest().len());
        let raw = &self.rest()[..len];
        let n = raw
            .parse::<f64>()
            .map_err(|_| self.error(&format!("bad number '{raw}'")))?;
        self.pos += len;
        Ok(n)
    }
}

fn parse_tree(input: &str) -> Result<Node, ProjError> {
    let mut parser = Parser::new(input);
    let root = parser.node()?;
    if parser.peek().is_some() {
        return Err(parser.error("trailing characters"));
    }
    Ok(root)
}

/// Parse a WKT1 string into a definition record.
pub fn parse(input: &str) -> Result<ProjDef, ProjError> {
    let root = parse_tree(input)?;
    if !ROOT_KEYWORDS.contains(&root.keyword.as_str()) {
        return Err(ProjError::MalformedWkt(format!(
            "unsupported root keyword {}",
            root.keyword
        )));
    }

    // An embedded PROJ string is authoritative when present.
    let proj4 = root
        .children("EXTENSION")
        .find(|ext| ext.name() == Some("PROJ4"))
        .and_then(|ext| match ext.values.get(1) {
            Some(Value::Text(s)) => Some(s.as_str()),
            _ => None,
        });
    let mut def = match proj4 {
        Some(s) => projstring::parse(s)?,
        None => map_root(&root)?,
    };
    def.title = def.title.or_else(|| root.name().map(str::to_string));
    def.srs_code = authority(&root);
    debug!(
        root = root.keyword.as_str(),
        proj = def.proj_name.as_deref(),
        "parsed WKT"
    );
    Ok(def)
}

fn authority(node: &Node) -> Option<String> {
    let auth = node.child("AUTHORITY")?;
    let name = auth.name()?;
    let code = match auth.values.get(1)? {
        Value::Text(s) => s.clone(),
        Value::Number(n) => format!("{n}"),
        _ => return None,
    };
    Some(format!("{}:{}", name.to_ascii_uppercase(), code))
}

fn map_root(root: &Node) -> Result<ProjDef, ProjError> {
    let mut def = ProjDef::default();
    match root.keyword.as_str() {
        "PROJCS" => {
            let mut angular = 1f64.to_radians();
            if let Some(geogcs) = root.child("GEOGCS") {
                angular = map_geographic(&mut def, geogcs);
            }
            def.proj_name = root
                .child("PROJECTION")
                .and_then(Node::name)
                .map(str::to_string);
            if let Some(unit) = root.child("UNIT") {
                map_linear_unit(&mut def, unit);
            }
            for param in root.children("PARAMETER") {
                map_parameter(&mut def, param, angular);
            }
            fix_projection_variants(&mut def);
        }
        "GEOGCS" => {
            def.proj_name = Some("longlat".into());
            map_geographic(&mut def, root);
        }
        "GEOCCS" => {
            def.proj_name = Some("geocent".into());
            map_geographic(&mut def, root);
            if let Some(unit) = root.child("UNIT") {
                map_linear_unit(&mut def, unit);
            }
        }
        _ => def.proj_name = Some("identity".into()),
    }
    def.axis = axis_code(root)?;
    Ok(def)
}

/// Datum, ellipsoid and prime meridian of a geographic node. Returns the
/// node's angular unit in radians.
fn map_geographic(def: &mut ProjDef, node: &Node) -> f64 {
    let angular = node
        .child("UNIT")
        .and_then(|u| u.number(0))
        .unwrap_or_else(|| 1f64.to_radians());

    if let Some(datum) = node.child("DATUM") {
        if let Some(name) = datum.name() {
            def.datum_code = Some(datum_code(name));
        }
        if let Some(spheroid) = datum.child("SPHEROID") {
            def.ellps = spheroid.name().map(str::to_string);
            def.a = spheroid.number(0);
            def.rf = spheroid.number(1);
        }
        if let Some(towgs84) = datum.child("TOWGS84") {
            let params = towgs84.numbers();
            if params.len() == 3 || params.len() == 7 {
                def.datum_params = Some(params);
            }
        }
    }
    if let Some(pm) = node.child("PRIMEM").and_then(|pm| pm.number(0)) {
        if pm != 0.0 {
            def.from_greenwich = Some(pm * angular);
        }
    }
    angular
}

fn normalize(name: &str) -> String {
    name.trim().to_ascii_lowercase().replace([' ', '-'], "_")
}

/// Map a WKT datum name onto the datum table's codes where one applies.
fn datum_code(name: &str) -> String {
    let mut code = normalize(name);
    if let Some(stripped) = code.strip_prefix("d_") {
        code = stripped.to_string();
    }
    let mapped = match code.as_str() {
        "wgs_1984" | "world_geodetic_system_1984" | "wgs84" => "wgs84",
        "north_american_datum_1983" | "nad_1983" => "nad83",
        "north_american_datum_1927" | "nad_1927" => "nad27",
        "new_zealand_1949" | "new_zealand_geodetic_datum_1949" => "nzgd49",
        "belge_1972" | "reseau_national_belge_1972" => "rnb72",
        "ch1903+" | "ch1903" => "ch1903",
        "deutsches_hauptdreiecksnetz" => "potsdam",
        "greek_geodetic_reference_system_1987" | "ggrs_1987" => "ggrs87",
        "system_jednotne_trigonometricke_site_katastralni" | "s_jtsk" => "s_jtsk",
        c if c.contains("osgb_1936") => "osgb36",
        c if c.contains("osni_1952") => "osni52",
        c if c.contains("tm65") || c.contains("geodetic_datum_of_1965") => "ire65",
        c => return c.to_string(),
    };
    mapped.to_string()
}

fn map_linear_unit(def: &mut ProjDef, unit: &Node) {
    let Some(factor) = unit.number(0) else {
        return;
    };
    let name = unit.name().map(normalize).unwrap_or_default();
    let units = match name.as_str() {
        "metre" | "meter" | "m" => "m".to_string(),
        "foot" | "international_foot" | "ft" => "ft".to_string(),
        "us_survey_foot" | "foot_us" | "us_foot" => "us-ft".to_string(),
        "kilometre" | "kilometer" | "km" => "km".to_string(),
        _ => name,
    };
    def.units = Some(units);
    def.to_meter = Some(factor);
}

fn map_parameter(def: &mut ProjDef, param: &Node, angular: f64) {
    let (Some(name), Some(value)) = (param.name(), param.number(0)) else {
        return;
    };
    let to_meter = def.to_meter.unwrap_or(1.0);
    let angle = value * angular;
    match normalize(name).as_str() {
        "false_easting" => def.x0 = Some(value * to_meter),
        "false_northing" => def.y0 = Some(value * to_meter),
        "central_meridian" | "longitude_of_origin" | "longitude_of_natural_origin" => {
            def.long0 = Some(angle)
        }
        "longitude_of_center" | "longitude_of_centre" => {
            def.long0 = Some(angle);
            def.longc = Some(angle);
        }
        "latitude_of_origin" | "latitude_of_center" | "latitude_of_centre"
        | "latitude_of_natural_origin" => def.lat0 = Some(angle),
        "standard_parallel_1" | "latitude_of_1st_point" => def.lat1 = Some(angle),
        "standard_parallel_2" | "latitude_of_2nd_point" => def.lat2 = Some(angle),
        "longitude_of_1st_point" => def.long1 = Some(angle),
        "longitude_of_2nd_point" => def.long2 = Some(angle),
        "latitude_of_true_scale" => def.lat_ts = Some(angle),
        "scale_factor" | "scale_factor_at_natural_origin" => def.k0 = Some(value),
        "azimuth" => def.alpha = Some(angle),
        "rectified_grid_angle" => def.rectified_grid_angle = Some(angle),
        other => {
            def.extra.insert(other.to_string(), format!("{value}"));
        }
    }
}

/// Parameter conventions that differ between WKT projection variants.
fn fix_projection_variants(def: &mut ProjDef) {
    let Some(name) = def.proj_name.as_deref().map(normalize) else {
        return;
    };
    let pole = |lat: f64| 90f64.to_radians().copysign(lat);

    match name.as_str() {
        "mercator_2sp" => {
            if def.lat_ts.is_none() {
                def.lat_ts = def.lat1;
            }
        }
        "mercator_auxiliary_sphere" => {
            // Always spherical on the semi-major axis, and never datum shifted.
            def.b = def.a;
            def.rf = None;
            def.datum_code = Some("none".into());
            def.datum_params = None;
        }
        "stereographic_north_pole" | "stereographic_south_pole" | "polar_stereographic_(variant_b)" => {
            if let (None, Some(lat1)) = (def.lat_ts, def.lat1) {
                def.lat_ts = Some(lat1);
                def.lat0 = Some(pole(lat1));
            }
        }
        "polar_stereographic" => {
            if let (None, Some(lat0)) = (def.lat_ts, def.lat0) {
                if (lat0.abs() - 90f64.to_radians()).abs() > 1e-10 {
                    def.lat_ts = Some(lat0);
                    def.lat0 = Some(pole(lat0));
                }
            }
        }
        "hotine_oblique_mercator" | "hotine_oblique_mercator_azimuth_natural_origin" => {
            def.no_off = true;
        }
        _ => {}
    }
}

fn axis_code(root: &Node) -> Result<Option<String>, ProjError> {
    let mut code = String::new();
    for axis in root.children("AXIS") {
        let dir = match axis.values.get(1) {
            Some(Value::Word(w)) | Some(Value::Text(w)) => w.to_ascii_lowercase(),
            _ => return Ok(None),
        };
        match dir.as_str() {
            "east" | "west" | "north" | "south" | "up" | "down" => code.push_str(&dir[..1]),
            _ => return Ok(None),
        }
    }
    if code.is_empty() {
        return Ok(None);
    }
    if code.len() == 2 {
        code.push('u');
    }
    AxisOrder::parse(&code)?;
    Ok(Some(code))
}
