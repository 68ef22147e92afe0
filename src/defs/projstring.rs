//! PROJ string parsing (`+proj=tmerc +lat_0=49 ...`).

use tracing::debug;

use crate::axis::AxisOrder;
use crate::defs::constants;
use crate::defs::ProjDef;
use crate::error::ProjError;

/// Parse a PROJ string into a definition record.
///
/// Keys are case-insensitive. A key without `=` is a flag. Keys no handler
/// recognizes are kept verbatim in [`ProjDef::extra`].
pub fn parse(definition: &str) -> Result<ProjDef, ProjError> {
    let mut def = ProjDef::default();
    for token in definition.split('+').map(str::trim).filter(|t| !t.is_empty()) {
        let (key, value) = match token.split_once('=') {
            Some((k, v)) => (k.trim(), Some(v.trim())),
            None => (token, None),
        };
        apply_param(&mut def, &key.to_ascii_lowercase(), value)?;
    }
    finish(&mut def);
    debug!(proj = def.proj_name.as_deref(), "parsed PROJ string");
    Ok(def)
}

/// Build a definition from already split key/value pairs, applying the same
/// key handlers as [`parse`]. Values may be `None` for flags.
pub fn from_pairs<'a, I>(pairs: I) -> Result<ProjDef, ProjError>
where
    I: IntoIterator<Item = (&'a str, Option<&'a str>)>,
{
    let mut def = ProjDef::default();
    for (key, value) in pairs {
        apply_param(&mut def, &key.trim().to_ascii_lowercase(), value.map(str::trim))?;
    }
    finish(&mut def);
    Ok(def)
}

/// `+nadgrids=@null` disables the datum whatever order it appears in.
fn finish(def: &mut ProjDef) {
    if def.nadgrids.as_deref() == Some("@null") {
        def.nadgrids = None;
        def.datum_code = Some("none".into());
    }
    if let Some(code) = def.datum_code.as_mut() {
        code.make_ascii_lowercase();
    }
}

fn number(key: &str, value: Option<&str>) -> Result<f64, ProjError> {
    let raw = value.ok_or_else(|| ProjError::InvalidParameter(format!("+{key} needs a value")))?;
    raw.parse::<f64>()
        .map_err(|_| ProjError::InvalidParameter(format!("+{key}={raw} is not a number")))
}

fn degrees(key: &str, value: Option<&str>) -> Result<f64, ProjError> {
    Ok(number(key, value)?.to_radians())
}

fn text(key: &str, value: Option<&str>) -> Result<String, ProjError> {
    value
        .map(str::to_string)
        .ok_or_else(|| ProjError::InvalidParameter(format!("+{key} needs a value")))
}

/// A flag is set by its bare presence; an explicit value must not be
/// `false` or `0`.
fn flag(value: Option<&str>) -> bool {
    !matches!(value.map(str::to_ascii_lowercase).as_deref(), Some("false" | "0"))
}

/// Apply a single lower-cased key to the record.
pub(crate) fn apply_param(
    def: &mut ProjDef,
    key: &str,
    value: Option<&str>,
) -> Result<(), ProjError> {
    match key {
        "proj" => def.proj_name = Some(text(key, value)?),
        "title" => def.title = Some(text(key, value)?),
        "datum" => def.datum_code = Some(text(key, value)?),
        "ellps" => def.ellps = Some(text(key, value)?),
        "a" => def.a = Some(number(key, value)?),
        "b" => def.b = Some(number(key, value)?),
        "rf" => def.rf = Some(number(key, value)?),
        "r" => {
            let r = number(key, value)?;
            def.a = Some(r);
            def.b = Some(r);
        }
        "r_a" => def.r_a = flag(value),
        "lat_0" => def.lat0 = Some(degrees(key, value)?),
        "lat_1" => def.lat1 = Some(degrees(key, value)?),
        "lat_2" => def.lat2 = Some(degrees(key, value)?),
        "lat_ts" => def.lat_ts = Some(degrees(key, value)?),
        "lon_0" => def.long0 = Some(degrees(key, value)?),
        "lon_1" => def.long1 = Some(degrees(key, value)?),
        "lon_2" => def.long2 = Some(degrees(key, value)?),
        "lonc" => def.longc = Some(degrees(key, value)?),
        "alpha" => def.alpha = Some(degrees(key, value)?),
        "gamma" => def.rectified_grid_angle = Some(degrees(key, value)?),
        "x_0" => def.x0 = Some(number(key, value)?),
        "y_0" => def.y0 = Some(number(key, value)?),
        "k" | "k_0" => def.k0 = Some(number(key, value)?),
        "zone" => {
            let raw = text(key, value)?;
            let zone = raw
                .parse::<i32>()
                .map_err(|_| ProjError::InvalidParameter(format!("+zone={raw} is not an integer")))?;
            def.zone = Some(zone);
        }
        "south" => def.utm_south = flag(value),
        "towgs84" => {
            let raw = text(key, value)?;
            let params = raw
                .split(',')
                .map(|v| {
                    v.trim().parse::<f64>().map_err(|_| {
                        ProjError::InvalidParameter(format!("+towgs84={raw} is not a number list"))
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            if params.len() != 3 && params.len() != 7 {
                return Err(ProjError::InvalidParameter(format!(
                    "+towgs84 takes 3 or 7 values, got {}",
                    params.len()
                )));
            }
            def.datum_params = Some(params);
        }
        "to_meter" => def.to_meter = Some(number(key, value)?),
        "units" => {
            let units = text(key, value)?;
            if let Some(to_meter) = constants::unit_to_meter(&units) {
                def.to_meter = Some(to_meter);
            }
            def.units = Some(units);
        }
        "from_greenwich" => def.from_greenwich = Some(degrees(key, value)?),
        "pm" => {
            let raw = text(key, value)?;
            let deg = match constants::prime_meridian(&raw) {
                Some(deg) => deg,
                None => raw.parse::<f64>().map_err(|_| {
                    ProjError::InvalidParameter(format!("unknown prime meridian '{raw}'"))
                })?,
            };
            def.from_greenwich = Some(deg.to_radians());
        }
        "nadgrids" => def.nadgrids = Some(text(key, value)?),
        "axis" => {
            let raw = text(key, value)?;
            AxisOrder::parse(&raw)?;
            def.axis = Some(raw.to_ascii_lowercase());
        }
        "no_off" | "no_uoff" => def.no_off = flag(value),
        "no_rot" => def.no_rot = flag(value),
        "czech" => def.czech = flag(value),
        _ => {
            def.extra
                .insert(key.to_string(), value.unwrap_or_default().to_string());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_utm_definition() {
        let def = parse("+proj=utm +zone=33 +south +datum=WGS84 +units=m +no_defs").unwrap();
        assert_eq!(def.proj_name.as_deref(), Some("utm"));
        assert_eq!(def.zone, Some(33));
        assert!(def.utm_south);
        assert_eq!(def.datum_code.as_deref(), Some("wgs84"));
        assert_eq!(def.to_meter, Some(1.0));
        assert_eq!(def.extra.get("no_defs").map(String::as_str), Some(""));
    }

    #[test]
    fn test_angles_are_radians() {
        let def = parse("+proj=lcc +lat_1=33 +lat_2=45 +lat_0=39 +lon_0=-96").unwrap();
        assert_relative_eq!(def.lat1.unwrap(), 33f64.to_radians());
        assert_relative_eq!(def.lat2.unwrap(), 45f64.to_radians());
        assert_relative_eq!(def.lat0.unwrap(), 39f64.to_radians());
        assert_relative_eq!(def.long0.unwrap(), (-96f64).to_radians());
    }

    #[test]
    fn test_keys_are_case_insensitive() {
        let def = parse("+PROJ=merc +R=6378137 +R_A").unwrap();
        assert_eq!(def.proj_name.as_deref(), Some("merc"));
        assert_eq!(def.a, Some(6_378_137.0));
        assert_eq!(def.b, Some(6_378_137.0));
        assert!(def.r_a);
    }

    #[test]
    fn test_towgs84_list() {
        let def = parse("+proj=longlat +ellps=airy +towgs84=446.448,-125.157,542.06,0.15,0.247,0.842,-20.489").unwrap();
        assert_eq!(def.datum_params.as_ref().map(Vec::len), Some(7));
        assert!(parse("+towgs84=1,2").is_err());
        assert!(parse("+towgs84=1,x,3").is_err());
    }

    #[test]
    fn test_null_grid_disables_datum() {
        let def = parse("+proj=merc +a=6378137 +b=6378137 +nadgrids=@null +wktext").unwrap();
        assert_eq!(def.datum_code.as_deref(), Some("none"));
        assert!(def.nadgrids.is_none());

        let def = parse("+proj=longlat +ellps=clrk66 +nadgrids=@conus,ntv1_can.dat").unwrap();
        assert_eq!(def.nadgrids.as_deref(), Some("@conus,ntv1_can.dat"));
    }

    #[test]
    fn test_null_grid_wins_over_datum_in_any_order() {
        for definition in [
            "+proj=longlat +datum=WGS84 +nadgrids=@null",
            "+proj=longlat +nadgrids=@null +datum=WGS84",
        ] {
            let def = parse(definition).unwrap();
            assert_eq!(def.datum_code.as_deref(), Some("none"), "{definition}");
            assert!(def.nadgrids.is_none());
        }
        let def = from_pairs([("nadgrids", Some("@null")), ("datum", Some("NAD27"))]).unwrap();
        assert_eq!(def.datum_code.as_deref(), Some("none"));
    }

    #[test]
    fn test_prime_meridian_by_name_or_degrees() {
        let def = parse("+proj=longlat +pm=paris").unwrap();
        assert_relative_eq!(def.from_greenwich.unwrap(), 2.337_229_166_667f64.to_radians());
        let def = parse("+proj=longlat +pm=-17.6666666667").unwrap();
        assert_relative_eq!(def.from_greenwich.unwrap(), (-17.6666666667f64).to_radians());
        assert!(parse("+pm=atlantis").is_err());
    }

    #[test]
    fn test_units_set_to_meter() {
        let def = parse("+proj=tmerc +units=us-ft").unwrap();
        assert_relative_eq!(def.to_meter.unwrap(), 1200.0 / 3937.0);
        let def = parse("+proj=tmerc +to_meter=0.3048").unwrap();
        assert_eq!(def.to_meter, Some(0.3048));
    }

    #[test]
    fn test_axis_validated() {
        let def = parse("+proj=longlat +axis=neu").unwrap();
        assert_eq!(def.axis.as_deref(), Some("neu"));
        assert_eq!(
            parse("+proj=longlat +axis=enx").unwrap_err(),
            ProjError::InvalidAxis("enx".into())
        );
    }

    #[test]
    fn test_bad_number_is_definition_error() {
        let err = parse("+proj=tmerc +lat_0=north").unwrap_err();
        assert!(matches!(err, ProjError::InvalidParameter(_)));
        assert!(parse("+proj=tmerc +k").is_err());
    }

    #[test]
    fn test_unknown_keys_kept() {
        let def = parse("+proj=tmerc +foo=Bar").unwrap();
        assert_eq!(def.extra.get("foo").map(String::as_str), Some("Bar"));
    }

    #[test]
    fn test_omerc_flags() {
        let def = parse("+proj=omerc +no_uoff +no_rot +gamma=10").unwrap();
        assert!(def.no_off && def.no_rot);
        assert_relative_eq!(def.rectified_grid_angle.unwrap(), 10f64.to_radians());
    }

    #[test]
    fn test_from_pairs() {
        let def = from_pairs([("proj", Some("merc")), ("lat_ts", Some("30")), ("south", None)]).unwrap();
        assert_eq!(def.proj_name.as_deref(), Some("merc"));
        assert_relative_eq!(def.lat_ts.unwrap(), 30f64.to_radians());
        assert!(def.utm_south);
    }
}
