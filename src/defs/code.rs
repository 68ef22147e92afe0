//! Authority code normalization.
//!
//! All the spellings below reduce to `AUTH:CODE` with an upper-case
//! authority, the key definitions are registered under:
//!
//! * `EPSG:4326`, `epsg:4326`, `ESRI:102100`, `IAU2000:49900`
//! * `urn:ogc:def:crs:EPSG::4326`, `urn:ogc:def:crs:EPSG:9.8.15:4326`
//! * `http://www.opengis.net/def/crs/EPSG/0/4326` (and `https`)
//! * `http://www.opengis.net/gml/srs/epsg.xml#4326`
//! * `CRS:84`, `urn:ogc:def:crs:OGC:1.3:CRS84`, `OGC:CRS84`

const CRS84: &str = "OGC:CRS84";

/// Normalize an authority code, or `None` when `input` is not one.
pub fn normalize(input: &str) -> Option<String> {
    let s = input.trim();
    if s.is_empty() || s.contains(char::is_whitespace) || s.starts_with('+') {
        return None;
    }
    let lower = s.to_ascii_lowercase();

    if lower == "crs:84" || lower == "ogc:crs84" || lower == "crs84" {
        return Some(CRS84.into());
    }

    if lower.starts_with("urn:ogc:def:crs:") {
        // urn:ogc:def:crs:{authority}:{version}:{code}, version may be empty
        let rest = &s["urn:ogc:def:crs:".len()..];
        let parts: Vec<&str> = rest.split(':').collect();
        return match parts.as_slice() {
            [auth, _, code] | [auth, code] => join(auth, code),
            _ => None,
        };
    }

    if let Some(idx) = lower.find("/def/crs/") {
        // .../def/crs/{authority}/{version}/{code}
        let rest = &s[idx + "/def/crs/".len()..];
        let parts: Vec<&str> = rest.trim_end_matches('/').split('/').collect();
        return match parts.as_slice() {
            [auth, _, code] | [auth, code] => join(auth, code),
            _ => None,
        };
    }

    if lower.contains("/gml/srs/epsg.xml#") {
        let code = s.rsplit('#').next()?;
        return join("EPSG", code);
    }

    let (auth, code) = s.split_once(':')?;
    join(auth, code)
}

fn join(auth: &str, code: &str) -> Option<String> {
    let auth = auth.trim();
    let code = code.trim();
    if auth.is_empty()
        || code.is_empty()
        || !auth.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        || !code.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
    {
        return None;
    }
    if auth.eq_ignore_ascii_case("ogc") && code.eq_ignore_ascii_case("crs84") {
        return Some(CRS84.into());
    }
    Some(format!("{}:{}", auth.to_ascii_uppercase(), code.to_ascii_uppercase()))
}
