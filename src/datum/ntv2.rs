//! NTv2 (`.gsb`) grid decoding.
//!
//! A file is an overview header followed by subgrids. Every header record
//! is 16 bytes: an 8-byte label and an 8-byte value. Angles are stored in
//! arc-seconds with longitudes positive west.

use std::io::Cursor;

use byteorder::{BigEndian, LittleEndian, ReadBytesExt};
use tracing::debug;

use crate::datum::gridshift::{GridShiftTable, Subgrid};
use crate::error::ProjError;
use crate::proj::common::SEC_TO_RAD;

const HEADER_LEN: usize = 176;
const NODE_LEN: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Endian {
    Little,
    Big,
}

/// Offset-addressed reads in the file's byte order.
struct Reader<'a> {
    bytes: &'a [u8],
    endian: Endian,
}

impl<'a> Reader<'a> {
    /// The first record's value is the overview record count, 11.
    fn detect(bytes: &'a [u8]) -> Result<Self, ProjError> {
        if bytes.len() < HEADER_LEN {
            return Err(ProjError::InvalidGrid(format!(
                "NTv2 file is {} bytes, shorter than its header",
                bytes.len()
            )));
        }
        let mut reader = Self {
            bytes,
            endian: Endian::Little,
        };
        if reader.i32_at(8)? != 11 {
            reader.endian = Endian::Big;
            if reader.i32_at(8)? != 11 {
                return Err(ProjError::InvalidGrid("not an NTv2 file".into()));
            }
        }
        Ok(reader)
    }

    fn cursor(&self, offset: usize, len: usize) -> Result<Cursor<&'a [u8]>, ProjError> {
        let slice = offset
            .checked_add(len)
            .and_then(|end| self.bytes.get(offset..end))
            .ok_or_else(|| ProjError::InvalidGrid(format!("NTv2 file truncated at byte {offset}")))?;
        Ok(Cursor::new(slice))
    }

    fn i32_at(&self, offset: usize) -> Result<i32, ProjError> {
        let mut c = self.cursor(offset, 4)?;
        match self.endian {
            Endian::Little => c.read_i32::<LittleEndian>(),
            Endian::Big => c.read_i32::<BigEndian>(),
        }
        .map_err(|e| ProjError::InvalidGrid(e.to_string()))
    }

    fn f64_at(&self, offset: usize) -> Result<f64, ProjError> {
        let mut c = self.cursor(offset, 8)?;
        match self.endian {
            Endian::Little => c.read_f64::<LittleEndian>(),
            Endian::Big => c.read_f64::<BigEndian>(),
        }
        .map_err(|e| ProjError::InvalidGrid(e.to_string()))
    }

    fn f32_at(&self, offset: usize) -> Result<f32, ProjError> {
        let mut c = self.cursor(offset, 4)?;
        match self.endian {
            Endian::Little => c.read_f32::<LittleEndian>(),
            Endian::Big => c.read_f32::<BigEndian>(),
        }
        .map_err(|e| ProjError::InvalidGrid(e.to_string()))
    }

    fn label_at(&self, offset: usize) -> Result<String, ProjError> {
        let c = self.cursor(offset, 8)?;
        Ok(String::from_utf8_lossy(c.into_inner()).trim_end_matches(['\0', ' ']).to_string())
    }
}

/// Decode an NTv2 file held in memory.
pub fn decode(bytes: &[u8]) -> Result<GridShiftTable, ProjError> {
    let reader = Reader::detect(bytes)?;
    let declared = reader.i32_at(40)?;
    // Each subgrid needs at least its own header after the overview.
    let room = (bytes.len() - HEADER_LEN) / HEADER_LEN;
    let count = usize::try_from(declared)
        .ok()
        .filter(|&count| count > 0 && count <= room)
        .ok_or_else(|| {
            ProjError::InvalidGrid(format!(
                "NTv2 file declares {declared} subgrids but has room for {room}"
            ))
        })?;

    let mut subgrids = Vec::with_capacity(count);
    let mut offset = HEADER_LEN;
    for _ in 0..count {
        let (subgrid, len) = decode_subgrid(&reader, offset)?;
        offset = offset
            .checked_add(len)
            .ok_or_else(|| ProjError::InvalidGrid("NTv2 subgrid offsets overflow".into()))?;
        subgrids.push(subgrid);
    }
    debug!(
        subgrids = subgrids.len(),
        endian = ?reader.endian,
        "decoded NTv2 grid"
    );
    GridShiftTable::new(subgrids)
}

fn decode_subgrid(reader: &Reader, offset: usize) -> Result<(Subgrid, usize), ProjError> {
    let name = reader.label_at(offset + 8)?;
    let parent = reader.label_at(offset + 24)?;
    let lower_lat = reader.f64_at(offset + 72)?;
    let upper_lat = reader.f64_at(offset + 88)?;
    let lower_lon = reader.f64_at(offset + 104)?;
    let upper_lon = reader.f64_at(offset + 120)?;
    let lat_inc = reader.f64_at(offset + 136)?;
    let lon_inc = reader.f64_at(offset + 152)?;
    let node_count = reader.i32_at(offset + 168)?;

    let lim = [
        axis_nodes(&name, lower_lon, upper_lon, lon_inc)?,
        axis_nodes(&name, lower_lat, upper_lat, lat_inc)?,
    ];
    let node_count = usize::try_from(node_count)
        .map_err(|_| ProjError::InvalidGrid(format!("subgrid {name} has a negative node count")))?;
    if lim[0].checked_mul(lim[1]) != Some(node_count) {
        return Err(ProjError::InvalidGrid(format!(
            "subgrid {name} holds {node_count} nodes but spans {}x{}",
            lim[0], lim[1]
        )));
    }
    let len = node_count
        .checked_mul(NODE_LEN)
        .and_then(|nodes| nodes.checked_add(HEADER_LEN))
        .filter(|&len| offset.checked_add(len).is_some_and(|end| end <= reader.bytes.len()))
        .ok_or_else(|| {
            ProjError::InvalidGrid(format!("subgrid {name} runs past the end of the file"))
        })?;

    let nodes_start = offset + HEADER_LEN;
    let cvs = (0..node_count)
        .map(|i| {
            let at = nodes_start + i * NODE_LEN;
            let lat_shift = reader.f32_at(at)? as f64;
            let lon_shift = reader.f32_at(at + 4)? as f64;
            Ok([lon_shift * SEC_TO_RAD, lat_shift * SEC_TO_RAD])
        })
        .collect::<Result<Vec<_>, ProjError>>()?;

    let subgrid = Subgrid::new(
        name,
        [lower_lon * SEC_TO_RAD, lower_lat * SEC_TO_RAD],
        [lon_inc * SEC_TO_RAD, lat_inc * SEC_TO_RAD],
        lim,
        cvs,
    )?;
    let subgrid = if parent.is_empty() || parent.eq_ignore_ascii_case("NONE") {
        subgrid
    } else {
        subgrid.with_parent(parent)
    };
    Ok((subgrid, len))
}

/// Node count along one axis, from the subgrid bounds and increment.
fn axis_nodes(name: &str, lower: f64, upper: f64, inc: f64) -> Result<usize, ProjError> {
    let steps = ((upper - lower).abs() / inc).round();
    if !(inc.is_finite() && inc > 0.0 && steps.is_finite() && steps < f64::from(u32::MAX)) {
        return Err(ProjError::InvalidGrid(format!(
            "subgrid {name} has an unusable extent or increment"
        )));
    }
    Ok(steps as usize + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn record(buf: &mut Vec<u8>, label: &str, value: [u8; 8]) {
        let mut l = [b' '; 8];
        l[..label.len()].copy_from_slice(label.as_bytes());
        buf.extend_from_slice(&l);
        buf.extend_from_slice(&value);
    }

    fn int(v: i32, big: bool) -> [u8; 8] {
        let mut out = [0u8; 8];
        let b = if big { v.to_be_bytes() } else { v.to_le_bytes() };
        out[..4].copy_from_slice(&b);
        out
    }

    fn float(v: f64, big: bool) -> [u8; 8] {
        if big {
            v.to_be_bytes()
        } else {
            v.to_le_bytes()
        }
    }

    fn text(s: &str) -> [u8; 8] {
        let mut out = [b' '; 8];
        out[..s.len()].copy_from_slice(s.as_bytes());
        out
    }

    /// One 3x2 subgrid over 10°W..12°W and 50°N..51°N in one-degree steps.
    fn sample(big: bool) -> Vec<u8> {
        let mut buf = Vec::new();
        record(&mut buf, "NUM_OREC", int(11, big));
        record(&mut buf, "NUM_SREC", int(11, big));
        record(&mut buf, "NUM_FILE", int(1, big));
        record(&mut buf, "GS_TYPE", text("SECONDS"));
        record(&mut buf, "VERSION", text("NTv2.0"));
        record(&mut buf, "SYSTEM_F", text("TEST"));
        record(&mut buf, "SYSTEM_T", text("WGS84"));
        record(&mut buf, "MAJOR_F", float(6_378_206.4, big));
        record(&mut buf, "MINOR_F", float(6_356_583.8, big));
        record(&mut buf, "MAJOR_T", float(6_378_137.0, big));
        record(&mut buf, "MINOR_T", float(6_356_752.314, big));

        record(&mut buf, "SUB_NAME", text("ALL"));
        record(&mut buf, "PARENT", text("NONE"));
        record(&mut buf, "CREATED", text("20240101"));
        record(&mut buf, "UPDATED", text("20240101"));
        record(&mut buf, "S_LAT", float(180_000.0, big));
        record(&mut buf, "N_LAT", float(183_600.0, big));
        record(&mut buf, "E_LONG", float(36_000.0, big));
        record(&mut buf, "W_LONG", float(43_200.0, big));
        record(&mut buf, "LAT_INC", float(3_600.0, big));
        record(&mut buf, "LONG_INC", float(3_600.0, big));
        record(&mut buf, "GS_COUNT", int(6, big));
        for i in 0..6 {
            let lat_shift = i as f32 * 0.5;
            let lon_shift = -(i as f32);
            for v in [lat_shift, lon_shift, 0.0, 0.0] {
                let b = if big { v.to_be_bytes() } else { v.to_le_bytes() };
                buf.extend_from_slice(&b);
            }
        }
        buf
    }

    #[test]
    fn test_decode_little_endian() {
        let table = decode(&sample(false)).unwrap();
        let sub = &table.subgrids()[0];
        assert_eq!(sub.name(), "ALL");
        assert_eq!(sub.lim(), [3, 2]);
        assert_relative_eq!(sub.ll()[0], 10f64.to_radians(), epsilon = 1e-12);
        assert_relative_eq!(sub.ll()[1], 50f64.to_radians(), epsilon = 1e-12);
        assert_relative_eq!(sub.del()[0], 1f64.to_radians(), epsilon = 1e-12);
        assert_relative_eq!(sub.cvs()[5][0], -5.0 * SEC_TO_RAD, epsilon = 1e-15);
        assert_relative_eq!(sub.cvs()[5][1], 2.5 * SEC_TO_RAD, epsilon = 1e-15);
    }

    #[test]
    fn test_decode_big_endian_matches() {
        assert_eq!(decode(&sample(true)).unwrap(), decode(&sample(false)).unwrap());
    }

    #[test]
    fn test_truncated_file() {
        let mut bytes = sample(false);
        bytes.truncate(bytes.len() - NODE_LEN);
        assert!(matches!(decode(&bytes), Err(ProjError::InvalidGrid(_))));
        assert!(matches!(decode(&bytes[..100]), Err(ProjError::InvalidGrid(_))));
    }

    fn patch(bytes: &mut [u8], at: usize, value: [u8; 8]) {
        bytes[at..at + 8].copy_from_slice(&value);
    }

    #[test]
    fn test_subgrid_count_beyond_file_rejected() {
        let mut bytes = sample(false);
        patch(&mut bytes, 40, int(i32::MAX, false));
        assert!(matches!(decode(&bytes), Err(ProjError::InvalidGrid(_))));
        patch(&mut bytes, 40, int(2, false));
        assert!(matches!(decode(&bytes), Err(ProjError::InvalidGrid(_))));
        patch(&mut bytes, 40, int(-1, false));
        assert!(matches!(decode(&bytes), Err(ProjError::InvalidGrid(_))));
    }

    #[test]
    fn test_degenerate_increments_rejected() {
        const LAT_INC: usize = HEADER_LEN + 136;
        const LONG_INC: usize = HEADER_LEN + 152;
        for inc in [1e-300, 0.0, -3600.0, f64::NAN, f64::INFINITY] {
            let mut bytes = sample(true);
            patch(&mut bytes, LAT_INC, float(inc, true));
            patch(&mut bytes, LONG_INC, float(inc, true));
            assert!(matches!(decode(&bytes), Err(ProjError::InvalidGrid(_))), "increment {inc}");
        }
    }

    #[test]
    fn test_node_count_past_end_rejected() {
        // A finer lattice that agrees with GS_COUNT but not with the file size.
        let mut bytes = sample(false);
        patch(&mut bytes, HEADER_LEN + 136, float(1.0, false));
        patch(&mut bytes, HEADER_LEN + 152, float(1.0, false));
        patch(&mut bytes, HEADER_LEN + 168, int(7201 * 3601, false));
        assert!(matches!(decode(&bytes), Err(ProjError::InvalidGrid(_))));
    }

    #[test]
    fn test_not_ntv2() {
        assert!(matches!(decode(&[0u8; 400]), Err(ProjError::InvalidGrid(_))));
    }
}
