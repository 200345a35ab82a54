//! LIST/INFO chunk decoder: the public, textual half of the metadata.

use byteorder::{LittleEndian, ReadBytesExt};
use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use log::trace;
use std::io::Read;

use crate::errors::DecodeError;
use crate::fields::null_term_str;
use crate::model::ListChunk;

/// The scanner writes ICRD as local wall clock, e.g. "20200620223802".
const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Decodes a fully-read LIST payload. A subtype other than INFO (adtl and
/// friends) yields an empty ListChunk; the only fatal conditions are a tag
/// payload overrunning the chunk and a malformed ICRD timestamp.
pub fn decode_list_chunk(payload: &[u8]) -> Result<ListChunk, DecodeError> {
    let mut rec = ListChunk::default();

    if payload.len() < 4 || &payload[0..4] != b"INFO" {
        trace!("LIST subtype is not INFO, ignoring");
        return Ok(rec);
    }

    let mut rest = &payload[4..];
    loop {
        // Sub-header: 4-byte id, little-endian u32 size. Running out of
        // bytes here just ends the tag list.
        let mut id = [0u8; 4];
        if rest.read_exact(&mut id).is_err() {
            break;
        }
        let size = match rest.read_u32::<LittleEndian>() {
            Ok(s) => s as usize,
            Err(_) => break,
        };
        if size > rest.len() {
            return Err(DecodeError::MalformedListChunk(format!(
                "tag {} declares {} bytes but only {} remain",
                String::from_utf8_lossy(&id),
                size,
                rest.len()
            )));
        }
        let (value, tail) = rest.split_at(size);
        rest = tail;

        match &id {
            b"IART" => rec.system = null_term_str(value),
            b"IGNR" => rec.department = null_term_str(value),
            b"INAM" => rec.channel = null_term_str(value),
            b"ICMT" => rec.tgid_or_freq = null_term_str(value),
            b"IPRD" => rec.product = null_term_str(value),
            b"IKEY" => rec.unknown = null_term_str(value),
            b"ICRD" => rec.timestamp = Some(parse_timestamp(&null_term_str(value))?),
            b"ISRC" => rec.tone = null_term_str(value),
            b"ITCH" => {
                let raw = null_term_str(value);
                rec.unit_id = raw.strip_prefix("UID:").unwrap_or(&raw).to_string();
            }
            b"ISBJ" => rec.favorite_list_name = null_term_str(value),
            b"ICOP" => rec.reserved = null_term_str(value),
            other => trace!("ignoring INFO tag {}", String::from_utf8_lossy(other)),
        }
    }

    Ok(rec)
}

fn parse_timestamp(s: &str) -> Result<DateTime<Local>, DecodeError> {
    let naive = NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT).map_err(|e| {
        DecodeError::MalformedTimestamp {
            value: s.to_string(),
            reason: e.to_string(),
        }
    })?;
    Local
        .from_local_datetime(&naive)
        .single()
        .ok_or_else(|| DecodeError::MalformedTimestamp {
            value: s.to_string(),
            reason: "ambiguous or nonexistent local time".into(),
        })
}
