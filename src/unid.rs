//! Vendor `unid` chunk decoder: the private, positional half of the
//! metadata.
//!
//! The 2048-byte payload carries six fixed-offset sub-records. The first
//! five are newline-terminated runs of NUL-separated ASCII fields assigned
//! by ordinal position; the Metadata record at 608 mixes NUL-separated
//! format templates with raw byte windows those templates are applied to.

use std::borrow::Cow;

use crate::binfmt::apply_format;
use crate::errors::DecodeError;
use crate::fields::{field_at, null_term_str, parse_bool, split_nul_fields, trim_at_newline};
use crate::model::{
    ChannelInfo, DepartmentInfo, FavoriteInfo, Metadata, ServiceType, SiteInfo, SystemInfo,
    UnidenChunk,
};
use crate::riff::{ChunkHeader, UNID_ID};

const UNID_SIZE: usize = 2048;

const FAVORITE_OFFSET: usize = 0;
const SYSTEM_OFFSET: usize = 65;
const DEPARTMENT_OFFSET: usize = 130;
const CHANNEL_OFFSET: usize = 195;
const SITE_OFFSET: usize = 260;
const METADATA_OFFSET: usize = 608;
const RECORD_LEN: usize = 65;
const METADATA_LEN: usize = 216;

/// Systems of this type carry no Site record; its slice holds stale bytes.
const CONVENTIONAL: &str = "Conventional";

pub fn decode_unid_chunk(header: &ChunkHeader, payload: &[u8]) -> Result<UnidenChunk, DecodeError> {
    if header.id != UNID_ID {
        return Err(DecodeError::MalformedUnidChunk(format!(
            "chunk id {:?} dispatched to the unid decoder",
            String::from_utf8_lossy(&header.id)
        )));
    }
    if payload.len() < UNID_SIZE {
        return Err(DecodeError::MalformedUnidChunk(format!(
            "payload is {} bytes, expected {}",
            payload.len(),
            UNID_SIZE
        )));
    }

    let mut chunk = UnidenChunk {
        favorite: decode_favorite(&payload[FAVORITE_OFFSET..FAVORITE_OFFSET + RECORD_LEN]),
        system: decode_system(&payload[SYSTEM_OFFSET..SYSTEM_OFFSET + RECORD_LEN]),
        department: decode_department(&payload[DEPARTMENT_OFFSET..DEPARTMENT_OFFSET + RECORD_LEN])?,
        channel: decode_channel(&payload[CHANNEL_OFFSET..CHANNEL_OFFSET + RECORD_LEN])?,
        ..Default::default()
    };
    if chunk.system.kind != CONVENTIONAL {
        chunk.site = decode_site(&payload[SITE_OFFSET..SITE_OFFSET + RECORD_LEN])?;
    }
    // Metadata is decoded for conventional systems too: TGID, unit id, WACN
    // and NAC are meaningful there as well.
    chunk.metadata = decode_metadata(&payload[METADATA_OFFSET..METADATA_OFFSET + METADATA_LEN])?;

    Ok(chunk)
}

fn record_fields(data: &[u8]) -> Vec<Cow<'_, str>> {
    split_nul_fields(trim_at_newline(data))
}

fn decode_favorite(data: &[u8]) -> FavoriteInfo {
    let fields = record_fields(data);
    let mut fav = FavoriteInfo::default();
    if let Some(v) = field_at(&fields, 0) {
        fav.name = v.to_string();
    }
    if let Some(v) = field_at(&fields, 1) {
        fav.file = v.to_string();
    }
    if let Some(v) = field_at(&fields, 2) {
        fav.location_control = parse_bool(v).unwrap_or(false);
    }
    if let Some(v) = field_at(&fields, 3) {
        fav.monitor = parse_bool(v).unwrap_or(false);
    }
    if let Some(v) = field_at(&fields, 4) {
        fav.quick_key = v.to_string();
    }
    if let Some(v) = field_at(&fields, 5) {
        fav.number_tag = v.to_string();
    }
    for (i, key) in fav.config_keys.iter_mut().enumerate() {
        if let Some(v) = field_at(&fields, 6 + i) {
            *key = v.to_string();
        }
    }
    fav
}

fn decode_system(data: &[u8]) -> SystemInfo {
    let fields = record_fields(data);
    let mut sys = SystemInfo::default();
    if let Some(v) = field_at(&fields, 0) {
        sys.name = v.to_string();
    }
    if let Some(v) = field_at(&fields, 1) {
        sys.avoid = parse_bool(v).unwrap_or(false);
    }
    if let Some(v) = field_at(&fields, 2) {
        sys.blank = v.to_string();
    }
    if let Some(v) = field_at(&fields, 3) {
        sys.kind = v.to_string();
    }
    if let Some(v) = field_at(&fields, 4) {
        sys.id_search = parse_bool(v).unwrap_or(false);
    }
    if let Some(v) = field_at(&fields, 5) {
        sys.emergency_alert_type = v.to_string();
    }
    if let Some(v) = field_at(&fields, 6) {
        sys.alert_volume = v.to_string();
    }
    if let Some(v) = field_at(&fields, 7) {
        sys.motorola_status_bit = v.to_string();
    }
    if let Some(v) = field_at(&fields, 8) {
        sys.p25_nac = v.to_string();
    }
    if let Some(v) = field_at(&fields, 9) {
        sys.quick_key = v.to_string();
    }
    if let Some(v) = field_at(&fields, 10) {
        sys.number_tag = v.to_string();
    }
    if let Some(v) = field_at(&fields, 11) {
        sys.hold_time = v.to_string();
    }
    if let Some(v) = field_at(&fields, 12) {
        sys.analog_agc = v.to_string();
    }
    if let Some(v) = field_at(&fields, 13) {
        sys.digital_agc = v.to_string();
    }
    if let Some(v) = field_at(&fields, 14) {
        sys.end_code = v.to_string();
    }
    if let Some(v) = field_at(&fields, 15) {
        sys.priority_id = v.to_string();
    }
    // Firmware quirk: the last two fields read one slot behind the slot
    // their guard inspects, so each needs a spare non-empty slot after it.
    if field_at(&fields, 17).is_some() {
        sys.emergency_alert_light_color = fields[16].to_string();
    }
    if field_at(&fields, 18).is_some() {
        sys.emergency_alert_condition = fields[17].to_string();
    }
    sys
}

fn decode_department(data: &[u8]) -> Result<DepartmentInfo, DecodeError> {
    let fields = record_fields(data);
    let mut dep = DepartmentInfo::default();
    if let Some(v) = field_at(&fields, 0) {
        dep.name = v.to_string();
    }
    if let Some(v) = field_at(&fields, 1) {
        dep.avoid = parse_bool(v).unwrap_or(false);
    }
    if let Some(v) = field_at(&fields, 2) {
        dep.latitude = parse_float("department", "latitude", v)?;
    }
    if let Some(v) = field_at(&fields, 3) {
        dep.longitude = parse_float("department", "longitude", v)?;
    }
    if let Some(v) = field_at(&fields, 4) {
        dep.range = parse_float("department", "range", v)?;
    }
    if let Some(v) = field_at(&fields, 5) {
        dep.shape = v.to_string();
    }
    if let Some(v) = field_at(&fields, 6) {
        dep.number_tag = v.to_string();
    }
    Ok(dep)
}

fn decode_channel(data: &[u8]) -> Result<ChannelInfo, DecodeError> {
    let fields = record_fields(data);
    let mut ch = ChannelInfo::default();
    if let Some(v) = field_at(&fields, 0) {
        ch.name = v.to_string();
    }
    if let Some(v) = field_at(&fields, 1) {
        ch.avoid = parse_bool(v).unwrap_or(false);
    }
    if let Some(v) = field_at(&fields, 2) {
        ch.tgid_or_frequency = v.to_string();
    }
    if let Some(v) = field_at(&fields, 3) {
        ch.mode = v.to_string();
    }
    if let Some(v) = field_at(&fields, 4) {
        ch.tone_code = v.to_string();
    }
    if let Some(v) = field_at(&fields, 5) {
        ch.service_type = ServiceType::from_code(parse_int("channel", "service type", v)?);
    }

    // Conventional recordings carry one extra field, Attenuator, between
    // ServiceType and DelayValue; everything after it shifts by one.
    let offset = if fields.len() > 15 {
        if let Some(v) = field_at(&fields, 6) {
            ch.attenuator = parse_int("channel", "attenuator", v)? as i32;
        }
        1
    } else {
        0
    };

    if let Some(v) = field_at(&fields, offset + 6) {
        ch.delay_value = v.to_string();
    }
    if let Some(v) = field_at(&fields, offset + 7) {
        ch.volume_offset = v.to_string();
    }
    if let Some(v) = field_at(&fields, offset + 8) {
        ch.alert_tone_type = v.to_string();
    }
    if let Some(v) = field_at(&fields, offset + 9) {
        ch.alert_tone_volume = v.to_string();
    }
    if let Some(v) = field_at(&fields, offset + 10) {
        ch.alert_light_color = v.to_string();
    }
    if let Some(v) = field_at(&fields, offset + 11) {
        ch.alert_light_type = v.to_string();
    }
    if let Some(v) = field_at(&fields, offset + 12) {
        ch.number_tag = v.to_string();
    }
    if let Some(v) = field_at(&fields, offset + 13) {
        ch.priority = v.to_string();
    }
    Ok(ch)
}

fn decode_site(data: &[u8]) -> Result<SiteInfo, DecodeError> {
    let fields = record_fields(data);
    let mut site = SiteInfo::default();
    if let Some(v) = field_at(&fields, 0) {
        site.name = v.to_string();
    }
    if let Some(v) = field_at(&fields, 1) {
        site.avoid = parse_bool(v).unwrap_or(false);
    }
    if let Some(v) = field_at(&fields, 2) {
        site.latitude = parse_float("site", "latitude", v)?;
    }
    if let Some(v) = field_at(&fields, 3) {
        site.longitude = parse_float("site", "longitude", v)?;
    }
    if let Some(v) = field_at(&fields, 4) {
        site.range = parse_float("site", "range", v)?;
    }
    if let Some(v) = field_at(&fields, 5) {
        site.modulation = v.to_string();
    }
    if let Some(v) = field_at(&fields, 6) {
        site.motorola_band_plan = v.to_string();
    }
    if let Some(v) = field_at(&fields, 7) {
        site.edacs = v.to_string();
    }
    if let Some(v) = field_at(&fields, 8) {
        site.shape = v.to_string();
    }
    if let Some(v) = field_at(&fields, 9) {
        site.attenuator = parse_bool(v).unwrap_or(false);
    }
    Ok(site)
}

/// Byte windows inside the 216-byte Metadata record the in-band templates
/// are applied to. Reverse engineered; offsets are window-relative.
const FREQ_GROUP_A: std::ops::Range<usize> = 68..70;
const FREQ_GROUP_B: std::ops::Range<usize> = 70..72;
const UID_WINDOW: std::ops::Range<usize> = 99..110;
const NAC_GROUP: std::ops::Range<usize> = 174..176;
const WACN_GROUP: std::ops::Range<usize> = 212..216;

fn decode_metadata(data: &[u8]) -> Result<Metadata, DecodeError> {
    let mut meta = Metadata::default();
    // Unlike the five fixed records, the template list is not
    // newline-terminated.
    let fields = split_nul_fields(&data[..RECORD_LEN]);
    // A field failure is remembered, not returned straight away, so the
    // remaining identifiers still populate before the decode is rejected.
    let mut first_err: Option<DecodeError> = None;

    if let Some(first) = fields.first() {
        meta.raw_tgid = first.to_string();
        if let Some(tgid) = meta.raw_tgid.get(5..) {
            meta.tgid = tgid.to_string();
        }
    }

    let uid = &data[UID_WINDOW];
    if uid.starts_with(b"UID:") {
        meta.raw_unit_id = null_term_str(uid);
        meta.unit_id = meta.raw_unit_id[4..].to_string();
    }

    if let Some(fmt) = field_at(&fields, 2) {
        meta.frequency_fmt = fmt.to_string();
        match apply_format(fmt, &[&data[FREQ_GROUP_A], &data[FREQ_GROUP_B]]) {
            Ok(raw) => {
                meta.raw_frequency = raw.trim_start_matches('0').to_string();
                let token = meta.raw_frequency.split(' ').next().unwrap_or("");
                match token.parse::<f64>() {
                    Ok(freq) => meta.frequency = freq,
                    Err(e) => {
                        first_err.get_or_insert(DecodeError::field(
                            "metadata",
                            "frequency",
                            token,
                            e,
                        ));
                    }
                }
            }
            Err(e) => {
                first_err.get_or_insert(DecodeError::field("metadata", "frequency", fmt, e));
            }
        }
    }

    if let Some(fmt) = field_at(&fields, 3) {
        meta.wacn_fmt = fmt.to_string();
        match apply_format(fmt, &[&data[WACN_GROUP]]) {
            Ok(raw) => {
                meta.raw_wacn = raw;
                match meta.raw_wacn.get(5..) {
                    Some(wacn) => meta.wacn = wacn.to_string(),
                    None => {
                        first_err.get_or_insert(DecodeError::field(
                            "metadata",
                            "wacn",
                            &meta.raw_wacn,
                            "shorter than its 5-byte prefix",
                        ));
                    }
                }
            }
            Err(e) => {
                first_err.get_or_insert(DecodeError::field("metadata", "wacn", fmt, e));
            }
        }
    }

    if let Some(fmt) = field_at(&fields, 5) {
        meta.unknown_fmt = fmt.to_string();
    }

    if let Some(fmt) = field_at(&fields, 6) {
        meta.nac_fmt = fmt.to_string();
        match apply_format(fmt, &[&data[NAC_GROUP]]) {
            Ok(raw) => {
                meta.raw_nac = raw;
                // The template wraps the NAC in one leading and two
                // trailing delimiter bytes.
                match meta
                    .raw_nac
                    .len()
                    .checked_sub(2)
                    .filter(|end| *end >= 1)
                    .and_then(|end| meta.raw_nac.get(1..end))
                {
                    Some(nac) => meta.nac = nac.to_string(),
                    None => {
                        first_err.get_or_insert(DecodeError::field(
                            "metadata",
                            "nac",
                            &meta.raw_nac,
                            "shorter than its delimiters",
                        ));
                    }
                }
            }
            Err(e) => {
                first_err.get_or_insert(DecodeError::field("metadata", "nac", fmt, e));
            }
        }
    }

    match first_err {
        Some(err) => Err(err),
        None => Ok(meta),
    }
}

fn parse_float(record: &'static str, field: &'static str, v: &str) -> Result<f64, DecodeError> {
    v.trim()
        .parse()
        .map_err(|e| DecodeError::field(record, field, v, e))
}

fn parse_int(record: &'static str, field: &'static str, v: &str) -> Result<i64, DecodeError> {
    v.trim()
        .parse()
        .map_err(|e| DecodeError::field(record, field, v, e))
}
