use crate::errors::DecodeError;
use crate::model::{ListChunk, Recording, UnidenChunk};
use csv::Writer;
use std::path::Path;
use std::time::Duration;

fn excel_guard(s: &str) -> String {
    if s.starts_with('+') {
        s.trim_start_matches('+').to_string()
    } else {
        s.to_string()
    }
}

/// Duration as the wav player renders it.
fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

const HEADER: &[&str] = &[
    "File",
    "Duration",
    "Public_System",
    "Public_Department",
    "Public_Channel",
    "Public_TGIDFreq",
    "Public_Product",
    "Public_Unknown",
    "Public_Timestamp",
    "Public_Tone",
    "Public_UnitID",
    "Public_FavoriteListName",
    "Public_Reserved",
    "Favorite_Name",
    "Favorite_File",
    "Favorite_LocationControl",
    "Favorite_Monitor",
    "Favorite_QuickKey",
    "Favorite_NumberTag",
    "Favorite_ConfigKey0",
    "Favorite_ConfigKey1",
    "Favorite_ConfigKey2",
    "Favorite_ConfigKey3",
    "Favorite_ConfigKey4",
    "Favorite_ConfigKey5",
    "Favorite_ConfigKey6",
    "Favorite_ConfigKey7",
    "Favorite_ConfigKey8",
    "Favorite_ConfigKey9",
    "System_Name",
    "System_Avoid",
    "System_Blank",
    "System_Type",
    "System_IDSearch",
    "System_EmergencyAlertType",
    "System_AlertVolume",
    "System_MotorolaStatusBit",
    "System_P25NAC",
    "System_QuickKey",
    "System_NumberTag",
    "System_HoldTime",
    "System_AnalogAGC",
    "System_DigitalAGC",
    "System_EndCode",
    "System_PriorityID",
    "System_EmergencyAlertLightColor",
    "System_EmergencyAlertCondition",
    "Department_Name",
    "Department_Avoid",
    "Department_Latitude",
    "Department_Longitude",
    "Department_Range",
    "Department_Shape",
    "Department_NumberTag",
    "Channel_Name",
    "Channel_Avoid",
    "Channel_TGIDFrequency",
    "Channel_Mode",
    "Channel_ToneCode",
    "Channel_ServiceType",
    "Channel_Attenuator",
    "Channel_DelayValue",
    "Channel_VolumeOffset",
    "Channel_AlertToneType",
    "Channel_AlertToneVolume",
    "Channel_AlertLightColor",
    "Channel_AlertLightType",
    "Channel_NumberTag",
    "Channel_Priority",
    "Site_Name",
    "Site_Avoid",
    "Site_Latitude",
    "Site_Longitude",
    "Site_Range",
    "Site_Modulation",
    "Site_MotorolaBandPlan",
    "Site_EDACS",
    "Site_Shape",
    "Site_Attenuator",
    "Metadata_TGID",
    "Metadata_Frequency",
    "Metadata_WACN",
    "Metadata_NAC",
    "Metadata_UnitID",
    "Metadata_RawTGID",
    "Metadata_RawFrequency",
    "Metadata_RawWACN",
    "Metadata_RawNAC",
    "Metadata_RawUnitID",
    "Metadata_FrequencyFmt",
    "Metadata_WACNFmt",
    "Metadata_UnknownFmt",
    "Metadata_NACFmt",
];

fn public_columns(public: Option<&ListChunk>) -> Vec<String> {
    let empty = ListChunk::default();
    let p = public.unwrap_or(&empty);
    vec![
        p.system.clone(),
        p.department.clone(),
        p.channel.clone(),
        p.tgid_or_freq.clone(),
        p.product.clone(),
        p.unknown.clone(),
        p.timestamp
            .map(|ts| ts.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default(),
        p.tone.clone(),
        p.unit_id.clone(),
        p.favorite_list_name.clone(),
        p.reserved.clone(),
    ]
}

fn private_columns(private: Option<&UnidenChunk>) -> Vec<String> {
    let empty = UnidenChunk::default();
    let u = private.unwrap_or(&empty);
    let mut cols = vec![
        u.favorite.name.clone(),
        u.favorite.file.clone(),
        u.favorite.location_control.to_string(),
        u.favorite.monitor.to_string(),
        u.favorite.quick_key.clone(),
        u.favorite.number_tag.clone(),
    ];
    cols.extend(u.favorite.config_keys.iter().cloned());
    cols.extend([
        u.system.name.clone(),
        u.system.avoid.to_string(),
        u.system.blank.clone(),
        u.system.kind.clone(),
        u.system.id_search.to_string(),
        u.system.emergency_alert_type.clone(),
        u.system.alert_volume.clone(),
        u.system.motorola_status_bit.clone(),
        u.system.p25_nac.clone(),
        u.system.quick_key.clone(),
        u.system.number_tag.clone(),
        u.system.hold_time.clone(),
        u.system.analog_agc.clone(),
        u.system.digital_agc.clone(),
        u.system.end_code.clone(),
        u.system.priority_id.clone(),
        u.system.emergency_alert_light_color.clone(),
        u.system.emergency_alert_condition.clone(),
        u.department.name.clone(),
        u.department.avoid.to_string(),
        u.department.latitude.to_string(),
        u.department.longitude.to_string(),
        u.department.range.to_string(),
        u.department.shape.clone(),
        u.department.number_tag.clone(),
        u.channel.name.clone(),
        u.channel.avoid.to_string(),
        u.channel.tgid_or_frequency.clone(),
        u.channel.mode.clone(),
        u.channel.tone_code.clone(),
        u.channel.service_type.to_string(),
        u.channel.attenuator.to_string(),
        u.channel.delay_value.clone(),
        u.channel.volume_offset.clone(),
        u.channel.alert_tone_type.clone(),
        u.channel.alert_tone_volume.clone(),
        u.channel.alert_light_color.clone(),
        u.channel.alert_light_type.clone(),
        u.channel.number_tag.clone(),
        u.channel.priority.clone(),
        u.site.name.clone(),
        u.site.avoid.to_string(),
        u.site.latitude.to_string(),
        u.site.longitude.to_string(),
        u.site.range.to_string(),
        u.site.modulation.clone(),
        u.site.motorola_band_plan.clone(),
        u.site.edacs.clone(),
        u.site.shape.clone(),
        u.site.attenuator.to_string(),
        u.metadata.tgid.clone(),
        u.metadata.frequency.to_string(),
        u.metadata.wacn.clone(),
        u.metadata.nac.clone(),
        u.metadata.unit_id.clone(),
        u.metadata.raw_tgid.clone(),
        u.metadata.raw_frequency.clone(),
        u.metadata.raw_wacn.clone(),
        u.metadata.raw_nac.clone(),
        u.metadata.raw_unit_id.clone(),
        u.metadata.frequency_fmt.clone(),
        u.metadata.wacn_fmt.clone(),
        u.metadata.unknown_fmt.clone(),
        u.metadata.nac_fmt.clone(),
    ]);
    cols
}

/// Writes one flattened row per recording.
pub fn write_csv(records: &[Recording], out_path: &Path) -> Result<(), DecodeError> {
    let mut wtr = Writer::from_path(out_path)
        .map_err(|e| DecodeError::Output(format!("open out csv '{}': {}", out_path.display(), e)))?;

    wtr.write_record(HEADER)
        .map_err(|e| DecodeError::Output(format!("csv write header: {}", e)))?;

    for r in records {
        let mut row = vec![r.file.clone(), format_duration(r.duration)];
        row.extend(public_columns(r.public.as_ref()));
        row.extend(private_columns(r.private.as_ref()));
        // Decoded scanner text ends up in spreadsheets; strip the leading
        // '+' so no cell is read as a formula.
        let row: Vec<String> = row.iter().map(|cell| excel_guard(cell)).collect();
        wtr.write_record(&row)
            .map_err(|e| DecodeError::Output(format!("csv write row: {}", e)))?;
    }

    wtr.flush()
        .map_err(|e| DecodeError::Output(format!("csv flush: {}", e)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_renders_as_wall_clock() {
        assert_eq!(format_duration(Duration::from_secs(0)), "00:00:00");
        assert_eq!(format_duration(Duration::from_secs(62)), "00:01:02");
        assert_eq!(format_duration(Duration::from_secs(3723)), "01:02:03");
    }

    #[test]
    fn excel_guard_strips_leading_plus() {
        assert_eq!(excel_guard("+DMR"), "DMR");
        assert_eq!(excel_guard("++DMR"), "DMR");
        assert_eq!(excel_guard("-20"), "-20");
        assert_eq!(excel_guard("plain"), "plain");
        assert_eq!(excel_guard(""), "");
    }

    #[test]
    fn row_width_matches_header() {
        let rec = Recording::default();
        let mut row = vec![rec.file.clone(), format_duration(rec.duration)];
        row.extend(public_columns(rec.public.as_ref()));
        row.extend(private_columns(rec.private.as_ref()));
        assert_eq!(row.len(), HEADER.len());
    }
}
