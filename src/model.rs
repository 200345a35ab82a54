use chrono::{DateTime, Local};
use std::fmt;
use std::time::Duration;

/// One decoded scanner recording: the file it came from, the audio length,
/// and the two metadata regions when the file carried them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Recording {
    pub file: String,
    pub duration: Duration,
    /// LIST/INFO textual tags, present iff the chunk was encountered.
    pub public: Option<ListChunk>,
    /// Vendor `unid` binary records, present iff the chunk was encountered.
    pub private: Option<UnidenChunk>,
}

/// Textual metadata from the LIST/INFO chunk. One string per tag; the
/// timestamp is the scanner's wall clock in the local zone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListChunk {
    pub system: String,            // IART
    pub department: String,        // IGNR
    pub channel: String,           // INAM
    pub tgid_or_freq: String,      // ICMT
    pub product: String,           // IPRD
    pub unknown: String,           // IKEY
    pub timestamp: Option<DateTime<Local>>, // ICRD
    pub tone: String,              // ISRC
    pub unit_id: String,           // ITCH, "UID:" prefix stripped
    pub favorite_list_name: String, // ISBJ
    pub reserved: String,          // ICOP
}

/// The six positional records of the vendor `unid` chunk.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnidenChunk {
    pub favorite: FavoriteInfo,
    pub system: SystemInfo,
    pub department: DepartmentInfo,
    pub channel: ChannelInfo,
    pub site: SiteInfo,
    pub metadata: Metadata,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FavoriteInfo {
    pub name: String,
    pub file: String,
    pub location_control: bool,
    pub monitor: bool,
    pub quick_key: String,
    pub number_tag: String,
    pub config_keys: [String; 10],
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SystemInfo {
    pub name: String,
    pub avoid: bool,
    pub blank: String,
    /// "Conventional" or "Trunked"; gates Site decoding.
    pub kind: String,
    pub id_search: bool,
    pub emergency_alert_type: String,
    pub alert_volume: String,
    pub motorola_status_bit: String,
    pub p25_nac: String,
    pub quick_key: String,
    pub number_tag: String,
    pub hold_time: String,
    pub analog_agc: String,
    pub digital_agc: String,
    pub end_code: String,
    pub priority_id: String,
    pub emergency_alert_light_color: String,
    pub emergency_alert_condition: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DepartmentInfo {
    pub name: String,
    pub avoid: bool,
    pub latitude: f64,
    pub longitude: f64,
    pub range: f64,
    pub shape: String,
    pub number_tag: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChannelInfo {
    pub name: String,
    pub avoid: bool,
    pub tgid_or_frequency: String,
    pub mode: String,
    pub tone_code: String,
    pub service_type: ServiceType,
    /// Conventional systems only; see the split-length branch in unid.rs.
    pub attenuator: i32,
    pub delay_value: String,
    pub volume_offset: String,
    pub alert_tone_type: String,
    pub alert_tone_volume: String,
    pub alert_light_color: String,
    pub alert_light_type: String,
    pub number_tag: String,
    pub priority: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SiteInfo {
    pub name: String,
    pub avoid: bool,
    pub latitude: f64,
    pub longitude: f64,
    pub range: f64,
    pub modulation: String,
    pub motorola_band_plan: String,
    pub edacs: String,
    pub shape: String,
    pub attenuator: bool,
}

/// The reverse-engineered Metadata record. `Raw*` keep the exact strings the
/// in-band format templates produced; the unprefixed fields are the useful
/// identifiers with the scanner's display decoration stripped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    pub tgid: String,
    pub frequency: f64,
    pub wacn: String,
    pub nac: String,
    pub unit_id: String,

    pub raw_tgid: String,
    pub raw_frequency: String,
    pub raw_wacn: String,
    pub raw_nac: String,
    pub raw_unit_id: String,

    pub frequency_fmt: String,
    pub wacn_fmt: String,
    pub unknown_fmt: String,
    pub nac_fmt: String,
}

/// Service classification of a channel, from the documented Uniden code
/// table. Codes not in the table decode as `Unknown`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ServiceType {
    MultiDispatch,
    LawDispatch,
    FireDispatch,
    EmsDispatch,
    MultiTac,
    LawTac,
    FireTac,
    EmsTac,
    Interop,
    Hospital,
    Ham,
    PublicWorks,
    Aircraft,
    Federal,
    Business,
    Railroad,
    Other,
    MultiTalk,
    LawTalk,
    FireTalk,
    EmsTalk,
    Transportation,
    EmergencyOps,
    Military,
    Media,
    Schools,
    Security,
    Utilities,
    Corrections,
    Custom1,
    Custom2,
    Custom3,
    Custom4,
    Custom5,
    Custom6,
    Custom7,
    Custom8,
    RacingOfficials,
    RacingTeams,
    Unspecified,
    Reserved,
    #[default]
    Unknown,
}

impl ServiceType {
    pub fn from_code(code: i64) -> Self {
        use ServiceType::*;
        match code {
            1 => MultiDispatch,
            2 => LawDispatch,
            3 => FireDispatch,
            4 => EmsDispatch,
            5 | 10 | 18 | 19 | 27 | 28 | 35 | 36 => Reserved,
            6 => MultiTac,
            7 => LawTac,
            8 => FireTac,
            9 => EmsTac,
            11 => Interop,
            12 => Hospital,
            13 => Ham,
            14 => PublicWorks,
            15 => Aircraft,
            16 => Federal,
            17 => Business,
            20 => Railroad,
            21 => Other,
            22 => MultiTalk,
            23 => LawTalk,
            24 => FireTalk,
            25 => EmsTalk,
            26 => Transportation,
            29 => EmergencyOps,
            30 => Military,
            31 => Media,
            32 => Schools,
            33 => Security,
            34 => Utilities,
            37 => Corrections,
            208 => Custom1,
            209 => Custom2,
            210 => Custom3,
            211 => Custom4,
            212 => Custom5,
            213 => Custom6,
            214 => Custom7,
            215 => Custom8,
            216 => RacingOfficials,
            217 => RacingTeams,
            255 => Unspecified,
            _ => Unknown,
        }
    }

    pub fn name(&self) -> &'static str {
        use ServiceType::*;
        match self {
            MultiDispatch => "Multi Dispatch",
            LawDispatch => "Law Dispatch",
            FireDispatch => "Fire Dispatch",
            EmsDispatch => "EMS Dispatch",
            MultiTac => "Multi Tac",
            LawTac => "Law Tac",
            FireTac => "Fire Tac",
            EmsTac => "EMS Tac",
            Interop => "Interop",
            Hospital => "Hospital",
            Ham => "Ham",
            PublicWorks => "Public Works",
            Aircraft => "Aircraft",
            Federal => "Federal",
            Business => "Business",
            Railroad => "Railroad",
            Other => "Other",
            MultiTalk => "Multi Talk",
            LawTalk => "Law Talk",
            FireTalk => "Fire Talk",
            EmsTalk => "EMS Talk",
            Transportation => "Transportation",
            EmergencyOps => "Emergency Ops",
            Military => "Military",
            Media => "Media",
            Schools => "Schools",
            Security => "Security",
            Utilities => "Utilities",
            Corrections => "Corrections",
            Custom1 => "Custom 1",
            Custom2 => "Custom 2",
            Custom3 => "Custom 3",
            Custom4 => "Custom 4",
            Custom5 => "Custom 5",
            Custom6 => "Custom 6",
            Custom7 => "Custom 7",
            Custom8 => "Custom 8",
            RacingOfficials => "Racing Officials",
            RacingTeams => "Racing Teams",
            Unspecified => "Unspecified",
            Reserved => "Reserved",
            Unknown => "Unknown",
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_type_code_table() {
        assert_eq!(ServiceType::from_code(2), ServiceType::LawDispatch);
        assert_eq!(ServiceType::from_code(5), ServiceType::Reserved);
        assert_eq!(ServiceType::from_code(36), ServiceType::Reserved);
        assert_eq!(ServiceType::from_code(37), ServiceType::Corrections);
        assert_eq!(ServiceType::from_code(208), ServiceType::Custom1);
        assert_eq!(ServiceType::from_code(217), ServiceType::RacingTeams);
        assert_eq!(ServiceType::from_code(255), ServiceType::Unspecified);
        assert_eq!(ServiceType::from_code(0), ServiceType::Unknown);
        assert_eq!(ServiceType::from_code(38), ServiceType::Unknown);
        assert_eq!(ServiceType::from_code(-1), ServiceType::Unknown);
    }

    #[test]
    fn service_type_names() {
        assert_eq!(ServiceType::from_code(4).to_string(), "EMS Dispatch");
        assert_eq!(ServiceType::from_code(29).to_string(), "Emergency Ops");
        assert_eq!(ServiceType::default().to_string(), "Unknown");
    }
}
