//! Byte-level helpers shared by the chunk decoders.

use std::borrow::Cow;

/// Text up to the first NUL, as an owned string. Non-ASCII bytes are
/// replaced rather than rejected; the scanner only ever writes ASCII here.
pub fn null_term_str(b: &[u8]) -> String {
    let end = b.iter().position(|&c| c == 0).unwrap_or(b.len());
    String::from_utf8_lossy(&b[..end]).into_owned()
}

/// Cuts a sub-record slice at the first newline. The scanner terminates
/// shorter records with 0x0A and leaves stale bytes after it.
pub fn trim_at_newline(b: &[u8]) -> &[u8] {
    let end = b.iter().position(|&c| c == b'\n').unwrap_or(b.len());
    &b[..end]
}

/// Splits a sub-record at NUL boundaries into its ordinal fields.
pub fn split_nul_fields(b: &[u8]) -> Vec<Cow<'_, str>> {
    b.split(|&c| c == 0).map(String::from_utf8_lossy).collect()
}

/// The field at ordinal position `idx`, or None when the position is past
/// the split or holds the empty string (empty means absent, keep default).
pub fn field_at<'a>(fields: &'a [Cow<'_, str>], idx: usize) -> Option<&'a str> {
    fields
        .get(idx)
        .map(|f| f.as_ref())
        .filter(|f| !f.is_empty())
}

/// Boolean forms the scanner emits. The single letter "o" is a truncated
/// "off". Returns None for anything unrecognized; the sub-record decoders
/// treat that as false.
pub fn parse_bool(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "on" | "true" | "1" => Some(true),
        "off" | "o" | "false" | "0" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_term_str_stops_at_nul() {
        assert_eq!(null_term_str(b"abc\x00def"), "abc");
        assert_eq!(null_term_str(b"abc"), "abc");
        assert_eq!(null_term_str(b"\x00abc"), "");
        assert_eq!(null_term_str(b""), "");
    }

    #[test]
    fn trim_at_newline_keeps_slice_without_newline() {
        assert_eq!(trim_at_newline(b"a\x00b\nstale"), b"a\x00b");
        assert_eq!(trim_at_newline(b"a\x00b"), b"a\x00b");
        assert_eq!(trim_at_newline(b"\nx"), b"");
    }

    #[test]
    fn split_and_ordinal_lookup() {
        let fields = split_nul_fields(b"Name\x00\x00On\x00 ");
        assert_eq!(fields.len(), 4);
        assert_eq!(field_at(&fields, 0), Some("Name"));
        assert_eq!(field_at(&fields, 1), None); // empty means absent
        assert_eq!(field_at(&fields, 2), Some("On"));
        assert_eq!(field_at(&fields, 3), Some(" "));
        assert_eq!(field_at(&fields, 4), None); // past the split
    }

    #[test]
    fn bool_tolerance_table() {
        for s in ["on", "ON", "On", "true", "TRUE", "1"] {
            assert_eq!(parse_bool(s), Some(true), "{s}");
        }
        for s in ["off", "OFF", "o", "O", "false", "0"] {
            assert_eq!(parse_bool(s), Some(false), "{s}");
        }
        for s in ["", "yes", "2", "of f"] {
            assert_eq!(parse_bool(s), None, "{s:?}");
        }
    }
}
