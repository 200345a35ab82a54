//! Restricted printf engine for the templates the scanner stores in-band.
//!
//! The unid Metadata record carries its own display formats, e.g.
//! `"%04d.%04d MHz"` applied to two 2-byte groups. Only the conversions
//! actually observed in recordings are supported: `%%` plus
//! `%[0][width]{d,u,x,X}`, one byte group per conversion, the group read as
//! a little-endian unsigned integer. Everything else is rejected so a
//! firmware change shows up as a parse error instead of silent garbage.

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum FormatError {
    #[error("unsupported conversion %{0}")]
    UnsupportedConversion(char),
    #[error("template has more conversions than byte groups")]
    MissingArgument,
    #[error("template ends inside a conversion")]
    TrailingPercent,
}

pub fn apply_format(template: &str, groups: &[&[u8]]) -> Result<String, FormatError> {
    let mut out = String::with_capacity(template.len() + 8);
    let mut next_group = 0usize;
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        if chars.peek() == Some(&'%') {
            chars.next();
            out.push('%');
            continue;
        }

        let zero_pad = chars.peek() == Some(&'0');
        if zero_pad {
            chars.next();
        }
        let mut width = 0usize;
        while let Some(d) = chars.peek().and_then(|c| c.to_digit(10)) {
            width = width * 10 + d as usize;
            chars.next();
        }

        let conv = chars.next().ok_or(FormatError::TrailingPercent)?;
        let group = groups
            .get(next_group)
            .ok_or(FormatError::MissingArgument)?;
        next_group += 1;

        let value = le_value(group);
        let digits = match conv {
            'd' | 'u' => value.to_string(),
            'x' => format!("{value:x}"),
            'X' => format!("{value:X}"),
            other => return Err(FormatError::UnsupportedConversion(other)),
        };
        for _ in digits.len()..width {
            out.push(if zero_pad { '0' } else { ' ' });
        }
        out.push_str(&digits);
    }

    Ok(out)
}

fn le_value(group: &[u8]) -> u64 {
    group
        .iter()
        .rev()
        .fold(0u64, |acc, &b| (acc << 8) | u64::from(b))
}
