//! Locale-independent numeric scanning, units and coordinates
//!
//! SVG always uses `.` as the decimal separator, so the platform float parser
//! (which honors the process locale) is never used. The scanner accumulates
//! mantissa and exponent itself, the same way numbers are read in path data.
use crate::{Scalar, SvgParseError};
use std::str::FromStr;

/// Parse a leading floating point number, yielding zero when neither an
/// integer nor a fractional part is present.
pub fn parse_float(s: &str) -> Scalar {
    let bytes = s.as_bytes();
    let mut index = 0;

    let mut mantissa: i64 = 0;
    let mut exponent: i64 = 0;
    let mut sign = 1.0;

    fn push_digit(value: &mut i64, byte: u8) {
        *value = value.wrapping_mul(10).wrapping_add((byte - b'0') as i64);
    }

    match bytes.first() {
        Some(b'-') => {
            sign = -1.0;
            index += 1;
        }
        Some(b'+') => index += 1,
        _ => {}
    }
    let mut whole = 0;
    while index < bytes.len() && bytes[index].is_ascii_digit() {
        push_digit(&mut mantissa, bytes[index]);
        whole += 1;
        index += 1;
    }
    let mut frac = 0;
    if bytes.get(index) == Some(&b'.') {
        index += 1;
        while index < bytes.len() && bytes[index].is_ascii_digit() {
            push_digit(&mut mantissa, bytes[index]);
            exponent -= 1;
            frac += 1;
            index += 1;
        }
    }

    // A valid number should have integer or fractional part.
    if whole + frac == 0 {
        return 0.0;
    }

    if matches!(bytes.get(index), Some(b'e') | Some(b'E')) {
        index += 1;
        let mut sci: i64 = 0;
        let mut sci_sign: i64 = 1;
        match bytes.get(index) {
            Some(b'-') => {
                sci_sign = -1;
                index += 1;
            }
            Some(b'+') => index += 1,
            _ => {}
        }
        let mut digits = 0;
        while index < bytes.len() && bytes[index].is_ascii_digit() {
            push_digit(&mut sci, bytes[index]);
            digits += 1;
            index += 1;
        }
        if digits > 0 {
            exponent = exponent.wrapping_add(sci_sign * sci);
        }
    }

    sign * (mantissa as f64 * 10f64.powi(exponent as i32)) as Scalar
}

pub(crate) fn is_space(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | b'\x0b' | b'\x0c' | b'\r')
}

pub(crate) fn is_number_start(byte: u8) -> bool {
    matches!(byte, b'-' | b'+' | b'.') || byte.is_ascii_digit()
}

/// Split one number token off the input, returning `(token, rest)`.
///
/// An `e` followed by `m` or `x` terminates the number so that `3em` scans as
/// `3` plus the unit, never as an exponent.
pub(crate) fn scan_number(s: &str) -> (&str, &str) {
    let bytes = s.as_bytes();
    let mut index = 0;

    if matches!(bytes.first(), Some(b'-') | Some(b'+')) {
        index += 1;
    }
    while index < bytes.len() && bytes[index].is_ascii_digit() {
        index += 1;
    }
    if bytes.get(index) == Some(&b'.') {
        index += 1;
        while index < bytes.len() && bytes[index].is_ascii_digit() {
            index += 1;
        }
    }
    if matches!(bytes.get(index), Some(b'e') | Some(b'E'))
        && !matches!(bytes.get(index + 1), Some(b'm') | Some(b'x'))
    {
        index += 1;
        if matches!(bytes.get(index), Some(b'-') | Some(b'+')) {
            index += 1;
        }
        while index < bytes.len() && bytes[index].is_ascii_digit() {
            index += 1;
        }
    }
    s.split_at(index)
}

/// Next whitespace/comma separated item of path data: a number token or a
/// single command character.
pub(crate) fn next_item(s: &str) -> (Option<&str>, &str) {
    let s = s.trim_start_matches(|c: char| c == ',' || c.is_ascii_whitespace());
    match s.as_bytes().first() {
        None => (None, s),
        Some(&byte) if is_number_start(byte) => {
            let (token, rest) = scan_number(s);
            (Some(token), rest)
        }
        Some(_) => {
            let width = s.chars().next().map_or(1, char::len_utf8);
            (Some(&s[..width]), &s[width..])
        }
    }
}

/// Arc flags are single `0`/`1` characters that may appear without any
/// separator before the next number.
pub(crate) fn next_arc_flag(s: &str) -> (Option<char>, &str) {
    let s = s.trim_start_matches(|c: char| c == ',' || c.is_ascii_whitespace());
    match s.as_bytes().first() {
        Some(b'0') => (Some('0'), &s[1..]),
        Some(b'1') => (Some('1'), &s[1..]),
        _ => (None, s),
    }
}

/// Next item of a `stroke-dasharray` list
pub(crate) fn next_dash_item(s: &str) -> (Option<&str>, &str) {
    let s = s.trim_start_matches(|c: char| c == ',' || c.is_ascii_whitespace());
    if s.is_empty() {
        return (None, s);
    }
    let end = s
        .bytes()
        .position(|b| is_space(b) || b == b',' || b == b';')
        .unwrap_or(s.len());
    (Some(&s[..end]), &s[end..])
}

/// Collect numeric arguments of a transform function or animation value.
///
/// With `parens` the arguments are searched between `(` and `)`, otherwise
/// they run to the first `;` or the end of input. Returns the argument count
/// and the number of consumed bytes; `None` when the argument list is
/// malformed or too long, in which case the caller skips a single byte.
pub(crate) fn scan_args(s: &str, out: &mut [Scalar], parens: bool) -> Option<(usize, usize)> {
    let bytes = s.as_bytes();
    let start = if parens {
        match bytes.iter().position(|&b| b == b'(') {
            Some(open) => open + 1,
            None => return None,
        }
    } else {
        0
    };
    let end = if parens {
        match bytes[start..].iter().position(|&b| b == b')') {
            Some(close) => start + close,
            None => return None,
        }
    } else {
        start
            + bytes[start..]
                .iter()
                .position(|&b| b == b';')
                .unwrap_or(bytes.len() - start)
    };

    let mut na = 0;
    let mut index = start;
    while index < end {
        if is_number_start(bytes[index]) {
            if na >= out.len() {
                return None;
            }
            let (token, _) = scan_number(&s[index..end]);
            out[na] = parse_float(token);
            na += 1;
            index += token.len().max(1);
        } else {
            index += 1;
        }
    }
    Some((na, end))
}

/// Length units supported by coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Units {
    /// Plain user-space value
    #[default]
    User,
    Px,
    Pt,
    Pc,
    Mm,
    Cm,
    In,
    Percent,
    Em,
    Ex,
}

impl Units {
    /// Units from the suffix left over after a number token, `User` when the
    /// suffix is not recognized.
    pub(crate) fn from_suffix(s: &str) -> Units {
        let bytes = s.as_bytes();
        match (bytes.first(), bytes.get(1)) {
            (Some(b'p'), Some(b'x')) => Units::Px,
            (Some(b'p'), Some(b't')) => Units::Pt,
            (Some(b'p'), Some(b'c')) => Units::Pc,
            (Some(b'm'), Some(b'm')) => Units::Mm,
            (Some(b'c'), Some(b'm')) => Units::Cm,
            (Some(b'i'), Some(b'n')) => Units::In,
            (Some(b'%'), _) => Units::Percent,
            (Some(b'e'), Some(b'm')) => Units::Em,
            (Some(b'e'), Some(b'x')) => Units::Ex,
            _ => Units::User,
        }
    }
}

impl FromStr for Units {
    type Err = SvgParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" => Ok(Units::User),
            "px" => Ok(Units::Px),
            "pt" => Ok(Units::Pt),
            "pc" => Ok(Units::Pc),
            "mm" => Ok(Units::Mm),
            "cm" => Ok(Units::Cm),
            "in" => Ok(Units::In),
            "%" => Ok(Units::Percent),
            "em" => Ok(Units::Em),
            "ex" => Ok(Units::Ex),
            _ => Err(SvgParseError::InvalidUnits),
        }
    }
}

/// A numeric value together with its units
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Coordinate {
    pub value: Scalar,
    pub units: Units,
}

impl Coordinate {
    pub fn new(value: Scalar, units: Units) -> Self {
        Self { value, units }
    }

    /// Parse a number with an optional unit suffix
    pub fn parse(s: &str) -> Self {
        let (token, rest) = scan_number(s);
        Self {
            value: parse_float(token),
            units: Units::from_suffix(rest),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_approx_eq;

    #[test]
    fn test_parse_float() {
        assert_approx_eq!(parse_float("1"), 1.0);
        assert_approx_eq!(parse_float(".22"), 0.22, 1e-6);
        assert_approx_eq!(parse_float("3.21e-3"), 3.21e-3, 1e-9);
        assert_approx_eq!(parse_float("-1.24"), -1.24, 1e-6);
        assert_approx_eq!(parse_float("1e4"), 1e4);
        assert_approx_eq!(parse_float("+13.5"), 13.5, 1e-6);
        // no digits at all yields zero
        assert_approx_eq!(parse_float("-"), 0.0);
        assert_approx_eq!(parse_float("junk"), 0.0);
    }

    #[test]
    fn test_locale_independence() {
        // a comma is a separator, never a decimal point
        assert_approx_eq!(parse_float("3.14"), 3.14, 1e-6);
        assert_approx_eq!(parse_float("3,14"), 3.0);
    }

    #[test]
    fn test_scan_number_em_ex() {
        // `e` followed by `m` or `x` is a unit, not an exponent
        let (token, rest) = scan_number("3em");
        assert_eq!(token, "3");
        assert_eq!(rest, "em");
        let (token, rest) = scan_number("2.5ex");
        assert_eq!(token, "2.5");
        assert_eq!(rest, "ex");
        let (token, _) = scan_number("2.5e2");
        assert_eq!(token, "2.5e2");
    }

    #[test]
    fn test_next_item() {
        let (item, rest) = next_item(" ,  M10 20");
        assert_eq!(item, Some("M"));
        let (item, rest) = next_item(rest);
        assert_eq!(item, Some("10"));
        let (item, rest) = next_item(rest);
        assert_eq!(item, Some("20"));
        assert_eq!(next_item(rest).0, None);
        // numbers split at the next sign
        let (item, rest) = next_item(".5-3");
        assert_eq!(item, Some(".5"));
        assert_eq!(rest, "-3");
    }

    #[test]
    fn test_next_arc_flag() {
        let (flag, rest) = next_arc_flag(" 1 1 30 50");
        assert_eq!(flag, Some('1'));
        let (flag, rest) = next_arc_flag(rest);
        assert_eq!(flag, Some('1'));
        assert_eq!(rest, " 30 50");
        assert_eq!(next_arc_flag("x").0, None);
    }

    #[test]
    fn test_scan_args() {
        let mut args = [0.0; 6];
        let (na, _) = scan_args("matrix(1 0 0 1 10 20) rest", &mut args, true).unwrap();
        assert_eq!(na, 6);
        assert_approx_eq!(args[4], 10.0);
        let (na, _) = scan_args("0, 5", &mut args, false).unwrap();
        assert_eq!(na, 2);
        assert_approx_eq!(args[1], 5.0);
        // argument overflow is malformed
        assert!(scan_args("1 2 3", &mut args[..2], false).is_none());
        assert!(scan_args("translate(1 2", &mut args, true).is_none());
    }

    #[test]
    fn test_coordinate() {
        let c = Coordinate::parse("12pt");
        assert_approx_eq!(c.value, 12.0);
        assert_eq!(c.units, Units::Pt);
        let c = Coordinate::parse("50%");
        assert_eq!(c.units, Units::Percent);
        let c = Coordinate::parse("3em");
        assert_approx_eq!(c.value, 3.0);
        assert_eq!(c.units, Units::Em);
        assert_eq!("mm".parse::<Units>().unwrap(), Units::Mm);
        assert!("foo".parse::<Units>().is_err());
    }
}
