//! sRGBA colors and the SVG color grammar
use crate::scan::parse_float;
use bytemuck::{Pod, Zeroable};
use std::{fmt, str::FromStr};

/// Fallback used for every color parse error, matching what SVGs in the wild
/// have come to rely on.
const GRAY: Rgba = Rgba::rgb(128, 128, 128);

/// Basic CSS color keywords
const NAMED_COLORS: [(&str, Rgba); 10] = [
    ("red", Rgba::rgb(255, 0, 0)),
    ("green", Rgba::rgb(0, 128, 0)),
    ("blue", Rgba::rgb(0, 0, 255)),
    ("yellow", Rgba::rgb(255, 255, 0)),
    ("cyan", Rgba::rgb(0, 255, 255)),
    ("magenta", Rgba::rgb(255, 0, 255)),
    ("black", Rgba::rgb(0, 0, 0)),
    ("grey", Rgba::rgb(128, 128, 128)),
    ("gray", Rgba::rgb(128, 128, 128)),
    ("white", Rgba::rgb(255, 255, 255)),
];

/// sRGBA color packed as [u8; 4]
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Pod, Zeroable)]
pub struct Rgba([u8; 4]);

impl Rgba {
    /// Create new RGBA color
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self([r, g, b, a])
    }

    /// Fully opaque color from RGB components
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b, 255])
    }

    /// Red channel value
    pub const fn red(self) -> u8 {
        self.0[0]
    }

    /// Green channel value
    pub const fn green(self) -> u8 {
        self.0[1]
    }

    /// Blue channel value
    pub const fn blue(self) -> u8 {
        self.0[2]
    }

    /// Alpha channel value
    pub const fn alpha(self) -> u8 {
        self.0[3]
    }

    /// Same color with the alpha channel replaced
    pub const fn with_alpha(self, alpha: u8) -> Self {
        let Self([r, g, b, _]) = self;
        Self([r, g, b, alpha])
    }

    /// Channels as an RGBA array
    pub const fn to_rgba(self) -> [u8; 4] {
        self.0
    }

    /// Parse an SVG paint color, falling back to `#808080` on any error for
    /// backward compatibility with existing SVGs in the wild.
    pub fn parse_lossy(color: &str) -> Self {
        Self::parse_svg(color).unwrap_or(GRAY)
    }

    fn parse_svg(color: &str) -> Result<Self, ColorError> {
        let color = color.trim_start_matches(' ');
        if let Some(hex) = color.strip_prefix('#') {
            return Self::parse_hex(hex);
        }
        if color.starts_with("rgb(") {
            return Self::parse_rgb(color);
        }
        NAMED_COLORS
            .iter()
            .find(|(name, _)| *name == color)
            .map(|(_, rgba)| *rgba)
            .ok_or_else(|| ColorError::UnknownColor(color.to_owned()))
    }

    /// `#rrggbb` when six hex digits are present, otherwise `#rgb` with each
    /// nibble doubled (`#abc` is `#aabbcc`).
    fn parse_hex(hex: &str) -> Result<Self, ColorError> {
        let digit = |byte: u8| match byte {
            b'A'..=b'F' => Some(byte - b'A' + 10),
            b'a'..=b'f' => Some(byte - b'a' + 10),
            b'0'..=b'9' => Some(byte - b'0'),
            _ => None,
        };
        let digits: Vec<u8> = hex.bytes().map_while(digit).collect();
        if digits.len() >= 6 {
            Ok(Rgba::rgb(
                (digits[0] << 4) | digits[1],
                (digits[2] << 4) | digits[3],
                (digits[4] << 4) | digits[5],
            ))
        } else if digits.len() >= 3 {
            Ok(Rgba::rgb(digits[0] * 17, digits[1] * 17, digits[2] * 17))
        } else {
            Err(ColorError::HexExpected)
        }
    }

    /// `rgb(i, i, i)` with integers, or `rgb(p%, p%, p%)` with
    /// locale-independent percentages.
    fn parse_rgb(color: &str) -> Result<Self, ColorError> {
        let inner = &color[4..];
        let inner = inner.strip_suffix(')').unwrap_or(inner);

        // try decimal integers first
        let ints: Option<Vec<u32>> = inner
            .split(',')
            .map(|part| {
                let part = part.trim();
                if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                    None
                } else {
                    part.parse::<u32>().ok()
                }
            })
            .collect();
        if let Some(ints) = ints {
            if ints.len() == 3 {
                // clip values as the CSS spec requires
                return Ok(Rgba::rgb(
                    ints[0].min(255) as u8,
                    ints[1].min(255) as u8,
                    ints[2].min(255) as u8,
                ));
            }
        }

        // integers failed, try percent values
        let mut channels = [0u32; 3];
        let delimiters = [',', ',', ')'];
        let mut rest = &color[4..];
        for (channel, delimiter) in channels.iter_mut().zip(delimiters) {
            rest = rest.trim_start_matches(' ');
            rest = rest.strip_prefix('+').unwrap_or(rest);
            let value = parse_float(rest);

            // skip the number: integer part, then a fractional part which
            // requires at least one digit after the dot
            let digits = rest.bytes().take_while(|b| b.is_ascii_digit()).count();
            rest = &rest[digits..];
            if let Some(tail) = rest.strip_prefix('.') {
                let frac = tail.bytes().take_while(|b| b.is_ascii_digit()).count();
                if frac == 0 {
                    return Err(ColorError::InvalidRgb);
                }
                rest = &tail[frac..];
            }
            rest = rest.strip_prefix('%').ok_or(ColorError::InvalidRgb)?;
            rest = rest.trim_start_matches(' ');
            rest = rest.strip_prefix(delimiter).ok_or(ColorError::InvalidRgb)?;

            *channel = ((value * 2.55).round() as i64).clamp(0, 255) as u32;
        }
        Ok(Rgba::rgb(
            channels[0] as u8,
            channels[1] as u8,
            channels[2] as u8,
        ))
    }
}

impl fmt::Debug for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b, a] = self.to_rgba();
        write!(f, "#{:02x}{:02x}{:02x}", r, g, b)?;
        if a != 255 {
            write!(f, "{:02x}", a)?;
        }
        Ok(())
    }
}

impl FromStr for Rgba {
    type Err = ColorError;

    fn from_str(color: &str) -> Result<Self, Self::Err> {
        Self::parse_svg(color)
    }
}

impl From<[u8; 4]> for Rgba {
    #[inline]
    fn from(rgba: [u8; 4]) -> Self {
        Rgba(rgba)
    }
}

#[derive(Debug, Clone)]
pub enum ColorError {
    /// Hex value expected after `#`
    HexExpected,
    /// Malformed `rgb(...)` value
    InvalidRgb,
    /// Color name is not one of the basic keywords
    UnknownColor(String),
}

impl fmt::Display for ColorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorError::HexExpected => write!(f, "hex value expected"),
            ColorError::InvalidRgb => write!(f, "malformed rgb() color"),
            ColorError::UnknownColor(name) => write!(f, "unknown named color: {}", name),
        }
    }
}

impl std::error::Error for ColorError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        assert_eq!(Rgba::parse_lossy("#ff0000"), Rgba::rgb(255, 0, 0));
        assert_eq!(Rgba::parse_lossy("#abc"), Rgba::rgb(0xaa, 0xbb, 0xcc));
        assert_eq!(Rgba::parse_lossy("#0000ff"), Rgba::rgb(0, 0, 255));
        // short of three digits falls back to gray
        assert_eq!(Rgba::parse_lossy("#ab"), GRAY);
    }

    #[test]
    fn test_parse_rgb() {
        assert_eq!(Rgba::parse_lossy("rgb(1, 2, 3)"), Rgba::rgb(1, 2, 3));
        assert_eq!(Rgba::parse_lossy("rgb(300,0,0)"), Rgba::rgb(255, 0, 0));
        assert_eq!(
            Rgba::parse_lossy("rgb(100%, 0%, 50%)"),
            Rgba::rgb(255, 0, 128)
        );
        // a decimal point without fractional digits is an error
        assert_eq!(Rgba::parse_lossy("rgb(33.%, 0%, 0%)"), GRAY);
    }

    #[test]
    fn test_parse_named() {
        assert_eq!(Rgba::parse_lossy("blue"), Rgba::rgb(0, 0, 255));
        assert_eq!(Rgba::parse_lossy("grey"), GRAY);
        assert_eq!(Rgba::parse_lossy("no-such-color"), GRAY);
        assert!("no-such-color".parse::<Rgba>().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Rgba::rgb(1, 2, 3).to_string(), "#010203");
        assert_eq!(Rgba::new(1, 2, 3, 4).to_string(), "#01020304");
    }

    #[test]
    fn test_with_alpha() {
        let c = Rgba::rgb(10, 20, 30).with_alpha(127);
        assert_eq!(c.alpha(), 127);
        assert_eq!(c.red(), 10);
    }
}
