//! Hex colors used by the signature theme and raster flattening.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// RGBA color stored in 8-bit channels, serialized as `#RRGGBB` / `#RRGGBBAA`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RgbaColor {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
}

impl RgbaColor {
    pub const WHITE: RgbaColor = RgbaColor::opaque(255, 255, 255);
    pub const BLACK: RgbaColor = RgbaColor::opaque(0, 0, 0);

    /// Constructs an opaque RGB color.
    pub const fn opaque(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red,
            green,
            blue,
            alpha: 255,
        }
    }

    /// CSS hex notation; alpha is only written when the color is translucent.
    pub fn to_css_hex(self) -> String {
        if self.alpha == 255 {
            format!("#{:02X}{:02X}{:02X}", self.red, self.green, self.blue)
        } else {
            format!(
                "#{:02X}{:02X}{:02X}{:02X}",
                self.red, self.green, self.blue, self.alpha
            )
        }
    }

    pub fn to_rgba(self) -> [u8; 4] {
        [self.red, self.green, self.blue, self.alpha]
    }
}

impl Default for RgbaColor {
    fn default() -> Self {
        Self::WHITE
    }
}

impl fmt::Display for RgbaColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css_hex())
    }
}

impl FromStr for RgbaColor {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        parse_hex_color(value).ok_or_else(|| format!("invalid hex color '{value}'"))
    }
}

impl TryFrom<String> for RgbaColor {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RgbaColor> for String {
    fn from(color: RgbaColor) -> Self {
        color.to_css_hex()
    }
}

/// Parse `#RGB`, `#RRGGBB` or `#RRGGBBAA` (the `#` is optional).
pub fn parse_hex_color(input: &str) -> Option<RgbaColor> {
    let hex = input.trim();
    let hex = hex.strip_prefix('#').unwrap_or(hex);
    if !hex.is_ascii() {
        return None;
    }
    let byte = |range: std::ops::Range<usize>| u8::from_str_radix(hex.get(range)?, 16).ok();
    let nibble = |idx: usize| byte(idx..idx + 1).map(|n| (n << 4) | n);

    match hex.len() {
        3 => Some(RgbaColor::opaque(nibble(0)?, nibble(1)?, nibble(2)?)),
        6 => Some(RgbaColor::opaque(byte(0..2)?, byte(2..4)?, byte(4..6)?)),
        8 => Some(RgbaColor {
            red: byte(0..2)?,
            green: byte(2..4)?,
            blue: byte(4..6)?,
            alpha: byte(6..8)?,
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_short_and_long_forms() {
        assert_eq!(parse_hex_color("#3B82F6"), Some(RgbaColor::opaque(0x3B, 0x82, 0xF6)));
        assert_eq!(parse_hex_color("fff"), Some(RgbaColor::WHITE));
        assert_eq!(
            parse_hex_color("#00000080"),
            Some(RgbaColor {
                red: 0,
                green: 0,
                blue: 0,
                alpha: 0x80
            })
        );
        assert_eq!(parse_hex_color("#12345"), None);
        assert_eq!(parse_hex_color("#zzzzzz"), None);
    }

    #[test]
    fn css_hex_omits_opaque_alpha() {
        assert_eq!(RgbaColor::opaque(0x64, 0x74, 0x8b).to_css_hex(), "#64748B");
        let translucent = RgbaColor {
            alpha: 0x10,
            ..RgbaColor::BLACK
        };
        assert_eq!(translucent.to_css_hex(), "#00000010");
    }

    #[test]
    fn serializes_as_hex_string() {
        let json = serde_json::to_string(&RgbaColor::opaque(1, 2, 3)).unwrap();
        assert_eq!(json, "\"#010203\"");
        let parsed: RgbaColor = serde_json::from_str("\"#3b82f6\"").unwrap();
        assert_eq!(parsed, RgbaColor::opaque(0x3B, 0x82, 0xF6));
        assert!(serde_json::from_str::<RgbaColor>("\"blue\"").is_err());
    }
}
