//! Background color: hex (#RGB, #RRGGBB), a few named colors, and COLORREF.

use core::fmt;
use core::str::FromStr;

/// Solid RGB color painted under the image by the padded policies.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct BackgroundColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Default for BackgroundColor {
    /// Dark gray `#404040`, the desktop color used when none is configured.
    fn default() -> Self {
        Self::rgb(0x40, 0x40, 0x40)
    }
}

impl BackgroundColor {
    /// Black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// White.
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    /// Create a color from its channels.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Decode a Windows `COLORREF` (`0x00BBGGRR`). The high byte is ignored.
    pub const fn from_colorref(value: u32) -> Self {
        Self {
            r: (value & 0xFF) as u8,
            g: ((value >> 8) & 0xFF) as u8,
            b: ((value >> 16) & 0xFF) as u8,
        }
    }

    /// Encode as a Windows `COLORREF` (`0x00BBGGRR`).
    pub const fn to_colorref(self) -> u32 {
        (self.b as u32) << 16 | (self.g as u32) << 8 | self.r as u32
    }

    /// Channels as an opaque RGBA quadruple.
    pub const fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, 255]
    }
}

impl fmt::Display for BackgroundColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Error returned when a string is neither a hex color nor a known name.
#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("invalid color (expected #RGB, #RRGGBB or a color name)")]
pub struct ColorParseError;

impl FromStr for BackgroundColor {
    type Err = ColorParseError;

    /// Accepts `#RGB` / `RGB`, `#RRGGBB` / `RRGGBB`, and the names in
    /// [`NAMED_COLORS`] (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ColorParseError);
        }
        let hex = s.strip_prefix('#').unwrap_or(s);
        parse_hex(hex)
            .or_else(|| lookup_named(s))
            .ok_or(ColorParseError)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for BackgroundColor {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for BackgroundColor {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct Visitor;

        impl serde::de::Visitor<'_> for Visitor {
            type Value = BackgroundColor;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a color string such as \"#404040\"")
            }

            fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Self::Value, E> {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_str(Visitor)
    }
}

fn parse_hex(hex: &str) -> Option<BackgroundColor> {
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let bytes = hex.as_bytes();
    match bytes.len() {
        3 => Some(BackgroundColor::rgb(
            expand_nibble(bytes[0])?,
            expand_nibble(bytes[1])?,
            expand_nibble(bytes[2])?,
        )),
        6 => Some(BackgroundColor::rgb(
            parse_byte(bytes[0], bytes[1])?,
            parse_byte(bytes[2], bytes[3])?,
            parse_byte(bytes[4], bytes[5])?,
        )),
        _ => None,
    }
}

/// 'a' → 0xAA
fn expand_nibble(ch: u8) -> Option<u8> {
    let n = hex_val(ch)?;
    Some(n << 4 | n)
}

fn parse_byte(hi: u8, lo: u8) -> Option<u8> {
    Some(hex_val(hi)? << 4 | hex_val(lo)?)
}

fn hex_val(ch: u8) -> Option<u8> {
    match ch {
        b'0'..=b'9' => Some(ch - b'0'),
        b'a'..=b'f' => Some(ch - b'a' + 10),
        b'A'..=b'F' => Some(ch - b'A' + 10),
        _ => None,
    }
}

fn lookup_named(name: &str) -> Option<BackgroundColor> {
    NAMED_COLORS
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|&(_, [r, g, b])| BackgroundColor::rgb(r, g, b))
}

/// Color names accepted by [`BackgroundColor::from_str`]: the sixteen HTML
/// basic colors plus the gray spellings.
pub const NAMED_COLORS: &[(&str, [u8; 3])] = &[
    ("aqua", [0, 255, 255]),
    ("black", [0, 0, 0]),
    ("blue", [0, 0, 255]),
    ("darkgray", [64, 64, 64]),
    ("darkgrey", [64, 64, 64]),
    ("fuchsia", [255, 0, 255]),
    ("gray", [128, 128, 128]),
    ("green", [0, 128, 0]),
    ("grey", [128, 128, 128]),
    ("lime", [0, 255, 0]),
    ("maroon", [128, 0, 0]),
    ("navy", [0, 0, 128]),
    ("olive", [128, 128, 0]),
    ("purple", [128, 0, 128]),
    ("red", [255, 0, 0]),
    ("silver", [192, 192, 192]),
    ("teal", [0, 128, 128]),
    ("white", [255, 255, 255]),
    ("yellow", [255, 255, 0]),
];
