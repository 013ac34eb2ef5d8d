//! Compositing settings and their `key=value` text form.
//!
//! Parses strings like `mode=fit&background=#202020&thumbnail_height=96`
//! (pairs separated by `&`, `;` or newlines, `#` comment lines skipped)
//! into [`Settings`]. Problems never fail the parse; they are reported as
//! [`ParseWarning`]s and the affected setting keeps its default.
//!
//! # Example
//!
//! ```
//! use wallfit::{BackgroundColor, FitPolicy, settings};
//!
//! let result = settings::parse("mode=fit\nbackground=black");
//! assert!(result.warnings.is_empty());
//! assert_eq!(result.settings.policy, FitPolicy::Fit);
//! assert_eq!(result.settings.background, BackgroundColor::BLACK);
//! ```

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use crate::color::BackgroundColor;
use crate::geometry::FitPolicy;

/// Thumbnail height used when none is configured.
pub const DEFAULT_THUMBNAIL_HEIGHT: u32 = 128;

/// Largest accepted thumbnail height.
pub const MAX_THUMBNAIL_HEIGHT: u32 = 1024;

/// User-facing compositing configuration.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Settings {
    /// How images are fitted to the desktop and to thumbnails.
    pub policy: FitPolicy,
    /// Fill color for the padded policies.
    pub background: BackgroundColor,
    /// Height of playlist thumbnails in pixels, `1..=MAX_THUMBNAIL_HEIGHT`.
    #[cfg_attr(feature = "serde", serde(deserialize_with = "deserialize_height"))]
    pub thumbnail_height: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            policy: FitPolicy::default(),
            background: BackgroundColor::default(),
            thumbnail_height: DEFAULT_THUMBNAIL_HEIGHT,
        }
    }
}

impl Settings {
    /// Canonical text form. [`parse`] reads it back to equal settings.
    pub fn to_query(&self) -> String {
        format!(
            "mode={}&background={}&thumbnail_height={}",
            self.policy, self.background, self.thumbnail_height
        )
    }
}

/// Result of parsing settings text.
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Parsed settings, defaults filled in.
    pub settings: Settings,
    /// Non-fatal parse warnings.
    pub warnings: Vec<ParseWarning>,
}

/// Non-fatal warning from settings parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseWarning {
    /// A setting appeared more than once (last value wins).
    DuplicateKey { key: String, value: String },
    /// A key names no setting.
    KeyNotRecognized { key: String, value: String },
    /// A key was recognized but its value could not be parsed.
    ValueInvalid {
        key: &'static str,
        value: String,
        reason: &'static str,
    },
}

/// Parse settings text. Unset keys take their defaults.
pub fn parse(text: &str) -> ParseResult {
    let mut parsed = Parsed::default();
    let mut warnings = Vec::new();

    for pair in split_pairs(text) {
        let (key, value) = split_pair(pair);
        let key = key.to_ascii_lowercase();
        dispatch_key(&key, value, &mut parsed, &mut warnings);
    }

    let defaults = Settings::default();
    ParseResult {
        settings: Settings {
            policy: parsed.policy.unwrap_or(defaults.policy),
            background: parsed.background.unwrap_or(defaults.background),
            thumbnail_height: parsed.thumbnail_height.unwrap_or(defaults.thumbnail_height),
        },
        warnings,
    }
}

/// Settings seen so far; `None` = not given.
#[derive(Default)]
struct Parsed {
    policy: Option<FitPolicy>,
    background: Option<BackgroundColor>,
    thumbnail_height: Option<u32>,
}

fn dispatch_key(key: &str, value: &str, parsed: &mut Parsed, warnings: &mut Vec<ParseWarning>) {
    match key {
        "mode" | "policy" | "resize" | "resizemode" => set_or_warn(
            &mut parsed.policy,
            value.parse().ok(),
            ("mode", "expected center|tile|stretch|fit|fill|span or 0-5"),
            key,
            value,
            warnings,
        ),
        "background" | "bgcolor" | "color" | "backgroundcolor" => set_or_warn(
            &mut parsed.background,
            value.parse().ok(),
            ("background", "expected #RGB, #RRGGBB or a color name"),
            key,
            value,
            warnings,
        ),
        "thumbnail_height" | "thumbheight" => set_or_warn(
            &mut parsed.thumbnail_height,
            parse_height(value),
            ("thumbnail_height", "expected an integer in 1-1024"),
            key,
            value,
            warnings,
        ),
        _ => warnings.push(ParseWarning::KeyNotRecognized {
            key: String::from(key),
            value: String::from(value),
        }),
    }
}

fn set_or_warn<T>(
    field: &mut Option<T>,
    parsed: Option<T>,
    (canonical, reason): (&'static str, &'static str),
    key: &str,
    value: &str,
    warnings: &mut Vec<ParseWarning>,
) {
    let Some(v) = parsed else {
        warnings.push(ParseWarning::ValueInvalid {
            key: canonical,
            value: String::from(value),
            reason,
        });
        return;
    };
    if field.is_some() {
        warnings.push(ParseWarning::DuplicateKey {
            key: String::from(key),
            value: String::from(value),
        });
    }
    *field = Some(v);
}

fn parse_height(s: &str) -> Option<u32> {
    s.trim().parse::<u32>().ok().filter(|&h| valid_height(h))
}

fn valid_height(h: u32) -> bool {
    (1..=MAX_THUMBNAIL_HEIGHT).contains(&h)
}

#[cfg(feature = "serde")]
fn deserialize_height<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    use serde::de::{Error, Unexpected};

    let h = <u32 as serde::Deserialize>::deserialize(deserializer)?;
    if valid_height(h) {
        Ok(h)
    } else {
        Err(D::Error::invalid_value(
            Unexpected::Unsigned(u64::from(h)),
            &"a thumbnail height in 1-1024",
        ))
    }
}

// ---- Tokenizer ----

/// Split into lines, drop blank and `#` comment lines, then split each
/// line on `&` and `;`.
fn split_pairs(text: &str) -> impl Iterator<Item = &str> {
    let text = text.strip_prefix('?').unwrap_or(text);
    text.split(['\n', '\r'])
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(|line| line.split(['&', ';']))
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Split a single "key=value" pair on the first '='.
fn split_pair(pair: &str) -> (&str, &str) {
    match pair.split_once('=') {
        Some((k, v)) => (k.trim(), v.trim()),
        None => (pair, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    extern crate std;
    use std::vec;

    #[test]
    fn empty_text_gives_defaults() {
        let r = parse("");
        assert_eq!(r.settings, Settings::default());
        assert!(r.warnings.is_empty());
    }

    #[test]
    fn defaults() {
        let s = Settings::default();
        assert_eq!(s.policy, FitPolicy::Fill);
        assert_eq!(s.background, BackgroundColor::rgb(0x40, 0x40, 0x40));
        assert_eq!(s.thumbnail_height, 128);
    }

    #[test]
    fn query_form() {
        let r = parse("?mode=center&bgcolor=fff&thumbheight=96");
        assert!(r.warnings.is_empty(), "{:?}", r.warnings);
        assert_eq!(r.settings.policy, FitPolicy::Center);
        assert_eq!(r.settings.background, BackgroundColor::WHITE);
        assert_eq!(r.settings.thumbnail_height, 96);
    }

    #[test]
    fn line_form_with_comments() {
        let text = "# wallpaper settings\nPolicy = Tile\r\nbackground = #102030\n\n";
        let r = parse(text);
        assert!(r.warnings.is_empty(), "{:?}", r.warnings);
        assert_eq!(r.settings.policy, FitPolicy::Tile);
        assert_eq!(r.settings.background, BackgroundColor::rgb(0x10, 0x20, 0x30));
    }

    #[test]
    fn comment_line_is_skipped_whole() {
        let r = parse("# old: mode=tile&mode=center;background=red\nmode=fit");
        assert!(r.warnings.is_empty(), "{:?}", r.warnings);
        assert_eq!(r.settings.policy, FitPolicy::Fit);
        assert_eq!(r.settings.background, BackgroundColor::default());
    }

    #[test]
    fn hex_color_after_separator_is_not_a_comment() {
        let r = parse("mode=fit&background=#102030");
        assert!(r.warnings.is_empty(), "{:?}", r.warnings);
        assert_eq!(r.settings.background, BackgroundColor::rgb(0x10, 0x20, 0x30));
    }

    #[test]
    fn numeric_policy_code() {
        assert_eq!(parse("mode=5").settings.policy, FitPolicy::Span);
    }

    #[test]
    fn duplicate_key_last_wins() {
        let r = parse("mode=fit;policy=stretch");
        assert_eq!(r.settings.policy, FitPolicy::Stretch);
        assert_eq!(
            r.warnings,
            vec![ParseWarning::DuplicateKey {
                key: "policy".into(),
                value: "stretch".into()
            }]
        );
    }

    #[test]
    fn unknown_key_warns() {
        let r = parse("interval=30&mode=fit");
        assert_eq!(r.settings.policy, FitPolicy::Fit);
        assert_eq!(
            r.warnings,
            vec![ParseWarning::KeyNotRecognized {
                key: "interval".into(),
                value: "30".into()
            }]
        );
    }

    #[test]
    fn invalid_values_warn_and_keep_defaults() {
        let r = parse("mode=zoom&background=notacolor&thumbnail_height=0");
        assert_eq!(r.settings, Settings::default());
        let keys: Vec<_> = r
            .warnings
            .iter()
            .map(|w| match w {
                ParseWarning::ValueInvalid { key, .. } => *key,
                other => panic!("unexpected warning {other:?}"),
            })
            .collect();
        assert_eq!(keys, ["mode", "background", "thumbnail_height"]);
    }

    #[test]
    fn oversized_thumbnail_rejected() {
        let r = parse("thumbnail_height=5000");
        assert_eq!(r.settings.thumbnail_height, 128);
        assert_eq!(r.warnings.len(), 1);
    }

    #[test]
    fn key_without_value_is_invalid() {
        let r = parse("mode");
        assert!(matches!(
            r.warnings.as_slice(),
            [ParseWarning::ValueInvalid { key: "mode", .. }]
        ));
    }

    #[test]
    fn to_query_parses_back() {
        let s = Settings {
            policy: FitPolicy::Center,
            background: BackgroundColor::rgb(1, 2, 3),
            thumbnail_height: 200,
        };
        assert_eq!(s.to_query(), "mode=center&background=#010203&thumbnail_height=200");
        let r = parse(&s.to_query());
        assert!(r.warnings.is_empty());
        assert_eq!(r.settings, s);
    }
}
