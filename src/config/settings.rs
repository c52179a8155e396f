//! User-facing display settings and their normalization
//!
//! Settings arrive from two untrusted directions: persisted data and raw
//! UI control values. Every path in this module is total: invalid input
//! becomes a default or gets clamped, it is never reported as an error.

use serde::Serialize;

/// Color theme for the widget chrome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Dark,
    Light,
}

impl Default for Theme {
    fn default() -> Self {
        Theme::Dark
    }
}

impl Theme {
    /// Maps a persisted theme string, defaulting to dark
    ///
    /// Only the exact spelling "light" selects the light theme; anything
    /// else (including absent or corrupted values) falls back to dark.
    pub fn from_persisted(raw: Option<&str>) -> Self {
        match raw {
            Some("light") => Theme::Light,
            _ => Theme::Dark,
        }
    }
}

/// Display language flag, passed through to the UI layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Es,
}

impl Default for Language {
    fn default() -> Self {
        Language::En
    }
}

impl Language {
    /// Maps a persisted language string, defaulting to English
    pub fn from_persisted(raw: Option<&str>) -> Self {
        match raw {
            Some("es") => Language::Es,
            _ => Language::En,
        }
    }
}

/// Widget settings controlled from the settings panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub theme: Theme,
    /// Marks per tally group, always within the allowed range
    pub tallies_per_group: u32,
    pub language: Language,
}

impl Settings {
    /// Smallest allowed group size
    pub const MIN_TALLIES_PER_GROUP: u32 = 2;
    /// Largest allowed group size
    pub const MAX_TALLIES_PER_GROUP: u32 = 10;
    /// Group size used when no valid value is available
    pub const DEFAULT_TALLIES_PER_GROUP: u32 = 5;
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            tallies_per_group: Self::DEFAULT_TALLIES_PER_GROUP,
            language: Language::default(),
        }
    }
}

/// Normalizes a group size candidate into the allowed range
///
/// # Arguments
/// * `raw` - Parsed candidate, or None when the source was non-numeric
///
/// # Returns
/// The default size for None, otherwise the value clamped to the range.
/// Idempotent: normalizing an already-normalized value changes nothing.
pub fn normalize_group_size(raw: Option<i64>) -> u32 {
    match raw {
        Some(value) => value.clamp(
            i64::from(Settings::MIN_TALLIES_PER_GROUP),
            i64::from(Settings::MAX_TALLIES_PER_GROUP),
        ) as u32,
        None => Settings::DEFAULT_TALLIES_PER_GROUP,
    }
}

/// Parses a group-size control value and normalizes it
///
/// Accepts a base-10 integer prefix the way HTML number inputs surface
/// their value: leading whitespace and sign, then digits, with trailing
/// garbage ignored. Anything without a digit prefix is non-numeric and
/// yields the default.
///
/// # Example
/// ```rust
/// use tally_counter::config::settings::parse_group_size;
///
/// assert_eq!(parse_group_size("7"), 7);
/// assert_eq!(parse_group_size("  8px"), 8);
/// assert_eq!(parse_group_size("40"), 10);
/// assert_eq!(parse_group_size("abc"), 5);
/// ```
pub fn parse_group_size(raw: &str) -> u32 {
    normalize_group_size(parse_leading_integer(raw))
}

/// Extracts a leading base-10 integer from a raw control value
///
/// Values out of i64 range saturate, which the callers' clamps absorb.
pub(crate) fn parse_leading_integer(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    let digit_count = digits.chars().take_while(char::is_ascii_digit).count();
    if digit_count == 0 {
        return None;
    }

    let mut value: i64 = 0;
    for digit in digits[..digit_count].bytes() {
        let next = i64::from(digit - b'0');
        value = value.saturating_mul(10).saturating_add(next);
    }

    Some(if negative { -value } else { value })
}
