//! Supported display locales.

use serde::{Deserialize, Serialize};

/// Error returned when a locale tag is not supported.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported locale: {0}")]
pub struct UnknownLocale(pub String);

/// Display locale for numbers and dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Locale {
    /// Indian English (lakh/crore digit grouping).
    #[default]
    #[serde(rename = "en-IN")]
    EnIn,
    /// US English.
    #[serde(rename = "en-US")]
    EnUs,
    /// British English.
    #[serde(rename = "en-GB")]
    EnGb,
}

/// How integer digits are grouped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Grouping {
    /// `1,234,567`
    Thousands,
    /// `12,34,567`
    Indian,
}

impl Locale {
    /// Canonical BCP 47 tag.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::EnIn => "en-IN",
            Self::EnUs => "en-US",
            Self::EnGb => "en-GB",
        }
    }

    pub(crate) const fn grouping(self) -> Grouping {
        match self {
            Self::EnIn => Grouping::Indian,
            Self::EnUs | Self::EnGb => Grouping::Thousands,
        }
    }

    /// chrono pattern for a short year-month-day date.
    pub(crate) const fn date_pattern(self) -> &'static str {
        match self {
            Self::EnIn => "%d %b, %Y",
            Self::EnUs => "%b %d, %Y",
            Self::EnGb => "%d %b %Y",
        }
    }

    /// chrono pattern for hour and minute.
    pub(crate) const fn time_pattern(self) -> &'static str {
        match self {
            Self::EnIn => "%I:%M %P",
            Self::EnUs => "%I:%M %p",
            Self::EnGb => "%H:%M",
        }
    }
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

impl std::str::FromStr for Locale {
    type Err = UnknownLocale;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().replace('_', "-").to_ascii_lowercase().as_str() {
            "en-in" => Ok(Self::EnIn),
            "en" | "en-us" => Ok(Self::EnUs),
            "en-gb" => Ok(Self::EnGb),
            _ => Err(UnknownLocale(s.to_string())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_posix_style() {
        assert_eq!("en_GB".parse::<Locale>().unwrap(), Locale::EnGb);
        assert_eq!("EN-in".parse::<Locale>().unwrap(), Locale::EnIn);
    }

    #[test]
    fn test_unknown_tag_is_rejected() {
        assert!("fr-FR".parse::<Locale>().is_err());
        assert_eq!(Locale::default(), Locale::EnIn);
    }

    #[test]
    fn test_serde_uses_tags() {
        assert_eq!(serde_json::to_string(&Locale::EnUs).unwrap(), "\"en-US\"");
    }
}
