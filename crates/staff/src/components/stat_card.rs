//! Dashboard stat card.
//!
//! A card shows a label, a value, an icon and an optional percentage trend.
//! Cards render through `templates/components/stat_card.html`, either on
//! their own via [`StatCardTemplate`] or included in a page loop that binds
//! `card`.

use std::fmt;

use askama::Template;

/// Card value: preformatted text or a plain number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatValue {
    Text(String),
    Number(i64),
}

impl fmt::Display for StatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<String> for StatValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for StatValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<u32> for StatValue {
    fn from(n: u32) -> Self {
        Self::Number(i64::from(n))
    }
}

impl From<i64> for StatValue {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

/// Card icon, a sprite in `/static/icons.svg`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatIcon {
    ActiveOrders,
    Orders,
    Revenue,
    Completed,
    Cash,
    Online,
}

impl StatIcon {
    #[must_use]
    pub const fn sprite_id(self) -> &'static str {
        match self {
            Self::ActiveOrders => "flame",
            Self::Orders => "receipt",
            Self::Revenue => "rupee",
            Self::Completed => "check-circle",
            Self::Cash => "wallet",
            Self::Online => "credit-card",
        }
    }
}

/// Direction of a trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendTone {
    Positive,
    Negative,
    Neutral,
}

impl TrendTone {
    /// CSS modifier class.
    #[must_use]
    pub const fn class(self) -> &'static str {
        match self {
            Self::Positive => "stat-card__trend--positive",
            Self::Negative => "stat-card__trend--negative",
            Self::Neutral => "stat-card__trend--neutral",
        }
    }
}

/// Percentage change shown under the value.
#[derive(Debug, Clone, PartialEq)]
pub struct Trend {
    percent: f64,
    /// Comparison period, e.g. "vs yesterday".
    pub label: Option<String>,
}

impl Trend {
    /// A trend of `percent`, or `None` when it is not a finite number.
    #[must_use]
    pub fn from_percent(percent: f64) -> Option<Self> {
        percent.is_finite().then_some(Self {
            // Folds -0.0 into 0.0.
            percent: percent + 0.0,
            label: None,
        })
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub const fn percent(&self) -> f64 {
        self.percent
    }

    #[must_use]
    pub fn tone(&self) -> TrendTone {
        if self.percent > 0.0 {
            TrendTone::Positive
        } else if self.percent < 0.0 {
            TrendTone::Negative
        } else {
            TrendTone::Neutral
        }
    }

    /// Signed percentage: `+5%`, `-3%`, or `0%` for no change.
    #[must_use]
    pub fn delta_text(&self) -> String {
        match self.tone() {
            TrendTone::Positive => format!("+{}%", self.percent),
            TrendTone::Negative => format!("{}%", self.percent),
            TrendTone::Neutral => "0%".to_string(),
        }
    }
}

/// One dashboard stat card.
#[derive(Debug, Clone, PartialEq)]
pub struct StatCard {
    pub label: String,
    pub value: StatValue,
    pub icon: StatIcon,
    pub trend: Option<Trend>,
}

impl StatCard {
    #[must_use]
    pub fn new(label: impl Into<String>, value: impl Into<StatValue>, icon: StatIcon) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            icon,
            trend: None,
        }
    }

    #[must_use]
    pub fn with_trend(mut self, trend: Option<Trend>) -> Self {
        self.trend = trend;
        self
    }
}

/// Renders a single card.
#[derive(Template)]
#[template(path = "components/stat_card.html")]
pub struct StatCardTemplate<'a> {
    pub card: &'a StatCard,
}
