//! Candle interval definitions.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Candle interval accepted by the exchange's candles endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CandleInterval {
    /// 1-minute candles.
    #[serde(rename = "m1")]
    Minute1,
    /// 10-minute candles.
    #[serde(rename = "m10")]
    Minute10,
    /// 1-hour candles.
    #[serde(rename = "h1")]
    Hour1,
    /// Daily candles.
    #[default]
    #[serde(rename = "d1")]
    Day1,
    /// Weekly candles.
    #[serde(rename = "w1")]
    Week1,
    /// Monthly candles.
    #[serde(rename = "mn1")]
    Month1,
    /// Quarterly candles.
    #[serde(rename = "q1")]
    Quarter1,
}

impl CandleInterval {
    /// Returns the numeric code the exchange uses for this interval.
    #[must_use]
    pub const fn code(&self) -> u32 {
        match self {
            Self::Minute1 => 1,
            Self::Minute10 => 10,
            Self::Hour1 => 60,
            Self::Day1 => 24,
            Self::Week1 => 7,
            Self::Month1 => 31,
            Self::Quarter1 => 4,
        }
    }

    /// Looks up an interval by its exchange code.
    #[must_use]
    pub const fn from_code(code: u32) -> Option<Self> {
        match code {
            1 => Some(Self::Minute1),
            10 => Some(Self::Minute10),
            60 => Some(Self::Hour1),
            24 => Some(Self::Day1),
            7 => Some(Self::Week1),
            31 => Some(Self::Month1),
            4 => Some(Self::Quarter1),
            _ => None,
        }
    }

    /// Returns the interval as a string identifier.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Minute1 => "m1",
            Self::Minute10 => "m10",
            Self::Hour1 => "h1",
            Self::Day1 => "d1",
            Self::Week1 => "w1",
            Self::Month1 => "mn1",
            Self::Quarter1 => "q1",
        }
    }

    /// Returns all available intervals.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Minute1,
            Self::Minute10,
            Self::Hour1,
            Self::Day1,
            Self::Week1,
            Self::Month1,
            Self::Quarter1,
        ]
    }
}

impl std::fmt::Display for CandleInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CandleInterval {
    type Err = IntervalParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "m1" | "1m" | "1" | "minute" => Ok(Self::Minute1),
            "m10" | "10m" | "10" => Ok(Self::Minute10),
            "h1" | "1h" | "60" | "hour" => Ok(Self::Hour1),
            "d1" | "1d" | "24" | "day" | "daily" => Ok(Self::Day1),
            "w1" | "1w" | "7" | "week" | "weekly" => Ok(Self::Week1),
            "mn1" | "31" | "month" | "monthly" => Ok(Self::Month1),
            "q1" | "4" | "quarter" | "quarterly" => Ok(Self::Quarter1),
            _ => Err(IntervalParseError(s.to_string())),
        }
    }
}

/// Error returned when parsing an invalid candle interval string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntervalParseError(String);

impl std::fmt::Display for IntervalParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid candle interval '{}', expected one of: m1, m10, h1, d1, w1, mn1, q1",
            self.0
        )
    }
}

impl std::error::Error for IntervalParseError {}
