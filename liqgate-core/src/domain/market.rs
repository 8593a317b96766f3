//! Closed vocabularies describing a liquidity zone: kind, timeframe, bias, price range.
//!
//! Every enum parses from its canonical kebab-case label and nothing else.
//! Upstream detectors emit these labels as strings; an unknown label is a
//! construction failure, never a silent default.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A label that does not belong to the named vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized {vocabulary}: '{value}'")]
pub struct UnknownLabel {
    pub vocabulary: &'static str,
    pub value: String,
}

/// Generates `as_str`, `Display`, `FromStr` and `ALL` for a label enum.
macro_rules! labelled_enum {
    ($name:ident, $vocab:literal, { $($variant:ident => $label:literal),+ $(,)? }) => {
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::domain::market::UnknownLabel;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($label => Ok($name::$variant),)+
                    other => Err($crate::domain::market::UnknownLabel {
                        vocabulary: $vocab,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

pub(crate) use labelled_enum;

/// What kind of liquidity structure a point describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PointKind {
    SellSideLiquidity,
    BuySideLiquidity,
    PreviousHigh,
    PreviousLow,
    OrderBlock,
    FairValueGap,
    BreakerBlock,
    Accumulation,
    Distribution,
}

labelled_enum!(PointKind, "point kind", {
    SellSideLiquidity => "sell-side-liquidity",
    BuySideLiquidity => "buy-side-liquidity",
    PreviousHigh => "previous-high",
    PreviousLow => "previous-low",
    OrderBlock => "order-block",
    FairValueGap => "fair-value-gap",
    BreakerBlock => "breaker-block",
    Accumulation => "accumulation",
    Distribution => "distribution",
});

impl PointKind {
    /// Kinds that can anchor a structural stop-loss.
    pub fn is_stop_anchor(&self) -> bool {
        matches!(
            self,
            PointKind::OrderBlock
                | PointKind::PreviousHigh
                | PointKind::PreviousLow
                | PointKind::BreakerBlock
        )
    }
}

/// Chart granularity the point was detected on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "1m")]
    M1,
    #[serde(rename = "5m")]
    M5,
    #[serde(rename = "15m")]
    M15,
    #[serde(rename = "1h")]
    H1,
    #[serde(rename = "4h")]
    H4,
    #[serde(rename = "1d")]
    D1,
}

labelled_enum!(Timeframe, "timeframe", {
    M1 => "1m",
    M5 => "5m",
    M15 => "15m",
    H1 => "1h",
    H4 => "4h",
    D1 => "1d",
});

/// Directional lean of a liquidity zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DirectionBias {
    Bullish,
    Bearish,
    Neutral,
}

labelled_enum!(DirectionBias, "direction bias", {
    Bullish => "bullish",
    Bearish => "bearish",
    Neutral => "neutral",
});

/// Direction of a trade idea. Unlike `DirectionBias` there is no neutral case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TradeDirection {
    Bullish,
    Bearish,
}

labelled_enum!(TradeDirection, "trade direction", {
    Bullish => "bullish",
    Bearish => "bearish",
});

impl TradeDirection {
    /// The trade direction implied by a bias, if it has one.
    pub fn from_bias(bias: DirectionBias) -> Option<Self> {
        match bias {
            DirectionBias::Bullish => Some(TradeDirection::Bullish),
            DirectionBias::Bearish => Some(TradeDirection::Bearish),
            DirectionBias::Neutral => None,
        }
    }
}

/// Inclusive price band `[low, high]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub low: f64,
    pub high: f64,
}

impl PriceRange {
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// Finite, non-negative, and ordered.
    pub fn is_well_formed(&self) -> bool {
        self.low.is_finite()
            && self.high.is_finite()
            && self.low >= 0.0
            && self.high >= 0.0
            && self.low <= self.high
    }

    /// Strictly below `other` with no overlap.
    pub fn is_entirely_below(&self, other: &PriceRange) -> bool {
        self.high < other.low
    }

    /// Strictly above `other` with no overlap.
    pub fn is_entirely_above(&self, other: &PriceRange) -> bool {
        self.low > other.high
    }
}
