//! Shopping strategies - the four rules for picking one product out of a category.

use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// A rule for picking a single product from a category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    /// Lowest shelf price
    Cheapest,
    /// Highest shelf price
    MostExpensive,
    /// Lowest reference (per-unit) price
    BestValue,
    /// Uniform random pick
    Random,
}

impl StrategyKind {
    /// Every strategy, in menu order.
    pub const ALL: [Self; 4] = [
        Self::Cheapest,
        Self::MostExpensive,
        Self::BestValue,
        Self::Random,
    ];

    /// Stable machine name, accepted back by [`FromStr`].
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cheapest => "cheapest",
            Self::MostExpensive => "most-expensive",
            Self::BestValue => "best-value",
            Self::Random => "random",
        }
    }

    /// Label shown when offering the strategy as a choice.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Cheapest => "The cheapest 🤑",
            Self::MostExpensive => "The most expensive 💎",
            Self::BestValue => "Best value ⚖️",
            Self::Random => "Surprise me! 🎲",
        }
    }

    /// Headline shown above a product this strategy selected.
    #[must_use]
    pub const fn headline(self) -> &'static str {
        match self {
            Self::Cheapest => "Total savings! 🤑",
            Self::MostExpensive => "Luxury treat 💎",
            Self::BestValue => "Smart buy ⚖️",
            Self::Random => "Luck decides 🎲",
        }
    }

    /// RGB colour associated with the strategy.
    #[must_use]
    pub const fn color(self) -> u32 {
        match self {
            Self::Cheapest => 0x004C_AF50,
            Self::MostExpensive => 0x00E9_1E63,
            Self::BestValue => 0x0021_96F3,
            Self::Random => 0x009C_27B0,
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase().replace(['_', ' '], "-");
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| Error::UnknownStrategy(s.to_string()))
    }
}
