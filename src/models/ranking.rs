use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::PriceError;
use crate::models::{ProductId, ProductPriceSummary};

// ---------------------------------------------------------------------------
// RankingCriterion
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingCriterion {
    /// Discount from the recent high, largest first.
    Discount,
    /// Absolute new-vs-used savings, largest first.
    Savings,
    /// Newest products first.
    ///
    /// The data model has no creation timestamp, so descending product id
    /// stands in for it.
    RecencyProxy,
}

impl RankingCriterion {
    pub fn as_str(&self) -> &'static str {
        match self {
            RankingCriterion::Discount => "discount_percentage",
            RankingCriterion::Savings => "savings_new_vs_used",
            RankingCriterion::RecencyProxy => "recency_proxy",
        }
    }
}

impl fmt::Display for RankingCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RankingCriterion {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "discount" | "discount_percentage" => Ok(RankingCriterion::Discount),
            "savings" | "savings_new_vs_used" => Ok(RankingCriterion::Savings),
            "recency" | "recency_proxy" | "newest" => Ok(RankingCriterion::RecencyProxy),
            other => Err(PriceError::InvalidArgument(format!(
                "Unknown ranking criterion: {}",
                other
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// DealRanking
// ---------------------------------------------------------------------------

/// Ordered deal list tagged with the criterion that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DealRanking {
    pub criterion: RankingCriterion,
    pub category: Option<String>,
    pub entries: Vec<ProductPriceSummary>,
    pub stats: DealStats,
    /// Products left out because their aggregation failed.
    pub excluded: Vec<ExcludedProduct>,
}

impl DealRanking {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn product_ids(&self) -> Vec<ProductId> {
        self.entries.iter().map(|e| e.product_id).collect()
    }
}

/// Aggregate figures over every qualifying entry (before top-N truncation).
///
/// For [`RankingCriterion::RecencyProxy`] only `count` is meaningful.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DealStats {
    pub count: usize,
    pub max: Option<Decimal>,
    pub average: Option<Decimal>,
    pub total: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcludedProduct {
    pub product_id: ProductId,
    pub reason: String,
}
