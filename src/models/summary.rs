use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::models::{Market, ProductId};

// ---------------------------------------------------------------------------
// BestPrice — resolver output for one market
// ---------------------------------------------------------------------------

/// Cheapest current offer in one market.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BestPrice {
    pub price: Decimal,
    pub source: String,
    pub captured_at: DateTime<Utc>,
    /// Number of distinct sources that were current when this was resolved.
    pub current_sources: usize,
}

// ---------------------------------------------------------------------------
// CurrentPrice — what an alert evaluator consumes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentPrice {
    pub product_id: ProductId,
    pub market: Market,
    pub price: Decimal,
    pub source: String,
    pub captured_at: DateTime<Utc>,
    /// The instant the staleness threshold was measured against.
    pub resolved_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// ProductPriceSummary
// ---------------------------------------------------------------------------

/// Derived per-product view: best prices, discount and used-vs-new savings.
///
/// Percentages and savings are stored unrounded. Use the `*_display`
/// accessors for presentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPriceSummary {
    pub product_id: ProductId,
    pub category: Option<String>,
    pub best_new_price: Option<Decimal>,
    pub best_new_source: Option<String>,
    pub best_new_captured_at: Option<DateTime<Utc>>,
    pub best_used_price: Option<Decimal>,
    pub best_used_source: Option<String>,
    pub best_used_captured_at: Option<DateTime<Utc>>,
    pub used_listing_count: usize,
    pub recent_high: Option<Decimal>,
    pub discount_percentage: Option<Decimal>,
    pub savings_new_vs_used: Option<Decimal>,
    pub savings_percentage: Option<Decimal>,
    pub resolved_at: DateTime<Utc>,
}

impl ProductPriceSummary {
    /// True when a current price exists in either market.
    pub fn has_current_price(&self) -> bool {
        self.best_new_price.is_some() || self.best_used_price.is_some()
    }

    /// Used listing strictly cheaper than new.
    pub fn is_used_deal(&self) -> bool {
        self.savings_new_vs_used
            .map(|s| s > Decimal::ZERO)
            .unwrap_or(false)
    }

    pub fn is_discounted(&self) -> bool {
        self.discount_percentage
            .map(|d| d > Decimal::ZERO)
            .unwrap_or(false)
    }

    pub fn discount_percentage_display(&self) -> Option<Decimal> {
        self.discount_percentage.map(round_half_up)
    }

    pub fn savings_display(&self) -> Option<Decimal> {
        self.savings_new_vs_used.map(round_half_up)
    }

    pub fn savings_percentage_display(&self) -> Option<Decimal> {
        self.savings_percentage.map(round_half_up)
    }

    /// The new-market best price as a [`CurrentPrice`], if any.
    pub fn current_new_price(&self) -> Option<CurrentPrice> {
        Some(CurrentPrice {
            product_id: self.product_id,
            market: Market::New,
            price: self.best_new_price?,
            source: self.best_new_source.clone()?,
            captured_at: self.best_new_captured_at?,
            resolved_at: self.resolved_at,
        })
    }

    pub fn current_used_price(&self) -> Option<CurrentPrice> {
        Some(CurrentPrice {
            product_id: self.product_id,
            market: Market::Used,
            price: self.best_used_price?,
            source: self.best_used_source.clone()?,
            captured_at: self.best_used_captured_at?,
            resolved_at: self.resolved_at,
        })
    }
}

/// Round to a whole number, halves away from zero (half-up for the
/// non-negative values this crate displays).
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}
