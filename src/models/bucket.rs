use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{PriceError, Result};
use crate::models::{Market, ProductId};

// ---------------------------------------------------------------------------
// Window — supported lookback windows
// ---------------------------------------------------------------------------

/// Lookback window for daily history, in calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum Window {
    Week,
    Month,
    Quarter,
}

impl Window {
    pub fn days(&self) -> u32 {
        match self {
            Window::Week => 7,
            Window::Month => 30,
            Window::Quarter => 90,
        }
    }

    /// Validate a raw day count against the supported set.
    pub fn from_days(days: u32) -> Result<Self> {
        match days {
            7 => Ok(Window::Week),
            30 => Ok(Window::Month),
            90 => Ok(Window::Quarter),
            other => Err(PriceError::InvalidWindow(other)),
        }
    }

    pub fn all() -> [Window; 3] {
        [Window::Week, Window::Month, Window::Quarter]
    }

    /// First calendar day covered when the window ends on `today`.
    pub fn first_day(&self, today: NaiveDate) -> NaiveDate {
        today - chrono::Days::new(u64::from(self.days() - 1))
    }
}

impl TryFrom<u32> for Window {
    type Error = PriceError;

    fn try_from(days: u32) -> Result<Self> {
        Window::from_days(days)
    }
}

impl From<Window> for u32 {
    fn from(window: Window) -> Self {
        window.days()
    }
}

// ---------------------------------------------------------------------------
// DailyBucket — per-day price statistics
// ---------------------------------------------------------------------------

/// Price statistics for one product, market and calendar day.
///
/// Only days with at least one valid observation produce a bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyBucket {
    pub product_id: ProductId,
    pub market: Market,
    pub date: NaiveDate,
    pub min_price: Decimal,
    pub avg_price: Decimal,
    pub max_price: Decimal,
    pub sample_count: u32,
}

/// Output of the rollup aggregator: buckets plus the number of rejected prices.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rollup {
    pub buckets: Vec<DailyBucket>,
    pub discarded: usize,
}

// ---------------------------------------------------------------------------
// DailyHistory — what the API layer receives
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyHistory {
    pub product_id: ProductId,
    pub market: Market,
    pub window: Window,
    pub buckets: Vec<DailyBucket>,
    /// Rows dropped as malformed by the store plus non-positive prices dropped by the rollup.
    pub discarded: usize,
}

impl DailyHistory {
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Summary statistics over the per-day minimum prices.
    ///
    /// Returns `None` when the history has no buckets.
    pub fn stats(&self) -> Option<HistoryStats> {
        let last = self.buckets.last()?;
        let lows = self.buckets.iter().map(|b| b.min_price);
        let lowest = lows.clone().min()?;
        let highest = lows.clone().max()?;
        let total: Decimal = lows.sum();
        Some(HistoryStats {
            current: last.min_price,
            lowest,
            highest,
            average: total / Decimal::from(self.buckets.len()),
            days: self.buckets.len(),
        })
    }
}

/// Headline numbers for a price chart, computed over daily lows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryStats {
    /// Lowest price of the most recent day with data.
    pub current: Decimal,
    pub lowest: Decimal,
    pub highest: Decimal,
    pub average: Decimal,
    pub days: usize,
}
