//! Discount and savings calculator.
//!
//! Everything here works on unrounded decimals. Rounding is a display
//! concern (see [`round_half_up`](crate::models::round_half_up)).

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use crate::models::{BestPrice, DailyBucket, Market, ProductId, ProductPriceSummary};

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Highest `max_price` among new-market buckets of the last `days` days ending on `today`.
///
/// Returns `None` when no bucket qualifies or the high is not positive.
pub fn recent_high(buckets: &[DailyBucket], days: u32, today: NaiveDate) -> Option<Decimal> {
    let first_day = today - chrono::Days::new(u64::from(days.saturating_sub(1)));
    buckets
        .iter()
        .filter(|b| b.market == Market::New && b.date >= first_day && b.date <= today)
        .map(|b| b.max_price)
        .max()
        .filter(|high| *high > Decimal::ZERO)
}

/// `100 * (recent_high - best_new) / recent_high`, clamped to `[0, 100]`.
///
/// A price above the recent high yields 0, never a negative discount.
pub fn discount_percentage(recent_high: Option<Decimal>, best_new: Option<Decimal>) -> Option<Decimal> {
    let high = recent_high.filter(|h| *h > Decimal::ZERO)?;
    let best = best_new?;
    let pct = HUNDRED * (high - best) / high;
    Some(pct.clamp(Decimal::ZERO, HUNDRED))
}

/// New-minus-used savings and the share of the new price they represent.
///
/// Both prices must be present. The savings may be zero or negative; callers
/// decide deal eligibility with [`ProductPriceSummary::is_used_deal`].
pub fn savings(best_new: Option<Decimal>, best_used: Option<Decimal>) -> Option<(Decimal, Decimal)> {
    let new = best_new.filter(|p| *p > Decimal::ZERO)?;
    let used = best_used?;
    let diff = new - used;
    Some((diff, HUNDRED * diff / new))
}

/// Assemble a [`ProductPriceSummary`] from resolved prices and the recent high.
pub fn summarize(
    product_id: ProductId,
    category: Option<String>,
    best_new: Option<BestPrice>,
    best_used: Option<BestPrice>,
    recent_high: Option<Decimal>,
    resolved_at: DateTime<Utc>,
) -> ProductPriceSummary {
    let new_price = best_new.as_ref().map(|b| b.price);
    let used_price = best_used.as_ref().map(|b| b.price);
    let discount = discount_percentage(recent_high, new_price);
    let (savings_abs, savings_pct) = match savings(new_price, used_price) {
        Some((abs, pct)) => (Some(abs), Some(pct)),
        None => (None, None),
    };

    ProductPriceSummary {
        product_id,
        category,
        best_new_price: new_price,
        best_new_source: best_new.as_ref().map(|b| b.source.clone()),
        best_new_captured_at: best_new.as_ref().map(|b| b.captured_at),
        best_used_price: used_price,
        best_used_source: best_used.as_ref().map(|b| b.source.clone()),
        best_used_captured_at: best_used.as_ref().map(|b| b.captured_at),
        used_listing_count: best_used.as_ref().map(|b| b.current_sources).unwrap_or(0),
        recent_high,
        discount_percentage: discount,
        savings_new_vs_used: savings_abs,
        savings_percentage: savings_pct,
        resolved_at,
    }
}
