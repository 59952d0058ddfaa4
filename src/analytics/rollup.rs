//! Daily rollup aggregator.
//!
//! Buckets raw observations into per-day min/avg/max statistics. Days are
//! calendar days in an explicit reference timezone, never the raw offset
//! carried by the timestamp, so bucket boundaries match what users see.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;

use crate::models::{DailyBucket, Market, PriceObservation, ProductId, Rollup, Window};

/// Running statistics for one calendar day.
#[derive(Debug, Clone, Copy)]
struct DayAccumulator {
    min: Decimal,
    max: Decimal,
    sum: Decimal,
    count: u32,
}

impl DayAccumulator {
    fn new(price: Decimal) -> Self {
        Self {
            min: price,
            max: price,
            sum: price,
            count: 1,
        }
    }

    fn add(&mut self, price: Decimal) {
        self.min = self.min.min(price);
        self.max = self.max.max(price);
        self.sum += price;
        self.count += 1;
    }

    fn finalize(&self, product_id: ProductId, market: Market, date: NaiveDate) -> DailyBucket {
        // avg of values in [min, max] stays in [min, max]; the clamp only absorbs
        // the last-digit rounding of a 28-digit division.
        let avg = (self.sum / Decimal::from(self.count)).clamp(self.min, self.max);
        DailyBucket {
            product_id,
            market,
            date,
            min_price: self.min,
            avg_price: avg.normalize(),
            max_price: self.max,
            sample_count: self.count,
        }
    }
}

/// Aggregate observations of one product and market into daily buckets.
///
/// Only observations dated within `window` days ending on `today` (both in
/// `tz`) are considered. Observations of other products or markets are
/// ignored. Non-positive prices inside the window are dropped and counted in
/// [`Rollup::discarded`]. Buckets come back in ascending date order, one per
/// day that had at least one valid price.
pub fn daily_rollup<Tz: TimeZone>(
    observations: &[PriceObservation],
    product_id: ProductId,
    market: Market,
    window: Window,
    today: NaiveDate,
    tz: &Tz,
) -> Rollup {
    let first_day = window.first_day(today);
    let mut days: BTreeMap<NaiveDate, DayAccumulator> = BTreeMap::new();
    let mut discarded = 0usize;

    for obs in observations {
        if obs.product_id != product_id || obs.market != market {
            continue;
        }
        let date = local_date(obs.captured_at, tz);
        if date < first_day || date > today {
            continue;
        }
        if !obs.is_valid_price() {
            discarded += 1;
            continue;
        }
        days.entry(date)
            .and_modify(|acc| acc.add(obs.price))
            .or_insert_with(|| DayAccumulator::new(obs.price));
    }

    if discarded > 0 {
        tracing::warn!(
            product_id = %product_id,
            market = %market,
            discarded,
            "Discarded non-positive prices during rollup"
        );
    }

    let buckets = days
        .into_iter()
        .map(|(date, acc)| acc.finalize(product_id, market, date))
        .collect();

    Rollup { buckets, discarded }
}

/// Calendar date of `ts` in `tz`.
pub fn local_date<Tz: TimeZone>(ts: DateTime<Utc>, tz: &Tz) -> NaiveDate {
    ts.with_timezone(tz).date_naive()
}

/// First instant (UTC) of `date` in `tz`.
///
/// Falls back to the first valid local time when midnight falls in a DST gap.
pub fn start_of_day<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> DateTime<Utc> {
    let midnight = date.and_time(chrono::NaiveTime::MIN);
    if let Some(ts) = tz.from_local_datetime(&midnight).earliest() {
        return ts.with_timezone(&Utc);
    }
    (1..=4)
        .filter_map(|h| {
            let shifted = midnight + chrono::Duration::hours(h);
            tz.from_local_datetime(&shifted).earliest()
        })
        .next()
        .map(|ts| ts.with_timezone(&Utc))
        .unwrap_or_else(|| midnight.and_utc())
}

/// UTC instant from which a store must return rows to cover `window` ending on `today`.
pub fn window_start<Tz: TimeZone>(window: Window, today: NaiveDate, tz: &Tz) -> DateTime<Utc> {
    start_of_day(window.first_day(today), tz)
}
