//! Daily price history queries.

use crate::analytics::{daily_rollup, window_start};
use crate::cache::HistoryKey;
use crate::error::Result;
use crate::models::{DailyHistory, HistoryStats, Market, ProductId, Window};
use crate::PriceEngine;

pub struct HistoryQuery<'a> {
    engine: &'a PriceEngine,
}

impl<'a> HistoryQuery<'a> {
    pub fn new(engine: &'a PriceEngine) -> Self {
        Self { engine }
    }

    /// Daily buckets over the last `window_days` calendar days ending today.
    ///
    /// The window is validated before the store is consulted. Served from the
    /// history cache while fresh.
    pub fn daily(&self, product_id: ProductId, market: Market, window_days: u32) -> Result<DailyHistory> {
        let window = Window::from_days(window_days)?;
        self.for_window(product_id, market, window)
    }

    pub fn for_window(&self, product_id: ProductId, market: Market, window: Window) -> Result<DailyHistory> {
        let today = self.engine.today();
        let key = HistoryKey {
            product_id,
            market,
            window,
            today,
        };
        if let Some(history) = self.engine.cache.get(&key) {
            return Ok(history);
        }

        let tz = &self.engine.tz;
        let batch = self
            .engine
            .store
            .observations(product_id, market, window_start(window, today, tz))?;
        let rollup = daily_rollup(&batch.observations, product_id, market, window, today, tz);

        let history = DailyHistory {
            product_id,
            market,
            window,
            buckets: rollup.buckets,
            discarded: batch.discarded + rollup.discarded,
        };
        self.engine.cache.insert(key, history.clone());
        Ok(history)
    }

    /// Current/lowest/highest/average over the daily lows, `None` without data.
    pub fn stats(&self, product_id: ProductId, market: Market, window_days: u32) -> Result<Option<HistoryStats>> {
        Ok(self.daily(product_id, market, window_days)?.stats())
    }
}
