//! Per-product summaries and current prices.

use crate::analytics::{daily_rollup, recent_high, summarize, window_start};
use crate::error::Result;
use crate::models::{CurrentPrice, Market, ProductId, ProductMeta, ProductPriceSummary, Window};
use crate::PriceEngine;

pub struct SummaryQuery<'a> {
    engine: &'a PriceEngine,
}

impl<'a> SummaryQuery<'a> {
    pub fn new(engine: &'a PriceEngine) -> Self {
        Self { engine }
    }

    /// Summary for `product_id`, or `None` if the catalog has no such product.
    ///
    /// A known product without current prices yields a summary with every
    /// price field absent.
    pub fn get(&self, product_id: ProductId) -> Result<Option<ProductPriceSummary>> {
        match self.engine.store.product_meta(product_id)? {
            Some(meta) => self.for_product(&meta).map(Some),
            None => Ok(None),
        }
    }

    /// Build the summary of a catalog entry.
    pub fn for_product(&self, meta: &ProductMeta) -> Result<ProductPriceSummary> {
        let engine = self.engine;
        let now = engine.now();
        let today = engine.today();
        let id = meta.product_id;
        let current_since = now - engine.resolver.staleness();

        // One read of new-market rows covers both the recent high and resolution.
        let high_since = window_start(Window::Quarter, today, &engine.tz).min(current_since);
        let new_batch = engine.store.observations(id, Market::New, high_since)?;
        let used_batch = engine.store.observations(id, Market::Used, current_since)?;

        let rollup = daily_rollup(&new_batch.observations, id, Market::New, Window::Quarter, today, &engine.tz);
        let high = recent_high(&rollup.buckets, engine.settings.recent_high_days, today);

        let best_new = engine.resolver.resolve(&new_batch.observations, Market::New, now);
        let best_used = engine.resolver.resolve(&used_batch.observations, Market::Used, now);

        let category = Some(meta.category.trim())
            .filter(|c| !c.is_empty())
            .map(str::to_string);

        Ok(summarize(id, category, best_new, best_used, high, now))
    }

    /// Best current new-market price, `None` when no source is current.
    pub fn current_price(&self, product_id: ProductId) -> Result<Option<CurrentPrice>> {
        let engine = self.engine;
        let now = engine.now();
        let batch = engine
            .store
            .observations(product_id, Market::New, now - engine.resolver.staleness())?;
        Ok(engine
            .resolver
            .resolve(&batch.observations, Market::New, now)
            .map(|best| CurrentPrice {
                product_id,
                market: Market::New,
                price: best.price,
                source: best.source,
                captured_at: best.captured_at,
                resolved_at: now,
            }))
    }
}
