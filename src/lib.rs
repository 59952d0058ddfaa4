//! Price-intelligence core for a product price-tracking platform.
//!
//! Turns raw retailer and marketplace price observations into daily
//! min/avg/max histories, current best prices per market, discount and
//! used-vs-new savings figures, and ranked deal lists. Prices are
//! [`Decimal`](rust_decimal::Decimal) throughout and day boundaries follow an
//! explicit reference timezone.
//!
//! # Quick start
//!
//! ```no_run
//! use pricewatch_core::{Market, PriceEngine, ProductId, RankingCriterion};
//! use pricewatch_core::store::DuckDbStore;
//!
//! let store = DuckDbStore::open_in_memory()?;
//! store.load_products("snapshots/products.ndjson")?;
//! store.load_observations("snapshots/observations.ndjson.gz")?;
//!
//! let engine = PriceEngine::builder().store(store).build()?;
//!
//! let history = engine.daily_history(ProductId(42), Market::New, 30)?;
//! let summary = engine.price_summary(ProductId(42))?;
//! let deals = engine.top_deals(RankingCriterion::Discount, Some("smartphone"), 10)?;
//! # Ok::<(), pricewatch_core::PriceError>(())
//! ```

pub mod analytics;
#[cfg(feature = "async")]
pub mod async_engine;
pub mod cache;
pub mod config;
pub mod connection;
pub mod error;
pub mod models;
pub mod queries;
pub mod sql_builder;
pub mod store;

#[cfg(feature = "async")]
pub use async_engine::AsyncPriceEngine;
pub use cache::{HistoryCache, HistoryKey};
pub use config::EngineSettings;
pub use connection::Connection;
pub use error::{PriceError, Result};
pub use models::*;
pub use sql_builder::SqlBuilder;
pub use store::{ObservationBatch, ObservationStore};

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

use analytics::MarketPriceResolver;

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Source of "now" for staleness checks and the reference date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Clock {
    #[default]
    System,
    /// Frozen instant, for reproducible results and tests.
    Fixed(DateTime<Utc>),
}

impl Clock {
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::System => Utc::now(),
            Clock::Fixed(ts) => *ts,
        }
    }
}

// ---------------------------------------------------------------------------
// PriceEngineBuilder
// ---------------------------------------------------------------------------

/// Builder for a [`PriceEngine`].
///
/// Starts from [`EngineSettings::default`]; use [`settings`](Self::settings)
/// to apply settings loaded with [`EngineSettings::load`].
#[derive(Default)]
pub struct PriceEngineBuilder {
    store: Option<Box<dyn ObservationStore>>,
    http_base_url: Option<String>,
    settings: EngineSettings,
    clock: Clock,
}

impl PriceEngineBuilder {
    /// Read observations from `store`.
    pub fn store<S: ObservationStore + 'static>(mut self, store: S) -> Self {
        self.store = Some(Box::new(store));
        self
    }

    /// Read observations from the REST API at `base_url`, bounded by the
    /// configured store timeout.
    pub fn http(mut self, base_url: &str) -> Self {
        self.http_base_url = Some(base_url.to_string());
        self
    }

    pub fn settings(mut self, settings: EngineSettings) -> Self {
        self.settings = settings;
        self
    }

    /// IANA name of the timezone whose calendar days define buckets.
    pub fn reference_timezone(mut self, tz: &str) -> Self {
        self.settings.reference_timezone = tz.to_string();
        self
    }

    pub fn staleness_hours(mut self, hours: i64) -> Self {
        self.settings.staleness_hours = hours;
        self
    }

    pub fn recent_high_days(mut self, days: u32) -> Self {
        self.settings.recent_high_days = days;
        self
    }

    /// History cache TTL in minutes (15..=60), or `None` to disable caching.
    pub fn cache_ttl_minutes(mut self, minutes: Option<u64>) -> Self {
        self.settings.cache_ttl_minutes = minutes;
        self
    }

    pub fn store_timeout_ms(mut self, ms: u64) -> Self {
        self.settings.store_timeout_ms = ms;
        self
    }

    pub fn clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Validate the settings and build the engine.
    pub fn build(self) -> Result<PriceEngine> {
        self.settings.validate()?;
        let tz = self.settings.reference_tz()?;

        let store: Box<dyn ObservationStore> = match (self.store, self.http_base_url) {
            (Some(store), _) => store,
            (None, Some(url)) => Box::new(store::HttpStore::with_timeout(
                &url,
                self.settings.store_timeout(),
            )?),
            (None, None) => {
                return Err(PriceError::InvalidArgument(
                    "no observation store configured".into(),
                ))
            }
        };

        let engine = PriceEngine {
            store,
            tz,
            resolver: MarketPriceResolver::new(self.settings.staleness()),
            cache: HistoryCache::new(self.settings.cache_ttl()),
            clock: self.clock,
            settings: self.settings,
        };
        tracing::debug!(engine = %engine, "Built price engine");
        Ok(engine)
    }
}

// ---------------------------------------------------------------------------
// PriceEngine
// ---------------------------------------------------------------------------

/// Entry point: owns the store, the history cache and the reference clock.
///
/// Domain operations are grouped into lightweight borrowing query wrappers
/// ([`history`](Self::history), [`summaries`](Self::summaries),
/// [`deals`](Self::deals)); the most common ones are also available directly.
/// The engine is `Send + Sync` and can be shared across threads.
pub struct PriceEngine {
    pub(crate) store: Box<dyn ObservationStore>,
    pub(crate) tz: Tz,
    pub(crate) resolver: MarketPriceResolver,
    pub(crate) cache: HistoryCache,
    pub(crate) clock: Clock,
    pub(crate) settings: EngineSettings,
}

impl PriceEngine {
    pub fn builder() -> PriceEngineBuilder {
        PriceEngineBuilder::default()
    }

    // -- Query accessors ---------------------------------------------------

    /// Daily histories and chart statistics.
    pub fn history(&self) -> queries::HistoryQuery<'_> {
        queries::HistoryQuery::new(self)
    }

    /// Per-product summaries and current prices.
    pub fn summaries(&self) -> queries::SummaryQuery<'_> {
        queries::SummaryQuery::new(self)
    }

    /// Catalog-wide rankings.
    pub fn deals(&self) -> queries::DealQuery<'_> {
        queries::DealQuery::new(self)
    }

    // -- Exposed operations ------------------------------------------------

    /// Daily buckets for one product and market over the last `window_days`
    /// (7, 30 or 90) calendar days.
    pub fn daily_history(&self, product_id: ProductId, market: Market, window_days: u32) -> Result<DailyHistory> {
        self.history().daily(product_id, market, window_days)
    }

    /// Summary for one product, `None` only when the catalog doesn't know it.
    pub fn price_summary(&self, product_id: ProductId) -> Result<Option<ProductPriceSummary>> {
        self.summaries().get(product_id)
    }

    /// Top `limit` products by `criterion`, optionally scoped to a category.
    pub fn top_deals(
        &self,
        criterion: RankingCriterion,
        category: Option<&str>,
        limit: usize,
    ) -> Result<DealRanking> {
        self.deals().top(criterion, category, limit)
    }

    pub fn history_stats(
        &self,
        product_id: ProductId,
        market: Market,
        window_days: u32,
    ) -> Result<Option<HistoryStats>> {
        self.history().stats(product_id, market, window_days)
    }

    /// Current best new-market price, as consumed by the alert evaluator.
    pub fn current_price(&self, product_id: ProductId) -> Result<Option<CurrentPrice>> {
        self.summaries().current_price(product_id)
    }

    /// Products whose used listing undercuts the new price, largest savings first.
    pub fn used_deals(&self, category: Option<&str>, limit: usize) -> Result<DealRanking> {
        self.deals().used(category, limit)
    }

    pub fn trending(&self, seed: u64, category: Option<&str>, limit: usize) -> Result<Vec<ProductPriceSummary>> {
        self.deals().trending(seed, category, limit)
    }

    /// Drop cached histories of `product_id`, e.g. after new observations were ingested.
    pub fn invalidate_cache(&self, product_id: ProductId) -> usize {
        self.cache.invalidate(product_id)
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    // -- Accessors ---------------------------------------------------------

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Today's date in the reference timezone.
    pub fn today(&self) -> NaiveDate {
        analytics::local_date(self.now(), &self.tz)
    }

    pub fn reference_tz(&self) -> Tz {
        self.tz
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn cache(&self) -> &HistoryCache {
        &self.cache
    }

    pub fn store(&self) -> &dyn ObservationStore {
        self.store.as_ref()
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl fmt::Display for PriceEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PriceEngine({}, cached_histories={})",
            self.settings,
            self.cache.len()
        )
    }
}
