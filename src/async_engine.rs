//! Async wrapper around [`PriceEngine`] for Tokio services.
//!
//! Engine calls run on the blocking thread pool via
//! [`tokio::task::spawn_blocking`]. The engine is `Sync`, so it is shared
//! through an `Arc` without a lock.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use pricewatch_core::{AsyncPriceEngine, Market, PriceEngine, ProductId};
//! use pricewatch_core::store::DuckDbStore;
//!
//! # async fn example() -> pricewatch_core::Result<()> {
//! let engine = PriceEngine::builder().store(DuckDbStore::open_in_memory()?).build()?;
//! let engine = AsyncPriceEngine::new(engine);
//!
//! let history = engine.daily_history(ProductId(42), Market::New, 30).await?;
//! let summary = engine
//!     .run_with_timeout(Duration::from_secs(2), |e| e.price_summary(ProductId(42)))
//!     .await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use crate::error::{PriceError, Result};
use crate::models::{CurrentPrice, DailyHistory, DealRanking, Market, ProductId, ProductPriceSummary, RankingCriterion};
use crate::PriceEngine;

#[derive(Clone)]
pub struct AsyncPriceEngine {
    inner: Arc<PriceEngine>,
}

impl AsyncPriceEngine {
    pub fn new(engine: PriceEngine) -> Self {
        Self {
            inner: Arc::new(engine),
        }
    }

    /// Borrow the underlying engine for synchronous use.
    pub fn engine(&self) -> &PriceEngine {
        &self.inner
    }

    /// Run a sync engine operation on the blocking thread pool.
    pub async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&PriceEngine) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let engine = self.inner.clone();
        tokio::task::spawn_blocking(move || f(&engine))
            .await
            .map_err(|e| PriceError::DataUnavailable(format!("Task join error: {e}")))?
    }

    /// Like [`run`](Self::run), but gives up after `timeout`.
    ///
    /// The blocking task is not cancelled; its result is discarded.
    pub async fn run_with_timeout<F, T>(&self, timeout: Duration, f: F) -> Result<T>
    where
        F: FnOnce(&PriceEngine) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        match tokio::time::timeout(timeout, self.run(f)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(timeout_ms = timeout.as_millis() as u64, "Engine request timed out");
                Err(PriceError::DataUnavailable(format!(
                    "request exceeded {} ms",
                    timeout.as_millis()
                )))
            }
        }
    }

    pub async fn daily_history(&self, product_id: ProductId, market: Market, window_days: u32) -> Result<DailyHistory> {
        self.run(move |e| e.daily_history(product_id, market, window_days)).await
    }

    pub async fn price_summary(&self, product_id: ProductId) -> Result<Option<ProductPriceSummary>> {
        self.run(move |e| e.price_summary(product_id)).await
    }

    pub async fn top_deals(
        &self,
        criterion: RankingCriterion,
        category: Option<String>,
        limit: usize,
    ) -> Result<DealRanking> {
        self.run(move |e| e.top_deals(criterion, category.as_deref(), limit)).await
    }

    pub async fn current_price(&self, product_id: ProductId) -> Result<Option<CurrentPrice>> {
        self.run(move |e| e.current_price(product_id)).await
    }
}
