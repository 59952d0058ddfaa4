//! Read-only access to raw price observations and catalog metadata.
//!
//! The engine only talks to the [`ObservationStore`] trait. Two adapters are
//! provided: [`DuckDbStore`] (embedded tables loaded from snapshots) and
//! [`HttpStore`] (the platform's REST API). Both bound every read with a
//! timeout and report failures as [`PriceError::DataUnavailable`].

pub mod duckdb;
pub mod http;

pub use self::duckdb::DuckDbStore;
pub use self::http::HttpStore;

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{parse_timestamp, Market, PriceObservation, ProductId, ProductMeta, RawObservation};

#[cfg(doc)]
use crate::error::PriceError;

/// Source of observations and catalog metadata.
///
/// Implementations must be safe to share across threads: batch rankings read
/// many products in parallel.
pub trait ObservationStore: Send + Sync {
    /// Observations of `product_id` in `market` captured at or after `since`.
    fn observations(
        &self,
        product_id: ProductId,
        market: Market,
        since: DateTime<Utc>,
    ) -> Result<ObservationBatch>;

    /// Catalog entry for `product_id`, or `None` if the product is unknown.
    fn product_meta(&self, product_id: ProductId) -> Result<Option<ProductMeta>>;

    /// Every catalog product, optionally restricted to a category (case-insensitive).
    fn products(&self, category: Option<&str>) -> Result<Vec<ProductMeta>>;
}

/// Typed observations plus the number of rows rejected as malformed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObservationBatch {
    pub observations: Vec<PriceObservation>,
    pub discarded: usize,
}

impl ObservationBatch {
    /// Parse raw rows, keeping those in `market` captured at or after `since`.
    ///
    /// Rows that fail to parse are counted, not returned, unless their
    /// timestamp still parses to a time before `since`. A row whose timestamp
    /// cannot be parsed cannot be dated and is always counted. Rows that
    /// clearly belong to the other market are skipped without counting.
    pub fn from_raw(rows: &[RawObservation], market: Market, since: DateTime<Utc>) -> Self {
        let mut batch = ObservationBatch::default();
        for raw in rows {
            if let Some(hint) = market_hint(raw) {
                if hint != market {
                    continue;
                }
            }
            match raw.parse() {
                Ok(obs) if obs.captured_at >= since => batch.observations.push(obs),
                Ok(_) => {}
                Err(_) if captured_before(raw, since) => {}
                Err(reason) => {
                    tracing::debug!(
                        product_id = %raw.product_id,
                        source = %raw.source,
                        %reason,
                        "Discarding malformed observation"
                    );
                    batch.discarded += 1;
                }
            }
        }
        if batch.discarded > 0 {
            tracing::warn!(
                market = %market,
                discarded = batch.discarded,
                kept = batch.observations.len(),
                "Malformed observations discarded"
            );
        }
        batch
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}

/// True when the row's timestamp parses and falls before `since`.
fn captured_before(raw: &RawObservation, since: DateTime<Utc>) -> bool {
    raw.captured_at
        .as_deref()
        .map(str::trim)
        .and_then(|text| parse_timestamp(text).ok())
        .is_some_and(|ts| ts < since)
}

/// Market a raw row belongs to, when that can be told without a full parse.
fn market_hint(raw: &RawObservation) -> Option<Market> {
    match raw.market.as_deref().map(str::trim) {
        Some(m) if !m.is_empty() => m.parse().ok(),
        _ => Some(Market::from_source(&raw.source)),
    }
}
