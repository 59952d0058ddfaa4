//! Market price resolver: current best price per market.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};

use crate::config;
use crate::models::{BestPrice, Market, PriceObservation};

/// Resolves the cheapest *current* offer per market.
///
/// Each source contributes only its latest observation. A source is current
/// when that observation is no older than the staleness threshold and is not
/// flagged unavailable. Stale observations still feed daily rollups; they
/// are only excluded here.
#[derive(Debug, Clone, Copy)]
pub struct MarketPriceResolver {
    staleness: Duration,
}

impl Default for MarketPriceResolver {
    fn default() -> Self {
        Self::new(Duration::hours(config::DEFAULT_STALENESS_HOURS))
    }
}

impl MarketPriceResolver {
    pub fn new(staleness: Duration) -> Self {
        Self { staleness }
    }

    pub fn staleness(&self) -> Duration {
        self.staleness
    }

    /// Latest valid-priced observation per source in `market`, ordered by source.
    ///
    /// Two readings from the same source with the same timestamp resolve to the
    /// cheaper one.
    pub fn latest_per_source<'a>(
        observations: &'a [PriceObservation],
        market: Market,
    ) -> Vec<&'a PriceObservation> {
        let mut latest: BTreeMap<&str, &PriceObservation> = BTreeMap::new();
        for obs in observations {
            if obs.market != market || !obs.is_valid_price() {
                continue;
            }
            latest
                .entry(obs.source.as_str())
                .and_modify(|cur| {
                    let newer = obs.captured_at > cur.captured_at;
                    let cheaper_tie = obs.captured_at == cur.captured_at && obs.price < cur.price;
                    if newer || cheaper_tie {
                        *cur = obs;
                    }
                })
                .or_insert(obs);
        }
        latest.into_values().collect()
    }

    /// Whether `obs` counts as a current offer at `now`.
    pub fn is_current(&self, obs: &PriceObservation, now: DateTime<Utc>) -> bool {
        obs.availability != Some(false) && now - obs.captured_at <= self.staleness
    }

    /// Best current price for `market`, or `None` when no source qualifies.
    ///
    /// Ties on price go to the earliest-captured source, then to the source
    /// name, so the result never depends on input order.
    pub fn resolve(
        &self,
        observations: &[PriceObservation],
        market: Market,
        now: DateTime<Utc>,
    ) -> Option<BestPrice> {
        let current: Vec<&PriceObservation> = Self::latest_per_source(observations, market)
            .into_iter()
            .filter(|obs| self.is_current(obs, now))
            .collect();

        let best = current.iter().min_by(|a, b| {
            a.price
                .cmp(&b.price)
                .then(a.captured_at.cmp(&b.captured_at))
                .then(a.source.cmp(&b.source))
        })?;

        Some(BestPrice {
            price: best.price,
            source: best.source.clone(),
            captured_at: best.captured_at,
            current_sources: current.len(),
        })
    }
}
