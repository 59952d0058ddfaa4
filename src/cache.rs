//! Time-bounded cache of daily histories.
//!
//! Entries are keyed by the reference date as well as the product, market and
//! window, so a history computed yesterday is never served today even within
//! the TTL.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use parking_lot::Mutex;

use crate::models::{DailyHistory, Market, ProductId, Window};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HistoryKey {
    pub product_id: ProductId,
    pub market: Market,
    pub window: Window,
    pub today: NaiveDate,
}

/// Shared history cache. A `None` TTL disables it entirely.
pub struct HistoryCache {
    ttl: Option<Duration>,
    entries: Mutex<HashMap<HistoryKey, (Instant, DailyHistory)>>,
}

impl HistoryCache {
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn disabled() -> Self {
        Self::new(None)
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    pub fn is_enabled(&self) -> bool {
        self.ttl.is_some()
    }

    /// Fresh entry for `key`, evicting it if expired.
    pub fn get(&self, key: &HistoryKey) -> Option<DailyHistory> {
        let ttl = self.ttl?;
        let mut entries = self.entries.lock();
        match entries.get(key) {
            Some((stored, history)) if stored.elapsed() < ttl => {
                tracing::debug!(
                    product_id = %key.product_id,
                    market = %key.market,
                    window = key.window.days(),
                    "History cache hit"
                );
                Some(history.clone())
            }
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn insert(&self, key: HistoryKey, history: DailyHistory) {
        if self.ttl.is_some() {
            self.entries.lock().insert(key, (Instant::now(), history));
        }
    }

    /// Drop every entry for `product_id`. Returns how many were removed.
    pub fn invalidate(&self, product_id: ProductId) -> usize {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|key, _| key.product_id != product_id);
        let removed = before - entries.len();
        if removed > 0 {
            tracing::debug!(product_id = %product_id, removed, "Invalidated cached histories");
        }
        removed
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
