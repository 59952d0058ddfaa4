//! Observation store backed by the platform's REST API.
//!
//! Responses are wrapped as `{ "success": true, "count": n, "data": ... }`;
//! bare payloads are accepted too.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use crate::config::DEFAULT_STORE_TIMEOUT_MS;
use crate::error::{PriceError, Result};
use crate::models::{same_category, Market, ProductId, ProductMeta, RawObservation};
use crate::store::{ObservationBatch, ObservationStore};

/// Longest history the API serves.
pub const MAX_HISTORY_DAYS: i64 = 365;

pub struct HttpStore {
    base_url: String,
    client: Client,
}

impl HttpStore {
    /// Create a store for `base_url` (e.g. `https://example.org/api`) with the default timeout.
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, Duration::from_millis(DEFAULT_STORE_TIMEOUT_MS))
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .gzip(true)
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `url` and decode the envelope payload. A 404 yields `None`.
    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<Option<T>> {
        tracing::debug!(url, "GET");
        let resp = self.client.get(url).send().map_err(unavailable)?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let resp = resp.error_for_status().map_err(unavailable)?;
        let body: serde_json::Value = resp.json().map_err(unavailable)?;
        Ok(Some(serde_json::from_value(unwrap_envelope(body))?))
    }
}

impl ObservationStore for HttpStore {
    fn observations(
        &self,
        product_id: ProductId,
        market: Market,
        since: DateTime<Utc>,
    ) -> Result<ObservationBatch> {
        // The API counts days back from its own clock, not the engine's.
        let days = history_days(since, Utc::now().max(since))?;
        let url = history_url(&self.base_url, product_id, days);
        let mut rows: Vec<RawObservation> = self.get_json(&url)?.unwrap_or_default();
        // History entries don't repeat the product id.
        for row in &mut rows {
            row.product_id = product_id;
        }
        Ok(ObservationBatch::from_raw(&rows, market, since))
    }

    fn product_meta(&self, product_id: ProductId) -> Result<Option<ProductMeta>> {
        self.get_json(&product_url(&self.base_url, product_id))
    }

    fn products(&self, category: Option<&str>) -> Result<Vec<ProductMeta>> {
        let mut products: Vec<ProductMeta> = self
            .get_json(&products_url(&self.base_url))?
            .unwrap_or_default();
        if let Some(cat) = category {
            products.retain(|p| same_category(&p.category, cat));
        }
        products.sort_by_key(|p| p.product_id);
        Ok(products)
    }
}

fn unavailable(e: reqwest::Error) -> PriceError {
    tracing::warn!(error = %e, "Price API request failed");
    PriceError::DataUnavailable(e.to_string())
}

/// Return `data` from a `{success, count, data}` envelope, or the value itself.
pub fn unwrap_envelope(value: serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(mut map) if map.contains_key("data") => {
            map.remove("data").unwrap_or(serde_json::Value::Null)
        }
        other => other,
    }
}

/// Whole days of history needed to reach back from `now` to `since`.
///
/// Fails with [`PriceError::DataUnavailable`] when the span is longer than the
/// API serves, since a shorter request would silently return a partial history.
pub fn history_days(since: DateTime<Utc>, now: DateTime<Utc>) -> Result<i64> {
    let span = now - since;
    let mut days = span.num_days();
    if span > chrono::Duration::days(days) {
        days += 1;
    }
    if days > MAX_HISTORY_DAYS {
        return Err(PriceError::DataUnavailable(format!(
            "history since {} needs {} days, API serves at most {}",
            since, days, MAX_HISTORY_DAYS
        )));
    }
    Ok(days.max(1))
}

pub fn products_url(base: &str) -> String {
    format!("{}/products", base)
}

pub fn product_url(base: &str, product_id: ProductId) -> String {
    format!("{}/products/{}", base, product_id)
}

pub fn history_url(base: &str, product_id: ProductId, days: i64) -> String {
    format!("{}/products/{}/history?days={}", base, product_id, days)
}
