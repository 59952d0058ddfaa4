//! Shared test fixtures for the pricewatch-core integration tests.
//!
//! Provides `sample_store()` which creates an in-memory DuckDB store populated
//! with a small catalog and observation set via NDJSON temp files, and
//! `sample_engine()` which wraps it with a clock frozen at [`NOW`].
//!
//! Catalog (reference timezone Europe/Rome, today = 2024-06-15):
//!
//! | id | category   | new (current best / recent high) | used        |
//! |----|------------|----------------------------------|-------------|
//! | 1  | Smartphone | 100.00 amazon / 120.00           | 80.00       |
//! | 2  | smartphone | 190.00 amazon / 200.00           | 210.00      |
//! | 3  | Audio      | 30.00 amazon / 60.00             | none        |
//! | 4  | Tablet     | stale only                       | none        |
//! | 5  | Computers  | 400.00 mediaworld / 400.00       | 300.00      |

#![allow(dead_code)]

use std::io::Write;

use chrono::{DateTime, Utc};
use pricewatch_core::store::DuckDbStore;
use pricewatch_core::{Clock, Market, PriceEngine, PriceObservation, ProductId};
use rust_decimal::Decimal;
use serde_json::json;
use tempfile::NamedTempFile;

pub const NOW: &str = "2024-06-15T10:00:00Z";

pub fn now() -> DateTime<Utc> {
    ts(NOW)
}

pub fn ts(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
}

/// Route `tracing` output to the test harness. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn obs(product: i64, source: &str, market: Market, price: Decimal, at: &str) -> PriceObservation {
    PriceObservation::new(ProductId(product), source, market, price, ts(at))
}

/// Write `rows` as newline-delimited JSON to a temp file.
pub fn write_ndjson(rows: &[serde_json::Value]) -> NamedTempFile {
    let mut tmp = NamedTempFile::new().unwrap();
    for row in rows {
        writeln!(tmp, "{}", serde_json::to_string(row).unwrap()).unwrap();
    }
    tmp.flush().unwrap();
    tmp
}

pub fn sample_products() -> Vec<serde_json::Value> {
    vec![
        json!({"id": 1, "name": "Phone A", "brand": "Acme", "category": "Smartphone"}),
        json!({"id": 2, "name": "Phone B", "brand": "Globex", "category": "smartphone"}),
        json!({"id": 3, "name": "Headphones", "brand": "Acme", "category": "Audio"}),
        json!({"id": 4, "name": "Tablet", "brand": "Initech", "category": "Tablet"}),
        json!({"id": 5, "name": "Laptop", "brand": "Initech", "category": "Computers"}),
    ]
}

pub fn sample_observations() -> Vec<serde_json::Value> {
    vec![
        // -- product 1 ----------------------------------------------------------
        json!({"product_id": 1, "source": "amazon", "market": "new", "price": "120.00", "captured_at": "2024-06-01T09:00:00Z"}),
        json!({"product_id": 1, "source": "amazon", "market": "new", "price": "110.00", "captured_at": "2024-06-10T09:00:00Z"}),
        json!({"product_id": 1, "source": "amazon", "market": "new", "price": 100.0, "captured_at": "2024-06-14T20:00:00Z"}),
        json!({"product_id": 1, "source": "mediaworld", "market": "new", "price": "105.00", "captured_at": "2024-06-15T08:00:00Z"}),
        json!({"product_id": 1, "source": "unieuro", "market": "new", "price": "-5", "captured_at": "2024-06-14T09:00:00Z"}),
        json!({"product_id": 1, "source": "amazon", "market": "new", "price": "abc", "captured_at": "2024-06-15T06:00:00Z"}),
        json!({"product_id": 1, "source": "used:subito", "price": "80.00", "captured_at": "2024-06-15T07:00:00Z", "condition": "Come nuovo"}),
        // -- product 2 ----------------------------------------------------------
        json!({"product_id": 2, "source": "amazon", "market": "new", "price": "200.00", "captured_at": "2024-06-05T10:00:00Z"}),
        json!({"product_id": 2, "source": "amazon", "market": "new", "price": "190.00", "captured_at": "2024-06-15T09:00:00Z"}),
        json!({"product_id": 2, "source": "used:ebay", "market": "used", "price": "210.00", "captured_at": "2024-06-14T10:00:00Z"}),
        // -- product 3 ----------------------------------------------------------
        json!({"product_id": 3, "retailer": "amazon", "price": "60.00", "scraped_at": "2024-05-20 10:00:00"}),
        json!({"product_id": 3, "retailer": "amazon", "price": "30.00", "scraped_at": "2024-06-15 05:00:00"}),
        // -- product 4 ----------------------------------------------------------
        json!({"product_id": 4, "source": "amazon", "market": "new", "price": "500.00", "captured_at": "2024-06-01T10:00:00Z"}),
        // -- product 5 ----------------------------------------------------------
        json!({"product_id": 5, "source": "mediaworld", "market": "new", "price": "400.00", "captured_at": "2024-06-14T12:00:00Z"}),
        json!({"product_id": 5, "source": "used:subito", "market": "used", "price": "300.00", "captured_at": "2024-06-15T01:00:00Z"}),
    ]
}

/// In-memory DuckDB store loaded with the sample catalog and observations.
pub fn sample_store() -> DuckDbStore {
    init_tracing();
    let store = DuckDbStore::open_in_memory().unwrap();
    let products = write_ndjson(&sample_products());
    let observations = write_ndjson(&sample_observations());
    store.load_products(products.path()).unwrap();
    store.load_observations(observations.path()).unwrap();
    store
}

/// Engine over [`sample_store`] with the clock frozen at [`NOW`].
pub fn sample_engine() -> PriceEngine {
    PriceEngine::builder()
        .store(sample_store())
        .clock(Clock::Fixed(now()))
        .build()
        .unwrap()
}
