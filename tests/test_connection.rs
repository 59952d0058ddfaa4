//! Connection integration tests: raw SQL execution and table bookkeeping.

mod common;

use std::time::Duration;

use common::sample_store;
use pricewatch_core::{Connection, ProductMeta};

// ---------------------------------------------------------------------------
// execute
// ---------------------------------------------------------------------------

#[test]
fn execute_returns_correct_rows() {
    let store = sample_store();
    let rows = store
        .connection()
        .execute("SELECT product_id, name FROM products ORDER BY product_id", &[])
        .unwrap();
    assert_eq!(rows.len(), 5);
    assert_eq!(rows[0]["product_id"], 1);
    assert_eq!(rows[0]["name"], "Phone A");
    assert_eq!(rows[4]["name"], "Laptop");
}

#[test]
fn execute_with_params() {
    let store = sample_store();
    let rows = store
        .connection()
        .execute(
            "SELECT * FROM price_observations WHERE source = ?",
            &["used:subito".to_string()],
        )
        .unwrap();
    assert_eq!(rows.len(), 2);
}

#[test]
fn execute_returns_empty_for_no_matches() {
    let store = sample_store();
    let rows = store
        .connection()
        .execute(
            "SELECT * FROM products WHERE name = ?",
            &["nonexistent".to_string()],
        )
        .unwrap();
    assert!(rows.is_empty());
}

#[test]
fn prices_come_back_as_text() {
    let store = sample_store();
    let rows = store
        .connection()
        .execute(
            "SELECT price FROM price_observations WHERE product_id = 1 AND source = 'unieuro'",
            &[],
        )
        .unwrap();
    assert_eq!(rows[0]["price"], "-5");
}

// ---------------------------------------------------------------------------
// execute_into / execute_scalar
// ---------------------------------------------------------------------------

#[test]
fn execute_into_deserializes_rows() {
    let store = sample_store();
    let products: Vec<ProductMeta> = store
        .connection()
        .execute_into(
            "SELECT product_id, name, brand, category FROM products WHERE brand = ? ORDER BY product_id",
            &["Acme".to_string()],
        )
        .unwrap();
    let ids: Vec<i64> = products.iter().map(|p| p.product_id.0).collect();
    assert_eq!(ids, vec![1, 3]);
}

#[test]
fn execute_scalar_returns_single_value() {
    let store = sample_store();
    let count = store
        .connection()
        .execute_scalar("SELECT COUNT(*) FROM products", &[])
        .unwrap();
    assert_eq!(count, Some(serde_json::json!(5)));
}

#[test]
fn execute_scalar_returns_none_for_empty() {
    let store = sample_store();
    let value = store
        .connection()
        .execute_scalar("SELECT name FROM products WHERE product_id = -1", &[])
        .unwrap();
    assert!(value.is_none());
}

// ---------------------------------------------------------------------------
// Bookkeeping
// ---------------------------------------------------------------------------

#[test]
fn fresh_connection_has_empty_schema() {
    let conn = Connection::open_in_memory().unwrap();
    assert!(conn.tables().is_empty());
    let count = conn
        .execute_scalar("SELECT COUNT(*) FROM price_observations", &[])
        .unwrap();
    assert_eq!(count, Some(serde_json::json!(0)));
}

#[test]
fn loaded_tables_are_tracked() {
    let store = sample_store();
    assert_eq!(store.connection().tables(), vec!["price_observations", "products"]);
}

#[test]
fn timeout_is_configurable() {
    let conn = Connection::open_in_memory()
        .unwrap()
        .with_timeout(Duration::from_millis(250));
    assert_eq!(conn.timeout(), Duration::from_millis(250));
}

#[test]
fn file_backed_database_persists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prices.duckdb");
    {
        let conn = Connection::open(&path).unwrap();
        conn.insert_products(&[ProductMeta {
            product_id: pricewatch_core::ProductId(9),
            name: "Watch".into(),
            brand: String::new(),
            category: "Wearables".into(),
        }])
        .unwrap();
    }
    let reopened = Connection::open(&path).unwrap();
    let name = reopened
        .execute_scalar("SELECT name FROM products WHERE product_id = 9", &[])
        .unwrap();
    assert_eq!(name, Some(serde_json::json!("Watch")));
}
