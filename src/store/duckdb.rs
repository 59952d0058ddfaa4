//! Observation store backed by an embedded DuckDB database.

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::config::{OBSERVATIONS_TABLE, PRODUCTS_TABLE};
use crate::connection::{Connection, LoadReport};
use crate::error::Result;
use crate::models::{Market, ProductId, ProductMeta, RawObservation};
use crate::sql_builder::SqlBuilder;
use crate::store::{ObservationBatch, ObservationStore};

const OBSERVATION_COLUMNS: &[&str] = &[
    "product_id",
    "source",
    "market",
    "price",
    "captured_at",
    "availability",
    "condition",
    "url",
];

// Undatable text is kept so the batch can count it as malformed.
const CAPTURED_SINCE_SQL: &str = "(captured_at IS NULL \
    OR NOT regexp_matches(TRIM(captured_at), '^[0-9]{4}-[0-9]{2}-[0-9]{2}') \
    OR TRIM(captured_at) >= ?)";

const PRODUCT_COLUMNS: &[&str] = &["product_id", "name", "brand", "category"];

/// [`ObservationStore`] over the `price_observations` and `products` tables.
///
/// ```rust,no_run
/// use pricewatch_core::store::DuckDbStore;
/// let store = DuckDbStore::open_in_memory()?;
/// store.load_products("snapshots/products.ndjson")?;
/// store.load_observations("snapshots/observations.ndjson.gz")?;
/// # Ok::<(), pricewatch_core::PriceError>(())
/// ```
pub struct DuckDbStore {
    conn: Connection,
}

impl DuckDbStore {
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
        })
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self {
            conn: Connection::open(path)?,
        })
    }

    /// Bound every read by `timeout`.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        Self {
            conn: self.conn.with_timeout(timeout),
        }
    }

    pub fn load_observations<P: AsRef<Path>>(&self, path: P) -> Result<LoadReport> {
        self.conn.load_observations(path)
    }

    pub fn load_products<P: AsRef<Path>>(&self, path: P) -> Result<LoadReport> {
        self.conn.load_products(path)
    }

    pub fn insert_observations(&self, rows: &[RawObservation]) -> Result<usize> {
        self.conn.insert_observations(rows)
    }

    pub fn insert_products(&self, rows: &[ProductMeta]) -> Result<usize> {
        self.conn.insert_products(rows)
    }

    /// Number of stored observation rows, malformed ones included.
    pub fn observation_count(&self) -> Result<u64> {
        let (sql, params) = SqlBuilder::new(OBSERVATIONS_TABLE)
            .select(&["COUNT(*) AS n"])
            .build();
        Ok(self
            .conn
            .execute_scalar(&sql, &params)?
            .and_then(|v| v.as_u64())
            .unwrap_or(0))
    }

    /// Access the underlying connection for ad-hoc queries.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl ObservationStore for DuckDbStore {
    fn observations(
        &self,
        product_id: ProductId,
        market: Market,
        since: DateTime<Utc>,
    ) -> Result<ObservationBatch> {
        // Market and exact timestamp are filtered after parsing: both may be
        // missing or malformed in storage. The text prefilter only drops rows
        // dated more than a day before `since`, leaving room for UTC offsets.
        let mut builder = SqlBuilder::new(OBSERVATIONS_TABLE);
        builder
            .select(OBSERVATION_COLUMNS)
            .where_id("product_id", product_id.0);
        if let Some(floor) = since.date_naive().pred_opt() {
            let floor = floor.format("%Y-%m-%d").to_string();
            builder.where_clause(CAPTURED_SINCE_SQL, &[&floor]);
        }
        let (sql, params) = builder
            .order_by(&["captured_at ASC", "source ASC"])
            .build();
        let rows: Vec<RawObservation> = self.conn.execute_into(&sql, &params)?;
        let batch = ObservationBatch::from_raw(&rows, market, since);
        tracing::trace!(
            product_id = %product_id,
            market = %market,
            rows = rows.len(),
            kept = batch.len(),
            "Read observations"
        );
        Ok(batch)
    }

    fn product_meta(&self, product_id: ProductId) -> Result<Option<ProductMeta>> {
        let (sql, params) = SqlBuilder::new(PRODUCTS_TABLE)
            .select(PRODUCT_COLUMNS)
            .where_id("product_id", product_id.0)
            .limit(1)
            .build();
        let mut rows: Vec<ProductMeta> = self.conn.execute_into(&sql, &params)?;
        Ok(rows.pop())
    }

    fn products(&self, category: Option<&str>) -> Result<Vec<ProductMeta>> {
        let mut q = SqlBuilder::new(PRODUCTS_TABLE);
        q.select(PRODUCT_COLUMNS);
        if let Some(cat) = category {
            q.where_eq_ci("category", cat);
        }
        q.order_by(&["product_id ASC"]);
        let (sql, params) = q.build();
        self.conn.execute_into(&sql, &params)
    }
}
