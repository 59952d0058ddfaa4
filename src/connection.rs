//! DuckDB connection wrapper with snapshot loading and time-bounded queries.
//!
//! Observation rows are stored as scraped: price and timestamp stay text so
//! malformed rows survive loading and are counted when read back.

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use duckdb::{params, types::ValueRef, Connection as DuckDbConnection};
use flate2::read::GzDecoder;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;

use crate::config::{DEFAULT_STORE_TIMEOUT_MS, OBSERVATIONS_TABLE, PRODUCTS_TABLE};
use crate::error::{PriceError, Result};
use crate::models::{ProductMeta, RawObservation};

type Row = HashMap<String, serde_json::Value>;

const SCHEMA_SQL: &str = "\
    CREATE TABLE IF NOT EXISTS price_observations (\
        product_id BIGINT NOT NULL, \
        source VARCHAR NOT NULL, \
        market VARCHAR, \
        price VARCHAR, \
        captured_at VARCHAR, \
        availability BOOLEAN, \
        condition VARCHAR, \
        url VARCHAR\
    ); \
    CREATE TABLE IF NOT EXISTS products (\
        product_id BIGINT NOT NULL, \
        name VARCHAR, \
        brand VARCHAR, \
        category VARCHAR\
    );";

/// Outcome of loading a newline-delimited JSON snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub inserted: usize,
    /// Lines that were not valid JSON for the target table.
    pub skipped: usize,
}

/// Wraps a DuckDB database holding the observation and product tables.
///
/// Every read runs on a cloned connection in a worker thread and is abandoned
/// once the configured timeout elapses.
pub struct Connection {
    conn: Mutex<DuckDbConnection>,
    timeout: Duration,
    loaded_tables: Mutex<HashSet<String>>,
}

impl Connection {
    /// Open an in-memory database with the default read timeout.
    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(
            DuckDbConnection::open_in_memory()?,
            Duration::from_millis(DEFAULT_STORE_TIMEOUT_MS),
        )
    }

    /// Open (or create) a database file with the default read timeout.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::with_connection(
            DuckDbConnection::open(path)?,
            Duration::from_millis(DEFAULT_STORE_TIMEOUT_MS),
        )
    }

    fn with_connection(conn: DuckDbConnection, timeout: Duration) -> Result<Self> {
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self {
            conn: Mutex::new(conn),
            timeout,
            loaded_tables: Mutex::new(HashSet::new()),
        })
    }

    /// Replace the read timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Execute SQL and return each row as a column-name map.
    ///
    /// Fails with [`PriceError::DataUnavailable`] if the query errors or does
    /// not finish within the timeout.
    pub fn execute(&self, sql: &str, params: &[String]) -> Result<Vec<Row>> {
        let worker = self.conn.lock().try_clone()?;
        let sql_owned = sql.to_string();
        let params_owned = params.to_vec();
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            // The receiver is gone if the caller already timed out.
            let _ = tx.send(run_query(&worker, &sql_owned, &params_owned));
        });

        match rx.recv_timeout(self.timeout) {
            Ok(Ok(rows)) => Ok(rows),
            Ok(Err(e)) => {
                tracing::warn!(error = %e, sql, "Store query failed");
                Err(PriceError::DataUnavailable(format!("query failed: {}", e)))
            }
            Err(RecvTimeoutError::Timeout) => {
                tracing::warn!(timeout_ms = self.timeout.as_millis() as u64, sql, "Store query timed out");
                Err(PriceError::DataUnavailable(format!(
                    "query exceeded {} ms",
                    self.timeout.as_millis()
                )))
            }
            Err(RecvTimeoutError::Disconnected) => Err(PriceError::DataUnavailable(
                "query worker exited without a result".into(),
            )),
        }
    }

    /// Execute SQL and deserialize each row into `T`.
    pub fn execute_into<T: DeserializeOwned>(&self, sql: &str, params: &[String]) -> Result<Vec<T>> {
        let rows = self.execute(sql, params)?;
        let mut results = Vec::with_capacity(rows.len());
        for row in rows {
            let value = serde_json::Value::Object(row.into_iter().collect());
            results.push(serde_json::from_value(value)?);
        }
        Ok(results)
    }

    /// First column of the first row, or `None` for an empty result.
    pub fn execute_scalar(&self, sql: &str, params: &[String]) -> Result<Option<serde_json::Value>> {
        let rows = self.execute(sql, params)?;
        Ok(rows.into_iter().next().and_then(|row| {
            // Single-column queries only; pick the one value.
            row.into_values().next()
        }))
    }

    /// Insert observation rows as-is. Returns the number inserted.
    pub fn insert_observations(&self, rows: &[RawObservation]) -> Result<usize> {
        let conn = self.conn.lock();
        let mut appender = conn.appender(OBSERVATIONS_TABLE)?;
        for row in rows {
            appender.append_row(params![
                row.product_id.0,
                row.source,
                row.market,
                row.price,
                row.captured_at,
                row.availability,
                row.condition,
                row.url,
            ])?;
        }
        appender.flush()?;
        self.loaded_tables.lock().insert(OBSERVATIONS_TABLE.to_string());
        tracing::debug!(rows = rows.len(), "Inserted observations");
        Ok(rows.len())
    }

    /// Insert catalog rows. Returns the number inserted.
    pub fn insert_products(&self, rows: &[ProductMeta]) -> Result<usize> {
        let conn = self.conn.lock();
        let mut appender = conn.appender(PRODUCTS_TABLE)?;
        for row in rows {
            appender.append_row(params![row.product_id.0, row.name, row.brand, row.category])?;
        }
        appender.flush()?;
        self.loaded_tables.lock().insert(PRODUCTS_TABLE.to_string());
        tracing::debug!(rows = rows.len(), "Inserted products");
        Ok(rows.len())
    }

    /// Load an observation snapshot (`.ndjson`, or `.ndjson.gz`).
    pub fn load_observations<P: AsRef<Path>>(&self, path: P) -> Result<LoadReport> {
        let (rows, skipped) = read_ndjson::<RawObservation>(path.as_ref())?;
        let inserted = self.insert_observations(&rows)?;
        report_load(OBSERVATIONS_TABLE, path.as_ref(), inserted, skipped);
        Ok(LoadReport { inserted, skipped })
    }

    /// Load a product catalog snapshot (`.ndjson`, or `.ndjson.gz`).
    pub fn load_products<P: AsRef<Path>>(&self, path: P) -> Result<LoadReport> {
        let (rows, skipped) = read_ndjson::<ProductMeta>(path.as_ref())?;
        let inserted = self.insert_products(&rows)?;
        report_load(PRODUCTS_TABLE, path.as_ref(), inserted, skipped);
        Ok(LoadReport { inserted, skipped })
    }

    /// Whether rows have been loaded into `table` through this connection.
    pub fn has_table(&self, table: &str) -> bool {
        self.loaded_tables.lock().contains(table)
    }

    /// Names of tables loaded through this connection.
    pub fn tables(&self) -> Vec<String> {
        let mut names: Vec<String> = self.loaded_tables.lock().iter().cloned().collect();
        names.sort();
        names
    }
}

fn report_load(table: &str, path: &Path, inserted: usize, skipped: usize) {
    if skipped > 0 {
        tracing::warn!(table, path = %path.display(), inserted, skipped, "Snapshot had unreadable lines");
    } else {
        tracing::info!(table, path = %path.display(), inserted, "Loaded snapshot");
    }
}

/// Read a newline-delimited JSON file, transparently gunzipping `.gz` paths.
///
/// Blank lines are ignored; lines that fail to deserialize are counted.
fn read_ndjson<T: DeserializeOwned>(path: &Path) -> Result<(Vec<T>, usize)> {
    let file = File::open(path)?;
    let reader: Box<dyn Read> = if path.extension().is_some_and(|ext| ext == "gz") {
        Box::new(GzDecoder::new(file))
    } else {
        Box::new(file)
    };

    let mut rows = Vec::new();
    let mut skipped = 0;
    for line in BufReader::new(reader).lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<T>(&line) {
            Ok(row) => rows.push(row),
            Err(e) => {
                tracing::debug!(error = %e, "Skipping unreadable snapshot line");
                skipped += 1;
            }
        }
    }
    Ok((rows, skipped))
}

fn run_query(conn: &DuckDbConnection, sql: &str, params: &[String]) -> Result<Vec<Row>> {
    let mut stmt = conn.prepare(sql)?;
    let param_values: Vec<&dyn duckdb::ToSql> = params.iter().map(|p| p as &dyn duckdb::ToSql).collect();

    let mut rows = stmt.query(param_values.as_slice())?;

    // Column metadata is only available once the statement has run.
    let column_names: Vec<String> = match rows.as_ref() {
        Some(stmt) => stmt.column_names().into_iter().map(|s| s.to_string()).collect(),
        None => return Ok(Vec::new()),
    };

    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        let mut map = HashMap::with_capacity(column_names.len());
        for (i, name) in column_names.iter().enumerate() {
            map.insert(name.clone(), convert_value_ref(row.get_ref(i)?));
        }
        out.push(map);
    }
    Ok(out)
}

/// Convert a DuckDB `ValueRef` to a `serde_json::Value`.
fn convert_value_ref(val: ValueRef<'_>) -> serde_json::Value {
    use serde_json::Value;

    match val {
        ValueRef::Null => Value::Null,
        ValueRef::Boolean(b) => Value::Bool(b),
        ValueRef::TinyInt(n) => Value::Number(n.into()),
        ValueRef::SmallInt(n) => Value::Number(n.into()),
        ValueRef::Int(n) => Value::Number(n.into()),
        ValueRef::BigInt(n) => Value::Number(n.into()),
        ValueRef::HugeInt(n) => match i64::try_from(n) {
            Ok(i) => Value::Number(i.into()),
            Err(_) => Value::String(n.to_string()),
        },
        ValueRef::Float(f) => serde_json::Number::from_f64(f as f64)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        ValueRef::Double(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        ValueRef::Text(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
        // Prices and timestamps are stored as text; nothing else is expected.
        _ => Value::Null,
    }
}
