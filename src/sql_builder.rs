//! Parameterized SQL construction for store reads.
//!
//! Values always go through DuckDB's parameter binding (`?` placeholders).
//! Builder methods return `&mut Self` for chaining.
//!
//! # Example
//!
//! ```rust
//! use pricewatch_core::SqlBuilder;
//! let (sql, params) = SqlBuilder::new("price_observations")
//!     .where_id("product_id", 42)
//!     .order_by(&["captured_at ASC"])
//!     .build();
//! assert!(sql.contains("product_id = CAST(? AS BIGINT)"));
//! assert_eq!(params, vec!["42"]);
//! ```

pub struct SqlBuilder {
    select_cols: Vec<String>,
    from_table: String,
    where_clauses: Vec<String>,
    params: Vec<String>,
    order_by_cols: Vec<String>,
    limit_val: Option<usize>,
}

impl SqlBuilder {
    pub fn new(table: &str) -> Self {
        Self {
            select_cols: vec!["*".to_string()],
            from_table: table.to_string(),
            where_clauses: Vec::new(),
            params: Vec::new(),
            order_by_cols: Vec::new(),
            limit_val: None,
        }
    }

    /// Set the columns to select (replaces the default `*`).
    pub fn select(&mut self, cols: &[&str]) -> &mut Self {
        self.select_cols = cols.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Add a raw condition with one `?` per entry in `params`.
    pub fn where_clause(&mut self, condition: &str, params: &[&str]) -> &mut Self {
        self.where_clauses.push(condition.to_string());
        self.params.extend(params.iter().map(|p| p.to_string()));
        self
    }

    /// `{column} = ?`
    pub fn where_eq(&mut self, column: &str, value: &str) -> &mut Self {
        self.where_clauses.push(format!("{} = ?", column));
        self.params.push(value.to_string());
        self
    }

    /// Equality against a BIGINT id column. Parameters bind as text, hence the cast.
    pub fn where_id(&mut self, column: &str, id: i64) -> &mut Self {
        self.where_clauses.push(format!("{} = CAST(? AS BIGINT)", column));
        self.params.push(id.to_string());
        self
    }

    /// Case- and whitespace-insensitive equality: `LOWER(TRIM({column})) = LOWER(TRIM(?))`.
    pub fn where_eq_ci(&mut self, column: &str, value: &str) -> &mut Self {
        self.where_clauses
            .push(format!("LOWER(TRIM({})) = LOWER(TRIM(?))", column));
        self.params.push(value.to_string());
        self
    }

    /// Add ORDER BY clauses (e.g. `"captured_at ASC"`).
    pub fn order_by(&mut self, clauses: &[&str]) -> &mut Self {
        self.order_by_cols
            .extend(clauses.iter().map(|c| c.to_string()));
        self
    }

    pub fn limit(&mut self, n: usize) -> &mut Self {
        self.limit_val = Some(n);
        self
    }

    /// Build the final SQL string and parameter list.
    pub fn build(&self) -> (String, Vec<String>) {
        let mut parts = vec![
            format!("SELECT {}", self.select_cols.join(", ")),
            format!("FROM {}", self.from_table),
        ];

        if !self.where_clauses.is_empty() {
            parts.push(format!("WHERE {}", self.where_clauses.join(" AND ")));
        }

        if !self.order_by_cols.is_empty() {
            parts.push(format!("ORDER BY {}", self.order_by_cols.join(", ")));
        }

        if let Some(n) = self.limit_val {
            parts.push(format!("LIMIT {}", n));
        }

        (parts.join("\n"), self.params.clone())
    }
}
