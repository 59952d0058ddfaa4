//! Catalog-wide deal rankings.

use rayon::prelude::*;

use crate::analytics::{rank_deals, trending};
use crate::error::{PriceError, Result};
use crate::models::{DealRanking, ExcludedProduct, ProductPriceSummary, RankingCriterion};
use crate::queries::SummaryQuery;
use crate::PriceEngine;

pub struct DealQuery<'a> {
    engine: &'a PriceEngine,
}

impl<'a> DealQuery<'a> {
    pub fn new(engine: &'a PriceEngine) -> Self {
        Self { engine }
    }

    /// Summaries of every catalog product (optionally in one category).
    ///
    /// Products are summarized in parallel. A product whose aggregation fails
    /// is left out and reported in the second element instead of failing the
    /// batch. Failing to list the catalog itself is an error.
    pub fn catalog(&self, category: Option<&str>) -> Result<(Vec<ProductPriceSummary>, Vec<ExcludedProduct>)> {
        let products = self.engine.store.products(category)?;
        let summaries = SummaryQuery::new(self.engine);

        let results: Vec<_> = products
            .par_iter()
            .map(|meta| (meta.product_id, summaries.for_product(meta)))
            .collect();

        let mut catalog = Vec::with_capacity(results.len());
        let mut excluded = Vec::new();
        for (product_id, result) in results {
            match result {
                Ok(summary) => catalog.push(summary),
                Err(e) => {
                    tracing::warn!(product_id = %product_id, error = %e, "Excluding product from batch");
                    excluded.push(ExcludedProduct {
                        product_id,
                        reason: e.to_string(),
                    });
                }
            }
        }
        Ok((catalog, excluded))
    }

    /// Top `limit` products by `criterion`.
    pub fn top(&self, criterion: RankingCriterion, category: Option<&str>, limit: usize) -> Result<DealRanking> {
        if limit == 0 {
            return Err(PriceError::InvalidArgument("limit must be positive".into()));
        }
        let (catalog, excluded) = self.catalog(category)?;
        let mut ranking = rank_deals(&catalog, criterion, category, Some(limit));
        ranking.excluded = excluded;
        tracing::debug!(
            criterion = %criterion,
            category = category.unwrap_or("*"),
            qualifying = ranking.stats.count,
            returned = ranking.len(),
            excluded = ranking.excluded.len(),
            "Ranked deals"
        );
        Ok(ranking)
    }

    /// Used listings cheaper than new, largest absolute savings first.
    pub fn used(&self, category: Option<&str>, limit: usize) -> Result<DealRanking> {
        self.top(RankingCriterion::Savings, category, limit)
    }

    /// Up to `limit` priced products in a seed-determined order.
    pub fn trending(&self, seed: u64, category: Option<&str>, limit: usize) -> Result<Vec<ProductPriceSummary>> {
        let (catalog, _) = self.catalog(category)?;
        Ok(trending(&catalog, seed, category, limit))
    }
}
