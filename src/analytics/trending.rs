//! Seeded "trending" selection.
//!
//! There is no popularity signal in the data model, so trending is a shuffle
//! of the products that currently have a price. The shuffle is driven by a
//! caller-supplied seed: the same seed over the same catalog always picks the
//! same products in the same order, which keeps the result cacheable.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::models::{same_category, ProductPriceSummary};

/// Pick up to `limit` products with a current price, shuffled by `seed`.
pub fn trending(
    catalog: &[ProductPriceSummary],
    seed: u64,
    category: Option<&str>,
    limit: usize,
) -> Vec<ProductPriceSummary> {
    let mut candidates: Vec<&ProductPriceSummary> = catalog
        .iter()
        .filter(|s| s.has_current_price())
        .filter(|s| match category {
            Some(cat) => s.category.as_deref().is_some_and(|c| same_category(c, cat)),
            None => true,
        })
        .collect();

    // Input order must not leak into the result.
    candidates.sort_by_key(|s| s.product_id);

    let mut rng = StdRng::seed_from_u64(seed);
    candidates.shuffle(&mut rng);

    candidates.into_iter().take(limit).cloned().collect()
}
