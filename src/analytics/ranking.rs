//! Deal ranking engine.

use rust_decimal::Decimal;

use crate::models::{same_category, DealRanking, DealStats, ProductPriceSummary, RankingCriterion};

/// Value a summary is ranked by, or `None` when it doesn't qualify.
///
/// Discount and savings must be strictly positive. The recency proxy accepts
/// any product with a current price and ranks by product id.
pub fn criterion_value(summary: &ProductPriceSummary, criterion: RankingCriterion) -> Option<Decimal> {
    match criterion {
        RankingCriterion::Discount => summary.discount_percentage.filter(|d| *d > Decimal::ZERO),
        RankingCriterion::Savings => summary.savings_new_vs_used.filter(|s| *s > Decimal::ZERO),
        RankingCriterion::RecencyProxy => summary
            .has_current_price()
            .then(|| Decimal::from(summary.product_id.0)),
    }
}

/// Rank `catalog` by `criterion`, optionally scoped to a category and truncated to `limit`.
///
/// The input is never reordered or modified. Ordering is descending by the
/// unrounded criterion value with ties broken by ascending product id, so
/// identical input always yields identical output. With fewer qualifying
/// entries than `limit`, all of them are returned.
pub fn rank_deals(
    catalog: &[ProductPriceSummary],
    criterion: RankingCriterion,
    category: Option<&str>,
    limit: Option<usize>,
) -> DealRanking {
    let mut scored: Vec<(Decimal, &ProductPriceSummary)> = catalog
        .iter()
        .filter(|s| match category {
            Some(cat) => s.category.as_deref().is_some_and(|c| same_category(c, cat)),
            None => true,
        })
        .filter_map(|s| criterion_value(s, criterion).map(|v| (v, s)))
        .collect();

    scored.sort_by(|(va, a), (vb, b)| vb.cmp(va).then(a.product_id.cmp(&b.product_id)));

    let stats = deal_stats(&scored, criterion);
    let take = limit.unwrap_or(usize::MAX);

    DealRanking {
        criterion,
        category: category.map(|c| c.trim().to_lowercase()),
        entries: scored.into_iter().take(take).map(|(_, s)| s.clone()).collect(),
        stats,
        excluded: Vec::new(),
    }
}

fn deal_stats(scored: &[(Decimal, &ProductPriceSummary)], criterion: RankingCriterion) -> DealStats {
    let count = scored.len();
    if count == 0 || criterion == RankingCriterion::RecencyProxy {
        return DealStats {
            count,
            ..DealStats::default()
        };
    }
    let total: Decimal = scored.iter().map(|(v, _)| *v).sum();
    DealStats {
        count,
        max: scored.first().map(|(v, _)| *v),
        average: Some(total / Decimal::from(count)),
        total: Some(total),
    }
}
