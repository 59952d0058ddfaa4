//! Market price resolver tests.

mod common;

use chrono::Duration;
use common::{now, obs};
use pricewatch_core::analytics::MarketPriceResolver;
use pricewatch_core::{Market, PriceObservation};
use rust_decimal_macros::dec;

fn resolver() -> MarketPriceResolver {
    MarketPriceResolver::default()
}

#[test]
fn default_staleness_is_48_hours() {
    assert_eq!(resolver().staleness(), Duration::hours(48));
}

#[test]
fn cheapest_current_source_wins() {
    let observations = vec![
        obs(1, "amazon", Market::New, dec!(105), "2024-06-15T08:00:00Z"),
        obs(1, "mediaworld", Market::New, dec!(99.90), "2024-06-14T08:00:00Z"),
        obs(1, "unieuro", Market::New, dec!(101), "2024-06-15T09:00:00Z"),
    ];
    let best = resolver().resolve(&observations, Market::New, now()).unwrap();
    assert_eq!(best.price, dec!(99.90));
    assert_eq!(best.source, "mediaworld");
    assert_eq!(best.current_sources, 3);
}

#[test]
fn stale_observations_are_not_current() {
    let observations = vec![
        // 48h01m old.
        obs(1, "amazon", Market::New, dec!(50), "2024-06-13T09:59:00Z"),
        obs(1, "mediaworld", Market::New, dec!(80), "2024-06-15T09:00:00Z"),
    ];
    let best = resolver().resolve(&observations, Market::New, now()).unwrap();
    assert_eq!(best.price, dec!(80));
    assert_eq!(best.current_sources, 1);
}

#[test]
fn exactly_at_threshold_is_still_current() {
    let observations = vec![obs(1, "amazon", Market::New, dec!(50), "2024-06-13T10:00:00Z")];
    assert!(resolver().resolve(&observations, Market::New, now()).is_some());
}

#[test]
fn nothing_current_means_absent_not_zero() {
    let observations = vec![obs(1, "amazon", Market::New, dec!(50), "2024-06-01T10:00:00Z")];
    assert_eq!(resolver().resolve(&observations, Market::New, now()), None);
    assert_eq!(resolver().resolve(&[], Market::Used, now()), None);
}

#[test]
fn only_latest_observation_per_source_counts() {
    // Amazon was cheaper yesterday but its latest reading is higher.
    let observations = vec![
        obs(1, "amazon", Market::New, dec!(90), "2024-06-14T10:00:00Z"),
        obs(1, "amazon", Market::New, dec!(110), "2024-06-15T09:00:00Z"),
        obs(1, "mediaworld", Market::New, dec!(100), "2024-06-15T08:00:00Z"),
    ];
    let best = resolver().resolve(&observations, Market::New, now()).unwrap();
    assert_eq!(best.price, dec!(100));
    assert_eq!(best.source, "mediaworld");
}

#[test]
fn same_timestamp_same_source_keeps_cheaper() {
    let observations = vec![
        obs(1, "amazon", Market::New, dec!(110), "2024-06-15T09:00:00Z"),
        obs(1, "amazon", Market::New, dec!(95), "2024-06-15T09:00:00Z"),
    ];
    let latest = MarketPriceResolver::latest_per_source(&observations, Market::New);
    assert_eq!(latest.len(), 1);
    assert_eq!(latest[0].price, dec!(95));
}

#[test]
fn price_ties_go_to_earliest_capture_then_source_name() {
    let observations = vec![
        obs(1, "zeta", Market::New, dec!(100), "2024-06-15T08:00:00Z"),
        obs(1, "beta", Market::New, dec!(100), "2024-06-15T09:00:00Z"),
        obs(1, "alpha", Market::New, dec!(100), "2024-06-15T08:00:00Z"),
    ];
    let best = resolver().resolve(&observations, Market::New, now()).unwrap();
    assert_eq!(best.source, "alpha");

    let mut shuffled = observations.clone();
    shuffled.rotate_left(1);
    assert_eq!(resolver().resolve(&shuffled, Market::New, now()).unwrap(), best);
}

#[test]
fn unavailable_listing_never_becomes_best() {
    let mut sold_out = obs(1, "amazon", Market::New, dec!(10), "2024-06-15T09:00:00Z");
    sold_out.availability = Some(false);
    let observations = vec![
        sold_out,
        obs(1, "mediaworld", Market::New, dec!(20), "2024-06-15T09:00:00Z"),
    ];
    let best = resolver().resolve(&observations, Market::New, now()).unwrap();
    assert_eq!(best.source, "mediaworld");
}

#[test]
fn non_positive_prices_never_qualify() {
    let observations = vec![
        obs(1, "amazon", Market::New, dec!(0), "2024-06-15T09:00:00Z"),
        obs(1, "mediaworld", Market::New, dec!(-1), "2024-06-15T09:00:00Z"),
    ];
    assert_eq!(resolver().resolve(&observations, Market::New, now()), None);
}

#[test]
fn markets_are_resolved_independently() {
    let observations: Vec<PriceObservation> = vec![
        obs(1, "amazon", Market::New, dec!(500), "2024-06-15T09:00:00Z"),
        obs(1, "used:subito", Market::Used, dec!(350), "2024-06-15T09:00:00Z"),
        obs(1, "used:ebay", Market::Used, dec!(360), "2024-06-15T07:00:00Z"),
    ];
    let new = resolver().resolve(&observations, Market::New, now()).unwrap();
    let used = resolver().resolve(&observations, Market::Used, now()).unwrap();
    assert_eq!(new.price, dec!(500));
    assert_eq!(used.price, dec!(350));
    assert_eq!(used.current_sources, 2);
}

#[test]
fn custom_staleness_threshold() {
    let strict = MarketPriceResolver::new(Duration::hours(1));
    let observations = vec![obs(1, "amazon", Market::New, dec!(50), "2024-06-15T08:30:00Z")];
    assert_eq!(strict.resolve(&observations, Market::New, now()), None);
    assert!(resolver().resolve(&observations, Market::New, now()).is_some());
}
