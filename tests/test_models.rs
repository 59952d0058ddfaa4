//! Observation parsing and model helpers.

use pricewatch_core::{
    parse_price, parse_timestamp, same_category, Condition, MalformedObservation, Market, ProductId, ProductMeta,
    RawObservation,
};
use rust_decimal_macros::dec;

fn raw(source: &str, price: Option<&str>, at: Option<&str>) -> RawObservation {
    RawObservation {
        product_id: ProductId(1),
        source: source.into(),
        price: price.map(String::from),
        captured_at: at.map(String::from),
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// RawObservation::parse
// ---------------------------------------------------------------------------

#[test]
fn market_is_inferred_from_source_prefix() {
    let new = raw("amazon", Some("10"), Some("2024-06-15T09:00:00Z")).parse().unwrap();
    let used = raw("used:subito", Some("10"), Some("2024-06-15T09:00:00Z")).parse().unwrap();
    assert_eq!(new.market, Market::New);
    assert_eq!(used.market, Market::Used);
}

#[test]
fn explicit_market_wins_and_accepts_italian_labels() {
    let mut row = raw("amazon", Some("10"), Some("2024-06-15T09:00:00Z"));
    row.market = Some("Usato".into());
    assert_eq!(row.parse().unwrap().market, Market::Used);

    row.market = Some("refurb".into());
    assert!(matches!(row.parse(), Err(MalformedObservation::UnknownMarket(_))));
}

#[test]
fn missing_or_bad_fields_are_malformed() {
    assert_eq!(
        raw("amazon", None, Some("2024-06-15T09:00:00Z")).parse().unwrap_err(),
        MalformedObservation::MissingPrice
    );
    assert_eq!(
        raw("amazon", Some("  "), Some("2024-06-15T09:00:00Z")).parse().unwrap_err(),
        MalformedObservation::MissingPrice
    );
    assert!(matches!(
        raw("amazon", Some("cheap"), Some("2024-06-15T09:00:00Z")).parse(),
        Err(MalformedObservation::UnparseablePrice(_))
    ));
    assert_eq!(
        raw("amazon", Some("10"), None).parse().unwrap_err(),
        MalformedObservation::MissingTimestamp
    );
    assert!(matches!(
        raw("amazon", Some("10"), Some("15/06/2024")).parse(),
        Err(MalformedObservation::UnparseableTimestamp(_))
    ));
}

#[test]
fn non_positive_prices_parse_but_are_not_valid() {
    let obs = raw("amazon", Some("0"), Some("2024-06-15T09:00:00Z")).parse().unwrap();
    assert!(!obs.is_valid_price());
}

#[test]
fn numeric_json_prices_are_accepted() {
    let row: RawObservation = serde_json::from_value(serde_json::json!({
        "product_id": 3,
        "retailer": "amazon",
        "price": 29.99,
        "scraped_at": "2024-06-15 05:00:00"
    }))
    .unwrap();
    let obs = row.parse().unwrap();
    assert_eq!(obs.price, dec!(29.99));
    assert_eq!(obs.source, "amazon");
}

// ---------------------------------------------------------------------------
// Field parsers
// ---------------------------------------------------------------------------

#[test]
fn price_formats() {
    assert_eq!(parse_price("120.50").unwrap(), dec!(120.50));
    assert_eq!(parse_price("€ 99,90").unwrap(), dec!(99.90));
    assert_eq!(parse_price(" 7 ").unwrap(), dec!(7));
    assert!(parse_price("1.299,00").is_err());
}

#[test]
fn timestamp_formats() {
    let expected = parse_timestamp("2024-06-15T07:00:00Z").unwrap();
    assert_eq!(parse_timestamp("2024-06-15T09:00:00+02:00").unwrap(), expected);
    assert_eq!(parse_timestamp("2024-06-15 07:00:00").unwrap(), expected);
    assert_eq!(parse_timestamp("2024-06-15T07:00:00.000").unwrap(), expected);
}

#[test]
fn condition_labels() {
    assert_eq!(Condition::parse("Like New"), Some(Condition::LikeNew));
    assert_eq!(Condition::parse("ricondizionato"), Some(Condition::Refurbished));
    assert_eq!(Condition::parse("very-good"), Some(Condition::VeryGood));
    assert_eq!(Condition::parse("mint"), None);
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

#[test]
fn category_comparison_ignores_case_and_padding() {
    assert!(same_category("Smartphone", " smartphone"));
    assert!(!same_category("Smartphone", "Smartphones"));

    let meta: ProductMeta =
        serde_json::from_str(r#"{"id": 1, "name": "Phone A", "category": "AUDIO"}"#).unwrap();
    assert!(meta.in_category("audio"));
    assert_eq!(meta.brand, "");
}

#[test]
fn category_comparison_lowercases_accented_labels() {
    assert!(same_category("Élettronica", "élettronica"));
    assert!(same_category(" ÉLETTRONICA ", "Élettronica"));
    assert!(!same_category("Élettronica", "Elettronica"));
}

#[test]
fn product_id_is_transparent() {
    assert_eq!(serde_json::to_string(&ProductId(42)).unwrap(), "42");
    assert_eq!(ProductId::from(7).to_string(), "7");
}
