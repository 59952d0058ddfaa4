//! Engine settings defaults and validation.

use std::time::Duration;

use pricewatch_core::config::{self, EngineSettings};
use pricewatch_core::PriceError;

#[test]
fn defaults() {
    let settings = EngineSettings::default();
    assert_eq!(settings.reference_timezone, "Europe/Rome");
    assert_eq!(settings.staleness(), chrono::Duration::hours(48));
    assert_eq!(settings.recent_high_days, 90);
    assert_eq!(settings.cache_ttl(), Some(Duration::from_secs(30 * 60)));
    assert_eq!(settings.store_timeout(), Duration::from_secs(5));
    assert!(settings.validate().is_ok());
}

#[test]
fn cache_ttl_must_be_within_range() {
    for ttl in [15, 30, 60] {
        let settings = EngineSettings {
            cache_ttl_minutes: Some(ttl),
            ..Default::default()
        };
        assert!(settings.validate().is_ok(), "ttl {}", ttl);
    }
    for ttl in [0, 14, 61] {
        let settings = EngineSettings {
            cache_ttl_minutes: Some(ttl),
            ..Default::default()
        };
        assert!(matches!(settings.validate(), Err(PriceError::InvalidArgument(_))));
    }
    let off = EngineSettings {
        cache_ttl_minutes: None,
        ..Default::default()
    };
    assert!(off.validate().is_ok());
    assert_eq!(off.cache_ttl(), None);
}

#[test]
fn other_fields_are_validated() {
    let cases = [
        EngineSettings {
            reference_timezone: "Nowhere/City".into(),
            ..Default::default()
        },
        EngineSettings {
            staleness_hours: 0,
            ..Default::default()
        },
        EngineSettings {
            recent_high_days: 91,
            ..Default::default()
        },
        EngineSettings {
            store_timeout_ms: 0,
            ..Default::default()
        },
    ];
    for settings in cases {
        assert!(settings.validate().is_err(), "{}", settings);
    }
}

#[test]
fn partial_files_fill_in_defaults() {
    let settings: EngineSettings =
        serde_json::from_str(r#"{"reference_timezone": "UTC", "cache_ttl_minutes": null}"#).unwrap();
    assert_eq!(settings.reference_timezone, "UTC");
    assert_eq!(settings.cache_ttl_minutes, None);
    assert_eq!(settings.staleness_hours, config::DEFAULT_STALENESS_HOURS);
    assert!(settings.validate().is_ok());
}

#[test]
fn display_summarizes_settings() {
    let settings = EngineSettings {
        cache_ttl_minutes: None,
        ..Default::default()
    };
    assert_eq!(
        settings.to_string(),
        "tz=Europe/Rome staleness=48h recent_high=90d cache_ttl=off store_timeout=5000ms"
    );
}

#[test]
fn config_file_lives_under_platform_dir() {
    if let Some(path) = config::default_config_file() {
        assert!(path.ends_with("pricewatch/pricewatch"));
    }
}
