use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

// ---------------------------------------------------------------------------
// ProductId
// ---------------------------------------------------------------------------

/// Catalog identifier of a product.
///
/// Identifiers are assigned monotonically by the catalog, so numeric order
/// doubles as a rough creation order.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ProductId(pub i64);

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ProductId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

// ---------------------------------------------------------------------------
// Market
// ---------------------------------------------------------------------------

/// Which side of the catalog a listing belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Market {
    /// Retailer stock.
    New,
    /// Marketplace and refurbished listings.
    Used,
}

impl Market {
    pub fn as_str(&self) -> &'static str {
        match self {
            Market::New => "new",
            Market::Used => "used",
        }
    }

    /// Infer the market from a source label: `used:<platform>` is used, anything else new.
    pub fn from_source(source: &str) -> Self {
        if source.trim().to_lowercase().starts_with(USED_SOURCE_PREFIX) {
            Market::Used
        } else {
            Market::New
        }
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Market {
    type Err = MalformedObservation;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "new" | "nuovo" => Ok(Market::New),
            "used" | "usato" => Ok(Market::Used),
            other => Err(MalformedObservation::UnknownMarket(other.to_string())),
        }
    }
}

/// Prefix marking marketplace sources, e.g. `used:subito`.
pub const USED_SOURCE_PREFIX: &str = "used:";

// ---------------------------------------------------------------------------
// Condition
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    New,
    LikeNew,
    VeryGood,
    Good,
    Acceptable,
    Refurbished,
}

impl Condition {
    /// Lenient parse of the free-text condition labels scrapers emit.
    ///
    /// Returns `None` for labels that don't map to a known grade.
    pub fn parse(label: &str) -> Option<Self> {
        let norm = label.trim().to_lowercase().replace(['-', ' '], "_");
        match norm.as_str() {
            "new" | "nuovo" => Some(Condition::New),
            "like_new" | "come_nuovo" => Some(Condition::LikeNew),
            "very_good" | "ottimo" => Some(Condition::VeryGood),
            "good" | "buono" => Some(Condition::Good),
            "acceptable" | "accettabile" | "discreto" => Some(Condition::Acceptable),
            "refurbished" | "ricondizionato" => Some(Condition::Refurbished),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// PriceObservation
// ---------------------------------------------------------------------------

/// A single retailer or listing price reading at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceObservation {
    pub product_id: ProductId,
    pub source: String,
    pub market: Market,
    pub price: Decimal,
    pub captured_at: DateTime<Utc>,
    pub availability: Option<bool>,
    pub condition: Option<Condition>,
    pub url: Option<String>,
}

impl PriceObservation {
    /// Build an observation with only the required fields set.
    pub fn new(
        product_id: ProductId,
        source: impl Into<String>,
        market: Market,
        price: Decimal,
        captured_at: DateTime<Utc>,
    ) -> Self {
        Self {
            product_id,
            source: source.into(),
            market,
            price,
            captured_at,
            availability: None,
            condition: None,
            url: None,
        }
    }

    pub fn is_valid_price(&self) -> bool {
        self.price > Decimal::ZERO
    }
}

// ---------------------------------------------------------------------------
// RawObservation
// ---------------------------------------------------------------------------

/// Untyped observation row as it comes out of a store.
///
/// Price and timestamp are kept as text so a bad row can be counted and
/// skipped instead of failing the whole read.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawObservation {
    #[serde(default)]
    pub product_id: ProductId,
    #[serde(default, alias = "retailer")]
    pub source: String,
    #[serde(default)]
    pub market: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    pub price: Option<String>,
    #[serde(default, alias = "scraped_at")]
    pub captured_at: Option<String>,
    #[serde(default)]
    pub availability: Option<bool>,
    #[serde(default)]
    pub condition: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl RawObservation {
    /// Validate and type the row.
    pub fn parse(&self) -> std::result::Result<PriceObservation, MalformedObservation> {
        let price_text = self
            .price
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .ok_or(MalformedObservation::MissingPrice)?;
        let price = parse_price(price_text)?;

        let ts_text = self
            .captured_at
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(MalformedObservation::MissingTimestamp)?;
        let captured_at = parse_timestamp(ts_text)?;

        let market = match self.market.as_deref().map(str::trim) {
            Some(m) if !m.is_empty() => m.parse()?,
            _ => Market::from_source(&self.source),
        };

        Ok(PriceObservation {
            product_id: self.product_id,
            source: self.source.trim().to_string(),
            market,
            price,
            captured_at,
            availability: self.availability,
            condition: self.condition.as_deref().and_then(Condition::parse),
            url: self.url.clone(),
        })
    }
}

/// Why a raw row was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MalformedObservation {
    #[error("missing price")]
    MissingPrice,
    #[error("unparseable price: {0:?}")]
    UnparseablePrice(String),
    #[error("missing timestamp")]
    MissingTimestamp,
    #[error("unparseable timestamp: {0:?}")]
    UnparseableTimestamp(String),
    #[error("unknown market: {0:?}")]
    UnknownMarket(String),
}

/// Parse a decimal price string. A lone comma is accepted as the decimal separator.
pub fn parse_price(text: &str) -> std::result::Result<Decimal, MalformedObservation> {
    let cleaned = text.trim().trim_start_matches('€').trim();
    let normalized = if cleaned.contains(',') && !cleaned.contains('.') {
        cleaned.replace(',', ".")
    } else {
        cleaned.to_string()
    };
    Decimal::from_str(&normalized)
        .map_err(|_| MalformedObservation::UnparseablePrice(text.to_string()))
}

/// Parse an RFC 3339 timestamp, or a naive `YYYY-MM-DD HH:MM:SS[.f]` one taken as UTC.
pub fn parse_timestamp(text: &str) -> std::result::Result<DateTime<Utc>, MalformedObservation> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Ok(ts.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, fmt) {
            return Ok(naive.and_utc());
        }
    }
    Err(MalformedObservation::UnparseableTimestamp(text.to_string()))
}

fn text_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}
