use serde::{Deserialize, Deserializer, Serialize};

use crate::models::ProductId;

// ---------------------------------------------------------------------------
// ProductMeta — catalog entry used for scoping rankings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductMeta {
    #[serde(alias = "id")]
    pub product_id: ProductId,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub brand: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub category: String,
}

impl ProductMeta {
    /// Case-insensitive category match.
    pub fn in_category(&self, category: &str) -> bool {
        same_category(&self.category, category)
    }
}

/// Compare category labels the way the storefront does: trimmed, case-insensitive.
///
/// Lowercases with Unicode rules, matching the store's `LOWER(TRIM(..))` filter.
pub fn same_category(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
