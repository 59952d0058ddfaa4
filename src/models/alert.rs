//! Intake contract for the external price-alert evaluator.
//!
//! The evaluator itself (threshold storage, scheduling, email delivery) lives
//! outside this crate. It reads [`CurrentPrice`] values and compares them
//! against stored thresholds. For identical observations and the same
//! resolution instant the engine always reports the same best price, which is
//! what lets the evaluator avoid duplicate or missed notifications.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{CurrentPrice, ProductId};

/// A user's "tell me when it drops below" request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertThreshold {
    pub product_id: ProductId,
    pub target_price: Decimal,
    pub email: String,
}

impl AlertThreshold {
    /// Reference comparison: the current price is at or below the target.
    pub fn is_met(&self, current: &CurrentPrice) -> bool {
        current.product_id == self.product_id && current.price <= self.target_price
    }
}

/// Implemented by the external evaluator.
pub trait ThresholdEvaluator {
    /// Decide whether `threshold` should fire for `current`.
    ///
    /// `current` is `None` when the product has no current new-market price;
    /// implementations must not treat that as a price of zero.
    fn should_notify(&self, threshold: &AlertThreshold, current: Option<&CurrentPrice>) -> bool;
}
