//! Pure analytics over immutable observation snapshots.
//!
//! Nothing in this module touches a store, a clock or shared state: every
//! function takes its inputs (including "now" and the reference timezone)
//! explicitly and returns new values.

pub mod discount;
pub mod ranking;
pub mod resolver;
pub mod rollup;
pub mod trending;

pub use discount::{discount_percentage, recent_high, savings, summarize};
pub use ranking::{criterion_value, rank_deals};
pub use resolver::MarketPriceResolver;
pub use rollup::{daily_rollup, local_date, start_of_day, window_start};
pub use trending::trending;
