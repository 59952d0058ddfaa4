//! Query interfaces over a [`PriceEngine`](crate::PriceEngine).
//!
//! Each module provides a query struct that borrows the engine and combines
//! store reads with the pure functions in [`analytics`](crate::analytics).

pub mod deals;
pub mod history;
pub mod summary;

pub use deals::DealQuery;
pub use history::HistoryQuery;
pub use summary::SummaryQuery;
