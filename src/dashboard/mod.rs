//! Dashboard module
//!
//! Computes a read-only summary of a user's finances: all-time and
//! current-month totals, a twelve month trend, the latest transactions and
//! per-category totals.

mod aggregation;
mod handlers;
mod summary;

pub use aggregation::{BreakdownKey, CategoryBreakdownEntry};
pub use handlers::{DashboardState, get_dashboard_summary};
pub use summary::{
    DashboardSummary, MONTHS_IN_SUMMARY, MonthlyPoint, RECENT_TRANSACTIONS_LIMIT,
    SummaryAggregator,
};
