//! Computes the dashboard summary of a user's finances.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;
use time::OffsetDateTime;

use crate::{
    Error,
    dashboard::aggregation::{
        BreakdownKey, CategoryBreakdownEntry, first_day_of_month, group_by_category,
        trailing_months,
    },
    store::TransactionStore,
    transaction::{SortOrder, TransactionType, TransactionWithCategory},
    user::UserID,
};

/// The number of months in the monthly summary.
pub const MONTHS_IN_SUMMARY: usize = 12;

/// The number of transactions shown in the recent transactions list.
pub const RECENT_TRANSACTIONS_LIMIT: u64 = 5;

/// The income and expense totals for one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyPoint {
    /// The month and year, e.g. "Jan 2024".
    pub month: String,
    /// The total income dated in the month.
    #[serde(with = "rust_decimal::serde::float")]
    pub income: Decimal,
    /// The total expenses dated in the month.
    #[serde(with = "rust_decimal::serde::float")]
    pub expense: Decimal,
}

/// A read-only snapshot of a user's finances for the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    /// The sum of all income.
    #[serde(with = "rust_decimal::serde::float")]
    pub total_income: Decimal,
    /// The sum of all expenses.
    #[serde(with = "rust_decimal::serde::float")]
    pub total_expense: Decimal,
    /// Total income minus total expenses.
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Decimal,
    /// Income dated on or after the first day of the current month, including
    /// any future-dated income.
    #[serde(with = "rust_decimal::serde::float")]
    pub monthly_income: Decimal,
    /// Expenses dated on or after the first day of the current month, including
    /// any future-dated expenses.
    #[serde(with = "rust_decimal::serde::float")]
    pub monthly_expense: Decimal,
    /// Income and expenses for the last twelve calendar months, oldest first.
    pub monthly_summary: Vec<MonthlyPoint>,
    /// The latest transactions, newest first.
    pub recent_transactions: Vec<TransactionWithCategory>,
    /// Income, expense and net totals per category.
    pub category_breakdown: BTreeMap<String, CategoryBreakdownEntry>,
}

/// Builds [DashboardSummary] snapshots from a [TransactionStore].
///
/// The aggregator only reads from the store and trusts the user ID it is
/// given; checking that the caller may see that user's data is up to the
/// caller.
#[derive(Debug, Clone)]
pub struct SummaryAggregator<S> {
    store: S,
    breakdown_key: BreakdownKey,
}

impl<S: TransactionStore> SummaryAggregator<S> {
    /// Create an aggregator that groups the category breakdown by category name.
    pub fn new(store: S) -> Self {
        Self {
            store,
            breakdown_key: BreakdownKey::default(),
        }
    }

    /// Set how the category breakdown is grouped.
    pub fn breakdown_key(mut self, breakdown_key: BreakdownKey) -> Self {
        self.breakdown_key = breakdown_key;
        self
    }

    /// Compute the dashboard summary for `user_id` as of `now`.
    ///
    /// Month boundaries are taken from the calendar date of `now` in its own
    /// offset, so callers should convert `now` to the user's local time first.
    ///
    /// # Errors
    /// Returns any error from the store unchanged. No partial summary is returned.
    pub fn compute_summary(
        &self,
        user_id: UserID,
        now: OffsetDateTime,
    ) -> Result<DashboardSummary, Error> {
        let store = &self.store;
        let today = now.date();

        let total_income = store.sum_amount(user_id, TransactionType::Income, None, None)?;
        let total_expense = store.sum_amount(user_id, TransactionType::Expense, None, None)?;

        let month_start = first_day_of_month(today);
        let monthly_income =
            store.sum_amount(user_id, TransactionType::Income, Some(month_start), None)?;
        let monthly_expense =
            store.sum_amount(user_id, TransactionType::Expense, Some(month_start), None)?;

        let monthly_summary = trailing_months(today, MONTHS_IN_SUMMARY)
            .into_iter()
            .map(|month| {
                Ok(MonthlyPoint {
                    month: month.label(),
                    income: store.sum_amount(
                        user_id,
                        TransactionType::Income,
                        Some(month.start),
                        Some(month.end),
                    )?,
                    expense: store.sum_amount(
                        user_id,
                        TransactionType::Expense,
                        Some(month.start),
                        Some(month.end),
                    )?,
                })
            })
            .collect::<Result<Vec<_>, Error>>()?;

        let recent_transactions = store.list_transactions(
            user_id,
            SortOrder::Descending,
            RECENT_TRANSACTIONS_LIMIT,
        )?;

        let all_transactions = store.list_all_transactions_with_category(user_id)?;
        let category_breakdown = group_by_category(&all_transactions, self.breakdown_key);

        tracing::debug!(
            "computed dashboard summary for user {user_id} from {} transactions",
            all_transactions.len()
        );

        Ok(DashboardSummary {
            total_income,
            total_expense,
            balance: total_income - total_expense,
            monthly_income,
            monthly_expense,
            monthly_summary,
            recent_transactions,
            category_breakdown,
        })
    }
}
