//! Calendar month arithmetic and per-category grouping for the dashboard.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;
use time::{Date, Duration, Month};

use crate::{
    category::Category,
    transaction::{Transaction, TransactionType},
};

/// The first and last day (inclusive) of one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct MonthSpan {
    pub start: Date,
    pub end: Date,
}

impl MonthSpan {
    /// The calendar month that contains `date`.
    pub(super) fn containing(date: Date) -> Self {
        let start = first_day_of_month(date);
        let days_in_month = date.month().length(date.year());
        let end = start + Duration::days(i64::from(days_in_month) - 1);

        Self { start, end }
    }

    /// The calendar month immediately before this one.
    ///
    /// Returns `None` only when this is the first month representable by [Date].
    pub(super) fn previous(&self) -> Option<Self> {
        self.start.previous_day().map(Self::containing)
    }

    /// A label such as "Jan 2024".
    pub(super) fn label(&self) -> String {
        format!("{} {}", month_abbreviation(self.start.month()), self.start.year())
    }
}

/// Returns the first day of the month containing `date`.
pub(super) fn first_day_of_month(date: Date) -> Date {
    date - Duration::days(i64::from(date.day()) - 1)
}

/// Returns the `count` calendar months ending with the month that contains
/// `today`, oldest first.
///
/// Months are stepped back one calendar month at a time, so a `today` at the
/// end of a long month never repeats it or skips a shorter month before it.
pub(super) fn trailing_months(today: Date, count: usize) -> Vec<MonthSpan> {
    let mut months = Vec::with_capacity(count);
    let mut month = Some(MonthSpan::containing(today));

    while months.len() < count {
        let Some(current) = month else {
            break;
        };

        months.push(current);
        month = current.previous();
    }

    months.reverse();
    months
}

fn month_abbreviation(month: Month) -> &'static str {
    match month {
        Month::January => "Jan",
        Month::February => "Feb",
        Month::March => "Mar",
        Month::April => "Apr",
        Month::May => "May",
        Month::June => "Jun",
        Month::July => "Jul",
        Month::August => "Aug",
        Month::September => "Sep",
        Month::October => "Oct",
        Month::November => "Nov",
        Month::December => "Dec",
    }
}

/// How transactions are grouped in the category breakdown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum BreakdownKey {
    /// Group by category name. Categories that share a name are merged.
    #[default]
    #[value(name = "name")]
    CategoryName,
    /// Group by category ID. Each category gets its own entry, keyed by its ID.
    #[value(name = "id")]
    CategoryId,
}

impl BreakdownKey {
    fn key_for(&self, category: &Category) -> String {
        match self {
            BreakdownKey::CategoryName => category.name.to_string(),
            BreakdownKey::CategoryId => category.id.to_string(),
        }
    }
}

/// The income and expense totals of one group in the category breakdown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CategoryBreakdownEntry {
    /// The total income in the group.
    #[serde(with = "rust_decimal::serde::float")]
    pub income: Decimal,
    /// The total expenses in the group.
    #[serde(with = "rust_decimal::serde::float")]
    pub expense: Decimal,
    /// Income minus expenses.
    #[serde(with = "rust_decimal::serde::float")]
    pub net: Decimal,
}

/// Groups transactions by category and totals income and expense per group.
///
/// # Returns
/// Map from the group key (see [BreakdownKey]) to the group's totals, ordered by key.
pub(super) fn group_by_category(
    transactions: &[(Transaction, Category)],
    key: BreakdownKey,
) -> BTreeMap<String, CategoryBreakdownEntry> {
    let mut breakdown: BTreeMap<String, CategoryBreakdownEntry> = BTreeMap::new();

    for (transaction, category) in transactions {
        let entry = breakdown.entry(key.key_for(category)).or_default();
        let amount = transaction.amount.as_decimal();

        match transaction.transaction_type {
            TransactionType::Income => entry.income += amount,
            TransactionType::Expense => entry.expense += amount,
        }
    }

    for entry in breakdown.values_mut() {
        entry.net = entry.income - entry.expense;
    }

    breakdown
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use time::macros::date;

    use crate::{
        category::{Category, CategoryColor, CategoryName},
        dashboard::aggregation::{
            BreakdownKey, MonthSpan, first_day_of_month, group_by_category, trailing_months,
        },
        money::Amount,
        transaction::{Transaction, TransactionName, TransactionType},
        user::UserID,
    };

    fn create_test_category(id: i64, name: &str) -> Category {
        Category {
            id,
            user_id: UserID::new(1),
            name: CategoryName::new_unchecked(name),
            color: CategoryColor::new_unchecked("#000000"),
            description: None,
        }
    }

    fn create_test_transaction(
        cents: i64,
        transaction_type: TransactionType,
        category: &Category,
    ) -> (Transaction, Category) {
        let transaction = Transaction {
            id: 1,
            user_id: UserID::new(1),
            category_id: category.id,
            date: date!(2024 - 01 - 15),
            name: TransactionName::new_unchecked("Test"),
            description: None,
            amount: Amount::from_cents_unchecked(cents),
            transaction_type,
        };

        (transaction, category.clone())
    }

    #[test]
    fn first_day_of_month_handles_first_and_last_days() {
        assert_eq!(first_day_of_month(date!(2024 - 03 - 01)), date!(2024 - 03 - 01));
        assert_eq!(first_day_of_month(date!(2024 - 03 - 31)), date!(2024 - 03 - 01));
    }

    #[test]
    fn month_span_ends_on_last_day_of_month() {
        assert_eq!(
            MonthSpan::containing(date!(2024 - 02 - 10)),
            MonthSpan {
                start: date!(2024 - 02 - 01),
                end: date!(2024 - 02 - 29),
            }
        );
        assert_eq!(
            MonthSpan::containing(date!(2023 - 02 - 10)).end,
            date!(2023 - 02 - 28)
        );
        assert_eq!(
            MonthSpan::containing(date!(2023 - 12 - 31)).end,
            date!(2023 - 12 - 31)
        );
    }

    #[test]
    fn month_label_has_abbreviation_and_year() {
        assert_eq!(MonthSpan::containing(date!(2024 - 01 - 20)).label(), "Jan 2024");
        assert_eq!(MonthSpan::containing(date!(1999 - 12 - 01)).label(), "Dec 1999");
    }

    #[test]
    fn trailing_months_are_oldest_first_and_cross_years() {
        let months = trailing_months(date!(2024 - 03 - 15), 12);

        let labels: Vec<String> = months.iter().map(MonthSpan::label).collect();

        assert_eq!(
            labels,
            vec![
                "Apr 2023", "May 2023", "Jun 2023", "Jul 2023", "Aug 2023", "Sep 2023",
                "Oct 2023", "Nov 2023", "Dec 2023", "Jan 2024", "Feb 2024", "Mar 2024",
            ]
        );
    }

    #[test]
    fn trailing_months_do_not_skip_short_months_at_month_end() {
        let months = trailing_months(date!(2024 - 03 - 31), 2);

        assert_eq!(months[0].start, date!(2024 - 02 - 01));
        assert_eq!(months[0].end, date!(2024 - 02 - 29));
        assert_eq!(months[1].start, date!(2024 - 03 - 01));
    }

    #[test]
    fn trailing_months_from_month_end_cover_each_month_once() {
        let months = trailing_months(date!(2024 - 05 - 31), 4);

        let labels: Vec<String> = months.iter().map(MonthSpan::label).collect();

        assert_eq!(labels, vec!["Feb 2024", "Mar 2024", "Apr 2024", "May 2024"]);
        assert_eq!(months[0].end, date!(2024 - 02 - 29));
        assert_eq!(months[2].end, date!(2024 - 04 - 30));
    }

    #[test]
    fn group_by_category_separates_income_and_expense() {
        let salary = create_test_category(1, "Salary");
        let groceries = create_test_category(2, "Groceries");
        let transactions = vec![
            create_test_transaction(500_000, TransactionType::Income, &salary),
            create_test_transaction(12_550, TransactionType::Expense, &groceries),
            create_test_transaction(1_000, TransactionType::Income, &groceries),
        ];

        let result = group_by_category(&transactions, BreakdownKey::CategoryName);

        assert_eq!(result.len(), 2);
        let salary_entry = result["Salary"];
        assert_eq!(salary_entry.income, Decimal::new(500_000, 2));
        assert_eq!(salary_entry.expense, Decimal::ZERO);
        assert_eq!(salary_entry.net, Decimal::new(500_000, 2));
        let groceries_entry = result["Groceries"];
        assert_eq!(groceries_entry.income, Decimal::new(1_000, 2));
        assert_eq!(groceries_entry.expense, Decimal::new(12_550, 2));
        assert_eq!(groceries_entry.net, Decimal::new(-11_550, 2));
    }

    #[test]
    fn group_by_category_name_merges_categories_with_same_name() {
        let first_other = create_test_category(1, "Other");
        let second_other = create_test_category(2, "Other");
        let transactions = vec![
            create_test_transaction(1_000, TransactionType::Expense, &first_other),
            create_test_transaction(2_500, TransactionType::Expense, &second_other),
        ];

        let result = group_by_category(&transactions, BreakdownKey::CategoryName);

        assert_eq!(result.len(), 1);
        assert_eq!(result["Other"].expense, Decimal::new(3_500, 2));
        assert_eq!(result["Other"].net, Decimal::new(-3_500, 2));
    }

    #[test]
    fn group_by_category_id_keeps_categories_with_same_name_apart() {
        let first_other = create_test_category(1, "Other");
        let second_other = create_test_category(2, "Other");
        let transactions = vec![
            create_test_transaction(1_000, TransactionType::Expense, &first_other),
            create_test_transaction(2_500, TransactionType::Expense, &second_other),
        ];

        let result = group_by_category(&transactions, BreakdownKey::CategoryId);

        assert_eq!(result.len(), 2);
        assert_eq!(result["1"].expense, Decimal::new(1_000, 2));
        assert_eq!(result["2"].expense, Decimal::new(2_500, 2));
    }

    #[test]
    fn group_by_category_handles_empty_input() {
        let result = group_by_category(&[], BreakdownKey::CategoryName);

        assert!(result.is_empty());
    }
}
