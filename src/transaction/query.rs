//! Filtered, sorted listings of a user's transactions.

use rusqlite::{Connection, Row, params_from_iter, types::Value};
use time::Date;

use crate::{
    Error,
    database_id::CategoryId,
    transaction::{
        CategoryLabel, TransactionType, TransactionWithCategory,
        core::{TRANSACTION_COLUMNS, TRANSACTION_COLUMN_COUNT, map_transaction_row},
    },
    user::UserID,
};

/// The field to sort transactions by in a [TransactionQuery].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortField {
    /// Sort by the transaction date.
    #[default]
    Date,
    /// Sort by the transaction amount.
    Amount,
    /// Sort by the transaction name.
    Name,
}

impl SortField {
    fn column(&self) -> &'static str {
        match self {
            SortField::Date => "\"transaction\".date",
            SortField::Amount => "\"transaction\".amount",
            SortField::Name => "\"transaction\".name",
        }
    }
}

/// The order to sort transactions in a [TransactionQuery].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Sort in order of increasing value.
    Ascending,
    /// Sort in order of decreasing value.
    #[default]
    Descending,
}

impl SortOrder {
    fn keyword(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "ASC",
            SortOrder::Descending => "DESC",
        }
    }
}

/// Defines how transactions should be fetched from [query_transactions].
///
/// The default query returns every transaction, newest first.
#[derive(Debug, Clone, Default)]
pub struct TransactionQuery {
    /// Only include transactions whose name or description contains this text,
    /// ignoring ASCII case.
    pub search: Option<String>,
    /// Only include transactions in this category.
    pub category_id: Option<CategoryId>,
    /// Only include transactions of this type.
    pub transaction_type: Option<TransactionType>,
    /// Only include transactions dated on or after this date.
    pub date_from: Option<Date>,
    /// Only include transactions dated on or before this date.
    pub date_to: Option<Date>,
    /// The field to sort by.
    pub sort_by: SortField,
    /// The direction to sort in.
    pub sort_order: SortOrder,
    /// Selects up to the first N (`limit`) transactions.
    pub limit: Option<u64>,
}

/// Get the transactions of `user_id` that match `query`, with their categories.
///
/// Transactions that compare equal on the sort field are ordered by ID in the
/// same direction, so with the default query the most recently created
/// transaction comes first among those on the same date.
///
/// # Errors
/// This function will return a [Error::SqlError] there is a SQL error.
pub fn query_transactions(
    user_id: UserID,
    query: &TransactionQuery,
    connection: &Connection,
) -> Result<Vec<TransactionWithCategory>, Error> {
    let mut where_clause_parts = vec!["\"transaction\".user_id = ?1".to_owned()];
    let mut query_parameters = vec![Value::Integer(user_id.as_i64())];

    if let Some(search) = query.search.as_deref().filter(|search| !search.is_empty()) {
        let index = query_parameters.len() + 1;
        where_clause_parts.push(format!(
            "(instr(lower(\"transaction\".name), lower(?{index})) > 0 \
            OR instr(lower(COALESCE(\"transaction\".description, '')), lower(?{index})) > 0)"
        ));
        query_parameters.push(Value::Text(search.to_owned()));
    }

    if let Some(category_id) = query.category_id {
        where_clause_parts.push(format!(
            "\"transaction\".category_id = ?{}",
            query_parameters.len() + 1
        ));
        query_parameters.push(Value::Integer(category_id));
    }

    if let Some(transaction_type) = query.transaction_type {
        where_clause_parts.push(format!(
            "\"transaction\".type = ?{}",
            query_parameters.len() + 1
        ));
        query_parameters.push(Value::Text(transaction_type.as_str().to_owned()));
    }

    if let Some(date_from) = query.date_from {
        where_clause_parts.push(format!(
            "\"transaction\".date >= ?{}",
            query_parameters.len() + 1
        ));
        query_parameters.push(Value::Text(date_from.to_string()));
    }

    if let Some(date_to) = query.date_to {
        where_clause_parts.push(format!(
            "\"transaction\".date <= ?{}",
            query_parameters.len() + 1
        ));
        query_parameters.push(Value::Text(date_to.to_string()));
    }

    let mut query_string = format!(
        "SELECT {TRANSACTION_COLUMNS}, category.id, category.name, category.color \
        FROM \"transaction\" \
        INNER JOIN category ON category.id = \"transaction\".category_id \
        WHERE {} \
        ORDER BY {} {order}, \"transaction\".id {order}",
        where_clause_parts.join(" AND "),
        query.sort_by.column(),
        order = query.sort_order.keyword(),
    );

    if let Some(limit) = query.limit {
        query_string.push_str(&format!(" LIMIT {limit}"));
    }

    connection
        .prepare(&query_string)?
        .query_map(params_from_iter(query_parameters.iter()), map_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(|error| error.into()))
        .collect()
}

fn map_row(row: &Row) -> Result<TransactionWithCategory, rusqlite::Error> {
    let transaction = map_transaction_row(row, 0)?;
    let category = CategoryLabel {
        id: row.get(TRANSACTION_COLUMN_COUNT)?,
        name: row.get(TRANSACTION_COLUMN_COUNT + 1)?,
        color: row.get(TRANSACTION_COLUMN_COUNT + 2)?,
    };

    Ok(TransactionWithCategory {
        transaction,
        category,
    })
}
