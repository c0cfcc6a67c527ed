//! The read-only transaction queries that the dashboard is computed from.

use rusqlite::{Connection, params_from_iter, types::Value};
use rust_decimal::Decimal;
use time::Date;

use crate::{
    Error,
    category::{Category, map_category_row},
    money::decimal_from_cents,
    transaction::{
        SortField, SortOrder, TRANSACTION_COLUMN_COUNT, TRANSACTION_COLUMNS, Transaction,
        TransactionQuery, TransactionType, TransactionWithCategory, map_transaction_row,
        query_transactions,
    },
    user::UserID,
};

/// Provides filtered sums and listings over a single user's transactions.
pub trait TransactionStore {
    /// Sum the amounts of the transactions of `user_id` with type `transaction_type`.
    ///
    /// `date_from` and `date_to` are inclusive bounds on the transaction date;
    /// `None` leaves that side of the range open. Returns zero if no
    /// transactions match.
    fn sum_amount(
        &self,
        user_id: UserID,
        transaction_type: TransactionType,
        date_from: Option<Date>,
        date_to: Option<Date>,
    ) -> Result<Decimal, Error>;

    /// Get up to `limit` transactions of `user_id` ordered by date in the order
    /// `sort_order`, together with their categories.
    ///
    /// Transactions on the same date are ordered by creation in the same direction.
    fn list_transactions(
        &self,
        user_id: UserID,
        sort_order: SortOrder,
        limit: u64,
    ) -> Result<Vec<TransactionWithCategory>, Error>;

    /// Get every transaction of `user_id` paired with its full category.
    fn list_all_transactions_with_category(
        &self,
        user_id: UserID,
    ) -> Result<Vec<(Transaction, Category)>, Error>;
}

/// Reads transactions from a SQLite database.
///
/// The store borrows the connection, so callers that share a connection
/// behind a mutex should hold the lock for as long as the store is in use.
#[derive(Debug, Clone, Copy)]
pub struct SQLiteTransactionStore<'conn> {
    connection: &'conn Connection,
}

impl<'conn> SQLiteTransactionStore<'conn> {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: &'conn Connection) -> Self {
        Self { connection }
    }
}

impl TransactionStore for SQLiteTransactionStore<'_> {
    fn sum_amount(
        &self,
        user_id: UserID,
        transaction_type: TransactionType,
        date_from: Option<Date>,
        date_to: Option<Date>,
    ) -> Result<Decimal, Error> {
        let mut query_string = String::from(
            "SELECT COALESCE(SUM(amount), 0) FROM \"transaction\" WHERE user_id = ?1 AND type = ?2",
        );
        let mut query_parameters = vec![
            Value::Integer(user_id.as_i64()),
            Value::Text(transaction_type.as_str().to_owned()),
        ];

        if let Some(date_from) = date_from {
            query_string.push_str(&format!(" AND date >= ?{}", query_parameters.len() + 1));
            query_parameters.push(Value::Text(date_from.to_string()));
        }

        if let Some(date_to) = date_to {
            query_string.push_str(&format!(" AND date <= ?{}", query_parameters.len() + 1));
            query_parameters.push(Value::Text(date_to.to_string()));
        }

        let total_cents: i64 = self.connection.query_row(
            &query_string,
            params_from_iter(query_parameters.iter()),
            |row| row.get(0),
        )?;

        Ok(decimal_from_cents(total_cents))
    }

    fn list_transactions(
        &self,
        user_id: UserID,
        sort_order: SortOrder,
        limit: u64,
    ) -> Result<Vec<TransactionWithCategory>, Error> {
        let query = TransactionQuery {
            sort_by: SortField::Date,
            sort_order,
            limit: Some(limit),
            ..Default::default()
        };

        query_transactions(user_id, &query, self.connection)
    }

    fn list_all_transactions_with_category(
        &self,
        user_id: UserID,
    ) -> Result<Vec<(Transaction, Category)>, Error> {
        self.connection
            .prepare(&format!(
                "SELECT {TRANSACTION_COLUMNS}, category.id, category.user_id, category.name, \
                category.color, category.description \
                FROM \"transaction\" \
                INNER JOIN category ON category.id = \"transaction\".category_id \
                WHERE \"transaction\".user_id = ?1 \
                ORDER BY \"transaction\".id ASC"
            ))?
            .query_map([user_id.as_i64()], |row| {
                let transaction = map_transaction_row(row, 0)?;
                let category = map_category_row(row, TRANSACTION_COLUMN_COUNT)?;

                Ok((transaction, category))
            })?
            .map(|maybe_pair| maybe_pair.map_err(|error| error.into()))
            .collect()
    }
}
