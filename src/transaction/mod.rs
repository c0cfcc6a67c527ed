//! Transaction management.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and `TransactionBuilder` for creating transactions
//! - Database functions for storing, updating and deleting transactions
//! - Filtered listings of a user's transactions

mod core;
mod query;

pub use core::{
    CategoryLabel, Transaction, TransactionBuilder, TransactionName, TransactionType,
    TransactionWithCategory, count_transactions, create_transaction, create_transaction_table,
    delete_transaction, get_transaction, map_transaction_row, update_transaction,
};
pub(crate) use core::{TRANSACTION_COLUMN_COUNT, TRANSACTION_COLUMNS};
pub use query::{SortField, SortOrder, TransactionQuery, query_transactions};
