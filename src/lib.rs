//! Tallybook is a personal finance tracker.
//!
//! Users record income and expense transactions, group them into their own
//! categories, and get a dashboard summary of where their money goes.
//!
//! This library provides the domain models, the SQLite persistence layer and
//! the dashboard aggregation, plus a small JSON API for serving the dashboard.

#![warn(missing_docs)]

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rust_decimal::Decimal;
use serde_json::json;

mod app_state;
mod category;
mod dashboard;
mod database_id;
mod db;
mod endpoints;
mod logging;
mod money;
mod routing;
mod store;
mod text;
mod timezone;
mod transaction;
mod user;

pub use app_state::AppState;
pub use category::{
    Category, CategoryBuilder, CategoryColor, CategoryName, create_category, delete_category,
    get_categories, get_category, update_category,
};
pub use dashboard::{
    BreakdownKey, CategoryBreakdownEntry, DashboardState, DashboardSummary, MONTHS_IN_SUMMARY,
    MonthlyPoint, RECENT_TRANSACTIONS_LIMIT, SummaryAggregator, get_dashboard_summary,
};
pub use database_id::{CategoryId, DatabaseId, TransactionId};
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use money::Amount;
pub use routing::build_router;
pub use store::{SQLiteTransactionStore, TransactionStore};
pub use text::Description;
pub use timezone::{get_local_now, get_local_offset};
pub use transaction::{
    CategoryLabel, SortField, SortOrder, Transaction, TransactionBuilder, TransactionName,
    TransactionQuery, TransactionType, TransactionWithCategory, count_transactions,
    create_transaction, delete_transaction, get_transaction, query_transactions,
    update_transaction,
};
pub use user::{User, UserID, create_user, get_user};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The amount was zero, negative or larger than the largest amount that can be stored.
    #[error("{0} is not a valid amount, amounts must be between 0.01 and 999999999.99")]
    InvalidAmount(Decimal),

    /// A string that is not "income" or "expense" was used as a transaction type.
    #[error("\"{0}\" is not a valid transaction type, expected \"income\" or \"expense\"")]
    InvalidTransactionType(String),

    /// An empty string was used to create a category name.
    #[error("Category name cannot be empty")]
    EmptyCategoryName,

    /// An empty string was used to create a category color.
    #[error("Category color cannot be empty")]
    EmptyCategoryColor,

    /// An empty string was used to create a transaction name.
    #[error("Transaction name cannot be empty")]
    EmptyTransactionName,

    /// A text field was longer than allowed.
    #[error("{field} cannot be longer than {max} characters")]
    TooLong {
        /// The name of the offending field.
        field: &'static str,
        /// The maximum number of characters allowed.
        max: usize,
    },

    /// The category ID used to create or update a transaction did not refer to
    /// a category owned by the same user.
    #[error("the category ID {0} does not refer to a valid category")]
    InvalidCategory(CategoryId),

    /// The requested resource was not found.
    ///
    /// Resources owned by another user are reported as not found.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// Tried to update a transaction that does not exist
    #[error("tried to update a transaction that is not in the database")]
    UpdateMissingTransaction,

    /// Tried to delete a transaction that does not exist
    #[error("tried to delete a transaction that is not in the database")]
    DeleteMissingTransaction,

    /// Tried to update a category that does not exist
    #[error("tried to update a category that is not in the database")]
    UpdateMissingCategory,

    /// Tried to delete a category that does not exist
    #[error("tried to delete a category that is not in the database")]
    DeleteMissingCategory,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidAmount(_)
            | Error::InvalidTransactionType(_)
            | Error::EmptyCategoryName
            | Error::EmptyCategoryColor
            | Error::EmptyTransactionName
            | Error::TooLong { .. }
            | Error::InvalidCategory(_) => StatusCode::BAD_REQUEST,
            Error::NotFound
            | Error::UpdateMissingTransaction
            | Error::DeleteMissingTransaction
            | Error::UpdateMissingCategory
            | Error::DeleteMissingCategory => StatusCode::NOT_FOUND,
            Error::SqlError(_) | Error::InvalidTimezoneError(_) | Error::DatabaseLockError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = match self {
            Error::InvalidTimezoneError(timezone) => format!(
                "Could not get local timezone \"{timezone}\". Check your server settings and \
                ensure the timezone has been set to valid, canonical timezone string"
            ),
            // Any other server errors are not intended to be shown to the client.
            error if status.is_server_error() => {
                tracing::error!("An unexpected error occurred: {}", error);
                "An unexpected error occurred, check the server logs for more details.".to_owned()
            }
            error => error.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
