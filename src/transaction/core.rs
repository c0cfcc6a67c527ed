//! Defines the core data models and database queries for transactions.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, Row, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize, Serializer};
use time::Date;

use crate::{
    Error,
    category::{Category, CategoryColor, CategoryName},
    database_id::{CategoryId, TransactionId},
    money::Amount,
    text::{Description, validate_name},
    user::UserID,
};

// ============================================================================
// MODELS
// ============================================================================

/// Whether money was earned or spent.
///
/// Income and expense are told apart by this field only, amounts are always positive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money that came in, e.g. a salary payment.
    Income,
    /// Money that went out, e.g. groceries.
    Expense,
}

impl TransactionType {
    /// The name of the type as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            other => Err(Error::InvalidTransactionType(other.to_owned())),
        }
    }
}

impl ToSql for TransactionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: Error| FromSqlError::Other(Box::new(error)))
    }
}

/// A validated, non-empty transaction name, e.g. "Grocery Shopping".
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Hash)]
#[serde(transparent)]
pub struct TransactionName(String);

impl TransactionName {
    /// Create a transaction name.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::EmptyTransactionName] if `name` is
    /// blank, or [Error::TooLong] if it is longer than 255 characters.
    pub fn new(name: &str) -> Result<Self, Error> {
        validate_name(name, "name", Error::EmptyTransactionName).map(Self)
    }

    /// Create a transaction name without validation.
    ///
    /// The caller should ensure that the string is not empty.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_owned())
    }
}

impl AsRef<str> for TransactionName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for TransactionName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl ToSql for TransactionName {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        self.0.to_sql()
    }
}

impl FromSql for TransactionName {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        String::column_result(value).map(Self)
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The user that owns the transaction.
    pub user_id: UserID,
    /// The ID of the category the transaction belongs to.
    pub category_id: CategoryId,
    /// When the transaction happened.
    #[serde(serialize_with = "serialize_date")]
    pub date: Date,
    /// A short name for the transaction.
    pub name: TransactionName,
    /// An optional, longer description of what the transaction was for.
    pub description: Option<Description>,
    /// The amount of money spent or earned in this transaction.
    pub amount: Amount,
    /// Whether the amount was earned or spent.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
}

/// Serialize a date as "YYYY-MM-DD".
fn serialize_date<S: Serializer>(date: &Date, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(date)
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(
        amount: Amount,
        transaction_type: TransactionType,
        date: Date,
        name: TransactionName,
        category_id: CategoryId,
    ) -> TransactionBuilder {
        TransactionBuilder {
            amount,
            transaction_type,
            date,
            name,
            description: None,
            category_id,
        }
    }
}

/// A builder for creating and updating [Transaction] instances.
///
/// # Examples
///
/// ```ignore
/// use rust_decimal::Decimal;
/// use time::macros::date;
///
/// let builder = Transaction::build(
///         Amount::new(Decimal::new(12550, 2))?,
///         TransactionType::Expense,
///         date!(2025-01-15),
///         TransactionName::new("Grocery Shopping")?,
///         groceries.id,
///     )
///     .description(Description::new("Weekly groceries")?);
/// let transaction = create_transaction(user_id, builder, &connection)?;
/// ```
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    /// The monetary amount of the transaction, always positive.
    pub amount: Amount,

    /// Whether the amount was earned or spent.
    pub transaction_type: TransactionType,

    /// The date when the transaction occurred.
    ///
    /// Future dates are allowed, e.g. for scheduled payments.
    pub date: Date,

    /// A short, human-readable name for the transaction.
    pub name: TransactionName,

    /// An optional longer description.
    pub description: Option<Description>,

    /// The category of the transaction, e.g. "Groceries", "Transport", "Rent".
    ///
    /// Must refer to a category owned by the same user as the transaction.
    pub category_id: CategoryId,
}

impl TransactionBuilder {
    /// Set the description for the transaction.
    pub fn description(mut self, description: Option<Description>) -> Self {
        self.description = description;
        self
    }
}

/// The category fields shown alongside a transaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryLabel {
    /// The ID of the category.
    pub id: CategoryId,
    /// The name of the category.
    pub name: CategoryName,
    /// The display color of the category.
    pub color: CategoryColor,
}

impl From<&Category> for CategoryLabel {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id,
            name: category.name.clone(),
            color: category.color.clone(),
        }
    }
}

/// A transaction annotated with the name and color of its category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionWithCategory {
    /// The transaction.
    #[serde(flatten)]
    pub transaction: Transaction,
    /// The transaction's category.
    pub category: CategoryLabel,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// The transaction columns in the order expected by [map_transaction_row].
pub(crate) const TRANSACTION_COLUMNS: &str = "\"transaction\".id, \"transaction\".user_id, \
    \"transaction\".category_id, \"transaction\".date, \"transaction\".name, \
    \"transaction\".description, \"transaction\".amount, \"transaction\".type";

/// The number of columns selected by [TRANSACTION_COLUMNS].
pub(crate) const TRANSACTION_COLUMN_COUNT: usize = 8;

/// Check that `category_id` refers to a category owned by `user_id`.
fn ensure_category_is_owned(
    category_id: CategoryId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let is_owned: bool = connection.query_row(
        "SELECT EXISTS(SELECT 1 FROM category WHERE id = ?1 AND user_id = ?2)",
        (category_id, user_id.as_i64()),
        |row| row.get(0),
    )?;

    if is_owned {
        Ok(())
    } else {
        Err(Error::InvalidCategory(category_id))
    }
}

/// Create a new transaction for `user_id` in the database from a builder.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidCategory] if the category does not exist or belongs to another user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    user_id: UserID,
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    ensure_category_is_owned(builder.category_id, user_id, connection)?;

    connection.execute(
        "INSERT INTO \"transaction\" (user_id, category_id, date, name, description, amount, type)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        (
            user_id.as_i64(),
            builder.category_id,
            builder.date,
            &builder.name,
            &builder.description,
            builder.amount,
            builder.transaction_type,
        ),
    )?;

    let id = connection.last_insert_rowid();

    Ok(Transaction {
        id,
        user_id,
        category_id: builder.category_id,
        date: builder.date,
        name: builder.name,
        description: builder.description,
        amount: builder.amount,
        transaction_type: builder.transaction_type,
    })
}

/// Retrieve a transaction owned by `user_id` from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a transaction owned by `user_id`,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(
    id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" WHERE id = :id AND user_id = :user_id"
        ))?
        .query_row(&[(":id", &id), (":user_id", &user_id.as_i64())], |row| {
            map_transaction_row(row, 0)
        })?;

    Ok(transaction)
}

/// Replace the user-editable fields of a transaction.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidCategory] if the new category does not exist or belongs to another user,
/// - [Error::UpdateMissingTransaction] if `id` does not refer to a transaction owned by `user_id`,
/// - or [Error::SqlError] there is some other SQL error.
pub fn update_transaction(
    id: TransactionId,
    user_id: UserID,
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<(), Error> {
    ensure_category_is_owned(builder.category_id, user_id, connection)?;

    let rows_affected = connection.execute(
        "UPDATE \"transaction\"
         SET category_id = ?1, date = ?2, name = ?3, description = ?4, amount = ?5, type = ?6
         WHERE id = ?7 AND user_id = ?8",
        (
            builder.category_id,
            builder.date,
            &builder.name,
            &builder.description,
            builder.amount,
            builder.transaction_type,
            id,
            user_id.as_i64(),
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingTransaction);
    }

    Ok(())
}

/// Delete a transaction owned by `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingTransaction] if `id` does not refer to a transaction owned by `user_id`,
/// - or [Error::SqlError] there is some other SQL error.
pub fn delete_transaction(
    id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = ?1 AND user_id = ?2",
        (id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingTransaction);
    }

    Ok(())
}

/// Get the number of transactions owned by `user_id`.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn count_transactions(user_id: UserID, connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row(
            "SELECT COUNT(id) FROM \"transaction\" WHERE user_id = ?1;",
            [user_id.as_i64()],
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

/// Create the transaction table in the database.
///
/// Amounts are stored in cents.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            category_id INTEGER NOT NULL,
            date TEXT NOT NULL,
            name TEXT NOT NULL,
            description TEXT,
            amount INTEGER NOT NULL CHECK (amount > 0),
            type TEXT NOT NULL CHECK (type IN ('income', 'expense')),
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
            FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_transaction_category ON \"transaction\"(category_id);
        CREATE INDEX IF NOT EXISTS idx_transaction_user_date ON \"transaction\"(user_id, date);
        CREATE INDEX IF NOT EXISTS idx_transaction_user_type ON \"transaction\"(user_id, type);",
    )?;

    Ok(())
}

/// Map the transaction columns starting at `offset` to a [Transaction].
///
/// The columns must be in the order given by [TRANSACTION_COLUMNS].
pub fn map_transaction_row(row: &Row, offset: usize) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(offset)?,
        user_id: UserID::new(row.get(offset + 1)?),
        category_id: row.get(offset + 2)?,
        date: row.get(offset + 3)?,
        name: row.get(offset + 4)?,
        description: row.get(offset + 5)?,
        amount: row.get(offset + 6)?,
        transaction_type: row.get(offset + 7)?,
    })
}

// ============================================================================
// TESTS
// ============================================================================


#[cfg(test)]
mod database_tests {
    use rusqlite::Connection;
    use rust_decimal::Decimal;
    use time::macros::date;

    use crate::{
        Error,
        category::{Category, CategoryColor, CategoryName, create_category, delete_category},
        db::initialize,
        money::Amount,
        text::Description,
        transaction::{
            Transaction, TransactionBuilder, TransactionName, TransactionType,
            count_transactions, create_transaction, delete_transaction, get_transaction,
            update_transaction,
        },
        user::{UserID, create_user},
    };

    struct Fixture {
        conn: Connection,
        user_id: UserID,
        category_id: i64,
    }

    fn get_fixture() -> Fixture {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let user = create_user("Test User", "test@example.com", &conn).unwrap();
        let category = create_category(
            user.id,
            Category::build(
                CategoryName::new_unchecked("Groceries"),
                CategoryColor::new_unchecked("#F59E0B"),
            ),
            &conn,
        )
        .unwrap();

        Fixture {
            conn,
            user_id: user.id,
            category_id: category.id,
        }
    }

    fn expense(cents: i64, category_id: i64) -> TransactionBuilder {
        Transaction::build(
            Amount::from_cents_unchecked(cents),
            TransactionType::Expense,
            date!(2025 - 10 - 05),
            TransactionName::new_unchecked("Grocery Shopping"),
            category_id,
        )
    }

    #[test]
    fn create_succeeds() {
        let fixture = get_fixture();

        let result = create_transaction(
            fixture.user_id,
            expense(12550, fixture.category_id)
                .description(Description::new("Weekly groceries").unwrap()),
            &fixture.conn,
        );

        match result {
            Ok(transaction) => {
                assert_eq!(transaction.amount.as_decimal(), Decimal::new(12550, 2));
                assert_eq!(transaction.user_id, fixture.user_id);
                assert_eq!(transaction.transaction_type, TransactionType::Expense);
                assert_eq!(
                    transaction.description,
                    Some(Description::new_unchecked("Weekly groceries"))
                );
            }
            Err(error) => panic!("Unexpected error: {error}"),
        }
    }

    #[test]
    fn create_fails_on_invalid_category_id() {
        let fixture = get_fixture();
        let category_id = 42;

        let result = create_transaction(
            fixture.user_id,
            expense(100, category_id),
            &fixture.conn,
        );

        assert_eq!(result, Err(Error::InvalidCategory(category_id)));
    }

    #[test]
    fn create_fails_on_category_of_other_user() {
        let fixture = get_fixture();
        let other_user = create_user("Other", "other@example.com", &fixture.conn).unwrap();

        let result = create_transaction(
            other_user.id,
            expense(100, fixture.category_id),
            &fixture.conn,
        );

        assert_eq!(result, Err(Error::InvalidCategory(fixture.category_id)));
    }

    #[test]
    fn get_succeeds() {
        let fixture = get_fixture();
        let inserted =
            create_transaction(fixture.user_id, expense(100, fixture.category_id), &fixture.conn)
                .unwrap();

        let selected = get_transaction(inserted.id, fixture.user_id, &fixture.conn);

        assert_eq!(selected, Ok(inserted));
    }

    #[test]
    fn get_of_other_user_returns_not_found() {
        let fixture = get_fixture();
        let other_user = create_user("Other", "other@example.com", &fixture.conn).unwrap();
        let inserted =
            create_transaction(fixture.user_id, expense(100, fixture.category_id), &fixture.conn)
                .unwrap();

        let selected = get_transaction(inserted.id, other_user.id, &fixture.conn);

        assert_eq!(selected, Err(Error::NotFound));
    }

    #[test]
    fn update_succeeds() {
        let fixture = get_fixture();
        let inserted =
            create_transaction(fixture.user_id, expense(100, fixture.category_id), &fixture.conn)
                .unwrap();
        let mut changes = expense(4500, fixture.category_id);
        changes.transaction_type = TransactionType::Income;
        changes.name = TransactionName::new_unchecked("Refund");

        update_transaction(inserted.id, fixture.user_id, changes, &fixture.conn)
            .expect("Could not update transaction");

        let updated = get_transaction(inserted.id, fixture.user_id, &fixture.conn).unwrap();
        assert_eq!(updated.amount.cents(), 4500);
        assert_eq!(updated.transaction_type, TransactionType::Income);
        assert_eq!(updated.name, TransactionName::new_unchecked("Refund"));
    }

    #[test]
    fn update_of_missing_transaction_fails() {
        let fixture = get_fixture();

        let result = update_transaction(
            999,
            fixture.user_id,
            expense(100, fixture.category_id),
            &fixture.conn,
        );

        assert_eq!(result, Err(Error::UpdateMissingTransaction));
    }

    #[test]
    fn update_fails_on_category_of_other_user() {
        let fixture = get_fixture();
        let inserted =
            create_transaction(fixture.user_id, expense(100, fixture.category_id), &fixture.conn)
                .unwrap();
        let other_user = create_user("Other", "other@example.com", &fixture.conn).unwrap();
        let other_category = create_category(
            other_user.id,
            Category::build(
                CategoryName::new_unchecked("Theirs"),
                CategoryColor::new_unchecked("#000000"),
            ),
            &fixture.conn,
        )
        .unwrap();

        let result = update_transaction(
            inserted.id,
            fixture.user_id,
            expense(100, other_category.id),
            &fixture.conn,
        );

        assert_eq!(result, Err(Error::InvalidCategory(other_category.id)));
    }

    #[test]
    fn delete_succeeds() {
        let fixture = get_fixture();
        let inserted =
            create_transaction(fixture.user_id, expense(100, fixture.category_id), &fixture.conn)
                .unwrap();

        delete_transaction(inserted.id, fixture.user_id, &fixture.conn)
            .expect("Could not delete transaction");

        assert_eq!(
            get_transaction(inserted.id, fixture.user_id, &fixture.conn),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn delete_of_other_user_fails() {
        let fixture = get_fixture();
        let other_user = create_user("Other", "other@example.com", &fixture.conn).unwrap();
        let inserted =
            create_transaction(fixture.user_id, expense(100, fixture.category_id), &fixture.conn)
                .unwrap();

        let result = delete_transaction(inserted.id, other_user.id, &fixture.conn);

        assert_eq!(result, Err(Error::DeleteMissingTransaction));
    }

    #[test]
    fn deleting_category_deletes_its_transactions() {
        let fixture = get_fixture();
        for _ in 0..3 {
            create_transaction(fixture.user_id, expense(100, fixture.category_id), &fixture.conn)
                .unwrap();
        }

        delete_category(fixture.category_id, fixture.user_id, &fixture.conn).unwrap();

        assert_eq!(count_transactions(fixture.user_id, &fixture.conn), Ok(0));
    }

    #[test]
    fn get_count() {
        let fixture = get_fixture();
        let want_count = 20;
        for i in 1..=want_count {
            create_transaction(
                fixture.user_id,
                expense(i as i64, fixture.category_id),
                &fixture.conn,
            )
            .expect("Could not create transaction");
        }

        let got_count = count_transactions(fixture.user_id, &fixture.conn).expect("Could not get count");

        assert_eq!(want_count, got_count);
    }
}
