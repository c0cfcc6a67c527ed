//! Validation shared by the free-text fields of categories and transactions.

use std::fmt::Display;

use rusqlite::{
    ToSql,
    types::{FromSql, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::Serialize;

use crate::Error;

/// The maximum number of characters in a category or transaction name.
pub const MAX_NAME_LENGTH: usize = 255;

/// The maximum number of characters in a description.
pub const MAX_DESCRIPTION_LENGTH: usize = 500;

/// Trim `text` and check that it is non-empty and at most [MAX_NAME_LENGTH] characters.
///
/// `empty_error` is returned when the trimmed text is empty.
pub(crate) fn validate_name(
    text: &str,
    field: &'static str,
    empty_error: Error,
) -> Result<String, Error> {
    let text = text.trim();

    if text.is_empty() {
        return Err(empty_error);
    }

    check_length(text, field, MAX_NAME_LENGTH)?;

    Ok(text.to_owned())
}

fn check_length(text: &str, field: &'static str, max: usize) -> Result<(), Error> {
    if text.chars().count() > max {
        Err(Error::TooLong { field, max })
    } else {
        Ok(())
    }
}

/// An optional, free-form description of a category or transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Hash)]
#[serde(transparent)]
pub struct Description(String);

impl Description {
    /// Create a description from user input.
    ///
    /// Blank input means "no description" and gives `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns [Error::TooLong] if the trimmed text is longer than
    /// [MAX_DESCRIPTION_LENGTH] characters.
    pub fn new(text: &str) -> Result<Option<Self>, Error> {
        let text = text.trim();

        if text.is_empty() {
            return Ok(None);
        }

        check_length(text, "description", MAX_DESCRIPTION_LENGTH)?;

        Ok(Some(Self(text.to_owned())))
    }

    /// Create a description without validation.
    pub fn new_unchecked(text: &str) -> Self {
        Self(text.to_owned())
    }
}

impl AsRef<str> for Description {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for Description {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl ToSql for Description {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        self.0.to_sql()
    }
}

impl FromSql for Description {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        String::column_result(value).map(Self)
    }
}
