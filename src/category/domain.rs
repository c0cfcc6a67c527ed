//! Core category domain types.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    ToSql,
    types::{FromSql, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::Serialize;

use crate::{
    Error,
    database_id::CategoryId,
    text::{Description, validate_name},
    user::UserID,
};

/// A validated, non-empty category name.
///
/// Names are not unique: a user may have several categories with the same name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a category name.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::EmptyCategoryName] if `name` is
    /// blank, or [Error::TooLong] if it is longer than 255 characters.
    pub fn new(name: &str) -> Result<Self, Error> {
        validate_name(name, "name", Error::EmptyCategoryName).map(Self)
    }

    /// Create a category name without validation.
    ///
    /// The caller should ensure that the string is not empty.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_owned())
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for CategoryName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CategoryName::new(s)
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl ToSql for CategoryName {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        self.0.to_sql()
    }
}

impl FromSql for CategoryName {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        String::column_result(value).map(Self)
    }
}

/// The display color of a category, e.g. "#10B981".
///
/// Expected to be a hex color code, but only checked for being non-empty.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Hash)]
#[serde(transparent)]
pub struct CategoryColor(String);

impl CategoryColor {
    /// Create a category color.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::EmptyCategoryColor] if `color` is blank.
    pub fn new(color: &str) -> Result<Self, Error> {
        let color = color.trim();

        if color.is_empty() {
            Err(Error::EmptyCategoryColor)
        } else {
            Ok(Self(color.to_owned()))
        }
    }

    /// Create a category color without validation.
    pub fn new_unchecked(color: &str) -> Self {
        Self(color.to_owned())
    }
}

impl AsRef<str> for CategoryColor {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl ToSql for CategoryColor {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        self.0.to_sql()
    }
}

impl FromSql for CategoryColor {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        String::column_result(value).map(Self)
    }
}

/// A user-defined label for grouping transactions, e.g. 'Groceries', 'Salary'.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Hash)]
pub struct Category {
    /// The ID of the category.
    pub id: CategoryId,
    /// The user that owns the category.
    pub user_id: UserID,
    /// The name shown to the user.
    pub name: CategoryName,
    /// The color used to display the category.
    pub color: CategoryColor,
    /// An optional longer description.
    pub description: Option<Description>,
}

impl Category {
    /// Create a new category.
    ///
    /// Shortcut for [CategoryBuilder] for discoverability.
    pub fn build(name: CategoryName, color: CategoryColor) -> CategoryBuilder {
        CategoryBuilder {
            name,
            color,
            description: None,
        }
    }
}

/// The fields of a category that a user can set.
///
/// Used for both creating and updating categories.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryBuilder {
    /// The name of the category.
    pub name: CategoryName,
    /// The display color of the category.
    pub color: CategoryColor,
    /// An optional description of the category.
    pub description: Option<Description>,
}

impl CategoryBuilder {
    /// Set the description for the category.
    pub fn description(mut self, description: Option<Description>) -> Self {
        self.description = description;
        self
    }
}
