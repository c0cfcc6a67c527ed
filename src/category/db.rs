//! Database operations for categories.
//!
//! Every query is scoped to the owning user. A category owned by someone else
//! is indistinguishable from one that does not exist.

use rusqlite::{Connection, Row};

use crate::{
    Error,
    category::{Category, CategoryBuilder},
    database_id::CategoryId,
    user::UserID,
};

/// Create a category for `user_id` and return it with its generated ID.
pub fn create_category(
    user_id: UserID,
    builder: CategoryBuilder,
    connection: &Connection,
) -> Result<Category, Error> {
    connection.execute(
        "INSERT INTO category (user_id, name, color, description) VALUES (?1, ?2, ?3, ?4);",
        (
            user_id.as_i64(),
            &builder.name,
            &builder.color,
            &builder.description,
        ),
    )?;

    let id = connection.last_insert_rowid();

    Ok(Category {
        id,
        user_id,
        name: builder.name,
        color: builder.color,
        description: builder.description,
    })
}

/// Retrieve a single category by ID.
///
/// # Errors
/// Returns [Error::NotFound] if the category does not exist or belongs to another user.
pub fn get_category(
    category_id: CategoryId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Category, Error> {
    connection
        .prepare(
            "SELECT id, user_id, name, color, description FROM category
             WHERE id = :id AND user_id = :user_id;",
        )?
        .query_row(
            &[(":id", &category_id), (":user_id", &user_id.as_i64())],
            |row| map_category_row(row, 0),
        )
        .map_err(|error| error.into())
}

/// Retrieve all of a user's categories, most recently created first.
pub fn get_categories(user_id: UserID, connection: &Connection) -> Result<Vec<Category>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, name, color, description FROM category
             WHERE user_id = :user_id ORDER BY id DESC;",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], |row| {
            map_category_row(row, 0)
        })?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// Replace the user-editable fields of a category.
///
/// # Errors
/// Returns [Error::UpdateMissingCategory] if the category does not exist or belongs to another user.
pub fn update_category(
    category_id: CategoryId,
    user_id: UserID,
    builder: CategoryBuilder,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE category SET name = ?1, color = ?2, description = ?3
         WHERE id = ?4 AND user_id = ?5",
        (
            &builder.name,
            &builder.color,
            &builder.description,
            category_id,
            user_id.as_i64(),
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingCategory);
    }

    Ok(())
}

/// Delete a category and, through the foreign key cascade, all of its transactions.
///
/// # Errors
/// Returns [Error::DeleteMissingCategory] if the category does not exist or belongs to another user.
pub fn delete_category(
    category_id: CategoryId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM category WHERE id = ?1 AND user_id = ?2",
        (category_id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingCategory);
    }

    tracing::debug!("deleted category {category_id} for user {user_id}");

    Ok(())
}

/// Initialize the category table and indexes.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            color TEXT NOT NULL,
            description TEXT,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_category_user ON category(user_id);",
    )?;

    Ok(())
}

/// Map the five category columns starting at `offset` to a [Category].
///
/// The columns must be in the order `id, user_id, name, color, description`.
pub(crate) fn map_category_row(row: &Row, offset: usize) -> Result<Category, rusqlite::Error> {
    Ok(Category {
        id: row.get(offset)?,
        user_id: UserID::new(row.get(offset + 1)?),
        name: row.get(offset + 2)?,
        color: row.get(offset + 3)?,
        description: row.get(offset + 4)?,
    })
}
