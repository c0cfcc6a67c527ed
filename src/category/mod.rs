//! Category management for grouping transactions.

mod db;
mod domain;

pub use db::{
    create_category, create_category_table, delete_category, get_categories, get_category,
    update_category,
};
pub(crate) use db::map_category_row;
pub use domain::{Category, CategoryBuilder, CategoryColor, CategoryName};
