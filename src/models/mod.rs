//! Entities of the admin dashboard.

pub mod naming;
pub mod normalize;
pub mod role;
pub mod user;
pub mod user_role;

use crate::core::{Column, DataType, Result};
use crate::storage::Catalog;

/// Identity and audit columns every entity starts with.
pub fn base_columns() -> Vec<Column> {
    vec![
        Column::new("uuid", DataType::Uuid).primary_key(),
        Column::new("created_at", DataType::Timestamp),
        Column::new("updated_at", DataType::Timestamp),
    ]
}

/// Catalog of every dashboard entity.
pub fn catalog() -> Result<Catalog> {
    Catalog::new()
        .with_entity(role::descriptor())?
        .with_entity(user::descriptor())?
        .with_entity(user_role::descriptor())
}
