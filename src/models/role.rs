use super::{base_columns, naming::pascal_to_snake_case};
use crate::core::{Column, DataType, DbError, EntityDescriptor, Result, Value};
use crate::repository::{FilterableRead, MutableRecord, Record};

pub const TYPE_NAME: &str = "Role";

/// A named permission level.
pub fn descriptor() -> EntityDescriptor {
    let mut columns = base_columns();
    columns.extend([
        Column::new("name", DataType::Text).not_null().unique(),
        Column::new("access_level", DataType::Integer).not_null(),
        Column::new("description", DataType::Text),
    ]);
    EntityDescriptor::new(pascal_to_snake_case(TYPE_NAME), columns)
}

/// Create a role after checking its name is free.
pub async fn create<R>(
    roles: &R,
    name: &str,
    access_level: i64,
    description: Option<&str>,
) -> Result<Record>
where
    R: FilterableRead + MutableRecord + ?Sized,
{
    if name.trim().is_empty() {
        return Err(DbError::InvalidRequest("A role name is required".into()));
    }
    roles
        .unique_verify("name", &Value::from(name))
        .await
        .map_err(|err| match err {
            DbError::ConstraintViolation(_) => {
                DbError::ConstraintViolation(format!("'{}' is already registered", name))
            }
            other => other,
        })?;

    roles
        .create(vec![
            ("name".to_string(), Value::from(name)),
            ("access_level".to_string(), Value::Integer(access_level)),
            ("description".to_string(), Value::from(description)),
        ])
        .await
}
