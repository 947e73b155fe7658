use super::{base_columns, naming::pascal_to_snake_case};
use crate::core::{Column, DataType, EntityDescriptor, Result, Value};
use crate::repository::{MutableRecord, Record};
use uuid::Uuid;

pub const TYPE_NAME: &str = "UserRole";

/// Link between a user and one of its roles.
pub fn descriptor() -> EntityDescriptor {
    let mut columns = base_columns();
    columns.extend([
        Column::new("user_uuid", DataType::Uuid).not_null(),
        Column::new("role_uuid", DataType::Uuid).not_null(),
    ]);
    EntityDescriptor::new(pascal_to_snake_case(TYPE_NAME), columns)
}

pub async fn assign<R>(links: &R, user: Uuid, role: Uuid) -> Result<Record>
where
    R: MutableRecord + ?Sized,
{
    links
        .create(vec![
            ("user_uuid".to_string(), Value::Uuid(user)),
            ("role_uuid".to_string(), Value::Uuid(role)),
        ])
        .await
}
