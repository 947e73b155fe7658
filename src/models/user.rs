use super::normalize::{normalize_email, normalize_lower};
use super::{base_columns, naming::pascal_to_snake_case};
use crate::core::{Column, DataType, DbError, EntityDescriptor, Result, Value};
use crate::repository::{FilterableRead, MutableRecord, Record};
use tracing::debug;

pub const TYPE_NAME: &str = "User";

const INVALID_CREDENTIALS: &str = "Invalid username or password";

/// Dashboard account. `password` holds a bcrypt hash.
pub fn descriptor() -> EntityDescriptor {
    let mut columns = base_columns();
    columns.extend([
        Column::new("username", DataType::Text),
        Column::new("email", DataType::Text),
        Column::new("password", DataType::Binary).not_null(),
        Column::new("active", DataType::Boolean),
    ]);
    EntityDescriptor::new(pascal_to_snake_case(TYPE_NAME), columns)
}

/// Hashes a password using bcrypt
///
/// Uses bcrypt with default cost factor (12).
pub fn hash_password(password: &str) -> Result<Vec<u8>> {
    hash_password_with_cost(password, bcrypt::DEFAULT_COST)
}

pub fn hash_password_with_cost(password: &str, cost: u32) -> Result<Vec<u8>> {
    bcrypt::hash(password, cost)
        .map(String::into_bytes)
        .map_err(|e| DbError::ExecutionError(format!("Password hashing failed: {}", e)))
}

/// Verifies password against a stored bcrypt hash
pub fn verify_password(password: &str, hash: &[u8]) -> bool {
    std::str::from_utf8(hash)
        .map(|hash| bcrypt::verify(password, hash).unwrap_or(false))
        .unwrap_or(false)
}

/// Register an active user with a normalised username and email.
///
/// `password_hash` is the output of [`hash_password`].
pub async fn register<R>(users: &R, username: &str, email: &str, password_hash: Vec<u8>) -> Result<Record>
where
    R: FilterableRead + MutableRecord + ?Sized,
{
    let username = normalize_lower(username.trim());
    let email = normalize_email(email)?;
    if username.is_empty() {
        return Err(DbError::InvalidRequest("A username is required".into()));
    }
    users.unique_verify("username", &Value::from(username.as_str())).await?;
    users.unique_verify("email", &Value::from(email.as_str())).await?;

    users
        .create(vec![
            ("username".to_string(), Value::from(username)),
            ("email".to_string(), Value::from(email)),
            ("password".to_string(), Value::Binary(password_hash)),
            ("active".to_string(), Value::Boolean(true)),
        ])
        .await
}

/// Look a user up by `attribute == value` and check its password.
///
/// Unknown user → `NotFound`; inactive user or wrong password →
/// `Unauthorized`. Unknown user and wrong password report the same message.
pub async fn login<R>(users: &R, attribute: &str, value: &Value, password: &str) -> Result<Record>
where
    R: FilterableRead + ?Sized,
{
    users.descriptor().column(attribute)?;

    let user = users
        .get(attribute, value)
        .await?
        .ok_or_else(|| DbError::NotFound(INVALID_CREDENTIALS.into()))?;

    if user.boolean("active") == Some(false) {
        return Err(DbError::Unauthorized("Inactive user".into()));
    }

    let hash = user.bytes("password").unwrap_or_default();
    if !verify_password(password, hash) {
        debug!(%attribute, "password check failed");
        return Err(DbError::Unauthorized(INVALID_CREDENTIALS.into()));
    }

    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor() {
        let descriptor = descriptor();
        assert_eq!(descriptor.name(), "user");
        assert!(descriptor.contains("uuid"));
        assert!(!descriptor.get_column("password").unwrap().searchable);
        assert!(descriptor.get_column("email").unwrap().searchable);
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password_with_cost("s3cret", 4).unwrap();
        assert!(verify_password("s3cret", &hash));
        assert!(!verify_password("wrong", &hash));
        assert!(!verify_password("s3cret", b"not a hash"));
    }
}
