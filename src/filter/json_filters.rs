use super::{FilterConfig, Operator};
use crate::core::{DbError, EntityDescriptor, Result};
use crate::expression::pattern::contains_pattern;
use crate::expression::{CompareOp, Predicate};
use serde_json::{Map, Value as JsonValue};

/// Keys of `filters` that are not attributes of `descriptor`, all of them.
pub fn unknown_keys(descriptor: &EntityDescriptor, filters: &Map<String, JsonValue>) -> Vec<String> {
    filters
        .keys()
        .filter(|key| !descriptor.contains(key))
        .cloned()
        .collect()
}

/// One predicate per entry; callers AND them together.
///
/// Only `=` and `~` apply here. Keys must already be known attributes.
pub fn build(
    descriptor: &EntityDescriptor,
    operator: Operator,
    filters: &Map<String, JsonValue>,
    config: &FilterConfig,
) -> Result<Vec<Predicate>> {
    if !matches!(operator, Operator::Eq | Operator::Contains) {
        return Err(DbError::UnsupportedOperator(format!(
            "Operator '{}' is not supported with jsonFilters",
            operator
        )));
    }

    let mut predicates = Vec::with_capacity(filters.len());
    for (field, json) in filters {
        let column = descriptor.column(field)?;

        let predicate = match operator {
            Operator::Eq => {
                let value = column.data_type.from_json(json).ok_or_else(|| {
                    DbError::InvalidValueFormat(format!(
                        "{} is not a valid {} for attribute '{}'",
                        json, column.data_type, field
                    ))
                })?;
                if value.is_null() {
                    Predicate::is_null(field.clone())
                } else {
                    Predicate::compare(field.clone(), CompareOp::Eq, value)
                }
            }
            _ => {
                if !column.searchable {
                    return Err(DbError::TypeMismatch(format!(
                        "Pattern match cannot be applied to {} attribute '{}'",
                        column.data_type, field
                    )));
                }
                let needle = match json {
                    JsonValue::String(s) => s.clone(),
                    other => other.to_string(),
                };
                Predicate::ilike(field.clone(), contains_pattern(&needle, config.escape_wildcards))
            }
        };
        predicates.push(predicate);
    }

    Ok(predicates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Column, DataType, Value};
    use serde_json::json;

    fn descriptor() -> EntityDescriptor {
        EntityDescriptor::new(
            "user",
            vec![
                Column::new("username", DataType::Text),
                Column::new("email", DataType::Text),
                Column::new("active", DataType::Boolean),
            ],
        )
    }

    fn object(value: JsonValue) -> Map<String, JsonValue> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_unknown_keys_reported_together() {
        let filters = object(json!({"ghost": 1, "username": "a", "phantom": 2}));
        let mut unknown = unknown_keys(&descriptor(), &filters);
        unknown.sort();
        assert_eq!(unknown, vec!["ghost", "phantom"]);
    }

    #[test]
    fn test_equality_entries() {
        let filters = object(json!({"active": true, "email": null}));
        let predicates = build(&descriptor(), Operator::Eq, &filters, &FilterConfig::default()).unwrap();
        assert!(predicates.contains(&Predicate::compare("active", CompareOp::Eq, Value::Boolean(true))));
        assert!(predicates.contains(&Predicate::is_null("email")));
    }

    #[test]
    fn test_pattern_entries() {
        let filters = object(json!({"username": "ann", "email": "example"}));
        let predicates =
            build(&descriptor(), Operator::Contains, &filters, &FilterConfig::default()).unwrap();
        assert!(predicates.contains(&Predicate::ilike("username", "%ann%")));
        assert_eq!(predicates.len(), 2);
    }

    #[test]
    fn test_pattern_on_boolean_is_type_mismatch() {
        let filters = object(json!({"active": "t"}));
        assert!(matches!(
            build(&descriptor(), Operator::Contains, &filters, &FilterConfig::default()),
            Err(DbError::TypeMismatch(_))
        ));
    }

    #[test]
    fn test_other_operators_unsupported() {
        let filters = object(json!({"username": "a"}));
        for op in [Operator::NotEq, Operator::Lt, Operator::Range] {
            assert!(matches!(
                build(&descriptor(), op, &filters, &FilterConfig::default()),
                Err(DbError::UnsupportedOperator(_))
            ));
        }
    }
}
