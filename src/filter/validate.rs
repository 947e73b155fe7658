//! Request checks that run before any store access.

use super::json_filters::unknown_keys;
use super::{FilterConfig, FilterRequest, Operator};
use crate::core::{Column, DbError, EntityDescriptor, Result};
use crate::planner::Window;
use serde_json::{Map, Value as JsonValue};

/// A request that passed validation, borrowing from the request and schema.
#[derive(Debug)]
pub struct ValidatedRequest<'a> {
    /// Parsed only when something is filtered on
    pub operator: Option<Operator>,
    pub attribute: Option<(&'a Column, &'a str)>,
    pub json_filters: Option<&'a Map<String, JsonValue>>,
    pub window: Option<Window>,
    pub include: Option<&'a [String]>,
}

pub fn validate<'a>(
    descriptor: &'a EntityDescriptor,
    request: &'a FilterRequest,
    config: &FilterConfig,
) -> Result<ValidatedRequest<'a>> {
    let include = check_include(descriptor, request)?;
    let attribute = check_attribute(descriptor, request)?;
    let json_filters = check_json_filters(descriptor, request)?;
    let window = check_window(request, config)?;

    let operator = if request.has_filter() {
        Some(request.operator.parse::<Operator>()?)
    } else {
        None
    };

    Ok(ValidatedRequest {
        operator,
        attribute,
        json_filters,
        window,
        include,
    })
}

fn check_include<'a>(
    descriptor: &EntityDescriptor,
    request: &'a FilterRequest,
) -> Result<Option<&'a [String]>> {
    let Some(include) = &request.include else {
        return Ok(None);
    };

    if include.is_empty() {
        return Err(DbError::InvalidRequest(
            "'include' must name at least one attribute".into(),
        ));
    }
    if let Some(missing) = include.iter().find(|name| !descriptor.contains(name)) {
        return Err(DbError::unknown_attribute(descriptor.name(), missing.as_str()));
    }

    Ok(Some(include.as_slice()))
}

fn check_attribute<'a>(
    descriptor: &'a EntityDescriptor,
    request: &'a FilterRequest,
) -> Result<Option<(&'a Column, &'a str)>> {
    // an empty attribute name disables the attribute filter, value included
    if request.attribute.as_deref() == Some("") {
        return Ok(None);
    }

    match (request.attribute_name(), &request.value) {
        (None, None) => Ok(None),
        (Some(attribute), value) => {
            let column = descriptor.column(attribute)?;
            let value = value.as_deref().ok_or_else(|| {
                DbError::InvalidRequest(format!(
                    "'value' is required when filtering on '{}'",
                    attribute
                ))
            })?;
            Ok(Some((column, value)))
        }
        (None, Some(_)) => Err(DbError::InvalidRequest(
            "'attribute' is required when 'value' is given".into(),
        )),
    }
}

fn check_json_filters<'a>(
    descriptor: &EntityDescriptor,
    request: &'a FilterRequest,
) -> Result<Option<&'a Map<String, JsonValue>>> {
    let filters = match &request.json_filters {
        None | Some(JsonValue::Null) => return Ok(None),
        Some(JsonValue::Object(filters)) => filters,
        Some(other) => {
            return Err(DbError::InvalidRequest(format!(
                "'jsonFilters' must be an object, got {}",
                other
            )));
        }
    };

    let unknown = unknown_keys(descriptor, filters);
    if !unknown.is_empty() {
        return Err(DbError::UnknownAttribute {
            entity: descriptor.name().to_string(),
            attributes: unknown,
        });
    }

    Ok((!filters.is_empty()).then_some(filters))
}

fn check_window(request: &FilterRequest, config: &FilterConfig) -> Result<Option<Window>> {
    let (skip, limit) = match (request.skip, request.limit) {
        (None, None) => return Ok(None),
        (Some(skip), Some(limit)) => (skip, limit),
        _ => {
            return Err(DbError::InvalidRequest(
                "'skip' and 'limit' must be given together".into(),
            ));
        }
    };

    if skip < 0 {
        return Err(DbError::InvalidRequest(format!(
            "'skip' must be >= 0, got {}",
            skip
        )));
    }
    if limit <= 0 {
        return Err(DbError::InvalidRequest(format!(
            "'limit' must be > 0, got {}",
            limit
        )));
    }

    let (skip, limit) = (skip as u64, limit as u64);
    if let Some(max) = config.max_limit
        && limit > max
    {
        return Err(DbError::InvalidRequest(format!(
            "'limit' must not exceed {}, got {}",
            max, limit
        )));
    }

    Window::page(skip, limit)
        .map(Some)
        .ok_or_else(|| DbError::InvalidRequest("Page offset overflows".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DataType;
    use serde_json::json;

    fn role() -> EntityDescriptor {
        EntityDescriptor::new(
            "role",
            vec![
                Column::new("name", DataType::Text),
                Column::new("access_level", DataType::Integer),
            ],
        )
    }

    fn check(request: FilterRequest) -> Result<()> {
        let descriptor = role();
        validate(&descriptor, &request, &FilterConfig::default()).map(|_| ())
    }

    #[test]
    fn test_plain_request_is_valid() {
        let descriptor = role();
        let request = FilterRequest::all();
        let validated = validate(&descriptor, &request, &FilterConfig::default()).unwrap();
        assert!(validated.operator.is_none());
        assert!(validated.window.is_none());
    }

    #[test]
    fn test_empty_attribute_filters_nothing() {
        let descriptor = role();
        let request = FilterRequest::all().attribute("", "admin").operator("??");
        let validated = validate(&descriptor, &request, &FilterConfig::default()).unwrap();
        assert!(validated.attribute.is_none());
        assert!(validated.operator.is_none());
    }

    #[test]
    fn test_include_names_first_offender() {
        let err = check(FilterRequest::all().include(["name", "ghost", "phantom"])).unwrap_err();
        match err {
            DbError::UnknownAttribute { attributes, .. } => assert_eq!(attributes, vec!["ghost"]),
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(matches!(
            check(FilterRequest::all().include(Vec::<String>::new())),
            Err(DbError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_attribute_value_pairing() {
        assert!(matches!(
            check(FilterRequest::all().attribute("ghost", "x")),
            Err(DbError::UnknownAttribute { .. })
        ));

        let mut missing_value = FilterRequest::all();
        missing_value.attribute = Some("name".into());
        assert!(matches!(check(missing_value), Err(DbError::InvalidRequest(_))));

        let mut missing_attribute = FilterRequest::all();
        missing_attribute.value = Some("x".into());
        assert!(matches!(check(missing_attribute), Err(DbError::InvalidRequest(_))));
    }

    #[test]
    fn test_json_filters_shape() {
        assert!(matches!(
            check(FilterRequest::all().json_filters(json!("name=admin"))),
            Err(DbError::InvalidRequest(_))
        ));
        assert!(check(FilterRequest::all().json_filters(json!({}))).is_ok());

        let err = check(FilterRequest::all().json_filters(json!({"ghost": "x"}))).unwrap_err();
        assert_eq!(err.to_string(), "Unknown attribute(s) 'ghost' in entity 'role'");
    }

    #[test]
    fn test_window_bounds() {
        assert!(check(FilterRequest::all().page(0, 10)).is_ok());
        assert!(matches!(check(FilterRequest::all().page(-1, 10)), Err(DbError::InvalidRequest(_))));
        assert!(matches!(check(FilterRequest::all().page(0, 0)), Err(DbError::InvalidRequest(_))));

        let mut only_skip = FilterRequest::all();
        only_skip.skip = Some(1);
        assert!(matches!(check(only_skip), Err(DbError::InvalidRequest(_))));

        let descriptor = role();
        let request = FilterRequest::all().page(0, 500);
        assert!(matches!(
            validate(&descriptor, &request, &FilterConfig::default().max_limit(100)),
            Err(DbError::InvalidRequest(_))
        ));

        assert!(matches!(
            check(FilterRequest::all().page(i64::MAX, i64::MAX)),
            Err(DbError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_operator_checked_only_when_filtering() {
        assert!(check(FilterRequest::all().operator("??")).is_ok());
        assert!(matches!(
            check(FilterRequest::all().attribute("name", "x").operator("??")),
            Err(DbError::UnsupportedOperator(_))
        ));
    }
}
