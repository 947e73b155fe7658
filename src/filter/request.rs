use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// One filter query, as sent by a dashboard page.
///
/// Deserialises from the camelCase wire shape:
///
/// ```json
/// {"returnAll": true, "attribute": "name", "value": "adm", "operator": "~",
///  "skip": 0, "limit": 10, "include": ["uuid", "name"]}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterRequest {
    /// Return every matching row instead of the first one
    pub return_all: bool,
    pub attribute: Option<String>,
    pub value: Option<String>,
    /// Attribute → value map; every entry must hold
    pub json_filters: Option<JsonValue>,
    /// Operator token, `=` unless given
    pub operator: String,
    /// Page number; the offset is `skip * limit`
    pub skip: Option<i64>,
    /// Page size
    pub limit: Option<i64>,
    /// Columns to return, in this order
    pub include: Option<Vec<String>>,
}

impl FilterRequest {
    /// Every row, no filter.
    pub fn all() -> Self {
        Self {
            return_all: true,
            ..Self::default()
        }
    }

    /// First matching row only.
    pub fn first() -> Self {
        Self::default()
    }

    pub fn attribute(mut self, attribute: impl Into<String>, value: impl Into<String>) -> Self {
        self.attribute = Some(attribute.into());
        self.value = Some(value.into());
        self
    }

    pub fn operator(mut self, operator: impl Into<String>) -> Self {
        self.operator = operator.into();
        self
    }

    pub fn json_filters(mut self, filters: JsonValue) -> Self {
        self.json_filters = Some(filters);
        self
    }

    pub fn page(mut self, skip: i64, limit: i64) -> Self {
        self.skip = Some(skip);
        self.limit = Some(limit);
        self
    }

    pub fn include<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Attribute to filter on; an empty name counts as absent.
    pub fn attribute_name(&self) -> Option<&str> {
        self.attribute.as_deref().filter(|name| !name.is_empty())
    }

    /// Does the request carry any predicate source?
    ///
    /// `jsonFilters` of `null` or `{}` filters nothing.
    pub fn has_filter(&self) -> bool {
        let json = self.json_filters.as_ref().is_some_and(|filters| match filters {
            JsonValue::Null => false,
            JsonValue::Object(map) => !map.is_empty(),
            _ => true,
        });
        self.attribute_name().is_some() || json
    }
}

impl Default for FilterRequest {
    fn default() -> Self {
        Self {
            return_all: false,
            attribute: None,
            value: None,
            json_filters: None,
            operator: "=".to_string(),
            skip: None,
            limit: None,
            include: None,
        }
    }
}
