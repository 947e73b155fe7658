use crate::core::{Row, Value};
use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value as JsonValue};

/// Row counts reported alongside every query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryMeta {
    /// Every row of the entity, regardless of filters.
    pub total_count: u64,
    /// Rows satisfying the filter, before pagination.
    pub matched_count: u64,
}

/// Output envelope of a filter query.
///
/// `columns` names the values of each row in `data`, in order. When the
/// caller asked for a projection (`projected`), rows serialise as arrays;
/// otherwise as objects keyed by column name.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub data: Vec<Row>,
    pub meta: QueryMeta,
    pub projected: bool,
}

impl QueryResult {
    pub fn new(columns: Vec<String>, data: Vec<Row>, meta: QueryMeta, projected: bool) -> Self {
        Self {
            columns,
            data,
            meta,
            projected,
        }
    }

    pub fn row_count(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The single record of a `returnAll = false` query.
    pub fn first(&self) -> Option<&Row> {
        self.data.first()
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Value of `column` in row `row`.
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.data.get(row)?.get(idx)
    }

    /// Every value of one column, in row order.
    pub fn column_values(&self, column: &str) -> Vec<&Value> {
        match self.column_index(column) {
            Some(idx) => self.data.iter().filter_map(|row| row.get(idx)).collect(),
            None => Vec::new(),
        }
    }

    /// Rows as JSON objects keyed by column name.
    pub fn records(&self) -> Vec<Map<String, JsonValue>> {
        self.data
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .zip(row)
                    .map(|(column, value)| (column.clone(), value.to_json()))
                    .collect()
            })
            .collect()
    }

    /// Plain-text table, one line per row.
    pub fn render_table(&self) -> String {
        if self.columns.is_empty() {
            return "Empty result set\n".to_string();
        }

        let mut widths: Vec<usize> = self.columns.iter().map(|c| c.chars().count()).collect();
        for row in &self.data {
            for (i, value) in row.iter().enumerate() {
                widths[i] = widths[i].max(value.to_string().chars().count());
            }
        }

        let format_line = |cells: Vec<String>| {
            cells
                .iter()
                .enumerate()
                .map(|(i, cell)| format!("{:width$}", cell, width = widths[i]))
                .collect::<Vec<_>>()
                .join(" | ")
        };

        let mut out = String::new();
        out.push_str(&format_line(self.columns.clone()));
        out.push('\n');
        out.push_str(
            &widths
                .iter()
                .map(|w| "-".repeat(*w))
                .collect::<Vec<_>>()
                .join("-+-"),
        );
        out.push('\n');
        for row in &self.data {
            out.push_str(&format_line(row.iter().map(|v| v.to_string()).collect()));
            out.push('\n');
        }
        out.push_str(&format!(
            "\n{} row(s), {} matched, {} total\n",
            self.data.len(),
            self.meta.matched_count,
            self.meta.total_count
        ));
        out
    }
}

struct RecordRef<'a> {
    columns: &'a [String],
    row: &'a Row,
}

impl Serialize for RecordRef<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (column, value) in self.columns.iter().zip(self.row) {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

impl Serialize for QueryResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("QueryResult", 2)?;
        if self.projected {
            state.serialize_field("data", &self.data)?;
        } else {
            let records: Vec<RecordRef<'_>> = self
                .data
                .iter()
                .map(|row| RecordRef {
                    columns: &self.columns,
                    row,
                })
                .collect();
            state.serialize_field("data", &records)?;
        }
        state.serialize_field("meta", &self.meta)?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample(projected: bool) -> QueryResult {
        QueryResult::new(
            vec!["name".into(), "access_level".into()],
            vec![
                vec![Value::from("admin"), Value::Integer(9)],
                vec![Value::from("viewer"), Value::Integer(1)],
            ],
            QueryMeta {
                total_count: 5,
                matched_count: 2,
            },
            projected,
        )
    }

    #[test]
    fn test_records_serialize_as_objects() {
        let json = serde_json::to_value(sample(false)).unwrap();
        assert_eq!(
            json,
            json!({
                "data": [
                    {"name": "admin", "access_level": 9},
                    {"name": "viewer", "access_level": 1}
                ],
                "meta": {"totalCount": 5, "matchedCount": 2}
            })
        );
    }

    #[test]
    fn test_projection_serializes_as_tuples() {
        let json = serde_json::to_value(sample(true)).unwrap();
        assert_eq!(json["data"], json!([["admin", 9], ["viewer", 1]]));
    }

    #[test]
    fn test_accessors() {
        let result = sample(false);
        assert_eq!(result.get(1, "name"), Some(&Value::from("viewer")));
        assert_eq!(result.get(0, "ghost"), None);
        assert_eq!(result.column_values("access_level").len(), 2);
        assert_eq!(result.records()[0]["access_level"], json!(9));
        assert!(result.render_table().contains("2 row(s), 2 matched, 5 total"));
    }

    #[test]
    fn test_table_aligns_non_ascii() {
        let result = QueryResult::new(
            vec!["name".into(), "access_level".into()],
            vec![
                vec![Value::from("gerência"), Value::Integer(7)],
                vec![Value::from("admin"), Value::Integer(9)],
            ],
            QueryMeta {
                total_count: 2,
                matched_count: 2,
            },
            true,
        );

        let table = result.render_table();
        let bars: Vec<usize> = table
            .lines()
            .take(4)
            .filter(|line| line.contains(" | "))
            .map(|line| line.chars().position(|c| c == '|').unwrap())
            .collect();
        assert_eq!(bars, vec![9, 9, 9]);
    }
}
