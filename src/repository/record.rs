use crate::core::{EntityDescriptor, Row, Value};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value as JsonValue};
use uuid::Uuid;

/// One stored row together with its column names.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    columns: Vec<String>,
    values: Row,
}

impl Record {
    pub fn new(columns: Vec<String>, values: Row) -> Self {
        Self { columns, values }
    }

    pub fn from_row(descriptor: &EntityDescriptor, values: Row) -> Self {
        Self::new(descriptor.column_names(), values)
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        let idx = self.columns.iter().position(|c| c == column)?;
        self.values.get(idx)
    }

    pub fn text(&self, column: &str) -> Option<&str> {
        self.get(column)?.as_str()
    }

    pub fn integer(&self, column: &str) -> Option<i64> {
        self.get(column)?.as_i64()
    }

    pub fn boolean(&self, column: &str) -> Option<bool> {
        self.get(column)?.as_bool()
    }

    pub fn bytes(&self, column: &str) -> Option<&[u8]> {
        self.get(column)?.as_bytes()
    }

    /// The record's `uuid` column.
    pub fn uuid(&self) -> Option<Uuid> {
        self.get("uuid")?.as_uuid()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &Row {
        &self.values
    }

    pub fn into_row(self) -> Row {
        self.values
    }

    pub fn to_json(&self) -> Map<String, JsonValue> {
        self.columns
            .iter()
            .zip(&self.values)
            .map(|(column, value)| (column.clone(), value.to_json()))
            .collect()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (column, value) in self.columns.iter().zip(&self.values) {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Column, DataType};

    #[test]
    fn test_typed_accessors() {
        let descriptor = EntityDescriptor::new(
            "user",
            vec![
                Column::new("uuid", DataType::Uuid),
                Column::new("username", DataType::Text),
                Column::new("active", DataType::Boolean),
            ],
        );
        let id = Uuid::new_v4();
        let record = Record::from_row(
            &descriptor,
            vec![Value::Uuid(id), Value::from("ann"), Value::Boolean(false)],
        );

        assert_eq!(record.uuid(), Some(id));
        assert_eq!(record.text("username"), Some("ann"));
        assert_eq!(record.boolean("active"), Some(false));
        assert_eq!(record.integer("username"), None);
        assert_eq!(record.get("ghost"), None);
        assert_eq!(record.to_json()["username"], "ann");
    }
}
