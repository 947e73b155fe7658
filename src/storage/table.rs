use crate::core::{DataType, DbError, EntityDescriptor, Result, Row, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

pub type RowId = u64;

/// Rows of one entity, kept in insertion order.
#[derive(Debug, Clone)]
pub struct Table {
    descriptor: Arc<EntityDescriptor>,
    rows: BTreeMap<RowId, Row>,
    next_row_id: RowId,
}

impl Table {
    pub fn new(descriptor: Arc<EntityDescriptor>) -> Self {
        Self {
            descriptor,
            rows: BTreeMap::new(),
            next_row_id: 0,
        }
    }

    pub fn descriptor(&self) -> &EntityDescriptor {
        &self.descriptor
    }

    pub fn insert(&mut self, row: Row) -> Result<RowId> {
        self.validate_row(&row)?;
        self.check_uniqueness(&row, None)?;
        let row = self.normalize_row(row);

        let id = self.next_row_id;
        self.next_row_id += 1;
        self.rows.insert(id, row);

        Ok(id)
    }

    pub fn update(&mut self, id: RowId, new_row: Row) -> Result<bool> {
        if !self.rows.contains_key(&id) {
            return Ok(false);
        }
        self.validate_row(&new_row)?;
        self.check_uniqueness(&new_row, Some(id))?;
        let new_row = self.normalize_row(new_row);
        self.rows.insert(id, new_row);
        Ok(true)
    }

    pub fn delete(&mut self, id: RowId) -> bool {
        self.rows.remove(&id).is_some()
    }

    pub fn scan(&self) -> impl Iterator<Item = (RowId, &Row)> {
        self.rows.iter().map(|(id, row)| (*id, row))
    }

    pub fn get(&self, id: RowId) -> Option<&Row> {
        self.rows.get(&id)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn check_uniqueness(&self, row: &Row, ignore_id: Option<RowId>) -> Result<()> {
        for (col_idx, column) in self.descriptor.columns().iter().enumerate() {
            if !(column.primary_key || column.unique) {
                continue;
            }
            let value = &row[col_idx];
            if value.is_null() {
                continue;
            }

            let clash = self
                .rows
                .iter()
                .filter(|(id, _)| Some(**id) != ignore_id)
                .any(|(_, existing)| &existing[col_idx] == value);

            if clash {
                return Err(DbError::ConstraintViolation(format!(
                    "{} already exists in column '{}'",
                    value, column.name
                )));
            }
        }
        Ok(())
    }

    fn validate_row(&self, row: &Row) -> Result<()> {
        let columns = self.descriptor.columns();
        if row.len() != columns.len() {
            return Err(DbError::ExecutionError(format!(
                "Expected {} columns, got {}",
                columns.len(),
                row.len()
            )));
        }
        for (column, value) in columns.iter().zip(row.iter()) {
            column.validate(value)?;
        }
        Ok(())
    }

    /// Promote integers stored into FLOAT columns so rows stay homogeneous.
    fn normalize_row(&self, row: Row) -> Row {
        row.into_iter()
            .zip(self.descriptor.columns())
            .map(|(value, column)| match (value, column.data_type) {
                (Value::Integer(i), DataType::Float) => Value::Float(i as f64),
                (value, _) => value,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Column;

    fn table() -> Table {
        Table::new(Arc::new(EntityDescriptor::new(
            "role",
            vec![
                Column::new("name", DataType::Text).not_null().unique(),
                Column::new("weight", DataType::Float),
            ],
        )))
    }

    #[test]
    fn test_insert_and_scan_order() {
        let mut t = table();
        t.insert(vec![Value::from("b"), Value::Null]).unwrap();
        t.insert(vec![Value::from("a"), Value::Float(1.0)]).unwrap();
        let names: Vec<String> = t.scan().map(|(_, r)| r[0].to_string()).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn test_unique_violation() {
        let mut t = table();
        t.insert(vec![Value::from("admin"), Value::Null]).unwrap();
        let err = t.insert(vec![Value::from("admin"), Value::Null]).unwrap_err();
        assert!(matches!(err, DbError::ConstraintViolation(_)));
    }

    #[test]
    fn test_update_keeps_own_unique_value() {
        let mut t = table();
        let id = t.insert(vec![Value::from("admin"), Value::Null]).unwrap();
        assert!(t.update(id, vec![Value::from("admin"), Value::Float(2.0)]).unwrap());
        assert!(!t.update(99, vec![Value::from("x"), Value::Null]).unwrap());
    }

    #[test]
    fn test_validation() {
        let mut t = table();
        assert!(t.insert(vec![Value::Null, Value::Null]).is_err());
        assert!(t.insert(vec![Value::from("x")]).is_err());
        assert_eq!(
            t.normalize_row(vec![Value::from("x"), Value::Integer(2)])[1],
            Value::Float(2.0)
        );
    }
}
