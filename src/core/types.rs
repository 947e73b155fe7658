use super::{DataType, DbError, Result, Value};

pub type Row = Vec<Value>;

#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    pub data_type: DataType,
    pub nullable: bool,
    /// Pattern (`~`) matching is allowed on this column.
    pub searchable: bool,
    pub unique: bool,
    pub primary_key: bool,
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable: true,
            searchable: data_type.is_textual(),
            unique: false,
            primary_key: false,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.unique = true;
        self.nullable = false;
        self
    }

    /// Opt a textual column out of pattern search (e.g. secrets).
    pub fn not_searchable(mut self) -> Self {
        self.searchable = false;
        self
    }

    pub fn validate(&self, value: &Value) -> Result<()> {
        if matches!(value, Value::Null) {
            if !self.nullable {
                return Err(DbError::ConstraintViolation(format!(
                    "Column '{}' cannot be NULL",
                    self.name
                )));
            }
            return Ok(());
        }

        if !self.data_type.is_compatible(value) {
            return Err(DbError::TypeMismatch(format!(
                "Column '{}' expects type {}, got {}",
                self.name,
                self.data_type,
                value.type_name()
            )));
        }

        Ok(())
    }
}

/// Schema contract of one entity: its name and ordered attribute list.
///
/// Built once at start-up and shared read-only afterwards.
#[derive(Debug, Clone)]
pub struct EntityDescriptor {
    name: String,
    columns: Vec<Column>,
}

impl EntityDescriptor {
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            name: name.into(),
            columns,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn find_column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|col| col.name == name)
    }

    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.find_column_index(name).map(|idx| &self.columns[idx])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.find_column_index(name).is_some()
    }

    /// Look up a column, failing with `UnknownAttribute` when it is absent.
    pub fn column(&self, name: &str) -> Result<&Column> {
        self.get_column(name)
            .ok_or_else(|| DbError::unknown_attribute(&self.name, name))
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }
}
