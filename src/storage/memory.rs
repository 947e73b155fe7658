use super::{Catalog, CountedRows, Table};
use crate::core::{DbError, EntityDescriptor, Result, Row, Value};
use crate::evaluator::EvaluatorRegistry;
use crate::expression::Predicate;
use crate::planner::SelectPlan;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory relational store.
///
/// Tables are created up front; afterwards every operation takes `&self` and
/// locks only the table it touches.
pub struct InMemoryStorage {
    catalog: Catalog,
    tables: HashMap<String, Arc<RwLock<Table>>>,
    evaluators: EvaluatorRegistry,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self {
            catalog: Catalog::new(),
            tables: HashMap::new(),
            evaluators: EvaluatorRegistry::with_default_evaluators(),
        }
    }

    /// Create one table per catalog entity.
    pub fn from_catalog(catalog: &Catalog) -> Result<Self> {
        let mut storage = Self::new();
        for descriptor in catalog.descriptors() {
            storage.create_table(EntityDescriptor::clone(descriptor))?;
        }
        Ok(storage)
    }

    pub fn create_table(&mut self, descriptor: EntityDescriptor) -> Result<()> {
        let name = descriptor.name().to_string();
        self.catalog = self.catalog.clone().with_entity(descriptor)?;
        let descriptor = self.catalog.attributes_of(&name)?;

        self.tables
            .insert(name, Arc::new(RwLock::new(Table::new(descriptor))));
        Ok(())
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn get_table(&self, name: &str) -> Result<Arc<RwLock<Table>>> {
        self.tables
            .get(name)
            .cloned()
            .ok_or_else(|| DbError::TableNotFound(name.to_string()))
    }

    pub async fn fetch(&self, plan: &SelectPlan) -> Result<Vec<Row>> {
        let handle = self.get_table(&plan.entity)?;
        let table = handle.read().await;
        self.select(&table, plan)
    }

    pub async fn count(&self, entity: &str, predicate: Option<&Predicate>) -> Result<u64> {
        let handle = self.get_table(entity)?;
        let table = handle.read().await;
        self.count_matching(&table, predicate)
    }

    /// Fetch and both counts under a single read lock.
    pub async fn fetch_and_count(&self, plan: &SelectPlan) -> Result<CountedRows> {
        let handle = self.get_table(&plan.entity)?;
        let table = handle.read().await;

        let rows = self.select(&table, plan)?;
        let total = table.row_count() as u64;
        let matched = match &plan.predicate {
            Some(_) => self.count_matching(&table, plan.predicate.as_ref())?,
            None => total,
        };

        Ok(CountedRows {
            rows,
            total,
            matched,
        })
    }

    pub async fn insert_row(&self, entity: &str, row: Row) -> Result<()> {
        let handle = self.get_table(entity)?;
        let mut table = handle.write().await;
        table.insert(row)?;
        Ok(())
    }

    pub async fn update_rows(
        &self,
        entity: &str,
        predicate: &Predicate,
        changes: &[(String, Value)],
    ) -> Result<Vec<Row>> {
        let handle = self.get_table(entity)?;
        let mut table = handle.write().await;

        let mut assignments = Vec::with_capacity(changes.len());
        for (column, value) in changes {
            let idx = table
                .descriptor()
                .find_column_index(column)
                .ok_or_else(|| DbError::unknown_attribute(entity, column.as_str()))?;
            assignments.push((idx, value));
        }

        let targets = self.matching_ids(&table, predicate)?;
        let mut updated = Vec::with_capacity(targets.len());
        for (id, mut row) in targets {
            for (idx, value) in &assignments {
                row[*idx] = (*value).clone();
            }
            table.update(id, row)?;
            if let Some(stored) = table.get(id) {
                updated.push(stored.clone());
            }
        }

        Ok(updated)
    }

    pub async fn delete_rows(&self, entity: &str, predicate: &Predicate) -> Result<u64> {
        let handle = self.get_table(entity)?;
        let mut table = handle.write().await;

        let targets = self.matching_ids(&table, predicate)?;
        let mut deleted = 0;
        for (id, _) in targets {
            if table.delete(id) {
                deleted += 1;
            }
        }
        Ok(deleted)
    }

    pub async fn row_count(&self, entity: &str) -> Result<usize> {
        let handle = self.get_table(entity)?;
        let table = handle.read().await;
        Ok(table.row_count())
    }

    fn matching_ids(&self, table: &Table, predicate: &Predicate) -> Result<Vec<(u64, Row)>> {
        let mut ids = Vec::new();
        for (id, row) in table.scan() {
            if self.evaluators.matches(predicate, row, table.descriptor())? {
                ids.push((id, row.clone()));
            }
        }
        Ok(ids)
    }

    fn count_matching(&self, table: &Table, predicate: Option<&Predicate>) -> Result<u64> {
        let Some(predicate) = predicate else {
            return Ok(table.row_count() as u64);
        };

        let mut count = 0;
        for (_, row) in table.scan() {
            if self.evaluators.matches(predicate, row, table.descriptor())? {
                count += 1;
            }
        }
        Ok(count)
    }

    /// Filter, window, then project.
    fn select(&self, table: &Table, plan: &SelectPlan) -> Result<Vec<Row>> {
        let descriptor = table.descriptor();

        let projection = match &plan.projection {
            Some(columns) => Some(
                columns
                    .iter()
                    .map(|name| {
                        descriptor
                            .find_column_index(name)
                            .ok_or_else(|| DbError::unknown_attribute(descriptor.name(), name.as_str()))
                    })
                    .collect::<Result<Vec<usize>>>()?,
            ),
            None => None,
        };

        let (offset, limit) = match plan.window {
            Some(window) => (window.offset as usize, window.limit as usize),
            None => (0, usize::MAX),
        };
        let limit = if plan.first_only { limit.min(1) } else { limit };

        let mut rows = Vec::new();
        let mut skipped = 0usize;
        for (_, row) in table.scan() {
            if rows.len() >= limit {
                break;
            }
            if let Some(predicate) = &plan.predicate
                && !self.evaluators.matches(predicate, row, descriptor)?
            {
                continue;
            }
            if skipped < offset {
                skipped += 1;
                continue;
            }
            rows.push(match &projection {
                Some(indexes) => indexes.iter().map(|idx| row[*idx].clone()).collect(),
                None => row.clone(),
            });
        }

        Ok(rows)
    }
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}
