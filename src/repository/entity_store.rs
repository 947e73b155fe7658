use super::{FilterableRead, MutableRecord, Record};
use crate::core::{DbError, EntityDescriptor, Result, Row, Value};
use crate::expression::{CompareOp, Predicate};
use crate::filter::{FilterEngine, FilterRequest};
use crate::planner::SelectPlan;
use crate::result::QueryResult;
use crate::storage::{SessionSource, StoreSession};
use async_trait::async_trait;
use chrono::Local;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

const UUID_COLUMN: &str = "uuid";
const CREATED_AT_COLUMN: &str = "created_at";
const UPDATED_AT_COLUMN: &str = "updated_at";

/// Read and write access to one entity.
pub struct EntityStore<S: SessionSource> {
    descriptor: Arc<EntityDescriptor>,
    engine: FilterEngine<S>,
}

impl<S: SessionSource> Clone for EntityStore<S> {
    fn clone(&self) -> Self {
        Self {
            descriptor: Arc::clone(&self.descriptor),
            engine: self.engine.clone(),
        }
    }
}

impl<S: SessionSource> EntityStore<S> {
    pub fn new(descriptor: Arc<EntityDescriptor>, engine: FilterEngine<S>) -> Self {
        Self { descriptor, engine }
    }

    pub fn engine(&self) -> &FilterEngine<S> {
        &self.engine
    }

    fn entity(&self) -> &str {
        self.descriptor.name()
    }

    fn equals(&self, attribute: &str, value: &Value) -> Result<Predicate> {
        self.descriptor.column(attribute)?;
        Ok(match value {
            Value::Null => Predicate::is_null(attribute),
            value => Predicate::compare(attribute, CompareOp::Eq, value.clone()),
        })
    }

    fn by_uuid(&self, uuid: Uuid) -> Result<Predicate> {
        self.equals(UUID_COLUMN, &Value::Uuid(uuid))
    }

    /// Every named column must exist; reports all offenders at once.
    fn check_columns(&self, values: &[(String, Value)]) -> Result<()> {
        let unknown: Vec<String> = values
            .iter()
            .filter(|(name, _)| !self.descriptor.contains(name))
            .map(|(name, _)| name.clone())
            .collect();
        if unknown.is_empty() {
            Ok(())
        } else {
            Err(DbError::UnknownAttribute {
                entity: self.entity().to_string(),
                attributes: unknown,
            })
        }
    }

    /// Close the session whatever `outcome` was; the outcome's error wins.
    async fn release<T>(session: S::Session, outcome: Result<T>) -> Result<T> {
        let released = session.close().await;
        let value = outcome?;
        released?;
        Ok(value)
    }
}

#[async_trait]
impl<S: SessionSource> FilterableRead for EntityStore<S> {
    fn descriptor(&self) -> &EntityDescriptor {
        &self.descriptor
    }

    async fn query(&self, request: &FilterRequest) -> Result<QueryResult> {
        self.engine.query(&self.descriptor, request).await
    }

    async fn get(&self, attribute: &str, value: &Value) -> Result<Option<Record>> {
        let plan = SelectPlan::scan(self.entity())
            .filter(Some(self.equals(attribute, value)?))
            .first_only(true);

        let mut session = self.engine.source().acquire().await?;
        let outcome = session.fetch(&plan).await;
        let rows = Self::release(session, outcome).await?;

        Ok(rows
            .into_iter()
            .next()
            .map(|row| Record::from_row(&self.descriptor, row)))
    }

    async fn count(&self, filter: Option<(&str, &Value)>) -> Result<u64> {
        let predicate = match filter {
            Some((attribute, value)) => Some(self.equals(attribute, value)?),
            None => None,
        };

        let mut session = self.engine.source().acquire().await?;
        let outcome = session.count(self.entity(), predicate.as_ref()).await;
        Self::release(session, outcome).await
    }

    async fn unique_verify(&self, attribute: &str, value: &Value) -> Result<()> {
        if self.get(attribute, value).await?.is_some() {
            return Err(DbError::ConstraintViolation(format!("{} already exists", value)));
        }
        Ok(())
    }
}

#[async_trait]
impl<S: SessionSource> MutableRecord for EntityStore<S> {
    async fn create(&self, values: Vec<(String, Value)>) -> Result<Record> {
        self.check_columns(&values)?;

        let now = Local::now().naive_local();
        let mut row: Row = self
            .descriptor
            .columns()
            .iter()
            .map(|column| match column.name.as_str() {
                UUID_COLUMN => Value::Uuid(Uuid::new_v4()),
                CREATED_AT_COLUMN => Value::Timestamp(now),
                _ => Value::Null,
            })
            .collect();
        for (name, value) in values {
            if let Some(idx) = self.descriptor.find_column_index(&name) {
                row[idx] = value;
            }
        }

        let mut session = self.engine.source().acquire().await?;
        let outcome = session.insert(self.entity(), row.clone()).await;
        Self::release(session, outcome).await?;

        let record = Record::from_row(&self.descriptor, row);
        debug!(entity = self.entity(), uuid = ?record.uuid(), "created record");
        Ok(record)
    }

    async fn update(&self, uuid: Uuid, mut changes: Vec<(String, Value)>) -> Result<Record> {
        self.check_columns(&changes)?;
        if changes.iter().any(|(name, _)| name == UUID_COLUMN) {
            return Err(DbError::InvalidRequest("'uuid' cannot be changed".into()));
        }
        if self.descriptor.contains(UPDATED_AT_COLUMN)
            && !changes.iter().any(|(name, _)| name == UPDATED_AT_COLUMN)
        {
            changes.push((
                UPDATED_AT_COLUMN.to_string(),
                Value::Timestamp(Local::now().naive_local()),
            ));
        }
        let predicate = self.by_uuid(uuid)?;

        let mut session = self.engine.source().acquire().await?;
        let outcome = session.update(self.entity(), &predicate, &changes).await;
        let rows = Self::release(session, outcome).await?;

        rows.into_iter()
            .next()
            .map(|row| Record::from_row(&self.descriptor, row))
            .ok_or_else(|| DbError::NotFound(format!("{} {} not found", self.entity(), uuid)))
    }

    async fn remove(&self, uuid: Uuid) -> Result<()> {
        let predicate = self.by_uuid(uuid)?;

        let mut session = self.engine.source().acquire().await?;
        let outcome = session.delete(self.entity(), &predicate).await;
        let deleted = Self::release(session, outcome).await?;

        if deleted == 0 {
            return Err(DbError::NotFound(format!("{} {} not found", self.entity(), uuid)));
        }
        debug!(entity = self.entity(), %uuid, "removed record");
        Ok(())
    }
}
