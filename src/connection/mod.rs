pub mod config;
pub mod pool;

pub use config::ConnectionConfig;
pub use pool::{ConnectionPool, PoolGuard, PoolStats};

use crate::core::{DbError, Result, Row, Value};
use crate::expression::Predicate;
use crate::planner::SelectPlan;
use crate::storage::{CountedRows, InMemoryStorage, StoreSession};
use async_trait::async_trait;
use std::sync::Arc;

/// Store connection handle
///
/// One session against a shared [`InMemoryStorage`]. Connections are cheap;
/// the pool exists to bound how many calls touch the store at once.
pub struct Connection {
    /// Unique connection ID
    id: u64,
    /// Shared store instance
    storage: Arc<InMemoryStorage>,
    /// Connection state
    state: ConnectionState,
    /// Answer fetch + counts from one read lock
    snapshot_reads: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConnectionState {
    Active,
    Closed,
}

impl Connection {
    pub(crate) fn new(id: u64, storage: Arc<InMemoryStorage>, snapshot_reads: bool) -> Self {
        Self {
            id,
            storage,
            state: ConnectionState::Active,
            snapshot_reads,
        }
    }

    /// Get connection ID
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Check if connection is active
    pub fn is_active(&self) -> bool {
        self.state != ConnectionState::Closed
    }

    pub fn storage(&self) -> &Arc<InMemoryStorage> {
        &self.storage
    }

    fn ensure_active(&self) -> Result<()> {
        if self.state == ConnectionState::Closed {
            return Err(DbError::StoreUnavailable(format!(
                "Connection {} is closed",
                self.id
            )));
        }
        Ok(())
    }

    /// Mark the connection closed; later calls fail with `StoreUnavailable`.
    pub fn shutdown(&mut self) {
        self.state = ConnectionState::Closed;
    }
}

#[async_trait]
impl StoreSession for Connection {
    async fn fetch(&mut self, plan: &SelectPlan) -> Result<Vec<Row>> {
        self.ensure_active()?;
        self.storage.fetch(plan).await
    }

    async fn count(&mut self, entity: &str, predicate: Option<&Predicate>) -> Result<u64> {
        self.ensure_active()?;
        self.storage.count(entity, predicate).await
    }

    async fn fetch_counted(&mut self, plan: &SelectPlan) -> Result<CountedRows> {
        self.ensure_active()?;
        if self.snapshot_reads {
            return self.storage.fetch_and_count(plan).await;
        }

        let rows = self.storage.fetch(plan).await?;
        let total = self.storage.count(&plan.entity, None).await?;
        let matched = match &plan.predicate {
            Some(predicate) => self.storage.count(&plan.entity, Some(predicate)).await?,
            None => total,
        };
        Ok(CountedRows {
            rows,
            total,
            matched,
        })
    }

    async fn insert(&mut self, entity: &str, row: Row) -> Result<()> {
        self.ensure_active()?;
        self.storage.insert_row(entity, row).await
    }

    async fn update(
        &mut self,
        entity: &str,
        predicate: &Predicate,
        changes: &[(String, Value)],
    ) -> Result<Vec<Row>> {
        self.ensure_active()?;
        self.storage.update_rows(entity, predicate, changes).await
    }

    async fn delete(&mut self, entity: &str, predicate: &Predicate) -> Result<u64> {
        self.ensure_active()?;
        self.storage.delete_rows(entity, predicate).await
    }

    async fn close(mut self) -> Result<()> {
        self.shutdown();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Column, DataType, EntityDescriptor};
    use crate::expression::CompareOp;

    fn create_test_connection(snapshot_reads: bool) -> Connection {
        let mut storage = InMemoryStorage::new();
        storage
            .create_table(EntityDescriptor::new(
                "role",
                vec![
                    Column::new("name", DataType::Text).unique(),
                    Column::new("access_level", DataType::Integer),
                ],
            ))
            .unwrap();
        Connection::new(1, Arc::new(storage), snapshot_reads)
    }

    #[tokio::test]
    async fn test_connection_creation() {
        let conn = create_test_connection(true);
        assert_eq!(conn.id(), 1);
        assert!(conn.is_active());
    }

    #[tokio::test]
    async fn test_counts_agree_in_both_read_modes() {
        for snapshot in [true, false] {
            let mut conn = create_test_connection(snapshot);
            for (name, level) in [("admin", 9), ("editor", 5), ("viewer", 1)] {
                conn.insert("role", vec![Value::from(name), Value::Integer(level)])
                    .await
                    .unwrap();
            }

            let plan = SelectPlan::scan("role").filter(Some(Predicate::compare(
                "access_level",
                CompareOp::GtEq,
                Value::Integer(5),
            )));
            let counted = conn.fetch_counted(&plan).await.unwrap();
            assert_eq!(counted.rows.len(), 2);
            assert_eq!(counted.total, 3);
            assert_eq!(counted.matched, 2);
        }
    }

    #[tokio::test]
    async fn test_connection_shutdown() {
        let mut conn = create_test_connection(true);
        conn.shutdown();
        assert!(!conn.is_active());

        let result = conn.fetch(&SelectPlan::scan("role")).await;
        assert!(matches!(result, Err(DbError::StoreUnavailable(_))));
    }
}
