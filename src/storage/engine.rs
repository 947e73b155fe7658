use crate::core::{Result, Row, Value};
use crate::expression::Predicate;
use crate::planner::SelectPlan;
use async_trait::async_trait;

/// Rows of a plan together with the two counts reported to callers.
#[derive(Debug, Clone, PartialEq)]
pub struct CountedRows {
    pub rows: Vec<Row>,
    /// Every row of the entity, no predicate.
    pub total: u64,
    /// Rows satisfying the plan's predicate, ignoring its window.
    pub matched: u64,
}

/// A connection-scoped unit of work against the store.
///
/// One session serves one call; it is never shared between concurrent calls.
#[async_trait]
pub trait StoreSession: Send {
    /// Execute a read plan and return its rows.
    async fn fetch(&mut self, plan: &SelectPlan) -> Result<Vec<Row>>;

    /// Count rows of `entity`, optionally restricted by `predicate`.
    async fn count(&mut self, entity: &str, predicate: Option<&Predicate>) -> Result<u64>;

    /// Fetch plus counts.
    ///
    /// The default issues separate reads, so counts may race concurrent
    /// writers. Stores offering snapshot reads override it.
    async fn fetch_counted(&mut self, plan: &SelectPlan) -> Result<CountedRows> {
        let rows = self.fetch(plan).await?;
        let total = self.count(&plan.entity, None).await?;
        let matched = match &plan.predicate {
            Some(predicate) => self.count(&plan.entity, Some(predicate)).await?,
            None => total,
        };
        Ok(CountedRows {
            rows,
            total,
            matched,
        })
    }

    async fn insert(&mut self, entity: &str, row: Row) -> Result<()>;

    /// Apply `changes` to every row matching `predicate`; returns the new rows.
    async fn update(
        &mut self,
        entity: &str,
        predicate: &Predicate,
        changes: &[(String, Value)],
    ) -> Result<Vec<Row>>;

    /// Delete rows matching `predicate`; returns how many were removed.
    async fn delete(&mut self, entity: &str, predicate: &Predicate) -> Result<u64>;

    /// Release the session. Dropping it also releases, without awaiting.
    async fn close(self) -> Result<()>
    where
        Self: Sized;
}

/// Hands out store sessions (e.g. a connection pool).
#[async_trait]
pub trait SessionSource: Send + Sync {
    type Session: StoreSession;

    async fn acquire(&self) -> Result<Self::Session>;
}
