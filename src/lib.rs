// ============================================================================
// dashstore Library
// ============================================================================

pub mod core;
pub mod storage;
pub mod result;
pub mod connection;
pub mod filter;
pub mod repository;
pub mod models;
pub mod expression;
pub mod planner;
mod evaluator;

// Re-export main types for convenience
pub use core::{Column, DataType, DbError, EntityDescriptor, ErrorCategory, Result, Value};
pub use filter::{FilterConfig, FilterEngine, FilterRequest, Operator, QueryPlan};
pub use result::{QueryMeta, QueryResult};
pub use repository::{EntityStore, FilterableRead, MutableRecord, Record};
pub use storage::{Catalog, InMemoryStorage, SessionSource, StoreSession};

// Re-export connection API
pub use connection::{Connection, ConnectionConfig, ConnectionPool, PoolGuard, PoolStats};

use std::sync::Arc;

// ============================================================================
// Application wiring
// ============================================================================

/// Everything a dashboard process needs: the shared pool, one filter engine
/// and a store per entity.
///
/// # Examples
///
/// ```
/// use dashstore::{Dashboard, ConnectionConfig, FilterRequest, FilterableRead};
///
/// # #[tokio::main]
/// # async fn main() -> dashstore::Result<()> {
/// let dashboard = Dashboard::open(ConnectionConfig::default()).await?;
/// let roles = dashboard.store("role")?;
///
/// let result = roles.query(&FilterRequest::all()).await?;
/// assert_eq!(result.meta.total_count, 0);
/// # Ok(())
/// # }
/// ```
pub struct Dashboard {
    catalog: Catalog,
    engine: FilterEngine<ConnectionPool>,
}

impl Dashboard {
    /// Create the dashboard tables and a pool over them.
    pub async fn open(config: ConnectionConfig) -> Result<Self> {
        Self::open_with(config, FilterConfig::default()).await
    }

    pub async fn open_with(config: ConnectionConfig, filter_config: FilterConfig) -> Result<Self> {
        let catalog = models::catalog()?;
        let storage = InMemoryStorage::from_catalog(&catalog)?;
        let pool = ConnectionPool::new(config, Arc::new(storage)).await?;

        tracing::info!(
            database = %pool.config().database,
            entities = ?catalog.list_entities(),
            "dashboard store ready"
        );

        Ok(Self {
            catalog,
            engine: FilterEngine::new(Arc::new(pool)).with_config(filter_config),
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn engine(&self) -> &FilterEngine<ConnectionPool> {
        &self.engine
    }

    pub fn pool(&self) -> &ConnectionPool {
        self.engine.source()
    }

    /// Read/write access to one entity by table name.
    pub fn store(&self, entity: &str) -> Result<EntityStore<ConnectionPool>> {
        let descriptor = self.catalog.attributes_of(entity)?;
        Ok(EntityStore::new(descriptor, self.engine.clone()))
    }

    /// Run a filter query against the entity named `entity`.
    pub async fn query(&self, entity: &str, request: &FilterRequest) -> Result<QueryResult> {
        let descriptor = self.catalog.attributes_of(entity)?;
        self.engine.query(&descriptor, request).await
    }
}
