use super::{Connection, config::ConnectionConfig};
use crate::core::{DbError, Result, Row, Value};
use crate::expression::Predicate;
use crate::planner::SelectPlan;
use crate::storage::{CountedRows, InMemoryStorage, SessionSource, StoreSession};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Connection pool
///
/// Hands out at most `max_connections` sessions over one shared store.
/// Sessions come back on [`PoolGuard::close`] or, failing that, on drop.
pub struct ConnectionPool {
    /// Pool configuration
    config: ConnectionConfig,
    /// Available connections
    available: Arc<Mutex<VecDeque<PooledConnection>>>,
    /// Total number of connections created
    total_connections: Arc<AtomicUsize>,
    /// Shared store instance
    storage: Arc<InMemoryStorage>,
    /// Next connection ID
    next_id: AtomicU64,
    /// Set by `shutdown`; acquisition fails afterwards
    closed: AtomicBool,
}

/// A connection from the pool
struct PooledConnection {
    connection: Connection,
    created_at: Instant,
    last_used: Instant,
}

impl PooledConnection {
    fn new(connection: Connection) -> Self {
        let now = Instant::now();
        Self {
            connection,
            created_at: now,
            last_used: now,
        }
    }

    fn returned(connection: Connection, created_at: Instant) -> Self {
        Self {
            connection,
            created_at,
            last_used: Instant::now(),
        }
    }

    fn is_expired(&self, max_lifetime: Option<Duration>) -> bool {
        max_lifetime.is_some_and(|lifetime| self.created_at.elapsed() > lifetime)
    }

    fn is_idle_too_long(&self, idle_timeout: Option<Duration>) -> bool {
        idle_timeout.is_some_and(|timeout| self.last_used.elapsed() > timeout)
    }
}

impl ConnectionPool {
    pub async fn new(config: ConnectionConfig, storage: Arc<InMemoryStorage>) -> Result<Self> {
        config.validate().map_err(DbError::InvalidRequest)?;

        let pool = Self {
            config,
            available: Arc::new(Mutex::new(VecDeque::new())),
            total_connections: Arc::new(AtomicUsize::new(0)),
            storage,
            next_id: AtomicU64::new(1),
            closed: AtomicBool::new(false),
        };

        // Pre-create minimum connections
        pool.ensure_min_connections().await;

        Ok(pool)
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    pub fn storage(&self) -> &Arc<InMemoryStorage> {
        &self.storage
    }

    /// Get a connection from the pool
    ///
    /// Waits up to `connect_timeout`, then fails with `StoreUnavailable`.
    pub async fn get_connection(&self) -> Result<PoolGuard> {
        let start = Instant::now();

        loop {
            if self.closed.load(Ordering::SeqCst) {
                return Err(DbError::StoreUnavailable("Connection pool is shut down".into()));
            }

            if let Some(pooled) = self.try_get_available().await {
                debug!(connection = pooled.connection.id(), "reusing pooled connection");
                return Ok(self.guard(pooled.connection, pooled.created_at));
            }

            if let Some(connection) = self.try_create_connection() {
                debug!(connection = connection.id(), "opened new connection");
                return Ok(self.guard(connection, Instant::now()));
            }

            if start.elapsed() > self.config.connect_timeout {
                return Err(DbError::StoreUnavailable(format!(
                    "Connection pool timeout: no connections available after {:?}",
                    self.config.connect_timeout
                )));
            }

            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    /// Refuse further acquisitions and drop idle connections.
    pub async fn shutdown(&self) {
        self.closed.store(true, Ordering::SeqCst);
        let mut available = self.available.lock().await;
        let dropped = available.len();
        available.clear();
        self.total_connections.fetch_sub(dropped, Ordering::SeqCst);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn guard(&self, connection: Connection, created_at: Instant) -> PoolGuard {
        PoolGuard {
            connection: Some(connection),
            created_at,
            pool: self.available.clone(),
            total_connections: self.total_connections.clone(),
        }
    }

    /// Pop the first live connection, evicting stale ones on the way.
    async fn try_get_available(&self) -> Option<PooledConnection> {
        let mut available = self.available.lock().await;

        let mut removed = 0usize;
        available.retain(|pooled| {
            let stale = pooled.is_expired(self.config.max_lifetime)
                || pooled.is_idle_too_long(self.config.idle_timeout);
            if stale {
                removed += 1;
            }
            !stale
        });

        if removed > 0 {
            self.total_connections.fetch_sub(removed, Ordering::SeqCst);
            debug!(removed, "evicted stale connections");
        }

        available.pop_front()
    }

    /// Create a new connection if under limit
    fn try_create_connection(&self) -> Option<Connection> {
        let reserved = self
            .total_connections
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |total| {
                (total < self.config.max_connections).then_some(total + 1)
            });

        reserved.ok().map(|_| self.open_connection())
    }

    fn open_connection(&self) -> Connection {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        Connection::new(id, Arc::clone(&self.storage), self.config.snapshot_reads)
    }

    async fn ensure_min_connections(&self) {
        let mut available = self.available.lock().await;

        while self.total_connections.load(Ordering::SeqCst) < self.config.min_connections {
            available.push_back(PooledConnection::new(self.open_connection()));
            self.total_connections.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Get pool statistics
    pub async fn stats(&self) -> PoolStats {
        let available = self.available.lock().await;
        let total = self.total_connections.load(Ordering::SeqCst);

        PoolStats {
            total_connections: total,
            available_connections: available.len(),
            active_connections: total.saturating_sub(available.len()),
            max_connections: self.config.max_connections,
        }
    }
}

#[async_trait]
impl SessionSource for ConnectionPool {
    type Session = PoolGuard;

    async fn acquire(&self) -> Result<PoolGuard> {
        self.get_connection().await
    }
}

/// Connection pool statistics
#[derive(Debug, Clone)]
pub struct PoolStats {
    pub total_connections: usize,
    pub available_connections: usize,
    pub active_connections: usize,
    pub max_connections: usize,
}

impl std::fmt::Display for PoolStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Pool Stats: {}/{} active, {} available, max {}",
            self.active_connections,
            self.total_connections,
            self.available_connections,
            self.max_connections
        )
    }
}

/// RAII guard for pooled connections
///
/// Returns the connection to the pool when closed or dropped
pub struct PoolGuard {
    connection: Option<Connection>,
    created_at: Instant,
    pool: Arc<Mutex<VecDeque<PooledConnection>>>,
    total_connections: Arc<AtomicUsize>,
}

impl PoolGuard {
    /// Get a reference to the connection
    pub fn connection(&mut self) -> Result<&mut Connection> {
        self.connection
            .as_mut()
            .ok_or_else(|| DbError::StoreUnavailable("Connection already returned to pool".into()))
    }
}

#[async_trait]
impl StoreSession for PoolGuard {
    async fn fetch(&mut self, plan: &SelectPlan) -> Result<Vec<Row>> {
        self.connection()?.fetch(plan).await
    }

    async fn count(&mut self, entity: &str, predicate: Option<&Predicate>) -> Result<u64> {
        self.connection()?.count(entity, predicate).await
    }

    async fn fetch_counted(&mut self, plan: &SelectPlan) -> Result<CountedRows> {
        self.connection()?.fetch_counted(plan).await
    }

    async fn insert(&mut self, entity: &str, row: Row) -> Result<()> {
        self.connection()?.insert(entity, row).await
    }

    async fn update(
        &mut self,
        entity: &str,
        predicate: &Predicate,
        changes: &[(String, Value)],
    ) -> Result<Vec<Row>> {
        self.connection()?.update(entity, predicate, changes).await
    }

    async fn delete(&mut self, entity: &str, predicate: &Predicate) -> Result<u64> {
        self.connection()?.delete(entity, predicate).await
    }

    /// Explicitly return the connection to the pool.
    async fn close(mut self) -> Result<()> {
        if let Some(connection) = self.connection.take() {
            debug!(connection = connection.id(), "returning connection to pool");
            let mut pool = self.pool.lock().await;
            pool.push_back(PooledConnection::returned(connection, self.created_at));
        }
        Ok(())
    }
}

impl Drop for PoolGuard {
    fn drop(&mut self) {
        if let Some(connection) = self.connection.take() {
            // close() was not called; return it only if the lock is free right now
            if let Ok(mut pool) = self.pool.try_lock() {
                pool.push_back(PooledConnection::returned(connection, self.created_at));
            } else {
                warn!(
                    connection = connection.id(),
                    "PoolGuard dropped while pool lock busy; connection discarded"
                );
                self.total_connections.fetch_sub(1, Ordering::SeqCst);
            }
        }
    }
}
