#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use dashstore::models::{self, role};
use dashstore::{
    Column, ConnectionConfig, ConnectionPool, DataType, Dashboard, EntityDescriptor, EntityStore,
    FilterEngine, FilterableRead, InMemoryStorage, MutableRecord, PoolGuard, SessionSource, Value,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

pub const ROLE_COUNT: i64 = 25;
pub const EVENT_COUNT: i64 = 10;

pub fn role_name(i: i64) -> String {
    format!("role-{:02}", i)
}

/// Roles `role-00` .. `role-24` with `access_level == i`; only even roles
/// carry a description.
pub async fn seed_roles<R>(roles: &R)
where
    R: FilterableRead + MutableRecord + ?Sized,
{
    for i in 0..ROLE_COUNT {
        let description = (i % 2 == 0).then(|| format!("even role {}", i));
        role::create(roles, &role_name(i), i, description.as_deref())
            .await
            .unwrap();
    }
}

pub async fn seeded_dashboard() -> Dashboard {
    let dashboard = Dashboard::open(ConnectionConfig::default()).await.unwrap();
    seed_roles(&dashboard.store("role").unwrap()).await;
    dashboard
}

/// Pool wrapper that counts how many sessions were requested.
pub struct CountingSource {
    pool: ConnectionPool,
    acquired: AtomicUsize,
}

impl CountingSource {
    pub fn new(pool: ConnectionPool) -> Self {
        Self {
            pool,
            acquired: AtomicUsize::new(0),
        }
    }

    pub fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }

    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }
}

#[async_trait]
impl SessionSource for CountingSource {
    type Session = PoolGuard;

    async fn acquire(&self) -> dashstore::Result<PoolGuard> {
        self.acquired.fetch_add(1, Ordering::SeqCst);
        self.pool.acquire().await
    }
}

/// Seeded role store whose session requests can be observed.
pub async fn counting_roles() -> (EntityStore<CountingSource>, Arc<CountingSource>) {
    let catalog = models::catalog().unwrap();
    let storage = InMemoryStorage::from_catalog(&catalog).unwrap();
    let pool = ConnectionPool::new(ConnectionConfig::default(), Arc::new(storage))
        .await
        .unwrap();

    let source = Arc::new(CountingSource::new(pool));
    let roles = EntityStore::new(
        catalog.attributes_of("role").unwrap(),
        FilterEngine::new(Arc::clone(&source)),
    );
    seed_roles(&roles).await;
    (roles, source)
}

/// Entity with one column of every ordered type.
pub fn event_descriptor() -> EntityDescriptor {
    EntityDescriptor::new(
        "event",
        vec![
            Column::new("id", DataType::Integer).primary_key(),
            Column::new("title", DataType::Text),
            Column::new("score", DataType::Float),
            Column::new("day", DataType::Date),
            Column::new("starts", DataType::Time),
            Column::new("happened_at", DataType::Timestamp),
            Column::new("public", DataType::Boolean),
        ],
    )
}

/// Event `i` (0-based) scores `1.5 * i`, falls on 2024-01-(i+1), starts at
/// `8 + i` o'clock and happened at noon that day.
pub async fn event_engine() -> (FilterEngine<ConnectionPool>, EntityDescriptor) {
    let descriptor = event_descriptor();
    let mut storage = InMemoryStorage::new();
    storage.create_table(descriptor.clone()).unwrap();

    for i in 0..EVENT_COUNT {
        let day = NaiveDate::from_ymd_opt(2024, 1, i as u32 + 1).unwrap();
        storage
            .insert_row(
                "event",
                vec![
                    Value::Integer(i),
                    Value::from(format!("event {}", i)),
                    Value::Float(i as f64 * 1.5),
                    Value::Date(day),
                    Value::Time(NaiveTime::from_hms_opt(8 + i as u32, 0, 0).unwrap()),
                    Value::Timestamp(day.and_hms_opt(12, 0, 0).unwrap()),
                    Value::Boolean(i % 2 == 0),
                ],
            )
            .await
            .unwrap();
    }

    let pool = ConnectionPool::new(ConnectionConfig::default(), Arc::new(storage))
        .await
        .unwrap();
    (FilterEngine::new(Arc::new(pool)), descriptor)
}

/// `name` of every returned role row, in order.
pub fn names(result: &dashstore::QueryResult) -> Vec<String> {
    result
        .column_values("name")
        .into_iter()
        .map(|v| v.to_string())
        .collect()
}
