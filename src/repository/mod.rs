//! Per-entity data access, split into a read capability and a write one.
//!
//! [`EntityStore`] implements both over one descriptor and one session
//! source; callers that only read depend on [`FilterableRead`].

mod entity_store;
mod record;

pub use entity_store::EntityStore;
pub use record::Record;

use crate::core::{EntityDescriptor, Result, Value};
use crate::filter::FilterRequest;
use crate::result::QueryResult;
use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
pub trait FilterableRead: Send + Sync {
    fn descriptor(&self) -> &EntityDescriptor;

    /// Dynamic filter query with counts.
    async fn query(&self, request: &FilterRequest) -> Result<QueryResult>;

    /// First record whose `attribute` equals `value`.
    async fn get(&self, attribute: &str, value: &Value) -> Result<Option<Record>>;

    /// Number of records, optionally only those where `attribute == value`.
    async fn count(&self, filter: Option<(&str, &Value)>) -> Result<u64>;

    /// Fails with `ConstraintViolation` when `attribute == value` already exists.
    async fn unique_verify(&self, attribute: &str, value: &Value) -> Result<()>;
}

#[async_trait]
pub trait MutableRecord: Send + Sync {
    /// Insert a record; `uuid` and `created_at` are filled when not given.
    async fn create(&self, values: Vec<(String, Value)>) -> Result<Record>;

    /// Apply `changes` to the record with `uuid` and stamp `updated_at`.
    async fn update(&self, uuid: Uuid, changes: Vec<(String, Value)>) -> Result<Record>;

    async fn remove(&self, uuid: Uuid) -> Result<()>;
}
