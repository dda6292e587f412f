//! Store contracts consumed by the service layer.
//!
//! Services hold `Arc<dyn ...>` handles to these traits; the Postgres and
//! in-memory adapters implement them.

use async_trait::async_trait;

use crate::database::manager::DatabaseError;
use crate::database::models::{Employee, Role};

/// One open unit of work against the employee table.
///
/// A transaction is owned by the operation that began it and is never shared.
/// Dropping it without calling [`commit`](EmployeeTransaction::commit) discards
/// its writes.
#[async_trait]
pub trait EmployeeTransaction: Send {
    async fn exists_by_name(&mut self, name: &str) -> Result<bool, DatabaseError>;

    /// Insert a row; the store assigns `id` and both timestamps.
    async fn insert(&mut self, name: &str) -> Result<i64, DatabaseError>;

    /// Rows matching `name_filter`, ordered by `id`, after skipping `offset`.
    async fn find_page(
        &mut self,
        offset: i64,
        limit: i64,
        name_filter: Option<&str>,
    ) -> Result<Vec<Employee>, DatabaseError>;

    async fn count(&mut self, name_filter: Option<&str>) -> Result<i64, DatabaseError>;

    /// Rows with `id > last_id` matching `name_filter`, ascending by `id`.
    async fn find_id_greater_than(
        &mut self,
        last_id: i64,
        limit: i64,
        name_filter: Option<&str>,
    ) -> Result<Vec<Employee>, DatabaseError>;

    async fn commit(self: Box<Self>) -> Result<(), DatabaseError>;

    async fn rollback(self: Box<Self>) -> Result<(), DatabaseError>;
}

#[async_trait]
pub trait EmployeeRepository: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn EmployeeTransaction>, DatabaseError>;

    /// Read-only transaction in which every statement sees the same snapshot.
    async fn begin_read_only(&self) -> Result<Box<dyn EmployeeTransaction>, DatabaseError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Employee>, DatabaseError>;

    async fn find_all(&self) -> Result<Vec<Employee>, DatabaseError>;

    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<Employee>, DatabaseError>;

    async fn delete_by_id(&self, id: i64) -> Result<(), DatabaseError>;

    async fn delete_by_ids(&self, ids: &[i64]) -> Result<(), DatabaseError>;
}

#[async_trait]
pub trait RoleRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Role>, DatabaseError>;

    async fn find_all(&self) -> Result<Vec<Role>, DatabaseError>;

    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<Role>, DatabaseError>;

    async fn insert(&self, name: &str) -> Result<i64, DatabaseError>;

    async fn delete_by_id(&self, id: i64) -> Result<(), DatabaseError>;

    async fn delete_by_ids(&self, ids: &[i64]) -> Result<(), DatabaseError>;
}

/// Liveness check for the backing store.
#[async_trait]
pub trait HealthCheck: Send + Sync {
    async fn ping(&self) -> Result<(), DatabaseError>;
}
