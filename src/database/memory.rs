//! In-process store used for local runs (`DB_DRIVER_NAME=memory`) and tests.
//!
//! Transactions see committed rows plus their own staged inserts. Staged rows
//! become visible to others on commit and vanish on rollback or drop. Ids are
//! allocated eagerly, so an aborted insert leaves a gap like a database sequence.
//! Read-only transactions copy the committed rows at begin and never see later commits.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::database::manager::DatabaseError;
use crate::database::models::{Employee, Role};
use crate::database::ports::{EmployeeRepository, EmployeeTransaction, HealthCheck, RoleRepository};

struct Table<T> {
    rows: BTreeMap<i64, T>,
    next_id: i64,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl<T> Table<T> {
    fn allocate_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    employees: Arc<RwLock<Table<Employee>>>,
    roles: Arc<RwLock<Table<Role>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn name_matches(name: &str, filter: Option<&str>) -> bool {
    match filter {
        None => true,
        Some(text) => name.to_lowercase().contains(&text.to_lowercase()),
    }
}

pub struct MemoryEmployeeTransaction {
    table: Arc<RwLock<Table<Employee>>>,
    staged: Vec<Employee>,
    snapshot: Option<BTreeMap<i64, Employee>>,
}

impl MemoryEmployeeTransaction {
    /// Committed rows (or the snapshot) plus staged ones, ascending by id.
    async fn visible(&self, name_filter: Option<&str>) -> Vec<Employee> {
        let matches = |e: &&Employee| name_matches(&e.name, name_filter);
        let mut rows: Vec<Employee> = match &self.snapshot {
            Some(rows) => rows.values().filter(matches).cloned().collect(),
            None => {
                let table = self.table.read().await;
                table
                    .rows
                    .values()
                    .chain(self.staged.iter())
                    .filter(matches)
                    .cloned()
                    .collect()
            }
        };
        rows.sort_by_key(|e| e.id);
        rows
    }
}

#[async_trait]
impl EmployeeTransaction for MemoryEmployeeTransaction {
    async fn exists_by_name(&mut self, name: &str) -> Result<bool, DatabaseError> {
        Ok(self.visible(None).await.iter().any(|e| e.name == name))
    }

    async fn insert(&mut self, name: &str) -> Result<i64, DatabaseError> {
        if self.snapshot.is_some() {
            return Err(DatabaseError::QueryError("insert in a read-only transaction".into()));
        }
        let id = self.table.write().await.allocate_id();
        let now = Utc::now();
        self.staged.push(Employee {
            id,
            name: name.to_string(),
            created_at: now,
            updated_at: now,
        });
        Ok(id)
    }

    async fn find_page(
        &mut self,
        offset: i64,
        limit: i64,
        name_filter: Option<&str>,
    ) -> Result<Vec<Employee>, DatabaseError> {
        let offset = usize::try_from(offset).map_err(|_| DatabaseError::QueryError("negative offset".into()))?;
        let limit = usize::try_from(limit).map_err(|_| DatabaseError::QueryError("negative limit".into()))?;
        Ok(self
            .visible(name_filter)
            .await
            .into_iter()
            .skip(offset)
            .take(limit)
            .collect())
    }

    async fn count(&mut self, name_filter: Option<&str>) -> Result<i64, DatabaseError> {
        Ok(self.visible(name_filter).await.len() as i64)
    }

    async fn find_id_greater_than(
        &mut self,
        last_id: i64,
        limit: i64,
        name_filter: Option<&str>,
    ) -> Result<Vec<Employee>, DatabaseError> {
        let limit = usize::try_from(limit).map_err(|_| DatabaseError::QueryError("negative limit".into()))?;
        Ok(self
            .visible(name_filter)
            .await
            .into_iter()
            .filter(|e| e.id > last_id)
            .take(limit)
            .collect())
    }

    async fn commit(self: Box<Self>) -> Result<(), DatabaseError> {
        let this = *self;
        let mut table = this.table.write().await;
        for row in this.staged {
            table.rows.insert(row.id, row);
        }
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), DatabaseError> {
        Ok(())
    }
}

#[async_trait]
impl EmployeeRepository for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn EmployeeTransaction>, DatabaseError> {
        Ok(Box::new(MemoryEmployeeTransaction {
            table: Arc::clone(&self.employees),
            staged: Vec::new(),
            snapshot: None,
        }))
    }

    async fn begin_read_only(&self) -> Result<Box<dyn EmployeeTransaction>, DatabaseError> {
        let snapshot = self.employees.read().await.rows.clone();
        Ok(Box::new(MemoryEmployeeTransaction {
            table: Arc::clone(&self.employees),
            staged: Vec::new(),
            snapshot: Some(snapshot),
        }))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Employee>, DatabaseError> {
        Ok(self.employees.read().await.rows.get(&id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Employee>, DatabaseError> {
        Ok(self.employees.read().await.rows.values().cloned().collect())
    }

    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<Employee>, DatabaseError> {
        let table = self.employees.read().await;
        Ok(table
            .rows
            .values()
            .filter(|e| ids.contains(&e.id))
            .cloned()
            .collect())
    }

    async fn delete_by_id(&self, id: i64) -> Result<(), DatabaseError> {
        self.employees.write().await.rows.remove(&id);
        Ok(())
    }

    async fn delete_by_ids(&self, ids: &[i64]) -> Result<(), DatabaseError> {
        let mut table = self.employees.write().await;
        for id in ids {
            table.rows.remove(id);
        }
        Ok(())
    }
}

#[async_trait]
impl RoleRepository for MemoryStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Role>, DatabaseError> {
        Ok(self.roles.read().await.rows.get(&id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Role>, DatabaseError> {
        Ok(self.roles.read().await.rows.values().cloned().collect())
    }

    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<Role>, DatabaseError> {
        let table = self.roles.read().await;
        Ok(table
            .rows
            .values()
            .filter(|r| ids.contains(&r.id))
            .cloned()
            .collect())
    }

    async fn insert(&self, name: &str) -> Result<i64, DatabaseError> {
        let mut table = self.roles.write().await;
        let id = table.allocate_id();
        let now = Utc::now();
        table.rows.insert(
            id,
            Role {
                id,
                name: name.to_string(),
                created_at: now,
                updated_at: now,
            },
        );
        Ok(id)
    }

    async fn delete_by_id(&self, id: i64) -> Result<(), DatabaseError> {
        self.roles.write().await.rows.remove(&id);
        Ok(())
    }

    async fn delete_by_ids(&self, ids: &[i64]) -> Result<(), DatabaseError> {
        let mut table = self.roles.write().await;
        for id in ids {
            table.rows.remove(id);
        }
        Ok(())
    }
}

#[async_trait]
impl HealthCheck for MemoryStore {
    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}
