use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{Employee, Role};
use crate::database::ports::{EmployeeRepository, EmployeeTransaction, HealthCheck, RoleRepository};
use crate::database::repository::{contains_pattern, Repository, COLUMNS};

const EMPLOYEE_TABLE: &str = "employee";
const ROLE_TABLE: &str = "role";

// `$n::text IS NULL` lets one statement serve both the filtered and unfiltered case.
// Backslash is the default LIKE escape character in Postgres.
const NAME_FILTER: &str = "($1::text IS NULL OR name ILIKE $1)";

/// sqlx-backed implementation of every store port.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
    employees: Repository<Employee>,
    roles: Repository<Role>,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            employees: Repository::new(EMPLOYEE_TABLE, pool.clone()),
            roles: Repository::new(ROLE_TABLE, pool.clone()),
            pool,
        }
    }
}

pub struct PgEmployeeTransaction {
    tx: Transaction<'static, Postgres>,
}

fn filter_pattern(name_filter: Option<&str>) -> Option<String> {
    name_filter.map(contains_pattern)
}

#[async_trait]
impl EmployeeTransaction for PgEmployeeTransaction {
    async fn exists_by_name(&mut self, name: &str) -> Result<bool, DatabaseError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM employee WHERE name = $1)")
            .bind(name)
            .fetch_one(&mut *self.tx)
            .await?;
        Ok(exists)
    }

    async fn insert(&mut self, name: &str) -> Result<i64, DatabaseError> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO employee (name, created_at, updated_at) VALUES ($1, now(), now()) RETURNING id",
        )
        .bind(name)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(id)
    }

    async fn find_page(
        &mut self,
        offset: i64,
        limit: i64,
        name_filter: Option<&str>,
    ) -> Result<Vec<Employee>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM employee WHERE {} ORDER BY id OFFSET $2 LIMIT $3",
            COLUMNS, NAME_FILTER
        );
        let rows = sqlx::query_as::<_, Employee>(&sql)
            .bind(filter_pattern(name_filter))
            .bind(offset)
            .bind(limit)
            .fetch_all(&mut *self.tx)
            .await?;
        Ok(rows)
    }

    async fn count(&mut self, name_filter: Option<&str>) -> Result<i64, DatabaseError> {
        let sql = format!("SELECT COUNT(*) FROM employee WHERE {}", NAME_FILTER);
        let total: i64 = sqlx::query_scalar(&sql)
            .bind(filter_pattern(name_filter))
            .fetch_one(&mut *self.tx)
            .await?;
        Ok(total)
    }

    async fn find_id_greater_than(
        &mut self,
        last_id: i64,
        limit: i64,
        name_filter: Option<&str>,
    ) -> Result<Vec<Employee>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM employee WHERE {} AND id > $2 ORDER BY id LIMIT $3",
            COLUMNS, NAME_FILTER
        );
        let rows = sqlx::query_as::<_, Employee>(&sql)
            .bind(filter_pattern(name_filter))
            .bind(last_id)
            .bind(limit)
            .fetch_all(&mut *self.tx)
            .await?;
        Ok(rows)
    }

    async fn commit(self: Box<Self>) -> Result<(), DatabaseError> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), DatabaseError> {
        self.tx.rollback().await?;
        Ok(())
    }
}

#[async_trait]
impl EmployeeRepository for PgStore {
    async fn begin(&self) -> Result<Box<dyn EmployeeTransaction>, DatabaseError> {
        let tx = self.pool.begin().await?;
        debug!("Began employee transaction");
        Ok(Box::new(PgEmployeeTransaction { tx }))
    }

    async fn begin_read_only(&self) -> Result<Box<dyn EmployeeTransaction>, DatabaseError> {
        let mut tx = self.pool.begin().await?;
        // Must be the first statement of the transaction.
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;
        debug!("Began read-only employee transaction");
        Ok(Box::new(PgEmployeeTransaction { tx }))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Employee>, DatabaseError> {
        self.employees.select_by_id(id).await
    }

    async fn find_all(&self) -> Result<Vec<Employee>, DatabaseError> {
        self.employees.select_all().await
    }

    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<Employee>, DatabaseError> {
        self.employees.select_ids(ids).await
    }

    async fn delete_by_id(&self, id: i64) -> Result<(), DatabaseError> {
        let affected = self.employees.delete_id(id).await?;
        debug!(id, affected, "Deleted employee");
        Ok(())
    }

    async fn delete_by_ids(&self, ids: &[i64]) -> Result<(), DatabaseError> {
        let affected = self.employees.delete_ids(ids).await?;
        debug!(requested = ids.len(), affected, "Deleted employees");
        Ok(())
    }
}

#[async_trait]
impl RoleRepository for PgStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Role>, DatabaseError> {
        self.roles.select_by_id(id).await
    }

    async fn find_all(&self) -> Result<Vec<Role>, DatabaseError> {
        self.roles.select_all().await
    }

    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<Role>, DatabaseError> {
        self.roles.select_ids(ids).await
    }

    async fn insert(&self, name: &str) -> Result<i64, DatabaseError> {
        self.roles.insert_name(name).await
    }

    async fn delete_by_id(&self, id: i64) -> Result<(), DatabaseError> {
        self.roles.delete_id(id).await?;
        Ok(())
    }

    async fn delete_by_ids(&self, ids: &[i64]) -> Result<(), DatabaseError> {
        self.roles.delete_ids(ids).await?;
        Ok(())
    }
}

#[async_trait]
impl HealthCheck for PgStore {
    async fn ping(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }
}
