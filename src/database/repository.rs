use sqlx::{postgres::PgRow, FromRow, PgPool};

use crate::database::manager::DatabaseError;

/// Column list shared by every named-entity table.
pub const COLUMNS: &str = "id, name, created_at, updated_at";

/// Generic access to a `(id, name, created_at, updated_at)` table.
///
/// `table_name` is always a compile-time constant from this crate and is
/// interpolated into SQL; every value goes through bind parameters.
pub struct Repository<T> {
    table_name: &'static str,
    pool: PgPool,
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            table_name: self.table_name,
            pool: self.pool.clone(),
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<T> Repository<T>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    pub fn new(table_name: &'static str, pool: PgPool) -> Self {
        Self {
            table_name,
            pool,
            _phantom: std::marker::PhantomData,
        }
    }

    pub async fn select_by_id(&self, id: i64) -> Result<Option<T>, DatabaseError> {
        let sql = format!("SELECT {} FROM {} WHERE id = $1", COLUMNS, self.table_name);
        let row = sqlx::query_as::<_, T>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn select_all(&self) -> Result<Vec<T>, DatabaseError> {
        let sql = format!("SELECT {} FROM {} ORDER BY id", COLUMNS, self.table_name);
        let rows = sqlx::query_as::<_, T>(&sql).fetch_all(&self.pool).await?;
        Ok(rows)
    }

    pub async fn select_ids(&self, ids: &[i64]) -> Result<Vec<T>, DatabaseError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let sql = format!(
            "SELECT {} FROM {} WHERE id = ANY($1) ORDER BY id",
            COLUMNS, self.table_name
        );
        let rows = sqlx::query_as::<_, T>(&sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn insert_name(&self, name: &str) -> Result<i64, DatabaseError> {
        let sql = format!(
            "INSERT INTO {} (name, created_at, updated_at) VALUES ($1, now(), now()) RETURNING id",
            self.table_name
        );
        let id: i64 = sqlx::query_scalar(&sql)
            .bind(name)
            .fetch_one(&self.pool)
            .await?;
        Ok(id)
    }

    pub async fn delete_id(&self, id: i64) -> Result<u64, DatabaseError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", self.table_name);
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    pub async fn delete_ids(&self, ids: &[i64]) -> Result<u64, DatabaseError> {
        if ids.is_empty() {
            return Ok(0);
        }
        let sql = format!("DELETE FROM {} WHERE id = ANY($1)", self.table_name);
        let result = sqlx::query(&sql).bind(ids).execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}

/// Turn free text into an `ILIKE` pattern that matches it as a substring.
///
/// `%`, `_` and `\` in the input are escaped so they match literally.
pub fn contains_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
