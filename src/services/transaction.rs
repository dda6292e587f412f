use std::any::Any;
use std::panic::AssertUnwindSafe;

use futures::future::BoxFuture;
use futures::FutureExt;
use tracing::{error, warn};

use crate::database::{DatabaseError, EmployeeRepository, EmployeeTransaction};
use crate::services::error::ServiceError;

/// Run `body` inside one store transaction.
///
/// Commits when `body` returns `Ok`. Rolls back when it returns `Err` or panics;
/// a panic becomes a [`ServiceError::Store`] wrapping [`DatabaseError::Panicked`].
/// A failed commit is returned as the operation's error.
pub async fn in_transaction<T, F>(
    repo: &dyn EmployeeRepository,
    operation: &str,
    body: F,
) -> Result<T, ServiceError>
where
    T: Send,
    F: for<'t> FnOnce(&'t mut dyn EmployeeTransaction) -> BoxFuture<'t, Result<T, ServiceError>>,
{
    let tx = repo
        .begin()
        .await
        .map_err(|e| ServiceError::store(format!("{}: begin transaction", operation), e))?;
    run(tx, operation, body).await
}

/// Like [`in_transaction`], over a read-only transaction with one snapshot.
pub async fn in_read_transaction<T, F>(
    repo: &dyn EmployeeRepository,
    operation: &str,
    body: F,
) -> Result<T, ServiceError>
where
    T: Send,
    F: for<'t> FnOnce(&'t mut dyn EmployeeTransaction) -> BoxFuture<'t, Result<T, ServiceError>>,
{
    let tx = repo
        .begin_read_only()
        .await
        .map_err(|e| ServiceError::store(format!("{}: begin read-only transaction", operation), e))?;
    run(tx, operation, body).await
}

async fn run<T, F>(mut tx: Box<dyn EmployeeTransaction>, operation: &str, body: F) -> Result<T, ServiceError>
where
    T: Send,
    F: for<'t> FnOnce(&'t mut dyn EmployeeTransaction) -> BoxFuture<'t, Result<T, ServiceError>>,
{
    let outcome = AssertUnwindSafe(body(tx.as_mut())).catch_unwind().await;

    match outcome {
        Ok(Ok(value)) => {
            tx.commit()
                .await
                .map_err(|e| ServiceError::store(format!("{}: commit", operation), e))?;
            Ok(value)
        }
        Ok(Err(err)) => {
            rollback(tx, operation).await;
            Err(err)
        }
        Err(panic) => {
            let panic_msg = panic_message(panic.as_ref());
            error!(operation, panic_msg = %panic_msg, "Transaction body panicked, rolling back");
            rollback(tx, operation).await;
            Err(ServiceError::store(operation, DatabaseError::Panicked(panic_msg)))
        }
    }
}

async fn rollback(tx: Box<dyn EmployeeTransaction>, operation: &str) {
    if let Err(e) = tx.rollback().await {
        warn!(operation, error = %e, "Rollback failed");
    }
}

/// Text of a panic payload, for logs.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use crate::services::error::ErrorKind;

    async fn row_count(store: &MemoryStore) -> usize {
        EmployeeRepository::find_all(store).await.unwrap().len()
    }

    #[tokio::test]
    async fn commits_on_success() {
        let store = MemoryStore::new();
        let id = in_transaction(&store, "Add", |tx| {
            Box::pin(async move {
                tx.insert("Ada")
                    .await
                    .map_err(|e| ServiceError::store("Insert", e))
            })
        })
        .await
        .unwrap();

        assert!(id > 0);
        assert_eq!(row_count(&store).await, 1);
    }

    #[tokio::test]
    async fn rolls_back_on_error() {
        let store = MemoryStore::new();
        let err = in_transaction(&store, "Add", |tx| {
            Box::pin(async move {
                tx.insert("Ada")
                    .await
                    .map_err(|e| ServiceError::store("Insert", e))?;
                Err::<(), _>(ServiceError::already_exists("employee", "Ada"))
            })
        })
        .await
        .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
        assert_eq!(row_count(&store).await, 0);
    }

    #[tokio::test]
    async fn contains_panics_and_rolls_back() {
        let store = MemoryStore::new();
        let err = in_transaction(&store, "Add", |tx| {
            Box::pin(async move {
                tx.insert("Ada")
                    .await
                    .map_err(|e| ServiceError::store("Insert", e))?;
                if tx.exists_by_name("Ada").await.unwrap_or(false) {
                    panic!("insert exploded");
                }
                Ok(())
            })
        })
        .await
        .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Store);
        assert!(err.to_string().contains("insert exploded"), "{err}");
        assert_eq!(row_count(&store).await, 0);
    }

    #[tokio::test]
    async fn read_transaction_refuses_writes() {
        let store = MemoryStore::new();
        let err = in_read_transaction(&store, "GetPage", |tx| {
            Box::pin(async move {
                tx.insert("Ada")
                    .await
                    .map_err(|e| ServiceError::store("Insert", e))
            })
        })
        .await
        .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Store);
        assert_eq!(row_count(&store).await, 0);
    }

    #[test]
    fn panic_payloads() {
        assert_eq!(panic_message(&"static"), "static");
        assert_eq!(panic_message(&String::from("owned")), "owned");
        assert_eq!(panic_message(&42_u8), "Unknown panic");
    }
}
