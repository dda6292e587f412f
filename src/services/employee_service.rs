use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, instrument, warn};

use crate::database::models::Employee;
use crate::database::EmployeeRepository;
use crate::services::dto::{
    normalize_filter, IdRequest, IdsRequest, NameRequest, PageKeySetRequest, PageKeySetResponse,
    PageRequest, PageResponse,
};
use crate::services::error::ServiceError;
use crate::services::transaction::{in_read_transaction, in_transaction};
use crate::services::validation::validate;

/// Employee use cases. Depends only on the repository port.
#[derive(Clone)]
pub struct EmployeeService {
    repo: Arc<dyn EmployeeRepository>,
    get_all_timeout: Duration,
}

impl EmployeeService {
    pub fn new(repo: Arc<dyn EmployeeRepository>, get_all_timeout: Duration) -> Self {
        Self {
            repo,
            get_all_timeout,
        }
    }

    /// Create an employee unless one with the same name exists.
    ///
    /// The existence check and insert share one transaction. Without a unique
    /// index this is still best effort under concurrent writers.
    #[instrument(name = "idm.employee.add", skip(self, request), fields(name = %request.name))]
    pub async fn add(&self, request: NameRequest) -> Result<i64, ServiceError> {
        validate(&request)?;
        let name = request.name;

        let id = in_transaction(self.repo.as_ref(), "Add", move |tx| {
            Box::pin(async move {
                let exists = tx
                    .exists_by_name(&name)
                    .await
                    .map_err(|e| ServiceError::store(format!("ExistsByName({})", name), e))?;
                if exists {
                    return Err(ServiceError::already_exists("employee", name));
                }
                tx.insert(&name)
                    .await
                    .map_err(|e| ServiceError::store("Insert", e))
            })
        })
        .await?;

        info!(id, "Employee created");
        Ok(id)
    }

    /// Offset page. `total` and the rows come from the same snapshot.
    #[instrument(
        name = "idm.employee.get_page",
        skip(self, request),
        fields(page_number = request.page_number, page_size = request.page_size)
    )]
    pub async fn get_page(&self, request: PageRequest) -> Result<PageResponse<Employee>, ServiceError> {
        validate(&request)?;
        let offset = request
            .offset()
            .ok_or_else(|| ServiceError::validation("page_number: offset out of range"))?;
        let page_size = request.page_size;
        let page_number = request.page_number;
        let filter = normalize_filter(request.text_filter.as_deref()).map(str::to_owned);

        let (result, total) = in_read_transaction(self.repo.as_ref(), "GetPage", move |tx| {
            Box::pin(async move {
                let rows = tx
                    .find_page(offset, page_size, filter.as_deref())
                    .await
                    .map_err(|e| ServiceError::store(format!("FindPage(offset={})", offset), e))?;
                let total = tx
                    .count(filter.as_deref())
                    .await
                    .map_err(|e| ServiceError::store("Count", e))?;
                Ok((rows, total))
            })
        })
        .await?;

        debug!(returned = result.len(), total, "Fetched employee page");
        Ok(PageResponse {
            result,
            page_size,
            page_number,
            total,
        })
    }

    /// Keyset page over `id > last_id`. `total` ignores the cursor.
    #[instrument(
        name = "idm.employee.get_key_set_page",
        skip(self, request),
        fields(last_id = request.last_id, page_size = request.page_size)
    )]
    pub async fn get_key_set_page(
        &self,
        request: PageKeySetRequest,
    ) -> Result<PageKeySetResponse<Employee>, ServiceError> {
        validate(&request)?;
        if !request.is_next {
            debug!("Backward keyset traversal requested, serving forward page");
        }
        let last_id = request.last_id;
        let page_size = request.page_size;
        let filter = normalize_filter(request.text_filter.as_deref()).map(str::to_owned);

        let (result, total) = in_read_transaction(self.repo.as_ref(), "GetKeySetPage", move |tx| {
            Box::pin(async move {
                let rows = tx
                    .find_id_greater_than(last_id, page_size, filter.as_deref())
                    .await
                    .map_err(|e| ServiceError::store(format!("FindByIdGreaterThan({})", last_id), e))?;
                let total = tx
                    .count(filter.as_deref())
                    .await
                    .map_err(|e| ServiceError::store("Count", e))?;
                Ok((rows, total))
            })
        })
        .await?;

        debug!(returned = result.len(), total, "Fetched employee keyset page");
        Ok(PageKeySetResponse {
            result,
            last_id,
            total,
        })
    }

    #[instrument(name = "idm.employee.find_by_id", skip(self), fields(id = request.id))]
    pub async fn find_by_id(&self, request: IdRequest) -> Result<Employee, ServiceError> {
        validate(&request)?;
        let id = request.id;
        self.repo
            .find_by_id(id)
            .await
            .map_err(|e| ServiceError::store(format!("FindById({})", id), e))?
            .ok_or_else(|| ServiceError::not_found(format!("employee with id {} not found", id)))
    }

    /// All employees, bounded by the configured wait.
    #[instrument(name = "idm.employee.get_all", skip(self))]
    pub async fn get_all(&self) -> Result<Vec<Employee>, ServiceError> {
        match tokio::time::timeout(self.get_all_timeout, self.repo.find_all()).await {
            Ok(rows) => rows.map_err(|e| ServiceError::store("GetAll", e)),
            Err(_) => {
                warn!(timeout_ms = self.get_all_timeout.as_millis() as u64, "GetAll timed out");
                Err(ServiceError::timeout("GetAll"))
            }
        }
    }

    #[instrument(name = "idm.employee.get_group_by_id", skip(self, request), fields(count = request.ids.len()))]
    pub async fn get_group_by_id(&self, request: IdsRequest) -> Result<Vec<Employee>, ServiceError> {
        validate(&request)?;
        self.repo
            .find_by_ids(&request.ids)
            .await
            .map_err(|e| ServiceError::store(format!("FindByIds({:?})", request.ids), e))
    }

    /// Deleting an absent id succeeds.
    #[instrument(name = "idm.employee.delete", skip(self), fields(id = request.id))]
    pub async fn delete(&self, request: IdRequest) -> Result<(), ServiceError> {
        validate(&request)?;
        self.repo
            .delete_by_id(request.id)
            .await
            .map_err(|e| ServiceError::store(format!("DeleteById({})", request.id), e))?;
        info!("Employee deleted");
        Ok(())
    }

    #[instrument(name = "idm.employee.delete_group", skip(self, request), fields(count = request.ids.len()))]
    pub async fn delete_group(&self, request: IdsRequest) -> Result<(), ServiceError> {
        validate(&request)?;
        self.repo
            .delete_by_ids(&request.ids)
            .await
            .map_err(|e| ServiceError::store(format!("DeleteByIds({:?})", request.ids), e))?;
        info!("Employees deleted");
        Ok(())
    }
}
