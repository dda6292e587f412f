use std::sync::Arc;

use tracing::{info, instrument};

use crate::database::models::Role;
use crate::database::RoleRepository;
use crate::services::dto::{IdRequest, IdsRequest, NameRequest};
use crate::services::error::ServiceError;
use crate::services::validation::validate;

/// Role use cases: plain CRUD, each call a single store round-trip.
#[derive(Clone)]
pub struct RoleService {
    repo: Arc<dyn RoleRepository>,
}

impl RoleService {
    pub fn new(repo: Arc<dyn RoleRepository>) -> Self {
        Self { repo }
    }

    // Role names are not checked for uniqueness.
    #[instrument(name = "idm.role.add", skip(self, request), fields(name = %request.name))]
    pub async fn add(&self, request: NameRequest) -> Result<i64, ServiceError> {
        validate(&request)?;
        let id = self
            .repo
            .insert(&request.name)
            .await
            .map_err(|e| ServiceError::store("Insert", e))?;
        info!(id, "Role created");
        Ok(id)
    }

    #[instrument(name = "idm.role.find_by_id", skip(self), fields(id = request.id))]
    pub async fn find_by_id(&self, request: IdRequest) -> Result<Role, ServiceError> {
        validate(&request)?;
        let id = request.id;
        self.repo
            .find_by_id(id)
            .await
            .map_err(|e| ServiceError::store(format!("FindById({})", id), e))?
            .ok_or_else(|| ServiceError::not_found(format!("role with id {} not found", id)))
    }

    #[instrument(name = "idm.role.get_all", skip(self))]
    pub async fn get_all(&self) -> Result<Vec<Role>, ServiceError> {
        self.repo
            .find_all()
            .await
            .map_err(|e| ServiceError::store("GetAll", e))
    }

    #[instrument(name = "idm.role.get_group_by_id", skip(self, request), fields(count = request.ids.len()))]
    pub async fn get_group_by_id(&self, request: IdsRequest) -> Result<Vec<Role>, ServiceError> {
        validate(&request)?;
        self.repo
            .find_by_ids(&request.ids)
            .await
            .map_err(|e| ServiceError::store(format!("FindByIds({:?})", request.ids), e))
    }

    #[instrument(name = "idm.role.delete", skip(self), fields(id = request.id))]
    pub async fn delete(&self, request: IdRequest) -> Result<(), ServiceError> {
        validate(&request)?;
        self.repo
            .delete_by_id(request.id)
            .await
            .map_err(|e| ServiceError::store(format!("DeleteById({})", request.id), e))
    }

    #[instrument(name = "idm.role.delete_group", skip(self, request), fields(count = request.ids.len()))]
    pub async fn delete_group(&self, request: IdsRequest) -> Result<(), ServiceError> {
        validate(&request)?;
        self.repo
            .delete_by_ids(&request.ids)
            .await
            .map_err(|e| ServiceError::store(format!("DeleteByIds({:?})", request.ids), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use crate::services::error::ErrorKind;

    fn service() -> RoleService {
        RoleService::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn duplicate_role_names_are_allowed() {
        let service = service();
        let a = service.add(NameRequest { name: "admin".into() }).await.unwrap();
        let b = service.add(NameRequest { name: "admin".into() }).await.unwrap();
        assert_ne!(a, b);
        assert_eq!(service.get_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn crud_round() {
        let service = service();
        let id = service.add(NameRequest { name: "auditor".into() }).await.unwrap();

        let role = service.find_by_id(IdRequest { id }).await.unwrap();
        assert_eq!(role.name, "auditor");

        service.delete(IdRequest { id }).await.unwrap();
        let err = service.find_by_id(IdRequest { id }).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn rejects_bad_input() {
        let service = service();
        let err = service.add(NameRequest { name: "x".into() }).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        let err = service.delete_group(IdsRequest { ids: vec![-1] }).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}
