//! Health record service.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::checks::{attachable_pet, check_veterinarian, pet_in_scope};
use crate::domain::{CreateHealthRecord, CurrentUser, HealthRecord, UpdateHealthRecord};
use crate::errors::{AppResult, OptionExt};
use crate::infra::UnitOfWork;
use crate::types::{Page, PaginationParams};

#[async_trait]
pub trait HealthRecordService: Send + Sync {
    async fn list(
        &self,
        requester: &CurrentUser,
        params: PaginationParams,
    ) -> AppResult<Page<HealthRecord>>;

    async fn my_pets(
        &self,
        requester: &CurrentUser,
        params: PaginationParams,
    ) -> AppResult<Page<HealthRecord>>;

    /// Records of one live pet, newest first. 404 for a missing pet,
    /// 403 for someone else's.
    async fn list_for_pet(
        &self,
        requester: &CurrentUser,
        pet_id: Uuid,
        params: PaginationParams,
    ) -> AppResult<Page<HealthRecord>>;

    async fn get(&self, requester: &CurrentUser, id: Uuid) -> AppResult<HealthRecord>;

    async fn create(
        &self,
        requester: &CurrentUser,
        input: CreateHealthRecord,
    ) -> AppResult<HealthRecord>;

    async fn update(
        &self,
        requester: &CurrentUser,
        id: Uuid,
        changes: UpdateHealthRecord,
    ) -> AppResult<HealthRecord>;

    async fn delete(&self, requester: &CurrentUser, id: Uuid) -> AppResult<()>;
}

pub struct HealthRecordManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> HealthRecordManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    async fn visible(&self, requester: &CurrentUser, id: Uuid) -> AppResult<HealthRecord> {
        let record = self
            .uow
            .health_records()
            .find_by_id(id)
            .await?
            .ok_or_not_found()?;
        pet_in_scope(self.uow.pets().as_ref(), requester, record.pet_id).await?;
        Ok(record)
    }
}

#[async_trait]
impl<U: UnitOfWork> HealthRecordService for HealthRecordManager<U> {
    async fn list(
        &self,
        requester: &CurrentUser,
        params: PaginationParams,
    ) -> AppResult<Page<HealthRecord>> {
        self.uow
            .health_records()
            .list(requester.owner_filter(), None, params)
            .await
    }

    async fn my_pets(
        &self,
        requester: &CurrentUser,
        params: PaginationParams,
    ) -> AppResult<Page<HealthRecord>> {
        self.uow
            .health_records()
            .list(Some(requester.id), None, params)
            .await
    }

    async fn list_for_pet(
        &self,
        requester: &CurrentUser,
        pet_id: Uuid,
        params: PaginationParams,
    ) -> AppResult<Page<HealthRecord>> {
        let pet = self.uow.pets().find_by_id(pet_id).await?.ok_or_not_found()?;
        requester.authorize(&pet)?;

        self.uow
            .health_records()
            .list(None, Some(pet.id), params)
            .await
    }

    async fn get(&self, requester: &CurrentUser, id: Uuid) -> AppResult<HealthRecord> {
        self.visible(requester, id).await
    }

    async fn create(
        &self,
        requester: &CurrentUser,
        input: CreateHealthRecord,
    ) -> AppResult<HealthRecord> {
        let txn = self.uow.begin().await?;
        attachable_pet(txn.pets(), requester, input.pet_id).await?;
        check_veterinarian(txn.users(), input.veterinarian_id).await?;

        let mut record = HealthRecord::new(input);
        record.normalize(Utc::now().date_naive()).into_result()?;

        let record = txn.health_records().create(record).await?;
        txn.commit().await?;

        tracing::info!(record_id = %record.id, pet_id = %record.pet_id, "Health record created");
        Ok(record)
    }

    async fn update(
        &self,
        requester: &CurrentUser,
        id: Uuid,
        changes: UpdateHealthRecord,
    ) -> AppResult<HealthRecord> {
        let txn = self.uow.begin().await?;
        let mut record = txn
            .health_records()
            .find_by_id(id)
            .await?
            .ok_or_not_found()?;
        pet_in_scope(txn.pets(), requester, record.pet_id).await?;

        if let Some(pet_id) = changes.pet_id.filter(|p| *p != record.pet_id) {
            attachable_pet(txn.pets(), requester, pet_id).await?;
        }
        if let Some(vet) = changes.veterinarian_id {
            check_veterinarian(txn.users(), vet).await?;
        }

        record.apply(changes);
        record.normalize(Utc::now().date_naive()).into_result()?;

        let record = txn.health_records().update(record).await?;
        txn.commit().await?;

        tracing::info!(record_id = %record.id, "Health record updated");
        Ok(record)
    }

    async fn delete(&self, requester: &CurrentUser, id: Uuid) -> AppResult<()> {
        let txn = self.uow.begin().await?;
        let record = txn
            .health_records()
            .find_by_id(id)
            .await?
            .ok_or_not_found()?;
        pet_in_scope(txn.pets(), requester, record.pet_id).await?;
        txn.health_records().delete(id).await?;
        txn.commit().await?;

        tracing::info!(record_id = %id, "Health record deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserRole;
    use crate::errors::AppError;
    use crate::services::testing::{pet_owned_by, requester, Mocks};
    use chrono::Duration;
    use mockall::predicate::{always, eq};

    fn input(pet_id: Uuid) -> CreateHealthRecord {
        CreateHealthRecord {
            pet_id,
            veterinarian_id: None,
            weight: 12.4,
            record_date: Utc::now().date_naive(),
            temperature: Some(38.5),
            heart_rate: Some(90),
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_pet_records_of_missing_pet_is_not_found() {
        let user = requester(UserRole::User);
        let mut mocks = Mocks::default();
        mocks.pets.expect_find_by_id().returning(|_| Ok(None));
        let service = HealthRecordManager::new(mocks.into_uow());

        let err = service
            .list_for_pet(&user, Uuid::new_v4(), PaginationParams::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound));
    }

    #[tokio::test]
    async fn test_pet_records_of_foreign_pet_is_forbidden() {
        let user = requester(UserRole::User);
        let mut mocks = Mocks::default();
        mocks
            .pets
            .expect_find_by_id()
            .returning(|_| Ok(Some(pet_owned_by(Uuid::new_v4()))));
        let service = HealthRecordManager::new(mocks.into_uow());

        let err = service
            .list_for_pet(&user, Uuid::new_v4(), PaginationParams::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_pet_records_filter_by_pet() {
        let user = requester(UserRole::User);
        let pet = pet_owned_by(user.id);
        let pet_id = pet.id;
        let mut mocks = Mocks::default();
        mocks
            .pets
            .expect_find_by_id()
            .returning(move |_| Ok(Some(pet.clone())));
        mocks
            .health_records
            .expect_list()
            .with(eq(None), eq(Some(pet_id)), always())
            .times(1)
            .returning(|_, _, _| Ok(Page::new(vec![], 0)));
        let service = HealthRecordManager::new(mocks.into_uow());

        service
            .list_for_pet(&user, pet_id, PaginationParams::default())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_future_record_date_rejected() {
        let user = requester(UserRole::User);
        let owner = user.id;
        let mut mocks = Mocks::default();
        mocks
            .pets
            .expect_find_by_id()
            .returning(move |_| Ok(Some(pet_owned_by(owner))));
        let uow = mocks.into_uow();
        let service = HealthRecordManager::new(uow.clone());

        let mut payload = input(Uuid::new_v4());
        payload.record_date = Utc::now().date_naive() + Duration::days(2);
        let err = service.create(&user, payload).await.unwrap_err();
        assert!(err.field_errors().unwrap().get("record_date").is_some());
        assert_eq!(uow.commits(), 0);
    }

    #[tokio::test]
    async fn test_create_commits() {
        let user = requester(UserRole::User);
        let owner = user.id;
        let mut mocks = Mocks::default();
        mocks
            .pets
            .expect_find_by_id()
            .returning(move |_| Ok(Some(pet_owned_by(owner))));
        mocks.health_records.expect_create().times(1).returning(Ok);
        let uow = mocks.into_uow();
        let service = HealthRecordManager::new(uow.clone());

        service.create(&user, input(Uuid::new_v4())).await.unwrap();
        assert_eq!(uow.commits(), 1);
    }

    #[tokio::test]
    async fn test_moving_record_to_foreign_pet_is_forbidden() {
        let user = requester(UserRole::User);
        let own = pet_owned_by(user.id);
        let own_id = own.id;
        let existing = HealthRecord::new(input(own_id));

        let mut mocks = Mocks::default();
        mocks
            .health_records
            .expect_find_by_id()
            .returning(move |_| Ok(Some(existing.clone())));
        mocks
            .pets
            .expect_find_by_id_with_deleted()
            .returning(move |_| Ok(Some(own.clone())));
        mocks
            .pets
            .expect_find_by_id()
            .returning(|_| Ok(Some(pet_owned_by(Uuid::new_v4()))));
        let service = HealthRecordManager::new(mocks.into_uow());

        let changes = UpdateHealthRecord {
            pet_id: Some(Uuid::new_v4()),
            ..Default::default()
        };
        let err = service.update(&user, Uuid::new_v4(), changes).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_delete_commits_in_one_transaction() {
        let user = requester(UserRole::User);
        let pet = pet_owned_by(user.id);
        let existing = HealthRecord::new(input(pet.id));
        let id = existing.id;

        let mut mocks = Mocks::default();
        mocks
            .health_records
            .expect_find_by_id()
            .returning(move |_| Ok(Some(existing.clone())));
        mocks
            .pets
            .expect_find_by_id_with_deleted()
            .returning(move |_| Ok(Some(pet.clone())));
        mocks
            .health_records
            .expect_delete()
            .with(eq(id))
            .times(1)
            .returning(|_| Ok(()));
        let uow = mocks.into_uow();
        let service = HealthRecordManager::new(uow.clone());

        service.delete(&user, id).await.unwrap();
        assert_eq!(uow.commits(), 1);
    }
}
