//! Vaccination service - schedules attached to pets.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::checks::{attachable_pet, check_veterinarian, pet_in_scope};
use crate::domain::{
    CreateVaccination, CurrentUser, UpdateVaccination, Vaccination, VaccinationStatus,
};
use crate::errors::{AppResult, OptionExt};
use crate::infra::repositories::VaccinationFilter;
use crate::infra::UnitOfWork;
use crate::types::{Page, PaginationParams};

/// Vaccination service trait for dependency injection.
#[async_trait]
pub trait VaccinationService: Send + Sync {
    /// Vaccinations of pets in scope
    async fn list(
        &self,
        requester: &CurrentUser,
        params: PaginationParams,
    ) -> AppResult<Page<Vaccination>>;

    /// Vaccinations of the requester's own pets
    async fn my_pets(
        &self,
        requester: &CurrentUser,
        params: PaginationParams,
    ) -> AppResult<Page<Vaccination>>;

    /// The requester's own pets, filtered by stored status
    async fn by_status(
        &self,
        requester: &CurrentUser,
        status: VaccinationStatus,
        params: PaginationParams,
    ) -> AppResult<Page<Vaccination>>;

    async fn get(&self, requester: &CurrentUser, id: Uuid) -> AppResult<Vaccination>;

    async fn create(
        &self,
        requester: &CurrentUser,
        input: CreateVaccination,
    ) -> AppResult<Vaccination>;

    async fn update(
        &self,
        requester: &CurrentUser,
        id: Uuid,
        changes: UpdateVaccination,
    ) -> AppResult<Vaccination>;

    async fn delete(&self, requester: &CurrentUser, id: Uuid) -> AppResult<()>;
}

pub struct VaccinationManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> VaccinationManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    /// Load a vaccination whose pet is in the requester's scope.
    async fn visible(&self, requester: &CurrentUser, id: Uuid) -> AppResult<Vaccination> {
        let vaccination = self
            .uow
            .vaccinations()
            .find_by_id(id)
            .await?
            .ok_or_not_found()?;
        pet_in_scope(self.uow.pets().as_ref(), requester, vaccination.pet_id).await?;
        Ok(vaccination)
    }
}

#[async_trait]
impl<U: UnitOfWork> VaccinationService for VaccinationManager<U> {
    async fn list(
        &self,
        requester: &CurrentUser,
        params: PaginationParams,
    ) -> AppResult<Page<Vaccination>> {
        let filter = VaccinationFilter {
            owner_id: requester.owner_filter(),
            status: None,
        };
        self.uow.vaccinations().list(filter, params).await
    }

    async fn my_pets(
        &self,
        requester: &CurrentUser,
        params: PaginationParams,
    ) -> AppResult<Page<Vaccination>> {
        let filter = VaccinationFilter {
            owner_id: Some(requester.id),
            status: None,
        };
        self.uow.vaccinations().list(filter, params).await
    }

    async fn by_status(
        &self,
        requester: &CurrentUser,
        status: VaccinationStatus,
        params: PaginationParams,
    ) -> AppResult<Page<Vaccination>> {
        let filter = VaccinationFilter {
            owner_id: Some(requester.id),
            status: Some(status),
        };
        self.uow.vaccinations().list(filter, params).await
    }

    async fn get(&self, requester: &CurrentUser, id: Uuid) -> AppResult<Vaccination> {
        self.visible(requester, id).await
    }

    async fn create(
        &self,
        requester: &CurrentUser,
        input: CreateVaccination,
    ) -> AppResult<Vaccination> {
        let txn = self.uow.begin().await?;
        attachable_pet(txn.pets(), requester, input.pet_id).await?;
        check_veterinarian(txn.users(), input.veterinarian_id).await?;

        let mut vaccination = Vaccination::new(input);
        vaccination
            .normalize(Utc::now().date_naive())
            .into_result()?;

        let vaccination = txn.vaccinations().create(vaccination).await?;
        txn.commit().await?;

        tracing::info!(
            vaccination_id = %vaccination.id,
            pet_id = %vaccination.pet_id,
            status = %vaccination.status,
            "Vaccination created"
        );
        Ok(vaccination)
    }

    async fn update(
        &self,
        requester: &CurrentUser,
        id: Uuid,
        changes: UpdateVaccination,
    ) -> AppResult<Vaccination> {
        let txn = self.uow.begin().await?;
        let mut vaccination = txn
            .vaccinations()
            .find_by_id(id)
            .await?
            .ok_or_not_found()?;
        pet_in_scope(txn.pets(), requester, vaccination.pet_id).await?;

        if let Some(pet_id) = changes.pet_id.filter(|p| *p != vaccination.pet_id) {
            attachable_pet(txn.pets(), requester, pet_id).await?;
        }
        if let Some(vet) = changes.veterinarian_id {
            check_veterinarian(txn.users(), vet).await?;
        }

        vaccination.apply(changes);
        vaccination
            .normalize(Utc::now().date_naive())
            .into_result()?;

        let vaccination = txn.vaccinations().update(vaccination).await?;
        txn.commit().await?;

        tracing::info!(vaccination_id = %vaccination.id, status = %vaccination.status, "Vaccination updated");
        Ok(vaccination)
    }

    async fn delete(&self, requester: &CurrentUser, id: Uuid) -> AppResult<()> {
        let txn = self.uow.begin().await?;
        let vaccination = txn
            .vaccinations()
            .find_by_id(id)
            .await?
            .ok_or_not_found()?;
        pet_in_scope(txn.pets(), requester, vaccination.pet_id).await?;
        txn.vaccinations().delete(id).await?;
        txn.commit().await?;

        tracing::info!(vaccination_id = %id, "Vaccination deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserRole;
    use crate::errors::AppError;
    use crate::services::testing::{pet_owned_by, requester, user_with_id, veterinarian, Mocks};
    use chrono::{Duration, NaiveDate};

    fn today() -> NaiveDate {
        Utc::now().date_naive()
    }

    fn input(pet_id: Uuid, due: NaiveDate) -> CreateVaccination {
        CreateVaccination {
            pet_id,
            vaccine_name: "Rabies".into(),
            due_date: due,
            administered_date: None,
            status: None,
            veterinarian_id: None,
            batch_number: None,
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_past_due_vaccination_is_created_overdue() {
        let user = requester(UserRole::User);
        let owner = user.id;
        let mut mocks = Mocks::default();
        mocks
            .pets
            .expect_find_by_id()
            .returning(move |_| Ok(Some(pet_owned_by(owner))));
        mocks.vaccinations.expect_create().times(1).returning(Ok);
        let uow = mocks.into_uow();
        let service = VaccinationManager::new(uow.clone());

        let created = service
            .create(&user, input(Uuid::new_v4(), today() - Duration::days(3)))
            .await
            .unwrap();
        assert_eq!(created.status, VaccinationStatus::Overdue);
        assert_eq!(uow.commits(), 1);
    }

    #[tokio::test]
    async fn test_create_on_deleted_pet_is_field_error() {
        let user = requester(UserRole::User);
        let mut mocks = Mocks::default();
        mocks.pets.expect_find_by_id().returning(|_| Ok(None));
        let service = VaccinationManager::new(mocks.into_uow());

        let err = service
            .create(&user, input(Uuid::new_v4(), today()))
            .await
            .unwrap_err();
        assert!(err.field_errors().unwrap().get("pet_id").is_some());
    }

    #[tokio::test]
    async fn test_create_on_foreign_pet_is_forbidden() {
        let user = requester(UserRole::User);
        let mut mocks = Mocks::default();
        mocks
            .pets
            .expect_find_by_id()
            .returning(|_| Ok(Some(pet_owned_by(Uuid::new_v4()))));
        let service = VaccinationManager::new(mocks.into_uow());

        let err = service
            .create(&user, input(Uuid::new_v4(), today()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_non_veterinarian_rejected() {
        let user = requester(UserRole::User);
        let owner = user.id;
        let mut mocks = Mocks::default();
        mocks
            .pets
            .expect_find_by_id()
            .returning(move |_| Ok(Some(pet_owned_by(owner))));
        mocks
            .users
            .expect_find_by_id()
            .returning(|id| Ok(Some(user_with_id(id))));
        let service = VaccinationManager::new(mocks.into_uow());

        let mut payload = input(Uuid::new_v4(), today());
        payload.veterinarian_id = Some(Uuid::new_v4());
        let err = service.create(&user, payload).await.unwrap_err();
        assert!(err.field_errors().unwrap().get("veterinarian_id").is_some());
    }

    #[tokio::test]
    async fn test_active_veterinarian_accepted() {
        let user = requester(UserRole::User);
        let owner = user.id;
        let mut mocks = Mocks::default();
        mocks
            .pets
            .expect_find_by_id()
            .returning(move |_| Ok(Some(pet_owned_by(owner))));
        mocks
            .users
            .expect_find_by_id()
            .returning(|_| Ok(Some(veterinarian())));
        mocks.vaccinations.expect_create().returning(Ok);
        let service = VaccinationManager::new(mocks.into_uow());

        let mut payload = input(Uuid::new_v4(), today());
        payload.veterinarian_id = Some(Uuid::new_v4());
        assert!(service.create(&user, payload).await.is_ok());
    }

    #[tokio::test]
    async fn test_setting_administered_date_completes() {
        let user = requester(UserRole::User);
        let owner = user.id;
        let pet = pet_owned_by(owner);
        let pet_id = pet.id;
        let existing = Vaccination::new(input(pet_id, today() - Duration::days(10)));

        let mut mocks = Mocks::default();
        mocks
            .vaccinations
            .expect_find_by_id()
            .returning(move |_| Ok(Some(existing.clone())));
        mocks
            .pets
            .expect_find_by_id_with_deleted()
            .returning(move |_| Ok(Some(pet.clone())));
        mocks.vaccinations.expect_update().returning(Ok);
        let service = VaccinationManager::new(mocks.into_uow());

        let changes = UpdateVaccination {
            administered_date: Some(Some(today())),
            ..Default::default()
        };
        let updated = service.update(&user, Uuid::new_v4(), changes).await.unwrap();
        assert_eq!(updated.status, VaccinationStatus::Completed);
    }

    #[tokio::test]
    async fn test_foreign_vaccination_reads_as_missing() {
        let user = requester(UserRole::User);
        let mut mocks = Mocks::default();
        mocks
            .vaccinations
            .expect_find_by_id()
            .returning(|_| Ok(Some(Vaccination::new(input(Uuid::new_v4(), today())))));
        mocks
            .pets
            .expect_find_by_id_with_deleted()
            .returning(|_| Ok(Some(pet_owned_by(Uuid::new_v4()))));
        let service = VaccinationManager::new(mocks.into_uow());

        let err = service.get(&user, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound));
    }

    #[tokio::test]
    async fn test_pending_list_is_own_pets_only() {
        let admin = requester(UserRole::Admin);
        let admin_id = admin.id;
        let mut mocks = Mocks::default();
        mocks
            .vaccinations
            .expect_list()
            .withf(move |filter, _| {
                filter.owner_id == Some(admin_id)
                    && filter.status == Some(VaccinationStatus::Pending)
            })
            .times(1)
            .returning(|_, _| Ok(Page::new(vec![], 0)));
        let service = VaccinationManager::new(mocks.into_uow());

        service
            .by_status(&admin, VaccinationStatus::Pending, PaginationParams::default())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_delete_commits_in_one_transaction() {
        let user = requester(UserRole::User);
        let pet = pet_owned_by(user.id);
        let existing = Vaccination::new(input(pet.id, today()));
        let id = existing.id;

        let mut mocks = Mocks::default();
        mocks
            .vaccinations
            .expect_find_by_id()
            .returning(move |_| Ok(Some(existing.clone())));
        mocks
            .pets
            .expect_find_by_id_with_deleted()
            .returning(move |_| Ok(Some(pet.clone())));
        mocks
            .vaccinations
            .expect_delete()
            .withf(move |deleted| *deleted == id)
            .times(1)
            .returning(|_| Ok(()));
        let uow = mocks.into_uow();
        let service = VaccinationManager::new(uow.clone());

        service.delete(&user, id).await.unwrap();
        assert_eq!(uow.commits(), 1);
    }

    #[tokio::test]
    async fn test_delete_of_foreign_vaccination_writes_nothing() {
        let user = requester(UserRole::User);
        let mut mocks = Mocks::default();
        mocks
            .vaccinations
            .expect_find_by_id()
            .returning(|_| Ok(Some(Vaccination::new(input(Uuid::new_v4(), today())))));
        mocks
            .pets
            .expect_find_by_id_with_deleted()
            .returning(|_| Ok(Some(pet_owned_by(Uuid::new_v4()))));
        mocks.vaccinations.expect_delete().never();
        let uow = mocks.into_uow();
        let service = VaccinationManager::new(uow.clone());

        let err = service.delete(&user, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound));
        assert_eq!(uow.commits(), 0);
    }
}
