//! Pet service - profiles, soft delete and restore.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::checks::active_user;
use crate::domain::pet::MICROCHIP_TAKEN_MESSAGE;
use crate::domain::{CreatePet, CurrentUser, Pet, UpdatePet};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::repositories::PetRepository;
use crate::infra::UnitOfWork;
use crate::types::{Page, PaginationParams};

/// Pet service trait for dependency injection.
#[async_trait]
pub trait PetService: Send + Sync {
    /// Live pets in scope
    async fn list(&self, requester: &CurrentUser, params: PaginationParams) -> AppResult<Page<Pet>>;

    /// The requester's own live pets, admins included
    async fn my_pets(&self, requester: &CurrentUser, params: PaginationParams)
        -> AppResult<Page<Pet>>;

    /// Soft-deleted pets in scope
    async fn list_deleted(
        &self,
        requester: &CurrentUser,
        params: PaginationParams,
    ) -> AppResult<Page<Pet>>;

    async fn get(&self, requester: &CurrentUser, id: Uuid) -> AppResult<Pet>;

    async fn create(&self, requester: &CurrentUser, input: CreatePet) -> AppResult<Pet>;

    async fn update(&self, requester: &CurrentUser, id: Uuid, changes: UpdatePet)
        -> AppResult<Pet>;

    /// Soft delete
    async fn delete(&self, requester: &CurrentUser, id: Uuid) -> AppResult<()>;

    async fn restore(&self, requester: &CurrentUser, id: Uuid) -> AppResult<Pet>;
}

/// Concrete implementation of PetService using Unit of Work.
pub struct PetManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> PetManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

async fn ensure_microchip_free(pets: &dyn PetRepository, pet: &Pet, exclude: Option<Uuid>)
    -> AppResult<()>
{
    if let Some(microchip) = pet.microchip_number.as_deref() {
        if pets.microchip_taken(microchip, exclude).await? {
            return Err(AppError::field("microchip_number", MICROCHIP_TAKEN_MESSAGE));
        }
    }
    Ok(())
}

#[async_trait]
impl<U: UnitOfWork> PetService for PetManager<U> {
    async fn list(&self, requester: &CurrentUser, params: PaginationParams) -> AppResult<Page<Pet>> {
        self.uow.pets().list(requester.owner_filter(), params).await
    }

    async fn my_pets(
        &self,
        requester: &CurrentUser,
        params: PaginationParams,
    ) -> AppResult<Page<Pet>> {
        self.uow.pets().list(Some(requester.id), params).await
    }

    async fn list_deleted(
        &self,
        requester: &CurrentUser,
        params: PaginationParams,
    ) -> AppResult<Page<Pet>> {
        self.uow
            .pets()
            .list_deleted(requester.owner_filter(), params)
            .await
    }

    async fn get(&self, requester: &CurrentUser, id: Uuid) -> AppResult<Pet> {
        let pet = self.uow.pets().find_by_id(id).await?.ok_or_not_found()?;
        requester.scope(pet)
    }

    async fn create(&self, requester: &CurrentUser, input: CreatePet) -> AppResult<Pet> {
        let txn = self.uow.begin().await?;

        let owner_id = match input.owner_id {
            Some(owner_id) if owner_id != requester.id => {
                if !requester.is_admin() {
                    return Err(AppError::forbidden_with(
                        "You cannot create pets for other users.",
                    ));
                }
                active_user(txn.users(), "owner_id", owner_id).await?.id
            }
            _ => requester.id,
        };

        let mut pet = Pet::new(owner_id, input);
        pet.normalize(Utc::now().date_naive()).into_result()?;
        ensure_microchip_free(txn.pets(), &pet, None).await?;

        let pet = txn.pets().create(pet).await?;
        txn.commit().await?;

        tracing::info!(pet_id = %pet.id, owner_id = %pet.owner_id, "Pet created");
        Ok(pet)
    }

    async fn update(
        &self,
        requester: &CurrentUser,
        id: Uuid,
        mut changes: UpdatePet,
    ) -> AppResult<Pet> {
        let txn = self.uow.begin().await?;
        let pet = txn.pets().find_by_id(id).await?.ok_or_not_found()?;
        let mut pet = requester.scope(pet)?;

        if let Some(owner_id) = changes.owner_id.take() {
            if owner_id != pet.owner_id {
                if !requester.is_admin() {
                    return Err(AppError::forbidden_with(
                        "You cannot change the owner of a pet.",
                    ));
                }
                pet.owner_id = active_user(txn.users(), "owner_id", owner_id).await?.id;
            }
        }

        pet.apply(changes);
        pet.normalize(Utc::now().date_naive()).into_result()?;
        ensure_microchip_free(txn.pets(), &pet, Some(pet.id)).await?;

        let pet = txn.pets().update(pet).await?;
        txn.commit().await?;

        tracing::info!(pet_id = %pet.id, "Pet updated");
        Ok(pet)
    }

    async fn delete(&self, requester: &CurrentUser, id: Uuid) -> AppResult<()> {
        let txn = self.uow.begin().await?;
        let pet = txn.pets().find_by_id(id).await?.ok_or_not_found()?;
        let mut pet = requester.scope(pet)?;

        pet.soft_delete(Utc::now());
        txn.pets().update(pet).await?;
        txn.commit().await?;

        tracing::info!(pet_id = %id, deleted_by = %requester.id, "Pet soft-deleted");
        Ok(())
    }

    async fn restore(&self, requester: &CurrentUser, id: Uuid) -> AppResult<Pet> {
        let txn = self.uow.begin().await?;
        let mut pet = txn
            .pets()
            .find_by_id_with_deleted(id)
            .await?
            .ok_or_not_found()?;

        if !pet.is_deleted {
            return Err(AppError::bad_request("Pet is not deleted."));
        }
        requester.authorize(&pet)?;

        if let Some(microchip) = pet.microchip_number.as_deref() {
            if txn.pets().microchip_taken(microchip, Some(pet.id)).await? {
                return Err(AppError::conflict(MICROCHIP_TAKEN_MESSAGE));
            }
        }

        pet.restore()?;
        let pet = txn.pets().update(pet).await?;
        txn.commit().await?;

        tracing::info!(pet_id = %pet.id, restored_by = %requester.id, "Pet restored");
        Ok(pet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserRole;
    use crate::services::testing::{pet_owned_by, requester, Mocks};
    use mockall::predicate::eq;

    #[tokio::test]
    async fn test_list_is_scoped_to_owner_for_regular_user() {
        let user = requester(UserRole::User);
        let owner = user.id;

        let mut mocks = Mocks::default();
        mocks
            .pets
            .expect_list()
            .with(eq(Some(owner)), mockall::predicate::always())
            .times(1)
            .returning(move |_, _| Ok(Page::new(vec![pet_owned_by(owner)], 1)));
        let service = PetManager::new(mocks.into_uow());

        let page = service.list(&user, PaginationParams::default()).await.unwrap();
        assert!(page.items.iter().all(|p| p.owner_id == owner));
    }

    #[tokio::test]
    async fn test_admin_list_is_unscoped() {
        let admin = requester(UserRole::Admin);
        let mut mocks = Mocks::default();
        mocks
            .pets
            .expect_list()
            .with(eq(None), mockall::predicate::always())
            .times(1)
            .returning(|_, _| Ok(Page::new(vec![], 0)));
        let service = PetManager::new(mocks.into_uow());

        service.list(&admin, PaginationParams::default()).await.unwrap();
    }

    #[tokio::test]
    async fn test_foreign_pet_reads_as_missing() {
        let user = requester(UserRole::User);
        let mut mocks = Mocks::default();
        mocks
            .pets
            .expect_find_by_id()
            .returning(|_| Ok(Some(pet_owned_by(Uuid::new_v4()))));
        let service = PetManager::new(mocks.into_uow());

        let err = service.get(&user, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound));
    }

    #[tokio::test]
    async fn test_create_rejects_taken_microchip() {
        let user = requester(UserRole::User);
        let mut mocks = Mocks::default();
        mocks
            .pets
            .expect_microchip_taken()
            .withf(|chip, exclude| chip == "ABC123" && exclude.is_none())
            .returning(|_, _| Ok(true));
        let service = PetManager::new(mocks.into_uow());

        let input = CreatePet {
            name: "Rex".into(),
            microchip_number: Some(" abc123 ".into()),
            ..Default::default()
        };
        let err = service.create(&user, input).await.unwrap_err();
        assert_eq!(
            err.field_errors().unwrap().get("microchip_number").unwrap()[0],
            MICROCHIP_TAKEN_MESSAGE
        );
    }

    #[tokio::test]
    async fn test_regular_user_cannot_create_for_someone_else() {
        let user = requester(UserRole::User);
        let service = PetManager::new(Mocks::default().into_uow());

        let input = CreatePet {
            name: "Rex".into(),
            owner_id: Some(Uuid::new_v4()),
            ..Default::default()
        };
        let err = service.create(&user, input).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_create_commits_for_requester() {
        let user = requester(UserRole::User);
        let owner = user.id;
        let mut mocks = Mocks::default();
        mocks
            .pets
            .expect_create()
            .withf(move |pet| pet.owner_id == owner && pet.name == "Rex")
            .times(1)
            .returning(Ok);
        let uow = mocks.into_uow();
        let service = PetManager::new(uow.clone());

        let input = CreatePet {
            name: "  Rex ".into(),
            ..Default::default()
        };
        service.create(&user, input).await.unwrap();
        assert_eq!(uow.commits(), 1);
    }

    #[tokio::test]
    async fn test_non_admin_owner_change_is_forbidden() {
        let user = requester(UserRole::User);
        let owner = user.id;
        let mut mocks = Mocks::default();
        mocks
            .pets
            .expect_find_by_id()
            .returning(move |_| Ok(Some(pet_owned_by(owner))));
        let service = PetManager::new(mocks.into_uow());

        let changes = UpdatePet {
            owner_id: Some(Uuid::new_v4()),
            ..Default::default()
        };
        let err = service.update(&user, Uuid::new_v4(), changes).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_delete_is_soft() {
        let user = requester(UserRole::User);
        let owner = user.id;
        let mut mocks = Mocks::default();
        mocks
            .pets
            .expect_find_by_id()
            .returning(move |_| Ok(Some(pet_owned_by(owner))));
        mocks
            .pets
            .expect_update()
            .withf(|pet| pet.is_deleted && pet.deleted_at.is_some())
            .times(1)
            .returning(Ok);
        let uow = mocks.into_uow();
        let service = PetManager::new(uow.clone());

        service.delete(&user, Uuid::new_v4()).await.unwrap();
        assert_eq!(uow.commits(), 1);
    }

    #[tokio::test]
    async fn test_restore_live_pet_is_bad_request() {
        let user = requester(UserRole::User);
        let owner = user.id;
        let mut mocks = Mocks::default();
        mocks
            .pets
            .expect_find_by_id_with_deleted()
            .returning(move |_| Ok(Some(pet_owned_by(owner))));
        let service = PetManager::new(mocks.into_uow());

        let err = service.restore(&user, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(ref m) if m == "Pet is not deleted."));
    }

    #[tokio::test]
    async fn test_restore_clears_flag_and_timestamp() {
        let user = requester(UserRole::User);
        let owner = user.id;
        let mut mocks = Mocks::default();
        mocks.pets.expect_find_by_id_with_deleted().returning(move |_| {
            let mut pet = pet_owned_by(owner);
            pet.soft_delete(Utc::now());
            Ok(Some(pet))
        });
        mocks.pets.expect_update().returning(Ok);
        let service = PetManager::new(mocks.into_uow());

        let pet = service.restore(&user, Uuid::new_v4()).await.unwrap();
        assert!(!pet.is_deleted);
        assert!(pet.deleted_at.is_none());
    }

    #[tokio::test]
    async fn test_restore_with_taken_microchip_conflicts() {
        let admin = requester(UserRole::Admin);
        let mut mocks = Mocks::default();
        mocks.pets.expect_find_by_id_with_deleted().returning(|_| {
            let mut pet = pet_owned_by(Uuid::new_v4());
            pet.microchip_number = Some("CHIP1".into());
            pet.soft_delete(Utc::now());
            Ok(Some(pet))
        });
        mocks.pets.expect_microchip_taken().returning(|_, _| Ok(true));
        let service = PetManager::new(mocks.into_uow());

        let err = service.restore(&admin, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }
}
