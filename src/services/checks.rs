//! Lookups shared by services that attach records to pets and vets.

use uuid::Uuid;

use crate::domain::{CurrentUser, Pet, User};
use crate::errors::{AppError, AppResult};
use crate::infra::repositories::{PetRepository, UserRepository};

/// The live pet a new or moved record is attached to.
///
/// A missing or soft-deleted pet is a field error on `pet_id`;
/// a pet outside the requester's scope is a 403.
pub(crate) async fn attachable_pet(
    pets: &dyn PetRepository,
    requester: &CurrentUser,
    pet_id: Uuid,
) -> AppResult<Pet> {
    let pet = pets
        .find_by_id(pet_id)
        .await?
        .ok_or_else(|| AppError::field("pet_id", "Pet does not exist or has been deleted."))?;
    requester.authorize(&pet)?;
    Ok(pet)
}

/// Resolve a record's pet, including soft-deleted ones, and hide it
/// when outside the requester's scope.
pub(crate) async fn pet_in_scope(
    pets: &dyn PetRepository,
    requester: &CurrentUser,
    pet_id: Uuid,
) -> AppResult<Pet> {
    match pets.find_by_id_with_deleted(pet_id).await? {
        Some(pet) if requester.can_access(&pet) => Ok(pet),
        _ => Err(AppError::NotFound),
    }
}

/// `veterinarian_id`, when set, must name an active veterinarian.
pub(crate) async fn check_veterinarian(
    users: &dyn UserRepository,
    veterinarian_id: Option<Uuid>,
) -> AppResult<()> {
    let Some(id) = veterinarian_id else {
        return Ok(());
    };
    match users.find_by_id(id).await? {
        Some(User {
            is_veterinarian: true,
            is_active: true,
            ..
        }) => Ok(()),
        _ => Err(AppError::field(
            "veterinarian_id",
            "Selected user is not an active veterinarian.",
        )),
    }
}

/// An account referenced by id in a payload must exist and be active.
pub(crate) async fn active_user(
    users: &dyn UserRepository,
    field: &str,
    user_id: Uuid,
) -> AppResult<User> {
    match users.find_by_id(user_id).await? {
        Some(user) if user.is_active => Ok(user),
        _ => Err(AppError::field(field, "User does not exist or is inactive.")),
    }
}
