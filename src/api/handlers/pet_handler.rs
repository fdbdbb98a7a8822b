//! Pet handlers.

use axum::{
    extract::{Extension, State},
    routing::{get, post},
    Router,
};
use uuid::Uuid;

use super::paginated;
use crate::api::extractors::{ApiPath, ApiQuery, ValidatedJson};
use crate::api::AppState;
use crate::domain::{CreatePet, CurrentUser, PetResponse, UpdatePet};
use crate::errors::AppResult;
use crate::types::{ApiResponse, Created, PaginationParams};

/// Create pet routes
pub fn pet_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_pets).post(create_pet))
        .route("/my_pets", get(my_pets))
        .route("/deleted", get(deleted_pets))
        .route(
            "/:id",
            get(get_pet).put(replace_pet).patch(update_pet).delete(delete_pet),
        )
        .route("/:id/restore", post(restore_pet))
}

/// List pets in scope
#[utoipa::path(
    get,
    path = "/api/pets",
    tag = "Pets",
    security(("bearer_auth" = [])),
    params(PaginationParams),
    responses((status = 200, description = "Paginated pets", body = [PetResponse]))
)]
pub async fn list_pets(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<PaginationParams>,
) -> AppResult<ApiResponse<Vec<PetResponse>>> {
    let page = state.pet_service.list(&current_user, params).await?;
    Ok(paginated(page, &params, "Pets retrieved successfully."))
}

/// List the requester's own pets
#[utoipa::path(
    get,
    path = "/api/pets/my_pets",
    tag = "Pets",
    security(("bearer_auth" = [])),
    params(PaginationParams),
    responses((status = 200, description = "Paginated pets", body = [PetResponse]))
)]
pub async fn my_pets(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<PaginationParams>,
) -> AppResult<ApiResponse<Vec<PetResponse>>> {
    let page = state.pet_service.my_pets(&current_user, params).await?;
    Ok(paginated(page, &params, "Pets retrieved successfully."))
}

/// List soft-deleted pets in scope
#[utoipa::path(
    get,
    path = "/api/pets/deleted",
    tag = "Pets",
    security(("bearer_auth" = [])),
    params(PaginationParams),
    responses((status = 200, description = "Paginated deleted pets", body = [PetResponse]))
)]
pub async fn deleted_pets(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<PaginationParams>,
) -> AppResult<ApiResponse<Vec<PetResponse>>> {
    let page = state.pet_service.list_deleted(&current_user, params).await?;
    Ok(paginated(page, &params, "Deleted pets retrieved successfully."))
}

/// Create a pet
#[utoipa::path(
    post,
    path = "/api/pets",
    tag = "Pets",
    security(("bearer_auth" = [])),
    request_body = CreatePet,
    responses(
        (status = 201, description = "Pet created successfully", body = PetResponse),
        (status = 400, description = "Validation error"),
        (status = 403, description = "owner_id set by a non-admin")
    )
)]
pub async fn create_pet(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreatePet>,
) -> AppResult<Created<PetResponse>> {
    let pet = state.pet_service.create(&current_user, payload).await?;
    Ok(Created(pet.into(), "Pet created successfully."))
}

/// Get a pet
#[utoipa::path(
    get,
    path = "/api/pets/{id}",
    tag = "Pets",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Pet ID")),
    responses(
        (status = 200, description = "Pet", body = PetResponse),
        (status = 404, description = "Pet not found")
    )
)]
pub async fn get_pet(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<ApiResponse<PetResponse>> {
    let pet = state.pet_service.get(&current_user, id).await?;
    Ok(ApiResponse::success(pet.into()))
}

/// Replace a pet
#[utoipa::path(
    put,
    path = "/api/pets/{id}",
    tag = "Pets",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Pet ID")),
    request_body = CreatePet,
    responses(
        (status = 200, description = "Pet updated successfully", body = PetResponse),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Pet not found")
    )
)]
pub async fn replace_pet(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<CreatePet>,
) -> AppResult<ApiResponse<PetResponse>> {
    let pet = state
        .pet_service
        .update(&current_user, id, UpdatePet::from(payload))
        .await?;
    Ok(ApiResponse::with_message(pet.into(), "Pet updated successfully."))
}

/// Partially update a pet
#[utoipa::path(
    patch,
    path = "/api/pets/{id}",
    tag = "Pets",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Pet ID")),
    request_body = UpdatePet,
    responses(
        (status = 200, description = "Pet updated successfully", body = PetResponse),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Owner change by a non-admin"),
        (status = 404, description = "Pet not found")
    )
)]
pub async fn update_pet(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdatePet>,
) -> AppResult<ApiResponse<PetResponse>> {
    let pet = state.pet_service.update(&current_user, id, payload).await?;
    Ok(ApiResponse::with_message(pet.into(), "Pet updated successfully."))
}

/// Soft-delete a pet
#[utoipa::path(
    delete,
    path = "/api/pets/{id}",
    tag = "Pets",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Pet ID")),
    responses(
        (status = 200, description = "Pet deleted successfully"),
        (status = 404, description = "Pet not found")
    )
)]
pub async fn delete_pet(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<ApiResponse<()>> {
    state.pet_service.delete(&current_user, id).await?;
    Ok(ApiResponse::message("Pet deleted successfully."))
}

/// Restore a soft-deleted pet
#[utoipa::path(
    post,
    path = "/api/pets/{id}/restore",
    tag = "Pets",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Pet ID")),
    responses(
        (status = 200, description = "Pet restored successfully", body = PetResponse),
        (status = 400, description = "Pet is not deleted."),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Pet not found"),
        (status = 409, description = "Microchip now taken")
    )
)]
pub async fn restore_pet(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<ApiResponse<PetResponse>> {
    let pet = state.pet_service.restore(&current_user, id).await?;
    Ok(ApiResponse::with_message(pet.into(), "Pet restored successfully."))
}
