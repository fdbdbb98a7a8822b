//! Vaccination and health record handlers.

use axum::{
    extract::{Extension, State},
    routing::get,
    Router,
};
use uuid::Uuid;

use super::paginated;
use crate::api::extractors::{ApiPath, ApiQuery, ValidatedJson};
use crate::api::AppState;
use crate::domain::{
    CreateHealthRecord, CreateVaccination, CurrentUser, HealthRecordResponse, UpdateHealthRecord,
    UpdateVaccination, VaccinationResponse, VaccinationStatus,
};
use crate::errors::AppResult;
use crate::types::{ApiResponse, Created, PaginationParams};

/// Create vaccination routes
pub fn vaccination_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_vaccinations).post(create_vaccination))
        .route("/my_pets_vaccinations", get(my_pets_vaccinations))
        .route("/pending", get(pending_vaccinations))
        .route("/overdue", get(overdue_vaccinations))
        .route(
            "/:id",
            get(get_vaccination)
                .put(replace_vaccination)
                .patch(update_vaccination)
                .delete(delete_vaccination),
        )
}

/// Create health record routes
pub fn health_record_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_health_records).post(create_health_record))
        .route("/my_pets_records", get(my_pets_records))
        .route("/pet/:pet_id", get(pet_records))
        .route(
            "/:id",
            get(get_health_record)
                .put(replace_health_record)
                .patch(update_health_record)
                .delete(delete_health_record),
        )
}

/// List vaccinations of pets in scope
#[utoipa::path(
    get,
    path = "/api/health/vaccinations",
    tag = "Vaccinations",
    security(("bearer_auth" = [])),
    params(PaginationParams),
    responses((status = 200, description = "Paginated vaccinations", body = [VaccinationResponse]))
)]
pub async fn list_vaccinations(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<PaginationParams>,
) -> AppResult<ApiResponse<Vec<VaccinationResponse>>> {
    let page = state.vaccination_service.list(&current_user, params).await?;
    Ok(paginated(page, &params, "Vaccinations retrieved successfully."))
}

/// Vaccinations of the requester's own pets
#[utoipa::path(
    get,
    path = "/api/health/vaccinations/my_pets_vaccinations",
    tag = "Vaccinations",
    security(("bearer_auth" = [])),
    params(PaginationParams),
    responses((status = 200, description = "Paginated vaccinations", body = [VaccinationResponse]))
)]
pub async fn my_pets_vaccinations(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<PaginationParams>,
) -> AppResult<ApiResponse<Vec<VaccinationResponse>>> {
    let page = state.vaccination_service.my_pets(&current_user, params).await?;
    Ok(paginated(page, &params, "Vaccinations retrieved successfully."))
}

/// Pending vaccinations of the requester's own pets
#[utoipa::path(
    get,
    path = "/api/health/vaccinations/pending",
    tag = "Vaccinations",
    security(("bearer_auth" = [])),
    params(PaginationParams),
    responses((status = 200, description = "Paginated vaccinations", body = [VaccinationResponse]))
)]
pub async fn pending_vaccinations(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<PaginationParams>,
) -> AppResult<ApiResponse<Vec<VaccinationResponse>>> {
    let page = state
        .vaccination_service
        .by_status(&current_user, VaccinationStatus::Pending, params)
        .await?;
    Ok(paginated(page, &params, "Pending vaccinations retrieved successfully."))
}

/// Overdue vaccinations of the requester's own pets
#[utoipa::path(
    get,
    path = "/api/health/vaccinations/overdue",
    tag = "Vaccinations",
    security(("bearer_auth" = [])),
    params(PaginationParams),
    responses((status = 200, description = "Paginated vaccinations", body = [VaccinationResponse]))
)]
pub async fn overdue_vaccinations(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<PaginationParams>,
) -> AppResult<ApiResponse<Vec<VaccinationResponse>>> {
    let page = state
        .vaccination_service
        .by_status(&current_user, VaccinationStatus::Overdue, params)
        .await?;
    Ok(paginated(page, &params, "Overdue vaccinations retrieved successfully."))
}

/// Create a vaccination
#[utoipa::path(
    post,
    path = "/api/health/vaccinations",
    tag = "Vaccinations",
    security(("bearer_auth" = [])),
    request_body = CreateVaccination,
    responses(
        (status = 201, description = "Vaccination created successfully", body = VaccinationResponse),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Pet belongs to someone else")
    )
)]
pub async fn create_vaccination(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateVaccination>,
) -> AppResult<Created<VaccinationResponse>> {
    let vaccination = state
        .vaccination_service
        .create(&current_user, payload)
        .await?;
    Ok(Created(vaccination.into(), "Vaccination created successfully."))
}

/// Get a vaccination
#[utoipa::path(
    get,
    path = "/api/health/vaccinations/{id}",
    tag = "Vaccinations",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Vaccination ID")),
    responses(
        (status = 200, description = "Vaccination", body = VaccinationResponse),
        (status = 404, description = "Vaccination not found")
    )
)]
pub async fn get_vaccination(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<ApiResponse<VaccinationResponse>> {
    let vaccination = state.vaccination_service.get(&current_user, id).await?;
    Ok(ApiResponse::success(vaccination.into()))
}

/// Replace a vaccination
#[utoipa::path(
    put,
    path = "/api/health/vaccinations/{id}",
    tag = "Vaccinations",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Vaccination ID")),
    request_body = CreateVaccination,
    responses(
        (status = 200, description = "Vaccination updated successfully", body = VaccinationResponse),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Vaccination not found")
    )
)]
pub async fn replace_vaccination(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<CreateVaccination>,
) -> AppResult<ApiResponse<VaccinationResponse>> {
    let vaccination = state
        .vaccination_service
        .update(&current_user, id, UpdateVaccination::from(payload))
        .await?;
    Ok(ApiResponse::with_message(
        vaccination.into(),
        "Vaccination updated successfully.",
    ))
}

/// Partially update a vaccination
#[utoipa::path(
    patch,
    path = "/api/health/vaccinations/{id}",
    tag = "Vaccinations",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Vaccination ID")),
    request_body = UpdateVaccination,
    responses(
        (status = 200, description = "Vaccination updated successfully", body = VaccinationResponse),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Vaccination not found")
    )
)]
pub async fn update_vaccination(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateVaccination>,
) -> AppResult<ApiResponse<VaccinationResponse>> {
    let vaccination = state
        .vaccination_service
        .update(&current_user, id, payload)
        .await?;
    Ok(ApiResponse::with_message(
        vaccination.into(),
        "Vaccination updated successfully.",
    ))
}

/// Delete a vaccination
#[utoipa::path(
    delete,
    path = "/api/health/vaccinations/{id}",
    tag = "Vaccinations",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Vaccination ID")),
    responses(
        (status = 200, description = "Vaccination deleted successfully"),
        (status = 404, description = "Vaccination not found")
    )
)]
pub async fn delete_vaccination(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<ApiResponse<()>> {
    state.vaccination_service.delete(&current_user, id).await?;
    Ok(ApiResponse::message("Vaccination deleted successfully."))
}

/// List health records of pets in scope
#[utoipa::path(
    get,
    path = "/api/health/health-records",
    tag = "Health Records",
    security(("bearer_auth" = [])),
    params(PaginationParams),
    responses((status = 200, description = "Paginated health records", body = [HealthRecordResponse]))
)]
pub async fn list_health_records(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<PaginationParams>,
) -> AppResult<ApiResponse<Vec<HealthRecordResponse>>> {
    let page = state.health_record_service.list(&current_user, params).await?;
    Ok(paginated(page, &params, "Health records retrieved successfully."))
}

/// Health records of the requester's own pets
#[utoipa::path(
    get,
    path = "/api/health/health-records/my_pets_records",
    tag = "Health Records",
    security(("bearer_auth" = [])),
    params(PaginationParams),
    responses((status = 200, description = "Paginated health records", body = [HealthRecordResponse]))
)]
pub async fn my_pets_records(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<PaginationParams>,
) -> AppResult<ApiResponse<Vec<HealthRecordResponse>>> {
    let page = state
        .health_record_service
        .my_pets(&current_user, params)
        .await?;
    Ok(paginated(page, &params, "Health records retrieved successfully."))
}

/// Health records of one pet, newest first
#[utoipa::path(
    get,
    path = "/api/health/health-records/pet/{pet_id}",
    tag = "Health Records",
    security(("bearer_auth" = [])),
    params(
        ("pet_id" = Uuid, Path, description = "Pet ID"),
        PaginationParams
    ),
    responses(
        (status = 200, description = "Paginated health records", body = [HealthRecordResponse]),
        (status = 403, description = "Pet belongs to someone else"),
        (status = 404, description = "Pet not found")
    )
)]
pub async fn pet_records(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ApiPath(pet_id): ApiPath<Uuid>,
    ApiQuery(params): ApiQuery<PaginationParams>,
) -> AppResult<ApiResponse<Vec<HealthRecordResponse>>> {
    let page = state
        .health_record_service
        .list_for_pet(&current_user, pet_id, params)
        .await?;
    Ok(paginated(page, &params, "Health records retrieved successfully."))
}

/// Create a health record
#[utoipa::path(
    post,
    path = "/api/health/health-records",
    tag = "Health Records",
    security(("bearer_auth" = [])),
    request_body = CreateHealthRecord,
    responses(
        (status = 201, description = "Health record created successfully", body = HealthRecordResponse),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Pet belongs to someone else")
    )
)]
pub async fn create_health_record(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateHealthRecord>,
) -> AppResult<Created<HealthRecordResponse>> {
    let record = state
        .health_record_service
        .create(&current_user, payload)
        .await?;
    Ok(Created(record.into(), "Health record created successfully."))
}

/// Get a health record
#[utoipa::path(
    get,
    path = "/api/health/health-records/{id}",
    tag = "Health Records",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Health record ID")),
    responses(
        (status = 200, description = "Health record", body = HealthRecordResponse),
        (status = 404, description = "Health record not found")
    )
)]
pub async fn get_health_record(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<ApiResponse<HealthRecordResponse>> {
    let record = state.health_record_service.get(&current_user, id).await?;
    Ok(ApiResponse::success(record.into()))
}

/// Replace a health record
#[utoipa::path(
    put,
    path = "/api/health/health-records/{id}",
    tag = "Health Records",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Health record ID")),
    request_body = CreateHealthRecord,
    responses(
        (status = 200, description = "Health record updated successfully", body = HealthRecordResponse),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Health record not found")
    )
)]
pub async fn replace_health_record(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<CreateHealthRecord>,
) -> AppResult<ApiResponse<HealthRecordResponse>> {
    let record = state
        .health_record_service
        .update(&current_user, id, UpdateHealthRecord::from(payload))
        .await?;
    Ok(ApiResponse::with_message(
        record.into(),
        "Health record updated successfully.",
    ))
}

/// Partially update a health record
#[utoipa::path(
    patch,
    path = "/api/health/health-records/{id}",
    tag = "Health Records",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Health record ID")),
    request_body = UpdateHealthRecord,
    responses(
        (status = 200, description = "Health record updated successfully", body = HealthRecordResponse),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Health record not found")
    )
)]
pub async fn update_health_record(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateHealthRecord>,
) -> AppResult<ApiResponse<HealthRecordResponse>> {
    let record = state
        .health_record_service
        .update(&current_user, id, payload)
        .await?;
    Ok(ApiResponse::with_message(
        record.into(),
        "Health record updated successfully.",
    ))
}

/// Delete a health record
#[utoipa::path(
    delete,
    path = "/api/health/health-records/{id}",
    tag = "Health Records",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Health record ID")),
    responses(
        (status = 200, description = "Health record deleted successfully"),
        (status = 404, description = "Health record not found")
    )
)]
pub async fn delete_health_record(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<ApiResponse<()>> {
    state.health_record_service.delete(&current_user, id).await?;
    Ok(ApiResponse::message("Health record deleted successfully."))
}
