//! Appointment handlers.

use axum::{
    extract::{Extension, State},
    routing::get,
    Router,
};
use uuid::Uuid;

use super::paginated;
use crate::api::extractors::{ApiPath, ApiQuery, ValidatedJson};
use crate::api::AppState;
use crate::domain::{AppointmentResponse, CreateAppointment, CurrentUser, UpdateAppointment};
use crate::errors::AppResult;
use crate::types::{ApiResponse, Created, PaginationParams};

/// Create appointment routes
pub fn appointment_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_appointments).post(create_appointment))
        .route(
            "/:id",
            get(get_appointment)
                .put(replace_appointment)
                .patch(update_appointment)
                .delete(delete_appointment),
        )
}

/// List appointments in scope
#[utoipa::path(
    get,
    path = "/api/appointments",
    tag = "Appointments",
    security(("bearer_auth" = [])),
    params(PaginationParams),
    responses((status = 200, description = "Paginated appointments", body = [AppointmentResponse]))
)]
pub async fn list_appointments(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<PaginationParams>,
) -> AppResult<ApiResponse<Vec<AppointmentResponse>>> {
    let page = state.appointment_service.list(&current_user, params).await?;
    Ok(paginated(page, &params, "Appointments retrieved successfully."))
}

/// Book an appointment
#[utoipa::path(
    post,
    path = "/api/appointments",
    tag = "Appointments",
    security(("bearer_auth" = [])),
    request_body = CreateAppointment,
    responses(
        (status = 201, description = "Appointment created successfully", body = AppointmentResponse),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Pet belongs to someone else")
    )
)]
pub async fn create_appointment(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateAppointment>,
) -> AppResult<Created<AppointmentResponse>> {
    let appointment = state
        .appointment_service
        .create(&current_user, payload)
        .await?;
    Ok(Created(appointment.into(), "Appointment created successfully."))
}

/// Get an appointment
#[utoipa::path(
    get,
    path = "/api/appointments/{id}",
    tag = "Appointments",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Appointment ID")),
    responses(
        (status = 200, description = "Appointment", body = AppointmentResponse),
        (status = 404, description = "Appointment not found")
    )
)]
pub async fn get_appointment(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<ApiResponse<AppointmentResponse>> {
    let appointment = state.appointment_service.get(&current_user, id).await?;
    Ok(ApiResponse::success(appointment.into()))
}

/// Replace an appointment
#[utoipa::path(
    put,
    path = "/api/appointments/{id}",
    tag = "Appointments",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Appointment ID")),
    request_body = CreateAppointment,
    responses(
        (status = 200, description = "Appointment updated successfully", body = AppointmentResponse),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Appointment not found")
    )
)]
pub async fn replace_appointment(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<CreateAppointment>,
) -> AppResult<ApiResponse<AppointmentResponse>> {
    let appointment = state
        .appointment_service
        .update(&current_user, id, UpdateAppointment::from(payload))
        .await?;
    Ok(ApiResponse::with_message(
        appointment.into(),
        "Appointment updated successfully.",
    ))
}

/// Partially update an appointment
#[utoipa::path(
    patch,
    path = "/api/appointments/{id}",
    tag = "Appointments",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Appointment ID")),
    request_body = UpdateAppointment,
    responses(
        (status = 200, description = "Appointment updated successfully", body = AppointmentResponse),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Appointment not found")
    )
)]
pub async fn update_appointment(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateAppointment>,
) -> AppResult<ApiResponse<AppointmentResponse>> {
    let appointment = state
        .appointment_service
        .update(&current_user, id, payload)
        .await?;
    Ok(ApiResponse::with_message(
        appointment.into(),
        "Appointment updated successfully.",
    ))
}

/// Delete an appointment
#[utoipa::path(
    delete,
    path = "/api/appointments/{id}",
    tag = "Appointments",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Appointment ID")),
    responses(
        (status = 200, description = "Appointment deleted successfully"),
        (status = 404, description = "Appointment not found")
    )
)]
pub async fn delete_appointment(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<ApiResponse<()>> {
    state.appointment_service.delete(&current_user, id).await?;
    Ok(ApiResponse::message("Appointment deleted successfully."))
}
