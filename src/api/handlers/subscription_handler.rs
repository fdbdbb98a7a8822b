//! Subscription plan and user subscription handlers.

use axum::{
    extract::{Extension, State},
    routing::{get, post},
    Router,
};
use uuid::Uuid;

use super::paginated;
use crate::api::extractors::{ApiPath, ApiQuery, ValidatedJson};
use crate::api::AppState;
use crate::domain::{
    CreatePlan, CreateSubscription, CurrentUser, PlanResponse, SubscriptionResponse, UpdatePlan,
    UpdateSubscription,
};
use crate::errors::AppResult;
use crate::types::{ApiResponse, Created, PaginationParams};

/// Create plan routes
pub fn plan_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_plans).post(create_plan))
        .route("/active", get(active_plans))
        .route(
            "/:id",
            get(get_plan)
                .put(replace_plan)
                .patch(update_plan)
                .delete(delete_plan),
        )
}

/// Create user subscription routes
pub fn subscription_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_subscriptions).post(create_subscription))
        .route("/my_subscription", get(my_subscription))
        .route("/current", get(current_subscription))
        .route("/my_subscriptions", get(my_subscriptions))
        .route(
            "/:id",
            get(get_subscription)
                .put(replace_subscription)
                .patch(update_subscription)
                .delete(delete_subscription),
        )
        .route("/:id/cancel", post(cancel_subscription))
}

/// List plans (inactive ones only for admins)
#[utoipa::path(
    get,
    path = "/api/subscriptions/plans",
    tag = "Subscription Plans",
    security(("bearer_auth" = [])),
    params(PaginationParams),
    responses((status = 200, description = "Paginated plans", body = [PlanResponse]))
)]
pub async fn list_plans(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<PaginationParams>,
) -> AppResult<ApiResponse<Vec<PlanResponse>>> {
    let page = state.plan_service.list_plans(&current_user, params).await?;
    Ok(paginated(page, &params, "Plans retrieved successfully."))
}

/// List active plans
#[utoipa::path(
    get,
    path = "/api/subscriptions/plans/active",
    tag = "Subscription Plans",
    security(("bearer_auth" = [])),
    params(PaginationParams),
    responses((status = 200, description = "Paginated active plans", body = [PlanResponse]))
)]
pub async fn active_plans(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<PaginationParams>,
) -> AppResult<ApiResponse<Vec<PlanResponse>>> {
    let page = state.plan_service.active_plans(params).await?;
    Ok(paginated(page, &params, "Active plans retrieved successfully."))
}

/// Create a plan (admin only)
#[utoipa::path(
    post,
    path = "/api/subscriptions/plans",
    tag = "Subscription Plans",
    security(("bearer_auth" = [])),
    request_body = CreatePlan,
    responses(
        (status = 201, description = "Plan created successfully", body = PlanResponse),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Forbidden - Admin only")
    )
)]
pub async fn create_plan(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreatePlan>,
) -> AppResult<Created<PlanResponse>> {
    let plan = state.plan_service.create_plan(&current_user, payload).await?;
    Ok(Created(plan.into(), "Plan created successfully."))
}

/// Get a plan
#[utoipa::path(
    get,
    path = "/api/subscriptions/plans/{id}",
    tag = "Subscription Plans",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Plan ID")),
    responses(
        (status = 200, description = "Plan", body = PlanResponse),
        (status = 404, description = "Plan not found")
    )
)]
pub async fn get_plan(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<ApiResponse<PlanResponse>> {
    let plan = state.plan_service.get_plan(&current_user, id).await?;
    Ok(ApiResponse::success(plan.into()))
}

/// Replace a plan (admin only)
#[utoipa::path(
    put,
    path = "/api/subscriptions/plans/{id}",
    tag = "Subscription Plans",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Plan ID")),
    request_body = CreatePlan,
    responses(
        (status = 200, description = "Plan updated successfully", body = PlanResponse),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 404, description = "Plan not found")
    )
)]
pub async fn replace_plan(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<CreatePlan>,
) -> AppResult<ApiResponse<PlanResponse>> {
    let plan = state
        .plan_service
        .update_plan(&current_user, id, UpdatePlan::from(payload))
        .await?;
    Ok(ApiResponse::with_message(plan.into(), "Plan updated successfully."))
}

/// Partially update a plan (admin only)
#[utoipa::path(
    patch,
    path = "/api/subscriptions/plans/{id}",
    tag = "Subscription Plans",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Plan ID")),
    request_body = UpdatePlan,
    responses(
        (status = 200, description = "Plan updated successfully", body = PlanResponse),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 404, description = "Plan not found")
    )
)]
pub async fn update_plan(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdatePlan>,
) -> AppResult<ApiResponse<PlanResponse>> {
    let plan = state
        .plan_service
        .update_plan(&current_user, id, payload)
        .await?;
    Ok(ApiResponse::with_message(plan.into(), "Plan updated successfully."))
}

/// Delete a plan no subscription references (admin only)
#[utoipa::path(
    delete,
    path = "/api/subscriptions/plans/{id}",
    tag = "Subscription Plans",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Plan ID")),
    responses(
        (status = 200, description = "Plan deleted successfully"),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 404, description = "Plan not found"),
        (status = 409, description = "Plan still has subscriptions")
    )
)]
pub async fn delete_plan(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<ApiResponse<()>> {
    state.plan_service.delete_plan(&current_user, id).await?;
    Ok(ApiResponse::message("Plan deleted successfully."))
}

/// List subscriptions in scope
#[utoipa::path(
    get,
    path = "/api/subscriptions/subscriptions",
    tag = "Subscriptions",
    security(("bearer_auth" = [])),
    params(PaginationParams),
    responses((status = 200, description = "Paginated subscriptions", body = [SubscriptionResponse]))
)]
pub async fn list_subscriptions(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<PaginationParams>,
) -> AppResult<ApiResponse<Vec<SubscriptionResponse>>> {
    let page = state.subscription_service.list(&current_user, params).await?;
    Ok(paginated(page, &params, "Subscriptions retrieved successfully."))
}

/// The requester's subscription history
#[utoipa::path(
    get,
    path = "/api/subscriptions/subscriptions/my_subscriptions",
    tag = "Subscriptions",
    security(("bearer_auth" = [])),
    params(PaginationParams),
    responses((status = 200, description = "Paginated subscriptions", body = [SubscriptionResponse]))
)]
pub async fn my_subscriptions(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<PaginationParams>,
) -> AppResult<ApiResponse<Vec<SubscriptionResponse>>> {
    let page = state
        .subscription_service
        .my_subscriptions(&current_user, params)
        .await?;
    Ok(paginated(page, &params, "Subscriptions retrieved successfully."))
}

/// The requester's subscription that is active today
#[utoipa::path(
    get,
    path = "/api/subscriptions/subscriptions/my_subscription",
    tag = "Subscriptions",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Active subscription", body = SubscriptionResponse),
        (status = 404, description = "No active subscription")
    )
)]
pub async fn my_subscription(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<SubscriptionResponse>> {
    let subscription = state
        .subscription_service
        .my_subscription(&current_user)
        .await?;
    Ok(ApiResponse::success(subscription))
}

/// The requester's most recently started subscription
#[utoipa::path(
    get,
    path = "/api/subscriptions/subscriptions/current",
    tag = "Subscriptions",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Latest subscription", body = SubscriptionResponse),
        (status = 404, description = "No subscription")
    )
)]
pub async fn current_subscription(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<SubscriptionResponse>> {
    let subscription = state.subscription_service.current(&current_user).await?;
    Ok(ApiResponse::success(subscription))
}

/// Create a subscription (admin only)
#[utoipa::path(
    post,
    path = "/api/subscriptions/subscriptions",
    tag = "Subscriptions",
    security(("bearer_auth" = [])),
    request_body = CreateSubscription,
    responses(
        (status = 201, description = "Subscription created successfully", body = SubscriptionResponse),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Forbidden - Admin only")
    )
)]
pub async fn create_subscription(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateSubscription>,
) -> AppResult<Created<SubscriptionResponse>> {
    let subscription = state
        .subscription_service
        .create(&current_user, payload)
        .await?;
    Ok(Created(subscription, "Subscription created successfully."))
}

/// Get a subscription
#[utoipa::path(
    get,
    path = "/api/subscriptions/subscriptions/{id}",
    tag = "Subscriptions",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Subscription ID")),
    responses(
        (status = 200, description = "Subscription", body = SubscriptionResponse),
        (status = 404, description = "Subscription not found")
    )
)]
pub async fn get_subscription(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<ApiResponse<SubscriptionResponse>> {
    let subscription = state.subscription_service.get(&current_user, id).await?;
    Ok(ApiResponse::success(subscription))
}

/// Replace a subscription (admin only)
#[utoipa::path(
    put,
    path = "/api/subscriptions/subscriptions/{id}",
    tag = "Subscriptions",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Subscription ID")),
    request_body = CreateSubscription,
    responses(
        (status = 200, description = "Subscription updated successfully", body = SubscriptionResponse),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 404, description = "Subscription not found")
    )
)]
pub async fn replace_subscription(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<CreateSubscription>,
) -> AppResult<ApiResponse<SubscriptionResponse>> {
    let subscription = state
        .subscription_service
        .update(&current_user, id, UpdateSubscription::from(payload))
        .await?;
    Ok(ApiResponse::with_message(
        subscription,
        "Subscription updated successfully.",
    ))
}

/// Partially update a subscription (admin only)
#[utoipa::path(
    patch,
    path = "/api/subscriptions/subscriptions/{id}",
    tag = "Subscriptions",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Subscription ID")),
    request_body = UpdateSubscription,
    responses(
        (status = 200, description = "Subscription updated successfully", body = SubscriptionResponse),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 404, description = "Subscription not found")
    )
)]
pub async fn update_subscription(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateSubscription>,
) -> AppResult<ApiResponse<SubscriptionResponse>> {
    let subscription = state
        .subscription_service
        .update(&current_user, id, payload)
        .await?;
    Ok(ApiResponse::with_message(
        subscription,
        "Subscription updated successfully.",
    ))
}

/// Delete a subscription (admin only)
#[utoipa::path(
    delete,
    path = "/api/subscriptions/subscriptions/{id}",
    tag = "Subscriptions",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Subscription ID")),
    responses(
        (status = 200, description = "Subscription deleted successfully"),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 404, description = "Subscription not found")
    )
)]
pub async fn delete_subscription(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<ApiResponse<()>> {
    state.subscription_service.delete(&current_user, id).await?;
    Ok(ApiResponse::message("Subscription deleted successfully."))
}

/// Cancel a subscription (admin only)
#[utoipa::path(
    post,
    path = "/api/subscriptions/subscriptions/{id}/cancel",
    tag = "Subscriptions",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Subscription ID")),
    responses(
        (status = 200, description = "Subscription cancelled successfully"),
        (status = 400, description = "Subscription is already cancelled"),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 404, description = "Subscription not found")
    )
)]
pub async fn cancel_subscription(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<ApiResponse<()>> {
    let subscription = state.subscription_service.cancel(&current_user, id).await?;
    tracing::debug!(subscription_id = %subscription.id, "Subscription cancelled via API");
    Ok(ApiResponse::message("Subscription cancelled successfully."))
}
