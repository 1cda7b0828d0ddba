use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use axum_extra::extract::WithRejection;
use std::sync::Arc;
use tracing::info;

use crate::db::models::{ListSubscriptionsResponse, Subscription, TotalCostResponse};
use crate::web::models::{
    ApiResponse, CreateSubscriptionRequest, ListQuery, StatusResponse, TotalCostQuery,
    UpdateSubscriptionRequest,
};
use crate::web::{AppError, AppState};

pub const BASE_PATH: &str = "/api/v1/subscriptions";

// --- Route Handlers ---

#[utoipa::path(
    post,
    path = "/api/v1/subscriptions",
    tag = "subscriptions",
    request_body = CreateSubscriptionRequest,
    responses(
        (status = 200, description = "Subscription created", body = ApiResponse<Subscription>),
        (status = 400, description = "Invalid request", body = StatusResponse),
        (status = 500, description = "Store failure", body = StatusResponse)
    )
)]
pub(crate) async fn create_subscription_handler(
    State(app_state): State<Arc<AppState>>,
    WithRejection(Json(payload), _): WithRejection<Json<CreateSubscriptionRequest>, AppError>,
) -> Result<Json<ApiResponse<Subscription>>, AppError> {
    let new_subscription = payload.validate()?;
    let subscription = app_state
        .subscription_service
        .create_subscription(new_subscription)
        .await?;

    info!(
        id = subscription.id,
        user_id = %subscription.user_id,
        service_name = %subscription.service_name,
        price = subscription.price,
        "Subscription created."
    );
    Ok(Json(ApiResponse::success(subscription)))
}

#[utoipa::path(
    get,
    path = "/api/v1/subscriptions/{id}",
    tag = "subscriptions",
    params(("id" = i32, Path, description = "Subscription id")),
    responses(
        (status = 200, description = "Subscription found", body = ApiResponse<Subscription>),
        (status = 400, description = "Invalid id", body = StatusResponse),
        (status = 404, description = "Subscription not found", body = StatusResponse),
        (status = 500, description = "Store failure", body = StatusResponse)
    )
)]
pub(crate) async fn get_subscription_handler(
    State(app_state): State<Arc<AppState>>,
    WithRejection(Path(id), _): WithRejection<Path<i32>, AppError>,
) -> Result<Json<ApiResponse<Subscription>>, AppError> {
    let subscription = app_state.subscription_service.get_subscription(id).await?;
    info!(id, "Subscription fetched.");
    Ok(Json(ApiResponse::success(subscription)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/subscriptions/{id}",
    tag = "subscriptions",
    params(("id" = i32, Path, description = "Subscription id")),
    responses(
        (status = 200, description = "Subscription deleted", body = StatusResponse),
        (status = 400, description = "Invalid id", body = StatusResponse),
        (status = 404, description = "Subscription not found", body = StatusResponse),
        (status = 500, description = "Store failure", body = StatusResponse)
    )
)]
pub(crate) async fn delete_subscription_handler(
    State(app_state): State<Arc<AppState>>,
    WithRejection(Path(id), _): WithRejection<Path<i32>, AppError>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    app_state.subscription_service.delete_subscription(id).await?;
    info!(id, "Subscription deleted.");
    Ok(Json(ApiResponse::ok()))
}

#[utoipa::path(
    get,
    path = "/api/v1/subscriptions/list",
    tag = "subscriptions",
    params(ListQuery),
    responses(
        (status = 200, description = "One page of live subscriptions", body = ApiResponse<ListSubscriptionsResponse>),
        (status = 500, description = "Store failure", body = StatusResponse)
    )
)]
pub(crate) async fn list_subscriptions_handler(
    State(app_state): State<Arc<AppState>>,
    WithRejection(Query(query), _): WithRejection<Query<ListQuery>, AppError>,
) -> Result<Json<ApiResponse<ListSubscriptionsResponse>>, AppError> {
    let pagination = query.pagination();
    let data = app_state
        .subscription_service
        .list_subscriptions(pagination)
        .await?;

    info!(
        page = pagination.page(),
        limit = pagination.limit(),
        count = data.subscriptions.len(),
        total = data.total,
        "Subscriptions listed."
    );
    Ok(Json(ApiResponse::success(data)))
}

#[utoipa::path(
    put,
    path = "/api/v1/subscriptions/{id}",
    tag = "subscriptions",
    params(("id" = i32, Path, description = "Subscription id")),
    request_body = UpdateSubscriptionRequest,
    responses(
        (status = 200, description = "Subscription updated", body = ApiResponse<Subscription>),
        (status = 400, description = "Invalid request", body = StatusResponse),
        (status = 404, description = "Subscription not found", body = StatusResponse),
        (status = 500, description = "Store failure", body = StatusResponse)
    )
)]
pub(crate) async fn update_subscription_handler(
    State(app_state): State<Arc<AppState>>,
    WithRejection(Path(id), _): WithRejection<Path<i32>, AppError>,
    WithRejection(Json(payload), _): WithRejection<Json<UpdateSubscriptionRequest>, AppError>,
) -> Result<Json<ApiResponse<Subscription>>, AppError> {
    let patch = payload.into_patch()?;
    let subscription = app_state
        .subscription_service
        .update_subscription(id, patch)
        .await?;
    info!(id, "Subscription updated.");
    Ok(Json(ApiResponse::success(subscription)))
}

#[utoipa::path(
    get,
    path = "/api/v1/subscriptions/total",
    tag = "subscriptions",
    params(TotalCostQuery),
    responses(
        (status = 200, description = "Summed monthly price of overlapping subscriptions", body = ApiResponse<TotalCostResponse>),
        (status = 400, description = "Invalid query", body = StatusResponse),
        (status = 500, description = "Store failure", body = StatusResponse)
    )
)]
pub(crate) async fn get_total_cost_handler(
    State(app_state): State<Arc<AppState>>,
    WithRejection(Query(query), _): WithRejection<Query<TotalCostQuery>, AppError>,
) -> Result<Json<ApiResponse<TotalCostResponse>>, AppError> {
    let filter = query.validate()?;
    let data = app_state.subscription_service.get_total_cost(&filter).await?;

    info!(
        start = %filter.period_start,
        end = %filter.period_end,
        user_id = ?filter.user_id,
        service_name = ?filter.service_name,
        total = data.total,
        "Total cost calculated."
    );
    Ok(Json(ApiResponse::success(data)))
}

// --- Router ---

pub fn create_subscriptions_router() -> Router<Arc<AppState>> {
    Router::new()
        .route(BASE_PATH, post(create_subscription_handler))
        .route(&format!("{BASE_PATH}/"), post(create_subscription_handler))
        .route(&format!("{BASE_PATH}/total"), get(get_total_cost_handler))
        .route(&format!("{BASE_PATH}/list"), get(list_subscriptions_handler))
        .route(
            &format!("{BASE_PATH}/{{id}}"),
            get(get_subscription_handler)
                .put(update_subscription_handler)
                .delete(delete_subscription_handler),
        )
}
