use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, patch, post},
};
use uuid::Uuid;

use crate::{
    dto::orders::{
        CreateOrderRequest, DeclineOrderRequest, DeliveryCharge, DeliveryChargeQuery,
        EnrichedOrderList, OrderList, VendorDecisionRequest,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::Order,
    response::ApiResponse,
    routes::params::OrderListQuery,
    services::order_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_orders).post(create_order))
        .route("/me", get(list_my_orders))
        .route("/delivery-charge/{vendor_id}", get(get_delivery_charge))
        .route("/{id}", get(get_order))
        .route("/{id}/decision", patch(vendor_decision))
        .route("/{id}/decline", patch(decline_order))
        .route("/{id}/start-delivery", post(start_delivery))
}

#[utoipa::path(
    post,
    path = "/api/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 200, description = "Create a pending order", body = ApiResponse<Order>),
        (status = 400, description = "Validation failure"),
        (status = 409, description = "Scheduling conflict")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn create_order(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateOrderRequest>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let resp = order_service::create_order(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/orders",
    responses(
        (status = 200, description = "List orders", body = ApiResponse<OrderList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let resp = order_service::list_orders(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/orders/me",
    responses(
        (status = 200, description = "Role-scoped orders with fee breakdown", body = ApiResponse<EnrichedOrderList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn list_my_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<ApiResponse<EnrichedOrderList>>> {
    let resp = order_service::list_orders_for_user(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    responses(
        (status = 200, description = "Get one order", body = ApiResponse<Order>),
        (status = 404, description = "Order does not exist")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let resp = order_service::get_order(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/orders/{id}/decision",
    request_body = VendorDecisionRequest,
    responses(
        (status = 200, description = "Vendor accepts or rejects a pending order", body = ApiResponse<Order>),
        (status = 409, description = "Invalid state or scheduling conflict")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn vendor_decision(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<VendorDecisionRequest>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let resp = order_service::vendor_accept_or_reject(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/orders/{id}/decline",
    request_body = DeclineOrderRequest,
    responses(
        (status = 200, description = "Customer declines an accepted order", body = ApiResponse<Order>),
        (status = 409, description = "Invalid state")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn decline_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<DeclineOrderRequest>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let resp = order_service::decline_order(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/orders/{id}/start-delivery",
    responses(
        (status = 200, description = "Vendor starts delivery of an ongoing order", body = ApiResponse<Order>),
        (status = 409, description = "Another delivery already in progress")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn start_delivery(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let resp = order_service::start_order_delivery(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/orders/delivery-charge/{vendor_id}",
    params(
        ("longitude" = f64, Query, description = "Delivery longitude"),
        ("latitude" = f64, Query, description = "Delivery latitude")
    ),
    responses(
        (status = 200, description = "Distance-based delivery charge", body = ApiResponse<DeliveryCharge>),
        (status = 404, description = "Vendor not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn get_delivery_charge(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(vendor_id): Path<Uuid>,
    Query(query): Query<DeliveryChargeQuery>,
) -> AppResult<Json<ApiResponse<DeliveryCharge>>> {
    let resp = order_service::get_delivery_charge(&state, vendor_id, query).await?;
    Ok(Json(resp))
}
