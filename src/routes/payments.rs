use axum::{Json, Router, extract::State, routing::post};

use crate::{
    dto::orders::{PaymentEvent, PaymentWebhookRequest},
    error::AppResult,
    models::Order,
    response::ApiResponse,
    services::order_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/webhook", post(payment_webhook))
}

/// Entry point for payment-provider callbacks. A captured payment moves an
/// accepted order to ongoing; a completed payout transfer moves an ongoing
/// order to completed.
#[utoipa::path(
    post,
    path = "/api/payments/webhook",
    request_body = PaymentWebhookRequest,
    responses(
        (status = 200, description = "Order advanced by a payment event", body = ApiResponse<Order>),
        (status = 409, description = "Order is not in the expected state")
    ),
    tag = "Payments"
)]
pub async fn payment_webhook(
    State(state): State<AppState>,
    Json(payload): Json<PaymentWebhookRequest>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let resp = match payload.event {
        PaymentEvent::PaymentCaptured => {
            order_service::payment_captured(&state, payload.order_id).await?
        }
        PaymentEvent::TransferCompleted => {
            order_service::transfer_completed(&state, payload.order_id).await?
        }
    };
    Ok(Json(resp))
}
