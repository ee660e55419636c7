use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{models::Order, pricing::FeeBreakdown};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub vendor_id: Uuid,
    /// Required unless `is_custom_order` is set.
    pub package_id: Option<Uuid>,
    #[serde(default)]
    pub is_custom_order: bool,
    pub offered_amount: f64,
    pub delivery_date_and_time: DateTime<Utc>,
    pub delivery_longitude: f64,
    pub delivery_latitude: f64,
    /// When absent on a custom order the fee is derived from distance.
    pub delivery_fee: Option<f64>,
    #[serde(default)]
    pub is_setup: bool,
    pub setup_duration: Option<String>,
    #[serde(default)]
    pub is_instant_transfer: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum VendorDecision {
    Accepted,
    Rejected,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct VendorDecisionRequest {
    pub status: VendorDecision,
    /// Final order amount; required when accepting.
    pub amount: Option<f64>,
    pub setup_fee: Option<f64>,
    pub setup_duration: Option<String>,
    pub delivery_fee: Option<f64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DeclineOrderRequest {
    pub delivery_decline_message: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DeliveryChargeQuery {
    pub longitude: f64,
    pub latitude: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeliveryCharge {
    /// Charge in dollars, formatted with two decimals.
    pub delivery_charge: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentEvent {
    PaymentCaptured,
    TransferCompleted,
}

/// Callback payload posted by the payment collaborator's webhook handler.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PaymentWebhookRequest {
    pub order_id: Uuid,
    pub event: PaymentEvent,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<Order>,
}

/// An order joined with the caller's role-specific fee view.
#[derive(Debug, Serialize, ToSchema)]
pub struct EnrichedOrder {
    #[serde(flatten)]
    pub order: Order,
    #[serde(flatten)]
    pub fees: FeeBreakdown,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EnrichedOrderList {
    pub items: Vec<EnrichedOrder>,
}
