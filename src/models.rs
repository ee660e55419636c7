use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Closed set of marketplace roles; fee calculation and order scoping dispatch
/// on this instead of ad-hoc string checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Customer,
    Vendor,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Vendor => "vendor",
        }
    }

    pub fn parse(value: &str) -> Option<Role> {
        match value {
            "customer" => Some(Role::Customer),
            "vendor" => Some(Role::Vendor),
            _ => None,
        }
    }
}

/// Order lifecycle states. The status column is the single source of truth for
/// which operations are legal; only the order service writes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Accepted,
    Rejected,
    Declined,
    Ongoing,
    Started,
    Completed,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Accepted => "accepted",
            OrderStatus::Rejected => "rejected",
            OrderStatus::Declined => "declined",
            OrderStatus::Ongoing => "ongoing",
            OrderStatus::Started => "started",
            OrderStatus::Completed => "completed",
        }
    }

    pub fn parse(value: &str) -> Option<OrderStatus> {
        match value {
            "pending" => Some(OrderStatus::Pending),
            "accepted" => Some(OrderStatus::Accepted),
            "rejected" => Some(OrderStatus::Rejected),
            "declined" => Some(OrderStatus::Declined),
            "ongoing" => Some(OrderStatus::Ongoing),
            "started" => Some(OrderStatus::Started),
            "completed" => Some(OrderStatus::Completed),
            _ => None,
        }
    }

    /// Statuses during which a vendor's occupied window blocks other bookings.
    pub const VENDOR_OCCUPYING: [&'static str; 3] = ["accepted", "ongoing", "started"];

    /// Statuses counted when checking a customer's own bookings with a vendor.
    pub const CUSTOMER_OCCUPYING: [&'static str; 4] = ["pending", "accepted", "ongoing", "started"];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Full,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Full => "full",
        }
    }

    pub fn parse(value: &str) -> Option<PaymentStatus> {
        match value {
            "pending" => Some(PaymentStatus::Pending),
            "full" => Some(PaymentStatus::Full),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Vendor {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub device_id: Option<String>,
    pub timezone: String,
    pub operation_start_time: String,
    pub operation_end_time: String,
    pub available_days: Vec<String>,
    pub longitude: f64,
    pub latitude: f64,
    pub payment_account_connected: bool,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Customer {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub device_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Package {
    pub id: Uuid,
    pub vendor_id: Uuid,
    pub title: String,
    pub price: f64,
    pub setup_fee: f64,
    pub setup_duration: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CartItem {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub vendor_id: Uuid,
    pub package_id: Uuid,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub order_id: String,
    pub customer_id: Uuid,
    pub vendor_id: Uuid,
    pub package_id: Option<Uuid>,
    pub is_custom_order: bool,
    pub delivery_date_and_time: DateTime<Utc>,
    pub is_setup: bool,
    pub setup_duration: Option<String>,
    pub setup_start_date_and_time: Option<DateTime<Utc>>,
    pub amount: Option<f64>,
    pub offered_amount: Option<f64>,
    pub delivery_fee: f64,
    pub setup_fee: f64,
    pub is_instant_transfer: bool,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub delivery_decline_message: Option<String>,
    pub delivery_longitude: f64,
    pub delivery_latitude: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
