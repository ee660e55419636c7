use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Role;

/// Vendor profile details supplied at registration.
#[derive(Deserialize, Debug, ToSchema)]
pub struct VendorProfile {
    pub timezone: String,
    pub operation_start_time: String,
    pub operation_end_time: String,
    pub available_days: Vec<String>,
    pub longitude: f64,
    pub latitude: f64,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: Role,
    pub device_id: Option<String>,
    /// Required when registering as a vendor.
    pub vendor: Option<VendorProfile>,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub exp: usize,
}
