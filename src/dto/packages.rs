use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Package;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePackageRequest {
    pub title: String,
    pub price: f64,
    #[serde(default)]
    pub setup_fee: f64,
    pub setup_duration: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdatePackageRequest {
    pub title: Option<String>,
    pub price: Option<f64>,
    pub setup_fee: Option<f64>,
    pub setup_duration: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PackageList {
    pub items: Vec<Package>,
}
