use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::packages::{CreatePackageRequest, PackageList, UpdatePackageRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Package,
    response::ApiResponse,
    routes::params::PackageListQuery,
    services::package_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_packages).post(create_package))
        .route(
            "/{id}",
            get(get_package).put(update_package).delete(delete_package),
        )
}

#[utoipa::path(
    get,
    path = "/api/packages",
    responses(
        (status = 200, description = "List packages", body = ApiResponse<PackageList>)
    ),
    tag = "Packages"
)]
pub async fn list_packages(
    State(state): State<AppState>,
    Query(query): Query<PackageListQuery>,
) -> AppResult<Json<ApiResponse<PackageList>>> {
    let resp = package_service::list_packages(&state, query.vendor_id, query.pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/packages/{id}",
    responses(
        (status = 200, description = "Get one package", body = ApiResponse<Package>),
        (status = 404, description = "Package does not exist")
    ),
    tag = "Packages"
)]
pub async fn get_package(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Package>>> {
    let resp = package_service::get_package(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/packages",
    request_body = CreatePackageRequest,
    responses(
        (status = 200, description = "Create a package", body = ApiResponse<Package>),
        (status = 403, description = "Caller is not a vendor")
    ),
    security(("bearer_auth" = [])),
    tag = "Packages"
)]
pub async fn create_package(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreatePackageRequest>,
) -> AppResult<Json<ApiResponse<Package>>> {
    let resp = package_service::create_package(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/packages/{id}",
    request_body = UpdatePackageRequest,
    responses(
        (status = 200, description = "Update a package", body = ApiResponse<Package>),
        (status = 404, description = "Package does not exist")
    ),
    security(("bearer_auth" = [])),
    tag = "Packages"
)]
pub async fn update_package(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePackageRequest>,
) -> AppResult<Json<ApiResponse<Package>>> {
    let resp = package_service::update_package(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/packages/{id}",
    responses(
        (status = 200, description = "Delete a package"),
        (status = 404, description = "Package does not exist")
    ),
    security(("bearer_auth" = [])),
    tag = "Packages"
)]
pub async fn delete_package(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = package_service::delete_package(&state, &user, id).await?;
    Ok(Json(resp))
}
