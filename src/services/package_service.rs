use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::packages::{CreatePackageRequest, PackageList, UpdatePackageRequest},
    entity::{
        packages::{ActiveModel, Column, Entity as Packages, Model as PackageModel},
        vendors::{Column as VendorCol, Entity as Vendors},
    },
    error::{AppError, AppResult},
    middleware::auth::{ensure_vendor, AuthUser},
    models::Package,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    scheduling::parse_duration,
    state::AppState,
};

pub async fn list_packages(
    state: &AppState,
    vendor_id: Option<Uuid>,
    pagination: Pagination,
) -> AppResult<ApiResponse<PackageList>> {
    let (page, limit, offset) = pagination.normalize();
    let mut condition = Condition::all();
    if let Some(vendor_id) = vendor_id {
        condition = condition.add(Column::VendorId.eq(vendor_id));
    }

    let finder = Packages::find()
        .filter(condition)
        .order_by_desc(Column::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(package_from_entity)
        .collect();

    Ok(ApiResponse::paginated("Packages", PackageList { items }, page, limit, total))
}

pub async fn get_package(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Package>> {
    let package = Packages::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::NotFound("Package does not exist".to_string()))?;
    Ok(ApiResponse::success("Package", package_from_entity(package), None))
}

pub async fn create_package(
    state: &AppState,
    user: &AuthUser,
    payload: CreatePackageRequest,
) -> AppResult<ApiResponse<Package>> {
    ensure_vendor(user)?;
    let vendor = Vendors::find()
        .filter(VendorCol::UserId.eq(user.user_id))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::NotFound("Vendor profile not found".to_string()))?;

    if let Some(spec) = payload.setup_duration.as_deref() {
        parse_duration(spec)?;
    }

    let package = ActiveModel {
        id: Set(Uuid::new_v4()),
        vendor_id: Set(vendor.id),
        title: Set(payload.title),
        price: Set(payload.price),
        setup_fee: Set(payload.setup_fee),
        setup_duration: Set(payload.setup_duration),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "package_create",
        Some("packages"),
        Some(serde_json::json!({ "package_id": package.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Package created",
        package_from_entity(package),
        Some(Meta::empty()),
    ))
}

pub async fn update_package(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdatePackageRequest,
) -> AppResult<ApiResponse<Package>> {
    ensure_vendor(user)?;
    let vendor = Vendors::find()
        .filter(VendorCol::UserId.eq(user.user_id))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::NotFound("Vendor profile not found".to_string()))?;

    let package = Packages::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::NotFound("Package does not exist".to_string()))?;
    if package.vendor_id != vendor.id {
        return Err(AppError::Forbidden);
    }

    if let Some(spec) = payload.setup_duration.as_deref() {
        parse_duration(spec)?;
    }

    let mut active: ActiveModel = package.into();
    if let Some(title) = payload.title {
        active.title = Set(title);
    }
    if let Some(price) = payload.price {
        active.price = Set(price);
    }
    if let Some(setup_fee) = payload.setup_fee {
        active.setup_fee = Set(setup_fee);
    }
    if payload.setup_duration.is_some() {
        active.setup_duration = Set(payload.setup_duration);
    }
    let package = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Package updated",
        package_from_entity(package),
        Some(Meta::empty()),
    ))
}

pub async fn delete_package(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_vendor(user)?;
    let vendor = Vendors::find()
        .filter(VendorCol::UserId.eq(user.user_id))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::NotFound("Vendor profile not found".to_string()))?;

    let package = Packages::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::NotFound("Package does not exist".to_string()))?;
    if package.vendor_id != vendor.id {
        return Err(AppError::Forbidden);
    }

    Packages::delete_by_id(id).exec(&state.orm).await?;

    Ok(ApiResponse::success(
        "Package deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

fn package_from_entity(model: PackageModel) -> Package {
    Package {
        id: model.id,
        vendor_id: model.vendor_id,
        title: model.title,
        price: model.price,
        setup_fee: model.setup_fee,
        setup_duration: model.setup_duration,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
