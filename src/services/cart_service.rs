use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::cart::{AddToCartRequest, CartList},
    entity::{
        cart_items::{ActiveModel as CartActive, Column as CartCol, Entity as CartItems},
        customers::{Column as CustomerCol, Entity as Customers},
        packages::{Entity as Packages},
    },
    error::{AppError, AppResult},
    middleware::auth::{ensure_customer, AuthUser},
    models::CartItem,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    state::AppState,
};

pub async fn list_cart(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<CartList>> {
    ensure_customer(user)?;
    let customer_id = customer_id_for(state, user.user_id).await?;
    let (page, limit, offset) = pagination.normalize();

    let finder = CartItems::find()
        .filter(CartCol::CustomerId.eq(customer_id))
        .order_by_desc(CartCol::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(cart_item_from_entity)
        .collect();

    Ok(ApiResponse::paginated("Ok", CartList { items }, page, limit, total))
}

pub async fn add_to_cart(
    state: &AppState,
    user: &AuthUser,
    payload: AddToCartRequest,
) -> AppResult<ApiResponse<CartItem>> {
    ensure_customer(user)?;
    if payload.quantity <= 0 {
        return Err(AppError::Validation(
            "Quantity must be greater than 0".to_string(),
        ));
    }

    let customer_id = customer_id_for(state, user.user_id).await?;

    let package = Packages::find_by_id(payload.package_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::NotFound("Package does not exist".to_string()))?;
    if package.vendor_id != payload.vendor_id {
        return Err(AppError::Validation(
            "Package does not belong to the requested vendor".to_string(),
        ));
    }

    let existing = CartItems::find()
        .filter(CartCol::CustomerId.eq(customer_id))
        .filter(CartCol::PackageId.eq(payload.package_id))
        .one(&state.orm)
        .await?;

    let item = if let Some(item) = existing {
        let mut active: CartActive = item.into();
        active.quantity = Set(payload.quantity);
        active.update(&state.orm).await?
    } else {
        CartActive {
            id: Set(Uuid::new_v4()),
            customer_id: Set(customer_id),
            vendor_id: Set(payload.vendor_id),
            package_id: Set(payload.package_id),
            quantity: Set(payload.quantity),
            created_at: NotSet,
        }
        .insert(&state.orm)
        .await?
    };

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "cart_update",
        Some("cart_items"),
        Some(serde_json::json!({
            "package_id": payload.package_id,
            "quantity": payload.quantity,
        })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Cart updated",
        cart_item_from_entity(item),
        None,
    ))
}

pub async fn remove_from_cart(
    state: &AppState,
    user: &AuthUser,
    package_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_customer(user)?;
    let customer_id = customer_id_for(state, user.user_id).await?;

    let result = CartItems::delete_many()
        .filter(CartCol::CustomerId.eq(customer_id))
        .filter(CartCol::PackageId.eq(package_id))
        .exec(&state.orm)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Cart item not found".to_string()));
    }

    Ok(ApiResponse::success(
        "Removed from cart",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

async fn customer_id_for(state: &AppState, user_id: Uuid) -> AppResult<Uuid> {
    let customer = Customers::find()
        .filter(CustomerCol::UserId.eq(user_id))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::NotFound("Customer profile not found".to_string()))?;
    Ok(customer.id)
}

fn cart_item_from_entity(model: crate::entity::cart_items::Model) -> CartItem {
    CartItem {
        id: model.id,
        customer_id: model.customer_id,
        vendor_id: model.vendor_id,
        package_id: model.package_id,
        quantity: model.quantity,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
