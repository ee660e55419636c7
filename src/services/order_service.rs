use chrono::Utc;
use chrono_tz::Tz;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::log_order_event,
    dto::orders::{
        CreateOrderRequest, DeclineOrderRequest, DeliveryCharge, DeliveryChargeQuery,
        EnrichedOrder, EnrichedOrderList, OrderList, VendorDecision, VendorDecisionRequest,
    },
    entity::{
        cart_items::{Column as CartCol, Entity as CartItems},
        customers::{Column as CustomerCol, Entity as Customers, Model as CustomerModel},
        orders::{
            ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel,
        },
        packages::{Entity as Packages, Model as PackageModel},
        users::{Entity as Users, Model as UserModel},
        vendors::{Column as VendorCol, Entity as Vendors, Model as VendorModel},
    },
    error::{AppError, AppResult},
    geo::{distance_miles, round2},
    middleware::auth::{ensure_customer, ensure_vendor, AuthUser},
    models::{Order, OrderStatus, PaymentStatus, Role},
    notify::{DeliveryMeta, Notification},
    order_id::allocate_order_id,
    pricing::{calculate_order_charges, FeeInputs},
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    scheduling::{parse_duration, validate_operating_hours, weekday_name, OccupiedWindow},
    state::AppState,
};

/// Creates a pending order for the authenticated customer, validating vendor
/// availability, operating hours (custom orders) and scheduling conflicts.
pub async fn create_order(
    state: &AppState,
    user: &AuthUser,
    payload: CreateOrderRequest,
) -> AppResult<ApiResponse<Order>> {
    ensure_customer(user)?;
    let customer = customer_for_user(&state.orm, user.user_id).await?;
    let (vendor, _) = active_vendor(&state.orm, payload.vendor_id).await?;

    let package = if payload.is_custom_order {
        None
    } else {
        let package_id = payload
            .package_id
            .ok_or_else(|| AppError::Validation("Package id is required".to_string()))?;
        Some(find_package(&state.orm, package_id, vendor.id).await?)
    };

    let now = Utc::now();
    let delivery = payload.delivery_date_and_time;
    if delivery < now {
        return Err(AppError::Validation(
            "Order cannot be created in the past".to_string(),
        ));
    }

    let timezone = vendor_timezone(&vendor)?;
    let requested_day = weekday_name(delivery, timezone);
    if !available_days(&vendor)?.contains(&requested_day) {
        return Err(AppError::Validation(
            "Vendor is not available on the requested day".to_string(),
        ));
    }

    let delivery_fee = if payload.is_custom_order {
        validate_operating_hours(
            delivery,
            &vendor.operation_start_time,
            &vendor.operation_end_time,
            timezone,
        )?;
        match payload.delivery_fee {
            Some(fee) => fee,
            None => {
                let distance = distance_miles(
                    (vendor.longitude, vendor.latitude),
                    (payload.delivery_longitude, payload.delivery_latitude),
                );
                round2(distance * state.config.delivery_fee_per_mile)
            }
        }
    } else {
        payload.delivery_fee.unwrap_or(0.0)
    };

    let (setup_duration, setup_start, setup_fee) = if payload.is_setup {
        let duration_spec = payload
            .setup_duration
            .clone()
            .or_else(|| package.as_ref().and_then(|p| p.setup_duration.clone()))
            .ok_or_else(|| {
                AppError::Validation("Setup duration is required for setup orders".to_string())
            })?;
        let duration = parse_duration(&duration_spec)?;
        let setup_start = delivery - duration;
        if setup_start < now {
            return Err(AppError::Validation(format!(
                "Setup start {setup_start} conflicts with current time"
            )));
        }
        let setup_fee = package.as_ref().map(|p| p.setup_fee).unwrap_or(0.0);
        (Some(duration_spec), Some(setup_start), setup_fee)
    } else {
        (None, None, 0.0)
    };

    let window = match setup_start {
        Some(start) => OccupiedWindow::with_setup(start, delivery),
        None => OccupiedWindow::instant(delivery),
    };

    // The counter lock taken by the id allocator serializes concurrent
    // creations, so the conflict checks below cannot race another insert.
    let txn = state.orm.begin().await?;
    let order_id = allocate_order_id(&txn).await?;

    if find_conflicting_order(
        &txn,
        vendor.id,
        &window,
        &OrderStatus::VENDOR_OCCUPYING,
        None,
        None,
    )
    .await?
    .is_some()
    {
        return Err(AppError::SchedulingConflict(
            "The vendor is already busy during this time slot".to_string(),
        ));
    }

    if find_conflicting_order(
        &txn,
        vendor.id,
        &window,
        &OrderStatus::CUSTOMER_OCCUPYING,
        Some(customer.id),
        None,
    )
    .await?
    .is_some()
    {
        return Err(AppError::SchedulingConflict(
            "You have already placed an order with this vendor during this time slot".to_string(),
        ));
    }

    let inserted = OrderActive {
        id: Set(Uuid::new_v4()),
        order_id: Set(order_id.clone()),
        customer_id: Set(customer.id),
        vendor_id: Set(vendor.id),
        package_id: Set(package.as_ref().map(|p| p.id)),
        is_custom_order: Set(payload.is_custom_order),
        delivery_date_and_time: Set(delivery.fixed_offset()),
        is_setup: Set(payload.is_setup),
        setup_duration: Set(setup_duration),
        setup_start_date_and_time: Set(setup_start.map(|t| t.fixed_offset())),
        amount: Set(None),
        offered_amount: Set(Some(payload.offered_amount)),
        delivery_fee: Set(delivery_fee),
        setup_fee: Set(setup_fee),
        is_instant_transfer: Set(payload.is_instant_transfer),
        status: Set(OrderStatus::Pending.as_str().to_string()),
        payment_status: Set(PaymentStatus::Pending.as_str().to_string()),
        delivery_decline_message: Set(None),
        delivery_longitude: Set(payload.delivery_longitude),
        delivery_latitude: Set(payload.delivery_latitude),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;

    // The order replaces any cart line items the customer held for this vendor.
    CartItems::delete_many()
        .filter(CartCol::CustomerId.eq(customer.id))
        .filter(CartCol::VendorId.eq(vendor.id))
        .exec(&txn)
        .await?;

    txn.commit().await?;

    log_order_event(&state.pool, Some(user.user_id), "order_created", inserted.id).await;

    let order = order_from_entity(inserted)?;
    state.events.emit(
        "newOrder",
        vendor.user_id,
        serde_json::to_value(&order).unwrap_or_default(),
    );
    state.notifier.send(
        Notification {
            user_id: vendor.user_id,
            title: format!("New order request from {}", customer.name),
            message: format!(
                "{} has placed an order. Please accept or reject the order. Order ID: {}",
                customer.name, order_id
            ),
            recipient: Role::Vendor,
        },
        DeliveryMeta {
            device_id: vendor.device_id.clone(),
            destination: Some("order".to_string()),
        },
    );

    Ok(ApiResponse::success("Order created", order, Some(Meta::empty())))
}

/// Vendor accepts or rejects a pending order. Accepting requires an amount and
/// a connected, verified payment account, and re-runs the conflict check
/// excluding this order; rejecting skips the re-validation.
pub async fn vendor_accept_or_reject(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: VendorDecisionRequest,
) -> AppResult<ApiResponse<Order>> {
    ensure_vendor(user)?;
    let vendor = vendor_for_user(&state.orm, user.user_id).await?;
    let existing = find_order(&state.orm, id).await?;
    if existing.vendor_id != vendor.id {
        return Err(AppError::Forbidden);
    }
    if existing.status != OrderStatus::Pending.as_str() {
        return Err(AppError::InvalidState(
            "Only pending orders can be accepted or rejected".to_string(),
        ));
    }

    let customer = find_customer(&state.orm, existing.customer_id).await?;

    let mut update = Orders::update_many()
        .col_expr(OrderCol::UpdatedAt, Expr::value(Utc::now().fixed_offset()))
        .filter(OrderCol::Id.eq(id))
        .filter(OrderCol::Status.eq(OrderStatus::Pending.as_str()));

    let decision_label = match payload.status {
        VendorDecision::Accepted => {
            let amount = payload
                .amount
                .ok_or_else(|| AppError::Validation("Amount is required".to_string()))?;

            if vendor.payment_account_id.as_deref().unwrap_or("").is_empty()
                || !vendor.payment_account_connected
            {
                return Err(AppError::Validation(
                    "Please add your payment method first".to_string(),
                ));
            }
            if !vendor.verified {
                return Err(AppError::Validation(
                    "Your account information is not verified, please verify your account first"
                        .to_string(),
                ));
            }

            let delivery = existing.delivery_date_and_time.to_utc();
            if delivery < Utc::now() {
                return Err(AppError::Validation(
                    "Order delivery time has already passed".to_string(),
                ));
            }
            let (window, setup_duration, setup_start) = if existing.is_setup {
                let duration_spec = payload
                    .setup_duration
                    .clone()
                    .or_else(|| existing.setup_duration.clone())
                    .ok_or_else(|| {
                        AppError::Validation(
                            "Setup duration is required for setup orders".to_string(),
                        )
                    })?;
                let duration = parse_duration(&duration_spec)?;
                let setup_start = delivery - duration;
                if setup_start < Utc::now() {
                    return Err(AppError::Validation(format!(
                        "Setup start {setup_start} conflicts with current time"
                    )));
                }
                (
                    OccupiedWindow::with_setup(setup_start, delivery),
                    Some(duration_spec),
                    Some(setup_start),
                )
            } else {
                (OccupiedWindow::instant(delivery), None, None)
            };

            if find_conflicting_order(
                &state.orm,
                vendor.id,
                &window,
                &OrderStatus::VENDOR_OCCUPYING,
                None,
                Some(id),
            )
            .await?
            .is_some()
            {
                return Err(AppError::SchedulingConflict(
                    "The vendor already has an order during this time slot".to_string(),
                ));
            }

            update = update
                .col_expr(OrderCol::Status, Expr::value(OrderStatus::Accepted.as_str()))
                .col_expr(OrderCol::Amount, Expr::value(Some(amount)))
                .col_expr(
                    OrderCol::SetupFee,
                    Expr::value(payload.setup_fee.unwrap_or(existing.setup_fee)),
                )
                .col_expr(
                    OrderCol::DeliveryFee,
                    Expr::value(payload.delivery_fee.unwrap_or(existing.delivery_fee)),
                );
            if existing.is_setup {
                update = update
                    .col_expr(OrderCol::SetupDuration, Expr::value(setup_duration))
                    .col_expr(
                        OrderCol::SetupStartDateAndTime,
                        Expr::value(setup_start.map(|t| t.fixed_offset())),
                    );
            }
            "accepted"
        }
        VendorDecision::Rejected => {
            update = update.col_expr(
                OrderCol::Status,
                Expr::value(OrderStatus::Rejected.as_str()),
            );
            "rejected"
        }
    };

    let result = update.exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::InvalidState(
            "Order is no longer pending".to_string(),
        ));
    }

    let updated = find_order(&state.orm, id).await?;
    log_order_event(
        &state.pool,
        Some(user.user_id),
        if payload.status == VendorDecision::Accepted {
            "order_accepted"
        } else {
            "order_rejected"
        },
        id,
    )
    .await;

    let order = order_from_entity(updated)?;
    let event = if payload.status == VendorDecision::Accepted {
        "acceptedOrder"
    } else {
        "rejectedOrder"
    };
    state.events.emit(
        event,
        customer.user_id,
        serde_json::to_value(&order).unwrap_or_default(),
    );
    state.notifier.send(
        Notification {
            user_id: customer.user_id,
            title: format!("Order {} has been {}", order.order_id, decision_label),
            message: format!(
                "Order request for ID:{} is {} by {}.",
                order.order_id, decision_label, vendor.name
            ),
            recipient: Role::Customer,
        },
        DeliveryMeta {
            device_id: customer.device_id.clone(),
            destination: Some("order".to_string()),
        },
    );

    Ok(ApiResponse::success("Order updated", order, Some(Meta::empty())))
}

/// Customer declines an already-accepted order; a decline message is required.
pub async fn decline_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: DeclineOrderRequest,
) -> AppResult<ApiResponse<Order>> {
    ensure_customer(user)?;
    if payload.delivery_decline_message.trim().is_empty() {
        return Err(AppError::Validation(
            "Delivery decline message is required".to_string(),
        ));
    }

    let customer = customer_for_user(&state.orm, user.user_id).await?;
    let existing = find_order(&state.orm, id).await?;
    if existing.customer_id != customer.id {
        return Err(AppError::Forbidden);
    }
    if existing.status != OrderStatus::Accepted.as_str() {
        return Err(AppError::InvalidState(
            "Only accepted orders can be declined".to_string(),
        ));
    }

    let (vendor, _) = active_vendor(&state.orm, existing.vendor_id).await?;

    let result = Orders::update_many()
        .col_expr(OrderCol::Status, Expr::value(OrderStatus::Declined.as_str()))
        .col_expr(
            OrderCol::DeliveryDeclineMessage,
            Expr::value(Some(payload.delivery_decline_message.clone())),
        )
        .col_expr(OrderCol::UpdatedAt, Expr::value(Utc::now().fixed_offset()))
        .filter(OrderCol::Id.eq(id))
        .filter(OrderCol::Status.eq(OrderStatus::Accepted.as_str()))
        .exec(&state.orm)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::InvalidState(
            "Order is no longer accepted".to_string(),
        ));
    }

    let updated = find_order(&state.orm, id).await?;
    log_order_event(&state.pool, Some(user.user_id), "order_declined", id).await;

    let order = order_from_entity(updated)?;
    state.events.emit(
        "declinedOrder",
        vendor.user_id,
        serde_json::to_value(&order).unwrap_or_default(),
    );
    state.notifier.send(
        Notification {
            user_id: vendor.user_id,
            title: format!(
                "{} has declined the order. Order ID: {}",
                customer.name, order.order_id
            ),
            message: payload.delivery_decline_message,
            recipient: Role::Vendor,
        },
        DeliveryMeta {
            device_id: vendor.device_id.clone(),
            destination: Some("order".to_string()),
        },
    );

    Ok(ApiResponse::success("Order declined", order, Some(Meta::empty())))
}

/// Vendor starts the delivery of an ongoing order. A vendor may have at most
/// one order in delivery at a time.
pub async fn start_order_delivery(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Order>> {
    ensure_vendor(user)?;
    let vendor = vendor_for_user(&state.orm, user.user_id).await?;
    let existing = find_order(&state.orm, id).await?;
    if existing.vendor_id != vendor.id {
        return Err(AppError::Forbidden);
    }
    if existing.status != OrderStatus::Ongoing.as_str() {
        return Err(AppError::InvalidState(
            "Only ongoing orders can be started".to_string(),
        ));
    }

    let already_started = Orders::find()
        .filter(OrderCol::VendorId.eq(vendor.id))
        .filter(OrderCol::Status.eq(OrderStatus::Started.as_str()))
        .filter(OrderCol::Id.ne(id))
        .one(&state.orm)
        .await?;
    if already_started.is_some() {
        return Err(AppError::InvalidState(
            "You already have an order in delivery process".to_string(),
        ));
    }

    let result = Orders::update_many()
        .col_expr(OrderCol::Status, Expr::value(OrderStatus::Started.as_str()))
        .col_expr(OrderCol::UpdatedAt, Expr::value(Utc::now().fixed_offset()))
        .filter(OrderCol::Id.eq(id))
        .filter(OrderCol::Status.eq(OrderStatus::Ongoing.as_str()))
        .exec(&state.orm)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::InvalidState(
            "Order is no longer ongoing".to_string(),
        ));
    }

    let updated = find_order(&state.orm, id).await?;
    log_order_event(&state.pool, Some(user.user_id), "delivery_started", id).await;

    let customer = find_customer(&state.orm, existing.customer_id).await?;
    let order = order_from_entity(updated)?;

    state.events.emit(
        "startedOrder",
        vendor.user_id,
        serde_json::to_value(&order).unwrap_or_default(),
    );
    state.notifier.send(
        Notification {
            user_id: customer.user_id,
            title: format!("Delivery has been started for order {}", order.order_id),
            message: format!(
                "{} has started the delivery for order ID:{}. Track your order for more details.",
                vendor.name, order.order_id
            ),
            recipient: Role::Customer,
        },
        DeliveryMeta {
            device_id: customer.device_id.clone(),
            destination: Some("order".to_string()),
        },
    );
    state.notifier.send(
        Notification {
            user_id: vendor.user_id,
            title: format!("{} delivery started", order.order_id),
            message: format!("Order delivery for ID:{} has been started.", order.order_id),
            recipient: Role::Vendor,
        },
        DeliveryMeta {
            device_id: vendor.device_id.clone(),
            destination: Some("order".to_string()),
        },
    );

    Ok(ApiResponse::success("Delivery started", order, Some(Meta::empty())))
}

/// Invoked by the payment collaborator once the customer's payment is
/// captured. Moves `accepted` to `ongoing` and marks the payment as full.
pub async fn payment_captured(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Order>> {
    let result = Orders::update_many()
        .col_expr(OrderCol::Status, Expr::value(OrderStatus::Ongoing.as_str()))
        .col_expr(
            OrderCol::PaymentStatus,
            Expr::value(PaymentStatus::Full.as_str()),
        )
        .col_expr(OrderCol::UpdatedAt, Expr::value(Utc::now().fixed_offset()))
        .filter(OrderCol::Id.eq(id))
        .filter(OrderCol::Status.eq(OrderStatus::Accepted.as_str()))
        .exec(&state.orm)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::InvalidState(
            "Order is not awaiting payment capture".to_string(),
        ));
    }

    let updated = find_order(&state.orm, id).await?;
    log_order_event(&state.pool, None, "payment_captured", id).await;

    let (vendor, _) = active_vendor(&state.orm, updated.vendor_id).await?;
    let order = order_from_entity(updated)?;
    state.notifier.send(
        Notification {
            user_id: vendor.user_id,
            title: format!("Payment received for order {}", order.order_id),
            message: format!(
                "Payment for order ID:{} has been captured. The order is now ongoing.",
                order.order_id
            ),
            recipient: Role::Vendor,
        },
        DeliveryMeta {
            device_id: vendor.device_id.clone(),
            destination: Some("order".to_string()),
        },
    );

    Ok(ApiResponse::success("Payment captured", order, Some(Meta::empty())))
}

/// Invoked by the payment collaborator after the vendor payout succeeded.
pub async fn transfer_completed(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Order>> {
    let result = Orders::update_many()
        .col_expr(
            OrderCol::Status,
            Expr::value(OrderStatus::Completed.as_str()),
        )
        .col_expr(OrderCol::UpdatedAt, Expr::value(Utc::now().fixed_offset()))
        .filter(OrderCol::Id.eq(id))
        .filter(OrderCol::Status.eq(OrderStatus::Ongoing.as_str()))
        .exec(&state.orm)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::InvalidState(
            "Order is not awaiting payout".to_string(),
        ));
    }

    let updated = find_order(&state.orm, id).await?;
    log_order_event(&state.pool, None, "transfer_completed", id).await;

    Ok(ApiResponse::success(
        "Order completed",
        order_from_entity(updated)?,
        Some(Meta::empty()),
    ))
}

/// Plain order listing with status filter and pagination.
pub async fn list_orders(
    state: &AppState,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = query.pagination.normalize();
    let mut condition = Condition::all();
    if let Some(status) = query.status.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(OrderCol::Status.eq(status.clone()));
    }

    let mut finder = Orders::find().filter(condition);
    finder = match query.sort_order.unwrap_or(SortOrder::Desc) {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_from_entity)
        .collect::<AppResult<Vec<_>>>()?;

    Ok(ApiResponse::paginated("Ok", OrderList { items }, page, limit, total))
}

/// Role-scoped listing: customers see their own orders, vendors theirs, each
/// enriched with the fee calculator's role-specific fields.
pub async fn list_orders_for_user(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<EnrichedOrderList>> {
    let (page, limit, offset) = query.pagination.normalize();

    let mut condition = Condition::all();
    match user.role {
        Role::Customer => {
            let customer = customer_for_user(&state.orm, user.user_id).await?;
            condition = condition.add(OrderCol::CustomerId.eq(customer.id));
        }
        Role::Vendor => {
            let vendor = vendor_for_user(&state.orm, user.user_id).await?;
            condition = condition.add(OrderCol::VendorId.eq(vendor.id));
        }
    }
    if let Some(status) = query.status.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(OrderCol::Status.eq(status.clone()));
    }
    if let Some(date) = query.service_date {
        let start = date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| AppError::Validation("Invalid service date".to_string()))?
            .and_utc()
            .fixed_offset();
        let end = start + chrono::Duration::days(1);
        condition = condition.add(
            Condition::any()
                .add(
                    Condition::all()
                        .add(OrderCol::SetupStartDateAndTime.gte(start))
                        .add(OrderCol::SetupStartDateAndTime.lt(end)),
                )
                .add(
                    Condition::all()
                        .add(OrderCol::DeliveryDateAndTime.gte(start))
                        .add(OrderCol::DeliveryDateAndTime.lt(end)),
                ),
        );
    }

    let mut finder = Orders::find().filter(condition);
    finder = match query.sort_order.unwrap_or(SortOrder::Desc) {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;
    let rates = state.config.fee_rates();
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|model| {
            let fees = calculate_order_charges(&fee_inputs(&model), user.role, &rates)?;
            Ok(EnrichedOrder {
                order: order_from_entity(model)?,
                fees,
            })
        })
        .collect::<AppResult<Vec<_>>>()?;

    Ok(ApiResponse::paginated(
        "Ok",
        EnrichedOrderList { items },
        page,
        limit,
        total,
    ))
}

pub async fn get_order(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Order>> {
    let order = find_order(&state.orm, id).await?;
    Ok(ApiResponse::success(
        "Ok",
        order_from_entity(order)?,
        Some(Meta::empty()),
    ))
}

/// Distance-based delivery charge from the vendor's location to the given
/// coordinates, as a two-decimal string.
pub async fn get_delivery_charge(
    state: &AppState,
    vendor_id: Uuid,
    query: DeliveryChargeQuery,
) -> AppResult<ApiResponse<DeliveryCharge>> {
    let vendor = Vendors::find_by_id(vendor_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::NotFound("Vendor not found".to_string()))?;

    let distance = distance_miles(
        (query.longitude, query.latitude),
        (vendor.longitude, vendor.latitude),
    );
    let charge = distance * state.config.delivery_fee_per_mile;

    Ok(ApiResponse::success(
        "Ok",
        DeliveryCharge {
            delivery_charge: format!("{charge:.2}"),
        },
        Some(Meta::empty()),
    ))
}

/// Finds an order for `vendor_id` whose occupied window conflicts with
/// `window`, among the given statuses. The SQL mirrors
/// `OccupiedWindow::conflicts_with`: half-open overlap against
/// `[COALESCE(setup_start, delivery), delivery)`, plus the equal-delivery
/// instant rule.
async fn find_conflicting_order<C: ConnectionTrait>(
    conn: &C,
    vendor_id: Uuid,
    window: &OccupiedWindow,
    statuses: &[&str],
    customer_id: Option<Uuid>,
    exclude: Option<Uuid>,
) -> AppResult<Option<OrderModel>> {
    let occupied_start = Func::coalesce([
        Expr::col(OrderCol::SetupStartDateAndTime).into(),
        Expr::col(OrderCol::DeliveryDateAndTime).into(),
    ]);

    let overlap = Condition::all()
        .add(Expr::expr(occupied_start).lt(window.end.fixed_offset()))
        .add(OrderCol::DeliveryDateAndTime.gt(window.start.fixed_offset()));
    let same_delivery_instant = OrderCol::DeliveryDateAndTime.eq(window.end.fixed_offset());

    let mut condition = Condition::all()
        .add(OrderCol::VendorId.eq(vendor_id))
        .add(OrderCol::Status.is_in(statuses.iter().copied()))
        .add(Condition::any().add(overlap).add(same_delivery_instant));
    if let Some(customer_id) = customer_id {
        condition = condition.add(OrderCol::CustomerId.eq(customer_id));
    }
    if let Some(exclude) = exclude {
        condition = condition.add(OrderCol::Id.ne(exclude));
    }

    let conflicting = Orders::find().filter(condition).one(conn).await?;
    Ok(conflicting)
}

async fn find_order<C: ConnectionTrait>(conn: &C, id: Uuid) -> AppResult<OrderModel> {
    Orders::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Order does not exist".to_string()))
}

async fn find_package<C: ConnectionTrait>(
    conn: &C,
    package_id: Uuid,
    vendor_id: Uuid,
) -> AppResult<PackageModel> {
    let package = Packages::find_by_id(package_id)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Package does not exist".to_string()))?;
    if package.vendor_id != vendor_id {
        return Err(AppError::Validation(
            "Package does not belong to the requested vendor".to_string(),
        ));
    }
    Ok(package)
}

/// Vendor plus its (active) user account.
async fn active_vendor<C: ConnectionTrait>(
    conn: &C,
    vendor_id: Uuid,
) -> AppResult<(VendorModel, UserModel)> {
    let vendor = Vendors::find_by_id(vendor_id)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Vendor does not exist".to_string()))?;
    let account = Users::find_by_id(vendor.user_id)
        .one(conn)
        .await?
        .filter(|u| u.status == "active")
        .ok_or_else(|| AppError::NotFound("Vendor does not exist".to_string()))?;
    Ok((vendor, account))
}

async fn find_customer<C: ConnectionTrait>(conn: &C, id: Uuid) -> AppResult<CustomerModel> {
    Customers::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Customer does not exist".to_string()))
}

async fn customer_for_user<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
) -> AppResult<CustomerModel> {
    Customers::find()
        .filter(CustomerCol::UserId.eq(user_id))
        .one(conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Customer profile not found".to_string()))
}

async fn vendor_for_user<C: ConnectionTrait>(conn: &C, user_id: Uuid) -> AppResult<VendorModel> {
    Vendors::find()
        .filter(VendorCol::UserId.eq(user_id))
        .one(conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Vendor profile not found".to_string()))
}

fn vendor_timezone(vendor: &VendorModel) -> AppResult<Tz> {
    vendor.timezone.parse::<Tz>().map_err(|_| {
        AppError::Validation(format!("Vendor has an invalid timezone '{}'", vendor.timezone))
    })
}

fn available_days(vendor: &VendorModel) -> AppResult<Vec<String>> {
    serde_json::from_value(vendor.available_days.clone()).map_err(|_| {
        AppError::Validation("Vendor has an invalid available-days list".to_string())
    })
}

fn fee_inputs(model: &OrderModel) -> FeeInputs {
    FeeInputs {
        amount: model.amount,
        offered_amount: model.offered_amount,
        is_setup: model.is_setup,
        setup_fee: model.setup_fee,
        delivery_fee: model.delivery_fee,
        is_instant_transfer: model.is_instant_transfer,
    }
}

fn order_from_entity(model: OrderModel) -> AppResult<Order> {
    let status = OrderStatus::parse(&model.status).ok_or_else(|| {
        AppError::Internal(anyhow::anyhow!("unknown order status '{}'", model.status))
    })?;
    let payment_status = PaymentStatus::parse(&model.payment_status).ok_or_else(|| {
        AppError::Internal(anyhow::anyhow!(
            "unknown payment status '{}'",
            model.payment_status
        ))
    })?;

    Ok(Order {
        id: model.id,
        order_id: model.order_id,
        customer_id: model.customer_id,
        vendor_id: model.vendor_id,
        package_id: model.package_id,
        is_custom_order: model.is_custom_order,
        delivery_date_and_time: model.delivery_date_and_time.to_utc(),
        is_setup: model.is_setup,
        setup_duration: model.setup_duration,
        setup_start_date_and_time: model.setup_start_date_and_time.map(|t| t.to_utc()),
        amount: model.amount,
        offered_amount: model.offered_amount,
        delivery_fee: model.delivery_fee,
        setup_fee: model.setup_fee,
        is_instant_transfer: model.is_instant_transfer,
        status,
        payment_status,
        delivery_decline_message: model.delivery_decline_message,
        delivery_longitude: model.delivery_longitude,
        delivery_latitude: model.delivery_latitude,
        created_at: model.created_at.to_utc(),
        updated_at: model.updated_at.to_utc(),
    })
}
