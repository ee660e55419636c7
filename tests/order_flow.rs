use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rental_marketplace_api::{
    config::AppConfig,
    db::{create_orm_conn, create_pool, run_migrations},
    dto::orders::{
        CreateOrderRequest, DeclineOrderRequest, VendorDecision, VendorDecisionRequest,
    },
    entity::{
        customers::ActiveModel as CustomerActive, orders::ActiveModel as OrderActive,
        packages::ActiveModel as PackageActive, users::ActiveModel as UserActive,
        vendors::ActiveModel as VendorActive,
    },
    error::AppError,
    geo::{distance_miles, round2},
    middleware::auth::AuthUser,
    models::{OrderStatus, PaymentStatus, Role},
    notify::{RecordingEvents, RecordingNotifier},
    routes::params::{OrderListQuery, Pagination},
    scheduling::weekday_name,
    services::order_service,
    state::AppState,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Set, Statement};
use uuid::Uuid;

// Integration flow: customer places orders -> vendor accepts/rejects with
// conflict checks -> payment webhooks advance the lifecycle -> delivery
// starts and the payout completes the order.
#[tokio::test]
async fn order_lifecycle_and_conflict_flow() -> anyhow::Result<()> {
    // Allow skipping when no DB is configured in the environment.
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            return Ok(());
        }
    };

    let (state, notifier, events) = setup_state(&database_url).await?;

    // Seed one vendor and two customers.
    let vendor_user = create_user(&state, "vendor", "vendor@example.com").await?;
    let customer_user = create_user(&state, "customer", "customer@example.com").await?;
    let other_customer_user = create_user(&state, "customer", "customer2@example.com").await?;

    let vendor = VendorActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(vendor_user),
        name: Set("Sunrise Rentals".into()),
        device_id: Set(Some("vendor-device".into())),
        timezone: Set("America/New_York".into()),
        operation_start_time: Set("9:00 AM".into()),
        operation_end_time: Set("6:00 PM".into()),
        available_days: Set(serde_json::json!([
            "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday"
        ])),
        longitude: Set(-73.9857),
        latitude: Set(40.7484),
        payment_account_id: Set(Some("acct_test".into())),
        payment_account_connected: Set(true),
        verified: Set(true),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    let customer = CustomerActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(customer_user),
        name: Set("Jordan Blake".into()),
        device_id: Set(None),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;
    CustomerActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(other_customer_user),
        name: Set("Sam Reyes".into()),
        device_id: Set(None),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    let package = PackageActive {
        id: Set(Uuid::new_v4()),
        vendor_id: Set(vendor.id),
        title: Set("Bounce House Classic".into()),
        price: Set(250.0),
        setup_fee: Set(50.0),
        setup_duration: Set(Some("45min".into())),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    let auth_customer = AuthUser {
        user_id: customer_user,
        role: Role::Customer,
    };
    let auth_other_customer = AuthUser {
        user_id: other_customer_user,
        role: Role::Customer,
    };
    let auth_vendor = AuthUser {
        user_id: vendor_user,
        role: Role::Vendor,
    };

    // Whole-second instants so stored timestamps compare exactly.
    let slot_a = future_slot(30);
    let slot_b = future_slot(31);
    let slot_c = future_slot(32);
    let slot_d = future_slot(33);

    // 1. Customer places a setup order; the package's setup duration applies.
    let created = order_service::create_order(
        &state,
        &auth_customer,
        order_request(vendor.id, package.id, slot_a, true),
    )
    .await?;
    let order_a = created.data.unwrap();
    assert_eq!(order_a.status, OrderStatus::Pending);
    assert_eq!(order_a.order_id, "00001");
    assert_eq!(order_a.setup_duration.as_deref(), Some("45min"));
    assert_eq!(
        order_a.setup_start_date_and_time,
        Some(slot_a - Duration::minutes(45))
    );
    assert!(
        events.emitted.lock().unwrap().iter().any(|(e, to, _)| e == "newOrder" && *to == vendor_user),
        "expected a newOrder event addressed to the vendor"
    );
    assert!(
        notifier
            .sent
            .lock()
            .unwrap()
            .iter()
            .any(|(n, _)| n.user_id == vendor_user && n.recipient == Role::Vendor),
        "expected a push notification addressed to the vendor"
    );

    // 2. The same customer cannot double-book the same delivery instant while
    //    the first request is still pending.
    let err = order_service::create_order(
        &state,
        &auth_customer,
        order_request(vendor.id, package.id, slot_a, false),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::SchedulingConflict(_)), "{err:?}");

    // 3. A different customer may still request the same slot; pending orders
    //    do not occupy the vendor yet.
    let created = order_service::create_order(
        &state,
        &auth_other_customer,
        order_request(vendor.id, package.id, slot_a, false),
    )
    .await?;
    let order_b = created.data.unwrap();
    assert_eq!(order_b.order_id, "00002");

    // 4. Vendor accepts the first order.
    let accepted = order_service::vendor_accept_or_reject(
        &state,
        &auth_vendor,
        order_a.id,
        accept_request(100.0),
    )
    .await?;
    let order_a = accepted.data.unwrap();
    assert_eq!(order_a.status, OrderStatus::Accepted);
    assert_eq!(order_a.amount, Some(100.0));

    // 5. Accepting the competing order at the same instant now conflicts.
    let err = order_service::vendor_accept_or_reject(
        &state,
        &auth_vendor,
        order_b.id,
        accept_request(120.0),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::SchedulingConflict(_)), "{err:?}");

    // 6. Rejecting it is always allowed while pending.
    let rejected = order_service::vendor_accept_or_reject(
        &state,
        &auth_vendor,
        order_b.id,
        VendorDecisionRequest {
            status: VendorDecision::Rejected,
            amount: None,
            setup_fee: None,
            setup_duration: None,
            delivery_fee: None,
        },
    )
    .await?;
    assert_eq!(rejected.data.unwrap().status, OrderStatus::Rejected);

    // 7. Concurrent decisions on one pending order: exactly one wins.
    let created = order_service::create_order(
        &state,
        &auth_other_customer,
        order_request(vendor.id, package.id, slot_b, false),
    )
    .await?;
    let order_c = created.data.unwrap();
    let (first, second) = tokio::join!(
        order_service::vendor_accept_or_reject(
            &state,
            &auth_vendor,
            order_c.id,
            accept_request(90.0),
        ),
        order_service::vendor_accept_or_reject(
            &state,
            &auth_vendor,
            order_c.id,
            accept_request(95.0),
        ),
    );
    let successes = [&first, &second].iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1, "exactly one concurrent decision may succeed");

    // 8. Payment capture moves accepted to ongoing and settles the payment.
    let captured = order_service::payment_captured(&state, order_a.id).await?;
    let order_a = captured.data.unwrap();
    assert_eq!(order_a.status, OrderStatus::Ongoing);
    assert_eq!(order_a.payment_status, PaymentStatus::Full);

    let err = order_service::payment_captured(&state, order_a.id).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)), "{err:?}");

    // 9. Declining is only available while the order is accepted.
    let err = order_service::decline_order(
        &state,
        &auth_customer,
        order_a.id,
        DeclineOrderRequest {
            delivery_decline_message: "Change of plans".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)), "{err:?}");

    let created = order_service::create_order(
        &state,
        &auth_customer,
        order_request(vendor.id, package.id, slot_c, false),
    )
    .await?;
    let order_d = created.data.unwrap();
    order_service::vendor_accept_or_reject(&state, &auth_vendor, order_d.id, accept_request(80.0))
        .await?;
    let declined = order_service::decline_order(
        &state,
        &auth_customer,
        order_d.id,
        DeclineOrderRequest {
            delivery_decline_message: "Venue fell through".into(),
        },
    )
    .await?;
    let order_d = declined.data.unwrap();
    assert_eq!(order_d.status, OrderStatus::Declined);
    assert_eq!(
        order_d.delivery_decline_message.as_deref(),
        Some("Venue fell through")
    );

    // 10. Delivery starts for the ongoing order; a second ongoing order may
    //     not start while the first is out.
    let started = order_service::start_order_delivery(&state, &auth_vendor, order_a.id).await?;
    assert_eq!(started.data.unwrap().status, OrderStatus::Started);

    let created = order_service::create_order(
        &state,
        &auth_customer,
        order_request(vendor.id, package.id, slot_d, false),
    )
    .await?;
    let order_e = created.data.unwrap();
    order_service::vendor_accept_or_reject(&state, &auth_vendor, order_e.id, accept_request(70.0))
        .await?;
    order_service::payment_captured(&state, order_e.id).await?;
    let err = order_service::start_order_delivery(&state, &auth_vendor, order_e.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)), "{err:?}");

    // 11. The payout webhook completes the ongoing order.
    let completed = order_service::transfer_completed(&state, order_e.id).await?;
    assert_eq!(completed.data.unwrap().status, OrderStatus::Completed);

    // 12. The vendor's listing carries the vendor fee view: amount 100 with a
    //     10% platform cut, a 50 setup fee and a 2.9% card charge nets 137.
    let listed = order_service::list_orders_for_user(
        &state,
        &auth_vendor,
        OrderListQuery {
            pagination: Pagination {
                page: None,
                per_page: None,
            },
            status: Some("started".into()),
            service_date: None,
            sort_order: None,
        },
    )
    .await?;
    let items = listed.data.unwrap().items;
    let enriched = items
        .iter()
        .find(|o| o.order.id == order_a.id)
        .expect("started order in vendor listing");
    assert_eq!(enriched.fees.application_charge, Some(10.0));
    assert_eq!(enriched.fees.vendor_receivable, Some(137.0));
    assert_eq!(enriched.fees.cc_charge, None);

    // 13. A custom order outside the vendor's 9 AM - 6 PM window is rejected.
    //     03:00 UTC is 10 or 11 PM the previous evening in New York.
    let after_hours = (Utc::now() + Duration::days(42))
        .date_naive()
        .and_hms_opt(3, 0, 0)
        .unwrap()
        .and_utc();
    let err = order_service::create_order(
        &state,
        &auth_customer,
        custom_order_request(vendor.id, after_hours),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::OutsideOperatingHours(_)), "{err:?}");

    // 14. An in-hours custom order without an explicit fee gets the
    //     distance-derived delivery fee persisted.
    let created = order_service::create_order(
        &state,
        &auth_customer,
        custom_order_request(vendor.id, future_slot(42)),
    )
    .await?;
    let custom_order = created.data.unwrap();
    assert_eq!(custom_order.status, OrderStatus::Pending);
    assert!(custom_order.is_custom_order);
    let expected_fee = round2(distance_miles((-73.9857, 40.7484), (-73.9680, 40.7850)) * 2.0);
    assert_eq!(custom_order.delivery_fee, expected_fee);
    assert!(custom_order.delivery_fee > 0.0);

    // 15. A delivery on a weekday the vendor does not serve is rejected.
    let off_day_user = create_user(&state, "vendor", "vendor2@example.com").await?;
    let blocked_slot = future_slot(43);
    let blocked_day = weekday_name(blocked_slot, chrono_tz::America::New_York);
    let working_days: Vec<&str> = [
        "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday",
    ]
    .into_iter()
    .filter(|day| *day != blocked_day)
    .collect();
    let off_day_vendor = VendorActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(off_day_user),
        name: Set("Weekday Rentals".into()),
        device_id: Set(None),
        timezone: Set("America/New_York".into()),
        operation_start_time: Set("9:00 AM".into()),
        operation_end_time: Set("6:00 PM".into()),
        available_days: Set(serde_json::json!(working_days)),
        longitude: Set(-73.9857),
        latitude: Set(40.7484),
        payment_account_id: Set(Some("acct_test2".into())),
        payment_account_connected: Set(true),
        verified: Set(true),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;
    let err = order_service::create_order(
        &state,
        &auth_customer,
        custom_order_request(off_day_vendor.id, blocked_slot),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)), "{err:?}");

    // 16. Accepting an order whose delivery time has already passed fails,
    //     even though the order is still pending.
    let stale = OrderActive {
        id: Set(Uuid::new_v4()),
        order_id: Set("90001".into()),
        customer_id: Set(customer.id),
        vendor_id: Set(vendor.id),
        package_id: Set(None),
        is_custom_order: Set(true),
        delivery_date_and_time: Set((Utc::now() - Duration::days(1)).fixed_offset()),
        is_setup: Set(false),
        setup_duration: Set(None),
        setup_start_date_and_time: Set(None),
        amount: Set(None),
        offered_amount: Set(Some(50.0)),
        delivery_fee: Set(0.0),
        setup_fee: Set(0.0),
        is_instant_transfer: Set(false),
        status: Set("pending".into()),
        payment_status: Set("pending".into()),
        delivery_decline_message: Set(None),
        delivery_longitude: Set(-73.9680),
        delivery_latitude: Set(40.7850),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;
    let err = order_service::vendor_accept_or_reject(
        &state,
        &auth_vendor,
        stale.id,
        accept_request(60.0),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)), "{err:?}");

    Ok(())
}

async fn setup_state(
    database_url: &str,
) -> anyhow::Result<(AppState, Arc<RecordingNotifier>, Arc<RecordingEvents>)> {
    let pool = create_pool(database_url).await?;
    let orm = create_orm_conn(database_url).await?;
    run_migrations(&orm).await?;

    // Clean tables between runs; the counter row must survive with a fresh value.
    let backend = orm.get_database_backend();
    orm.execute(Statement::from_string(
        backend,
        "TRUNCATE TABLE orders, cart_items, packages, vendors, customers, audit_logs, users RESTART IDENTITY CASCADE",
    ))
    .await?;
    orm.execute(Statement::from_string(
        backend,
        "UPDATE order_counters SET last_id = NULL",
    ))
    .await?;

    let notifier = Arc::new(RecordingNotifier::default());
    let events = Arc::new(RecordingEvents::default());
    let config = AppConfig {
        database_url: database_url.to_string(),
        host: "127.0.0.1".into(),
        port: 0,
        application_fee_rate: 0.1,
        customer_cc_rate: 0.029,
        instant_transfer_fee_rate: 0.15,
        delivery_fee_per_mile: 2.0,
    };

    let state = AppState {
        pool,
        orm,
        config: Arc::new(config),
        notifier: notifier.clone(),
        events: events.clone(),
    };
    Ok((state, notifier, events))
}

async fn create_user(state: &AppState, role: &str, email: &str) -> anyhow::Result<Uuid> {
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        email: Set(email.to_string()),
        password_hash: Set("dummy".into()),
        role: Set(role.into()),
        status: Set("active".into()),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(user.id)
}

/// A delivery instant `days` from now at 17:00 UTC, rounded to whole seconds.
fn future_slot(days: i64) -> DateTime<Utc> {
    (Utc::now() + Duration::days(days))
        .date_naive()
        .and_hms_opt(17, 0, 0)
        .unwrap()
        .and_utc()
}

fn order_request(
    vendor_id: Uuid,
    package_id: Uuid,
    delivery: DateTime<Utc>,
    is_setup: bool,
) -> CreateOrderRequest {
    CreateOrderRequest {
        vendor_id,
        package_id: Some(package_id),
        is_custom_order: false,
        offered_amount: 150.0,
        delivery_date_and_time: delivery,
        delivery_longitude: -73.9680,
        delivery_latitude: 40.7850,
        delivery_fee: None,
        is_setup,
        setup_duration: None,
        is_instant_transfer: false,
    }
}

fn custom_order_request(vendor_id: Uuid, delivery: DateTime<Utc>) -> CreateOrderRequest {
    CreateOrderRequest {
        vendor_id,
        package_id: None,
        is_custom_order: true,
        offered_amount: 200.0,
        delivery_date_and_time: delivery,
        delivery_longitude: -73.9680,
        delivery_latitude: 40.7850,
        delivery_fee: None,
        is_setup: false,
        setup_duration: None,
        is_instant_transfer: false,
    }
}

fn accept_request(amount: f64) -> VendorDecisionRequest {
    VendorDecisionRequest {
        status: VendorDecision::Accepted,
        amount: Some(amount),
        setup_fee: None,
        setup_duration: None,
        delivery_fee: None,
    }
}
