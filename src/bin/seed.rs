use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use rental_marketplace_api::{
    config::AppConfig,
    db::{create_orm_conn, create_pool, run_migrations},
};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    let orm = create_orm_conn(&config.database_url).await?;
    run_migrations(&orm).await?;

    let vendor_user = ensure_user(&pool, "vendor@example.com", "vendor123", "vendor").await?;
    let customer_user = ensure_user(&pool, "customer@example.com", "customer123", "customer").await?;

    let vendor_id = ensure_vendor(&pool, vendor_user, "Sunrise Rentals").await?;
    let customer_id = ensure_customer(&pool, customer_user, "Jordan Blake").await?;
    seed_packages(&pool, vendor_id).await?;

    println!("Seed completed. Vendor ID: {vendor_id}, Customer ID: {customer_id}");
    Ok(())
}

async fn ensure_user(
    pool: &sqlx::PgPool,
    email: &str,
    password: &str,
    role: &str,
) -> anyhow::Result<Uuid> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();

    let row: Option<(Uuid,)> = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, password_hash, role, status)
        VALUES ($1, $2, $3, $4, 'active')
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(password_hash)
    .bind(role)
    .fetch_optional(pool)
    .await?;

    // If user already exists, fetch id
    let user_id = match row {
        Some((id,)) => id,
        None => {
            let existing: (Uuid,) = sqlx::query_as("SELECT id FROM users WHERE email = $1")
                .bind(email)
                .fetch_one(pool)
                .await?;
            existing.0
        }
    };

    println!("Ensured user {email} (role={role})");
    Ok(user_id)
}

async fn ensure_vendor(pool: &sqlx::PgPool, user_id: Uuid, name: &str) -> anyhow::Result<Uuid> {
    if let Some((id,)) =
        sqlx::query_as::<_, (Uuid,)>("SELECT id FROM vendors WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(pool)
            .await?
    {
        return Ok(id);
    }

    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO vendors (
            id, user_id, name, timezone,
            operation_start_time, operation_end_time, available_days,
            longitude, latitude,
            payment_account_id, payment_account_connected, verified
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, TRUE, TRUE)
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(name)
    .bind("America/New_York")
    .bind("9:00 AM")
    .bind("6:00 PM")
    .bind(serde_json::json!([
        "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday"
    ]))
    .bind(-73.9857)
    .bind(40.7484)
    .bind("acct_seed_vendor")
    .execute(pool)
    .await?;

    println!("Ensured vendor {name}");
    Ok(id)
}

async fn ensure_customer(pool: &sqlx::PgPool, user_id: Uuid, name: &str) -> anyhow::Result<Uuid> {
    if let Some((id,)) =
        sqlx::query_as::<_, (Uuid,)>("SELECT id FROM customers WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(pool)
            .await?
    {
        return Ok(id);
    }

    let id = Uuid::new_v4();
    sqlx::query("INSERT INTO customers (id, user_id, name) VALUES ($1, $2, $3)")
        .bind(id)
        .bind(user_id)
        .bind(name)
        .execute(pool)
        .await?;

    println!("Ensured customer {name}");
    Ok(id)
}

async fn seed_packages(pool: &sqlx::PgPool, vendor_id: Uuid) -> anyhow::Result<()> {
    let packages = [
        ("Bounce House Classic", 250.0, 50.0, Some("45min")),
        ("Party Tent 20x20", 400.0, 100.0, Some("2hr")),
        ("Table & Chair Set", 120.0, 0.0, None),
    ];

    for (title, price, setup_fee, setup_duration) in packages {
        let exists: Option<(Uuid,)> = sqlx::query_as(
            "SELECT id FROM packages WHERE vendor_id = $1 AND title = $2",
        )
        .bind(vendor_id)
        .bind(title)
        .fetch_optional(pool)
        .await?;
        if exists.is_some() {
            continue;
        }

        sqlx::query(
            r#"
            INSERT INTO packages (id, vendor_id, title, price, setup_fee, setup_duration)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(vendor_id)
        .bind(title)
        .bind(price)
        .bind(setup_fee)
        .bind(setup_duration)
        .execute(pool)
        .await?;
        println!("Seeded package {title}");
    }

    Ok(())
}
