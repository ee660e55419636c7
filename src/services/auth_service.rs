use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{Duration, Utc};
use chrono_tz::Tz;
use jsonwebtoken::{EncodingKey, Header, encode};
use password_hash::rand_core::OsRng;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, Set};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::auth::{Claims, LoginRequest, LoginResponse, RegisterRequest},
    entity::{customers, vendors},
    error::{AppError, AppResult},
    models::{Role, User},
    response::{ApiResponse, Meta},
    scheduling::parse_clock_label,
    state::AppState,
};

pub async fn register_user(
    state: &AppState,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<User>> {
    let exist: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE email = $1")
        .bind(payload.email.as_str())
        .fetch_optional(&state.pool)
        .await?;
    if exist.is_some() {
        return Err(AppError::Validation("Email is already taken".to_string()));
    }

    if payload.role == Role::Vendor {
        let profile = payload
            .vendor
            .as_ref()
            .ok_or_else(|| {
                AppError::Validation("Vendor profile is required for vendor accounts".to_string())
            })?;
        profile.timezone.parse::<Tz>().map_err(|_| {
            AppError::Validation(format!("Unknown timezone '{}'", profile.timezone))
        })?;
        parse_clock_label(&profile.operation_start_time)?;
        parse_clock_label(&profile.operation_end_time)?;
    }

    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(payload.password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();

    let id = Uuid::new_v4();
    let user: User = sqlx::query_as(
        "INSERT INTO users (id, email, password_hash, role) VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(id)
    .bind(payload.email.as_str())
    .bind(password_hash)
    .bind(payload.role.as_str())
    .fetch_one(&state.pool)
    .await?;

    match payload.role {
        Role::Customer => {
            customers::ActiveModel {
                id: Set(Uuid::new_v4()),
                user_id: Set(user.id),
                name: Set(payload.name),
                device_id: Set(payload.device_id),
                created_at: NotSet,
            }
            .insert(&state.orm)
            .await?;
        }
        Role::Vendor => {
            // Presence validated above.
            let profile = payload.vendor.unwrap();
            vendors::ActiveModel {
                id: Set(Uuid::new_v4()),
                user_id: Set(user.id),
                name: Set(payload.name),
                device_id: Set(payload.device_id),
                timezone: Set(profile.timezone),
                operation_start_time: Set(profile.operation_start_time),
                operation_end_time: Set(profile.operation_end_time),
                available_days: Set(serde_json::json!(profile.available_days)),
                longitude: Set(profile.longitude),
                latitude: Set(profile.latitude),
                payment_account_id: Set(None),
                payment_account_connected: Set(false),
                verified: Set(false),
                created_at: NotSet,
            }
            .insert(&state.orm)
            .await?;
        }
    }

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.id),
        "user_register",
        Some("users"),
        Some(serde_json::json!({ "role": payload.role.as_str() })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success("User created", user, None))
}

pub async fn login_user(
    state: &AppState,
    payload: LoginRequest,
) -> AppResult<ApiResponse<LoginResponse>> {
    let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = $1")
        .bind(payload.email.as_str())
        .fetch_optional(&state.pool)
        .await?;

    let user = match user {
        Some(u) => u,
        None => return Err(AppError::Validation("Invalid email or password".into())),
    };

    if user.status != "active" {
        return Err(AppError::Forbidden);
    }

    let parsed_hash = PasswordHash::new(&user.password_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;

    let argon2 = Argon2::default();
    if argon2
        .verify_password(payload.password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return Err(AppError::Validation("Invalid email or password".into()));
    }

    let secret = std::env::var("JWT_SECRET")
        .map_err(|_| AppError::Internal(anyhow::anyhow!("JWT_SECRET is not set")))?;

    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(24))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: user.id.to_string(),
        role: user.role.clone(),
        exp: expiration.timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.id),
        "user_login",
        Some("users"),
        None,
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Logged in",
        LoginResponse {
            token: format!("Bearer {token}"),
        },
        Some(Meta::empty()),
    ))
}
