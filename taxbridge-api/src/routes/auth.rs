/// Authentication endpoints
///
/// This module provides tenant onboarding and login:
/// - Registration (creates the tenant and its first user atomically)
/// - Login (email + password, returns a 7-day session token)
///
/// # Endpoints
///
/// - `POST /auth/register` - Register a new business
/// - `POST /auth/login` - Login and get a session token

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
};
use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use taxbridge_shared::{
    auth::{jwt, password},
    models::{
        tenant::{RegisterTenant, Tenant, TenantStatus},
        user::User,
    },
};
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Registered business name
    #[validate(length(min = 1, max = 255, message = "Business name is required"))]
    pub business_name: String,

    /// National tax number (unique across tenants)
    #[validate(length(min = 1, max = 50, message = "NTN is required"))]
    pub ntn: String,

    /// Province of registration
    #[validate(length(min = 1, max = 100, message = "Province is required"))]
    pub province: String,

    /// Business address
    pub address: Option<String>,

    /// Contact email, also the first user's login
    #[validate(email(message = "Invalid email format"))]
    pub contact_email: String,

    /// Contact mobile number
    pub contact_mobile: Option<String>,

    /// Password for the first user
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Register response
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    /// Tenant ID
    pub tenant_id: String,

    /// First user's ID
    pub user_id: String,

    /// Session token (7 days)
    pub token: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Session token (7 days)
    pub token: String,

    /// Logged-in user profile
    pub user: LoginProfile,
}

/// Profile block in the login response
#[derive(Debug, Serialize)]
pub struct LoginProfile {
    pub user_id: String,
    pub tenant_id: String,
    pub email: String,
    pub business_name: String,
}

fn validation_errors(e: validator::ValidationErrors) -> ApiError {
    let errors: Vec<ValidationErrorDetail> = e
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| ValidationErrorDetail {
                field: field.to_string(),
                message: error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "Validation failed".to_string()),
            })
        })
        .collect();
    ApiError::ValidationError(errors)
}

/// Register a new business
///
/// Creates the tenant and its first user in one transaction; a failure
/// on either side leaves no partial registration behind.
///
/// # Endpoint
///
/// ```text
/// POST /auth/register
/// Content-Type: application/json
///
/// {
///   "business_name": "Acme",
///   "ntn": "1234567-8",
///   "province": "Punjab",
///   "contact_email": "owner@acme.pk",
///   "password": "SecureP@ss123"
/// }
/// ```
///
/// # Errors
///
/// - `409 Conflict`: NTN or email already registered
/// - `422 Unprocessable Entity`: Validation failed
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<RegisterResponse>)> {
    req.validate().map_err(validation_errors)?;

    let password_hash = password::hash_password(&req.password)?;

    let (tenant, user_id) = Tenant::register(
        &state.db,
        RegisterTenant {
            business_name: req.business_name,
            ntn: req.ntn,
            province: req.province,
            address: req.address,
            contact_email: req.contact_email.clone(),
            contact_mobile: req.contact_mobile,
            password_hash,
        },
    )
    .await?;

    let claims = jwt::Claims::new(user_id, tenant.id, req.contact_email);
    let token = jwt::create_token(&claims, state.jwt_secret())?;

    tracing::info!(tenant_id = %tenant.id, "tenant registered");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            tenant_id: tenant.id.to_string(),
            user_id: user_id.to_string(),
            token,
        }),
    ))
}

/// Login
///
/// Checks run in a fixed order: unknown email first (401), then tenant
/// suspension (403), then the password (401). Unknown email and wrong
/// password return the same message so accounts cannot be enumerated.
///
/// # Errors
///
/// - `401 Unauthorized`: Invalid credentials
/// - `403 Forbidden`: Tenant is suspended
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    req.validate().map_err(validation_errors)?;

    let user = User::find_by_email_with_tenant(&state.db, &req.email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid credentials".to_string()))?;

    if user.tenant_status != TenantStatus::Active.as_str() {
        return Err(ApiError::Forbidden("Account is suspended".to_string()));
    }

    if !password::verify_password(&req.password, &user.password_hash)? {
        return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
    }

    User::update_last_login(&state.db, user.id).await?;

    let claims = jwt::Claims::new(user.id, user.tenant_id, user.email.clone());
    let token = jwt::create_token(&claims, state.jwt_secret())?;

    tracing::info!(user_id = %user.id, tenant_id = %user.tenant_id, "user logged in");

    Ok(Json(LoginResponse {
        token,
        user: LoginProfile {
            user_id: user.id.to_string(),
            tenant_id: user.tenant_id.to_string(),
            email: user.email,
            business_name: user.business_name,
        },
    }))
}
