/// Buyer management endpoints
///
/// # Endpoints
///
/// - `GET /buyers` - List the tenant's buyers
/// - `POST /buyers` - Create a buyer
///
/// All access is scoped by the authenticated tenant; one tenant can
/// never see or reference another tenant's buyers.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::Deserialize;
use taxbridge_shared::{
    auth::middleware::AuthContext,
    models::buyer::{Buyer, CreateBuyer},
};
use validator::Validate;

/// Create buyer request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBuyerRequest {
    /// Buyer business or person name
    #[validate(length(min = 1, max = 255, message = "Buyer name is required"))]
    pub buyer_name: String,

    /// NTN or CNIC; duplicates are allowed
    #[validate(length(min = 1, max = 50, message = "NTN/CNIC is required"))]
    pub ntn_cnic: String,

    #[validate(email(message = "Invalid email format"))]
    pub buyer_email: Option<String>,

    pub buyer_address: Option<String>,
    pub buyer_phone: Option<String>,
}

/// List the tenant's buyers, newest first
pub async fn list_buyers(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<Buyer>>> {
    let buyers = Buyer::list(&state.db, auth.tenant_id).await?;
    Ok(Json(buyers))
}

/// Create a buyer for the tenant
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Validation failed
pub async fn create_buyer(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateBuyerRequest>,
) -> ApiResult<(StatusCode, Json<Buyer>)> {
    req.validate().map_err(|e| {
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
    })?;

    let buyer = Buyer::create(
        &state.db,
        auth.tenant_id,
        CreateBuyer {
            buyer_name: req.buyer_name,
            ntn_cnic: req.ntn_cnic,
            buyer_email: req.buyer_email,
            buyer_address: req.buyer_address,
            buyer_phone: req.buyer_phone,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(buyer)))
}
