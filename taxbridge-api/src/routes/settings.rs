/// Tenant FBR credential endpoints
///
/// # Endpoints
///
/// - `GET /settings` - Read the tenant's FBR endpoint configuration
/// - `PUT /settings` - Overwrite all four FBR fields
///
/// The PUT is a full overwrite: omitted fields become NULL. Bearer
/// tokens are returned to the owning tenant on GET; this mirrors the
/// settings form, which round-trips the stored values.

use crate::error::{ApiError, ApiResult};
use crate::app::AppState;
use axum::{extract::State, Extension, Json};
use serde::Serialize;
use taxbridge_shared::{
    auth::middleware::AuthContext,
    models::tenant::{FbrSettings, Tenant},
};

/// Update acknowledgement
#[derive(Debug, Serialize)]
pub struct SettingsUpdated {
    pub message: String,
}

/// Read the tenant's FBR settings
pub async fn get_settings(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<FbrSettings>> {
    let settings = Tenant::fbr_settings(&state.db, auth.tenant_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Tenant not found".to_string()))?;

    Ok(Json(settings))
}

/// Overwrite the tenant's FBR settings
pub async fn update_settings(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(settings): Json<FbrSettings>,
) -> ApiResult<Json<SettingsUpdated>> {
    let updated = Tenant::update_fbr_settings(&state.db, auth.tenant_id, settings).await?;

    if !updated {
        return Err(ApiError::NotFound("Tenant not found".to_string()));
    }

    Ok(Json(SettingsUpdated {
        message: "Settings updated".to_string(),
    }))
}
