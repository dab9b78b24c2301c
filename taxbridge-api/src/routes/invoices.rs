/// Invoice draft store and submission endpoints
///
/// # Endpoints
///
/// - `GET /invoices` - List the tenant's invoices
/// - `POST /invoices` - Create a draft invoice with items
/// - `GET /invoices/:id` - Fetch one invoice with its items
/// - `PUT /invoices/:id` - Replace a draft's header and item set
/// - `POST /invoices/:id/submit` - Fire the invoice at FBR once
///
/// Drafts are mutable; APPROVED and REJECTED are terminal. Submission
/// is fire-once with no retry, and both outcomes are persisted before
/// the response is sent.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use taxbridge_shared::{
    auth::middleware::AuthContext,
    fbr::{self, SubmissionOutcome},
    models::{
        invoice::{DraftInvoice, Invoice, InvoiceSummary},
        invoice_item::InvoiceItem,
        tenant::FbrEnvironment,
    },
};
use uuid::Uuid;

/// Invoice with its items, as returned by the detail endpoint
#[derive(Debug, Serialize)]
pub struct InvoiceDetail {
    #[serde(flatten)]
    pub invoice: Invoice,
    pub items: Vec<InvoiceItem>,
}

/// Submit request body
#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    /// Target environment: "sandbox" or "production"
    pub environment: FbrEnvironment,
}

/// Submit success response
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub message: String,

    /// Authority-assigned invoice number
    pub fbr_invoice_number: String,

    /// QR payload for the printed invoice
    pub qr_payload: String,
}

/// List the tenant's invoices, newest first
pub async fn list_invoices(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<InvoiceSummary>>> {
    let invoices = Invoice::list(&state.db, auth.tenant_id).await?;
    Ok(Json(invoices))
}

/// Create a draft invoice
///
/// Snapshots the seller and buyer identity at creation time and
/// computes the totals server-side from the submitted items.
///
/// # Errors
///
/// - `400 Bad Request`: Empty item list
/// - `404 Not Found`: Buyer does not exist for this tenant
pub async fn create_invoice(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<DraftInvoice>,
) -> ApiResult<(StatusCode, Json<Invoice>)> {
    let invoice = Invoice::create(&state.db, auth.tenant_id, req).await?;
    Ok((StatusCode::CREATED, Json(invoice)))
}

/// Fetch one invoice with its items
///
/// # Errors
///
/// - `404 Not Found`: Missing id, or an id belonging to another tenant
pub async fn get_invoice(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<InvoiceDetail>> {
    let (invoice, items) = Invoice::get_with_items(&state.db, auth.tenant_id, id).await?;
    Ok(Json(InvoiceDetail { invoice, items }))
}

/// Replace a draft's header and full item set
///
/// The stored item set after this call is exactly the submitted set.
///
/// # Errors
///
/// - `400 Bad Request`: Empty item list
/// - `404 Not Found`: Missing id, or an id belonging to another tenant
/// - `409 Conflict`: Invoice already left the draft state
pub async fn update_invoice(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<DraftInvoice>,
) -> ApiResult<Json<Invoice>> {
    let invoice = Invoice::update_draft(&state.db, auth.tenant_id, id, req).await?;
    Ok(Json(invoice))
}

/// Submit a draft invoice to FBR
///
/// One POST, no retries. The terminal status is persisted before the
/// response regardless of outcome.
///
/// # Errors
///
/// - `400 Bad Request`: Missing FBR settings, or the authority rejected
///   the invoice (the rejection reason is returned as the message)
/// - `404 Not Found`: Missing id, or an id belonging to another tenant
/// - `409 Conflict`: Invoice already left the draft state
/// - `502 Bad Gateway`: The authority endpoint could not be reached
pub async fn submit_invoice(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<SubmitRequest>,
) -> ApiResult<Json<SubmitResponse>> {
    let outcome = fbr::submit_invoice(
        &state.db,
        state.fbr.as_ref(),
        auth.tenant_id,
        id,
        req.environment,
    )
    .await?;

    match outcome {
        SubmissionOutcome::Approved {
            fbr_invoice_number,
            qr_payload,
        } => Ok(Json(SubmitResponse {
            message: "Successfully submitted to FBR".to_string(),
            fbr_invoice_number,
            qr_payload,
        })),
        SubmissionOutcome::Rejected { reason, transport } => {
            if transport {
                Err(ApiError::BadGateway(reason))
            } else {
                Err(ApiError::RemoteRejected(reason))
            }
        }
    }
}
