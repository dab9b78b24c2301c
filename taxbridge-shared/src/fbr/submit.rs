/// Submission workflow
///
/// Ties the draft store to the tax authority client: resolve the
/// tenant's endpoint, snapshot the invoice, fire the single POST, then
/// persist whichever terminal status came back. Submission is one-way;
/// once an invoice leaves DRAFT it never returns.
///
/// The remote call runs outside any transaction. Holding a database
/// transaction across an HTTP call to a government endpoint would pin
/// a pool connection for the full round trip.

use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::invoice::{Invoice, InvoiceError};
use crate::models::tenant::{FbrEnvironment, Tenant};

use super::client::{SubmissionResult, TaxAuthorityClient};
use super::payload::FbrInvoicePayload;

/// Error before a submission attempt could be made.
///
/// Once the remote call fires, the outcome is a `SubmissionOutcome`,
/// never an error: both acceptance and rejection are recorded results.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    /// Endpoint or bearer token not configured for the environment
    #[error("FBR {environment} settings are missing")]
    MissingConfig { environment: &'static str },

    /// Invoice does not exist for this tenant
    #[error("Invoice not found")]
    NotFound,

    /// Invoice already left the draft state
    #[error("Invoice has already been submitted")]
    NotDraft,

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl From<InvoiceError> for SubmitError {
    fn from(err: InvoiceError) -> Self {
        match err {
            InvoiceError::NotFound | InvoiceError::BuyerNotFound => SubmitError::NotFound,
            InvoiceError::NotEditable => SubmitError::NotDraft,
            InvoiceError::EmptyItems => SubmitError::NotFound,
            InvoiceError::Database(e) => SubmitError::Database(e),
        }
    }
}

/// Terminal state recorded for an attempted submission
#[derive(Debug, Clone)]
pub enum SubmissionOutcome {
    /// Invoice is now APPROVED
    Approved {
        fbr_invoice_number: String,
        qr_payload: String,
    },

    /// Invoice is now REJECTED
    Rejected {
        /// Reason as persisted (truncated to the column limit)
        reason: String,

        /// True when the call never reached a decision (network/TLS)
        transport: bool,
    },
}

/// Submits a draft invoice to the tax authority once.
///
/// Loads the tenant's endpoint for `environment`, builds the payload
/// from the invoice's snapshot columns, fires the POST, and persists
/// APPROVED or REJECTED. There is no retry and no rollback of a
/// recorded rejection.
pub async fn submit_invoice(
    pool: &PgPool,
    client: &dyn TaxAuthorityClient,
    tenant_id: Uuid,
    invoice_id: Uuid,
    environment: FbrEnvironment,
) -> Result<SubmissionOutcome, SubmitError> {
    let settings = Tenant::fbr_settings(pool, tenant_id)
        .await?
        .ok_or(SubmitError::NotFound)?;

    let endpoint = settings
        .endpoint(environment)
        .ok_or(SubmitError::MissingConfig {
            environment: environment.as_str(),
        })?;

    let (invoice, items) = Invoice::get_with_items(pool, tenant_id, invoice_id).await?;

    if !invoice.is_draft() {
        return Err(SubmitError::NotDraft);
    }

    let payload = FbrInvoicePayload::from_invoice(&invoice, &items);

    info!(
        invoice_id = %invoice.id,
        environment = environment.as_str(),
        items = items.len(),
        "submitting invoice to FBR"
    );

    match client.submit(&endpoint, &payload).await {
        SubmissionResult::Success {
            invoice_number,
            qr_payload,
            ..
        } => {
            Invoice::mark_approved(pool, invoice.id, &invoice_number, &qr_payload).await?;

            info!(
                invoice_id = %invoice.id,
                fbr_invoice_number = %invoice_number,
                "invoice approved by FBR"
            );

            Ok(SubmissionOutcome::Approved {
                fbr_invoice_number: invoice_number,
                qr_payload,
            })
        }
        SubmissionResult::Failure { reason, transport } => {
            Invoice::mark_rejected(pool, invoice.id, &reason).await?;

            warn!(
                invoice_id = %invoice.id,
                transport,
                reason = %reason,
                "invoice rejected by FBR"
            );

            Ok(SubmissionOutcome::Rejected {
                reason: crate::models::invoice::truncate_reason(&reason),
                transport,
            })
        }
    }
}
