/// Invoice model and the draft store
///
/// An invoice starts life as a DRAFT with one or more items, stays
/// freely editable (header plus full item replacement) while drafted,
/// and leaves the draft state exactly once: submission moves it to
/// APPROVED or REJECTED, both terminal.
///
/// Seller and buyer identity are snapshot onto the invoice row when it
/// is created (and refreshed on each draft update), so later edits to
/// the tenant or buyer records never change what was filed.
///
/// Invariant: `fbr_invoice_number`/`fbr_qr_payload` are set only on
/// APPROVED rows, `rejection_reason` only on REJECTED rows, and neither
/// while DRAFT.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::invoice_item::{InvoiceItem, NewInvoiceItem};

/// Longest rejection reason we persist
pub const MAX_REJECTION_REASON_CHARS: usize = 255;

/// Error type for draft store operations
#[derive(Debug, thiserror::Error)]
pub enum InvoiceError {
    /// Invoice does not exist for this tenant
    ///
    /// Deliberately identical for "no such id" and "belongs to another
    /// tenant" so ids cannot be probed across tenants.
    #[error("Invoice not found")]
    NotFound,

    /// Referenced buyer does not exist for this tenant
    #[error("Buyer not found")]
    BuyerNotFound,

    /// An invoice needs at least one line item
    #[error("Invoice must have items")]
    EmptyItems,

    /// Invoice already left the draft state
    #[error("Only draft invoices can be modified")]
    NotEditable,

    /// Underlying database failure
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Invoice lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InvoiceStatus {
    /// Editable, not yet sent to the tax authority
    Draft,

    /// Accepted by the tax authority; terminal
    Approved,

    /// Declined by the tax authority; terminal
    Rejected,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "DRAFT",
            InvoiceStatus::Approved => "APPROVED",
            InvoiceStatus::Rejected => "REJECTED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "DRAFT" => Some(InvoiceStatus::Draft),
            "APPROVED" => Some(InvoiceStatus::Approved),
            "REJECTED" => Some(InvoiceStatus::Rejected),
            _ => None,
        }
    }
}

/// Invoice header row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Invoice {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub buyer_id: Uuid,

    /// Tenant's own reference number for the invoice
    pub internal_ref_no: String,

    pub invoice_date: NaiveDate,

    /// "Sale Invoice" or "Purchase Invoice"
    pub invoice_type: String,

    /// DRAFT, APPROVED or REJECTED
    pub status: String,

    /// Seller snapshot (tenant business name at creation)
    pub seller_name: String,

    /// Seller snapshot (tenant NTN at creation)
    pub seller_ntn: String,

    /// Buyer snapshot (buyer name at creation)
    pub buyer_name: String,

    /// Buyer snapshot (buyer NTN/CNIC at creation)
    pub buyer_ntn_cnic: String,

    /// Sum of item line totals
    pub total_amount: f64,

    /// Sum of item sales tax amounts
    pub tax_amount: f64,

    /// Tax authority's invoice number, set when APPROVED
    pub fbr_invoice_number: Option<String>,

    /// Tax authority's QR payload, set when APPROVED
    pub fbr_qr_payload: Option<String>,

    /// Authority-supplied reason, set when REJECTED, at most 255 chars
    pub rejection_reason: Option<String>,

    /// When the submission outcome was recorded
    pub submitted_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    /// Gets the parsed status enum
    pub fn get_status(&self) -> Option<InvoiceStatus> {
        InvoiceStatus::parse(&self.status)
    }

    /// Whether the invoice is still editable/submittable
    pub fn is_draft(&self) -> bool {
        self.status == InvoiceStatus::Draft.as_str()
    }
}

/// Listing projection for the invoices table view
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct InvoiceSummary {
    pub id: Uuid,
    pub internal_ref_no: String,
    pub buyer_name: String,
    pub invoice_date: NaiveDate,
    pub total_amount: f64,
    pub status: String,
}

/// Input for creating a draft or replacing a draft's contents
#[derive(Debug, Clone, Deserialize)]
pub struct DraftInvoice {
    pub buyer_id: Uuid,
    pub internal_ref_no: String,
    pub invoice_date: NaiveDate,

    /// Defaults to "Sale Invoice" when omitted
    #[serde(default = "default_invoice_type")]
    pub invoice_type: String,

    pub items: Vec<NewInvoiceItem>,
}

fn default_invoice_type() -> String {
    "Sale Invoice".to_string()
}

impl DraftInvoice {
    fn totals(&self) -> (f64, f64) {
        let total = self.items.iter().map(|i| i.line_total()).sum();
        let tax = self.items.iter().map(|i| i.sales_tax_applicable()).sum();
        (total, tax)
    }
}

/// Snapshot fields read inside the create/update transactions
#[derive(Debug, sqlx::FromRow)]
struct SellerSnapshot {
    business_name: String,
    ntn: String,
}

#[derive(Debug, sqlx::FromRow)]
struct BuyerSnapshot {
    buyer_name: String,
    ntn_cnic: String,
}

impl Invoice {
    /// Creates a draft invoice with its items in one transaction.
    ///
    /// Reads the seller and buyer snapshots, inserts the header with
    /// computed totals and then every item. Any failure rolls the whole
    /// invoice back, so a header without items is never observable.
    pub async fn create(
        pool: &PgPool,
        tenant_id: Uuid,
        data: DraftInvoice,
    ) -> Result<Self, InvoiceError> {
        if data.items.is_empty() {
            return Err(InvoiceError::EmptyItems);
        }

        let mut tx = pool.begin().await?;

        let seller = sqlx::query_as::<_, SellerSnapshot>(
            "SELECT business_name, ntn FROM tenants WHERE id = $1",
        )
        .bind(tenant_id)
        .fetch_one(&mut *tx)
        .await?;

        let buyer = sqlx::query_as::<_, BuyerSnapshot>(
            "SELECT buyer_name, ntn_cnic FROM buyers WHERE id = $1 AND tenant_id = $2",
        )
        .bind(data.buyer_id)
        .bind(tenant_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(InvoiceError::BuyerNotFound)?;

        let (total_amount, tax_amount) = data.totals();

        let invoice = sqlx::query_as::<_, Invoice>(
            r#"
            INSERT INTO invoices (tenant_id, buyer_id, internal_ref_no, invoice_date, invoice_type,
                                  seller_name, seller_ntn, buyer_name, buyer_ntn_cnic,
                                  total_amount, tax_amount)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(data.buyer_id)
        .bind(&data.internal_ref_no)
        .bind(data.invoice_date)
        .bind(&data.invoice_type)
        .bind(&seller.business_name)
        .bind(&seller.ntn)
        .bind(&buyer.buyer_name)
        .bind(&buyer.ntn_cnic)
        .bind(total_amount)
        .bind(tax_amount)
        .fetch_one(&mut *tx)
        .await?;

        insert_items(&mut tx, invoice.id, &data.items).await?;

        tx.commit().await?;

        Ok(invoice)
    }

    /// Fetches an invoice and its items, scoped to the tenant.
    ///
    /// # Errors
    ///
    /// `InvoiceError::NotFound` for a missing id or another tenant's id.
    pub async fn get_with_items(
        pool: &PgPool,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<(Self, Vec<InvoiceItem>), InvoiceError> {
        let invoice = sqlx::query_as::<_, Invoice>(
            "SELECT * FROM invoices WHERE id = $1 AND tenant_id = $2",
        )
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(pool)
        .await?
        .ok_or(InvoiceError::NotFound)?;

        let items = sqlx::query_as::<_, InvoiceItem>(
            "SELECT * FROM invoice_items WHERE invoice_id = $1 ORDER BY created_at, id",
        )
        .bind(id)
        .fetch_all(pool)
        .await?;

        Ok((invoice, items))
    }

    /// Lists the tenant's invoices, newest first.
    pub async fn list(pool: &PgPool, tenant_id: Uuid) -> Result<Vec<InvoiceSummary>, sqlx::Error> {
        sqlx::query_as::<_, InvoiceSummary>(
            r#"
            SELECT id, internal_ref_no, buyer_name, invoice_date, total_amount, status
            FROM invoices
            WHERE tenant_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(tenant_id)
        .fetch_all(pool)
        .await
    }

    /// Replaces a draft's header and its whole item set in one transaction.
    ///
    /// The buyer snapshot is refreshed from the (possibly new) buyer and
    /// items are delete-then-inserted, so the stored set always equals
    /// exactly the submitted set.
    ///
    /// # Errors
    ///
    /// `NotFound` for a missing/foreign invoice, `NotEditable` when the
    /// invoice already left the draft state.
    pub async fn update_draft(
        pool: &PgPool,
        tenant_id: Uuid,
        id: Uuid,
        data: DraftInvoice,
    ) -> Result<Self, InvoiceError> {
        if data.items.is_empty() {
            return Err(InvoiceError::EmptyItems);
        }

        let mut tx = pool.begin().await?;

        let (status,): (String,) = sqlx::query_as(
            "SELECT status FROM invoices WHERE id = $1 AND tenant_id = $2 FOR UPDATE",
        )
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(InvoiceError::NotFound)?;

        if status != InvoiceStatus::Draft.as_str() {
            return Err(InvoiceError::NotEditable);
        }

        let buyer = sqlx::query_as::<_, BuyerSnapshot>(
            "SELECT buyer_name, ntn_cnic FROM buyers WHERE id = $1 AND tenant_id = $2",
        )
        .bind(data.buyer_id)
        .bind(tenant_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(InvoiceError::BuyerNotFound)?;

        let (total_amount, tax_amount) = data.totals();

        let invoice = sqlx::query_as::<_, Invoice>(
            r#"
            UPDATE invoices
            SET buyer_id = $3,
                internal_ref_no = $4,
                invoice_date = $5,
                invoice_type = $6,
                buyer_name = $7,
                buyer_ntn_cnic = $8,
                total_amount = $9,
                tax_amount = $10,
                updated_at = NOW()
            WHERE id = $1 AND tenant_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(tenant_id)
        .bind(data.buyer_id)
        .bind(&data.internal_ref_no)
        .bind(data.invoice_date)
        .bind(&data.invoice_type)
        .bind(&buyer.buyer_name)
        .bind(&buyer.ntn_cnic)
        .bind(total_amount)
        .bind(tax_amount)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM invoice_items WHERE invoice_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        insert_items(&mut tx, id, &data.items).await?;

        tx.commit().await?;

        Ok(invoice)
    }

    /// Records an approval from the tax authority.
    pub async fn mark_approved(
        pool: &PgPool,
        id: Uuid,
        fbr_invoice_number: &str,
        fbr_qr_payload: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE invoices
            SET status = 'APPROVED',
                fbr_invoice_number = $2,
                fbr_qr_payload = $3,
                rejection_reason = NULL,
                submitted_at = NOW(),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(fbr_invoice_number)
        .bind(fbr_qr_payload)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Records a rejection from the tax authority.
    ///
    /// The reason is truncated to 255 characters to fit the column.
    pub async fn mark_rejected(pool: &PgPool, id: Uuid, reason: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE invoices
            SET status = 'REJECTED',
                rejection_reason = $2,
                fbr_invoice_number = NULL,
                fbr_qr_payload = NULL,
                submitted_at = NOW(),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(truncate_reason(reason))
        .execute(pool)
        .await?;

        Ok(())
    }
}

/// Inserts a batch of items for an invoice inside an open transaction.
async fn insert_items(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    invoice_id: Uuid,
    items: &[NewInvoiceItem],
) -> Result<(), sqlx::Error> {
    for item in items {
        sqlx::query(
            r#"
            INSERT INTO invoice_items (invoice_id, hs_code, product_code, description,
                                       quantity, unit_price, uom, tax_rate,
                                       discount, further_tax, extra_tax, sale_type,
                                       line_total, sales_tax_applicable)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(invoice_id)
        .bind(&item.hs_code)
        .bind(&item.product_code)
        .bind(&item.description)
        .bind(item.quantity)
        .bind(item.unit_price)
        .bind(&item.uom)
        .bind(item.tax_rate)
        .bind(item.discount)
        .bind(item.further_tax)
        .bind(item.extra_tax)
        .bind(&item.sale_type)
        .bind(item.line_total())
        .bind(item.sales_tax_applicable())
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

/// Clips a rejection reason to the column limit, on a char boundary.
pub fn truncate_reason(reason: &str) -> String {
    reason.chars().take(MAX_REJECTION_REASON_CHARS).collect()
}
