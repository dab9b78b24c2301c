/// Wire payload for the FBR Digital Invoicing POST
///
/// The authority's API takes camelCase JSON. Field naming is theirs,
/// not ours, and must not drift; everything here serializes with
/// explicit `rename` attributes rather than a blanket rename rule so a
/// future column rename cannot silently change the wire format.

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::invoice::Invoice;
use crate::models::invoice_item::InvoiceItem;

/// Placeholder NTN the authority expects for unregistered buyers
pub const UNREGISTERED_BUYER_NTN: &str = "9999999999999";

/// Seller NTNs are sent without dashes, clipped to the 7-digit core.
pub fn normalize_seller_ntn(ntn: &str) -> String {
    ntn.replace('-', "").chars().take(7).collect()
}

/// Formats a tax rate as the authority's percent string ("18%").
pub fn format_rate(rate: f64) -> String {
    if rate.fract() == 0.0 {
        format!("{}%", rate as i64)
    } else {
        format!("{}%", rate)
    }
}

/// One invoice as posted to the authority
#[derive(Debug, Clone, Serialize)]
pub struct FbrInvoicePayload {
    #[serde(rename = "invoiceType")]
    pub invoice_type: String,

    /// ISO date, no time component
    #[serde(rename = "invoiceDate")]
    pub invoice_date: String,

    #[serde(rename = "sellerNTNCNIC")]
    pub seller_ntn_cnic: String,

    #[serde(rename = "sellerBusinessName")]
    pub seller_business_name: String,

    #[serde(rename = "buyerNTNCNIC")]
    pub buyer_ntn_cnic: String,

    #[serde(rename = "buyerBusinessName")]
    pub buyer_business_name: String,

    pub items: Vec<FbrItemPayload>,
}

/// One line item on the wire
#[derive(Debug, Clone, Serialize)]
pub struct FbrItemPayload {
    #[serde(rename = "hsCode")]
    pub hs_code: String,

    #[serde(rename = "productDescription")]
    pub product_description: String,

    pub quantity: f64,

    /// Percent string, e.g. "18%"
    pub rate: String,

    #[serde(rename = "uoM")]
    pub uom: String,

    #[serde(rename = "saleType")]
    pub sale_type: String,

    #[serde(rename = "valueExcludingSalesTax")]
    pub value_excluding_sales_tax: f64,

    #[serde(rename = "salesTaxApplicable")]
    pub sales_tax_applicable: f64,

    #[serde(rename = "netValueExcludingST")]
    pub net_value_excluding_st: f64,

    pub discount: f64,

    #[serde(rename = "furtherTax")]
    pub further_tax: f64,

    #[serde(rename = "extraTax")]
    pub extra_tax: f64,
}

impl FbrInvoicePayload {
    /// Builds the wire payload from a persisted invoice and its items.
    ///
    /// Uses the snapshot columns on the invoice row, so the payload
    /// reflects the parties as they were when the draft was created,
    /// not their current records. A blank buyer tax id falls back to
    /// the authority's unregistered-buyer placeholder.
    pub fn from_invoice(invoice: &Invoice, items: &[InvoiceItem]) -> Self {
        let buyer_ntn_cnic = if invoice.buyer_ntn_cnic.trim().is_empty() {
            UNREGISTERED_BUYER_NTN.to_string()
        } else {
            invoice.buyer_ntn_cnic.clone()
        };

        FbrInvoicePayload {
            invoice_type: invoice.invoice_type.clone(),
            invoice_date: format_date(invoice.invoice_date),
            seller_ntn_cnic: normalize_seller_ntn(&invoice.seller_ntn),
            seller_business_name: invoice.seller_name.clone(),
            buyer_ntn_cnic,
            buyer_business_name: invoice.buyer_name.clone(),
            items: items.iter().map(FbrItemPayload::from_item).collect(),
        }
    }
}

impl FbrItemPayload {
    fn from_item(item: &InvoiceItem) -> Self {
        FbrItemPayload {
            hs_code: item.hs_code.clone(),
            product_description: item.description.clone(),
            quantity: item.quantity,
            rate: format_rate(item.tax_rate),
            uom: item.uom.clone(),
            sale_type: item.sale_type.clone(),
            value_excluding_sales_tax: item.line_total,
            sales_tax_applicable: item.sales_tax_applicable,
            net_value_excluding_st: item.line_total,
            discount: item.discount,
            further_tax: item.further_tax,
            extra_tax: item.extra_tax,
        }
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn invoice() -> Invoice {
        Invoice {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            buyer_id: Uuid::new_v4(),
            internal_ref_no: "INV-001".to_string(),
            invoice_date: NaiveDate::from_ymd_opt(2026, 1, 31).unwrap(),
            invoice_type: "Sale Invoice".to_string(),
            status: "DRAFT".to_string(),
            seller_name: "Acme".to_string(),
            seller_ntn: "1234567-8".to_string(),
            buyer_name: "Beta Corp".to_string(),
            buyer_ntn_cnic: "9876543-2".to_string(),
            total_amount: 1000.0,
            tax_amount: 180.0,
            fbr_invoice_number: None,
            fbr_qr_payload: None,
            rejection_reason: None,
            submitted_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn item() -> InvoiceItem {
        InvoiceItem {
            id: Uuid::new_v4(),
            invoice_id: Uuid::new_v4(),
            hs_code: "8471.3000".to_string(),
            product_code: None,
            description: "Laptop".to_string(),
            quantity: 2.0,
            unit_price: 500.0,
            uom: "U1000069".to_string(),
            tax_rate: 18.0,
            discount: 0.0,
            further_tax: 0.0,
            extra_tax: 0.0,
            sale_type: "T1000017".to_string(),
            line_total: 1000.0,
            sales_tax_applicable: 180.0,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_normalize_seller_ntn_strips_dashes_and_clips() {
        assert_eq!(normalize_seller_ntn("1234567-8"), "1234567");
        assert_eq!(normalize_seller_ntn("12-34-567"), "1234567");
        assert_eq!(normalize_seller_ntn("123"), "123");
    }

    #[test]
    fn test_format_rate() {
        assert_eq!(format_rate(18.0), "18%");
        assert_eq!(format_rate(0.0), "0%");
        assert_eq!(format_rate(17.5), "17.5%");
    }

    #[test]
    fn test_payload_field_names_on_the_wire() {
        let payload = FbrInvoicePayload::from_invoice(&invoice(), &[item()]);
        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(json["invoiceType"], "Sale Invoice");
        assert_eq!(json["invoiceDate"], "2026-01-31");
        assert_eq!(json["sellerNTNCNIC"], "1234567");
        assert_eq!(json["sellerBusinessName"], "Acme");
        assert_eq!(json["buyerNTNCNIC"], "9876543-2");
        assert_eq!(json["buyerBusinessName"], "Beta Corp");

        let item = &json["items"][0];
        assert_eq!(item["hsCode"], "8471.3000");
        assert_eq!(item["productDescription"], "Laptop");
        assert_eq!(item["quantity"], 2.0);
        assert_eq!(item["rate"], "18%");
        assert_eq!(item["uoM"], "U1000069");
        assert_eq!(item["saleType"], "T1000017");
        assert_eq!(item["valueExcludingSalesTax"], 1000.0);
        assert_eq!(item["salesTaxApplicable"], 180.0);
        assert_eq!(item["netValueExcludingST"], 1000.0);
    }

    #[test]
    fn test_blank_buyer_ntn_falls_back_to_placeholder() {
        let mut inv = invoice();
        inv.buyer_ntn_cnic = "  ".to_string();
        let payload = FbrInvoicePayload::from_invoice(&inv, &[]);
        assert_eq!(payload.buyer_ntn_cnic, UNREGISTERED_BUYER_NTN);
    }
}
