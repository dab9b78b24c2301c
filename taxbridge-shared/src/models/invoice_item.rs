/// Invoice line items
///
/// Items exist only in the context of their invoice: they are inserted
/// with it, fully replaced when a draft is updated, and cascade-deleted
/// with it. Derived amounts are computed server-side at write time, not
/// trusted from the client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Persisted line item
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct InvoiceItem {
    pub id: Uuid,
    pub invoice_id: Uuid,

    /// Harmonized System code classifying the product
    pub hs_code: String,

    /// Tenant's internal product code
    pub product_code: Option<String>,

    pub description: String,
    pub quantity: f64,
    pub unit_price: f64,

    /// FBR unit-of-measure code (e.g. "U1000069")
    pub uom: String,

    /// Sales tax rate, percent
    pub tax_rate: f64,

    pub discount: f64,
    pub further_tax: f64,
    pub extra_tax: f64,

    /// FBR sale type code (e.g. "T1000017")
    pub sale_type: String,

    /// quantity * unit_price
    pub line_total: f64,

    /// line_total * tax_rate / 100
    pub sales_tax_applicable: f64,

    pub created_at: DateTime<Utc>,
}

/// Incoming line item, before derived amounts are computed
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NewInvoiceItem {
    pub hs_code: String,

    #[serde(default)]
    pub product_code: Option<String>,

    pub description: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub uom: String,
    pub tax_rate: f64,

    #[serde(default)]
    pub discount: f64,

    #[serde(default)]
    pub further_tax: f64,

    #[serde(default)]
    pub extra_tax: f64,

    pub sale_type: String,
}

impl NewInvoiceItem {
    /// Value excluding sales tax for this line.
    pub fn line_total(&self) -> f64 {
        self.quantity * self.unit_price
    }

    /// Sales tax amount applicable to this line.
    pub fn sales_tax_applicable(&self) -> f64 {
        self.line_total() * self.tax_rate / 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(qty: f64, price: f64, rate: f64) -> NewInvoiceItem {
        NewInvoiceItem {
            hs_code: "8471.3000".to_string(),
            product_code: None,
            description: "Laptop".to_string(),
            quantity: qty,
            unit_price: price,
            uom: "U1000069".to_string(),
            tax_rate: rate,
            discount: 0.0,
            further_tax: 0.0,
            extra_tax: 0.0,
            sale_type: "T1000017".to_string(),
        }
    }

    #[test]
    fn test_line_total() {
        assert_eq!(item(2.0, 500.0, 18.0).line_total(), 1000.0);
    }

    #[test]
    fn test_sales_tax_applicable() {
        assert_eq!(item(2.0, 500.0, 18.0).sales_tax_applicable(), 180.0);
        assert_eq!(item(1.0, 100.0, 0.0).sales_tax_applicable(), 0.0);
    }

    #[test]
    fn test_optional_fields_default() {
        let json = r#"{
            "hs_code": "0000.0000",
            "description": "Widget",
            "quantity": 1,
            "unit_price": 50,
            "uom": "U1000069",
            "tax_rate": 18,
            "sale_type": "T1000017"
        }"#;
        let item: NewInvoiceItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.discount, 0.0);
        assert_eq!(item.further_tax, 0.0);
        assert_eq!(item.extra_tax, 0.0);
        assert!(item.product_code.is_none());
    }
}
