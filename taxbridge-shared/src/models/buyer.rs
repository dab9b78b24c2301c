/// Buyer model and database operations
///
/// Buyers are the tenant's customers. They are created once and then
/// only read; an invoice snapshots the buyer's name and tax id at
/// creation time, so editing buyers is deliberately unsupported.
/// Duplicate tax ids are permitted, both across and within tenants.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Buyer (customer) record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Buyer {
    /// Unique buyer id
    pub id: Uuid,

    /// Owning tenant
    pub tenant_id: Uuid,

    /// Buyer business or person name
    pub buyer_name: String,

    /// NTN (business) or CNIC (individual) tax identifier
    pub ntn_cnic: String,

    pub buyer_email: Option<String>,
    pub buyer_address: Option<String>,
    pub buyer_phone: Option<String>,

    pub created_at: DateTime<Utc>,
}

/// Input for creating a buyer
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBuyer {
    pub buyer_name: String,
    pub ntn_cnic: String,
    pub buyer_email: Option<String>,
    pub buyer_address: Option<String>,
    pub buyer_phone: Option<String>,
}

impl Buyer {
    /// Creates a buyer for the tenant.
    pub async fn create(
        pool: &PgPool,
        tenant_id: Uuid,
        data: CreateBuyer,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Buyer>(
            r#"
            INSERT INTO buyers (tenant_id, buyer_name, ntn_cnic, buyer_email, buyer_address, buyer_phone)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(&data.buyer_name)
        .bind(&data.ntn_cnic)
        .bind(&data.buyer_email)
        .bind(&data.buyer_address)
        .bind(&data.buyer_phone)
        .fetch_one(pool)
        .await
    }

    /// Lists the tenant's buyers, most recently created first.
    pub async fn list(pool: &PgPool, tenant_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Buyer>(
            "SELECT * FROM buyers WHERE tenant_id = $1 ORDER BY created_at DESC",
        )
        .bind(tenant_id)
        .fetch_all(pool)
        .await
    }

    /// Finds one of the tenant's buyers by id.
    ///
    /// Tenant-scoped: another tenant's buyer id yields `None`.
    pub async fn find_for_tenant(
        pool: &PgPool,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Buyer>("SELECT * FROM buyers WHERE id = $1 AND tenant_id = $2")
            .bind(id)
            .bind(tenant_id)
            .fetch_optional(pool)
            .await
    }
}
