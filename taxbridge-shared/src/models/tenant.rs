/// Tenant model and database operations
///
/// A tenant is one registered business and the unit of multi-tenant
/// isolation: users, buyers and invoices all hang off a tenant id. The
/// tenant row also carries the per-environment FBR endpoint and bearer
/// credential used by the submission workflow.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tenants (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     business_name VARCHAR(255) NOT NULL,
///     ntn VARCHAR(50) NOT NULL UNIQUE,
///     province VARCHAR(100) NOT NULL,
///     address TEXT,
///     contact_email VARCHAR(255) NOT NULL UNIQUE,
///     contact_mobile VARCHAR(50),
///     status VARCHAR(20) NOT NULL DEFAULT 'ACTIVE',
///     fbr_sandbox_api_url TEXT,
///     fbr_sandbox_bearer_token TEXT,
///     fbr_prod_api_url TEXT,
///     fbr_prod_bearer_token TEXT,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Tenant account status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TenantStatus {
    /// Normal operation
    Active,

    /// Login blocked by an administrative action
    Suspended,
}

impl TenantStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TenantStatus::Active => "ACTIVE",
            TenantStatus::Suspended => "SUSPENDED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ACTIVE" => Some(TenantStatus::Active),
            "SUSPENDED" => Some(TenantStatus::Suspended),
            _ => None,
        }
    }
}

/// FBR environment a submission is aimed at
///
/// Each tenant configures an independent endpoint + bearer token pair for
/// the sandbox and for production.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FbrEnvironment {
    Sandbox,
    Production,
}

impl FbrEnvironment {
    pub fn as_str(&self) -> &'static str {
        match self {
            FbrEnvironment::Sandbox => "sandbox",
            FbrEnvironment::Production => "production",
        }
    }
}

/// Tenant model representing a registered business
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tenant {
    /// Unique tenant id
    pub id: Uuid,

    /// Registered business name
    pub business_name: String,

    /// National tax number (unique across tenants)
    pub ntn: String,

    /// Province of registration
    pub province: String,

    /// Business address
    pub address: Option<String>,

    /// Contact email (also the first user's login email)
    pub contact_email: String,

    /// Contact mobile number
    pub contact_mobile: Option<String>,

    /// ACTIVE or SUSPENDED
    pub status: String,

    /// FBR sandbox endpoint URL
    pub fbr_sandbox_api_url: Option<String>,

    /// FBR sandbox bearer token
    pub fbr_sandbox_bearer_token: Option<String>,

    /// FBR production endpoint URL
    pub fbr_prod_api_url: Option<String>,

    /// FBR production bearer token
    pub fbr_prod_bearer_token: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tenant {
    /// Gets the parsed status enum
    pub fn get_status(&self) -> Option<TenantStatus> {
        TenantStatus::parse(&self.status)
    }
}

/// Input for registering a new tenant
///
/// The password is already hashed by the caller; this layer never sees
/// plaintext credentials.
#[derive(Debug, Clone)]
pub struct RegisterTenant {
    pub business_name: String,
    pub ntn: String,
    pub province: String,
    pub address: Option<String>,
    pub contact_email: String,
    pub contact_mobile: Option<String>,
    pub password_hash: String,
}

/// The tenant's four FBR configuration fields
#[derive(Debug, Clone, Default, Serialize, Deserialize, sqlx::FromRow)]
pub struct FbrSettings {
    pub fbr_sandbox_api_url: Option<String>,
    pub fbr_sandbox_bearer_token: Option<String>,
    pub fbr_prod_api_url: Option<String>,
    pub fbr_prod_bearer_token: Option<String>,
}

/// A resolved endpoint + credential pair for one environment
#[derive(Debug, Clone)]
pub struct FbrEndpoint {
    pub api_url: String,
    pub bearer_token: String,
}

impl FbrSettings {
    /// Resolves the endpoint for an environment.
    ///
    /// Returns `None` when either the URL or the token is missing or
    /// blank. The submission workflow treats that as a config error
    /// rather than attempting a call that cannot authenticate.
    pub fn endpoint(&self, environment: FbrEnvironment) -> Option<FbrEndpoint> {
        let (url, token) = match environment {
            FbrEnvironment::Sandbox => (
                self.fbr_sandbox_api_url.as_deref(),
                self.fbr_sandbox_bearer_token.as_deref(),
            ),
            FbrEnvironment::Production => (
                self.fbr_prod_api_url.as_deref(),
                self.fbr_prod_bearer_token.as_deref(),
            ),
        };

        match (url, token) {
            (Some(url), Some(token)) if !url.trim().is_empty() && !token.trim().is_empty() => {
                Some(FbrEndpoint {
                    api_url: url.to_string(),
                    bearer_token: token.to_string(),
                })
            }
            _ => None,
        }
    }
}

impl Tenant {
    /// Registers a tenant and its first user atomically.
    ///
    /// Both inserts run in one transaction; a failure on either side
    /// (including a duplicate ntn or email) rolls the whole registration
    /// back, so a tenant without a user is never observable.
    ///
    /// # Errors
    ///
    /// Unique-constraint violations on `ntn` or `contact_email`/`email`
    /// surface as `sqlx::Error::Database` with the constraint name set.
    pub async fn register(pool: &PgPool, data: RegisterTenant) -> Result<(Self, Uuid), sqlx::Error> {
        let mut tx = pool.begin().await?;

        let tenant = sqlx::query_as::<_, Tenant>(
            r#"
            INSERT INTO tenants (business_name, ntn, province, address, contact_email, contact_mobile)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&data.business_name)
        .bind(&data.ntn)
        .bind(&data.province)
        .bind(&data.address)
        .bind(&data.contact_email)
        .bind(&data.contact_mobile)
        .fetch_one(&mut *tx)
        .await?;

        let (user_id,): (Uuid,) = sqlx::query_as(
            r#"
            INSERT INTO users (tenant_id, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(tenant.id)
        .bind(&data.contact_email)
        .bind(&data.password_hash)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok((tenant, user_id))
    }

    /// Finds a tenant by id.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Tenant>("SELECT * FROM tenants WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Reads the tenant's FBR settings.
    pub async fn fbr_settings(pool: &PgPool, id: Uuid) -> Result<Option<FbrSettings>, sqlx::Error> {
        sqlx::query_as::<_, FbrSettings>(
            r#"
            SELECT fbr_sandbox_api_url, fbr_sandbox_bearer_token,
                   fbr_prod_api_url, fbr_prod_bearer_token
            FROM tenants
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Overwrites the tenant's four FBR configuration fields.
    pub async fn update_fbr_settings(
        pool: &PgPool,
        id: Uuid,
        settings: FbrSettings,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE tenants
            SET fbr_sandbox_api_url = $2,
                fbr_sandbox_bearer_token = $3,
                fbr_prod_api_url = $4,
                fbr_prod_bearer_token = $5,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&settings.fbr_sandbox_api_url)
        .bind(&settings.fbr_sandbox_bearer_token)
        .bind(&settings.fbr_prod_api_url)
        .bind(&settings.fbr_prod_bearer_token)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tenant_status_roundtrip() {
        assert_eq!(TenantStatus::Active.as_str(), "ACTIVE");
        assert_eq!(TenantStatus::Suspended.as_str(), "SUSPENDED");
        assert_eq!(TenantStatus::parse("ACTIVE"), Some(TenantStatus::Active));
        assert_eq!(TenantStatus::parse("SUSPENDED"), Some(TenantStatus::Suspended));
        assert_eq!(TenantStatus::parse("banana"), None);
    }

    #[test]
    fn test_environment_parse() {
        let env: FbrEnvironment = serde_json::from_str("\"sandbox\"").unwrap();
        assert_eq!(env, FbrEnvironment::Sandbox);
        let env: FbrEnvironment = serde_json::from_str("\"production\"").unwrap();
        assert_eq!(env, FbrEnvironment::Production);
        assert!(serde_json::from_str::<FbrEnvironment>("\"staging\"").is_err());
    }

    #[test]
    fn test_endpoint_requires_both_fields() {
        let settings = FbrSettings {
            fbr_sandbox_api_url: Some("https://sandbox.fbr.gov.pk/di".to_string()),
            fbr_sandbox_bearer_token: None,
            ..Default::default()
        };
        assert!(settings.endpoint(FbrEnvironment::Sandbox).is_none());

        let settings = FbrSettings {
            fbr_sandbox_api_url: Some("https://sandbox.fbr.gov.pk/di".to_string()),
            fbr_sandbox_bearer_token: Some("tok".to_string()),
            ..Default::default()
        };
        let endpoint = settings.endpoint(FbrEnvironment::Sandbox).unwrap();
        assert_eq!(endpoint.api_url, "https://sandbox.fbr.gov.pk/di");
        assert_eq!(endpoint.bearer_token, "tok");

        // Production pair untouched by sandbox config
        assert!(settings.endpoint(FbrEnvironment::Production).is_none());
    }

    #[test]
    fn test_endpoint_rejects_blank_values() {
        let settings = FbrSettings {
            fbr_prod_api_url: Some("   ".to_string()),
            fbr_prod_bearer_token: Some("tok".to_string()),
            ..Default::default()
        };
        assert!(settings.endpoint(FbrEnvironment::Production).is_none());
    }
}
