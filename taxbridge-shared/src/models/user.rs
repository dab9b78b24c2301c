/// User model and database operations
///
/// A user belongs to exactly one tenant and is created alongside it at
/// registration (see `Tenant::register`). Login resolves email → user +
/// tenant in a single join so the suspended check needs no second query.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// User account
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user id
    pub id: Uuid,

    /// Owning tenant (non-null, one tenant per user)
    pub tenant_id: Uuid,

    /// Login email (globally unique)
    pub email: String,

    /// Argon2id password hash, PHC string format
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Last successful login
    pub last_login_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
}

/// A user joined with the tenant fields login needs
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserWithTenant {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub email: String,
    pub password_hash: String,

    /// Tenant business name, returned in the login profile
    pub business_name: String,

    /// Tenant status string (ACTIVE / SUSPENDED)
    pub tenant_status: String,
}

impl User {
    /// Finds a user by login email, joined with its tenant.
    pub async fn find_by_email_with_tenant(
        pool: &PgPool,
        email: &str,
    ) -> Result<Option<UserWithTenant>, sqlx::Error> {
        sqlx::query_as::<_, UserWithTenant>(
            r#"
            SELECT u.id, u.tenant_id, u.email, u.password_hash,
                   t.business_name, t.status AS tenant_status
            FROM users u
            JOIN tenants t ON u.tenant_id = t.id
            WHERE u.email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await
    }

    /// Stamps the user's last successful login.
    pub async fn update_last_login(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(())
    }
}
