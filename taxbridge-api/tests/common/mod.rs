/// Common test utilities for integration tests
///
/// This module provides shared infrastructure for integration tests:
/// - Test database setup and cleanup
/// - Test tenant/user registration
/// - JWT token generation
/// - A canned tax authority client so no live FBR endpoint is needed
///
/// Tests that construct a `TestContext` need a PostgreSQL instance
/// reachable through `DATABASE_URL`.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use sqlx::PgPool;
use std::sync::Arc;
use taxbridge_api::app::{build_router, AppState};
use taxbridge_api::config::Config;
use taxbridge_shared::auth::jwt::{create_token, Claims};
use taxbridge_shared::auth::password::hash_password;
use taxbridge_shared::fbr::{FbrInvoicePayload, SubmissionResult, TaxAuthorityClient};
use taxbridge_shared::models::tenant::{FbrEndpoint, RegisterTenant, Tenant};
use tokio::sync::Notify;
use tower::Service as _;
use uuid::Uuid;

/// Tax authority client that returns a canned result
pub struct StubFbrClient {
    result: SubmissionResult,
}

impl StubFbrClient {
    pub fn approving(invoice_number: &str, qr_payload: &str) -> Self {
        Self {
            result: SubmissionResult::Success {
                invoice_number: invoice_number.to_string(),
                qr_payload: qr_payload.to_string(),
                raw: serde_json::json!({
                    "InvoiceNumber": invoice_number,
                    "QRLink": qr_payload,
                }),
            },
        }
    }

    pub fn rejecting(reason: &str) -> Self {
        Self {
            result: SubmissionResult::Failure {
                reason: reason.to_string(),
                transport: false,
            },
        }
    }

    pub fn unreachable(reason: &str) -> Self {
        Self {
            result: SubmissionResult::Failure {
                reason: reason.to_string(),
                transport: true,
            },
        }
    }
}

#[async_trait]
impl TaxAuthorityClient for StubFbrClient {
    async fn submit(
        &self,
        _endpoint: &FbrEndpoint,
        _payload: &FbrInvoicePayload,
    ) -> SubmissionResult {
        self.result.clone()
    }
}

/// Tax authority client that holds its response until released
///
/// Lets a test keep one submission in flight while another one runs to
/// completion, so the interleaving of overlapping submissions can be
/// observed instead of assumed.
pub struct GatedFbrClient {
    result: SubmissionResult,
    entered: Notify,
    release: Notify,
}

impl GatedFbrClient {
    pub fn rejecting(reason: &str) -> Self {
        Self {
            result: SubmissionResult::Failure {
                reason: reason.to_string(),
                transport: false,
            },
            entered: Notify::new(),
            release: Notify::new(),
        }
    }

    /// Resolves once a submission has reached the remote call.
    pub async fn entered(&self) {
        self.entered.notified().await;
    }

    /// Lets the held submission return its result.
    pub fn release(&self) {
        self.release.notify_one();
    }
}

#[async_trait]
impl TaxAuthorityClient for GatedFbrClient {
    async fn submit(
        &self,
        _endpoint: &FbrEndpoint,
        _payload: &FbrInvoicePayload,
    ) -> SubmissionResult {
        self.entered.notify_one();
        self.release.notified().await;
        self.result.clone()
    }
}

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
    pub config: Config,
    pub tenant: Tenant,
    pub user_id: Uuid,
    pub jwt_token: String,
}

impl TestContext {
    /// Creates a context whose tax authority approves everything.
    pub async fn new() -> anyhow::Result<Self> {
        Self::with_fbr(StubFbrClient::approving("7000123", "qrdata")).await
    }

    /// Creates a context with a specific canned tax authority.
    pub async fn with_fbr(fbr: StubFbrClient) -> anyhow::Result<Self> {
        let config = Config::from_env()?;

        let db = PgPool::connect(&config.database.url).await?;

        // Run migrations (path relative to Cargo.toml, not this file)
        sqlx::migrate!("../migrations").run(&db).await?;

        // Register a fresh tenant; unique ntn/email per run
        let suffix = Uuid::new_v4().simple().to_string();
        let (tenant, user_id) = Tenant::register(
            &db,
            RegisterTenant {
                business_name: format!("Test Business {}", suffix),
                ntn: format!("{}-1", &suffix[..7]),
                province: "Punjab".to_string(),
                address: None,
                contact_email: format!("test-{}@example.pk", suffix),
                contact_mobile: None,
                password_hash: hash_password("test-password-123")?,
            },
        )
        .await?;

        // Give the tenant usable sandbox settings
        sqlx::query(
            "UPDATE tenants SET fbr_sandbox_api_url = $2, fbr_sandbox_bearer_token = $3 WHERE id = $1",
        )
        .bind(tenant.id)
        .bind("https://sandbox.test.invalid/di")
        .bind("test-token")
        .execute(&db)
        .await?;

        let claims = Claims::new(user_id, tenant.id, tenant.contact_email.clone());
        let jwt_token = create_token(&claims, &config.jwt.secret)?;

        let state = AppState::new(db.clone(), config.clone(), Arc::new(fbr));
        let app = build_router(state);

        Ok(TestContext {
            db,
            app,
            config,
            tenant,
            user_id,
            jwt_token,
        })
    }

    /// Authorization header value for the test user
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.jwt_token)
    }

    /// Sends a JSON request through the app and returns status + body.
    pub async fn request(
        &mut self,
        method: &str,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("authorization", self.auth_header());

        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let request = builder.body(body).unwrap();
        let response = self.app.call(request).await.unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        (status, json)
    }

    /// Creates a buyer and returns its id.
    pub async fn create_buyer(&mut self, name: &str, ntn_cnic: &str) -> Uuid {
        let (status, body) = self
            .request(
                "POST",
                "/buyers",
                Some(serde_json::json!({
                    "buyer_name": name,
                    "ntn_cnic": ntn_cnic,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create buyer failed: {}", body);
        Uuid::parse_str(body["id"].as_str().unwrap()).unwrap()
    }

    /// Creates a one-item draft invoice and returns its id.
    pub async fn create_draft(&mut self, buyer_id: Uuid) -> Uuid {
        let (status, body) = self
            .request(
                "POST",
                "/invoices",
                Some(serde_json::json!({
                    "buyer_id": buyer_id,
                    "internal_ref_no": "INV-001",
                    "invoice_date": "2026-01-31",
                    "items": [{
                        "hs_code": "8471.3000",
                        "description": "Laptop",
                        "quantity": 2,
                        "unit_price": 500,
                        "uom": "U1000069",
                        "tax_rate": 18,
                        "sale_type": "T1000017"
                    }]
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create draft failed: {}", body);
        Uuid::parse_str(body["id"].as_str().unwrap()).unwrap()
    }

    /// Removes the test tenant and everything hanging off it.
    pub async fn cleanup(self) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM invoices WHERE tenant_id = $1")
            .bind(self.tenant.id)
            .execute(&self.db)
            .await?;
        sqlx::query("DELETE FROM buyers WHERE tenant_id = $1")
            .bind(self.tenant.id)
            .execute(&self.db)
            .await?;
        sqlx::query("DELETE FROM tenants WHERE id = $1")
            .bind(self.tenant.id)
            .execute(&self.db)
            .await?;
        Ok(())
    }
}
