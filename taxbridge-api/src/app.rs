/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use taxbridge_api::{app::AppState, config::Config};
/// use taxbridge_shared::fbr::FbrClient;
/// use sqlx::PgPool;
/// use std::sync::Arc;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let fbr = Arc::new(FbrClient::new()?);
/// let state = AppState::new(pool, config, fbr);
/// let app = taxbridge_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::config::Config;
use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, post, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use taxbridge_shared::auth::{jwt, middleware::AuthContext};
use taxbridge_shared::fbr::TaxAuthorityClient;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning. The tax authority client sits
/// behind a trait object so tests can substitute a canned endpoint.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Tax authority client used by the submission endpoint
    pub fbr: Arc<dyn TaxAuthorityClient>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config, fbr: Arc<dyn TaxAuthorityClient>) -> Self {
        Self {
            db,
            config: Arc::new(config),
            fbr,
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                      # Health check (public)
/// ├── /auth/                       # Authentication (public)
/// │   ├── POST /register
/// │   └── POST /login
/// ├── /buyers                      # Buyer management (authenticated)
/// │   ├── GET  /
/// │   └── POST /
/// ├── /invoices                    # Draft store + submission (authenticated)
/// │   ├── GET  /
/// │   ├── POST /
/// │   ├── GET  /:id
/// │   ├── PUT  /:id
/// │   └── POST /:id/submit
/// └── /settings                    # FBR credentials (authenticated)
///     ├── GET /
///     └── PUT /
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Authentication (per-route-group)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Auth routes (public, no auth required)
    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login));

    // Everything below requires a valid session token
    let buyer_routes = Router::new()
        .route("/", get(routes::buyers::list_buyers))
        .route("/", post(routes::buyers::create_buyer));

    let invoice_routes = Router::new()
        .route("/", get(routes::invoices::list_invoices))
        .route("/", post(routes::invoices::create_invoice))
        .route("/:id", get(routes::invoices::get_invoice))
        .route("/:id", put(routes::invoices::update_invoice))
        .route("/:id/submit", post(routes::invoices::submit_invoice));

    let settings_routes = Router::new()
        .route("/", get(routes::settings::get_settings))
        .route("/", put(routes::settings::update_settings));

    let protected_routes = Router::new()
        .nest("/buyers", buyer_routes)
        .nest("/invoices", invoice_routes)
        .nest("/settings", settings_routes)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.is_empty() {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        // Production mode: configure allowed origins
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/auth", auth_routes)
        .merge(protected_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// JWT authentication middleware layer
///
/// Extracts and validates the JWT from the Authorization header, then
/// injects an `AuthContext` into request extensions for handlers.
async fn jwt_auth_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, crate::error::ApiError> {
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            crate::error::ApiError::Unauthorized("Missing authorization header".to_string())
        })?;

    let token = taxbridge_shared::auth::middleware::extract_bearer(auth_header)?;

    let claims = jwt::validate_token(token, state.jwt_secret())?;

    req.extensions_mut().insert(AuthContext::from_claims(&claims));

    Ok(next.run(req).await)
}
