//! Application state and router builder
//!
//! # Example
//!
//! ```no_run
//! use linemark_api::{app::{build_router, AppState}, config::Config};
//! use sqlx::PgPool;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = Config::from_env()?;
//! let pool = PgPool::connect(&config.database.url).await?;
//! let app = build_router(AppState::new(pool, config));
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

use crate::{config::Config, error::ApiError, middleware::security::SecurityHeadersLayer, routes};
use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::{self as axum_middleware, Next},
    response::Response,
    routing::{get, post},
    Extension, Router,
};
use linemark_shared::auth::{
    authorization,
    middleware::{jwt_auth_middleware, AuthContext, AuthState},
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state, cloned into every handler
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<Config>,
    jwt_secret: Arc<str>,
}

impl AppState {
    pub fn new(db: PgPool, config: Config) -> Self {
        let jwt_secret = Arc::from(config.jwt.secret.as_str());
        Self {
            db,
            config: Arc::new(config),
            jwt_secret,
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.jwt_secret
    }

    /// State for the bearer-token middleware
    pub fn auth_state(&self) -> AuthState {
        AuthState {
            pool: self.db.clone(),
            secret: self.jwt_secret.clone(),
        }
    }
}

/// Builds the complete router
///
/// ```text
/// /health                                  public
/// /api/auth/{register,login,refresh,accept-invitation}   public
/// /api/auth/me                             bearer
/// /api/users/me[/password]                 bearer
/// /api/sportsgrounds[/:id]                 bearer, owner or admin
/// /api/templates[/:id]                     bearer
/// /api/configurations[/:id[/geometry]]     bearer, owner or admin
/// /api/bookings[/:id[/cancel]]             bearer, owner or admin
/// /api/admin/...                           bearer, admin
/// ```
///
/// Layers, outermost first: security headers, CORS, compression, request
/// tracing. Compression mostly matters for geometry responses.
pub fn build_router(state: AppState) -> Router {
    let auth_layer = axum_middleware::from_fn_with_state(state.auth_state(), jwt_auth_middleware);

    let auth = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/refresh", post(routes::auth::refresh))
        .route("/accept-invitation", post(routes::auth::accept_invitation))
        .route("/me", get(routes::auth::me).route_layer(auth_layer.clone()));

    let authenticated = Router::new()
        .route(
            "/users/me",
            get(routes::users::get_me).patch(routes::users::update_me),
        )
        .route("/users/me/password", post(routes::users::change_password))
        .route(
            "/sportsgrounds",
            get(routes::sportsgrounds::list_sportsgrounds)
                .post(routes::sportsgrounds::create_sportsground),
        )
        .route(
            "/sportsgrounds/:id",
            get(routes::sportsgrounds::get_sportsground)
                .patch(routes::sportsgrounds::update_sportsground)
                .delete(routes::sportsgrounds::delete_sportsground),
        )
        .route("/templates", get(routes::templates::list_templates))
        .route("/templates/:id", get(routes::templates::get_template))
        .route(
            "/configurations",
            get(routes::configurations::list_configurations)
                .post(routes::configurations::create_configuration),
        )
        .route(
            "/configurations/:id",
            get(routes::configurations::get_configuration)
                .patch(routes::configurations::update_configuration)
                .delete(routes::configurations::delete_configuration),
        )
        .route(
            "/configurations/:id/geometry",
            get(routes::configurations::get_geometry),
        )
        .route(
            "/bookings",
            get(routes::bookings::list_bookings).post(routes::bookings::create_booking),
        )
        .route("/bookings/:id", get(routes::bookings::get_booking))
        .route("/bookings/:id/cancel", post(routes::bookings::cancel_booking))
        .layer(auth_layer.clone());

    let admin = routes::admin::router()
        .layer(axum_middleware::from_fn(require_admin_layer))
        .layer(auth_layer);

    let api = Router::new()
        .nest("/auth", auth)
        .merge(authenticated)
        .nest("/admin", admin);

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/api", api)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CompressionLayer::new())
        .layer(cors_layer(&state.config))
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

/// Permissive when `*` is configured, otherwise an explicit origin list
fn cors_layer(config: &Config) -> CorsLayer {
    if config.allows_any_origin() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .api
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}

/// Rejects non-admins; runs after the bearer-token middleware
async fn require_admin_layer(
    Extension(auth): Extension<AuthContext>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    authorization::require_admin(&auth)?;
    Ok(next.run(req).await)
}
