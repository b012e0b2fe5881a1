//! Shared test harness: app construction mirroring `main.rs`, request
//! helpers over `tower::ServiceExt`, and database seed functions.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;

use dtg_api::auth::jwt::{generate_access_token, JwtConfig};
use dtg_api::config::{NotificationSettings, ServerConfig};
use dtg_api::routes;
use dtg_api::state::AppState;
use dtg_core::types::DbId;
use dtg_events::EventBus;

/// Build a test `ServerConfig` with safe defaults.
///
/// No notification channel is configured, so routed events only produce
/// in-app notification rows.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: jwt_config(),
        notifications: NotificationSettings::default(),
    }
}

fn jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "test-secret".to_string(),
        access_token_expiry_mins: 60,
    }
}

/// Build the full application router with middleware layers, using the
/// given database pool.
///
/// This mirrors the router construction in `main.rs` so integration tests
/// exercise the same stack (CORS, timeout, panic recovery) that production
/// uses.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let event_bus = Arc::new(EventBus::default());

    let state = AppState {
        pool,
        config: Arc::new(config),
        event_bus,
    };

    let cors = CorsLayer::new()
        .allow_origin(["http://localhost:5173".parse().unwrap()])
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true);

    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_routes())
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(cors)
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn get_public(app: Router, uri: &str) -> Response {
    send(app, Method::GET, uri, None, None).await
}

pub async fn post_json_public(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn post_empty(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::POST, uri, Some(token), None).await
}

pub async fn delete(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::DELETE, uri, Some(token), None).await
}

pub async fn patch_json(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response {
    send(app, Method::PATCH, uri, Some(token), Some(body)).await
}

/// Collect a response body into parsed JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Seed helpers
// ---------------------------------------------------------------------------

/// Insert an operator organization, returning its id.
pub async fn seed_organization(pool: &PgPool, name: &str) -> DbId {
    sqlx::query_scalar(
        "INSERT INTO organizations (name, org_type) VALUES ($1, 'OPERATOR') RETURNING id",
    )
    .bind(name)
    .fetch_one(pool)
    .await
    .unwrap()
}

/// Insert a property for an organization, returning its id.
pub async fn seed_property(pool: &PgPool, organization_id: DbId) -> DbId {
    sqlx::query_scalar(
        "INSERT INTO properties (organization_id, name, address) \
         VALUES ($1, 'Test Property', '1 Main St') RETURNING id",
    )
    .bind(organization_id)
    .fetch_one(pool)
    .await
    .unwrap()
}

/// Insert a vendor with the given skill categories, returning its id.
pub async fn seed_vendor(pool: &PgPool, company: &str, skills: &[&str]) -> DbId {
    let vendor_id: DbId = sqlx::query_scalar(
        "INSERT INTO vendors (company_name) VALUES ($1) RETURNING id",
    )
    .bind(company)
    .fetch_one(pool)
    .await
    .unwrap();

    for category in skills {
        sqlx::query("INSERT INTO vendor_skills (vendor_id, category) VALUES ($1, $2)")
            .bind(vendor_id)
            .bind(category)
            .execute(pool)
            .await
            .unwrap();
    }

    vendor_id
}

/// Insert a user row with the given role/scopes, returning its id.
///
/// The password hash is a placeholder; tests authenticate with directly
/// minted tokens, not the login endpoint.
pub async fn seed_user(
    pool: &PgPool,
    email: &str,
    role: &str,
    organization_id: Option<DbId>,
    vendor_id: Option<DbId>,
) -> DbId {
    sqlx::query_scalar(
        "INSERT INTO users (email, password_hash, full_name, role, organization_id, vendor_id) \
         VALUES ($1, 'unused-hash', 'Test User', $2, $3, $4) RETURNING id",
    )
    .bind(email)
    .bind(role)
    .bind(organization_id)
    .bind(vendor_id)
    .fetch_one(pool)
    .await
    .unwrap()
}

/// Mint an access token matching the test JWT config.
pub fn token_for(
    user_id: DbId,
    role: &str,
    organization_id: Option<DbId>,
    vendor_id: Option<DbId>,
) -> String {
    generate_access_token(user_id, role, organization_id, vendor_id, &jwt_config()).unwrap()
}

/// Seed an admin user and return their token.
pub async fn seed_admin(pool: &PgPool) -> String {
    let user_id = seed_user(pool, "admin@test.local", "admin", None, None).await;
    token_for(user_id, "admin", None, None)
}

/// Seed an operator organization plus user; returns (org id, token).
pub async fn seed_operator(pool: &PgPool) -> (DbId, String) {
    let org_id = seed_organization(pool, "Acme Property Mgmt").await;
    let user_id = seed_user(pool, "operator@test.local", "operator", Some(org_id), None).await;
    (org_id, token_for(user_id, "operator", Some(org_id), None))
}

/// Seed a vendor user for an existing vendor; returns their token.
pub async fn seed_vendor_user(pool: &PgPool, vendor_id: DbId, email: &str) -> String {
    let user_id = seed_user(pool, email, "vendor", None, Some(vendor_id)).await;
    token_for(user_id, "vendor", None, Some(vendor_id))
}
