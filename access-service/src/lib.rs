pub mod config;
pub mod db;
pub mod dtos;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod registry;
pub mod services;
pub mod utils;

use std::sync::Arc;

use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, patch, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use service_core::error::AppError;
use service_core::middleware::{
    security_headers::security_headers_middleware, tracing::request_id_middleware,
};

use crate::config::AccessConfig;
use crate::db::{CastingBackend, CredentialVerifier, PermissionLookup, UserLookup};
use crate::registry::RequirementRegistry;
use crate::services::{DecisionEngine, TokenService};

#[derive(OpenApi)]
#[openapi(
    paths(
        health_check,
        handlers::auth::login,
        handlers::castings::list_castings,
        handlers::castings::create_casting,
        handlers::castings::apply_to_casting,
        handlers::users::update_profile,
        handlers::users::assign_role,
    ),
    components(
        schemas(
            dtos::ErrorResponse,
            dtos::auth::LoginRequest,
            dtos::auth::TokenResponse,
            dtos::auth::AssignRoleRequest,
            db::backend::CastingSummary,
            db::backend::NewCasting,
            db::backend::ApplicationReceipt,
            db::backend::ProfileChanges,
            db::backend::ProfileView,
            models::UserResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Credential exchange and token issuance"),
        (name = "Castings", description = "Casting operations behind the authorization pipeline"),
        (name = "Users", description = "Profile operations behind the authorization pipeline"),
        (name = "Admin", description = "Privileged role administration"),
        (name = "Observability", description = "Service health"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: AccessConfig,
    pub jwt: TokenService,
    pub engine: DecisionEngine,
    pub registry: Arc<RequirementRegistry>,
    pub users: Arc<dyn UserLookup>,
    pub roles: Arc<dyn PermissionLookup>,
    pub credentials: Arc<dyn CredentialVerifier>,
    pub backend: Arc<dyn CastingBackend>,
}

pub async fn build_router(state: AppState) -> Result<Router, AppError> {
    let cors = CorsLayer::new()
        .allow_origin(
            state
                .config
                .security
                .allowed_origins
                .iter()
                .map(|o| {
                    o.parse::<axum::http::HeaderValue>().unwrap_or_else(|e| {
                        tracing::error!("Invalid CORS origin '{}': {}. Using fallback.", o, e);
                        axum::http::HeaderValue::from_static("http://localhost:3000")
                    })
                })
                .collect::<Vec<axum::http::HeaderValue>>(),
        )
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PATCH,
            axum::http::Method::PUT,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let app = Router::new()
        .route("/health", get(health_check))
        .merge(SwaggerUi::new("/docs").url("/.well-known/openapi.json", ApiDoc::openapi()))
        .route("/auth/login", post(handlers::auth::login))
        // Protected surface. Requirements live in the registry, not here;
        // the two layers below are the only enforcement path.
        .route(
            "/castings",
            get(handlers::castings::list_castings).post(handlers::castings::create_casting),
        )
        .route(
            "/castings/:casting_id/applications",
            post(handlers::castings::apply_to_casting),
        )
        .route(
            "/users/:user_id/profile",
            patch(handlers::users::update_profile),
        )
        .route(
            "/admin/users/:user_id/role",
            put(handlers::users::assign_role),
        )
        .with_state(state.clone())
        .layer(from_fn_with_state(
            state.clone(),
            middleware::authorize_middleware,
        ))
        .layer(from_fn_with_state(
            state.clone(),
            middleware::authenticate_middleware,
        ))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(cors);

    Ok(app)
}

/// Service health check
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy")
    ),
    tag = "Observability"
)]
pub async fn health_check(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "healthy",
        "service": state.config.service_name,
        "version": state.config.service_version,
        "environment": format!("{:?}", state.config.environment),
        "protected_operations": state.registry.operations().count(),
    }))
}
