pub mod config;
pub mod dtos;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod telemetry;
pub mod utils;

use std::sync::Arc;

use axum::{
    http::{header, HeaderName, Method, Request},
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::info_span;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;
use uuid::Uuid;

use crate::{
    config::AuthConfig,
    error::AppError,
    services::{
        AuditSink, AuthorizationEngine, CredentialService, OwnershipLookup, RecordStore,
        SessionResolver, SessionStore, TokenService,
    },
};

/// Shared application state. Store seams are trait objects so tests can run
/// entirely in memory.
#[derive(Clone)]
pub struct AppState {
    pub config: AuthConfig,
    pub store: Arc<dyn RecordStore>,
    pub sessions: Arc<dyn SessionStore>,
    pub audit: Arc<dyn AuditSink>,
    pub tokens: TokenService,
    pub credentials: CredentialService,
    pub resolver: SessionResolver,
    pub authz: AuthorizationEngine,
}

impl AppState {
    pub fn new(
        config: AuthConfig,
        store: Arc<dyn RecordStore>,
        sessions: Arc<dyn SessionStore>,
        ownership: Arc<dyn OwnershipLookup>,
        audit: Arc<dyn AuditSink>,
    ) -> Result<Self, AppError> {
        let tokens = TokenService::new(&config.token);
        let credentials = CredentialService::new(Arc::clone(&store))?;
        let resolver = SessionResolver::new(tokens.clone(), Arc::clone(&sessions));
        let authz = AuthorizationEngine::new(ownership);
        Ok(Self {
            config,
            store,
            sessions,
            audit,
            tokens,
            credentials,
            resolver,
            authz,
        })
    }
}

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

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::health_check,
        handlers::auth::registration::register,
        handlers::auth::session::login,
        handlers::auth::session::logout,
        handlers::auth::session::validate_token,
        handlers::auth::session::csrf_token,
        handlers::auth::password::change_password,
    ),
    components(schemas(
        dtos::RegisterRequest,
        dtos::LoginRequest,
        dtos::ChangePasswordRequest,
        dtos::RegisterResponse,
        dtos::LoginResponse,
        dtos::UserInfo,
        dtos::ValidateTokenResponse,
        dtos::CsrfTokenResponse,
        dtos::MessageResponse,
        dtos::ErrorBody,
        models::Role,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Registration, login, and session management"),
        (name = "Health", description = "Service health")
    )
)]
pub struct ApiDoc;

fn cors_layer(config: &AuthConfig) -> CorsLayer {
    let origins = config
        .security
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect::<Vec<_>>();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static(middleware::CSRF_HEADER),
        ])
        .allow_credentials(true)
}

/// Assembles the full service router. Layer order, outermost first: CORS,
/// tracing, audit, CSRF; authentication wraps only the protected routes.
pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/api/auth/validate-token", get(handlers::auth::validate_token))
        .route("/api/auth/csrf-token", get(handlers::auth::csrf_token))
        .route("/api/auth/logout", post(handlers::auth::logout))
        .route("/api/auth/change-password", post(handlers::auth::change_password))
        .route_layer(from_fn_with_state(
            state.clone(),
            crate::middleware::auth_middleware,
        ));

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/login", post(handlers::auth::login))
        .merge(protected)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(from_fn_with_state(
            state.clone(),
            crate::middleware::csrf_middleware,
        ))
        .layer(from_fn_with_state(
            state.clone(),
            crate::middleware::audit_middleware,
        ))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
            info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = %Uuid::new_v4(),
            )
        }))
        .layer(cors_layer(&state.config))
        .with_state(state)
}
