pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;

use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    routing::{get, post, put},
    Json, Router,
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use utoipa::OpenApi;

use authgate_auth::{
    AuthService, JwtSigner, JwtValidator, PasswordScheme, UserStore, DEFAULT_TOKEN_VALIDITY_SECS,
};
use authgate_http_auth::TokenGate;

/// Application state shared across handlers
pub struct AppState {
    pub auth: AuthService,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "authgate API",
        version = "0.1.0",
        description = "Login and bearer-token protected user status endpoints"
    ),
    paths(
        handlers::health_check,
        handlers::signup,
        handlers::login,
        handlers::get_user_status,
        handlers::update_user_status,
    ),
    components(
        schemas(
            models::SignupRequest,
            models::SignupResponse,
            models::LoginRequest,
            models::LoginResponse,
            models::UserStatusResponse,
            models::UpdateStatusRequest,
            models::HealthResponse,
            models::ErrorResponse,
        )
    ),
    tags(
        (name = "auth", description = "Signup, login and user status endpoints"),
        (name = "system", description = "System health and info endpoints")
    )
)]
pub struct ApiDoc;

/// API server configuration
#[derive(Clone)]
pub struct ApiServerConfig {
    /// Address to bind the API server
    pub bind_addr: SocketAddr,
    /// Enable CORS (for development)
    pub enable_cors: bool,
    /// Secret used to sign and verify access tokens
    pub jwt_secret: String,
    /// Lifetime of access tokens issued at login
    pub token_validity: chrono::Duration,
}

impl ApiServerConfig {
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            enable_cors: false,
            jwt_secret: jwt_secret.into(),
            token_validity: chrono::Duration::seconds(DEFAULT_TOKEN_VALIDITY_SECS),
        }
    }
}

impl std::fmt::Debug for ApiServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiServerConfig")
            .field("bind_addr", &self.bind_addr)
            .field("enable_cors", &self.enable_cors)
            .field("jwt_secret", &"<redacted>")
            .field("token_validity", &self.token_validity)
            .finish()
    }
}

/// API Server
pub struct ApiServer {
    config: ApiServerConfig,
    state: Arc<AppState>,
    gate: TokenGate,
}

impl ApiServer {
    /// Create a new API server around the given user store and password scheme.
    ///
    /// Fails when the signing secret is empty.
    pub fn new(
        config: ApiServerConfig,
        store: Arc<dyn UserStore>,
        passwords: Arc<dyn PasswordScheme>,
    ) -> Result<Self, anyhow::Error> {
        if config.jwt_secret.is_empty() {
            anyhow::bail!("JWT secret must not be empty");
        }

        let secret = config.jwt_secret.as_bytes();
        let signer = JwtSigner::new(secret).with_validity(config.token_validity);
        let gate = TokenGate::new(Arc::new(JwtValidator::new(secret)));

        let state = Arc::new(AppState {
            auth: AuthService::new(store, passwords, Arc::new(signer)),
        });

        Ok(Self {
            config,
            state,
            gate,
        })
    }

    /// Build the router with all routes
    pub fn build_router(&self) -> Router {
        // Build PUBLIC routes (no authentication required)
        let public_router = Router::new()
            .route("/api/health", get(handlers::health_check))
            .route("/api/auth/signup", put(handlers::signup))
            .route("/api/auth/login", post(handlers::login))
            .route(
                "/api/openapi.json",
                get(|| async { Json(ApiDoc::openapi()) }),
            )
            .with_state(self.state.clone());

        // Build PROTECTED routes (require a valid bearer token)
        let protected_router = Router::new()
            .route(
                "/api/auth/status",
                get(handlers::get_user_status).patch(handlers::update_user_status),
            )
            .with_state(self.state.clone())
            .layer(axum_middleware::from_fn_with_state(
                self.gate.clone(),
                middleware::require_auth,
            ));

        let mut router = public_router
            .merge(protected_router)
            .layer(TraceLayer::new_for_http());

        if self.config.enable_cors {
            let cors = CorsLayer::new()
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
                .allow_origin(tower_http::cors::AllowOrigin::predicate(
                    |origin: &HeaderValue, _| {
                        let origin_str = origin.to_str().unwrap_or("");
                        origin_str.starts_with("http://localhost:")
                            || origin_str.starts_with("http://127.0.0.1:")
                    },
                ));
            router = router.layer(cors);
        }

        router
    }

    /// Start the API server
    pub async fn start(self) -> Result<(), anyhow::Error> {
        let router = self.build_router();

        info!("Starting API server on {}", self.config.bind_addr);
        info!(
            "OpenAPI spec: http://{}/api/openapi.json",
            self.config.bind_addr
        );

        let listener = tokio::net::TcpListener::bind(self.config.bind_addr).await?;

        axum::serve(listener, router)
            .await
            .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

        Ok(())
    }
}
