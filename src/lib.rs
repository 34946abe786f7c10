use axum::{
    Router,
    extract::{DefaultBodyLimit, FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Core application services and components.
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod payments;
pub mod repository;
pub mod storage;
pub mod views;

// Module for routing segregation (Public API, Authenticated API, Admin HTML).
pub mod routes;
use auth::{AdminSession, AuthUser, SessionStore};
use routes::{admin, authenticated, public};

// --- Public Re-exports ---

// Makes core state types easily accessible to the main application entry point (main.rs).
pub use config::AppConfig;
pub use payments::{MockPaymentGateway, PaymentState, RazorpayClient};
pub use repository::{PostgresRepository, RepositoryState};
pub use storage::{LocalDiskStore, MediaState, MockMediaStore};

/// Multipart bodies (fish photo/video uploads) are capped at 10 MiB.
const UPLOAD_BODY_LIMIT: usize = 10 * 1024 * 1024;

/// ApiDoc
///
/// Auto-generates the OpenAPI documentation (Swagger JSON) for the JSON API
/// surface. The admin HTML routes are deliberately not documented here: they
/// are a browser surface, not an API contract. The resulting JSON is served
/// at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::list_fishes, handlers::register, handlers::login, handlers::profile,
        handlers::place_order, handlers::my_orders, handlers::create_payment_intent
    ),
    components(
        schemas(
            models::Fish, models::RegisterRequest, models::LoginRequest, models::AuthResponse,
            models::AccountSummary, models::UserProfile, models::Order, models::OrderItem,
            models::FishSummary, models::ShippingAddress, models::OrderStatus,
            models::PaymentMethod, models::PaymentStatus, models::PlaceOrderRequest,
            models::OrderItemInput, models::PlaceOrderResponse,
            models::CreatePaymentIntentRequest, models::PaymentIntentResponse,
        )
    ),
    tags(
        (name = "aquastore", description = "Aquarium storefront API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single, thread-safe, immutable container holding all essential
/// application services and configuration, shared across all incoming
/// requests.
#[derive(Clone)]
pub struct AppState {
    /// Repository Layer: Abstracts database access via the PgPool connection.
    pub repo: RepositoryState,
    /// Media Layer: Abstracts upload persistence (local disk in production).
    pub media: MediaState,
    /// Payment Layer: Abstracts the external gateway's order-create and
    /// signature-verification calls.
    pub payments: PaymentState,
    /// The process-wide admin session store.
    pub sessions: SessionStore,
    /// Configuration: The loaded, immutable environment configuration.
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

// These implementations allow extractors to selectively pull components from
// the shared AppState, keeping authentication out of handler bodies.

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for MediaState {
    fn from_ref(app_state: &AppState) -> MediaState {
        app_state.media.clone()
    }
}

impl FromRef<AppState> for PaymentState {
    fn from_ref(app_state: &AppState) -> PaymentState {
        app_state.payments.clone()
    }
}

impl FromRef<AppState> for SessionStore {
    fn from_ref(app_state: &AppState) -> SessionStore {
        app_state.sessions.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// auth_middleware
///
/// Enforces bearer-token authentication for the authenticated API routes.
///
/// *Mechanism*: Attempts to extract `AuthUser` from the request. Since
/// `AuthUser` implements `FromRequestParts`, if authentication (JWT
/// validation, account lookup) fails, the extractor immediately rejects the
/// request with a 401 JSON error, preventing execution of the handler.
async fn auth_middleware(_auth_user: AuthUser, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// admin_guard
///
/// Enforces the admin session on every dashboard route. A request without a
/// live session is redirected to the login entry point - this surface never
/// answers with a 401/403 JSON error.
async fn admin_guard(_session: AdminSession, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles the application's entire routing structure, applies global and
/// scoped middleware, and registers the application state.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name constant for Request Correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. The JSON API: public routes plus the token-guarded group, mounted
    // under /api.
    let api = public::public_routes().merge(
        authenticated::authenticated_routes().route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        )),
    );

    // 3. Base Router Assembly
    let base_router = Router::new()
        // Documentation: Serve the auto-generated Swagger UI.
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/api", api)
        // Admin HTML surface: unguarded login entry points...
        .merge(admin::login_routes())
        // ...and the session-guarded dashboard, with the upload body cap for
        // the multipart fish forms.
        .merge(
            admin::admin_routes()
                .route_layer(middleware::from_fn_with_state(state.clone(), admin_guard))
                .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        // Uploaded media is served statically from the configured directory.
        .nest_service("/uploads", ServeDir::new(&state.config.upload_dir))
        // Apply the Unified State to all routes.
        .with_state(state);

    // 4. Observability and Correlation Layers (Applied outermost/first)
    base_router
        .layer(
            ServiceBuilder::new()
                // 4a. Request ID Generation: a unique UUID for every request.
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // 4b. Request Tracing: wraps the request/response lifecycle in
                // a span carrying the generated request id.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // 4c. Request ID Propagation back to the client.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        // 5. CORS Layer
        .layer(cors)
}

/// trace_span_logger
///
/// Helper used by `TraceLayer` to customize span creation: includes the
/// `x-request-id` header (if present) alongside the HTTP method and URI so
/// every log line for a request is correlated by a unique id.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
