use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public API Router Module
///
/// Defines the JSON endpoints that are **unauthenticated** and accessible to
/// any client: the catalog listing, account creation and login, and the
/// payment-intent gateway pass-through.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /api/health
        // A simple, unauthenticated endpoint used for monitoring and load
        // balancer checks.
        .route("/health", get(|| async { "ok" }))
        // GET /api/fishes
        // The whole catalog, newest-first. The storefront browse view.
        .route("/fishes", get(handlers::list_fishes))
        // POST /api/register
        // Account creation. Issues the same token shape as login.
        .route("/register", post(handlers::register))
        // POST /api/login
        // Credential verification with a single generic failure message.
        .route("/login", post(handlers::login))
        // POST /api/create-payment-intent
        // Creates a gateway-side order and returns its id for the client-side
        // checkout flow.
        .route(
            "/create-payment-intent",
            post(handlers::create_payment_intent),
        )
}
