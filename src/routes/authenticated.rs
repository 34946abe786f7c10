use crate::{AppState, handlers};
use axum::{
    Router,
    routing::get,
};

/// Authenticated API Router Module
///
/// Defines the JSON routes requiring a valid bearer token. Every handler here
/// relies on the `AuthUser` extractor middleware applied one layer above this
/// module, which guarantees the resolved user id reaching the handlers.
///
/// Ownership strategy: order queries are always scoped to the token-derived
/// identifier, so no separate ownership checks exist on these routes.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /api/profile
        // The caller's own record, password hash excluded.
        .route("/profile", get(handlers::profile))
        // POST /api/orders - place an order (plain or gateway-confirmed).
        // GET  /api/orders - the caller's own orders, newest-first.
        .route(
            "/orders",
            get(handlers::my_orders).post(handlers::place_order),
        )
}
