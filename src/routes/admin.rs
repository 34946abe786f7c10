use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Admin Router Module
///
/// The server-rendered dashboard. Split in two:
/// * [`login_routes`] - the unguarded entry points (login form, login submit,
///   logout).
/// * [`admin_routes`] - everything else, which must be wrapped in the
///   `AdminSession` guard layer. A request without a live session is
///   redirected to `/`, never answered with a 401/403 JSON error: this
///   surface is HTML, not API.
pub fn login_routes() -> Router<AppState> {
    Router::new()
        // GET / renders the login form; POST / performs the credential check
        // and establishes the session cookie.
        .route("/", get(handlers::login_form).post(handlers::login_submit))
        // GET /logout invalidates the session state and clears the cookie
        // unconditionally.
        .route("/logout", get(handlers::logout))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET /home
        // The dashboard: searchable fish listing plus the pending-order count.
        .route("/home", get(handlers::home))
        // --- Fish Catalog CRUD ---
        // GET renders the creation form, POST accepts the multipart
        // submission (photo required, video optional).
        .route(
            "/create_fish",
            get(handlers::create_fish_form).post(handlers::create_fish),
        )
        // GET /retrieve_fish
        // The full catalog listing, newest-first.
        .route("/retrieve_fish", get(handlers::retrieve_fish))
        // GET renders the edit form (404 if absent); POST merges scalar
        // fields, replacing media paths only when a new file arrived.
        .route(
            "/update_fish/{id}",
            get(handlers::update_fish_form).post(handlers::update_fish),
        )
        // GET renders the confirmation page; POST performs the deletion.
        .route(
            "/delete_fish/{id}",
            get(handlers::delete_fish_form).post(handlers::delete_fish),
        )
        // --- User Management ---
        // GET /userlist?page=&search=
        // Paged listing with case-insensitive name filter.
        .route("/userlist", get(handlers::user_list))
        // Block/unblock toggle is_active. Best-effort: errors are logged and
        // swallowed, the redirect back to the list always happens.
        .route("/user/block/{id}", get(handlers::block_user))
        .route("/user/unblock/{id}", get(handlers::unblock_user))
        // --- Order Management ---
        // GET /orders
        // All orders with buyer and fish joined in, plus derived aggregates.
        .route("/orders", get(handlers::admin_orders))
        // GET /orders/{id}
        // Single joined order detail view.
        .route("/orders/{id}", get(handlers::admin_order_detail))
        // POST /orders/{id}/status
        // Free-form status mutation; returns the updated joined record as
        // JSON for the dashboard script.
        .route("/orders/{id}/status", post(handlers::update_order_status))
}
