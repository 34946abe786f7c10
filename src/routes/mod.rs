/// Router Module Index
///
/// Organizes the application's routing logic into security-segregated modules.
/// Access control is applied explicitly at the module level (via Axum layers),
/// preventing accidental exposure of protected endpoints.

/// JSON API routes accessible to any client (catalog, registration, login,
/// payment-intent creation).
pub mod public;

/// JSON API routes protected by the bearer-token extractor middleware.
pub mod authenticated;

/// The admin HTML surface: the unguarded login entry points plus the
/// session-guarded dashboard routes.
pub mod admin;
