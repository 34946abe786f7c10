use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{HeaderMap, header, request::Parts},
    response::Redirect,
};
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use hmac::{Hmac, Mac};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use uuid::Uuid;

use crate::{config::AppConfig, error::ApiError, repository::RepositoryState};

type HmacSha256 = Hmac<Sha256>;

// --- Password Hashing ---

/// Hashes a plain-text password with Argon2 into a PHC string.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    use argon2::password_hash::SaltString;
    use argon2::password_hash::rand_core::OsRng;
    use argon2::{Argon2, PasswordHasher};
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verifies a candidate password against a stored PHC hash. An unparseable
/// stored hash verifies as false rather than erroring: the caller always
/// reports the same generic credential failure.
pub fn verify_password(password: &str, hash: &str) -> bool {
    use argon2::{Argon2, PasswordHash, PasswordVerifier};
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

// --- API Bearer Tokens ---

/// Bearer tokens are valid for a fixed seven days from issue.
pub const TOKEN_EXPIRY_DAYS: i64 = 7;

/// Claims
///
/// The payload signed into every API bearer token. Validated on each
/// authenticated request.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user's UUID.
    pub sub: Uuid,
    /// Expiration time (Unix timestamp seconds).
    pub exp: usize,
    /// Issued at (Unix timestamp seconds).
    pub iat: usize,
}

/// Signs a bearer token scoped to the given user id.
pub fn issue_token(user_id: Uuid, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id,
        exp: (now + Duration::days(TOKEN_EXPIRY_DAYS)).timestamp() as usize,
        iat: now.timestamp() as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// AuthUser
///
/// The resolved identity of an authenticated API request, produced by the
/// extractor below and consumed by every token-guarded handler.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
}

/// AuthUser Extractor Implementation
///
/// Implements Axum's FromRequestParts trait, making AuthUser usable as a
/// function argument in any token-guarded handler and keeping authentication
/// out of the business logic.
///
/// The process:
/// 1. Extract the `Authorization: Bearer` token (absence is "No token").
/// 2. Decode and validate signature + expiry against the configured secret.
/// 3. Confirm the subject still resolves to a stored account, so tokens for
///    deleted users stop working. is_active is intentionally not consulted:
///    blocking a user has no enforced effect on API access.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let repo = RepositoryState::from_ref(state);
        let config = AppConfig::from_ref(state);

        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(ApiError::MissingToken)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(ApiError::MissingToken)?;

        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());
        let mut validation = Validation::default();
        validation.validate_exp = true;

        let token_data = decode::<Claims>(token, &decoding_key, &validation).map_err(|e| {
            tracing::debug!(error = ?e, "bearer token rejected");
            ApiError::InvalidToken
        })?;

        let user = repo
            .get_user(token_data.claims.sub)
            .await
            .ok_or(ApiError::InvalidToken)?;

        Ok(AuthUser { id: user.id })
    }
}

// --- Admin Sessions ---

/// Name of the signed admin session cookie.
pub const SESSION_COOKIE: &str = "aqua_session";

/// Admin sessions expire 24 hours after login.
pub const SESSION_TTL_HOURS: i64 = 24;

/// SessionStore
///
/// The process-wide store of active admin sessions: opaque session id to issue
/// time. Initialized once at startup and shared through the application state;
/// sessions do not survive a restart.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<DashMap<String, DateTime<Utc>>>,
}

impl SessionStore {
    /// Registers a fresh session and returns its opaque id.
    pub fn create(&self) -> String {
        let id = Uuid::new_v4().to_string();
        self.sessions.insert(id.clone(), Utc::now());
        id
    }

    /// True if the id names a live, unexpired session. Expired entries are
    /// dropped on the way out.
    pub fn validate(&self, id: &str) -> bool {
        let Some(issued_at) = self.sessions.get(id).map(|entry| *entry.value()) else {
            return false;
        };
        if Utc::now() - issued_at > Duration::hours(SESSION_TTL_HOURS) {
            self.sessions.remove(id);
            return false;
        }
        true
    }

    /// Drops a session. Destroying an unknown id is a no-op: logout never
    /// fails.
    pub fn destroy(&self, id: &str) {
        self.sessions.remove(id);
    }
}

/// Signs a session id into the cookie value `<id>.<hmac-hex>`.
pub fn sign_session_id(id: &str, secret: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(id.as_bytes());
    format!("{}.{}", id, hex::encode(mac.finalize().into_bytes()))
}

/// Splits and verifies a signed cookie value, returning the session id only
/// when the signature checks out (constant-time comparison).
pub fn verify_session_cookie(value: &str, secret: &str) -> Option<String> {
    let (id, signature) = value.rsplit_once('.')?;
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(id.as_bytes());
    let sig_bytes = hex::decode(signature).ok()?;
    mac.verify_slice(&sig_bytes).ok()?;
    Some(id.to_string())
}

/// Pulls the verified session id out of a request's Cookie header, if any.
pub fn session_from_headers(headers: &HeaderMap, secret: &str) -> Option<String> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    cookies.split(';').map(str::trim).find_map(|cookie| {
        let value = cookie.strip_prefix(SESSION_COOKIE)?.strip_prefix('=')?;
        verify_session_cookie(value, secret)
    })
}

/// Builds the Set-Cookie value establishing an admin session.
pub fn session_cookie(signed_value: &str) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE,
        signed_value,
        SESSION_TTL_HOURS * 3600
    )
}

/// Builds the Set-Cookie value clearing the admin session cookie.
pub fn clear_session_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
}

/// AdminSession
///
/// Marker for a request carrying a live admin session. Used both as the guard
/// middleware's extractor and (rarely) directly by handlers that need the id.
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub session_id: String,
}

/// AdminSession Extractor Implementation
///
/// The dashboard is an HTML surface: a request without a valid session is
/// redirected to the login entry point, never answered with a 401/403 JSON
/// error.
impl<S> FromRequestParts<S> for AdminSession
where
    S: Send + Sync,
    SessionStore: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let sessions = SessionStore::from_ref(state);
        let config = AppConfig::from_ref(state);

        let session_id = session_from_headers(&parts.headers, &config.session_secret)
            .filter(|id| sessions.validate(id))
            .ok_or_else(|| Redirect::to("/"))?;

        Ok(AdminSession { session_id })
    }
}
