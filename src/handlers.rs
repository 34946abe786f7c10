use crate::{
    AppState, auth,
    auth::AuthUser,
    error::ApiError,
    models::{
        AccountSummary, AuthResponse, CreatePaymentIntentRequest, Fish, FishForm,
        FishUpdate, LoginRequest, NewFish, NewOrder, NewUser, Order, OrderStatus,
        PaymentIntentResponse, PaymentStatus, PlaceOrderRequest, PlaceOrderResponse,
        RegisterRequest, UserProfile,
    },
    storage::is_allowed_media,
    views,
};
use axum::{
    Form, Json,
    extract::{Multipart, Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

// --- Form / Filter Structs ---

/// Credentials submitted by the admin login form.
#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Dashboard search box.
#[derive(Deserialize)]
pub struct SearchQuery {
    pub search: Option<String>,
}

/// User list pagination + search.
#[derive(Deserialize)]
pub struct UserListQuery {
    pub page: Option<i64>,
    pub search: Option<String>,
}

/// Status submitted by the order detail form.
#[derive(Deserialize)]
pub struct StatusForm {
    pub status: OrderStatus,
}

/// Page size for the admin user list.
const USERS_PER_PAGE: i64 = 10;

/// Row cap for the dashboard fish listing.
const DASHBOARD_FISH_LIMIT: i64 = 20;

// =====================================================================
// Admin HTML surface (session-guarded, redirects instead of JSON errors)
// =====================================================================

/// [Admin] GET / - the login entry point.
pub async fn login_form() -> Html<String> {
    Html(views::login_page(None))
}

/// [Admin] POST / - session login.
///
/// Both the unknown-email and wrong-password paths render the same generic
/// message, so the form leaks nothing about which half was wrong.
pub async fn login_submit(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Response {
    let email = form.email.trim().to_lowercase();

    let verified = match state.repo.find_admin_by_email(&email).await {
        Some(admin) => auth::verify_password(&form.password, &admin.password_hash),
        None => false,
    };

    if !verified {
        return Html(views::login_page(Some("Invalid email or password"))).into_response();
    }

    let session_id = state.sessions.create();
    let cookie = auth::session_cookie(&auth::sign_session_id(
        &session_id,
        &state.config.session_secret,
    ));
    tracing::info!("admin session established");

    ([(header::SET_COOKIE, cookie)], Redirect::to("/home")).into_response()
}

/// [Admin] GET /logout - destroys the session state and clears the cookie
/// unconditionally. Destruction failures (unknown id) are ignored; the
/// redirect always happens.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(session_id) = auth::session_from_headers(&headers, &state.config.session_secret) {
        state.sessions.destroy(&session_id);
    }
    (
        [(header::SET_COOKIE, auth::clear_session_cookie())],
        Redirect::to("/"),
    )
        .into_response()
}

/// [Admin] GET /home - dashboard with searchable fish listing (bounded page)
/// and the pending-order count.
pub async fn home(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Html<String> {
    let search = query.search.unwrap_or_default();
    let filter = (!search.is_empty()).then(|| search.clone());
    let fishes = state.repo.list_fish(filter, Some(DASHBOARD_FISH_LIMIT)).await;
    let pending = state.repo.count_pending_orders().await;
    Html(views::dashboard_page(&fishes, &search, pending))
}

/// Drains a fish create/update multipart submission: text fields are
/// collected, file parts are content-type checked and written through the
/// media store as they stream in. There is no cleanup of already-written
/// files if a later part fails.
async fn collect_fish_form(
    state: &AppState,
    multipart: &mut Multipart,
) -> Result<FishForm, String> {
    let mut form = FishForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| format!("Invalid multipart request: {}", e))?
    {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "name" => form.name = field.text().await.map_err(|e| e.to_string())?,
            "price" => form.price = field.text().await.map_err(|e| e.to_string())?,
            "type" => form.fish_type = field.text().await.map_err(|e| e.to_string())?,
            "photo" | "video" => {
                let original = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().unwrap_or_default().to_string();
                let data = field.bytes().await.map_err(|e| e.to_string())?;
                // Browsers submit the file input even when nothing was chosen.
                if original.is_empty() && data.is_empty() {
                    continue;
                }
                if !is_allowed_media(&content_type) {
                    return Err("Only images and videos allowed!".to_string());
                }
                let path = state.media.save(&original, &data).await?;
                if field_name == "photo" {
                    form.photo = Some(path);
                } else {
                    form.video = Some(path);
                }
            }
            _ => {}
        }
    }

    Ok(form)
}

/// [Admin] GET /create_fish - the creation form.
pub async fn create_fish_form() -> Html<String> {
    Html(views::fish_create_page(&FishForm::default(), &[]))
}

/// [Admin] POST /create_fish - validates, persists, redirects to /home.
/// Validation failure re-renders the form with field-level messages and
/// persists nothing.
pub async fn create_fish(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let form = match collect_fish_form(&state, &mut multipart).await {
        Ok(form) => form,
        Err(message) => {
            return Html(views::fish_create_page(
                &FishForm::default(),
                &[("upload", message)],
            ))
            .into_response();
        }
    };

    let price = match form.validate(true) {
        Ok(price) => price,
        Err(errors) => {
            return Html(views::fish_create_page(&form, &errors)).into_response();
        }
    };

    let new_fish = NewFish {
        name: form.name.trim().to_string(),
        // validate(true) guarantees the photo is present.
        photo: form.photo.clone().unwrap_or_default(),
        video: form.video.clone(),
        price,
        fish_type: form.fish_type.trim().to_string(),
    };

    match state.repo.create_fish(new_fish).await {
        Ok(_) => Redirect::to("/home").into_response(),
        Err(e) => {
            tracing::error!("create_fish error: {:?}", e);
            Html(views::fish_create_page(
                &form,
                &[("error", "Could not save fish".to_string())],
            ))
            .into_response()
        }
    }
}

/// [Admin] GET /retrieve_fish - the full catalog, newest-first.
pub async fn retrieve_fish(State(state): State<AppState>) -> Html<String> {
    let fishes = state.repo.list_fish(None, None).await;
    Html(views::retrieve_page(&fishes))
}

/// [Admin] GET /update_fish/{id} - the edit form, 404 if absent.
pub async fn update_fish_form(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Response {
    match state.repo.get_fish(id).await {
        Some(fish) => Html(views::fish_update_page(&fish, &[])).into_response(),
        None => (StatusCode::NOT_FOUND, "Fish not found").into_response(),
    }
}

/// [Admin] POST /update_fish/{id} - merges changed scalar fields; the stored
/// photo/video paths are replaced only when this request carried a new file.
pub async fn update_fish(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Response {
    let form = match collect_fish_form(&state, &mut multipart).await {
        Ok(form) => form,
        Err(message) => {
            return match state.repo.get_fish(id).await {
                Some(fish) => {
                    Html(views::fish_update_page(&fish, &[("upload", message)])).into_response()
                }
                None => (StatusCode::NOT_FOUND, "Fish not found").into_response(),
            };
        }
    };

    let price = match form.validate(false) {
        Ok(price) => price,
        Err(errors) => {
            return match state.repo.get_fish(id).await {
                Some(fish) => Html(views::fish_update_page(&fish, &errors)).into_response(),
                None => (StatusCode::NOT_FOUND, "Fish not found").into_response(),
            };
        }
    };

    let update = FishUpdate {
        name: form.name.trim().to_string(),
        price,
        fish_type: form.fish_type.trim().to_string(),
        photo: form.photo.clone(),
        video: form.video.clone(),
    };

    match state.repo.update_fish(id, update).await {
        Some(_) => Redirect::to("/home").into_response(),
        None => (StatusCode::NOT_FOUND, "Fish not found").into_response(),
    }
}

/// [Admin] GET /delete_fish/{id} - the confirmation page, 404 if absent.
pub async fn delete_fish_form(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Response {
    match state.repo.get_fish(id).await {
        Some(fish) => Html(views::fish_delete_page(&fish)).into_response(),
        None => (StatusCode::NOT_FOUND, "Fish not found").into_response(),
    }
}

/// [Admin] POST /delete_fish/{id} - deletes and returns to the dashboard.
pub async fn delete_fish(State(state): State<AppState>, Path(id): Path<Uuid>) -> Redirect {
    state.repo.delete_fish(id).await;
    Redirect::to("/home")
}

/// [Admin] GET /userlist - paged user listing with name search.
pub async fn user_list(
    State(state): State<AppState>,
    Query(query): Query<UserListQuery>,
) -> Html<String> {
    let page = query.page.unwrap_or(1).max(1);
    let search = query.search.unwrap_or_default();
    let filter = (!search.is_empty()).then(|| search.clone());

    let (users, total) = state.repo.list_users(page, USERS_PER_PAGE, filter).await;
    let total_pages = (total + USERS_PER_PAGE - 1) / USERS_PER_PAGE;

    Html(views::user_list_page(&users, page, total_pages, total, &search))
}

/// [Admin] GET /user/block/{id} - best-effort: failures are logged and
/// swallowed, the redirect back to the list happens regardless.
pub async fn block_user(State(state): State<AppState>, Path(id): Path<Uuid>) -> Redirect {
    if !state.repo.set_user_active(id, false).await {
        tracing::warn!(user_id = %id, "block_user had no effect");
    }
    Redirect::to("/userlist")
}

/// [Admin] GET /user/unblock/{id} - best-effort, mirrors block_user.
pub async fn unblock_user(State(state): State<AppState>, Path(id): Path<Uuid>) -> Redirect {
    if !state.repo.set_user_active(id, true).await {
        tracing::warn!(user_id = %id, "unblock_user had no effect");
    }
    Redirect::to("/userlist")
}

/// [Admin] GET /orders - all orders with buyer and fish joined in. Revenue
/// and pending count are derived at response time, never stored.
pub async fn admin_orders(State(state): State<AppState>) -> Html<String> {
    let orders = state.repo.list_orders().await;
    let total_revenue: f64 = orders.iter().map(|o| o.order.total_amount).sum();
    let pending_count = orders
        .iter()
        .filter(|o| o.order.status == OrderStatus::Pending)
        .count();
    Html(views::orders_page(&orders, total_revenue, pending_count))
}

/// [Admin] GET /orders/{id} - single joined order, 404 text if absent.
pub async fn admin_order_detail(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Response {
    match state.repo.get_order(id).await {
        Some(order) => Html(views::order_detail_page(&order)).into_response(),
        None => (StatusCode::NOT_FOUND, "Order not found").into_response(),
    }
}

/// [Admin] POST /orders/{id}/status - persists any status value with a
/// refreshed update timestamp and answers with the joined record. There is no
/// transition validation: "delivered" may go straight back to "pending".
pub async fn update_order_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Form(form): Form<StatusForm>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    match state.repo.update_order_status(id, form.status).await {
        Some(order) => {
            tracing::info!(order_id = %id, status = form.status.as_str(), "order status updated");
            Ok(Json(serde_json::json!({
                "message": format!("Order updated to {}", form.status.as_str()),
                "order": order,
            })))
        }
        None => Err(StatusCode::NOT_FOUND),
    }
}

// =====================================================================
// Public JSON API surface
// =====================================================================

/// [Public Route] Lists the entire catalog, newest-first, unfiltered. No auth
/// required.
#[utoipa::path(
    get,
    path = "/api/fishes",
    responses((status = 200, description = "All fish listings", body = [Fish]))
)]
pub async fn list_fishes(State(state): State<AppState>) -> Json<Vec<Fish>> {
    let fishes = state.repo.list_fish(None, None).await;
    Json(fishes)
}

/// [Public Route] Account registration: validates, rejects duplicate emails
/// case-insensitively, hashes the password, and issues a 7-day bearer token.
/// The response carries the sanitized projection - never the hash.
#[utoipa::path(
    post,
    path = "/api/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Account created", body = AuthResponse),
        (status = 400, description = "Validation failure or duplicate email")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    payload.validate().map_err(ApiError::Validation)?;

    let email = payload.email.trim().to_lowercase();
    if state.repo.find_user_by_email(&email).await.is_some() {
        return Err(ApiError::Validation("Email already registered".to_string()));
    }

    let password_hash = auth::hash_password(&payload.password).map_err(|e| {
        tracing::error!("password hash error: {:?}", e);
        ApiError::Internal
    })?;

    let user = state
        .repo
        .create_user(NewUser {
            name: payload.name.trim().to_string(),
            email,
            password_hash,
            phone: payload.phone.trim().to_string(),
            address: payload.address.trim().to_string(),
        })
        .await?;

    let token = auth::issue_token(user.id, &state.config.jwt_secret).map_err(|e| {
        tracing::error!("token issue error: {:?}", e);
        ApiError::Internal
    })?;

    tracing::info!(user_id = %user.id, "user registered");

    Ok(Json(AuthResponse {
        message: "User created successfully".to_string(),
        token,
        user: AccountSummary::from(&user),
    }))
}

/// [Public Route] Login. Lookup failure and verification failure collapse
/// into one generic error so account existence cannot be probed.
#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = AuthResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let email = payload.email.trim().to_lowercase();

    let user = state
        .repo
        .find_user_by_email(&email)
        .await
        .ok_or(ApiError::InvalidCredentials)?;

    if !auth::verify_password(&payload.password, &user.password_hash) {
        return Err(ApiError::InvalidCredentials);
    }

    let token = auth::issue_token(user.id, &state.config.jwt_secret).map_err(|e| {
        tracing::error!("token issue error: {:?}", e);
        ApiError::Internal
    })?;

    Ok(Json(AuthResponse {
        message: "Login successful".to_string(),
        token,
        user: AccountSummary::from(&user),
    }))
}

/// [Authenticated Route] The caller's own record, hash excluded, with the
/// derived order-id list attached.
#[utoipa::path(
    get,
    path = "/api/profile",
    responses(
        (status = 200, description = "Profile", body = UserProfile),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn profile(
    AuthUser { id }: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<UserProfile>, ApiError> {
    let user = state.repo.get_user(id).await.ok_or(ApiError::NotFound("User"))?;
    let orders = state.repo.user_order_ids(id).await;

    Ok(Json(UserProfile {
        id: user.id,
        name: user.name,
        email: user.email,
        phone: user.phone,
        address: user.address,
        role: user.role,
        is_active: user.is_active,
        orders,
        created_at: user.created_at,
    }))
}

/// Generates the fallback order number: "AQU-" plus the last six digits of
/// the current millisecond timestamp.
fn generate_order_number() -> String {
    let millis = Utc::now().timestamp_millis().to_string();
    let suffix = &millis[millis.len().saturating_sub(6)..];
    format!("AQU-{suffix}")
}

/// [Authenticated Route] Order placement.
///
/// The plain variant persists status=pending / payment_status=created. When
/// the body carries all three gateway confirmation fields, the signature is
/// verified first and the order lands as confirmed + paid; a bad signature
/// persists nothing.
#[utoipa::path(
    post,
    path = "/api/orders",
    request_body = PlaceOrderRequest,
    responses(
        (status = 200, description = "Order placed", body = PlaceOrderResponse),
        (status = 400, description = "Validation or signature failure"),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn place_order(
    AuthUser { id: user_id }: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<PlaceOrderRequest>,
) -> Result<Json<PlaceOrderResponse>, ApiError> {
    if payload.items.is_empty() {
        return Err(ApiError::Validation(
            "Order must contain at least one item".to_string(),
        ));
    }
    if payload.total_amount < 0.0 {
        return Err(ApiError::Validation(
            "Total amount cannot be negative".to_string(),
        ));
    }
    for item in &payload.items {
        if item.quantity < 1 {
            return Err(ApiError::Validation(
                "Item quantity must be at least 1".to_string(),
            ));
        }
        if item.price < 0.0 {
            return Err(ApiError::Validation(
                "Item price cannot be negative".to_string(),
            ));
        }
        // Referential integrity is application-level: the fish must exist at
        // creation time; the snapshot then stands on its own.
        if !state.repo.fish_exists(item.fish_id).await {
            return Err(ApiError::Validation(
                "Order references a fish that does not exist".to_string(),
            ));
        }
    }

    // Payment-gateway-confirmed variant: verify the signed confirmation
    // BEFORE anything is persisted.
    let gateway = (
        payload.razorpay_order_id.as_deref(),
        payload.razorpay_payment_id.as_deref(),
        payload.razorpay_signature.as_deref(),
    );
    let (status, payment_status) = match gateway {
        (Some(order_id), Some(payment_id), Some(signature)) => {
            if !state.payments.verify_payment(order_id, payment_id, signature) {
                tracing::warn!(user_id = %user_id, "payment signature verification failed");
                return Err(ApiError::Validation(
                    "Payment signature verification failed".to_string(),
                ));
            }
            (OrderStatus::Confirmed, PaymentStatus::Paid)
        }
        (None, None, None) => (OrderStatus::Pending, PaymentStatus::Created),
        _ => {
            return Err(ApiError::Validation(
                "Incomplete payment confirmation".to_string(),
            ));
        }
    };

    let order_number = payload
        .order_number
        .clone()
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(generate_order_number);

    let order = state
        .repo
        .create_order(NewOrder {
            user_id,
            items: payload.items.clone(),
            total_amount: payload.total_amount,
            status,
            payment_method: payload.payment_method.unwrap_or_default(),
            shipping_address: payload.shipping_address.clone().unwrap_or_default(),
            order_number,
            razorpay_order_id: payload.razorpay_order_id.clone(),
            razorpay_payment_id: payload.razorpay_payment_id.clone(),
            razorpay_signature: payload.razorpay_signature.clone(),
            payment_status,
        })
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                ApiError::Validation("Order number already in use".to_string())
            }
            _ => ApiError::from(e),
        })?;

    tracing::info!(order_id = %order.id, order_number = %order.order_number, "order placed");

    Ok(Json(PlaceOrderResponse {
        message: "Order placed successfully!".to_string(),
        order_id: order.id,
        order_number: order.order_number,
    }))
}

/// [Authenticated Route] Only the caller's own orders, newest-first, items
/// populated with the live fish records. The query is always scoped to the
/// token-derived identifier, so no further ownership check is needed.
#[utoipa::path(
    get,
    path = "/api/orders",
    responses(
        (status = 200, description = "The caller's orders", body = [Order]),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn my_orders(
    AuthUser { id }: AuthUser,
    State(state): State<AppState>,
) -> Json<Vec<Order>> {
    let orders = state.repo.get_orders_for_user(id).await;
    Json(orders)
}

/// [Public Route] Creates a gateway-side order for the client's checkout
/// flow. The amount is in the smallest currency unit.
#[utoipa::path(
    post,
    path = "/api/create-payment-intent",
    request_body = CreatePaymentIntentRequest,
    responses(
        (status = 200, description = "Gateway order created", body = PaymentIntentResponse),
        (status = 400, description = "Invalid amount"),
        (status = 500, description = "Gateway failure")
    )
)]
pub async fn create_payment_intent(
    State(state): State<AppState>,
    Json(payload): Json<CreatePaymentIntentRequest>,
) -> Result<Json<PaymentIntentResponse>, ApiError> {
    if payload.amount <= 0 {
        return Err(ApiError::Validation("Amount must be positive".to_string()));
    }

    let receipt = payload
        .name
        .clone()
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| "aquastore".to_string());

    let gateway_order = state
        .payments
        .create_order(payload.amount, &receipt)
        .await
        .map_err(|e| {
            tracing::error!("gateway order creation failed: {}", e);
            ApiError::Internal
        })?;

    Ok(Json(PaymentIntentResponse {
        order_id: gateway_order.id,
        amount: gateway_order.amount,
        currency: gateway_order.currency,
        key_id: state.payments.key_id().to_string(),
    }))
}
