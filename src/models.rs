use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Core Application Schemas (Mapped to Database) ---

/// Admin
///
/// A dashboard operator record from the `admins` table. Admins never travel over
/// the wire; the struct exists for credential lookup during session login.
#[derive(Debug, Clone, FromRow)]
pub struct Admin {
    pub id: Uuid,
    pub name: String,
    // Stored lowercase; the unique key for login.
    pub email: String,
    pub password_hash: String,
}

/// User
///
/// The canonical storefront account record from the `users` table. This is the
/// internal shape: it carries the password hash and must never be serialized
/// into a response. Handlers project it into [`AccountSummary`] or
/// [`UserProfile`] before returning anything.
#[derive(Debug, Clone, FromRow, Default)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub phone: String,
    pub address: String,
    // 'user' or 'admin'.
    pub role: String,
    // Toggled by the admin block/unblock actions. Note: nothing enforces this
    // flag on request paths; blocking is bookkeeping only.
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Fish
///
/// A catalog listing from the `fish` table. `photo` and `video` are public
/// paths under /uploads produced by the media store.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Fish {
    pub id: Uuid,
    pub name: String,
    pub photo: String,
    pub video: Option<String>,
    pub price: f64,

    /// Maps SQL column "type" to Rust field "fish_type".
    /// This renaming is necessary because `type` is a reserved keyword in Rust.
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub fish_type: String,

    #[ts(type = "string")]
    pub timestamp: DateTime<Utc>,
}

// --- Order Enums ---

/// Fulfilment state of an order. Deliberately a free-form enum mutation on the
/// admin side: any value may replace any other, including regressions.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, sqlx::Type, Default,
)]
#[sqlx(type_name = "order_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Lowercase wire name, matching the serde and database representations.
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, sqlx::Type, Default,
)]
#[sqlx(type_name = "payment_method", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum PaymentMethod {
    #[default]
    Cod,
    Razorpay,
    Upi,
    Card,
    Netbanking,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, sqlx::Type, Default,
)]
#[sqlx(type_name = "payment_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum PaymentStatus {
    #[default]
    Created,
    Paid,
    Failed,
    Cancelled,
}

/// ShippingAddress
///
/// The order's destination sub-record, stored as a JSONB document. Every field
/// is optional; clients may submit a partial or empty address.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ShippingAddress {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub pincode: Option<String>,
}

/// FishSummary
///
/// The live fish record resolved for an order item at read time. Distinct from
/// the snapshot fields on the item itself: this reflects the catalog *now*,
/// and is None when the fish has since been deleted.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct FishSummary {
    pub id: Uuid,
    pub name: String,
    pub photo: String,
    pub price: f64,
    #[serde(rename = "type")]
    pub fish_type: String,
}

/// OrderItem
///
/// One purchased line. name/photo/price are the point-in-time snapshot taken
/// at checkout; later catalog edits must not alter them.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct OrderItem {
    pub fish_id: Uuid,
    pub name: String,
    pub photo: String,
    pub price: f64,
    pub quantity: i32,
    /// Populated live fish record (None if deleted since purchase).
    pub fish: Option<FishSummary>,
}

/// Order
///
/// A complete order as returned to its owner. Assembled by the repository from
/// the `orders` row plus its `order_items`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub items: Vec<OrderItem>,
    pub total_amount: f64,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub shipping_address: ShippingAddress,
    pub razorpay_order_id: Option<String>,
    pub razorpay_payment_id: Option<String>,
    pub razorpay_signature: Option<String>,
    pub payment_status: PaymentStatus,
    pub order_number: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// OrderBuyer
///
/// The buyer projection joined into admin order views.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OrderBuyer {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

/// AdminOrder
///
/// An order enriched with its buyer for the admin dashboard. The buyer is None
/// only if the referenced user row has been removed out-of-band.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AdminOrder {
    #[serde(flatten)]
    pub order: Order,
    pub buyer: Option<OrderBuyer>,
}

// --- Request Payloads (Input Schemas) ---

/// Input payload for the public registration endpoint (POST /api/register).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: String,
    pub address: String,
}

impl RegisterRequest {
    /// Field validation mirroring the storage schema rules. Returns the first
    /// violated rule as a message suitable for the API error body.
    pub fn validate(&self) -> Result<(), String> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err("Name is required".to_string());
        }
        if name.len() > 100 {
            return Err("Name too long".to_string());
        }
        if !is_valid_email(self.email.trim()) {
            return Err("Invalid email".to_string());
        }
        if self.password.len() < 6 {
            return Err("Password too short".to_string());
        }
        let phone = self.phone.trim();
        if phone.len() != 10 || !phone.chars().all(|c| c.is_ascii_digit()) {
            return Err("Phone must be 10 digits".to_string());
        }
        let address = self.address.trim();
        if address.is_empty() {
            return Err("Address is required".to_string());
        }
        if address.len() > 500 {
            return Err("Address too long".to_string());
        }
        Ok(())
    }
}

/// Minimal structural email check: one '@', non-empty local part, and a dotted
/// domain with no whitespace.
pub fn is_valid_email(email: &str) -> bool {
    let mut parts = email.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    !local.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace)
}

/// Input payload for POST /api/login.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

fn default_quantity() -> i32 {
    1
}

/// One line of an incoming order: the fish reference plus the client-side
/// snapshot of what is being bought.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct OrderItemInput {
    pub fish_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub photo: String,
    pub price: f64,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

/// Input payload for POST /api/orders.
///
/// The three razorpay_* fields form the payment-gateway-confirmed variant:
/// when all are present, the signature is verified and the order is persisted
/// as already paid.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct PlaceOrderRequest {
    pub items: Vec<OrderItemInput>,
    pub total_amount: f64,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default)]
    pub shipping_address: Option<ShippingAddress>,
    #[serde(default)]
    pub order_number: Option<String>,
    #[serde(default)]
    pub razorpay_order_id: Option<String>,
    #[serde(default)]
    pub razorpay_payment_id: Option<String>,
    #[serde(default)]
    pub razorpay_signature: Option<String>,
}

/// Input payload for POST /api/create-payment-intent. Amount is in the
/// smallest currency unit (paise).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreatePaymentIntentRequest {
    pub amount: i64,
    #[serde(default)]
    pub name: Option<String>,
}

// --- Response Payloads (Output Schemas) ---

/// The sanitized account projection returned by register and login.
/// The password hash is excluded by construction.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct AccountSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

impl From<&User> for AccountSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            address: user.address.clone(),
        }
    }
}

/// Output schema for register/login: the signed bearer token plus the
/// sanitized account projection.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct AuthResponse {
    pub message: String,
    pub token: String,
    pub user: AccountSummary,
}

/// Output schema for GET /api/profile: the caller's own record with the hash
/// excluded and the derived order-id list attached.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub role: String,
    pub is_active: bool,
    pub orders: Vec<Uuid>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// Output schema for POST /api/orders.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct PlaceOrderResponse {
    pub message: String,
    pub order_id: Uuid,
    pub order_number: String,
}

/// Output schema for POST /api/create-payment-intent: everything the client
/// needs to launch the gateway's checkout flow.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct PaymentIntentResponse {
    pub order_id: String,
    pub amount: i64,
    pub currency: String,
    pub key_id: String,
}

// --- Repository Input Structs ---

/// A validated new catalog entry ready for insertion.
#[derive(Debug, Clone, Default)]
pub struct NewFish {
    pub name: String,
    pub photo: String,
    pub video: Option<String>,
    pub price: f64,
    pub fish_type: String,
}

/// Partial catalog update. photo/video replace the stored paths only when a
/// new file arrived in the request; None preserves the prior value.
#[derive(Debug, Clone, Default)]
pub struct FishUpdate {
    pub name: String,
    pub price: f64,
    pub fish_type: String,
    pub photo: Option<String>,
    pub video: Option<String>,
}

/// A validated new account ready for insertion (password already hashed).
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub phone: String,
    pub address: String,
}

/// A fully resolved order ready for transactional insertion.
#[derive(Debug, Clone, Default)]
pub struct NewOrder {
    pub user_id: Uuid,
    pub items: Vec<OrderItemInput>,
    pub total_amount: f64,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub shipping_address: ShippingAddress,
    pub order_number: String,
    pub razorpay_order_id: Option<String>,
    pub razorpay_payment_id: Option<String>,
    pub razorpay_signature: Option<String>,
    pub payment_status: PaymentStatus,
}

// --- Admin Form Input ---

/// Raw fields collected from the fish create/update multipart form. price is
/// kept as the submitted string so a parse failure can be reported as a
/// field-level error instead of a 422.
#[derive(Debug, Clone, Default)]
pub struct FishForm {
    pub name: String,
    pub price: String,
    pub fish_type: String,
    // Public /uploads paths, set only when a file part arrived this request.
    pub photo: Option<String>,
    pub video: Option<String>,
}

impl FishForm {
    /// Schema validation for the admin forms. On success returns the parsed
    /// price; on failure returns every violated rule as (field, message) for
    /// field-level rendering.
    pub fn validate(&self, photo_required: bool) -> Result<f64, Vec<(&'static str, String)>> {
        let mut errors: Vec<(&'static str, String)> = Vec::new();

        let name = self.name.trim();
        if name.is_empty() {
            errors.push(("name", "Name is required".to_string()));
        } else if name.len() > 500 {
            errors.push(("name", "Name cannot exceed 500 characters".to_string()));
        }

        let price = match self.price.trim().parse::<f64>() {
            Ok(p) if p >= 0.0 => Some(p),
            Ok(_) => {
                errors.push(("price", "Price cannot be negative".to_string()));
                None
            }
            Err(_) => {
                errors.push(("price", "Price is required".to_string()));
                None
            }
        };

        let fish_type = self.fish_type.trim();
        if fish_type.is_empty() {
            errors.push(("type", "Type is required".to_string()));
        } else if fish_type.len() > 100 {
            errors.push(("type", "Type cannot exceed 100 characters".to_string()));
        }

        if photo_required && self.photo.is_none() {
            errors.push(("photo", "Photo is required".to_string()));
        }
        if let Some(video) = &self.video {
            if video.len() > 1000 {
                errors.push(("video", "Video URL cannot exceed 1000 characters".to_string()));
            }
        }

        match (errors.is_empty(), price) {
            (true, Some(p)) => Ok(p),
            _ => Err(errors),
        }
    }
}
