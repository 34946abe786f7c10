//! Payment gateway integration via REST API (no SDK dependency).

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::sync::Arc;

const RAZORPAY_API_BASE: &str = "https://api.razorpay.com/v1";

/// GatewayOrder
///
/// The gateway-side order record created ahead of a client payment. Its id is
/// handed back to the client to complete the checkout flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayOrder {
    pub id: String,
    pub amount: i64,
    pub currency: String,
}

/// PaymentGateway
///
/// Defines the abstract contract for the external payment provider: creating
/// gateway orders and verifying its signed payment confirmations. The trait
/// object keeps handlers testable without network access.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Creates a gateway-side order for the given amount (smallest currency
    /// unit) tagged with a receipt label.
    async fn create_order(&self, amount: i64, receipt: &str) -> Result<GatewayOrder, String>;

    /// Verifies the gateway's signed confirmation for a completed payment.
    /// An order may only be persisted as paid after this returns true.
    fn verify_payment(&self, order_id: &str, payment_id: &str, signature: &str) -> bool;

    /// The public half of the key pair, exposed to clients for their checkout
    /// widget.
    fn key_id(&self) -> &str;
}

/// PaymentState
///
/// The concrete type used to share the gateway client across the application state.
pub type PaymentState = Arc<dyn PaymentGateway>;

/// Verify a payment confirmation signature: HMAC-SHA256 over
/// `"<order_id>|<payment_id>"` keyed with the gateway secret, hex-encoded.
/// Comparison is constant-time via `verify_slice`.
pub fn verify_signature(secret: &str, order_id: &str, payment_id: &str, signature: &str) -> bool {
    let payload = format!("{order_id}|{payment_id}");
    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(payload.as_bytes());
    match hex::decode(signature) {
        Ok(sig_bytes) => mac.verify_slice(&sig_bytes).is_ok(),
        Err(_) => false,
    }
}

// The Real Implementation (Razorpay REST)
/// RazorpayClient
///
/// Talks to the Razorpay Orders API with basic auth over the configured key
/// pair. Responses are inspected as raw JSON; any shape surprise is surfaced
/// as an error string including the gateway's payload for the server log.
pub struct RazorpayClient {
    http: reqwest::Client,
    key_id: String,
    key_secret: String,
}

impl RazorpayClient {
    pub fn new(key_id: impl Into<String>, key_secret: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            key_id: key_id.into(),
            key_secret: key_secret.into(),
        }
    }
}

#[async_trait]
impl PaymentGateway for RazorpayClient {
    async fn create_order(&self, amount: i64, receipt: &str) -> Result<GatewayOrder, String> {
        let resp: serde_json::Value = self
            .http
            .post(format!("{RAZORPAY_API_BASE}/orders"))
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&serde_json::json!({
                "amount": amount,
                "currency": "INR",
                "receipt": receipt,
            }))
            .send()
            .await
            .map_err(|e| format!("Gateway request failed: {e}"))?
            .json()
            .await
            .map_err(|e| format!("Gateway response unreadable: {e}"))?;

        let id = resp["id"]
            .as_str()
            .ok_or_else(|| format!("Gateway order creation failed: {resp}"))?;

        Ok(GatewayOrder {
            id: id.to_string(),
            amount: resp["amount"].as_i64().unwrap_or(amount),
            currency: resp["currency"].as_str().unwrap_or("INR").to_string(),
        })
    }

    fn verify_payment(&self, order_id: &str, payment_id: &str, signature: &str) -> bool {
        verify_signature(&self.key_secret, order_id, payment_id, signature)
    }

    fn key_id(&self) -> &str {
        &self.key_id
    }
}

// The Mock Implementation (For Unit Tests)
/// MockPaymentGateway
///
/// Creates deterministic gateway orders and verifies signatures against a
/// fixed test secret, so handler tests can mint valid confirmations.
pub struct MockPaymentGateway {
    pub should_fail: bool,
    pub key_secret: String,
}

impl MockPaymentGateway {
    pub fn new() -> Self {
        Self {
            should_fail: false,
            key_secret: "rzp_test_secret".to_string(),
        }
    }

    pub fn new_failing() -> Self {
        Self {
            should_fail: true,
            key_secret: "rzp_test_secret".to_string(),
        }
    }

    /// Produces a valid confirmation signature for the mock secret; the test
    /// counterpart of a real gateway callback.
    pub fn sign(&self, order_id: &str, payment_id: &str) -> String {
        let mut mac = Hmac::<Sha256>::new_from_slice(self.key_secret.as_bytes())
            .expect("HMAC accepts keys of any length");
        mac.update(format!("{order_id}|{payment_id}").as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }
}

impl Default for MockPaymentGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn create_order(&self, amount: i64, _receipt: &str) -> Result<GatewayOrder, String> {
        if self.should_fail {
            return Err("Mock gateway error: simulation requested".to_string());
        }
        Ok(GatewayOrder {
            id: "order_mock_000001".to_string(),
            amount,
            currency: "INR".to_string(),
        })
    }

    fn verify_payment(&self, order_id: &str, payment_id: &str, signature: &str) -> bool {
        verify_signature(&self.key_secret, order_id, payment_id, signature)
    }

    fn key_id(&self) -> &str {
        "rzp_test_key"
    }
}
