use aquastore::payments::{
    MockPaymentGateway, PaymentGateway, RazorpayClient, verify_signature,
};
use hmac::{Hmac, Mac};
use sha2::Sha256;

fn sign(secret: &str, order_id: &str, payment_id: &str) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(format!("{order_id}|{payment_id}").as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

#[test]
fn test_verify_signature_accepts_valid_confirmation() {
    let signature = sign("topsecret", "order_abc", "pay_def");
    assert!(verify_signature("topsecret", "order_abc", "pay_def", &signature));
}

#[test]
fn test_verify_signature_rejects_tampering() {
    let signature = sign("topsecret", "order_abc", "pay_def");

    // A confirmation for a different order must not verify.
    assert!(!verify_signature("topsecret", "order_OTHER", "pay_def", &signature));
    // Nor one signed with the wrong secret.
    assert!(!verify_signature("wrongsecret", "order_abc", "pay_def", &signature));
}

#[test]
fn test_verify_signature_rejects_garbage() {
    assert!(!verify_signature("topsecret", "order_abc", "pay_def", "not-hex!"));
    assert!(!verify_signature("topsecret", "order_abc", "pay_def", ""));
    // Valid hex of the wrong length.
    assert!(!verify_signature("topsecret", "order_abc", "pay_def", "deadbeef"));
}

#[test]
fn test_mock_gateway_signs_verifiable_confirmations() {
    let gateway = MockPaymentGateway::new();
    let signature = gateway.sign("order_mock_000001", "pay_123");
    assert!(gateway.verify_payment("order_mock_000001", "pay_123", &signature));
    assert!(!gateway.verify_payment("order_mock_000001", "pay_456", &signature));
}

#[tokio::test]
async fn test_mock_gateway_order_creation() {
    let gateway = MockPaymentGateway::new();
    let order = gateway.create_order(49900, "rcpt-1").await.unwrap();
    assert_eq!(order.amount, 49900);
    assert_eq!(order.currency, "INR");
    assert!(!order.id.is_empty());
}

#[tokio::test]
async fn test_mock_gateway_failure_mode() {
    let gateway = MockPaymentGateway::new_failing();
    assert!(gateway.create_order(100, "rcpt-1").await.is_err());
}

#[test]
fn test_razorpay_client_exposes_key_id() {
    // The public half of the key pair is handed to clients for their checkout
    // widget; the secret never leaves the server.
    let client = RazorpayClient::new("rzp_test_abc", "shhh");
    assert_eq!(client.key_id(), "rzp_test_abc");
}

#[test]
fn test_razorpay_client_verifies_with_key_secret() {
    let client = RazorpayClient::new("rzp_test_abc", "shhh");
    let signature = sign("shhh", "order_1", "pay_1");
    assert!(client.verify_payment("order_1", "pay_1", &signature));
    assert!(!client.verify_payment("order_1", "pay_2", &signature));
}
