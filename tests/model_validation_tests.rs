use aquastore::models::{
    Fish, FishForm, OrderStatus, PaymentMethod, PlaceOrderRequest, RegisterRequest,
    ShippingAddress, is_valid_email,
};

// --- Serde Mappings ---

#[test]
fn test_fish_type_field_mapping() {
    // The SQL column and JSON key are both "type"; only the Rust field is
    // renamed to dodge the keyword.
    let fish = Fish {
        fish_type: "Guppy".to_string(),
        ..Fish::default()
    };

    let json_output = serde_json::to_string(&fish).unwrap();
    assert!(
        json_output.contains(r#""type":"Guppy""#),
        "JSON output must use 'type' key due to #[serde(rename = \"type\")]"
    );
    assert!(!json_output.contains("fish_type"));
}

#[test]
fn test_order_enums_serialize_lowercase() {
    assert_eq!(
        serde_json::to_string(&OrderStatus::Shipped).unwrap(),
        r#""shipped""#
    );
    assert_eq!(
        serde_json::to_string(&PaymentMethod::Netbanking).unwrap(),
        r#""netbanking""#
    );
    // And the wire names round-trip back into the enum.
    let parsed: OrderStatus = serde_json::from_str(r#""delivered""#).unwrap();
    assert_eq!(parsed, OrderStatus::Delivered);
}

#[test]
fn test_order_status_as_str_matches_serde() {
    for status in [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ] {
        let via_serde = serde_json::to_string(&status).unwrap();
        assert_eq!(via_serde, format!("\"{}\"", status.as_str()));
    }
}

#[test]
fn test_place_order_request_defaults() {
    // Quantity defaults to 1 and the optional blocks may be absent entirely.
    let json = r#"{
        "items": [{"fish_id": "11111111-2222-3333-4444-555555555555",
                   "name": "Betta", "price": 120.0}],
        "total_amount": 120.0
    }"#;

    let req: PlaceOrderRequest = serde_json::from_str(json).unwrap();
    assert_eq!(req.items[0].quantity, 1);
    assert!(req.payment_method.is_none());
    assert!(req.shipping_address.is_none());
    assert!(req.order_number.is_none());
    assert!(req.razorpay_signature.is_none());
}

#[test]
fn test_shipping_address_accepts_partial_document() {
    let addr: ShippingAddress =
        serde_json::from_str(r#"{"city": "Kochi", "pincode": "682001"}"#).unwrap();
    assert_eq!(addr.city.as_deref(), Some("Kochi"));
    assert!(addr.name.is_none());
}

// --- Registration Validation ---

fn valid_register() -> RegisterRequest {
    RegisterRequest {
        name: "Asha".to_string(),
        email: "asha@example.com".to_string(),
        password: "hunter22".to_string(),
        phone: "9876543210".to_string(),
        address: "12 Marine Drive".to_string(),
    }
}

#[test]
fn test_register_request_valid() {
    assert!(valid_register().validate().is_ok());
}

#[test]
fn test_register_request_rejects_bad_email() {
    let mut req = valid_register();
    req.email = "not-an-email".to_string();
    assert_eq!(req.validate().unwrap_err(), "Invalid email");
}

#[test]
fn test_register_request_rejects_short_password() {
    let mut req = valid_register();
    req.password = "abc".to_string();
    assert_eq!(req.validate().unwrap_err(), "Password too short");
}

#[test]
fn test_register_request_rejects_bad_phone() {
    let mut req = valid_register();
    req.phone = "12345".to_string();
    assert_eq!(req.validate().unwrap_err(), "Phone must be 10 digits");

    req.phone = "12345abcde".to_string();
    assert_eq!(req.validate().unwrap_err(), "Phone must be 10 digits");
}

#[test]
fn test_register_request_rejects_missing_address() {
    let mut req = valid_register();
    req.address = "   ".to_string();
    assert_eq!(req.validate().unwrap_err(), "Address is required");
}

#[test]
fn test_email_structure_check() {
    assert!(is_valid_email("a@b.co"));
    assert!(is_valid_email("first.last@sub.domain.org"));
    assert!(!is_valid_email("a@b"));
    assert!(!is_valid_email("@b.co"));
    assert!(!is_valid_email("a b@c.co"));
    assert!(!is_valid_email("a@b@c.co"));
}

// --- Fish Form Validation ---

#[test]
fn test_fish_form_valid_with_photo() {
    let form = FishForm {
        name: "Neon Tetra".to_string(),
        price: "45.5".to_string(),
        fish_type: "Freshwater".to_string(),
        photo: Some("/uploads/1-abc.jpg".to_string()),
        video: None,
    };
    assert_eq!(form.validate(true).unwrap(), 45.5);
}

#[test]
fn test_fish_form_missing_photo_fails_validation() {
    // Creating a fish entry without a photo must fail and, since validation
    // runs before any persistence call, nothing gets stored.
    let form = FishForm {
        name: "Neon Tetra".to_string(),
        price: "45.5".to_string(),
        fish_type: "Freshwater".to_string(),
        photo: None,
        video: None,
    };
    let errors = form.validate(true).unwrap_err();
    assert!(errors.iter().any(|(field, _)| *field == "photo"));
}

#[test]
fn test_fish_form_photo_optional_on_update() {
    // Updates keep the stored photo when no new file arrived.
    let form = FishForm {
        name: "Neon Tetra".to_string(),
        price: "45.5".to_string(),
        fish_type: "Freshwater".to_string(),
        photo: None,
        video: None,
    };
    assert!(form.validate(false).is_ok());
}

#[test]
fn test_fish_form_rejects_negative_and_unparseable_price() {
    let mut form = FishForm {
        name: "Neon Tetra".to_string(),
        price: "-3".to_string(),
        fish_type: "Freshwater".to_string(),
        photo: Some("/uploads/p.jpg".to_string()),
        video: None,
    };
    let errors = form.validate(true).unwrap_err();
    assert!(errors.iter().any(|(_, msg)| msg == "Price cannot be negative"));

    form.price = "cheap".to_string();
    let errors = form.validate(true).unwrap_err();
    assert!(errors.iter().any(|(field, _)| *field == "price"));
}

#[test]
fn test_fish_form_collects_all_field_errors() {
    // The admin form renders every violated rule at once, not just the first.
    let form = FishForm::default();
    let errors = form.validate(true).unwrap_err();
    let fields: Vec<&str> = errors.iter().map(|(f, _)| *f).collect();
    assert!(fields.contains(&"name"));
    assert!(fields.contains(&"price"));
    assert!(fields.contains(&"type"));
    assert!(fields.contains(&"photo"));
}
