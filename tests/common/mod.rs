//! Test utilities and fixtures for Montonio SDK integration tests

#![allow(dead_code)]

pub use montonio_sdk::*;
pub use serde_json::{json, Value};

pub const ACCESS_KEY: &str = "ak_1";
pub const SECRET_KEY: &str = "sk_1";

/// Sandbox credentials shared by every test
pub fn sandbox_credentials() -> Credentials {
    Credentials::new(ACCESS_KEY, SECRET_KEY, Environment::Sandbox)
}

pub fn production_credentials() -> Credentials {
    Credentials::new(ACCESS_KEY, SECRET_KEY, Environment::Production)
}

/// Minimal valid direct payment input
pub fn direct_payment_input() -> RawPaymentInput {
    RawPaymentInput::new()
        .with("amount", 19.99)
        .with("currency", "EUR")
        .with("merchant_name", "Shop")
        .with("merchant_reference", "ORDER-1")
        .with("merchant_return_url", "https://shop.example/return")
        .with("checkout_email", "a@b.com")
        .with("checkout_first_name", "A")
        .with("checkout_last_name", "B")
        .with("checkout_phone_number", "+37255555555")
}

/// Minimal valid financing input (hire purchase or slice)
pub fn financing_input() -> RawPaymentInput {
    RawPaymentInput::new()
        .with("currency", "EUR")
        .with("merchant_name", "Shop")
        .with("merchant_reference", "ORDER-2")
        .with("merchant_return_url", "https://shop.example/return")
        .with("checkout_email", "a@b.com")
        .with("checkout_first_name", "A")
        .with("checkout_last_name", "B")
        .with("checkout_phone_number", "+37255555555")
        .with("checkout_city", "Tallinn")
        .with("checkout_address", "Narva mnt 1")
        .with("checkout_postal_code", "10117")
        .with("preselected_loan_period", 12)
        .with(
            "checkout_products",
            json!([
                {"product_name": "Sofa", "product_price": 499.5, "quantity": 1},
                {"product_name": "Cushion", "product_price": "15", "quantity": "2"}
            ]),
        )
}

/// Direct payment SDK instance with payment data already set
pub fn sandbox_direct_payment() -> Montonio {
    let mut montonio = Montonio::new(sandbox_credentials(), ProductVariant::DirectPayment);
    montonio.set_payment_data(direct_payment_input());
    montonio
}

/// Keys of a claim set in wire order
pub fn key_order(claims: &ClaimSet) -> Vec<&str> {
    claims.keys().collect()
}
