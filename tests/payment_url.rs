//! End-to-end payment URL and callback tests

mod common;

use common::*;

const SANDBOX_PREFIX: &str = "https://sandbox-payments.montonio.com?payment_token=";

#[test]
fn test_sandbox_payment_url() {
    let montonio = sandbox_direct_payment();
    let before = jwt::now();

    let url = montonio.payment_url().expect("URL should build");
    assert!(url.starts_with(SANDBOX_PREFIX), "unexpected URL: {}", url);

    let token = &url[SANDBOX_PREFIX.len()..];
    let claims = Montonio::decode_payment_token(token, SECRET_KEY).expect("Token should verify");

    assert_eq!(claims.get_f64("amount"), Some(19.99));
    assert_eq!(claims.get_str("currency"), Some("EUR"));
    assert_eq!(claims.get_str("access_key"), Some(ACCESS_KEY));

    let exp = claims.exp().unwrap();
    assert!(exp >= before + 600 && exp <= jwt::now() + 600);
}

#[test]
fn test_production_financing_hosts() {
    for (variant, prefix) in [
        (ProductVariant::HirePurchaseFinancing, "https://application.montonio.com?payment_token="),
        (ProductVariant::SliceFinancing, "https://financing.montonio.com?payment_token="),
    ] {
        let mut montonio = Montonio::new(production_credentials(), variant);
        montonio.set_payment_data(financing_input());

        let url = montonio.payment_url().unwrap();
        assert!(url.starts_with(prefix), "unexpected URL: {}", url);
    }
}

#[test]
fn test_invalid_data_fails_before_signing() {
    let mut input = direct_payment_input();
    input.remove("checkout_email");

    let mut montonio = Montonio::new(sandbox_credentials(), ProductVariant::DirectPayment);
    montonio.set_payment_data(input);

    let err = montonio.payment_url().unwrap_err();
    assert_eq!(err.field(), Some("checkout_email"));
}

#[test]
fn test_replacing_payment_data() {
    let mut montonio = sandbox_direct_payment();
    montonio.set_payment_data(direct_payment_input().with("merchant_reference", "ORDER-2"));

    let claims = montonio.payment_claims().unwrap();
    assert_eq!(claims.get_str("merchant_reference"), Some("ORDER-2"));
}

#[test]
fn test_callback_roundtrip() {
    let montonio = sandbox_direct_payment();

    // Montonio returns a token signed with the merchant's secret
    let mut returned = ClaimSet::new();
    returned.insert("merchant_reference", "ORDER-1");
    returned.insert("status", "finalized");
    returned.insert("exp", jwt::now() + 600);
    let token = sign(&returned, SECRET_KEY).unwrap();

    let callback = format!("https://shop.example/return?payment_token={}&lang=et", token);
    let extracted = payment_token_from_callback_url(&callback).unwrap();

    let claims = montonio.verify_callback(&extracted).unwrap();
    assert_eq!(claims.get_str("status"), Some("finalized"));
}

#[test]
fn test_callback_signed_with_other_secret() {
    let montonio = sandbox_direct_payment();
    let token = sign(&ClaimSet::new(), "sk_other").unwrap();

    let err = montonio.verify_callback(token.as_str()).unwrap_err();
    assert!(err.is_security_failure());
}

#[test]
fn test_callback_url_without_token() {
    let err = payment_token_from_callback_url("https://shop.example/return?lang=et").unwrap_err();
    assert!(matches!(err, MontonioError::MalformedToken(_)));
}

#[test]
fn test_bearer_token_matches_credentials() {
    let montonio = sandbox_direct_payment();
    let token = montonio.bearer_token().unwrap();

    let claims = decode_and_verify(token.as_str(), SECRET_KEY, DEFAULT_LEEWAY_SECONDS).unwrap();
    assert_eq!(claims.get_str("access_key"), Some(ACCESS_KEY));
    assert_eq!(claims.exp(), None);
}
