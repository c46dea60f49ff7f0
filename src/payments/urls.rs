use url::Url;

use super::ProductVariant;
use crate::config::Environment;
use crate::error::{MontonioError, Result};
use crate::jwt::SignedToken;

/// Query parameter carrying the token, both on redirect and on return
pub const PAYMENT_TOKEN_PARAM: &str = "payment_token";

/// Base URL of the customer-facing Montonio application for a product.
pub fn resolve_base_url(variant: ProductVariant, environment: Environment) -> &'static str {
    match (variant, environment) {
        (ProductVariant::DirectPayment, Environment::Production) => "https://payments.montonio.com",
        (ProductVariant::DirectPayment, Environment::Sandbox) => {
            "https://sandbox-payments.montonio.com"
        }
        (ProductVariant::HirePurchaseFinancing, Environment::Production) => {
            "https://application.montonio.com"
        }
        (ProductVariant::HirePurchaseFinancing, Environment::Sandbox) => {
            "https://sandbox-application.montonio.com"
        }
        (ProductVariant::SliceFinancing, Environment::Production) => "https://financing.montonio.com",
        (ProductVariant::SliceFinancing, Environment::Sandbox) => {
            "https://sandbox-financing.montonio.com"
        }
    }
}

/// `<base_url>?payment_token=<token>`. The token is URL-safe and appended as is.
pub fn build_payment_url(base_url: &str, token: &SignedToken) -> String {
    format!("{}?{}={}", base_url, PAYMENT_TOKEN_PARAM, token)
}

/// Pull the `payment_token` value out of a return or notification URL.
pub fn payment_token_from_callback_url(url: &str) -> Result<String> {
    let parsed = Url::parse(url).map_err(|_| MontonioError::malformed("invalid callback URL"))?;

    parsed
        .query_pairs()
        .find(|(key, _)| key == PAYMENT_TOKEN_PARAM)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| MontonioError::malformed("callback URL has no payment_token"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwt::issue_bearer_credential;

    #[test]
    fn test_host_table() {
        use Environment::*;
        use ProductVariant::*;

        let cases = [
            (DirectPayment, Production, "https://payments.montonio.com"),
            (DirectPayment, Sandbox, "https://sandbox-payments.montonio.com"),
            (HirePurchaseFinancing, Production, "https://application.montonio.com"),
            (HirePurchaseFinancing, Sandbox, "https://sandbox-application.montonio.com"),
            (SliceFinancing, Production, "https://financing.montonio.com"),
            (SliceFinancing, Sandbox, "https://sandbox-financing.montonio.com"),
        ];

        for (variant, env, expected) in cases {
            assert_eq!(resolve_base_url(variant, env), expected, "{variant:?}/{env}");
        }
    }

    #[test]
    fn test_build_payment_url_appends_token_verbatim() {
        let token = issue_bearer_credential("ak_1", "sk_1").unwrap();
        let url = build_payment_url("https://sandbox-payments.montonio.com", &token);
        assert_eq!(
            url,
            format!("https://sandbox-payments.montonio.com?payment_token={}", token.as_str())
        );
    }

    #[test]
    fn test_token_from_callback_url() {
        let token = payment_token_from_callback_url(
            "https://shop.example/return?order=1&payment_token=aaa.bbb.ccc",
        )
        .unwrap();
        assert_eq!(token, "aaa.bbb.ccc");
    }

    #[test]
    fn test_callback_url_without_token() {
        assert!(matches!(
            payment_token_from_callback_url("https://shop.example/return?order=1"),
            Err(MontonioError::MalformedToken(_))
        ));
        assert!(matches!(
            payment_token_from_callback_url("https://shop.example/return?payment_token="),
            Err(MontonioError::MalformedToken(_))
        ));
        assert!(matches!(
            payment_token_from_callback_url("not a url"),
            Err(MontonioError::MalformedToken(_))
        ));
    }
}
