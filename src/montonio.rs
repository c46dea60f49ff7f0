//! Montonio SDK instance

use serde_json::Value;

use crate::config::Credentials;
use crate::error::{MontonioError, Result};
use crate::jwt::{decode_and_verify, issue_bearer_credential, sign, ClaimSet, SignedToken, DEFAULT_LEEWAY_SECONDS};
use crate::payments::{
    build_claims, build_payment_url, resolve_base_url, BankListClient, BankListResponse,
    ProductVariant, RawPaymentInput,
};

/// Montonio SDK client for one product.
///
/// Holds the merchant credentials for its whole lifetime. Payment data is set
/// per order and only validated when a payment URL is requested.
///
/// # Example
/// ```rust,no_run
/// use montonio_sdk::{Credentials, Environment, Montonio, PaymentData, ProductVariant};
///
/// # fn example() -> montonio_sdk::Result<()> {
/// let credentials = Credentials::new("access-key", "secret-key", Environment::Sandbox);
/// let mut montonio = Montonio::new(credentials, ProductVariant::DirectPayment);
///
/// montonio.set_payment_data(PaymentData {
///     amount: 19.99,
///     currency: "EUR".into(),
///     merchant_name: "Shop".into(),
///     merchant_reference: "ORDER-1".into(),
///     merchant_return_url: "https://shop.example/return".into(),
///     checkout_email: "customer@example.com".into(),
///     checkout_first_name: "Mari".into(),
///     checkout_last_name: "Maasikas".into(),
///     checkout_phone_number: "+37255555555".into(),
///     ..Default::default()
/// });
///
/// // Redirect the customer here
/// let url = montonio.payment_url()?;
/// # Ok(())
/// # }
/// ```
pub struct Montonio {
    credentials: Credentials,
    variant: ProductVariant,
    payment_data: Option<RawPaymentInput>,
    bank_list: BankListClient,
}

impl Montonio {
    pub fn new(credentials: Credentials, variant: ProductVariant) -> Self {
        let bank_list = BankListClient::new(credentials.clone());
        Self {
            credentials,
            variant,
            payment_data: None,
            bank_list,
        }
    }

    /// Send bank list requests to another API root (e.g. a mock server).
    pub fn with_api_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.bank_list = self.bank_list.with_base_url(base_url);
        self
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn variant(&self) -> ProductVariant {
        self.variant
    }

    // ==================== Payment tokens ====================

    pub fn set_payment_data(&mut self, data: impl Into<RawPaymentInput>) -> &mut Self {
        self.payment_data = Some(data.into());
        self
    }

    pub fn payment_data(&self) -> Option<&RawPaymentInput> {
        self.payment_data.as_ref()
    }

    /// Canonical claims for the current payment data, expiring in 10 minutes.
    pub fn payment_claims(&self) -> Result<ClaimSet> {
        let data = self
            .payment_data
            .as_ref()
            .ok_or(MontonioError::MissingPaymentData)?;
        build_claims(data, self.variant, &self.credentials)
    }

    /// A freshly signed payment token. Never cached.
    pub fn payment_token(&self) -> Result<SignedToken> {
        sign(&self.payment_claims()?, self.credentials.secret_key())
    }

    /// URL to redirect the customer to.
    pub fn payment_url(&self) -> Result<String> {
        let token = self.payment_token()?;
        let base = resolve_base_url(self.variant, self.credentials.environment());

        tracing::debug!(
            variant = ?self.variant,
            environment = %self.credentials.environment(),
            "Created Montonio payment URL"
        );

        Ok(build_payment_url(base, &token))
    }

    // ==================== Callbacks ====================

    /// Decode and verify a `payment_token` returned by Montonio.
    ///
    /// Allows 5 minutes of clock skew past `exp`. Fails with
    /// `InvalidSignature`/`UnexpectedAlgorithm` for tampered tokens and with
    /// `TokenExpired` for stale ones.
    pub fn decode_payment_token(token: &str, secret_key: &str) -> Result<ClaimSet> {
        decode_and_verify(token, secret_key, DEFAULT_LEEWAY_SECONDS)
    }

    /// [`Montonio::decode_payment_token`] with this instance's secret key.
    pub fn verify_callback(&self, token: &str) -> Result<ClaimSet> {
        Self::decode_payment_token(token, self.credentials.secret_key())
    }

    // ==================== API access ====================

    /// Bearer token for authenticating calls to the Montonio API.
    pub fn bearer_token(&self) -> Result<SignedToken> {
        issue_bearer_credential(self.credentials.access_key(), self.credentials.secret_key())
    }

    pub fn bank_list_client(&self) -> &BankListClient {
        &self.bank_list
    }

    /// Fetch the banks and card processors that can be offered at checkout.
    ///
    /// Cache the result; do not call this on every checkout page load.
    pub async fn fetch_bank_list(&self) -> BankListResponse {
        self.bank_list.fetch().await
    }

    pub async fn try_fetch_bank_list(&self) -> Result<Value> {
        self.bank_list.try_fetch().await
    }
}

impl std::fmt::Debug for Montonio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Montonio")
            .field("credentials", &self.credentials)
            .field("variant", &self.variant)
            .field("payment_data", &self.payment_data.as_ref().map(|_| "<set>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Environment;
    use crate::payments::{FinancingData, ProductLineItem};

    fn financing_data() -> FinancingData {
        FinancingData {
            currency: "EUR".into(),
            merchant_name: "Shop".into(),
            merchant_reference: "ORDER-9".into(),
            merchant_return_url: "https://shop.example/return".into(),
            checkout_email: "a@b.com".into(),
            checkout_first_name: "A".into(),
            checkout_last_name: "B".into(),
            checkout_phone_number: "+37060000000".into(),
            checkout_city: "Vilnius".into(),
            checkout_address: "Gedimino pr. 1".into(),
            checkout_postal_code: "01103".into(),
            preselected_loan_period: 6,
            checkout_products: vec![ProductLineItem::new("Laptop", 1299.0, 1)],
            merchant_notification_url: Some("https://shop.example/notify".into()),
            preselected_locale: None,
        }
    }

    #[test]
    fn test_payment_url_requires_data() {
        let montonio = Montonio::new(
            Credentials::new("ak_1", "sk_1", Environment::Sandbox),
            ProductVariant::DirectPayment,
        );
        assert!(matches!(montonio.payment_url(), Err(MontonioError::MissingPaymentData)));
    }

    #[test]
    fn test_slice_payment_url() {
        let mut montonio = Montonio::new(
            Credentials::new("ak_1", "sk_1", Environment::Production),
            ProductVariant::SliceFinancing,
        );
        montonio.set_payment_data(financing_data());

        let url = montonio.payment_url().unwrap();
        let token = url
            .strip_prefix("https://financing.montonio.com?payment_token=")
            .unwrap();

        let claims = montonio.verify_callback(token).unwrap();
        assert_eq!(claims.get_str("loan_type"), Some("slice"));
        assert_eq!(claims.get_str("merchant_notification_url"), Some("https://shop.example/notify"));
    }

    #[test]
    fn test_tokens_are_fresh_per_request() {
        let mut montonio = Montonio::new(
            Credentials::new("ak_1", "sk_1", Environment::Sandbox),
            ProductVariant::HirePurchaseFinancing,
        );
        montonio.set_payment_data(financing_data());

        let first = montonio.payment_claims().unwrap();
        let second = montonio.payment_claims().unwrap();
        let mut a = first.clone();
        let mut b = second.clone();
        a.remove("exp");
        b.remove("exp");
        assert_eq!(a, b);
        assert!(second.exp().unwrap() >= first.exp().unwrap());
    }

    #[test]
    fn test_debug_hides_secret() {
        let montonio = Montonio::new(
            Credentials::new("ak_1", "very-secret", Environment::Sandbox),
            ProductVariant::DirectPayment,
        );
        assert!(!format!("{:?}", montonio).contains("very-secret"));
    }
}
