use std::collections::BTreeMap;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::{Credentials, Environment};
use crate::error::{MontonioError, Result};
use crate::jwt::issue_bearer_credential;

pub const BANK_LIST_PATH: &str = "/pis/v2/merchants/aspsps";

/// Identifier of card payments in every region
pub const CARD_PAYMENT_BIC: &str = "CARD";

pub(crate) const USER_AGENT: &str = concat!("montonio-sdk-rust/", env!("CARGO_PKG_VERSION"));

/// Root of the Montonio Payments API (not the customer-facing host).
pub fn api_base_url(environment: Environment) -> &'static str {
    match environment {
        Environment::Production => "https://api.payments.montonio.com",
        Environment::Sandbox => "https://api.sandbox-payments.montonio.com",
    }
}

/// Everything needed to call the bank list endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BankListRequest {
    pub url: String,
    /// Full `Authorization` header value (`Bearer <token>`)
    pub authorization: String,
}

pub fn bank_list_request(credentials: &Credentials) -> Result<BankListRequest> {
    bank_list_request_with_base(credentials, api_base_url(credentials.environment()))
}

pub(crate) fn bank_list_request_with_base(
    credentials: &Credentials,
    base_url: &str,
) -> Result<BankListRequest> {
    let token = issue_bearer_credential(credentials.access_key(), credentials.secret_key())?;

    Ok(BankListRequest {
        url: format!("{}{}", base_url.trim_end_matches('/'), BANK_LIST_PATH),
        authorization: format!("Bearer {}", token),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RequestStatus {
    Success,
    Error,
}

/// Outcome of a bank list fetch: the parsed body, or no data on failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankListResponse {
    pub status: RequestStatus,
    pub data: Option<Value>,
}

impl BankListResponse {
    pub fn success(data: Value) -> Self {
        Self {
            status: RequestStatus::Success,
            data: Some(data),
        }
    }

    pub fn error() -> Self {
        Self {
            status: RequestStatus::Error,
            data: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == RequestStatus::Success
    }

    /// Banks grouped by region, if the body has the expected shape.
    pub fn banks(&self) -> Option<BankList> {
        let data = self.data.as_ref()?;
        serde_json::from_value(data.clone()).ok()
    }
}

impl From<Result<Value>> for BankListResponse {
    fn from(result: Result<Value>) -> Self {
        match result {
            Ok(data) => BankListResponse::success(data),
            Err(_) => BankListResponse::error(),
        }
    }
}

/// A bank or card processor offered at checkout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aspsp {
    pub bic: String,
    pub logo_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Aspsp {
    pub fn is_card(&self) -> bool {
        self.bic == CARD_PAYMENT_BIC
    }
}

/// Region code (`EE`, `LV`, `LT`, `FI`, ...) to the payment methods offered there
pub type BankList = BTreeMap<String, Vec<Aspsp>>;

/// Client for the authenticated bank list endpoint.
///
/// Montonio asks merchants to cache the list rather than fetch it on every
/// checkout; this client does no caching or retrying of its own.
#[derive(Debug, Clone)]
pub struct BankListClient {
    client: Client,
    credentials: Credentials,
    base_url: String,
}

impl BankListClient {
    pub fn new(credentials: Credentials) -> Self {
        let base_url = api_base_url(credentials.environment()).to_string();
        Self {
            client: Client::new(),
            credentials,
            base_url,
        }
    }

    /// Point the client at another API root (e.g. a mock server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn request(&self) -> Result<BankListRequest> {
        bank_list_request_with_base(&self.credentials, &self.base_url)
    }

    /// Fetch the bank list, surfacing transport problems as `TransportFailure`.
    pub async fn try_fetch(&self) -> Result<Value> {
        let request = self.request()?;

        let response = self
            .client
            .get(&request.url)
            .header("Content-Type", "application/json")
            .header("Authorization", &request.authorization)
            .header("User-Agent", USER_AGENT)
            .send()
            .await
            .map_err(|e| MontonioError::TransportFailure(format!("Bank list request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(MontonioError::TransportFailure(format!(
                "Bank list request failed with status {}",
                response.status()
            )));
        }

        response.json().await.map_err(|e| {
            MontonioError::TransportFailure(format!("Failed to parse bank list response: {}", e))
        })
    }

    /// Fetch the bank list. Any failure yields an `ERROR` response without data.
    pub async fn fetch(&self) -> BankListResponse {
        let result = self.try_fetch().await;
        if let Err(e) = &result {
            tracing::warn!(error = %e, environment = %self.credentials.environment(), "Failed to fetch Montonio bank list");
        }
        result.into()
    }
}
