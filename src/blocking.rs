//! Blocking bank list client using ureq

use serde_json::Value;

use crate::config::Credentials;
use crate::error::{MontonioError, Result};
use crate::payments::{
    api_base_url, bank_list_request_with_base, BankListRequest, BankListResponse, USER_AGENT,
};

/// Blocking counterpart of [`crate::payments::BankListClient`].
#[derive(Debug, Clone)]
pub struct BankListClient {
    credentials: Credentials,
    base_url: String,
}

impl BankListClient {
    pub fn new(credentials: Credentials) -> Self {
        let base_url = api_base_url(credentials.environment()).to_string();
        Self {
            credentials,
            base_url,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn request(&self) -> Result<BankListRequest> {
        bank_list_request_with_base(&self.credentials, &self.base_url)
    }

    pub fn try_fetch(&self) -> Result<Value> {
        let request = self.request()?;

        let response = ureq::get(&request.url)
            .header("Content-Type", "application/json")
            .header("Authorization", &request.authorization)
            .header("User-Agent", USER_AGENT)
            .call()
            .map_err(map_ureq_error)?;

        response.into_body().read_json().map_err(|e| {
            MontonioError::TransportFailure(format!("Failed to parse bank list response: {}", e))
        })
    }

    pub fn fetch(&self) -> BankListResponse {
        let result = self.try_fetch();
        if let Err(e) = &result {
            tracing::warn!(error = %e, environment = %self.credentials.environment(), "Failed to fetch Montonio bank list");
        }
        result.into()
    }
}

fn map_ureq_error(error: ureq::Error) -> MontonioError {
    match error {
        ureq::Error::StatusCode(status) => MontonioError::TransportFailure(format!(
            "Bank list request failed with status {}",
            status
        )),
        other => MontonioError::TransportFailure(format!("Bank list request failed: {}", other)),
    }
}
