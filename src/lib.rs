//! # Montonio SDK
//!
//! Server-side Rust SDK for [Montonio](https://montonio.com) payments and
//! financing: build signed payment tokens, redirect customers, and verify the
//! tokens Montonio sends back.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use montonio_sdk::{Credentials, Montonio, ProductVariant, RawPaymentInput};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // MONTONIO_ACCESS_KEY, MONTONIO_SECRET_KEY, MONTONIO_ENVIRONMENT
//!     let credentials = Credentials::from_env()?;
//!     let mut montonio = Montonio::new(credentials, ProductVariant::DirectPayment);
//!
//!     montonio.set_payment_data(
//!         RawPaymentInput::new()
//!             .with("amount", 19.99)
//!             .with("currency", "EUR")
//!             .with("merchant_name", "Shop")
//!             .with("merchant_reference", "ORDER-1")
//!             .with("merchant_return_url", "https://shop.example/return")
//!             .with("checkout_email", "customer@example.com")
//!             .with("checkout_first_name", "Mari")
//!             .with("checkout_last_name", "Maasikas")
//!             .with("checkout_phone_number", "+37255555555"),
//!     );
//!
//!     // Redirect the customer
//!     let url = montonio.payment_url()?;
//!     println!("{}", url);
//!
//!     // Later, on the return URL or webhook
//!     let claims = montonio.verify_callback("<payment_token from the callback>")?;
//!     println!("Order {:?} is {:?}", claims.get_str("merchant_reference"), claims.get_str("status"));
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `native-tls` (default): Use native TLS for HTTPS
//! - `rustls-tls`: Use rustls for HTTPS (alternative to native-tls)
//! - `blocking`: Blocking bank list client built on ureq
//!
//! ## Token rules
//!
//! - Tokens are HS256 only; any other `alg` is rejected before the signature
//!   is checked
//! - Payment tokens expire 10 minutes after creation
//! - Returned tokens are accepted until `exp` plus 5 minutes of clock skew

#[cfg(feature = "blocking")]
pub mod blocking;
pub mod config;
pub mod error;
pub mod jwt;
pub mod montonio;
pub mod payments;

// Main client
pub use montonio::Montonio;

// Configuration
pub use config::{Credentials, Environment};

// Error types
pub use error::{MontonioError, Result};

// Tokens
pub use jwt::{
    decode_and_verify, decode_token, issue_bearer_credential, sign, ClaimSet, SignedToken,
    DEFAULT_LEEWAY_SECONDS,
};

// Payments
pub use payments::{
    bank_list_request, build_claims, build_payment_url, payment_token_from_callback_url,
    required_fields, resolve_base_url, Aspsp, BankList, BankListClient, BankListRequest,
    BankListResponse, FinancingData, PaymentData, ProductLineItem, ProductVariant,
    RawPaymentInput, RequestStatus, PAYMENT_TOKEN_TTL_SECONDS,
};
