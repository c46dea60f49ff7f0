use std::fmt;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::error::{MontonioError, Result};
use super::ClaimSet;

type HmacSha256 = Hmac<Sha256>;

/// The only signing algorithm Montonio tokens use
pub const ALGORITHM: &str = "HS256";

/// Header bytes as emitted by Montonio's reference integrations
const HEADER_JSON: &str = r#"{"typ":"JWT","alg":"HS256"}"#;

/// A compact `header.payload.signature` token. The alphabet is URL-safe.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignedToken(String);

impl SignedToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for SignedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for SignedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Tokens are bearer material; only show the header segment
        let header = self.0.split('.').next().unwrap_or_default();
        write!(f, "SignedToken({}.…)", header)
    }
}

impl AsRef<str> for SignedToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<SignedToken> for String {
    fn from(token: SignedToken) -> Self {
        token.0
    }
}

pub(crate) fn hmac_sha256(secret_key: &str, message: &[u8]) -> Result<Vec<u8>> {
    if secret_key.is_empty() {
        return Err(MontonioError::InvalidConfig("secret key is empty".into()));
    }

    let mut mac = HmacSha256::new_from_slice(secret_key.as_bytes())
        .map_err(|e| MontonioError::InvalidConfig(format!("unusable secret key: {}", e)))?;
    mac.update(message);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Sign a claim set with the merchant secret key (HS256).
pub fn sign(claims: &ClaimSet, secret_key: &str) -> Result<SignedToken> {
    let header = URL_SAFE_NO_PAD.encode(HEADER_JSON);
    let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(claims)?);
    let message = format!("{}.{}", header, payload);

    let signature = hmac_sha256(secret_key, message.as_bytes())?;
    let sig_b64 = URL_SAFE_NO_PAD.encode(signature);

    Ok(SignedToken(format!("{}.{}", message, sig_b64)))
}

/// Issue the bearer credential used to authenticate API calls to Montonio.
///
/// The token carries `access_key` only and has no `exp` claim; rotating it is
/// up to the caller.
pub fn issue_bearer_credential(access_key: &str, secret_key: &str) -> Result<SignedToken> {
    let mut claims = ClaimSet::new();
    claims.insert("access_key", access_key);
    sign(&claims, secret_key)
}
