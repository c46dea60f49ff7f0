//! Decoding and verification of tokens returned by Montonio

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::Deserialize;
use serde_json::{Map, Value};
use subtle::ConstantTimeEq;

use crate::error::{MontonioError, Result};
use super::signing::{hmac_sha256, ALGORITHM};
use super::ClaimSet;

/// Clock-skew tolerance applied when validating `exp`, `nbf` and `iat`.
/// Some merchant servers run with their clock behind Montonio's.
pub const DEFAULT_LEEWAY_SECONDS: u64 = 5 * 60;

#[derive(Deserialize)]
struct Header {
    alg: Option<String>,
}

struct RawToken<'a> {
    header_b64: &'a str,
    payload_b64: &'a str,
    signature_b64: &'a str,
    alg: Option<String>,
    claims: Map<String, Value>,
}

/// Get the current Unix timestamp
pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

fn parse(token: &str) -> Result<RawToken<'_>> {
    let parts: Vec<&str> = token.split('.').collect();
    let &[header_b64, payload_b64, signature_b64] = parts.as_slice() else {
        return Err(MontonioError::malformed(format!(
            "expected 3 segments, found {}",
            parts.len()
        )));
    };

    let header_bytes = URL_SAFE_NO_PAD
        .decode(header_b64)
        .map_err(|_| MontonioError::malformed("header is not base64url"))?;
    let header: Header = serde_json::from_slice(&header_bytes)
        .map_err(|_| MontonioError::malformed("header is not a JSON object"))?;

    let payload_bytes = URL_SAFE_NO_PAD
        .decode(payload_b64)
        .map_err(|_| MontonioError::malformed("payload is not base64url"))?;
    let claims: Map<String, Value> = serde_json::from_slice(&payload_bytes)
        .map_err(|_| MontonioError::malformed("payload is not a JSON object"))?;

    Ok(RawToken {
        header_b64,
        payload_b64,
        signature_b64,
        alg: header.alg,
        claims,
    })
}

/// Decode a token and return its claims.
///
/// Does NOT verify the signature or expiry - use `decode_and_verify` for that.
pub fn decode_token(token: &str) -> Result<ClaimSet> {
    parse(token).map(|raw| ClaimSet::from(raw.claims))
}

/// Verify a token signed with `secret_key` and return its claims.
///
/// Checks, in order: structure, the pinned `HS256` algorithm, the HMAC
/// signature, then `nbf`/`iat`/`exp` with `leeway_seconds` of tolerance.
/// A token stays valid until `exp + leeway_seconds`.
pub fn decode_and_verify(token: &str, secret_key: &str, leeway_seconds: u64) -> Result<ClaimSet> {
    decode_and_verify_at(token, secret_key, leeway_seconds, now())
}

/// Same as [`decode_and_verify`] with an explicit "current" timestamp.
pub fn decode_and_verify_at(
    token: &str,
    secret_key: &str,
    leeway_seconds: u64,
    now: i64,
) -> Result<ClaimSet> {
    let raw = parse(token)?;

    if raw.alg.as_deref() != Some(ALGORITHM) {
        let alg = raw.alg.unwrap_or_else(|| "<missing>".to_string());
        tracing::warn!(alg = %alg, "Rejected payment token with unexpected algorithm");
        return Err(MontonioError::UnexpectedAlgorithm(alg));
    }

    let message = format!("{}.{}", raw.header_b64, raw.payload_b64);
    let expected = hmac_sha256(secret_key, message.as_bytes())?;
    let provided = URL_SAFE_NO_PAD.decode(raw.signature_b64).unwrap_or_default();

    // Length is not secret (always 32 bytes for HS256)
    if provided.len() != expected.len() || !bool::from(expected.ct_eq(&provided)) {
        tracing::warn!("Rejected payment token with invalid signature");
        return Err(MontonioError::InvalidSignature);
    }

    let leeway = i64::try_from(leeway_seconds).unwrap_or(i64::MAX);
    check_times(&raw.claims, now, leeway)?;

    Ok(ClaimSet::from(raw.claims))
}

fn numeric_claim(claims: &Map<String, Value>, key: &str) -> Result<Option<f64>> {
    match claims.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_f64()
            .map(Some)
            .ok_or_else(|| MontonioError::malformed(format!("'{}' claim is not numeric", key))),
    }
}

fn check_times(claims: &Map<String, Value>, now: i64, leeway: i64) -> Result<()> {
    let latest_acceptable = now.saturating_add(leeway) as f64;

    for key in ["nbf", "iat"] {
        if let Some(ts) = numeric_claim(claims, key)? {
            if ts > latest_acceptable {
                tracing::debug!(claim = key, "Payment token used before it is valid");
                return Err(MontonioError::TokenNotYetValid);
            }
        }
    }

    if let Some(exp) = numeric_claim(claims, "exp")? {
        if now.saturating_sub(leeway) as f64 > exp {
            tracing::debug!(exp, "Payment token expired");
            return Err(MontonioError::TokenExpired { exp: exp as i64 });
        }
    }

    Ok(())
}
