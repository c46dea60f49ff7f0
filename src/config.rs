use std::env;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{MontonioError, Result};

pub const ACCESS_KEY_VAR: &str = "MONTONIO_ACCESS_KEY";
pub const SECRET_KEY_VAR: &str = "MONTONIO_SECRET_KEY";
pub const ENVIRONMENT_VAR: &str = "MONTONIO_ENVIRONMENT";

/// Montonio environment. Selects the host of every URL the SDK produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Production,
    Sandbox,
}

impl Environment {
    pub fn is_sandbox(self) -> bool {
        self == Environment::Sandbox
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Production => write!(f, "production"),
            Self::Sandbox => write!(f, "sandbox"),
        }
    }
}

impl FromStr for Environment {
    type Err = MontonioError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "production" => Ok(Environment::Production),
            "sandbox" => Ok(Environment::Sandbox),
            other => Err(MontonioError::InvalidConfig(format!(
                "unknown environment '{}' (expected 'production' or 'sandbox')",
                other
            ))),
        }
    }
}

/// Merchant credentials for one SDK instance. Immutable once built.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    access_key: String,
    secret_key: String,
    environment: Environment,
}

impl Credentials {
    pub fn new(
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
        environment: Environment,
    ) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            environment,
        }
    }

    /// Load credentials from the process environment (and `.env`, if present).
    ///
    /// `MONTONIO_ACCESS_KEY` and `MONTONIO_SECRET_KEY` are required;
    /// `MONTONIO_ENVIRONMENT` defaults to `sandbox`.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> Result<String> {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| MontonioError::InvalidConfig(format!("{} is not set", key)))
        };

        let access_key = required(ACCESS_KEY_VAR)?;
        let secret_key = required(SECRET_KEY_VAR)?;
        let environment = match lookup(ENVIRONMENT_VAR) {
            Some(v) if !v.trim().is_empty() => v.parse()?,
            _ => Environment::Sandbox,
        };

        Ok(Self::new(access_key, secret_key, environment))
    }

    pub fn access_key(&self) -> &str {
        &self.access_key
    }

    pub fn secret_key(&self) -> &str {
        &self.secret_key
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("environment", &self.environment)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_environment_parse() {
        assert_eq!("sandbox".parse::<Environment>().unwrap(), Environment::Sandbox);
        assert_eq!(" Production ".parse::<Environment>().unwrap(), Environment::Production);
        assert!("staging".parse::<Environment>().is_err());
        assert_eq!(Environment::Sandbox.to_string(), "sandbox");
    }

    #[test]
    fn test_from_lookup_defaults_to_sandbox() {
        let creds = Credentials::from_lookup(lookup(&[
            (ACCESS_KEY_VAR, "ak_1"),
            (SECRET_KEY_VAR, "sk_1"),
        ]))
        .unwrap();

        assert_eq!(creds.access_key(), "ak_1");
        assert_eq!(creds.secret_key(), "sk_1");
        assert_eq!(creds.environment(), Environment::Sandbox);
    }

    #[test]
    fn test_from_lookup_reads_environment() {
        let creds = Credentials::from_lookup(lookup(&[
            (ACCESS_KEY_VAR, "ak_1"),
            (SECRET_KEY_VAR, "sk_1"),
            (ENVIRONMENT_VAR, "production"),
        ]))
        .unwrap();
        assert_eq!(creds.environment(), Environment::Production);
    }

    #[test]
    fn test_from_lookup_requires_secret() {
        let err = Credentials::from_lookup(lookup(&[
            (ACCESS_KEY_VAR, "ak_1"),
            (SECRET_KEY_VAR, "   "),
        ]))
        .unwrap_err();
        assert!(matches!(err, MontonioError::InvalidConfig(msg) if msg.contains(SECRET_KEY_VAR)));
    }

    #[test]
    fn test_from_lookup_rejects_unknown_environment() {
        let result = Credentials::from_lookup(lookup(&[
            (ACCESS_KEY_VAR, "ak_1"),
            (SECRET_KEY_VAR, "sk_1"),
            (ENVIRONMENT_VAR, "live"),
        ]));
        assert!(matches!(result, Err(MontonioError::InvalidConfig(_))));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let creds = Credentials::new("ak_1", "super-secret", Environment::Sandbox);
        let debug = format!("{:?}", creds);
        assert!(debug.contains("ak_1"));
        assert!(!debug.contains("super-secret"));
    }
}
