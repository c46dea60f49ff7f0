//! Canonical claim sets for payment tokens
//!
//! Merchant input arrives as a loose key/value mapping. Building a payload
//! validates every required key up front, coerces each value to the type the
//! Montonio API expects, injects the access key (and `loan_type` for financing
//! products), drops empty values and stamps a 10 minute `exp`.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::ProductVariant;
use crate::config::Credentials;
use crate::error::{MontonioError, Result};
use crate::jwt::{now, ClaimSet};

/// Lifetime of a freshly built payment token
pub const PAYMENT_TOKEN_TTL_SECONDS: i64 = 10 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    Float,
    Integer,
    Text,
    Products,
}

#[derive(Debug, Clone, Copy)]
enum Source {
    LoanType,
    AccessKey,
    Input { kind: FieldKind, required: bool },
}

struct Field {
    name: &'static str,
    source: Source,
}

const fn required(name: &'static str, kind: FieldKind) -> Field {
    Field {
        name,
        source: Source::Input { kind, required: true },
    }
}

const fn optional(name: &'static str) -> Field {
    Field {
        name,
        source: Source::Input {
            kind: FieldKind::Text,
            required: false,
        },
    }
}

// Claim order matters for byte-identical tokens across integrations.
const DIRECT_PAYMENT_FIELDS: &[Field] = &[
    required("amount", FieldKind::Float),
    Field { name: "access_key", source: Source::AccessKey },
    required("currency", FieldKind::Text),
    required("merchant_name", FieldKind::Text),
    required("merchant_reference", FieldKind::Text),
    required("merchant_return_url", FieldKind::Text),
    required("checkout_email", FieldKind::Text),
    required("checkout_first_name", FieldKind::Text),
    required("checkout_last_name", FieldKind::Text),
    required("checkout_phone_number", FieldKind::Text),
    optional("merchant_notification_url"),
    optional("preselected_aspsp"),
    optional("preselected_locale"),
    optional("preselected_country"),
];

const FINANCING_FIELDS: &[Field] = &[
    Field { name: "loan_type", source: Source::LoanType },
    Field { name: "access_key", source: Source::AccessKey },
    required("currency", FieldKind::Text),
    required("merchant_name", FieldKind::Text),
    required("merchant_reference", FieldKind::Text),
    required("merchant_return_url", FieldKind::Text),
    required("checkout_email", FieldKind::Text),
    required("checkout_first_name", FieldKind::Text),
    required("checkout_last_name", FieldKind::Text),
    required("checkout_phone_number", FieldKind::Text),
    required("checkout_city", FieldKind::Text),
    required("checkout_address", FieldKind::Text),
    required("checkout_postal_code", FieldKind::Text),
    required("preselected_loan_period", FieldKind::Integer),
    required("checkout_products", FieldKind::Products),
    optional("merchant_notification_url"),
    optional("preselected_locale"),
];

fn fields_for(variant: ProductVariant) -> &'static [Field] {
    if variant.is_financing() {
        FINANCING_FIELDS
    } else {
        DIRECT_PAYMENT_FIELDS
    }
}

/// Input keys the merchant must supply for `variant`, in claim order.
pub fn required_fields(variant: ProductVariant) -> Vec<&'static str> {
    fields_for(variant)
        .iter()
        .filter(|f| matches!(f.source, Source::Input { required: true, .. }))
        .map(|f| f.name)
        .collect()
}

/// Loosely-typed payment data as supplied by merchant code.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawPaymentInput(Map<String, Value>);

impl RawPaymentInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.shift_remove(key)
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for RawPaymentInput {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// One entry of `checkout_products` for financing applications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductLineItem {
    pub product_name: String,
    pub product_price: f64,
    pub quantity: i64,
}

impl ProductLineItem {
    pub fn new(product_name: impl Into<String>, product_price: f64, quantity: i64) -> Self {
        Self {
            product_name: product_name.into(),
            product_price,
            quantity,
        }
    }

    fn coerce(path: &str, value: &Value) -> Result<Self> {
        let item = value
            .as_object()
            .ok_or_else(|| MontonioError::invalid_type(path, "a product object"))?;

        let (name, v) = sub_field(item, path, "product_name")?;
        let product_name = coerce_text(&name, v)?;
        let (name, v) = sub_field(item, path, "product_price")?;
        let product_price = coerce_float(&name, v)?;
        let (name, v) = sub_field(item, path, "quantity")?;
        let quantity = coerce_integer(&name, v)?;

        Ok(Self {
            product_name,
            product_price,
            quantity,
        })
    }
}

impl From<ProductLineItem> for Value {
    fn from(item: ProductLineItem) -> Self {
        json!({
            "product_name": item.product_name,
            "product_price": item.product_price,
            "quantity": item.quantity,
        })
    }
}

/// Typed input for a direct (bank-link / card) payment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentData {
    pub amount: f64,
    pub currency: String,
    pub merchant_name: String,
    pub merchant_reference: String,
    pub merchant_return_url: String,
    pub checkout_email: String,
    pub checkout_first_name: String,
    pub checkout_last_name: String,
    pub checkout_phone_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant_notification_url: Option<String>,
    /// Bank BIC (or `CARD`) to skip the bank selection step
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preselected_aspsp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preselected_locale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preselected_country: Option<String>,
}

impl From<PaymentData> for RawPaymentInput {
    fn from(d: PaymentData) -> Self {
        let mut input = RawPaymentInput::new();
        input
            .set("amount", d.amount)
            .set("currency", d.currency)
            .set("merchant_name", d.merchant_name)
            .set("merchant_reference", d.merchant_reference)
            .set("merchant_return_url", d.merchant_return_url)
            .set("checkout_email", d.checkout_email)
            .set("checkout_first_name", d.checkout_first_name)
            .set("checkout_last_name", d.checkout_last_name)
            .set("checkout_phone_number", d.checkout_phone_number)
            .set("merchant_notification_url", d.merchant_notification_url)
            .set("preselected_aspsp", d.preselected_aspsp)
            .set("preselected_locale", d.preselected_locale)
            .set("preselected_country", d.preselected_country);
        input
    }
}

/// Typed input for a hire-purchase or Slice financing application.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancingData {
    pub currency: String,
    pub merchant_name: String,
    pub merchant_reference: String,
    pub merchant_return_url: String,
    pub checkout_email: String,
    pub checkout_first_name: String,
    pub checkout_last_name: String,
    pub checkout_phone_number: String,
    pub checkout_city: String,
    pub checkout_address: String,
    pub checkout_postal_code: String,
    /// Loan period in months
    pub preselected_loan_period: i64,
    pub checkout_products: Vec<ProductLineItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant_notification_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preselected_locale: Option<String>,
}

impl From<FinancingData> for RawPaymentInput {
    fn from(d: FinancingData) -> Self {
        let products: Vec<Value> = d.checkout_products.into_iter().map(Value::from).collect();

        let mut input = RawPaymentInput::new();
        input
            .set("currency", d.currency)
            .set("merchant_name", d.merchant_name)
            .set("merchant_reference", d.merchant_reference)
            .set("merchant_return_url", d.merchant_return_url)
            .set("checkout_email", d.checkout_email)
            .set("checkout_first_name", d.checkout_first_name)
            .set("checkout_last_name", d.checkout_last_name)
            .set("checkout_phone_number", d.checkout_phone_number)
            .set("checkout_city", d.checkout_city)
            .set("checkout_address", d.checkout_address)
            .set("checkout_postal_code", d.checkout_postal_code)
            .set("preselected_loan_period", d.preselected_loan_period)
            .set("checkout_products", products)
            .set("merchant_notification_url", d.merchant_notification_url)
            .set("preselected_locale", d.preselected_locale);
        input
    }
}

fn sub_field<'a>(
    item: &'a Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<(String, &'a Value)> {
    let name = format!("{}.{}", path, key);
    match item.get(key) {
        None | Some(Value::Null) => Err(MontonioError::missing(vec![name])),
        Some(v) => Ok((name, v)),
    }
}

fn is_missing(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

fn coerce_float(field: &str, value: &Value) -> Result<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    parsed
        .filter(|f| f.is_finite())
        .ok_or_else(|| MontonioError::invalid_type(field, "a number"))
}

fn coerce_integer(field: &str, value: &Value) -> Result<i64> {
    // Largest magnitude an f64 holds without losing integer precision
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0;

    let parsed = match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() <= MAX_EXACT)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };

    parsed.ok_or_else(|| MontonioError::invalid_type(field, "an integer"))
}

fn coerce_text(field: &str, value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(true) => Ok("1".to_string()),
        Value::Bool(false) => Ok(String::new()),
        _ => Err(MontonioError::invalid_type(field, "a string")),
    }
}

fn coerce_products(field: &str, value: &Value) -> Result<Value> {
    let items = value
        .as_array()
        .ok_or_else(|| MontonioError::invalid_type(field, "an array of products"))?;

    let products = items
        .iter()
        .enumerate()
        .map(|(i, item)| ProductLineItem::coerce(&format!("{}[{}]", field, i), item).map(Value::from))
        .collect::<Result<Vec<Value>>>()?;

    Ok(Value::Array(products))
}

fn coerce(field: &str, kind: FieldKind, value: &Value) -> Result<Value> {
    Ok(match kind {
        FieldKind::Float => Value::from(coerce_float(field, value)?),
        FieldKind::Integer => Value::from(coerce_integer(field, value)?),
        FieldKind::Text => Value::from(coerce_text(field, value)?),
        FieldKind::Products => coerce_products(field, value)?,
    })
}

/// Build the canonical claim set for `variant`, expiring 10 minutes from now.
pub fn build_claims(
    input: &RawPaymentInput,
    variant: ProductVariant,
    credentials: &Credentials,
) -> Result<ClaimSet> {
    build_claims_at(input, variant, credentials, now())
}

/// Build the canonical claim set with an explicit "current" timestamp.
pub fn build_claims_at(
    input: &RawPaymentInput,
    variant: ProductVariant,
    credentials: &Credentials,
    now: i64,
) -> Result<ClaimSet> {
    let fields = fields_for(variant);

    let missing: Vec<String> = fields
        .iter()
        .filter(|f| matches!(f.source, Source::Input { required: true, .. }))
        .filter(|f| is_missing(input.get(f.name)))
        .map(|f| f.name.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(MontonioError::missing(missing));
    }

    let mut claims = ClaimSet::new();
    for field in fields {
        match field.source {
            Source::LoanType => {
                if let Some(loan_type) = variant.loan_type() {
                    claims.insert(field.name, loan_type);
                }
            }
            Source::AccessKey => {
                claims.insert(field.name, credentials.access_key());
            }
            Source::Input { kind, .. } => match input.get(field.name) {
                None | Some(Value::Null) => {}
                Some(value) => {
                    claims.insert(field.name, coerce(field.name, kind, value)?);
                }
            },
        }
    }

    // Zero amounts, empty strings and empty product lists are all dropped,
    // matching what the Montonio API has always received.
    claims.prune_empty();
    claims.insert("exp", now + PAYMENT_TOKEN_TTL_SECONDS);

    Ok(claims)
}
