mod bank_list;
mod payload;
mod urls;

pub use bank_list::*;
#[cfg(feature = "blocking")]
pub(crate) use bank_list::{bank_list_request_with_base, USER_AGENT};
pub use payload::*;
pub use urls::*;

/// Montonio product a payment token is issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProductVariant {
    /// Bank-link / card payment (Montonio Payments)
    DirectPayment,
    /// Classic hire-purchase financing
    HirePurchaseFinancing,
    /// Slice ("pay later in parts") financing
    SliceFinancing,
}

impl ProductVariant {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "payment" | "payments" | "direct_payment" => Some(ProductVariant::DirectPayment),
            "hire_purchase" | "financing" => Some(ProductVariant::HirePurchaseFinancing),
            "slice" => Some(ProductVariant::SliceFinancing),
            _ => None,
        }
    }

    /// Value of the `loan_type` claim. Direct payments carry none.
    pub fn loan_type(self) -> Option<&'static str> {
        match self {
            ProductVariant::DirectPayment => None,
            ProductVariant::HirePurchaseFinancing => Some("hire_purchase"),
            ProductVariant::SliceFinancing => Some("slice"),
        }
    }

    pub fn is_financing(self) -> bool {
        self.loan_type().is_some()
    }
}
