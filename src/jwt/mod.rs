mod claims;
mod signing;
mod verify;

pub use claims::*;
pub use signing::{issue_bearer_credential, sign, SignedToken, ALGORITHM};
pub use verify::{decode_and_verify, decode_and_verify_at, decode_token, now, DEFAULT_LEEWAY_SECONDS};
