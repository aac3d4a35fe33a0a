//! Credential model: the bearer access token, its issuance instant, and redacted secrets.

pub mod credential;
pub mod secret;

pub use credential::*;
pub use secret::*;
