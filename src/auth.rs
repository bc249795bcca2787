//! Credential models: redacted token secrets, login input, and token-bearing payloads.

pub mod credentials;
pub mod secret;

pub use credentials::*;
pub use secret::*;
