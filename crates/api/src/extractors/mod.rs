//! Custom Axum extractors.
//!
//! Extractors for authenticating callers and parsing request bodies.

pub mod user_auth;
pub mod validated_json;

pub use user_auth::UserAuth;
pub use validated_json::ValidatedJson;
