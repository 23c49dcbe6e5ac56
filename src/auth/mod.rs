//! Authentication module for the todo server
//!
//! Password hashing, JWT issuance and verification, the bearer-token
//! extractor, and the account HTTP handlers.

pub mod extractor;
pub mod handlers;
pub mod password;
mod service;

pub use extractor::AuthenticatedUser;
pub use service::{AccessToken, AuthService, Claims, Identity};
