//! Credential primitives for the account service.
//!
//! - Password hashing (Argon2id, salted PHC strings)
//! - JWT encoding and validation
//! - Access/refresh token issuance with separate signing keys
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! let is_valid = hasher.verify("my_password", &hash).unwrap();
//! assert!(is_valid);
//! ```
//!
//! ## Session Tokens
//! ```
//! use auth::{TokenIssuer, TokenSubject};
//! use chrono::Duration;
//!
//! let issuer = TokenIssuer::new(
//!     b"access_secret_key_at_least_32_bytes!",
//!     Duration::hours(1),
//!     b"refresh_secret_key_at_least_32_bytes",
//!     Duration::days(10),
//! )
//! .unwrap();
//!
//! let subject = TokenSubject {
//!     id: "user123".to_string(),
//!     email: "alice@example.com".to_string(),
//!     username: "alice".to_string(),
//!     full_name: "Alice Liddell".to_string(),
//! };
//!
//! let access_token = issuer.issue_access_token(&subject).unwrap();
//! let refresh_token = issuer.issue_refresh_token(&subject.id).unwrap();
//!
//! assert_eq!(issuer.verify_access_token(&access_token).unwrap().username, "alice");
//! assert_eq!(issuer.verify_refresh_token(&refresh_token).unwrap().sub, "user123");
//! ```

pub mod issuer;
pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use issuer::TokenIssuer;
pub use jwt::AccessClaims;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use jwt::RefreshClaims;
pub use jwt::TokenSubject;
pub use password::PasswordError;
pub use password::PasswordHasher;
