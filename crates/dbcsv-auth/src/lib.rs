//! # dbcsv-auth
//!
//! Authentication for the dbcsv server.
//!
//! This crate provides:
//! - an [`AccountStore`] read from a JSON accounts file with Argon2 password
//!   hashes
//! - a [`SessionStore`] issuing, verifying and refreshing bearer tokens
//!
//! ## Password Hashing
//!
//! ```rust
//! use dbcsv_auth::{hash_password, verify_password};
//!
//! let hash = hash_password("secret123").expect("hashing works");
//! assert!(verify_password("secret123", &hash));
//! assert!(!verify_password("wrong", &hash));
//! ```
//!
//! ## Sessions
//!
//! ```rust
//! use chrono::Duration;
//! use dbcsv_auth::SessionStore;
//!
//! let sessions = SessionStore::new(Duration::minutes(30));
//! let issued = sessions.issue("johndoe");
//! let session = sessions.verify(&issued.token).expect("fresh token");
//! assert_eq!(session.username, "johndoe");
//! ```

mod accounts;
mod error;
mod password;
mod session;

pub use accounts::{Account, AccountStore};
pub use error::{AuthError, Result};
pub use password::{hash_password, validate_password, verify_password};
pub use session::{IssuedToken, Session, SessionStore};
