//! Email + password authentication support.
//!
//! Accounts live in the `accounts` table, separate from the application's
//! profile documents: the table is the authentication provider's record,
//! the `users` collection is ours. Passwords are hashed with Argon2id and
//! stored as PHC-format strings; the logged-in account id is kept in the
//! tower-sessions session under [`SESSION_USER_ID_KEY`].

#[cfg(feature = "server")]
mod password;

#[cfg(feature = "server")]
pub use password::{hash_password, verify_password};

/// Key for storing the account id in the session.
pub const SESSION_USER_ID_KEY: &str = "user_id";
