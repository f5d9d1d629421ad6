//! Authentication account rows and their client-safe projection.

#[cfg(feature = "server")]
use store::UserInfo;

/// A row in the `accounts` table. Server-only: the password hash must never
/// cross the wire.
#[cfg(feature = "server")]
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Account {
    pub id: uuid::Uuid,
    pub email: String,
    pub password_hash: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[cfg(feature = "server")]
impl Account {
    /// Projection safe to send to the client.
    pub fn to_info(&self) -> UserInfo {
        UserInfo {
            id: self.id.to_string(),
            email: self.email.clone(),
        }
    }
}
