//! # Domain models
//!
//! The document shapes stored in the backend collections, plus the client-safe
//! [`UserInfo`] projection that crosses the server/client boundary via server
//! functions. Field names follow the wire convention of the document store
//! (camelCase), so every struct uses explicit serde renames.
//!
//! | Type | Collection |
//! |------|-----------|
//! | [`UserProfile`] | `users` |
//! | [`Cabinet`] | `cabinets` |
//! | [`Entry`] | `entries` |
//! | [`Claims`] | derived from `users`, never stored |

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Collection names used across the application.
pub mod collections {
    pub const USERS: &str = "users";
    pub const CABINETS: &str = "cabinets";
    pub const ENTRIES: &str = "entries";
    pub const ADMIN_GRANTS: &str = "adminGrants";
}

/// Authenticated identity, safe to send to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: String,
    pub email: String,
}

/// Lifecycle of a profile document.
///
/// `Invited` profiles are created by an admin before the person has an
/// account; signing up with the matching email claims the profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Active,
    Invited,
}

impl Default for UserStatus {
    fn default() -> Self {
        Self::Active
    }
}

/// The application's own record about a user, stored in the `users`
/// collection and keyed by the account id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub id: String,
    pub email: String,
    #[serde(rename = "isAdmin", default)]
    pub is_admin: bool,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub status: UserStatus,
    #[serde(rename = "createdAt", default)]
    pub created_at: String,
}

/// A physical cabinet, keyed in the `cabinets` collection by its code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cabinet {
    pub code: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

/// A single immutable data-entry record, scoped to one (user, cabinet) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "cabinetId")]
    pub cabinet_code: String,
    pub number: String,
    #[serde(rename = "cabOut")]
    pub cab_out: String,
    pub block: String,
    /// Creation time in epoch milliseconds.
    pub timestamp: i64,
}

/// Authorization assertions attached to an authenticated identity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Claims(pub BTreeMap<String, Value>);

impl Claims {
    pub const ADMIN: &'static str = "admin";

    /// Claims carrying the admin assertion.
    pub fn admin() -> Self {
        let mut map = BTreeMap::new();
        map.insert(Self::ADMIN.to_string(), Value::Bool(true));
        Self(map)
    }

    /// Whether the admin claim is present and truthy.
    pub fn is_admin(&self) -> bool {
        matches!(self.0.get(Self::ADMIN), Some(Value::Bool(true)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_claim_is_truthy_only_when_set() {
        assert!(Claims::admin().is_admin());
        assert!(!Claims::default().is_admin());

        let mut map = BTreeMap::new();
        map.insert(Claims::ADMIN.to_string(), Value::Bool(false));
        assert!(!Claims(map).is_admin());
    }

    #[test]
    fn entry_round_trips_through_wire_names() {
        let entry = Entry {
            id: "e1".to_string(),
            user_id: "u1".to_string(),
            cabinet_code: "03-3-20-53".to_string(),
            number: "123".to_string(),
            cab_out: "50".to_string(),
            block: "10".to_string(),
            timestamp: 1_700_000_000_000,
        };
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["cabinetId"], "03-3-20-53");
        assert_eq!(value["cabOut"], "50");
        let back: Entry = serde_json::from_value(value).unwrap();
        assert_eq!(back, entry);
    }
}
