//! # Catalog — domain operations over an abstract document store
//!
//! [`Catalog`] is the single data-access layer for the application. It is
//! generic over [`DocumentStore`], so the exact same logic backs the server
//! (PostgreSQL implementation in the `api` crate) and the tests in this
//! module ([`MemoryStore`](crate::MemoryStore)).
//!
//! ## Collections
//!
//! | Operation group | Collection | Notes |
//! |-----------------|-----------|-------|
//! | Entries | `entries` | Immutable; `number` unique per (user, cabinet) |
//! | Profiles | `users` | Keyed by account id; invited profiles carry a generated id until claimed |
//! | Admin grants | `adminGrants` | Audit record written atomically with the initial-admin promotion |
//! | Cabinets | `cabinets` | Keyed by cabinet code |
//!
//! ## Admin source of truth
//!
//! The profile's `isAdmin` flag is authoritative. [`Catalog::claims_for`]
//! derives the claim mapping from it on every call, so the claim and the
//! flag cannot diverge.
//!
//! Timestamps are supplied by the caller (the server passes the current
//! time, tests pass fixed values).

use serde_json::json;

use crate::docstore::{decode, encode, DocumentStore, SortDirection, WriteOp};
use crate::error::StoreError;
use crate::models::{collections, Cabinet, Claims, Entry, UserProfile, UserStatus};

pub struct Catalog<S: DocumentStore> {
    store: S,
}

impl<S: DocumentStore> Catalog<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // ---- entries ----

    /// Entries for one (user, cabinet) pair, newest first.
    pub async fn entries_for(
        &self,
        user_id: &str,
        cabinet_code: &str,
    ) -> Result<Vec<Entry>, StoreError> {
        let rows = self
            .store
            .query(
                collections::ENTRIES,
                vec![
                    ("userId".to_string(), json!(user_id)),
                    ("cabinetId".to_string(), json!(cabinet_code)),
                ],
                "timestamp",
                SortDirection::Descending,
            )
            .await?;
        rows.iter()
            .map(|(id, fields)| decode(collections::ENTRIES, id, fields))
            .collect()
    }

    /// Persist a new entry. Rejects a `number` already recorded for the
    /// same (user, cabinet) scope.
    pub async fn add_entry(
        &self,
        user_id: &str,
        cabinet_code: &str,
        number: &str,
        cab_out: &str,
        block: &str,
        timestamp: i64,
    ) -> Result<Entry, StoreError> {
        let duplicates = self
            .store
            .query(
                collections::ENTRIES,
                vec![
                    ("userId".to_string(), json!(user_id)),
                    ("cabinetId".to_string(), json!(cabinet_code)),
                    ("number".to_string(), json!(number)),
                ],
                "timestamp",
                SortDirection::Descending,
            )
            .await?;
        if !duplicates.is_empty() {
            return Err(StoreError::Conflict(
                "This number already exists.".to_string(),
            ));
        }

        let mut entry = Entry {
            id: String::new(),
            user_id: user_id.to_string(),
            cabinet_code: cabinet_code.to_string(),
            number: number.to_string(),
            cab_out: cab_out.to_string(),
            block: block.to_string(),
            timestamp,
        };
        let fields = encode(&entry)?;
        entry.id = self.store.create(collections::ENTRIES, None, fields).await?;
        Ok(entry)
    }

    // ---- profiles ----

    pub async fn profile(&self, user_id: &str) -> Result<Option<UserProfile>, StoreError> {
        match self.store.read(collections::USERS, user_id).await? {
            Some(fields) => Ok(Some(decode(collections::USERS, user_id, &fields)?)),
            None => Ok(None),
        }
    }

    /// Create the profile document for a freshly registered account.
    pub async fn create_profile(
        &self,
        user_id: &str,
        email: &str,
        created_at: &str,
    ) -> Result<UserProfile, StoreError> {
        let profile = UserProfile {
            id: user_id.to_string(),
            email: email.to_string(),
            is_admin: false,
            role: None,
            status: UserStatus::Active,
            created_at: created_at.to_string(),
        };
        self.store
            .create(collections::USERS, Some(user_id), encode(&profile)?)
            .await?;
        Ok(profile)
    }

    pub async fn list_users(&self) -> Result<Vec<UserProfile>, StoreError> {
        let rows = self
            .store
            .query(
                collections::USERS,
                Vec::new(),
                "email",
                SortDirection::Ascending,
            )
            .await?;
        rows.iter()
            .map(|(id, fields)| decode(collections::USERS, id, fields))
            .collect()
    }

    /// Create an invited profile for an email address. The person gains
    /// access by signing up with that email, which claims the profile; no
    /// credential is ever issued on their behalf.
    pub async fn invite_user(
        &self,
        email: &str,
        created_at: &str,
    ) -> Result<UserProfile, StoreError> {
        let existing = self
            .store
            .query(
                collections::USERS,
                vec![("email".to_string(), json!(email))],
                "email",
                SortDirection::Ascending,
            )
            .await?;
        if !existing.is_empty() {
            return Err(StoreError::Conflict(format!(
                "A profile for {email} already exists."
            )));
        }

        let mut profile = UserProfile {
            id: String::new(),
            email: email.to_string(),
            is_admin: false,
            role: None,
            status: UserStatus::Invited,
            created_at: created_at.to_string(),
        };
        let fields = encode(&profile)?;
        profile.id = self.store.create(collections::USERS, None, fields).await?;
        Ok(profile)
    }

    /// Find an unclaimed invited profile for an email address.
    pub async fn find_invite(&self, email: &str) -> Result<Option<UserProfile>, StoreError> {
        let rows = self
            .store
            .query(
                collections::USERS,
                vec![
                    ("email".to_string(), json!(email)),
                    ("status".to_string(), json!("invited")),
                ],
                "email",
                SortDirection::Ascending,
            )
            .await?;
        match rows.first() {
            Some((id, fields)) => Ok(Some(decode(collections::USERS, id, fields)?)),
            None => Ok(None),
        }
    }

    /// Re-key an invited profile to the account that claimed it. The delete
    /// of the invited document and the creation of the active profile commit
    /// as one batch.
    pub async fn claim_invite(
        &self,
        invite: &UserProfile,
        user_id: &str,
        created_at: &str,
    ) -> Result<UserProfile, StoreError> {
        let profile = UserProfile {
            id: user_id.to_string(),
            email: invite.email.clone(),
            is_admin: false,
            role: None,
            status: UserStatus::Active,
            created_at: created_at.to_string(),
        };
        self.store
            .batch(vec![
                WriteOp::Delete {
                    collection: collections::USERS.to_string(),
                    id: invite.id.clone(),
                },
                WriteOp::Set {
                    collection: collections::USERS.to_string(),
                    id: user_id.to_string(),
                    fields: encode(&profile)?,
                },
            ])
            .await?;
        Ok(profile)
    }

    pub async fn remove_user(&self, user_id: &str) -> Result<(), StoreError> {
        self.store.delete(collections::USERS, user_id).await
    }

    /// Flip the target profile's admin flag. Read-then-write; a failure
    /// between the two surfaces as an error, never a retry.
    pub async fn toggle_admin(&self, user_id: &str) -> Result<UserProfile, StoreError> {
        let mut profile = self
            .profile(user_id)
            .await?
            .ok_or_else(|| StoreError::not_found(collections::USERS, user_id))?;
        profile.is_admin = !profile.is_admin;
        self.store
            .update(
                collections::USERS,
                user_id,
                encode(&json!({ "isAdmin": profile.is_admin }))?,
            )
            .await?;
        Ok(profile)
    }

    pub async fn admin_exists(&self) -> Result<bool, StoreError> {
        let rows = self
            .store
            .query(
                collections::USERS,
                vec![
                    ("isAdmin".to_string(), json!(true)),
                    ("role".to_string(), json!("admin")),
                ],
                "email",
                SortDirection::Ascending,
            )
            .await?;
        Ok(!rows.is_empty())
    }

    /// Promote the first user: profile update and the audit grant document
    /// must both succeed or both fail.
    pub async fn setup_initial_admin(
        &self,
        user_id: &str,
        granted_at: &str,
    ) -> Result<(), StoreError> {
        if self.profile(user_id).await?.is_none() {
            return Err(StoreError::not_found(collections::USERS, user_id));
        }

        let patch = encode(&json!({ "isAdmin": true, "role": "admin" }))?;
        let grant = encode(&json!({ "isAdmin": true, "createdAt": granted_at }))?;
        self.store
            .batch(vec![
                WriteOp::Update {
                    collection: collections::USERS.to_string(),
                    id: user_id.to_string(),
                    patch,
                },
                WriteOp::Set {
                    collection: collections::ADMIN_GRANTS.to_string(),
                    id: user_id.to_string(),
                    fields: grant,
                },
            ])
            .await
    }

    /// Claim mapping for an identity, derived from the profile flag.
    pub async fn claims_for(&self, user_id: &str) -> Result<Claims, StoreError> {
        let profile = self.profile(user_id).await?;
        Ok(match profile {
            Some(profile) if profile.is_admin => Claims::admin(),
            _ => Claims::default(),
        })
    }

    // ---- cabinets ----

    pub async fn list_cabinets(&self) -> Result<Vec<Cabinet>, StoreError> {
        let rows = self
            .store
            .query(
                collections::CABINETS,
                Vec::new(),
                "code",
                SortDirection::Ascending,
            )
            .await?;
        rows.iter()
            .map(|(id, fields)| decode(collections::CABINETS, id, fields))
            .collect()
    }

    pub async fn add_cabinet(&self, code: &str, kind: &str) -> Result<Cabinet, StoreError> {
        let cabinet = Cabinet {
            code: code.to_string(),
            kind: kind.to_string(),
        };
        self.store
            .create(collections::CABINETS, Some(code), encode(&cabinet)?)
            .await?;
        Ok(cabinet)
    }

    pub async fn remove_cabinet(&self, code: &str) -> Result<(), StoreError> {
        self.store.delete(collections::CABINETS, code).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;

    fn catalog() -> Catalog<MemoryStore> {
        Catalog::new(MemoryStore::new())
    }

    const T0: &str = "2024-01-01T00:00:00Z";

    #[tokio::test]
    async fn entries_are_scoped_and_newest_first() {
        let catalog = catalog();
        catalog
            .add_entry("u1", "03-3-20-53", "100", "50", "10", 1_000)
            .await
            .unwrap();
        catalog
            .add_entry("u1", "03-3-20-53", "200", "60", "11", 3_000)
            .await
            .unwrap();
        catalog
            .add_entry("u1", "03-3-20-52", "300", "70", "12", 2_000)
            .await
            .unwrap();
        catalog
            .add_entry("u2", "03-3-20-53", "400", "80", "13", 4_000)
            .await
            .unwrap();

        let entries = catalog.entries_for("u1", "03-3-20-53").await.unwrap();
        let numbers: Vec<&str> = entries.iter().map(|e| e.number.as_str()).collect();
        assert_eq!(numbers, ["200", "100"]);
    }

    #[tokio::test]
    async fn duplicate_number_in_scope_is_rejected() {
        let catalog = catalog();
        catalog
            .add_entry("u1", "03-3-20-53", "123", "50", "10", 1_000)
            .await
            .unwrap();

        let err = catalog
            .add_entry("u1", "03-3-20-53", "123", "60", "11", 2_000)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));

        // The same number is fine in a different cabinet or for another user.
        catalog
            .add_entry("u1", "03-3-20-52", "123", "60", "11", 2_000)
            .await
            .unwrap();
        catalog
            .add_entry("u2", "03-3-20-53", "123", "60", "11", 2_000)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn invite_then_claim_rekeys_the_profile() {
        let catalog = catalog();
        let invite = catalog.invite_user("new@example.com", T0).await.unwrap();
        assert_eq!(invite.status, UserStatus::Invited);
        assert_eq!(catalog.list_users().await.unwrap().len(), 1);

        // A second invite for the same email is rejected.
        let err = catalog
            .invite_user("new@example.com", T0)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));

        let found = catalog.find_invite("new@example.com").await.unwrap().unwrap();
        assert_eq!(found.id, invite.id);

        let claimed = catalog.claim_invite(&found, "acct-1", T0).await.unwrap();
        assert_eq!(claimed.status, UserStatus::Active);

        let users = catalog.list_users().await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].id, "acct-1");
        assert!(catalog
            .find_invite("new@example.com")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn toggle_admin_flips_and_persists() {
        let catalog = catalog();
        catalog.create_profile("u1", "a@example.com", T0).await.unwrap();

        let toggled = catalog.toggle_admin("u1").await.unwrap();
        assert!(toggled.is_admin);
        assert!(catalog.profile("u1").await.unwrap().unwrap().is_admin);

        let toggled = catalog.toggle_admin("u1").await.unwrap();
        assert!(!toggled.is_admin);

        let err = catalog.toggle_admin("nobody").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn initial_admin_promotion_is_atomic() {
        let catalog = catalog();
        assert!(!catalog.admin_exists().await.unwrap());

        // Promotion of a missing profile writes nothing, including no grant.
        let err = catalog.setup_initial_admin("ghost", T0).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
        assert!(catalog
            .store()
            .read(collections::ADMIN_GRANTS, "ghost")
            .await
            .unwrap()
            .is_none());

        catalog.create_profile("u1", "a@example.com", T0).await.unwrap();
        catalog.setup_initial_admin("u1", T0).await.unwrap();

        assert!(catalog.admin_exists().await.unwrap());
        let profile = catalog.profile("u1").await.unwrap().unwrap();
        assert!(profile.is_admin);
        assert_eq!(profile.role.as_deref(), Some("admin"));
        assert!(catalog
            .store()
            .read(collections::ADMIN_GRANTS, "u1")
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn claims_follow_the_profile_flag() {
        let catalog = catalog();
        assert!(!catalog.claims_for("nobody").await.unwrap().is_admin());

        catalog.create_profile("u1", "a@example.com", T0).await.unwrap();
        assert!(!catalog.claims_for("u1").await.unwrap().is_admin());

        catalog.setup_initial_admin("u1", T0).await.unwrap();
        assert!(catalog.claims_for("u1").await.unwrap().is_admin());
    }

    #[tokio::test]
    async fn cabinet_roster_round_trip() {
        let catalog = catalog();
        catalog.add_cabinet("03-3-20-53", "Huawei").await.unwrap();
        catalog.add_cabinet("03-3-20-32", "Huawei").await.unwrap();

        let codes: Vec<String> = catalog
            .list_cabinets()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.code)
            .collect();
        assert_eq!(codes, ["03-3-20-32", "03-3-20-53"]);

        catalog.remove_cabinet("03-3-20-53").await.unwrap();
        assert_eq!(catalog.list_cabinets().await.unwrap().len(), 1);
    }
}
