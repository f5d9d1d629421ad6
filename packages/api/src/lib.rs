//! # API crate — shared fullstack server functions for CabTrack
//!
//! Every frontend call lands here. The crate defines the Dioxus server
//! functions plus the supporting modules they depend on.
//!
//! ## Modules
//!
//! | Module | Feature gate | Purpose |
//! |--------|-------------|---------|
//! | [`auth`] | — | Password hashing (Argon2) and the session key for the signed-in account |
//! | [`db`] | `server` | PostgreSQL connection pool (lazy `OnceCell` singleton) and the jsonb document store |
//! | [`models`] | `server` | The `accounts` row and its client-safe projection |
//!
//! ## Server functions exposed here
//!
//! Every public `async fn` in this file is a Dioxus server function, annotated with
//! `#[get(...)]` or `#[post(...)]` and compiled twice: once with full server logic
//! (behind `#[cfg(feature = "server")]`) and once as a thin client stub that simply
//! forwards the call over HTTP.
//!
//! - **Authentication**: `get_current_user`, `register`, `login`, `logout`, `get_claims`
//! - **Entries**: `list_entries`, `create_entry`
//! - **Cabinets**: `list_cabinets`
//! - **Administration**: `list_users`, `invite_user`, `remove_user`, `toggle_admin`,
//!   `add_cabinet`, `remove_cabinet`

use dioxus::prelude::*;
use serde::{Deserialize, Serialize};

pub mod auth;
pub mod db;
pub mod models;

pub use store::{Cabinet, Claims, Entry, UserInfo, UserProfile, UserStatus};

pub use store::ServiceConfig;

/// What `register` hands back: the signed-in identity plus whether this
/// signup promoted the very first administrator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegisterOutcome {
    pub user: UserInfo,
    pub initial_admin: bool,
}

/// Build the domain layer over the shared pool.
#[cfg(feature = "server")]
async fn catalog() -> Result<store::Catalog<db::PgStore>, ServerFnError> {
    let pool = db::get_pool()
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;
    Ok(store::Catalog::new(db::PgStore::new(pool.clone())))
}

/// The signed-in account id, or an error for anonymous callers.
#[cfg(feature = "server")]
async fn session_user_id(session: &tower_sessions::Session) -> Result<String, ServerFnError> {
    let user_id: Option<String> = session
        .get(auth::SESSION_USER_ID_KEY)
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;

    user_id.ok_or_else(|| ServerFnError::new("Not authenticated"))
}

/// The signed-in account id, verified against the profile's admin flag.
#[cfg(feature = "server")]
async fn require_admin(session: &tower_sessions::Session) -> Result<String, ServerFnError> {
    let user_id = session_user_id(session).await?;
    let claims = catalog()
        .await?
        .claims_for(&user_id)
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;

    if !claims.is_admin() {
        return Err(ServerFnError::new("Admin access required"));
    }
    Ok(user_id)
}

/// Get the current authenticated user from the session.
#[cfg(feature = "server")]
#[get("/api/auth/me", session: tower_sessions::Session)]
pub async fn get_current_user() -> Result<Option<UserInfo>, ServerFnError> {
    use crate::db::get_pool;
    use crate::models::Account;

    let user_id: Option<String> = session
        .get(auth::SESSION_USER_ID_KEY)
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;

    let Some(user_id) = user_id else {
        return Ok(None);
    };

    let pool = get_pool()
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;

    let user_uuid = uuid::Uuid::parse_str(&user_id)
        .map_err(|e| ServerFnError::new(e.to_string()))?;

    let account: Option<Account> = sqlx::query_as("SELECT * FROM accounts WHERE id = $1")
        .bind(user_uuid)
        .fetch_optional(pool)
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;

    Ok(account.map(|a| a.to_info()))
}

#[cfg(not(feature = "server"))]
#[get("/api/auth/me")]
pub async fn get_current_user() -> Result<Option<UserInfo>, ServerFnError> {
    Ok(None)
}

/// Register with email and password. Claims a pending invite if one exists,
/// and promotes the very first account to administrator.
#[cfg(feature = "server")]
#[post("/api/auth/register", session: tower_sessions::Session)]
pub async fn register(email: String, password: String) -> Result<RegisterOutcome, ServerFnError> {
    use crate::db::get_pool;
    use crate::models::Account;

    let email = email.trim().to_lowercase();

    if email.is_empty() || !email.contains('@') {
        return Err(ServerFnError::new("Invalid email address"));
    }
    if password.len() < 6 {
        return Err(ServerFnError::new(
            "Password must be at least 6 characters",
        ));
    }

    let pool = get_pool()
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;

    let existing: Option<Account> = sqlx::query_as("SELECT * FROM accounts WHERE email = $1")
        .bind(&email)
        .fetch_optional(pool)
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;

    if existing.is_some() {
        return Err(ServerFnError::new(
            "An account with this email already exists",
        ));
    }

    let password_hash = auth::hash_password(&password).map_err(ServerFnError::new)?;

    let account: Account = sqlx::query_as(
        "INSERT INTO accounts (email, password_hash) VALUES ($1, $2) RETURNING *",
    )
    .bind(&email)
    .bind(&password_hash)
    .fetch_one(pool)
    .await
    .map_err(|e| ServerFnError::new(e.to_string()))?;

    let catalog = catalog().await?;
    let user_id = account.id.to_string();
    let now = chrono::Utc::now().to_rfc3339();

    // An invited profile for this email becomes the account's profile;
    // otherwise a fresh one is created.
    let invite = catalog
        .find_invite(&email)
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;
    match invite {
        Some(invite) => {
            catalog
                .claim_invite(&invite, &user_id, &now)
                .await
                .map_err(|e| ServerFnError::new(e.to_string()))?;
        }
        None => {
            catalog
                .create_profile(&user_id, &email, &now)
                .await
                .map_err(|e| ServerFnError::new(e.to_string()))?;
        }
    }

    let mut initial_admin = false;
    let admin_exists = catalog
        .admin_exists()
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;
    if !admin_exists {
        catalog
            .setup_initial_admin(&user_id, &now)
            .await
            .map_err(|e| ServerFnError::new(e.to_string()))?;
        tracing::info!(%email, "promoted first registered user to admin");
        initial_admin = true;
    }

    session
        .insert(auth::SESSION_USER_ID_KEY, user_id)
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;

    Ok(RegisterOutcome {
        user: account.to_info(),
        initial_admin,
    })
}

#[cfg(not(feature = "server"))]
#[post("/api/auth/register")]
pub async fn register(email: String, password: String) -> Result<RegisterOutcome, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

/// Log in with email and password.
#[cfg(feature = "server")]
#[post("/api/auth/login", session: tower_sessions::Session)]
pub async fn login(email: String, password: String) -> Result<UserInfo, ServerFnError> {
    use crate::db::get_pool;
    use crate::models::Account;

    let email = email.trim().to_lowercase();

    let pool = get_pool()
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;

    let account: Option<Account> = sqlx::query_as("SELECT * FROM accounts WHERE email = $1")
        .bind(&email)
        .fetch_optional(pool)
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;

    let Some(account) = account else {
        return Err(ServerFnError::new("Invalid email or password"));
    };

    let valid =
        auth::verify_password(&password, &account.password_hash).map_err(ServerFnError::new)?;

    if !valid {
        return Err(ServerFnError::new("Invalid email or password"));
    }

    session
        .insert(auth::SESSION_USER_ID_KEY, account.id.to_string())
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;

    Ok(account.to_info())
}

#[cfg(not(feature = "server"))]
#[post("/api/auth/login")]
pub async fn login(email: String, password: String) -> Result<UserInfo, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

/// Log out the current user by clearing the session.
#[cfg(feature = "server")]
#[post("/api/auth/logout", session: tower_sessions::Session)]
pub async fn logout() -> Result<(), ServerFnError> {
    session
        .flush()
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;

    Ok(())
}

#[cfg(not(feature = "server"))]
#[post("/api/auth/logout")]
pub async fn logout() -> Result<(), ServerFnError> {
    Ok(())
}

/// Claims for the current session, derived fresh from the profile's admin
/// flag on every call. Anonymous callers get the empty (non-admin) mapping.
#[cfg(feature = "server")]
#[get("/api/auth/claims", session: tower_sessions::Session)]
pub async fn get_claims() -> Result<Claims, ServerFnError> {
    let user_id: Option<String> = session
        .get(auth::SESSION_USER_ID_KEY)
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;

    let Some(user_id) = user_id else {
        return Ok(Claims::default());
    };

    catalog()
        .await?
        .claims_for(&user_id)
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))
}

#[cfg(not(feature = "server"))]
#[get("/api/auth/claims")]
pub async fn get_claims() -> Result<Claims, ServerFnError> {
    Ok(Claims::default())
}

/// The cabinet roster, sorted by code.
#[cfg(feature = "server")]
#[get("/api/cabinets", session: tower_sessions::Session)]
pub async fn list_cabinets() -> Result<Vec<Cabinet>, ServerFnError> {
    session_user_id(&session).await?;

    catalog()
        .await?
        .list_cabinets()
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))
}

#[cfg(not(feature = "server"))]
#[get("/api/cabinets")]
pub async fn list_cabinets() -> Result<Vec<Cabinet>, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

/// The caller's entries for one cabinet, newest first.
#[cfg(feature = "server")]
#[get("/api/entries/:cabinet", session: tower_sessions::Session)]
pub async fn list_entries(cabinet: String) -> Result<Vec<Entry>, ServerFnError> {
    let user_id = session_user_id(&session).await?;

    catalog()
        .await?
        .entries_for(&user_id, &cabinet)
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))
}

#[cfg(not(feature = "server"))]
#[get("/api/entries/:cabinet")]
pub async fn list_entries(cabinet: String) -> Result<Vec<Entry>, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

/// Record a new entry. The draft is validated again here, so the inline
/// checks in the form cannot be bypassed, and the timestamp is assigned
/// server-side.
#[cfg(feature = "server")]
#[post("/api/entries", session: tower_sessions::Session)]
pub async fn create_entry(
    cabinet: String,
    number: String,
    cab_out: String,
    block: String,
) -> Result<Entry, ServerFnError> {
    use store::{validate, EntryDraft};

    let user_id = session_user_id(&session).await?;

    let draft = EntryDraft {
        number: number.clone(),
        cab_out: cab_out.clone(),
        block: block.clone(),
    };
    let errors = validate(&draft);
    if !errors.is_empty() {
        let message = errors.values().cloned().collect::<Vec<_>>().join("; ");
        return Err(ServerFnError::new(message));
    }

    let timestamp = chrono::Utc::now().timestamp_millis();
    catalog()
        .await?
        .add_entry(&user_id, &cabinet, &number, &cab_out, &block, timestamp)
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))
}

#[cfg(not(feature = "server"))]
#[post("/api/entries")]
pub async fn create_entry(
    cabinet: String,
    number: String,
    cab_out: String,
    block: String,
) -> Result<Entry, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

/// All user profiles, sorted by email. Admin only.
#[cfg(feature = "server")]
#[get("/api/admin/users", session: tower_sessions::Session)]
pub async fn list_users() -> Result<Vec<UserProfile>, ServerFnError> {
    require_admin(&session).await?;

    catalog()
        .await?
        .list_users()
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))
}

#[cfg(not(feature = "server"))]
#[get("/api/admin/users")]
pub async fn list_users() -> Result<Vec<UserProfile>, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

/// Invite a user by email. No credential is created; the invite is claimed
/// when the person signs up with that address. Admin only.
#[cfg(feature = "server")]
#[post("/api/admin/users", session: tower_sessions::Session)]
pub async fn invite_user(email: String) -> Result<UserProfile, ServerFnError> {
    require_admin(&session).await?;

    let email = email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(ServerFnError::new("Invalid email address"));
    }

    let now = chrono::Utc::now().to_rfc3339();
    catalog()
        .await?
        .invite_user(&email, &now)
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))
}

#[cfg(not(feature = "server"))]
#[post("/api/admin/users")]
pub async fn invite_user(email: String) -> Result<UserProfile, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

/// Remove a user: deletes the profile document and, when the profile was
/// ever claimed, the account row as well, so no orphaned credential can log
/// back in. Admin only.
#[cfg(feature = "server")]
#[post("/api/admin/users/remove", session: tower_sessions::Session)]
pub async fn remove_user(user_id: String) -> Result<(), ServerFnError> {
    use crate::db::get_pool;

    let caller = require_admin(&session).await?;
    if caller == user_id {
        return Err(ServerFnError::new("You cannot remove your own account"));
    }

    catalog()
        .await?
        .remove_user(&user_id)
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;

    // Invited profiles carry a generated document id with no account
    // behind it; only a claimed profile's id parses as an account id.
    if let Ok(account_id) = uuid::Uuid::parse_str(&user_id) {
        let pool = get_pool()
            .await
            .map_err(|e| ServerFnError::new(e.to_string()))?;
        sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(account_id)
            .execute(pool)
            .await
            .map_err(|e| ServerFnError::new(e.to_string()))?;
    }

    Ok(())
}

#[cfg(not(feature = "server"))]
#[post("/api/admin/users/remove")]
pub async fn remove_user(user_id: String) -> Result<(), ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

/// Flip a user's admin flag. Admin only.
#[cfg(feature = "server")]
#[post("/api/admin/users/toggle-admin", session: tower_sessions::Session)]
pub async fn toggle_admin(user_id: String) -> Result<UserProfile, ServerFnError> {
    let caller = require_admin(&session).await?;
    if caller == user_id {
        return Err(ServerFnError::new("You cannot change your own admin access"));
    }

    catalog()
        .await?
        .toggle_admin(&user_id)
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))
}

#[cfg(not(feature = "server"))]
#[post("/api/admin/users/toggle-admin")]
pub async fn toggle_admin(user_id: String) -> Result<UserProfile, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

/// Add a cabinet to the roster. Admin only.
#[cfg(feature = "server")]
#[post("/api/admin/cabinets", session: tower_sessions::Session)]
pub async fn add_cabinet(code: String, kind: String) -> Result<Cabinet, ServerFnError> {
    require_admin(&session).await?;

    let code = code.trim().to_string();
    let kind = kind.trim().to_string();
    if code.is_empty() {
        return Err(ServerFnError::new("Cabinet code is required"));
    }
    if kind.is_empty() {
        return Err(ServerFnError::new("Cabinet type is required"));
    }

    catalog()
        .await?
        .add_cabinet(&code, &kind)
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))
}

#[cfg(not(feature = "server"))]
#[post("/api/admin/cabinets")]
pub async fn add_cabinet(code: String, kind: String) -> Result<Cabinet, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

/// Remove a cabinet from the roster. Recorded entries keep their cabinet
/// code and stay queryable if the cabinet is re-added. Admin only.
#[cfg(feature = "server")]
#[post("/api/admin/cabinets/remove", session: tower_sessions::Session)]
pub async fn remove_cabinet(code: String) -> Result<(), ServerFnError> {
    require_admin(&session).await?;

    catalog()
        .await?
        .remove_cabinet(&code)
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))
}

#[cfg(not(feature = "server"))]
#[post("/api/admin/cabinets/remove")]
pub async fn remove_cabinet(code: String) -> Result<(), ServerFnError> {
    Err(ServerFnError::new("Server only"))
}
