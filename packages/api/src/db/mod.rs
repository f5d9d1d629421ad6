//! # Database module — PostgreSQL pool and document-store implementation
//!
//! Entirely gated behind `#[cfg(feature = "server")]` so client (WASM)
//! builds never pull in SQLx or Tokio networking code.
//!
//! - [`init_pool`] / [`get_pool`] — lazy process-wide pool. The launcher
//!   calls `init_pool` explicitly at startup so a misconfigured database
//!   fails the process immediately; the initial handshake retries with
//!   exponential backoff before giving up.
//! - [`PgStore`] — [`store::DocumentStore`] over a single `documents`
//!   table with `jsonb` fields. Equality filters use `@>` containment,
//!   batches run in a transaction, and unique-index violations map to
//!   [`store::StoreError::Conflict`].

#[cfg(feature = "server")]
mod pgstore;
#[cfg(feature = "server")]
mod pool;

#[cfg(feature = "server")]
pub use pgstore::PgStore;
#[cfg(feature = "server")]
pub use pool::{get_pool, init_pool};
