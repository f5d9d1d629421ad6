pub mod catalog;
pub mod config;
pub mod docstore;
pub mod error;
pub mod models;
pub mod validate;

mod memory;
pub use memory::MemoryStore;

pub use catalog::Catalog;
pub use config::{ConfigError, ServiceConfig};
pub use docstore::{DocumentStore, Fields, SortDirection, WriteOp};
pub use error::StoreError;
pub use models::{Cabinet, Claims, Entry, UserInfo, UserProfile, UserStatus};
pub use validate::{validate, EntryDraft, EntryField, ValidationErrors};
