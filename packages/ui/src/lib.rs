//! This crate contains all shared UI for the workspace.

use dioxus::prelude::*;

// Re-export icon library
pub use dioxus_free_icons::Icon;
pub mod icons {
    pub use dioxus_free_icons::icons::fa_solid_icons::*;
}

pub const MAIN_CSS: Asset = asset!("/assets/main.css");

mod session;
pub use session::{resolved, use_session, LogoutButton, SessionHandle, SessionProvider, SessionState};

mod guard;
pub use guard::GuardOutcome;

pub mod entries;
pub use entries::{
    csv_filename, download_csv, duplicate_number, entries_csv, filter_entries, format_timestamp,
    Pager, PAGE_SIZE,
};

mod toast;
pub use toast::{push_toast, use_toasts, Toast, ToastHost, ToastLevel, Toasts};
