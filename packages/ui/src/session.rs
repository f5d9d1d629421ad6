//! Session context and hooks for the UI.
//!
//! [`SessionProvider`] resolves the signed-in identity and its claims once
//! on mount and again whenever [`SessionHandle::refresh`] is called. The
//! resolver is a `use_resource`, so bumping the refresh epoch drops any
//! in-flight resolution before starting the next one; a stale response can
//! never overwrite a newer session.

use api::{Claims, UserInfo};
use dioxus::prelude::*;

/// Session state for the application.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    /// Identity or claims still in flight. Guards render a placeholder and
    /// must not redirect yet.
    Loading,
    Resolved {
        user: Option<UserInfo>,
        is_admin: bool,
    },
}

impl SessionState {
    pub fn is_loading(&self) -> bool {
        matches!(self, SessionState::Loading)
    }

    pub fn user(&self) -> Option<&UserInfo> {
        match self {
            SessionState::Loading => None,
            SessionState::Resolved { user, .. } => user.as_ref(),
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, SessionState::Resolved { is_admin: true, .. })
    }
}

/// Fold a fetched identity and its claims lookup into a resolved state.
/// A failed claims lookup resolves as non-admin, never as an error the
/// guards could misread as "signed out".
pub fn resolved(user: Option<UserInfo>, claims: Result<Claims, String>) -> SessionState {
    let is_admin = match (&user, claims) {
        (Some(_), Ok(claims)) => claims.is_admin(),
        (Some(user), Err(err)) => {
            tracing::warn!(%err, email = %user.email, "claims lookup failed, resolving as non-admin");
            false
        }
        (None, _) => false,
    };
    SessionState::Resolved { user, is_admin }
}

/// Handle stored in context: the resolved state plus the refresh epoch.
#[derive(Clone, Copy)]
pub struct SessionHandle {
    state: Signal<SessionState>,
    epoch: Signal<u32>,
}

impl SessionHandle {
    pub fn state(&self) -> SessionState {
        (self.state)()
    }

    /// Throw away the current resolution and start a new one. Called after
    /// login, logout, and signup.
    pub fn refresh(&mut self) {
        let next = (self.epoch)() + 1;
        self.epoch.set(next);
    }
}

/// Get the current session handle.
pub fn use_session() -> SessionHandle {
    use_context::<SessionHandle>()
}

/// Provider component that manages session state.
/// Wrap your app with this component to enable authentication.
#[component]
pub fn SessionProvider(children: Element) -> Element {
    let mut state = use_signal(|| SessionState::Loading);
    let epoch = use_signal(|| 0u32);

    let _ = use_resource(move || async move {
        // Reading the epoch subscribes the resolver to refresh().
        let _generation = epoch();
        state.set(SessionState::Loading);

        let user = match api::get_current_user().await {
            Ok(user) => user,
            Err(err) => {
                tracing::warn!(%err, "identity fetch failed");
                None
            }
        };
        let claims = if user.is_some() {
            api::get_claims().await.map_err(|e| e.to_string())
        } else {
            Ok(Claims::default())
        };
        state.set(resolved(user, claims));
    });

    use_context_provider(|| SessionHandle { state, epoch });

    rsx! {
        {children}
    }
}

/// Button to log out the current user.
#[component]
pub fn LogoutButton(
    #[props(default = "Log Out".to_string())] label: String,
    #[props(default = "".to_string())] class: String,
) -> Element {
    let mut session = use_session();

    let onclick = move |_| async move {
        match api::logout().await {
            Ok(()) => {
                session.refresh();
                #[cfg(target_arch = "wasm32")]
                {
                    if let Some(window) = web_sys::window() {
                        let _ = window.location().set_href("/login");
                    }
                }
            }
            Err(err) => tracing::error!(%err, "logout failed"),
        }
    };

    rsx! {
        button {
            class: "{class}",
            onclick: onclick,
            "{label}"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> Option<UserInfo> {
        Some(UserInfo {
            id: "u1".to_string(),
            email: "a@example.com".to_string(),
        })
    }

    #[test]
    fn anonymous_resolves_as_signed_out() {
        let state = resolved(None, Ok(Claims::admin()));
        assert_eq!(
            state,
            SessionState::Resolved {
                user: None,
                is_admin: false
            }
        );
        assert!(state.user().is_none());
    }

    #[test]
    fn admin_claims_resolve_as_admin() {
        let state = resolved(user(), Ok(Claims::admin()));
        assert!(state.is_admin());
        assert_eq!(state.user().unwrap().id, "u1");
    }

    #[test]
    fn default_claims_resolve_as_non_admin() {
        assert!(!resolved(user(), Ok(Claims::default())).is_admin());
    }

    #[test]
    fn claims_failure_resolves_as_non_admin() {
        let state = resolved(user(), Err("network down".to_string()));
        assert!(!state.is_admin());
        // Still signed in; only the privilege is withheld.
        assert!(state.user().is_some());
    }

    #[test]
    fn loading_exposes_nothing() {
        let state = SessionState::Loading;
        assert!(state.is_loading());
        assert!(state.user().is_none());
        assert!(!state.is_admin());
    }
}
