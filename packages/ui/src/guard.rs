//! Route guarding decisions, kept separate from rendering so they can be
//! tested without a router.

use crate::session::SessionState;

/// What a guarded route should do for the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardOutcome {
    /// Session still resolving; render a placeholder, never redirect.
    Pending,
    Allow,
    RedirectLogin,
    RedirectHome,
}

impl GuardOutcome {
    pub fn decide(state: &SessionState, require_admin: bool) -> Self {
        match state {
            SessionState::Loading => GuardOutcome::Pending,
            SessionState::Resolved { user: None, .. } => GuardOutcome::RedirectLogin,
            SessionState::Resolved {
                user: Some(_),
                is_admin,
            } => {
                if require_admin && !is_admin {
                    GuardOutcome::RedirectHome
                } else {
                    GuardOutcome::Allow
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use api::UserInfo;

    fn signed_in(is_admin: bool) -> SessionState {
        SessionState::Resolved {
            user: Some(UserInfo {
                id: "u1".to_string(),
                email: "a@example.com".to_string(),
            }),
            is_admin,
        }
    }

    #[test]
    fn loading_never_redirects() {
        assert_eq!(
            GuardOutcome::decide(&SessionState::Loading, false),
            GuardOutcome::Pending
        );
        assert_eq!(
            GuardOutcome::decide(&SessionState::Loading, true),
            GuardOutcome::Pending
        );
    }

    #[test]
    fn anonymous_goes_to_login() {
        let state = SessionState::Resolved {
            user: None,
            is_admin: false,
        };
        assert_eq!(
            GuardOutcome::decide(&state, false),
            GuardOutcome::RedirectLogin
        );
        assert_eq!(
            GuardOutcome::decide(&state, true),
            GuardOutcome::RedirectLogin
        );
    }

    #[test]
    fn signed_in_user_is_allowed() {
        assert_eq!(
            GuardOutcome::decide(&signed_in(false), false),
            GuardOutcome::Allow
        );
    }

    #[test]
    fn non_admin_is_bounced_from_admin_routes() {
        assert_eq!(
            GuardOutcome::decide(&signed_in(false), true),
            GuardOutcome::RedirectHome
        );
        assert_eq!(
            GuardOutcome::decide(&signed_in(true), true),
            GuardOutcome::Allow
        );
    }
}
