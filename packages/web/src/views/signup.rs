//! Signup page view. Registering with an invited email claims the invite;
//! the very first account is promoted to administrator.

use dioxus::prelude::*;
use ui::{push_toast, use_session, use_toasts, ToastLevel};

/// Signup page component.
#[component]
pub fn Signup() -> Element {
    let mut session = use_session();
    let mut toasts = use_toasts();
    let mut email = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut confirm_password = use_signal(String::new);
    let mut error = use_signal(|| Option::<String>::None);
    let mut loading = use_signal(|| false);

    // If already signed in, go to the dashboard
    if session.state().user().is_some() {
        #[cfg(target_arch = "wasm32")]
        {
            if let Some(window) = web_sys::window() {
                let _ = window.location().set_href("/");
            }
        }
    }

    let handle_signup = move |evt: FormEvent| {
        evt.prevent_default();
        spawn(async move {
            error.set(None);

            let e = email().trim().to_string();
            let p = password();
            let cp = confirm_password();

            if e.is_empty() || !e.contains('@') {
                error.set(Some("Please enter a valid email".to_string()));
                return;
            }
            if p.len() < 6 {
                error.set(Some("Password must be at least 6 characters".to_string()));
                return;
            }
            if p != cp {
                error.set(Some("Passwords do not match".to_string()));
                return;
            }

            loading.set(true);
            match api::register(e, p).await {
                Ok(outcome) => {
                    if outcome.initial_admin {
                        push_toast(
                            &mut toasts,
                            ToastLevel::Success,
                            "You are the first user and have been made an administrator",
                        );
                    }
                    session.refresh();
                    #[cfg(target_arch = "wasm32")]
                    {
                        if let Some(window) = web_sys::window() {
                            let _ = window.location().set_href("/");
                        }
                    }
                }
                Err(e) => {
                    loading.set(false);
                    error.set(Some(e.to_string()));
                }
            }
        });
    };

    rsx! {
        div { class: "auth-page",
            h1 { "Create Account" }
            p { "Sign up for CabTrack" }

            form { class: "auth-form", onsubmit: handle_signup,
                if let Some(err) = error() {
                    div { class: "form-error", "{err}" }
                }

                input {
                    r#type: "email",
                    placeholder: "Email",
                    value: email(),
                    oninput: move |evt: FormEvent| email.set(evt.value()),
                }

                input {
                    r#type: "password",
                    placeholder: "Password (min 6 characters)",
                    value: password(),
                    oninput: move |evt: FormEvent| password.set(evt.value()),
                }

                input {
                    r#type: "password",
                    placeholder: "Confirm password",
                    value: confirm_password(),
                    oninput: move |evt: FormEvent| confirm_password.set(evt.value()),
                }

                button {
                    r#type: "submit",
                    disabled: loading(),
                    if loading() { "Creating account..." } else { "Sign Up" }
                }
            }

            p { style: "margin-top: 1.5rem;",
                "Already have an account? "
                a { href: "/login", "Sign in" }
            }
        }
    }
}
