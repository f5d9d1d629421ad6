//! Admin panel: user roster and cabinet roster management.

use dioxus::prelude::*;
use ui::{push_toast, use_session, use_toasts, ToastLevel};

#[component]
pub fn AdminPanel() -> Element {
    let session = use_session();
    let mut toasts = use_toasts();

    let mut users = use_resource(move || async move { api::list_users().await });
    let mut cabinets = use_resource(move || async move { api::list_cabinets().await });

    let mut invite_email = use_signal(String::new);
    let mut inviting = use_signal(|| false);

    let mut cabinet_code = use_signal(String::new);
    let mut cabinet_kind = use_signal(String::new);
    let mut adding_cabinet = use_signal(|| false);

    let self_id = session
        .state()
        .user()
        .map(|u| u.id.clone())
        .unwrap_or_default();

    let handle_invite = move |evt: FormEvent| {
        evt.prevent_default();
        spawn(async move {
            let email = invite_email().trim().to_string();
            if email.is_empty() || !email.contains('@') {
                push_toast(&mut toasts, ToastLevel::Error, "Please enter a valid email");
                return;
            }

            inviting.set(true);
            match api::invite_user(email).await {
                Ok(profile) => {
                    invite_email.set(String::new());
                    push_toast(
                        &mut toasts,
                        ToastLevel::Success,
                        &format!("Invited {}", profile.email),
                    );
                    users.restart();
                }
                Err(err) => push_toast(&mut toasts, ToastLevel::Error, &err.to_string()),
            }
            inviting.set(false);
        });
    };

    let handle_add_cabinet = move |evt: FormEvent| {
        evt.prevent_default();
        spawn(async move {
            let code = cabinet_code().trim().to_string();
            let kind = cabinet_kind().trim().to_string();
            if code.is_empty() || kind.is_empty() {
                push_toast(
                    &mut toasts,
                    ToastLevel::Error,
                    "Cabinet code and type are required",
                );
                return;
            }

            adding_cabinet.set(true);
            match api::add_cabinet(code, kind).await {
                Ok(cabinet) => {
                    cabinet_code.set(String::new());
                    cabinet_kind.set(String::new());
                    push_toast(
                        &mut toasts,
                        ToastLevel::Success,
                        &format!("Added cabinet {}", cabinet.code),
                    );
                    cabinets.restart();
                }
                Err(err) => push_toast(&mut toasts, ToastLevel::Error, &err.to_string()),
            }
            adding_cabinet.set(false);
        });
    };

    rsx! {
        div { class: "page",
            header { class: "topbar",
                h1 { "CabTrack Admin" }
                a { href: "/", "Back to entries" }
            }

            section { class: "card",
                h2 { "Users" }

                form { class: "entry-form", onsubmit: handle_invite,
                    input {
                        r#type: "email",
                        placeholder: "Email to invite",
                        value: invite_email(),
                        oninput: move |evt: FormEvent| invite_email.set(evt.value()),
                    }
                    button {
                        r#type: "submit",
                        disabled: inviting(),
                        if inviting() { "Inviting..." } else { "Invite User" }
                    }
                }

                match users() {
                    Some(Ok(list)) => rsx! {
                        table {
                            thead {
                                tr {
                                    th { "Email" }
                                    th { "Status" }
                                    th { "Actions" }
                                }
                            }
                            tbody {
                                for profile in list.iter() {
                                    UserRow {
                                        key: "{profile.id}",
                                        profile: profile.clone(),
                                        is_self: profile.id == self_id,
                                        on_changed: move |_| users.restart(),
                                    }
                                }
                            }
                        }
                    },
                    Some(Err(err)) => rsx! {
                        div { class: "form-error", "Failed to load users: {err}" }
                    },
                    None => rsx! {
                        p { class: "empty", "Loading users..." }
                    },
                }
            }

            section { class: "card",
                h2 { "Cabinets" }

                form { class: "entry-form", onsubmit: handle_add_cabinet,
                    input {
                        placeholder: "Cabinet code",
                        value: cabinet_code(),
                        oninput: move |evt: FormEvent| cabinet_code.set(evt.value()),
                    }
                    input {
                        placeholder: "Type",
                        value: cabinet_kind(),
                        oninput: move |evt: FormEvent| cabinet_kind.set(evt.value()),
                    }
                    button {
                        r#type: "submit",
                        disabled: adding_cabinet(),
                        if adding_cabinet() { "Adding..." } else { "Add Cabinet" }
                    }
                }

                match cabinets() {
                    Some(Ok(list)) => rsx! {
                        table {
                            thead {
                                tr {
                                    th { "Code" }
                                    th { "Type" }
                                    th { "Actions" }
                                }
                            }
                            tbody {
                                for cabinet in list.iter() {
                                    CabinetRow {
                                        key: "{cabinet.code}",
                                        cabinet: cabinet.clone(),
                                        on_changed: move |_| cabinets.restart(),
                                    }
                                }
                            }
                        }
                    },
                    Some(Err(err)) => rsx! {
                        div { class: "form-error", "Failed to load cabinets: {err}" }
                    },
                    None => rsx! {
                        p { class: "empty", "Loading cabinets..." }
                    },
                }
            }
        }
    }
}

#[component]
fn UserRow(profile: api::UserProfile, is_self: bool, on_changed: EventHandler<()>) -> Element {
    let mut toasts = use_toasts();
    let mut busy = use_signal(|| false);

    let user_id = profile.id.clone();
    let handle_toggle = {
        let user_id = user_id.clone();
        move |_| {
            let user_id = user_id.clone();
            spawn(async move {
                busy.set(true);
                match api::toggle_admin(user_id).await {
                    Ok(updated) => {
                        let notice = if updated.is_admin {
                            format!("{} is now an admin", updated.email)
                        } else {
                            format!("{} is no longer an admin", updated.email)
                        };
                        push_toast(&mut toasts, ToastLevel::Success, &notice);
                        on_changed.call(());
                    }
                    Err(err) => push_toast(&mut toasts, ToastLevel::Error, &err.to_string()),
                }
                busy.set(false);
            });
        }
    };

    let handle_remove = move |_| {
        let user_id = user_id.clone();
        spawn(async move {
            busy.set(true);
            match api::remove_user(user_id).await {
                Ok(()) => {
                    push_toast(&mut toasts, ToastLevel::Success, "User removed");
                    on_changed.call(());
                }
                Err(err) => push_toast(&mut toasts, ToastLevel::Error, &err.to_string()),
            }
            busy.set(false);
        });
    };

    rsx! {
        tr {
            td {
                "{profile.email}"
                if profile.is_admin {
                    " "
                    span { class: "badge admin", "Admin" }
                }
            }
            td {
                match profile.status {
                    api::UserStatus::Active => rsx! { span { class: "badge", "Active" } },
                    api::UserStatus::Invited => rsx! { span { class: "badge invited", "Invited" } },
                }
            }
            td {
                div { class: "row-actions",
                    button {
                        class: "ghost",
                        disabled: busy() || is_self,
                        onclick: handle_toggle,
                        if profile.is_admin { "Remove Admin" } else { "Make Admin" }
                    }
                    button {
                        class: "danger",
                        disabled: busy() || is_self,
                        onclick: handle_remove,
                        "Remove"
                    }
                }
            }
        }
    }
}

#[component]
fn CabinetRow(cabinet: api::Cabinet, on_changed: EventHandler<()>) -> Element {
    let mut toasts = use_toasts();
    let mut busy = use_signal(|| false);

    let code = cabinet.code.clone();
    let handle_remove = move |_| {
        let code = code.clone();
        spawn(async move {
            busy.set(true);
            match api::remove_cabinet(code).await {
                Ok(()) => {
                    push_toast(&mut toasts, ToastLevel::Success, "Cabinet removed");
                    on_changed.call(());
                }
                Err(err) => push_toast(&mut toasts, ToastLevel::Error, &err.to_string()),
            }
            busy.set(false);
        });
    };

    rsx! {
        tr {
            td { "{cabinet.code}" }
            td { "{cabinet.kind}" }
            td {
                button {
                    class: "danger",
                    disabled: busy(),
                    onclick: handle_remove,
                    "Remove"
                }
            }
        }
    }
}
