//! Main data-entry view: cabinet selector, entry form, and the searchable,
//! paginated entry table with CSV export.

use dioxus::prelude::*;
use store::{validate, EntryDraft, EntryField, ValidationErrors};
use ui::{
    csv_filename, download_csv, duplicate_number, entries_csv, filter_entries, format_timestamp,
    push_toast, use_session, use_toasts, LogoutButton, Pager, ToastLevel,
};

#[component]
pub fn Dashboard() -> Element {
    let session = use_session();
    let mut toasts = use_toasts();

    let cabinets = use_resource(move || async move { api::list_cabinets().await });
    let mut selected = use_signal(|| Option::<String>::None);

    // Select the first cabinet once the roster loads
    use_effect(move || {
        if selected().is_none() {
            if let Some(Ok(list)) = cabinets() {
                if let Some(first) = list.first() {
                    selected.set(Some(first.code.clone()));
                }
            }
        }
    });

    let mut entries = use_resource(move || async move {
        match selected() {
            Some(cabinet) => api::list_entries(cabinet).await,
            None => Ok(Vec::new()),
        }
    });

    let mut number = use_signal(String::new);
    let mut cab_out = use_signal(String::new);
    let mut block = use_signal(String::new);
    let mut field_errors = use_signal(ValidationErrors::new);
    let mut saving = use_signal(|| false);

    let mut search = use_signal(String::new);
    let mut page = use_signal(|| 1usize);

    let handle_add = move |evt: FormEvent| {
        evt.prevent_default();
        spawn(async move {
            let Some(cabinet) = selected() else {
                return;
            };

            let draft = EntryDraft {
                number: number().trim().to_string(),
                cab_out: cab_out().trim().to_string(),
                block: block().trim().to_string(),
            };
            let errors = validate(&draft);
            if !errors.is_empty() {
                field_errors.set(errors);
                return;
            }
            field_errors.set(ValidationErrors::new());

            // Fast local pre-check; the server enforces this again
            if let Some(Ok(rows)) = entries() {
                if duplicate_number(&rows, &draft.number) {
                    push_toast(&mut toasts, ToastLevel::Error, "This number already exists.");
                    return;
                }
            }

            saving.set(true);
            match api::create_entry(cabinet, draft.number, draft.cab_out, draft.block).await {
                Ok(_) => {
                    number.set(String::new());
                    cab_out.set(String::new());
                    block.set(String::new());
                    push_toast(&mut toasts, ToastLevel::Success, "Entry added");
                    entries.restart();
                }
                Err(err) => push_toast(&mut toasts, ToastLevel::Error, &err.to_string()),
            }
            saving.set(false);
        });
    };

    let handle_export = move |_| {
        let Some(cabinet) = selected() else {
            return;
        };
        if let Some(Ok(rows)) = entries() {
            let filtered = filter_entries(&rows, &search());
            let csv = entries_csv(&filtered);
            if let Err(err) = download_csv(&csv_filename(&cabinet), &csv) {
                push_toast(&mut toasts, ToastLevel::Error, &format!("Export failed: {err}"));
            }
        }
    };

    let who = session
        .state()
        .user()
        .map(|u| u.email.clone())
        .unwrap_or_default();
    let is_admin = session.state().is_admin();

    rsx! {
        div { class: "page",
            header { class: "topbar",
                h1 { "CabTrack" }
                div { style: "display: flex; align-items: center; gap: 0.75rem;",
                    span { class: "who", "{who}" }
                    if is_admin {
                        a { href: "/admin", "Admin" }
                    }
                    LogoutButton { class: "ghost" }
                }
            }

            section { class: "card",
                h2 { "Cabinet" }
                match cabinets() {
                    Some(Ok(list)) => rsx! {
                        select {
                            value: selected().unwrap_or_default(),
                            onchange: move |evt: FormEvent| {
                                selected.set(Some(evt.value()));
                                page.set(1);
                            },
                            for cabinet in list.iter() {
                                option { value: "{cabinet.code}", "{cabinet.code} ({cabinet.kind})" }
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

            section { class: "card",
                h2 { "New Entry" }
                form { class: "entry-form", onsubmit: handle_add,
                    div { class: "field",
                        input {
                            placeholder: "Number",
                            value: number(),
                            oninput: move |evt: FormEvent| number.set(evt.value()),
                        }
                        if let Some(err) = field_errors().get(&EntryField::Number) {
                            span { class: "field-error", "{err}" }
                        }
                    }
                    div { class: "field",
                        input {
                            placeholder: "Cab Out (1-100)",
                            value: cab_out(),
                            oninput: move |evt: FormEvent| cab_out.set(evt.value()),
                        }
                        if let Some(err) = field_errors().get(&EntryField::CabOut) {
                            span { class: "field-error", "{err}" }
                        }
                    }
                    div { class: "field",
                        input {
                            placeholder: "Block (0-25)",
                            value: block(),
                            oninput: move |evt: FormEvent| block.set(evt.value()),
                        }
                        if let Some(err) = field_errors().get(&EntryField::Block) {
                            span { class: "field-error", "{err}" }
                        }
                    }
                    button {
                        r#type: "submit",
                        disabled: saving() || selected().is_none(),
                        if saving() { "Adding..." } else { "Add Entry" }
                    }
                }
            }

            section { class: "card",
                h2 { "Entries" }
                div { class: "table-tools",
                    input {
                        placeholder: "Search entries",
                        value: search(),
                        oninput: move |evt: FormEvent| {
                            search.set(evt.value());
                            page.set(1);
                        },
                    }
                    button { class: "ghost", onclick: handle_export, "Export CSV" }
                }

                match entries() {
                    Some(Ok(rows)) => {
                        let filtered = filter_entries(&rows, &search());
                        let pager = Pager::new(filtered.len(), page());
                        let visible = &filtered[pager.range()];
                        rsx! {
                            if visible.is_empty() {
                                p { class: "empty", "No entries yet." }
                            } else {
                                table {
                                    thead {
                                        tr {
                                            th { "Number" }
                                            th { "Cab Out" }
                                            th { "Block" }
                                            th { "Date" }
                                        }
                                    }
                                    tbody {
                                        for entry in visible.iter() {
                                            tr { key: "{entry.id}",
                                                td { "{entry.number}" }
                                                td { "{entry.cab_out}" }
                                                td { "{entry.block}" }
                                                td { {format_timestamp(entry.timestamp)} }
                                            }
                                        }
                                    }
                                }
                                div { class: "pagination",
                                    button {
                                        class: "ghost",
                                        disabled: !pager.has_prev(),
                                        onclick: move |_| page.set(page() - 1),
                                        "Previous"
                                    }
                                    span { "Page {pager.page} of {pager.page_count()}" }
                                    button {
                                        class: "ghost",
                                        disabled: !pager.has_next(),
                                        onclick: move |_| page.set(page() + 1),
                                        "Next"
                                    }
                                }
                            }
                        }
                    }
                    Some(Err(err)) => rsx! {
                        div { class: "form-error", "Failed to load entries: {err}" }
                    },
                    None => rsx! {
                        p { class: "empty", "Loading entries..." }
                    },
                }
            }
        }
    }
}
