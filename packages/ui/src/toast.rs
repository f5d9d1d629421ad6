//! Transient success/error notices.

use dioxus::prelude::*;
use dioxus_free_icons::icons::fa_solid_icons::{FaCircleCheck, FaCircleExclamation, FaXmark};
use dioxus_free_icons::Icon;

#[derive(Clone, Debug, PartialEq)]
pub enum ToastLevel {
    Success,
    Error,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
}

#[derive(Clone, Debug, Default)]
pub struct Toasts {
    pub items: Vec<Toast>,
}

pub fn use_toasts() -> Signal<Toasts> {
    use_context::<Signal<Toasts>>()
}

pub fn push_toast(toasts: &mut Signal<Toasts>, level: ToastLevel, message: &str) {
    toasts.write().items.push(Toast {
        level,
        message: message.to_string(),
    });
}

/// Provides the toast context and renders the stack in a corner overlay.
/// Wrap the routed content with this once, near the root.
#[component]
pub fn ToastHost(children: Element) -> Element {
    let mut toasts = use_signal(Toasts::default);
    use_context_provider(|| toasts);

    let items = toasts().items;

    rsx! {
        {children}
        div { class: "toast-stack",
            for (index, toast) in items.into_iter().enumerate() {
                div {
                    class: match toast.level {
                        ToastLevel::Success => "toast toast-success",
                        ToastLevel::Error => "toast toast-error",
                    },
                    match toast.level {
                        ToastLevel::Success => rsx! { Icon { width: 14, height: 14, icon: FaCircleCheck } },
                        ToastLevel::Error => rsx! { Icon { width: 14, height: 14, icon: FaCircleExclamation } },
                    }
                    span { "{toast.message}" }
                    button {
                        class: "toast-dismiss",
                        onclick: move |_| {
                            toasts.write().items.remove(index);
                        },
                        Icon { width: 12, height: 12, icon: FaXmark }
                    }
                }
            }
        }
    }
}
