use crate::api::SharedBackend;
use crate::types::StatusMessage;
use crate::ui::AppRoute;
use comrak::{ComrakOptions, markdown_to_html as render_markdown};
use dioxus::prelude::*;
use once_cell::sync::Lazy;
use time::{OffsetDateTime, UtcOffset, format_description::FormatItem, macros::format_description};

static MARKDOWN_OPTIONS: Lazy<ComrakOptions> = Lazy::new(|| {
    let mut options = ComrakOptions::default();
    options.extension.table = true;
    options.extension.strikethrough = true;
    options.extension.autolink = true;
    options.render.hardbreaks = true;
    options
});

const MESSAGE_TIME_FORMAT: &[FormatItem<'static>] =
    format_description!("[hour padding:zero]:[minute padding:zero]");

/// Agent replies are markdown; raw HTML in them is escaped.
pub fn markdown_to_html(md: &str) -> String {
    render_markdown(md, &MARKDOWN_OPTIONS)
}

pub fn format_message_timestamp(timestamp: Option<OffsetDateTime>) -> Option<String> {
    let mut datetime = timestamp?;
    if let Ok(offset) = UtcOffset::current_local_offset() {
        datetime = datetime.to_offset(offset);
    }
    datetime.format(MESSAGE_TIME_FORMAT).ok()
}

#[component]
pub fn StatusLine(status: Option<StatusMessage>) -> Element {
    rsx! {
        if let Some(status) = status {
            div {
                class: format_args!("status-line {}", status.level.css_class()),
                role: "status",
                "{status.text}"
            }
        }
    }
}

#[component]
pub fn ConfirmDialog(
    message: String,
    confirm_label: &'static str,
    on_confirm: EventHandler<()>,
    on_cancel: EventHandler<()>,
) -> Element {
    rsx! {
        div { class: "modal-backdrop",
            div { class: "modal", role: "dialog", aria_modal: "true",
                for line in message.lines().filter(|line| !line.trim().is_empty()) {
                    p { "{line}" }
                }
                div { class: "modal-actions",
                    button {
                        class: "btn btn-ghost",
                        r#type: "button",
                        onclick: move |_| on_cancel.call(()),
                        "Cancelar"
                    }
                    button {
                        class: "btn btn-danger",
                        r#type: "button",
                        onclick: move |_| on_confirm.call(()),
                        "{confirm_label}"
                    }
                }
            }
        }
    }
}

/// Header shared by the dashboard and the standalone pages.
#[component]
pub fn AppHeader(route: Signal<AppRoute>, current: AppRoute) -> Element {
    let backend = use_context::<SharedBackend>();
    let mut logout_error = use_signal(|| Option::<String>::None);
    let mut leaving = use_signal(|| false);

    let logout = move |_| {
        if leaving() {
            return;
        }
        leaving.set(true);
        let backend = backend.clone();
        let mut route = route;
        spawn(async move {
            match backend.logout().await {
                Ok(_) => {
                    tracing::info!("session closed");
                    logout_error.set(None);
                    route.set(AppRoute::Login);
                }
                Err(err) => {
                    tracing::error!("logout failed: {err}");
                    logout_error.set(Some(err.user_message()));
                }
            }
            leaving.set(false);
        });
    };

    rsx! {
        header { class: "header",
            div { class: "header-content",
                h1 { class: "brand", "Painel Fiscal" }
                nav { class: "page-nav",
                    NavLink { route, current, target: AppRoute::Dashboard, label: "Painel" }
                    NavLink { route, current, target: AppRoute::Upload, label: "Envio de notas" }
                    NavLink { route, current, target: AppRoute::Chat, label: "Chat fiscal" }
                }
                button {
                    class: "btn btn-ghost",
                    r#type: "button",
                    disabled: leaving(),
                    onclick: logout,
                    "Sair"
                }
            }
            if let Some(message) = logout_error() {
                div { class: "status-line error", "{message}" }
            }
        }
    }
}

#[component]
fn NavLink(
    route: Signal<AppRoute>,
    current: AppRoute,
    target: AppRoute,
    label: &'static str,
) -> Element {
    let mut route = route;
    let class = if current == target {
        "nav-link active"
    } else {
        "nav-link"
    };
    rsx! {
        button {
            class: class,
            r#type: "button",
            onclick: move |_| route.set(target),
            "{label}"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn renders_markdown_and_escapes_html() {
        let html = markdown_to_html("**ICMS** total\n\n<script>alert(1)</script>");
        assert!(html.contains("<strong>ICMS</strong>"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn timestamps_are_hours_and_minutes() {
        assert_eq!(format_message_timestamp(None), None);
        let formatted = format_message_timestamp(Some(datetime!(2024-03-05 14:07 UTC))).unwrap();
        assert_eq!(formatted.len(), 5);
        assert_eq!(&formatted[2..3], ":");
        assert!(formatted.chars().filter(char::is_ascii_digit).count() == 4);
    }
}
