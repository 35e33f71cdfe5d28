use crate::api::SharedBackend;
use crate::chat::{CLEAR_CONFIRM_PROMPT, ChatLog, ClearConfirmed, stats_label};
use crate::dashboard::DashboardState;
use crate::types::{ChatMessage, Sender};
use crate::ui::AppRoute;
use crate::views::credentials::CredentialSidebar;
use crate::views::shared::{AppHeader, ConfirmDialog, format_message_timestamp, markdown_to_html};
use dioxus::events::Key;
use dioxus::prelude::*;

/// Refresh the conversation memory counters. Failures only get logged.
fn refresh_stats(backend: SharedBackend, mut log: Signal<ChatLog>, state: Signal<DashboardState>) {
    let Some(api_key) = state.peek().credentials().primary().map(str::to_string) else {
        return;
    };
    spawn(async move {
        match backend.chat_stats(&api_key).await {
            Ok(stats) => log.write().set_stats(stats),
            Err(err) => tracing::warn!("chat stats unavailable: {err}"),
        }
    });
}

/// Standalone chat page.
#[component]
pub fn ChatPage(route: Signal<AppRoute>, state: Signal<DashboardState>) -> Element {
    rsx! {
        div { class: "app-shell",
            AppHeader { route, current: AppRoute::Chat }
            div { class: "dashboard-body",
                CredentialSidebar { state }
                main { class: "dashboard-main",
                    ChatPanel { state, id_prefix: "standalone" }
                }
            }
        }
    }
}

#[component]
pub fn ChatPanel(state: Signal<DashboardState>, id_prefix: &'static str) -> Element {
    let backend = use_context::<SharedBackend>();
    let mut log = use_signal(|| ChatLog::new(state.peek().credentials()));
    let mut input = use_signal(String::new);
    let credential_revision = use_memo(move || state.read().credential_revision());
    let list_id = format!("{id_prefix}-chatMessages");

    let stats_backend = backend.clone();
    use_effect(move || {
        credential_revision();
        if state.peek().credentials().is_primary_active() {
            log.write().dismiss_intro();
            refresh_stats(stats_backend.clone(), log, state);
        }
    });

    let scroll_target = list_id.clone();
    use_effect(move || {
        let _ = log.read().messages().len();
        let script = format!(
            "const list = document.getElementById('{scroll_target}'); if (list) {{ list.scrollTop = list.scrollHeight; }}"
        );
        let _ = document::eval(&script);
    });

    let send_backend = backend.clone();
    let send = use_callback(move |()| {
        let question = input();
        let pending = {
            let mut state = state;
            let mut dashboard = state.write();
            match log.write().begin_send(&question, dashboard.credentials_mut()) {
                Ok(pending) => pending,
                Err(rejected) => {
                    tracing::debug!(?rejected, "chat message not sent");
                    return;
                }
            }
        };
        input.set(String::new());
        let backend = send_backend.clone();
        spawn(async move {
            let outcome = backend.chat(&pending.request).await;
            {
                let mut state = state;
                let mut dashboard = state.write();
                log.write()
                    .finish_send(&pending, outcome, dashboard.credentials_mut());
            }
            refresh_stats(backend, log, state);
        });
    });

    let clear_backend = backend.clone();
    let confirm_clear = use_callback(move |()| {
        let Some(ClearConfirmed { api_key }) = log.write().confirm_clear(state.peek().credentials())
        else {
            return;
        };
        let backend = clear_backend.clone();
        spawn(async move {
            let outcome = backend.clear_chat(&api_key).await.map(|_| ());
            log.write().finish_clear(outcome);
            refresh_stats(backend, log, state);
        });
    });

    let hide_status = move || {
        if state.peek().credentials().status().is_some() {
            let mut state = state;
            state.write().credentials_mut().hide_status();
        }
    };

    let credentials = state.read().credentials().clone();
    let banner = credentials.chat_banner();
    let current = log.read();
    let messages: Vec<ChatMessage> = current.messages().to_vec();
    let sending = current.is_sending();
    let confirming = current.is_awaiting_confirmation();
    let stats = current.stats().map(stats_label);
    drop(current);

    rsx! {
        div { class: "card chat-card", id: "{id_prefix}-chat",
            div { class: "card-header",
                h2 { "Chat IA fiscal" }
                if let Some(stats) = stats {
                    span { class: "chat-stats", "{stats}" }
                }
                button {
                    class: "btn btn-ghost",
                    r#type: "button",
                    disabled: sending,
                    onclick: move |_| {
                        log.write().request_clear(state.peek().credentials());
                    },
                    "Limpar histórico"
                }
            }
            if let Some(banner) = banner {
                div { class: "activation-banner",
                    strong { "{banner.title}" }
                    span { "{banner.text}" }
                }
            }
            div { id: "{list_id}", class: "chat-list",
                for message in messages {
                    ChatBubble { key: "{message.id}", message }
                }
            }
            form {
                class: "composer",
                onsubmit: move |evt: FormEvent| {
                    evt.prevent_default();
                    send.call(());
                },
                textarea {
                    rows: "2",
                    placeholder: "Pergunte sobre suas notas fiscais...",
                    value: "{input}",
                    disabled: sending,
                    oninput: move |evt| {
                        input.set(evt.value());
                        hide_status();
                    },
                    onkeydown: move |evt| {
                        if evt.key() == Key::Enter && !evt.modifiers().shift() {
                            evt.prevent_default();
                            send.call(());
                        }
                    },
                }
                button {
                    class: "btn btn-primary",
                    r#type: "submit",
                    disabled: sending,
                    if sending { "Enviando..." } else { "Enviar" }
                }
            }
            if confirming {
                ConfirmDialog {
                    message: CLEAR_CONFIRM_PROMPT.to_string(),
                    confirm_label: "Limpar",
                    on_confirm: move |_| confirm_clear.call(()),
                    on_cancel: move |_| log.write().cancel_clear(),
                }
            }
        }
    }
}

#[component]
fn ChatBubble(message: ChatMessage) -> Element {
    let timestamp = format_message_timestamp(message.created_at);
    let row_class = format!("message-row {}", message.sender.css_class());
    rsx! {
        div { class: row_class,
            div { class: format_args!("bubble {}", message.sender.css_class()),
                if message.sender == Sender::Bot {
                    div { class: "md", dangerous_inner_html: markdown_to_html(&message.text) }
                } else {
                    "{message.text}"
                }
            }
            if let Some(timestamp) = timestamp {
                span { class: "message-timestamp", "{timestamp}" }
            }
        }
    }
}
