use crate::dashboard::DashboardState;
use crate::views::shared::StatusLine;
use dioxus::prelude::*;

/// Key inputs, provider badges and the activation status line.
#[component]
pub fn CredentialSidebar(state: Signal<DashboardState>) -> Element {
    let mut state = state;
    let credentials = state.read().credentials().clone();
    let mut primary_input =
        use_signal(|| credentials.primary().unwrap_or_default().to_string());
    let mut secondary_input =
        use_signal(|| credentials.secondary().unwrap_or_default().to_string());

    let mut hide_status = move || {
        if state.peek().credentials().status().is_some() {
            state.write().credentials_mut().hide_status();
        }
    };

    let badges = credentials.badges();
    let status = credentials.status().cloned();

    rsx! {
        aside { class: "sidebar",
            h2 { "Chaves de API" }
            div { class: "provider-badges",
                for badge in badges {
                    span {
                        class: if badge.active { "provider-badge active" } else { "provider-badge" },
                        "{badge.text}"
                    }
                }
            }
            form {
                class: "key-form",
                onsubmit: move |evt: FormEvent| {
                    evt.prevent_default();
                    state.write().activate_keys(&primary_input(), &secondary_input());
                },
                label { r#for: "geminiKey", "Chave Google Gemini" }
                input {
                    id: "geminiKey",
                    r#type: "password",
                    autocomplete: "off",
                    placeholder: "Cole aqui sua chave do Gemini",
                    value: "{primary_input}",
                    oninput: move |evt| {
                        primary_input.set(evt.value());
                        hide_status();
                    },
                }
                label { r#for: "tavilyKey", "Chave Tavily (opcional)" }
                input {
                    id: "tavilyKey",
                    r#type: "password",
                    autocomplete: "off",
                    placeholder: "Pesquisa fiscal na web",
                    value: "{secondary_input}",
                    oninput: move |evt| {
                        secondary_input.set(evt.value());
                        hide_status();
                    },
                }
                button { class: "btn btn-primary", r#type: "submit", "Ativar chaves" }
            }
            StatusLine { status }
        }
    }
}
