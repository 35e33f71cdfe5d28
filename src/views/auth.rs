use crate::api::{AuthForm, SharedBackend};
use crate::ui::AppRoute;
use dioxus::prelude::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum AuthMode {
    Login,
    Register,
}

impl AuthMode {
    fn title(self) -> &'static str {
        match self {
            AuthMode::Login => "Entrar",
            AuthMode::Register => "Criar conta",
        }
    }

    fn submit_label(self) -> &'static str {
        match self {
            AuthMode::Login => "Entrar",
            AuthMode::Register => "Cadastrar",
        }
    }

    /// Where a successful submit leads.
    fn next_route(self) -> AppRoute {
        match self {
            AuthMode::Login => AppRoute::Dashboard,
            AuthMode::Register => AppRoute::Login,
        }
    }
}

#[component]
pub fn LoginView(route: Signal<AppRoute>) -> Element {
    rsx! { AuthCard { route, mode: AuthMode::Login } }
}

#[component]
pub fn RegisterView(route: Signal<AppRoute>) -> Element {
    rsx! { AuthCard { route, mode: AuthMode::Register } }
}

#[component]
fn AuthCard(route: Signal<AppRoute>, mode: AuthMode) -> Element {
    let backend = use_context::<SharedBackend>();
    let mut cnpj = use_signal(String::new);
    let mut senha = use_signal(String::new);
    let mut error = use_signal(|| Option::<String>::None);
    let mut busy = use_signal(|| false);
    let mut route = route;

    let submit = move |evt: FormEvent| {
        evt.prevent_default();
        if busy() {
            return;
        }
        let form = match AuthForm::new(&cnpj(), &senha()) {
            Ok(form) => form,
            Err(err) => {
                error.set(Some(err.user_message()));
                return;
            }
        };
        error.set(None);
        busy.set(true);
        let backend = backend.clone();
        spawn(async move {
            let outcome = match mode {
                AuthMode::Login => backend.login(&form).await,
                AuthMode::Register => backend.register(&form).await,
            };
            busy.set(false);
            match outcome {
                Ok(_) => {
                    tracing::info!(?mode, "authentication succeeded");
                    senha.set(String::new());
                    route.set(mode.next_route());
                }
                Err(err) => {
                    tracing::warn!(?mode, "authentication failed: {err}");
                    error.set(Some(err.user_message()));
                }
            }
        });
    };

    let title = mode.title();
    let submit_label = mode.submit_label();
    let password_autocomplete = match mode {
        AuthMode::Login => "current-password",
        AuthMode::Register => "new-password",
    };

    rsx! {
        div { class: "auth-page",
            form { class: "auth-card", onsubmit: submit,
                h1 { "Painel Fiscal" }
                h2 { "{title}" }
                label { r#for: "cnpj", "CNPJ" }
                input {
                    id: "cnpj",
                    r#type: "text",
                    autocomplete: "username",
                    placeholder: "00.000.000/0000-00",
                    value: "{cnpj}",
                    oninput: move |evt| cnpj.set(evt.value()),
                }
                label { r#for: "senha", "Senha" }
                input {
                    id: "senha",
                    r#type: "password",
                    autocomplete: password_autocomplete,
                    value: "{senha}",
                    oninput: move |evt| senha.set(evt.value()),
                }
                if let Some(message) = error() {
                    div { class: "status-line error", role: "alert", "{message}" }
                }
                button {
                    class: "btn btn-primary",
                    r#type: "submit",
                    disabled: busy(),
                    "{submit_label}"
                }
                {
                    match mode {
                        AuthMode::Login => rsx! {
                            p { class: "auth-switch",
                                "Ainda não tem conta? "
                                a {
                                    href: "#",
                                    onclick: move |evt| {
                                        evt.prevent_default();
                                        route.set(AppRoute::Register);
                                    },
                                    "Cadastre-se"
                                }
                            }
                        },
                        AuthMode::Register => rsx! {
                            p { class: "auth-switch",
                                "Já tem conta? "
                                a {
                                    href: "#",
                                    onclick: move |evt| {
                                        evt.prevent_default();
                                        route.set(AppRoute::Login);
                                    },
                                    "Entrar"
                                }
                            }
                        },
                    }
                }
            }
        }
    }
}
