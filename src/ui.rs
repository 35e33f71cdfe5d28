use crate::api::{ApiClient, SharedBackend};
use crate::config::AppConfig;
use crate::dashboard::DashboardState;
use crate::storage::open_platform_store;
use crate::theme::ROOT_VARIABLES;
use crate::views::{ChatPage, DashboardView, LoginView, RegisterView, UploadPage};
use anyhow::Context;
use dioxus::prelude::*;
use std::rc::Rc;

const DASHBOARD_CSS: Asset = asset!("/assets/dashboard.css");
const CHART_JS_SRC: &str = "https://cdn.jsdelivr.net/npm/chart.js@4.4.0/dist/chart.umd.min.js";

/// Top-level pages.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppRoute {
    Login,
    Register,
    Dashboard,
    Upload,
    Chat,
}

fn open_dashboard(config: &AppConfig) -> anyhow::Result<DashboardState> {
    let store = open_platform_store(&config.storage_namespace);
    DashboardState::new(store).context("dashboard screen registry is invalid")
}

#[component]
pub fn App() -> Element {
    let config = use_hook(AppConfig::load);
    let backend_config = config.clone();
    use_context_provider(move || Rc::new(ApiClient::new(backend_config)) as SharedBackend);

    let route = use_signal(|| AppRoute::Login);
    let state = use_hook(move || match open_dashboard(&config) {
        Ok(state) => Some(Signal::new(state)),
        Err(err) => {
            tracing::error!("{err:#}");
            None
        }
    });

    rsx! {
        document::Link { rel: "stylesheet", href: DASHBOARD_CSS }
        document::Script { src: CHART_JS_SRC }
        style { dangerous_inner_html: ROOT_VARIABLES }
        {
            match state {
                Some(state) => rsx! { RouteView { route, state } },
                None => rsx! { StartupError {} },
            }
        }
    }
}

#[component]
fn RouteView(route: Signal<AppRoute>, state: Signal<DashboardState>) -> Element {
    match route() {
        AppRoute::Login => rsx! { LoginView { route } },
        AppRoute::Register => rsx! { RegisterView { route } },
        AppRoute::Dashboard => rsx! { DashboardView { route, state } },
        AppRoute::Upload => rsx! { UploadPage { route, state } },
        AppRoute::Chat => rsx! { ChatPage { route, state } },
    }
}

#[component]
fn StartupError() -> Element {
    rsx! {
        div { class: "auth-page",
            div { class: "auth-card",
                h1 { "Painel Fiscal" }
                p { class: "status-line error",
                    "Não foi possível iniciar o painel. Recarregue a página."
                }
            }
        }
    }
}
