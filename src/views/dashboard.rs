use crate::dashboard::DashboardState;
use crate::screens::{ComposedScreen, SectionId, TabControl};
use crate::ui::AppRoute;
use crate::views::chat::ChatPanel;
use crate::views::credentials::CredentialSidebar;
use crate::views::fiscal::FiscalDashboard;
use crate::views::overview::{CompanyInfoCard, MetricsCards};
use crate::views::shared::AppHeader;
use crate::views::upload::UploadPanel;
use dioxus::prelude::*;

const EMBEDDED_PREFIX: &str = "dashboard";

#[component]
pub fn DashboardView(route: Signal<AppRoute>, state: Signal<DashboardState>) -> Element {
    let layout = state.read().layout().clone();
    rsx! {
        div { class: "app-shell",
            AppHeader { route, current: AppRoute::Dashboard }
            div { class: "dashboard-body",
                CredentialSidebar { state }
                main { class: "dashboard-main",
                    nav { class: "tabs", role: "tablist",
                        for tab in layout.tabs {
                            TabButton { key: "{tab.screen_id}", state, tab }
                        }
                    }
                    div { class: "tab-panels",
                        for screen in layout.screens {
                            ScreenPanel { key: "{screen.id}", state, screen }
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn TabButton(state: Signal<DashboardState>, tab: TabControl) -> Element {
    let mut state = state;
    let active = state.read().tabs().is_active(tab.screen_id);
    let class = if active { "tab active" } else { "tab" };
    let screen_id = tab.screen_id;
    rsx! {
        button {
            class: class,
            r#type: "button",
            role: "tab",
            title: tab.title.unwrap_or_default(),
            aria_selected: active.to_string(),
            "data-screen-target": screen_id,
            onclick: move |_| {
                state.write().activate_screen(screen_id);
            },
            "{tab.label}"
        }
    }
}

#[component]
fn ScreenPanel(state: Signal<DashboardState>, screen: ComposedScreen) -> Element {
    let is_active = state.read().tabs().is_active(screen.id);
    let class_suffix = if is_active { "active" } else { "" };
    rsx! {
        div {
            id: "screen-{screen.id}",
            class: format_args!("tab-panel {}", class_suffix),
            role: "tabpanel",
            aria_hidden: (!is_active).to_string(),
            for section in screen.sections {
                SectionView { key: "{section:?}", state, section }
            }
        }
    }
}

#[component]
fn SectionView(state: Signal<DashboardState>, section: SectionId) -> Element {
    let content = match section {
        SectionId::CompanyInfo => rsx! { CompanyInfoCard { state } },
        SectionId::Metrics => rsx! { MetricsCards { state } },
        SectionId::FiscalCharts => rsx! { FiscalDashboard { state } },
        SectionId::Upload => rsx! { UploadPanel { state, id_prefix: EMBEDDED_PREFIX } },
        SectionId::Chat => rsx! { ChatPanel { state, id_prefix: EMBEDDED_PREFIX } },
    };
    rsx! {
        section { id: section.dom_id(), class: "dashboard-section", {content} }
    }
}
