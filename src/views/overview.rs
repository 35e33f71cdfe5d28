use crate::api::{CompanyProfile, DashboardMetrics, SharedBackend};
use crate::dashboard::DashboardState;
use crate::format::{format_brl, parse_rbt12};
use crate::screens::UPLOAD_SCREEN_ID;
use crate::types::StatusMessage;
use crate::views::shared::StatusLine;
use dioxus::prelude::*;

const INVALID_RBT12_MESSAGE: &str = "Informe um valor numérico válido e não negativo para o RBT12.";
const RBT12_SAVED_MESSAGE: &str = "RBT12 atualizado com sucesso!";
const NOT_INFORMED: &str = "Não informado";

#[component]
pub fn CompanyInfoCard(state: Signal<DashboardState>) -> Element {
    let backend = use_context::<SharedBackend>();
    let revision = use_memo(move || state.read().data_revision());
    let profile_backend = backend.clone();
    let profile = use_resource(move || {
        let backend = profile_backend.clone();
        let revision = revision();
        async move {
            tracing::debug!(revision, "loading company profile");
            backend.company_profile().await
        }
    });

    let mut editing = use_signal(|| false);
    let mut rbt12_input = use_signal(String::new);
    let mut feedback = use_signal(|| Option::<StatusMessage>::None);
    let mut saving = use_signal(|| false);

    let save = move |evt: FormEvent| {
        evt.prevent_default();
        let Some(value) = parse_rbt12(&rbt12_input()) else {
            feedback.set(Some(StatusMessage::error(INVALID_RBT12_MESSAGE)));
            return;
        };
        saving.set(true);
        let backend = backend.clone();
        let mut state = state;
        spawn(async move {
            match backend.update_rbt12(value).await {
                Ok(reply) => {
                    tracing::info!(rbt12 = value, "rbt12 updated");
                    feedback.set(Some(StatusMessage::success(
                        reply
                            .mensagem
                            .unwrap_or_else(|| RBT12_SAVED_MESSAGE.to_string()),
                    )));
                    editing.set(false);
                    state.write().company_changed();
                }
                Err(err) => {
                    tracing::warn!("rbt12 update failed: {err}");
                    feedback.set(Some(StatusMessage::error(err.user_message())));
                }
            }
            saving.set(false);
        });
    };

    let body = match profile.cloned() {
        None => rsx! { p { class: "muted", "Carregando dados da empresa..." } },
        Some(Err(err)) => {
            let message = err.user_message();
            rsx! {
                p { class: "status-line error", "Erro ao carregar dados da empresa: {message}" }
            }
        }
        Some(Ok(company)) => {
            let current_rbt12 = company.rbt12;
            rsx! {
                CompanyFields { company }
                if editing() {
                    form { class: "inline-form", onsubmit: save,
                        label { r#for: "rbt12Input", "RBT12 (R$)" }
                        input {
                            id: "rbt12Input",
                            r#type: "text",
                            inputmode: "decimal",
                            value: "{rbt12_input}",
                            oninput: move |evt| rbt12_input.set(evt.value()),
                        }
                        button { class: "btn btn-primary", r#type: "submit", disabled: saving(), "Salvar" }
                        button {
                            class: "btn btn-ghost",
                            r#type: "button",
                            onclick: move |_| {
                                editing.set(false);
                                feedback.set(None);
                            },
                            "Cancelar"
                        }
                    }
                } else {
                    button {
                        class: "btn btn-ghost",
                        r#type: "button",
                        onclick: move |_| {
                            let current = current_rbt12
                                .map(|value| format!("{value:.2}"))
                                .unwrap_or_default();
                            rbt12_input.set(current);
                            feedback.set(None);
                            editing.set(true);
                        },
                        "Editar RBT12"
                    }
                }
            }
        }
    };

    rsx! {
        div { class: "card company-card",
            h2 { "Dados da empresa" }
            {body}
            StatusLine { status: feedback() }
        }
    }
}

#[component]
fn CompanyFields(company: CompanyProfile) -> Element {
    let nome = company.nome.unwrap_or_else(|| NOT_INFORMED.to_string());
    let regime = company.regime.unwrap_or_else(|| NOT_INFORMED.to_string());
    let natureza = company.natureza.unwrap_or_else(|| NOT_INFORMED.to_string());
    let rbt12 = company
        .rbt12
        .map(format_brl)
        .unwrap_or_else(|| NOT_INFORMED.to_string());
    rsx! {
        dl { class: "company-fields",
            dt { "Empresa" }
            dd { "{nome}" }
            dt { "Regime tributário" }
            dd { "{regime}" }
            dt { "Natureza" }
            dd { "{natureza}" }
            dt { "RBT12" }
            dd { "{rbt12}" }
        }
    }
}

#[component]
pub fn MetricsCards(state: Signal<DashboardState>) -> Element {
    let backend = use_context::<SharedBackend>();
    let revision = use_memo(move || state.read().data_revision());
    let metrics = use_resource(move || {
        let backend = backend.clone();
        let revision = revision();
        async move {
            tracing::debug!(revision, "loading dashboard metrics");
            backend.dashboard_metrics().await
        }
    });
    let mut state = state;

    let cards = match metrics.cloned() {
        None => rsx! { p { class: "muted", "Carregando indicadores..." } },
        Some(Err(err)) => {
            let message = err.user_message();
            rsx! {
                p { class: "status-line error", "Erro ao carregar indicadores: {message}" }
            }
        }
        Some(Ok(metrics)) => rsx! { MetricGrid { metrics } },
    };

    rsx! {
        div { class: "card metrics-card",
            div { class: "card-header",
                h2 { "Indicadores" }
                button {
                    class: "btn btn-ghost",
                    r#type: "button",
                    onclick: move |_| {
                        state.write().activate_screen(UPLOAD_SCREEN_ID);
                    },
                    "Ir para envio"
                }
            }
            {cards}
        }
    }
}

#[component]
fn MetricGrid(metrics: DashboardMetrics) -> Element {
    let faturamento = format_brl(metrics.faturamento_total);
    let ticket = format_brl(metrics.ticket_medio);
    rsx! {
        div { class: "metric-grid",
            MetricCard { label: "Faturamento total", value: faturamento }
            MetricCard { label: "Notas fiscais", value: metrics.num_notas.to_string() }
            MetricCard { label: "Ticket médio", value: ticket }
            MetricCard { label: "Clientes", value: metrics.num_clientes.to_string() }
        }
    }
}

#[component]
fn MetricCard(label: &'static str, value: String) -> Element {
    rsx! {
        div { class: "metric",
            span { class: "metric-label", "{label}" }
            strong { class: "metric-value", "{value}" }
        }
    }
}
