//! Integration tests for the dashboard flows
//!
//! Drives the widget state machines against a mock backend that counts calls,
//! the same way the views do, without a rendering surface

use async_trait::async_trait;
use fiscal_dashboard::api::{
    ApiError, ApiResult, AuthForm, ChatReply, ChatRequest, ChatStats, Classification,
    CompanyProfile, DashboardMetrics, DocumentTaxes, FiscalBackend, FiscalData, ServerMessage,
    TRANSPORT_MESSAGE, TaxTotals, UploadItem, UploadRequest,
};
use fiscal_dashboard::charts::{ChartHandle, ChartSurface, FiscalCharts};
use fiscal_dashboard::chat::{CLEARED_MESSAGE, ChatLog, EMPTY_QUESTION_MESSAGE};
use fiscal_dashboard::dashboard::DashboardState;
use fiscal_dashboard::screens::{DASHBOARD_SCREENS, FISCAL_SCREEN_ID, SectionId, compose_screens};
use fiscal_dashboard::storage::MemoryStore;
use fiscal_dashboard::types::{Sender, StatusLevel};
use fiscal_dashboard::upload::{SelectedFile, SubmitBlocked, UploadResult, UploadWidget};
use serde_json::Value;
use std::cell::{Cell, RefCell};

#[derive(Default)]
struct MockBackend {
    chat_calls: Cell<usize>,
    clear_calls: Cell<usize>,
    upload_calls: Cell<usize>,
    fiscal_calls: Cell<usize>,
    fail_fiscal: Cell<bool>,
    fail_chat_transport: Cell<bool>,
    last_upload: RefCell<Option<UploadRequest>>,
    last_chat: RefCell<Option<ChatRequest>>,
}

fn sample_fiscal_data() -> FiscalData {
    let totals = TaxTotals {
        icms: 180.0,
        pis: 16.5,
        cofins: 76.0,
    };
    FiscalData {
        classificacao: vec![
            Classification {
                nota: "101".into(),
                tipo: "Entrada".into(),
            },
            Classification {
                nota: "102".into(),
                tipo: "Saída".into(),
            },
        ],
        consolidated: totals,
        per_document: vec![DocumentTaxes {
            nota: "101".into(),
            taxes: totals,
        }],
    }
}

#[async_trait(?Send)]
impl FiscalBackend for MockBackend {
    async fn login(&self, _form: &AuthForm) -> ApiResult<ServerMessage> {
        Ok(ServerMessage::default())
    }

    async fn register(&self, _form: &AuthForm) -> ApiResult<ServerMessage> {
        Ok(ServerMessage::default())
    }

    async fn logout(&self) -> ApiResult<ServerMessage> {
        Ok(ServerMessage::default())
    }

    async fn company_profile(&self) -> ApiResult<CompanyProfile> {
        Ok(CompanyProfile::default())
    }

    async fn update_rbt12(&self, _rbt12: f64) -> ApiResult<ServerMessage> {
        Ok(ServerMessage::default())
    }

    async fn dashboard_metrics(&self) -> ApiResult<DashboardMetrics> {
        Ok(DashboardMetrics::default())
    }

    async fn fiscal_data(&self) -> ApiResult<FiscalData> {
        self.fiscal_calls.set(self.fiscal_calls.get() + 1);
        if self.fail_fiscal.get() {
            return Err(ApiError::Application {
                status: 500,
                message: "Erro interno".into(),
            });
        }
        Ok(sample_fiscal_data())
    }

    async fn process_documents(&self, request: UploadRequest) -> ApiResult<Vec<UploadItem>> {
        self.upload_calls.set(self.upload_calls.get() + 1);
        let items = request
            .files
            .iter()
            .map(|file| UploadItem {
                arquivo: Some(file.name.clone()),
                nota: Some("101".into()),
                status: Some("Processado com sucesso".into()),
            })
            .collect();
        *self.last_upload.borrow_mut() = Some(request);
        Ok(items)
    }

    async fn chat(&self, request: &ChatRequest) -> ApiResult<ChatReply> {
        self.chat_calls.set(self.chat_calls.get() + 1);
        *self.last_chat.borrow_mut() = Some(request.clone());
        if self.fail_chat_transport.get() {
            return Err(ApiError::Transport("connection refused".into()));
        }
        Ok(ChatReply {
            resposta: Some(format!("Resposta para: {}", request.pergunta)),
            erro: None,
        })
    }

    async fn clear_chat(&self, _api_key: &str) -> ApiResult<ServerMessage> {
        self.clear_calls.set(self.clear_calls.get() + 1);
        Ok(ServerMessage::default())
    }

    async fn chat_stats(&self, _api_key: &str) -> ApiResult<ChatStats> {
        Ok(ChatStats::default())
    }
}

#[derive(Default)]
struct RecordingSurface {
    next: u64,
    live: Vec<ChartHandle>,
    log: Vec<String>,
}

impl ChartSurface for RecordingSurface {
    fn create(&mut self, canvas_id: &str, _config: &Value) -> ChartHandle {
        self.next += 1;
        let handle = ChartHandle(self.next);
        self.live.push(handle);
        self.log.push(format!("create {canvas_id}"));
        handle
    }

    fn destroy(&mut self, handle: ChartHandle) {
        assert!(self.live.contains(&handle), "destroyed an unknown chart");
        self.live.retain(|live| *live != handle);
        self.log.push("destroy".to_string());
    }
}

fn dashboard_with_keys(primary: &str, secondary: &str) -> DashboardState {
    let mut state = DashboardState::new(Box::new(MemoryStore::new())).expect("valid registry");
    state.activate_keys(primary, secondary);
    state
}

fn dashboard_with_key() -> DashboardState {
    dashboard_with_keys("gemini", "")
}

/// Submit the way the upload panel does: the backend is only called once
/// `begin_submit` hands out a request.
async fn submit_upload(
    widget: &mut UploadWidget,
    state: &mut DashboardState,
    backend: &MockBackend,
) -> Result<bool, SubmitBlocked> {
    let request = widget.begin_submit(state.credentials())?;
    let outcome = backend.process_documents(request).await;
    let reload = widget.finish_submit(outcome, state.credentials());
    if reload {
        state.documents_changed();
    }
    Ok(reload)
}

mod screen_tests {
    use super::*;

    #[test]
    fn test_one_tab_and_container_per_screen() {
        let layout = compose_screens(DASHBOARD_SCREENS, &SectionId::ALL);
        assert_eq!(layout.tabs.len(), DASHBOARD_SCREENS.len());
        assert_eq!(layout.screens.len(), DASHBOARD_SCREENS.len());

        let placed: Vec<SectionId> = layout
            .screens
            .iter()
            .flat_map(|screen| screen.sections.iter().copied())
            .collect();
        assert_eq!(placed.len(), SectionId::ALL.len());
        for section in SectionId::ALL {
            assert_eq!(placed.iter().filter(|s| **s == section).count(), 1);
        }
    }

    #[test]
    fn test_unknown_screen_keeps_previous_screen() {
        let mut state = dashboard_with_key();
        assert!(state.activate_screen("uploads"));
        assert!(!state.activate_screen("does-not-exist"));
        assert_eq!(state.tabs().active(), "uploads");
    }

    #[test]
    fn test_only_fiscal_screen_requests_a_load() {
        let mut state = dashboard_with_key();
        state.activate_screen("chat");
        assert_eq!(state.fiscal_revision(), 0);
        state.activate_screen(FISCAL_SCREEN_ID);
        assert_eq!(state.fiscal_revision(), 1);
        state.activate_screen(FISCAL_SCREEN_ID);
        assert_eq!(state.fiscal_revision(), 2);
    }
}

mod credential_tests {
    use super::*;

    #[test]
    fn test_primary_only_activation() {
        let mut state = DashboardState::new(Box::new(MemoryStore::new())).expect("valid registry");
        state.activate_keys("g", "t");
        assert!(state.credentials().is_secondary_active());

        state.activate_keys("g", "");
        assert!(state.credentials().is_primary_active());
        assert!(!state.credentials().is_secondary_active());
        assert_eq!(state.credential_revision(), 2);
    }

    #[test]
    fn test_empty_primary_reports_error() {
        let mut state = dashboard_with_key();
        state.activate_keys("", "x");
        assert!(!state.credentials().is_primary_active());
        let status = state.credentials().status().expect("status reported");
        assert_eq!(status.level, StatusLevel::Error);
    }
}

mod upload_tests {
    use super::*;

    #[tokio::test]
    async fn test_zero_files_never_reaches_the_backend() {
        let backend = MockBackend::default();
        let mut state = dashboard_with_key();
        let mut widget = UploadWidget::new();

        assert!(!widget.can_submit(state.credentials()));
        let outcome = submit_upload(&mut widget, &mut state, &backend).await;
        assert_eq!(outcome, Err(SubmitBlocked::NoFiles));
        assert_eq!(backend.upload_calls.get(), 0);
        assert_eq!(state.data_revision(), 0);
        assert!(!widget.can_submit(state.credentials()));
        assert!(!widget.result().expect("info shown").is_error());

        widget.select(vec![SelectedFile::new("nota.xml", b"<nfe/>".to_vec())]);
        assert_eq!(submit_upload(&mut widget, &mut state, &backend).await, Ok(true));
        assert_eq!(backend.upload_calls.get(), 1);
    }

    #[tokio::test]
    async fn test_successful_upload_reloads_dashboard_data() {
        let backend = MockBackend::default();
        let mut state = dashboard_with_keys("gemini", "tavily");
        let mut widget = UploadWidget::new();
        widget.select(vec![
            SelectedFile::new("nota-101.xml", b"<nfe/>".to_vec()),
            SelectedFile::new("nota-102.pdf", vec![0u8; 2048]),
        ]);

        let reload = submit_upload(&mut widget, &mut state, &backend)
            .await
            .expect("submit allowed");
        assert!(reload);
        assert!(!widget.is_submitting());

        assert_eq!(backend.upload_calls.get(), 1);
        let sent = backend.last_upload.borrow().clone().expect("request recorded");
        assert_eq!(sent.files.len(), 2);
        assert_eq!(sent.api_key, "gemini");
        assert_eq!(sent.tavily_key.as_deref(), Some("tavily"));

        assert!(!widget.has_selection());
        assert_eq!(state.data_revision(), 1);
        assert_eq!(state.fiscal_revision(), 1);
        match widget.result() {
            Some(UploadResult::Summary {
                summary, has_error, ..
            }) => {
                assert_eq!(summary, "2 arquivos processados");
                assert!(!has_error);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_key_blocks_and_keeps_selection() {
        let backend = MockBackend::default();
        let mut state = DashboardState::new(Box::new(MemoryStore::new())).expect("valid registry");
        let mut widget = UploadWidget::new();
        widget.select(vec![SelectedFile::new("nota.xml", b"<nfe/>".to_vec())]);

        assert_eq!(
            submit_upload(&mut widget, &mut state, &backend).await,
            Err(SubmitBlocked::MissingKey)
        );
        assert_eq!(backend.upload_calls.get(), 0);
        assert!(widget.has_selection());
    }
}

mod chat_tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_question_sends_nothing() {
        let backend = MockBackend::default();
        let mut state = dashboard_with_key();
        let mut log = ChatLog::new(state.credentials());

        let rejected = log.begin_send("   ", state.credentials_mut());
        assert!(rejected.is_err());
        assert_eq!(backend.chat_calls.get(), 0);
        assert_eq!(log.messages().len(), 1);
        assert_eq!(log.messages()[0].text, EMPTY_QUESTION_MESSAGE);
    }

    #[tokio::test]
    async fn test_question_without_key_sends_nothing() {
        let backend = MockBackend::default();
        let mut state = DashboardState::new(Box::new(MemoryStore::new())).expect("valid registry");
        let mut log = ChatLog::new(state.credentials());
        let before = log.messages().len();

        assert!(log.begin_send("Quanto paguei de ICMS?", state.credentials_mut()).is_err());
        assert_eq!(backend.chat_calls.get(), 0);
        assert_eq!(log.messages().len(), before + 1);
    }

    #[tokio::test]
    async fn test_round_trip_replaces_placeholder() {
        let backend = MockBackend::default();
        let mut state = dashboard_with_keys("gemini", "tavily");
        let mut log = ChatLog::new(state.credentials());

        let pending = log
            .begin_send("Quanto paguei de ICMS?", state.credentials_mut())
            .expect("send allowed");
        assert!(log.is_sending());
        assert_eq!(log.messages().len(), 2);

        let outcome = backend.chat(&pending.request).await;
        log.finish_send(&pending, outcome, state.credentials_mut());

        assert!(!log.is_sending());
        let messages = log.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].sender, Sender::User);
        assert_eq!(messages[1].sender, Sender::Bot);
        assert!(messages[1].text.starts_with("Resposta para:"));

        let sent = backend.last_chat.borrow().clone().expect("request recorded");
        assert_eq!(sent.api_key, "gemini");
        assert_eq!(sent.tavily_key, "tavily");
    }

    #[tokio::test]
    async fn test_transport_failure_reads_as_connectivity_error() {
        let backend = MockBackend::default();
        backend.fail_chat_transport.set(true);
        let mut state = dashboard_with_key();
        let mut log = ChatLog::new(state.credentials());

        let pending = log
            .begin_send("Oi", state.credentials_mut())
            .expect("send allowed");
        let outcome = backend.chat(&pending.request).await;
        log.finish_send(&pending, outcome, state.credentials_mut());

        let last = log.messages().last().expect("one result appended");
        assert_eq!(last.text, TRANSPORT_MESSAGE);
        assert_eq!(log.messages().len(), 2);
        assert!(state.credentials().status().is_some());
    }

    #[tokio::test]
    async fn test_clear_requires_confirmation() {
        let backend = MockBackend::default();
        let mut state = dashboard_with_key();
        let mut log = ChatLog::new(state.credentials());
        let pending = log
            .begin_send("Oi", state.credentials_mut())
            .expect("send allowed");
        let outcome = backend.chat(&pending.request).await;
        log.finish_send(&pending, outcome, state.credentials_mut());

        assert!(log.request_clear(state.credentials()));
        log.cancel_clear();
        assert!(log.confirm_clear(state.credentials()).is_none());
        assert_eq!(backend.clear_calls.get(), 0);

        assert!(log.request_clear(state.credentials()));
        let confirmed = log
            .confirm_clear(state.credentials())
            .expect("confirmed");
        let outcome = backend.clear_chat(&confirmed.api_key).await.map(|_| ());
        log.finish_clear(outcome);

        assert_eq!(backend.clear_calls.get(), 1);
        assert_eq!(log.messages().len(), 1);
        assert_eq!(log.messages()[0].text, CLEARED_MESSAGE);
    }
}

mod chart_tests {
    use super::*;

    #[tokio::test]
    async fn test_failure_then_success_shows_three_fresh_charts() {
        let backend = MockBackend::default();
        let mut charts = FiscalCharts::new(RecordingSurface::default());

        charts.begin_load();
        charts.finish_load(backend.fiscal_data().await);
        assert!(charts.panel().shows_charts());
        assert_eq!(charts.surface().live.len(), 3);

        backend.fail_fiscal.set(true);
        charts.begin_load();
        charts.finish_load(backend.fiscal_data().await);
        assert!(charts.panel().shows_error());
        assert!(!charts.panel().shows_charts());

        backend.fail_fiscal.set(false);
        charts.begin_load();
        charts.finish_load(backend.fiscal_data().await);
        assert!(charts.panel().shows_charts());
        assert!(!charts.panel().shows_error());
        assert_eq!(charts.surface().live.len(), 3);
        assert_eq!(charts.live_instances(), 3);
        assert_eq!(backend.fiscal_calls.get(), 3);

        let log = &charts.surface().log;
        let destroys = log.iter().filter(|entry| *entry == "destroy").count();
        assert_eq!(destroys, 3);
        // each destroy comes right before the create that replaces it
        let second_round = &log[3..];
        for pair in second_round.chunks(2) {
            assert_eq!(pair[0], "destroy");
            assert!(pair[1].starts_with("create "));
        }
    }
}
