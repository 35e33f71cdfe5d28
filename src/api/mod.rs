/// HTTP access to the fiscal backend.
///
/// - `client` - reqwest-based `ApiClient`
/// - `error` - the error taxonomy every widget reports from
/// - `types` - request and response payloads
///
/// Widgets talk to a `FiscalBackend` trait object so the dashboard can be
/// driven by a mock in tests.
mod client;
mod error;
mod types;

use async_trait::async_trait;
use std::rc::Rc;

pub use client::ApiClient;
pub use error::{ApiError, ApiResult, TRANSPORT_MESSAGE, error_message_from_body};
pub use types::{
    AuthForm, ChatReply, ChatRequest, ChatStats, Classification, CompanyProfile,
    DashboardMetrics, DocumentTaxes, FiscalData, MISSING_CREDENTIALS_MESSAGE, ServerMessage,
    TaxTotals, UploadFile, UploadItem, UploadRequest, parse_upload_items,
};

/// Backend handle shared through the component tree.
pub type SharedBackend = Rc<dyn FiscalBackend>;

#[async_trait(?Send)]
pub trait FiscalBackend {
    async fn login(&self, form: &AuthForm) -> ApiResult<ServerMessage>;

    async fn register(&self, form: &AuthForm) -> ApiResult<ServerMessage>;

    async fn logout(&self) -> ApiResult<ServerMessage>;

    async fn company_profile(&self) -> ApiResult<CompanyProfile>;

    async fn update_rbt12(&self, rbt12: f64) -> ApiResult<ServerMessage>;

    async fn dashboard_metrics(&self) -> ApiResult<DashboardMetrics>;

    async fn fiscal_data(&self) -> ApiResult<FiscalData>;

    async fn process_documents(&self, request: UploadRequest) -> ApiResult<Vec<UploadItem>>;

    async fn chat(&self, request: &ChatRequest) -> ApiResult<ChatReply>;

    async fn clear_chat(&self, api_key: &str) -> ApiResult<ServerMessage>;

    async fn chat_stats(&self, api_key: &str) -> ApiResult<ChatStats>;
}
