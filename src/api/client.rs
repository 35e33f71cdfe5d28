use super::error::{ApiError, ApiResult, error_message_from_body};
use super::types::{
    AuthForm, ChatReply, ChatRequest, ChatStats, CompanyProfile, DashboardMetrics, FiscalData,
    ServerMessage, UploadItem, UploadRequest, parse_upload_items,
};
use super::FiscalBackend;
use crate::config::AppConfig;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

/// Client for the fiscal dashboard API.
///
/// The API authenticates with a session cookie set by `/login`, so every
/// request carries the browser's credentials (or a cookie store on native).
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: AppConfig,
}

impl ApiClient {
    pub fn new(config: AppConfig) -> Self {
        Self {
            http: build_http_client(),
            config,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        with_session(self.http.request(method, self.config.endpoint(path)))
    }

    /// Send and decode. Non-2xx becomes `Application`, no response becomes
    /// `Transport`, and an unreadable 2xx body decodes to `T::default()`.
    async fn execute<T>(&self, request: RequestBuilder, fallback: &str) -> ApiResult<T>
    where
        T: DeserializeOwned + Default,
    {
        let response = request.send().await?;
        let status = response.status();
        let url = response.url().path().to_string();
        let body = response.text().await?;

        if !status.is_success() {
            let message = error_message_from_body(&body, status, fallback);
            tracing::debug!(%url, status = status.as_u16(), %message, "api call failed");
            return Err(ApiError::Application {
                status: status.as_u16(),
                message,
            });
        }

        Ok(decode_lenient(&url, &body))
    }
}

fn decode_lenient<T>(url: &str, body: &str) -> T
where
    T: DeserializeOwned + Default,
{
    if body.trim().is_empty() {
        return T::default();
    }
    match serde_json::from_str(body) {
        Ok(parsed) => parsed,
        Err(err) => {
            tracing::warn!(url, "response is not valid JSON: {err}");
            T::default()
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn build_http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .build()
        .unwrap_or_else(|err| {
            tracing::warn!("falling back to default HTTP client: {err}");
            reqwest::Client::new()
        })
}

#[cfg(target_arch = "wasm32")]
fn build_http_client() -> reqwest::Client {
    reqwest::Client::new()
}

#[cfg(target_arch = "wasm32")]
fn with_session(request: RequestBuilder) -> RequestBuilder {
    request.fetch_credentials_include()
}

#[cfg(not(target_arch = "wasm32"))]
fn with_session(request: RequestBuilder) -> RequestBuilder {
    request
}

fn upload_form(request: UploadRequest) -> Form {
    let mut form = Form::new();
    for file in request.files {
        let part = Part::bytes(file.bytes).file_name(file.name);
        form = form.part("files", part);
    }
    form = form.text("api_key", request.api_key);
    if let Some(tavily_key) = request.tavily_key {
        form = form.text("tavily_key", tavily_key);
    }
    form
}

#[async_trait(?Send)]
impl FiscalBackend for ApiClient {
    async fn login(&self, form: &AuthForm) -> ApiResult<ServerMessage> {
        let request = self.request(Method::POST, "/login").json(form);
        self.execute(request, "CNPJ ou senha inválidos").await
    }

    async fn register(&self, form: &AuthForm) -> ApiResult<ServerMessage> {
        let request = self.request(Method::POST, "/register").json(form);
        self.execute(request, "Erro ao cadastrar").await
    }

    async fn logout(&self) -> ApiResult<ServerMessage> {
        let request = self.request(Method::POST, "/logout");
        self.execute(request, "Falha ao sair").await
    }

    async fn company_profile(&self) -> ApiResult<CompanyProfile> {
        let request = self.request(Method::GET, "/api/usuario_dados");
        self.execute(request, "Erro ao carregar dados").await
    }

    async fn update_rbt12(&self, rbt12: f64) -> ApiResult<ServerMessage> {
        let request = self
            .request(Method::POST, "/api/atualizar_rbt12")
            .json(&json!({ "rbt12": rbt12 }));
        self.execute(request, "Erro ao salvar RBT12").await
    }

    async fn dashboard_metrics(&self) -> ApiResult<DashboardMetrics> {
        let request = self.request(Method::GET, "/api/dashboard_metrics");
        self.execute(request, "Erro ao carregar métricas").await
    }

    async fn fiscal_data(&self) -> ApiResult<FiscalData> {
        let request = self.request(Method::GET, "/api/fiscal_data");
        self.execute(request, "Erro ao carregar dados fiscais").await
    }

    async fn process_documents(&self, request: UploadRequest) -> ApiResult<Vec<UploadItem>> {
        let count = request.files.len();
        let builder = self
            .request(Method::POST, "/api/process-documents")
            .multipart(upload_form(request));
        tracing::info!(files = count, "uploading documents");
        let body: Value = self.execute(builder, "Falha no processamento.").await?;
        Ok(parse_upload_items(body))
    }

    async fn chat(&self, request: &ChatRequest) -> ApiResult<ChatReply> {
        let builder = self.request(Method::POST, "/api/chat").json(request);
        self.execute(builder, "Sem resposta da IA.").await
    }

    async fn clear_chat(&self, api_key: &str) -> ApiResult<ServerMessage> {
        let request = self
            .request(Method::POST, "/api/chat/clear")
            .json(&json!({ "apiKey": api_key }));
        self.execute(request, "Erro desconhecido").await
    }

    async fn chat_stats(&self, api_key: &str) -> ApiResult<ChatStats> {
        let request = self
            .request(Method::GET, "/api/chat/stats")
            .query(&[("apiKey", api_key)]);
        self.execute(request, "Erro ao obter estatísticas").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lenient_decode_defaults_on_garbage() {
        let metrics: DashboardMetrics = decode_lenient("/api/dashboard_metrics", "<html>oops");
        assert_eq!(metrics, DashboardMetrics::default());

        let empty: ChatReply = decode_lenient("/api/chat", "   ");
        assert_eq!(empty, ChatReply::default());
    }

    #[test]
    fn lenient_decode_reads_valid_json() {
        let reply: ChatReply = decode_lenient("/api/chat", r#"{"resposta": "Olá"}"#);
        assert_eq!(reply.resposta.as_deref(), Some("Olá"));
    }

    #[tokio::test]
    async fn unreachable_server_is_a_transport_error() {
        let client = ApiClient::new(AppConfig {
            api_base_url: "http://127.0.0.1:9".to_string(),
            ..AppConfig::default()
        });
        let err = client.dashboard_metrics().await.unwrap_err();
        assert!(err.is_transport());
    }
}
