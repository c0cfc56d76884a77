mod types;

pub use types::{
    LoginRequest, LoginResponse, PasswordChangeRequest, RecoveryRequest, RecoveryResponse,
    ReportType,
};

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use ureq::http::Response;
use ureq::typestate::WithBody;
use ureq::{Agent, Body, RequestBuilder};

use crate::config::ApiSettings;
use crate::error::{ParcelasError, Result};
use crate::parcela::{Installment, InstallmentSource};
use crate::report::ReportRequest;

/// Upper bound for PDF downloads (reports and receipts)
const MAX_DOCUMENT_BYTES: u64 = 50 * 1024 * 1024;

/// Blocking client for the installments backend.
///
/// Every request except login carries `Authorization: Bearer <token>` once a
/// token is attached.
pub struct ApiClient {
    agent: Agent,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(settings: &ApiSettings) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(settings.timeout_secs)))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorize<B>(&self, request: RequestBuilder<B>) -> RequestBuilder<B> {
        match &self.token {
            Some(token) => request.header("Authorization", format!("Bearer {token}")),
            None => request,
        }
    }

    fn get(&self, path: &str) -> Result<Response<Body>> {
        let url = self.url(path);
        log::debug!("GET {url}");
        let response = self.authorize(self.agent.get(&url)).call()?;
        check_status(response)
    }

    fn post(&self, path: &str) -> RequestBuilder<WithBody> {
        let url = self.url(path);
        log::debug!("POST {url}");
        self.agent.post(url)
    }

    fn put(&self, path: &str) -> RequestBuilder<WithBody> {
        let url = self.url(path);
        log::debug!("PUT {url}");
        self.agent.put(url)
    }

    /// Send a JSON body; the status is left for the caller to judge.
    fn send_json<T: Serialize>(
        &self,
        request: RequestBuilder<WithBody>,
        payload: &T,
    ) -> Result<Response<Body>> {
        let body = serde_json::to_string(payload)?;
        let response = request
            .header("Content-Type", "application/json")
            .send(body)?;
        Ok(response)
    }

    /// `POST /login`. Sent without a bearer token.
    pub fn login(&self, cpf: &str, senha: &str) -> Result<LoginResponse> {
        let response = self.send_json(self.post("/login"), &LoginRequest { cpf, senha })?;
        read_json(check_status(response)?)
    }

    /// `GET /parcelas`
    pub fn list_installments(&self) -> Result<Vec<Installment>> {
        let mut response = self.get("/parcelas")?;
        let body = response.body_mut().read_to_string()?;
        let value: serde_json::Value = serde_json::from_str(&body)?;
        if !value.is_array() {
            return Err(ParcelasError::UnexpectedPayload(snippet(&body)));
        }
        Ok(serde_json::from_value(value)?)
    }

    /// `GET /relatorios/lista`
    pub fn list_report_types(&self) -> Result<Vec<ReportType>> {
        read_json(self.get("/relatorios/lista")?)
    }

    /// `POST /relatorios/parcelas`, returning the PDF bytes
    pub fn generate_report(&self, request: &ReportRequest) -> Result<Vec<u8>> {
        let post = self.authorize(self.post("/relatorios/parcelas"));
        let response = self.send_json(post, request)?;
        read_bytes(check_status(response)?)
    }

    /// `PUT /alterar-senha-primeiro-acesso` or `PUT /alterar-senha`; returns the HTTP status
    pub fn change_password(
        &self,
        cpf: &str,
        senha_atual: &str,
        nova_senha: &str,
        first_access: bool,
    ) -> Result<u16> {
        let path = if first_access {
            "/alterar-senha-primeiro-acesso"
        } else {
            "/alterar-senha"
        };
        let payload = PasswordChangeRequest {
            cpf,
            senha_atual,
            nova_senha,
        };
        let response = self.send_json(self.authorize(self.put(path)), &payload)?;
        Ok(response.status().as_u16())
    }

    /// `POST /recuperar-senha`
    pub fn recover_password(&self, cpf: &str) -> Result<RecoveryResponse> {
        let request = self.authorize(self.post("/recuperar-senha"));
        let response = self.send_json(request, &RecoveryRequest { cpf })?;
        let mut response = check_status(response)?;
        let body = response.body_mut().read_to_string()?;
        if body.trim().is_empty() {
            return Ok(RecoveryResponse::default());
        }
        Ok(serde_json::from_str(&body)?)
    }

    /// `GET /files/download/{file_name}`
    pub fn download_receipt(&self, file_name: &str) -> Result<Vec<u8>> {
        read_bytes(self.get(&format!("/files/download/{file_name}"))?)
    }
}

impl InstallmentSource for ApiClient {
    fn fetch_installments(&self) -> Result<Vec<Installment>> {
        self.list_installments()
    }
}

fn check_status(mut response: Response<Body>) -> Result<Response<Body>> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response
        .body_mut()
        .read_to_string()
        .ok()
        .and_then(|body| backend_message(&body));
    log::debug!("backend answered {status}: {message:?}");

    Err(ParcelasError::Status {
        status: status.as_u16(),
        message,
    })
}

/// The backend reports failures as `{"mensagem": "..."}`
fn backend_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value.get("mensagem")?.as_str().map(str::to_string)
}

fn read_json<T: DeserializeOwned>(mut response: Response<Body>) -> Result<T> {
    let body = response.body_mut().read_to_string()?;
    Ok(serde_json::from_str(&body)?)
}

fn read_bytes(mut response: Response<Body>) -> Result<Vec<u8>> {
    let bytes = response
        .body_mut()
        .with_config()
        .limit(MAX_DOCUMENT_BYTES)
        .read_to_vec()?;
    Ok(bytes)
}

fn snippet(body: &str) -> String {
    const MAX: usize = 120;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> ApiClient {
        ApiClient::new(&ApiSettings {
            base_url: base_url.to_string(),
            timeout_secs: 5,
        })
    }

    #[test]
    fn joins_paths_without_double_slashes() {
        let api = client("http://localhost:8080/api/");
        assert_eq!(api.base_url(), "http://localhost:8080/api");
        assert_eq!(api.url("/parcelas"), "http://localhost:8080/api/parcelas");
        assert_eq!(
            api.url("files/download/r.pdf"),
            "http://localhost:8080/api/files/download/r.pdf"
        );
    }

    #[test]
    fn extracts_backend_message() {
        assert_eq!(
            backend_message(r#"{"mensagem":"CPF não encontrado"}"#),
            Some("CPF não encontrado".to_string())
        );
        assert_eq!(backend_message(r#"{"erro":"x"}"#), None);
        assert_eq!(backend_message("<html>"), None);
    }

    #[test]
    fn snippet_truncates_on_char_boundary() {
        let long = "ã".repeat(200);
        let cut = snippet(&long);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), 123);
        assert_eq!(snippet("{}"), "{}");
    }
}
