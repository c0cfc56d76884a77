use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub cpf: &'a str,
    pub senha: &'a str,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct LoginResponse {
    pub token: String,
    /// Backend asks for a password change before normal use
    #[serde(rename = "primeiroAcesso", default)]
    pub first_access: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChangeRequest<'a> {
    pub cpf: &'a str,
    pub senha_atual: &'a str,
    pub nova_senha: &'a str,
}

#[derive(Debug, Serialize)]
pub struct RecoveryRequest<'a> {
    pub cpf: &'a str,
}

#[derive(Debug, Deserialize, Default)]
pub struct RecoveryResponse {
    #[serde(default)]
    pub mensagem: Option<String>,
}

/// Entry of `GET /relatorios/lista`
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ReportType {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "descricao", default)]
    pub description: String,
}
