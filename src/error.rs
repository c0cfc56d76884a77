use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParcelasError {
    #[error("Diretório de configuração não encontrado em {0}. Execute 'parcelas init' para criá-lo.")]
    ConfigNotFound(PathBuf),

    #[error("Arquivo de configuração não encontrado: {0}")]
    ConfigFileNotFound(PathBuf),

    #[error("Falha ao ler o arquivo {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Falha ao gravar o arquivo {path}: {reason}")]
    ConfigWrite { path: PathBuf, reason: String },

    #[error("Diretório de configuração já existe em {0}")]
    AlreadyInitialized(PathBuf),

    #[error("Sessão expirada ou inexistente. Execute 'parcelas login' para entrar.")]
    NotAuthenticated,

    #[error("CPF ou senha incorretos")]
    InvalidCredentials,

    #[error("As senhas não coincidem")]
    PasswordMismatch,

    #[error("Erro ao alterar senha")]
    PasswordChange,

    #[error("{0}")]
    PasswordRecovery(String),

    #[error("{0}")]
    LoadInstallments(String),

    #[error("Erro ao buscar a parcela")]
    FetchInstallment,

    #[error("Parcela não encontrada")]
    InstallmentNotFound(i64),

    #[error("A parcela {0} não está paga ou não possui recibo")]
    ReceiptUnavailable(i64),

    #[error("Caminho do recibo inválido")]
    InvalidReceiptPath(String),

    #[error("Erro ao baixar o recibo.")]
    ReceiptDownload,

    #[error("Não foi possível carregar os relatórios.")]
    ReportTypes,

    #[error("Erro ao gerar relatório: {0}")]
    ReportGeneration(String),

    #[error("Data inválida '{0}'. Use o formato AAAA-MM-DD.")]
    InvalidDate(String),

    #[error("Status inválido '{0}'. Use 'paga' ou 'pendente'.")]
    InvalidStatus(String),

    #[error("Filtro inválido '{0}'. Use todas, pagas, pendentes, atrasadas ou vence-hoje.")]
    InvalidFilter(String),

    #[error("Falha de comunicação com o servidor: {0}")]
    Http(#[from] ureq::Error),

    #[error("O servidor respondeu com status {status}")]
    Status {
        status: u16,
        message: Option<String>,
    },

    #[error("Resposta inesperada do servidor: {0}")]
    UnexpectedPayload(String),

    #[error("Falha ao interpretar a resposta do servidor: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Erro de E/S: {0}")]
    Io(#[from] std::io::Error),
}

impl ParcelasError {
    /// True when the backend rejected the bearer token.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ParcelasError::Status { status: 401 | 403, .. })
    }
}

pub type Result<T> = std::result::Result<T, ParcelasError>;
