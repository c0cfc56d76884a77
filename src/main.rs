use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};

use parcelas::api::ApiClient;
use parcelas::config::{config_dir, load_config, resolve_output_dir, Config, CONFIG_TEMPLATE};
use parcelas::error::{ParcelasError, Result};
use parcelas::format::{format_brl, format_cpf, format_date};
use parcelas::parcela::{
    filter_and_sort, find_by_id, receipt_file_name, Filter, Installment, InstallmentStore,
};
use parcelas::report::{parse_date, report_file_name, PaidStatus, ReportRequest, REPORT_BY_DATE};
use parcelas::session::{
    clear_session, load_session, require_session, save_session, session_state, Session,
    SessionState,
};

const FIRST_ACCESS_MESSAGE: &str = "É seu primeiro acesso, por favor, atualize sua senha.";
const RECOVERY_DEFAULT_MESSAGE: &str =
    "Instruções de recuperação de senha foram enviadas para seu WhatsApp.";
const RECOVERY_ERROR_MESSAGE: &str = "Ocorreu um erro ao tentar recuperar a senha.";

#[derive(Parser)]
#[command(name = "parcelas")]
#[command(version, about = "Cliente de linha de comando para o backend de parcelas", long_about = None)]
struct Cli {
    /// Diretório de configuração (padrão: ~/.parcelas ou diretório XDG)
    #[arg(short = 'C', long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Cria o diretório de configuração com um config.toml modelo
    Init,

    /// Mostra configuração e situação da sessão
    Status,

    /// Entra com CPF e senha e guarda a sessão
    Login {
        /// CPF (com ou sem pontuação)
        #[arg(long)]
        cpf: String,

        #[arg(long)]
        senha: String,
    },

    /// Encerra a sessão atual
    Logout,

    /// Altera a senha do usuário
    AlterarSenha {
        #[arg(long)]
        cpf: String,

        #[arg(long)]
        senha_atual: String,

        #[arg(long)]
        nova_senha: String,

        #[arg(long)]
        repetir_nova_senha: String,

        /// Troca obrigatória de senha do primeiro acesso (não exige sessão)
        #[arg(long)]
        primeiro_acesso: bool,
    },

    /// Solicita a recuperação de senha
    RecuperarSenha {
        #[arg(long)]
        cpf: String,
    },

    /// Lista as parcelas ordenadas pelo vencimento
    Parcelas {
        /// todas, pagas, pendentes, atrasadas ou vence-hoje
        #[arg(short, long, default_value = "todas")]
        filtro: String,
    },

    /// Mostra os detalhes de uma parcela
    Parcela {
        /// Identificador da parcela
        id: i64,
    },

    /// Baixa o recibo de uma parcela paga
    Recibo {
        /// Identificador da parcela
        id: i64,

        /// Caminho do arquivo (padrão: diretório de saída/recibo_<arquivo>)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Abre o PDF no visualizador padrão
        #[arg(long)]
        open: bool,
    },

    /// Lista os relatórios disponíveis
    Relatorios,

    /// Gera um relatório em PDF
    Relatorio {
        /// Nome do relatório (veja 'parcelas relatorios')
        tipo: String,

        /// Cliente do relatório
        #[arg(long, default_value_t = 1)]
        cliente_id: i64,

        /// Data inicial AAAA-MM-DD (parcelas_por_data, padrão: hoje)
        #[arg(long)]
        inicio: Option<String>,

        /// Data final AAAA-MM-DD (parcelas_por_data, padrão: hoje)
        #[arg(long)]
        fim: Option<String>,

        /// Situação da parcela: paga ou pendente
        #[arg(long)]
        status: Option<String>,

        /// Caminho do arquivo (padrão: diretório de saída/relatorio-<tipo>-<data>.pdf)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Abre o PDF no visualizador padrão
        #[arg(long)]
        open: bool,
    },
}

fn main() {
    dotenv::dotenv().ok();
    pretty_env_logger::init();

    if let Err(e) = run() {
        eprintln!("Erro: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let cfg_dir = match cli.config_dir {
        Some(p) => p,
        None => config_dir()?,
    };

    match cli.command {
        Commands::Init => cmd_init(&cfg_dir),
        Commands::Status => cmd_status(&cfg_dir),
        Commands::Login { cpf, senha } => cmd_login(&cfg_dir, &cpf, &senha),
        Commands::Logout => cmd_logout(&cfg_dir),
        Commands::AlterarSenha {
            cpf,
            senha_atual,
            nova_senha,
            repetir_nova_senha,
            primeiro_acesso,
        } => cmd_change_password(
            &cfg_dir,
            &cpf,
            &senha_atual,
            &nova_senha,
            &repetir_nova_senha,
            primeiro_acesso,
        ),
        Commands::RecuperarSenha { cpf } => cmd_recover_password(&cfg_dir, &cpf),
        Commands::Parcelas { filtro } => cmd_installments(&cfg_dir, &filtro),
        Commands::Parcela { id } => cmd_installment(&cfg_dir, id),
        Commands::Recibo { id, output, open } => cmd_receipt(&cfg_dir, id, output, open),
        Commands::Relatorios => cmd_report_types(&cfg_dir),
        Commands::Relatorio {
            tipo,
            cliente_id,
            inicio,
            fim,
            status,
            output,
            open,
        } => cmd_report(
            &cfg_dir, &tipo, cliente_id, inicio, fim, status, output, open,
        ),
    }
}

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Client carrying the stored token, or `NotAuthenticated` when there is none
fn authed_client(cfg_dir: &Path, config: &Config) -> Result<ApiClient> {
    let token = require_session(cfg_dir, &config.session, now())?;
    Ok(ApiClient::new(&config.api).with_token(token))
}

/// Client carrying the stored token when one exists, for the public endpoints
fn optional_client(cfg_dir: &Path, config: &Config) -> ApiClient {
    let api = ApiClient::new(&config.api);
    match load_session(cfg_dir) {
        Ok(Some(session)) => api.with_token(session.token),
        _ => api,
    }
}

/// A rejected token logs the user out; they must run `parcelas login` again.
fn logout_if_rejected(cfg_dir: &Path, err: ParcelasError) -> ParcelasError {
    if err.is_unauthorized() || matches!(err, ParcelasError::NotAuthenticated) {
        if let Err(e) = clear_session(cfg_dir) {
            log::warn!("could not remove session file: {e}");
        }
        return ParcelasError::NotAuthenticated;
    }
    err
}

/// Initialize config directory with the template file
fn cmd_init(cfg_dir: &Path) -> Result<()> {
    if cfg_dir.exists() {
        return Err(ParcelasError::AlreadyInitialized(cfg_dir.to_path_buf()));
    }

    fs::create_dir_all(cfg_dir)?;
    fs::create_dir_all(cfg_dir.join("output"))?;
    fs::write(cfg_dir.join("config.toml"), CONFIG_TEMPLATE)?;

    println!("Configuração criada em: {}", cfg_dir.display());
    println!();
    println!("Próximos passos:");
    println!(
        "  1. Ajuste o endereço da API:  $EDITOR {}/config.toml",
        cfg_dir.display()
    );
    println!("  2. Entre com seu CPF:         parcelas login --cpf <cpf> --senha <senha>");

    Ok(())
}

/// Show configuration and session state
fn cmd_status(cfg_dir: &Path) -> Result<()> {
    let config = load_config(cfg_dir)?;
    let state = session_state(cfg_dir, &config.session, now())?;
    let output_dir = resolve_output_dir(&config.output.dir, cfg_dir);

    let session = match state {
        SessionState::Missing => "nenhuma".to_string(),
        SessionState::LocalExpired => "expirada (tempo local de sessão)".to_string(),
        SessionState::TokenExpired => "expirada (token)".to_string(),
        SessionState::Active { expires_at } => {
            match chrono::DateTime::from_timestamp(expires_at, 0) {
                Some(at) => format!(
                    "ativa até {}",
                    at.with_timezone(&Local).format("%d/%m/%Y %H:%M")
                ),
                None => "ativa".to_string(),
            }
        }
    };

    println!("Parcelas");
    println!("{}", "-".repeat(50));
    println!("Diretório de configuração: {}", cfg_dir.display());
    println!("API:                       {}", config.api.base_url);
    println!("Diretório de saída:        {}", output_dir.display());
    println!("Sessão:                    {session}");

    Ok(())
}

/// Log in and store the session
fn cmd_login(cfg_dir: &Path, cpf: &str, senha: &str) -> Result<()> {
    let config = load_config(cfg_dir)?;
    let api = ApiClient::new(&config.api);

    let cpf = format_cpf(cpf);
    let response = api.login(&cpf, senha).map_err(|e| {
        log::debug!("login failed: {e}");
        ParcelasError::InvalidCredentials
    })?;

    save_session(cfg_dir, &Session::new(response.token, now()))?;

    if response.first_access {
        println!("{FIRST_ACCESS_MESSAGE}");
        println!(
            "Use: parcelas alterar-senha --primeiro-acesso --cpf {cpf} --senha-atual <senha> \
             --nova-senha <nova> --repetir-nova-senha <nova>"
        );
    } else {
        println!("Login realizado com sucesso.");
    }

    Ok(())
}

fn cmd_logout(cfg_dir: &Path) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(ParcelasError::ConfigNotFound(cfg_dir.to_path_buf()));
    }

    if clear_session(cfg_dir)? {
        println!("Sessão encerrada.");
    } else {
        println!("Nenhuma sessão ativa.");
    }
    Ok(())
}

/// Change the password, either the mandatory first-access change or a regular one
fn cmd_change_password(
    cfg_dir: &Path,
    cpf: &str,
    senha_atual: &str,
    nova_senha: &str,
    repetir_nova_senha: &str,
    first_access: bool,
) -> Result<()> {
    if nova_senha != repetir_nova_senha {
        return Err(ParcelasError::PasswordMismatch);
    }

    let config = load_config(cfg_dir)?;
    let api = if first_access {
        optional_client(cfg_dir, &config)
    } else {
        authed_client(cfg_dir, &config)?
    };

    let cpf = format_cpf(cpf);
    let status = api
        .change_password(&cpf, senha_atual, nova_senha, first_access)
        .map_err(|e| {
            log::debug!("password change failed: {e}");
            ParcelasError::PasswordChange
        })?;

    match status {
        200 => {
            println!("Senha atualizada com sucesso!");
            if first_access {
                println!("Entre novamente com: parcelas login --cpf {cpf} --senha <nova senha>");
            }
            Ok(())
        }
        401 | 403 if !first_access => Err(logout_if_rejected(
            cfg_dir,
            ParcelasError::Status {
                status,
                message: None,
            },
        )),
        _ => {
            log::debug!("password change answered {status}");
            Err(ParcelasError::PasswordChange)
        }
    }
}

fn cmd_recover_password(cfg_dir: &Path, cpf: &str) -> Result<()> {
    let config = load_config(cfg_dir)?;
    let api = optional_client(cfg_dir, &config);

    let cpf = format_cpf(cpf);
    match api.recover_password(&cpf) {
        Ok(response) => {
            let message = response
                .mensagem
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| RECOVERY_DEFAULT_MESSAGE.to_string());
            println!("{message}");
            println!(
                "Depois, defina a nova senha com: parcelas alterar-senha --primeiro-acesso --cpf {cpf} ..."
            );
            Ok(())
        }
        Err(ParcelasError::Status {
            message: Some(message),
            ..
        }) => Err(ParcelasError::PasswordRecovery(message)),
        Err(e) => {
            log::debug!("password recovery failed: {e}");
            Err(ParcelasError::PasswordRecovery(
                RECOVERY_ERROR_MESSAGE.to_string(),
            ))
        }
    }
}

#[derive(Tabled)]
struct InstallmentRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "DOCUMENTO")]
    document: String,
    #[tabled(rename = "CLIENTE")]
    customer: String,
    #[tabled(rename = "VALOR")]
    amount: String,
    #[tabled(rename = "VENCIMENTO")]
    due_date: String,
    #[tabled(rename = "STATUS")]
    status: String,
}

#[derive(Tabled)]
struct ReportTypeRow {
    #[tabled(rename = "NOME")]
    name: String,
    #[tabled(rename = "DESCRIÇÃO")]
    description: String,
}

/// List installments with the chosen filter, earliest due date first
fn cmd_installments(cfg_dir: &Path, filtro: &str) -> Result<()> {
    let filter: Filter = filtro.parse()?;
    let config = load_config(cfg_dir)?;
    let api = authed_client(cfg_dir, &config)?;

    let mut store = InstallmentStore::new();
    store
        .fetch(&api)
        .map_err(|e| logout_if_rejected(cfg_dir, e))?;
    if let Some(error) = store.error() {
        return Err(ParcelasError::LoadInstallments(error.to_string()));
    }

    let today = today();
    let selected = filter_and_sort(store.records(), filter, today);

    if selected.is_empty() {
        println!("Não há parcelas para mostrar.");
        return Ok(());
    }

    let rows: Vec<InstallmentRow> = selected
        .iter()
        .map(|record| InstallmentRow {
            id: record.id,
            document: record.document.clone(),
            customer: record.customer.name.clone(),
            amount: format_brl(record.display_amount()),
            due_date: format_date(record.due_date),
            status: record.status(today).to_string(),
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");
    println!();
    println!(
        "{} de {} parcela(s) (filtro: {})",
        selected.len(),
        store.records().len(),
        filter.as_str()
    );

    Ok(())
}

/// Fetch the list and pick one record, the way the detail view does
fn fetch_installment(cfg_dir: &Path, api: &ApiClient, id: i64) -> Result<Installment> {
    let records = api.list_installments().map_err(|e| {
        if e.is_unauthorized() {
            logout_if_rejected(cfg_dir, e)
        } else {
            log::debug!("installment fetch failed: {e}");
            ParcelasError::FetchInstallment
        }
    })?;

    find_by_id(&records, id)
        .cloned()
        .ok_or(ParcelasError::InstallmentNotFound(id))
}

/// Show one installment in detail
fn cmd_installment(cfg_dir: &Path, id: i64) -> Result<()> {
    let config = load_config(cfg_dir)?;
    let api = authed_client(cfg_dir, &config)?;
    let record = fetch_installment(cfg_dir, &api, id)?;

    println!("{}", record.document);
    println!("{}", "-".repeat(50));

    println!("Cliente");
    println!("  Nome:          {}", record.customer.name);
    println!("  CPF:           {}", record.customer.cpf);
    println!("  Telefone:      {}", record.customer.phone);
    if !record.customer.address.is_empty() {
        println!("  Endereço:      {}", record.customer.address);
    }
    println!();

    println!("Parcela");
    println!("  Nº de parcelas: {}", record.installment_count);
    println!("  Valor:          {}", format_brl(record.amount));
    println!("  Valor pago:     {}", format_brl(record.amount_paid));
    println!("  Desconto:       {}", format_brl(record.discount));
    println!("  Parcela atual:  {}", record.number);
    println!("  Intervalo:      {}", record.interval);
    println!("  Vencimento:     {}", format_date(record.due_date));
    println!(
        "  Status:         {}",
        if record.paid { "Paga" } else { "Pendente" }
    );
    println!();

    println!("Produto");
    println!("  Nome:          {}", record.product.name);
    println!("  Descrição:     {}", record.product.description);
    println!("  Valor total:   {}", format_brl(record.product.total_value));

    if record.paid {
        println!();
        if record.receipt_uri().is_some() {
            println!("Recibo disponível: parcelas recibo {}", record.id);
        } else {
            println!("Recibo indisponível.");
        }
    }

    Ok(())
}

/// Download the receipt of a paid installment
fn cmd_receipt(cfg_dir: &Path, id: i64, output: Option<PathBuf>, open: bool) -> Result<()> {
    let config = load_config(cfg_dir)?;
    let api = authed_client(cfg_dir, &config)?;
    let record = fetch_installment(cfg_dir, &api, id)?;

    let uri = record
        .receipt_uri()
        .ok_or(ParcelasError::ReceiptUnavailable(id))?;
    let file_name = receipt_file_name(uri)
        .ok_or_else(|| ParcelasError::InvalidReceiptPath(uri.to_string()))?;

    let bytes = api.download_receipt(file_name).map_err(|e| {
        if e.is_unauthorized() {
            logout_if_rejected(cfg_dir, e)
        } else {
            log::error!("receipt download failed: {e}");
            ParcelasError::ReceiptDownload
        }
    })?;

    let path = output.unwrap_or_else(|| {
        resolve_output_dir(&config.output.dir, cfg_dir)
            .join(format!("recibo_{}", file_name.replace('/', "_")))
    });
    write_document(&path, &bytes)?;

    println!("Recibo salvo em {}", path.display());
    if open {
        open_path(&path)?;
    }
    Ok(())
}

/// List the report types the backend offers
fn cmd_report_types(cfg_dir: &Path) -> Result<()> {
    let config = load_config(cfg_dir)?;
    let api = authed_client(cfg_dir, &config)?;

    let types = api.list_report_types().map_err(|e| {
        if e.is_unauthorized() {
            logout_if_rejected(cfg_dir, e)
        } else {
            log::error!("report list failed: {e}");
            ParcelasError::ReportTypes
        }
    })?;

    if types.is_empty() {
        println!("Nenhum relatório disponível.");
        return Ok(());
    }

    let rows: Vec<ReportTypeRow> = types
        .into_iter()
        .map(|t| ReportTypeRow {
            name: t.name,
            description: t.description,
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");
    println!();
    println!("Gere com: parcelas relatorio <nome>");

    Ok(())
}

/// Generate a report PDF and save it
#[allow(clippy::too_many_arguments)]
fn cmd_report(
    cfg_dir: &Path,
    kind: &str,
    client_id: i64,
    start: Option<String>,
    end: Option<String>,
    status: Option<String>,
    output: Option<PathBuf>,
    open: bool,
) -> Result<()> {
    let today = today();
    let status = status.as_deref().map(str::parse::<PaidStatus>).transpose()?;
    let start = start.as_deref().map(parse_date).transpose()?;
    let end = end.as_deref().map(parse_date).transpose()?;

    // The date report defaults to today on both ends
    let (start, end) = if kind == REPORT_BY_DATE {
        (start.or(Some(today)), end.or(Some(today)))
    } else {
        (start, end)
    };

    let config = load_config(cfg_dir)?;
    let api = authed_client(cfg_dir, &config)?;

    let request = ReportRequest::build(kind, Some(client_id), start, end, status);
    log::debug!("report request: {request:?}");

    let bytes = api.generate_report(&request).map_err(|e| {
        if e.is_unauthorized() {
            logout_if_rejected(cfg_dir, e)
        } else {
            ParcelasError::ReportGeneration(e.to_string())
        }
    })?;

    let path = output.unwrap_or_else(|| {
        resolve_output_dir(&config.output.dir, cfg_dir).join(report_file_name(kind, today))
    });
    write_document(&path, &bytes)?;

    println!("Relatório '{kind}' gerado");
    if let (Some(start), Some(end)) = (start, end) {
        if kind == REPORT_BY_DATE {
            println!("  Período: {} a {}", format_date(start), format_date(end));
        }
    }
    println!("  Salvo:   {}", path.display());

    if open {
        open_path(&path)?;
    }
    Ok(())
}

fn write_document(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, bytes)?;
    Ok(())
}

fn open_path(pdf_path: &Path) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(pdf_path).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(pdf_path).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", ""])
            .arg(pdf_path)
            .spawn()?;
    }
    Ok(())
}
