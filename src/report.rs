use chrono::NaiveDate;
use serde::Serialize;
use std::str::FromStr;

use crate::error::ParcelasError;

/// Report that filters installments by paid status
pub const REPORT_BY_STATUS: &str = "parcelas";
/// Report that filters installments by due-date range
pub const REPORT_BY_DATE: &str = "parcelas_por_data";

/// Paid-status filter offered by the installment reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaidStatus {
    Paid,
    Pending,
}

impl PaidStatus {
    fn as_flag(self) -> bool {
        matches!(self, PaidStatus::Paid)
    }
}

impl FromStr for PaidStatus {
    type Err = ParcelasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "paga" | "pagas" => Ok(PaidStatus::Paid),
            "pendente" | "pendentes" => Ok(PaidStatus::Pending),
            _ => Err(ParcelasError::InvalidStatus(s.to_string())),
        }
    }
}

/// Body of `POST /relatorios/parcelas`
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    pub tipo_relatorio: String,
    pub cliente_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_inicio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_fim: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_parcela: Option<bool>,
}

impl ReportRequest {
    /// Only the fields the chosen report understands are populated.
    pub fn build(
        kind: &str,
        client_id: Option<i64>,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        status: Option<PaidStatus>,
    ) -> Self {
        let mut request = ReportRequest {
            tipo_relatorio: kind.to_string(),
            cliente_id: client_id,
            data_inicio: None,
            data_fim: None,
            status_parcela: None,
        };

        match kind {
            REPORT_BY_STATUS => {
                request.status_parcela = status.map(PaidStatus::as_flag);
            }
            REPORT_BY_DATE => {
                request.data_inicio = start.map(|d| d.format("%Y-%m-%d").to_string());
                request.data_fim = end.map(|d| d.format("%Y-%m-%d").to_string());
                request.status_parcela = status.map(PaidStatus::as_flag);
            }
            _ => {}
        }

        request
    }
}

/// Parse a `YYYY-MM-DD` command-line date
pub fn parse_date(input: &str) -> Result<NaiveDate, ParcelasError> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|_| ParcelasError::InvalidDate(input.to_string()))
}

/// Default file name for a generated report
pub fn report_file_name(kind: &str, today: NaiveDate) -> String {
    let safe: String = kind
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
        .collect();
    format!("relatorio-{}-{}.pdf", safe, today.format("%Y-%m-%d"))
}
