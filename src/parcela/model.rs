use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

/// One installment as returned by `GET /parcelas`
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Installment {
    #[serde(rename = "parcelaId")]
    pub id: i64,
    #[serde(rename = "cliente")]
    pub customer: Customer,
    #[serde(rename = "produto")]
    pub product: Product,
    /// Total number of installments in the plan
    #[serde(rename = "numeroParcelas", default)]
    pub installment_count: u32,
    /// Amount due, in centavos
    #[serde(rename = "valorParcela", deserialize_with = "cents")]
    pub amount: i64,
    #[serde(rename = "paga", default)]
    pub paid: bool,
    #[serde(rename = "valorPago", default, deserialize_with = "cents")]
    pub amount_paid: i64,
    #[serde(rename = "descontoAplicado", default, deserialize_with = "cents")]
    pub discount: i64,
    /// 1-based position of this installment in the plan
    #[serde(rename = "numeroParcela", default)]
    pub number: u32,
    /// Payment interval label, e.g. "MENSAL"
    #[serde(rename = "intervalo", default)]
    pub interval: String,
    #[serde(rename = "dataVencimento", deserialize_with = "due_date")]
    pub due_date: NaiveDate,
    #[serde(rename = "documento", default)]
    pub document: String,
    #[serde(rename = "recibo", default)]
    pub receipt: Option<Receipt>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Customer {
    #[serde(rename = "clienteId")]
    pub id: i64,
    #[serde(rename = "clienteNome", default)]
    pub name: String,
    #[serde(rename = "clienteCpf", default)]
    pub cpf: String,
    #[serde(rename = "clienteEndereco", default)]
    pub address: String,
    #[serde(rename = "clienteTelefone", default)]
    pub phone: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Product {
    #[serde(rename = "produtoId")]
    pub id: i64,
    #[serde(rename = "produtoNome", default)]
    pub name: String,
    #[serde(rename = "produtoValorTotal", default, deserialize_with = "cents")]
    pub total_value: i64,
    #[serde(rename = "produtoDescricao", default)]
    pub description: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Receipt {
    #[serde(default)]
    pub uri: Option<String>,
}

/// Badge shown next to each installment in the list view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Paid,
    DueToday,
    Overdue,
    Pending,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Status::Paid => "Paga",
            Status::DueToday => "Vence hoje",
            Status::Overdue => "Atrasada",
            Status::Pending => "Pendente",
        };
        f.write_str(label)
    }
}

impl Installment {
    pub fn status(&self, today: NaiveDate) -> Status {
        if self.paid {
            Status::Paid
        } else if self.due_date == today {
            Status::DueToday
        } else if self.due_date < today {
            Status::Overdue
        } else {
            Status::Pending
        }
    }

    /// Amount shown in listings: what was paid once settled, otherwise what is due
    pub fn display_amount(&self) -> i64 {
        if self.paid {
            self.amount_paid
        } else {
            self.amount
        }
    }

    /// Receipt URI, only when the installment is paid and the backend attached one
    pub fn receipt_uri(&self) -> Option<&str> {
        if !self.paid {
            return None;
        }
        self.receipt
            .as_ref()
            .and_then(|r| r.uri.as_deref())
            .filter(|uri| !uri.is_empty())
    }
}

/// Accept whole or fractional numbers (or null) for centavo amounts.
fn cents<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<serde_json::Number> = Option::deserialize(deserializer)?;
    Ok(match value {
        Some(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.round() as i64))
            .unwrap_or_default(),
        None => 0,
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDate {
    Text(String),
    Parts(Vec<i64>),
}

/// Due dates arrive as `YYYY-MM-DD`, as a full timestamp, or as `[y, m, d, ...]`.
/// Only the calendar date is kept.
fn due_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match RawDate::deserialize(deserializer)? {
        RawDate::Text(text) => parse_due_date(&text)
            .ok_or_else(|| D::Error::custom(format!("invalid dataVencimento '{text}'"))),
        RawDate::Parts(parts) => match parts.as_slice() {
            [y, m, d, ..] => NaiveDate::from_ymd_opt(*y as i32, *m as u32, *d as u32)
                .ok_or_else(|| D::Error::custom(format!("invalid dataVencimento {parts:?}"))),
            _ => Err(D::Error::custom(format!("invalid dataVencimento {parts:?}"))),
        },
    }
}

fn parse_due_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.date_naive());
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|dt| dt.date())
}
