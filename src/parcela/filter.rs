use chrono::NaiveDate;
use std::str::FromStr;

use super::Installment;
use crate::error::ParcelasError;

/// List view filters. Exactly one applies at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Filter {
    #[default]
    All,
    Paid,
    /// Unpaid and not yet overdue (includes those due today)
    Pending,
    Overdue,
    DueToday,
}

impl Filter {
    pub fn matches(self, record: &Installment, today: NaiveDate) -> bool {
        match self {
            Filter::All => true,
            Filter::Paid => record.paid,
            Filter::Pending => !record.paid && record.due_date >= today,
            Filter::Overdue => !record.paid && record.due_date < today,
            Filter::DueToday => !record.paid && record.due_date == today,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Filter::All => "todas",
            Filter::Paid => "pagas",
            Filter::Pending => "pendentes",
            Filter::Overdue => "atrasadas",
            Filter::DueToday => "vence-hoje",
        }
    }
}

impl FromStr for Filter {
    type Err = ParcelasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "todas" => Ok(Filter::All),
            "pagas" => Ok(Filter::Paid),
            "pendentes" => Ok(Filter::Pending),
            "atrasadas" => Ok(Filter::Overdue),
            "vence-hoje" | "vencehoje" => Ok(Filter::DueToday),
            _ => Err(ParcelasError::InvalidFilter(s.to_string())),
        }
    }
}

/// Apply `filter` and order by due date, earliest first.
///
/// The sort is stable: records sharing a due date keep the backend's order.
pub fn filter_and_sort(
    records: &[Installment],
    filter: Filter,
    today: NaiveDate,
) -> Vec<&Installment> {
    let mut selected: Vec<&Installment> = records
        .iter()
        .filter(|r| filter.matches(r, today))
        .collect();
    selected.sort_by_key(|r| r.due_date);
    selected
}
