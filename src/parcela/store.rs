use super::Installment;
use crate::error::{ParcelasError, Result};

pub const LOAD_ERROR: &str = "Erro ao carregar as parcelas";

/// Anything that can produce the installment list. `ApiClient` in practice.
pub trait InstallmentSource {
    fn fetch_installments(&self) -> Result<Vec<Installment>>;
}

/// Shared installment state for the views: the last fetched list, a loading
/// flag, the last error and a refresh flag.
///
/// The refresh flag starts set, is cleared by a successful fetch and is only
/// set again through [`InstallmentStore::mark_dirty`].
#[derive(Debug)]
pub struct InstallmentStore {
    records: Vec<Installment>,
    loading: bool,
    error: Option<String>,
    needs_refresh: bool,
}

impl Default for InstallmentStore {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            loading: false,
            error: None,
            needs_refresh: true,
        }
    }
}

impl InstallmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[Installment] {
        &self.records
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn needs_refresh(&self) -> bool {
        self.needs_refresh
    }

    pub fn mark_dirty(&mut self) {
        self.needs_refresh = true;
    }

    /// Fetch from `source` unless the current list is still considered fresh.
    ///
    /// Errors never escape: they land in [`InstallmentStore::error`]. The
    /// returned error is only the one worth acting on (a rejected token), so
    /// callers can send the user back to login.
    pub fn fetch<S: InstallmentSource + ?Sized>(&mut self, source: &S) -> Result<()> {
        if !self.needs_refresh {
            return Ok(());
        }

        self.loading = true;
        let outcome = source.fetch_installments();
        self.loading = false;

        match outcome {
            Ok(records) => {
                log::debug!("loaded {} installments", records.len());
                self.records = records;
                self.error = None;
                self.needs_refresh = false;
                Ok(())
            }
            Err(ParcelasError::UnexpectedPayload(detail)) => {
                log::error!("installment list is not an array: {detail}");
                self.records.clear();
                Ok(())
            }
            Err(e) if e.is_unauthorized() => {
                self.error = Some(LOAD_ERROR.to_string());
                Err(ParcelasError::NotAuthenticated)
            }
            Err(e) => {
                log::warn!("failed to load installments: {e}");
                self.error = Some(LOAD_ERROR.to_string());
                Ok(())
            }
        }
    }
}
