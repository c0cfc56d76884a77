pub mod api;
pub mod config;
pub mod error;
pub mod format;
pub mod parcela;
pub mod report;
pub mod session;

pub use api::ApiClient;
pub use config::Config;
pub use error::{ParcelasError, Result};
pub use parcela::{Filter, Installment, InstallmentStore};
pub use report::ReportRequest;
pub use session::{Session, SessionState};
