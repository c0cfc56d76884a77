mod filter;
mod model;
mod store;

pub use filter::{filter_and_sort, Filter};
pub use model::{Customer, Installment, Product, Receipt, Status};
pub use store::{InstallmentSource, InstallmentStore, LOAD_ERROR};

/// Find an installment by its backend id
pub fn find_by_id(records: &[Installment], id: i64) -> Option<&Installment> {
    records.iter().find(|r| r.id == id)
}

/// File name a receipt URI points at: everything after `download/`
pub fn receipt_file_name(uri: &str) -> Option<&str> {
    uri.split_once("download/")
        .map(|(_, name)| name)
        .filter(|name| !name.is_empty())
}
