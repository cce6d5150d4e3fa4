//! Loading scenarios and tax data from disk, and writing results back

pub mod storage;
pub mod tax_dir;

pub use storage::{DocumentFormat, StorageError, load_document, load_scenario, save_document};
pub use tax_dir::{TaxDirectory, load_tax_data};
