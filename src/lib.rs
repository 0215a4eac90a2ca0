pub mod error;
pub mod filter;
pub mod loader;
pub mod output;
pub mod reports;
pub mod types;
pub mod util;

pub use error::{ReportError, Result};
pub use loader::{load, LoadReport, RecordStore};
pub use reports::ReportSet;
