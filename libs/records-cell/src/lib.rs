pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{ImportError, ImportReport, MappedOperation};
pub use services::{map_patient_record, ImportService};
