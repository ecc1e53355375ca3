pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{PatientError, PatientProfile};
pub use services::PatientService;
