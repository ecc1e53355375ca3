pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{Appointment, AutoBookOutcome, ReservationError, ReserveRequest};
pub use services::{ReservationService, SchedulerService};
