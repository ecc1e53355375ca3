pub mod handlers;
pub mod models;
pub mod router;
pub mod services;
pub mod session;

pub use models::{EditRequest, IntakeError, IntakePhase, IntakeReply, Speaker, Turn};
pub use services::{AssessmentDialogue, IntakeFlow};
pub use session::{IntakeSession, SessionStore};
