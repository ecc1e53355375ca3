pub mod assessment;
pub mod flow;

pub use assessment::{AssessmentDialogue, AssessmentTurn};
pub use flow::IntakeFlow;
