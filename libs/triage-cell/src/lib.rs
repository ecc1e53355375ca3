pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{RecommendationResult, SymptomInput};
pub use services::{ProfileService, RecommendationService, SummaryService};
