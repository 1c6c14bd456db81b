// Model exports
pub mod domain;
pub mod github;
pub mod requests;
pub mod responses;

pub use domain::{
    ContributionCalendar, ContributionDay, ContributionStats, LanguageBytes, LanguageShare, Profile,
    Repository, UserProfile,
};
pub use requests::AnalyzeRequest;
pub use responses::{ErrorResponse, HealthResponse, UsernameResponse};
