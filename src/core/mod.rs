// Core algorithm exports
pub mod aggregator;
pub mod languages;
pub mod repositories;
pub mod resolver;
pub mod streak;

pub use aggregator::{merge_profile, ProfileAggregator, ProfileParts};
pub use languages::{language_distribution, merge_language_bytes};
pub use repositories::{sort_by_stars, RepositoryCollector};
pub use resolver::{resolve, Candidate, MatchRule, ResolveError};
pub use streak::compute_stats;
