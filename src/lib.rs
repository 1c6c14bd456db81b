//! Profile Scout - resume to GitHub profile service
//!
//! Finds a GitHub username in a resume, aggregates the public profile behind
//! it (repositories, contribution streaks, language mix) and renders the
//! result as JSON or a PDF report.

pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod report;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{compute_stats, language_distribution, resolve, ProfileAggregator};
pub use crate::models::{ContributionStats, LanguageShare, Profile, Repository, UserProfile};
pub use crate::services::{extract_document, DocumentFormat, GitHubClient, PlatformError};
