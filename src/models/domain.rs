use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Public GitHub account data for one resolved username
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub login: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    pub followers: u64,
    pub following: u64,
    pub public_repo_count: u64,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// A non-fork repository owned by the profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Repository {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub url: String,
    pub stars: u64,
    pub forks: u64,
    #[serde(default)]
    pub primary_language: Option<String>,
}

/// Contribution count for a single calendar day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionDay {
    pub date: NaiveDate,
    pub count: u64,
}

/// Raw contribution calendar as reported by the platform
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContributionCalendar {
    /// Total reported by the source; not re-derived from `days`
    pub total_contributions: u64,
    pub days: Vec<ContributionDay>,
}

impl ContributionCalendar {
    /// Calendar used when the source is unavailable: zero activity
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Streak summary derived from a contribution calendar
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionStats {
    pub total: u64,
    pub current_streak: u32,
    pub longest_streak: u32,
    /// Date-sorted, de-duplicated calendar the streaks were computed from
    #[serde(default)]
    pub days: Vec<ContributionDay>,
}

/// Share of total code bytes written in one language
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageShare {
    pub language: String,
    pub percentage: f64,
}

/// Bytes per language for one repository, in the order the source listed them
pub type LanguageBytes = Vec<(String, u64)>;

/// Aggregate root returned by the profile endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub user: UserProfile,
    pub repositories: Vec<Repository>,
    pub contributions: ContributionStats,
    pub languages: Vec<LanguageShare>,
}
