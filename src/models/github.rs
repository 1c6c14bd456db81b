//! Wire payloads returned by the GitHub REST and GraphQL APIs.
//!
//! These mirror GitHub's field names and are converted into the domain types
//! as soon as they leave the client.

use serde::Deserialize;

use crate::models::domain::{ContributionCalendar, ContributionDay, Repository, UserProfile};

/// `GET /users/{username}`
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubUser {
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub followers: u64,
    #[serde(default)]
    pub following: u64,
    #[serde(default)]
    pub public_repos: u64,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

impl From<GitHubUser> for UserProfile {
    fn from(user: GitHubUser) -> Self {
        Self {
            login: user.login,
            display_name: user.name,
            bio: user.bio,
            followers: user.followers,
            following: user.following,
            public_repo_count: user.public_repos,
            avatar_url: user.avatar_url,
        }
    }
}

/// One entry of `GET /users/{username}/repos`
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubRepository {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub forks_count: u64,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub fork: bool,
}

impl From<GitHubRepository> for Repository {
    fn from(repo: GitHubRepository) -> Self {
        Self {
            name: repo.name,
            description: repo.description,
            url: repo.html_url,
            stars: repo.stargazers_count,
            forks: repo.forks_count,
            primary_language: repo.language,
        }
    }
}

/// GraphQL envelope
#[derive(Debug, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQlError {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct ContributionsData {
    #[serde(default)]
    pub user: Option<ContributionsUser>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionsUser {
    pub contributions_collection: ContributionsCollection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionsCollection {
    pub contribution_calendar: CalendarPayload,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarPayload {
    #[serde(default)]
    pub total_contributions: u64,
    #[serde(default)]
    pub weeks: Vec<CalendarWeek>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarWeek {
    #[serde(default)]
    pub contribution_days: Vec<CalendarDay>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDay {
    pub date: chrono::NaiveDate,
    #[serde(default)]
    pub contribution_count: u64,
}

impl From<CalendarPayload> for ContributionCalendar {
    fn from(payload: CalendarPayload) -> Self {
        let days = payload
            .weeks
            .into_iter()
            .flat_map(|week| week.contribution_days)
            .map(|day| ContributionDay {
                date: day.date,
                count: day.contribution_count,
            })
            .collect();

        Self {
            total_contributions: payload.total_contributions,
            days,
        }
    }
}
