use crate::core::repositories::RepositoryCollector;
use crate::core::{languages, streak};
use crate::models::{ContributionCalendar, LanguageBytes, Profile, Repository, UserProfile};
use crate::services::{GitHubClient, PlatformError};
use futures::stream::{self, StreamExt};
use std::sync::Arc;

/// Raw outcome of every fetch that feeds one profile.
///
/// Each field keeps its own result so the fallback policy is applied in one
/// place, by [`merge_profile`].
#[derive(Debug)]
pub struct ProfileParts {
    pub user: Result<UserProfile, PlatformError>,
    /// Already fail-open: a failed page truncates the list
    pub repositories: Vec<Repository>,
    pub calendar: Result<ContributionCalendar, PlatformError>,
    /// One entry per repository, in repository order
    pub languages: Vec<Result<LanguageBytes, PlatformError>>,
}

impl ProfileParts {
    /// Parts for a user that could not be fetched; nothing else is requested
    pub fn missing_user(error: PlatformError) -> Self {
        Self {
            user: Err(error),
            repositories: Vec::new(),
            calendar: Ok(ContributionCalendar::empty()),
            languages: Vec::new(),
        }
    }
}

/// Merge fetch results into a profile.
///
/// A missing user is fatal. The calendar falls back to zero activity and each
/// repository's language bytes fall back to its primary language.
pub fn merge_profile(parts: ProfileParts) -> Result<Profile, PlatformError> {
    let user = parts.user?;

    let calendar = calendar_or_empty(&user.login, parts.calendar);
    let contributions = streak::compute_stats(&calendar);

    let per_repository: Vec<LanguageBytes> = parts
        .repositories
        .iter()
        .zip(parts.languages)
        .map(|(repository, bytes)| language_bytes_or_fallback(repository, bytes))
        .collect();
    let languages = languages::language_distribution(per_repository);

    Ok(Profile {
        user,
        repositories: parts.repositories,
        contributions,
        languages,
    })
}

/// Fallback policy for the contribution calendar
pub fn calendar_or_empty(
    username: &str,
    result: Result<ContributionCalendar, PlatformError>,
) -> ContributionCalendar {
    match result {
        Ok(calendar) => calendar,
        Err(PlatformError::MissingToken) => {
            tracing::warn!("GitHub token not set: contribution stats unavailable for {}", username);
            ContributionCalendar::empty()
        }
        Err(e) => {
            tracing::warn!("Contribution calendar for {} unavailable: {}", username, e);
            ContributionCalendar::empty()
        }
    }
}

/// Fallback policy for a repository's language breakdown
pub fn language_bytes_or_fallback(
    repository: &Repository,
    result: Result<LanguageBytes, PlatformError>,
) -> LanguageBytes {
    match result {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::debug!("Languages for {} unavailable, using primary language: {}", repository.name, e);
            languages::fallback_bytes(repository.primary_language.as_deref())
        }
    }
}

/// Orchestrates the GitHub calls behind one profile
#[derive(Clone)]
pub struct ProfileAggregator {
    client: Arc<GitHubClient>,
    language_concurrency: usize,
}

impl ProfileAggregator {
    pub fn new(client: Arc<GitHubClient>, language_concurrency: usize) -> Self {
        Self {
            client,
            language_concurrency: language_concurrency.max(1),
        }
    }

    pub fn client(&self) -> &GitHubClient {
        &self.client
    }

    /// List the user's non-fork repositories, most starred first
    ///
    /// Pages are requested until one comes back empty, a page fails, or the
    /// repository cap is reached. A failed page ends the listing with
    /// whatever was collected so far.
    pub async fn list_repositories(&self, username: &str) -> Vec<Repository> {
        let mut collector = RepositoryCollector::new(self.client.max_repositories());
        let mut page = 1;

        while !collector.is_full() {
            match self.client.fetch_repository_page(username, page).await {
                Ok(repos) if repos.is_empty() => break,
                Ok(repos) => {
                    collector.push_page(repos);
                    page += 1;
                }
                Err(e) => {
                    tracing::warn!(
                        "Repository listing for {} stopped at page {}: {}",
                        username,
                        page,
                        e
                    );
                    break;
                }
            }
        }

        let repositories = collector.finish();
        tracing::debug!("Collected {} repositories for {}", repositories.len(), username);
        repositories
    }

    /// Contribution calendar, or an empty one when it cannot be fetched
    pub async fn contribution_calendar(&self, username: &str) -> ContributionCalendar {
        calendar_or_empty(username, self.client.fetch_contribution_calendar(username).await)
    }

    /// Language bytes for a repository, falling back to its primary language
    pub async fn language_bytes(&self, username: &str, repository: &Repository) -> LanguageBytes {
        language_bytes_or_fallback(
            repository,
            self.client.fetch_language_bytes(username, &repository.name).await,
        )
    }

    /// Run every fetch for `username` and return the raw results
    ///
    /// The user is fetched first; if that fails nothing else is requested.
    /// The calendar and the per-repository language calls then run
    /// concurrently. Language results come back in repository order no matter
    /// which request finishes first.
    pub async fn collect(&self, username: &str) -> ProfileParts {
        let user = match self.client.get_user(username).await {
            Ok(user) => user,
            Err(e) => return ProfileParts::missing_user(e),
        };

        let repositories = self.list_repositories(username).await;

        let calendar = self.client.fetch_contribution_calendar(username);
        let languages = stream::iter(repositories.iter())
            .map(|repository| self.client.fetch_language_bytes(username, &repository.name))
            .buffered(self.language_concurrency)
            .collect::<Vec<_>>();

        let (calendar, languages) = futures::join!(calendar, languages);

        ProfileParts {
            user: Ok(user),
            repositories,
            calendar,
            languages,
        }
    }

    /// Build the full profile for `username`
    pub async fn aggregate(&self, username: &str) -> Result<Profile, PlatformError> {
        let parts = self.collect(username).await;
        let profile = merge_profile(parts)?;

        tracing::info!(
            "Aggregated profile for {}: {} repositories, {} languages, {} contributions",
            profile.user.login,
            profile.repositories.len(),
            profile.languages.len(),
            profile.contributions.total
        );

        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ContributionDay;
    use chrono::NaiveDate;

    fn user() -> UserProfile {
        UserProfile {
            login: "octocat".to_string(),
            display_name: Some("The Octocat".to_string()),
            bio: None,
            followers: 10,
            following: 1,
            public_repo_count: 2,
            avatar_url: None,
        }
    }

    fn repo(name: &str, stars: u64, language: Option<&str>) -> Repository {
        Repository {
            name: name.to_string(),
            description: None,
            url: format!("https://github.com/octocat/{}", name),
            stars,
            forks: 0,
            primary_language: language.map(str::to_string),
        }
    }

    fn unavailable() -> PlatformError {
        PlatformError::UnexpectedStatus {
            status: 502,
            url: "https://api.github.test".to_string(),
        }
    }

    #[test]
    fn test_missing_user_is_fatal() {
        let result = merge_profile(ProfileParts::missing_user(PlatformError::NotFound(
            "ghost".to_string(),
        )));
        assert!(matches!(result, Err(PlatformError::NotFound(name)) if name == "ghost"));
    }

    #[test]
    fn test_degraded_profile_when_sub_fetches_fail() {
        let parts = ProfileParts {
            user: Ok(user()),
            repositories: vec![repo("a", 3, Some("Rust")), repo("b", 1, None)],
            calendar: Err(PlatformError::MissingToken),
            languages: vec![Err(unavailable()), Err(unavailable())],
        };

        let profile = merge_profile(parts).unwrap();

        assert_eq!(profile.contributions.total, 0);
        assert_eq!(profile.contributions.current_streak, 0);
        assert_eq!(profile.repositories.len(), 2);
        assert_eq!(profile.languages.len(), 1);
        assert_eq!(profile.languages[0].language, "Rust");
        assert_eq!(profile.languages[0].percentage, 100.0);
    }

    #[test]
    fn test_merge_combines_real_and_fallback_bytes() {
        let day = |d: u32, count: u64| ContributionDay {
            date: NaiveDate::from_ymd_opt(2024, 5, d).unwrap(),
            count,
        };

        let parts = ProfileParts {
            user: Ok(user()),
            repositories: vec![repo("a", 3, Some("Go")), repo("b", 1, Some("Rust"))],
            calendar: Ok(ContributionCalendar {
                total_contributions: 42,
                days: vec![day(1, 1), day(2, 0), day(3, 2), day(4, 5)],
            }),
            languages: vec![Ok(vec![("Go".to_string(), 300)]), Ok(vec![("Rust".to_string(), 100)])],
        };

        let profile = merge_profile(parts).unwrap();

        assert_eq!(profile.contributions.total, 42);
        assert_eq!(profile.contributions.current_streak, 2);
        assert_eq!(profile.contributions.longest_streak, 2);
        assert_eq!(profile.languages[0].language, "Go");
        assert_eq!(profile.languages[0].percentage, 75.0);
        assert_eq!(profile.languages[1].percentage, 25.0);
    }

    #[test]
    fn test_no_repositories_gives_empty_distribution() {
        let parts = ProfileParts {
            user: Ok(user()),
            repositories: vec![],
            calendar: Ok(ContributionCalendar::empty()),
            languages: vec![],
        };

        let profile = merge_profile(parts).unwrap();
        assert!(profile.languages.is_empty());
    }
}
