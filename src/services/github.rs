use crate::config::GitHubSettings;
use crate::models::github::{ContributionsData, GitHubRepository, GitHubUser, GraphQlResponse};
use crate::models::{ContributionCalendar, LanguageBytes, UserProfile};
use reqwest::{header, Client, RequestBuilder};
use serde_json::{json, Map, Value};
use std::time::Duration;
use thiserror::Error;

const CONTRIBUTIONS_QUERY: &str = r#"
query($login: String!) {
  user(login: $login) {
    contributionsCollection {
      contributionCalendar {
        totalContributions
        weeks {
          contributionDays {
            date
            contributionCount
          }
        }
      }
    }
  }
}
"#;

/// Errors that can occur when talking to GitHub
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("GitHub user not found: {0}")]
    NotFound(String),

    #[error("HTTP request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("GitHub API returned {status} for {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("GitHub token is not configured")]
    MissingToken,
}

/// GitHub REST and GraphQL client
///
/// Every call reports its failure; deciding which failures a profile can
/// survive is left to `core::aggregator`.
pub struct GitHubClient {
    client: Client,
    api_base: String,
    graphql_url: String,
    token: Option<String>,
    request_timeout: Duration,
    language_timeout: Duration,
    graphql_timeout: Duration,
    page_size: u32,
    max_repositories: usize,
}

impl GitHubClient {
    /// Create a new GitHub client
    pub fn new(settings: &GitHubSettings) -> Result<Self, PlatformError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/vnd.github+json"),
        );

        let client = Client::builder()
            .user_agent(settings.user_agent.clone())
            .default_headers(headers)
            .timeout(Duration::from_secs(settings.graphql_timeout_secs.max(1)))
            .build()?;

        Ok(Self {
            client,
            api_base: settings.api_base.trim_end_matches('/').to_string(),
            graphql_url: settings.graphql_url.clone(),
            token: settings.token.clone().filter(|t| !t.trim().is_empty()),
            request_timeout: Duration::from_secs(settings.request_timeout_secs),
            language_timeout: Duration::from_secs(settings.language_timeout_secs),
            graphql_timeout: Duration::from_secs(settings.graphql_timeout_secs),
            page_size: settings.page_size,
            max_repositories: settings.max_repositories,
        })
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    fn get(&self, url: &str, timeout: Duration) -> RequestBuilder {
        let builder = self.client.get(url).timeout(timeout);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Fetch the public profile of a user
    pub async fn get_user(&self, username: &str) -> Result<UserProfile, PlatformError> {
        let url = format!("{}/users/{}", self.api_base, urlencoding::encode(username));

        tracing::debug!("Fetching user from: {}", url);

        let response = self.get(&url, self.request_timeout).send().await?;

        if !response.status().is_success() {
            tracing::info!("User lookup for {} returned {}", username, response.status());
            return Err(PlatformError::NotFound(username.to_string()));
        }

        let user: GitHubUser = response
            .json()
            .await
            .map_err(|e| PlatformError::InvalidResponse(format!("Failed to parse user: {}", e)))?;

        Ok(user.into())
    }

    /// Fetch a single page of the user's repository listing
    pub async fn fetch_repository_page(
        &self,
        username: &str,
        page: u32,
    ) -> Result<Vec<GitHubRepository>, PlatformError> {
        let url = format!(
            "{}/users/{}/repos",
            self.api_base,
            urlencoding::encode(username)
        );

        let response = self
            .get(&url, self.request_timeout)
            .query(&[("page", page), ("per_page", self.page_size)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(PlatformError::UnexpectedStatus {
                status: response.status().as_u16(),
                url,
            });
        }

        response
            .json()
            .await
            .map_err(|e| PlatformError::InvalidResponse(format!("Failed to parse repositories: {}", e)))
    }

    /// Upper bound on repositories collected for one profile
    pub fn max_repositories(&self) -> usize {
        self.max_repositories
    }

    /// Fetch the contribution calendar through the GraphQL API
    pub async fn fetch_contribution_calendar(
        &self,
        username: &str,
    ) -> Result<ContributionCalendar, PlatformError> {
        let token = self.token.as_ref().ok_or(PlatformError::MissingToken)?;

        let payload = json!({
            "query": CONTRIBUTIONS_QUERY,
            "variables": { "login": username },
        });

        let response = self
            .client
            .post(&self.graphql_url)
            .timeout(self.graphql_timeout)
            .bearer_auth(token)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(PlatformError::UnexpectedStatus {
                status: response.status().as_u16(),
                url: self.graphql_url.clone(),
            });
        }

        let body: GraphQlResponse<ContributionsData> = response
            .json()
            .await
            .map_err(|e| PlatformError::InvalidResponse(format!("Failed to parse calendar: {}", e)))?;

        let user = body.data.and_then(|data| data.user).ok_or_else(|| {
            let messages: Vec<String> = body.errors.into_iter().map(|e| e.message).collect();
            PlatformError::InvalidResponse(format!("No calendar in response: {}", messages.join("; ")))
        })?;

        Ok(user.contributions_collection.contribution_calendar.into())
    }

    /// Fetch bytes per language for one repository
    pub async fn fetch_language_bytes(
        &self,
        username: &str,
        repo_name: &str,
    ) -> Result<LanguageBytes, PlatformError> {
        let url = format!(
            "{}/repos/{}/{}/languages",
            self.api_base,
            urlencoding::encode(username),
            urlencoding::encode(repo_name)
        );

        let response = self.get(&url, self.language_timeout).send().await?;

        if !response.status().is_success() {
            return Err(PlatformError::UnexpectedStatus {
                status: response.status().as_u16(),
                url,
            });
        }

        let languages: Map<String, Value> = response
            .json()
            .await
            .map_err(|e| PlatformError::InvalidResponse(format!("Failed to parse languages: {}", e)))?;

        Ok(languages
            .into_iter()
            .filter_map(|(language, bytes)| bytes.as_u64().map(|count| (language, count)))
            .collect())
    }

    /// Download an avatar image; `None` if it cannot be fetched
    pub async fn fetch_avatar(&self, url: &str) -> Option<Vec<u8>> {
        let response = match self.client.get(url).timeout(self.request_timeout).send().await {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                tracing::debug!("Avatar {} returned {}", url, response.status());
                return None;
            }
            Err(e) => {
                tracing::debug!("Could not fetch avatar {}: {}", url, e);
                return None;
            }
        };

        response.bytes().await.ok().map(|bytes| bytes.to_vec())
    }
}
