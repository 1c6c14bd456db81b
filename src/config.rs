use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub github: GitHubSettings,
    #[serde(default)]
    pub upload: UploadSettings,
    #[serde(default)]
    pub report: ReportSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 5000 }

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubSettings {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_graphql_url")]
    pub graphql_url: String,
    /// Bearer token; required for contribution data, optional otherwise
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_language_timeout")]
    pub language_timeout_secs: u64,
    #[serde(default = "default_graphql_timeout")]
    pub graphql_timeout_secs: u64,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_max_repositories")]
    pub max_repositories: usize,
    #[serde(default = "default_language_concurrency")]
    pub language_concurrency: usize,
}

impl Default for GitHubSettings {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            graphql_url: default_graphql_url(),
            token: None,
            user_agent: default_user_agent(),
            request_timeout_secs: default_request_timeout(),
            language_timeout_secs: default_language_timeout(),
            graphql_timeout_secs: default_graphql_timeout(),
            page_size: default_page_size(),
            max_repositories: default_max_repositories(),
            language_concurrency: default_language_concurrency(),
        }
    }
}

fn default_api_base() -> String { "https://api.github.com".to_string() }
fn default_graphql_url() -> String { "https://api.github.com/graphql".to_string() }
fn default_user_agent() -> String { concat!("profile-scout/", env!("CARGO_PKG_VERSION")).to_string() }
fn default_request_timeout() -> u64 { 5 }
fn default_language_timeout() -> u64 { 8 }
fn default_graphql_timeout() -> u64 { 10 }
fn default_page_size() -> u32 { 100 }
fn default_max_repositories() -> usize { 100 }
fn default_language_concurrency() -> usize { 8 }

#[derive(Debug, Clone, Deserialize)]
pub struct UploadSettings {
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,
    /// Lower-case extensions accepted by the upload endpoint
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,
    /// Ceiling on text a PDF or DOCX may expand to once decompressed
    #[serde(default = "default_max_extracted_bytes")]
    pub max_extracted_bytes: usize,
}

impl UploadSettings {
    pub fn allows(&self, extension: &str) -> bool {
        self.allowed_extensions
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(extension))
    }
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            max_bytes: default_max_bytes(),
            allowed_extensions: default_allowed_extensions(),
            max_extracted_bytes: default_max_extracted_bytes(),
        }
    }
}

fn default_max_bytes() -> usize { 10 * 1024 * 1024 }
fn default_max_extracted_bytes() -> usize { 16 * 1024 * 1024 }
fn default_allowed_extensions() -> Vec<String> {
    vec!["pdf".to_string(), "docx".to_string(), "txt".to_string()]
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportSettings {
    #[serde(default = "default_max_languages")]
    pub max_languages: usize,
    #[serde(default = "default_repositories_per_page")]
    pub repositories_per_page: usize,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            max_languages: default_max_languages(),
            repositories_per_page: default_repositories_per_page(),
        }
    }
}

fn default_max_languages() -> usize { 10 }
fn default_repositories_per_page() -> usize { 6 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "compact".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with SCOUT_)
    /// 5. GITHUB_API_TOKEN, if set
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., SCOUT__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("SCOUT")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        apply_token_override(settings)?.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("SCOUT")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        apply_token_override(settings)?.try_deserialize()
    }
}

/// Let the conventional GITHUB_API_TOKEN variable supply the GitHub token
fn apply_token_override(settings: Config) -> Result<Config, ConfigError> {
    let token = std::env::var("GITHUB_API_TOKEN")
        .ok()
        .filter(|t| !t.trim().is_empty());

    match token {
        Some(token) => Config::builder()
            .add_source(settings)
            .set_override("github.token", token)?
            .build(),
        None => Ok(settings),
    }
}
