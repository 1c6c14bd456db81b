use serde::{Deserialize, Serialize};

/// Response for the upload and analyze endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsernameResponse {
    #[serde(rename = "githubUsername")]
    pub github_username: String,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
