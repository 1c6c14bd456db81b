use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Request to resolve a GitHub username from pasted resume text
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AnalyzeRequest {
    #[validate(custom(function = "not_blank"))]
    pub text: String,
}

fn not_blank(text: &str) -> Result<(), ValidationError> {
    if text.trim().is_empty() {
        let mut error = ValidationError::new("blank");
        error.message = Some("Resume text cannot be empty".into());
        return Err(error);
    }
    Ok(())
}
