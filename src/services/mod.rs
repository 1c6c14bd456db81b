// Service exports
pub mod extractor;
pub mod github;

pub use extractor::{extract_document, DocumentFormat, ExtractedDocument, ExtractionError};
pub use github::{GitHubClient, PlatformError};
