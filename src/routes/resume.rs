use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use futures::StreamExt;
use validator::Validate;

use crate::core::resolver;
use crate::error::ApiError;
use crate::models::{AnalyzeRequest, UsernameResponse};
use crate::routes::AppState;
use crate::services::{extract_document, DocumentFormat, PlatformError};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/upload", web::post().to(upload_resume))
        .route("/analyze", web::post().to(analyze_text));
}

/// Uploaded file pulled out of the multipart body
struct Upload {
    filename: String,
    format: DocumentFormat,
    bytes: Vec<u8>,
}

/// Resolve a GitHub username from an uploaded resume
///
/// POST /api/upload (multipart form, field `file`)
async fn upload_resume(
    state: web::Data<AppState>,
    payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let upload = read_file_field(payload, &state).await?;
    let format = upload.format;

    tracing::info!(
        "Received {} resume {} ({} bytes)",
        format,
        upload.filename,
        upload.bytes.len()
    );

    let bytes = upload.bytes;
    let max_text_bytes = state.upload.max_extracted_bytes;
    let document = web::block(move || extract_document(format, &bytes, max_text_bytes))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??;

    let username = resolver::resolve(&document.text, &document.links)?;
    verify_username(&state, &username).await?;

    Ok(HttpResponse::Ok().json(UsernameResponse {
        github_username: username,
    }))
}

/// Resolve a GitHub username from pasted resume text
///
/// POST /api/analyze
///
/// Request body:
/// ```json
/// { "text": "string" }
/// ```
async fn analyze_text(
    state: web::Data<AppState>,
    req: web::Json<AnalyzeRequest>,
) -> Result<HttpResponse, ApiError> {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for analyze request: {}", errors);
        return Err(ApiError::InvalidFormat("No text provided".to_string()));
    }

    let username = resolver::resolve(&req.text, &[])?;
    verify_username(&state, &username).await?;

    Ok(HttpResponse::Ok().json(UsernameResponse {
        github_username: username,
    }))
}

/// Read the `file` field, checking its type first and the size cap while streaming
async fn read_file_field(mut payload: Multipart, state: &AppState) -> Result<Upload, ApiError> {
    let max_bytes = state.upload.max_bytes;

    while let Some(field) = payload.next().await {
        let mut field = field.map_err(|e| ApiError::InvalidFormat(format!("Invalid upload: {}", e)))?;

        let Some(disposition) = field.content_disposition() else {
            continue;
        };
        if disposition.get_name() != Some("file") {
            continue;
        }
        let filename = disposition.get_filename().unwrap_or_default().to_string();
        if filename.trim().is_empty() {
            return Err(ApiError::InvalidFormat("No file selected".to_string()));
        }
        let format = upload_format(&filename, state)?;

        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|e| ApiError::InvalidFormat(format!("Invalid upload: {}", e)))?;
            if bytes.len() + chunk.len() > max_bytes {
                tracing::info!("Rejected upload {}: over {} bytes", filename, max_bytes);
                return Err(ApiError::PayloadTooLarge { max_bytes });
            }
            bytes.extend_from_slice(&chunk);
        }

        return Ok(Upload {
            filename,
            format,
            bytes,
        });
    }

    Err(ApiError::InvalidFormat("No file provided".to_string()))
}

fn upload_format(filename: &str, state: &AppState) -> Result<DocumentFormat, ApiError> {
    DocumentFormat::from_filename(filename)
        .filter(|format| state.upload.allows(format.extension()))
        .ok_or_else(|| ApiError::InvalidFormat("Invalid file type. Use PDF, DOCX or TXT".to_string()))
}

/// Confirm the resolved username belongs to a real account
async fn verify_username(state: &AppState, username: &str) -> Result<(), ApiError> {
    match state.aggregator.client().get_user(username).await {
        Ok(_) => {
            tracing::info!("Resolved GitHub username {}", username);
            Ok(())
        }
        Err(PlatformError::NotFound(_)) => {
            Err(ApiError::NotFound(format!("Invalid GitHub username: {}", username)))
        }
        Err(e) => {
            tracing::error!("Failed to verify GitHub username {}: {}", username, e);
            Err(e.into())
        }
    }
}
