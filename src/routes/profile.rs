use actix_web::{http::header, web, HttpResponse};

use crate::core::resolver::is_valid_username;
use crate::error::ApiError;
use crate::models::Profile;
use crate::report;
use crate::routes::AppState;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/profile/{username}", web::get().to(get_profile))
        .route("/profile/{username}/export", web::get().to(export_profile))
        // Paths used by earlier clients
        .route("/github/{username}", web::get().to(get_profile))
        .route("/github/{username}/export", web::get().to(export_profile));
}

/// Aggregated GitHub profile as JSON
///
/// GET /api/profile/{username}
async fn get_profile(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let profile = load_profile(&state, &path).await?;
    Ok(HttpResponse::Ok().json(profile))
}

/// Aggregated GitHub profile as a PDF download
///
/// GET /api/profile/{username}/export
async fn export_profile(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let username = path.into_inner();
    let profile = load_profile(&state, &username).await?;

    let avatar = match profile.user.avatar_url.as_deref() {
        Some(url) => state.aggregator.client().fetch_avatar(url).await,
        None => None,
    };

    let settings = state.report.clone();
    let pdf = web::block(move || report::synthesize(&profile, avatar, &settings))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??;

    tracing::info!("Exported {} byte report for {}", pdf.len(), username);

    Ok(HttpResponse::Ok()
        .content_type("application/pdf")
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename={}_profile.pdf", username),
        ))
        .body(pdf))
}

async fn load_profile(state: &AppState, username: &str) -> Result<Profile, ApiError> {
    if !is_valid_username(username) {
        return Err(ApiError::InvalidFormat("Invalid GitHub username".to_string()));
    }

    state.aggregator.aggregate(username).await.map_err(|e| {
        tracing::error!("Failed to aggregate profile for {}: {}", username, e);
        ApiError::from(e)
    })
}
