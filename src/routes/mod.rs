// Route exports
pub mod health;
pub mod profile;
pub mod resume;

use actix_web::web;

use crate::config::{ReportSettings, UploadSettings};
use crate::core::ProfileAggregator;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub aggregator: ProfileAggregator,
    pub upload: UploadSettings,
    pub report: ReportSettings,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .configure(health::configure)
            .configure(resume::configure)
            .configure(profile::configure),
    );
}
