// Report exports
pub mod layout;
pub mod pdf;

pub use layout::{build_report, Report, ReportBlock, RepositoryEntry, StatCell};
pub use pdf::{render_pdf, ReportError};

use crate::config::ReportSettings;
use crate::models::Profile;

/// Lay out and render a profile report in one step
pub fn synthesize(
    profile: &Profile,
    avatar: Option<Vec<u8>>,
    settings: &ReportSettings,
) -> Result<Vec<u8>, ReportError> {
    let report = build_report(profile, avatar, chrono::Utc::now(), settings);
    render_pdf(&report)
}
