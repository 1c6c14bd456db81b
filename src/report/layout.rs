//! Structural model of the profile report.
//!
//! [`build_report`] decides what goes on the report and in which order; the
//! PDF renderer only decides how it looks. Keeping the two apart lets the
//! ordering and pagination rules be checked without parsing a PDF.

use chrono::{DateTime, Utc};

use crate::config::ReportSettings;
use crate::models::Profile;

pub const REPORT_TITLE: &str = "GitHub Profile Summary";
pub const PLACEHOLDER: &str = "N/A";
pub const NO_BIO: &str = "No bio provided";
pub const NO_DESCRIPTION: &str = "No description available";
pub const NO_LANGUAGES: &str = "No language data available";
pub const NO_REPOSITORIES: &str = "No repositories found.";
pub const FOOTER: &str = "Generated by Profile Scout from public GitHub data";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatCell {
    pub label: String,
    pub value: String,
}

impl StatCell {
    fn new(label: &str, value: impl ToString) -> Self {
        Self {
            label: label.to_string(),
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryEntry {
    /// 1-based position in the repository list
    pub position: usize,
    pub name: String,
    pub stars: u64,
    pub forks: u64,
    pub language: String,
    pub description: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportBlock {
    Header { title: String, generated: String },
    Heading(String),
    ProfileCard {
        avatar: Option<Vec<u8>>,
        name: String,
        handle: String,
        bio: String,
    },
    StatRow([StatCell; 3]),
    /// `(language, formatted percentage)` rows
    LanguageTable(Vec<(String, String)>),
    Note(String),
    Repository(RepositoryEntry),
    Separator,
    PageBreak,
    Footer(String),
}

/// Ordered list of blocks making up one report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub blocks: Vec<ReportBlock>,
}

impl Report {
    pub fn page_breaks(&self) -> usize {
        self.blocks
            .iter()
            .filter(|block| matches!(block, ReportBlock::PageBreak))
            .count()
    }

    pub fn repositories(&self) -> impl Iterator<Item = &RepositoryEntry> {
        self.blocks.iter().filter_map(|block| match block {
            ReportBlock::Repository(entry) => Some(entry),
            _ => None,
        })
    }
}

/// Lay out a profile as report blocks
///
/// `avatar` holds the downloaded avatar image, if any; the profile card omits
/// the picture when it is `None`.
pub fn build_report(
    profile: &Profile,
    avatar: Option<Vec<u8>>,
    generated_at: DateTime<Utc>,
    settings: &ReportSettings,
) -> Report {
    let user = &profile.user;
    let contributions = &profile.contributions;
    let mut blocks = Vec::new();

    blocks.push(ReportBlock::Header {
        title: REPORT_TITLE.to_string(),
        generated: format!(
            "Generated on {}",
            generated_at.format("%B %d, %Y at %I:%M %p UTC")
        ),
    });

    blocks.push(ReportBlock::ProfileCard {
        avatar,
        name: or_placeholder(user.display_name.as_deref(), PLACEHOLDER),
        handle: format!("@{}", user.login),
        bio: or_placeholder(user.bio.as_deref(), NO_BIO),
    });

    blocks.push(ReportBlock::Heading("Profile Statistics".to_string()));
    blocks.push(ReportBlock::StatRow([
        StatCell::new("Public Repos", user.public_repo_count),
        StatCell::new("Followers", user.followers),
        StatCell::new("Following", user.following),
    ]));

    blocks.push(ReportBlock::Heading("Contribution Activity".to_string()));
    blocks.push(ReportBlock::StatRow([
        StatCell::new("Total Contributions", contributions.total),
        StatCell::new("Current Streak", format!("{} days", contributions.current_streak)),
        StatCell::new("Longest Streak", format!("{} days", contributions.longest_streak)),
    ]));

    blocks.push(ReportBlock::Heading("Language Distribution".to_string()));
    let rows: Vec<(String, String)> = profile
        .languages
        .iter()
        .take(settings.max_languages)
        .map(|share| (share.language.clone(), format!("{:.1}%", share.percentage)))
        .collect();
    if rows.is_empty() {
        blocks.push(ReportBlock::LanguageTable(vec![(
            NO_LANGUAGES.to_string(),
            PLACEHOLDER.to_string(),
        )]));
    } else {
        blocks.push(ReportBlock::LanguageTable(rows));
    }

    blocks.push(ReportBlock::Heading("Repositories".to_string()));
    push_repositories(&mut blocks, profile, settings.repositories_per_page.max(1));

    blocks.push(ReportBlock::Footer(FOOTER.to_string()));

    Report { blocks }
}

fn push_repositories(blocks: &mut Vec<ReportBlock>, profile: &Profile, per_page: usize) {
    let repositories = &profile.repositories;
    if repositories.is_empty() {
        blocks.push(ReportBlock::Note(NO_REPOSITORIES.to_string()));
        return;
    }

    let total_stars: u64 = repositories.iter().map(|r| r.stars).sum();
    let total_forks: u64 = repositories.iter().map(|r| r.forks).sum();
    let mut languages: Vec<&str> = repositories
        .iter()
        .filter_map(|r| r.primary_language.as_deref())
        .collect();
    languages.sort_unstable();
    languages.dedup();

    blocks.push(ReportBlock::Note(format!(
        "Total: {} repositories | Stars: {} | Forks: {} | Languages: {}",
        repositories.len(),
        total_stars,
        total_forks,
        languages.len()
    )));

    let count = repositories.len();
    for (i, repository) in repositories.iter().enumerate() {
        let position = i + 1;
        blocks.push(ReportBlock::Repository(RepositoryEntry {
            position,
            name: repository.name.clone(),
            stars: repository.stars,
            forks: repository.forks,
            language: or_placeholder(repository.primary_language.as_deref(), PLACEHOLDER),
            description: or_placeholder(repository.description.as_deref(), NO_DESCRIPTION),
            url: repository.url.clone(),
        }));

        if position < count {
            blocks.push(ReportBlock::Separator);
        }
        if position % per_page == 0 && position < count {
            blocks.push(ReportBlock::PageBreak);
            blocks.push(ReportBlock::Heading("Repositories (continued)".to_string()));
        }
    }
}

fn or_placeholder(value: Option<&str>, placeholder: &str) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => placeholder.to_string(),
    }
}
