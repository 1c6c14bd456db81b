//! Heuristic chain that locates a GitHub username in resume text.
//!
//! Rules run in a fixed order and the first one that produces a candidate
//! wins:
//! 1. profile URL in the extracted hyperlink list
//! 2. profile URL in the text
//! 3. labeled mention (`GitHub: name`)
//! 4. `@name` mention

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Longest handle GitHub allows
pub const MAX_USERNAME_LEN: usize = 39;

static PROFILE_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:https?://)?(?:www\.)?github\.com/([A-Za-z0-9-]+)")
        .expect("profile URL pattern is valid")
});

static LABELED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)github[:\s\-]+([A-Za-z0-9-]{1,39})").expect("label pattern is valid")
});

static MENTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@([A-Za-z0-9-]+)").expect("mention pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("No GitHub profile found")]
    NotFound,
}

/// Which rule produced a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchRule {
    UrlMatch,
    LabelMatch,
    MentionMatch,
}

/// A username candidate and where it came from.
///
/// `offset` is a byte offset into the text, or the index of the link for
/// candidates found in the link list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub value: String,
    pub rule: MatchRule,
    pub offset: usize,
}

impl Candidate {
    fn new(value: &str, rule: MatchRule, offset: usize) -> Self {
        Self {
            value: trim_trailing_punctuation(value).to_string(),
            rule,
            offset,
        }
    }
}

/// Resolve a username from extracted text and hyperlinks
pub fn resolve(text: &str, links: &[String]) -> Result<String, ResolveError> {
    if text.trim().is_empty() && links.is_empty() {
        return Err(ResolveError::NotFound);
    }

    let candidate = match_links(links)
        .or_else(|| match_profile_url(text))
        .or_else(|| match_label(text))
        .or_else(|| match_mention(text))
        .filter(|c| !c.value.is_empty())
        .ok_or(ResolveError::NotFound)?;

    tracing::debug!(
        "Resolved username {} via {:?} at offset {}",
        candidate.value,
        candidate.rule,
        candidate.offset
    );

    Ok(candidate.value)
}

/// Rule 1: first link, in input order, that contains a profile URL
pub fn match_links(links: &[String]) -> Option<Candidate> {
    links.iter().enumerate().find_map(|(index, link)| {
        match_profile_url(link).map(|c| Candidate { offset: index, ..c })
    })
}

/// Rule 2: first profile URL in the text
pub fn match_profile_url(text: &str) -> Option<Candidate> {
    PROFILE_URL.captures_iter(text).find_map(|caps| {
        let name = caps.get(1)?;
        if name.as_str().len() > MAX_USERNAME_LEN {
            return None;
        }
        let next = text[name.end()..].chars().next();
        if !next.map_or(true, is_url_terminator) {
            return None;
        }
        Some(Candidate::new(name.as_str(), MatchRule::UrlMatch, name.start()))
    })
}

/// Rule 3: the word "github" followed by separators and a handle
pub fn match_label(text: &str) -> Option<Candidate> {
    let caps = LABELED.captures(text)?;
    let name = caps.get(1)?;
    Some(Candidate::new(name.as_str(), MatchRule::LabelMatch, name.start()))
}

/// Rule 4: `@handle`, skipping e-mail addresses and dotted tokens
pub fn match_mention(text: &str) -> Option<Candidate> {
    MENTION.captures_iter(text).find_map(|caps| {
        let whole = caps.get(0)?;
        let name = caps.get(1)?;

        let before = text[..whole.start()].chars().next_back();
        if before.map_or(false, |c| c.is_alphanumeric() || matches!(c, '_' | '.' | '-')) {
            return None;
        }
        if name.as_str().len() > MAX_USERNAME_LEN {
            return None;
        }

        let mut after = text[name.end()..].chars();
        if after.next() == Some('.') && after.next().map_or(false, |c| c.is_ascii_alphanumeric()) {
            return None;
        }

        Some(Candidate::new(name.as_str(), MatchRule::MentionMatch, name.start()))
    })
}

fn is_url_terminator(c: char) -> bool {
    c.is_whitespace() || matches!(c, '/' | ')' | ']' | '.' | ',' | ';' | ':')
}

fn trim_trailing_punctuation(value: &str) -> &str {
    value.trim_end_matches(['.', ',', ';', ')'])
}

/// True if `username` is safe to splice into a GitHub API path
pub fn is_valid_username(username: &str) -> bool {
    !username.is_empty()
        && username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
