use crate::models::github::GitHubRepository;
use crate::models::Repository;

/// Accumulates listing pages into a capped, fork-free repository list
#[derive(Debug)]
pub struct RepositoryCollector {
    repositories: Vec<Repository>,
    cap: usize,
}

impl RepositoryCollector {
    pub fn new(cap: usize) -> Self {
        Self {
            repositories: Vec::new(),
            cap,
        }
    }

    /// Add one page, skipping forks and anything past the cap
    pub fn push_page(&mut self, page: Vec<GitHubRepository>) {
        let room = self.cap.saturating_sub(self.repositories.len());
        self.repositories.extend(
            page.into_iter()
                .filter(|repo| !repo.fork)
                .take(room)
                .map(Repository::from),
        );
    }

    pub fn is_full(&self) -> bool {
        self.repositories.len() >= self.cap
    }

    pub fn len(&self) -> usize {
        self.repositories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.repositories.is_empty()
    }

    /// The collected repositories, most starred first
    pub fn finish(mut self) -> Vec<Repository> {
        sort_by_stars(&mut self.repositories);
        self.repositories
    }
}

/// Sort by star count, descending; equal counts keep their listing order
pub fn sort_by_stars(repositories: &mut [Repository]) {
    repositories.sort_by(|a, b| b.stars.cmp(&a.stars));
}
