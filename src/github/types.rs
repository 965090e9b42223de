// GitHub API response types.
// Defines structs for deserializing GitHub REST API responses and listing options.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Public profile of a GitHub user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub login: String,
    pub name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: String,
    pub public_repos: u64,
    pub followers: u64,
    pub following: u64,
}

/// GitHub repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub id: u64,
    pub name: String,
    pub description: Option<String>,
    pub html_url: String,
    pub homepage: Option<String>,
    pub language: Option<String>,
    pub stargazers_count: u64,
    pub forks_count: u64,
    #[serde(default)]
    pub topics: Vec<String>,
    pub updated_at: DateTime<Utc>,
}

/// Sort key for repository listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepoSort {
    Created,
    #[default]
    Updated,
    Pushed,
    FullName,
}

impl RepoSort {
    pub fn as_str(&self) -> &'static str {
        match self {
            RepoSort::Created => "created",
            RepoSort::Updated => "updated",
            RepoSort::Pushed => "pushed",
            RepoSort::FullName => "full_name",
        }
    }
}

/// Sort direction for repository listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// Query options for listing a user's repositories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryOptions {
    pub sort: RepoSort,
    pub direction: SortDirection,
    pub per_page: u32,
    pub page: u32,
}

impl Default for RepositoryOptions {
    fn default() -> Self {
        Self {
            sort: RepoSort::Updated,
            direction: SortDirection::Desc,
            per_page: 100,
            page: 1,
        }
    }
}

impl RepositoryOptions {
    /// Query string parameters in the order GitHub documents them.
    pub fn query(&self) -> [(&'static str, String); 4] {
        [
            ("sort", self.sort.as_str().to_string()),
            ("direction", self.direction.as_str().to_string()),
            ("per_page", self.per_page.to_string()),
            ("page", self.page.to_string()),
        ]
    }
}

impl fmt::Display for RepositoryOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}-{}",
            self.sort.as_str(),
            self.direction.as_str(),
            self.per_page,
            self.page
        )
    }
}

/// Rate limit information from response headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RateLimit {
    pub limit: u64,
    pub remaining: u64,
    /// Epoch seconds at which the quota replenishes.
    pub reset: u64,
}

impl RateLimit {
    /// Whether the quota is spent and the window has not reset yet.
    pub fn is_exhausted_at(&self, now_epoch_secs: i64) -> bool {
        self.remaining == 0 && (self.reset as i64) > now_epoch_secs
    }

    pub fn reset_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.reset as i64, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_deserializes_github_payload() {
        let json = r#"{
            "id": 1296269,
            "name": "Hello-World",
            "full_name": "octocat/Hello-World",
            "description": null,
            "html_url": "https://github.com/octocat/Hello-World",
            "homepage": "https://github.com",
            "language": "Rust",
            "stargazers_count": 80,
            "forks_count": 9,
            "topics": ["octocat", "api"],
            "updated_at": "2011-01-26T19:14:43Z"
        }"#;

        let repo: Repository = serde_json::from_str(json).unwrap();
        assert_eq!(repo.id, 1296269);
        assert_eq!(repo.description, None);
        assert_eq!(repo.language.as_deref(), Some("Rust"));
        assert_eq!(repo.topics, vec!["octocat", "api"]);
    }

    #[test]
    fn test_repository_topics_default_to_empty() {
        let json = r#"{
            "id": 1,
            "name": "bare",
            "description": "no topics",
            "html_url": "https://github.com/octocat/bare",
            "homepage": null,
            "language": null,
            "stargazers_count": 0,
            "forks_count": 0,
            "updated_at": "2024-03-01T00:00:00Z"
        }"#;

        let repo: Repository = serde_json::from_str(json).unwrap();
        assert!(repo.topics.is_empty());
    }

    #[test]
    fn test_default_options_query() {
        let query = RepositoryOptions::default().query();
        assert_eq!(query[0], ("sort", "updated".to_string()));
        assert_eq!(query[1], ("direction", "desc".to_string()));
        assert_eq!(query[2], ("per_page", "100".to_string()));
        assert_eq!(query[3], ("page", "1".to_string()));
    }

    #[test]
    fn test_full_name_sort_key() {
        let options = RepositoryOptions {
            sort: RepoSort::FullName,
            direction: SortDirection::Asc,
            per_page: 30,
            page: 2,
        };
        assert_eq!(options.to_string(), "full_name-asc-30-2");
    }

    #[test]
    fn test_rate_limit_exhaustion() {
        let limit = RateLimit {
            limit: 60,
            remaining: 0,
            reset: 1_000,
        };
        assert!(limit.is_exhausted_at(999));
        assert!(!limit.is_exhausted_at(1_000));

        let spare = RateLimit {
            remaining: 5,
            ..limit
        };
        assert!(!spare.is_exhausted_at(0));
    }
}
