use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::error::{RecapError, Result};
use crate::github::{PullState, Window};

const GITHUB_API_URL: &str = "https://api.github.com";
const USER_AGENT: &str = concat!("weekly-recap/", env!("CARGO_PKG_VERSION"));
const PER_PAGE: u32 = 100;
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// A commit as returned by the GitHub REST API
#[derive(Debug, Clone, Deserialize)]
pub struct RepoCommit {
    /// Full commit SHA
    pub sha: String,
    /// Link to the commit on github.com
    pub html_url: String,
    /// Embedded git commit data
    pub commit: GitCommit,
}

/// The git commit object embedded in a REST commit
#[derive(Debug, Clone, Deserialize)]
pub struct GitCommit {
    /// Raw commit message
    pub message: String,
    /// Git author (name/date as recorded in the commit)
    pub author: GitActor,
}

/// Git author signature; only the date is used
#[derive(Debug, Clone, Deserialize)]
pub struct GitActor {
    pub date: DateTime<Utc>,
}

/// A pull request as listed by `GET /repos/{repo}/pulls`
#[derive(Debug, Clone, Deserialize)]
pub struct PullSummary {
    pub number: u64,
    pub title: String,
    pub body: Option<String>,
    pub state: PullState,
    pub html_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user: User,
}

/// A GitHub user reference
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub login: String,
}

/// A review submitted on a pull request
#[derive(Debug, Clone, Deserialize)]
pub struct PullReview {
    /// Reviewer; absent for deleted accounts
    pub user: Option<User>,
    /// Submission time; absent for reviews still pending
    pub submitted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct RequestedReviewers {
    users: Vec<User>,
}

/// Capability set the Activity Collector needs from a source-control
/// backend. The reqwest implementation is [`GitHubClient`]; tests use an
/// in-memory fake.
#[async_trait]
pub trait SourceControl: Send + Sync {
    /// Resolve a repository by qualified name (`owner/repo`), verifying
    /// it exists and is accessible with the configured credentials.
    async fn resolve_repo(&self, full_name: &str) -> Result<()>;

    /// Commits authored by `author` within the window.
    async fn commits_by_author(
        &self,
        full_name: &str,
        author: &str,
        window: &Window,
    ) -> Result<Vec<RepoCommit>>;

    /// One page of pull requests (any state), sorted by update time
    /// descending. Pages start at 1; an empty page means the listing is
    /// exhausted.
    async fn pull_requests_page(&self, full_name: &str, page: u32) -> Result<Vec<PullSummary>>;

    /// All commits on a pull request.
    async fn pull_commits(&self, full_name: &str, number: u64) -> Result<Vec<RepoCommit>>;

    /// All reviews submitted on a pull request.
    async fn pull_reviews(&self, full_name: &str, number: u64) -> Result<Vec<PullReview>>;

    /// Logins of the users currently requested to review a pull request.
    async fn requested_reviewers(&self, full_name: &str, number: u64) -> Result<Vec<String>>;
}

/// GitHub REST v3 client
pub struct GitHubClient {
    client: Client,
    token: String,
    base_url: String,
}

impl GitHubClient {
    /// Create a new GitHub client authenticated with `token`
    pub fn new(token: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            token,
            base_url: GITHUB_API_URL.to_string(),
        })
    }

    /// Override the API base URL (used against test servers)
    #[allow(dead_code)]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        debug!(path, "GitHub API request");
        let response = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .header("User-Agent", USER_AGENT)
            .header("Accept", "application/vnd.github+json")
            .bearer_auth(&self.token)
            .query(query)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(RecapError::github(format!(
                "GET {} failed with status {}: {}",
                path, status, body
            )));
        }

        Ok(response.json().await?)
    }

    /// Fetch every page of a list endpoint
    async fn get_all_pages<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut page = 1u32;
        loop {
            let mut paged_query: Vec<(&str, String)> = query.to_vec();
            paged_query.push(("per_page", PER_PAGE.to_string()));
            paged_query.push(("page", page.to_string()));

            let batch: Vec<T> = self.get_json(path, &paged_query).await?;
            let exhausted = (batch.len() as u32) < PER_PAGE;
            items.extend(batch);
            if exhausted {
                return Ok(items);
            }
            page += 1;
        }
    }
}

#[async_trait]
impl SourceControl for GitHubClient {
    async fn resolve_repo(&self, full_name: &str) -> Result<()> {
        // Response body is irrelevant; a non-2xx status is the signal.
        let _: serde_json::Value = self.get_json(&format!("/repos/{}", full_name), &[]).await?;
        Ok(())
    }

    async fn commits_by_author(
        &self,
        full_name: &str,
        author: &str,
        window: &Window,
    ) -> Result<Vec<RepoCommit>> {
        self.get_all_pages(
            &format!("/repos/{}/commits", full_name),
            &[
                ("author", author.to_string()),
                ("since", window.start.to_rfc3339()),
                ("until", window.end.to_rfc3339()),
            ],
        )
        .await
    }

    async fn pull_requests_page(&self, full_name: &str, page: u32) -> Result<Vec<PullSummary>> {
        self.get_json(
            &format!("/repos/{}/pulls", full_name),
            &[
                ("state", "all".to_string()),
                ("sort", "updated".to_string()),
                ("direction", "desc".to_string()),
                ("per_page", PER_PAGE.to_string()),
                ("page", page.to_string()),
            ],
        )
        .await
    }

    async fn pull_commits(&self, full_name: &str, number: u64) -> Result<Vec<RepoCommit>> {
        self.get_all_pages(&format!("/repos/{}/pulls/{}/commits", full_name, number), &[])
            .await
    }

    async fn pull_reviews(&self, full_name: &str, number: u64) -> Result<Vec<PullReview>> {
        self.get_all_pages(&format!("/repos/{}/pulls/{}/reviews", full_name, number), &[])
            .await
    }

    async fn requested_reviewers(&self, full_name: &str, number: u64) -> Result<Vec<String>> {
        let reviewers: RequestedReviewers = self
            .get_json(
                &format!("/repos/{}/pulls/{}/requested_reviewers", full_name, number),
                &[],
            )
            .await?;
        Ok(reviewers.users.into_iter().map(|user| user.login).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = GitHubClient::new("ghp_test_token".to_string()).unwrap();
        assert_eq!(client.base_url, GITHUB_API_URL);
    }

    #[test]
    fn test_client_base_url_override() {
        let client = GitHubClient::new("ghp_test_token".to_string())
            .unwrap()
            .with_base_url("http://127.0.0.1:8080".to_string());
        assert_eq!(client.base_url, "http://127.0.0.1:8080");
    }

    #[test]
    fn test_deserialize_repo_commit() {
        let json = r#"{
            "sha": "f3c9a1b2d4e5f60718293a4b5c6d7e8f90a1b2c3",
            "html_url": "https://github.com/org/repo/commit/f3c9a1b",
            "commit": {
                "message": "feat: add widget",
                "author": { "name": "Alice", "date": "2024-06-03T10:15:00Z" }
            }
        }"#;
        let commit: RepoCommit = serde_json::from_str(json).unwrap();
        assert_eq!(commit.sha.len(), 40);
        assert_eq!(commit.commit.message, "feat: add widget");
        assert_eq!(commit.commit.author.date.to_rfc3339(), "2024-06-03T10:15:00+00:00");
    }

    #[test]
    fn test_deserialize_pull_summary() {
        let json = r#"{
            "number": 42,
            "title": "Add OAuth2 login flow",
            "body": "Description:\nImplements the flow",
            "state": "open",
            "html_url": "https://github.com/org/repo/pull/42",
            "created_at": "2024-06-01T09:00:00Z",
            "updated_at": "2024-06-04T17:30:00Z",
            "user": { "login": "alice" }
        }"#;
        let pull: PullSummary = serde_json::from_str(json).unwrap();
        assert_eq!(pull.number, 42);
        assert_eq!(pull.state, PullState::Open);
        assert_eq!(pull.user.login, "alice");
        assert!(pull.body.as_deref().unwrap().contains("Description:"));
    }

    #[test]
    fn test_deserialize_pull_summary_null_body() {
        let json = r#"{
            "number": 7,
            "title": "No description",
            "body": null,
            "state": "closed",
            "html_url": "https://github.com/org/repo/pull/7",
            "created_at": "2024-06-01T09:00:00Z",
            "updated_at": "2024-06-02T09:00:00Z",
            "user": { "login": "bob" }
        }"#;
        let pull: PullSummary = serde_json::from_str(json).unwrap();
        assert!(pull.body.is_none());
    }

    #[test]
    fn test_deserialize_review_pending() {
        // Pending reviews carry no submitted_at; deleted users come back null.
        let json = r#"{ "user": null, "submitted_at": null }"#;
        let review: PullReview = serde_json::from_str(json).unwrap();
        assert!(review.user.is_none());
        assert!(review.submitted_at.is_none());
    }

    #[test]
    fn test_deserialize_requested_reviewers() {
        let json = r#"{ "users": [{ "login": "carol" }], "teams": [] }"#;
        let reviewers: RequestedReviewers = serde_json::from_str(json).unwrap();
        assert_eq!(reviewers.users.len(), 1);
        assert_eq!(reviewers.users[0].login, "carol");
    }
}
