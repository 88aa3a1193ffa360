pub mod cleaner;
pub mod client;
pub mod collector;

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;

use crate::error::{RecapError, Result};

/// Reporting window, half-open: `[start, end)`
#[derive(Debug, Clone)]
pub struct Window {
    /// Start of the window (inclusive)
    pub start: DateTime<Utc>,
    /// End of the window (exclusive)
    pub end: DateTime<Utc>,
}

impl Window {
    /// Create a window from explicit bounds; `start` must precede `end`
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if start >= end {
            return Err(RecapError::config(format!(
                "invalid report window: start {} is not before end {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// Create a window covering the last `days` days, ending now
    pub fn days_back(days: u32) -> Self {
        let end = Utc::now();
        let start = end - Duration::days(days as i64);
        Self { start, end }
    }

    /// Check whether a timestamp falls within this window
    pub fn contains(&self, date: &DateTime<Utc>) -> bool {
        date >= &self.start && date < &self.end
    }

    /// Start bound formatted as a date (YYYY-MM-DD)
    pub fn start_date(&self) -> String {
        self.start.format("%Y-%m-%d").to_string()
    }

    /// End bound formatted as a date (YYYY-MM-DD)
    pub fn end_date(&self) -> String {
        self.end.format("%Y-%m-%d").to_string()
    }
}

/// A commit authored by the user, with its message already cleaned
#[derive(Debug, Clone)]
pub struct CommitRecord {
    /// Full commit SHA
    pub sha: String,
    /// Cleaned commit message (may span multiple lines)
    pub message: String,
    /// Link to the commit on GitHub
    pub url: String,
    /// Authored timestamp
    pub date: DateTime<Utc>,
}

impl CommitRecord {
    /// Short SHA (7 characters), as rendered in report links
    pub fn short_sha(&self) -> &str {
        &self.sha[..self.sha.len().min(7)]
    }
}

/// Pull request state as reported by GitHub
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PullState {
    Open,
    Closed,
    Merged,
}

impl fmt::Display for PullState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PullState::Open => write!(f, "open"),
            PullState::Closed => write!(f, "closed"),
            PullState::Merged => write!(f, "merged"),
        }
    }
}

/// A pull request authored by the user within the window
#[derive(Debug, Clone)]
pub struct PullRequestRecord {
    /// PR number, unique within its repository
    pub number: u64,
    /// PR title
    pub title: String,
    /// Cleaned description text (possibly empty)
    pub description: String,
    /// State as reported by GitHub
    pub state: PullState,
    /// Link to the PR
    pub url: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last-update timestamp
    pub updated_at: DateTime<Utc>,
    /// Commits on this PR authored within the window
    pub recent_commits: Vec<CommitRecord>,
}

/// A pull request the user reviewed within the window
#[derive(Debug, Clone)]
pub struct ReviewedPullRequest {
    /// PR title
    pub title: String,
    /// Link to the PR
    pub url: String,
}

/// A pull request where the user is a requested reviewer
#[derive(Debug, Clone)]
pub struct PendingReview {
    /// PR title
    pub title: String,
    /// PR number
    pub number: u64,
    /// Link to the PR
    pub url: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Login of the PR author
    pub author: String,
}

/// Aggregated activity for a single repository
#[derive(Debug, Clone, Default)]
pub struct RepositoryActivity {
    /// Commits authored by the user in the window
    pub commits: Vec<CommitRecord>,
    /// Pull requests authored by the user with activity in the window
    pub pull_requests: Vec<PullRequestRecord>,
    /// Pull requests the user reviewed in the window
    pub reviewed_pull_requests: Vec<ReviewedPullRequest>,
    /// Pull requests awaiting the user's review
    pub prs_to_review: Vec<PendingReview>,
}

/// Per-repository activity for the current run, keyed by repository name
pub type ActivityMap = HashMap<String, RepositoryActivity>;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_window_days_back() {
        let now = Utc::now();
        let window = Window::days_back(7);

        let recent_date = now - Duration::days(3);
        assert!(window.contains(&recent_date));

        let old_date = now - Duration::days(10);
        assert!(!window.contains(&old_date));
    }

    #[test]
    fn test_window_half_open_bounds() {
        let start = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 6, 8, 0, 0, 0).unwrap();
        let window = Window::new(start, end).unwrap();

        assert!(window.contains(&start));
        assert!(!window.contains(&end));
        assert!(window.contains(&(end - Duration::seconds(1))));
    }

    #[test]
    fn test_window_rejects_inverted_bounds() {
        let start = Utc.with_ymd_and_hms(2024, 6, 8, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        assert!(Window::new(start, end).is_err());
        assert!(Window::new(start, start).is_err());
    }

    #[test]
    fn test_window_date_formatting() {
        let start = Utc.with_ymd_and_hms(2024, 6, 1, 13, 45, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 6, 8, 9, 30, 0).unwrap();
        let window = Window::new(start, end).unwrap();

        assert_eq!(window.start_date(), "2024-06-01");
        assert_eq!(window.end_date(), "2024-06-08");
    }

    #[test]
    fn test_commit_short_sha() {
        let commit = CommitRecord {
            sha: "0123456789abcdef".to_string(),
            message: "Test".to_string(),
            url: "https://github.com/o/r/commit/0123456789abcdef".to_string(),
            date: Utc::now(),
        };
        assert_eq!(commit.short_sha(), "0123456");

        let short = CommitRecord {
            sha: "abc".to_string(),
            message: "Test".to_string(),
            url: String::new(),
            date: Utc::now(),
        };
        assert_eq!(short.short_sha(), "abc");
    }

    #[test]
    fn test_pull_state_display() {
        assert_eq!(PullState::Open.to_string(), "open");
        assert_eq!(PullState::Closed.to_string(), "closed");
        assert_eq!(PullState::Merged.to_string(), "merged");
    }

    #[test]
    fn test_pull_state_deserialize() {
        let state: PullState = serde_json::from_str("\"open\"").unwrap();
        assert_eq!(state, PullState::Open);
        let state: PullState = serde_json::from_str("\"closed\"").unwrap();
        assert_eq!(state, PullState::Closed);
    }
}
