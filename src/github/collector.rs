use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::error::Result;
use crate::github::cleaner::{clean_commit_message, extract_description_text};
use crate::github::client::{RepoCommit, SourceControl};
use crate::github::{
    ActivityMap, CommitRecord, PendingReview, PullRequestRecord, RepositoryActivity,
    ReviewedPullRequest, Window,
};

/// Map a wire commit to a record, cleaning its message
fn commit_record(commit: &RepoCommit) -> CommitRecord {
    CommitRecord {
        sha: commit.sha.clone(),
        message: clean_commit_message(&commit.commit.message),
        url: commit.html_url.clone(),
        date: commit.commit.author.date,
    }
}

/// Collect one repository's activity for `username` within `window`.
///
/// Every collaborator failure is caught here, logged with the repository
/// name, and degrades to an all-empty activity record; a broken or
/// inaccessible repository never aborts the run.
pub async fn process_repo(
    api: &dyn SourceControl,
    repo_name: &str,
    username: &str,
    window: &Window,
) -> RepositoryActivity {
    match collect_repo(api, repo_name, username, window).await {
        Ok(activity) => activity,
        Err(e) => {
            warn!(repo = repo_name, error = %e, "error processing repository, reporting no activity");
            RepositoryActivity::default()
        }
    }
}

async fn collect_repo(
    api: &dyn SourceControl,
    repo_name: &str,
    username: &str,
    window: &Window,
) -> Result<RepositoryActivity> {
    let mut activity = RepositoryActivity::default();

    api.resolve_repo(repo_name).await?;

    let commits = api.commits_by_author(repo_name, username, window).await?;
    activity.commits = commits.iter().map(commit_record).collect();

    let mut page = 1u32;
    'scan: loop {
        let pulls = api.pull_requests_page(repo_name, page).await?;
        if pulls.is_empty() {
            break;
        }

        for pr in &pulls {
            // Pages arrive update-descending: once a PR predates the
            // window start, nothing later in the listing can qualify.
            if pr.updated_at < window.start {
                break 'scan;
            }

            if pr.user.login == username {
                let pr_commits = api.pull_commits(repo_name, pr.number).await?;
                let recent_commits: Vec<CommitRecord> = pr_commits
                    .iter()
                    .filter(|c| window.contains(&c.commit.author.date))
                    .map(commit_record)
                    .collect();

                if window.contains(&pr.created_at) || !recent_commits.is_empty() {
                    activity.pull_requests.push(PullRequestRecord {
                        number: pr.number,
                        title: pr.title.clone(),
                        description: extract_description_text(pr.body.as_deref()),
                        state: pr.state,
                        url: pr.html_url.clone(),
                        created_at: pr.created_at,
                        updated_at: pr.updated_at,
                        recent_commits,
                    });
                }
            }

            let reviews = api.pull_reviews(repo_name, pr.number).await?;
            let reviewed_by_user = reviews.iter().any(|review| {
                review
                    .user
                    .as_ref()
                    .map_or(false, |user| user.login == username)
                    && review
                        .submitted_at
                        .map_or(false, |submitted| window.contains(&submitted))
            });
            if reviewed_by_user {
                activity.reviewed_pull_requests.push(ReviewedPullRequest {
                    title: pr.title.clone(),
                    url: pr.html_url.clone(),
                });
            }

            // Pending review requests are current state, not history:
            // no window filter.
            let reviewers = api.requested_reviewers(repo_name, pr.number).await?;
            if reviewers.iter().any(|login| login == username) {
                activity.prs_to_review.push(PendingReview {
                    title: pr.title.clone(),
                    number: pr.number,
                    url: pr.html_url.clone(),
                    created_at: pr.created_at,
                    author: pr.user.login.clone(),
                });
            }
        }

        page += 1;
    }

    debug!(
        repo = repo_name,
        commits = activity.commits.len(),
        pull_requests = activity.pull_requests.len(),
        reviewed = activity.reviewed_pull_requests.len(),
        pending = activity.prs_to_review.len(),
        "collected repository activity"
    );

    Ok(activity)
}

/// Collect activity across all repositories concurrently, one task per
/// repository, and merge the results keyed by repository name.
pub async fn get_user_activity(
    api: Arc<dyn SourceControl>,
    username: &str,
    window: &Window,
    repo_list: &[String],
) -> ActivityMap {
    let mut tasks = JoinSet::new();
    for repo_name in repo_list {
        let api = Arc::clone(&api);
        let repo_name = repo_name.clone();
        let username = username.to_string();
        let window = window.clone();
        tasks.spawn(async move {
            let activity = process_repo(api.as_ref(), &repo_name, &username, &window).await;
            (repo_name, activity)
        });
    }

    let mut activity_map = ActivityMap::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((repo_name, activity)) => {
                activity_map.insert(repo_name, activity);
            }
            // process_repo already absorbs collaborator errors, so this
            // only fires if a task panicked; drop that repository.
            Err(e) => warn!(error = %e, "repository task failed, omitting from results"),
        }
    }
    activity_map
}
