use std::collections::HashMap;

use crate::calendar::Meeting;
use crate::error::{RecapError, Result};
use crate::github::{ActivityMap, CommitRecord, PendingReview, PullRequestRecord, Window};

/// Default prompt template, used when no template path is configured
pub const DEFAULT_TEMPLATE: &str = include_str!("../../templates/prompt_template.html");

/// Escape free text for interpolation into HTML fragments.
///
/// Titles, descriptions and commit messages are user-controlled; every
/// free-text field passes through here before interpolation.
pub fn html_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Substitute named `{placeholder}` values into a template.
///
/// Follows the original template conventions: `{{` and `}}` are literal
/// braces. A placeholder the caller does not supply, or an unbalanced
/// brace, is a fatal template error.
pub fn render_template(template: &str, values: &HashMap<&str, String>) -> Result<String> {
    let mut rendered = String::with_capacity(template.len() + 256);
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' => {
                if chars.peek() == Some(&'{') {
                    chars.next();
                    rendered.push('{');
                    continue;
                }
                let mut name = String::new();
                let mut closed = false;
                for next in chars.by_ref() {
                    match next {
                        '}' => {
                            closed = true;
                            break;
                        }
                        '{' => {
                            return Err(RecapError::template(
                                "nested '{' inside placeholder".to_string(),
                            ))
                        }
                        _ => name.push(next),
                    }
                }
                if !closed {
                    return Err(RecapError::template("unbalanced '{' in template".to_string()));
                }
                match values.get(name.as_str()) {
                    Some(value) => rendered.push_str(value),
                    None => {
                        return Err(RecapError::template(format!(
                            "template references unknown placeholder '{}'",
                            name
                        )))
                    }
                }
            }
            '}' => {
                if chars.peek() == Some(&'}') {
                    chars.next();
                    rendered.push('}');
                } else {
                    return Err(RecapError::template("unbalanced '}' in template".to_string()));
                }
            }
            _ => rendered.push(c),
        }
    }

    Ok(rendered)
}

/// Render one commit as a list item with a short-sha link
fn render_commit(commit: &CommitRecord) -> String {
    let message = html_escape(&commit.message).replace('\n', "<br>");
    format!(
        "<li><a href='{}'>{}</a>: {}</li>",
        html_escape(&commit.url),
        commit.short_sha(),
        message
    )
}

/// Render an authored pull request with its recent commits
fn render_pull_request(pr: &PullRequestRecord) -> String {
    let commit_items: String = pr.recent_commits.iter().map(render_commit).collect();
    format!(
        "<li><a href=\"{url}\">{title}</a> [#{number}]\n\
         <ul>\n\
         <li>Description: {description}</li>\n\
         <li>Status: {state}</li>\n\
         <li>Created: {created}</li>\n\
         <li>Recent commits:<ul>{commits}</ul></li>\n\
         </ul>\n\
         </li>",
        url = html_escape(&pr.url),
        title = html_escape(&pr.title),
        number = pr.number,
        description = html_escape(&pr.description),
        state = pr.state,
        created = pr.created_at.format("%Y-%m-%d"),
        commits = commit_items,
    )
}

/// Render a pull request awaiting the user's review
fn render_pending_review(repo_name: &str, pending: &PendingReview) -> String {
    format!(
        "<li><a href=\"{url}\">{title}</a> [#{number}]\n\
         <ul>\n\
         <li>Repository: {repo}</li>\n\
         <li>Created by: {author}</li>\n\
         <li>Created at: {created}</li>\n\
         </ul>\n\
         </li>",
        url = html_escape(&pending.url),
        title = html_escape(&pending.title),
        number = pending.number,
        repo = html_escape(repo_name),
        author = html_escape(&pending.author),
        created = pending.created_at.format("%Y-%m-%d"),
    )
}

/// Render the collected activity into the prompt template.
///
/// Repositories are visited in name order so the rendered prompt is
/// stable for a given activity map.
pub fn build_report_prompt(
    activity: &ActivityMap,
    username: &str,
    window: &Window,
    meetings: &[Meeting],
    template: &str,
) -> Result<String> {
    let total_commits: usize = activity.values().map(|repo| repo.commits.len()).sum();
    let total_prs: usize = activity.values().map(|repo| repo.pull_requests.len()).sum();
    let total_reviewed_prs: usize = activity
        .values()
        .map(|repo| repo.reviewed_pull_requests.len())
        .sum();

    let mut repo_names: Vec<&String> = activity.keys().collect();
    repo_names.sort();

    let mut pr_summaries = Vec::new();
    let mut pending_summaries = Vec::new();
    let mut reviewed_summaries = Vec::new();
    for repo_name in &repo_names {
        let repo = &activity[repo_name.as_str()];
        for pr in &repo.pull_requests {
            pr_summaries.push(render_pull_request(pr));
        }
        for pending in &repo.prs_to_review {
            pending_summaries.push(render_pending_review(repo_name, pending));
        }
        for reviewed in &repo.reviewed_pull_requests {
            reviewed_summaries.push(format!(
                "<li><a href='{}'>{}</a></li>",
                html_escape(&reviewed.url),
                html_escape(&reviewed.title)
            ));
        }
    }

    let meeting_summaries: Vec<String> = meetings
        .iter()
        .map(|meeting| {
            format!(
                "<li>{}: from {} to {}</li>",
                html_escape(&meeting.summary),
                html_escape(&meeting.start),
                html_escape(&meeting.end)
            )
        })
        .collect();

    let mut values: HashMap<&str, String> = HashMap::new();
    values.insert("username", username.to_string());
    values.insert("start_date", window.start_date());
    values.insert("end_date", window.end_date());
    values.insert("total_commits", total_commits.to_string());
    values.insert("total_prs", total_prs.to_string());
    values.insert("total_reviewed_prs", total_reviewed_prs.to_string());
    values.insert(
        "pr_summary_html",
        format!("<ul>{}</ul>", pr_summaries.concat()),
    );
    values.insert(
        "reviewed_pr_summary_html",
        format!("<ul>{}</ul>", reviewed_summaries.concat()),
    );
    values.insert(
        "prs_to_review_html",
        format!("<ul>{}</ul>", pending_summaries.concat()),
    );
    values.insert(
        "meetings_html",
        format!("<ul>{}</ul>", meeting_summaries.concat()),
    );

    render_template(template, &values)
}
