//! The collections an audit walks: members, repositories, branches and the
//! per-branch activity history.

use super::pagination::{paginate, paginate_optional};
use super::queries;
use super::QueryRunner;
use crate::activity::{parse_timestamp, ActivityMap, Cutoff};
use crate::error::Result;
use log::debug;
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
struct LoginNode {
    login: String,
}

#[derive(Debug, Deserialize)]
struct NameNode {
    name: String,
}

#[derive(Debug, Deserialize)]
struct CommitNode {
    author: Option<CommitAuthor>,
}

#[derive(Debug, Deserialize)]
struct CommitAuthor {
    user: Option<LoginNode>,
    date: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthoredNode {
    author: Option<LoginNode>,
    updated_at: String,
}

/// Logins of every member of `org`
pub async fn fetch_members<R: QueryRunner + ?Sized>(runner: &R, org: &str) -> Result<Vec<String>> {
    let nodes: Vec<LoginNode> = paginate(
        runner,
        queries::ORG_MEMBERS,
        json!({ "org": org }),
        queries::ORG_MEMBERS_CONNECTION,
    )
    .await?;
    Ok(nodes.into_iter().map(|n| n.login).collect())
}

/// Names of every repository owned by `org`
pub async fn fetch_repositories<R: QueryRunner + ?Sized>(runner: &R, org: &str) -> Result<Vec<String>> {
    let nodes: Vec<NameNode> = paginate(
        runner,
        queries::ORG_REPOSITORIES,
        json!({ "org": org }),
        queries::ORG_REPOSITORIES_CONNECTION,
    )
    .await?;
    Ok(nodes.into_iter().map(|n| n.name).collect())
}

/// Names of every branch (`refs/heads/*`) of `org/repo`
pub async fn fetch_branches<R: QueryRunner + ?Sized>(runner: &R, org: &str, repo: &str) -> Result<Vec<String>> {
    let nodes: Vec<NameNode> = paginate(
        runner,
        queries::REPO_BRANCHES,
        json!({ "org": org, "repo": repo }),
        queries::REPO_BRANCHES_CONNECTION,
    )
    .await?;
    Ok(nodes.into_iter().map(|n| n.name).collect())
}

/// Commit authors on `branch` since the cutoff
///
/// Commits whose author is not linked to a GitHub user are skipped. A branch
/// whose ref or target no longer resolves contributes nothing.
pub async fn fetch_commit_activity<R: QueryRunner + ?Sized>(
    runner: &R,
    org: &str,
    repo: &str,
    branch: &str,
    cutoff: Cutoff,
) -> Result<ActivityMap> {
    let nodes: Vec<CommitNode> = paginate_optional(
        runner,
        queries::BRANCH_COMMITS,
        json!({
            "owner": org,
            "name": repo,
            "branch": format!("refs/heads/{}", branch),
            "since": cutoff.as_git_timestamp(),
        }),
        queries::BRANCH_COMMITS_PARENT,
        queries::BRANCH_COMMITS_CONNECTION,
    )
    .await?;

    let mut activity = ActivityMap::new();
    for author in nodes.into_iter().filter_map(|n| n.author) {
        match (author.user, author.date) {
            (Some(user), Some(date)) => {
                activity.record(&user.login, parse_timestamp(&date)?);
            }
            (Some(user), None) => debug!("Commit by {} has no author date, skipping", user.login),
            (None, _) => {}
        }
    }
    Ok(activity)
}

/// Issue authors in `org/repo`, by last update
pub async fn fetch_issue_activity<R: QueryRunner + ?Sized>(runner: &R, org: &str, repo: &str) -> Result<ActivityMap> {
    let nodes: Vec<AuthoredNode> = paginate(
        runner,
        queries::REPO_ISSUES,
        json!({ "owner": org, "name": repo }),
        queries::REPO_ISSUES_CONNECTION,
    )
    .await?;
    authored_activity(nodes)
}

/// Pull request authors in `org/repo` (open, closed and merged), by last update
pub async fn fetch_pull_request_activity<R: QueryRunner + ?Sized>(
    runner: &R,
    org: &str,
    repo: &str,
) -> Result<ActivityMap> {
    let nodes: Vec<AuthoredNode> = paginate(
        runner,
        queries::REPO_PULL_REQUESTS,
        json!({ "owner": org, "name": repo }),
        queries::REPO_PULL_REQUESTS_CONNECTION,
    )
    .await?;
    authored_activity(nodes)
}

fn authored_activity(nodes: Vec<AuthoredNode>) -> Result<ActivityMap> {
    let mut activity = ActivityMap::new();
    for node in nodes {
        // Ghost (deleted) accounts come back with a null author.
        if let Some(author) = node.author {
            activity.record(&author.login, parse_timestamp(&node.updated_at)?);
        }
    }
    Ok(activity)
}

/// Everything known about who was active on one branch
///
/// Combines commit authorship since the cutoff with issue and pull request
/// authorship. Issues and pull requests are not bounded by the cutoff, so
/// older activity from them is still reported (as inactive).
pub async fn fetch_branch_activity<R: QueryRunner + ?Sized>(
    runner: &R,
    org: &str,
    repo: &str,
    branch: &str,
    cutoff: Cutoff,
) -> Result<ActivityMap> {
    let mut activity = fetch_commit_activity(runner, org, repo, branch, cutoff).await?;
    activity.merge(&fetch_issue_activity(runner, org, repo).await?);
    activity.merge(&fetch_pull_request_activity(runner, org, repo).await?);
    Ok(activity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedRunner;
    use chrono::{DateTime, Utc};
    use pretty_assertions::assert_eq;
    use serde_json::Value;

    fn ts(value: &str) -> DateTime<Utc> {
        parse_timestamp(value).unwrap()
    }

    fn cutoff() -> Cutoff {
        Cutoff::at(ts("2024-01-01T00:00:00Z"))
    }

    fn history(nodes: Value) -> Value {
        json!({ "data": { "repository": { "ref": { "target": { "history": {
            "nodes": nodes,
            "pageInfo": { "hasNextPage": false, "endCursor": null }
        } } } } } })
    }

    fn authored(connection: &str, nodes: Value) -> Value {
        json!({ "data": { "repository": { connection: {
            "nodes": nodes,
            "pageInfo": { "hasNextPage": false, "endCursor": null }
        } } } })
    }

    #[tokio::test]
    async fn test_fetch_members_across_pages() {
        let runner = ScriptedRunner::new()
            .on(
                "membersWithRole(",
                json!({ "org": "acme", "cursor": null }),
                json!({ "data": { "organization": { "membersWithRole": {
                    "nodes": [{ "login": "alice" }, { "login": "bob" }],
                    "pageInfo": { "hasNextPage": true, "endCursor": "m1" }
                } } } }),
            )
            .on(
                "membersWithRole(",
                json!({ "org": "acme", "cursor": "m1" }),
                json!({ "data": { "organization": { "membersWithRole": {
                    "nodes": [{ "login": "carol" }],
                    "pageInfo": { "hasNextPage": false, "endCursor": "m2" }
                } } } }),
            );

        let members = fetch_members(&runner, "acme").await.unwrap();
        assert_eq!(members, vec!["alice", "bob", "carol"]);
        assert_eq!(runner.count("membersWithRole("), 2);
    }

    #[tokio::test]
    async fn test_fetch_branches_passes_repo() {
        let runner = ScriptedRunner::new().on(
            "refs(",
            json!({ "org": "acme", "repo": "x" }),
            json!({ "data": { "repository": { "refs": {
                "nodes": [{ "name": "main" }, { "name": "feature/login" }],
                "pageInfo": { "hasNextPage": false, "endCursor": null }
            } } } }),
        );

        let branches = fetch_branches(&runner, "acme", "x").await.unwrap();
        assert_eq!(branches, vec!["main", "feature/login"]);
    }

    #[tokio::test]
    async fn test_commit_activity_skips_unlinked_authors() {
        let runner = ScriptedRunner::new().on(
            "history(",
            json!({ "branch": "refs/heads/main", "since": "2024-01-01T00:00:00+00:00" }),
            history(json!([
                { "author": { "user": { "login": "alice" }, "date": "2024-01-10T00:00:00Z" } },
                { "author": { "user": null, "date": "2024-01-11T00:00:00Z" } },
                { "author": { "user": { "login": "alice" }, "date": "2024-01-05T00:00:00Z" } },
                { "author": null }
            ])),
        );

        let activity = fetch_commit_activity(&runner, "acme", "x", "main", cutoff()).await.unwrap();
        assert_eq!(activity.len(), 1);
        assert_eq!(activity.get("alice"), Some(ts("2024-01-10T00:00:00Z")));
    }

    #[tokio::test]
    async fn test_commit_activity_for_unresolvable_branch_is_empty() {
        let runner = ScriptedRunner::new()
            .on("history(", json!({ "branch": "refs/heads/gone" }), json!({ "data": { "repository": { "ref": null } } }))
            .on(
                "history(",
                json!({ "branch": "refs/heads/unborn" }),
                json!({ "data": { "repository": { "ref": { "target": null } } } }),
            );

        assert!(fetch_commit_activity(&runner, "acme", "x", "gone", cutoff()).await.unwrap().is_empty());
        assert!(fetch_commit_activity(&runner, "acme", "x", "unborn", cutoff()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_branch_activity_merges_all_sources() {
        let runner = ScriptedRunner::new()
            .on(
                "history(",
                json!({}),
                history(json!([
                    { "author": { "user": { "login": "alice" }, "date": "2024-01-10T00:00:00Z" } }
                ])),
            )
            .on(
                "issues(",
                json!({}),
                authored(
                    "issues",
                    json!([
                        { "author": { "login": "bob" }, "updatedAt": "2024-02-01T00:00:00Z" },
                        { "author": null, "updatedAt": "2024-02-02T00:00:00Z" },
                        { "author": { "login": "alice" }, "updatedAt": "2023-06-01T00:00:00Z" }
                    ]),
                ),
            )
            .on(
                "pullRequests(",
                json!({}),
                authored(
                    "pullRequests",
                    json!([{ "author": { "login": "alice" }, "updatedAt": "2024-01-20T00:00:00Z" }]),
                ),
            );

        let activity = fetch_branch_activity(&runner, "acme", "x", "main", cutoff()).await.unwrap();
        let rows: Vec<_> = activity.iter().map(|(login, at)| (login.to_string(), at)).collect();
        assert_eq!(
            rows,
            vec![
                ("alice".to_string(), ts("2024-01-20T00:00:00Z")),
                ("bob".to_string(), ts("2024-02-01T00:00:00Z")),
            ]
        );
    }

    #[tokio::test]
    async fn test_bad_timestamp_fails_the_branch() {
        let runner = ScriptedRunner::new().on(
            "history(",
            json!({}),
            history(json!([{ "author": { "user": { "login": "alice" }, "date": "last tuesday" } }])),
        );

        assert!(fetch_commit_activity(&runner, "acme", "x", "main", cutoff()).await.is_err());
    }
}
