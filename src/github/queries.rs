//! GraphQL documents for the four collections the audit walks.
//!
//! Each query takes `$cursor` and `$first` and exposes a connection with
//! `nodes` and `pageInfo { hasNextPage endCursor }`. The `*_CONNECTION`
//! constants are JSON pointers to that connection inside the response; the
//! commit history pointer is relative to `BRANCH_COMMITS_PARENT`.

/// Members of an organization
pub const ORG_MEMBERS: &str = r#"
query($org: String!, $first: Int!, $cursor: String) {
  organization(login: $org) {
    membersWithRole(first: $first, after: $cursor) {
      nodes { login }
      pageInfo { hasNextPage endCursor }
    }
  }
}
"#;
/// Connection in [`ORG_MEMBERS`] responses
pub const ORG_MEMBERS_CONNECTION: &str = "/data/organization/membersWithRole";

/// Repositories owned by an organization
pub const ORG_REPOSITORIES: &str = r#"
query($org: String!, $first: Int!, $cursor: String) {
  organization(login: $org) {
    repositories(first: $first, after: $cursor) {
      nodes { name }
      pageInfo { hasNextPage endCursor }
    }
  }
}
"#;
/// Connection in [`ORG_REPOSITORIES`] responses
pub const ORG_REPOSITORIES_CONNECTION: &str = "/data/organization/repositories";

/// Branch refs of a repository
pub const REPO_BRANCHES: &str = r#"
query($org: String!, $repo: String!, $first: Int!, $cursor: String) {
  repository(owner: $org, name: $repo) {
    refs(refPrefix: "refs/heads/", first: $first, after: $cursor) {
      nodes { name }
      pageInfo { hasNextPage endCursor }
    }
  }
}
"#;
/// Connection in [`REPO_BRANCHES`] responses
pub const REPO_BRANCHES_CONNECTION: &str = "/data/repository/refs";

/// Commit history of one branch since a `GitTimestamp`
///
/// `ref` or `target` is null for a branch that no longer resolves.
pub const BRANCH_COMMITS: &str = r#"
query($owner: String!, $name: String!, $branch: String!, $since: GitTimestamp!, $first: Int!, $cursor: String) {
  repository(owner: $owner, name: $name) {
    ref(qualifiedName: $branch) {
      target {
        ... on Commit {
          history(first: $first, after: $cursor, since: $since) {
            nodes { author { user { login } date } }
            pageInfo { hasNextPage endCursor }
          }
        }
      }
    }
  }
}
"#;
/// Repository object that must be present in [`BRANCH_COMMITS`] responses
pub const BRANCH_COMMITS_PARENT: &str = "/data/repository";
/// History connection, relative to [`BRANCH_COMMITS_PARENT`]
pub const BRANCH_COMMITS_CONNECTION: &str = "/ref/target/history";

/// Issues of a repository, most recently updated first
pub const REPO_ISSUES: &str = r#"
query($owner: String!, $name: String!, $first: Int!, $cursor: String) {
  repository(owner: $owner, name: $name) {
    issues(first: $first, after: $cursor, orderBy: {field: UPDATED_AT, direction: DESC}) {
      nodes { author { login } updatedAt }
      pageInfo { hasNextPage endCursor }
    }
  }
}
"#;
/// Connection in [`REPO_ISSUES`] responses
pub const REPO_ISSUES_CONNECTION: &str = "/data/repository/issues";

/// Pull requests of a repository in every state, most recently updated first
pub const REPO_PULL_REQUESTS: &str = r#"
query($owner: String!, $name: String!, $first: Int!, $cursor: String) {
  repository(owner: $owner, name: $name) {
    pullRequests(states: [OPEN, CLOSED, MERGED], orderBy: {field: UPDATED_AT, direction: DESC}, first: $first, after: $cursor) {
      nodes { author { login } updatedAt }
      pageInfo { hasNextPage endCursor }
    }
  }
}
"#;
/// Connection in [`REPO_PULL_REQUESTS`] responses
pub const REPO_PULL_REQUESTS_CONNECTION: &str = "/data/repository/pullRequests";
