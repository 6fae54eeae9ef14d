//! GitHub GraphQL access.
//!
//! [`GraphQlClient`] is the only code that knows about the endpoint, the
//! bearer token and the `{query, variables}` envelope. Everything else talks
//! to it through [`QueryRunner`], which lets traversals run against scripted
//! responses in tests.

use crate::config::Config;
use crate::error::{AuditError, Result};
use async_trait::async_trait;
use log::{debug, warn};
use reqwest::header::{ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::Client;
use serde_json::{json, Value};

pub mod collections;
pub mod pagination;
pub mod queries;

pub use collections::{fetch_branch_activity, fetch_branches, fetch_members, fetch_repositories};
pub use pagination::{paginate, paginate_optional, Connection, PageInfo};

const GITHUB_ACCEPT: &str = "application/vnd.github.v4+json";
const CLIENT_USER_AGENT: &str = concat!("org-activity-audit/", env!("CARGO_PKG_VERSION"));
const ERROR_BODY_LIMIT: usize = 512;

/// Executes a single GraphQL request
#[async_trait]
pub trait QueryRunner: Send + Sync {
    /// Runs `query` with `variables` and returns the full response body
    ///
    /// Fails on a non-success status or when the body carries an `errors` field.
    async fn run(&self, query: &str, variables: Value) -> Result<Value>;

    /// Number of nodes to request per page
    fn page_size(&self) -> u32 {
        100
    }
}

/// reqwest-backed [`QueryRunner`] for the GitHub GraphQL API
#[derive(Clone)]
pub struct GraphQlClient {
    client: Client,
    endpoint: String,
    token: String,
    page_size: u32,
}

impl GraphQlClient {
    /// Creates a client from the validated configuration
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.api.timeout)
            .build()?;

        Ok(Self {
            client,
            endpoint: config.api.graphql_url.clone(),
            token: config.github_token()?.to_string(),
            page_size: config.api.page_size,
        })
    }
}

#[async_trait]
impl QueryRunner for GraphQlClient {
    async fn run(&self, query: &str, variables: Value) -> Result<Value> {
        debug!("POST {} variables={}", self.endpoint, variables);

        let response = self
            .client
            .post(&self.endpoint)
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .header(ACCEPT, GITHUB_ACCEPT)
            .header(USER_AGENT, CLIENT_USER_AGENT)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            if body.len() > ERROR_BODY_LIMIT {
                let mut end = ERROR_BODY_LIMIT;
                while !body.is_char_boundary(end) {
                    end -= 1;
                }
                body.truncate(end);
            }
            return Err(AuditError::GitHubApi { status, body });
        }

        let body: Value = serde_json::from_slice(&response.bytes().await?)?;
        check_graphql_errors(&body)?;
        Ok(body)
    }

    fn page_size(&self) -> u32 {
        self.page_size
    }
}

/// Turns a GraphQL `errors` array into an error
pub fn check_graphql_errors(body: &Value) -> Result<()> {
    match body.get("errors") {
        None | Some(Value::Null) => Ok(()),
        Some(errors) => {
            let messages: Vec<String> = match errors.as_array() {
                Some(items) => items
                    .iter()
                    .map(|e| {
                        e.get("message")
                            .and_then(Value::as_str)
                            .map(str::to_string)
                            .unwrap_or_else(|| e.to_string())
                    })
                    .collect(),
                None => vec![errors.to_string()],
            };
            warn!("GraphQL error response: {}", errors);
            Err(AuditError::GraphQl(messages))
        }
    }
}
