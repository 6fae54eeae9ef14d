//! Cursor pagination over GraphQL connections.

use super::QueryRunner;
use crate::error::{AuditError, Result};
use log::debug;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

/// `pageInfo` of a GraphQL connection
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// Whether another page follows this one
    pub has_next_page: bool,
    /// Cursor to pass as `after` for the next page
    pub end_cursor: Option<String>,
}

/// One page of a GraphQL connection
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection<N> {
    /// Nodes on this page; GitHub returns null for nodes it cannot resolve
    #[serde(default = "Vec::new")]
    pub nodes: Vec<Option<N>>,
    /// Position of this page in the connection
    pub page_info: PageInfo,
}

/// Follows a required connection until `hasNextPage` is false
///
/// `variables` must be a JSON object; `cursor` and `first` are filled in for
/// every request. A missing connection in any response is an error.
pub async fn paginate<R, N>(runner: &R, query: &str, variables: Value, connection: &str) -> Result<Vec<N>>
where
    R: QueryRunner + ?Sized,
    N: DeserializeOwned,
{
    walk(runner, query, variables, "", connection, false).await
}

/// Follows a connection that may legitimately be absent
///
/// `parent` must be present in every response. `connection` is resolved
/// relative to it; when it is missing or null the walk stops and returns the
/// nodes gathered so far.
pub async fn paginate_optional<R, N>(
    runner: &R,
    query: &str,
    variables: Value,
    parent: &str,
    connection: &str,
) -> Result<Vec<N>>
where
    R: QueryRunner + ?Sized,
    N: DeserializeOwned,
{
    walk(runner, query, variables, parent, connection, true).await
}

async fn walk<R, N>(
    runner: &R,
    query: &str,
    variables: Value,
    parent: &str,
    connection: &str,
    optional: bool,
) -> Result<Vec<N>>
where
    R: QueryRunner + ?Sized,
    N: DeserializeOwned,
{
    if !variables.is_object() {
        return Err(AuditError::config("query variables must be a JSON object"));
    }

    let mut nodes = Vec::new();
    let mut cursor: Option<String> = None;

    loop {
        let mut page_vars = variables.clone();
        page_vars["cursor"] = json!(cursor);
        page_vars["first"] = json!(runner.page_size());

        let body = runner.run(query, page_vars).await?;

        let parent_value = match body.pointer(parent) {
            Some(value) if !value.is_null() => value,
            _ => return Err(AuditError::MissingField(parent.to_string())),
        };

        let page = match parent_value.pointer(connection) {
            Some(value) if !value.is_null() => Connection::<N>::deserialize(value)?,
            _ if optional => {
                debug!("{}{} absent, stopping after {} nodes", parent, connection, nodes.len());
                break;
            }
            _ => return Err(AuditError::MissingField(format!("{}{}", parent, connection))),
        };

        nodes.extend(page.nodes.into_iter().flatten());

        if !page.page_info.has_next_page {
            break;
        }
        match page.page_info.end_cursor {
            Some(next) => cursor = Some(next),
            None => {
                return Err(AuditError::MissingField(format!(
                    "{}{}/pageInfo/endCursor",
                    parent, connection
                )))
            }
        }
    }

    Ok(nodes)
}
