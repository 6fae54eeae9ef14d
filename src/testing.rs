//! In-memory [`QueryRunner`] for exercising traversals without a network.

use crate::error::{AuditError, Result};
use crate::github::QueryRunner;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Mutex;

/// A request seen by [`ScriptedRunner`]
#[derive(Debug, Clone)]
pub struct RecordedCall {
    /// Query text as sent
    pub query: String,
    /// Variables as sent, including `cursor` and `first`
    pub variables: Value,
}

enum Reply {
    Body(Value),
    Fail(String),
}

struct Route {
    marker: String,
    expected: Value,
    reply: Reply,
}

/// Answers GraphQL requests from a list of canned routes
///
/// A route matches when its marker occurs in the query text and every key of
/// its expected variables has the same value in the request. The first
/// matching route wins; unmatched requests fail with a GraphQL error.
pub struct ScriptedRunner {
    routes: Vec<Route>,
    calls: Mutex<Vec<RecordedCall>>,
    page_size: u32,
}

impl ScriptedRunner {
    /// Creates a runner with no routes and a page size of 100
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            calls: Mutex::new(Vec::new()),
            page_size: 100,
        }
    }

    /// Overrides the page size reported to the pagination walk
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Replies with `body` to matching requests
    pub fn on(mut self, marker: &str, expected: Value, body: Value) -> Self {
        self.routes.push(Route {
            marker: marker.to_string(),
            expected,
            reply: Reply::Body(body),
        });
        self
    }

    /// Fails matching requests with a GraphQL error carrying `message`
    pub fn fail(mut self, marker: &str, expected: Value, message: &str) -> Self {
        self.routes.push(Route {
            marker: marker.to_string(),
            expected,
            reply: Reply::Fail(message.to_string()),
        });
        self
    }

    /// Requests received so far, in order
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Number of received requests whose query contains `marker`
    pub fn count(&self, marker: &str) -> usize {
        self.calls().iter().filter(|c| c.query.contains(marker)).count()
    }
}

impl Default for ScriptedRunner {
    fn default() -> Self {
        Self::new()
    }
}

fn matches(expected: &Value, actual: &Value) -> bool {
    match expected.as_object() {
        Some(fields) => fields.iter().all(|(key, value)| actual.get(key) == Some(value)),
        None => expected == actual,
    }
}

#[async_trait]
impl QueryRunner for ScriptedRunner {
    async fn run(&self, query: &str, variables: Value) -> Result<Value> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(RecordedCall {
                query: query.to_string(),
                variables: variables.clone(),
            });
        }

        let route = self
            .routes
            .iter()
            .find(|r| query.contains(&r.marker) && matches(&r.expected, &variables));

        match route.map(|r| &r.reply) {
            Some(Reply::Body(body)) => Ok(body.clone()),
            Some(Reply::Fail(message)) => Err(AuditError::GraphQl(vec![message.clone()])),
            None => Err(AuditError::GraphQl(vec![format!("unscripted request: {}", variables)])),
        }
    }

    fn page_size(&self) -> u32 {
        self.page_size
    }
}
