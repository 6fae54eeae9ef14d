use reqwest::StatusCode;
use std::io;
use thiserror::Error;

/// Custom result type alias for the application
pub type Result<T> = std::result::Result<T, AuditError>;

/// Errors that can occur while auditing an organization
#[derive(Debug, Error)]
pub enum AuditError {
    /// I/O errors
    #[error("IO error: {0}")]
    IO(#[from] io::Error),

    /// HTTP transport errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing/serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV writing errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Non-success HTTP status returned by the GitHub API
    #[error("GitHub API error: {status}: {body}")]
    GitHubApi {
        /// Status code of the response
        status: StatusCode,
        /// Leading part of the response body
        body: String,
    },

    /// GraphQL `errors` payload
    #[error("GraphQL query returned errors: {}", .0.join("; "))]
    GraphQl(Vec<String>),

    /// A field required to continue was absent from the response
    #[error("Missing field: {0}")]
    MissingField(String),

    /// A timestamp in a response could not be parsed
    #[error("Invalid timestamp '{value}': {source}")]
    Timestamp {
        /// The raw value received
        value: String,
        /// Parser error
        source: chrono::ParseError,
    },

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),
}

impl AuditError {
    /// Creates a configuration error with the specified message
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Checks if this error is likely to go away on a later run
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(_) | Self::IO(_) => true,
            Self::GitHubApi { status, .. } => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_graphql_message_joins_errors() {
        let error = AuditError::GraphQl(vec!["first".into(), "second".into()]);
        assert_eq!(error.to_string(), "GraphQL query returned errors: first; second");
    }

    #[test]
    fn test_is_transient() {
        let throttled = AuditError::GitHubApi {
            status: StatusCode::TOO_MANY_REQUESTS,
            body: String::new(),
        };
        let unauthorized = AuditError::GitHubApi {
            status: StatusCode::UNAUTHORIZED,
            body: "Bad credentials".into(),
        };

        assert!(throttled.is_transient());
        assert!(!unauthorized.is_transient());
        assert!(!AuditError::config("no orgs").is_transient());
    }
}
