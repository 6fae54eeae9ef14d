use crate::error::{AuditError, Result};
use log::debug;
use std::str::FromStr;

/// Environment variable holding the bearer token
pub const GITHUB_TOKEN_VAR: &str = "GITHUB_TOKEN";
/// Environment variable holding the comma-separated organization list
pub const ORG_NAMES_VAR: &str = "ORG_NAMES";
/// Environment variable holding the inactivity threshold in days
pub const DAYS_INACTIVE_VAR: &str = "DAYS_INACTIVE_THRESHOLD";
/// Environment variable overriding the GraphQL endpoint
pub const GRAPHQL_URL_VAR: &str = "GITHUB_GRAPHQL_URL";
/// Environment variable overriding the report directory
pub const OUTPUT_DIR_VAR: &str = "REPORT_OUTPUT_DIR";

/// Loads a `.env` file from the working directory or its parents, if one exists
pub fn load_dotenv() {
    match dotenv::dotenv() {
        Ok(path) => debug!("Loaded environment from {}", path.display()),
        Err(e) => debug!("No .env file loaded: {}", e),
    }
}

/// Reads an environment variable, treating empty values as unset
pub fn get_env_value(key: &str) -> Option<String> {
    let value = std::env::var(key).ok()?;
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Reads and parses an environment variable, reporting the key on failure
pub fn parse_env_value<T: FromStr>(key: &str) -> Result<Option<T>>
where
    T::Err: std::fmt::Display,
{
    match get_env_value(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| AuditError::config(format!("{} must be a number ('{}'): {}", key, raw, e))),
        None => Ok(None),
    }
}

/// Splits a comma-separated organization list, dropping blank entries
pub fn parse_org_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}
