mod env_manager;

use crate::error::{AuditError, Result};
use std::path::PathBuf;
use std::time::Duration;

pub use env_manager::{
    get_env_value, load_dotenv, parse_env_value, parse_org_list, DAYS_INACTIVE_VAR,
    GITHUB_TOKEN_VAR, GRAPHQL_URL_VAR, ORG_NAMES_VAR, OUTPUT_DIR_VAR,
};

/// Default GitHub GraphQL endpoint
pub const DEFAULT_GRAPHQL_URL: &str = "https://api.github.com/graphql";
/// Default inactivity threshold in days
pub const DEFAULT_DAYS_INACTIVE: u32 = 60;
/// Largest accepted inactivity threshold in days (100 years)
pub const MAX_DAYS_INACTIVE: u32 = 36_500;

/// Main configuration struct for the application
///
/// Built once at process entry (environment first, then command line
/// overrides) and handed to the GraphQL client and the auditor.
#[derive(Debug, Clone)]
pub struct Config {
    /// Bearer token sent with every GraphQL request
    pub github_token: Option<String>,
    /// Organizations to audit, in order
    pub organizations: Vec<String>,
    /// Members with no activity within this many days are reported inactive
    pub days_inactive: u32,
    /// Directory the CSV reports are written to
    pub output_dir: PathBuf,
    /// GitHub API access settings
    pub api: ApiConfig,
    /// Request pacing settings
    pub pacing: PacingConfig,
}

/// Settings for talking to the GraphQL endpoint
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// GraphQL endpoint URL
    pub graphql_url: String,
    /// Nodes requested per page (GitHub caps this at 100)
    pub page_size: u32,
    /// Per-request timeout
    pub timeout: Duration,
}

/// Fixed pause inserted between batches of repositories
#[derive(Debug, Clone)]
pub struct PacingConfig {
    /// Pause after this many repositories; zero disables pausing
    pub pause_every: usize,
    /// Length of each pause
    pub pause: Duration,
}

impl Config {
    /// Creates a configuration for the given organizations with default settings
    pub fn new(organizations: Vec<String>) -> Self {
        Self {
            github_token: None,
            organizations,
            days_inactive: DEFAULT_DAYS_INACTIVE,
            output_dir: PathBuf::from("."),
            api: ApiConfig::default(),
            pacing: PacingConfig::default(),
        }
    }

    /// Builds the configuration from environment variables
    ///
    /// Reads `GITHUB_TOKEN`, `ORG_NAMES`, `DAYS_INACTIVE_THRESHOLD`,
    /// `GITHUB_GRAPHQL_URL` and `REPORT_OUTPUT_DIR`. A `.env` file should be
    /// loaded with [`load_dotenv`] beforehand if one is expected.
    pub fn from_env() -> Result<Self> {
        let organizations = get_env_value(ORG_NAMES_VAR)
            .map(|raw| parse_org_list(&raw))
            .unwrap_or_default();

        let mut config = Self::new(organizations);
        config.github_token = get_env_value(GITHUB_TOKEN_VAR).map(|t| t.trim().to_string());

        if let Some(days) = parse_env_value::<u32>(DAYS_INACTIVE_VAR)? {
            config.days_inactive = days;
        }
        if let Some(url) = get_env_value(GRAPHQL_URL_VAR) {
            config.api.graphql_url = url;
        }
        if let Some(dir) = get_env_value(OUTPUT_DIR_VAR) {
            config.output_dir = PathBuf::from(dir);
        }

        Ok(config)
    }

    /// Validates that the configuration can drive an audit run
    pub fn validate(&self) -> Result<()> {
        if self.organizations.is_empty() {
            return Err(AuditError::config(format!(
                "no organizations configured; set {} or pass --org",
                ORG_NAMES_VAR
            )));
        }
        self.github_token()?;
        if self.days_inactive > MAX_DAYS_INACTIVE {
            return Err(AuditError::config(format!(
                "{} must be at most {}, got {}",
                DAYS_INACTIVE_VAR, MAX_DAYS_INACTIVE, self.days_inactive
            )));
        }
        if self.api.page_size == 0 || self.api.page_size > 100 {
            return Err(AuditError::config(format!(
                "page size must be between 1 and 100, got {}",
                self.api.page_size
            )));
        }
        Ok(())
    }

    /// Retrieves the GitHub token from the configuration
    pub fn github_token(&self) -> Result<&str> {
        self.github_token
            .as_deref()
            .ok_or_else(|| AuditError::config(format!("GitHub token not configured; set {}", GITHUB_TOKEN_VAR)))
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            graphql_url: DEFAULT_GRAPHQL_URL.to_string(),
            page_size: 100,
            timeout: Duration::from_secs(30),
        }
    }
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            pause_every: 100,
            pause: Duration::from_secs(2),
        }
    }
}
