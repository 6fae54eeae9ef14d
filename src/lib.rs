#![warn(missing_docs)]
#![warn(clippy::all)]

//! org-activity-audit - find GitHub organization members with no recent activity
//!
//! For each organization the audit walks every repository and branch through
//! the GitHub GraphQL API, records the latest commit, issue and pull request
//! activity per login, and writes a CSV report that marks each member as
//! active, inactive, or never active within the configured window.
//!
//! ## Usage
//! ```rust,ignore
//! use org_activity_audit::{Auditor, Config, GraphQlClient};
//!
//! async fn example() -> org_activity_audit::Result<()> {
//!     let config = Config::from_env()?;
//!     config.validate()?;
//!     let client = GraphQlClient::new(&config)?;
//!     let summary = Auditor::new(client, config).run().await;
//!     println!("{} organizations failed", summary.failed());
//!     Ok(())
//! }
//! ```

/// Latest-activity aggregation and the activity window
pub mod activity;
/// Per-organization audit loop
pub mod audit;
/// Configuration loaded from the environment
pub mod config;
/// Error handling types
pub mod error;
/// GitHub GraphQL client and collection traversals
pub mod github;
/// Logging configuration
pub mod logging;
/// CSV report output
pub mod report;
/// Scripted query runner for tests
pub mod testing;

pub use activity::{ActivityMap, Cutoff};
pub use audit::{AuditSummary, Auditor, OrgOutcome, OrgSummary};
pub use config::Config;
pub use error::{AuditError, Result};
pub use github::{GraphQlClient, QueryRunner};
pub use report::{ActivityState, ReportRow};
