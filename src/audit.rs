//! Per-organization audit loop.
//!
//! Organizations, repositories and branches are processed strictly in
//! order. A failure only abandons the smallest unit it happened in: a branch
//! error skips the branch, a branch-listing error skips the repository, and a
//! repository- or member-listing error skips the organization. Aggregation
//! state lives inside [`Auditor::audit_org`] and is rebuilt per organization.

use crate::activity::{ActivityMap, Cutoff};
use crate::config::Config;
use crate::error::{AuditError, Result};
use crate::github::{fetch_branch_activity, fetch_branches, fetch_members, fetch_repositories, QueryRunner};
use crate::report::{self, ActivityState};
use chrono::{DateTime, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use std::path::PathBuf;

/// Result of auditing one organization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrgSummary {
    /// Organization login
    pub org: String,
    /// Repositories listed for the organization
    pub repositories: usize,
    /// Repositories whose branches could not be listed
    pub repositories_skipped: usize,
    /// Branches whose history was merged into the report
    pub branches_scanned: usize,
    /// Branches dropped because their history could not be fetched
    pub branches_skipped: usize,
    /// Rows marked active
    pub active: usize,
    /// Rows marked inactive
    pub inactive: usize,
    /// Members with no observed activity
    pub never_active: usize,
    /// Path of the written CSV report
    pub report: PathBuf,
}

/// What happened to one configured organization
#[derive(Debug)]
pub enum OrgOutcome {
    /// The report was written
    Completed(OrgSummary),
    /// The organization was abandoned and no report was written
    Failed {
        /// Organization login
        org: String,
        /// Rendered error that stopped the organization
        error: String,
    },
}

/// Outcomes of a whole run, in configuration order
#[derive(Debug, Default)]
pub struct AuditSummary {
    /// One outcome per configured organization
    pub outcomes: Vec<OrgOutcome>,
}

impl AuditSummary {
    /// Summaries of the organizations that produced a report
    pub fn completed(&self) -> impl Iterator<Item = &OrgSummary> {
        self.outcomes.iter().filter_map(|o| match o {
            OrgOutcome::Completed(summary) => Some(summary),
            OrgOutcome::Failed { .. } => None,
        })
    }

    /// Number of organizations that failed
    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, OrgOutcome::Failed { .. }))
            .count()
    }
}

#[derive(Debug, Default)]
struct RepositoryScan {
    activity: ActivityMap,
    repositories_skipped: usize,
    branches_scanned: usize,
    branches_skipped: usize,
}

/// Drives the audit of every configured organization
pub struct Auditor<R> {
    runner: R,
    config: Config,
    show_progress: bool,
}

impl<R: QueryRunner> Auditor<R> {
    /// Creates an auditor with the progress bar turned off
    pub fn new(runner: R, config: Config) -> Self {
        Self {
            runner,
            config,
            show_progress: false,
        }
    }

    /// Shows a repository progress bar on stderr while scanning
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// The runner every query goes through
    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Audits every configured organization, continuing past failures
    pub async fn run(&self) -> AuditSummary {
        let mut summary = AuditSummary::default();

        for org in &self.config.organizations {
            let outcome = match self.audit_org(org, Utc::now()).await {
                Ok(org_summary) => {
                    info!("Done with {}", org);
                    OrgOutcome::Completed(org_summary)
                }
                Err(e) => {
                    error!("Skipping org {} due to error: {}{}", org, e, rerun_hint(&e));
                    OrgOutcome::Failed {
                        org: org.clone(),
                        error: e.to_string(),
                    }
                }
            };
            summary.outcomes.push(outcome);
        }

        summary
    }

    /// Audits one organization and writes its report
    ///
    /// `now` anchors both the activity cutoff and the report file name.
    pub async fn audit_org(&self, org: &str, now: DateTime<Utc>) -> Result<OrgSummary> {
        let cutoff = Cutoff::days_before(now, self.config.days_inactive)?;

        info!("Fetching repos for organization: {}", org);
        let repositories = fetch_repositories(&self.runner, org).await?;
        info!("Total repositories found in {}: {}", org, repositories.len());

        let scan = self.scan_repositories(org, &repositories, cutoff).await;

        info!("Fetching org members for never-active detection...");
        let members = fetch_members(&self.runner, org).await?;
        let never_active = scan.activity.never_active(&members);

        let rows = report::build_rows(&scan.activity, &never_active, cutoff);
        let path = report::write_report(&self.config.output_dir, org, &rows, now)?;

        let count = |state: ActivityState| rows.iter().filter(|r| r.state == state).count();
        Ok(OrgSummary {
            org: org.to_string(),
            repositories: repositories.len(),
            repositories_skipped: scan.repositories_skipped,
            branches_scanned: scan.branches_scanned,
            branches_skipped: scan.branches_skipped,
            active: count(ActivityState::Active),
            inactive: count(ActivityState::Inactive),
            never_active: never_active.len(),
            report: path,
        })
    }

    async fn scan_repositories(&self, org: &str, repositories: &[String], cutoff: Cutoff) -> RepositoryScan {
        let mut scan = RepositoryScan::default();
        let pb = self.progress_bar(repositories.len());
        let pacing = &self.config.pacing;

        for (index, repo) in repositories.iter().enumerate() {
            let position = index + 1;
            pb.set_message(repo.clone());
            debug!("Repo [{}/{}]: {}", position, repositories.len(), repo);

            // Log lines that may show while the bar is drawn go through `suspend`.
            match fetch_branches(&self.runner, org, repo).await {
                Ok(branches) if branches.is_empty() => pb.suspend(|| warn!("No branches in {}, skipping", repo)),
                Ok(branches) => {
                    for branch in &branches {
                        debug!("  Branch: {}", branch);
                        match fetch_branch_activity(&self.runner, org, repo, branch, cutoff).await {
                            Ok(activity) => {
                                scan.activity.merge(&activity);
                                scan.branches_scanned += 1;
                            }
                            Err(e) => {
                                pb.suspend(|| {
                                    warn!("  Skipping branch '{}' due to error: {}{}", branch, e, rerun_hint(&e))
                                });
                                scan.branches_skipped += 1;
                            }
                        }
                    }
                }
                Err(e) => {
                    pb.suspend(|| error!("Error on repo '{}': {}{}", repo, e, rerun_hint(&e)));
                    scan.repositories_skipped += 1;
                }
            }

            pb.inc(1);
            if pacing.pause_every > 0 && position % pacing.pause_every == 0 {
                pb.suspend(|| info!("Sleeping {:?} to respect rate limits...", pacing.pause));
                tokio::time::sleep(pacing.pause).await;
            }
        }

        pb.finish_and_clear();
        scan
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(len as u64);
        if let Ok(style) =
            ProgressStyle::with_template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} repos | {msg}")
        {
            pb.set_style(style);
        }
        pb
    }
}

/// Suffix for failure logs whose cause may clear up on a rerun
fn rerun_hint(error: &AuditError) -> &'static str {
    if error.is_transient() {
        " (transient, a rerun may succeed)"
    } else {
        ""
    }
}
