//! CSV report of member activity for one organization.

use crate::activity::{ActivityMap, Cutoff};
use crate::error::Result;
use chrono::{DateTime, Utc};
use log::info;
use std::collections::BTreeSet;
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Header row of every report
pub const HEADER: [&str; 3] = ["Users", "Last activity", "active"];

const DATE_FORMAT: &str = "%d-%m-%Y";
const NOT_AVAILABLE: &str = "N/A";

/// Classification of a member in the report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivityState {
    /// Last activity is at or after the cutoff
    Active,
    /// Last activity is before the cutoff
    Inactive,
    /// Member with no observed activity at all
    NeverActive,
}

impl ActivityState {
    /// Value written to the `active` column
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "true",
            Self::Inactive => "false",
            Self::NeverActive => "never-active",
        }
    }
}

impl fmt::Display for ActivityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of the report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    /// Member login
    pub login: String,
    /// Latest observed activity, if any
    pub last_activity: Option<DateTime<Utc>>,
    /// Classification against the cutoff
    pub state: ActivityState,
}

impl ReportRow {
    /// Last activity as `dd-mm-yyyy`, or `N/A`
    pub fn formatted_date(&self) -> String {
        match self.last_activity {
            Some(at) => at.format(DATE_FORMAT).to_string(),
            None => NOT_AVAILABLE.to_string(),
        }
    }

    fn record(&self) -> [String; 3] {
        [self.login.clone(), self.formatted_date(), self.state.to_string()]
    }
}

/// Builds report rows: observed users in login order, then never-active members
pub fn build_rows(activity: &ActivityMap, never_active: &BTreeSet<String>, cutoff: Cutoff) -> Vec<ReportRow> {
    let observed = activity.iter().map(|(login, at)| ReportRow {
        login: login.to_string(),
        last_activity: Some(at),
        state: if cutoff.is_active(at) {
            ActivityState::Active
        } else {
            ActivityState::Inactive
        },
    });

    let never = never_active.iter().map(|login| ReportRow {
        login: login.clone(),
        last_activity: None,
        state: ActivityState::NeverActive,
    });

    observed.chain(never).collect()
}

/// `user_activity_report_<org>_<YYYYMMDD_HHMMSS>.csv`
pub fn report_file_name(org: &str, generated_at: DateTime<Utc>) -> String {
    format!(
        "user_activity_report_{}_{}.csv",
        org,
        generated_at.format("%Y%m%d_%H%M%S")
    )
}

/// Writes the header and `rows` as CSV to `writer`
pub fn write_rows<W: Write>(writer: W, rows: &[ReportRow]) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(HEADER)?;
    for row in rows {
        csv.write_record(row.record())?;
    }
    csv.flush()?;
    Ok(())
}

/// Writes the report for `org` into `output_dir`, returning the file path
pub fn write_report(
    output_dir: &Path,
    org: &str,
    rows: &[ReportRow],
    generated_at: DateTime<Utc>,
) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir)?;
    let path = output_dir.join(report_file_name(org, generated_at));
    info!("Writing CSV -> {}", path.display());

    let file = std::fs::File::create(&path)?;
    write_rows(std::io::BufWriter::new(file), rows)?;
    Ok(path)
}
