//! Per-user "last seen" aggregation.
//!
//! Every observation (a commit author date, an issue or pull request
//! `updatedAt`) is folded into an [`ActivityMap`] that keeps only the latest
//! timestamp per login. Maps from different sources, branches and
//! repositories are combined with [`ActivityMap::merge`], which is idempotent
//! and order-independent.

use crate::error::{AuditError, Result};
use chrono::{DateTime, Duration, Utc};
use std::collections::{BTreeMap, BTreeSet};

/// Parses a GitHub timestamp (RFC 3339, any offset) into UTC
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|source| AuditError::Timestamp {
            value: value.to_string(),
            source,
        })
}

/// Latest activity timestamp per login, ordered by login
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityMap {
    last_seen: BTreeMap<String, DateTime<Utc>>,
}

impl ActivityMap {
    /// Creates an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one observation, keeping the later of the stored and new timestamp
    ///
    /// Returns `true` if the stored value changed.
    pub fn record(&mut self, login: &str, at: DateTime<Utc>) -> bool {
        match self.last_seen.get_mut(login) {
            Some(existing) if *existing >= at => false,
            Some(existing) => {
                *existing = at;
                true
            }
            None => {
                self.last_seen.insert(login.to_string(), at);
                true
            }
        }
    }

    /// Folds every entry of `other` into `self` with the keep-latest rule
    pub fn merge(&mut self, other: &ActivityMap) {
        for (login, at) in other.iter() {
            self.record(login, at);
        }
    }

    /// Returns the last activity recorded for `login`
    pub fn get(&self, login: &str) -> Option<DateTime<Utc>> {
        self.last_seen.get(login).copied()
    }

    /// Returns `true` if `login` has any recorded activity
    pub fn contains(&self, login: &str) -> bool {
        self.last_seen.contains_key(login)
    }

    /// Number of distinct logins
    pub fn len(&self) -> usize {
        self.last_seen.len()
    }

    /// Returns `true` if nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.last_seen.is_empty()
    }

    /// Iterates over `(login, last activity)` in login order
    pub fn iter(&self) -> impl Iterator<Item = (&str, DateTime<Utc>)> + '_ {
        self.last_seen.iter().map(|(login, at)| (login.as_str(), *at))
    }

    /// Members that never appear in this map, in lexicographic order
    pub fn never_active<'a, I>(&self, members: I) -> BTreeSet<String>
    where
        I: IntoIterator<Item = &'a String>,
    {
        members
            .into_iter()
            .filter(|login| !self.contains(login))
            .cloned()
            .collect()
    }
}

impl<S: Into<String>> FromIterator<(S, DateTime<Utc>)> for ActivityMap {
    fn from_iter<T: IntoIterator<Item = (S, DateTime<Utc>)>>(iter: T) -> Self {
        let mut map = Self::new();
        for (login, at) in iter {
            let login: String = login.into();
            map.record(&login, at);
        }
        map
    }
}

/// Start of the activity window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cutoff(DateTime<Utc>);

impl Cutoff {
    /// Cutoff `days` before `now`
    ///
    /// Fails when the result falls outside the representable date range.
    pub fn days_before(now: DateTime<Utc>, days: u32) -> Result<Self> {
        Duration::try_days(i64::from(days))
            .and_then(|window| now.checked_sub_signed(window))
            .map(Self)
            .ok_or_else(|| AuditError::config(format!("an activity window of {} days is out of range", days)))
    }

    /// Wraps an explicit instant
    pub fn at(instant: DateTime<Utc>) -> Self {
        Self(instant)
    }

    /// Returns the cutoff instant
    pub fn instant(self) -> DateTime<Utc> {
        self.0
    }

    /// Activity at or after the cutoff counts as active
    pub fn is_active(self, at: DateTime<Utc>) -> bool {
        at >= self.0
    }

    /// Renders the cutoff as a `GitTimestamp` for the commit history `since` argument
    pub fn as_git_timestamp(self) -> String {
        self.0.to_rfc3339()
    }
}
