#![allow(dead_code)]

use chrono::{DateTime, Utc};
use org_activity_audit::activity::parse_timestamp;
use org_activity_audit::config::Config;
use serde_json::{json, Value};
use std::path::Path;

pub mod test_helpers {
    use super::*;

    pub fn setup_test_logger() {
        let _ = env_logger::builder()
            .filter_level(log::LevelFilter::Debug)
            .is_test(true)
            .try_init();
    }

    /// Config writing into `output_dir` with pausing disabled
    pub fn create_test_config(orgs: &[&str], output_dir: &Path) -> Config {
        let mut config = Config::new(orgs.iter().map(|o| o.to_string()).collect());
        config.github_token = Some("test-token".to_string());
        config.output_dir = output_dir.to_path_buf();
        config.pacing.pause_every = 0;
        config
    }

    pub fn ts(value: &str) -> DateTime<Utc> {
        parse_timestamp(value).unwrap()
    }

    fn single_page(nodes: Value) -> Value {
        json!({ "nodes": nodes, "pageInfo": { "hasNextPage": false, "endCursor": null } })
    }

    pub fn repositories_page(names: &[&str]) -> Value {
        let nodes: Vec<Value> = names.iter().map(|n| json!({ "name": n })).collect();
        json!({ "data": { "organization": { "repositories": single_page(json!(nodes)) } } })
    }

    pub fn members_page(logins: &[&str]) -> Value {
        let nodes: Vec<Value> = logins.iter().map(|l| json!({ "login": l })).collect();
        json!({ "data": { "organization": { "membersWithRole": single_page(json!(nodes)) } } })
    }

    pub fn branches_page(names: &[&str]) -> Value {
        let nodes: Vec<Value> = names.iter().map(|n| json!({ "name": n })).collect();
        json!({ "data": { "repository": { "refs": single_page(json!(nodes)) } } })
    }

    /// Commit history page from `(login, author date)` pairs
    pub fn commits_page(commits: &[(&str, &str)]) -> Value {
        let nodes: Vec<Value> = commits
            .iter()
            .map(|(login, date)| json!({ "author": { "user": { "login": login }, "date": date } }))
            .collect();
        json!({ "data": { "repository": { "ref": { "target": { "history": single_page(json!(nodes)) } } } } })
    }

    /// Issue or pull request page from `(login, updatedAt)` pairs
    pub fn authored_page(connection: &str, items: &[(&str, &str)]) -> Value {
        let nodes: Vec<Value> = items
            .iter()
            .map(|(login, updated)| json!({ "author": { "login": login }, "updatedAt": updated }))
            .collect();
        json!({ "data": { "repository": { connection: single_page(json!(nodes)) } } })
    }
}
