use assert_cmd::Command;
use mockito::Matcher;
use predicates::prelude::*;
use serde_json::json;
use std::fs;
use tempfile::TempDir;

/// The binary with a clean audit environment, run from `dir` so no `.env` is picked up
fn audit_command(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("org-activity-audit").expect("binary not found");
    cmd.current_dir(dir.path())
        .env_remove("ORG_NAMES")
        .env_remove("DAYS_INACTIVE_THRESHOLD")
        .env_remove("GITHUB_GRAPHQL_URL")
        .env_remove("REPORT_OUTPUT_DIR")
        .env_remove("RUST_LOG")
        .env("GITHUB_TOKEN", "test-token");
    cmd
}

fn report_names(dir: &std::path::Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .expect("read_dir failed")
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".csv"))
        .collect();
    names.sort();
    names
}

#[test]
fn test_missing_org_list_exits_with_error() {
    let work_dir = TempDir::new().unwrap();
    let out_dir = TempDir::new().unwrap();

    audit_command(&work_dir)
        .arg("--output-dir")
        .arg(out_dir.path())
        .arg("--no-progress")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("no organizations configured"));

    assert!(report_names(out_dir.path()).is_empty(), "no report may be written");
}

#[test]
fn test_org_flag_overrides_environment() {
    let work_dir = TempDir::new().unwrap();
    let out_dir = TempDir::new().unwrap();
    let mut server = mockito::Server::new();

    let mut repositories = |org: &str| {
        server
            .mock("POST", "/graphql")
            .match_header("authorization", "Bearer test-token")
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex(r"repositories\(".to_string()),
                Matcher::PartialJson(json!({ "variables": { "org": org } })),
            ]))
            .with_status(200)
            .with_body(
                json!({ "data": { "organization": { "repositories": {
                    "nodes": [],
                    "pageInfo": { "hasNextPage": false, "endCursor": null }
                } } } })
                .to_string(),
            )
            .expect(1)
            .create()
    };
    let repos_a = repositories("a");
    let repos_b = repositories("b");

    let members = server
        .mock("POST", "/graphql")
        .match_body(Matcher::Regex(r"membersWithRole\(".to_string()))
        .with_status(200)
        .with_body(
            json!({ "data": { "organization": { "membersWithRole": {
                "nodes": [{ "login": "alice" }],
                "pageInfo": { "hasNextPage": false, "endCursor": null }
            } } } })
            .to_string(),
        )
        .expect(2)
        .create();

    let from_env = server
        .mock("POST", "/graphql")
        .match_body(Matcher::PartialJson(json!({ "variables": { "org": "from-env" } })))
        .expect(0)
        .create();

    audit_command(&work_dir)
        .env("ORG_NAMES", "from-env")
        .arg("--org")
        .arg("a,b")
        .arg("--api-url")
        .arg(format!("{}/graphql", server.url()))
        .arg("--output-dir")
        .arg(out_dir.path())
        .arg("--no-progress")
        .assert()
        .success()
        .stdout(predicate::str::contains("2 report(s) written"));

    repos_a.assert();
    repos_b.assert();
    members.assert();
    from_env.assert();

    let names = report_names(out_dir.path());
    assert_eq!(names.len(), 2, "{:?}", names);
    assert!(names[0].starts_with("user_activity_report_a_"));
    assert!(names[1].starts_with("user_activity_report_b_"));

    let report = fs::read_to_string(out_dir.path().join(&names[0])).unwrap();
    assert_eq!(report, "Users,Last activity,active\nalice,N/A,never-active\n");
}
