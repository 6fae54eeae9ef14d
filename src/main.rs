use clap::Parser;
use colored::*;
use org_activity_audit::{
    config::{self, Config},
    error::Result,
    logging, Auditor, GraphQlClient, OrgOutcome,
};
use std::path::PathBuf;
use std::process;

/// Report GitHub organization members with no recent activity
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Organization to audit; repeat or comma-separate (overrides ORG_NAMES)
    #[arg(short, long = "org", value_delimiter = ',')]
    orgs: Vec<String>,

    /// Days without activity before a member counts as inactive (overrides DAYS_INACTIVE_THRESHOLD)
    #[arg(short, long)]
    days: Option<u32>,

    /// Directory to write the CSV reports to (overrides REPORT_OUTPUT_DIR)
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// GraphQL endpoint (overrides GITHUB_GRAPHQL_URL)
    #[arg(long)]
    api_url: Option<String>,

    /// Log level: error, warn, info, debug or trace
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Do not draw a progress bar
    #[arg(long)]
    no_progress: bool,
}

impl Cli {
    fn apply(self, config: &mut Config) {
        let orgs: Vec<String> = self
            .orgs
            .iter()
            .flat_map(|raw| config::parse_org_list(raw))
            .collect();
        if !orgs.is_empty() {
            config.organizations = orgs;
        }
        if let Some(days) = self.days {
            config.days_inactive = days;
        }
        if let Some(dir) = self.output_dir {
            config.output_dir = dir;
        }
        if let Some(url) = self.api_url {
            config.api.graphql_url = url;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(logging::parse_log_level(&cli.log_level));
    config::load_dotenv();

    let show_progress = !cli.no_progress;
    let mut config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => fail(&e.to_string()),
    };
    cli.apply(&mut config);

    if let Err(e) = config.validate() {
        fail(&e.to_string());
    }

    let client = GraphQlClient::new(&config)?;
    let auditor = Auditor::new(client, config).with_progress(show_progress);
    let summary = auditor.run().await;

    println!("\n{}", "Audit summary".bright_green().bold());
    for outcome in &summary.outcomes {
        match outcome {
            OrgOutcome::Completed(org) => {
                println!(
                    "  {} {}: {} active, {} inactive, {} never active ({} repos, {} skipped) -> {}",
                    "[OK]".bright_green(),
                    org.org.bold(),
                    org.active,
                    org.inactive,
                    org.never_active,
                    org.repositories,
                    org.repositories_skipped,
                    org.report.display()
                );
            }
            OrgOutcome::Failed { org, error } => {
                println!("  {} {}: {}", "[FAILED]".bright_red(), org.bold(), error);
            }
        }
    }

    let reports = summary.completed().count();
    let never_active: usize = summary.completed().map(|org| org.never_active).sum();
    println!(
        "\n{} report(s) written, {} never-active member(s), {} organization(s) failed",
        reports,
        never_active,
        summary.failed()
    );

    Ok(())
}

fn fail(message: &str) -> ! {
    eprintln!("{} {}", "[ERROR]".bright_red(), message.bright_red());
    process::exit(1);
}
