use std::path::PathBuf;

use clap::ValueEnum;
use console::{Term, style};

use varsync::{
    InstanceVariablesClient, Outcome, ProgressCallback, ReconcileOptions, State, normalize,
    reconcile,
};

use crate::config::Config;
use crate::manifest::Manifest;
use crate::progress::LoggingReporter;

/// Output format for the outcome report.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Display as a formatted table (default)
    #[default]
    Table,
    /// Display as JSON
    Json,
}

/// Arguments for the apply command, resolved from the CLI.
pub(crate) struct ApplyArgs {
    pub manifest: PathBuf,
    pub state: State,
    pub purge: bool,
    pub dry_run: bool,
    pub host: Option<String>,
    pub output: OutputFormat,
}

pub(crate) async fn handle_apply(
    args: ApplyArgs,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let host = args.host.clone().unwrap_or_else(|| config.gitlab_host());
    let token = config
        .gitlab_token()
        .ok_or("VARSYNC_GITLAB_TOKEN must be set in environment, .env file, or config file")?;

    let manifest = Manifest::load(&args.manifest)?;
    let declared = manifest.into_raw_variables()?;
    let desired = normalize(&declared, args.state)?;

    let client = InstanceVariablesClient::new(&host, &token)?;

    let options = ReconcileOptions {
        state: args.state,
        purge: args.purge,
        dry_run: args.dry_run,
    };

    let reporter = LoggingReporter::new();
    let on_progress: ProgressCallback = Box::new(move |event| reporter.handle(event));

    if Term::stdout().is_term() {
        if args.dry_run {
            println!(
                "Dry run: {} declared variables against {}...\n",
                desired.len(),
                client.host()
            );
        } else {
            println!(
                "Reconciling {} declared variables against {}...\n",
                desired.len(),
                client.host()
            );
        }
    }

    let outcome = reconcile(&client, &desired, &options, Some(&on_progress)).await?;

    print_outcome(&outcome, args.output, args.dry_run);

    Ok(())
}

/// Outcome report: key lists per category plus the changed flag.
#[derive(Debug, serde::Serialize)]
struct OutcomeReport {
    added: Vec<String>,
    updated: Vec<String>,
    removed: Vec<String>,
    untouched: Vec<String>,
    changed: bool,
}

impl From<&Outcome> for OutcomeReport {
    fn from(outcome: &Outcome) -> Self {
        Self {
            added: outcome.added_keys(),
            updated: outcome.updated_keys(),
            removed: outcome.removed_keys(),
            untouched: outcome.untouched_keys(),
            changed: outcome.changed(),
        }
    }
}

#[derive(Debug, tabled::Tabled)]
struct OutcomeRow {
    #[tabled(rename = "Action")]
    action: &'static str,
    #[tabled(rename = "Count")]
    count: usize,
    #[tabled(rename = "Variables")]
    variables: String,
}

fn outcome_rows(report: &OutcomeReport) -> Vec<OutcomeRow> {
    vec![
        OutcomeRow {
            action: "added",
            count: report.added.len(),
            variables: report.added.join(", "),
        },
        OutcomeRow {
            action: "updated",
            count: report.updated.len(),
            variables: report.updated.join(", "),
        },
        OutcomeRow {
            action: "removed",
            count: report.removed.len(),
            variables: report.removed.join(", "),
        },
        OutcomeRow {
            action: "untouched",
            count: report.untouched.len(),
            variables: report.untouched.join(", "),
        },
    ]
}

fn print_outcome(outcome: &Outcome, output: OutputFormat, dry_run: bool) {
    let report = OutcomeReport::from(outcome);

    match output {
        OutputFormat::Json => match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Failed to serialize report: {}", e),
        },
        OutputFormat::Table => {
            let table = tabled::Table::new(outcome_rows(&report)).to_string();
            println!("{}", table);

            let verdict = if report.changed {
                style("changed").yellow()
            } else {
                style("unchanged").green()
            };
            if dry_run {
                println!("\nDry run result: {}", verdict);
            } else {
                println!("\nResult: {}", verdict);
            }
        }
    }
}
