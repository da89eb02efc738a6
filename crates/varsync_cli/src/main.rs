//! varsync CLI - reconcile GitLab instance-level CI/CD variables.

mod commands;
mod config;
mod manifest;
mod progress;

use std::io::Write;
use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use console::Term;
use tracing_subscriber::EnvFilter;

use crate::commands::apply::OutputFormat;

#[derive(Parser)]
#[command(name = "varsync")]
#[command(version)]
#[command(about = "Reconcile GitLab instance-level CI/CD variables")]
#[command(
    long_about = "varsync reconciles a declared set of instance-level CI/CD variables against \
a GitLab server: missing variables are created, drifted ones are replaced, \
and undeclared ones can optionally be purged. A dry run reports the same \
outcome without touching the server."
)]
#[command(after_long_help = r#"EXAMPLES
    Apply the variables declared in a manifest:
        $ varsync apply --manifest vars.toml

    See what would change without touching the server:
        $ varsync apply --manifest vars.toml --dry-run

    Delete everything the manifest does not declare:
        $ varsync apply --manifest vars.toml --purge

    Remove the declared variables:
        $ varsync apply --manifest vars.toml --state absent

    Generate shell completions:
        $ varsync completions bash > ~/.local/share/bash-completion/completions/varsync

CONFIGURATION
    varsync reads configuration from:
      1. ~/.config/varsync/config.toml (or $XDG_CONFIG_HOME/varsync/config.toml)
      2. ./varsync.toml in the current directory
      3. Environment variables (VARSYNC_* prefix, e.g., VARSYNC_GITLAB_TOKEN)
      4. .env file in current directory

ENVIRONMENT VARIABLES
    VARSYNC_GITLAB_HOST       GitLab host (default: gitlab.com)
    VARSYNC_GITLAB_TOKEN      GitLab personal access token with admin access
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile declared variables against the GitLab instance
    Apply {
        /// Path to the TOML manifest declaring the variables
        #[arg(short, long)]
        manifest: PathBuf,

        /// Target state for the declared variables
        #[arg(long, value_enum, default_value_t = StateArg::Present)]
        state: StateArg,

        /// Delete remote variables the manifest does not declare
        #[arg(short, long)]
        purge: bool,

        /// Dry run - show what would be done without making changes
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// GitLab host (default: gitlab.com, or from config/env)
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        output: OutputFormat,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
    /// Generate man page(s)
    Man {
        /// Output directory for man pages (prints to stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Target state as accepted on the command line.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum StateArg {
    /// Create or update the declared variables
    Present,
    /// Delete the declared variables
    Absent,
}

impl From<StateArg> for varsync::State {
    fn from(state: StateArg) -> Self {
        match state {
            StateArg::Present => varsync::State::Present,
            StateArg::Absent => varsync::State::Absent,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize tracing for non-TTY mode (structured logging)
    if !Term::stdout().is_term() {
        let env_filter = match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => EnvFilter::new("varsync=info,varsync_cli=info"),
        };

        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .init();
    }

    // Load configuration (config file -> env vars -> defaults)
    let config = config::Config::load();

    let cli = Cli::parse();

    match cli.command {
        Commands::Apply {
            manifest,
            state,
            purge,
            dry_run,
            host,
            output,
        } => {
            let args = commands::apply::ApplyArgs {
                manifest,
                state: state.into(),
                purge,
                dry_run,
                host,
                output,
            };
            commands::apply::handle_apply(args, &config).await?;
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "varsync", &mut std::io::stdout());
        }
        Commands::Man { output } => {
            write_man_pages(output)?;
        }
    }

    Ok(())
}

/// Render man pages for the CLI: every page into `output` when a directory
/// is given, otherwise just the main page to stdout.
fn write_man_pages(output: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    match output {
        Some(dir) => {
            std::fs::create_dir_all(&dir)?;
            clap_mangen::generate_to(Cli::command(), &dir)?;
            println!("Generated man pages in: {}", dir.display());
        }
        None => {
            let mut page = Vec::new();
            clap_mangen::Man::new(Cli::command()).render(&mut page)?;
            std::io::stdout().write_all(&page)?;
        }
    }

    Ok(())
}
