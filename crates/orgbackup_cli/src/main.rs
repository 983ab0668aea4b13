//! orgbackup CLI - dated snapshot backups of a GitHub organization.

mod config;
mod lock;
mod logging;
mod shutdown;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use orgbackup::github::GitHubClient;
use orgbackup::{BackupOptions, CancellationToken, GitMirror, Orchestrator};

use crate::config::Settings;
use crate::lock::RunLock;
use crate::logging::SessionLog;

/// Exit code of a session stopped by a signal.
const EXIT_INTERRUPTED: u8 = 130;

#[derive(Parser)]
#[command(name = "orgbackup")]
#[command(version)]
#[command(about = "Back up a GitHub organization into dated archives")]
#[command(
    long_about = "orgbackup archives an organization's members, teams, and every public and \
private repository (code, wiki, issues, pull requests, collaborators) into one \
.tar.bz2 per unit per day, and prunes old archives beyond the configured retention."
)]
#[command(after_long_help = r#"LAYOUT
    <destdir>/members/members-<date>.tar.bz2
    <destdir>/teams/teams-<date>.tar.bz2
    <destdir>/public-repos/<repo>-<id>-<date>.tar.bz2
    <destdir>/private-repos/<repo>-<id>-<date>.tar.bz2

ENVIRONMENT VARIABLES
    ORGBACKUP_USERNAME        Overrides `username`
    ORGBACKUP_PASSWORD        Overrides `password` (API token)
    ORGBACKUP_ORGANIZATION    Overrides `organization`
    ORGBACKUP_DESTDIR         Overrides `destdir`
    ORGBACKUP_RETENTION       Overrides `retention`
    RUST_LOG                  Log filter (default: orgbackup=info,orgbackup_cli=info)
"#)]
struct Cli {
    /// Configuration file (INI, section [github-backup])
    #[arg(short, long, value_name = "FILE")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let settings = match Settings::load(&cli.config) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("orgbackup: {e}");
            return ExitCode::FAILURE;
        }
    };

    logging::init(settings.log);

    match run(settings).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Backup session could not start");
            ExitCode::FAILURE
        }
    }
}

async fn run(settings: Settings) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let _lock = RunLock::acquire(&settings.destdir)?;

    let cancel = CancellationToken::new();
    shutdown::setup_shutdown_handler(cancel.clone());

    let source = GitHubClient::new(&settings.password, settings.api_url.as_deref())?;
    let mirror = GitMirror::new(&settings.git_url, &settings.username, &settings.password)?;

    let mut options = BackupOptions::new(&settings.destdir, &settings.organization)
        .with_retry(settings.retry.clone());
    if let Some(retention) = settings.retention {
        options = options.with_retention(retention);
    }

    let log = SessionLog::open(&settings.organization);
    let callback = log.callback();
    let summary = Orchestrator::new(source, mirror, options)
        .with_cancellation(cancel)
        .run(Some(&callback))
        .await;
    log.close(&summary);

    if summary.cancelled {
        Ok(ExitCode::from(EXIT_INTERRUPTED))
    } else if !summary.is_complete() {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
