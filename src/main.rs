use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};

use gitflow_release::announce::{ReleaseAnnouncer, SlackAnnouncer};
use gitflow_release::cli::{dispatch, Services};
use gitflow_release::config::{self, RuntimeEnv};
use gitflow_release::event::Trigger;
use gitflow_release::host::{GitHubClient, RepoSlug};
use gitflow_release::outcome;
use gitflow_release::ui;

#[derive(clap::Parser)]
#[command(
    name = "gitflow-release",
    version,
    about = "Open release pull requests and publish Gitflow releases from CI"
)]
struct Args {
    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(long, help = "Triggering event name (defaults to GITHUB_EVENT_NAME)")]
    event_name: Option<String>,

    #[arg(long, help = "Event payload JSON file (defaults to GITHUB_EVENT_PATH)")]
    event_path: Option<String>,

    #[arg(long, help = "Compute everything without changing the repository")]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    ui::init_logging();
    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let message = format!("{:#}", e);
            println!("{}", ui::error_annotation(&message));
            ui::display_error(&message);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let mut config = config::load_config(args.config.as_deref())?;
    if args.dry_run {
        config.dry_run = true;
    }
    let env = RuntimeEnv::from_env()?;

    let repo = match env.repository.clone() {
        Some(repo) => repo,
        None => RepoSlug::discover(".")
            .context("GITHUB_REPOSITORY is not set and the origin remote could not be read")?,
    };
    debug!(repo = %repo, api_url = %env.api_url, "resolved repository");

    let announcer = match config.slack.as_deref() {
        Some(input) => Some(SlackAnnouncer::from_input(
            input,
            env.slack_token.clone(),
            repo.clone(),
        )?),
        None => None,
    };

    let event_name = args
        .event_name
        .or(env.event_name)
        .unwrap_or_else(|| "unknown".to_string());
    let event_path = args.event_path.or(env.event_path);
    let trigger = Trigger::load(&event_name, event_path.as_deref())?;
    info!(event = %event_name, dry_run = config.dry_run, "starting");

    let client = GitHubClient::new(env.github_token, repo).with_api_url(env.api_url);
    let services = Services {
        host: &client,
        changelog: &client,
        announcer: announcer.as_ref().map(|a| a as &dyn ReleaseAnnouncer),
    };

    match dispatch(&trigger, &config, &services, chrono::Utc::now()).await? {
        Some(result) => {
            outcome::write_outputs(&result)?;
            ui::display_outcome(&result);
        }
        None => ui::display_status(&format!("Ignoring '{}' event", event_name)),
    }
    Ok(())
}
