use std::{path::PathBuf, process::ExitCode, sync::Arc, time::Duration};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use client_core::{ClientEvent, HttpProposalService, Notice, ProposalBoard};
use shared::domain::{ProposalId, ProposalTab, StatusDecision, UserId};
use tokio::sync::broadcast;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod render;

use config::{load_settings, LoadedSettings, Settings, DEFAULT_CONFIG_PATH};

const RELOAD_WAIT: Duration = Duration::from_secs(10);

#[derive(Parser, Debug)]
#[command(about = "Browse proposals and manage applicants")]
struct Cli {
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    #[arg(long)]
    api_url: Option<String>,
    #[arg(long)]
    user_id: Option<String>,
    #[arg(long)]
    auth_token: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Open proposals in the all, saved or applied tab.
    List {
        #[arg(long, value_enum, default_value_t = TabArg::All)]
        tab: TabArg,
        #[arg(long)]
        query: Option<String>,
        #[arg(long)]
        recent: bool,
        #[arg(long)]
        json: bool,
    },
    /// Proposals you own, with their applicants.
    Manage {
        #[arg(long)]
        query: Option<String>,
        #[arg(long)]
        json: bool,
    },
    Accept(DecisionArgs),
    Reject(DecisionArgs),
    /// Print a mailto link for an applicant.
    Contact {
        #[arg(long)]
        proposal: String,
        #[arg(long)]
        applicant: String,
    },
}

#[derive(clap::Args, Debug)]
struct DecisionArgs {
    #[arg(long)]
    proposal: String,
    #[arg(long)]
    applicant: String,
    /// Refuse unless the applicant is still undetermined.
    #[arg(long)]
    checked: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum TabArg {
    All,
    Saved,
    Applied,
}

impl From<TabArg> for ProposalTab {
    fn from(value: TabArg) -> Self {
        match value {
            TabArg::All => ProposalTab::All,
            TabArg::Saved => ProposalTab::Saved,
            TabArg::Applied => ProposalTab::Applied,
        }
    }
}

impl Cli {
    fn settings(&self) -> LoadedSettings {
        let mut loaded = load_settings(&self.config);
        let settings = &mut loaded.settings;
        if let Some(v) = &self.api_url {
            settings.api_url = config::normalize_api_url(v);
        }
        if let Some(v) = &self.user_id {
            settings.user_id = Some(v.clone());
        }
        if let Some(v) = &self.auth_token {
            settings.auth_token = Some(v.clone());
        }
        loaded
    }
}

fn init_tracing(settings: &Settings) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&settings.log_level)
            .with_context(|| format!("invalid log level '{}'", settings.log_level))?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow!("failed to install tracing subscriber: {err}"))
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let LoadedSettings {
        settings,
        file_error,
    } = cli.settings();
    init_tracing(&settings)?;
    if let Some(file_error) = file_error {
        warn!(error = %file_error, "config: ignoring unparsable settings file");
    }

    let service = HttpProposalService::with_options(
        settings.api_url.clone(),
        settings.auth_token.clone(),
        Some(Duration::from_secs(settings.request_timeout_secs)),
    )
    .context("failed to build HTTP client")?;
    info!(api_url = %service.api_url(), "board: using backend");

    let user_id = settings.user_id.clone().unwrap_or_else(|| {
        warn!("no user id configured; the applied tab will be empty");
        String::new()
    });
    let board = ProposalBoard::new(Arc::new(service), UserId::new(user_id));
    let mut events = board.subscribe_events();

    let outcome = run(cli.command, &board).await;

    let mut reported_error = false;
    for notice in drain_notices(&mut events) {
        reported_error |= notice.is_error();
        eprintln!("{}", render::notice_line(&notice));
    }

    match outcome {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(err) => {
            error!(error = %err, "board: command failed");
            if !reported_error {
                eprintln!("error: {err:#}");
            }
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn run(command: Command, board: &Arc<ProposalBoard>) -> Result<()> {
    match command {
        Command::List {
            tab,
            query,
            recent,
            json,
        } => {
            let listing = board.proposals();
            listing.load().await?;
            if recent {
                listing.show_recent().await;
            }
            if let Some(query) = query {
                listing.set_query(&query).await;
            }

            let tab = ProposalTab::from(tab);
            let proposals = listing.tab(tab).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&proposals)?);
            } else {
                for line in render::tab_listing(tab, &proposals) {
                    println!("{line}");
                }
            }
        }
        Command::Manage { query, json } => {
            let manage = board.manage();
            manage.load().await?;
            let proposals = match query {
                Some(query) => manage.search(&query).await,
                None => manage.proposals().await,
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&proposals)?);
            } else if proposals.is_empty() {
                println!("No proposals to manage");
            } else {
                for line in render::managed_listing(&proposals) {
                    println!("{line}");
                }
            }
        }
        Command::Accept(args) => decide(board, args, StatusDecision::Accepted).await?,
        Command::Reject(args) => decide(board, args, StatusDecision::Rejected).await?,
        Command::Contact {
            proposal,
            applicant,
        } => {
            board.manage().load().await?;
            let proposal_id = ProposalId::new(proposal);
            let applicant_id = UserId::new(applicant);
            let applicant = board
                .manage()
                .find_applicant(&proposal_id, &applicant_id)
                .await
                .with_context(|| {
                    format!("applicant {applicant_id} not found on proposal {proposal_id}")
                })?;
            let target = board
                .applicants()
                .contact(&applicant.applicant)
                .with_context(|| format!("applicant {applicant_id} has no email address"))?;
            println!("{target}");
        }
    }

    Ok(())
}

async fn decide(board: &Arc<ProposalBoard>, args: DecisionArgs, decision: StatusDecision) -> Result<()> {
    let proposal_id = ProposalId::new(args.proposal);
    let applicant_id = UserId::new(args.applicant);
    if args.checked {
        board.manage().load().await?;
    }

    let mut events = board.subscribe_events();
    let listener = board.spawn_reload_listener();
    let result = board
        .decide(&proposal_id, &applicant_id, decision, args.checked)
        .await;
    if result.is_ok() {
        wait_for_owned_reload(&mut events).await;
    }
    listener.abort();
    let change = result?;

    match board.manage().find_applicant(&proposal_id, &applicant_id).await {
        Some(applicant) => println!("{}", render::applicant_line(&applicant)),
        None => println!(
            "{} -> {} on {}",
            change.applicant_id, change.status, change.proposal_id
        ),
    }
    Ok(())
}

async fn wait_for_owned_reload(events: &mut broadcast::Receiver<ClientEvent>) {
    let waited = tokio::time::timeout(RELOAD_WAIT, async {
        loop {
            match events.recv().await {
                Ok(ClientEvent::ManagedProposalsLoaded { .. }) => break,
                Ok(ClientEvent::Notice(notice)) if notice.is_error() => break,
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
    .await;
    if waited.is_err() {
        warn!("board: timed out waiting for refreshed applicants");
    }
}

fn drain_notices(events: &mut broadcast::Receiver<ClientEvent>) -> Vec<Notice> {
    let mut notices = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let ClientEvent::Notice(notice) = event {
            notices.push(notice);
        }
    }
    notices
}
