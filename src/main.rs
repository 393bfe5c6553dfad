use anyhow::{bail, Context, Result};
use log::{error, info};
use poll_sync::api::{BridgeWallet, RpcClient};
use poll_sync::chain::ChainLink;
use poll_sync::config::Config;
use poll_sync::models::events::SyncEvent;
use poll_sync::models::view::ViewModel;
use poll_sync::models::websocket::WalletEvent;
use poll_sync::sync::{RevertClassifier, SyncCoordinator};
use poll_sync::websocket::run_wallet_events;
use poll_sync::{ErrorKind, SyncError};
use std::io::{BufRead, Write};
use std::sync::Arc;
use tokio::sync::mpsc::unbounded_channel;

const VOTE_CAST: &str = "Vote cast successfully!";
const USAGE: &str = "usage: poll-sync [--config PATH] <show | watch | create QUESTION OPTION... | vote POLL OPTION | delete POLL [--yes]>";

#[derive(Debug, PartialEq)]
enum Command {
    Show,
    Watch,
    Create { question: String, options: Vec<String> },
    Vote { poll: u64, option: u64 },
    Delete { poll: u64, yes: bool },
}

fn parse_args(mut args: Vec<String>) -> Result<(Option<String>, Command)> {
    let mut config = None;
    if args.first().map(String::as_str) == Some("--config") {
        if args.len() < 2 {
            bail!(USAGE);
        }
        config = Some(args.remove(1));
        args.remove(0);
    }

    let mut args = args.into_iter();
    let command = match args.next().as_deref() {
        None | Some("show") => Command::Show,
        Some("watch") => Command::Watch,
        Some("create") => {
            let question = args.next().context(USAGE)?;
            Command::Create {
                question,
                options: args.collect(),
            }
        }
        Some("vote") => {
            let poll = args.next().context(USAGE)?.parse().context("poll id")?;
            let option = args.next().context(USAGE)?.parse().context("option index")?;
            Command::Vote { poll, option }
        }
        Some("delete") => {
            let poll = args.next().context(USAGE)?.parse().context("poll id")?;
            let yes = args.any(|arg| arg == "--yes");
            Command::Delete { poll, yes }
        }
        Some(other) => bail!("unknown command {:?}\n{}", other, USAGE),
    };
    Ok((config, command))
}

fn confirm_on_stdin(prompt: &str) -> bool {
    print!("{} [y/N] ", prompt);
    if std::io::stdout().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    match std::io::stdin().lock().read_line(&mut answer) {
        Ok(_) => matches!(answer.trim(), "y" | "Y" | "yes"),
        Err(_) => false,
    }
}

fn render(view: &ViewModel) -> String {
    let mut out = String::new();
    match &view.account {
        Some(account) => out.push_str(&format!("Connected: {}\n", account.short())),
        None => out.push_str("Not connected\n"),
    }
    if view.loading {
        out.push_str("Loading...\n");
        return out;
    }

    out.push_str("\nAll Polls\n");
    if view.polls.is_empty() {
        out.push_str("  No polls yet.\n");
    }
    for poll in &view.polls {
        out.push_str(&format!(
            "  #{} {} ({} votes, by {})\n",
            poll.id,
            poll.question,
            poll.total_votes,
            poll.creator.short()
        ));
        for (idx, option) in poll.options.iter().enumerate() {
            out.push_str(&format!(
                "      [{}] {:<24} {:>5} votes {:>5.1}%\n",
                idx,
                option,
                poll.vote_counts.get(idx).copied().unwrap_or(0),
                poll.percentage(idx)
            ));
        }
        if view.has_voted_hint(poll.id) {
            out.push_str("      already voted\n");
        }
        if view.can_delete(poll) {
            out.push_str("      you can delete this poll\n");
        }
    }

    out.push_str("\nLeaderboard\n");
    if view.leaderboard.is_empty() {
        out.push_str("  No leaderboard yet.\n");
    }
    for (rank, entry) in view.ranked() {
        out.push_str(&format!(
            "  {:>3}. {} ({} votes)\n",
            rank, entry.question, entry.total_votes
        ));
    }
    out
}

/// The line a user should see for `event`, if any. Everything else is logged.
fn report(event: &SyncEvent) -> Option<String> {
    match event {
        // The vote command answers this one itself.
        SyncEvent::MutationFailed { kind: ErrorKind::AlreadyVoted, .. } => None,
        SyncEvent::MutationFailed { kind, detail } if !kind.is_retryable() => Some(detail.clone()),
        SyncEvent::MutationFailed { detail, .. } => Some(format!("Failed: {}", detail)),
        SyncEvent::ConnectFailed { detail, .. } => {
            Some(format!("Failed to connect to wallet: {}", detail))
        }
        SyncEvent::BusyRejected => Some("Another operation is in progress".to_owned()),
        SyncEvent::Connected { account } => {
            info!("Connected: {}", account.short());
            None
        }
        other => {
            info!("{:?}", other);
            None
        }
    }
}

/// What to tell the user after a vote. `landed` is whether the vote was
/// confirmed on chain, which can be true even when the resync afterwards failed.
fn vote_message(result: &Result<(), SyncError>, landed: bool) -> Option<String> {
    match result {
        Ok(()) => Some(VOTE_CAST.to_owned()),
        Err(SyncError::AlreadyVoted) => Some(SyncError::AlreadyVoted.to_string()),
        Err(_) if landed => Some(VOTE_CAST.to_owned()),
        Err(_) => None,
    }
}

async fn watch(coordinator: &SyncCoordinator, config: &Config) -> Result<()> {
    let Some(events_url) = config.events_url.as_deref() else {
        bail!("watch needs eventsUrl in the config");
    };
    let (sender, mut receiver) = unbounded_channel();
    let handle = run_wallet_events(events_url, sender).await?;
    print!("{}", render(&coordinator.view()));

    loop {
        tokio::select! {
            event = receiver.recv() => {
                let Some(WalletEvent::AccountsChanged { accounts }) = event else { break };
                if let Err(e) = coordinator.on_accounts_changed(accounts).await {
                    error!("Resync after account change failed: {}", e);
                }
                print!("{}", render(&coordinator.view()));
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    handle.shutdown();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let (config_path, command) = parse_args(std::env::args().skip(1).collect())?;
    let config = match config_path {
        Some(path) => Config::load(path)?,
        None => Config::from_env()?,
    };

    let rpc = Arc::new(RpcClient::new(reqwest::Client::new(), config.rpc_url.clone()));
    let wallet = Arc::new(BridgeWallet::new(rpc, config.receipt_interval()));
    let link = ChainLink::new(wallet, config.contract_address.clone());
    let (events_tx, mut events_rx) = unbounded_channel();
    let coordinator = SyncCoordinator::new(
        link,
        RevertClassifier::new(config.already_voted_reasons.clone()),
        events_tx,
    );

    let reporter = tokio::spawn(async move {
        while let Some(event) = events_rx.recv().await {
            if let Some(line) = report(&event) {
                println!("{}", line);
            }
        }
    });

    let result = run(&coordinator, command, &config).await;

    // Closing the channel lets the reporter print whatever is still queued.
    drop(coordinator);
    if let Err(e) = reporter.await {
        error!("Event reporter stopped: {}", e);
    }
    result
}

async fn run(coordinator: &SyncCoordinator, command: Command, config: &Config) -> Result<()> {
    coordinator.start().await?;
    if coordinator.account().is_none() {
        coordinator.connect().await?;
    }

    match command {
        Command::Show => {}
        Command::Watch => return watch(coordinator, config).await,
        Command::Create { question, options } => {
            coordinator.create_poll(&question, &options).await?;
            println!("Poll created");
        }
        Command::Vote { poll, option } => {
            let result = coordinator.vote(poll, option).await;
            let landed = coordinator.view().has_voted_hint(poll);
            if let Some(message) = vote_message(&result, landed) {
                println!("{}", message);
            }
            match result {
                Ok(()) | Err(SyncError::AlreadyVoted) => {}
                Err(e) => return Err(e.into()),
            }
        }
        Command::Delete { poll, yes } => {
            let deleted = coordinator
                .delete_poll(poll, move |prompt| yes || confirm_on_stdin(prompt))
                .await?;
            if deleted {
                println!("Poll deleted successfully!");
            }
        }
    }

    print!("{}", render(&coordinator.view()));
    Ok(())
}
