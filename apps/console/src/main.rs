use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{MutationCoordinator, ReloadOrdering};
use tracing_subscriber::EnvFilter;

mod config;
mod shell;
mod terminal;

use config::load_settings;
use terminal::TerminalSurface;

#[derive(Parser, Debug)]
#[command(about = "Browse activities, sign up by email, and withdraw participants")]
struct Cli {
    /// Base URL of the activities server.
    #[arg(long)]
    server_url: Option<String>,
    /// How overlapping reloads are reconciled: `arrival` or `sequenced`.
    #[arg(long)]
    reload_ordering: Option<ReloadOrdering>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show every activity once.
    List,
    Enroll {
        #[arg(long)]
        activity: String,
        #[arg(long)]
        email: String,
    },
    Withdraw {
        #[arg(long)]
        activity: String,
        #[arg(long)]
        email: String,
    },
    /// Interactive session (default).
    Shell,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let mut settings = load_settings();
    if let Some(server_url) = cli.server_url {
        settings.server_url = server_url;
    }
    if let Some(ordering) = cli.reload_ordering {
        settings.reload_ordering = ordering;
    }

    let surface = Arc::new(TerminalSurface::default());
    let coordinator =
        MutationCoordinator::connect(&settings.server_url, surface.clone(), settings.sync_options())
            .context("invalid server configuration")?;

    coordinator.refresh().await;

    match cli.command.unwrap_or(Command::Shell) {
        Command::List => {
            if coordinator.context().directory().await.is_none() {
                bail!("activity directory unavailable at {}", settings.server_url);
            }
        }
        Command::Enroll { activity, email } => {
            coordinator
                .enroll(&activity, &email)
                .await
                .with_context(|| format!("could not sign up {email} for {activity}"))?;
        }
        Command::Withdraw { activity, email } => {
            coordinator
                .withdraw(&activity, &email)
                .await
                .with_context(|| format!("could not unregister {email} from {activity}"))?;
        }
        Command::Shell => shell::run(coordinator, surface).await?,
    }

    Ok(())
}
