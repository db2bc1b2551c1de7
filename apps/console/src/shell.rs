//! Interactive mode: one live view, commands typed against it.

use std::sync::Arc;

use anyhow::Result;
use client_core::MutationCoordinator;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::terminal::TerminalSurface;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ShellCommand {
    Help,
    Reload,
    Select(usize),
    Enroll { email: String },
    Withdraw(usize),
    Quit,
    Empty,
    Invalid(String),
}

pub(crate) fn parse_command(line: &str) -> ShellCommand {
    let line = line.trim();
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };

    match head {
        "" => ShellCommand::Empty,
        "help" | "?" => ShellCommand::Help,
        "list" | "reload" => ShellCommand::Reload,
        "quit" | "exit" => ShellCommand::Quit,
        "select" => match rest.parse() {
            Ok(number) => ShellCommand::Select(number),
            Err(_) => ShellCommand::Invalid("usage: select <activity number>".into()),
        },
        "withdraw" => match rest.parse() {
            Ok(row) => ShellCommand::Withdraw(row),
            Err(_) => ShellCommand::Invalid("usage: withdraw <participant row>".into()),
        },
        // The page's email input only accepts something address-shaped; the
        // server decides everything else.
        "enroll" if rest.contains('@') && !rest.contains(char::is_whitespace) => {
            ShellCommand::Enroll {
                email: rest.to_string(),
            }
        }
        "enroll" => ShellCommand::Invalid("usage: enroll <email>".into()),
        other => ShellCommand::Invalid(format!("unknown command '{other}'; type 'help'")),
    }
}

fn print_help() {
    println!("commands:");
    println!("  list | reload          fetch and show all activities");
    println!("  select <n>             choose activity n in the enroll form");
    println!("  enroll <email>         sign up the email for the selected activity");
    println!("  withdraw <row>         remove the participant shown on row <row>");
    println!("  quit");
}

pub async fn run(coordinator: Arc<MutationCoordinator>, surface: Arc<TerminalSurface>) -> Result<()> {
    print_help();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        match parse_command(&line) {
            ShellCommand::Empty => {}
            ShellCommand::Help => print_help(),
            ShellCommand::Quit => break,
            ShellCommand::Invalid(message) => println!("{message}"),
            ShellCommand::Reload => {
                coordinator.refresh().await;
            }
            ShellCommand::Select(number) => match surface.select(number) {
                Some(name) => println!("selected {name}"),
                None => println!("no activity numbered {number}"),
            },
            ShellCommand::Enroll { email } => {
                let Some(activity) = surface.selected_activity() else {
                    println!("select an activity first");
                    continue;
                };
                let coordinator = Arc::clone(&coordinator);
                tokio::spawn(async move {
                    if let Err(err) = coordinator.enroll(&activity, &email).await {
                        debug!("console: {} finished with error: {err}", err.kind().as_str());
                    }
                });
            }
            ShellCommand::Withdraw(row) => {
                let Some(control) = surface.withdraw_control(row) else {
                    println!("no participant on row {row}");
                    continue;
                };
                let coordinator = Arc::clone(&coordinator);
                tokio::spawn(async move {
                    if let Err(err) = control.trigger(&coordinator).await {
                        debug!("console: {} finished with error: {err}", err.kind().as_str());
                    }
                });
            }
        }
    }

    Ok(())
}
