//! Interactive session: a line-oriented front end over the StateManager.
//!
//! Input lines and core events are handled concurrently with
//! `tokio::select!`, so run results are printed as they arrive while the
//! operator keeps editing.

use crate::commands::{parse_line, Command, HELP};
use crate::render;
use ar_core::document::DocumentExtractor;
use ar_core::state::StateManager;
use ar_protocol::{Event, Op};
use color_eyre::eyre::{eyre, Result};
use colored::Colorize;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::select;
use tokio::sync::mpsc::Receiver;

type InputLines = Lines<BufReader<Stdin>>;

pub async fn run_session(
    manager: StateManager,
    extractor: impl DocumentExtractor,
    mut event_rx: Receiver<Event>,
) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{}", render::pipeline_table(&manager.snapshot().await));
    if let Some(line) = render::missing_keys_line(&manager.missing_providers().await) {
        println!("{}", line);
    }
    println!("type 'help' for commands");
    prompt();

    loop {
        select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_line(&line) {
                    Ok(Some(command)) => {
                        if !execute(&manager, &extractor, command, &mut lines).await? {
                            break;
                        }
                    }
                    Ok(None) => {}
                    Err(e) => println!("{}", e.to_string().red()),
                }
                prompt();
            }
            Some(event) = event_rx.recv() => {
                if let Some(line) = render::event_line(&event) {
                    println!("{}", line);
                }
            }
        }
    }

    apply(&manager, Op::Shutdown).await?;
    Ok(())
}

/// Carry out one command. Returns `false` when the session should end.
async fn execute(
    manager: &StateManager,
    extractor: &dyn DocumentExtractor,
    command: Command,
    lines: &mut InputLines,
) -> Result<bool> {
    match command {
        Command::Op(op) => return apply(manager, op).await,
        Command::Run(position) => {
            if let Some(provider) = manager.missing_credential(position).await {
                print!(
                    "{} API key missing. Enter it now, or press Enter to use a substitute result: ",
                    provider
                );
                flush();
                let secret = lines.next_line().await?.unwrap_or_default();
                let secret = secret.trim();
                if !secret.is_empty() {
                    apply(
                        manager,
                        Op::SetCredential {
                            provider,
                            secret: secret.to_string(),
                        },
                    )
                    .await?;
                }
            }
            apply(manager, Op::RunAgent { position }).await?;
        }
        Command::Load(path) => match manager.load_document(extractor, &path).await {
            Ok(_) => {}
            Err(e) => println!("{}", e.to_string().red()),
        },
        Command::Show(None) => println!("{}", render::pipeline_table(&manager.snapshot().await)),
        Command::Show(Some(position)) => {
            match render::agent_detail(&manager.snapshot().await, position) {
                Some(detail) => println!("{}", detail),
                None => println!("{}", format!("no agent at position {}", position).red()),
            }
        }
        Command::Metrics => println!("{}", render::metrics_view(&manager.metrics_summary().await)),
        Command::Models => println!("{}", render::model_list()),
        Command::Help => println!("{}", HELP),
        Command::Quit => return Ok(false),
    }
    Ok(true)
}

async fn apply(manager: &StateManager, op: Op) -> Result<bool> {
    manager.handle(op).await.map_err(|e| eyre!(e))
}

fn prompt() {
    print!("{} ", "relay>".bold());
    flush();
}

fn flush() {
    let _ = std::io::stdout().flush();
}
