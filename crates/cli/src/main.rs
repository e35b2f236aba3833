//! `relay`: command-line front end for agent-relay.
//!
//! Without a subcommand, an interactive session is started over the
//! project's pipeline.

mod commands;
mod render;
mod session;

use ar_core::agents::ProviderRouter;
use ar_core::config::loader::load_config;
use ar_core::config::models::AppConfig;
use ar_core::credentials::{FileCredentialStore, KeyRing};
use ar_core::document::DocumentRouter;
use ar_core::init::{generate_relay_structure, InitOptions};
use ar_core::state::{PipelineState, StateManager};
use ar_protocol::{Event, Provider};
use clap::{Parser, Subcommand};
use color_eyre::eyre::{bail, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "relay", version, about = "Run chains of LLM agents over a document")]
struct Cli {
    /// Project root containing `.agent-relay/`.
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create `.agent-relay/` with template agents and pipelines.
    Init {
        /// Overwrite an existing `.agent-relay/`.
        #[arg(long)]
        force: bool,
        /// One agent and one pipeline only.
        #[arg(long)]
        minimal: bool,
    },

    /// Manage provider API keys.
    Keys {
        #[command(subcommand)]
        action: KeysAction,
    },

    /// Run agents over a document without interaction.
    Exec {
        /// Document to load: text and Markdown are read as-is, anything
        /// else goes through OCR.
        #[arg(long)]
        document: PathBuf,
        /// Pipeline to load; defaults to the first one configured.
        #[arg(long)]
        pipeline: Option<String>,
        /// Positions to run, in order. Defaults to every position.
        #[arg(long = "step")]
        steps: Vec<usize>,
        /// Print the final pipeline snapshot as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Interactive session (the default).
    Session {
        #[arg(long)]
        pipeline: Option<String>,
        #[arg(long)]
        document: Option<PathBuf>,
    },

    /// List known model identifiers and their providers.
    Models,
}

#[derive(Subcommand, Debug)]
enum KeysAction {
    /// Store the key for a provider (openai, gemini, grok, anthropic).
    Set { provider: Provider, secret: String },
    /// Remove the key for a provider.
    Unset { provider: Provider },
    /// Show which providers have a key.
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "ar_core=info,relay=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Session {
        pipeline: None,
        document: None,
    }) {
        Commands::Init { force, minimal } => {
            let dir = generate_relay_structure(InitOptions {
                target_dir: cli.root,
                force,
                minimal,
            })
            .await?;
            println!("{} {}", "initialized".green(), dir.display());
        }
        Commands::Keys { action } => {
            let config = load_config(&cli.root).await?;
            let mut key_ring = open_key_ring(&config)?;
            match action {
                KeysAction::Set { provider, secret } => {
                    key_ring.set(provider, secret)?;
                    println!("{} key stored", provider);
                }
                KeysAction::Unset { provider } => {
                    key_ring.unset(provider)?;
                    println!("{} key removed", provider);
                }
                KeysAction::List => {
                    for provider in Provider::CREDENTIALED {
                        let state = match key_ring.credentials().get(provider) {
                            Some(secret) => format!("set ({})", mask(secret)).green(),
                            None => "missing".yellow(),
                        };
                        println!("{:<10} {}", provider, state);
                    }
                }
            }
        }
        Commands::Exec {
            document,
            pipeline,
            steps,
            json,
        } => exec(&cli.root, &document, pipeline.as_deref(), steps, json).await?,
        Commands::Session { pipeline, document } => {
            let (manager, extractor, event_rx) = start(&cli.root, pipeline.as_deref()).await?;
            if let Some(path) = document {
                manager.load_document(&extractor, &path).await?;
            }
            session::run_session(manager, extractor, event_rx).await?;
        }
        Commands::Models => println!("{}", render::model_list()),
    }

    Ok(())
}

/// Load configuration and credentials and build a session over the
/// selected pipeline, with the document extractor it should use.
async fn start(
    root: &Path,
    pipeline: Option<&str>,
) -> Result<(StateManager, DocumentRouter, mpsc::Receiver<Event>)> {
    let config = load_config(root).await?;
    let agents = config.resolve_agents(pipeline)?;
    let key_ring = open_key_ring(&config)?;
    let router = ProviderRouter::from_config(&config.global)?;
    let extractor = DocumentRouter::from_config(&config.global)?;

    let (events_tx, events_rx) = mpsc::channel(256);
    let manager = StateManager::new(PipelineState::new(agents), Arc::new(router), key_ring, events_tx);
    Ok((manager, extractor, events_rx))
}

async fn exec(
    root: &Path,
    document: &Path,
    pipeline: Option<&str>,
    steps: Vec<usize>,
    json: bool,
) -> Result<()> {
    let (manager, extractor, mut event_rx) = start(root, pipeline).await?;
    manager.load_document(&extractor, document).await?;

    let count = manager.agents().await.len();
    let steps = if steps.is_empty() {
        (0..count).collect()
    } else {
        steps
    };
    if let Some(step) = steps.iter().find(|step| **step >= count) {
        bail!("no agent at position {} (pipeline has {})", step, count);
    }

    let printer = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            if let Some(line) = render::event_line(&event) {
                eprintln!("{}", line);
            }
        }
    });

    for step in steps {
        manager.run_agent(step).await?;
    }

    let snapshot = manager.snapshot().await;
    drop(manager);
    let _ = printer.await;

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        for (position, (agent, output)) in snapshot.agents.iter().zip(&snapshot.outputs).enumerate() {
            if output.has_run() {
                println!("{}\n{}\n", format!("#{} {}", position, agent.name).bold(), output.output);
            }
        }
    }
    Ok(())
}

fn open_key_ring(config: &AppConfig) -> Result<KeyRing> {
    let store = match &config.global.credentials_path {
        Some(path) => FileCredentialStore::new(path),
        None => FileCredentialStore::in_config_dir()?,
    };
    tracing::debug!("credentials at {}", store.path().display());
    Ok(KeyRing::open(Box::new(store))?)
}

/// Last four characters of a secret, for display.
fn mask(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    let tail: String = chars[chars.len().saturating_sub(4)..].iter().collect();
    format!("...{}", tail)
}
